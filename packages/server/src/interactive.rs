//! Interactive mode for the server.
//!
//! Prompts for the dataset, bind address, and port before starting the
//! server.

use crash_map_source::registry;
use dialoguer::{Confirm, Input, Select};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Passes the answers straight to [`super::run_server_with`];
/// `CRASH_MAP_DATA_FILE` still selects a local CSV.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Crash Map Server");
    println!();

    let datasets = registry::all_datasets();
    let labels: Vec<String> = datasets
        .iter()
        .map(|d| format!("{} ({})", d.name(), d.region))
        .collect();
    let dataset_idx = Select::new()
        .with_prompt("Dataset")
        .items(&labels)
        .default(0)
        .interact()
        .unwrap_or(0);
    let Some(dataset) = datasets.into_iter().nth(dataset_idx) else {
        return Err(std::io::Error::other("no dataset selected"));
    };

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default("127.0.0.1".to_string())
        .interact_text()
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port_str: String = Input::new()
        .with_prompt("Port")
        .default("8080".to_string())
        .interact_text()
        .unwrap_or_else(|_| "8080".to_string());

    let Ok(port) = port_str.trim().parse::<u16>() else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid port: {port_str}"),
        ));
    };

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port_str}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    let options = super::load_options_from_env();
    super::run_server_with(dataset, &options, bind_addr, port).await
}
