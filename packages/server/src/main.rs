#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crash map application.
//!
//! Pass `--interactive` (or `-i`) to be prompted for the dataset, bind
//! address, and port. Otherwise configuration comes from the environment.

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let interactive = std::env::args()
        .skip(1)
        .any(|arg| arg == "--interactive" || arg == "-i");

    if interactive {
        crash_map_server::interactive::run().await
    } else {
        crash_map_server::run_server().await
    }
}
