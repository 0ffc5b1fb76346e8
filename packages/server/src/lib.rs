#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crash map application.
//!
//! Loads one crash dataset at startup and serves filtered rows, map
//! markers, and dashboard charts over it. The table is immutable once
//! loaded, so every request works from the same shared snapshot.

mod handlers;
pub mod interactive;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use crash_map_crash_models::CrashRecord;
use crash_map_source::source_def::DatasetDefinition;
use crash_map_source::{LoadOptions, progress, registry};

/// Shared application state.
pub struct AppState {
    /// Definition of the loaded dataset.
    pub dataset: DatasetDefinition,
    /// Every row of the dataset, in source order.
    pub records: Arc<Vec<CrashRecord>>,
}

/// Registers every `/api` route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/datasets", web::get().to(handlers::datasets))
            .route("/options", web::get().to(handlers::options))
            .route("/preview", web::get().to(handlers::preview))
            .route("/crashes", web::get().to(handlers::crashes))
            .route("/markers", web::get().to(handlers::markers))
            .route("/markers.geojson", web::get().to(handlers::markers_geojson))
            .route("/charts", web::get().to(handlers::charts)),
    );
}

/// Loads every row of `dataset` into a fresh [`AppState`].
///
/// # Errors
///
/// Returns [`crash_map_source::SourceError`] if the rows cannot be fetched
/// or parsed.
pub async fn load_state(
    dataset: DatasetDefinition,
    options: &LoadOptions,
) -> Result<AppState, crash_map_source::SourceError> {
    log::info!("Loading dataset {}...", dataset.name());
    let records =
        crash_map_source::load_dataset(&dataset, options, &progress::null_progress()).await?;
    log::info!("Loaded {} crash records", records.len());

    Ok(AppState {
        dataset,
        records: Arc::new(records),
    })
}

/// Resolves the dataset named by the environment.
///
/// `CRASH_MAP_DATASET` picks the dataset (default
/// [`registry::DEFAULT_DATASET_ID`]); `CRASH_MAP_DATA_FILE` reads a local
/// CSV instead of downloading.
///
/// # Errors
///
/// Returns [`crash_map_source::SourceError`] if the dataset is unknown.
pub fn dataset_from_env() -> Result<(DatasetDefinition, LoadOptions), crash_map_source::SourceError>
{
    let id = std::env::var("CRASH_MAP_DATASET")
        .unwrap_or_else(|_| registry::DEFAULT_DATASET_ID.to_string());
    let dataset = registry::find_dataset(&id)?;

    Ok((dataset, load_options_from_env()))
}

/// Reads `CRASH_MAP_DATA_FILE` into [`LoadOptions`].
#[must_use]
pub fn load_options_from_env() -> LoadOptions {
    LoadOptions {
        limit: None,
        local_file: std::env::var_os("CRASH_MAP_DATA_FILE").map(PathBuf::from),
    }
}

/// `BIND_ADDR` (default `127.0.0.1`) and `PORT` (default `8080`).
#[must_use]
pub fn bind_from_env() -> (String, u16) {
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    (bind_addr, port)
}

/// Starts the crash map API server using the environment for every
/// setting.
///
/// The caller provides the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the dataset fails to resolve or
/// load, or if the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let (dataset, options) = dataset_from_env().map_err(|e| {
        log::error!("Failed to resolve dataset: {e}");
        std::io::Error::other(e)
    })?;
    let (bind_addr, port) = bind_from_env();

    run_server_with(dataset, &options, bind_addr, port).await
}

/// Loads `dataset` once, then serves it on `bind_addr:port`.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the dataset fails to load, or if
/// the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server_with(
    dataset: DatasetDefinition,
    options: &LoadOptions,
    bind_addr: String,
    port: u16,
) -> std::io::Result<()> {
    let state = load_state(dataset, options).await.map_err(|e| {
        log::error!("Failed to load dataset: {e}");
        std::io::Error::other(e)
    })?;
    let state = web::Data::new(state);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
