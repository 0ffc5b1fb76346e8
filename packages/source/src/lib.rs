#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Road crash dataset loading.
//!
//! A [`source_def::DatasetDefinition`] describes where a dataset lives and
//! which CSV columns map to which [`CrashRecord`] fields. The same generic
//! loader handles every revision of the published dataset, so a renamed
//! column is a config change rather than a code change.

pub mod csv_download;
pub mod parsing;
pub mod progress;
pub mod registry;
pub mod retry;
pub mod source_def;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crash_map_crash_models::CrashRecord;

use crate::csv_download::{CsvDownloadConfig, fetch_csv_download, parse_csv};
use crate::progress::ProgressCallback;
use crate::source_def::{DatasetDefinition, FetcherConfig, delimiter_byte};

/// Errors that can occur while loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error (file read, decompression).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A dataset definition is malformed or could not be found.
    #[error("Config error: {message}")]
    Config {
        /// Description of what went wrong.
        message: String,
    },

    /// The download failed with a non-retryable status or ran out of
    /// retries.
    #[error("Download failed: {message}")]
    Download {
        /// Description of what went wrong.
        message: String,
    },
}

/// Options for a single dataset load.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Maximum number of rows to read across all files.
    pub limit: Option<u64>,
    /// Read this local CSV instead of the configured fetcher.
    pub local_file: Option<PathBuf>,
}

/// Loads and normalizes every row of a dataset.
///
/// Rows are fetched according to the definition's fetcher (or from
/// [`LoadOptions::local_file`] when set), then mapped through the
/// definition's field mapping. Rows that cannot be normalized are skipped
/// and logged rather than failing the load.
///
/// # Errors
///
/// Returns [`SourceError`] if the download, file read, or CSV parse fails.
pub async fn load_dataset(
    definition: &DatasetDefinition,
    options: &LoadOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<CrashRecord>, SourceError> {
    let rows = if let Some(path) = &options.local_file {
        let delimiter = definition.fetcher.delimiter();
        read_local_rows(path, delimiter, options.limit, progress).await?
    } else {
        match &definition.fetcher {
            FetcherConfig::CsvDownload {
                urls,
                delimiter,
                compressed,
                max_records,
                headers,
            } => {
                let config = CsvDownloadConfig {
                    urls,
                    label: &definition.id,
                    delimiter: delimiter.as_deref(),
                    compressed: compressed.as_deref(),
                    max_records: *max_records,
                    headers,
                };
                fetch_csv_download(&config, options, progress).await?
            }
            FetcherConfig::LocalFile { path, delimiter } => {
                read_local_rows(
                    path,
                    delimiter_byte(delimiter.as_deref()),
                    options.limit,
                    progress,
                )
                .await?
            }
        }
    };

    let records = definition.normalize_rows(&rows);
    log::info!(
        "[{}] Loaded {} crash records ({} raw rows)",
        definition.id,
        records.len(),
        rows.len()
    );

    Ok(records)
}

async fn read_local_rows(
    path: &Path,
    delimiter: u8,
    limit: Option<u64>,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<serde_json::Value>, SourceError> {
    log::info!("Reading CSV from {}", path.display());
    progress.set_message(format!("Reading {}", path.display()));

    let bytes = tokio::fs::read(path).await?;
    let rows = parse_csv(&bytes, delimiter, limit)?;

    progress.inc(rows.len() as u64);
    progress.finish(format!("read {} rows from {}", rows.len(), path.display()));

    Ok(rows)
}
