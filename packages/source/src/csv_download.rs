//! CSV file download and parsing.
//!
//! Downloads each configured CSV (optionally gzip-compressed), parses it,
//! and returns every row as a [`serde_json::Value`] object keyed by the
//! column headers in the first row.

use std::collections::BTreeMap;
use std::io::Read as _;
use std::sync::Arc;

use crate::progress::ProgressCallback;
use crate::{LoadOptions, SourceError, retry};

/// UTF-8 byte order mark. The portal's `?bom=True` dumps start with one.
const UTF8_BOM: &str = "\u{feff}";

/// Configuration for the CSV download fetcher.
pub struct CsvDownloadConfig<'a> {
    /// URLs of CSV files to download.
    pub urls: &'a [String],
    /// Human-readable label for log messages.
    pub label: &'a str,
    /// Field delimiter (default: comma).
    pub delimiter: Option<&'a str>,
    /// Compression format (`"gzip"` or `None`).
    pub compressed: Option<&'a str>,
    /// Maximum records per CSV file.
    pub max_records: Option<u64>,
    /// Additional HTTP headers.
    pub headers: &'a BTreeMap<String, String>,
}

/// Downloads every configured CSV and returns the concatenated rows.
///
/// # Errors
///
/// Returns [`SourceError`] if any download, decompression, or CSV parse
/// fails.
pub async fn fetch_csv_download(
    config: &CsvDownloadConfig<'_>,
    options: &LoadOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<serde_json::Value>, SourceError> {
    let client = build_client(config.headers)?;
    let delimiter = crate::source_def::delimiter_byte(config.delimiter);
    let mut rows: Vec<serde_json::Value> = Vec::new();

    if let Some(limit) = options.limit {
        progress.set_total(limit);
    }

    for (i, url) in config.urls.iter().enumerate() {
        log::info!(
            "[{}] Downloading CSV {}/{}: {url}",
            config.label,
            i + 1,
            config.urls.len()
        );
        progress.set_message(format!(
            "[{}] downloading {}/{}",
            config.label,
            i + 1,
            config.urls.len()
        ));

        let bytes = retry::send_bytes(|| client.get(url)).await?;
        log::debug!("Downloaded {} bytes from {url}", bytes.len());

        let csv_bytes = if config.compressed == Some("gzip") {
            gunzip(&bytes)?
        } else {
            bytes
        };

        // Cap max_records per file by the remaining overall budget
        let remaining = options
            .limit
            .map(|l| l.saturating_sub(rows.len() as u64));
        let file_limit = match (config.max_records, remaining) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        let page = parse_csv(&csv_bytes, delimiter, file_limit)?;
        let count = page.len() as u64;
        progress.inc(count);
        rows.extend(page);

        log::info!(
            "[{}] CSV {}/{}: {count} rows (total so far: {})",
            config.label,
            i + 1,
            config.urls.len(),
            rows.len()
        );

        if let Some(limit) = options.limit
            && rows.len() as u64 >= limit
        {
            log::info!("[{}] Reached limit of {limit} rows", config.label);
            break;
        }
    }

    progress.finish(format!(
        "[{}] download complete -- {} rows",
        config.label,
        rows.len()
    ));

    Ok(rows)
}

/// Builds a [`reqwest::Client`] with the configured headers.
fn build_client(headers: &BTreeMap<String, String>) -> Result<reqwest::Client, SourceError> {
    let mut header_map = reqwest::header::HeaderMap::new();
    for (key, value) in headers {
        let name = reqwest::header::HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            SourceError::Config {
                message: format!("invalid header name '{key}': {e}"),
            }
        })?;
        let val =
            reqwest::header::HeaderValue::from_str(value).map_err(|e| SourceError::Config {
                message: format!("invalid header value '{value}': {e}"),
            })?;
        header_map.insert(name, val);
    }
    Ok(reqwest::Client::builder()
        .default_headers(header_map)
        .timeout(std::time::Duration::from_secs(300))
        .build()?)
}

/// Decompresses a gzip body.
fn gunzip(bytes: &[u8]) -> Result<Vec<u8>, SourceError> {
    let mut decoder = flate2::read::GzDecoder::new(bytes);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    log::debug!("Decompressed to {} bytes", decompressed.len());
    Ok(decompressed)
}

/// Parses CSV bytes into header-keyed JSON objects with trimmed string
/// values.
///
/// Short rows are padded with empty strings. A leading UTF-8 BOM is
/// stripped from the first header.
///
/// # Errors
///
/// Returns [`SourceError::Csv`] on malformed CSV or
/// [`SourceError::Config`] if there is no header row.
pub fn parse_csv(
    bytes: &[u8],
    delimiter: u8,
    max_records: Option<u64>,
) -> Result<Vec<serde_json::Value>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches(UTF8_BOM).trim().to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(SourceError::Config {
            message: "CSV file contains no header row".to_owned(),
        });
    }

    let mut rows: Vec<serde_json::Value> = Vec::new();

    for result in reader.records() {
        if let Some(max) = max_records
            && rows.len() as u64 >= max
        {
            log::info!("Reached max_records limit ({max}), stopping CSV parse");
            break;
        }

        let record = result?;
        let mut map = serde_json::Map::new();
        for (i, header) in headers.iter().enumerate() {
            let value = record.get(i).unwrap_or("").trim().to_owned();
            map.insert(header.clone(), serde_json::Value::String(value));
        }
        rows.push(serde_json::Value::Object(map));
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_keyed_rows() {
        let csv = b"Crash_Year,Loc_Suburb\n2021, Gympie \n2020,Nambour\n";
        let rows = parse_csv(csv, b',', None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Loc_Suburb"], "Gympie");
        assert_eq!(rows[1]["Crash_Year"], "2020");
    }

    #[test]
    fn strips_bom_from_first_header() {
        let csv = "\u{feff}Crash_Year,Loc_Suburb\n2021,Gympie\n";
        let rows = parse_csv(csv.as_bytes(), b',', None).unwrap();
        assert_eq!(rows[0]["Crash_Year"], "2021");
    }

    #[test]
    fn pads_short_rows() {
        let csv = b"a,b,c\n1,2\n";
        let rows = parse_csv(csv, b',', None).unwrap();
        assert_eq!(rows[0]["c"], "");
    }

    #[test]
    fn honors_max_records() {
        let csv = b"a\n1\n2\n3\n";
        let rows = parse_csv(csv, b',', Some(2)).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn honors_delimiter() {
        let csv = b"a;b\n1;2\n";
        let rows = parse_csv(csv, b';', None).unwrap();
        assert_eq!(rows[0]["b"], "2");
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(parse_csv(b"", b',', None).is_err());
    }

    #[test]
    fn gunzips_body() {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        use std::io::Write as _;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"a,b\n1,2\n").unwrap();
        let compressed = encoder.finish().unwrap();

        let plain = gunzip(&compressed).unwrap();
        assert_eq!(plain, b"a,b\n1,2\n");
    }
}
