//! Config-driven dataset definition.
//!
//! [`DatasetDefinition`] captures everything that differs between revisions
//! of the published crash dataset: where to download it, which years the
//! sidebar offers, and which CSV column feeds which [`CrashRecord`] field.
//! A single generic normalizer handles all of them.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crash_map_crash_models::CrashRecord;
use serde::Deserialize;

use crate::SourceError;
use crate::parsing::{non_empty, parse_coordinate, parse_count, parse_hour, parse_year};

// ── Top-level dataset definition ─────────────────────────────────────────

/// A complete, config-driven crash dataset definition.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier (e.g., `"qld_road_crash"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Region the dataset covers (e.g., `"Queensland"`).
    pub region: String,
    /// Licensing and attribution metadata.
    pub license: LicenseInfo,
    /// Optional URL to the human-readable data portal page.
    #[serde(default)]
    pub portal_url: Option<String>,
    /// Years offered for selection.
    pub years: YearRange,
    /// How to fetch the raw CSV.
    pub fetcher: FetcherConfig,
    /// Column name mappings for normalization.
    pub fields: FieldMapping,
}

/// Licensing and usage metadata for a dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct LicenseInfo {
    /// License type identifier (`"cc_by"`, `"public_domain"`, ...).
    pub license_type: String,
    /// Whether attribution is required when displaying the data.
    pub attribution_required: bool,
    /// Verbatim attribution text.
    pub attribution_text: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// The span of years a dataset covers, and the year selected by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct YearRange {
    /// Earliest selectable year.
    pub first: i32,
    /// Latest selectable year.
    pub last: i32,
    /// Year pre-selected when no year is requested.
    pub default: i32,
}

impl YearRange {
    /// Selectable years, newest first.
    #[must_use]
    pub fn descending(&self) -> Vec<i32> {
        (self.first..=self.last).rev().collect()
    }
}

// ── Fetcher config ───────────────────────────────────────────────────────

/// How to fetch the raw CSV rows.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetcherConfig {
    /// CSV file download (one URL per file; rows are concatenated).
    CsvDownload {
        /// URLs of CSV files to download.
        urls: Vec<String>,
        /// Field delimiter (default: comma).
        delimiter: Option<String>,
        /// Compression format: `"gzip"` or omit for uncompressed.
        compressed: Option<String>,
        /// Maximum records per CSV file.
        max_records: Option<u64>,
        /// Additional HTTP headers.
        #[serde(default)]
        headers: BTreeMap<String, String>,
    },
    /// A CSV already on disk.
    LocalFile {
        /// Path to the CSV file.
        path: PathBuf,
        /// Field delimiter (default: comma).
        delimiter: Option<String>,
    },
}

impl FetcherConfig {
    /// The delimiter byte configured for this fetcher.
    #[must_use]
    pub fn delimiter(&self) -> u8 {
        match self {
            Self::CsvDownload { delimiter, .. } | Self::LocalFile { delimiter, .. } => {
                delimiter_byte(delimiter.as_deref())
            }
        }
    }
}

/// Converts a configured delimiter string to its first byte, defaulting to
/// a comma.
#[must_use]
pub fn delimiter_byte(delimiter: Option<&str>) -> u8 {
    delimiter
        .and_then(|d| d.as_bytes().first().copied())
        .unwrap_or(b',')
}

// ── Field mapping ────────────────────────────────────────────────────────

/// Maps dataset-specific CSV column names to canonical crash fields.
///
/// Optional entries are for columns that some revisions of the dataset do
/// not publish; the corresponding record field is then always `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldMapping {
    /// Crash reference number column.
    pub ref_number: String,
    /// Crash year column.
    pub year: String,
    /// Month name column.
    pub month: String,
    /// Weekday name column.
    pub day_of_week: String,
    /// Hour-of-day column.
    pub hour: String,
    /// Severity column.
    pub severity: String,
    /// Crash type column.
    pub crash_type: Option<String>,
    /// Street column.
    pub street: String,
    /// Intersecting street column.
    pub intersecting_street: Option<String>,
    /// Suburb column.
    pub suburb: String,
    /// Postcode column.
    pub postcode: Option<String>,
    /// Local government area column.
    pub local_government_area: Option<String>,
    /// Speed limit column.
    pub speed_limit: Option<String>,
    /// Casualty total column.
    pub casualty_total: Option<String>,
    /// Fatality total column.
    pub fatality_total: Option<String>,
    /// Latitude column.
    pub latitude: String,
    /// Longitude column.
    pub longitude: String,
}

/// Gets a string value from a JSON object by field name.
fn get_str<'a>(record: &'a serde_json::Value, field: &str) -> Option<&'a str> {
    record.get(field)?.as_str()
}

/// Gets a trimmed, non-empty string from an optional column.
fn get_optional(record: &serde_json::Value, field: Option<&str>) -> Option<String> {
    field.and_then(|f| get_str(record, f)).and_then(non_empty)
}

/// Gets a trimmed string from a required column, empty when missing.
fn get_required(record: &serde_json::Value, field: &str) -> String {
    get_str(record, field).map(str::trim).unwrap_or_default().to_string()
}

impl DatasetDefinition {
    /// Returns the unique dataset identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable dataset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this revision publishes a fatality count column.
    #[must_use]
    pub const fn has_fatality_total(&self) -> bool {
        self.fields.fatality_total.is_some()
    }

    /// Normalizes raw CSV rows into [`CrashRecord`]s.
    ///
    /// Rows whose year is missing or unparseable are skipped with a
    /// warning. Everything else is kept; unparseable optional values become
    /// `None`.
    #[must_use]
    pub fn normalize_rows(&self, rows: &[serde_json::Value]) -> Vec<CrashRecord> {
        let fields = &self.fields;
        let mut records = Vec::with_capacity(rows.len());
        let mut skipped: u64 = 0;

        for row in rows {
            let ref_number = get_required(row, &fields.ref_number);

            let Some(year) = get_str(row, &fields.year).and_then(parse_year) else {
                log::warn!(
                    "[{}] Skipping crash {ref_number:?}: missing or invalid year",
                    self.id
                );
                skipped += 1;
                continue;
            };

            records.push(CrashRecord {
                ref_number,
                year,
                month: get_required(row, &fields.month),
                day_of_week: get_required(row, &fields.day_of_week),
                hour: get_str(row, &fields.hour).and_then(parse_hour),
                severity: get_required(row, &fields.severity),
                crash_type: get_optional(row, fields.crash_type.as_deref()),
                street: get_required(row, &fields.street),
                intersecting_street: get_optional(row, fields.intersecting_street.as_deref()),
                suburb: get_required(row, &fields.suburb),
                postcode: get_optional(row, fields.postcode.as_deref()),
                local_government_area: get_optional(row, fields.local_government_area.as_deref()),
                speed_limit: get_optional(row, fields.speed_limit.as_deref()),
                casualty_total: get_optional(row, fields.casualty_total.as_deref())
                    .as_deref()
                    .and_then(parse_count),
                fatality_total: get_optional(row, fields.fatality_total.as_deref())
                    .as_deref()
                    .and_then(parse_count),
                latitude: get_str(row, &fields.latitude).and_then(parse_coordinate),
                longitude: get_str(row, &fields.longitude).and_then(parse_coordinate),
            });
        }

        if skipped > 0 {
            log::warn!("[{}] Skipped {skipped} rows without a usable year", self.id);
        }

        records
    }
}

/// Parses a [`DatasetDefinition`] from a TOML string.
///
/// # Errors
///
/// Returns [`SourceError::Config`] if the TOML is malformed or missing
/// required fields, or if the year range is inconsistent.
pub fn parse_dataset_toml(toml_str: &str) -> Result<DatasetDefinition, SourceError> {
    let definition: DatasetDefinition =
        toml::de::from_str(toml_str).map_err(|e| SourceError::Config {
            message: e.to_string(),
        })?;

    let years = definition.years;
    if years.first > years.last || !(years.first..=years.last).contains(&years.default) {
        return Err(SourceError::Config {
            message: format!(
                "{}: default year {} outside {}..={}",
                definition.id, years.default, years.first, years.last
            ),
        });
    }

    Ok(definition)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
id = "minimal"
name = "Minimal"
region = "Nowhere"

[license]
license_type = "public_domain"
attribution_required = false

[years]
first = 2001
last = 2021
default = 2021

[fetcher]
type = "csv_download"
urls = ["https://example.invalid/crashes.csv"]

[fields]
ref_number = "Crash_Ref_Number"
year = "Crash_Year"
month = "Crash_Month"
day_of_week = "Crash_Day_Of_Week"
hour = "Crash_Hour"
severity = "Crash_Severity"
street = "Crash_Street"
intersecting_street = "Crash_Street_Intersecting"
suburb = "Loc_Suburb"
latitude = "Crash_Latitude"
longitude = "Crash_Longitude"
"#;

    fn minimal() -> DatasetDefinition {
        parse_dataset_toml(MINIMAL_TOML).unwrap()
    }

    #[test]
    fn parses_minimal_toml() {
        let def = minimal();
        assert_eq!(def.id(), "minimal");
        assert!(!def.has_fatality_total());
        assert_eq!(def.fetcher.delimiter(), b',');
        assert_eq!(def.years.descending().first(), Some(&2021));
        assert_eq!(def.years.descending().last(), Some(&2001));
        assert_eq!(def.years.descending().len(), 21);
    }

    #[test]
    fn rejects_default_year_outside_range() {
        let toml_str = MINIMAL_TOML.replace("default = 2021", "default = 1999");
        let err = parse_dataset_toml(&toml_str).unwrap_err();
        assert!(matches!(err, SourceError::Config { .. }));
    }

    #[test]
    fn rejects_missing_fields_table() {
        let toml_str = MINIMAL_TOML.split("[fields]").next().unwrap();
        assert!(parse_dataset_toml(toml_str).is_err());
    }

    #[test]
    fn normalizes_full_row() {
        let row = serde_json::json!({
            "Crash_Ref_Number": "42",
            "Crash_Year": "2021",
            "Crash_Month": "March",
            "Crash_Day_Of_Week": "Saturday",
            "Crash_Hour": "23",
            "Crash_Severity": "Fatal",
            "Crash_Street": "Bruce Hwy",
            "Crash_Street_Intersecting": "",
            "Loc_Suburb": "Gympie",
            "Crash_Latitude": "-26.19",
            "Crash_Longitude": "152.66",
        });
        let records = minimal().normalize_rows(&[row]);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.ref_number, "42");
        assert_eq!(record.year, 2021);
        assert_eq!(record.hour, Some(23));
        assert_eq!(record.severity, "Fatal");
        assert_eq!(record.intersecting_street, None);
        assert_eq!(record.crash_type, None);
        assert_eq!(record.fatality_total, None);
        assert!((record.latitude.unwrap() - -26.19).abs() < f64::EPSILON);
    }

    #[test]
    fn skips_rows_without_year() {
        let rows = [
            serde_json::json!({"Crash_Ref_Number": "1", "Crash_Year": ""}),
            serde_json::json!({"Crash_Ref_Number": "2", "Crash_Year": "2019"}),
        ];
        let records = minimal().normalize_rows(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ref_number, "2");
        assert_eq!(records[0].street, "");
    }

    #[test]
    fn nan_coordinates_become_none() {
        let row = serde_json::json!({
            "Crash_Year": "2020",
            "Crash_Latitude": "NaN",
            "Crash_Longitude": "153.1",
        });
        let records = minimal().normalize_rows(&[row]);
        assert_eq!(records[0].latitude, None);
        assert!(records[0].coordinate().is_none());
    }

    #[test]
    fn keeps_unknown_severity_verbatim() {
        let row = serde_json::json!({
            "Crash_Year": "2020",
            "Crash_Severity": "Something new",
        });
        let records = minimal().normalize_rows(&[row]);
        assert_eq!(records[0].severity, "Something new");
        assert!(records[0].known_severity().is_none());
    }

    #[test]
    fn parses_embedded_qld_toml() {
        let def = parse_dataset_toml(include_str!("../datasets/qld_road_crash.toml")).unwrap();
        assert_eq!(def.id(), "qld_road_crash");
        assert!(def.has_fatality_total());
        assert_eq!(def.years.default, 2021);
    }
}
