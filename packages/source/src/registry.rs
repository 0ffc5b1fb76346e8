//! Dataset registry: every dataset definition embedded as TOML.
//!
//! Each `.toml` file in `packages/source/datasets/` is baked into the binary
//! at compile time via [`include_str!`]. Supporting a new revision of the
//! dataset means adding a TOML file and listing it below.

use crate::SourceError;
use crate::source_def::{DatasetDefinition, parse_dataset_toml};

/// TOML configs embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[(
    "qld_road_crash",
    include_str!("../datasets/qld_road_crash.toml"),
)];

/// Dataset used when none is requested.
pub const DEFAULT_DATASET_ID: &str = "qld_road_crash";

/// Returns all embedded dataset definitions.
///
/// # Panics
///
/// Panics if any embedded TOML config is malformed (the configs ship with
/// the binary, so this is caught by the registry tests).
#[must_use]
pub fn all_datasets() -> Vec<DatasetDefinition> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_dataset_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up an embedded dataset by id.
///
/// # Errors
///
/// Returns [`SourceError::Config`] if no dataset has the given id.
pub fn find_dataset(id: &str) -> Result<DatasetDefinition, SourceError> {
    all_datasets()
        .into_iter()
        .find(|d| d.id == id)
        .ok_or_else(|| SourceError::Config {
            message: format!("Unknown dataset: {id}"),
        })
}

/// Reads a dataset definition from a TOML file on disk.
///
/// # Errors
///
/// Returns [`SourceError::Io`] if the file cannot be read or
/// [`SourceError::Config`] if it does not parse.
pub fn load_dataset_file(path: &std::path::Path) -> Result<DatasetDefinition, SourceError> {
    let toml_str = std::fs::read_to_string(path)?;
    parse_dataset_toml(&toml_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_all_datasets() {
        assert_eq!(all_datasets().len(), DATASET_TOMLS.len());
    }

    #[test]
    fn dataset_ids_are_unique_and_match_file_names() {
        let datasets = all_datasets();
        let mut ids: Vec<&str> = datasets.iter().map(DatasetDefinition::id).collect();
        for ((name, _), id) in DATASET_TOMLS.iter().zip(&ids) {
            assert_eq!(name, id);
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), DATASET_TOMLS.len());
    }

    #[test]
    fn default_dataset_exists() {
        assert!(find_dataset(DEFAULT_DATASET_ID).is_ok());
    }

    #[test]
    fn unknown_dataset_is_config_error() {
        let err = find_dataset("atlantis").unwrap_err();
        assert!(matches!(err, SourceError::Config { .. }));
    }

    #[test]
    fn all_datasets_have_required_fields() {
        for dataset in &all_datasets() {
            assert!(!dataset.name.is_empty(), "{}: name is empty", dataset.id);
            assert!(!dataset.region.is_empty(), "{}: region is empty", dataset.id);
            assert!(
                !dataset.fields.latitude.is_empty() && !dataset.fields.longitude.is_empty(),
                "{}: coordinate columns missing",
                dataset.id
            );
        }
    }
}
