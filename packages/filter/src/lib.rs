#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crash dataset filtering.
//!
//! [`filter_crashes`] narrows a loaded table to the rows matching a
//! [`FilterCriteria`]. All comparisons are exact and the result keeps the
//! source row order. A criterion that matches nothing is not an error: the
//! result is empty and the miss is logged.

pub mod options;

use std::fmt;
use std::str::FromStr;

use crash_map_crash_models::CrashRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which year(s) to keep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum YearSelection {
    /// Every year in the dataset.
    #[default]
    All,
    /// A single calendar year.
    Year(i32),
}

impl YearSelection {
    /// The selected year, or `None` for [`YearSelection::All`].
    #[must_use]
    pub const fn year(self) -> Option<i32> {
        match self {
            Self::All => None,
            Self::Year(year) => Some(year),
        }
    }
}

impl fmt::Display for YearSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Year(year) => write!(f, "{year}"),
        }
    }
}

/// Error returned when a year selection string is neither `all` nor an
/// integer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid year {value:?}: expected \"all\" or a year")]
pub struct InvalidYearError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for YearSelection {
    type Err = InvalidYearError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        trimmed
            .parse::<i32>()
            .map(Self::Year)
            .map_err(|_| InvalidYearError {
                value: s.to_string(),
            })
    }
}

/// User-selected constraints on the crash table.
///
/// The [`Default`] value keeps every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Year to keep.
    pub year: YearSelection,
    /// Exact suburb to keep.
    pub suburb: Option<String>,
    /// Exact street to keep.
    pub street: Option<String>,
    /// Exact severity to keep.
    pub severity: Option<String>,
    /// Drop `"Property damage only"` crashes.
    pub exclude_property_damage_only: bool,
}

impl FilterCriteria {
    /// The dashboard's initial selection: one year, property-damage-only
    /// crashes hidden.
    #[must_use]
    pub const fn dashboard_defaults(year: i32) -> Self {
        Self {
            year: YearSelection::Year(year),
            suburb: None,
            street: None,
            severity: None,
            exclude_property_damage_only: true,
        }
    }

    /// Whether `record` passes every active predicate.
    #[must_use]
    pub fn matches(&self, record: &CrashRecord) -> bool {
        !(self.exclude_property_damage_only && record.is_property_damage_only())
            && self.year.year().is_none_or(|y| record.year == y)
            && self.suburb.as_deref().is_none_or(|s| record.suburb == s)
            && self.street.as_deref().is_none_or(|s| record.street == s)
            && self.severity.as_deref().is_none_or(|s| record.severity == s)
    }
}

/// Returns the rows of `records` that satisfy `criteria`, in source order.
///
/// Predicates are applied as successive passes: property damage, year,
/// suburb, street, severity. When the suburb or street pass removes every
/// remaining row, the miss is logged and an empty result is returned.
#[must_use]
pub fn filter_crashes(records: &[CrashRecord], criteria: &FilterCriteria) -> Vec<CrashRecord> {
    let mut subset: Vec<&CrashRecord> = records.iter().collect();

    if criteria.exclude_property_damage_only {
        subset.retain(|r| !r.is_property_damage_only());
    }

    if let Some(year) = criteria.year.year() {
        subset.retain(|r| r.year == year);
    }

    if let Some(suburb) = criteria.suburb.as_deref() {
        narrow(&mut subset, "suburb", suburb, |r| r.suburb == suburb);
    }

    if let Some(street) = criteria.street.as_deref() {
        narrow(&mut subset, "street", street, |r| r.street == street);
    }

    if let Some(severity) = criteria.severity.as_deref() {
        subset.retain(|r| r.severity == severity);
    }

    log::debug!(
        "Filtered {} crashes down to {} ({criteria:?})",
        records.len(),
        subset.len()
    );

    subset.into_iter().cloned().collect()
}

/// Retains rows matching `predicate`. Returns `true`, and logs the miss,
/// when a non-empty subset becomes empty.
fn narrow(
    subset: &mut Vec<&CrashRecord>,
    column: &str,
    value: &str,
    predicate: impl Fn(&CrashRecord) -> bool,
) -> bool {
    let before = subset.len();
    subset.retain(|r| predicate(*r));
    let missed = before > 0 && subset.is_empty();
    if missed {
        log::info!("{column} {value:?} not found");
    }
    missed
}
