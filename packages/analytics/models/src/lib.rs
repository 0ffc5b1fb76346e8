#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Chart series types for the crash dashboard.
//!
//! Every series is computed over an already-filtered subset, so counts are
//! relative to the user's current selection rather than the whole dataset.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which dashboard chart a series belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChartKind {
    /// Streets ranked by crash count.
    TopStreets,
    /// Proportion of the subset in each severity.
    SeverityShare,
    /// Crashes per day of the week.
    CrashesPerDay,
    /// Crashes per hour of the day.
    CrashesPerHour,
}

/// Crash count for one street.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreetCount {
    pub street: String,
    pub count: u64,
}

/// Count and fraction of the subset for one severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityShare {
    pub severity: String,
    pub count: u64,
    /// In `0.0..=1.0`. Shares across a series sum to 1.
    pub share: f64,
}

/// Crash count for one day of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCount {
    /// The day as recorded in the dataset.
    pub day: String,
    pub count: u64,
}

/// Crash count for one hour of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourCount {
    /// `0..=23`.
    pub hour: u8,
    pub count: u64,
}

/// A titled chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart<T> {
    pub kind: ChartKind,
    pub title: String,
    pub points: Vec<T>,
}

/// All four dashboard charts for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCharts {
    /// Rows in the filtered subset.
    pub total: u64,
    pub top_streets: Chart<StreetCount>,
    pub severity_share: Chart<SeverityShare>,
    pub crashes_per_day: Chart<DayCount>,
    pub crashes_per_hour: Chart<HourCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_kind_round_trips_through_strings() {
        assert_eq!(ChartKind::TopStreets.to_string(), "top_streets");
        assert_eq!(
            "crashes_per_hour".parse::<ChartKind>().unwrap(),
            ChartKind::CrashesPerHour
        );
        assert!("pie".parse::<ChartKind>().is_err());
    }

    #[test]
    fn chart_serializes_camel_case() {
        let chart = Chart {
            kind: ChartKind::CrashesPerHour,
            title: "Hours".to_owned(),
            points: vec![HourCount { hour: 8, count: 3 }],
        };
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["kind"], "crashes_per_hour");
        assert_eq!(json["points"][0]["hour"], 8);
    }
}
