#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard chart aggregations.
//!
//! Each function takes a filtered subset and returns one chart series.
//! [`summarize`] bundles all four with their titles.

use std::collections::BTreeMap;

use chrono::Weekday;
use crash_map_analytics_models::{
    Chart, ChartKind, DashboardCharts, DayCount, HourCount, SeverityShare, StreetCount,
};
use crash_map_crash_models::CrashRecord;
use crash_map_filter::{FilterCriteria, YearSelection};

/// Number of streets shown in the top streets chart.
pub const TOP_STREETS_LIMIT: usize = 10;

/// Counts occurrences of each key, keyed in sorted order.
fn tally<'a>(keys: impl Iterator<Item = &'a str>) -> BTreeMap<&'a str, u64> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Sorts descending by count. The input is already sorted by name, and the
/// sort is stable, so ties stay alphabetical.
fn by_count_desc(counts: BTreeMap<&str, u64>) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> = counts
        .into_iter()
        .map(|(k, n)| (k.to_owned(), n))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
}

/// The `limit` streets with the most crashes.
#[must_use]
pub fn top_streets(records: &[CrashRecord], limit: usize) -> Vec<StreetCount> {
    by_count_desc(tally(records.iter().map(|r| r.street.as_str())))
        .into_iter()
        .take(limit)
        .map(|(street, count)| StreetCount { street, count })
        .collect()
}

/// Count and fraction of the subset for each severity, most common first.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn severity_share(records: &[CrashRecord]) -> Vec<SeverityShare> {
    let total = records.len();
    by_count_desc(tally(records.iter().map(|r| r.severity.as_str())))
        .into_iter()
        .map(|(severity, count)| SeverityShare {
            severity,
            count,
            share: count as f64 / total as f64,
        })
        .collect()
}

/// Sort key placing weekdays Monday first and anything unrecognized last.
fn weekday_rank(day: &str) -> Option<u32> {
    day.trim()
        .parse::<Weekday>()
        .ok()
        .map(|d| d.num_days_from_monday())
}

/// Crashes per day of the week, Monday through Sunday.
///
/// Days that are not weekday names sort after Sunday, alphabetically. Days
/// with no crashes are omitted.
#[must_use]
pub fn crashes_per_day(records: &[CrashRecord]) -> Vec<DayCount> {
    let mut days: Vec<DayCount> = tally(records.iter().map(|r| r.day_of_week.as_str()))
        .into_iter()
        .map(|(day, count)| DayCount {
            day: day.to_owned(),
            count,
        })
        .collect();

    let unrecognized = days
        .iter()
        .filter(|d| weekday_rank(&d.day).is_none())
        .count();
    if unrecognized > 0 {
        log::debug!("{unrecognized} unrecognized day-of-week value(s)");
    }

    days.sort_by_key(|d| weekday_rank(&d.day).unwrap_or(u32::MAX));
    days
}

/// Crashes per hour of the day, ascending. Rows without an hour are
/// skipped.
#[must_use]
pub fn crashes_per_hour(records: &[CrashRecord]) -> Vec<HourCount> {
    let mut counts: BTreeMap<u8, u64> = BTreeMap::new();
    for hour in records.iter().filter_map(|r| r.hour) {
        *counts.entry(hour).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(hour, count)| HourCount { hour, count })
        .collect()
}

/// The chart title for the current selection.
///
/// Unset selection parts are left out rather than leaving gaps.
#[must_use]
pub fn chart_title(kind: ChartKind, criteria: &FilterCriteria) -> String {
    let prefix = match kind {
        ChartKind::TopStreets => "Roads with the most car crashes in",
        ChartKind::SeverityShare => return "Crash Severity".to_owned(),
        ChartKind::CrashesPerDay => "Number of crashes per day of the week in",
        ChartKind::CrashesPerHour => "Number of crashes per hour of the day in",
    };

    let year = match criteria.year {
        YearSelection::All => "All".to_owned(),
        YearSelection::Year(y) => y.to_string(),
    };

    [
        Some(prefix),
        criteria.street.as_deref(),
        criteria.suburb.as_deref(),
        Some(year.as_str()),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.trim().is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

fn chart<T>(kind: ChartKind, criteria: &FilterCriteria, points: Vec<T>) -> Chart<T> {
    Chart {
        kind,
        title: chart_title(kind, criteria),
        points,
    }
}

/// Computes every dashboard chart for a filtered subset.
#[must_use]
pub fn summarize(records: &[CrashRecord], criteria: &FilterCriteria) -> DashboardCharts {
    DashboardCharts {
        total: records.len() as u64,
        top_streets: chart(
            ChartKind::TopStreets,
            criteria,
            top_streets(records, TOP_STREETS_LIMIT),
        ),
        severity_share: chart(ChartKind::SeverityShare, criteria, severity_share(records)),
        crashes_per_day: chart(ChartKind::CrashesPerDay, criteria, crashes_per_day(records)),
        crashes_per_hour: chart(
            ChartKind::CrashesPerHour,
            criteria,
            crashes_per_hour(records),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crash(street: &str, severity: &str, day: &str, hour: Option<u8>) -> CrashRecord {
        CrashRecord {
            ref_number: "1".to_owned(),
            year: 2021,
            month: "March".to_owned(),
            day_of_week: day.to_owned(),
            hour,
            severity: severity.to_owned(),
            crash_type: None,
            street: street.to_owned(),
            intersecting_street: None,
            suburb: "Nambour".to_owned(),
            postcode: None,
            local_government_area: None,
            speed_limit: None,
            casualty_total: None,
            fatality_total: None,
            latitude: Some(-27.0),
            longitude: Some(153.0),
        }
    }

    #[test]
    fn ranks_streets_by_count_then_name() {
        let records = vec![
            crash("B St", "Fatal", "Monday", None),
            crash("A St", "Fatal", "Monday", None),
            crash("C St", "Fatal", "Monday", None),
            crash("C St", "Fatal", "Monday", None),
            crash("B St", "Fatal", "Monday", None),
            crash("D St", "Fatal", "Monday", None),
        ];
        let top = top_streets(&records, 3);
        let names: Vec<(&str, u64)> = top.iter().map(|s| (s.street.as_str(), s.count)).collect();
        assert_eq!(names, [("B St", 2), ("C St", 2), ("A St", 1)]);
    }

    #[test]
    fn severity_shares_sum_to_one() {
        let records = vec![
            crash("A", "Fatal", "Monday", None),
            crash("A", "Minor injury", "Monday", None),
            crash("A", "Minor injury", "Monday", None),
            crash("A", "Hospitalisation", "Monday", None),
        ];
        let shares = severity_share(&records);
        assert_eq!(shares[0].severity, "Minor injury");
        assert_eq!(shares[0].count, 2);
        assert!((shares[0].share - 0.5).abs() < f64::EPSILON);

        let sum: f64 = shares.iter().map(|s| s.share).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn days_are_ordered_monday_first() {
        let records = vec![
            crash("A", "Fatal", "Sunday", None),
            crash("A", "Fatal", "Wednesday", None),
            crash("A", "Fatal", "Monday", None),
            crash("A", "Fatal", "Unknown", None),
            crash("A", "Fatal", "Sunday", None),
        ];
        let days: Vec<(String, u64)> = crashes_per_day(&records)
            .into_iter()
            .map(|d| (d.day, d.count))
            .collect();
        assert_eq!(
            days,
            [
                ("Monday".to_owned(), 1),
                ("Wednesday".to_owned(), 1),
                ("Sunday".to_owned(), 2),
                ("Unknown".to_owned(), 1),
            ]
        );
    }

    #[test]
    fn hours_ascend_and_skip_missing() {
        let records = vec![
            crash("A", "Fatal", "Monday", Some(17)),
            crash("A", "Fatal", "Monday", None),
            crash("A", "Fatal", "Monday", Some(8)),
            crash("A", "Fatal", "Monday", Some(17)),
        ];
        assert_eq!(
            crashes_per_hour(&records),
            [
                HourCount { hour: 8, count: 1 },
                HourCount { hour: 17, count: 2 },
            ]
        );
    }

    #[test]
    fn titles_include_only_set_parts() {
        let criteria = FilterCriteria {
            year: YearSelection::Year(2021),
            suburb: Some("Nambour".to_owned()),
            ..FilterCriteria::default()
        };
        assert_eq!(
            chart_title(ChartKind::TopStreets, &criteria),
            "Roads with the most car crashes in Nambour 2021"
        );
        assert_eq!(
            chart_title(ChartKind::CrashesPerHour, &FilterCriteria::default()),
            "Number of crashes per hour of the day in All"
        );
        assert_eq!(
            chart_title(ChartKind::SeverityShare, &criteria),
            "Crash Severity"
        );
    }

    #[test]
    fn empty_subset_yields_empty_series() {
        let charts = summarize(&[], &FilterCriteria::default());
        assert_eq!(charts.total, 0);
        assert!(charts.top_streets.points.is_empty());
        assert!(charts.severity_share.points.is_empty());
        assert!(charts.crashes_per_day.points.is_empty());
        assert!(charts.crashes_per_hour.points.is_empty());
    }

    #[test]
    fn summary_caps_top_streets() {
        let streets: Vec<String> = (0..15).map(|i| format!("Street {i:02}")).collect();
        let records: Vec<CrashRecord> = streets
            .iter()
            .map(|s| crash(s, "Fatal", "Friday", Some(1)))
            .collect();
        let charts = summarize(&records, &FilterCriteria::default());
        assert_eq!(charts.total, 15);
        assert_eq!(charts.top_streets.points.len(), TOP_STREETS_LIMIT);
        assert_eq!(charts.top_streets.kind, ChartKind::TopStreets);
    }
}
