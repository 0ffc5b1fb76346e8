//! Choices offered to the user before filtering.
//!
//! The select lists are built from the full table, not the filtered
//! subset, so every suburb and street stays selectable regardless of the
//! current selection.

use std::collections::BTreeSet;

use crash_map_crash_models::CrashRecord;
use serde::{Deserialize, Serialize};

use crate::{FilterCriteria, YearSelection};

/// Every value a user can pick for each filter field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarOptions {
    /// `All` followed by each year, newest first.
    pub years: Vec<YearSelection>,
    /// Year selected when the user has not picked one.
    pub default_year: YearSelection,
    /// Distinct suburbs in first-appearance order.
    pub suburbs: Vec<String>,
    /// Distinct streets in first-appearance order.
    pub streets: Vec<String>,
    /// Distinct severities in first-appearance order.
    pub severities: Vec<String>,
}

impl SidebarOptions {
    /// Builds the option lists for a table.
    ///
    /// `years` are the selectable years (any order is accepted; they are
    /// listed newest first). `default_year` is pre-selected.
    #[must_use]
    pub fn from_records(years: &[i32], default_year: i32, records: &[CrashRecord]) -> Self {
        let mut sorted_years = years.to_vec();
        sorted_years.sort_unstable_by(|a, b| b.cmp(a));
        sorted_years.dedup();

        let mut year_choices = Vec::with_capacity(sorted_years.len() + 1);
        year_choices.push(YearSelection::All);
        year_choices.extend(sorted_years.into_iter().map(YearSelection::Year));

        Self {
            years: year_choices,
            default_year: YearSelection::Year(default_year),
            suburbs: distinct(records.iter().map(|r| r.suburb.as_str())),
            streets: distinct(records.iter().map(|r| r.street.as_str())),
            severities: distinct(records.iter().map(|r| r.severity.as_str())),
        }
    }
}

/// Unique values in first-appearance order.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(String::from)
        .collect()
}

/// The first `limit` rows of the selected year, in table order.
///
/// Only the year and the property-damage toggle of `criteria` apply; the
/// suburb, street and severity selections do not narrow the preview.
#[must_use]
pub fn preview<'a>(
    records: &'a [CrashRecord],
    criteria: &FilterCriteria,
    limit: usize,
) -> Vec<&'a CrashRecord> {
    records
        .iter()
        .filter(|r| !(criteria.exclude_property_damage_only && r.is_property_damage_only()))
        .filter(|r| criteria.year.year().is_none_or(|y| r.year == y))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::crash;

    fn table() -> Vec<CrashRecord> {
        vec![
            crash("1", 2021, "Nambour", "Main St", "Fatal"),
            crash("2", 2020, "Gympie", "Main St", "Minor injury"),
            crash("3", 2021, "Nambour", "High St", "Fatal"),
            crash("4", 2019, "Cooroy", "Low St", "Hospitalisation"),
        ]
    }

    #[test]
    fn lists_years_newest_first_after_all() {
        let options = SidebarOptions::from_records(&[2019, 2021, 2020], 2021, &table());
        assert_eq!(
            options.years,
            [
                YearSelection::All,
                YearSelection::Year(2021),
                YearSelection::Year(2020),
                YearSelection::Year(2019),
            ]
        );
        assert_eq!(options.default_year, YearSelection::Year(2021));
    }

    #[test]
    fn lists_distinct_values_in_first_appearance_order() {
        let options = SidebarOptions::from_records(&[2021], 2021, &table());
        assert_eq!(options.suburbs, ["Nambour", "Gympie", "Cooroy"]);
        assert_eq!(options.streets, ["Main St", "High St", "Low St"]);
        assert_eq!(options.severities, ["Fatal", "Minor injury", "Hospitalisation"]);
    }

    #[test]
    fn empty_table_still_offers_years() {
        let options = SidebarOptions::from_records(&[2020, 2021], 2021, &[]);
        assert_eq!(options.years.len(), 3);
        assert!(options.suburbs.is_empty());
    }

    fn year_only(year: YearSelection, exclude_property_damage_only: bool) -> FilterCriteria {
        FilterCriteria {
            year,
            exclude_property_damage_only,
            ..FilterCriteria::default()
        }
    }

    #[test]
    fn preview_takes_first_rows_of_year() {
        let t = table();
        let rows = preview(&t, &year_only(YearSelection::Year(2021), true), 5);
        let refs: Vec<&str> = rows.iter().map(|r| r.ref_number.as_str()).collect();
        assert_eq!(refs, ["1", "3"]);

        assert_eq!(preview(&t, &year_only(YearSelection::All, true), 2).len(), 2);
        assert!(preview(&t, &year_only(YearSelection::Year(1999), true), 5).is_empty());
    }

    #[test]
    fn preview_drops_property_damage_only_when_excluded() {
        let t = vec![
            crash("1", 2021, "Nambour", "Main St", "Property damage only"),
            crash("2", 2021, "Nambour", "Main St", "Fatal"),
        ];

        let rows = preview(&t, &year_only(YearSelection::Year(2021), true), 5);
        let refs: Vec<&str> = rows.iter().map(|r| r.ref_number.as_str()).collect();
        assert_eq!(refs, ["2"]);

        let rows = preview(&t, &year_only(YearSelection::Year(2021), false), 5);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn preview_ignores_location_and_severity() {
        let t = table();
        let criteria = FilterCriteria {
            suburb: Some("Gympie".to_string()),
            street: Some("Nowhere Rd".to_string()),
            severity: Some("Minor injury".to_string()),
            ..year_only(YearSelection::Year(2021), true)
        };
        assert_eq!(preview(&t, &criteria, 5).len(), 2);
    }
}
