#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the crash map server.
//!
//! These types are serialized to JSON for the REST API. They are kept
//! separate from the dataset definition types so the API contract can
//! evolve independently of the TOML format.

use crash_map_crash_models::CrashRecord;
use crash_map_filter::{FilterCriteria, InvalidYearError, YearSelection};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rows returned by the crashes endpoint when no `limit` is given.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// A dataset the server knows about.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDataset {
    pub id: String,
    pub name: String,
    pub region: String,
    pub license_type: String,
    pub attribution: Option<String>,
    pub first_year: i32,
    pub last_year: i32,
    pub default_year: i32,
    /// Whether this is the dataset the server has loaded.
    pub active: bool,
    /// Rows loaded. Only set for the active dataset.
    pub record_count: Option<u64>,
}

/// Query parameters shared by the filtered endpoints.
///
/// Empty strings are treated as unset, matching what a blank select box
/// submits.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashQueryParams {
    /// `all` or a year. Absent means the dataset's default year.
    pub year: Option<String>,
    pub suburb: Option<String>,
    pub street: Option<String>,
    pub severity: Option<String>,
    /// Hide property-damage-only crashes. Defaults to `true`.
    pub exclude_property_damage: Option<bool>,
    /// Page size for the crashes endpoint.
    pub limit: Option<u32>,
    /// Page offset for the crashes endpoint.
    pub offset: Option<u32>,
}

/// Errors converting query parameters into filter criteria.
#[derive(Debug, Error)]
pub enum FilterParamError {
    /// The `year` parameter was neither `all` nor a year.
    #[error(transparent)]
    InvalidYear(#[from] InvalidYearError),
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

impl CrashQueryParams {
    /// Builds the [`FilterCriteria`] these parameters describe.
    ///
    /// # Errors
    ///
    /// Returns [`FilterParamError::InvalidYear`] if `year` is set and not
    /// parseable.
    pub fn criteria(&self, default_year: i32) -> Result<FilterCriteria, FilterParamError> {
        let year = match non_blank(self.year.as_deref()) {
            Some(raw) => raw.parse::<YearSelection>()?,
            None => YearSelection::Year(default_year),
        };

        Ok(FilterCriteria {
            year,
            suburb: non_blank(self.suburb.as_deref()),
            street: non_blank(self.street.as_deref()),
            severity: non_blank(self.severity.as_deref()),
            exclude_property_damage_only: self.exclude_property_damage.unwrap_or(true),
        })
    }
}

/// A page of filtered crash rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCrashPage {
    /// Rows matching the filter before paging.
    pub total: u64,
    pub offset: u32,
    pub limit: u32,
    pub crashes: Vec<CrashRecord>,
}

impl ApiCrashPage {
    /// Slices `rows` according to `offset` and `limit`.
    #[must_use]
    pub fn paginate(rows: Vec<CrashRecord>, offset: Option<u32>, limit: Option<u32>) -> Self {
        let total = rows.len() as u64;
        let offset = offset.unwrap_or(0);
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);

        let crashes = rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        Self {
            total,
            offset,
            limit,
            crashes,
        }
    }
}
