#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map marker projection.
//!
//! [`project_markers`] turns a filtered crash subset into one colored
//! marker per locatable record, plus the bounding box the map viewport
//! should be fitted to.

use crash_map_crash_models::{BoundingBox, CrashRecord, MarkerColor};
use serde::{Deserialize, Serialize};

/// Controls which lines a marker popup contains and how absent values
/// render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupTemplate {
    /// Whether the `Fatality Total` line is rendered. Only datasets that
    /// carry a fatality column set this.
    pub include_fatality_total: bool,
    /// Text shown for an absent optional field.
    pub placeholder: String,
}

impl PopupTemplate {
    #[must_use]
    pub fn new(include_fatality_total: bool) -> Self {
        Self {
            include_fatality_total,
            ..Self::default()
        }
    }
}

impl Default for PopupTemplate {
    fn default() -> Self {
        Self {
            include_fatality_total: true,
            placeholder: "N/A".to_owned(),
        }
    }
}

/// One map marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerDescriptor {
    pub latitude: f64,
    pub longitude: f64,
    pub color: MarkerColor,
    /// Popup lines joined by `\n`.
    pub popup_text: String,
    pub ref_number: String,
}

impl MarkerDescriptor {
    /// The popup as HTML: each line escaped, lines joined by `<br>`.
    #[must_use]
    pub fn popup_html(&self) -> String {
        self.popup_text
            .lines()
            .map(escape_html)
            .collect::<Vec<_>>()
            .join("<br>")
    }
}

/// The result of a projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerSet {
    pub markers: Vec<MarkerDescriptor>,
    /// `None` when no marker was emitted.
    pub bounds: Option<BoundingBox>,
}

impl MarkerSet {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Renders the markers as a GeoJSON `FeatureCollection` of points.
    ///
    /// Each feature carries `color`, `popup` (HTML) and `refNumber`
    /// properties. The collection's `bbox` is set when bounds exist.
    #[must_use]
    pub fn to_geojson(&self) -> geojson::FeatureCollection {
        let features = self.markers.iter().map(marker_feature).collect();

        geojson::FeatureCollection {
            bbox: self
                .bounds
                .map(|b| vec![b.west, b.south, b.east, b.north]),
            features,
            foreign_members: None,
        }
    }
}

fn marker_feature(marker: &MarkerDescriptor) -> geojson::Feature {
    let mut properties = geojson::JsonObject::new();
    properties.insert(
        "color".to_owned(),
        serde_json::Value::String(marker.color.to_string()),
    );
    properties.insert(
        "popup".to_owned(),
        serde_json::Value::String(marker.popup_html()),
    );
    properties.insert(
        "refNumber".to_owned(),
        serde_json::Value::String(marker.ref_number.clone()),
    );

    geojson::Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![
            marker.longitude,
            marker.latitude,
        ]))),
        id: Some(geojson::feature::Id::String(marker.ref_number.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Projects `records` onto markers, in input order.
///
/// Records without a usable coordinate are skipped. Severity picks the
/// color; any value other than the known injury categories is beige.
#[must_use]
pub fn project_markers(records: &[CrashRecord], template: &PopupTemplate) -> MarkerSet {
    let mut markers = Vec::with_capacity(records.len());
    let mut bounds: Option<BoundingBox> = None;

    for record in records {
        let Some(point) = record.coordinate() else {
            continue;
        };

        match bounds.as_mut() {
            Some(b) => b.extend(point),
            None => bounds = Some(BoundingBox::around(point)),
        }

        markers.push(MarkerDescriptor {
            latitude: point.latitude,
            longitude: point.longitude,
            color: MarkerColor::for_severity(&record.severity),
            popup_text: popup_text(record, template),
            ref_number: record.ref_number.clone(),
        });
    }

    let skipped = records.len() - markers.len();
    if skipped > 0 {
        log::debug!("{skipped} record(s) without coordinates left off the map");
    }

    MarkerSet { markers, bounds }
}

/// Builds the newline-separated popup for one record.
#[must_use]
pub fn popup_text(record: &CrashRecord, template: &PopupTemplate) -> String {
    let na = template.placeholder.as_str();
    let or_na = |v: Option<&str>| v.unwrap_or(na).to_owned();
    let count = |v: Option<u32>| v.map_or_else(|| na.to_owned(), |n| n.to_string());

    let hour = record
        .hour
        .map_or_else(|| na.to_owned(), |h| h.to_string());

    let mut lines = vec![
        format!(
            "Crash time: Hour = {hour}, {} {} {}",
            record.day_of_week, record.month, record.year
        ),
        format!("Crash Severity: {}", record.severity),
        format!("Crash Type: {}", or_na(record.crash_type.as_deref())),
        format!(
            "Crash Street Location: {} {} {}",
            record.street,
            record.suburb,
            or_na(record.postcode.as_deref())
        ),
        format!(
            "Crash Street Intersecting: {}",
            record.intersecting_street.as_deref().unwrap_or("None")
        ),
        format!(
            "Local Government Area: {}",
            or_na(record.local_government_area.as_deref())
        ),
        format!("Speed Limit: {}", or_na(record.speed_limit.as_deref())),
        format!("Casualty Total: {}", count(record.casualty_total)),
    ];
    if template.include_fatality_total {
        lines.push(format!("Fatality Total: {}", count(record.fatality_total)));
    }
    lines.push(format!("Crash Ref Number: {}", record.ref_number));

    lines.join("\n")
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
