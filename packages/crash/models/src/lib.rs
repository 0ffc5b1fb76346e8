#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Road crash record, severity, and map geometry types.
//!
//! This crate defines the canonical [`CrashRecord`] shape that every dataset
//! revision is normalized into, the severity categories used to color map
//! markers, and the coordinate/bounding-box types shared by the marker
//! projector and the API.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Severity category recorded for a crash.
///
/// The dataset stores severity as free text; these are the categories the
/// publisher currently uses. Records keep the raw string, so values outside
/// this list survive normalization untouched.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum CrashSeverity {
    /// At least one person died within 30 days of the crash.
    #[strum(serialize = "Fatal")]
    #[serde(rename = "Fatal")]
    Fatal,
    /// At least one person was admitted to hospital.
    #[strum(serialize = "Hospitalisation")]
    #[serde(rename = "Hospitalisation")]
    Hospitalisation,
    /// Minor injuries not requiring medical treatment.
    #[strum(serialize = "Minor injury")]
    #[serde(rename = "Minor injury")]
    MinorInjury,
    /// Injuries treated without hospital admission.
    #[strum(serialize = "Medical treatment")]
    #[serde(rename = "Medical treatment")]
    MedicalTreatment,
    /// No injuries, vehicle or property damage only.
    #[strum(serialize = "Property damage only")]
    #[serde(rename = "Property damage only")]
    PropertyDamageOnly,
}

impl CrashSeverity {
    /// Parses a raw severity string. Matching is exact; unknown values
    /// return `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }

    /// Returns the marker color used for this severity.
    #[must_use]
    pub const fn marker_color(self) -> MarkerColor {
        match self {
            Self::Fatal => MarkerColor::Red,
            Self::Hospitalisation | Self::MinorInjury => MarkerColor::Orange,
            Self::MedicalTreatment | Self::PropertyDamageOnly => MarkerColor::Beige,
        }
    }

    /// Returns all variants of this enum, most severe first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Fatal,
            Self::Hospitalisation,
            Self::MedicalTreatment,
            Self::MinorInjury,
            Self::PropertyDamageOnly,
        ]
    }
}

/// Icon color of a map marker.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MarkerColor {
    /// Fatal crashes.
    Red,
    /// Hospitalisation and minor injury crashes.
    Orange,
    /// Everything else, including unrecognized severities.
    Beige,
}

impl MarkerColor {
    /// Maps a raw severity string to a marker color.
    ///
    /// Unrecognized severities fall back to [`MarkerColor::Beige`].
    #[must_use]
    pub fn for_severity(severity: &str) -> Self {
        CrashSeverity::parse(severity).map_or(Self::Beige, CrashSeverity::marker_color)
    }
}

/// A WGS84 position. Only constructed from two finite values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate when both components are present and finite.
    #[must_use]
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) if latitude.is_finite() && longitude.is_finite() => {
                Some(Self {
                    latitude,
                    longitude,
                })
            }
            _ => None,
        }
    }
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// A zero-area box around a single point.
    #[must_use]
    pub const fn around(point: Coordinate) -> Self {
        Self::new(
            point.longitude,
            point.latitude,
            point.longitude,
            point.latitude,
        )
    }

    /// Grows the box to include `point`.
    pub fn extend(&mut self, point: Coordinate) {
        self.west = self.west.min(point.longitude);
        self.east = self.east.max(point.longitude);
        self.south = self.south.min(point.latitude);
        self.north = self.north.max(point.latitude);
    }

    /// Smallest box containing every point, or `None` for an empty input.
    #[must_use]
    pub fn enclosing(points: impl IntoIterator<Item = Coordinate>) -> Option<Self> {
        let mut points = points.into_iter();
        let mut bbox = Self::around(points.next()?);
        for point in points {
            bbox.extend(point);
        }
        Some(bbox)
    }

    /// `(min latitude, min longitude)` corner.
    #[must_use]
    pub const fn south_west(&self) -> Coordinate {
        Coordinate {
            latitude: self.south,
            longitude: self.west,
        }
    }

    /// `(max latitude, max longitude)` corner.
    #[must_use]
    pub const fn north_east(&self) -> Coordinate {
        Coordinate {
            latitude: self.north,
            longitude: self.east,
        }
    }
}

/// One row of a road crash dataset, normalized to the canonical schema.
///
/// Coordinates are optional: rows without a usable location still count in
/// the filtered table and charts, they just never become map markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashRecord {
    /// Publisher's crash reference number.
    pub ref_number: String,
    /// Calendar year of the crash.
    pub year: i32,
    /// Month name as published (e.g. `"March"`).
    pub month: String,
    /// Weekday name as published (e.g. `"Saturday"`).
    pub day_of_week: String,
    /// Hour of day, 0-23.
    pub hour: Option<u8>,
    /// Raw severity text. See [`CrashSeverity`] for the known values.
    pub severity: String,
    /// Crash type description (e.g. `"Multi-Vehicle"`).
    pub crash_type: Option<String>,
    /// Street the crash was recorded on.
    pub street: String,
    /// Intersecting street, when the crash happened at an intersection.
    pub intersecting_street: Option<String>,
    /// Suburb or locality.
    pub suburb: String,
    /// Postcode of the locality.
    pub postcode: Option<String>,
    /// Local government area.
    pub local_government_area: Option<String>,
    /// Posted speed limit as published (e.g. `"60 km/h"`).
    pub speed_limit: Option<String>,
    /// Total casualties.
    pub casualty_total: Option<u32>,
    /// Total fatalities. Always `None` for dataset revisions that lack the
    /// column.
    pub fatality_total: Option<u32>,
    /// Latitude (WGS84). `None` when missing or unparseable.
    pub latitude: Option<f64>,
    /// Longitude (WGS84). `None` when missing or unparseable.
    pub longitude: Option<f64>,
}

impl CrashRecord {
    /// Returns the crash position when both coordinates are usable.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.latitude, self.longitude)
    }

    /// Parsed severity, if it is one of the known categories.
    #[must_use]
    pub fn known_severity(&self) -> Option<CrashSeverity> {
        CrashSeverity::parse(&self.severity)
    }

    /// Whether this crash caused property damage only.
    #[must_use]
    pub fn is_property_damage_only(&self) -> bool {
        self.known_severity() == Some(CrashSeverity::PropertyDamageOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_parse_is_exact() {
        assert_eq!(CrashSeverity::parse("Fatal"), Some(CrashSeverity::Fatal));
        assert_eq!(
            CrashSeverity::parse("Property damage only"),
            Some(CrashSeverity::PropertyDamageOnly)
        );
        assert_eq!(CrashSeverity::parse("fatal"), None);
        assert_eq!(CrashSeverity::parse("Minor Injury"), None);
    }

    #[test]
    fn severity_display_roundtrip() {
        for severity in CrashSeverity::all() {
            assert_eq!(CrashSeverity::parse(&severity.to_string()), Some(*severity));
        }
    }

    #[test]
    fn marker_color_mapping_is_total() {
        assert_eq!(MarkerColor::for_severity("Fatal"), MarkerColor::Red);
        assert_eq!(MarkerColor::for_severity("Hospitalisation"), MarkerColor::Orange);
        assert_eq!(MarkerColor::for_severity("Minor injury"), MarkerColor::Orange);
        assert_eq!(MarkerColor::for_severity("Medical treatment"), MarkerColor::Beige);
        assert_eq!(
            MarkerColor::for_severity("Property damage only"),
            MarkerColor::Beige
        );
        assert_eq!(MarkerColor::for_severity("Alien abduction"), MarkerColor::Beige);
        assert_eq!(MarkerColor::for_severity(""), MarkerColor::Beige);
    }

    #[test]
    fn marker_color_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&MarkerColor::Orange).unwrap(),
            "\"orange\""
        );
        assert_eq!(MarkerColor::Red.to_string(), "red");
    }

    #[test]
    fn coordinate_requires_both_finite_parts() {
        assert!(Coordinate::from_parts(Some(-27.0), Some(153.0)).is_some());
        assert!(Coordinate::from_parts(None, Some(153.0)).is_none());
        assert!(Coordinate::from_parts(Some(-27.0), None).is_none());
        assert!(Coordinate::from_parts(Some(f64::NAN), Some(153.0)).is_none());
        assert!(Coordinate::from_parts(Some(-27.0), Some(f64::INFINITY)).is_none());
    }

    #[test]
    fn zero_is_a_valid_coordinate() {
        let point = Coordinate::from_parts(Some(0.0), Some(0.0)).unwrap();
        assert!(point.latitude.abs() < f64::EPSILON);
    }

    #[test]
    fn enclosing_box_tracks_extremes() {
        let points = [
            Coordinate {
                latitude: -27.5,
                longitude: 153.0,
            },
            Coordinate {
                latitude: -26.1,
                longitude: 152.4,
            },
            Coordinate {
                latitude: -28.0,
                longitude: 153.6,
            },
        ];
        let bbox = BoundingBox::enclosing(points).unwrap();
        assert_eq!(
            bbox.south_west(),
            Coordinate {
                latitude: -28.0,
                longitude: 152.4
            }
        );
        assert_eq!(
            bbox.north_east(),
            Coordinate {
                latitude: -26.1,
                longitude: 153.6
            }
        );
    }

    #[test]
    fn enclosing_empty_is_none() {
        assert!(BoundingBox::enclosing(std::iter::empty()).is_none());
    }
}
