#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! District, water body, disaster event and evacuation center types.
//!
//! These are the plain records read from the disaster data store. All
//! geometries are planar, in a projected CRS whose unit is the meter, so
//! areas are square meters and distances are meters.

use std::str::FromStr as _;

use chrono::NaiveDate;
use geo::{Geometry, MultiPolygon, Point};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use disaster_risk_spatial::SQ_METERS_PER_SQ_KM;

/// A polygonal area under analysis: a district or a risk zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    /// Store identifier of the district or zone.
    pub id: i64,
    /// Human-readable name.
    pub name: String,
    /// Boundary geometry.
    pub geometry: MultiPolygon<f64>,
    /// Resident population.
    pub population: u64,
    /// Area in square kilometers.
    pub area_sqkm: f64,
}

impl Area {
    /// Builds an area whose `area_sqkm` is measured from the geometry.
    #[must_use]
    pub fn from_geometry(
        id: i64,
        name: impl Into<String>,
        geometry: MultiPolygon<f64>,
        population: u64,
    ) -> Self {
        let area_sqkm = disaster_risk_spatial::area_sqkm(&geometry);
        Self {
            id,
            name: name.into(),
            geometry,
            population,
            area_sqkm,
        }
    }
}

/// An administrative boundary (district) row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct District {
    /// Boundary identifier.
    pub id: i64,
    /// District name (e.g. "Zomba").
    pub name: String,
    /// Boundary type (e.g. "district").
    pub district_type: Option<String>,
    /// Administrative code.
    pub code: Option<String>,
    /// Resident population.
    pub population: u64,
    /// Recorded area in square kilometers.
    pub area_sqkm: f64,
    /// Boundary geometry, if one is stored.
    pub geometry: Option<MultiPolygon<f64>>,
}

impl District {
    /// Converts the district into an [`Area`] for analysis, measuring its
    /// size from the boundary rather than the recorded `area_sqkm`.
    ///
    /// Returns `None` when the district has no boundary geometry.
    #[must_use]
    pub fn to_area(&self) -> Option<Area> {
        self.geometry.as_ref().map(|geometry| {
            Area::from_geometry(self.id, self.name.clone(), geometry.clone(), self.population)
        })
    }
}

/// Severity class of a historical disaster event.
///
/// Parsing is case-insensitive; unrecognized labels land in [`Self::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EventSeverity {
    /// Catastrophic event.
    Catastrophic,
    /// Severe event.
    Severe,
    /// Moderate event.
    Moderate,
    /// Any other label (minor, low, unknown, ...).
    #[strum(default)]
    Other(String),
}

impl EventSeverity {
    /// Scoring weight used by the historical risk factor.
    #[must_use]
    pub const fn weight(&self) -> u32 {
        match self {
            Self::Catastrophic => 5,
            Self::Severe => 4,
            Self::Moderate => 3,
            Self::Other(_) => 2,
        }
    }

    /// Whether the event counts towards the "severe events" tally.
    #[must_use]
    pub const fn is_severe(&self) -> bool {
        matches!(self, Self::Catastrophic | Self::Severe)
    }
}

/// A historical disaster event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisasterEvent {
    /// Event identifier.
    pub event_id: i64,
    /// Event type (e.g. "flood", "drought").
    pub event_type: String,
    /// Date the event occurred.
    pub event_date: NaiveDate,
    /// Raw severity label as stored.
    pub severity: String,
    /// Name of the affected district.
    pub affected_area: String,
    /// Number of casualties.
    pub casualties: u64,
    /// Number of displaced people.
    pub displaced_people: u64,
    /// Economic loss in USD.
    pub economic_loss_usd: f64,
    /// Free-form description.
    pub description: Option<String>,
    /// Event location, if geocoded.
    pub location: Option<Point<f64>>,
}

impl DisasterEvent {
    /// Parses the stored severity label.
    #[must_use]
    pub fn severity_class(&self) -> EventSeverity {
        EventSeverity::from_str(self.severity.trim())
            .unwrap_or_else(|_| EventSeverity::Other(self.severity.clone()))
    }
}

/// A river, lake or other water body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterBody {
    /// Water body identifier.
    pub id: i64,
    /// Name (e.g. "Shire River").
    pub name: String,
    /// Kind of water body (river, lake, ...).
    pub water_type: Option<String>,
    /// Whether the water body is known to flood.
    pub flood_prone: bool,
    /// District the water body is recorded under.
    pub district_id: Option<i64>,
    /// Length in kilometers for linear features.
    pub length_km: Option<f64>,
    /// Line or polygon geometry.
    pub geometry: Geometry<f64>,
}

/// A land-use polygon tagged with its drainage capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandUseParcel {
    /// Parcel identifier.
    pub id: i64,
    /// Land-use class (e.g. "wetland", "urban").
    pub land_use_type: Option<String>,
    /// Drainage capacity label ("poor", "moderate", "good").
    pub drainage_capacity: Option<String>,
    /// Parcel geometry.
    pub geometry: MultiPolygon<f64>,
}

impl LandUseParcel {
    /// Whether the parcel drains poorly.
    #[must_use]
    pub fn has_poor_drainage(&self) -> bool {
        self.drainage_capacity
            .as_deref()
            .is_some_and(|d| d.trim().eq_ignore_ascii_case("poor"))
    }
}

/// A point measurement: elevation in meters or annual rainfall in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSample {
    /// Sample location.
    pub location: Point<f64>,
    /// Measured value.
    pub value: f64,
}

/// An evacuation center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvacuationCenter {
    /// Center identifier.
    pub id: i64,
    /// Center name.
    pub name: String,
    /// Number of people the center can shelter.
    pub capacity: u64,
    /// People currently sheltered.
    pub current_occupancy: u64,
    /// Facilities description.
    pub facilities: Option<String>,
    /// Accessibility score.
    pub accessibility_score: Option<f64>,
    /// Owning district identifier.
    pub district_id: i64,
    /// Owning district name.
    pub district_name: String,
    /// Center location.
    pub location: Point<f64>,
}

/// A piece of critical infrastructure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Infrastructure {
    /// Infrastructure identifier.
    pub id: i64,
    /// Name.
    pub name: String,
    /// Kind (hospital, bridge, school, ...).
    pub infra_type: String,
    /// Capacity, if applicable.
    pub capacity: Option<u64>,
    /// Operational status label.
    pub operational_status: Option<String>,
    /// Vulnerability score.
    pub vulnerability_score: Option<f64>,
    /// Site location, if surveyed.
    pub location: Option<Point<f64>>,
}

/// A pre-mapped risk zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskZone {
    /// Zone identifier.
    pub id: i64,
    /// Zone name.
    pub name: String,
    /// Stored risk level label (extreme, high, medium, low).
    pub risk_level: String,
    /// Hazard type (flood, landslide, ...).
    pub risk_type: Option<String>,
    /// Population living in the zone.
    pub affected_population: u64,
    /// Stored risk score.
    pub risk_score: Option<f64>,
    /// Name of the district containing the zone.
    pub district_name: String,
    /// Zone geometry.
    pub geometry: Option<MultiPolygon<f64>>,
}

impl RiskZone {
    /// Converts the zone into an [`Area`], measuring its size from the
    /// geometry. Returns `None` when the zone has no geometry.
    #[must_use]
    pub fn to_area(&self) -> Option<Area> {
        self.geometry.as_ref().map(|geometry| {
            Area::from_geometry(
                self.id,
                self.name.clone(),
                geometry.clone(),
                self.affected_population,
            )
        })
    }
}

/// One census record for a district.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationRecord {
    /// Census year.
    pub census_year: i32,
    /// Total population.
    pub total_population: u64,
    /// Male population.
    pub male_population: Option<u64>,
    /// Female population.
    pub female_population: Option<u64>,
    /// Number of households.
    pub households: Option<u64>,
    /// Vulnerable population (elderly, disabled, children under five).
    pub vulnerable_population: Option<u64>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use geo::{Rect, coord};

    use super::*;

    fn square(size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![
            Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: size, y: size }).to_polygon(),
        ])
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!(
            EventSeverity::from_str("Catastrophic").unwrap(),
            EventSeverity::Catastrophic
        );
        assert_eq!(
            EventSeverity::from_str("SEVERE").unwrap(),
            EventSeverity::Severe
        );
        assert_eq!(
            EventSeverity::from_str("moderate").unwrap(),
            EventSeverity::Moderate
        );
        assert_eq!(
            EventSeverity::from_str("low").unwrap(),
            EventSeverity::Other("low".to_string())
        );
    }

    #[test]
    fn severity_weights() {
        assert_eq!(EventSeverity::Catastrophic.weight(), 5);
        assert_eq!(EventSeverity::Severe.weight(), 4);
        assert_eq!(EventSeverity::Moderate.weight(), 3);
        assert_eq!(EventSeverity::Other("minor".to_string()).weight(), 2);
        assert!(EventSeverity::Severe.is_severe());
        assert!(!EventSeverity::Moderate.is_severe());
    }

    #[test]
    fn area_measures_geometry_in_sq_km() {
        let area = Area::from_geometry(1, "Zone", square(2000.0), 10);
        assert!((area.area_sqkm - 4.0).abs() < 1e-9);
    }

    #[test]
    fn poor_drainage_is_case_insensitive() {
        let parcel = LandUseParcel {
            id: 1,
            land_use_type: None,
            drainage_capacity: Some(" Poor ".to_string()),
            geometry: square(1.0),
        };
        assert!(parcel.has_poor_drainage());
    }

    #[test]
    fn district_area_is_measured_from_boundary() {
        let district = District {
            id: 7,
            name: "Mulanje".to_string(),
            district_type: None,
            code: None,
            population: 500,
            area_sqkm: 0.0,
            geometry: Some(square(2000.0)),
        };

        let area = district.to_area().unwrap();
        assert_eq!(area.id, 7);
        assert_eq!(area.population, 500);
        assert!((area.area_sqkm - 4.0).abs() < 1e-9);
    }

    #[test]
    fn district_without_geometry_has_no_area() {
        let district = District {
            id: 1,
            name: "Chikwawa".to_string(),
            district_type: None,
            code: None,
            population: 100,
            area_sqkm: 1.0,
            geometry: None,
        };
        assert!(district.to_area().is_none());
    }
}
