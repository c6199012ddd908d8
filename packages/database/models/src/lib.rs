#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Disaster data store contract and row types.
//!
//! [`DisasterStore`] is the read/write surface the risk engine and the
//! evacuation planner consume. The store is passed in explicitly as
//! `&dyn DisasterStore`; nothing holds a process-wide connection. The
//! `DuckDB`-backed implementation lives in `disaster_risk_database`. The
//! `test-utils` feature adds `memory::InMemoryStore`, a vector-backed store
//! for other crates' tests.

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

use disaster_risk_geography_models::{
    DisasterEvent, District, EvacuationCenter, Infrastructure, LandUseParcel, PopulationRecord,
    RiskZone, ValueSample, WaterBody,
};
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Errors surfaced by a [`DisasterStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The query or statement failed to execute.
    #[error("Query error: {message}")]
    Query {
        /// Description of what went wrong.
        message: String,
    },

    /// A stored value could not be converted into its model type.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// A bound parameter for [`DisasterStore::execute_write`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WriteValue {
    /// SQL `NULL`.
    Null,
    /// 64-bit integer.
    Int64(i64),
    /// 64-bit float.
    Real64(f64),
    /// Text.
    String(String),
}

/// Aggregated facts about one district.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictSummary {
    /// District name.
    pub district: String,
    /// Administrative code.
    pub code: Option<String>,
    /// Resident population.
    pub population: u64,
    /// Recorded area in square kilometers.
    pub area_sqkm: f64,
    /// Number of distinct water bodies in the district.
    pub water_body_count: u64,
    /// Number of historical disasters affecting the district.
    pub disaster_count: u64,
    /// Total casualties over all disasters.
    pub total_casualties: u64,
    /// Total people displaced over all disasters.
    pub total_displaced: u64,
    /// Total economic loss in USD.
    pub total_economic_loss: f64,
    /// Comma-separated distinct water body names, if any.
    pub water_bodies: Option<String>,
}

/// Historical flood risk label derived from event and river counts.
///
/// Displays as an upper-case label such as `"EXTREME RISK"`.
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
)]
#[strum(ascii_case_insensitive)]
pub enum FloodRiskLevel {
    /// No floods and no flood-prone water bodies.
    #[strum(serialize = "MINIMAL RISK")]
    Minimal,
    /// No floods, but at least one flood-prone water body.
    #[strum(serialize = "LOW RISK")]
    Low,
    /// Exactly one recorded flood.
    #[strum(serialize = "MEDIUM RISK")]
    Medium,
    /// Exactly two recorded floods.
    #[strum(serialize = "HIGH RISK")]
    High,
    /// Three or more recorded floods.
    #[strum(serialize = "EXTREME RISK")]
    Extreme,
}

impl FloodRiskLevel {
    /// Classifies a district from its flood event count and flood-prone
    /// water body count.
    #[must_use]
    pub const fn classify(flood_events: u64, flood_prone_waters: u64) -> Self {
        match flood_events {
            0 if flood_prone_waters > 0 => Self::Low,
            0 => Self::Minimal,
            1 => Self::Medium,
            2 => Self::High,
            _ => Self::Extreme,
        }
    }
}

/// A district with a flood history or flood-prone water bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloodProneDistrict {
    /// District identifier.
    pub district_id: i64,
    /// District name.
    pub district: String,
    /// Resident population.
    pub population: u64,
    /// Recorded area in square kilometers.
    pub area_sqkm: f64,
    /// Number of recorded flood events.
    pub flood_events: u64,
    /// Casualties over all flood events.
    pub casualties: u64,
    /// People displaced over all flood events.
    pub displaced: u64,
    /// Economic loss in millions of USD, rounded to two decimals.
    pub economic_loss_millions_usd: f64,
    /// Comma-separated names of flood-prone rivers and lakes.
    pub flood_prone_rivers: Option<String>,
    /// Number of flood-prone water bodies.
    pub flood_prone_waters: u64,
    /// Derived historical flood risk level.
    pub risk_level: FloodRiskLevel,
}

/// Which district a river or lake lies in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiverLocation {
    /// Water body name.
    pub water_name: String,
    /// District name.
    pub district_name: String,
    /// Kind of water body.
    pub water_type: Option<String>,
    /// Whether the water body is known to flood.
    pub flood_prone: bool,
    /// Length in kilometers.
    pub length_km: Option<f64>,
}

/// Read queries and the single write the disaster engine needs.
///
/// Implementations hold at most one in-flight query; callers must not use
/// one store from several threads at once. Layer loaders return `Ok(None)`
/// when the layer is absent, which the risk engine treats as "factor not
/// applicable" rather than an error.
pub trait DisasterStore {
    /// All districts, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn get_all_districts(&self) -> Result<Vec<District>, StoreError>;

    /// Aggregated facts for the district called `name`, or `None` if there
    /// is no such district.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn get_district_summary(&self, name: &str) -> Result<Option<DistrictSummary>, StoreError>;

    /// Historical events located inside `area`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn get_historical_events_in_area(
        &self,
        area: &MultiPolygon<f64>,
    ) -> Result<Vec<DisasterEvent>, StoreError>;

    /// Historical events recorded against the district called `name`,
    /// newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn get_historical_events_in_district(
        &self,
        name: &str,
    ) -> Result<Vec<DisasterEvent>, StoreError>;

    /// Evacuation centers, optionally restricted to one district.
    ///
    /// Filtered results are ordered by capacity descending; unfiltered
    /// results by district name, then capacity descending.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn get_evacuation_centers(
        &self,
        district_id: Option<i64>,
    ) -> Result<Vec<EvacuationCenter>, StoreError>;

    /// Districts with at least one flood or flood-prone water body, most
    /// flooded first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn get_flood_prone_districts(&self) -> Result<Vec<FloodProneDistrict>, StoreError>;

    /// Water bodies whose name contains `river_name` (case-insensitive),
    /// with the district they lie in.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn get_district_by_river(&self, river_name: &str) -> Result<Vec<RiverLocation>, StoreError>;

    /// Infrastructure in a district, ordered by type then name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn get_infrastructure_in_district(
        &self,
        district_id: i64,
    ) -> Result<Vec<Infrastructure>, StoreError>;

    /// Risk zones, optionally filtered by stored risk level and district,
    /// highest stored score first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn get_risk_zones(
        &self,
        risk_level: Option<&str>,
        district_id: Option<i64>,
    ) -> Result<Vec<RiskZone>, StoreError>;

    /// Census records for a district, newest census first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn get_population_data(&self, district_id: i64) -> Result<Vec<PopulationRecord>, StoreError>;

    /// Water body layer.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn get_water_bodies(&self) -> Result<Option<Vec<WaterBody>>, StoreError>;

    /// Land-use layer with drainage capacity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn get_land_use(&self) -> Result<Option<Vec<LandUseParcel>>, StoreError>;

    /// Elevation samples in meters.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn get_elevation_samples(&self) -> Result<Option<Vec<ValueSample>>, StoreError>;

    /// Annual rainfall samples in millimeters.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    fn get_rainfall_samples(&self) -> Result<Option<Vec<ValueSample>>, StoreError>;

    /// Executes one write statement and returns the number of affected
    /// rows. Each call stands alone; there is no surrounding transaction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the statement fails.
    fn execute_write(&self, statement: &str, params: &[WriteValue]) -> Result<usize, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flood_level_classification() {
        assert_eq!(FloodRiskLevel::classify(0, 0), FloodRiskLevel::Minimal);
        assert_eq!(FloodRiskLevel::classify(0, 2), FloodRiskLevel::Low);
        assert_eq!(FloodRiskLevel::classify(1, 0), FloodRiskLevel::Medium);
        assert_eq!(FloodRiskLevel::classify(2, 5), FloodRiskLevel::High);
        assert_eq!(FloodRiskLevel::classify(3, 0), FloodRiskLevel::Extreme);
        assert_eq!(FloodRiskLevel::classify(12, 0), FloodRiskLevel::Extreme);
    }

    #[test]
    fn flood_level_labels() {
        assert_eq!(FloodRiskLevel::Extreme.to_string(), "EXTREME RISK");
        assert_eq!(FloodRiskLevel::Minimal.to_string(), "MINIMAL RISK");
        assert_eq!(
            "medium risk".parse::<FloodRiskLevel>().unwrap(),
            FloodRiskLevel::Medium
        );
        assert!("SEVERE".parse::<FloodRiskLevel>().is_err());
    }
}
