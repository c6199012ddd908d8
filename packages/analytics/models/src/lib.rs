#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Risk factor, category and assessment types.
//!
//! A [`RiskAssessment`] is the sum of six [`RiskFactorResult`]s, each scored
//! 0 to 20, mapped onto a [`RiskCategory`] by fixed thresholds.
//! [`AnalysisConfig`] selects which factors run and carries their
//! thresholds; it deserializes from TOML with every key optional.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use disaster_risk_geography_models::Area;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Upper bound of a single factor's score.
pub const MAX_FACTOR_SCORE: u32 = 20;

/// Diagnostic key/value pairs attached to a factor result.
pub type FactorDetail = BTreeMap<String, serde_json::Value>;

/// An input layer an analyzer reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum InputLayer {
    /// Elevation samples.
    Elevation,
    /// Water bodies.
    Water,
    /// Land-use parcels with drainage capacity.
    LandUse,
}

/// One of the six scored risk factors.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    /// Low-lying terrain.
    Elevation,
    /// Closeness to rivers and lakes.
    WaterProximity,
    /// Terrain slope.
    Slope,
    /// Past disasters in the area.
    Historical,
    /// Rainfall intensity.
    Rainfall,
    /// Share of poorly draining land.
    Drainage,
}

impl RiskFactor {
    /// All factors in evaluation order.
    pub const ALL: [Self; 6] = [
        Self::Elevation,
        Self::WaterProximity,
        Self::Slope,
        Self::Historical,
        Self::Rainfall,
        Self::Drainage,
    ];

    /// The layer this factor cannot be scored without, if any.
    ///
    /// Historical events come from the store and rainfall is a fixed
    /// estimate, so neither requires a layer.
    #[must_use]
    pub const fn required_layer(self) -> Option<InputLayer> {
        match self {
            Self::Elevation | Self::Slope => Some(InputLayer::Elevation),
            Self::WaterProximity => Some(InputLayer::Water),
            Self::Drainage => Some(InputLayer::LandUse),
            Self::Historical | Self::Rainfall => None,
        }
    }
}

/// Score and diagnostics for one factor of one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactorResult {
    /// Which factor was scored.
    pub factor: RiskFactor,
    /// Sub-score in `0..=20`.
    pub score: u32,
    /// Factor-specific diagnostics. Present even when the score is zero.
    pub detail: FactorDetail,
}

impl RiskFactorResult {
    /// A result with the given score and detail.
    #[must_use]
    pub const fn new(factor: RiskFactor, score: u32, detail: FactorDetail) -> Self {
        Self {
            factor,
            score,
            detail,
        }
    }

    /// A zero score with empty detail.
    #[must_use]
    pub const fn zero(factor: RiskFactor) -> Self {
        Self::new(factor, 0, BTreeMap::new())
    }

    /// A zero score whose detail carries a single `status` message.
    #[must_use]
    pub fn with_status(factor: RiskFactor, status: impl Into<String>) -> Self {
        let mut detail = BTreeMap::new();
        detail.insert(
            "status".to_string(),
            serde_json::Value::String(status.into()),
        );
        Self::new(factor, 0, detail)
    }
}

/// Overall risk category of an area, ordered from safest to riskiest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
pub enum RiskCategory {
    /// Total score below 20.
    Safe,
    /// Total score 20 to 39.
    Low,
    /// Total score 40 to 59.
    Moderate,
    /// Total score 60 to 79.
    High,
    /// Total score 80 or more.
    #[strum(serialize = "Very High")]
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl RiskCategory {
    /// Maps a total score onto a category.
    #[must_use]
    pub const fn from_score(total_score: u32) -> Self {
        match total_score {
            80.. => Self::VeryHigh,
            60.. => Self::High,
            40.. => Self::Moderate,
            20.. => Self::Low,
            _ => Self::Safe,
        }
    }

    /// Map color for the category.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::VeryHigh => "#8B0000",
            Self::High => "#FF0000",
            Self::Moderate => "#FFA500",
            Self::Low => "#FFFF00",
            Self::Safe => "#00FF00",
        }
    }

    /// Whether areas in this category need evacuation routes.
    #[must_use]
    pub const fn is_high_risk(self) -> bool {
        matches!(self, Self::High | Self::VeryHigh)
    }

    /// Whether areas in this category may serve as safe zones.
    #[must_use]
    pub const fn is_safe_zone_candidate(self) -> bool {
        matches!(self, Self::Low | Self::Safe)
    }

    /// Share of `population` considered at risk in this category.
    #[must_use]
    pub const fn population_at_risk(self, population: u64) -> u64 {
        match self {
            Self::VeryHigh | Self::High => population,
            Self::Moderate => population / 2,
            Self::Low | Self::Safe => 0,
        }
    }
}

/// Composite assessment of one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Identifier of the assessed area.
    pub area_id: i64,
    /// Name of the assessed area.
    pub area_name: String,
    /// Sum of all factor scores.
    pub total_score: u32,
    /// One result per factor, in [`RiskFactor::ALL`] order.
    pub factors: Vec<RiskFactorResult>,
    /// Category derived from `total_score`.
    pub risk_category: RiskCategory,
    /// Map color of `risk_category`.
    pub display_color: String,
    /// Resident population of the area.
    pub population: u64,
    /// Population considered at risk.
    pub population_at_risk: u64,
}

impl RiskAssessment {
    /// Score of a single factor, or 0 if it is missing.
    #[must_use]
    pub fn factor_score(&self, factor: RiskFactor) -> u32 {
        self.factors
            .iter()
            .find(|r| r.factor == factor)
            .map_or(0, |r| r.score)
    }
}

/// An area together with its assessment, as fed to the evacuation planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessedArea {
    /// The area that was assessed.
    pub area: Area,
    /// Its assessment.
    pub assessment: RiskAssessment,
}

impl AssessedArea {
    /// The assessment's category.
    #[must_use]
    pub const fn category(&self) -> RiskCategory {
        self.assessment.risk_category
    }
}

/// Which factors run and with which thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct AnalysisConfig {
    /// Score elevation.
    pub include_elevation: bool,
    /// Score water proximity.
    pub include_water_proximity: bool,
    /// Score slope.
    pub include_slope: bool,
    /// Score historical events.
    pub include_historical: bool,
    /// Score rainfall.
    pub include_rainfall: bool,
    /// Score drainage.
    pub include_drainage: bool,
    /// Elevation below which terrain counts as low-lying, in meters.
    pub elevation_threshold: f64,
    /// Outer water buffer distance in meters.
    pub water_buffer: f64,
    /// Annual rainfall considered extreme, in millimeters.
    pub rainfall_threshold: f64,
    /// Smallest area that can serve as a safe zone, in square kilometers.
    pub min_safe_zone_sqkm: f64,
    /// Date event ages are measured from. Defaults to today.
    pub reference_date: Option<NaiveDate>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            include_elevation: true,
            include_water_proximity: true,
            include_slope: true,
            include_historical: true,
            include_rainfall: true,
            include_drainage: true,
            elevation_threshold: 50.0,
            water_buffer: 500.0,
            rainfall_threshold: 100.0,
            min_safe_zone_sqkm: 1.0,
            reference_date: None,
        }
    }
}

impl AnalysisConfig {
    /// Parses a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the document is malformed or a key has the
    /// wrong type.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Whether `factor` is switched on.
    #[must_use]
    pub const fn is_enabled(&self, factor: RiskFactor) -> bool {
        match factor {
            RiskFactor::Elevation => self.include_elevation,
            RiskFactor::WaterProximity => self.include_water_proximity,
            RiskFactor::Slope => self.include_slope,
            RiskFactor::Historical => self.include_historical,
            RiskFactor::Rainfall => self.include_rainfall,
            RiskFactor::Drainage => self.include_drainage,
        }
    }

    /// The configured reference date, or today's local date.
    #[must_use]
    pub fn reference_date_or_today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}
