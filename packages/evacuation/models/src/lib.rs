#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Evacuation planning types.

use geo::{LineString, MultiPolygon};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Assumed walking speed for route time estimates.
pub const WALKING_SPEED_KMH: f64 = 5.0;

/// A low-risk area large enough to receive evacuees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeZone {
    /// Identifier of the source area.
    pub id: i64,
    /// Name of the source area.
    pub name: String,
    /// Zone geometry.
    pub geometry: MultiPolygon<f64>,
    /// Size in square kilometers.
    pub area_sqkm: f64,
}

/// A straight-line route from a high-risk area to its nearest center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvacuationRoute {
    /// Identifier of the area being evacuated.
    pub from_area_id: i64,
    /// Name of the area being evacuated.
    pub from_area_name: String,
    /// Identifier of the destination center.
    pub to_center_id: i64,
    /// Name of the destination center.
    pub to_center_name: String,
    /// Planar distance in kilometers.
    pub distance_km: f64,
    /// Walking time in whole minutes.
    pub estimated_time_minutes: u64,
    /// Area centroid to center point.
    pub geometry: LineString<f64>,
}

/// Walking time in minutes for `distance_km`, rounded to the nearest
/// minute.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn walking_minutes(distance_km: f64) -> u64 {
    (distance_km / WALKING_SPEED_KMH * 60.0).round().max(0.0) as u64
}

/// Population versus evacuation center capacity for a district.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityAnalysis {
    /// Population to shelter.
    pub population: u64,
    /// Number of evacuation centers.
    pub center_count: usize,
    /// Combined center capacity.
    pub total_capacity: u64,
    /// `population - total_capacity`; negative means surplus.
    pub capacity_gap: i64,
    /// Capacity as a percentage of population, 0 when population is 0.
    pub coverage_percent: f64,
}

impl CapacityAnalysis {
    /// Computes the analysis from a population and per-center capacities.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(population: u64, capacities: impl IntoIterator<Item = u64>) -> Self {
        let (center_count, total_capacity) = capacities
            .into_iter()
            .fold((0, 0_u64), |(n, sum), c| (n + 1, sum.saturating_add(c)));

        let gap = i128::from(population) - i128::from(total_capacity);
        let capacity_gap = i64::try_from(gap).unwrap_or(if gap < 0 { i64::MIN } else { i64::MAX });
        let coverage_percent = if population == 0 {
            0.0
        } else {
            total_capacity as f64 / population as f64 * 100.0
        };

        Self {
            population,
            center_count,
            total_capacity,
            capacity_gap,
            coverage_percent,
        }
    }
}

/// Whether a district's evacuation capacity covers its population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum PlanStatus {
    /// Capacity meets or exceeds population.
    Adequate,
    /// Capacity falls short of population.
    Insufficient,
}

impl PlanStatus {
    /// Status implied by a capacity gap.
    #[must_use]
    pub const fn from_gap(capacity_gap: i64) -> Self {
        if capacity_gap <= 0 {
            Self::Adequate
        } else {
            Self::Insufficient
        }
    }
}

/// A complete evacuation plan for one district.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvacuationPlan {
    /// District the plan covers.
    pub district: String,
    /// Capacity analysis.
    pub capacity: CapacityAnalysis,
    /// Routes for high-risk areas.
    pub routes: Vec<EvacuationRoute>,
    /// Safe zones in the district.
    pub safe_zones: Vec<SafeZone>,
    /// Ordered recommendations.
    pub recommendations: Vec<String>,
    /// Overall status.
    pub status: PlanStatus,
}

/// Outcome of writing a plan report. Never an error value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportStatus {
    /// Whether the report was written.
    pub success: bool,
    /// Destination on success, failure reason otherwise.
    pub message: String,
}

/// A route that could not be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSaveFailure {
    /// Area the route starts from.
    pub from_area_id: i64,
    /// Center the route ends at.
    pub to_center_id: i64,
    /// Store error message.
    pub error: String,
}

/// Outcome of persisting a batch of routes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSummary {
    /// Routes written.
    pub saved: usize,
    /// Routes that failed, in input order.
    pub failures: Vec<RouteSaveFailure>,
}

impl SaveSummary {
    /// Whether every route was written.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Title and district recovered from an exported report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeader {
    /// First line of the report.
    pub title: String,
    /// District name.
    pub district: String,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn capacity_gap_and_coverage() {
        let analysis = CapacityAnalysis::new(50_000, [10_000, 5_000]);
        assert_eq!(analysis.center_count, 2);
        assert_eq!(analysis.total_capacity, 15_000);
        assert_eq!(analysis.capacity_gap, 35_000);
        assert!((analysis.coverage_percent - 30.0).abs() < 1e-9);
    }

    #[test]
    fn zero_population_has_zero_coverage_and_surplus() {
        let analysis = CapacityAnalysis::new(0, [800]);
        assert!(analysis.coverage_percent.abs() < f64::EPSILON);
        assert_eq!(analysis.capacity_gap, -800);
        assert_eq!(PlanStatus::from_gap(analysis.capacity_gap), PlanStatus::Adequate);
    }

    #[test]
    fn capacity_gap_saturates_at_extremes() {
        let short = CapacityAnalysis::new(u64::MAX, [1]);
        assert_eq!(short.capacity_gap, i64::MAX);
        assert_eq!(PlanStatus::from_gap(short.capacity_gap), PlanStatus::Insufficient);

        let surplus = CapacityAnalysis::new(0, [u64::MAX]);
        assert_eq!(surplus.capacity_gap, i64::MIN);
        assert_eq!(PlanStatus::from_gap(surplus.capacity_gap), PlanStatus::Adequate);
    }

    #[rstest]
    #[case(-1, PlanStatus::Adequate)]
    #[case(0, PlanStatus::Adequate)]
    #[case(1, PlanStatus::Insufficient)]
    fn status_from_gap(#[case] gap: i64, #[case] expected: PlanStatus) {
        assert_eq!(PlanStatus::from_gap(gap), expected);
    }

    #[rstest]
    #[case(0.15, 2)]
    #[case(0.0, 0)]
    #[case(5.0, 60)]
    #[case(1.29, 15)]
    fn walking_time(#[case] km: f64, #[case] minutes: u64) {
        assert_eq!(walking_minutes(km), minutes);
    }
}
