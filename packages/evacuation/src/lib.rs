#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Evacuation planning.
//!
//! Turns assessed areas and evacuation center data into an
//! [`EvacuationPlan`](disaster_risk_evacuation_models::EvacuationPlan):
//! safe zones, nearest-center routes for high-risk areas, a capacity gap
//! and ordered recommendations. Plans can be exported as flat text reports
//! and their routes persisted through the store.

pub mod persist;
pub mod planner;
pub mod report;

use disaster_risk_database_models::StoreError;
use thiserror::Error;

pub use persist::save_evacuation_routes_to_db;
pub use planner::{
    calculate_evacuation_capacity_gap, calculate_evacuation_routes, generate_evacuation_plan,
    identify_safe_zones,
};
pub use report::{export_evacuation_plan_report, parse_report_header, render_report};

/// Errors that can occur while planning.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The data store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
