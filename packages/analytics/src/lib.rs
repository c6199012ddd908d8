#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Multi-factor disaster risk scoring.
//!
//! Six analyzers in [`factors`] each score an area 0 to 20 from one input
//! layer; [`evaluator::RiskEvaluator`] sums them into a categorized
//! [`RiskAssessment`](disaster_risk_analytics_models::RiskAssessment).
//! [`batch`] assesses every district with progress reporting and
//! [`export`] writes the results as CSV.

pub mod batch;
pub mod evaluator;
pub mod export;
pub mod factors;
pub mod layers;
pub mod progress;

use disaster_risk_database_models::StoreError;
use thiserror::Error;

pub use evaluator::RiskEvaluator;
pub use layers::AnalysisLayers;

/// Errors that can occur during risk analysis.
///
/// Analyzer failures never reach callers of the evaluator; they are logged
/// and scored as zero.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The data store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The area has no measurable extent.
    #[error("Area '{area}' has zero area")]
    EmptyGeometry {
        /// Name of the offending area.
        area: String,
    },

    /// A sample layer has no samples inside the area.
    #[error("No {layer} samples inside '{area}'")]
    NoSamples {
        /// Layer that was sampled.
        layer: String,
        /// Name of the area.
        area: String,
    },

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
