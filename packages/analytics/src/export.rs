//! CSV export of assessment results.

use std::io::Write;
use std::path::Path;

use disaster_risk_analytics_models::{RiskAssessment, RiskFactor};
use serde::Serialize;

use crate::AnalysisError;

#[derive(Serialize)]
struct AssessmentRow<'a> {
    district: &'a str,
    risk_category: String,
    total_score: u32,
    elevation: u32,
    water_proximity: u32,
    slope: u32,
    historical: u32,
    rainfall: u32,
    drainage: u32,
    population: u64,
    population_at_risk: u64,
}

impl<'a> From<&'a RiskAssessment> for AssessmentRow<'a> {
    fn from(a: &'a RiskAssessment) -> Self {
        Self {
            district: &a.area_name,
            risk_category: a.risk_category.to_string(),
            total_score: a.total_score,
            elevation: a.factor_score(RiskFactor::Elevation),
            water_proximity: a.factor_score(RiskFactor::WaterProximity),
            slope: a.factor_score(RiskFactor::Slope),
            historical: a.factor_score(RiskFactor::Historical),
            rainfall: a.factor_score(RiskFactor::Rainfall),
            drainage: a.factor_score(RiskFactor::Drainage),
            population: a.population,
            population_at_risk: a.population_at_risk,
        }
    }
}

/// Writes one CSV row per assessment, with a header row.
///
/// # Errors
///
/// Returns [`AnalysisError::Csv`] if serialization or the writer fails.
pub fn write_assessments_csv<W: Write>(
    writer: W,
    assessments: &[RiskAssessment],
) -> Result<(), AnalysisError> {
    let mut csv = csv::Writer::from_writer(writer);
    for assessment in assessments {
        csv.serialize(AssessmentRow::from(assessment))?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes the assessments to a CSV file, creating parent directories.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns [`AnalysisError`] if the file cannot be created or written.
pub fn export_assessments_csv(
    path: &Path,
    assessments: &[RiskAssessment],
) -> Result<usize, AnalysisError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    write_assessments_csv(file, assessments)?;

    log::info!(
        "Exported {} assessments to {}",
        assessments.len(),
        path.display()
    );

    Ok(assessments.len())
}
