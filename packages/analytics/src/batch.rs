//! Batch assessment of districts and the areas inside them.

use disaster_risk_analytics_models::{AnalysisConfig, AssessedArea};
use disaster_risk_database_models::DisasterStore;
use disaster_risk_geography_models::District;

use crate::AnalysisError;
use crate::evaluator::RiskEvaluator;
use crate::layers::AnalysisLayers;
use crate::progress::ProgressCallback;

/// Assesses every district that has a boundary geometry.
///
/// Districts without geometry are skipped with a warning. Progress advances
/// once per district, skipped or not.
///
/// # Errors
///
/// Returns [`AnalysisError::Store`] if the district list cannot be loaded.
pub fn assess_districts(
    store: &dyn DisasterStore,
    layers: &AnalysisLayers,
    config: &AnalysisConfig,
    progress: &dyn ProgressCallback,
) -> Result<Vec<AssessedArea>, AnalysisError> {
    let districts = store.get_all_districts()?;
    progress.set_total(districts.len() as u64);

    let evaluator = RiskEvaluator::new(store, layers, config);
    let mut assessed = Vec::with_capacity(districts.len());

    for district in &districts {
        progress.set_message(district.name.clone());
        match district.to_area() {
            Some(area) => assessed.push(evaluator.assess_area(area)),
            None => log::warn!("Skipping district '{}': no boundary geometry", district.name),
        }
        progress.inc(1);
    }

    log::info!(
        "Assessed {} of {} districts",
        assessed.len(),
        districts.len()
    );
    progress.finish(format!("Assessed {} districts", assessed.len()));

    Ok(assessed)
}

/// Assesses the areas that make up one district for evacuation planning.
///
/// The district's mapped risk zones are used when it has any with
/// geometry; otherwise the district boundary itself is the only area.
///
/// # Errors
///
/// Returns [`AnalysisError::Store`] if the risk zones cannot be loaded.
pub fn assess_district_areas(
    store: &dyn DisasterStore,
    district: &District,
    layers: &AnalysisLayers,
    config: &AnalysisConfig,
) -> Result<Vec<AssessedArea>, AnalysisError> {
    let evaluator = RiskEvaluator::new(store, layers, config);

    let zones: Vec<_> = store
        .get_risk_zones(None, Some(district.id))?
        .iter()
        .filter_map(disaster_risk_geography_models::RiskZone::to_area)
        .collect();

    let areas = if zones.is_empty() {
        log::debug!(
            "District '{}' has no mapped risk zones; assessing the whole district",
            district.name
        );
        district.to_area().into_iter().collect()
    } else {
        zones
    };

    Ok(areas
        .into_iter()
        .map(|area| evaluator.assess_area(area))
        .collect())
}
