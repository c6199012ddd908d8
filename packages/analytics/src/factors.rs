//! The six risk factor analyzers.
//!
//! Every public analyzer returns a [`RiskFactorResult`] and never fails:
//! internal errors are logged and scored as zero with empty detail, so one
//! broken layer cannot abort a composite assessment.

use chrono::NaiveDate;
use disaster_risk_analytics_models::{FactorDetail, MAX_FACTOR_SCORE, RiskFactor, RiskFactorResult};
use disaster_risk_database_models::DisasterStore;
use disaster_risk_geography_models::{Area, LandUseParcel, WaterBody};
use disaster_risk_spatial::{PointIndex, area_sq_m, buffer, intersection_area, intersects};
use serde_json::Value;

use crate::AnalysisError;

/// Inner water buffer distance (m) and its weight.
const NEAR_BUFFER: (f64, f64) = (100.0, 20.0);
/// Middle water buffer distance (m) and its weight.
const MIDDLE_BUFFER: (f64, f64) = (300.0, 15.0);
/// Weight of the configurable outer water buffer.
const OUTER_BUFFER_WEIGHT: f64 = 10.0;

const DAYS_PER_YEAR: i64 = 365;

const PLACEHOLDER_SLOPE_SCORE: u32 = 10;
const PLACEHOLDER_MEAN_SLOPE: f64 = 5.0;
const PLACEHOLDER_RAINFALL_SCORE: u32 = 10;
const PLACEHOLDER_AVG_RAINFALL: u64 = 80;
const PLACEHOLDER_EXTREME_EVENTS: u64 = 5;

type FactorScore = (u32, FactorDetail);

/// Low-lying terrain from elevation samples inside the area.
#[must_use]
pub fn analyze_elevation(area: &Area, samples: &PointIndex<f64>, threshold: f64) -> RiskFactorResult {
    fold(
        RiskFactor::Elevation,
        area,
        elevation_score(area, samples, threshold),
    )
}

/// Overlap of the area with buffered water bodies.
#[must_use]
pub fn analyze_water_proximity(
    area: &Area,
    water_bodies: &[WaterBody],
    outer_buffer_m: f64,
) -> RiskFactorResult {
    fold(
        RiskFactor::WaterProximity,
        area,
        water_proximity_score(area, water_bodies, outer_buffer_m),
    )
}

/// Fixed slope estimate.
#[must_use]
pub fn analyze_slope() -> RiskFactorResult {
    let mut detail = FactorDetail::new();
    detail.insert("mean_slope".to_string(), Value::from(PLACEHOLDER_MEAN_SLOPE));
    RiskFactorResult::new(RiskFactor::Slope, PLACEHOLDER_SLOPE_SCORE, detail)
}

/// Past disasters located inside the area, weighted by age and severity.
#[must_use]
pub fn analyze_historical(
    area: &Area,
    store: &dyn DisasterStore,
    reference_date: NaiveDate,
) -> RiskFactorResult {
    fold(
        RiskFactor::Historical,
        area,
        historical_score(area, store, reference_date),
    )
}

/// Fixed rainfall estimate, annotated with the number of stations in the
/// area when a rainfall layer is available.
#[must_use]
pub fn analyze_rainfall(area: &Area, stations: Option<&PointIndex<f64>>) -> RiskFactorResult {
    let mut detail = FactorDetail::new();
    detail.insert(
        "avg_rainfall".to_string(),
        Value::from(PLACEHOLDER_AVG_RAINFALL),
    );
    detail.insert(
        "extreme_events".to_string(),
        Value::from(PLACEHOLDER_EXTREME_EVENTS),
    );
    if let Some(stations) = stations {
        let count = stations.within(&area.geometry).len();
        detail.insert("stations".to_string(), Value::from(count));
    }
    RiskFactorResult::new(RiskFactor::Rainfall, PLACEHOLDER_RAINFALL_SCORE, detail)
}

/// Share of the area covered by poorly draining land.
#[must_use]
pub fn analyze_drainage(area: &Area, parcels: &[LandUseParcel]) -> RiskFactorResult {
    fold(RiskFactor::Drainage, area, Ok(drainage_score(area, parcels)))
}

fn fold(
    factor: RiskFactor,
    area: &Area,
    result: Result<FactorScore, AnalysisError>,
) -> RiskFactorResult {
    match result {
        Ok((score, detail)) => RiskFactorResult::new(factor, score.min(MAX_FACTOR_SCORE), detail),
        Err(e) => {
            log::warn!("{factor} analysis failed for '{}': {e}", area.name);
            RiskFactorResult::zero(factor)
        }
    }
}

/// Truncates a weighted sum to an integer score in `0..=20`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn capped(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, f64::from(MAX_FACTOR_SCORE)) as u32
}

fn elevation_score(
    area: &Area,
    samples: &PointIndex<f64>,
    threshold: f64,
) -> Result<FactorScore, AnalysisError> {
    let values: Vec<f64> = samples.within(&area.geometry).into_iter().copied().collect();
    if values.is_empty() {
        return Err(AnalysisError::NoSamples {
            layer: "elevation".to_string(),
            area: area.name.clone(),
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);

    let score = if min < threshold && mean < threshold {
        20
    } else if min < threshold {
        15
    } else if mean < threshold * 1.5 {
        10
    } else if mean < threshold * 2.0 {
        5
    } else {
        0
    };

    let mut detail = FactorDetail::new();
    detail.insert("mean_elevation".to_string(), Value::from(mean));
    detail.insert("min_elevation".to_string(), Value::from(min));
    detail.insert("sample_count".to_string(), Value::from(values.len()));

    Ok((score, detail))
}

fn water_proximity_score(
    area: &Area,
    water_bodies: &[WaterBody],
    outer_buffer_m: f64,
) -> Result<FactorScore, AnalysisError> {
    let total_area = area_sq_m(&area.geometry);
    if total_area <= 0.0 {
        return Err(AnalysisError::EmptyGeometry {
            area: area.name.clone(),
        });
    }

    let bands = [NEAR_BUFFER, MIDDLE_BUFFER, (outer_buffer_m, OUTER_BUFFER_WEIGHT)];
    let mut weighted = 0.0;
    let mut qualifying = 0_u64;

    for water in water_bodies {
        for (distance, weight) in bands {
            let zone = buffer(&water.geometry, distance);
            if !intersects(&zone, &area.geometry) {
                continue;
            }
            let overlap = intersection_area(&zone, &area.geometry);
            log::debug!(
                "{} within {distance} m of '{}': {:.0} m² overlap",
                water.name,
                area.name,
                overlap
            );
            weighted += weight * overlap / total_area;
            qualifying += 1;
            break;
        }
    }

    let mut detail = FactorDetail::new();
    if qualifying == 0 {
        detail.insert(
            "status".to_string(),
            Value::from("No water bodies nearby"),
        );
        return Ok((0, detail));
    }

    detail.insert("risk_zones".to_string(), Value::from(qualifying));
    detail.insert("weighted_score".to_string(), Value::from(weighted));

    Ok((capped(weighted), detail))
}

fn historical_score(
    area: &Area,
    store: &dyn DisasterStore,
    reference_date: NaiveDate,
) -> Result<FactorScore, AnalysisError> {
    let events = store.get_historical_events_in_area(&area.geometry)?;

    let mut detail = FactorDetail::new();
    if events.is_empty() {
        detail.insert("event_count".to_string(), Value::from(0));
        return Ok((0, detail));
    }

    let mut total = 0.0;
    let mut recent = 0_u64;
    let mut severe = 0_u64;

    for event in &events {
        let age_days = (reference_date - event.event_date).num_days();
        let time_weight = if age_days < 5 * DAYS_PER_YEAR {
            recent += 1;
            1.5
        } else if age_days < 10 * DAYS_PER_YEAR {
            1.0
        } else {
            0.5
        };

        let severity = event.severity_class();
        if severity.is_severe() {
            severe += 1;
        }

        total += f64::from(severity.weight()) * time_weight;
    }

    detail.insert("total_events".to_string(), Value::from(events.len()));
    detail.insert("recent_events".to_string(), Value::from(recent));
    detail.insert("severe_events".to_string(), Value::from(severe));

    Ok((capped(total * 2.0), detail))
}

fn drainage_score(area: &Area, parcels: &[LandUseParcel]) -> FactorScore {
    let total_area = area_sq_m(&area.geometry);
    if total_area <= 0.0 {
        return (0, FactorDetail::new());
    }

    let poor_area: f64 = parcels
        .iter()
        .filter(|p| p.has_poor_drainage() && intersects(&p.geometry, &area.geometry))
        .map(|p| intersection_area(&p.geometry, &area.geometry))
        .sum();
    let percent = poor_area / total_area * 100.0;

    let score = if percent > 75.0 {
        20
    } else if percent > 50.0 {
        15
    } else if percent > 25.0 {
        10
    } else if percent > 10.0 {
        5
    } else {
        0
    };

    let mut detail = FactorDetail::new();
    detail.insert("poor_drainage_percent".to_string(), Value::from(percent));

    (score, detail)
}
