//! Composite risk evaluation.

use chrono::NaiveDate;
use disaster_risk_analytics_models::{
    AnalysisConfig, AssessedArea, RiskAssessment, RiskCategory, RiskFactor, RiskFactorResult,
};
use disaster_risk_database_models::DisasterStore;
use disaster_risk_geography_models::Area;

use crate::factors;
use crate::layers::AnalysisLayers;

/// Scores areas against a fixed set of layers and configuration.
///
/// The reference date for event ages is fixed at construction, so repeated
/// assessments of the same area are identical.
pub struct RiskEvaluator<'a> {
    store: &'a dyn DisasterStore,
    layers: &'a AnalysisLayers,
    config: &'a AnalysisConfig,
    reference_date: NaiveDate,
}

impl<'a> RiskEvaluator<'a> {
    /// Creates an evaluator.
    #[must_use]
    pub fn new(
        store: &'a dyn DisasterStore,
        layers: &'a AnalysisLayers,
        config: &'a AnalysisConfig,
    ) -> Self {
        Self {
            store,
            layers,
            config,
            reference_date: config.reference_date_or_today(),
        }
    }

    /// Assesses one area across all six factors.
    #[must_use]
    pub fn assess(&self, area: &Area) -> RiskAssessment {
        let factors: Vec<RiskFactorResult> = RiskFactor::ALL
            .into_iter()
            .map(|factor| self.score_factor(factor, area))
            .collect();
        let total_score = factors.iter().map(|r| r.score).sum();
        let risk_category = RiskCategory::from_score(total_score);

        log::debug!(
            "Assessed '{}': total {total_score} ({risk_category})",
            area.name
        );

        RiskAssessment {
            area_id: area.id,
            area_name: area.name.clone(),
            total_score,
            factors,
            risk_category,
            display_color: risk_category.color().to_string(),
            population: area.population,
            population_at_risk: risk_category.population_at_risk(area.population),
        }
    }

    /// Assesses `area` and pairs it with its assessment.
    #[must_use]
    pub fn assess_area(&self, area: Area) -> AssessedArea {
        let assessment = self.assess(&area);
        AssessedArea { area, assessment }
    }

    fn score_factor(&self, factor: RiskFactor, area: &Area) -> RiskFactorResult {
        if !self.config.is_enabled(factor) {
            return RiskFactorResult::with_status(factor, "Factor disabled");
        }
        if let Some(layer) = factor.required_layer() {
            if !self.layers.has(layer) {
                return RiskFactorResult::with_status(factor, format!("No {layer} layer"));
            }
        }

        match factor {
            RiskFactor::Elevation => self.layers.elevation().map_or_else(
                || RiskFactorResult::zero(factor),
                |samples| {
                    factors::analyze_elevation(area, samples, self.config.elevation_threshold)
                },
            ),
            RiskFactor::WaterProximity => self.layers.water_bodies().map_or_else(
                || RiskFactorResult::zero(factor),
                |waters| factors::analyze_water_proximity(area, waters, self.config.water_buffer),
            ),
            RiskFactor::Slope => factors::analyze_slope(),
            RiskFactor::Historical => {
                factors::analyze_historical(area, self.store, self.reference_date)
            }
            RiskFactor::Rainfall => factors::analyze_rainfall(area, self.layers.rainfall()),
            RiskFactor::Drainage => self.layers.land_use().map_or_else(
                || RiskFactorResult::zero(factor),
                |parcels| factors::analyze_drainage(area, parcels),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use disaster_risk_database_models::memory::InMemoryStore;
    use disaster_risk_geography_models::{DisasterEvent, LandUseParcel, ValueSample, WaterBody};
    use geo::{Geometry, MultiPolygon, Point, Rect, coord};

    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![
            Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 }).to_polygon(),
        ])
    }

    fn area() -> Area {
        Area::from_geometry(7, "Chikwawa", rect(0.0, 0.0, 1000.0, 700.0), 100_000)
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            reference_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..AnalysisConfig::default()
        }
    }

    fn catastrophic_store() -> InMemoryStore {
        let mut store = InMemoryStore::default();
        store.events = (1..=3)
            .map(|id| DisasterEvent {
                event_id: id,
                event_type: "flood".to_string(),
                event_date: NaiveDate::from_ymd_opt(2023, 2, 1).unwrap(),
                severity: "catastrophic".to_string(),
                affected_area: "Chikwawa".to_string(),
                casualties: 1,
                displaced_people: 100,
                economic_loss_usd: 0.0,
                description: None,
                location: Some(Point::new(500.0, 350.0)),
            })
            .collect();
        store
    }

    fn full_layers() -> AnalysisLayers {
        let elevation = vec![
            ValueSample {
                location: Point::new(100.0, 100.0),
                value: 10.0,
            },
            ValueSample {
                location: Point::new(900.0, 600.0),
                value: 20.0,
            },
        ];
        // Lake buffered by 100 m covers 546 of 700 m: 20 * 0.78 = 15.6.
        let water = vec![WaterBody {
            id: 1,
            name: "Lake".to_string(),
            water_type: Some("lake".to_string()),
            flood_prone: true,
            district_id: Some(7),
            length_km: None,
            geometry: Geometry::MultiPolygon(rect(0.0, -1000.0, 1000.0, 446.0)),
        }];
        // 105 of 700 m is poorly drained: 15 percent.
        let land_use = vec![LandUseParcel {
            id: 1,
            land_use_type: Some("floodplain".to_string()),
            drainage_capacity: Some("poor".to_string()),
            geometry: rect(0.0, 0.0, 1000.0, 105.0),
        }];
        AnalysisLayers::new(Some(elevation), Some(water), Some(land_use), None)
    }

    #[test]
    fn total_is_exact_sum_of_factors() {
        let store = catastrophic_store();
        let layers = full_layers();
        let config = config();
        let assessment = RiskEvaluator::new(&store, &layers, &config).assess(&area());

        let scores: Vec<u32> = assessment.factors.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![20, 15, 10, 20, 10, 5]);
        assert_eq!(assessment.total_score, 80);
        assert_eq!(assessment.risk_category, RiskCategory::VeryHigh);
        assert_eq!(assessment.display_color, "#8B0000");
        assert_eq!(assessment.population_at_risk, 100_000);
    }

    #[test]
    fn missing_layers_score_zero_with_status() {
        let store = InMemoryStore::default();
        let layers = AnalysisLayers::default();
        let config = config();
        let assessment = RiskEvaluator::new(&store, &layers, &config).assess(&area());

        assert_eq!(assessment.factor_score(RiskFactor::Elevation), 0);
        assert_eq!(assessment.factor_score(RiskFactor::Slope), 0);
        assert_eq!(assessment.factor_score(RiskFactor::Rainfall), 10);
        assert_eq!(assessment.total_score, 10);
        assert_eq!(assessment.risk_category, RiskCategory::Safe);
        assert_eq!(
            assessment.factors[0].detail["status"],
            "No elevation layer"
        );
    }

    #[test]
    fn disabled_factors_are_skipped() {
        let store = catastrophic_store();
        let layers = full_layers();
        let config = AnalysisConfig {
            include_slope: false,
            include_rainfall: false,
            include_drainage: false,
            ..config()
        };
        let assessment = RiskEvaluator::new(&store, &layers, &config).assess(&area());

        assert_eq!(assessment.total_score, 55);
        assert_eq!(assessment.risk_category, RiskCategory::Moderate);
        assert_eq!(assessment.population_at_risk, 50_000);
        assert_eq!(assessment.factors[2].detail["status"], "Factor disabled");
    }

    #[test]
    fn store_failure_does_not_abort_assessment() {
        let mut store = InMemoryStore::default();
        store.fail_reads = true;
        let layers = full_layers();
        let config = config();
        let assessment = RiskEvaluator::new(&store, &layers, &config).assess(&area());

        assert_eq!(assessment.factor_score(RiskFactor::Historical), 0);
        assert_eq!(assessment.total_score, 60);
    }

    #[test]
    fn assessment_is_idempotent() {
        let store = catastrophic_store();
        let layers = full_layers();
        let config = config();
        let evaluator = RiskEvaluator::new(&store, &layers, &config);

        assert_eq!(evaluator.assess(&area()), evaluator.assess(&area()));
    }
}
