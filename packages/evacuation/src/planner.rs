//! Safe zones, routes, capacity gaps and plan assembly.

use disaster_risk_analytics_models::AssessedArea;
use disaster_risk_database_models::DisasterStore;
use disaster_risk_evacuation_models::{
    CapacityAnalysis, EvacuationPlan, EvacuationRoute, PlanStatus, SafeZone, walking_minutes,
};
use disaster_risk_geography_models::{Area, District, EvacuationCenter};
use disaster_risk_spatial::{centroid, meters_to_km, planar_distance_m, straight_line};
use geo::Point;

use crate::PlanError;

/// Low and safe areas at least `min_area_sqkm` in size.
pub fn identify_safe_zones(
    areas: &[AssessedArea],
    min_area_sqkm: f64,
) -> impl Iterator<Item = SafeZone> + '_ {
    areas
        .iter()
        .filter(move |a| {
            a.category().is_safe_zone_candidate() && a.area.area_sqkm >= min_area_sqkm
        })
        .map(|a| SafeZone {
            id: a.area.id,
            name: a.area.name.clone(),
            geometry: a.area.geometry.clone(),
            area_sqkm: a.area.area_sqkm,
        })
}

/// The center closest to `from` and its distance in meters.
///
/// Ties keep the first center encountered.
#[must_use]
pub fn nearest_center(
    from: Point<f64>,
    centers: &[EvacuationCenter],
) -> Option<(&EvacuationCenter, f64)> {
    let mut best: Option<(&EvacuationCenter, f64)> = None;
    for center in centers {
        let distance = planar_distance_m(from, center.location);
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((center, distance));
        }
    }
    best
}

/// Routes each area's centroid to its nearest center.
///
/// Areas without a centroid get no route, as does every area when
/// `centers` is empty.
pub fn calculate_evacuation_routes<'a>(
    areas: impl IntoIterator<Item = &'a Area>,
    centers: &[EvacuationCenter],
) -> Vec<EvacuationRoute> {
    let mut routes = Vec::new();

    for area in areas {
        let Some(from) = centroid(&area.geometry) else {
            log::warn!("Area '{}' has no centroid; no route", area.name);
            continue;
        };
        let Some((center, distance_m)) = nearest_center(from, centers) else {
            log::debug!("No evacuation center available for '{}'", area.name);
            continue;
        };

        let distance_km = meters_to_km(distance_m);
        routes.push(EvacuationRoute {
            from_area_id: area.id,
            from_area_name: area.name.clone(),
            to_center_id: center.id,
            to_center_name: center.name.clone(),
            distance_km,
            estimated_time_minutes: walking_minutes(distance_km),
            geometry: straight_line(from, center.location),
        });
    }

    routes
}

/// Population versus center capacity for `district`.
///
/// Population comes from the district summary, falling back to the
/// district record when the summary is missing.
///
/// # Errors
///
/// Returns [`PlanError::Store`] if the summary or centers cannot be loaded.
pub fn calculate_evacuation_capacity_gap(
    store: &dyn DisasterStore,
    district: &District,
) -> Result<CapacityAnalysis, PlanError> {
    let centers = store.get_evacuation_centers(Some(district.id))?;
    capacity_analysis(store, district, &centers)
}

fn capacity_analysis(
    store: &dyn DisasterStore,
    district: &District,
    centers: &[EvacuationCenter],
) -> Result<CapacityAnalysis, PlanError> {
    let population = store
        .get_district_summary(&district.name)?
        .map_or(district.population, |s| s.population);

    Ok(CapacityAnalysis::new(
        population,
        centers.iter().map(|c| c.capacity),
    ))
}

/// Builds the full plan for `district` from its assessed areas.
///
/// # Errors
///
/// Returns [`PlanError::Store`] if district data cannot be loaded.
pub fn generate_evacuation_plan(
    store: &dyn DisasterStore,
    district: &District,
    areas: &[AssessedArea],
    min_safe_zone_sqkm: f64,
) -> Result<EvacuationPlan, PlanError> {
    let centers = store.get_evacuation_centers(Some(district.id))?;
    let capacity = capacity_analysis(store, district, &centers)?;

    let safe_zones: Vec<SafeZone> = identify_safe_zones(areas, min_safe_zone_sqkm).collect();

    let high_risk: Vec<&Area> = areas
        .iter()
        .filter(|a| a.category().is_high_risk())
        .map(|a| &a.area)
        .collect();
    let routes = calculate_evacuation_routes(high_risk.iter().copied(), &centers);

    let recommendations = recommendations(
        &district.name,
        &capacity,
        high_risk.len().saturating_sub(routes.len()),
        safe_zones.len(),
    );
    let status = PlanStatus::from_gap(capacity.capacity_gap);

    log::info!(
        "Plan for {}: {} safe zones, {} routes, status {status}",
        district.name,
        safe_zones.len(),
        routes.len()
    );

    Ok(EvacuationPlan {
        district: district.name.clone(),
        capacity,
        routes,
        safe_zones,
        recommendations,
        status,
    })
}

fn recommendations(
    district: &str,
    capacity: &CapacityAnalysis,
    unrouted: usize,
    safe_zone_count: usize,
) -> Vec<String> {
    let mut recs = Vec::new();

    if capacity.capacity_gap > 0 {
        recs.push(format!(
            "Increase evacuation capacity by {} people",
            capacity.capacity_gap
        ));
    }
    if capacity.center_count == 0 {
        recs.push(format!("Establish evacuation centers in {district}"));
    } else if capacity.coverage_percent < 50.0 {
        recs.push(format!(
            "Add evacuation centers in {district} (coverage {:.1}%)",
            capacity.coverage_percent
        ));
    }
    if unrouted > 0 {
        recs.push(format!(
            "Assign evacuation centers for {unrouted} unrouted high-risk areas"
        ));
    }
    if safe_zone_count == 0 {
        recs.push(format!(
            "Identify safe zones outside {district} for relocation"
        ));
    }
    if recs.is_empty() {
        recs.push("Maintain current evacuation readiness".to_string());
    }

    recs
}

#[cfg(test)]
mod tests {
    use disaster_risk_analytics_models::{RiskAssessment, RiskCategory};
    use disaster_risk_database_models::memory::InMemoryStore;
    use geo::{MultiPolygon, Rect, coord};

    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![
            Rect::new(coord! { x: x0, y: y0 }, coord! { x: x0 + size, y: y0 + size })
                .to_polygon(),
        ])
    }

    fn assessed(id: i64, name: &str, geometry: MultiPolygon<f64>, score: u32) -> AssessedArea {
        let area = Area::from_geometry(id, name, geometry, 1_000);
        let risk_category = RiskCategory::from_score(score);
        AssessedArea {
            assessment: RiskAssessment {
                area_id: id,
                area_name: name.to_string(),
                total_score: score,
                factors: vec![],
                risk_category,
                display_color: risk_category.color().to_string(),
                population: area.population,
                population_at_risk: risk_category.population_at_risk(area.population),
            },
            area,
        }
    }

    fn center(id: i64, name: &str, x: f64, y: f64, capacity: u64) -> EvacuationCenter {
        EvacuationCenter {
            id,
            name: name.to_string(),
            capacity,
            current_occupancy: 0,
            facilities: None,
            accessibility_score: None,
            district_id: 1,
            district_name: "Zomba".to_string(),
            location: Point::new(x, y),
        }
    }

    fn zomba(population: u64) -> District {
        District {
            id: 1,
            name: "Zomba".to_string(),
            district_type: Some("district".to_string()),
            code: Some("ZA".to_string()),
            population,
            area_sqkm: 2580.0,
            geometry: None,
        }
    }

    #[test]
    fn safe_zones_need_low_risk_and_size() {
        let areas = vec![
            assessed(1, "Big safe", square(0.0, 0.0, 2000.0), 10),
            assessed(2, "Small low", square(0.0, 0.0, 500.0), 25),
            assessed(3, "Big high", square(0.0, 0.0, 2000.0), 65),
            assessed(4, "Exactly one", square(0.0, 0.0, 1000.0), 39),
        ];
        let names: Vec<String> = identify_safe_zones(&areas, 1.0).map(|z| z.name).collect();
        assert_eq!(names, vec!["Big safe", "Exactly one"]);
    }

    #[test]
    fn route_goes_to_strictly_nearest_center() {
        let area = Area::from_geometry(1, "Floodplain", square(-100.0, -100.0, 200.0), 500);
        let centers = vec![
            center(1, "Far", 300.0, 0.0, 100),
            center(2, "Near", 150.0, 0.0, 100),
            center(3, "Also near", 0.0, 150.0, 100),
        ];

        let routes = calculate_evacuation_routes([&area], &centers);

        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].to_center_id, 2);
        assert!((routes[0].distance_km - 0.15).abs() < 1e-9);
        assert_eq!(routes[0].estimated_time_minutes, 2);
        assert_eq!(routes[0].geometry.0.len(), 2);
    }

    #[test]
    fn no_centers_means_no_routes() {
        let area = Area::from_geometry(1, "Floodplain", square(0.0, 0.0, 200.0), 500);
        assert!(calculate_evacuation_routes([&area], &[]).is_empty());
    }

    #[test]
    fn capacity_gap_uses_summary_population() {
        let mut store = InMemoryStore::default();
        store.districts = vec![zomba(50_000)];
        store.centers = vec![
            center(1, "School", 0.0, 0.0, 10_000),
            center(2, "Church", 0.0, 0.0, 5_000),
        ];

        let analysis = calculate_evacuation_capacity_gap(&store, &zomba(50_000)).unwrap();
        assert_eq!(analysis.total_capacity, 15_000);
        assert_eq!(analysis.capacity_gap, 35_000);
        assert!((analysis.coverage_percent - 30.0).abs() < 1e-9);
    }

    #[test]
    fn capacity_gap_falls_back_to_district_population() {
        let store = InMemoryStore::default();
        let analysis = calculate_evacuation_capacity_gap(&store, &zomba(1_200)).unwrap();
        assert_eq!(analysis.population, 1_200);
        assert_eq!(analysis.center_count, 0);
        assert_eq!(analysis.capacity_gap, 1_200);
    }

    #[test]
    fn capacity_gap_propagates_store_failure() {
        let mut store = InMemoryStore::default();
        store.fail_reads = true;
        assert!(calculate_evacuation_capacity_gap(&store, &zomba(1)).is_err());
    }

    #[test]
    fn insufficient_plan_lists_recommendations_in_order() {
        let mut store = InMemoryStore::default();
        store.districts = vec![zomba(50_000)];
        store.centers = vec![center(1, "School", 5000.0, 5000.0, 10_000)];

        let areas = vec![
            assessed(1, "Floodplain", square(0.0, 0.0, 1000.0), 85),
            assessed(2, "Hills", square(0.0, 0.0, 500.0), 5),
        ];
        let plan = generate_evacuation_plan(&store, &zomba(50_000), &areas, 1.0).unwrap();

        assert_eq!(plan.status, PlanStatus::Insufficient);
        assert_eq!(plan.routes.len(), 1);
        assert!(plan.safe_zones.is_empty());
        assert_eq!(
            plan.recommendations,
            vec![
                "Increase evacuation capacity by 40000 people",
                "Add evacuation centers in Zomba (coverage 20.0%)",
                "Identify safe zones outside Zomba for relocation",
            ]
        );
    }

    #[test]
    fn plan_without_centers_flags_unrouted_areas() {
        let mut store = InMemoryStore::default();
        store.districts = vec![zomba(100)];

        let areas = vec![
            assessed(1, "Floodplain", square(0.0, 0.0, 1000.0), 70),
            assessed(2, "Lakeshore", square(0.0, 0.0, 1000.0), 90),
            assessed(3, "Plateau", square(0.0, 0.0, 2000.0), 0),
        ];
        let plan = generate_evacuation_plan(&store, &zomba(100), &areas, 1.0).unwrap();

        assert!(plan.routes.is_empty());
        assert_eq!(
            plan.recommendations,
            vec![
                "Increase evacuation capacity by 100 people",
                "Establish evacuation centers in Zomba",
                "Assign evacuation centers for 2 unrouted high-risk areas",
            ]
        );
    }

    #[test]
    fn adequate_plan_maintains_readiness() {
        let mut store = InMemoryStore::default();
        store.districts = vec![zomba(1_000)];
        store.centers = vec![center(1, "Stadium", 0.0, 0.0, 5_000)];

        let areas = vec![assessed(1, "Plateau", square(0.0, 0.0, 2000.0), 15)];
        let plan = generate_evacuation_plan(&store, &zomba(1_000), &areas, 1.0).unwrap();

        assert_eq!(plan.status, PlanStatus::Adequate);
        assert_eq!(
            plan.recommendations,
            vec!["Maintain current evacuation readiness"]
        );
    }

    #[test]
    fn plan_is_deterministic() {
        let mut store = InMemoryStore::default();
        store.districts = vec![zomba(10_000)];
        store.centers = vec![center(1, "School", 100.0, 100.0, 2_000)];
        let areas = vec![assessed(1, "Floodplain", square(0.0, 0.0, 1000.0), 75)];

        let first = generate_evacuation_plan(&store, &zomba(10_000), &areas, 1.0).unwrap();
        let second = generate_evacuation_plan(&store, &zomba(10_000), &areas, 1.0).unwrap();
        assert_eq!(first, second);
    }
}
