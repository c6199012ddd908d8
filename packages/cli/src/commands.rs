//! Subcommand implementations shared by the flag-driven CLI and the
//! interactive menu.

use std::error::Error;
use std::path::Path;

use disaster_risk_analytics::batch::{assess_district_areas, assess_districts};
use disaster_risk_analytics::export::export_assessments_csv;
use disaster_risk_analytics::AnalysisLayers;
use disaster_risk_analytics_models::{AnalysisConfig, AssessedArea, RiskAssessment, RiskFactor};
use disaster_risk_cli_utils::{IndicatifProgress, MultiProgress};
use disaster_risk_database_models::DisasterStore;
use disaster_risk_evacuation::{
    export_evacuation_plan_report, generate_evacuation_plan, render_report,
    save_evacuation_routes_to_db,
};
use disaster_risk_evacuation_models::EvacuationPlan;
use disaster_risk_geography_models::District;

/// Looks up a district by name, ignoring case.
pub fn find_district(store: &dyn DisasterStore, name: &str) -> Result<District, Box<dyn Error>> {
    store
        .get_all_districts()?
        .into_iter()
        .find(|d| d.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| format!("Unknown district: {name}").into())
}

pub fn list_districts(store: &dyn DisasterStore) -> Result<(), Box<dyn Error>> {
    let districts = store.get_all_districts()?;

    println!(
        "{:<6} {:<20} {:<10} {:>12} {:>10}",
        "ID", "NAME", "CODE", "POPULATION", "AREA_KM2"
    );
    println!("{}", "-".repeat(62));
    for d in &districts {
        println!(
            "{:<6} {:<20} {:<10} {:>12} {:>10.1}",
            d.id,
            d.name,
            d.code.as_deref().unwrap_or("-"),
            d.population,
            d.area_sqkm
        );
    }
    println!("\n{} district(s)", districts.len());

    Ok(())
}

pub fn show_summary(store: &dyn DisasterStore, name: &str) -> Result<(), Box<dyn Error>> {
    let summary = store
        .get_district_summary(name)?
        .ok_or_else(|| format!("Unknown district: {name}"))?;

    println!("District:          {}", summary.district);
    println!("Code:              {}", summary.code.as_deref().unwrap_or("-"));
    println!("Population:        {}", summary.population);
    println!("Area:              {:.1} sq km", summary.area_sqkm);
    println!("Water bodies:      {}", summary.water_body_count);
    println!(
        "                   {}",
        summary.water_bodies.as_deref().unwrap_or("None")
    );
    println!("Disaster events:   {}", summary.disaster_count);
    println!("Casualties:        {}", summary.total_casualties);
    println!("Displaced:         {}", summary.total_displaced);
    println!("Economic loss:     ${:.0}", summary.total_economic_loss);

    Ok(())
}

pub fn list_flood_prone(store: &dyn DisasterStore) -> Result<(), Box<dyn Error>> {
    let districts = store.get_flood_prone_districts()?;

    println!(
        "{:<20} {:>8} {:>10} {:>10} {:>10}  {:<10} RIVERS",
        "DISTRICT", "FLOODS", "CASUALTIES", "DISPLACED", "LOSS_MUSD", "RISK"
    );
    println!("{}", "-".repeat(90));
    for d in &districts {
        println!(
            "{:<20} {:>8} {:>10} {:>10} {:>10.1}  {:<10} {}",
            d.district,
            d.flood_events,
            d.casualties,
            d.displaced,
            d.economic_loss_millions_usd,
            d.risk_level.to_string(),
            d.flood_prone_rivers.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

pub fn list_rivers(store: &dyn DisasterStore, name: &str) -> Result<(), Box<dyn Error>> {
    let rivers = store.get_district_by_river(name)?;
    if rivers.is_empty() {
        println!("No water bodies match '{name}'.");
        return Ok(());
    }

    println!(
        "{:<24} {:<20} {:<10} {:>10} FLOOD_PRONE",
        "WATER BODY", "DISTRICT", "TYPE", "LENGTH_KM"
    );
    println!("{}", "-".repeat(80));
    for r in &rivers {
        println!(
            "{:<24} {:<20} {:<10} {:>10} {}",
            r.water_name,
            r.district_name,
            r.water_type.as_deref().unwrap_or("-"),
            r.length_km.map_or_else(|| "-".to_string(), |km| format!("{km:.1}")),
            if r.flood_prone { "yes" } else { "no" }
        );
    }

    Ok(())
}

pub fn list_events(store: &dyn DisasterStore, district: &str) -> Result<(), Box<dyn Error>> {
    let events = store.get_historical_events_in_district(district)?;

    println!(
        "{:<12} {:<12} {:<14} {:>10} {:>10} {:>14}",
        "DATE", "TYPE", "SEVERITY", "CASUALTIES", "DISPLACED", "LOSS_USD"
    );
    println!("{}", "-".repeat(77));
    for e in &events {
        println!(
            "{:<12} {:<12} {:<14} {:>10} {:>10} {:>14.0}",
            e.event_date.to_string(),
            e.event_type,
            e.severity,
            e.casualties,
            e.displaced_people,
            e.economic_loss_usd
        );
    }
    println!("\n{} event(s) in {district}", events.len());

    Ok(())
}

pub fn list_centers(
    store: &dyn DisasterStore,
    district: Option<&District>,
) -> Result<(), Box<dyn Error>> {
    let centers = store.get_evacuation_centers(district.map(|d| d.id))?;

    println!(
        "{:<28} {:<16} {:>9} {:>9}  FACILITIES",
        "CENTER", "DISTRICT", "CAPACITY", "OCCUPIED"
    );
    println!("{}", "-".repeat(90));
    for c in &centers {
        println!(
            "{:<28} {:<16} {:>9} {:>9}  {}",
            c.name,
            c.district_name,
            c.capacity,
            c.current_occupancy,
            c.facilities.as_deref().unwrap_or("-")
        );
    }

    let total: u64 = centers.iter().map(|c| c.capacity).sum();
    println!("\n{} center(s), total capacity {total}", centers.len());

    Ok(())
}

pub fn list_infrastructure(
    store: &dyn DisasterStore,
    district: &District,
) -> Result<(), Box<dyn Error>> {
    let items = store.get_infrastructure_in_district(district.id)?;

    println!(
        "{:<16} {:<28} {:>9} {:<14} VULNERABILITY",
        "TYPE", "NAME", "CAPACITY", "STATUS"
    );
    println!("{}", "-".repeat(85));
    for i in &items {
        println!(
            "{:<16} {:<28} {:>9} {:<14} {}",
            i.infra_type,
            i.name,
            i.capacity.map_or_else(|| "-".to_string(), |c| c.to_string()),
            i.operational_status.as_deref().unwrap_or("-"),
            i.vulnerability_score
                .map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
        );
    }

    Ok(())
}

pub fn list_zones(
    store: &dyn DisasterStore,
    level: Option<&str>,
    district: Option<&District>,
) -> Result<(), Box<dyn Error>> {
    let zones = store.get_risk_zones(level, district.map(|d| d.id))?;

    println!(
        "{:<28} {:<16} {:<10} {:<10} {:>8} {:>12}",
        "ZONE", "DISTRICT", "LEVEL", "TYPE", "SCORE", "POPULATION"
    );
    println!("{}", "-".repeat(89));
    for z in &zones {
        println!(
            "{:<28} {:<16} {:<10} {:<10} {:>8} {:>12}",
            z.name,
            z.district_name,
            z.risk_level,
            z.risk_type.as_deref().unwrap_or("-"),
            z.risk_score
                .map_or_else(|| "-".to_string(), |s| format!("{s:.1}")),
            z.affected_population
        );
    }

    Ok(())
}

pub fn show_population(
    store: &dyn DisasterStore,
    district: &District,
) -> Result<(), Box<dyn Error>> {
    let records = store.get_population_data(district.id)?;
    let opt = |v: Option<u64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());

    println!("Census history for {}", district.name);
    println!(
        "{:<6} {:>12} {:>10} {:>10} {:>11} {:>11}",
        "YEAR", "TOTAL", "MALE", "FEMALE", "HOUSEHOLDS", "VULNERABLE"
    );
    println!("{}", "-".repeat(65));
    for r in &records {
        println!(
            "{:<6} {:>12} {:>10} {:>10} {:>11} {:>11}",
            r.census_year,
            r.total_population,
            opt(r.male_population),
            opt(r.female_population),
            opt(r.households),
            opt(r.vulnerable_population)
        );
    }

    Ok(())
}

/// Runs the composite assessment for one district's areas, or for every
/// district when `district` is `None`.
pub fn assess(
    store: &dyn DisasterStore,
    config: &AnalysisConfig,
    district: Option<&District>,
    csv: Option<&Path>,
    multi: &MultiProgress,
) -> Result<Vec<AssessedArea>, Box<dyn Error>> {
    let loading = IndicatifProgress::spinner(multi, "Loading analysis layers");
    let layers = AnalysisLayers::load(store)?;
    loading.finish("Analysis layers loaded".to_string());

    let assessed = match district {
        Some(district) => assess_district_areas(store, district, &layers, config)?,
        None => {
            let progress = IndicatifProgress::assessment_bar(multi, "Assessing districts");
            assess_districts(store, &layers, config, progress.as_ref())?
        }
    };

    println!("{}", assessment_header());
    println!("{}", "-".repeat(96));
    for a in &assessed {
        println!("{}", assessment_row(&a.assessment));
    }

    if let Some(path) = csv {
        let assessments: Vec<RiskAssessment> =
            assessed.iter().map(|a| a.assessment.clone()).collect();
        let rows = export_assessments_csv(path, &assessments)?;
        println!("\nWrote {rows} row(s) to {}", path.display());
    }

    Ok(assessed)
}

fn assessment_header() -> String {
    format!(
        "{:<28} {:<10} {:>5}  {:>4} {:>4} {:>4} {:>4} {:>4} {:>4}  {:>10}",
        "AREA", "CATEGORY", "SCORE", "ELEV", "WATR", "SLOP", "HIST", "RAIN", "DRAN", "AT_RISK"
    )
}

fn assessment_row(a: &RiskAssessment) -> String {
    let scores: Vec<String> = RiskFactor::ALL
        .iter()
        .map(|f| format!("{:>4}", a.factor_score(*f)))
        .collect();

    format!(
        "{:<28} {:<10} {:>5}  {}  {:>10}",
        a.area_name,
        a.risk_category.to_string(),
        a.total_score,
        scores.join(" "),
        a.population_at_risk
    )
}

/// Assesses `district` and builds its evacuation plan, printing the report.
pub fn plan(
    store: &dyn DisasterStore,
    config: &AnalysisConfig,
    district: &District,
) -> Result<EvacuationPlan, Box<dyn Error>> {
    let layers = AnalysisLayers::load(store)?;
    let areas = assess_district_areas(store, district, &layers, config)?;
    let plan = generate_evacuation_plan(store, district, &areas, config.min_safe_zone_sqkm)?;

    print!("{}", render_report(&plan));

    Ok(plan)
}

pub fn export_plan(plan: &EvacuationPlan, output: &Path) -> Result<(), Box<dyn Error>> {
    let status = export_evacuation_plan_report(plan, output);
    if !status.success {
        return Err(status.message.into());
    }
    println!("{}", status.message);
    Ok(())
}

pub fn save_routes(store: &dyn DisasterStore, plan: &EvacuationPlan) {
    let summary = save_evacuation_routes_to_db(store, &plan.routes);
    println!("Saved {} of {} route(s)", summary.saved, plan.routes.len());
    for failure in &summary.failures {
        log::error!(
            "Route {} -> {} was not saved: {}",
            failure.from_area_id,
            failure.to_center_id,
            failure.error
        );
    }
}

#[cfg(test)]
mod tests {
    use disaster_risk_analytics_models::{RiskCategory, RiskFactorResult};
    use disaster_risk_database_models::memory::InMemoryStore;

    use super::*;

    fn district(id: i64, name: &str) -> District {
        District {
            id,
            name: name.to_string(),
            district_type: Some("district".to_string()),
            code: None,
            population: 1000,
            area_sqkm: 10.0,
            geometry: None,
        }
    }

    #[test]
    fn finds_district_ignoring_case() {
        let mut store = InMemoryStore::default();
        store.districts = vec![district(1, "Balaka"), district(2, "Nsanje")];

        assert_eq!(find_district(&store, "nsanje").unwrap().id, 2);
        assert_eq!(find_district(&store, " Balaka ").unwrap().id, 1);
    }

    #[test]
    fn unknown_district_is_an_error() {
        let store = InMemoryStore::default();
        let err = find_district(&store, "Atlantis").unwrap_err();
        assert_eq!(err.to_string(), "Unknown district: Atlantis");
    }

    #[test]
    fn assessment_row_lists_factor_scores_in_order() {
        let factors = RiskFactor::ALL
            .iter()
            .zip([20, 15, 10, 20, 10, 5])
            .map(|(f, s)| RiskFactorResult::new(*f, s, std::collections::BTreeMap::new()))
            .collect();
        let assessment = RiskAssessment {
            area_id: 1,
            area_name: "Nsanje".to_string(),
            total_score: 80,
            factors,
            risk_category: RiskCategory::VeryHigh,
            display_color: RiskCategory::VeryHigh.color().to_string(),
            population: 100,
            population_at_risk: 100,
        };

        let row = assessment_row(&assessment);
        assert!(row.starts_with("Nsanje"));
        assert!(row.contains("Very High"));
        assert!(row.contains("  20   15   10   20   10    5"));
    }
}
