//! Interactive menu for the disaster risk toolchain.
//!
//! Provides a menu-driven interface using `dialoguer` so queries, risk
//! assessments and evacuation plans can be run without memorizing flags.

use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};
use disaster_risk_analytics_models::AnalysisConfig;
use disaster_risk_cli_utils::MultiProgress;
use disaster_risk_database::paths;
use disaster_risk_database_models::DisasterStore;
use disaster_risk_geography_models::District;

use crate::commands;

/// Top-level actions available in the interactive menu.
enum Action {
    ListDistricts,
    DistrictSummary,
    FloodProne,
    FindRiver,
    DistrictEvents,
    Centers,
    Infrastructure,
    RiskZones,
    Population,
    AssessDistricts,
    AssessDistrict,
    PlanEvacuation,
}

impl Action {
    const ALL: &[Self] = &[
        Self::ListDistricts,
        Self::DistrictSummary,
        Self::FloodProne,
        Self::FindRiver,
        Self::DistrictEvents,
        Self::Centers,
        Self::Infrastructure,
        Self::RiskZones,
        Self::Population,
        Self::AssessDistricts,
        Self::AssessDistrict,
        Self::PlanEvacuation,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::ListDistricts => "List districts",
            Self::DistrictSummary => "District summary",
            Self::FloodProne => "Flood-prone districts",
            Self::FindRiver => "Find districts by river",
            Self::DistrictEvents => "Historical events in a district",
            Self::Centers => "Evacuation centers",
            Self::Infrastructure => "Infrastructure in a district",
            Self::RiskZones => "Mapped risk zones",
            Self::Population => "Census history",
            Self::AssessDistricts => "Assess all districts",
            Self::AssessDistrict => "Assess areas in a district",
            Self::PlanEvacuation => "Generate evacuation plan",
        }
    }
}

/// Prompts for an action and runs it against `store`.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected operation fails.
pub fn run(
    store: &dyn DisasterStore,
    config: &AnalysisConfig,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Disaster Risk Toolchain");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::ListDistricts => commands::list_districts(store)?,
        Action::DistrictSummary => {
            let district = select_district(store)?;
            commands::show_summary(store, &district.name)?;
        }
        Action::FloodProne => commands::list_flood_prone(store)?,
        Action::FindRiver => {
            let name: String = Input::new()
                .with_prompt("River name (partial match)")
                .interact_text()?;
            commands::list_rivers(store, &name)?;
        }
        Action::DistrictEvents => {
            let district = select_district(store)?;
            commands::list_events(store, &district.name)?;
        }
        Action::Centers => {
            let all = Confirm::new()
                .with_prompt("List centers in every district?")
                .default(true)
                .interact()?;
            let district = if all {
                None
            } else {
                Some(select_district(store)?)
            };
            commands::list_centers(store, district.as_ref())?;
        }
        Action::Infrastructure => {
            let district = select_district(store)?;
            commands::list_infrastructure(store, &district)?;
        }
        Action::RiskZones => {
            let level: String = Input::new()
                .with_prompt("Risk level (leave empty for all)")
                .allow_empty(true)
                .interact_text()?;
            let level = Some(level.trim()).filter(|l| !l.is_empty());
            commands::list_zones(store, level, None)?;
        }
        Action::Population => {
            let district = select_district(store)?;
            commands::show_population(store, &district)?;
        }
        Action::AssessDistricts => {
            let csv = prompt_csv_path()?;
            commands::assess(store, config, None, csv.as_deref(), multi)?;
        }
        Action::AssessDistrict => {
            let district = select_district(store)?;
            let csv = prompt_csv_path()?;
            commands::assess(store, config, Some(&district), csv.as_deref(), multi)?;
        }
        Action::PlanEvacuation => plan_evacuation(store, config)?,
    }

    Ok(())
}

fn select_district(store: &dyn DisasterStore) -> Result<District, Box<dyn std::error::Error>> {
    let mut districts = store.get_all_districts()?;
    if districts.is_empty() {
        return Err("No districts in the store. Load boundary data first.".into());
    }

    let names: Vec<&str> = districts.iter().map(|d| d.name.as_str()).collect();
    let idx = Select::new()
        .with_prompt("Which district?")
        .items(&names)
        .default(0)
        .interact()?;

    Ok(districts.swap_remove(idx))
}

fn prompt_csv_path() -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    let export = Confirm::new()
        .with_prompt("Export the assessments to CSV?")
        .default(false)
        .interact()?;
    if !export {
        return Ok(None);
    }

    let default = paths::generated_dir().join("risk_assessment.csv");
    let path: String = Input::new()
        .with_prompt("CSV path")
        .default(default.display().to_string())
        .interact_text()?;

    Ok(Some(PathBuf::from(path)))
}

fn plan_evacuation(
    store: &dyn DisasterStore,
    config: &AnalysisConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let district = select_district(store)?;
    let plan = commands::plan(store, config, &district)?;

    let export = Confirm::new()
        .with_prompt("Export the report?")
        .default(true)
        .interact()?;
    if export {
        commands::export_plan(&plan, &paths::plan_report_path(&district.name))?;
    }

    if !plan.routes.is_empty() {
        let save = Confirm::new()
            .with_prompt(format!("Save {} route(s) to the database?", plan.routes.len()))
            .default(false)
            .interact()?;
        if save {
            commands::save_routes(store, &plan);
        }
    }

    Ok(())
}
