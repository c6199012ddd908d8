//! Flat-text evacuation plan reports.

use std::path::Path;

use disaster_risk_evacuation_models::{EvacuationPlan, ExportStatus, ReportHeader};

/// First line of every report.
pub const REPORT_TITLE: &str = "EVACUATION PLAN REPORT";

const DISTRICT_PREFIX: &str = "District: ";

/// Renders `plan` in the report layout.
#[must_use]
pub fn render_report(plan: &EvacuationPlan) -> String {
    let capacity = &plan.capacity;
    let mut lines = vec![
        REPORT_TITLE.to_string(),
        "=".repeat(REPORT_TITLE.len()),
        format!("{DISTRICT_PREFIX}{}", plan.district),
        String::new(),
        "CAPACITY ANALYSIS".to_string(),
        format!("Population: {}", capacity.population),
        format!("Evacuation Centers: {}", capacity.center_count),
        format!("Total Capacity: {}", capacity.total_capacity),
        format!("Capacity Gap: {}", capacity.capacity_gap),
        format!("Coverage: {:.1}%", capacity.coverage_percent),
        String::new(),
    ];

    lines.push(format!("SAFE ZONES ({})", plan.safe_zones.len()));
    numbered(
        &mut lines,
        plan.safe_zones
            .iter()
            .map(|z| format!("{} ({}) - {:.2} sq km", z.name, z.id, z.area_sqkm)),
    );

    lines.push(format!("EVACUATION ROUTES ({})", plan.routes.len()));
    numbered(
        &mut lines,
        plan.routes.iter().map(|r| {
            format!(
                "{} -> {}: {:.2} km, {} min",
                r.from_area_name, r.to_center_name, r.distance_km, r.estimated_time_minutes
            )
        }),
    );

    lines.push(format!("RECOMMENDATIONS ({})", plan.recommendations.len()));
    numbered(&mut lines, plan.recommendations.iter().cloned());

    lines.push(String::new());
    lines.push(format!("PLAN STATUS: {}", plan.status));

    let mut report = lines.join("\n");
    report.push('\n');
    report
}

fn numbered(lines: &mut Vec<String>, items: impl Iterator<Item = String>) {
    let before = lines.len();
    lines.extend(
        items
            .enumerate()
            .map(|(i, item)| format!("  {}. {item}", i + 1)),
    );
    if lines.len() == before {
        lines.push("  None".to_string());
    }
}

/// Writes the report for `plan` to `destination`.
///
/// Never fails: I/O problems are reported through the returned status.
#[must_use]
pub fn export_evacuation_plan_report(plan: &EvacuationPlan, destination: &Path) -> ExportStatus {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(parent) {
            return failed(destination, &e);
        }
    }

    match std::fs::write(destination, render_report(plan)) {
        Ok(()) => {
            log::info!("Exported evacuation plan to {}", destination.display());
            ExportStatus {
                success: true,
                message: format!("Report exported to {}", destination.display()),
            }
        }
        Err(e) => failed(destination, &e),
    }
}

fn failed(destination: &Path, e: &std::io::Error) -> ExportStatus {
    log::warn!("Failed to export report to {}: {e}", destination.display());
    ExportStatus {
        success: false,
        message: format!("Failed to write {}: {e}", destination.display()),
    }
}

/// Recovers the title and district from report text.
///
/// Returns `None` if the text does not start with a report header.
#[must_use]
pub fn parse_report_header(text: &str) -> Option<ReportHeader> {
    let mut lines = text.lines();
    let title = lines.next()?.trim_end();
    if title != REPORT_TITLE {
        return None;
    }
    let district = lines
        .take(2)
        .find_map(|line| line.strip_prefix(DISTRICT_PREFIX))?;

    Some(ReportHeader {
        title: title.to_string(),
        district: district.trim_end().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use disaster_risk_evacuation_models::{
        CapacityAnalysis, EvacuationRoute, PlanStatus, SafeZone,
    };
    use geo::{LineString, MultiPolygon};

    use super::*;

    fn plan() -> EvacuationPlan {
        EvacuationPlan {
            district: "Blantyre City".to_string(),
            capacity: CapacityAnalysis::new(50_000, [10_000, 5_000]),
            routes: vec![EvacuationRoute {
                from_area_id: 4,
                from_area_name: "Mudi floodplain".to_string(),
                to_center_id: 9,
                to_center_name: "Chichiri Hall".to_string(),
                distance_km: 1.234,
                estimated_time_minutes: 15,
                geometry: LineString::from(vec![(0.0, 0.0), (1234.0, 0.0)]),
            }],
            safe_zones: vec![SafeZone {
                id: 2,
                name: "Soche".to_string(),
                geometry: MultiPolygon(vec![]),
                area_sqkm: 3.456,
            }],
            recommendations: vec!["Increase evacuation capacity by 35000 people".to_string()],
            status: PlanStatus::Insufficient,
        }
    }

    #[test]
    fn renders_report_layout() {
        let expected = "\
EVACUATION PLAN REPORT
======================
District: Blantyre City

CAPACITY ANALYSIS
Population: 50000
Evacuation Centers: 2
Total Capacity: 15000
Capacity Gap: 35000
Coverage: 30.0%

SAFE ZONES (1)
  1. Soche (2) - 3.46 sq km
EVACUATION ROUTES (1)
  1. Mudi floodplain -> Chichiri Hall: 1.23 km, 15 min
RECOMMENDATIONS (1)
  1. Increase evacuation capacity by 35000 people

PLAN STATUS: Insufficient
";
        assert_eq!(render_report(&plan()), expected);
    }

    #[test]
    fn empty_sections_print_none() {
        let mut plan = plan();
        plan.routes.clear();
        plan.safe_zones.clear();
        let report = render_report(&plan);
        assert!(report.contains("SAFE ZONES (0)\n  None\nEVACUATION ROUTES (0)\n  None\n"));
    }

    #[test]
    fn export_round_trips_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("plan.txt");

        let status = export_evacuation_plan_report(&plan(), &path);
        assert!(status.success, "{}", status.message);

        let text = std::fs::read_to_string(&path).unwrap();
        let header = parse_report_header(&text).unwrap();
        assert_eq!(header.title, REPORT_TITLE);
        assert_eq!(header.district, "Blantyre City");
    }

    #[test]
    fn export_failure_is_a_status() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let status = export_evacuation_plan_report(&plan(), &blocker.join("plan.txt"));
        assert!(!status.success);
        assert!(status.message.starts_with("Failed to write"));
    }

    #[test]
    fn rejects_foreign_text() {
        assert!(parse_report_header("hello\nDistrict: X").is_none());
        assert!(parse_report_header("").is_none());
    }
}
