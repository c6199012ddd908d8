//! Route persistence through the store.

use disaster_risk_database_models::{DisasterStore, WriteValue};
use disaster_risk_evacuation_models::{EvacuationRoute, RouteSaveFailure, SaveSummary};
use disaster_risk_spatial::to_geojson_string;
use geo::Geometry;

/// Statement used to insert one route.
pub const INSERT_ROUTE_SQL: &str = "INSERT INTO evacuation_routes \
     (from_area_id, to_center_id, distance_km, estimated_time_minutes, route_geojson) \
     VALUES (?, ?, ?, ?, ?)";

/// Inserts each route with its own statement.
///
/// There is no surrounding transaction: a failing route is recorded in the
/// summary and the remaining routes are still attempted.
#[must_use]
pub fn save_evacuation_routes_to_db(
    store: &dyn DisasterStore,
    routes: &[EvacuationRoute],
) -> SaveSummary {
    let mut summary = SaveSummary::default();

    for route in routes {
        let params = [
            WriteValue::Int64(route.from_area_id),
            WriteValue::Int64(route.to_center_id),
            WriteValue::Real64(route.distance_km),
            WriteValue::Int64(i64::try_from(route.estimated_time_minutes).unwrap_or(i64::MAX)),
            WriteValue::String(to_geojson_string(&Geometry::LineString(
                route.geometry.clone(),
            ))),
        ];

        match store.execute_write(INSERT_ROUTE_SQL, &params) {
            Ok(_) => summary.saved += 1,
            Err(e) => {
                log::warn!(
                    "Failed to save route {} -> {}: {e}",
                    route.from_area_id,
                    route.to_center_id
                );
                summary.failures.push(RouteSaveFailure {
                    from_area_id: route.from_area_id,
                    to_center_id: route.to_center_id,
                    error: e.to_string(),
                });
            }
        }
    }

    log::info!(
        "Saved {} of {} evacuation routes",
        summary.saved,
        routes.len()
    );

    summary
}
