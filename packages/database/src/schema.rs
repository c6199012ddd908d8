//! Table layout of the disaster store.
//!
//! Polygon and line geometries are `GeoJSON` TEXT columns; point features
//! carry plain `x`/`y` coordinate columns in the projected CRS (meters).

use duckdb::Connection;

use crate::DbError;

/// Creates every table the store reads from or writes to.
///
/// # Errors
///
/// Returns [`DbError`] if any statement fails.
pub fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS administrative_boundaries (
            boundary_id BIGINT PRIMARY KEY,
            boundary_name TEXT NOT NULL,
            boundary_type TEXT,
            boundary_code TEXT,
            population BIGINT,
            area_sqkm DOUBLE,
            boundary_geojson TEXT
        );

        CREATE TABLE IF NOT EXISTS water_bodies (
            water_id BIGINT PRIMARY KEY,
            water_name TEXT NOT NULL,
            water_type TEXT,
            flood_prone BOOLEAN DEFAULT FALSE,
            boundary_id BIGINT,
            length_km DOUBLE,
            geojson TEXT
        );

        CREATE TABLE IF NOT EXISTS disaster_events (
            event_id BIGINT PRIMARY KEY,
            event_type TEXT NOT NULL,
            event_date DATE NOT NULL,
            severity TEXT,
            affected_area TEXT,
            casualties BIGINT DEFAULT 0,
            displaced_people BIGINT DEFAULT 0,
            economic_loss_usd DOUBLE DEFAULT 0,
            description TEXT,
            loc_x DOUBLE,
            loc_y DOUBLE
        );

        CREATE TABLE IF NOT EXISTS infrastructure (
            infra_id BIGINT PRIMARY KEY,
            infra_name TEXT NOT NULL,
            infra_type TEXT NOT NULL,
            capacity BIGINT,
            operational_status TEXT,
            vulnerability_score DOUBLE,
            boundary_id BIGINT,
            loc_x DOUBLE,
            loc_y DOUBLE
        );

        CREATE TABLE IF NOT EXISTS evacuation_centers (
            center_id BIGINT PRIMARY KEY,
            center_name TEXT NOT NULL,
            capacity BIGINT DEFAULT 0,
            current_occupancy BIGINT DEFAULT 0,
            facilities TEXT,
            accessibility_score DOUBLE,
            boundary_id BIGINT NOT NULL,
            loc_x DOUBLE NOT NULL,
            loc_y DOUBLE NOT NULL
        );

        CREATE TABLE IF NOT EXISTS risk_zones (
            zone_id BIGINT PRIMARY KEY,
            zone_name TEXT NOT NULL,
            risk_level TEXT,
            risk_type TEXT,
            affected_population BIGINT,
            risk_score DOUBLE,
            boundary_id BIGINT,
            geojson TEXT
        );

        CREATE TABLE IF NOT EXISTS population_data (
            boundary_id BIGINT NOT NULL,
            census_year INTEGER NOT NULL,
            total_population BIGINT,
            male_population BIGINT,
            female_population BIGINT,
            households BIGINT,
            vulnerable_population BIGINT
        );

        CREATE TABLE IF NOT EXISTS land_use (
            parcel_id BIGINT PRIMARY KEY,
            land_use_type TEXT,
            drainage_capacity TEXT,
            geojson TEXT
        );

        CREATE TABLE IF NOT EXISTS elevation_samples (
            x DOUBLE NOT NULL,
            y DOUBLE NOT NULL,
            elevation_m DOUBLE NOT NULL
        );

        CREATE TABLE IF NOT EXISTS rainfall_samples (
            x DOUBLE NOT NULL,
            y DOUBLE NOT NULL,
            annual_mm DOUBLE NOT NULL
        );

        CREATE SEQUENCE IF NOT EXISTS evacuation_routes_id_seq START 1;

        CREATE TABLE IF NOT EXISTS evacuation_routes (
            route_id BIGINT PRIMARY KEY DEFAULT nextval('evacuation_routes_id_seq'),
            from_area_id BIGINT NOT NULL,
            to_center_id BIGINT NOT NULL,
            distance_km DOUBLE NOT NULL,
            estimated_time_minutes BIGINT NOT NULL,
            route_geojson TEXT,
            created_at TIMESTAMPTZ DEFAULT CURRENT_TIMESTAMP
        );",
    )?;

    Ok(())
}
