//! [`DisasterStore`] over a `DuckDB` connection.

use std::path::Path;

use chrono::NaiveDate;
use disaster_risk_database_models::{
    DisasterStore, DistrictSummary, FloodProneDistrict, FloodRiskLevel, RiverLocation,
    StoreError, WriteValue,
};
use disaster_risk_geography_models::{
    DisasterEvent, District, EvacuationCenter, Infrastructure, LandUseParcel, PopulationRecord,
    RiskZone, ValueSample, WaterBody,
};
use disaster_risk_spatial::{PointIndex, parse_geojson_geometry, parse_geojson_to_multipolygon};
use duckdb::Connection;
use duckdb::types::Value;
use geo::{MultiPolygon, Point};

use crate::DbError;

const EVENT_COLUMNS: &str = "event_id, event_type, CAST(event_date AS VARCHAR), severity, \
     affected_area, casualties, displaced_people, economic_loss_usd, description, loc_x, loc_y";

const CENTER_COLUMNS: &str = "ec.center_id, ec.center_name, ec.capacity, ec.current_occupancy, \
     ec.facilities, ec.accessibility_score, ec.boundary_id, ab.boundary_name, ec.loc_x, ec.loc_y";

/// The disaster data store backed by a single `DuckDB` connection.
pub struct DuckDbStore {
    conn: Connection,
}

impl DuckDbStore {
    /// Opens (or creates) the store file and ensures the schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or schema creation fails.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            crate::paths::ensure_dir(parent)?;
        }

        let conn = Connection::open(path)?;
        crate::schema::create_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Opens a throwaway in-memory store with the schema created.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or schema creation fails.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::create_schema(&conn)?;
        Ok(Self { conn })
    }

    /// The underlying connection, for bulk loading.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    fn districts(&self) -> Result<Vec<District>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT boundary_id, boundary_name, boundary_type, boundary_code,
                    population, area_sqkm, boundary_geojson
             FROM administrative_boundaries
             ORDER BY boundary_name",
        )?;
        let mut rows = stmt.query([])?;

        let mut districts = Vec::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get(1)?;
            let geojson: Option<String> = row.get(6)?;
            let geometry = geojson.as_deref().and_then(|s| {
                let parsed = parse_geojson_to_multipolygon(s);
                if parsed.is_none() {
                    log::warn!("Unparseable boundary geometry for district {name}");
                }
                parsed
            });

            districts.push(District {
                id: row.get(0)?,
                district_type: row.get(2)?,
                code: row.get(3)?,
                population: to_count(row.get(4)?),
                area_sqkm: row.get::<_, Option<f64>>(5)?.unwrap_or(0.0),
                geometry,
                name,
            });
        }

        Ok(districts)
    }

    fn summary(&self, name: &str) -> Result<Option<DistrictSummary>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT ab.boundary_name, ab.boundary_code,
                    COALESCE(ab.population, 0), COALESCE(ab.area_sqkm, 0),
                    (SELECT COUNT(DISTINCT wb.water_name) FROM water_bodies wb
                      WHERE wb.boundary_id = ab.boundary_id),
                    (SELECT COUNT(*) FROM disaster_events de
                      WHERE de.affected_area = ab.boundary_name),
                    (SELECT CAST(COALESCE(SUM(de.casualties), 0) AS BIGINT) FROM disaster_events de
                      WHERE de.affected_area = ab.boundary_name),
                    (SELECT CAST(COALESCE(SUM(de.displaced_people), 0) AS BIGINT)
                       FROM disaster_events de
                      WHERE de.affected_area = ab.boundary_name),
                    (SELECT COALESCE(SUM(de.economic_loss_usd), 0) FROM disaster_events de
                      WHERE de.affected_area = ab.boundary_name),
                    (SELECT array_to_string(list_sort(list_distinct(list(wb.water_name))), ', ')
                       FROM water_bodies wb
                      WHERE wb.boundary_id = ab.boundary_id)
             FROM administrative_boundaries ab
             WHERE ab.boundary_name = ?",
        )?;
        let mut rows = stmt.query([name])?;

        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let water_bodies: Option<String> = row.get(9)?;
        Ok(Some(DistrictSummary {
            district: row.get(0)?,
            code: row.get(1)?,
            population: to_count(row.get(2)?),
            area_sqkm: row.get(3)?,
            water_body_count: to_count(row.get(4)?),
            disaster_count: to_count(row.get(5)?),
            total_casualties: to_count(row.get(6)?),
            total_displaced: to_count(row.get(7)?),
            total_economic_loss: row.get(8)?,
            water_bodies: water_bodies.filter(|s| !s.is_empty()),
        }))
    }

    fn events(&self, filter: &str, params: &[Value]) -> Result<Vec<DisasterEvent>, DbError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM disaster_events {filter} \
             ORDER BY event_date DESC, event_id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(duckdb::params_from_iter(params))?;

        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            let date: String = row.get(2)?;
            let event_date =
                NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| DbError::Conversion {
                    message: format!("event date '{date}': {e}"),
                })?;
            let x: Option<f64> = row.get(9)?;
            let y: Option<f64> = row.get(10)?;

            events.push(DisasterEvent {
                event_id: row.get(0)?,
                event_type: row.get(1)?,
                event_date,
                severity: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                affected_area: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                casualties: to_count(row.get(5)?),
                displaced_people: to_count(row.get(6)?),
                economic_loss_usd: row.get::<_, Option<f64>>(7)?.unwrap_or(0.0),
                description: row.get(8)?,
                location: x.zip(y).map(|(x, y)| Point::new(x, y)),
            });
        }

        Ok(events)
    }

    fn centers(&self, district_id: Option<i64>) -> Result<Vec<EvacuationCenter>, DbError> {
        let (filter, order, params) = district_id.map_or_else(
            || ("", "ab.boundary_name, ec.capacity DESC, ec.center_id", vec![]),
            |id| {
                (
                    "WHERE ec.boundary_id = ?",
                    "ec.capacity DESC, ec.center_id",
                    vec![Value::BigInt(id)],
                )
            },
        );
        let sql = format!(
            "SELECT {CENTER_COLUMNS}
             FROM evacuation_centers ec
             JOIN administrative_boundaries ab ON ec.boundary_id = ab.boundary_id
             {filter}
             ORDER BY {order}"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(duckdb::params_from_iter(params))?;

        let mut centers = Vec::new();
        while let Some(row) = rows.next()? {
            centers.push(EvacuationCenter {
                id: row.get(0)?,
                name: row.get(1)?,
                capacity: to_count(row.get(2)?),
                current_occupancy: to_count(row.get(3)?),
                facilities: row.get(4)?,
                accessibility_score: row.get(5)?,
                district_id: row.get(6)?,
                district_name: row.get(7)?,
                location: Point::new(row.get(8)?, row.get(9)?),
            });
        }

        Ok(centers)
    }

    fn flood_prone(&self) -> Result<Vec<FloodProneDistrict>, DbError> {
        let mut stmt = self.conn.prepare(
            "WITH floods AS (
                SELECT affected_area,
                       COUNT(DISTINCT event_id) AS flood_events,
                       CAST(COALESCE(SUM(casualties), 0) AS BIGINT) AS casualties,
                       CAST(COALESCE(SUM(displaced_people), 0) AS BIGINT) AS displaced,
                       COALESCE(SUM(economic_loss_usd), 0) AS loss
                FROM disaster_events
                WHERE lower(event_type) = 'flood'
                GROUP BY affected_area
             ),
             rivers AS (
                SELECT boundary_id,
                       COUNT(DISTINCT water_name) AS waters,
                       array_to_string(list_sort(list_distinct(list(water_name))), ', ') AS names
                FROM water_bodies
                WHERE flood_prone
                GROUP BY boundary_id
             )
             SELECT ab.boundary_id, ab.boundary_name,
                    COALESCE(ab.population, 0), COALESCE(ab.area_sqkm, 0),
                    COALESCE(f.flood_events, 0), COALESCE(f.casualties, 0),
                    COALESCE(f.displaced, 0),
                    ROUND(COALESCE(f.loss, 0) / 1000000.0, 2),
                    r.names, COALESCE(r.waters, 0)
             FROM administrative_boundaries ab
             LEFT JOIN floods f ON f.affected_area = ab.boundary_name
             LEFT JOIN rivers r ON r.boundary_id = ab.boundary_id
             WHERE COALESCE(f.flood_events, 0) > 0 OR COALESCE(r.waters, 0) > 0
             ORDER BY COALESCE(f.flood_events, 0) DESC, COALESCE(f.displaced, 0) DESC",
        )?;
        let mut rows = stmt.query([])?;

        let mut districts = Vec::new();
        while let Some(row) = rows.next()? {
            let flood_events = to_count(row.get(4)?);
            let flood_prone_waters = to_count(row.get(9)?);
            districts.push(FloodProneDistrict {
                district_id: row.get(0)?,
                district: row.get(1)?,
                population: to_count(row.get(2)?),
                area_sqkm: row.get(3)?,
                flood_events,
                casualties: to_count(row.get(5)?),
                displaced: to_count(row.get(6)?),
                economic_loss_millions_usd: row.get(7)?,
                flood_prone_rivers: row.get(8)?,
                flood_prone_waters,
                risk_level: FloodRiskLevel::classify(flood_events, flood_prone_waters),
            });
        }

        Ok(districts)
    }

    fn rivers(&self, river_name: &str) -> Result<Vec<RiverLocation>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT wb.water_name, ab.boundary_name, wb.water_type,
                    COALESCE(wb.flood_prone, FALSE), wb.length_km
             FROM water_bodies wb
             JOIN administrative_boundaries ab ON wb.boundary_id = ab.boundary_id
             WHERE wb.water_name ILIKE ?
             ORDER BY wb.water_id",
        )?;
        let pattern = format!("%{river_name}%");
        let mut rows = stmt.query([pattern])?;

        let mut found = Vec::new();
        while let Some(row) = rows.next()? {
            found.push(RiverLocation {
                water_name: row.get(0)?,
                district_name: row.get(1)?,
                water_type: row.get(2)?,
                flood_prone: row.get(3)?,
                length_km: row.get(4)?,
            });
        }

        Ok(found)
    }

    fn infrastructure(&self, district_id: i64) -> Result<Vec<Infrastructure>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT infra_id, infra_name, infra_type, capacity, operational_status,
                    vulnerability_score, loc_x, loc_y
             FROM infrastructure
             WHERE boundary_id = ?
             ORDER BY infra_type, infra_name",
        )?;
        let mut rows = stmt.query([district_id])?;

        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let capacity: Option<i64> = row.get(3)?;
            let x: Option<f64> = row.get(6)?;
            let y: Option<f64> = row.get(7)?;
            items.push(Infrastructure {
                id: row.get(0)?,
                name: row.get(1)?,
                infra_type: row.get(2)?,
                capacity: capacity.and_then(|c| u64::try_from(c).ok()),
                operational_status: row.get(4)?,
                vulnerability_score: row.get(5)?,
                location: x.zip(y).map(|(x, y)| Point::new(x, y)),
            });
        }

        Ok(items)
    }

    fn risk_zones(
        &self,
        risk_level: Option<&str>,
        district_id: Option<i64>,
    ) -> Result<Vec<RiskZone>, DbError> {
        let mut conditions = Vec::new();
        let mut params = Vec::new();
        if let Some(level) = risk_level {
            conditions.push("rz.risk_level = ?");
            params.push(Value::Text(level.to_string()));
        }
        if let Some(id) = district_id {
            conditions.push("rz.boundary_id = ?");
            params.push(Value::BigInt(id));
        }
        let filter = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT rz.zone_id, rz.zone_name, rz.risk_level, rz.risk_type,
                    rz.affected_population, rz.risk_score, ab.boundary_name, rz.geojson
             FROM risk_zones rz
             LEFT JOIN administrative_boundaries ab ON rz.boundary_id = ab.boundary_id
             {filter}
             ORDER BY rz.risk_score DESC NULLS LAST, rz.zone_id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(duckdb::params_from_iter(params))?;

        let mut zones = Vec::new();
        while let Some(row) = rows.next()? {
            let geojson: Option<String> = row.get(7)?;
            zones.push(RiskZone {
                id: row.get(0)?,
                name: row.get(1)?,
                risk_level: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                risk_type: row.get(3)?,
                affected_population: to_count(row.get(4)?),
                risk_score: row.get(5)?,
                district_name: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                geometry: geojson.as_deref().and_then(parse_geojson_to_multipolygon),
            });
        }

        Ok(zones)
    }

    fn population(&self, district_id: i64) -> Result<Vec<PopulationRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT census_year, total_population, male_population, female_population,
                    households, vulnerable_population
             FROM population_data
             WHERE boundary_id = ?
             ORDER BY census_year DESC",
        )?;
        let mut rows = stmt.query([district_id])?;

        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(PopulationRecord {
                census_year: row.get(0)?,
                total_population: to_count(row.get(1)?),
                male_population: to_optional_count(row.get(2)?),
                female_population: to_optional_count(row.get(3)?),
                households: to_optional_count(row.get(4)?),
                vulnerable_population: to_optional_count(row.get(5)?),
            });
        }

        Ok(records)
    }

    fn water_bodies(&self) -> Result<Option<Vec<WaterBody>>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT water_id, water_name, water_type, COALESCE(flood_prone, FALSE),
                    boundary_id, length_km, geojson
             FROM water_bodies
             ORDER BY water_id",
        )?;
        let mut rows = stmt.query([])?;

        let mut waters = Vec::new();
        let mut skipped = 0_usize;
        while let Some(row) = rows.next()? {
            let geojson: Option<String> = row.get(6)?;
            let Some(geometry) = geojson.as_deref().and_then(parse_geojson_geometry) else {
                skipped += 1;
                continue;
            };
            waters.push(WaterBody {
                id: row.get(0)?,
                name: row.get(1)?,
                water_type: row.get(2)?,
                flood_prone: row.get(3)?,
                district_id: row.get(4)?,
                length_km: row.get(5)?,
                geometry,
            });
        }

        if skipped > 0 {
            log::warn!("Skipped {skipped} water bodies without usable geometry");
        }

        Ok(non_empty(waters, "water_bodies"))
    }

    fn land_use(&self) -> Result<Option<Vec<LandUseParcel>>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT parcel_id, land_use_type, drainage_capacity, geojson
             FROM land_use
             ORDER BY parcel_id",
        )?;
        let mut rows = stmt.query([])?;

        let mut parcels = Vec::new();
        while let Some(row) = rows.next()? {
            let geojson: Option<String> = row.get(3)?;
            let Some(geometry) = geojson.as_deref().and_then(parse_geojson_to_multipolygon)
            else {
                continue;
            };
            parcels.push(LandUseParcel {
                id: row.get(0)?,
                land_use_type: row.get(1)?,
                drainage_capacity: row.get(2)?,
                geometry,
            });
        }

        Ok(non_empty(parcels, "land_use"))
    }

    fn samples(&self, table: &str, column: &str) -> Result<Option<Vec<ValueSample>>, DbError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT x, y, {column} FROM {table}"))?;
        let mut rows = stmt.query([])?;

        let mut samples = Vec::new();
        while let Some(row) = rows.next()? {
            samples.push(ValueSample {
                location: Point::new(row.get(0)?, row.get(1)?),
                value: row.get(2)?,
            });
        }

        Ok(non_empty(samples, table))
    }
}

impl DisasterStore for DuckDbStore {
    fn get_all_districts(&self) -> Result<Vec<District>, StoreError> {
        Ok(self.districts()?)
    }

    fn get_district_summary(&self, name: &str) -> Result<Option<DistrictSummary>, StoreError> {
        Ok(self.summary(name)?)
    }

    fn get_historical_events_in_area(
        &self,
        area: &MultiPolygon<f64>,
    ) -> Result<Vec<DisasterEvent>, StoreError> {
        let located = self.events("WHERE loc_x IS NOT NULL AND loc_y IS NOT NULL", &[])?;
        let index = PointIndex::new(
            located
                .into_iter()
                .filter_map(|event| event.location.map(|p| (p, event)))
                .collect(),
        );

        Ok(index.within(area).into_iter().cloned().collect())
    }

    fn get_historical_events_in_district(
        &self,
        name: &str,
    ) -> Result<Vec<DisasterEvent>, StoreError> {
        Ok(self.events(
            "WHERE affected_area = ?",
            &[Value::Text(name.to_string())],
        )?)
    }

    fn get_evacuation_centers(
        &self,
        district_id: Option<i64>,
    ) -> Result<Vec<EvacuationCenter>, StoreError> {
        Ok(self.centers(district_id)?)
    }

    fn get_flood_prone_districts(&self) -> Result<Vec<FloodProneDistrict>, StoreError> {
        Ok(self.flood_prone()?)
    }

    fn get_district_by_river(&self, river_name: &str) -> Result<Vec<RiverLocation>, StoreError> {
        Ok(self.rivers(river_name)?)
    }

    fn get_infrastructure_in_district(
        &self,
        district_id: i64,
    ) -> Result<Vec<Infrastructure>, StoreError> {
        Ok(self.infrastructure(district_id)?)
    }

    fn get_risk_zones(
        &self,
        risk_level: Option<&str>,
        district_id: Option<i64>,
    ) -> Result<Vec<RiskZone>, StoreError> {
        Ok(self.risk_zones(risk_level, district_id)?)
    }

    fn get_population_data(&self, district_id: i64) -> Result<Vec<PopulationRecord>, StoreError> {
        Ok(self.population(district_id)?)
    }

    fn get_water_bodies(&self) -> Result<Option<Vec<WaterBody>>, StoreError> {
        Ok(self.water_bodies()?)
    }

    fn get_land_use(&self) -> Result<Option<Vec<LandUseParcel>>, StoreError> {
        Ok(self.land_use()?)
    }

    fn get_elevation_samples(&self) -> Result<Option<Vec<ValueSample>>, StoreError> {
        Ok(self.samples("elevation_samples", "elevation_m")?)
    }

    fn get_rainfall_samples(&self) -> Result<Option<Vec<ValueSample>>, StoreError> {
        Ok(self.samples("rainfall_samples", "annual_mm")?)
    }

    fn execute_write(&self, statement: &str, params: &[WriteValue]) -> Result<usize, StoreError> {
        let values: Vec<Value> = params.iter().map(to_value).collect();
        let affected = self
            .conn
            .execute(statement, duckdb::params_from_iter(values))
            .map_err(DbError::from)?;
        Ok(affected)
    }
}

fn to_value(param: &WriteValue) -> Value {
    match param {
        WriteValue::Null => Value::Null,
        WriteValue::Int64(v) => Value::BigInt(*v),
        WriteValue::Real64(v) => Value::Double(*v),
        WriteValue::String(v) => Value::Text(v.clone()),
    }
}

fn to_count(value: Option<i64>) -> u64 {
    to_optional_count(value).unwrap_or(0)
}

fn to_optional_count(value: Option<i64>) -> Option<u64> {
    value.and_then(|v| u64::try_from(v).ok())
}

fn non_empty<T>(items: Vec<T>, layer: &str) -> Option<Vec<T>> {
    if items.is_empty() {
        log::debug!("Layer {layer} is empty; treating as absent");
        None
    } else {
        Some(items)
    }
}

#[cfg(test)]
mod tests {
    use geo::{Rect, coord};

    use super::*;

    const SQUARE_A: &str =
        r#"{"type":"Polygon","coordinates":[[[0,0],[10000,0],[10000,10000],[0,10000],[0,0]]]}"#;
    const SQUARE_B: &str = r#"{"type":"Polygon","coordinates":[[[20000,0],[30000,0],[30000,10000],[20000,10000],[20000,0]]]}"#;
    const RIVER: &str = r#"{"type":"LineString","coordinates":[[0,5000],[10000,5000]]}"#;

    fn seeded() -> DuckDbStore {
        let store = DuckDbStore::open_in_memory().unwrap();
        store
            .connection()
            .execute_batch(&format!(
                "INSERT INTO administrative_boundaries VALUES
                    (1, 'Nsanje', 'district', 'NS', 300000, 1942.0, '{SQUARE_A}'),
                    (2, 'Balaka', 'district', 'BA', 400000, 2193.0, '{SQUARE_B}');
                 INSERT INTO water_bodies VALUES
                    (1, 'Shire River', 'river', TRUE, 1, 402.0, '{RIVER}'),
                    (2, 'Lake Malombe', 'lake', FALSE, 2, NULL, '{SQUARE_B}');
                 INSERT INTO disaster_events VALUES
                    (1, 'flood', DATE '2019-03-08', 'severe', 'Nsanje', 10, 5000, 2000000, NULL, 5000, 5000),
                    (2, 'Flood', DATE '2015-01-12', 'catastrophic', 'Nsanje', 40, 20000, 1000000, NULL, 2000, 2000),
                    (3, 'drought', DATE '2016-06-01', 'moderate', 'Balaka', 0, 0, 500000, NULL, 25000, 5000);
                 INSERT INTO evacuation_centers VALUES
                    (1, 'Nsanje Boma School', 800, 0, 'water', 0.8, 1, 4000, 4000),
                    (2, 'Bangula Camp', 1500, 100, NULL, NULL, 1, 6000, 6000),
                    (3, 'Balaka Hall', 300, 0, NULL, NULL, 2, 25000, 5000);
                 INSERT INTO infrastructure VALUES
                    (1, 'Nsanje District Hospital', 'hospital', 250, 'operational', 0.4, 1, 4500, 4500),
                    (2, 'Bangula Bridge', 'bridge', NULL, 'damaged', 0.9, 1, NULL, NULL);
                 INSERT INTO population_data VALUES
                    (1, 2008, 238000, NULL, NULL, NULL, NULL),
                    (1, 2018, 299000, 145000, 154000, 70000, 40000);"
            ))
            .unwrap();
        store
    }

    #[test]
    fn districts_are_ordered_by_name_with_geometry() {
        let districts = seeded().get_all_districts().unwrap();
        let names: Vec<&str> = districts.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Balaka", "Nsanje"]);
        assert!(districts.iter().all(|d| d.geometry.is_some()));
    }

    #[test]
    fn summary_aggregates_events_and_water() {
        let summary = seeded().get_district_summary("Nsanje").unwrap().unwrap();
        assert_eq!(summary.disaster_count, 2);
        assert_eq!(summary.total_casualties, 50);
        assert_eq!(summary.total_displaced, 25_000);
        assert!((summary.total_economic_loss - 3_000_000.0).abs() < f64::EPSILON);
        assert_eq!(summary.water_body_count, 1);
        assert_eq!(summary.water_bodies.as_deref(), Some("Shire River"));
    }

    #[test]
    fn summary_of_unknown_district_is_none() {
        assert!(seeded().get_district_summary("Atlantis").unwrap().is_none());
    }

    #[test]
    fn events_in_area_use_point_locations_newest_first() {
        let area = MultiPolygon(vec![
            Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 10_000.0, y: 10_000.0 }).to_polygon(),
        ]);
        let events = seeded().get_historical_events_in_area(&area).unwrap();
        let ids: Vec<i64> = events.iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(
            events[0].event_date,
            NaiveDate::from_ymd_opt(2019, 3, 8).unwrap()
        );
    }

    #[test]
    fn flood_prone_districts_are_classified() {
        let rows = seeded().get_flood_prone_districts().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].district, "Nsanje");
        assert_eq!(rows[0].flood_events, 2);
        assert_eq!(rows[0].flood_prone_waters, 1);
        assert!((rows[0].economic_loss_millions_usd - 3.0).abs() < 1e-9);
        assert_eq!(rows[0].risk_level, FloodRiskLevel::High);
    }

    #[test]
    fn centers_are_filtered_and_ordered_by_capacity() {
        let store = seeded();
        let ids: Vec<i64> = store
            .get_evacuation_centers(Some(1))
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![2, 1]);

        let all = store.get_evacuation_centers(None).unwrap();
        assert_eq!(all[0].district_name, "Balaka");
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn river_lookup_is_case_insensitive() {
        let found = seeded().get_district_by_river("shire").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].district_name, "Nsanje");
        assert!(found[0].flood_prone);
    }

    #[test]
    fn infrastructure_carries_location() {
        let items = seeded().get_infrastructure_in_district(1).unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Bangula Bridge", "Nsanje District Hospital"]);
        assert_eq!(items[0].location, None);
        assert_eq!(items[1].location, Some(Point::new(4500.0, 4500.0)));
        assert_eq!(items[1].capacity, Some(250));
    }

    #[test]
    fn population_is_newest_census_first() {
        let records = seeded().get_population_data(1).unwrap();
        assert_eq!(records[0].census_year, 2018);
        assert_eq!(records[0].vulnerable_population, Some(40_000));
        assert_eq!(records[1].male_population, None);
    }

    #[test]
    fn empty_layers_are_absent() {
        let store = seeded();
        assert_eq!(store.get_water_bodies().unwrap().map(|w| w.len()), Some(2));
        assert!(store.get_land_use().unwrap().is_none());
        assert!(store.get_elevation_samples().unwrap().is_none());
        assert!(store.get_rainfall_samples().unwrap().is_none());
    }

    #[test]
    fn execute_write_inserts_route() {
        let store = seeded();
        let affected = store
            .execute_write(
                "INSERT INTO evacuation_routes
                    (from_area_id, to_center_id, distance_km, estimated_time_minutes, route_geojson)
                 VALUES (?, ?, ?, ?, ?)",
                &[
                    WriteValue::Int64(1),
                    WriteValue::Int64(2),
                    WriteValue::Real64(1.41),
                    WriteValue::Int64(17),
                    WriteValue::Null,
                ],
            )
            .unwrap();
        assert_eq!(affected, 1);

        let count: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM evacuation_routes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn failed_write_surfaces_as_query_error() {
        let err = seeded()
            .execute_write("INSERT INTO no_such_table VALUES (?)", &[WriteValue::Null])
            .unwrap_err();
        assert!(matches!(err, StoreError::Query { .. }));
    }
}
