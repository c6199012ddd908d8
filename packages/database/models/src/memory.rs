//! In-memory [`DisasterStore`] for tests and small fixtures.
//!
//! Mirrors the ordering and filtering rules of the `DuckDB` store over
//! plain vectors. Writes are recorded instead of persisted, and individual
//! write calls or all reads can be made to fail to exercise error paths.

use std::cell::{Cell, RefCell};
use std::cmp::Reverse;
use std::collections::BTreeSet;

use disaster_risk_geography_models::{
    DisasterEvent, District, EvacuationCenter, Infrastructure, LandUseParcel, PopulationRecord,
    RiskZone, ValueSample, WaterBody,
};
use geo::{Contains as _, MultiPolygon};

use crate::{
    DisasterStore, DistrictSummary, FloodProneDistrict, FloodRiskLevel, RiverLocation,
    StoreError, WriteValue,
};

/// A write captured by [`InMemoryStore::execute_write`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedWrite {
    /// The statement text.
    pub statement: String,
    /// The bound parameters.
    pub params: Vec<WriteValue>,
}

/// Vector-backed store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    /// Administrative districts.
    pub districts: Vec<District>,
    /// Historical disaster events.
    pub events: Vec<DisasterEvent>,
    /// Evacuation centers.
    pub centers: Vec<EvacuationCenter>,
    /// Water body layer; `None` means the layer is absent.
    pub water_bodies: Option<Vec<WaterBody>>,
    /// Land-use layer; `None` means the layer is absent.
    pub land_use: Option<Vec<LandUseParcel>>,
    /// Elevation samples; `None` means the layer is absent.
    pub elevation: Option<Vec<ValueSample>>,
    /// Rainfall samples; `None` means the layer is absent.
    pub rainfall: Option<Vec<ValueSample>>,
    /// Infrastructure keyed by owning district id.
    pub infrastructure: Vec<(i64, Infrastructure)>,
    /// Risk zones.
    pub risk_zones: Vec<RiskZone>,
    /// Census records keyed by district id.
    pub population: Vec<(i64, PopulationRecord)>,
    /// Zero-based indices of `execute_write` calls that should fail.
    pub failing_writes: BTreeSet<usize>,
    /// Makes every read query fail.
    pub fail_reads: bool,
    writes: RefCell<Vec<RecordedWrite>>,
    write_calls: Cell<usize>,
}

impl InMemoryStore {
    /// Writes that succeeded, in call order.
    #[must_use]
    pub fn recorded_writes(&self) -> Vec<RecordedWrite> {
        self.writes.borrow().clone()
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads {
            return Err(StoreError::Query {
                message: "connection lost".to_string(),
            });
        }
        Ok(())
    }

    fn district_name(&self, district_id: i64) -> Option<&str> {
        self.districts
            .iter()
            .find(|d| d.id == district_id)
            .map(|d| d.name.as_str())
    }

    fn newest_first(mut events: Vec<DisasterEvent>) -> Vec<DisasterEvent> {
        events.sort_by_key(|e| Reverse(e.event_date));
        events
    }
}

impl DisasterStore for InMemoryStore {
    fn get_all_districts(&self) -> Result<Vec<District>, StoreError> {
        self.check_read()?;
        let mut districts = self.districts.clone();
        districts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(districts)
    }

    fn get_district_summary(&self, name: &str) -> Result<Option<DistrictSummary>, StoreError> {
        self.check_read()?;
        let Some(district) = self.districts.iter().find(|d| d.name == name) else {
            return Ok(None);
        };

        let waters: BTreeSet<&str> = self
            .water_bodies
            .iter()
            .flatten()
            .filter(|w| w.district_id == Some(district.id))
            .map(|w| w.name.as_str())
            .collect();
        let events: Vec<&DisasterEvent> = self
            .events
            .iter()
            .filter(|e| e.affected_area == name)
            .collect();

        Ok(Some(DistrictSummary {
            district: district.name.clone(),
            code: district.code.clone(),
            population: district.population,
            area_sqkm: district.area_sqkm,
            water_body_count: waters.len() as u64,
            disaster_count: events.len() as u64,
            total_casualties: events.iter().map(|e| e.casualties).sum(),
            total_displaced: events.iter().map(|e| e.displaced_people).sum(),
            total_economic_loss: events.iter().map(|e| e.economic_loss_usd).sum(),
            water_bodies: if waters.is_empty() {
                None
            } else {
                Some(waters.into_iter().collect::<Vec<_>>().join(", "))
            },
        }))
    }

    fn get_historical_events_in_area(
        &self,
        area: &MultiPolygon<f64>,
    ) -> Result<Vec<DisasterEvent>, StoreError> {
        self.check_read()?;
        let events = self
            .events
            .iter()
            .filter(|e| e.location.is_some_and(|p| area.contains(&p)))
            .cloned()
            .collect();
        Ok(Self::newest_first(events))
    }

    fn get_historical_events_in_district(
        &self,
        name: &str,
    ) -> Result<Vec<DisasterEvent>, StoreError> {
        self.check_read()?;
        let events = self
            .events
            .iter()
            .filter(|e| e.affected_area == name)
            .cloned()
            .collect();
        Ok(Self::newest_first(events))
    }

    fn get_evacuation_centers(
        &self,
        district_id: Option<i64>,
    ) -> Result<Vec<EvacuationCenter>, StoreError> {
        self.check_read()?;
        let mut centers: Vec<EvacuationCenter> = self
            .centers
            .iter()
            .filter(|c| district_id.is_none_or(|id| c.district_id == id))
            .cloned()
            .collect();
        if district_id.is_some() {
            centers.sort_by_key(|c| Reverse(c.capacity));
        } else {
            centers.sort_by(|a, b| {
                a.district_name
                    .cmp(&b.district_name)
                    .then(b.capacity.cmp(&a.capacity))
            });
        }
        Ok(centers)
    }

    fn get_flood_prone_districts(&self) -> Result<Vec<FloodProneDistrict>, StoreError> {
        self.check_read()?;
        let mut rows = Vec::new();

        for district in &self.districts {
            let floods: Vec<&DisasterEvent> = self
                .events
                .iter()
                .filter(|e| {
                    e.affected_area == district.name && e.event_type.eq_ignore_ascii_case("flood")
                })
                .collect();
            let rivers: BTreeSet<&str> = self
                .water_bodies
                .iter()
                .flatten()
                .filter(|w| w.district_id == Some(district.id) && w.flood_prone)
                .map(|w| w.name.as_str())
                .collect();

            if floods.is_empty() && rivers.is_empty() {
                continue;
            }

            let flood_events = floods.len() as u64;
            let flood_prone_waters = rivers.len() as u64;
            let loss: f64 = floods.iter().map(|e| e.economic_loss_usd).sum();

            rows.push(FloodProneDistrict {
                district_id: district.id,
                district: district.name.clone(),
                population: district.population,
                area_sqkm: district.area_sqkm,
                flood_events,
                casualties: floods.iter().map(|e| e.casualties).sum(),
                displaced: floods.iter().map(|e| e.displaced_people).sum(),
                economic_loss_millions_usd: (loss / 1_000_000.0 * 100.0).round() / 100.0,
                flood_prone_rivers: if rivers.is_empty() {
                    None
                } else {
                    Some(rivers.into_iter().collect::<Vec<_>>().join(", "))
                },
                flood_prone_waters,
                risk_level: FloodRiskLevel::classify(flood_events, flood_prone_waters),
            });
        }

        rows.sort_by(|a, b| {
            b.flood_events
                .cmp(&a.flood_events)
                .then(b.displaced.cmp(&a.displaced))
        });
        Ok(rows)
    }

    fn get_district_by_river(&self, river_name: &str) -> Result<Vec<RiverLocation>, StoreError> {
        self.check_read()?;
        let needle = river_name.to_lowercase();
        Ok(self
            .water_bodies
            .iter()
            .flatten()
            .filter(|w| w.name.to_lowercase().contains(&needle))
            .filter_map(|w| {
                let district_name = self.district_name(w.district_id?)?;
                Some(RiverLocation {
                    water_name: w.name.clone(),
                    district_name: district_name.to_string(),
                    water_type: w.water_type.clone(),
                    flood_prone: w.flood_prone,
                    length_km: w.length_km,
                })
            })
            .collect())
    }

    fn get_infrastructure_in_district(
        &self,
        district_id: i64,
    ) -> Result<Vec<Infrastructure>, StoreError> {
        self.check_read()?;
        let mut items: Vec<Infrastructure> = self
            .infrastructure
            .iter()
            .filter(|(id, _)| *id == district_id)
            .map(|(_, infra)| infra.clone())
            .collect();
        items.sort_by(|a, b| a.infra_type.cmp(&b.infra_type).then(a.name.cmp(&b.name)));
        Ok(items)
    }

    fn get_risk_zones(
        &self,
        risk_level: Option<&str>,
        district_id: Option<i64>,
    ) -> Result<Vec<RiskZone>, StoreError> {
        self.check_read()?;
        let district_name = district_id.map(|id| self.district_name(id));
        let mut zones: Vec<RiskZone> = self
            .risk_zones
            .iter()
            .filter(|z| risk_level.is_none_or(|level| z.risk_level == level))
            .filter(|z| district_name.is_none_or(|name| name == Some(z.district_name.as_str())))
            .cloned()
            .collect();
        zones.sort_by(|a, b| {
            b.risk_score
                .unwrap_or(f64::NEG_INFINITY)
                .total_cmp(&a.risk_score.unwrap_or(f64::NEG_INFINITY))
        });
        Ok(zones)
    }

    fn get_population_data(&self, district_id: i64) -> Result<Vec<PopulationRecord>, StoreError> {
        self.check_read()?;
        let mut records: Vec<PopulationRecord> = self
            .population
            .iter()
            .filter(|(id, _)| *id == district_id)
            .map(|(_, record)| record.clone())
            .collect();
        records.sort_by_key(|r| Reverse(r.census_year));
        Ok(records)
    }

    fn get_water_bodies(&self) -> Result<Option<Vec<WaterBody>>, StoreError> {
        self.check_read()?;
        Ok(self.water_bodies.clone())
    }

    fn get_land_use(&self) -> Result<Option<Vec<LandUseParcel>>, StoreError> {
        self.check_read()?;
        Ok(self.land_use.clone())
    }

    fn get_elevation_samples(&self) -> Result<Option<Vec<ValueSample>>, StoreError> {
        self.check_read()?;
        Ok(self.elevation.clone())
    }

    fn get_rainfall_samples(&self) -> Result<Option<Vec<ValueSample>>, StoreError> {
        self.check_read()?;
        Ok(self.rainfall.clone())
    }

    fn execute_write(&self, statement: &str, params: &[WriteValue]) -> Result<usize, StoreError> {
        let call = self.write_calls.get();
        self.write_calls.set(call + 1);

        if self.failing_writes.contains(&call) {
            return Err(StoreError::Query {
                message: format!("write {call} rejected"),
            });
        }

        self.writes.borrow_mut().push(RecordedWrite {
            statement: statement.to_string(),
            params: params.to_vec(),
        });
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use geo::{Point, Rect, coord};

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

    fn event(id: i64, area: &str, kind: &str, date: (i32, u32, u32)) -> DisasterEvent {
        DisasterEvent {
            event_id: id,
            event_type: kind.to_string(),
            event_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            severity: "severe".to_string(),
            affected_area: area.to_string(),
            casualties: 1,
            displaced_people: 100 * u64::try_from(id).unwrap(),
            economic_loss_usd: 1_500_000.0,
            description: None,
            location: Some(Point::new(5.0, 5.0)),
        }
    }

    fn center(id: i64, district_id: i64, district_name: &str, capacity: u64) -> EvacuationCenter {
        EvacuationCenter {
            id,
            name: format!("Center {id}"),
            capacity,
            current_occupancy: 0,
            facilities: None,
            accessibility_score: None,
            district_id,
            district_name: district_name.to_string(),
            location: Point::new(0.0, 0.0),
        }
    }

    #[test]
    fn districts_are_sorted_by_name() {
        let store = InMemoryStore {
            districts: vec![district(1, "Zomba"), district(2, "Balaka")],
            ..Default::default()
        };
        let names: Vec<String> = store
            .get_all_districts()
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Balaka", "Zomba"]);
    }

    #[test]
    fn centers_in_district_are_sorted_by_capacity() {
        let store = InMemoryStore {
            centers: vec![
                center(1, 1, "Zomba", 100),
                center(2, 1, "Zomba", 500),
                center(3, 2, "Balaka", 50),
            ],
            ..Default::default()
        };
        let ids: Vec<i64> = store
            .get_evacuation_centers(Some(1))
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![2, 1]);

        let all: Vec<i64> = store
            .get_evacuation_centers(None)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(all, vec![3, 2, 1]);
    }

    #[test]
    fn events_in_area_are_newest_first() {
        let store = InMemoryStore {
            events: vec![
                event(1, "Zomba", "flood", (2015, 1, 1)),
                event(2, "Zomba", "flood", (2023, 3, 1)),
            ],
            ..Default::default()
        };
        let area = MultiPolygon(vec![
            Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 10.0, y: 10.0 }).to_polygon(),
        ]);
        let ids: Vec<i64> = store
            .get_historical_events_in_area(&area)
            .unwrap()
            .into_iter()
            .map(|e| e.event_id)
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn flood_prone_districts_classify_and_order() {
        let store = InMemoryStore {
            districts: vec![
                district(1, "Chikwawa"),
                district(2, "Nsanje"),
                district(3, "Dedza"),
            ],
            events: vec![
                event(1, "Chikwawa", "flood", (2019, 3, 1)),
                event(2, "Nsanje", "flood", (2019, 3, 1)),
                event(3, "Nsanje", "FLOOD", (2015, 1, 1)),
                event(4, "Dedza", "drought", (2016, 1, 1)),
            ],
            ..Default::default()
        };

        let rows = store.get_flood_prone_districts().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].district, "Nsanje");
        assert_eq!(rows[0].risk_level, FloodRiskLevel::High);
        assert!((rows[0].economic_loss_millions_usd - 3.0).abs() < 1e-9);
        assert_eq!(rows[1].risk_level, FloodRiskLevel::Medium);
    }

    #[test]
    fn summary_for_unknown_district_is_none() {
        let store = InMemoryStore::default();
        assert!(store.get_district_summary("Nowhere").unwrap().is_none());
    }

    #[test]
    fn failing_write_is_not_recorded() {
        let store = InMemoryStore {
            failing_writes: BTreeSet::from([1]),
            ..Default::default()
        };
        assert!(store.execute_write("INSERT 1", &[]).is_ok());
        assert!(store.execute_write("INSERT 2", &[]).is_err());
        assert!(store.execute_write("INSERT 3", &[]).is_ok());
        let statements: Vec<String> = store
            .recorded_writes()
            .into_iter()
            .map(|w| w.statement)
            .collect();
        assert_eq!(statements, vec!["INSERT 1", "INSERT 3"]);
    }

    #[test]
    fn failing_reads_surface_errors() {
        let store = InMemoryStore {
            fail_reads: true,
            ..Default::default()
        };
        assert!(store.get_all_districts().is_err());
        assert!(store.get_water_bodies().is_err());
    }
}
