//! Input layers shared by every assessment in a run.

use disaster_risk_analytics_models::InputLayer;
use disaster_risk_database_models::{DisasterStore, StoreError};
use disaster_risk_geography_models::{LandUseParcel, ValueSample, WaterBody};
use disaster_risk_spatial::PointIndex;

/// Spatial layers loaded once and reused for every area.
///
/// Sample layers are held in a [`PointIndex`] so per-area lookups only
/// touch samples near the area. `None` means the layer is absent.
#[derive(Default)]
pub struct AnalysisLayers {
    elevation: Option<PointIndex<f64>>,
    water_bodies: Option<Vec<WaterBody>>,
    land_use: Option<Vec<LandUseParcel>>,
    rainfall: Option<PointIndex<f64>>,
}

impl AnalysisLayers {
    /// Builds the layer set from already-loaded layers.
    #[must_use]
    pub fn new(
        elevation: Option<Vec<ValueSample>>,
        water_bodies: Option<Vec<WaterBody>>,
        land_use: Option<Vec<LandUseParcel>>,
        rainfall: Option<Vec<ValueSample>>,
    ) -> Self {
        Self {
            elevation: elevation.map(index_samples),
            water_bodies,
            land_use,
            rainfall: rainfall.map(index_samples),
        }
    }

    /// Loads every layer the store has.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if any layer query fails.
    pub fn load(store: &dyn DisasterStore) -> Result<Self, StoreError> {
        let layers = Self::new(
            store.get_elevation_samples()?,
            store.get_water_bodies()?,
            store.get_land_use()?,
            store.get_rainfall_samples()?,
        );

        log::info!(
            "Loaded layers: elevation={} water={} land_use={} rainfall={}",
            layers.elevation.as_ref().map_or(0, PointIndex::len),
            layers.water_bodies.as_ref().map_or(0, Vec::len),
            layers.land_use.as_ref().map_or(0, Vec::len),
            layers.rainfall.as_ref().map_or(0, PointIndex::len),
        );

        Ok(layers)
    }

    /// Whether `layer` was supplied.
    #[must_use]
    pub const fn has(&self, layer: InputLayer) -> bool {
        match layer {
            InputLayer::Elevation => self.elevation.is_some(),
            InputLayer::Water => self.water_bodies.is_some(),
            InputLayer::LandUse => self.land_use.is_some(),
        }
    }

    /// Elevation samples, if present.
    #[must_use]
    pub const fn elevation(&self) -> Option<&PointIndex<f64>> {
        self.elevation.as_ref()
    }

    /// Water bodies, if present.
    #[must_use]
    pub fn water_bodies(&self) -> Option<&[WaterBody]> {
        self.water_bodies.as_deref()
    }

    /// Land-use parcels, if present.
    #[must_use]
    pub fn land_use(&self) -> Option<&[LandUseParcel]> {
        self.land_use.as_deref()
    }

    /// Rainfall samples, if present.
    #[must_use]
    pub const fn rainfall(&self) -> Option<&PointIndex<f64>> {
        self.rainfall.as_ref()
    }
}

fn index_samples(samples: Vec<ValueSample>) -> PointIndex<f64> {
    PointIndex::new(samples.into_iter().map(|s| (s.location, s.value)).collect())
}
