// locator.rs — Nearest-facility search over an in-memory catalog.
//
// Results are restricted to active facilities within the radius, sorted by
// distance ascending with ties broken by facility id ascending, then
// truncated to the limit. The ordering is total, so identical inputs always
// produce identical output.

use std::cmp::Ordering;
use std::collections::HashSet;

use eco_progress::WasteCategory;
use serde::Serialize;

use crate::config::LocatorConfig;
use crate::error::GeoError;
use crate::facility::{Coordinates, Facility};

/// A search hit: the facility and how far it is from the origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyFacility {
    pub facility: Facility,
    pub distance_km: f64,
}

/// Explicit overrides for one search. `None` falls back to [`LocatorConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    pub radius_km: Option<f64>,
    pub limit: Option<usize>,
    pub category: Option<WasteCategory>,
}

/// Ranks a facility catalog by distance from an origin.
#[derive(Debug, Clone)]
pub struct FacilityLocator {
    catalog: Vec<Facility>,
    config: LocatorConfig,
}

impl FacilityLocator {
    /// Build a locator. Rejects invalid config and duplicate facility ids.
    pub fn new(catalog: Vec<Facility>, config: LocatorConfig) -> Result<Self, GeoError> {
        config.validate()?;
        let mut seen = HashSet::new();
        for facility in &catalog {
            if !seen.insert(facility.facility_id) {
                return Err(GeoError::DuplicateFacility(facility.facility_id));
            }
        }
        tracing::debug!(facilities = catalog.len(), "facility catalog loaded");
        Ok(Self { catalog, config })
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &[Facility] {
        &self.catalog
    }

    /// Active facilities within `radius_km` of `origin`, nearest first.
    ///
    /// A missing origin is a normal state (the user has no location yet) and
    /// yields an empty list.
    pub fn nearby(
        &self,
        origin: Option<Coordinates>,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<NearbyFacility>, GeoError> {
        self.search(
            origin,
            SearchOptions {
                radius_km: Some(radius_km),
                limit: Some(limit),
                category: None,
            },
        )
    }

    /// Like [`FacilityLocator::nearby`], restricted to facilities that accept
    /// `category`.
    pub fn nearby_accepting(
        &self,
        origin: Option<Coordinates>,
        category: WasteCategory,
        radius_km: f64,
        limit: usize,
    ) -> Result<Vec<NearbyFacility>, GeoError> {
        self.search(
            origin,
            SearchOptions {
                radius_km: Some(radius_km),
                limit: Some(limit),
                category: Some(category),
            },
        )
    }

    /// Search with configured defaults for anything `options` leaves unset.
    pub fn search(
        &self,
        origin: Option<Coordinates>,
        options: SearchOptions,
    ) -> Result<Vec<NearbyFacility>, GeoError> {
        let radius_km = options.radius_km.unwrap_or(self.config.default_radius_km);
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(GeoError::InvalidRadius(radius_km));
        }
        let limit = options.limit.unwrap_or(self.config.default_limit);

        let Some(origin) = origin else {
            tracing::debug!("no origin coordinates, returning no facilities");
            return Ok(Vec::new());
        };

        let mut hits: Vec<NearbyFacility> = self
            .catalog
            .iter()
            .filter(|f| f.active)
            .filter(|f| options.category.map_or(true, |c| f.accepts(c)))
            .filter_map(|f| {
                let distance_km = origin.distance_to(&f.coordinates);
                (distance_km <= radius_km).then(|| NearbyFacility {
                    facility: f.clone(),
                    distance_km,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(Ordering::Equal)
                .then(a.facility.facility_id.cmp(&b.facility.facility_id))
        });
        hits.truncate(limit);

        tracing::debug!(
            lat = origin.lat(),
            lng = origin.lng(),
            radius_km,
            found = hits.len(),
            "facility search"
        );
        Ok(hits)
    }
}
