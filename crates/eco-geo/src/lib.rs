//! # eco-geo
//!
//! Great-circle distance and nearest-facility search.
//!
//! - [`distance_km`] — haversine distance in kilometres (Earth radius 6371 km)
//! - [`Coordinates`] — range-validated latitude/longitude
//! - [`FacilityLocator`] — ranks an active facility catalog by distance,
//!   deterministic on ties (facility id ascending)
//! - [`LocatorConfig`] — default radius and result limit
//! - [`PickupDirectory`] — facility pickup schedules, filtered by city

pub mod config;
pub mod distance;
pub mod error;
pub mod facility;
pub mod locator;
pub mod pickup;

pub use config::LocatorConfig;
pub use distance::{distance_km, EARTH_RADIUS_KM};
pub use error::GeoError;
pub use facility::{load_catalog, sample_facilities, Coordinates, Facility};
pub use locator::{FacilityLocator, NearbyFacility, SearchOptions};
pub use pickup::{
    load_schedules, sample_schedules, PickupDirectory, PickupFrequency, PickupSchedule,
};
