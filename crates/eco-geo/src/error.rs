// error.rs — Error types for distance and facility search.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoError {
    /// A latitude or longitude is non-finite or outside its valid range.
    #[error("invalid {field} {value}: must be within [{min}, {max}]")]
    InvalidCoordinate {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// The search radius is non-finite or not strictly positive.
    #[error("invalid radius {0} km: must be a finite value > 0")]
    InvalidRadius(f64),

    /// Two catalog entries share an id, which would break deterministic ordering.
    #[error("duplicate facility id {0} in catalog")]
    DuplicateFacility(u64),

    #[error("duplicate pickup schedule id {0}")]
    DuplicateSchedule(u64),

    /// A pickup schedule names a facility that isn't in the catalog.
    #[error("pickup schedule {schedule_id} references unknown facility {facility_id}")]
    UnknownFacility { schedule_id: u64, facility_id: u64 },

    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
