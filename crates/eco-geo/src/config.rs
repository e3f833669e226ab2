//! Facility search configuration

use serde::{Deserialize, Serialize};

use crate::error::GeoError;

/// Defaults applied when a caller doesn't pass an explicit radius or limit.
///
/// Dense urban deployments usually want a smaller radius; rural ones a
/// larger radius and a shorter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatorConfig {
    /// Search radius in kilometres.
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,

    /// Maximum number of facilities returned.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            default_radius_km: default_radius_km(),
            default_limit: default_limit(),
        }
    }
}

fn default_radius_km() -> f64 {
    10.0
}

fn default_limit() -> usize {
    10
}

impl LocatorConfig {
    pub fn validate(&self) -> Result<(), GeoError> {
        if !self.default_radius_km.is_finite() || self.default_radius_km <= 0.0 {
            return Err(GeoError::InvalidRadius(self.default_radius_km));
        }
        Ok(())
    }
}
