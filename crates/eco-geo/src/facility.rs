// facility.rs — Coordinates and the drop-off facility record.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use eco_progress::WasteCategory;
use serde::{Deserialize, Serialize};

use crate::distance::distance_km;
use crate::error::GeoError;

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawCoordinates {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = GeoError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Coordinates::new(raw.lat, raw.lng)
    }
}

impl Coordinates {
    /// Latitude must be within [-90, 90] and longitude within [-180, 180].
    /// Out-of-range values are rejected, never clamped.
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        check_range("latitude", lat, 90.0)?;
        check_range("longitude", lng, 180.0)?;
        Ok(Self { lat, lng })
    }

    /// Build coordinates from values that may be missing, as on a user
    /// profile without a geocoded address. Missing either half yields `None`.
    pub fn from_optional(lat: Option<f64>, lng: Option<f64>) -> Result<Option<Self>, GeoError> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Coordinates::new(lat, lng).map(Some),
            _ => Ok(None),
        }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        distance_km(self.lat, self.lng, other.lat, other.lng)
    }
}

fn check_range(field: &'static str, value: f64, bound: f64) -> Result<(), GeoError> {
    if !value.is_finite() || value < -bound || value > bound {
        return Err(GeoError::InvalidCoordinate {
            field,
            value,
            min: -bound,
            max: bound,
        });
    }
    Ok(())
}

/// A recycling / drop-off facility. Read-only from the engine's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub facility_id: u64,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub accepted_categories: BTreeSet<WasteCategory>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Facility {
    pub fn new(
        facility_id: u64,
        name: impl Into<String>,
        coordinates: Coordinates,
        accepted_categories: impl IntoIterator<Item = WasteCategory>,
    ) -> Self {
        Self {
            facility_id,
            name: name.into(),
            address: String::new(),
            coordinates,
            accepted_categories: accepted_categories.into_iter().collect(),
            active: true,
            phone: None,
            hours: None,
        }
    }

    pub fn accepts(&self, category: WasteCategory) -> bool {
        self.accepted_categories.contains(&category)
    }
}

/// Read a facility catalog from a JSON array file. Coordinates are
/// validated during deserialization.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<Facility>, GeoError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| GeoError::IoError {
        path: path.display().to_string(),
        source,
    })?;
    let facilities: Vec<Facility> = serde_json::from_str(&json)?;
    Ok(facilities)
}

/// The three Kathmandu-valley facilities a fresh deployment is seeded with.
pub fn sample_facilities() -> Vec<Facility> {
    use WasteCategory::{Hazardous, Organic, Recyclable};

    // Literal coordinates, all in range.
    let at = |lat, lng| Coordinates { lat, lng };

    let mut teku = Facility::new(
        1,
        "Kathmandu Metropolitan City Waste Management",
        at(27.7000, 85.3000),
        [Organic, Recyclable, Hazardous],
    );
    teku.address = "Teku, Kathmandu".to_string();
    teku.phone = Some("+977-1-4256909".to_string());
    teku.hours = Some("Mon-Sat: 8:00 AM - 5:00 PM".to_string());

    let mut lalitpur = Facility::new(2, "Green Waste Nepal", at(27.6667, 85.3167), [Recyclable]);
    lalitpur.address = "Lalitpur, Kathmandu Valley".to_string();
    lalitpur.phone = Some("+977-1-5521234".to_string());
    lalitpur.hours = Some("Mon-Fri: 9:00 AM - 4:00 PM".to_string());

    let mut baneshwor = Facility::new(3, "Nepal Recycling Center", at(27.6833, 85.3500), [Recyclable]);
    baneshwor.address = "Baneshwor, Kathmandu".to_string();
    baneshwor.phone = Some("+977-1-4785234".to_string());
    baneshwor.hours = Some("Mon-Sat: 8:00 AM - 6:00 PM".to_string());

    vec![teku, lalitpur, baneshwor]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn out_of_range_coordinates_rejected() {
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
        assert!(matches!(
            Coordinates::new(90.5, 0.0),
            Err(GeoError::InvalidCoordinate {
                field: "latitude",
                ..
            })
        ));
        assert!(matches!(
            Coordinates::new(0.0, -181.0),
            Err(GeoError::InvalidCoordinate {
                field: "longitude",
                ..
            })
        ));
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn partial_location_is_absent_not_an_error() {
        assert_eq!(Coordinates::from_optional(Some(27.7), None).unwrap(), None);
        assert_eq!(Coordinates::from_optional(None, None).unwrap(), None);
        assert!(Coordinates::from_optional(Some(95.0), Some(0.0)).is_err());
    }

    #[test]
    fn deserialization_validates_coordinates() {
        let bad = r#"{"lat": 120.0, "lng": 10.0}"#;
        assert!(serde_json::from_str::<Coordinates>(bad).is_err());
        let good: Coordinates = serde_json::from_str(r#"{"lat": 1.0, "lng": 2.0}"#).unwrap();
        assert_eq!(good.lng(), 2.0);
    }

    #[test]
    fn catalog_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("facilities.json");
        fs::write(&path, serde_json::to_string_pretty(&sample_facilities()).unwrap()).unwrap();

        let loaded = load_catalog(&path).unwrap();
        assert_eq!(loaded, sample_facilities());
        assert!(loaded[0].accepts(WasteCategory::Hazardous));
        assert!(!loaded[1].accepts(WasteCategory::Organic));
    }

    #[test]
    fn active_defaults_to_true() {
        let json = r#"[{"facility_id": 9, "name": "Depot", "coordinates": {"lat": 0.0, "lng": 0.0}}]"#;
        let dir = tempdir().unwrap();
        let path = dir.path().join("facilities.json");
        fs::write(&path, json).unwrap();
        let loaded = load_catalog(&path).unwrap();
        assert!(loaded[0].active);
        assert!(loaded[0].accepted_categories.is_empty());
    }
}
