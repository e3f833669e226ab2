// pickup.rs — Curbside pickup schedules run by collection facilities.
//
// A schedule belongs to exactly one facility in the catalog and names the
// area it covers. Lookups by city match the city name case-insensitively
// anywhere in the area ("Kathmandu" matches "Kathmandu - North").

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use chrono::Weekday;
use eco_progress::WasteCategory;
use serde::{Deserialize, Serialize};

use crate::error::GeoError;
use crate::facility::Facility;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PickupFrequency {
    #[default]
    Weekly,
    BiWeekly,
    Monthly,
}

impl fmt::Display for PickupFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PickupFrequency::Weekly => f.pad("weekly"),
            PickupFrequency::BiWeekly => f.pad("bi-weekly"),
            PickupFrequency::Monthly => f.pad("monthly"),
        }
    }
}

/// A recurring pickup in one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupSchedule {
    pub schedule_id: u64,
    /// The facility that runs the pickup.
    pub facility_id: u64,
    pub area: String,
    pub pickup_day: Weekday,
    /// Free-form local time, e.g. "09:00 AM".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_time: Option<String>,
    #[serde(default)]
    pub waste_types: BTreeSet<WasteCategory>,
    #[serde(default)]
    pub frequency: PickupFrequency,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl PickupSchedule {
    pub fn new(
        schedule_id: u64,
        facility_id: u64,
        area: impl Into<String>,
        pickup_day: Weekday,
    ) -> Self {
        Self {
            schedule_id,
            facility_id,
            area: area.into(),
            pickup_day,
            pickup_time: None,
            waste_types: BTreeSet::new(),
            frequency: PickupFrequency::Weekly,
            active: true,
        }
    }

    /// Whether this schedule covers `city`. A blank city matches everything.
    pub fn serves(&self, city: &str) -> bool {
        let city = city.trim().to_lowercase();
        city.is_empty() || self.area.to_lowercase().contains(&city)
    }
}

/// The pickup schedules of one facility catalog.
#[derive(Debug, Clone, Default)]
pub struct PickupDirectory {
    schedules: Vec<PickupSchedule>,
}

impl PickupDirectory {
    /// Build a directory. Every schedule must reference a facility in
    /// `facilities`, and schedule ids must be unique.
    pub fn new(schedules: Vec<PickupSchedule>, facilities: &[Facility]) -> Result<Self, GeoError> {
        let known: HashSet<u64> = facilities.iter().map(|f| f.facility_id).collect();
        let mut seen = HashSet::new();
        for schedule in &schedules {
            if !seen.insert(schedule.schedule_id) {
                return Err(GeoError::DuplicateSchedule(schedule.schedule_id));
            }
            if !known.contains(&schedule.facility_id) {
                return Err(GeoError::UnknownFacility {
                    schedule_id: schedule.schedule_id,
                    facility_id: schedule.facility_id,
                });
            }
        }
        Ok(Self { schedules })
    }

    pub fn schedules(&self) -> &[PickupSchedule] {
        &self.schedules
    }

    /// Active schedules serving `city` (all active ones when `None`),
    /// ordered Monday first, then by area and id.
    pub fn for_city(&self, city: Option<&str>) -> Vec<&PickupSchedule> {
        let mut hits: Vec<&PickupSchedule> = self
            .schedules
            .iter()
            .filter(|s| s.active)
            .filter(|s| city.map_or(true, |c| s.serves(c)))
            .collect();
        hits.sort_by(|a, b| {
            a.pickup_day
                .num_days_from_monday()
                .cmp(&b.pickup_day.num_days_from_monday())
                .then_with(|| a.area.cmp(&b.area))
                .then(a.schedule_id.cmp(&b.schedule_id))
        });
        hits
    }
}

/// Read pickup schedules from a JSON array file.
pub fn load_schedules(path: impl AsRef<Path>) -> Result<Vec<PickupSchedule>, GeoError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| GeoError::IoError {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&json)?)
}

/// Schedules matching [`crate::sample_facilities`].
pub fn sample_schedules() -> Vec<PickupSchedule> {
    use WasteCategory::{Hazardous, Organic, Recyclable};

    let schedule = |id, facility, area: &str, day, time: &str, types: &[WasteCategory]| {
        let mut s = PickupSchedule::new(id, facility, area, day);
        s.pickup_time = Some(time.to_string());
        s.waste_types = types.iter().copied().collect();
        s
    };

    let central = schedule(1, 1, "Kathmandu - Central", Weekday::Mon, "09:00 AM", &[Organic, Recyclable]);
    let north = schedule(2, 1, "Kathmandu - North", Weekday::Wed, "09:00 AM", &[Organic, Recyclable]);
    // Electronics go with hazardous waste.
    let mut lalitpur = schedule(3, 2, "Lalitpur", Weekday::Fri, "10:00 AM", &[Recyclable, Hazardous]);
    lalitpur.frequency = PickupFrequency::BiWeekly;

    vec![central, north, lalitpur]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::sample_facilities;
    use tempfile::tempdir;

    fn directory() -> PickupDirectory {
        PickupDirectory::new(sample_schedules(), &sample_facilities()).unwrap()
    }

    fn ids(hits: &[&PickupSchedule]) -> Vec<u64> {
        hits.iter().map(|s| s.schedule_id).collect()
    }

    #[test]
    fn city_filter_is_case_insensitive_substring() {
        let dir = directory();
        assert_eq!(ids(&dir.for_city(Some("kathmandu"))), vec![1, 2]);
        assert_eq!(ids(&dir.for_city(Some("LALITPUR"))), vec![3]);
        assert!(dir.for_city(Some("Pokhara")).is_empty());
    }

    #[test]
    fn no_city_or_blank_city_lists_all_active() {
        let mut schedules = sample_schedules();
        schedules[1].active = false;
        let dir = PickupDirectory::new(schedules, &sample_facilities()).unwrap();
        assert_eq!(ids(&dir.for_city(None)), vec![1, 3]);
        assert_eq!(ids(&dir.for_city(Some("  "))), vec![1, 3]);
    }

    #[test]
    fn ordered_by_weekday_then_area() {
        let mut schedules = sample_schedules();
        schedules.push(PickupSchedule::new(4, 3, "Baneshwor", Weekday::Mon));
        schedules.push(PickupSchedule::new(5, 3, "Kathmandu - East", Weekday::Sun));
        let dir = PickupDirectory::new(schedules, &sample_facilities()).unwrap();
        assert_eq!(ids(&dir.for_city(None)), vec![4, 1, 2, 3, 5]);
    }

    #[test]
    fn schedules_must_reference_known_facilities() {
        let orphan = PickupSchedule::new(9, 42, "Bhaktapur", Weekday::Tue);
        assert!(matches!(
            PickupDirectory::new(vec![orphan], &sample_facilities()),
            Err(GeoError::UnknownFacility {
                schedule_id: 9,
                facility_id: 42
            })
        ));
    }

    #[test]
    fn duplicate_schedule_ids_rejected() {
        let mut schedules = sample_schedules();
        schedules[2].schedule_id = 1;
        assert!(matches!(
            PickupDirectory::new(schedules, &sample_facilities()),
            Err(GeoError::DuplicateSchedule(1))
        ));
    }

    #[test]
    fn schedules_load_from_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pickups.json");
        fs::write(
            &path,
            r#"[{"schedule_id": 7, "facility_id": 1, "area": "Kathmandu - South",
                 "pickup_day": "Thursday", "frequency": "bi-weekly",
                 "waste_types": ["organic"]}]"#,
        )
        .unwrap();

        let loaded = load_schedules(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].pickup_day, Weekday::Thu);
        assert_eq!(loaded[0].frequency, PickupFrequency::BiWeekly);
        assert!(loaded[0].active);
        assert!(loaded[0].pickup_time.is_none());
    }
}
