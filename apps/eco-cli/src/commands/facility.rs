// facility.rs — Facility queries: nearby, pickups, distance.

use eco_engine::{ProgressEngine, WasteCategory};

use crate::host::Host;

pub fn nearby(
    host: &Host,
    lat: Option<f64>,
    lng: Option<f64>,
    radius_km: Option<f64>,
    limit: Option<usize>,
    category: Option<WasteCategory>,
) -> anyhow::Result<()> {
    let hits = match category {
        Some(category) => host
            .engine
            .nearby_accepting(lat, lng, category, radius_km, limit)?,
        None => host.engine.nearby_facilities(lat, lng, radius_km, limit)?,
    };

    if hits.is_empty() {
        let radius = radius_km.unwrap_or(host.engine.locator().config().default_radius_km);
        println!("No facilities found within {} km.", radius);
        return Ok(());
    }

    for hit in &hits {
        let accepts: Vec<&str> = hit
            .facility
            .accepted_categories
            .iter()
            .map(|c| c.as_str())
            .collect();
        println!(
            "{:>6.2} km  {}  ({})",
            hit.distance_km, hit.facility.name, hit.facility.address
        );
        println!("           accepts: {}", accepts.join(", "));
        if let Some(hours) = &hit.facility.hours {
            println!("           hours:   {}", hours);
        }
    }
    Ok(())
}

pub fn pickups(host: &Host, city: Option<&str>) -> anyhow::Result<()> {
    let schedules = host.engine.pickup_schedules(city);
    if schedules.is_empty() {
        println!("No pickup schedules found.");
        return Ok(());
    }

    println!(
        "{:<4} {:<10} {:<24} {:<10} {:<28} FACILITY",
        "DAY", "TIME", "AREA", "FREQUENCY", "WASTE TYPES"
    );
    for schedule in schedules {
        let types: Vec<&str> = schedule.waste_types.iter().map(|c| c.as_str()).collect();
        let facility = host
            .engine
            .locator()
            .catalog()
            .iter()
            .find(|f| f.facility_id == schedule.facility_id)
            .map_or("-", |f| f.name.as_str());
        println!(
            "{:<4} {:<10} {:<24} {:<10} {:<28} {}",
            schedule.pickup_day.to_string(),
            schedule.pickup_time.as_deref().unwrap_or("-"),
            schedule.area,
            schedule.frequency,
            types.join(", "),
            facility
        );
    }
    Ok(())
}

pub fn distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> anyhow::Result<()> {
    // Both points must be valid coordinates.
    eco_geo::Coordinates::new(lat1, lng1)?;
    eco_geo::Coordinates::new(lat2, lng2)?;
    println!("{:.3} km", ProgressEngine::distance_km(lat1, lng1, lat2, lng2));
    Ok(())
}
