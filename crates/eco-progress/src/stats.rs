// stats.rs — Lifetime statistics and environmental-impact estimates.
//
// CO2 factors are kg of CO2 avoided per kg of waste diverted:
//   recyclable 0.6, organic 0.3 (composting), hazardous 0.8, other 0.4.
// Trees saved: 17 per tonne of recycled recyclable waste.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::event::{DisposalEvent, WasteCategory};

const TREES_PER_TONNE: f64 = 17.0;

fn co2_factor(category: WasteCategory) -> f64 {
    match category {
        WasteCategory::Recyclable => 0.6,
        WasteCategory::Organic => 0.3,
        WasteCategory::Hazardous => 0.8,
        WasteCategory::Other => 0.4,
    }
}

/// Count and weight for one bucket (a category or a month).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub count: usize,
    pub weight_kg: f64,
}

impl Totals {
    fn add(&mut self, event: &DisposalEvent) {
        self.count += 1;
        self.weight_kg += event.weight_or_zero();
    }
}

/// Everything a statistics page shows for one user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserStatistics {
    pub total_entries: usize,
    pub total_weight_kg: f64,
    pub recycled_count: usize,
    pub recycled_weight_kg: f64,
    pub by_category: BTreeMap<WasteCategory, Totals>,
    /// Keyed by `YYYY-MM`.
    pub monthly: BTreeMap<String, Totals>,
    /// Percentage of entries marked recycled; 0 when there are no entries.
    pub recycling_rate_pct: f64,
    pub co2_saved_kg: f64,
    pub trees_saved: f64,
    /// What recyclable-category waste not yet marked recycled could save.
    pub potential_co2_kg: f64,
    pub potential_trees: f64,
}

impl UserStatistics {
    pub fn from_events(events: &[DisposalEvent]) -> Self {
        let mut stats = UserStatistics {
            total_entries: events.len(),
            ..Default::default()
        };

        for event in events {
            let weight = event.weight_or_zero();
            stats.total_weight_kg += weight;
            stats.by_category.entry(event.category).or_default().add(event);
            stats
                .monthly
                .entry(event.disposed_at.format("%Y-%m").to_string())
                .or_default()
                .add(event);

            if event.recycled {
                stats.recycled_count += 1;
                stats.recycled_weight_kg += weight;
                stats.co2_saved_kg += weight * co2_factor(event.category);
                if event.category == WasteCategory::Recyclable {
                    stats.trees_saved += weight / 1000.0 * TREES_PER_TONNE;
                }
            } else if event.category == WasteCategory::Recyclable {
                stats.potential_co2_kg += weight * co2_factor(WasteCategory::Recyclable);
                stats.potential_trees += weight / 1000.0 * TREES_PER_TONNE;
            }
        }

        if stats.total_entries > 0 {
            stats.recycling_rate_pct =
                stats.recycled_count as f64 / stats.total_entries as f64 * 100.0;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_history_has_zero_rate() {
        let stats = UserStatistics::from_events(&[]);
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.recycling_rate_pct, 0.0);
        assert!(stats.monthly.is_empty());
    }

    #[test]
    fn impact_estimates_follow_category_factors() {
        let at = Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap();
        let events = vec![
            DisposalEvent::new("u1", WasteCategory::Recyclable, at)
                .with_weight(10.0)
                .unwrap()
                .recycled(true),
            DisposalEvent::new("u1", WasteCategory::Organic, at)
                .with_weight(4.0)
                .unwrap()
                .recycled(true),
            DisposalEvent::new("u1", WasteCategory::Recyclable, at)
                .with_weight(5.0)
                .unwrap(),
            DisposalEvent::new("u1", WasteCategory::Hazardous, at),
        ];

        let stats = UserStatistics::from_events(&events);
        assert_eq!(stats.total_entries, 4);
        assert!(close(stats.total_weight_kg, 19.0));
        assert_eq!(stats.recycled_count, 2);
        assert!(close(stats.recycled_weight_kg, 14.0));
        assert!(close(stats.co2_saved_kg, 10.0 * 0.6 + 4.0 * 0.3));
        assert!(close(stats.trees_saved, 0.17));
        assert!(close(stats.potential_co2_kg, 3.0));
        assert!(close(stats.potential_trees, 0.085));
        assert!(close(stats.recycling_rate_pct, 50.0));
        assert_eq!(stats.by_category[&WasteCategory::Recyclable].count, 2);
        assert_eq!(stats.by_category[&WasteCategory::Hazardous].weight_kg, 0.0);
    }

    #[test]
    fn monthly_buckets_use_year_month() {
        let jan = Utc.with_ymd_and_hms(2026, 1, 31, 23, 0, 0).unwrap();
        let feb = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let events = vec![
            DisposalEvent::new("u1", WasteCategory::Other, jan),
            DisposalEvent::new("u1", WasteCategory::Other, feb),
            DisposalEvent::new("u1", WasteCategory::Other, feb),
        ];
        let stats = UserStatistics::from_events(&events);
        assert_eq!(stats.monthly["2026-01"].count, 1);
        assert_eq!(stats.monthly["2026-02"].count, 2);
    }
}
