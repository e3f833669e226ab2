// achievement.rs — Lifetime achievement catalog and the rule engine.
//
// The catalog is a declarative table of {key, title, description, rule}.
// Every rule is evaluated the same way against one set of lifetime stats,
// so adding an achievement means adding a row, not a branch.
//
// Unlocks are exactly-once and permanent: a key already present in the
// caller's unlock set is skipped by membership, without re-testing its
// rule, and the engine never removes an unlock.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProgressError;
use crate::event::DisposalEvent;
use crate::notification::{Notification, NotificationEmitter, NotificationKind};

const ACHIEVEMENT_TITLE: &str = "Achievement Unlocked!";
const DASHBOARD_LINK: &str = "/dashboard";

/// Lifetime counters every achievement rule reads.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AchievementStats {
    pub total_entries: usize,
    pub recycled_count: usize,
    /// Sum over recycled events whose weight is valid.
    pub total_recycled_weight_kg: f64,
    /// Recycled events whose weight failed validation. While non-zero the
    /// weight metric is unusable.
    #[serde(default)]
    pub invalid_recycled_weights: usize,
}

impl AchievementStats {
    /// Aggregate over every event the user has. No windowing.
    ///
    /// Counts don't read weights, so an event with a bad weight still counts
    /// as an entry; it only poisons [`Metric::RecycledWeightKg`].
    pub fn from_events(events: &[DisposalEvent]) -> Self {
        let mut stats = Self {
            total_entries: events.len(),
            ..Self::default()
        };
        for event in events.iter().filter(|e| e.recycled) {
            stats.recycled_count += 1;
            match event.validate() {
                Ok(()) => stats.total_recycled_weight_kg += event.weight_or_zero(),
                Err(_) => stats.invalid_recycled_weights += 1,
            }
        }
        stats
    }

    /// Read one metric, or explain why it can't be trusted.
    pub fn metric(&self, metric: Metric) -> Result<f64, String> {
        let value = match metric {
            Metric::TotalEntries => self.total_entries as f64,
            Metric::RecycledCount => self.recycled_count as f64,
            Metric::RecycledWeightKg => {
                if self.invalid_recycled_weights > 0 {
                    return Err(format!(
                        "{} recycled event(s) have an invalid weight",
                        self.invalid_recycled_weights
                    ));
                }
                self.total_recycled_weight_kg
            }
        };
        if !value.is_finite() {
            return Err(format!("{} is not a finite number ({})", metric, value));
        }
        Ok(value)
    }
}

/// A stat an achievement rule can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    TotalEntries,
    RecycledCount,
    RecycledWeightKg,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::TotalEntries => write!(f, "total_entries"),
            Metric::RecycledCount => write!(f, "recycled_count"),
            Metric::RecycledWeightKg => write!(f, "recycled_weight_kg"),
        }
    }
}

/// A predicate over [`AchievementStats`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum AchievementRule {
    /// The metric has reached `threshold`.
    AtLeast { metric: Metric, threshold: f64 },
}

impl AchievementRule {
    /// Test the rule. Errors when the metric it reads is unusable.
    pub fn evaluate(&self, stats: &AchievementStats) -> Result<bool, String> {
        match *self {
            AchievementRule::AtLeast { metric, threshold } => {
                Ok(stats.metric(metric)? >= threshold)
            }
        }
    }
}

/// One entry in the achievement catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AchievementDefinition {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub rule: AchievementRule,
}

const fn at_least(metric: Metric, threshold: f64) -> AchievementRule {
    AchievementRule::AtLeast { metric, threshold }
}

/// The built-in catalog, in evaluation order.
pub const CATALOG: &[AchievementDefinition] = &[
    AchievementDefinition {
        key: "first_entry",
        title: "First Step",
        description: "Tracked your first waste entry!",
        rule: at_least(Metric::TotalEntries, 1.0),
    },
    AchievementDefinition {
        key: "five_entries",
        title: "Getting Started",
        description: "Tracked 5 waste entries!",
        rule: at_least(Metric::TotalEntries, 5.0),
    },
    AchievementDefinition {
        key: "ten_entries",
        title: "Waste Warrior",
        description: "Tracked 10 waste entries!",
        rule: at_least(Metric::TotalEntries, 10.0),
    },
    AchievementDefinition {
        key: "twenty_five_entries",
        title: "Eco Champion",
        description: "Tracked 25 waste entries!",
        rule: at_least(Metric::TotalEntries, 25.0),
    },
    AchievementDefinition {
        key: "first_recycle",
        title: "Recycler",
        description: "Recycled your first item!",
        rule: at_least(Metric::RecycledCount, 1.0),
    },
    AchievementDefinition {
        key: "ten_recycles",
        title: "Recycling Master",
        description: "Recycled 10 items!",
        rule: at_least(Metric::RecycledCount, 10.0),
    },
    AchievementDefinition {
        key: "fifty_kg_recycled",
        title: "Eco Hero",
        description: "Recycled 50 kg of waste!",
        rule: at_least(Metric::RecycledWeightKg, 50.0),
    },
];

/// A persisted unlock. At most one per (user_id, achievement_key).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AchievementUnlock {
    pub user_id: String,
    pub achievement_key: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub unlocked_at: DateTime<Utc>,
}

/// A catalog entry whose rule could not be evaluated on this pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFailure {
    pub key: String,
    pub reason: String,
}

impl From<RuleFailure> for ProgressError {
    fn from(failure: RuleFailure) -> Self {
        ProgressError::RuleFailed {
            key: failure.key,
            reason: failure.reason,
        }
    }
}

/// New unlocks (each paired with its notification) from one pass.
#[derive(Debug, Clone, Default)]
pub struct AchievementEvaluation {
    pub unlocked: Vec<AchievementUnlock>,
    pub notifications: Vec<Notification>,
    pub failures: Vec<RuleFailure>,
}

impl AchievementEvaluation {
    pub fn unlocked_keys(&self) -> impl Iterator<Item = &str> {
        self.unlocked.iter().map(|u| u.achievement_key.as_str())
    }
}

/// Evaluates a fixed achievement catalog against lifetime stats.
#[derive(Debug, Clone)]
pub struct AchievementEngine {
    catalog: Vec<AchievementDefinition>,
}

impl AchievementEngine {
    /// Engine over the built-in [`CATALOG`].
    pub fn new() -> Self {
        Self {
            catalog: CATALOG.to_vec(),
        }
    }

    /// Engine over a custom catalog. Keys must be unique.
    pub fn with_catalog(catalog: Vec<AchievementDefinition>) -> Result<Self, ProgressError> {
        let mut seen = HashSet::new();
        for definition in &catalog {
            if !seen.insert(definition.key) {
                return Err(ProgressError::DuplicateAchievement(
                    definition.key.to_string(),
                ));
            }
        }
        Ok(Self { catalog })
    }

    pub fn catalog(&self) -> &[AchievementDefinition] {
        &self.catalog
    }

    pub fn definition(&self, key: &str) -> Option<&AchievementDefinition> {
        self.catalog.iter().find(|d| d.key == key)
    }

    /// Produce the unlocks this user has earned but doesn't yet hold.
    ///
    /// Keys in `existing_unlocks`, or already unlocked earlier in this pass,
    /// are skipped outright. Each remaining rule is isolated: one that fails
    /// is reported in `failures` and the rest are still evaluated.
    pub fn evaluate(
        &self,
        user_id: &str,
        events: &[DisposalEvent],
        existing_unlocks: &HashSet<String>,
        emitter: &NotificationEmitter,
    ) -> AchievementEvaluation {
        let stats = AchievementStats::from_events(events);
        let mut result = AchievementEvaluation::default();
        let mut unlocked_now: HashSet<&str> = HashSet::new();

        for definition in &self.catalog {
            if existing_unlocks.contains(definition.key) || unlocked_now.contains(definition.key) {
                continue;
            }

            match definition.rule.evaluate(&stats) {
                Ok(true) => {
                    tracing::info!(user_id, key = definition.key, "achievement unlocked");
                    unlocked_now.insert(definition.key);
                    result.unlocked.push(AchievementUnlock {
                        user_id: user_id.to_string(),
                        achievement_key: definition.key.to_string(),
                        title: definition.title.to_string(),
                        description: definition.description.to_string(),
                        unlocked_at: Utc::now(),
                    });
                    result.notifications.push(emitter.emit(
                        user_id,
                        ACHIEVEMENT_TITLE,
                        &format!("{}: {}", definition.title, definition.description),
                        NotificationKind::Achievement,
                        Some(DASHBOARD_LINK),
                    ));
                }
                Ok(false) => {
                    tracing::debug!(user_id, key = definition.key, "achievement still locked");
                }
                Err(reason) => {
                    tracing::warn!(user_id, key = definition.key, "achievement rule failed: {}", reason);
                    result.failures.push(RuleFailure {
                        key: definition.key.to_string(),
                        reason,
                    });
                }
            }
        }

        result
    }
}

impl Default for AchievementEngine {
    fn default() -> Self {
        Self::new()
    }
}
