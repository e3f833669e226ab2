// goal.rs — Goals and the progress evaluator.
//
// A goal's `current_value` and `completed` flag are derived state. Every
// evaluation recomputes the value from the full event set filtered by the
// goal's window; nothing is accumulated between passes.
//
// Completion policy differs by goal type:
//   reduce          → satisfied while value <= target; revoked on regression
//   recycle / track → satisfied once value >= target; never revoked
//
// A "Goal Achieved!" notification fires only on the false → true edge of
// the stored `completed` flag. Revocation is silent.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProgressError;
use crate::event::DisposalEvent;
use crate::notification::{Notification, NotificationEmitter, NotificationKind};

const GOAL_ACHIEVED_TITLE: &str = "Goal Achieved!";
const GOALS_LINK: &str = "/goals";

/// What a goal measures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    /// Keep total generated waste at or below the target.
    Reduce,
    /// Recycle at least the target (kg or items).
    Recycle,
    /// Log at least the target number of disposal events.
    Track,
}

impl GoalType {
    /// Whether `value` meets the target under this type's predicate.
    pub fn is_satisfied(&self, value: f64, target: f64) -> bool {
        match self {
            GoalType::Reduce => value <= target,
            GoalType::Recycle | GoalType::Track => value >= target,
        }
    }

    /// Reduction goals describe a live state and can lose completion.
    /// Accumulation goals are milestones and keep it.
    pub fn is_revocable(&self) -> bool {
        matches!(self, GoalType::Reduce)
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalType::Reduce => f.pad("reduce"),
            GoalType::Recycle => f.pad("recycle"),
            GoalType::Track => f.pad("track"),
        }
    }
}

impl FromStr for GoalType {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reduce" => Ok(GoalType::Reduce),
            "recycle" => Ok(GoalType::Recycle),
            "track" => Ok(GoalType::Track),
            other => Err(ProgressError::invalid(
                "goal_type",
                format!("unknown goal type '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalUnit {
    #[default]
    Kg,
    Count,
}

impl fmt::Display for GoalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalUnit::Kg => f.pad("kg"),
            GoalUnit::Count => f.pad("count"),
        }
    }
}

impl FromStr for GoalUnit {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kg" => Ok(GoalUnit::Kg),
            "count" => Ok(GoalUnit::Count),
            other => Err(ProgressError::invalid(
                "unit",
                format!("unknown unit '{}'", other),
            )),
        }
    }
}

/// Inclusive timestamp range. An absent bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Window {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| at >= start) && self.end.map_or(true, |end| at <= end)
    }
}

/// A user's goal. `current_value` and `completed` are written back by the
/// evaluator and are never authoritative input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goal {
    pub goal_id: Uuid,
    pub user_id: String,
    pub goal_type: GoalType,
    pub target_value: f64,
    #[serde(default)]
    pub current_value: f64,
    #[serde(default)]
    pub unit: GoalUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    /// Create an all-time goal. The target must be a finite value > 0.
    pub fn new(
        user_id: impl Into<String>,
        goal_type: GoalType,
        target_value: f64,
        unit: GoalUnit,
    ) -> Result<Self, ProgressError> {
        let goal = Self {
            goal_id: Uuid::new_v4(),
            user_id: user_id.into(),
            goal_type,
            target_value,
            current_value: 0.0,
            unit,
            window_start: None,
            window_end: None,
            completed: false,
            created_at: Utc::now(),
        };
        goal.validate()?;
        Ok(goal)
    }

    /// Restrict the goal to an inclusive window.
    pub fn with_window(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, ProgressError> {
        self.window_start = start;
        self.window_end = end;
        self.validate()?;
        Ok(self)
    }

    pub fn window(&self) -> Window {
        Window {
            start: self.window_start,
            end: self.window_end,
        }
    }

    pub fn validate(&self) -> Result<(), ProgressError> {
        if !self.target_value.is_finite() || self.target_value <= 0.0 {
            return Err(ProgressError::invalid(
                "target_value",
                format!("must be a finite value > 0, got {}", self.target_value),
            ));
        }
        if let (Some(start), Some(end)) = (self.window_start, self.window_end) {
            if start > end {
                return Err(ProgressError::invalid(
                    "window",
                    format!("window_start {} is after window_end {}", start, end),
                ));
            }
        }
        Ok(())
    }

    fn achieved_message(&self) -> String {
        match self.goal_type {
            GoalType::Reduce => format!(
                "You achieved your goal to reduce waste to {} {}!",
                self.target_value, self.unit
            ),
            GoalType::Recycle => format!(
                "You achieved your recycling goal of {} {}!",
                self.target_value, self.unit
            ),
            GoalType::Track => format!("You tracked {} waste entries!", self.target_value),
        }
    }
}

/// Result of evaluating one goal.
#[derive(Debug, Clone)]
pub struct GoalEvaluation {
    /// The goal with `current_value` and `completed` rewritten.
    pub goal: Goal,
    /// Present only when this pass crossed from not-completed to completed.
    pub notification: Option<Notification>,
}

impl GoalEvaluation {
    pub fn changed_from(&self, previous: &Goal) -> bool {
        self.goal.current_value != previous.current_value
            || self.goal.completed != previous.completed
    }
}

/// A goal that could not be evaluated in a batch pass.
#[derive(Debug)]
pub struct GoalFailure {
    pub goal_id: Uuid,
    pub error: ProgressError,
}

/// Outcome of evaluating every goal a user has.
#[derive(Debug, Default)]
pub struct GoalBatch {
    pub evaluated: Vec<GoalEvaluation>,
    pub failures: Vec<GoalFailure>,
}

/// Recomputes goal progress from a user's events.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoalEvaluator;

impl GoalEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Compute a goal's current value from the events inside its window.
    pub fn measure(&self, goal: &Goal, events: &[DisposalEvent]) -> Result<f64, ProgressError> {
        let window = goal.window();
        let in_window = events.iter().filter(|e| window.contains(e.disposed_at));

        let value = match goal.goal_type {
            GoalType::Reduce => sum_weights(in_window)?,
            GoalType::Recycle => {
                let recycled = in_window.filter(|e| e.recycled);
                match goal.unit {
                    GoalUnit::Kg => sum_weights(recycled)?,
                    GoalUnit::Count => recycled.count() as f64,
                }
            }
            GoalType::Track => in_window.count() as f64,
        };
        Ok(value)
    }

    /// Evaluate one goal against the user's full event set.
    ///
    /// Emits at most one notification, and only when the stored `completed`
    /// flag goes from false to true. Re-running with unchanged events is a
    /// no-op apart from returning the same values.
    pub fn evaluate(
        &self,
        goal: &Goal,
        events: &[DisposalEvent],
        emitter: &NotificationEmitter,
    ) -> Result<GoalEvaluation, ProgressError> {
        goal.validate()?;
        let value = self.measure(goal, events)?;
        let satisfied = goal.goal_type.is_satisfied(value, goal.target_value);
        let was_completed = goal.completed;

        let completed = match (was_completed, satisfied) {
            (false, true) => true,
            (true, false) => !goal.goal_type.is_revocable(),
            (settled, _) => settled,
        };

        let mut updated = goal.clone();
        updated.current_value = value;
        updated.completed = completed;

        let notification = if !was_completed && completed {
            tracing::info!(
                goal_id = %goal.goal_id,
                goal_type = %goal.goal_type,
                value,
                target = goal.target_value,
                "goal achieved"
            );
            Some(emitter.emit(
                &goal.user_id,
                GOAL_ACHIEVED_TITLE,
                &goal.achieved_message(),
                NotificationKind::Achievement,
                Some(GOALS_LINK),
            ))
        } else {
            if was_completed && !completed {
                tracing::debug!(goal_id = %goal.goal_id, value, "goal completion revoked");
            }
            None
        };

        Ok(GoalEvaluation {
            goal: updated,
            notification,
        })
    }

    /// Evaluate every goal. A goal that fails validation is reported and
    /// skipped; the rest are still evaluated.
    pub fn evaluate_all(
        &self,
        goals: &[Goal],
        events: &[DisposalEvent],
        emitter: &NotificationEmitter,
    ) -> GoalBatch {
        let mut batch = GoalBatch::default();
        for goal in goals {
            match self.evaluate(goal, events, emitter) {
                Ok(evaluation) => batch.evaluated.push(evaluation),
                Err(error) => {
                    tracing::warn!(goal_id = %goal.goal_id, "skipping goal: {}", error);
                    batch.failures.push(GoalFailure {
                        goal_id: goal.goal_id,
                        error,
                    });
                }
            }
        }
        batch
    }
}

fn sum_weights<'a>(events: impl Iterator<Item = &'a DisposalEvent>) -> Result<f64, ProgressError> {
    let mut total = 0.0;
    for event in events {
        event.validate()?;
        total += event.weight_or_zero();
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::WasteCategory;
    use crate::notification::MemorySink;
    use chrono::{Duration, TimeZone};

    fn day(n: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, n, 12, 0, 0).unwrap()
    }

    fn weighed(kg: f64, recycled: bool, at: DateTime<Utc>) -> DisposalEvent {
        DisposalEvent::new("u1", WasteCategory::Recyclable, at)
            .with_weight(kg)
            .unwrap()
            .recycled(recycled)
    }

    fn emitter() -> (NotificationEmitter, MemorySink) {
        let sink = MemorySink::new();
        (
            NotificationEmitter::new().with_sink(Box::new(sink.clone())),
            sink,
        )
    }

    #[test]
    fn non_positive_target_rejected() {
        assert!(Goal::new("u1", GoalType::Reduce, 0.0, GoalUnit::Kg).is_err());
        assert!(Goal::new("u1", GoalType::Track, -3.0, GoalUnit::Count).is_err());
        assert!(Goal::new("u1", GoalType::Track, f64::NAN, GoalUnit::Count).is_err());
    }

    #[test]
    fn inverted_window_rejected() {
        let goal = Goal::new("u1", GoalType::Track, 1.0, GoalUnit::Count).unwrap();
        assert!(goal.with_window(Some(day(5)), Some(day(2))).is_err());
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = Window {
            start: Some(day(2)),
            end: Some(day(4)),
        };
        assert!(window.contains(day(2)));
        assert!(window.contains(day(4)));
        assert!(!window.contains(day(2) - Duration::seconds(1)));
        assert!(!window.contains(day(4) + Duration::seconds(1)));
        assert!(Window::default().contains(day(1)));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let (emitter, sink) = emitter();
        let goal = Goal::new("u1", GoalType::Track, 2.0, GoalUnit::Count).unwrap();
        let events = vec![weighed(1.0, false, day(1)), weighed(1.0, false, day(2))];

        let first = GoalEvaluator::new().evaluate(&goal, &events, &emitter).unwrap();
        let second = GoalEvaluator::new()
            .evaluate(&first.goal, &events, &emitter)
            .unwrap();

        assert_eq!(first.goal.current_value, second.goal.current_value);
        assert_eq!(first.goal.completed, second.goal.completed);
        assert!(first.notification.is_some());
        assert!(second.notification.is_none());
        assert_eq!(sink.notifications().len(), 1);
    }

    #[test]
    fn reduce_goal_completion_is_revoked_silently() {
        let (emitter, sink) = emitter();
        let goal = Goal::new("u1", GoalType::Reduce, 10.0, GoalUnit::Kg).unwrap();
        let mut events = vec![weighed(2.0, false, day(1)), weighed(3.0, true, day(2))];

        let under = GoalEvaluator::new().evaluate(&goal, &events, &emitter).unwrap();
        assert_eq!(under.goal.current_value, 5.0);
        assert!(under.goal.completed);
        assert!(under.notification.is_some());

        events.push(weighed(10.0, false, day(3)));
        let over = GoalEvaluator::new()
            .evaluate(&under.goal, &events, &emitter)
            .unwrap();
        assert_eq!(over.goal.current_value, 15.0);
        assert!(!over.goal.completed);
        assert!(over.notification.is_none());
        assert_eq!(sink.notifications().len(), 1);
    }

    #[test]
    fn reduce_goal_with_no_events_is_trivially_complete() {
        let (emitter, _) = emitter();
        let goal = Goal::new("u1", GoalType::Reduce, 1.0, GoalUnit::Kg).unwrap();
        let result = GoalEvaluator::new().evaluate(&goal, &[], &emitter).unwrap();
        assert_eq!(result.goal.current_value, 0.0);
        assert!(result.goal.completed);
    }

    #[test]
    fn recycle_goal_completion_is_a_ratchet() {
        let (emitter, _) = emitter();
        let goal = Goal::new("u1", GoalType::Recycle, 5.0, GoalUnit::Kg).unwrap();
        let mut events = vec![weighed(6.0, true, day(1))];

        let reached = GoalEvaluator::new().evaluate(&goal, &events, &emitter).unwrap();
        assert!(reached.goal.completed);

        // The host un-marks the event as recycled.
        events[0].recycled = false;
        let regressed = GoalEvaluator::new()
            .evaluate(&reached.goal, &events, &emitter)
            .unwrap();
        assert_eq!(regressed.goal.current_value, 0.0);
        assert!(regressed.goal.completed);
        assert!(regressed.notification.is_none());

        // Same regression on a reduce goal does revoke.
        let reduce = Goal::new("u1", GoalType::Reduce, 5.0, GoalUnit::Kg).unwrap();
        let mut heavy = vec![weighed(1.0, false, day(1))];
        let done = GoalEvaluator::new().evaluate(&reduce, &heavy, &emitter).unwrap();
        heavy.push(weighed(9.0, false, day(2)));
        let undone = GoalEvaluator::new()
            .evaluate(&done.goal, &heavy, &emitter)
            .unwrap();
        assert!(!undone.goal.completed);
    }

    #[test]
    fn recycle_goal_counts_items_when_unit_is_count() {
        let (emitter, _) = emitter();
        let goal = Goal::new("u1", GoalType::Recycle, 2.0, GoalUnit::Count).unwrap();
        let events = vec![
            weighed(0.5, true, day(1)),
            weighed(7.0, false, day(1)),
            DisposalEvent::new("u1", WasteCategory::Organic, day(2)).recycled(true),
        ];
        let result = GoalEvaluator::new().evaluate(&goal, &events, &emitter).unwrap();
        assert_eq!(result.goal.current_value, 2.0);
        assert!(result.goal.completed);
    }

    #[test]
    fn track_goal_counts_every_event() {
        let evaluator = GoalEvaluator::new();
        let goal = Goal::new("u1", GoalType::Track, 10.0, GoalUnit::Count).unwrap();
        let events = vec![
            weighed(1.0, true, day(1)),
            DisposalEvent::new("u1", WasteCategory::Hazardous, day(2)),
            DisposalEvent::new("u1", WasteCategory::Other, day(3)),
        ];
        assert_eq!(evaluator.measure(&goal, &events).unwrap(), 3.0);
    }

    #[test]
    fn window_start_excludes_earlier_events() {
        let evaluator = GoalEvaluator::new();
        let goal = Goal::new("u1", GoalType::Reduce, 100.0, GoalUnit::Kg)
            .unwrap()
            .with_window(Some(day(10)), None)
            .unwrap();
        let events = vec![
            weighed(4.0, false, day(9)),
            weighed(1.5, false, day(10)),
            weighed(2.5, false, day(20)),
        ];
        assert_eq!(evaluator.measure(&goal, &events).unwrap(), 4.0);
    }

    #[test]
    fn invalid_weight_fails_only_that_goal() {
        let (emitter, _) = emitter();
        let mut bad = weighed(1.0, false, day(1));
        bad.weight_kg = Some(-4.0);
        let events = vec![bad, weighed(2.0, false, day(2))];

        let reduce = Goal::new("u1", GoalType::Reduce, 10.0, GoalUnit::Kg).unwrap();
        let track = Goal::new("u1", GoalType::Track, 1.0, GoalUnit::Count).unwrap();
        let batch = GoalEvaluator::new().evaluate_all(&[reduce.clone(), track], &events, &emitter);

        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].goal_id, reduce.goal_id);
        assert_eq!(batch.evaluated.len(), 1);
        assert_eq!(batch.evaluated[0].goal.current_value, 2.0);
    }

    #[test]
    fn stored_value_is_not_authoritative() {
        let (emitter, _) = emitter();
        let mut goal = Goal::new("u1", GoalType::Track, 5.0, GoalUnit::Count).unwrap();
        goal.current_value = 42.0;
        let events = vec![weighed(1.0, false, day(1))];
        let result = GoalEvaluator::new().evaluate(&goal, &events, &emitter).unwrap();
        assert_eq!(result.goal.current_value, 1.0);
        assert!(!result.goal.completed);
        assert!(result.changed_from(&goal));
    }

    #[test]
    fn achieved_message_matches_goal_type() {
        let (emitter, _) = emitter();
        let goal = Goal::new("u1", GoalType::Recycle, 3.0, GoalUnit::Kg).unwrap();
        let events = vec![weighed(3.0, true, day(1))];
        let note = GoalEvaluator::new()
            .evaluate(&goal, &events, &emitter)
            .unwrap()
            .notification
            .unwrap();
        assert_eq!(note.title, "Goal Achieved!");
        assert_eq!(note.body, "You achieved your recycling goal of 3 kg!");
        assert_eq!(note.link.as_deref(), Some("/goals"));
        assert_eq!(note.kind, NotificationKind::Achievement);
    }
}
