// engine.rs — ProgressEngine: the host-facing entry point.
//
// The engine is stateless between calls. It exposes four contracts:
//
//   evaluate_goal         (goal, events)            → updated goal + notification?
//   evaluate_achievements (user, events, unlocks)   → new unlocks + notifications
//   nearby_facilities     (lat, lng, radius, limit) → ranked facilities
//   distance_km           (lat1, lng1, lat2, lng2)  → km
//
// plus `evaluate_user`, which runs goals and achievements together after a
// disposal event is created or mutated. Goals and achievements read disjoint
// projections of the event set and don't depend on each other's output.
//
// The engine takes no locks. Hosts must serialize the read-evaluate-write
// cycle per user; different users can be evaluated in parallel.

use std::collections::HashSet;

use eco_geo::{
    Coordinates, Facility, FacilityLocator, NearbyFacility, PickupDirectory, PickupSchedule,
    SearchOptions,
};
use eco_progress::{
    AchievementEngine, AchievementEvaluation, DisposalEvent, Goal, GoalBatch, GoalEvaluation,
    GoalEvaluator, GoalFailure, LogSink, NotificationEmitter, ProgressError, UserStatistics,
    WasteCategory,
};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Everything one per-user pass produced, ready for the host to persist.
#[derive(Debug, Default)]
pub struct UserEvaluation {
    /// Goals with recomputed `current_value` / `completed`.
    pub goals: Vec<GoalEvaluation>,
    /// Goals that could not be evaluated; the rest of the pass still ran.
    pub goal_failures: Vec<GoalFailure>,
    pub achievements: AchievementEvaluation,
}

impl UserEvaluation {
    /// Number of notifications emitted during the pass.
    pub fn notification_count(&self) -> usize {
        self.goals
            .iter()
            .filter(|g| g.notification.is_some())
            .count()
            + self.achievements.notifications.len()
    }
}

pub struct ProgressEngine {
    locator: FacilityLocator,
    pickups: PickupDirectory,
    goals: GoalEvaluator,
    achievements: AchievementEngine,
    emitter: NotificationEmitter,
}

impl ProgressEngine {
    /// Build an engine over a facility catalog. If the config names a
    /// notification log, a [`LogSink`] is attached to the emitter.
    pub fn new(catalog: Vec<Facility>, config: &EngineConfig) -> Result<Self, EngineError> {
        let locator = FacilityLocator::new(catalog, config.locator.clone())?;
        let mut emitter = NotificationEmitter::new();
        if let Some(path) = &config.notifications.log_path {
            emitter.add_sink(Box::new(LogSink::new(path)));
        }
        Ok(Self {
            locator,
            pickups: PickupDirectory::default(),
            goals: GoalEvaluator::new(),
            achievements: AchievementEngine::new(),
            emitter,
        })
    }

    /// Replace the notification emitter (e.g. to add an in-memory sink).
    pub fn with_emitter(mut self, emitter: NotificationEmitter) -> Self {
        self.emitter = emitter;
        self
    }

    /// Attach pickup schedules. Each must reference a facility in the
    /// catalog the engine was built with.
    pub fn with_pickups(mut self, schedules: Vec<PickupSchedule>) -> Result<Self, EngineError> {
        self.pickups = PickupDirectory::new(schedules, self.locator.catalog())?;
        Ok(self)
    }

    pub fn achievement_engine(&self) -> &AchievementEngine {
        &self.achievements
    }

    pub fn locator(&self) -> &FacilityLocator {
        &self.locator
    }

    pub fn evaluate_goal(
        &self,
        goal: &Goal,
        events: &[DisposalEvent],
    ) -> Result<GoalEvaluation, EngineError> {
        Ok(self.goals.evaluate(goal, events, &self.emitter)?)
    }

    pub fn evaluate_goals(&self, goals: &[Goal], events: &[DisposalEvent]) -> GoalBatch {
        self.goals.evaluate_all(goals, events, &self.emitter)
    }

    pub fn evaluate_achievements(
        &self,
        user_id: &str,
        events: &[DisposalEvent],
        existing_unlock_keys: &HashSet<String>,
    ) -> AchievementEvaluation {
        self.achievements
            .evaluate(user_id, events, existing_unlock_keys, &self.emitter)
    }

    /// Run every goal and the achievement catalog for one user.
    ///
    /// Events and goals belonging to other users are not counted; a foreign
    /// goal is reported as a failure.
    pub fn evaluate_user(
        &self,
        user_id: &str,
        events: &[DisposalEvent],
        goals: &[Goal],
        existing_unlock_keys: &HashSet<String>,
    ) -> UserEvaluation {
        let scoped: Vec<DisposalEvent> = events
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        if scoped.len() != events.len() {
            tracing::warn!(
                user_id,
                ignored = events.len() - scoped.len(),
                "ignoring events owned by other users"
            );
        }

        let (owned, foreign): (Vec<Goal>, Vec<Goal>) =
            goals.iter().cloned().partition(|g| g.user_id == user_id);

        let mut batch = self.evaluate_goals(&owned, &scoped);
        batch
            .failures
            .extend(foreign.into_iter().map(|g| GoalFailure {
                goal_id: g.goal_id,
                error: ProgressError::InvalidInput {
                    field: "user_id",
                    reason: format!("goal belongs to '{}', not '{}'", g.user_id, user_id),
                },
            }));

        let achievements = self.evaluate_achievements(user_id, &scoped, existing_unlock_keys);

        let evaluation = UserEvaluation {
            goals: batch.evaluated,
            goal_failures: batch.failures,
            achievements,
        };
        tracing::info!(
            user_id,
            events = scoped.len(),
            goals = evaluation.goals.len(),
            unlocked = evaluation.achievements.unlocked.len(),
            notifications = evaluation.notification_count(),
            "user evaluation complete"
        );
        evaluation
    }

    /// Active facilities near a location, nearest first.
    ///
    /// `lat`/`lng` may be absent (no location on file), which yields an
    /// empty list. `radius_km`/`limit` fall back to the configured defaults.
    pub fn nearby_facilities(
        &self,
        lat: Option<f64>,
        lng: Option<f64>,
        radius_km: Option<f64>,
        limit: Option<usize>,
    ) -> Result<Vec<NearbyFacility>, EngineError> {
        self.search(lat, lng, radius_km, limit, None)
    }

    /// Like [`ProgressEngine::nearby_facilities`], restricted to facilities
    /// that accept `category`.
    pub fn nearby_accepting(
        &self,
        lat: Option<f64>,
        lng: Option<f64>,
        category: WasteCategory,
        radius_km: Option<f64>,
        limit: Option<usize>,
    ) -> Result<Vec<NearbyFacility>, EngineError> {
        self.search(lat, lng, radius_km, limit, Some(category))
    }

    fn search(
        &self,
        lat: Option<f64>,
        lng: Option<f64>,
        radius_km: Option<f64>,
        limit: Option<usize>,
        category: Option<WasteCategory>,
    ) -> Result<Vec<NearbyFacility>, EngineError> {
        let origin = Coordinates::from_optional(lat, lng)?;
        let options = SearchOptions {
            radius_km,
            limit,
            category,
        };
        Ok(self.locator.search(origin, options)?)
    }

    /// Active pickup schedules serving `city`, Monday first.
    pub fn pickup_schedules(&self, city: Option<&str>) -> Vec<&PickupSchedule> {
        self.pickups.for_city(city)
    }

    pub fn distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
        eco_geo::distance_km(lat1, lng1, lat2, lng2)
    }

    pub fn statistics(events: &[DisposalEvent]) -> UserStatistics {
        UserStatistics::from_events(events)
    }
}
