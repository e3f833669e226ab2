// host.rs — Wires the engine to the CLI's file-backed storage.

use std::path::{Path, PathBuf};

use eco_engine::{AchievementUnlock, EngineConfig, Goal, ProgressEngine};
use eco_geo::{load_catalog, load_schedules, sample_facilities, sample_schedules};
use eco_progress::{LogSink, MemorySink, NotificationEmitter, NotificationSink, ProgressError};

use crate::store::{DataLayout, UserStore};

pub struct Host {
    pub layout: DataLayout,
    pub engine: ProgressEngine,
    /// Shared-by-all-users copy of every delivered notification, if configured.
    pub audit_log: Option<PathBuf>,
    /// Notifications emitted by the current pass, not yet delivered.
    pending: MemorySink,
}

/// What one persisted pass changed.
#[derive(Debug, Default)]
pub struct PassSummary {
    pub goals_evaluated: usize,
    pub goals_completed: Vec<Goal>,
    pub new_unlocks: Vec<AchievementUnlock>,
    pub failures: Vec<String>,
    pub notifications_delivered: usize,
}

impl Host {
    /// Load config, the facility catalog and pickup schedules from
    /// `data_dir`.
    ///
    /// A configured `log_path` becomes the audit log; a relative one is
    /// resolved against the data directory. The engine itself only buffers
    /// notifications: they are delivered once the pass is persisted.
    pub fn load(data_dir: &Path) -> anyhow::Result<Self> {
        let layout = DataLayout::for_dir(data_dir);
        let mut config = EngineConfig::load_or_default(&layout.config_path)?;
        let audit_log = config.notifications.log_path.take().map(|path| {
            if path.is_relative() {
                layout.root.join(path)
            } else {
                path
            }
        });

        let catalog = if layout.facilities_path.exists() {
            load_catalog(&layout.facilities_path)?
        } else {
            tracing::debug!("no facility catalog found, using the seeded sample");
            sample_facilities()
        };
        let schedules = if layout.pickups_path.exists() {
            load_schedules(&layout.pickups_path)?
        } else if layout.facilities_path.exists() {
            Vec::new()
        } else {
            sample_schedules()
        };

        let pending = MemorySink::new();
        let engine = ProgressEngine::new(catalog, &config)?
            .with_pickups(schedules)?
            .with_emitter(NotificationEmitter::new().with_sink(Box::new(pending.clone())));
        Ok(Self {
            layout,
            engine,
            audit_log,
            pending,
        })
    }

    pub fn user(&self, user_id: &str) -> anyhow::Result<UserStore> {
        UserStore::open(&self.layout, user_id)
    }

    /// Re-evaluate one user and persist goals, unlocks and notifications.
    ///
    /// Notifications reach the inbox only after goals and unlocks are saved,
    /// so a failed save never leaves a notification for state that wasn't
    /// recorded. Callers must hold the user's lock for the whole
    /// read-modify-write, including any event mutation that triggered it.
    pub fn reevaluate(&self, store: &UserStore) -> anyhow::Result<PassSummary> {
        let stale = self.pending.drain();
        if !stale.is_empty() {
            tracing::debug!(discarded = stale.len(), "dropping notifications of an unsaved pass");
        }

        let events = store.events()?;
        let goals = store.goals()?;
        let held = store.unlock_keys()?;

        let result = self
            .engine
            .evaluate_user(store.user_id(), &events, &goals, &held);

        let mut summary = PassSummary {
            goals_evaluated: result.goals.len(),
            ..Default::default()
        };

        // Failed goals are written back untouched.
        let mut updated = goals;
        for evaluation in result.goals {
            if evaluation.notification.is_some() {
                summary.goals_completed.push(evaluation.goal.clone());
            }
            if let Some(slot) = updated
                .iter_mut()
                .find(|g| g.goal_id == evaluation.goal.goal_id)
            {
                *slot = evaluation.goal;
            }
        }

        summary.failures.extend(
            result
                .goal_failures
                .iter()
                .map(|f| format!("goal {}: {}", f.goal_id, f.error)),
        );
        summary.failures.extend(
            result
                .achievements
                .failures
                .into_iter()
                .map(|f| ProgressError::from(f).to_string()),
        );
        summary.new_unlocks = result.achievements.unlocked.clone();

        store.save_goals(&updated)?;
        store.record_unlocks(result.achievements.unlocked)?;

        let emitted = self.pending.drain();
        store.deliver(&emitted)?;
        if let Some(path) = &self.audit_log {
            let audit = LogSink::new(path);
            for notification in &emitted {
                if let Err(e) = audit.send(notification) {
                    tracing::warn!("audit log write failed: {}", e);
                }
            }
        }
        summary.notifications_delivered = emitted.len();
        Ok(summary)
    }
}

pub fn print_summary(summary: &PassSummary) {
    for goal in &summary.goals_completed {
        println!(
            "Goal achieved: {} {} {}",
            goal.goal_type, goal.target_value, goal.unit
        );
    }
    for unlock in &summary.new_unlocks {
        println!("Achievement unlocked: {} ({})", unlock.title, unlock.achievement_key);
    }
    for failure in &summary.failures {
        println!("Skipped {}", failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use eco_engine::{DisposalEvent, GoalType, GoalUnit, WasteCategory};
    use tempfile::tempdir;

    fn recycled_event(user: &str, kg: f64) -> DisposalEvent {
        DisposalEvent::new(user, WasteCategory::Recyclable, Utc::now())
            .with_weight(kg)
            .unwrap()
            .recycled(true)
    }

    #[test]
    fn pass_persists_goals_unlocks_and_notifications() {
        let dir = tempdir().unwrap();
        let host = Host::load(dir.path()).unwrap();
        let store = host.user("u1").unwrap();

        store.save_events(&[recycled_event("u1", 2.0)]).unwrap();
        let mut bad = Goal::new("u1", GoalType::Track, 1.0, GoalUnit::Count).unwrap();
        bad.target_value = -1.0;
        let good = Goal::new("u1", GoalType::Recycle, 2.0, GoalUnit::Kg).unwrap();
        store.save_goals(&[bad.clone(), good]).unwrap();

        let _guard = store.lock().unwrap();
        let summary = host.reevaluate(&store).unwrap();
        assert_eq!(summary.goals_evaluated, 1);
        assert_eq!(summary.goals_completed.len(), 1);
        assert_eq!(summary.new_unlocks.len(), 2);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.notifications_delivered, 3);

        let goals = store.goals().unwrap();
        assert_eq!(goals.len(), 2);
        assert_eq!(goals[0], bad);
        assert!(goals[1].completed);
        assert_eq!(goals[1].current_value, 2.0);

        assert_eq!(store.inbox().unwrap().unread_count(), 3);

        // A second pass changes nothing.
        let again = host.reevaluate(&store).unwrap();
        assert!(again.goals_completed.is_empty());
        assert!(again.new_unlocks.is_empty());
        assert_eq!(store.inbox().unwrap().notifications().len(), 3);
    }

    #[test]
    fn rule_failures_are_reported_by_key() {
        let dir = tempdir().unwrap();
        let host = Host::load(dir.path()).unwrap();
        let store = host.user("u1").unwrap();
        let mut bad = recycled_event("u1", 1.0);
        bad.weight_kg = Some(-3.0);
        store.save_events(&[bad]).unwrap();

        let summary = host.reevaluate(&store).unwrap();
        assert_eq!(summary.failures.len(), 1);
        assert!(summary.failures[0].contains("fifty_kg_recycled"));
    }

    #[cfg(unix)]
    #[test]
    fn failed_save_delivers_nothing_and_next_pass_delivers_once() {
        let dir = tempdir().unwrap();
        let host = Host::load(dir.path()).unwrap();
        let store = host.user("u1").unwrap();
        store.save_events(&[recycled_event("u1", 1.0)]).unwrap();

        // Reads as absent, but writing through it fails.
        let unlocks = dir.path().join("users/u1/unlocks.json");
        std::os::unix::fs::symlink(dir.path().join("missing/unlocks.json"), &unlocks).unwrap();

        assert!(host.reevaluate(&store).is_err());
        assert!(store.inbox().unwrap().notifications().is_empty());

        std::fs::remove_file(&unlocks).unwrap();
        let summary = host.reevaluate(&store).unwrap();
        assert_eq!(summary.new_unlocks.len(), 2);
        assert_eq!(summary.notifications_delivered, 2);
        assert_eq!(store.inbox().unwrap().notifications().len(), 2);
    }

    #[test]
    fn facility_catalog_file_overrides_sample() {
        let dir = tempdir().unwrap();
        let mut catalog = sample_facilities();
        catalog.truncate(1);
        std::fs::write(
            dir.path().join("facilities.json"),
            serde_json::to_string(&catalog).unwrap(),
        )
        .unwrap();

        let host = Host::load(dir.path()).unwrap();
        assert_eq!(host.engine.locator().catalog().len(), 1);
        assert!(host.engine.pickup_schedules(None).is_empty());
    }

    #[test]
    fn sample_pickups_loaded_by_default() {
        let dir = tempdir().unwrap();
        let host = Host::load(dir.path()).unwrap();
        assert_eq!(host.engine.pickup_schedules(Some("lalitpur")).len(), 1);
    }

    #[test]
    fn relative_log_path_becomes_audit_log() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[notifications]\nlog_path = \"alerts.jsonl\"\n",
        )
        .unwrap();

        let host = Host::load(dir.path()).unwrap();
        assert_eq!(host.audit_log, Some(dir.path().join("alerts.jsonl")));

        let store = host.user("u1").unwrap();
        store
            .save_events(&[DisposalEvent::new("u1", WasteCategory::Organic, Utc::now())])
            .unwrap();
        host.reevaluate(&store).unwrap();
        let logged = LogSink::read_all(dir.path().join("alerts.jsonl")).unwrap();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].title, "Achievement Unlocked!");
        assert_eq!(store.inbox().unwrap().notifications(), logged.as_slice());
    }
}
