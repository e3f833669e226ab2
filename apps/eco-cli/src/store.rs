// store.rs — JSON file persistence for the CLI host.
//
// Layout under the data directory (default `.ecotrack/`):
//
//   config.toml              engine config (optional)
//   facilities.json          facility catalog (optional, seeded sample otherwise)
//   pickups.json             pickup schedules (optional, seeded sample otherwise)
//   users/<user_id>/
//     events.json            disposal events
//     goals.json             goals, with derived values written back
//     unlocks.json           achievement unlocks
//     notifications.jsonl    the user's inbox, with read flags
//     .lock                  held during a pass or an inbox update

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use eco_engine::{AchievementUnlock, DisposalEvent, Goal, Notification};
use eco_progress::{Inbox, LogSink, NotificationSink};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::lock::UserLock;

/// Where the CLI keeps everything.
#[derive(Debug, Clone)]
pub struct DataLayout {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub facilities_path: PathBuf,
    pub pickups_path: PathBuf,
    pub users_dir: PathBuf,
}

impl DataLayout {
    pub fn for_dir(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            config_path: root.join("config.toml"),
            facilities_path: root.join("facilities.json"),
            pickups_path: root.join("pickups.json"),
            users_dir: root.join("users"),
            root,
        }
    }
}

/// One user's records.
pub struct UserStore {
    user_id: String,
    dir: PathBuf,
}

impl UserStore {
    /// Open (creating if needed) the store for `user_id`.
    pub fn open(layout: &DataLayout, user_id: &str) -> anyhow::Result<Self> {
        if user_id.is_empty()
            || !user_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            anyhow::bail!(
                "invalid user id '{}': use letters, digits, '-' or '_'",
                user_id
            );
        }
        let dir = layout.users_dir.join(user_id);
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating user directory {}", dir.display()))?;
        Ok(Self {
            user_id: user_id.to_string(),
            dir,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Enter this user's critical section.
    pub fn lock(&self) -> anyhow::Result<UserLock> {
        UserLock::acquire(self.dir.join(".lock"))
    }

    pub fn events(&self) -> anyhow::Result<Vec<DisposalEvent>> {
        self.read("events.json")
    }

    pub fn save_events(&self, events: &[DisposalEvent]) -> anyhow::Result<()> {
        self.write("events.json", events)
    }

    pub fn goals(&self) -> anyhow::Result<Vec<Goal>> {
        self.read("goals.json")
    }

    pub fn save_goals(&self, goals: &[Goal]) -> anyhow::Result<()> {
        self.write("goals.json", goals)
    }

    pub fn unlocks(&self) -> anyhow::Result<Vec<AchievementUnlock>> {
        self.read("unlocks.json")
    }

    pub fn unlock_keys(&self) -> anyhow::Result<HashSet<String>> {
        Ok(self
            .unlocks()?
            .into_iter()
            .map(|u| u.achievement_key)
            .collect())
    }

    /// Append new unlocks, keeping at most one per key. Existing unlocks are
    /// never removed. Returns how many were actually added.
    pub fn record_unlocks(&self, new: Vec<AchievementUnlock>) -> anyhow::Result<usize> {
        let mut unlocks = self.unlocks()?;
        let mut held: HashSet<String> = unlocks.iter().map(|u| u.achievement_key.clone()).collect();
        let before = unlocks.len();
        for unlock in new {
            if held.insert(unlock.achievement_key.clone()) {
                unlocks.push(unlock);
            }
        }
        let added = unlocks.len() - before;
        if added > 0 {
            self.write("unlocks.json", &unlocks)?;
        }
        Ok(added)
    }

    pub fn inbox(&self) -> anyhow::Result<Inbox> {
        let path = self.inbox_path();
        let notifications = LogSink::read_all(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(Inbox::new(&self.user_id, notifications))
    }

    pub fn deliver(&self, notifications: &[Notification]) -> anyhow::Result<()> {
        let sink = LogSink::new(self.inbox_path());
        for notification in notifications {
            sink.send(notification)?;
        }
        Ok(())
    }

    pub fn save_inbox(&self, inbox: &Inbox) -> anyhow::Result<()> {
        LogSink::new(self.inbox_path()).rewrite(inbox.notifications())?;
        Ok(())
    }

    fn inbox_path(&self) -> PathBuf {
        self.dir.join("notifications.jsonl")
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<Vec<T>> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
    }

    fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> anyhow::Result<()> {
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use eco_engine::{GoalType, GoalUnit, WasteCategory};
    use tempfile::tempdir;

    fn unlock(key: &str) -> AchievementUnlock {
        AchievementUnlock {
            user_id: "u1".to_string(),
            achievement_key: key.to_string(),
            title: key.to_string(),
            description: String::new(),
            unlocked_at: Utc::now(),
        }
    }

    #[test]
    fn empty_store_reads_as_empty() {
        let dir = tempdir().unwrap();
        let store = UserStore::open(&DataLayout::for_dir(dir.path()), "u1").unwrap();
        assert!(store.events().unwrap().is_empty());
        assert!(store.goals().unwrap().is_empty());
        assert!(store.unlock_keys().unwrap().is_empty());
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempdir().unwrap();
        let layout = DataLayout::for_dir(dir.path());
        let event = DisposalEvent::new("u1", WasteCategory::Organic, Utc::now())
            .with_weight(1.25)
            .unwrap();
        let goal = Goal::new("u1", GoalType::Reduce, 5.0, GoalUnit::Kg).unwrap();

        {
            let store = UserStore::open(&layout, "u1").unwrap();
            store.save_events(std::slice::from_ref(&event)).unwrap();
            store.save_goals(std::slice::from_ref(&goal)).unwrap();
        }

        let store = UserStore::open(&layout, "u1").unwrap();
        assert_eq!(store.events().unwrap(), vec![event]);
        assert_eq!(store.goals().unwrap(), vec![goal]);
    }

    #[test]
    fn record_unlocks_keeps_one_row_per_key() {
        let dir = tempdir().unwrap();
        let store = UserStore::open(&DataLayout::for_dir(dir.path()), "u1").unwrap();

        assert_eq!(store.record_unlocks(vec![unlock("first_entry")]).unwrap(), 1);
        assert_eq!(
            store
                .record_unlocks(vec![unlock("first_entry"), unlock("first_recycle")])
                .unwrap(),
            1
        );
        assert_eq!(store.unlocks().unwrap().len(), 2);
    }

    #[test]
    fn path_like_user_ids_rejected() {
        let dir = tempdir().unwrap();
        let layout = DataLayout::for_dir(dir.path());
        assert!(UserStore::open(&layout, "../etc").is_err());
        assert!(UserStore::open(&layout, "").is_err());
        assert!(UserStore::open(&layout, "household_42").is_ok());
    }

    #[test]
    fn inbox_read_state_survives_reopen() {
        let dir = tempdir().unwrap();
        let layout = DataLayout::for_dir(dir.path());
        let store = UserStore::open(&layout, "u1").unwrap();
        let note = Notification::new("u1", "Hi", "there", eco_engine::NotificationKind::Info, None);
        store.deliver(std::slice::from_ref(&note)).unwrap();
        assert_eq!(store.inbox().unwrap().unread_count(), 1);

        let mut inbox = store.inbox().unwrap();
        inbox.mark_read(note.notification_id).unwrap();
        store.save_inbox(&inbox).unwrap();

        let reopened = UserStore::open(&layout, "u1").unwrap();
        assert_eq!(reopened.inbox().unwrap().unread_count(), 0);
        assert_eq!(reopened.inbox().unwrap().notifications().len(), 1);
    }
}
