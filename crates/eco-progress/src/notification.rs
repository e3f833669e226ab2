// notification.rs — User-visible notifications and the emitter that records them.
//
// Both evaluators produce notifications as a side effect: goal completion
// crossings and achievement unlocks. The emitter is an append-only sink
// chain; it never deduplicates. Achievement dedup comes from the caller's
// existing-unlock set, goal dedup from the crossing-edge rule.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProgressError;

/// What a notification is about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[default]
    Info,
    Reminder,
    Achievement,
}

/// A user-visible notification produced by an evaluation pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub notification_id: Uuid,
    pub user_id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
    /// Optional in-app link to the related page (e.g. "/goals").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub read: bool,
}

impl Notification {
    pub fn new(
        user_id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        kind: NotificationKind,
        link: Option<&str>,
    ) -> Self {
        Self {
            notification_id: Uuid::new_v4(),
            user_id: user_id.into(),
            title: title.into(),
            body: body.into(),
            kind,
            created_at: Utc::now(),
            link: link.map(str::to_string),
            read: false,
        }
    }

    /// Mark as read. Returns whether anything changed.
    pub fn mark_read(&mut self) -> bool {
        !std::mem::replace(&mut self.read, true)
    }
}

/// One user's notifications, newest first, with read tracking.
#[derive(Debug, Clone, Default)]
pub struct Inbox {
    notifications: Vec<Notification>,
}

impl Inbox {
    /// Keep only `user_id`'s notifications, newest first.
    pub fn new(user_id: &str, notifications: Vec<Notification>) -> Self {
        let mut notifications: Vec<Notification> = notifications
            .into_iter()
            .filter(|n| n.user_id == user_id)
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self { notifications }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn unread(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter().filter(|n| !n.read)
    }

    pub fn unread_count(&self) -> usize {
        self.unread().count()
    }

    /// Mark one notification read. Fails if it isn't in this inbox, which
    /// includes notifications that belong to another user.
    pub fn mark_read(&mut self, notification_id: Uuid) -> Result<bool, ProgressError> {
        self.notifications
            .iter_mut()
            .find(|n| n.notification_id == notification_id)
            .map(Notification::mark_read)
            .ok_or_else(|| {
                ProgressError::invalid(
                    "notification_id",
                    format!("no notification {} for this user", notification_id),
                )
            })
    }

    /// Mark everything read. Returns how many changed.
    pub fn mark_all_read(&mut self) -> usize {
        self.notifications
            .iter_mut()
            .map(Notification::mark_read)
            .filter(|changed| *changed)
            .count()
    }

    pub fn into_notifications(self) -> Vec<Notification> {
        self.notifications
    }
}

/// Trait for receiving notifications.
///
/// Implementations decide where a notification goes: a JSONL file, an
/// in-memory buffer the host persists later, a push channel, etc.
pub trait NotificationSink: Send + Sync {
    /// Handle a notification. Errors are logged but don't stop evaluation.
    fn send(&self, notification: &Notification) -> Result<(), ProgressError>;
}

/// Appends notifications as JSONL to a file.
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read every notification previously written to a log file, oldest first.
    pub fn read_all(path: impl AsRef<Path>) -> Result<Vec<Notification>, ProgressError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path).map_err(|source| ProgressError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(ProgressError::from))
            .collect()
    }

    /// Replace the whole log with `notifications`. Writes a sibling temp
    /// file first, so readers see either the old log or the new one.
    pub fn rewrite(&self, notifications: &[Notification]) -> Result<(), ProgressError> {
        let io_err = |path: &Path| {
            let path = path.display().to_string();
            move |source| ProgressError::IoError { path, source }
        };

        let mut content = String::new();
        for notification in notifications {
            content.push_str(&serde_json::to_string(notification)?);
            content.push('\n');
        }
        let tmp = self.path.with_extension("jsonl.tmp");
        fs::write(&tmp, content).map_err(io_err(&tmp))?;
        fs::rename(&tmp, &self.path).map_err(io_err(&self.path))?;
        Ok(())
    }
}

impl NotificationSink for LogSink {
    fn send(&self, notification: &Notification) -> Result<(), ProgressError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| ProgressError::IoError {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| ProgressError::IoError {
                path: self.path.display().to_string(),
                source,
            })?;

        let json = serde_json::to_string(notification)?;
        writeln!(file, "{}", json).map_err(|source| ProgressError::IoError {
            path: self.path.display().to_string(),
            source,
        })?;

        Ok(())
    }
}

/// Collects notifications in memory. Clones share the same buffer, so a host
/// can hand one clone to the emitter and drain the other after a pass.
#[derive(Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<Notification>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything received so far.
    pub fn notifications(&self) -> Vec<Notification> {
        match self.buffer.lock() {
            Ok(buffer) => buffer.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Remove and return everything received so far.
    pub fn drain(&self) -> Vec<Notification> {
        match self.buffer.lock() {
            Ok(mut buffer) => std::mem::take(&mut *buffer),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl NotificationSink for MemorySink {
    fn send(&self, notification: &Notification) -> Result<(), ProgressError> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|_| ProgressError::NotificationError("memory sink poisoned".to_string()))?;
        buffer.push(notification.clone());
        Ok(())
    }
}

/// Builds notifications and dispatches them to every registered sink.
///
/// Errors from individual sinks are logged (via tracing) but don't
/// prevent other sinks from receiving the notification, and never fail
/// the evaluation that produced it.
pub struct NotificationEmitter {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl NotificationEmitter {
    /// Create an emitter with no sinks. Notifications are still returned to
    /// the caller, they just aren't recorded anywhere else.
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    /// Record a notification for `user_id` and return it.
    pub fn emit(
        &self,
        user_id: &str,
        title: &str,
        body: &str,
        kind: NotificationKind,
        link: Option<&str>,
    ) -> Notification {
        let notification = Notification::new(user_id, title, body, kind, link);
        for sink in &self.sinks {
            if let Err(e) = sink.send(&notification) {
                tracing::warn!(user_id, "notification sink error: {}", e);
            }
        }
        notification
    }
}

impl Default for NotificationEmitter {
    fn default() -> Self {
        Self::new()
    }
}
