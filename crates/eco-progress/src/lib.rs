//! # eco-progress
//!
//! Goal progress and achievement evaluation for household waste tracking.
//!
//! Every evaluation is a pure recomputation over a user's disposal events:
//! nothing is accumulated between passes, so re-running a pass with the same
//! inputs produces the same state and no new notifications.
//!
//! ## Key components
//!
//! - [`DisposalEvent`] — one disposal, the raw input to every pass
//! - [`GoalEvaluator`] — recomputes a [`Goal`]'s value and completion flag
//!   from the events inside its window
//! - [`AchievementEngine`] — evaluates the declarative [`CATALOG`] against
//!   lifetime stats, unlocking each key at most once
//! - [`NotificationEmitter`] — append-only dispatch to [`NotificationSink`]s
//! - [`Inbox`] — a user's notifications with read/unread tracking
//! - [`UserStatistics`] — lifetime totals and impact estimates
//!
//! ## Concurrency
//!
//! Evaluators hold no per-user state. Callers must serialize the
//! read-evaluate-write cycle per user; otherwise two passes can both see an
//! achievement as missing and persist it twice.

pub mod achievement;
pub mod error;
pub mod event;
pub mod goal;
pub mod notification;
pub mod stats;

pub use achievement::{
    AchievementDefinition, AchievementEngine, AchievementEvaluation, AchievementRule,
    AchievementStats, AchievementUnlock, Metric, RuleFailure, CATALOG,
};
pub use error::ProgressError;
pub use event::{DisposalEvent, WasteCategory};
pub use goal::{
    Goal, GoalBatch, GoalEvaluation, GoalEvaluator, GoalFailure, GoalType, GoalUnit, Window,
};
pub use notification::{
    Inbox, LogSink, MemorySink, Notification, NotificationEmitter, NotificationKind,
    NotificationSink,
};
pub use stats::{Totals, UserStatistics};
