//! # eco-engine
//!
//! Progress, achievement, and facility-search engine for household waste
//! tracking.
//!
//! A host hands the engine plain records (a user's disposal events, goals
//! and held achievement keys, or a location) and persists what comes back.
//! The engine never touches storage or sessions itself.
//!
//! ## Key components
//!
//! - [`ProgressEngine`] — the four host contracts plus a combined per-user pass
//! - [`EngineConfig`] — TOML-loaded search defaults and notification log path
//! - [`UserEvaluation`] — the derived state one pass produced

pub mod config;
pub mod engine;
pub mod error;

pub use config::{EngineConfig, NotificationConfig};
pub use engine::{ProgressEngine, UserEvaluation};
pub use error::EngineError;

pub use eco_geo::{Coordinates, Facility, NearbyFacility, PickupFrequency, PickupSchedule};
pub use eco_progress::{
    AchievementUnlock, DisposalEvent, Goal, GoalType, GoalUnit, Notification, NotificationKind,
    WasteCategory,
};
