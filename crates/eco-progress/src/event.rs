// event.rs — Disposal events: the raw input every evaluation pass reads.
//
// Events are owned by a user and created by the ingestion layer. The engine
// never creates or deletes them; the only mutation a host may perform is
// toggling `recycled`, after which it must re-run evaluation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProgressError;

/// The kind of waste that was disposed of.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum WasteCategory {
    Organic,
    Recyclable,
    Hazardous,
    Other,
}

impl WasteCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WasteCategory::Organic => "organic",
            WasteCategory::Recyclable => "recyclable",
            WasteCategory::Hazardous => "hazardous",
            WasteCategory::Other => "other",
        }
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for WasteCategory {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "organic" => Ok(WasteCategory::Organic),
            "recyclable" => Ok(WasteCategory::Recyclable),
            "hazardous" => Ok(WasteCategory::Hazardous),
            "other" => Ok(WasteCategory::Other),
            other => Err(ProgressError::invalid(
                "category",
                format!("unknown waste category '{}'", other),
            )),
        }
    }
}

/// One household disposal event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisposalEvent {
    /// Unique identifier for this event.
    pub event_id: Uuid,

    /// The user who disposed of the waste.
    pub user_id: String,

    pub category: WasteCategory,

    /// Weight in kilograms. Absent weights count as zero everywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,

    /// Whether the waste went to recycling.
    #[serde(default)]
    pub recycled: bool,

    /// When the waste was disposed of.
    pub disposed_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Facility the waste was taken to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recycling_center_id: Option<u64>,
}

impl DisposalEvent {
    /// Create an unweighed, non-recycled event.
    pub fn new(
        user_id: impl Into<String>,
        category: WasteCategory,
        disposed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            user_id: user_id.into(),
            category,
            weight_kg: None,
            recycled: false,
            disposed_at,
            description: None,
            recycling_center_id: None,
        }
    }

    /// Attach a weight. Negative or non-finite weights are rejected.
    pub fn with_weight(mut self, weight_kg: f64) -> Result<Self, ProgressError> {
        validate_weight(weight_kg)?;
        self.weight_kg = Some(weight_kg);
        Ok(self)
    }

    pub fn recycled(mut self, recycled: bool) -> Self {
        self.recycled = recycled;
        self
    }

    /// Attach a free-text note. Blank text is dropped.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.description = (!description.trim().is_empty()).then_some(description);
        self
    }

    pub fn at_facility(mut self, facility_id: u64) -> Self {
        self.recycling_center_id = Some(facility_id);
        self
    }

    /// The weight to aggregate: zero when absent.
    pub fn weight_or_zero(&self) -> f64 {
        self.weight_kg.unwrap_or(0.0)
    }

    /// Check a record that arrived without going through the constructors
    /// (e.g. deserialized from a host's storage).
    pub fn validate(&self) -> Result<(), ProgressError> {
        match self.weight_kg {
            Some(w) => validate_weight(w),
            None => Ok(()),
        }
    }
}

fn validate_weight(weight_kg: f64) -> Result<(), ProgressError> {
    if !weight_kg.is_finite() || weight_kg < 0.0 {
        return Err(ProgressError::invalid(
            "weight_kg",
            format!("must be a finite value >= 0, got {}", weight_kg),
        ));
    }
    Ok(())
}
