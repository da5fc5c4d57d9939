//! Asset and lifecycle event models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::time::parse_timestamp;

use super::status::{StateCategory, VehicleStatus};

/// A vehicle as known to the fleet registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Asset {
    /// Plate or registration, unique across the fleet.
    pub asset_id: String,
    /// Display label, usually the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Raw decommission timestamp, when the vehicle left the fleet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decommissioned_at: Option<String>,
}

impl Asset {
    pub fn new(asset_id: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            label: None,
            decommissioned_at: None,
        }
    }

    /// Parsed decommission time; unparsable values are treated as absent.
    pub fn decommission_time(&self) -> Option<DateTime<Utc>> {
        self.decommissioned_at.as_deref().and_then(parse_timestamp)
    }
}

/// Lifecycle event as delivered by the ETL layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RawLifecycleEvent {
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub state_label: String,
}

impl RawLifecycleEvent {
    pub fn new(asset_id: &str, timestamp: &str, state_label: &str) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            timestamp: Some(timestamp.to_string()),
            state_label: state_label.to_string(),
        }
    }
}

/// Lifecycle event with a parsed timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LifecycleEvent {
    pub asset_id: String,
    pub timestamp: DateTime<Utc>,
    pub state_label: String,
}

impl LifecycleEvent {
    pub fn new(asset_id: impl Into<String>, timestamp: DateTime<Utc>, state_label: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            timestamp,
            state_label: state_label.into(),
        }
    }

    pub fn status(&self) -> VehicleStatus {
        VehicleStatus::from_label(&self.state_label)
    }

    pub fn category(&self) -> StateCategory {
        self.status().category()
    }
}
