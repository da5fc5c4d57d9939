//! Input snapshot: one JSON document holding every fact array of a run.

use domain::models::{Asset, CaseRecord, RawLifecycleEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::ReportError;

/// Fact arrays exported by the ETL layer.
///
/// Contract events stay schemaless JSON objects; the churn aggregator reads
/// them through configured field names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Snapshot {
    /// Monotonic version of the underlying dataset, used as a cache key.
    pub dataset_version: u64,
    pub assets: Vec<Asset>,
    pub lifecycle_events: Vec<RawLifecycleEvent>,
    pub cases: Vec<CaseRecord>,
    pub contract_events: Vec<Value>,
}

impl Snapshot {
    pub fn from_json_str(raw: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ReportError> {
        let raw = fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
        let snapshot = Self::from_json_str(&raw)?;

        debug!(
            path = %path.display(),
            dataset_version = snapshot.dataset_version,
            assets = snapshot.assets.len(),
            lifecycle_events = snapshot.lifecycle_events.len(),
            cases = snapshot.cases.len(),
            contract_events = snapshot.contract_events.len(),
            "Loaded snapshot"
        );

        Ok(snapshot)
    }
}
