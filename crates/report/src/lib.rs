//! Batch report runner for the fleet analytics engine.
//!
//! Reads a JSON snapshot of fact arrays, runs the `domain` services over it
//! and writes `report.json` plus delimited-text exports.

pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod metrics;
pub mod runner;
pub mod snapshot;

pub use config::Config;
pub use error::ReportError;
pub use runner::{FleetReport, ReportRunner, RunOutput};
pub use snapshot::Snapshot;
