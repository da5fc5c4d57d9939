//! Fleet lifecycle analytics engine.
//!
//! This crate contains:
//! - Domain models (assets, lifecycle events, cases, anomalies, period buckets)
//! - The analytics services: event normalization, state-duration
//!   decomposition, utilization scoring, anomaly detection and period
//!   aggregation
//! - Domain error types
//!
//! Every service is a pure function of its inputs; the current time is always
//! passed in by the caller.

pub mod error;
pub mod models;
pub mod services;

pub use error::DomainError;
