//! Shared utilities and common types for the fleet analytics workspace.
//!
//! This crate provides leaf functionality used by the engine and the runner:
//! - Coercion of locale-formatted numeric values
//! - Flexible timestamp parsing
//! - Calendar month period keys
//! - Label folding and alias-table lookup
//! - Common validation logic

pub mod numeric;
pub mod period;
pub mod text;
pub mod time;
pub mod validation;
