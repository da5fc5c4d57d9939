//! Vehicle status classification.
//!
//! This is the single lookup table that turns raw status text into a tracked
//! state category and an operational group. The decomposer and the
//! cross-filter predicates both read from here.

use serde::{Deserialize, Serialize};
use shared::text::resolve_alias;
use std::fmt;

// ============================================================================
// Enums
// ============================================================================

/// Category an interval of vehicle time is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateCategory {
    Rented,
    Maintenance,
    Idle,
    Unknown,
}

impl StateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateCategory::Rented => "rented",
            StateCategory::Maintenance => "maintenance",
            StateCategory::Idle => "idle",
            StateCategory::Unknown => "unknown",
        }
    }

    /// Precedence applied to compound labels: Rented > Maintenance > Idle.
    pub fn precedence(&self) -> u8 {
        match self {
            StateCategory::Rented => 3,
            StateCategory::Maintenance => 2,
            StateCategory::Idle => 1,
            StateCategory::Unknown => 0,
        }
    }
}

impl fmt::Display for StateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse grouping used by operational-status filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationalGroup {
    Operating,
    Unavailable,
    Retired,
    Unclassified,
}

impl OperationalGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationalGroup::Operating => "operating",
            OperationalGroup::Unavailable => "unavailable",
            OperationalGroup::Retired => "retired",
            OperationalGroup::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for OperationalGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OperationalGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operating" => Ok(OperationalGroup::Operating),
            "unavailable" => Ok(OperationalGroup::Unavailable),
            "retired" => Ok(OperationalGroup::Retired),
            "unclassified" => Ok(OperationalGroup::Unclassified),
            _ => Err(format!(
                "Invalid operational group: {}. Must be one of: operating, unavailable, retired, unclassified",
                s
            )),
        }
    }
}

/// Closed set of raw vehicle statuses recognised in lifecycle feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Rented,
    Reserved,
    Workshop,
    Maintenance,
    Accident,
    Available,
    InTransit,
    Decommissioned,
    Other,
}

/// Folded aliases. Compound labels are resolved by category precedence.
const STATUS_ALIASES: &[(&str, VehicleStatus)] = &[
    ("rented", VehicleStatus::Rented),
    ("on rent", VehicleStatus::Rented),
    ("alugado", VehicleStatus::Rented),
    ("locado", VehicleStatus::Rented),
    ("em locacao", VehicleStatus::Rented),
    ("reserved", VehicleStatus::Reserved),
    ("reservado", VehicleStatus::Reserved),
    ("workshop", VehicleStatus::Workshop),
    ("oficina", VehicleStatus::Workshop),
    ("maintenance", VehicleStatus::Maintenance),
    ("manutencao", VehicleStatus::Maintenance),
    ("accident", VehicleStatus::Accident),
    ("sinistro", VehicleStatus::Accident),
    ("available", VehicleStatus::Available),
    ("disponivel", VehicleStatus::Available),
    ("idle", VehicleStatus::Available),
    ("parado", VehicleStatus::Available),
    ("in transit", VehicleStatus::InTransit),
    ("em transito", VehicleStatus::InTransit),
    ("transfer", VehicleStatus::InTransit),
    ("decommissioned", VehicleStatus::Decommissioned),
    ("desmobilizado", VehicleStatus::Decommissioned),
    ("vendido", VehicleStatus::Decommissioned),
    ("sold", VehicleStatus::Decommissioned),
];

impl VehicleStatus {
    /// Classifies a raw status label. Unrecognised labels map to `Other`.
    pub fn from_label(label: &str) -> Self {
        resolve_alias(STATUS_ALIASES, label, |status| status.category().precedence())
            .unwrap_or(VehicleStatus::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Rented => "rented",
            VehicleStatus::Reserved => "reserved",
            VehicleStatus::Workshop => "workshop",
            VehicleStatus::Maintenance => "maintenance",
            VehicleStatus::Accident => "accident",
            VehicleStatus::Available => "available",
            VehicleStatus::InTransit => "in_transit",
            VehicleStatus::Decommissioned => "decommissioned",
            VehicleStatus::Other => "other",
        }
    }

    /// Tracked category for time-in-state accounting.
    pub fn category(&self) -> StateCategory {
        match self {
            VehicleStatus::Rented => StateCategory::Rented,
            VehicleStatus::Workshop | VehicleStatus::Maintenance | VehicleStatus::Accident => {
                StateCategory::Maintenance
            }
            VehicleStatus::Reserved | VehicleStatus::Available | VehicleStatus::InTransit => {
                StateCategory::Idle
            }
            VehicleStatus::Decommissioned | VehicleStatus::Other => StateCategory::Unknown,
        }
    }

    pub fn operational_group(&self) -> OperationalGroup {
        match self {
            VehicleStatus::Rented
            | VehicleStatus::Reserved
            | VehicleStatus::Available
            | VehicleStatus::InTransit => OperationalGroup::Operating,
            VehicleStatus::Workshop | VehicleStatus::Maintenance | VehicleStatus::Accident => {
                OperationalGroup::Unavailable
            }
            VehicleStatus::Decommissioned => OperationalGroup::Retired,
            VehicleStatus::Other => OperationalGroup::Unclassified,
        }
    }

    /// Whether this status ends the observation window of an asset.
    pub fn is_decommissioned(&self) -> bool {
        matches!(self, VehicleStatus::Decommissioned)
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
