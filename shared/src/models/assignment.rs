//! Assignment (order) model and its status state machine
//!
//! An assignment is one unit of client demand for one kit. Its status
//! walks an ordered lifecycle; the only transition with inventory side
//! effects is into/out of `TransferredToDispatch`, expressed as the
//! single [`stock_effect`] hook rather than scattered status checks.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client channel for an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    B2b,
    B2c,
}

impl ClientType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientType::B2b => "b2b",
            ClientType::B2c => "b2c",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "b2b" => Some(ClientType::B2b),
            "b2c" => Some(ClientType::B2c),
            _ => None,
        }
    }
}

/// Assignment lifecycle status, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    InProduction,
    ReadyToPack,
    TransferredToDispatch,
    ReadyForDispatch,
    Dispatched,
    Delivered,
}

/// Statuses that still drive procurement demand. Dispatched and
/// delivered orders are fulfilled and contribute nothing.
pub const ACTIVE_FOR_PROCUREMENT: [AssignmentStatus; 5] = [
    AssignmentStatus::Assigned,
    AssignmentStatus::InProduction,
    AssignmentStatus::ReadyToPack,
    AssignmentStatus::TransferredToDispatch,
    AssignmentStatus::ReadyForDispatch,
];

/// Inventory side effect of a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    /// Entering packing output: finished stock up, component stock down
    Apply,
    /// Leaving packing output: exact mirror of `Apply`
    Reverse,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Assigned => "assigned",
            AssignmentStatus::InProduction => "in_production",
            AssignmentStatus::ReadyToPack => "ready_to_pack",
            AssignmentStatus::TransferredToDispatch => "transferred_to_dispatch",
            AssignmentStatus::ReadyForDispatch => "ready_for_dispatch",
            AssignmentStatus::Dispatched => "dispatched",
            AssignmentStatus::Delivered => "delivered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "assigned" => Some(AssignmentStatus::Assigned),
            "in_production" => Some(AssignmentStatus::InProduction),
            "ready_to_pack" => Some(AssignmentStatus::ReadyToPack),
            "transferred_to_dispatch" => Some(AssignmentStatus::TransferredToDispatch),
            "ready_for_dispatch" => Some(AssignmentStatus::ReadyForDispatch),
            "dispatched" => Some(AssignmentStatus::Dispatched),
            "delivered" => Some(AssignmentStatus::Delivered),
            _ => None,
        }
    }

    pub fn is_active_for_procurement(&self) -> bool {
        ACTIVE_FOR_PROCUREMENT.contains(self)
    }

    /// Transition legality. `Delivered` is terminal; every other move,
    /// forward or backward, is an operator decision the system accepts.
    pub fn can_transition(from: AssignmentStatus, to: AssignmentStatus) -> bool {
        match from {
            AssignmentStatus::Delivered => to == AssignmentStatus::Delivered,
            _ => true,
        }
    }

    /// The single stock-affecting boundary in the lifecycle.
    ///
    /// Comparing previous against new status (rather than re-deriving
    /// from persisted flags) makes a repeated write of the same status a
    /// no-op, so a transition event is applied exactly once.
    pub fn stock_effect(prev: AssignmentStatus, next: AssignmentStatus) -> Option<StockEffect> {
        let boundary = AssignmentStatus::TransferredToDispatch;
        if prev != boundary && next == boundary {
            Some(StockEffect::Apply)
        } else if prev == boundary && next != boundary {
            Some(StockEffect::Reverse)
        } else {
            None
        }
    }
}

/// One unit of client demand for one kit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub client_type: ClientType,
    pub kit_id: Uuid,
    pub quantity: Decimal,
    pub status: AssignmentStatus,
    pub grade: Option<String>,
    pub production_month: Option<String>,
    pub batch_id: Option<Uuid>,
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use AssignmentStatus::*;

    #[test]
    fn delivered_is_terminal() {
        assert!(!AssignmentStatus::can_transition(Delivered, Assigned));
        assert!(!AssignmentStatus::can_transition(Delivered, Dispatched));
        assert!(AssignmentStatus::can_transition(Dispatched, Delivered));
    }

    #[test]
    fn stock_effect_fires_only_at_the_dispatch_boundary() {
        assert_eq!(
            AssignmentStatus::stock_effect(ReadyToPack, TransferredToDispatch),
            Some(StockEffect::Apply)
        );
        assert_eq!(
            AssignmentStatus::stock_effect(TransferredToDispatch, ReadyForDispatch),
            Some(StockEffect::Reverse)
        );
        assert_eq!(
            AssignmentStatus::stock_effect(TransferredToDispatch, ReadyToPack),
            Some(StockEffect::Reverse)
        );
        assert_eq!(AssignmentStatus::stock_effect(Assigned, InProduction), None);
        assert_eq!(
            AssignmentStatus::stock_effect(ReadyForDispatch, Dispatched),
            None
        );
    }

    #[test]
    fn repeated_status_write_has_no_effect() {
        assert_eq!(
            AssignmentStatus::stock_effect(TransferredToDispatch, TransferredToDispatch),
            None
        );
    }

    #[test]
    fn procurement_active_set_excludes_fulfilled() {
        assert!(Assigned.is_active_for_procurement());
        assert!(TransferredToDispatch.is_active_for_procurement());
        assert!(ReadyForDispatch.is_active_for_procurement());
        assert!(!Dispatched.is_active_for_procurement());
        assert!(!Delivered.is_active_for_procurement());
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            Assigned,
            InProduction,
            ReadyToPack,
            TransferredToDispatch,
            ReadyForDispatch,
            Dispatched,
            Delivered,
        ] {
            assert_eq!(AssignmentStatus::from_str(status.as_str()), Some(status));
        }
    }
}
