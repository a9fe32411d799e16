//! Inventory item models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of stock-keeping unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Purchased material, consumed as-is
    Raw,
    /// Produced from raw materials by a processing job
    PreProcessed,
    /// Finished kit stock
    Finished,
    /// Pre-sealed sub-packet, assembled from raw materials
    SealedPacket,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Raw => "raw",
            ItemKind::PreProcessed => "pre_processed",
            ItemKind::Finished => "finished",
            ItemKind::SealedPacket => "sealed_packet",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "raw" => Some(ItemKind::Raw),
            "pre_processed" => Some(ItemKind::PreProcessed),
            "finished" => Some(ItemKind::Finished),
            "sealed_packet" => Some(ItemKind::SealedPacket),
            _ => None,
        }
    }
}

/// One line of an item's own one-level bill of materials.
///
/// Only meaningful for `PreProcessed` and `SealedPacket` items: the raw
/// materials required to produce one unit of the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRequirement {
    pub material_name: String,
    pub quantity_per_unit: Decimal,
    pub unit: String,
}

/// A stock-keeping unit.
///
/// `name` is the case-insensitive match key joining kit material lines
/// and vendor price entries to stock rows. `quantity` is never persisted
/// negative; decrements go through the [`clamped_sub`] floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub kind: ItemKind,
    pub quantity: Decimal,
    pub unit: String,
    pub min_stock_level: Decimal,
    pub subcategory: Option<String>,
    pub components: Vec<ComponentRequirement>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Whether this item declares its own bill of materials
    pub fn is_composite(&self) -> bool {
        !self.components.is_empty()
    }
}

/// Floor-at-zero stock subtraction. Every persisted decrement mirrors
/// this as `GREATEST(quantity - delta, 0)` in SQL.
pub fn clamped_sub(quantity: Decimal, delta: Decimal) -> Decimal {
    (quantity - delta).max(Decimal::ZERO)
}
