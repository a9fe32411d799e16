//! Vendor models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Known average price a vendor charges for an inventory item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPrice {
    pub inventory_item_id: Uuid,
    pub average_price: Decimal,
}

/// A supplier of raw materials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    pub contact: Option<String>,
    pub item_prices: Vec<ItemPrice>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vendor {
    /// Price this vendor quotes for an item, if any
    pub fn price_for(&self, inventory_item_id: Uuid) -> Option<Decimal> {
        self.item_prices
            .iter()
            .find(|p| p.inventory_item_id == inventory_item_id)
            .map(|p| p.average_price)
    }
}
