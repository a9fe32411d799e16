//! Procurement shortage rows (derived, never persisted)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of the procurement worklist: a raw material whose netted
/// requirement exceeds what stock, approved requests and in-flight
/// processing jobs will cover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialShortage {
    pub name: String,
    pub required: Decimal,
    pub available: Decimal,
    pub shortage: Decimal,
    pub unit: String,
    pub category: String,
    pub subcategory: Option<String>,
    /// Kits contributing demand, deduplicated, in order of first appearance
    pub kit_names: Vec<String>,
    /// Programs contributing demand, deduplicated, in order of first appearance
    pub program_names: Vec<String>,
    pub vendor_name: Option<String>,
    pub vendor_price: Option<Decimal>,
    pub inventory_item_id: Option<Uuid>,
}
