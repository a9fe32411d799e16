//! Source-availability check for starting a processing job
//!
//! Starting a job consumes its declared sources, so every deficiency is
//! reported up front and nothing is consumed when any source falls
//! short.

use rust_decimal::Decimal;

use crate::models::JobLine;
use crate::planning::explosion::InventoryIndex;

/// One deficient source line, with the exact shortfall
#[derive(Debug, Clone, PartialEq)]
pub struct SourceShortfall {
    pub item_name: String,
    pub required: Decimal,
    pub available: Decimal,
    pub shortfall: Decimal,
}

/// Check every source against current stock. An empty result means the
/// job may start; a non-empty one lists each deficient material.
pub fn source_shortfalls(sources: &[JobLine], index: &InventoryIndex<'_>) -> Vec<SourceShortfall> {
    sources
        .iter()
        .filter_map(|source| {
            let available = index
                .lookup(&source.item_name)
                .map(|item| item.quantity)
                .unwrap_or(Decimal::ZERO);
            if available < source.quantity {
                Some(SourceShortfall {
                    item_name: source.item_name.clone(),
                    required: source.quantity,
                    available,
                    shortfall: source.quantity - available,
                })
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InventoryItem, ItemKind};
    use chrono::Utc;
    use uuid::Uuid;

    fn item(name: &str, qty: i64) -> InventoryItem {
        InventoryItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind: ItemKind::Raw,
            quantity: Decimal::from(qty),
            unit: "kg".to_string(),
            min_stock_level: Decimal::ZERO,
            subcategory: None,
            components: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn source(name: &str, qty: i64) -> JobLine {
        JobLine {
            item_name: name.to_string(),
            quantity: Decimal::from(qty),
            unit: "kg".to_string(),
        }
    }

    #[test]
    fn reports_exact_shortfall() {
        let inventory = vec![item("Resin", 30)];
        let index = InventoryIndex::new(&inventory);

        let shortfalls = source_shortfalls(&[source("Resin", 50)], &index);
        assert_eq!(
            shortfalls,
            vec![SourceShortfall {
                item_name: "Resin".to_string(),
                required: Decimal::from(50),
                available: Decimal::from(30),
                shortfall: Decimal::from(20),
            }]
        );
    }

    #[test]
    fn sufficient_stock_yields_no_shortfalls() {
        let inventory = vec![item("Resin", 80), item("Dye", 5)];
        let index = InventoryIndex::new(&inventory);

        let shortfalls =
            source_shortfalls(&[source("Resin", 50), source("Dye", 5)], &index);
        assert!(shortfalls.is_empty());
    }

    #[test]
    fn unknown_source_is_fully_short() {
        let index = InventoryIndex::new(&[]);
        let shortfalls = source_shortfalls(&[source("Resin", 50)], &index);
        assert_eq!(shortfalls[0].available, Decimal::ZERO);
        assert_eq!(shortfalls[0].shortfall, Decimal::from(50));
    }
}
