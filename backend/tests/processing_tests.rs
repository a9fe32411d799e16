//! Processing job validation tests
//!
//! Start-time source validation is all-or-nothing: a job with any
//! deficient source is rejected with every deficit listed, and nothing
//! is consumed.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::models::{InventoryItem, ItemKind, JobLine, JobStatus};
use shared::planning::{source_shortfalls, InventoryIndex};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn item(name: &str, quantity: &str) -> InventoryItem {
    InventoryItem {
        id: Uuid::new_v4(),
        name: name.to_string(),
        kind: ItemKind::Raw,
        quantity: dec(quantity),
        unit: "pcs".to_string(),
        min_stock_level: Decimal::ZERO,
        subcategory: None,
        components: Vec::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn source(name: &str, quantity: &str) -> JobLine {
    JobLine {
        item_name: name.to_string(),
        quantity: dec(quantity),
        unit: "pcs".to_string(),
    }
}

/// A job needing 50 resin against 30 on hand reports a 20 shortfall
#[test]
fn test_single_source_shortfall() {
    let inventory = vec![item("Resin", "30")];
    let index = InventoryIndex::new(&inventory);

    let shortfalls = source_shortfalls(&[source("Resin", "50")], &index);

    assert_eq!(shortfalls.len(), 1);
    assert_eq!(shortfalls[0].item_name, "Resin");
    assert_eq!(shortfalls[0].required, dec("50"));
    assert_eq!(shortfalls[0].available, dec("30"));
    assert_eq!(shortfalls[0].shortfall, dec("20"));
}

/// Every deficient source is listed, covered sources are not
#[test]
fn test_all_deficits_reported_together() {
    let inventory = vec![item("Resin", "30"), item("Dye", "100"), item("Mold", "0")];
    let index = InventoryIndex::new(&inventory);

    let sources = [
        source("Resin", "50"),
        source("Dye", "10"),
        source("Mold", "2"),
    ];
    let shortfalls = source_shortfalls(&sources, &index);

    assert_eq!(shortfalls.len(), 2);
    assert_eq!(shortfalls[0].item_name, "Resin");
    assert_eq!(shortfalls[1].item_name, "Mold");
    assert_eq!(shortfalls[1].shortfall, dec("2"));
}

/// A source with no stock row at all is fully short
#[test]
fn test_missing_item_is_fully_short() {
    let inventory: Vec<InventoryItem> = Vec::new();
    let index = InventoryIndex::new(&inventory);

    let shortfalls = source_shortfalls(&[source("Unknown", "5")], &index);

    assert_eq!(shortfalls.len(), 1);
    assert_eq!(shortfalls[0].available, Decimal::ZERO);
    assert_eq!(shortfalls[0].shortfall, dec("5"));
}

/// Name matching ignores case and surrounding whitespace
#[test]
fn test_source_matching_is_case_insensitive() {
    let inventory = vec![item("Resin", "100")];
    let index = InventoryIndex::new(&inventory);

    let shortfalls = source_shortfalls(&[source("  RESIN ", "50")], &index);

    assert!(shortfalls.is_empty());
}

/// Only assigned and in-progress jobs count as active demand reducers
#[test]
fn test_job_status_activity() {
    assert!(JobStatus::Assigned.is_active());
    assert!(JobStatus::InProgress.is_active());
    assert!(!JobStatus::Completed.is_active());
    assert!(!JobStatus::Cancelled.is_active());
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Shortfall is exactly max(0, required - available), per source
    #[test]
    fn prop_shortfall_arithmetic(
        required in 1u32..10_000,
        available in 0u32..10_000,
    ) {
        let inventory = vec![item("Mat", &available.to_string())];
        let index = InventoryIndex::new(&inventory);

        let shortfalls = source_shortfalls(&[source("Mat", &required.to_string())], &index);

        if required > available {
            prop_assert_eq!(shortfalls.len(), 1);
            prop_assert_eq!(
                shortfalls[0].shortfall,
                Decimal::from(required) - Decimal::from(available)
            );
        } else {
            prop_assert!(shortfalls.is_empty());
        }
    }

    /// Shortfall reporting never mutates anything: re-running gives
    /// identical results
    #[test]
    fn prop_shortfall_check_is_pure(
        quantities in prop::collection::vec((1u32..100, 0u32..100), 1..8),
    ) {
        let inventory: Vec<InventoryItem> = quantities
            .iter()
            .enumerate()
            .map(|(i, (_, avail))| item(&format!("Mat {i}"), &avail.to_string()))
            .collect();
        let sources: Vec<JobLine> = quantities
            .iter()
            .enumerate()
            .map(|(i, (req, _))| source(&format!("Mat {i}"), &req.to_string()))
            .collect();
        let index = InventoryIndex::new(&inventory);

        let first = source_shortfalls(&sources, &index);
        let second = source_shortfalls(&sources, &index);

        prop_assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            prop_assert_eq!(&a.item_name, &b.item_name);
            prop_assert_eq!(a.shortfall, b.shortfall);
        }
    }
}
