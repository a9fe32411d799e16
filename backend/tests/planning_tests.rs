//! Shortage aggregation tests
//!
//! End-to-end coverage of the procurement pipeline: requirement
//! aggregation across orders, BOM explosion of composite items, netting
//! against stock, approved requests and in-flight jobs, and the
//! raw-only output filter.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use shared::models::{
    Assignment, AssignmentStatus, ClientType, ComponentRequirement, InventoryItem, ItemKind,
    JobLine, JobStatus, Kit, MaterialLine, ProcessingJob, Program, Vendor,
};
use shared::planning::{aggregate_shortages, ShortageInputs};
use shared::types::MaterialKey;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn line(name: &str, quantity: &str, unit: &str) -> MaterialLine {
    MaterialLine {
        name: name.to_string(),
        quantity: dec(quantity),
        unit: unit.to_string(),
        subcategory: None,
        notes: None,
        inventory_item_id: None,
    }
}

fn item(name: &str, kind: ItemKind, quantity: &str, min_stock: &str) -> InventoryItem {
    InventoryItem {
        id: Uuid::new_v4(),
        name: name.to_string(),
        kind,
        quantity: dec(quantity),
        unit: "pcs".to_string(),
        min_stock_level: dec(min_stock),
        subcategory: None,
        components: Vec::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn composite(
    name: &str,
    kind: ItemKind,
    quantity: &str,
    components: Vec<(&str, &str)>,
) -> InventoryItem {
    let mut it = item(name, kind, quantity, "0");
    it.components = components
        .into_iter()
        .map(|(n, q)| ComponentRequirement {
            material_name: n.to_string(),
            quantity_per_unit: dec(q),
            unit: "pcs".to_string(),
        })
        .collect();
    it
}

fn structured_kit(name: &str, program_id: Uuid, pouches: &str) -> Kit {
    Kit {
        id: Uuid::new_v4(),
        name: name.to_string(),
        program_id,
        category: None,
        subject: None,
        serial_number: None,
        is_structured: true,
        packing_requirements: Some(pouches.to_string()),
        spare_kits: Vec::new(),
        bulk_materials: Vec::new(),
        miscellaneous: Vec::new(),
        stock_count: Decimal::ZERO,
        status: "active".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn order(kit_id: Uuid, quantity: &str, status: AssignmentStatus) -> Assignment {
    Assignment {
        id: Uuid::new_v4(),
        client_id: Uuid::new_v4(),
        client_type: ClientType::B2b,
        kit_id,
        quantity: dec(quantity),
        status,
        grade: None,
        production_month: None,
        batch_id: None,
        courier: None,
        tracking_number: None,
        dispatched_at: None,
        delivered_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn program(name: &str) -> Program {
    Program {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        status: "active".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

struct World {
    kits: HashMap<Uuid, Kit>,
    programs: HashMap<Uuid, Program>,
    assignments: Vec<Assignment>,
    inventory: Vec<InventoryItem>,
    vendors: Vec<Vendor>,
    approved_requests: HashMap<MaterialKey, Decimal>,
    active_jobs: Vec<ProcessingJob>,
}

impl World {
    fn new() -> Self {
        World {
            kits: HashMap::new(),
            programs: HashMap::new(),
            assignments: Vec::new(),
            inventory: Vec::new(),
            vendors: Vec::new(),
            approved_requests: HashMap::new(),
            active_jobs: Vec::new(),
        }
    }

    fn shortages(&self) -> Vec<shared::models::MaterialShortage> {
        aggregate_shortages(&ShortageInputs {
            assignments: &self.assignments,
            kits: &self.kits,
            programs: &self.programs,
            inventory: &self.inventory,
            vendors: &self.vendors,
            approved_requests: &self.approved_requests,
            active_jobs: &self.active_jobs,
        })
    }
}

/// Two orders for a kit whose pouch holds 10 screws each: a ten-unit
/// and a five-unit order require 150 screws total, stock 100 with no
/// minimum leaves 50 short.
#[test]
fn test_requirements_aggregate_across_orders() {
    let mut w = World::new();
    let prog = program("Explorers");
    let kit = structured_kit(
        "Electronics Kit",
        prog.id,
        r#"{"pouches":[{"name":"Pouch A","materials":[{"name":"Screw","quantity":"10","unit":"pcs"}]}],"packets":[]}"#,
    );
    w.assignments.push(order(kit.id, "10", AssignmentStatus::Assigned));
    w.assignments.push(order(kit.id, "5", AssignmentStatus::InProduction));
    w.programs.insert(prog.id, prog);
    w.kits.insert(kit.id, kit);
    w.inventory.push(item("Screw", ItemKind::Raw, "100", "0"));

    let shortages = w.shortages();
    assert_eq!(shortages.len(), 1);
    assert_eq!(shortages[0].name, "Screw");
    assert_eq!(shortages[0].required, dec("150"));
    assert_eq!(shortages[0].available, dec("100"));
    assert_eq!(shortages[0].shortage, dec("50"));
    assert_eq!(shortages[0].kit_names, vec!["Electronics Kit".to_string()]);
    assert_eq!(shortages[0].program_names, vec!["Explorers".to_string()]);
}

/// Orders past local dispatch hand-off contribute nothing
#[test]
fn test_fulfilled_orders_contribute_no_demand() {
    let mut w = World::new();
    let prog = program("Explorers");
    let kit = structured_kit(
        "Electronics Kit",
        prog.id,
        r#"{"pouches":[{"name":"Pouch A","materials":[{"name":"Screw","quantity":"10","unit":"pcs"}]}],"packets":[]}"#,
    );
    w.assignments.push(order(kit.id, "10", AssignmentStatus::Dispatched));
    w.assignments.push(order(kit.id, "10", AssignmentStatus::Delivered));
    w.programs.insert(prog.id, prog);
    w.kits.insert(kit.id, kit);
    w.inventory.push(item("Screw", ItemKind::Raw, "0", "0"));

    assert!(w.shortages().is_empty());
}

/// A pouch material matching a sealed-packet stock row: the packet
/// itself is netted (10 needed, 3 on hand), and only the deficit is
/// expanded into component demand. Seven packets short at 4 wires each
/// adds 28 wires, and the packet row itself never reaches the
/// procurement output.
#[test]
fn test_sealed_packet_deficit_expansion() {
    let mut w = World::new();
    let prog = program("Explorers");
    let kit = structured_kit(
        "Circuits Kit",
        prog.id,
        r#"{"pouches":[{"name":"Pouch A","materials":[{"name":"Circuit Packet","quantity":"1","unit":"pcs"}]}],"packets":[]}"#,
    );
    w.assignments.push(order(kit.id, "10", AssignmentStatus::Assigned));
    w.programs.insert(prog.id, prog);
    w.kits.insert(kit.id, kit);
    w.inventory.push(composite(
        "Circuit Packet",
        ItemKind::SealedPacket,
        "3",
        vec![("Wire", "4")],
    ));
    w.inventory.push(item("Wire", ItemKind::Raw, "0", "0"));

    let shortages = w.shortages();
    assert_eq!(shortages.len(), 1);
    assert_eq!(shortages[0].name, "Wire");
    assert_eq!(shortages[0].required, dec("28"));
    assert_eq!(shortages[0].shortage, dec("28"));
    assert!(shortages[0]
        .category
        .contains("from Sealed Packet: Circuit Packet"));
}

/// Raw materials carry the reorder buffer; produced kinds do not
#[test]
fn test_min_stock_buffer_applies_to_raw_only() {
    let mut w = World::new();
    let prog = program("Explorers");
    let kit = structured_kit(
        "Mixed Kit",
        prog.id,
        r#"{"pouches":[{"name":"P","materials":[{"name":"Bolt","quantity":"1","unit":"pcs"},{"name":"Mixed Resin","quantity":"1","unit":"pcs"}]}],"packets":[]}"#,
    );
    w.assignments.push(order(kit.id, "10", AssignmentStatus::Assigned));
    w.programs.insert(prog.id, prog);
    w.kits.insert(kit.id, kit);
    // 10 required, 12 on hand, but the floor of 5 makes it 3 short
    w.inventory.push(item("Bolt", ItemKind::Raw, "12", "5"));
    // Same numbers without the buffer: fully covered
    w.inventory
        .push(item("Mixed Resin", ItemKind::PreProcessed, "12", "5"));

    let shortages = w.shortages();
    assert_eq!(shortages.len(), 1);
    assert_eq!(shortages[0].name, "Bolt");
    assert_eq!(shortages[0].shortage, dec("3"));
}

/// Approved requests and in-flight job targets reduce the reported
/// shortage, clamped at zero
#[test]
fn test_deductions_for_requests_and_jobs() {
    let mut w = World::new();
    let prog = program("Explorers");
    let kit = structured_kit(
        "Kit",
        prog.id,
        r#"{"pouches":[{"name":"P","materials":[{"name":"Screw","quantity":"10","unit":"pcs"},{"name":"Washer","quantity":"10","unit":"pcs"}]}],"packets":[]}"#,
    );
    w.assignments.push(order(kit.id, "10", AssignmentStatus::Assigned));
    w.programs.insert(prog.id, prog);
    w.kits.insert(kit.id, kit);
    w.inventory.push(item("Screw", ItemKind::Raw, "0", "0"));
    w.inventory.push(item("Washer", ItemKind::Raw, "0", "0"));

    // 40 approved against a 100 shortage
    w.approved_requests.insert(MaterialKey::new("screw"), dec("40"));
    // A job producing 500 washers clamps that shortage to zero
    w.active_jobs.push(ProcessingJob {
        id: Uuid::new_v4(),
        title: "Washer run".to_string(),
        sources: Vec::new(),
        targets: vec![JobLine {
            item_name: "Washer".to_string(),
            quantity: dec("500"),
            unit: "pcs".to_string(),
        }],
        status: JobStatus::InProgress,
        assigned_to: None,
        notes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    });

    let shortages = w.shortages();
    assert_eq!(shortages.len(), 1);
    assert_eq!(shortages[0].name, "Screw");
    assert_eq!(shortages[0].shortage, dec("60"));
}

/// First vendor in creation order quoting the item annotates the row
#[test]
fn test_vendor_annotation_first_match() {
    let mut w = World::new();
    let prog = program("Explorers");
    let kit = structured_kit(
        "Kit",
        prog.id,
        r#"{"pouches":[{"name":"P","materials":[{"name":"Screw","quantity":"1","unit":"pcs"}]}],"packets":[]}"#,
    );
    w.assignments.push(order(kit.id, "10", AssignmentStatus::Assigned));
    w.programs.insert(prog.id, prog);
    w.kits.insert(kit.id, kit);
    let screw = item("Screw", ItemKind::Raw, "0", "0");
    let screw_id = screw.id;
    w.inventory.push(screw);

    let vendor = |name: &str, price: &str| Vendor {
        id: Uuid::new_v4(),
        name: name.to_string(),
        contact: None,
        item_prices: vec![shared::models::ItemPrice {
            inventory_item_id: screw_id,
            average_price: dec(price),
        }],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    w.vendors.push(vendor("Acme Supply", "1.50"));
    w.vendors.push(vendor("Budget Bolts", "0.90"));

    let shortages = w.shortages();
    assert_eq!(shortages[0].vendor_name.as_deref(), Some("Acme Supply"));
    assert_eq!(shortages[0].vendor_price, Some(dec("1.50")));
}

/// Case-insensitive name merging: "Screw" and "screw" are one row,
/// spelled the way it was first seen
#[test]
fn test_name_normalization_merges_rows() {
    let mut w = World::new();
    let prog = program("Explorers");
    let kit_a = structured_kit(
        "Kit A",
        prog.id,
        r#"{"pouches":[{"name":"P","materials":[{"name":"Screw","quantity":"1","unit":"pcs"}]}],"packets":[]}"#,
    );
    let kit_b = structured_kit(
        "Kit B",
        prog.id,
        r#"{"pouches":[{"name":"P","materials":[{"name":"screw","quantity":"2","unit":"pcs"}]}],"packets":[]}"#,
    );
    w.assignments.push(order(kit_a.id, "1", AssignmentStatus::Assigned));
    w.assignments.push(order(kit_b.id, "1", AssignmentStatus::Assigned));
    w.programs.insert(prog.id, prog);
    w.kits.insert(kit_a.id, kit_a);
    w.kits.insert(kit_b.id, kit_b);

    let shortages = w.shortages();
    assert_eq!(shortages.len(), 1);
    assert_eq!(shortages[0].name, "Screw");
    assert_eq!(shortages[0].required, dec("3"));
    assert_eq!(shortages[0].kit_names.len(), 2);
}

/// A self-referential component graph terminates and reports finite
/// demand
#[test]
fn test_cyclic_components_terminate() {
    let mut w = World::new();
    let prog = program("Explorers");
    let kit = structured_kit(
        "Kit",
        prog.id,
        r#"{"pouches":[{"name":"P","materials":[{"name":"Blend A","quantity":"1","unit":"pcs"}]}],"packets":[]}"#,
    );
    w.assignments.push(order(kit.id, "5", AssignmentStatus::Assigned));
    w.programs.insert(prog.id, prog);
    w.kits.insert(kit.id, kit);
    w.inventory.push(composite(
        "Blend A",
        ItemKind::PreProcessed,
        "0",
        vec![("Blend B", "2")],
    ));
    w.inventory.push(composite(
        "Blend B",
        ItemKind::PreProcessed,
        "0",
        vec![("Blend A", "2")],
    ));

    // Both nodes are composite, so neither is procurable; the point is
    // that we get here at all.
    let shortages = w.shortages();
    assert!(shortages.is_empty());
}

/// An unstructured kit with flat lists aggregates spare, bulk and misc
/// lines scaled by order quantity
#[test]
fn test_flat_list_kit_aggregation() {
    let mut w = World::new();
    let prog = program("Explorers");
    let mut kit = structured_kit("Legacy Kit", prog.id, "");
    kit.is_structured = false;
    kit.packing_requirements = None;
    kit.spare_kits = vec![line("Spare Lens", "1", "pcs")];
    kit.bulk_materials = vec![line("Sand", "0.5", "kg")];
    w.assignments.push(order(kit.id, "4", AssignmentStatus::Assigned));
    w.programs.insert(prog.id, prog);
    w.kits.insert(kit.id, kit);

    let shortages = w.shortages();
    assert_eq!(shortages.len(), 2);
    assert_eq!(shortages[0].name, "Spare Lens");
    assert_eq!(shortages[0].required, dec("4"));
    assert_eq!(shortages[0].category, "Spare Kit");
    assert_eq!(shortages[1].name, "Sand");
    assert_eq!(shortages[1].required, dec("2.0"));
    assert_eq!(shortages[1].category, "Bulk Material");
}

// ============================================================================
// Property Tests
// ============================================================================

fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1u32..10_000).prop_map(|n| Decimal::from(n) / Decimal::from(100))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Reported shortage is never negative and never exceeds what the
    /// requirement plus buffer could demand
    #[test]
    fn prop_shortage_bounds(
        required in quantity_strategy(),
        available in quantity_strategy(),
        min_stock in quantity_strategy(),
        order_qty in 1u32..50,
    ) {
        let mut w = World::new();
        let prog = program("P");
        let per_unit = required;
        let kit = structured_kit(
            "Kit",
            prog.id,
            &format!(
                r#"{{"pouches":[{{"name":"P","materials":[{{"name":"Mat","quantity":"{per_unit}","unit":"pcs"}}]}}],"packets":[]}}"#,
            ),
        );
        w.assignments.push(order(kit.id, &order_qty.to_string(), AssignmentStatus::Assigned));
        w.programs.insert(prog.id, prog);
        w.kits.insert(kit.id, kit);
        let mut mat = item("Mat", ItemKind::Raw, "0", "0");
        mat.quantity = available;
        mat.min_stock_level = min_stock;
        w.inventory.push(mat);

        let total_required = per_unit * Decimal::from(order_qty);
        for s in w.shortages() {
            prop_assert!(s.shortage > Decimal::ZERO);
            prop_assert!(s.shortage <= total_required + min_stock);
            prop_assert_eq!(s.required, total_required);
        }
    }

    /// Splitting one order into two of the same total quantity reports
    /// the same shortage
    #[test]
    fn prop_aggregation_is_order_count_invariant(
        qty_a in 1u32..100,
        qty_b in 1u32..100,
        stock in quantity_strategy(),
    ) {
        let build = |quantities: &[u32], stock: Decimal| {
            let mut w = World::new();
            let prog = program("P");
            let kit = structured_kit(
                "Kit",
                prog.id,
                r#"{"pouches":[{"name":"P","materials":[{"name":"Mat","quantity":"3","unit":"pcs"}]}],"packets":[]}"#,
            );
            for q in quantities {
                w.assignments.push(order(kit.id, &q.to_string(), AssignmentStatus::Assigned));
            }
            w.programs.insert(prog.id, prog);
            w.kits.insert(kit.id, kit);
            let mut mat = item("Mat", ItemKind::Raw, "0", "0");
            mat.quantity = stock;
            w.inventory.push(mat);
            w.shortages()
        };

        let split = build(&[qty_a, qty_b], stock);
        let merged = build(&[qty_a + qty_b], stock);

        prop_assert_eq!(split.len(), merged.len());
        for (s, m) in split.iter().zip(merged.iter()) {
            prop_assert_eq!(s.required, m.required);
            prop_assert_eq!(s.shortage, m.shortage);
        }
    }

    /// An approved request never increases a shortage, and full
    /// coverage removes the row
    #[test]
    fn prop_approved_requests_only_reduce(
        shortage_qty in 1u32..1000,
        approved in 0u32..2000,
    ) {
        let mut w = World::new();
        let prog = program("P");
        let kit = structured_kit(
            "Kit",
            prog.id,
            r#"{"pouches":[{"name":"P","materials":[{"name":"Mat","quantity":"1","unit":"pcs"}]}],"packets":[]}"#,
        );
        w.assignments.push(order(kit.id, &shortage_qty.to_string(), AssignmentStatus::Assigned));
        w.programs.insert(prog.id, prog);
        w.kits.insert(kit.id, kit);
        w.inventory.push(item("Mat", ItemKind::Raw, "0", "0"));
        w.approved_requests.insert(MaterialKey::new("mat"), Decimal::from(approved));

        let shortages = w.shortages();
        if approved >= shortage_qty {
            prop_assert!(shortages.is_empty());
        } else {
            prop_assert_eq!(shortages.len(), 1);
            prop_assert_eq!(
                shortages[0].shortage,
                Decimal::from(shortage_qty) - Decimal::from(approved)
            );
        }
    }
}
