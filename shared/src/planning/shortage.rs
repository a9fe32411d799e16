//! Shortage aggregation across active orders
//!
//! Combines the material aggregator and the BOM explosion engine over
//! every order still driving demand, nets the result against stock,
//! minimum-stock policy, approved material requests and in-flight
//! processing jobs, and emits the raw-material procurement worklist.

use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{Assignment, Kit, MaterialShortage, ProcessingJob, Program, Vendor};
use crate::models::{InventoryItem, ItemKind};
use crate::planning::accumulator::RequirementAccumulator;
use crate::planning::explosion::{explode, InventoryIndex};
use crate::planning::requirements::requirements_for_kit_instance;
use crate::types::MaterialKey;

/// Everything the aggregation reads. All of it is a point-in-time
/// snapshot; the result is a pure function of these inputs.
pub struct ShortageInputs<'a> {
    pub assignments: &'a [Assignment],
    pub kits: &'a HashMap<Uuid, Kit>,
    pub programs: &'a HashMap<Uuid, Program>,
    pub inventory: &'a [InventoryItem],
    pub vendors: &'a [Vendor],
    /// Quantities already covered by approved, unfulfilled material requests
    pub approved_requests: &'a HashMap<MaterialKey, Decimal>,
    pub active_jobs: &'a [ProcessingJob],
}

/// Compute the procurement worklist.
///
/// Orders outside the active status set contribute nothing. Composite
/// items (sealed packets, pre-processed materials) are netted, exploded
/// into their raw constituents and excluded from the output themselves;
/// only raw materials (or names with no stock row at all) are
/// procurable.
pub fn aggregate_shortages(inputs: &ShortageInputs<'_>) -> Vec<MaterialShortage> {
    let index = InventoryIndex::new(inputs.inventory);
    let mut acc = RequirementAccumulator::new();

    for assignment in inputs.assignments {
        if !assignment.status.is_active_for_procurement() {
            continue;
        }
        let Some(kit) = inputs.kits.get(&assignment.kit_id) else {
            // Orphaned order; nothing to aggregate
            continue;
        };
        let program_name = inputs
            .programs
            .get(&kit.program_id)
            .map(|p| p.name.as_str())
            .unwrap_or("");

        for material in requirements_for_kit_instance(kit, assignment.quantity) {
            acc.merge(&material, &kit.name, program_name);
        }
    }

    explode(&mut acc, &index);

    apply_deductions(&mut acc, inputs);

    acc.finalize()
        .into_iter()
        .filter(|entry| entry.shortage > Decimal::ZERO)
        .filter(|entry| is_procurable(entry.inventory_item_id, &index))
        .map(|entry| {
            let (vendor_name, vendor_price) =
                vendor_quote(entry.inventory_item_id, inputs.vendors);
            MaterialShortage {
                name: entry.name,
                required: entry.required,
                available: entry.available,
                shortage: entry.shortage,
                unit: entry.unit,
                category: entry.category,
                subcategory: entry.subcategory,
                kit_names: entry.kit_names,
                program_names: entry.program_names,
                vendor_name,
                vendor_price,
                inventory_item_id: entry.inventory_item_id,
            }
        })
        .collect()
}

/// Net out quantities already on order or already being produced.
fn apply_deductions(acc: &mut RequirementAccumulator, inputs: &ShortageInputs<'_>) {
    let mut job_targets: HashMap<MaterialKey, Decimal> = HashMap::new();
    for job in inputs.active_jobs {
        if !job.status.is_active() {
            continue;
        }
        for target in &job.targets {
            *job_targets
                .entry(MaterialKey::new(&target.item_name))
                .or_insert(Decimal::ZERO) += target.quantity;
        }
    }

    for key in acc.keys() {
        let Some(entry) = acc.get_mut(&key) else {
            continue;
        };
        if let Some(approved) = inputs.approved_requests.get(&key) {
            entry.shortage = (entry.shortage - approved).max(Decimal::ZERO);
        }
        if let Some(in_production) = job_targets.get(&key) {
            entry.shortage = (entry.shortage - in_production).max(Decimal::ZERO);
        }
    }
}

/// Only raw materials are procurement targets. A composite item with a
/// positive shortage is an intermediate node: its exploded raw children
/// carry the demand. A name with no stock row at all is procurable as
/// written.
fn is_procurable(inventory_item_id: Option<Uuid>, index: &InventoryIndex<'_>) -> bool {
    match inventory_item_id.and_then(|id| index.lookup_id(id)) {
        Some(item) => item.kind == ItemKind::Raw && !item.is_composite(),
        None => true,
    }
}

/// First vendor carrying the item wins; no ranking beyond list order.
fn vendor_quote(
    inventory_item_id: Option<Uuid>,
    vendors: &[Vendor],
) -> (Option<String>, Option<Decimal>) {
    let Some(id) = inventory_item_id else {
        return (None, None);
    };
    for vendor in vendors {
        if let Some(price) = vendor.price_for(id) {
            return (Some(vendor.name.clone()), Some(price));
        }
    }
    (None, None)
}
