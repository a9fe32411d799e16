//! Cycle-safe BOM explosion
//!
//! Expands the shortage of composite inventory items (pre-processed
//! materials, sealed packets) into upstream raw-material demand using a
//! FIFO worklist. Each key is processed at most once: a component graph
//! that cycles back to an already-processed key is simply not
//! re-expanded, which bounds the loop by the number of distinct
//! materials touched.

use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet, VecDeque};
use uuid::Uuid;

use crate::models::{InventoryItem, ItemKind};
use crate::planning::accumulator::RequirementAccumulator;
use crate::types::MaterialKey;

/// Case-insensitive inventory lookup built once per aggregation call.
///
/// Name uniqueness is not enforced at the data layer; on duplicates the
/// first item in list order wins, matching the soft-filter behavior the
/// rest of the system assumes.
pub struct InventoryIndex<'a> {
    by_key: HashMap<MaterialKey, &'a InventoryItem>,
    by_id: HashMap<Uuid, &'a InventoryItem>,
}

impl<'a> InventoryIndex<'a> {
    pub fn new(items: &'a [InventoryItem]) -> Self {
        let mut by_key = HashMap::new();
        let mut by_id = HashMap::new();
        for item in items {
            by_key.entry(MaterialKey::new(&item.name)).or_insert(item);
            by_id.entry(item.id).or_insert(item);
        }
        Self { by_key, by_id }
    }

    pub fn lookup(&self, name: &str) -> Option<&'a InventoryItem> {
        self.lookup_key(&MaterialKey::new(name))
    }

    pub fn lookup_key(&self, key: &MaterialKey) -> Option<&'a InventoryItem> {
        self.by_key.get(key).copied()
    }

    pub fn lookup_id(&self, id: Uuid) -> Option<&'a InventoryItem> {
        self.by_id.get(&id).copied()
    }
}

/// Shortage policy per item kind.
///
/// Raw materials carry the reorder buffer: falling below minimum stock
/// is itself a shortage. Produced kinds get no buffer; they are made on
/// demand.
fn shortage_for(required: Decimal, item: Option<&InventoryItem>) -> (Decimal, Decimal) {
    let zero = Decimal::ZERO;
    match item {
        Some(item) => {
            let available = item.quantity;
            let deficit = match item.kind {
                ItemKind::Raw => required - available + item.min_stock_level,
                _ => required - available,
            };
            (available, deficit.max(zero))
        }
        // No stock row at all: the whole requirement is short
        None => (zero, required.max(zero)),
    }
}

/// Expand the accumulated requirements in place.
///
/// Worklist algorithm: seed with every key already present, pop a key,
/// recompute its shortage against inventory, and if the matched item is
/// composite and short, push its component demand (shortage times
/// quantity-per-unit) back into the accumulator, enqueueing keys not
/// yet processed. Components of sealed packets are tagged with their
/// origin so the worklist reads as "what's inside the packet".
pub fn explode(acc: &mut RequirementAccumulator, index: &InventoryIndex<'_>) {
    let mut worklist: VecDeque<MaterialKey> = acc.keys().into_iter().collect();
    let mut processed: HashSet<MaterialKey> = HashSet::new();

    while let Some(key) = worklist.pop_front() {
        if !processed.insert(key.clone()) {
            continue;
        }

        let item = index.lookup_key(&key);
        let Some(entry) = acc.get_mut(&key) else {
            continue;
        };

        let (available, shortage) = shortage_for(entry.required, item);
        entry.available = available;
        entry.shortage = shortage;

        let Some(item) = item else {
            continue;
        };
        entry.inventory_item_id = Some(item.id);
        if entry.subcategory.is_none() {
            entry.subcategory = item.subcategory.clone();
        }

        if shortage <= Decimal::ZERO || !item.is_composite() {
            continue;
        }

        let parent_category = entry.category.clone();
        let kit_names = entry.kit_names.clone();
        let program_names = entry.program_names.clone();

        for component in &item.components {
            let needed = shortage * component.quantity_per_unit;
            let category = match item.kind {
                ItemKind::SealedPacket => {
                    format!("{} (from Sealed Packet: {})", parent_category, item.name)
                }
                _ => parent_category.clone(),
            };
            acc.add_derived(
                &component.material_name,
                needed,
                &component.unit,
                category,
                &kit_names,
                &program_names,
            );
            let child_key = MaterialKey::new(&component.material_name);
            if !processed.contains(&child_key) {
                worklist.push_back(child_key);
            }
        }
    }
}
