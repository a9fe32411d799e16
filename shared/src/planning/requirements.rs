//! Material aggregation for one kit instance
//!
//! Two views of the same kit, and the distinction is load-bearing:
//! procurement looks through a packet at the raw materials inside it,
//! while dispatch consumes the assembled packet as a single unit from
//! its own sealed-packet inventory row.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Kit, MaterialLine};
use crate::types::MaterialKey;

pub const CATEGORY_MAIN_COMPONENT: &str = "Main Component";
pub const CATEGORY_SPARE_KIT: &str = "Spare Kit";
pub const CATEGORY_BULK_MATERIAL: &str = "Bulk Material";
pub const CATEGORY_MISCELLANEOUS: &str = "Miscellaneous";

/// A material requirement with the category line it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredMaterial {
    pub line: MaterialLine,
    pub category: String,
}

fn scaled(line: &MaterialLine, factor: Decimal) -> MaterialLine {
    MaterialLine {
        quantity: line.quantity * factor,
        ..line.clone()
    }
}

/// Flatten one ordered quantity of one kit into per-material
/// requirements for procurement.
///
/// Pouch materials are tagged "Main Component"; packet contents are
/// tagged by packet name (the raw content is what procurement must
/// source); the flat spare/bulk/miscellaneous lists carry their own
/// category. Output is not deduplicated across categories; name-keyed
/// merging happens in the shortage accumulator.
pub fn requirements_for_kit_instance(kit: &Kit, instance_qty: Decimal) -> Vec<RequiredMaterial> {
    let mut required = Vec::new();

    let structure = kit.packing_structure();
    for pouch in &structure.pouches {
        for line in &pouch.materials {
            required.push(RequiredMaterial {
                line: scaled(line, instance_qty),
                category: CATEGORY_MAIN_COMPONENT.to_string(),
            });
        }
    }
    for packet in &structure.packets {
        for line in &packet.materials {
            required.push(RequiredMaterial {
                line: scaled(line, instance_qty),
                category: format!("Packet: {}", packet.name),
            });
        }
    }

    for (list, category) in [
        (&kit.spare_kits, CATEGORY_SPARE_KIT),
        (&kit.bulk_materials, CATEGORY_BULK_MATERIAL),
        (&kit.miscellaneous, CATEGORY_MISCELLANEOUS),
    ] {
        for line in list {
            required.push(RequiredMaterial {
                line: scaled(line, instance_qty),
                category: category.to_string(),
            });
        }
    }

    required
}

/// The component list an order consumes when it moves into packing
/// output, aggregated case-insensitively by name.
///
/// Pouch and flat-list materials scale with the order quantity. Each
/// packet contributes one line under its own sealed-packet identity
/// with quantity equal to the order quantity: the packet was already
/// assembled out of its contents by a processing job.
pub fn dispatch_components_for_kit(kit: &Kit, order_qty: Decimal) -> Vec<MaterialLine> {
    let mut lines = Vec::new();

    let structure = kit.packing_structure();
    for pouch in &structure.pouches {
        for line in &pouch.materials {
            lines.push(scaled(line, order_qty));
        }
    }
    for packet in &structure.packets {
        lines.push(MaterialLine {
            name: packet.name.clone(),
            quantity: order_qty,
            unit: "pcs".to_string(),
            subcategory: None,
            notes: None,
            inventory_item_id: None,
        });
    }

    for list in [&kit.spare_kits, &kit.bulk_materials, &kit.miscellaneous] {
        for line in list {
            lines.push(scaled(line, order_qty));
        }
    }

    aggregate_by_name(lines)
}

/// Merge lines by normalized name, summing quantities. The first-seen
/// spelling and unit win.
pub fn aggregate_by_name(lines: Vec<MaterialLine>) -> Vec<MaterialLine> {
    let mut merged: Vec<(MaterialKey, MaterialLine)> = Vec::new();
    for line in lines {
        let key = MaterialKey::new(&line.name);
        match merged.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.quantity += line.quantity,
            None => merged.push((key, line)),
        }
    }
    merged.into_iter().map(|(_, line)| line).collect()
}
