//! Name-keyed requirement accumulator
//!
//! The shortage pipeline is a fold of assignment requirements into one
//! of these, followed by BOM explosion and netting. Keeping the merge
//! rules in a dedicated type keeps the pipeline itself declarative.

use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::planning::requirements::RequiredMaterial;
use crate::types::MaterialKey;

/// One accumulated material row, before and after netting
#[derive(Debug, Clone)]
pub struct ShortageEntry {
    /// First-seen spelling of the material name
    pub name: String,
    pub required: Decimal,
    pub available: Decimal,
    pub shortage: Decimal,
    pub unit: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub kit_names: Vec<String>,
    pub program_names: Vec<String>,
    pub inventory_item_id: Option<Uuid>,
}

/// Accumulates requirements keyed by normalized material name,
/// preserving first-insertion order for deterministic output.
#[derive(Debug, Default)]
pub struct RequirementAccumulator {
    entries: HashMap<MaterialKey, ShortageEntry>,
    order: Vec<MaterialKey>,
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !name.is_empty() && !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

impl RequirementAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one aggregated requirement line, tagging the contributing
    /// kit and program. Sums `required` on name collision; the first
    /// spelling, unit and category win.
    pub fn merge(&mut self, material: &RequiredMaterial, kit_name: &str, program_name: &str) {
        let key = MaterialKey::new(&material.line.name);
        match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.required += material.line.quantity;
                push_unique(&mut entry.kit_names, kit_name);
                push_unique(&mut entry.program_names, program_name);
            }
            None => {
                let mut kit_names = Vec::new();
                let mut program_names = Vec::new();
                push_unique(&mut kit_names, kit_name);
                push_unique(&mut program_names, program_name);
                self.entries.insert(
                    key.clone(),
                    ShortageEntry {
                        name: material.line.name.clone(),
                        required: material.line.quantity,
                        available: Decimal::ZERO,
                        shortage: Decimal::ZERO,
                        unit: material.line.unit.clone(),
                        category: material.category.clone(),
                        subcategory: material.line.subcategory.clone(),
                        kit_names,
                        program_names,
                        inventory_item_id: material.line.inventory_item_id,
                    },
                );
                self.order.push(key);
            }
        }
    }

    /// Add upstream demand derived by BOM explosion. Returns `true` if
    /// this created a new entry (the caller then enqueues the key).
    /// The derived entry's shortage stays zero until the key itself is
    /// processed.
    pub fn add_derived(
        &mut self,
        name: &str,
        required: Decimal,
        unit: &str,
        category: String,
        kit_names: &[String],
        program_names: &[String],
    ) -> bool {
        let key = MaterialKey::new(name);
        match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.required += required;
                for kit in kit_names {
                    push_unique(&mut entry.kit_names, kit);
                }
                for program in program_names {
                    push_unique(&mut entry.program_names, program);
                }
                false
            }
            None => {
                self.entries.insert(
                    key.clone(),
                    ShortageEntry {
                        name: name.to_string(),
                        required,
                        available: Decimal::ZERO,
                        shortage: Decimal::ZERO,
                        unit: unit.to_string(),
                        category,
                        subcategory: None,
                        kit_names: kit_names.to_vec(),
                        program_names: program_names.to_vec(),
                        inventory_item_id: None,
                    },
                );
                self.order.push(key);
                true
            }
        }
    }

    pub fn get(&self, key: &MaterialKey) -> Option<&ShortageEntry> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &MaterialKey) -> Option<&mut ShortageEntry> {
        self.entries.get_mut(key)
    }

    /// Keys currently present, in first-insertion order
    pub fn keys(&self) -> Vec<MaterialKey> {
        self.order.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Consume the accumulator, yielding entries in insertion order
    pub fn finalize(mut self) -> Vec<ShortageEntry> {
        self.order
            .iter()
            .filter_map(|key| self.entries.remove(key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MaterialLine;

    fn required(name: &str, qty: i64, category: &str) -> RequiredMaterial {
        RequiredMaterial {
            line: MaterialLine {
                name: name.to_string(),
                quantity: Decimal::from(qty),
                unit: "pcs".to_string(),
                subcategory: None,
                notes: None,
                inventory_item_id: None,
            },
            category: category.to_string(),
        }
    }

    #[test]
    fn merge_sums_required_across_case_variants() {
        let mut acc = RequirementAccumulator::new();
        acc.merge(&required("LED", 4, "Main Component"), "Kit A", "Program 1");
        acc.merge(&required("led", 6, "Spare Kit"), "Kit B", "Program 1");

        let entries = acc.finalize();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "LED");
        assert_eq!(entries[0].required, Decimal::from(10));
        assert_eq!(entries[0].category, "Main Component");
        assert_eq!(entries[0].kit_names, vec!["Kit A", "Kit B"]);
        assert_eq!(entries[0].program_names, vec!["Program 1"]);
    }

    #[test]
    fn finalize_preserves_first_insertion_order() {
        let mut acc = RequirementAccumulator::new();
        acc.merge(&required("Zinc", 1, "Bulk Material"), "Kit A", "P");
        acc.merge(&required("Alum", 1, "Bulk Material"), "Kit A", "P");
        acc.merge(&required("Zinc", 1, "Bulk Material"), "Kit B", "P");

        let names: Vec<_> = acc.finalize().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Zinc", "Alum"]);
    }

    #[test]
    fn add_derived_reports_new_entries() {
        let mut acc = RequirementAccumulator::new();
        acc.merge(&required("Packet A", 10, "Main Component"), "Kit A", "P");

        let tags = vec!["Kit A".to_string()];
        assert!(acc.add_derived("Wire", Decimal::from(28), "m", "x".into(), &tags, &tags));
        assert!(!acc.add_derived("wire", Decimal::from(2), "m", "y".into(), &tags, &tags));

        let wire = acc.get(&MaterialKey::new("Wire")).unwrap();
        assert_eq!(wire.required, Decimal::from(30));
        assert_eq!(wire.shortage, Decimal::ZERO);
    }
}
