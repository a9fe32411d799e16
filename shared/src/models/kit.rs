//! Kit and packing-structure models
//!
//! A kit is a finished-product specification: a structured packing
//! payload (pouches and pre-sealed packets) plus independent flat lists
//! of spare, bulk and miscellaneous materials. The packing payload is
//! stored serialized; [`PackingStructure::parse`] is the total,
//! legacy-tolerant entry point for reading it back.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// One material line inside a pouch, packet or flat list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialLine {
    pub name: String,
    pub quantity: Decimal,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_item_id: Option<Uuid>,
}

/// A named container of materials (a pouch or a pre-sealed packet)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingContainer {
    pub name: String,
    #[serde(default)]
    pub materials: Vec<MaterialLine>,
}

/// Parsed form of a kit's serialized packing-requirements payload.
///
/// `pouches` hold loose materials sealed into the kit's main pouch;
/// `packets` are pre-sealed sub-packets that each contain materials of
/// their own. A packet is consumed as one assembled unit at dispatch
/// time, while procurement looks through it at the raw contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackingStructure {
    #[serde(default)]
    pub pouches: Vec<PackingContainer>,
    #[serde(default)]
    pub packets: Vec<PackingContainer>,
}

/// Packing payload that failed to deserialize
#[derive(Debug, Error)]
#[error("invalid packing payload: {0}")]
pub struct PackingParseError(#[from] serde_json::Error);

/// Accepts both the current object format and the legacy bare array
#[derive(Deserialize)]
#[serde(untagged)]
enum PackingPayload {
    Current {
        #[serde(default)]
        pouches: Vec<PackingContainer>,
        #[serde(default)]
        packets: Vec<PackingContainer>,
    },
    Legacy(Vec<PackingContainer>),
}

impl PackingStructure {
    /// Parse a serialized packing payload. Total: any malformed or
    /// absent input yields the empty structure, never an error.
    pub fn parse(payload: Option<&str>) -> Self {
        let Some(raw) = payload else {
            return Self::default();
        };
        match Self::try_parse(raw) {
            Ok(structure) => structure,
            Err(err) => {
                tracing::warn!("packing payload unreadable, treating as empty: {err}");
                Self::default()
            }
        }
    }

    /// Strict parse, used internally and when validating kit input
    pub fn try_parse(raw: &str) -> Result<Self, PackingParseError> {
        let payload: PackingPayload = serde_json::from_str(raw)?;
        Ok(match payload {
            PackingPayload::Current { pouches, packets } => Self { pouches, packets },
            // Legacy kits stored a bare pouch array with no packets
            PackingPayload::Legacy(pouches) => Self {
                pouches,
                packets: Vec::new(),
            },
        })
    }

    /// Serialize back to the stored wire form (plain JSON)
    pub fn serialize(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Merge pouch and packet materials into one flat list, summing
    /// quantities when the same name appears more than once. Name
    /// matching is case-sensitive at this layer.
    pub fn flatten_to_materials(&self) -> Vec<MaterialLine> {
        let mut merged: Vec<MaterialLine> = Vec::new();
        let all = self
            .pouches
            .iter()
            .chain(self.packets.iter())
            .flat_map(|container| container.materials.iter());
        for line in all {
            match merged.iter_mut().find(|m| m.name == line.name) {
                Some(existing) => existing.quantity += line.quantity,
                None => merged.push(line.clone()),
            }
        }
        merged
    }
}

/// A finished-product specification.
///
/// Not itself a stock row: a matching `finished`-kind inventory item is
/// mirrored by name when orders move into the packing output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kit {
    pub id: Uuid,
    pub name: String,
    pub program_id: Uuid,
    pub category: Option<String>,
    pub subject: Option<String>,
    pub serial_number: Option<String>,
    pub is_structured: bool,
    /// Serialized `PackingStructure`; read through [`PackingStructure::parse`]
    pub packing_requirements: Option<String>,
    pub spare_kits: Vec<MaterialLine>,
    pub bulk_materials: Vec<MaterialLine>,
    pub miscellaneous: Vec<MaterialLine>,
    pub stock_count: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Kit {
    pub fn packing_structure(&self) -> PackingStructure {
        if !self.is_structured {
            return PackingStructure::default();
        }
        PackingStructure::parse(self.packing_requirements.as_deref())
    }
}

/// A product line owning a family of kits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, qty: i64) -> MaterialLine {
        MaterialLine {
            name: name.to_string(),
            quantity: Decimal::from(qty),
            unit: "pcs".to_string(),
            subcategory: None,
            notes: None,
            inventory_item_id: None,
        }
    }

    #[test]
    fn parse_current_format() {
        let raw = r#"{"pouches":[{"name":"Pouch 1","materials":[{"name":"LED","quantity":"2","unit":"pcs"}]}],"packets":[]}"#;
        let parsed = PackingStructure::parse(Some(raw));
        assert_eq!(parsed.pouches.len(), 1);
        assert_eq!(parsed.pouches[0].materials[0].name, "LED");
        assert!(parsed.packets.is_empty());
    }

    #[test]
    fn parse_missing_keys_default_to_empty() {
        let parsed = PackingStructure::parse(Some(r#"{"packets":[]}"#));
        assert!(parsed.pouches.is_empty());
        assert!(parsed.packets.is_empty());
    }

    #[test]
    fn parse_legacy_bare_array_as_pouches() {
        let raw = r#"[{"name":"Main","materials":[{"name":"Wire","quantity":"4","unit":"m"}]}]"#;
        let parsed = PackingStructure::parse(Some(raw));
        assert_eq!(parsed.pouches.len(), 1);
        assert_eq!(parsed.pouches[0].name, "Main");
        assert!(parsed.packets.is_empty());
    }

    #[test]
    fn parse_never_fails() {
        for bad in [None, Some(""), Some("not json"), Some("{"), Some("42"), Some("null")] {
            let parsed = PackingStructure::parse(bad);
            assert_eq!(parsed, PackingStructure::default());
        }
    }

    #[test]
    fn serialize_parse_round_trip() {
        let structure = PackingStructure {
            pouches: vec![PackingContainer {
                name: "Pouch 1".to_string(),
                materials: vec![line("LED", 2), line("Resistor", 5)],
            }],
            packets: vec![PackingContainer {
                name: "Packet 1.1".to_string(),
                materials: vec![line("Wire", 1)],
            }],
        };
        let round_tripped = PackingStructure::parse(Some(&structure.serialize()));
        assert_eq!(round_tripped, structure);
    }

    #[test]
    fn flatten_sums_duplicate_names() {
        let structure = PackingStructure {
            pouches: vec![PackingContainer {
                name: "Pouch 1".to_string(),
                materials: vec![line("LED", 2), line("Wire", 1)],
            }],
            packets: vec![PackingContainer {
                name: "Packet 1.1".to_string(),
                materials: vec![line("LED", 3)],
            }],
        };
        let flat = structure.flatten_to_materials();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].name, "LED");
        assert_eq!(flat[0].quantity, Decimal::from(5));
    }

    #[test]
    fn flatten_is_case_sensitive() {
        let structure = PackingStructure {
            pouches: vec![PackingContainer {
                name: "Pouch 1".to_string(),
                materials: vec![line("led", 2), line("LED", 3)],
            }],
            packets: vec![],
        };
        assert_eq!(structure.flatten_to_materials().len(), 2);
    }

    #[test]
    fn unstructured_kit_has_empty_packing() {
        let kit = Kit {
            id: Uuid::new_v4(),
            name: "Banjo Boy".to_string(),
            program_id: Uuid::new_v4(),
            category: None,
            subject: None,
            serial_number: None,
            is_structured: false,
            packing_requirements: Some(r#"{"pouches":[{"name":"P","materials":[]}]}"#.to_string()),
            spare_kits: vec![],
            bulk_materials: vec![],
            miscellaneous: vec![],
            stock_count: Decimal::ZERO,
            status: "active".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(kit.packing_structure(), PackingStructure::default());
    }
}
