//! Kit (bill-of-materials specification) service
//!
//! A kit's required materials are the union of its parsed packing
//! structure and the flat spare/bulk/miscellaneous lists. The packing
//! payload is validated on write but read through the total parser.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Kit, MaterialLine, PackingStructure};
use shared::validation::validate_material_line;

/// Kit service for managing finished-product specifications
#[derive(Clone)]
pub struct KitService {
    db: PgPool,
}

/// Database row for a kit
#[derive(Debug, FromRow)]
pub(crate) struct KitRow {
    pub id: Uuid,
    pub name: String,
    pub program_id: Uuid,
    pub category: Option<String>,
    pub subject: Option<String>,
    pub serial_number: Option<String>,
    pub is_structured: bool,
    pub packing_requirements: Option<String>,
    pub spare_kits: serde_json::Value,
    pub bulk_materials: serde_json::Value,
    pub miscellaneous: serde_json::Value,
    pub stock_count: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<KitRow> for Kit {
    type Error = AppError;

    fn try_from(row: KitRow) -> Result<Self, Self::Error> {
        let parse_list = |value: serde_json::Value, which: &str| -> AppResult<Vec<MaterialLine>> {
            serde_json::from_value(value)
                .map_err(|e| AppError::Internal(format!("invalid {which} list: {e}")))
        };
        Ok(Kit {
            id: row.id,
            name: row.name,
            program_id: row.program_id,
            category: row.category,
            subject: row.subject,
            serial_number: row.serial_number,
            is_structured: row.is_structured,
            packing_requirements: row.packing_requirements,
            spare_kits: parse_list(row.spare_kits, "spare kit")?,
            bulk_materials: parse_list(row.bulk_materials, "bulk material")?,
            miscellaneous: parse_list(row.miscellaneous, "miscellaneous")?,
            stock_count: row.stock_count,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const KIT_COLUMNS: &str = "id, name, program_id, category, subject, serial_number, \
                           is_structured, packing_requirements, spare_kits, bulk_materials, \
                           miscellaneous, stock_count, status, created_at, updated_at";

/// Input for creating a kit
#[derive(Debug, Deserialize)]
pub struct CreateKitInput {
    pub name: String,
    pub program_id: Uuid,
    pub category: Option<String>,
    pub subject: Option<String>,
    pub serial_number: Option<String>,
    pub is_structured: Option<bool>,
    pub packing_requirements: Option<String>,
    pub spare_kits: Option<Vec<MaterialLine>>,
    pub bulk_materials: Option<Vec<MaterialLine>>,
    pub miscellaneous: Option<Vec<MaterialLine>>,
}

/// Input for updating a kit
#[derive(Debug, Deserialize)]
pub struct UpdateKitInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub subject: Option<String>,
    pub serial_number: Option<String>,
    pub is_structured: Option<bool>,
    pub packing_requirements: Option<String>,
    pub spare_kits: Option<Vec<MaterialLine>>,
    pub bulk_materials: Option<Vec<MaterialLine>>,
    pub miscellaneous: Option<Vec<MaterialLine>>,
    pub status: Option<String>,
}

fn validate_flat_lists(lists: [&[MaterialLine]; 3]) -> AppResult<()> {
    for list in lists {
        for line in list {
            validate_material_line(line).map_err(|msg| AppError::Validation {
                field: "materials".to_string(),
                message: format!("{}: {}", line.name, msg),
            })?;
        }
    }
    Ok(())
}

/// Reject a structured payload that would silently parse as empty
fn validate_packing_payload(payload: Option<&str>) -> AppResult<()> {
    if let Some(raw) = payload {
        PackingStructure::try_parse(raw).map_err(|e| AppError::Validation {
            field: "packing_requirements".to_string(),
            message: e.to_string(),
        })?;
    }
    Ok(())
}

impl KitService {
    /// Create a new KitService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a kit
    pub async fn create_kit(&self, input: CreateKitInput) -> AppResult<Kit> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
            });
        }

        let program_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM programs WHERE id = $1)")
                .bind(input.program_id)
                .fetch_one(&self.db)
                .await?;
        if !program_exists {
            return Err(AppError::NotFound("Program".to_string()));
        }

        validate_packing_payload(input.packing_requirements.as_deref())?;

        let spare_kits = input.spare_kits.unwrap_or_default();
        let bulk_materials = input.bulk_materials.unwrap_or_default();
        let miscellaneous = input.miscellaneous.unwrap_or_default();
        validate_flat_lists([&spare_kits, &bulk_materials, &miscellaneous])?;

        let to_json = |list: &[MaterialLine]| {
            serde_json::to_value(list).map_err(|e| AppError::Internal(e.to_string()))
        };

        let row = sqlx::query_as::<_, KitRow>(&format!(
            r#"
            INSERT INTO kits (name, program_id, category, subject, serial_number,
                              is_structured, packing_requirements, spare_kits,
                              bulk_materials, miscellaneous)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {KIT_COLUMNS}
            "#,
        ))
        .bind(&input.name)
        .bind(input.program_id)
        .bind(&input.category)
        .bind(&input.subject)
        .bind(&input.serial_number)
        .bind(input.is_structured.unwrap_or(false))
        .bind(&input.packing_requirements)
        .bind(to_json(&spare_kits)?)
        .bind(to_json(&bulk_materials)?)
        .bind(to_json(&miscellaneous)?)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Get a kit by ID
    pub async fn get_kit(&self, kit_id: Uuid) -> AppResult<Kit> {
        let row = sqlx::query_as::<_, KitRow>(&format!(
            "SELECT {KIT_COLUMNS} FROM kits WHERE id = $1"
        ))
        .bind(kit_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Kit".to_string()))?;

        row.try_into()
    }

    /// List kits, optionally for one program
    pub async fn list_kits(&self, program_id: Option<Uuid>) -> AppResult<Vec<Kit>> {
        let rows = sqlx::query_as::<_, KitRow>(&format!(
            r#"
            SELECT {KIT_COLUMNS}
            FROM kits
            WHERE ($1::uuid IS NULL OR program_id = $1)
            ORDER BY name
            "#,
        ))
        .bind(program_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Update a kit
    pub async fn update_kit(&self, kit_id: Uuid, input: UpdateKitInput) -> AppResult<Kit> {
        let existing = self.get_kit(kit_id).await?;

        validate_packing_payload(input.packing_requirements.as_deref())?;

        let name = input.name.unwrap_or(existing.name);
        let category = input.category.or(existing.category);
        let subject = input.subject.or(existing.subject);
        let serial_number = input.serial_number.or(existing.serial_number);
        let is_structured = input.is_structured.unwrap_or(existing.is_structured);
        let packing_requirements = input
            .packing_requirements
            .or(existing.packing_requirements);
        let spare_kits = input.spare_kits.unwrap_or(existing.spare_kits);
        let bulk_materials = input.bulk_materials.unwrap_or(existing.bulk_materials);
        let miscellaneous = input.miscellaneous.unwrap_or(existing.miscellaneous);
        let status = input.status.unwrap_or(existing.status);
        validate_flat_lists([&spare_kits, &bulk_materials, &miscellaneous])?;

        let to_json = |list: &[MaterialLine]| {
            serde_json::to_value(list).map_err(|e| AppError::Internal(e.to_string()))
        };

        let row = sqlx::query_as::<_, KitRow>(&format!(
            r#"
            UPDATE kits
            SET name = $1, category = $2, subject = $3, serial_number = $4,
                is_structured = $5, packing_requirements = $6, spare_kits = $7,
                bulk_materials = $8, miscellaneous = $9, status = $10, updated_at = NOW()
            WHERE id = $11
            RETURNING {KIT_COLUMNS}
            "#,
        ))
        .bind(&name)
        .bind(&category)
        .bind(&subject)
        .bind(&serial_number)
        .bind(is_structured)
        .bind(&packing_requirements)
        .bind(to_json(&spare_kits)?)
        .bind(to_json(&bulk_materials)?)
        .bind(to_json(&miscellaneous)?)
        .bind(&status)
        .bind(kit_id)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Set the finished-kit stock count on the specification row
    pub async fn update_stock_count(&self, kit_id: Uuid, stock_count: Decimal) -> AppResult<Kit> {
        if stock_count < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "stock_count".to_string(),
                message: "Stock count cannot be negative".to_string(),
            });
        }

        let row = sqlx::query_as::<_, KitRow>(&format!(
            r#"
            UPDATE kits SET stock_count = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {KIT_COLUMNS}
            "#,
        ))
        .bind(stock_count)
        .bind(kit_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Kit".to_string()))?;

        row.try_into()
    }
}

/// Load every kit keyed by ID (shortage aggregation input)
pub(crate) async fn load_all_kits<'e, E>(
    executor: E,
) -> AppResult<std::collections::HashMap<Uuid, Kit>>
where
    E: sqlx::PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, KitRow>(&format!("SELECT {KIT_COLUMNS} FROM kits"))
        .fetch_all(executor)
        .await?;

    rows.into_iter()
        .map(|row| Kit::try_from(row).map(|kit| (kit.id, kit)))
        .collect()
}
