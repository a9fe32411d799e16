//! Inventory management service
//!
//! Stock rows are joined to kit materials and vendor prices by
//! case-insensitive name. Every decrement clamps at zero, in SQL, so a
//! quantity is never persisted negative regardless of input.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{ComponentRequirement, InventoryItem, ItemKind};
use shared::validation::{validate_material_name, validate_min_stock_level};

/// Inventory service for managing stock-keeping units
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Database row for an inventory item
#[derive(Debug, FromRow)]
pub(crate) struct InventoryRow {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub quantity: Decimal,
    pub unit: String,
    pub min_stock_level: Decimal,
    pub subcategory: Option<String>,
    pub components: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<InventoryRow> for InventoryItem {
    type Error = AppError;

    fn try_from(row: InventoryRow) -> Result<Self, Self::Error> {
        let kind = ItemKind::from_str(&row.kind)
            .ok_or_else(|| AppError::Internal(format!("unknown item kind '{}'", row.kind)))?;
        let components: Vec<ComponentRequirement> = serde_json::from_value(row.components)
            .map_err(|e| AppError::Internal(format!("invalid component list: {e}")))?;
        Ok(InventoryItem {
            id: row.id,
            name: row.name,
            kind,
            quantity: row.quantity,
            unit: row.unit,
            min_stock_level: row.min_stock_level,
            subcategory: row.subcategory,
            components,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ITEM_COLUMNS: &str = "id, name, kind, quantity, unit, min_stock_level, subcategory, \
                            components, created_at, updated_at";

/// Input for creating an inventory item
#[derive(Debug, Deserialize)]
pub struct CreateItemInput {
    pub name: String,
    pub kind: ItemKind,
    pub quantity: Option<Decimal>,
    pub unit: String,
    pub min_stock_level: Option<Decimal>,
    pub subcategory: Option<String>,
    pub components: Option<Vec<ComponentRequirement>>,
}

/// Input for updating an inventory item
#[derive(Debug, Deserialize)]
pub struct UpdateItemInput {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub min_stock_level: Option<Decimal>,
    pub subcategory: Option<String>,
    pub components: Option<Vec<ComponentRequirement>>,
}

/// Input for a manual stock adjustment (+/-)
#[derive(Debug, Deserialize)]
pub struct AdjustStockInput {
    pub delta: Decimal,
    pub reason: Option<String>,
}

/// Query filters for listing items
#[derive(Debug, Default, Deserialize)]
pub struct ListItemsQuery {
    pub kind: Option<ItemKind>,
    pub search: Option<String>,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an inventory item
    pub async fn create_item(&self, input: CreateItemInput) -> AppResult<InventoryItem> {
        validate_material_name(&input.name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;

        let quantity = input.quantity.unwrap_or(Decimal::ZERO);
        if quantity < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity cannot be negative".to_string(),
            });
        }

        let min_stock_level = input.min_stock_level.unwrap_or(Decimal::ZERO);
        validate_min_stock_level(min_stock_level).map_err(|msg| AppError::Validation {
            field: "min_stock_level".to_string(),
            message: msg.to_string(),
        })?;

        let components = serde_json::to_value(input.components.unwrap_or_default())
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let row = sqlx::query_as::<_, InventoryRow>(&format!(
            r#"
            INSERT INTO inventory_items (name, kind, quantity, unit, min_stock_level, subcategory, components)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ITEM_COLUMNS}
            "#,
        ))
        .bind(&input.name)
        .bind(input.kind.as_str())
        .bind(quantity)
        .bind(&input.unit)
        .bind(min_stock_level)
        .bind(&input.subcategory)
        .bind(&components)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Get an inventory item by ID
    pub async fn get_item(&self, item_id: Uuid) -> AppResult<InventoryItem> {
        let row = sqlx::query_as::<_, InventoryRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = $1"
        ))
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        row.try_into()
    }

    /// List inventory items, optionally filtered by kind or name search
    pub async fn list_items(&self, query: ListItemsQuery) -> AppResult<Vec<InventoryItem>> {
        let kind = query.kind.map(|k| k.as_str().to_string());
        let search = query.search.map(|s| format!("%{}%", s.trim()));

        let rows = sqlx::query_as::<_, InventoryRow>(&format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM inventory_items
            WHERE ($1::text IS NULL OR kind = $1)
              AND ($2::text IS NULL OR name ILIKE $2)
            ORDER BY created_at
            "#,
        ))
        .bind(kind)
        .bind(search)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Update item attributes (not quantity; see `adjust_stock`)
    pub async fn update_item(&self, item_id: Uuid, input: UpdateItemInput) -> AppResult<InventoryItem> {
        let existing = self.get_item(item_id).await?;

        let name = input.name.unwrap_or(existing.name);
        validate_material_name(&name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;
        let unit = input.unit.unwrap_or(existing.unit);
        let min_stock_level = input.min_stock_level.unwrap_or(existing.min_stock_level);
        validate_min_stock_level(min_stock_level).map_err(|msg| AppError::Validation {
            field: "min_stock_level".to_string(),
            message: msg.to_string(),
        })?;
        let subcategory = input.subcategory.or(existing.subcategory);
        let components = serde_json::to_value(input.components.unwrap_or(existing.components))
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let row = sqlx::query_as::<_, InventoryRow>(&format!(
            r#"
            UPDATE inventory_items
            SET name = $1, unit = $2, min_stock_level = $3, subcategory = $4,
                components = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING {ITEM_COLUMNS}
            "#,
        ))
        .bind(&name)
        .bind(&unit)
        .bind(min_stock_level)
        .bind(&subcategory)
        .bind(&components)
        .bind(item_id)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Apply a manual stock adjustment, flooring the result at zero
    pub async fn adjust_stock(&self, item_id: Uuid, input: AdjustStockInput) -> AppResult<InventoryItem> {
        if input.delta == Decimal::ZERO {
            return Err(AppError::Validation {
                field: "delta".to_string(),
                message: "Adjustment delta cannot be zero".to_string(),
            });
        }

        let row = sqlx::query_as::<_, InventoryRow>(&format!(
            r#"
            UPDATE inventory_items
            SET quantity = GREATEST(quantity + $1, 0), updated_at = NOW()
            WHERE id = $2
            RETURNING {ITEM_COLUMNS}
            "#,
        ))
        .bind(input.delta)
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        if let Some(reason) = &input.reason {
            tracing::info!(item_id = %item_id, delta = %input.delta, reason, "stock adjusted");
        }

        row.try_into()
    }

    /// Administrative delete, bypassing the deletion-request workflow
    pub async fn force_delete_item(&self, item_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(item_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Inventory item".to_string()));
        }

        Ok(())
    }
}

/// Load the full inventory snapshot, in creation order so that
/// first-match-by-name behavior is deterministic.
pub(crate) async fn load_all_items<'e, E>(executor: E) -> AppResult<Vec<InventoryItem>>
where
    E: sqlx::PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, InventoryRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM inventory_items ORDER BY created_at"
    ))
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(TryInto::try_into).collect()
}
