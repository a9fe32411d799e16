//! Vendor service
//!
//! Vendors carry a price list keyed by inventory item. The shortage
//! report annotates each procurable material with the first vendor
//! quoting it.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{ItemPrice, Vendor};

/// Vendor service for supplier records and price lists
#[derive(Clone)]
pub struct VendorService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct VendorRow {
    id: Uuid,
    name: String,
    contact: Option<String>,
    item_prices: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<VendorRow> for Vendor {
    type Error = AppError;

    fn try_from(row: VendorRow) -> Result<Self, Self::Error> {
        let item_prices: Vec<ItemPrice> = serde_json::from_value(row.item_prices)
            .map_err(|e| AppError::Internal(format!("invalid vendor price list: {e}")))?;
        Ok(Vendor {
            id: row.id,
            name: row.name,
            contact: row.contact,
            item_prices,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const VENDOR_COLUMNS: &str = "id, name, contact, item_prices, created_at, updated_at";

/// Input for creating a vendor
#[derive(Debug, Deserialize)]
pub struct CreateVendorInput {
    pub name: String,
    pub contact: Option<String>,
    #[serde(default)]
    pub item_prices: Vec<ItemPrice>,
}

/// Input for updating a vendor
#[derive(Debug, Deserialize)]
pub struct UpdateVendorInput {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub item_prices: Option<Vec<ItemPrice>>,
}

impl VendorService {
    /// Create a new VendorService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a vendor
    pub async fn create_vendor(&self, input: CreateVendorInput) -> AppResult<Vendor> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
            });
        }

        let item_prices = serde_json::to_value(&input.item_prices)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let row = sqlx::query_as::<_, VendorRow>(&format!(
            r#"
            INSERT INTO vendors (name, contact, item_prices)
            VALUES ($1, $2, $3)
            RETURNING {VENDOR_COLUMNS}
            "#,
        ))
        .bind(&input.name)
        .bind(&input.contact)
        .bind(&item_prices)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Get a vendor by ID
    pub async fn get_vendor(&self, vendor_id: Uuid) -> AppResult<Vendor> {
        let row = sqlx::query_as::<_, VendorRow>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = $1"
        ))
        .bind(vendor_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vendor".to_string()))?;

        row.try_into()
    }

    /// List all vendors
    pub async fn list_vendors(&self) -> AppResult<Vec<Vendor>> {
        let rows = sqlx::query_as::<_, VendorRow>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors ORDER BY name"
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Update a vendor
    pub async fn update_vendor(&self, vendor_id: Uuid, input: UpdateVendorInput) -> AppResult<Vendor> {
        let existing = self.get_vendor(vendor_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let contact = input.contact.or(existing.contact);
        let item_prices = input.item_prices.unwrap_or(existing.item_prices);
        let item_prices = serde_json::to_value(&item_prices)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let row = sqlx::query_as::<_, VendorRow>(&format!(
            r#"
            UPDATE vendors
            SET name = $1, contact = $2, item_prices = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {VENDOR_COLUMNS}
            "#,
        ))
        .bind(&name)
        .bind(&contact)
        .bind(&item_prices)
        .bind(vendor_id)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Delete a vendor
    pub async fn delete_vendor(&self, vendor_id: Uuid) -> AppResult<()> {
        let deleted = sqlx::query("DELETE FROM vendors WHERE id = $1")
            .bind(vendor_id)
            .execute(&self.db)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(AppError::NotFound("Vendor".to_string()));
        }
        Ok(())
    }
}

/// Load every vendor in list order (oldest first), for shortage snapshots.
/// First vendor in this order carrying an item wins the quote.
pub(crate) async fn load_all_vendors<'e, E>(executor: E) -> AppResult<Vec<Vendor>>
where
    E: sqlx::PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, VendorRow>(&format!(
        "SELECT {VENDOR_COLUMNS} FROM vendors ORDER BY created_at"
    ))
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(TryInto::try_into).collect()
}
