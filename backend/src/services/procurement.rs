//! Procurement service
//!
//! Owns the shortage report and the material request workflow. The
//! report is computed from a point-in-time snapshot of orders, kits,
//! stock, vendors, open requests and in-flight jobs; the request
//! workflow tracks purchases raised against it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::assignments::{AssignmentRow, ASSIGNMENT_COLUMNS};
use crate::services::inventory::load_all_items;
use crate::services::kits::load_all_kits;
use crate::services::processing::JobRow;
use crate::services::programs::load_all_programs;
use crate::services::vendors::load_all_vendors;
use shared::models::{Assignment, MaterialShortage, ProcessingJob};
use shared::planning::{aggregate_shortages, ShortageInputs};
use shared::types::MaterialKey;
use shared::validation::{validate_material_name, validate_positive_quantity};

const STATUS_PENDING: &str = "pending";
const STATUS_APPROVED: &str = "approved";
const STATUS_REJECTED: &str = "rejected";
const STATUS_FULFILLED: &str = "fulfilled";

/// Procurement service for shortage reporting and material requests
#[derive(Clone)]
pub struct ProcurementService {
    db: PgPool,
}

/// A purchase request for a material, raised from the shortage report
/// or by hand. Approved requests reduce reported shortages until they
/// are marked fulfilled (stock intake closes the loop).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequest {
    pub id: Uuid,
    pub material_name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub status: String,
    pub requested_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const REQUEST_COLUMNS: &str =
    "id, material_name, quantity, unit, status, requested_by, notes, created_at, updated_at";

/// Input for creating a material request
#[derive(Debug, Deserialize)]
pub struct CreateRequestInput {
    pub material_name: String,
    pub quantity: Decimal,
    pub unit: String,
    pub requested_by: Option<String>,
    pub notes: Option<String>,
}

impl ProcurementService {
    /// Create a new ProcurementService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Compute the current shortage report.
    ///
    /// Each load is a plain read; the report is advisory and a
    /// recompute is cheap, so no snapshot transaction is taken.
    pub async fn list_shortages(&self) -> AppResult<Vec<MaterialShortage>> {
        let assignments = self.load_assignments().await?;
        let kits = load_all_kits(&self.db).await?;
        let programs = load_all_programs(&self.db).await?;
        let inventory = load_all_items(&self.db).await?;
        let vendors = load_all_vendors(&self.db).await?;
        let approved_requests = self.load_approved_request_totals().await?;
        let active_jobs = self.load_active_jobs().await?;

        let inputs = ShortageInputs {
            assignments: &assignments,
            kits: &kits,
            programs: &programs,
            inventory: &inventory,
            vendors: &vendors,
            approved_requests: &approved_requests,
            active_jobs: &active_jobs,
        };

        let shortages = aggregate_shortages(&inputs);
        tracing::debug!(
            orders = assignments.len(),
            rows = shortages.len(),
            "computed shortage report"
        );
        Ok(shortages)
    }

    /// Create a material request in the `pending` status
    pub async fn create_request(&self, input: CreateRequestInput) -> AppResult<MaterialRequest> {
        validate_material_name(&input.material_name).map_err(|msg| AppError::Validation {
            field: "materialName".to_string(),
            message: msg.to_string(),
        })?;
        validate_positive_quantity(input.quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;

        let row = sqlx::query_as::<_, MaterialRequest>(&format!(
            r#"
            INSERT INTO material_requests (material_name, quantity, unit, status, requested_by, notes)
            VALUES ($1, $2, $3, 'pending', $4, $5)
            RETURNING {REQUEST_COLUMNS}
            "#,
        ))
        .bind(&input.material_name)
        .bind(input.quantity)
        .bind(&input.unit)
        .bind(&input.requested_by)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(row)
    }

    /// Get a request by ID
    pub async fn get_request(&self, request_id: Uuid) -> AppResult<MaterialRequest> {
        let row = sqlx::query_as::<_, MaterialRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM material_requests WHERE id = $1"
        ))
        .bind(request_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Material request".to_string()))?;

        Ok(row)
    }

    /// List requests, optionally by status
    pub async fn list_requests(&self, status: Option<String>) -> AppResult<Vec<MaterialRequest>> {
        let rows = sqlx::query_as::<_, MaterialRequest>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM material_requests
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        ))
        .bind(status)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Approve a pending request. From this point its quantity offsets
    /// the reported shortage for that material.
    pub async fn approve_request(&self, request_id: Uuid) -> AppResult<MaterialRequest> {
        self.transition_request(request_id, STATUS_PENDING, STATUS_APPROVED)
            .await
    }

    /// Reject a pending request
    pub async fn reject_request(&self, request_id: Uuid) -> AppResult<MaterialRequest> {
        self.transition_request(request_id, STATUS_PENDING, STATUS_REJECTED)
            .await
    }

    /// Mark an approved request fulfilled and book the received
    /// quantity into stock in the same transaction. The offset against
    /// the shortage report ends here; from now on the material counts
    /// as on hand.
    pub async fn mark_fulfilled(&self, request_id: Uuid) -> AppResult<MaterialRequest> {
        let mut tx = self.db.begin().await?;

        let existing = sqlx::query_as::<_, MaterialRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM material_requests WHERE id = $1 FOR UPDATE"
        ))
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Material request".to_string()))?;

        if existing.status != STATUS_APPROVED {
            return Err(AppError::InvalidStateTransition(format!(
                "request is {}, expected {} to mark fulfilled",
                existing.status, STATUS_APPROVED
            )));
        }

        let row = sqlx::query_as::<_, MaterialRequest>(&format!(
            r#"
            UPDATE material_requests
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {REQUEST_COLUMNS}
            "#,
        ))
        .bind(STATUS_FULFILLED)
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        receive_material(&mut tx, &row.material_name, row.quantity, &row.unit).await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn transition_request(
        &self,
        request_id: Uuid,
        expected: &str,
        next: &str,
    ) -> AppResult<MaterialRequest> {
        let existing = self.get_request(request_id).await?;
        if existing.status != expected {
            return Err(AppError::InvalidStateTransition(format!(
                "request is {}, expected {} to move to {}",
                existing.status, expected, next
            )));
        }

        let row = sqlx::query_as::<_, MaterialRequest>(&format!(
            r#"
            UPDATE material_requests
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = $3
            RETURNING {REQUEST_COLUMNS}
            "#,
        ))
        .bind(next)
        .bind(request_id)
        .bind(expected)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| {
            AppError::Conflict("request status changed while processing".to_string())
        })?;

        Ok(row)
    }

    async fn load_assignments(&self) -> AppResult<Vec<Assignment>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments ORDER BY created_at"
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Per-material totals of approved, unfulfilled requests
    async fn load_approved_request_totals(&self) -> AppResult<HashMap<MaterialKey, Decimal>> {
        let rows: Vec<(String, Decimal)> = sqlx::query_as(
            "SELECT material_name, quantity FROM material_requests WHERE status = 'approved'",
        )
        .fetch_all(&self.db)
        .await?;

        let mut totals: HashMap<MaterialKey, Decimal> = HashMap::new();
        for (name, quantity) in rows {
            *totals.entry(MaterialKey::new(&name)).or_insert(Decimal::ZERO) += quantity;
        }
        Ok(totals)
    }

    async fn load_active_jobs(&self) -> AppResult<Vec<ProcessingJob>> {
        let rows = sqlx::query_as::<_, JobRow>(
            "SELECT id, title, sources, targets, status, assigned_to, notes, created_at, updated_at \
             FROM processing_jobs WHERE status IN ('assigned', 'in_progress')",
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

/// Book received material into stock. The first name-matched row is
/// incremented; a material with no row yet gets a fresh raw one.
async fn receive_material(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    quantity: Decimal,
    unit: &str,
) -> AppResult<()> {
    let updated = sqlx::query(
        r#"
        UPDATE inventory_items
        SET quantity = quantity + $1, updated_at = NOW()
        WHERE id = (SELECT id FROM inventory_items
                    WHERE LOWER(name) = LOWER($2)
                    ORDER BY created_at LIMIT 1)
        "#,
    )
    .bind(quantity)
    .bind(name)
    .execute(&mut **tx)
    .await?
    .rows_affected();

    if updated == 0 {
        sqlx::query(
            r#"
            INSERT INTO inventory_items (name, kind, quantity, unit, min_stock_level, components)
            VALUES ($1, 'raw', $2, $3, 0, '[]'::jsonb)
            "#,
        )
        .bind(name)
        .bind(quantity)
        .bind(unit)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
