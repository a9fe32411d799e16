//! Deletion request service
//!
//! Destructive removals go through a request/approve workflow. Approval
//! runs the compensation the entity needs before the row disappears:
//! an assignment past the dispatch-transfer point gives its stock
//! movement back, an in-progress job restores its consumed sources.
//! Batch deletion cascades to its assignments without compensation;
//! that loss is deliberate and logged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::assignments::{
    apply_stock_effect, load_kit_in_tx, AssignmentRow, ASSIGNMENT_COLUMNS,
};
use crate::services::processing::{load_job_in_tx, restore_job_sources};
use shared::models::{Assignment, AssignmentStatus, JobStatus, StockEffect};

const ENTITY_TYPES: [&str; 5] = ["assignment", "processing_job", "batch", "inventory_item", "kit"];

/// Deletion request service with compensation on approval
#[derive(Clone)]
pub struct DeletionService {
    db: PgPool,
}

/// A pending or resolved request to delete an entity
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DeletionRequest {
    pub id: Uuid,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub reason: Option<String>,
    pub requested_by: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const DELETION_COLUMNS: &str =
    "id, entity_type, entity_id, reason, requested_by, status, created_at, updated_at";

/// Input for filing a deletion request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeletionInput {
    pub entity_type: String,
    pub entity_id: Uuid,
    pub reason: Option<String>,
    pub requested_by: Option<String>,
}

impl DeletionService {
    /// Create a new DeletionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// File a deletion request. The entity type must be one this
    /// service knows how to compensate for.
    pub async fn create_request(&self, input: CreateDeletionInput) -> AppResult<DeletionRequest> {
        if !ENTITY_TYPES.contains(&input.entity_type.as_str()) {
            return Err(AppError::ValidationError(format!(
                "unknown entity type '{}'",
                input.entity_type
            )));
        }

        let row = sqlx::query_as::<_, DeletionRequest>(&format!(
            r#"
            INSERT INTO deletion_requests (entity_type, entity_id, reason, requested_by, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING {DELETION_COLUMNS}
            "#,
        ))
        .bind(&input.entity_type)
        .bind(input.entity_id)
        .bind(&input.reason)
        .bind(&input.requested_by)
        .fetch_one(&self.db)
        .await?;

        Ok(row)
    }

    /// List requests, optionally by status
    pub async fn list_requests(&self, status: Option<String>) -> AppResult<Vec<DeletionRequest>> {
        let rows = sqlx::query_as::<_, DeletionRequest>(&format!(
            r#"
            SELECT {DELETION_COLUMNS}
            FROM deletion_requests
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        ))
        .bind(status)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Reject a pending request; nothing is deleted
    pub async fn reject_request(&self, request_id: Uuid) -> AppResult<DeletionRequest> {
        let row = sqlx::query_as::<_, DeletionRequest>(&format!(
            r#"
            UPDATE deletion_requests
            SET status = 'rejected', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {DELETION_COLUMNS}
            "#,
        ))
        .bind(request_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Pending deletion request".to_string()))?;

        Ok(row)
    }

    /// Approve a pending request: run compensation and delete the
    /// entity, all in one transaction.
    pub async fn approve_request(&self, request_id: Uuid) -> AppResult<DeletionRequest> {
        let mut tx = self.db.begin().await?;

        let request = sqlx::query_as::<_, DeletionRequest>(&format!(
            "SELECT {DELETION_COLUMNS} FROM deletion_requests WHERE id = $1 FOR UPDATE"
        ))
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Deletion request".to_string()))?;

        if request.status != "pending" {
            return Err(AppError::InvalidStateTransition(format!(
                "deletion request is already {}",
                request.status
            )));
        }

        match request.entity_type.as_str() {
            "assignment" => delete_assignment(&mut tx, request.entity_id).await?,
            "processing_job" => delete_job(&mut tx, request.entity_id).await?,
            "batch" => delete_batch(&mut tx, request.entity_id).await?,
            "inventory_item" => delete_plain(&mut tx, "inventory_items", request.entity_id).await?,
            "kit" => delete_kit(&mut tx, request.entity_id).await?,
            other => {
                return Err(AppError::ValidationError(format!(
                    "unknown entity type '{other}'"
                )));
            }
        }

        let resolved = sqlx::query_as::<_, DeletionRequest>(&format!(
            r#"
            UPDATE deletion_requests
            SET status = 'approved', updated_at = NOW()
            WHERE id = $1
            RETURNING {DELETION_COLUMNS}
            "#,
        ))
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(resolved)
    }
}

/// Delete an assignment, reversing its dispatch stock movement when one
/// was applied and never given back.
async fn delete_assignment(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<()> {
    let row = sqlx::query_as::<_, AssignmentRow>(&format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Assignment".to_string()))?;

    let assignment: Assignment = row.try_into()?;
    let stock_applied = matches!(
        assignment.status,
        AssignmentStatus::TransferredToDispatch
            | AssignmentStatus::ReadyForDispatch
            | AssignmentStatus::Dispatched
    );
    if stock_applied {
        let kit = load_kit_in_tx(tx, assignment.kit_id).await?;
        apply_stock_effect(tx, &kit, assignment.quantity, StockEffect::Reverse).await?;
    }

    sqlx::query("DELETE FROM assignments WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Delete a job, restoring consumed sources when it was in progress
async fn delete_job(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<()> {
    let job = load_job_in_tx(tx, id).await?;
    if job.status == JobStatus::InProgress {
        restore_job_sources(tx, &job).await?;
    }

    sqlx::query("DELETE FROM processing_jobs WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Delete a batch and every assignment under it. The cascade does NOT
/// compensate per assignment; an approved batch deletion accepts the
/// stock discrepancy and we log it loudly instead.
async fn delete_batch(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<()> {
    let removed = sqlx::query("DELETE FROM assignments WHERE batch_id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    if removed > 0 {
        tracing::warn!(
            batch_id = %id,
            assignments = removed,
            "batch deletion cascaded without stock compensation"
        );
    }

    delete_plain(tx, "batches", id).await
}

/// Delete a kit. Kits referenced by live assignments stay; file
/// deletion requests for those assignments first.
async fn delete_kit(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<()> {
    let referenced: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM assignments WHERE kit_id = $1")
            .bind(id)
            .fetch_one(&mut **tx)
            .await?;
    if referenced > 0 {
        return Err(AppError::Conflict(format!(
            "kit is referenced by {referenced} assignment(s)"
        )));
    }

    delete_plain(tx, "kits", id).await
}

async fn delete_plain(tx: &mut Transaction<'_, Postgres>, table: &str, id: Uuid) -> AppResult<()> {
    let deleted = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
        .bind(id)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("Entity".to_string()));
    }
    Ok(())
}
