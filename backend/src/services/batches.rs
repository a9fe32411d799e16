//! Production batch service
//!
//! A batch groups assignments produced in the same run. Batches carry
//! no stock of their own; deleting one cascades to its assignments
//! through the deletion request workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::assignments::{AssignmentRow, ASSIGNMENT_COLUMNS};
use shared::models::Assignment;

/// Batch service for production run grouping
#[derive(Clone)]
pub struct BatchService {
    db: PgPool,
}

/// A production run grouping of assignments
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: Uuid,
    pub name: String,
    pub production_month: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const BATCH_COLUMNS: &str = "id, name, production_month, notes, created_at, updated_at";

/// Input for creating a batch
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchInput {
    pub name: String,
    pub production_month: Option<String>,
    pub notes: Option<String>,
}

/// Input for updating a batch
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBatchInput {
    pub name: Option<String>,
    pub production_month: Option<String>,
    pub notes: Option<String>,
}

impl BatchService {
    /// Create a new BatchService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a batch
    pub async fn create_batch(&self, input: CreateBatchInput) -> AppResult<Batch> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
            });
        }

        let row = sqlx::query_as::<_, Batch>(&format!(
            r#"
            INSERT INTO batches (name, production_month, notes)
            VALUES ($1, $2, $3)
            RETURNING {BATCH_COLUMNS}
            "#,
        ))
        .bind(&input.name)
        .bind(&input.production_month)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(row)
    }

    /// Get a batch by ID
    pub async fn get_batch(&self, batch_id: Uuid) -> AppResult<Batch> {
        let row = sqlx::query_as::<_, Batch>(&format!(
            "SELECT {BATCH_COLUMNS} FROM batches WHERE id = $1"
        ))
        .bind(batch_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch".to_string()))?;

        Ok(row)
    }

    /// List all batches, newest first
    pub async fn list_batches(&self) -> AppResult<Vec<Batch>> {
        let rows = sqlx::query_as::<_, Batch>(&format!(
            "SELECT {BATCH_COLUMNS} FROM batches ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Update a batch
    pub async fn update_batch(&self, batch_id: Uuid, input: UpdateBatchInput) -> AppResult<Batch> {
        let existing = self.get_batch(batch_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let production_month = input.production_month.or(existing.production_month);
        let notes = input.notes.or(existing.notes);

        let row = sqlx::query_as::<_, Batch>(&format!(
            r#"
            UPDATE batches
            SET name = $1, production_month = $2, notes = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING {BATCH_COLUMNS}
            "#,
        ))
        .bind(&name)
        .bind(&production_month)
        .bind(&notes)
        .bind(batch_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row)
    }

    /// Assignments grouped under a batch
    pub async fn list_batch_assignments(&self, batch_id: Uuid) -> AppResult<Vec<Assignment>> {
        self.get_batch(batch_id).await?;

        let rows = sqlx::query_as::<_, AssignmentRow>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE batch_id = $1 ORDER BY created_at"
        ))
        .bind(batch_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
