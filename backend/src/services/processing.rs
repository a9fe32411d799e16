//! Processing job service
//!
//! A job consumes its sources when started and produces its targets
//! when completed. Starting validates every source against current
//! stock before any mutation: either the whole consumption happens or
//! none of it does, and the rejection names each deficient material.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::assignments::{decrement_by_name, increment_by_name};
use crate::services::inventory::load_all_items;
use shared::models::{JobLine, JobStatus, ProcessingJob};
use shared::planning::{source_shortfalls, InventoryIndex};
use shared::validation::validate_job_lines;

/// Processing service for material-transformation work orders
#[derive(Clone)]
pub struct ProcessingService {
    db: PgPool,
}

/// Database row for a processing job
#[derive(Debug, FromRow)]
pub(crate) struct JobRow {
    pub id: Uuid,
    pub title: String,
    pub sources: serde_json::Value,
    pub targets: serde_json::Value,
    pub status: String,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for ProcessingJob {
    type Error = AppError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status = JobStatus::from_str(&row.status)
            .ok_or_else(|| AppError::Internal(format!("unknown job status '{}'", row.status)))?;
        let parse_lines = |value: serde_json::Value, which: &str| -> AppResult<Vec<JobLine>> {
            serde_json::from_value(value)
                .map_err(|e| AppError::Internal(format!("invalid {which} lines: {e}")))
        };
        Ok(ProcessingJob {
            id: row.id,
            title: row.title,
            sources: parse_lines(row.sources, "source")?,
            targets: parse_lines(row.targets, "target")?,
            status,
            assigned_to: row.assigned_to,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) const JOB_COLUMNS: &str =
    "id, title, sources, targets, status, assigned_to, notes, created_at, updated_at";

/// Input for creating a processing job
#[derive(Debug, Deserialize)]
pub struct CreateJobInput {
    pub title: String,
    pub sources: Vec<JobLine>,
    pub targets: Vec<JobLine>,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
}

impl ProcessingService {
    /// Create a new ProcessingService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a job in the initial `assigned` status. Nothing is
    /// reserved or consumed at creation.
    pub async fn create_job(&self, input: CreateJobInput) -> AppResult<ProcessingJob> {
        if input.title.trim().is_empty() {
            return Err(AppError::Validation {
                field: "title".to_string(),
                message: "Title is required".to_string(),
            });
        }
        validate_job_lines(&input.sources).map_err(|msg| AppError::Validation {
            field: "sources".to_string(),
            message: msg.to_string(),
        })?;
        validate_job_lines(&input.targets).map_err(|msg| AppError::Validation {
            field: "targets".to_string(),
            message: msg.to_string(),
        })?;

        let sources = serde_json::to_value(&input.sources)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let targets = serde_json::to_value(&input.targets)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            INSERT INTO processing_jobs (title, sources, targets, status, assigned_to, notes)
            VALUES ($1, $2, $3, 'assigned', $4, $5)
            RETURNING {JOB_COLUMNS}
            "#,
        ))
        .bind(&input.title)
        .bind(&sources)
        .bind(&targets)
        .bind(&input.assigned_to)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    /// Get a job by ID
    pub async fn get_job(&self, job_id: Uuid) -> AppResult<ProcessingJob> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {JOB_COLUMNS} FROM processing_jobs WHERE id = $1"
        ))
        .bind(job_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Processing job".to_string()))?;

        row.try_into()
    }

    /// List jobs, optionally by status
    pub async fn list_jobs(&self, status: Option<JobStatus>) -> AppResult<Vec<ProcessingJob>> {
        let status = status.map(|s| s.as_str().to_string());

        let rows = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM processing_jobs
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        ))
        .bind(status)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Start a job: validate every source against available stock, then
    /// consume them all and move to `in_progress`.
    pub async fn start_job(&self, job_id: Uuid) -> AppResult<ProcessingJob> {
        let mut tx = self.db.begin().await?;

        let job = load_job_in_tx(&mut tx, job_id).await?;
        if job.status != JobStatus::Assigned {
            return Err(AppError::InvalidStateTransition(format!(
                "job is {}, only an assigned job can be started",
                job.status.as_str()
            )));
        }

        let snapshot = load_all_items(&mut *tx).await?;
        let index = InventoryIndex::new(&snapshot);
        let shortfalls = source_shortfalls(&job.sources, &index);
        if !shortfalls.is_empty() {
            let detail = shortfalls
                .iter()
                .map(|s| format!("{} (short {} of {})", s.item_name, s.shortfall, s.required))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(AppError::InsufficientInventory(detail));
        }

        for source in &job.sources {
            decrement_by_name(&mut tx, &source.item_name, source.quantity).await?;
        }

        let row = set_job_status(&mut tx, job_id, JobStatus::InProgress).await?;
        tx.commit().await?;
        row.try_into()
    }

    /// Complete a job: produce every target and move to `completed`.
    /// A target with no existing stock row is created as it is the
    /// first time this produced item enters inventory.
    pub async fn complete_job(&self, job_id: Uuid) -> AppResult<ProcessingJob> {
        let mut tx = self.db.begin().await?;

        let job = load_job_in_tx(&mut tx, job_id).await?;
        if job.status != JobStatus::InProgress {
            return Err(AppError::InvalidStateTransition(format!(
                "job is {}, only an in-progress job can be completed",
                job.status.as_str()
            )));
        }

        for target in &job.targets {
            produce_target(&mut tx, target).await?;
        }

        let row = set_job_status(&mut tx, job_id, JobStatus::Completed).await?;
        tx.commit().await?;
        row.try_into()
    }

    /// Cancel a job. An in-progress job restores its consumed sources;
    /// a job that never started has nothing to restore.
    pub async fn cancel_job(&self, job_id: Uuid) -> AppResult<ProcessingJob> {
        let mut tx = self.db.begin().await?;

        let job = load_job_in_tx(&mut tx, job_id).await?;
        match job.status {
            JobStatus::Completed | JobStatus::Cancelled => {
                return Err(AppError::InvalidStateTransition(format!(
                    "job is already {}",
                    job.status.as_str()
                )));
            }
            JobStatus::InProgress => {
                for source in &job.sources {
                    increment_by_name(&mut tx, &source.item_name, source.quantity).await?;
                }
            }
            JobStatus::Assigned => {}
        }

        let row = set_job_status(&mut tx, job_id, JobStatus::Cancelled).await?;
        tx.commit().await?;
        row.try_into()
    }
}

/// Load a job inside an open transaction
pub(crate) async fn load_job_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    job_id: Uuid,
) -> AppResult<ProcessingJob> {
    let row = sqlx::query_as::<_, JobRow>(&format!(
        "SELECT {JOB_COLUMNS} FROM processing_jobs WHERE id = $1 FOR UPDATE"
    ))
    .bind(job_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Processing job".to_string()))?;

    row.try_into()
}

/// Restore the consumed sources of an in-progress job (cancellation and
/// approved deletion share this compensation).
pub(crate) async fn restore_job_sources(
    tx: &mut Transaction<'_, Postgres>,
    job: &ProcessingJob,
) -> AppResult<()> {
    for source in &job.sources {
        increment_by_name(tx, &source.item_name, source.quantity).await?;
    }
    Ok(())
}

async fn set_job_status(
    tx: &mut Transaction<'_, Postgres>,
    job_id: Uuid,
    status: JobStatus,
) -> AppResult<JobRow> {
    let row = sqlx::query_as::<_, JobRow>(&format!(
        r#"
        UPDATE processing_jobs
        SET status = $1, updated_at = NOW()
        WHERE id = $2
        RETURNING {JOB_COLUMNS}
        "#,
    ))
    .bind(status.as_str())
    .bind(job_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row)
}

/// Increment the target item, creating the stock row when the produced
/// item does not exist yet (first production run of a new material).
async fn produce_target(tx: &mut Transaction<'_, Postgres>, target: &JobLine) -> AppResult<()> {
    let updated = sqlx::query(
        r#"
        UPDATE inventory_items
        SET quantity = quantity + $1, updated_at = NOW()
        WHERE id = (SELECT id FROM inventory_items
                    WHERE LOWER(name) = LOWER($2)
                    ORDER BY created_at LIMIT 1)
        "#,
    )
    .bind(target.quantity)
    .bind(&target.item_name)
    .execute(&mut **tx)
    .await?
    .rows_affected();

    if updated == 0 {
        sqlx::query(
            r#"
            INSERT INTO inventory_items (name, kind, quantity, unit, min_stock_level, components)
            VALUES ($1, 'pre_processed', $2, $3, 0, '[]'::jsonb)
            "#,
        )
        .bind(&target.item_name)
        .bind(target.quantity)
        .bind(&target.unit)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}
