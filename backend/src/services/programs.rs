//! Program (product line) service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::Program;

/// Program service for managing product lines
#[derive(Clone)]
pub struct ProgramService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct ProgramRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProgramRow> for Program {
    fn from(row: ProgramRow) -> Self {
        Program {
            id: row.id,
            name: row.name,
            description: row.description,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a program
#[derive(Debug, Deserialize)]
pub struct CreateProgramInput {
    pub name: String,
    pub description: Option<String>,
}

/// Input for updating a program
#[derive(Debug, Deserialize)]
pub struct UpdateProgramInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl ProgramService {
    /// Create a new ProgramService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a program
    pub async fn create_program(&self, input: CreateProgramInput) -> AppResult<Program> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
            });
        }

        let row = sqlx::query_as::<_, ProgramRow>(
            r#"
            INSERT INTO programs (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, status, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Get a program by ID
    pub async fn get_program(&self, program_id: Uuid) -> AppResult<Program> {
        let row = sqlx::query_as::<_, ProgramRow>(
            "SELECT id, name, description, status, created_at, updated_at FROM programs WHERE id = $1",
        )
        .bind(program_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Program".to_string()))?;

        Ok(row.into())
    }

    /// List all programs
    pub async fn list_programs(&self) -> AppResult<Vec<Program>> {
        let rows = sqlx::query_as::<_, ProgramRow>(
            "SELECT id, name, description, status, created_at, updated_at FROM programs ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Update a program
    pub async fn update_program(
        &self,
        program_id: Uuid,
        input: UpdateProgramInput,
    ) -> AppResult<Program> {
        let existing = self.get_program(program_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let description = input.description.or(existing.description);
        let status = input.status.unwrap_or(existing.status);

        let row = sqlx::query_as::<_, ProgramRow>(
            r#"
            UPDATE programs
            SET name = $1, description = $2, status = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING id, name, description, status, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&description)
        .bind(&status)
        .bind(program_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }
}

/// Load every program keyed by id, for shortage snapshots
pub(crate) async fn load_all_programs<'e, E>(executor: E) -> AppResult<HashMap<Uuid, Program>>
where
    E: sqlx::PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, ProgramRow>(
        "SELECT id, name, description, status, created_at, updated_at FROM programs",
    )
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.id, Program::from(row)))
        .collect())
}
