//! HTTP handlers for processing job endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::processing::{CreateJobInput, ProcessingService};
use crate::AppState;
use shared::models::{JobStatus, ProcessingJob};

#[derive(Debug, Default, Deserialize)]
pub struct ListJobsQuery {
    pub status: Option<JobStatus>,
}

/// Create a processing job
pub async fn create_job(
    State(state): State<AppState>,
    Json(input): Json<CreateJobInput>,
) -> AppResult<Json<ProcessingJob>> {
    let service = ProcessingService::new(state.db);
    let job = service.create_job(input).await?;
    Ok(Json(job))
}

/// Get a processing job
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<ProcessingJob>> {
    let service = ProcessingService::new(state.db);
    let job = service.get_job(job_id).await?;
    Ok(Json(job))
}

/// List processing jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> AppResult<Json<Vec<ProcessingJob>>> {
    let service = ProcessingService::new(state.db);
    let jobs = service.list_jobs(query.status).await?;
    Ok(Json(jobs))
}

/// Start a job, consuming its sources
pub async fn start_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<ProcessingJob>> {
    let service = ProcessingService::new(state.db);
    let job = service.start_job(job_id).await?;
    Ok(Json(job))
}

/// Complete a job, producing its targets
pub async fn complete_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<ProcessingJob>> {
    let service = ProcessingService::new(state.db);
    let job = service.complete_job(job_id).await?;
    Ok(Json(job))
}

/// Cancel a job, restoring sources if it was started
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<ProcessingJob>> {
    let service = ProcessingService::new(state.db);
    let job = service.cancel_job(job_id).await?;
    Ok(Json(job))
}
