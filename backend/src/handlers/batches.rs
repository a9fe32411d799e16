//! HTTP handlers for batch endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::batches::{Batch, BatchService, CreateBatchInput, UpdateBatchInput};
use crate::AppState;
use shared::models::Assignment;

/// Create a batch
pub async fn create_batch(
    State(state): State<AppState>,
    Json(input): Json<CreateBatchInput>,
) -> AppResult<Json<Batch>> {
    let service = BatchService::new(state.db);
    let batch = service.create_batch(input).await?;
    Ok(Json(batch))
}

/// Get a batch
pub async fn get_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<Batch>> {
    let service = BatchService::new(state.db);
    let batch = service.get_batch(batch_id).await?;
    Ok(Json(batch))
}

/// List all batches
pub async fn list_batches(State(state): State<AppState>) -> AppResult<Json<Vec<Batch>>> {
    let service = BatchService::new(state.db);
    let batches = service.list_batches().await?;
    Ok(Json(batches))
}

/// Update a batch
pub async fn update_batch(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<UpdateBatchInput>,
) -> AppResult<Json<Batch>> {
    let service = BatchService::new(state.db);
    let batch = service.update_batch(batch_id, input).await?;
    Ok(Json(batch))
}

/// Assignments grouped under a batch
pub async fn list_batch_assignments(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<Vec<Assignment>>> {
    let service = BatchService::new(state.db);
    let assignments = service.list_batch_assignments(batch_id).await?;
    Ok(Json(assignments))
}
