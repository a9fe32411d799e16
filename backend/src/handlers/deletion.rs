//! HTTP handlers for deletion request endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::deletion::{CreateDeletionInput, DeletionRequest, DeletionService};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListDeletionsQuery {
    pub status: Option<String>,
}

/// File a deletion request
pub async fn create_deletion_request(
    State(state): State<AppState>,
    Json(input): Json<CreateDeletionInput>,
) -> AppResult<Json<DeletionRequest>> {
    let service = DeletionService::new(state.db);
    let request = service.create_request(input).await?;
    Ok(Json(request))
}

/// List deletion requests
pub async fn list_deletion_requests(
    State(state): State<AppState>,
    Query(query): Query<ListDeletionsQuery>,
) -> AppResult<Json<Vec<DeletionRequest>>> {
    let service = DeletionService::new(state.db);
    let requests = service.list_requests(query.status).await?;
    Ok(Json(requests))
}

/// Approve a deletion request, running compensation and deleting
pub async fn approve_deletion_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<DeletionRequest>> {
    let service = DeletionService::new(state.db);
    let request = service.approve_request(request_id).await?;
    Ok(Json(request))
}

/// Reject a deletion request
pub async fn reject_deletion_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<DeletionRequest>> {
    let service = DeletionService::new(state.db);
    let request = service.reject_request(request_id).await?;
    Ok(Json(request))
}
