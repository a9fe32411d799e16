//! HTTP handlers for procurement endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::procurement::{CreateRequestInput, MaterialRequest, ProcurementService};
use crate::AppState;
use shared::models::MaterialShortage;

#[derive(Debug, Default, Deserialize)]
pub struct ListRequestsQuery {
    pub status: Option<String>,
}

/// Current shortage report across all active orders
pub async fn list_shortages(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MaterialShortage>>> {
    let service = ProcurementService::new(state.db);
    let shortages = service.list_shortages().await?;
    Ok(Json(shortages))
}

/// Create a material request
pub async fn create_request(
    State(state): State<AppState>,
    Json(input): Json<CreateRequestInput>,
) -> AppResult<Json<MaterialRequest>> {
    let service = ProcurementService::new(state.db);
    let request = service.create_request(input).await?;
    Ok(Json(request))
}

/// Get a material request
pub async fn get_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<MaterialRequest>> {
    let service = ProcurementService::new(state.db);
    let request = service.get_request(request_id).await?;
    Ok(Json(request))
}

/// List material requests
pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<ListRequestsQuery>,
) -> AppResult<Json<Vec<MaterialRequest>>> {
    let service = ProcurementService::new(state.db);
    let requests = service.list_requests(query.status).await?;
    Ok(Json(requests))
}

/// Approve a pending request
pub async fn approve_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<MaterialRequest>> {
    let service = ProcurementService::new(state.db);
    let request = service.approve_request(request_id).await?;
    Ok(Json(request))
}

/// Reject a pending request
pub async fn reject_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<MaterialRequest>> {
    let service = ProcurementService::new(state.db);
    let request = service.reject_request(request_id).await?;
    Ok(Json(request))
}

/// Mark an approved request fulfilled
pub async fn fulfill_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<MaterialRequest>> {
    let service = ProcurementService::new(state.db);
    let request = service.mark_fulfilled(request_id).await?;
    Ok(Json(request))
}
