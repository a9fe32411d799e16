//! HTTP handlers for assignment endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::assignments::{
    AssignmentService, CreateAssignmentInput, ListAssignmentsQuery, UpdateDispatchInput,
    UpdateStatusInput,
};
use crate::AppState;
use shared::models::Assignment;

/// Response for a status change. `assignment` is absent when the change
/// delivered the order and moved it to history.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeResponse {
    pub archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<Assignment>,
}

/// Create an assignment
pub async fn create_assignment(
    State(state): State<AppState>,
    Json(input): Json<CreateAssignmentInput>,
) -> AppResult<Json<Assignment>> {
    let service = AssignmentService::new(state.db);
    let assignment = service.create_assignment(input).await?;
    Ok(Json(assignment))
}

/// Get an assignment
pub async fn get_assignment(
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
) -> AppResult<Json<Assignment>> {
    let service = AssignmentService::new(state.db);
    let assignment = service.get_assignment(assignment_id).await?;
    Ok(Json(assignment))
}

/// List assignments with optional filters
pub async fn list_assignments(
    State(state): State<AppState>,
    Query(query): Query<ListAssignmentsQuery>,
) -> AppResult<Json<Vec<Assignment>>> {
    let service = AssignmentService::new(state.db);
    let assignments = service.list_assignments(query).await?;
    Ok(Json(assignments))
}

/// Change an assignment's status
pub async fn update_status(
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
    Json(input): Json<UpdateStatusInput>,
) -> AppResult<Json<StatusChangeResponse>> {
    let service = AssignmentService::new(state.db);
    let assignment = service.update_status(assignment_id, input).await?;
    Ok(Json(StatusChangeResponse {
        archived: assignment.is_none(),
        assignment,
    }))
}

/// Set courier and tracking metadata
pub async fn update_dispatch_info(
    State(state): State<AppState>,
    Path(assignment_id): Path<Uuid>,
    Json(input): Json<UpdateDispatchInput>,
) -> AppResult<Json<Assignment>> {
    let service = AssignmentService::new(state.db);
    let assignment = service.update_dispatch_info(assignment_id, input).await?;
    Ok(Json(assignment))
}
