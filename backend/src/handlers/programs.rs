//! HTTP handlers for program endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::programs::{CreateProgramInput, ProgramService, UpdateProgramInput};
use crate::AppState;
use shared::models::Program;

/// Create a program
pub async fn create_program(
    State(state): State<AppState>,
    Json(input): Json<CreateProgramInput>,
) -> AppResult<Json<Program>> {
    let service = ProgramService::new(state.db);
    let program = service.create_program(input).await?;
    Ok(Json(program))
}

/// Get a program
pub async fn get_program(
    State(state): State<AppState>,
    Path(program_id): Path<Uuid>,
) -> AppResult<Json<Program>> {
    let service = ProgramService::new(state.db);
    let program = service.get_program(program_id).await?;
    Ok(Json(program))
}

/// List all programs
pub async fn list_programs(State(state): State<AppState>) -> AppResult<Json<Vec<Program>>> {
    let service = ProgramService::new(state.db);
    let programs = service.list_programs().await?;
    Ok(Json(programs))
}

/// Update a program
pub async fn update_program(
    State(state): State<AppState>,
    Path(program_id): Path<Uuid>,
    Json(input): Json<UpdateProgramInput>,
) -> AppResult<Json<Program>> {
    let service = ProgramService::new(state.db);
    let program = service.update_program(program_id, input).await?;
    Ok(Json(program))
}
