//! HTTP handlers for kit endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::kits::{CreateKitInput, KitService, UpdateKitInput};
use crate::AppState;
use shared::models::Kit;
use shared::planning::RequiredMaterial;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListKitsQuery {
    pub program_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStockCountInput {
    pub stock_count: Decimal,
}

/// Create a kit
pub async fn create_kit(
    State(state): State<AppState>,
    Json(input): Json<CreateKitInput>,
) -> AppResult<Json<Kit>> {
    let service = KitService::new(state.db);
    let kit = service.create_kit(input).await?;
    Ok(Json(kit))
}

/// Get a kit
pub async fn get_kit(
    State(state): State<AppState>,
    Path(kit_id): Path<Uuid>,
) -> AppResult<Json<Kit>> {
    let service = KitService::new(state.db);
    let kit = service.get_kit(kit_id).await?;
    Ok(Json(kit))
}

/// List kits, optionally by program
pub async fn list_kits(
    State(state): State<AppState>,
    Query(query): Query<ListKitsQuery>,
) -> AppResult<Json<Vec<Kit>>> {
    let service = KitService::new(state.db);
    let kits = service.list_kits(query.program_id).await?;
    Ok(Json(kits))
}

/// Update a kit
pub async fn update_kit(
    State(state): State<AppState>,
    Path(kit_id): Path<Uuid>,
    Json(input): Json<UpdateKitInput>,
) -> AppResult<Json<Kit>> {
    let service = KitService::new(state.db);
    let kit = service.update_kit(kit_id, input).await?;
    Ok(Json(kit))
}

/// Set the finished stock count for a kit
pub async fn update_stock_count(
    State(state): State<AppState>,
    Path(kit_id): Path<Uuid>,
    Json(input): Json<UpdateStockCountInput>,
) -> AppResult<Json<Kit>> {
    let service = KitService::new(state.db);
    let kit = service.update_stock_count(kit_id, input.stock_count).await?;
    Ok(Json(kit))
}

/// Per-unit material requirements for a kit, with categories
pub async fn get_kit_materials(
    State(state): State<AppState>,
    Path(kit_id): Path<Uuid>,
) -> AppResult<Json<Vec<RequiredMaterial>>> {
    let service = KitService::new(state.db);
    let kit = service.get_kit(kit_id).await?;
    let materials =
        shared::planning::requirements_for_kit_instance(&kit, Decimal::ONE);
    Ok(Json(materials))
}
