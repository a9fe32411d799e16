//! HTTP handlers for vendor endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::vendors::{CreateVendorInput, UpdateVendorInput, VendorService};
use crate::AppState;
use shared::models::Vendor;

/// Create a vendor
pub async fn create_vendor(
    State(state): State<AppState>,
    Json(input): Json<CreateVendorInput>,
) -> AppResult<Json<Vendor>> {
    let service = VendorService::new(state.db);
    let vendor = service.create_vendor(input).await?;
    Ok(Json(vendor))
}

/// Get a vendor
pub async fn get_vendor(
    State(state): State<AppState>,
    Path(vendor_id): Path<Uuid>,
) -> AppResult<Json<Vendor>> {
    let service = VendorService::new(state.db);
    let vendor = service.get_vendor(vendor_id).await?;
    Ok(Json(vendor))
}

/// List all vendors
pub async fn list_vendors(State(state): State<AppState>) -> AppResult<Json<Vec<Vendor>>> {
    let service = VendorService::new(state.db);
    let vendors = service.list_vendors().await?;
    Ok(Json(vendors))
}

/// Update a vendor
pub async fn update_vendor(
    State(state): State<AppState>,
    Path(vendor_id): Path<Uuid>,
    Json(input): Json<UpdateVendorInput>,
) -> AppResult<Json<Vendor>> {
    let service = VendorService::new(state.db);
    let vendor = service.update_vendor(vendor_id, input).await?;
    Ok(Json(vendor))
}

/// Delete a vendor
pub async fn delete_vendor(
    State(state): State<AppState>,
    Path(vendor_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = VendorService::new(state.db);
    service.delete_vendor(vendor_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
