//! Route definitions for the Kitforge operations backend

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/programs", program_routes())
        .nest("/kits", kit_routes())
        .nest("/inventory", inventory_routes())
        .nest("/clients", client_routes())
        .nest("/assignments", assignment_routes())
        .nest("/batches", batch_routes())
        .nest("/processing", processing_routes())
        .nest("/procurement", procurement_routes())
        .nest("/deletion-requests", deletion_routes())
        .nest("/vendors", vendor_routes())
}

/// Program (product line) routes
fn program_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_programs).post(handlers::create_program),
        )
        .route(
            "/:program_id",
            get(handlers::get_program).put(handlers::update_program),
        )
}

/// Kit definition routes
fn kit_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_kits).post(handlers::create_kit))
        .route(
            "/:kit_id",
            get(handlers::get_kit).put(handlers::update_kit),
        )
        .route("/:kit_id/stock-count", put(handlers::update_stock_count))
        .route("/:kit_id/materials", get(handlers::get_kit_materials))
}

/// Inventory routes
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items).post(handlers::create_item))
        .route(
            "/:item_id",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route("/:item_id/adjust", post(handlers::adjust_stock))
}

/// Client routes
fn client_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_clients).post(handlers::create_client),
        )
        .route(
            "/:client_id",
            get(handlers::get_client).put(handlers::update_client),
        )
}

/// Assignment (order) routes
fn assignment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_assignments).post(handlers::create_assignment),
        )
        .route("/:assignment_id", get(handlers::get_assignment))
        .route("/:assignment_id/status", put(handlers::update_status))
        .route(
            "/:assignment_id/dispatch-info",
            put(handlers::update_dispatch_info),
        )
}

/// Batch routes
fn batch_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_batches).post(handlers::create_batch),
        )
        .route(
            "/:batch_id",
            get(handlers::get_batch).put(handlers::update_batch),
        )
        .route(
            "/:batch_id/assignments",
            get(handlers::list_batch_assignments),
        )
}

/// Processing job routes
fn processing_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_jobs).post(handlers::create_job))
        .route("/:job_id", get(handlers::get_job))
        .route("/:job_id/start", post(handlers::start_job))
        .route("/:job_id/complete", post(handlers::complete_job))
        .route("/:job_id/cancel", post(handlers::cancel_job))
}

/// Procurement routes: shortage report and material requests
fn procurement_routes() -> Router<AppState> {
    Router::new()
        .route("/shortages", get(handlers::list_shortages))
        .route(
            "/requests",
            get(handlers::list_requests).post(handlers::create_request),
        )
        .route("/requests/:request_id", get(handlers::get_request))
        .route("/requests/:request_id/approve", post(handlers::approve_request))
        .route("/requests/:request_id/reject", post(handlers::reject_request))
        .route("/requests/:request_id/fulfill", post(handlers::fulfill_request))
}

/// Deletion request routes
fn deletion_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_deletion_requests).post(handlers::create_deletion_request),
        )
        .route(
            "/:request_id/approve",
            post(handlers::approve_deletion_request),
        )
        .route(
            "/:request_id/reject",
            post(handlers::reject_deletion_request),
        )
}

/// Vendor routes
fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_vendors).post(handlers::create_vendor),
        )
        .route(
            "/:vendor_id",
            get(handlers::get_vendor)
                .put(handlers::update_vendor)
                .delete(handlers::delete_vendor),
        )
}
