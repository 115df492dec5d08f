// src/handlers/data.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{common::error::AppError, config::AppState, services::export_service::DataExport};

// GET /api/data/export
#[utoipa::path(
    get,
    path = "/api/data/export",
    tag = "Data",
    responses(
        (status = 200, description = "Backup bundle (tickets, settings, export timestamp)", body = DataExport)
    )
)]
pub async fn export_data(State(app_state): State<AppState>) -> impl IntoResponse {
    let bundle = app_state.export_service.export().await;
    (StatusCode::OK, Json(bundle))
}

// DELETE /api/data
#[utoipa::path(
    delete,
    path = "/api/data",
    tag = "Data",
    responses(
        (status = 204, description = "Tickets and settings wiped")
    )
)]
pub async fn wipe_data(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    app_state.export_service.clear_all().await?;
    Ok(StatusCode::NO_CONTENT)
}
