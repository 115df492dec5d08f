// src/handlers/telegram.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    config::AppState,
    services::telegram_service::{SendOutcome, SyncOutcome},
};

// POST /api/telegram/test
#[utoipa::path(
    post,
    path = "/api/telegram/test",
    tag = "Telegram",
    responses(
        (status = 200, description = "Connection test outcome", body = SendOutcome)
    )
)]
pub async fn test_connection(State(app_state): State<AppState>) -> impl IntoResponse {
    let outcome = app_state.telegram_service.test_connection().await;
    (StatusCode::OK, Json(outcome))
}

// POST /api/telegram/sync
#[utoipa::path(
    post,
    path = "/api/telegram/sync",
    tag = "Telegram",
    responses(
        (status = 200, description = "Best-effort channel scrape outcome", body = SyncOutcome)
    )
)]
pub async fn sync_from_channel(State(app_state): State<AppState>) -> impl IntoResponse {
    let outcome = app_state.telegram_service.sync_from_channel().await;
    (StatusCode::OK, Json(outcome))
}
