// src/handlers/settings.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    models::settings::{AppSettings, TelegramConfig, UpdateSettingsRequest},
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Current settings (defaults when never saved)", body = AppSettings)
    )
)]
pub async fn get_settings(State(app_state): State<AppState>) -> impl IntoResponse {
    let settings = app_state.settings_repo.get().await;
    (StatusCode::OK, Json(settings))
}

// PUT /api/settings
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Merged settings", body = AppSettings)
    )
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state.settings_repo.update(payload).await?;
    Ok((StatusCode::OK, Json(settings)))
}

// GET /api/settings/telegram
#[utoipa::path(
    get,
    path = "/api/settings/telegram",
    tag = "Settings",
    responses(
        (status = 200, description = "Channel credentials", body = TelegramConfig)
    )
)]
pub async fn get_telegram_config(State(app_state): State<AppState>) -> impl IntoResponse {
    let config = app_state.settings_repo.telegram_config().await;
    (StatusCode::OK, Json(config))
}

// PUT /api/settings/telegram
#[utoipa::path(
    put,
    path = "/api/settings/telegram",
    tag = "Settings",
    request_body = TelegramConfig,
    responses(
        (status = 200, description = "Stored channel credentials", body = TelegramConfig)
    )
)]
pub async fn update_telegram_config(
    State(app_state): State<AppState>,
    Json(payload): Json<TelegramConfig>,
) -> Result<impl IntoResponse, AppError> {
    let config = app_state
        .settings_repo
        .update_telegram_config(payload)
        .await?;
    Ok((StatusCode::OK, Json(config)))
}
