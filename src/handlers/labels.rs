// src/handlers/labels.rs

use axum::{extract::State, http::header, response::IntoResponse, Json};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, handlers::tickets::validate_non_negative};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductLabelPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Incarcator Lenovo ThinkPad")]
    pub product_name: String,

    #[schema(example = "3.25A/20V 65W Usb-C")]
    pub specifications: Option<String>,

    #[validate(custom(function = "validate_non_negative"))]
    #[schema(example = 140.0)]
    pub price: Decimal,
}

// POST /api/labels/product
#[utoipa::path(
    post,
    path = "/api/labels/product",
    tag = "Labels",
    request_body = ProductLabelPayload,
    responses(
        (status = 200, description = "62×30 mm price label", body = Vec<u8>, content_type = "application/pdf"),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn product_label(
    State(app_state): State<AppState>,
    Json(payload): Json<ProductLabelPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let pdf = app_state.label_service.product_label_pdf(
        &payload.product_name,
        payload.specifications.as_deref(),
        payload.price,
    )?;
    Ok(([(header::CONTENT_TYPE, "application/pdf")], pdf))
}
