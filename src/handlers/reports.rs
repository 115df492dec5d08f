// src/handlers/reports.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    models::reports::{
        ClientReport, DashboardStats, ProductReport, RevenueReport, TechnicianReport,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportRangeQuery {
    /// First calendar day of the range, inclusive.
    pub start_date: NaiveDate,
    /// Last calendar day of the range, inclusive.
    pub end_date: NaiveDate,
}

// GET /api/reports/revenue
#[utoipa::path(
    get,
    path = "/api/reports/revenue",
    tag = "Reports",
    params(ReportRangeQuery),
    responses(
        (status = 200, description = "Revenue over completed tickets in range", body = RevenueReport)
    )
)]
pub async fn revenue_report(
    State(app_state): State<AppState>,
    Query(range): Query<ReportRangeQuery>,
) -> impl IntoResponse {
    let report = app_state
        .report_service
        .revenue_report(range.start_date, range.end_date)
        .await;
    (StatusCode::OK, Json(report))
}

// GET /api/reports/technicians
#[utoipa::path(
    get,
    path = "/api/reports/technicians",
    tag = "Reports",
    params(ReportRangeQuery),
    responses(
        (status = 200, description = "Per-technician stats, highest revenue first", body = Vec<TechnicianReport>)
    )
)]
pub async fn technician_report(
    State(app_state): State<AppState>,
    Query(range): Query<ReportRangeQuery>,
) -> impl IntoResponse {
    let report = app_state
        .report_service
        .technician_report(range.start_date, range.end_date)
        .await;
    (StatusCode::OK, Json(report))
}

// GET /api/reports/products
#[utoipa::path(
    get,
    path = "/api/reports/products",
    tag = "Reports",
    params(ReportRangeQuery),
    responses(
        (status = 200, description = "Per-product stats, most repaired first", body = Vec<ProductReport>)
    )
)]
pub async fn product_report(
    State(app_state): State<AppState>,
    Query(range): Query<ReportRangeQuery>,
) -> impl IntoResponse {
    let report = app_state
        .report_service
        .product_report(range.start_date, range.end_date)
        .await;
    (StatusCode::OK, Json(report))
}

// GET /api/reports/clients/{name}
#[utoipa::path(
    get,
    path = "/api/reports/clients/{name}",
    tag = "Reports",
    params(("name" = String, Path, description = "Exact client name, case-insensitive")),
    responses(
        (status = 200, description = "Whole-history client report", body = ClientReport),
        (status = 404, description = "Client has no tickets")
    )
)]
pub async fn client_report(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .report_service
        .client_report(&name)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No tickets for client {name}")))?;
    Ok((StatusCode::OK, Json(report)))
}

// GET /api/reports/dashboard
#[utoipa::path(
    get,
    path = "/api/reports/dashboard",
    tag = "Reports",
    responses(
        (status = 200, description = "Whole-collection counters", body = DashboardStats)
    )
)]
pub async fn dashboard_stats(State(app_state): State<AppState>) -> impl IntoResponse {
    let stats = app_state.report_service.dashboard_stats().await;
    (StatusCode::OK, Json(stats))
}

// GET /api/reports/client-names
#[utoipa::path(
    get,
    path = "/api/reports/client-names",
    tag = "Reports",
    responses(
        (status = 200, description = "Sorted unique client names", body = Vec<String>)
    )
)]
pub async fn client_names(State(app_state): State<AppState>) -> impl IntoResponse {
    let names = app_state.report_service.client_names().await;
    (StatusCode::OK, Json(names))
}

// GET /api/reports/technician-names
#[utoipa::path(
    get,
    path = "/api/reports/technician-names",
    tag = "Reports",
    responses(
        (status = 200, description = "Sorted unique technician names", body = Vec<String>)
    )
)]
pub async fn technician_names(State(app_state): State<AppState>) -> impl IntoResponse {
    let names = app_state.report_service.technician_names().await;
    (StatusCode::OK, Json(names))
}
