// src/handlers/tickets.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    models::ticket::{FilterOptions, NewTicket, ProductType, ServiceTicket, TicketPatch, TicketStatus},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Ana Pop")]
    pub client_name: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "0722111222")]
    pub client_phone: String,

    #[serde(default)]
    #[schema(example = "ana@example.com")]
    pub client_email: String,

    pub product_type: ProductType,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Dell XPS 13")]
    pub product_model: String,

    #[serde(default)]
    pub product_serial_number: String,

    #[serde(default)]
    #[schema(example = "Nu pornește")]
    pub problem_description: String,
    #[serde(default)]
    pub diagnostic: String,
    #[serde(default)]
    pub solution_applied: String,

    #[validate(custom(function = "validate_non_negative"))]
    #[schema(example = 250.0)]
    pub cost: Decimal,

    #[serde(default)]
    pub status: TicketStatus,

    /// Defaults to the technician configured in settings when omitted.
    pub technician_name: Option<String>,

    /// Defaults to now.
    pub date_received: Option<DateTime<Utc>>,
    pub date_delivered: Option<DateTime<Utc>>,
}

pub(crate) fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("non_negative"));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub url: String,
}

// POST /api/tickets
#[utoipa::path(
    post,
    path = "/api/tickets",
    tag = "Tickets",
    request_body = CreateTicketPayload,
    responses(
        (status = 201, description = "Ticket created", body = ServiceTicket),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_ticket(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateTicketPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let technician_name = match payload.technician_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => app_state.settings_repo.technician_name().await,
    };

    let ticket = app_state
        .ticket_repo
        .create(NewTicket {
            client_name: payload.client_name,
            client_phone: payload.client_phone,
            client_email: payload.client_email,
            product_type: payload.product_type,
            product_model: payload.product_model,
            product_serial_number: payload.product_serial_number,
            problem_description: payload.problem_description,
            diagnostic: payload.diagnostic,
            solution_applied: payload.solution_applied,
            cost: payload.cost,
            status: payload.status,
            technician_name,
            date_received: payload.date_received.unwrap_or_else(Utc::now),
            date_delivered: payload.date_delivered,
            telegram_sent: false,
            telegram_message_id: None,
        })
        .await?;

    // Best-effort channel post; a failure leaves telegramSent false and
    // is not surfaced as an error.
    let outcome = app_state.telegram_service.send_ticket(&ticket).await;
    let ticket = if outcome.success {
        app_state
            .ticket_repo
            .mark_telegram_sent(ticket.id, outcome.message_id)
            .await?;
        app_state.ticket_repo.get(ticket.id).await.unwrap_or(ticket)
    } else {
        ticket
    };

    Ok((StatusCode::CREATED, Json(ticket)))
}

// GET /api/tickets
#[utoipa::path(
    get,
    path = "/api/tickets",
    tag = "Tickets",
    params(FilterOptions),
    responses(
        (status = 200, description = "Tickets matching the filter", body = Vec<ServiceTicket>)
    )
)]
pub async fn list_tickets(
    State(app_state): State<AppState>,
    Query(filter): Query<FilterOptions>,
) -> Result<impl IntoResponse, AppError> {
    let tickets = if filter.is_empty() {
        app_state.ticket_repo.list().await
    } else {
        app_state.ticket_repo.filter(&filter).await
    };
    Ok((StatusCode::OK, Json(tickets)))
}

// GET /api/tickets/{id}
#[utoipa::path(
    get,
    path = "/api/tickets/{id}",
    tag = "Tickets",
    params(("id" = Uuid, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "The ticket", body = ServiceTicket),
        (status = 404, description = "Unknown ticket")
    )
)]
pub async fn get_ticket(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = app_state
        .ticket_repo
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Ticket {id} not found")))?;
    Ok((StatusCode::OK, Json(ticket)))
}

// PUT /api/tickets/{id}
#[utoipa::path(
    put,
    path = "/api/tickets/{id}",
    tag = "Tickets",
    params(("id" = Uuid, Path, description = "Ticket id")),
    request_body = TicketPatch,
    responses(
        (status = 200, description = "Updated ticket", body = ServiceTicket),
        (status = 404, description = "Unknown ticket")
    )
)]
pub async fn update_ticket(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TicketPatch>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = app_state
        .ticket_repo
        .update(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ticket {id} not found")))?;

    // Tickets already posted to the channel get an update notice.
    let ticket = if ticket.telegram_sent {
        let outcome = app_state.telegram_service.send_update(&ticket).await;
        if outcome.success {
            app_state
                .ticket_repo
                .mark_telegram_sent(ticket.id, outcome.message_id)
                .await?;
            app_state.ticket_repo.get(ticket.id).await.unwrap_or(ticket)
        } else {
            ticket
        }
    } else {
        ticket
    };

    Ok((StatusCode::OK, Json(ticket)))
}

// DELETE /api/tickets/{id}
#[utoipa::path(
    delete,
    path = "/api/tickets/{id}",
    tag = "Tickets",
    params(("id" = Uuid, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Whether a ticket was removed")
    )
)]
pub async fn delete_ticket(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let message_id = app_state
        .ticket_repo
        .get(id)
        .await
        .and_then(|t| t.telegram_message_id);

    let deleted = app_state.ticket_repo.delete(id).await?;
    if deleted {
        if let Some(message_id) = message_id {
            // best-effort; the channel copy may outlive the ticket
            app_state.telegram_service.delete_message(&message_id).await;
        }
    }

    Ok((StatusCode::OK, Json(json!({ "deleted": deleted }))))
}

// POST /api/tickets/{id}/notify
#[utoipa::path(
    post,
    path = "/api/tickets/{id}/notify",
    tag = "Tickets",
    params(("id" = Uuid, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Channel send outcome", body = crate::services::telegram_service::SendOutcome),
        (status = 404, description = "Unknown ticket")
    )
)]
pub async fn notify_ticket(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = app_state
        .ticket_repo
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Ticket {id} not found")))?;

    let outcome = if ticket.telegram_sent {
        app_state.telegram_service.send_update(&ticket).await
    } else {
        app_state.telegram_service.send_ticket(&ticket).await
    };
    if outcome.success {
        app_state
            .ticket_repo
            .mark_telegram_sent(ticket.id, outcome.message_id.clone())
            .await?;
    }

    Ok((StatusCode::OK, Json(outcome)))
}

// GET /api/tickets/resolve?url=manusapp://ticket/...
#[utoipa::path(
    get,
    path = "/api/tickets/resolve",
    tag = "Tickets",
    params(("url" = String, Query, description = "Scanned deep link")),
    responses(
        (status = 200, description = "The ticket behind the deep link", body = ServiceTicket),
        (status = 404, description = "Unparseable link or unknown ticket")
    )
)]
pub async fn resolve_deep_link(
    State(app_state): State<AppState>,
    Query(query): Query<ResolveQuery>,
) -> Result<impl IntoResponse, AppError> {
    let id = app_state
        .label_service
        .parse_ticket_deep_link(&query.url)
        .ok_or_else(|| AppError::NotFound("Not a ticket deep link".to_string()))?;
    let ticket = app_state
        .ticket_repo
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Ticket {id} not found")))?;
    Ok((StatusCode::OK, Json(ticket)))
}

// GET /api/tickets/{id}/qr.png
#[utoipa::path(
    get,
    path = "/api/tickets/{id}/qr.png",
    tag = "Tickets",
    params(("id" = Uuid, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "QR code with the ticket deep link", body = Vec<u8>, content_type = "image/png"),
        (status = 404, description = "Unknown ticket")
    )
)]
pub async fn ticket_qr(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = app_state
        .ticket_repo
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Ticket {id} not found")))?;
    let png = app_state.label_service.ticket_qr_png(ticket.id)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

// GET /api/tickets/{id}/label.pdf
#[utoipa::path(
    get,
    path = "/api/tickets/{id}/label.pdf",
    tag = "Tickets",
    params(("id" = Uuid, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "62×50 mm thermal label", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "Unknown ticket")
    )
)]
pub async fn ticket_label(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = app_state
        .ticket_repo
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Ticket {id} not found")))?;
    let pdf = app_state.label_service.ticket_label_pdf(&ticket)?;
    Ok(([(header::CONTENT_TYPE, "application/pdf")], pdf))
}

// GET /api/tickets/{id}/sheet.pdf
#[utoipa::path(
    get,
    path = "/api/tickets/{id}/sheet.pdf",
    tag = "Tickets",
    params(("id" = Uuid, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "A4 service sheet", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "Unknown ticket")
    )
)]
pub async fn ticket_sheet(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = app_state
        .ticket_repo
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Ticket {id} not found")))?;
    let pdf = app_state.label_service.service_sheet_pdf(&ticket)?;
    Ok(([(header::CONTENT_TYPE, "application/pdf")], pdf))
}
