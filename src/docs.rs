// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Tickets ---
        handlers::tickets::create_ticket,
        handlers::tickets::list_tickets,
        handlers::tickets::get_ticket,
        handlers::tickets::update_ticket,
        handlers::tickets::delete_ticket,
        handlers::tickets::notify_ticket,
        handlers::tickets::resolve_deep_link,
        handlers::tickets::ticket_qr,
        handlers::tickets::ticket_label,
        handlers::tickets::ticket_sheet,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
        handlers::settings::get_telegram_config,
        handlers::settings::update_telegram_config,

        // --- Reports ---
        handlers::reports::revenue_report,
        handlers::reports::technician_report,
        handlers::reports::product_report,
        handlers::reports::client_report,
        handlers::reports::dashboard_stats,
        handlers::reports::client_names,
        handlers::reports::technician_names,

        // --- Telegram ---
        handlers::telegram::test_connection,
        handlers::telegram::sync_from_channel,

        // --- Labels ---
        handlers::labels::product_label,

        // --- Data ---
        handlers::data::export_data,
        handlers::data::wipe_data,
    ),
    components(
        schemas(
            // --- Tickets ---
            models::ticket::ProductType,
            models::ticket::TicketStatus,
            models::ticket::ServiceTicket,
            models::ticket::TicketPatch,
            handlers::tickets::CreateTicketPayload,

            // --- Settings ---
            models::settings::TelegramConfig,
            models::settings::ThemePreference,
            models::settings::AppSettings,
            models::settings::UpdateSettingsRequest,

            // --- Reports ---
            models::reports::DateRange,
            models::reports::ProductBreakdown,
            models::reports::RevenueReport,
            models::reports::TechnicianReport,
            models::reports::ProductReport,
            models::reports::ClientReport,
            models::reports::DashboardStats,

            // --- Telegram ---
            services::telegram_service::SendOutcome,
            services::telegram_service::SyncOutcome,

            // --- Labels ---
            handlers::labels::ProductLabelPayload,

            // --- Data ---
            services::export_service::DataExport,
        )
    ),
    tags(
        (name = "Tickets", description = "Service ticket lifecycle"),
        (name = "Settings", description = "Shop settings and channel credentials"),
        (name = "Reports", description = "Derived aggregate views"),
        (name = "Telegram", description = "Channel connection and best-effort sync"),
        (name = "Labels", description = "Thermal label rendering"),
        (name = "Data", description = "Export and full wipe")
    )
)]
pub struct ApiDoc;
