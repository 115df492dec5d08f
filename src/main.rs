//src/main.rs

use axum::{
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // If configuration or the database fail, the application must not start.
    let app_state = AppState::new()
        .await
        .expect("failed to initialize application state");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("failed to run database migrations");

    tracing::info!("✅ database migrations applied");

    let ticket_routes = Router::new()
        .route(
            "/",
            post(handlers::tickets::create_ticket).get(handlers::tickets::list_tickets),
        )
        .route("/resolve", get(handlers::tickets::resolve_deep_link))
        .route(
            "/{id}",
            get(handlers::tickets::get_ticket)
                .put(handlers::tickets::update_ticket)
                .delete(handlers::tickets::delete_ticket),
        )
        .route("/{id}/notify", post(handlers::tickets::notify_ticket))
        .route("/{id}/qr.png", get(handlers::tickets::ticket_qr))
        .route("/{id}/label.pdf", get(handlers::tickets::ticket_label))
        .route("/{id}/sheet.pdf", get(handlers::tickets::ticket_sheet));

    let settings_routes = Router::new()
        .route(
            "/",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .route(
            "/telegram",
            get(handlers::settings::get_telegram_config)
                .put(handlers::settings::update_telegram_config),
        );

    let report_routes = Router::new()
        .route("/revenue", get(handlers::reports::revenue_report))
        .route("/technicians", get(handlers::reports::technician_report))
        .route("/products", get(handlers::reports::product_report))
        .route("/clients/{name}", get(handlers::reports::client_report))
        .route("/dashboard", get(handlers::reports::dashboard_stats))
        .route("/client-names", get(handlers::reports::client_names))
        .route(
            "/technician-names",
            get(handlers::reports::technician_names),
        );

    let telegram_routes = Router::new()
        .route("/test", post(handlers::telegram::test_connection))
        .route("/sync", post(handlers::telegram::sync_from_channel));

    let label_routes = Router::new().route("/product", post(handlers::labels::product_label));

    let data_routes = Router::new()
        .route("/export", get(handlers::data::export_data))
        .route("/", delete(handlers::data::wipe_data));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/tickets", ticket_routes)
        .nest("/api/settings", settings_routes)
        .nest("/api/reports", report_routes)
        .nest("/api/telegram", telegram_routes)
        .nest("/api/labels", label_routes)
        .nest("/api/data", data_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .expect("failed to bind TCP listener");
    tracing::info!("🚀 listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("axum server error");
}
