// src/config.rs

use std::{env, time::Duration};

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::{
    db::{RecordStore, SettingsRepository, TicketRepository},
    services::{ExportService, LabelService, ReportService, TelegramService},
};

// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub ticket_repo: TicketRepository,
    pub settings_repo: SettingsRepository,
    pub report_service: ReportService,
    pub telegram_service: TelegramService,
    pub label_service: LabelService,
    pub export_service: ExportService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        // The store lives in a local SQLite file next to the binary
        // unless DATABASE_URL points elsewhere.
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:atelier.db?mode=rwc".to_string());
        // URL scheme the mobile app registers for QR deep links.
        let deeplink_scheme =
            env::var("DEEPLINK_SCHEME").unwrap_or_else(|_| "manusapp".to_string());

        let db_pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ database connection established");

        // Dependency graph, leaves first.
        let store = RecordStore::new(db_pool.clone());
        let ticket_repo = TicketRepository::new(store.clone());
        let settings_repo = SettingsRepository::new(store);
        let report_service = ReportService::new(ticket_repo.clone());
        let telegram_service = TelegramService::new(settings_repo.clone(), ticket_repo.clone());
        let label_service = LabelService::new(deeplink_scheme);
        let export_service = ExportService::new(ticket_repo.clone(), settings_repo.clone());

        Ok(Self {
            db_pool,
            ticket_repo,
            settings_repo,
            report_service,
            telegram_service,
            label_service,
            export_service,
        })
    }
}
