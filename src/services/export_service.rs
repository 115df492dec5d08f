// src/services/export_service.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    db::{SettingsRepository, TicketRepository},
    models::{settings::AppSettings, ticket::ServiceTicket},
};

/// On-demand backup bundle. Export-only; there is no import path.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataExport {
    pub tickets: Vec<ServiceTicket>,
    pub settings: AppSettings,
    pub export_date: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ExportService {
    tickets: TicketRepository,
    settings: SettingsRepository,
}

impl ExportService {
    pub fn new(tickets: TicketRepository, settings: SettingsRepository) -> Self {
        Self { tickets, settings }
    }

    pub async fn export(&self) -> DataExport {
        DataExport {
            tickets: self.tickets.list().await,
            settings: self.settings.get().await,
            export_date: Utc::now(),
        }
    }

    /// Removes both record keys; the next reads see an empty collection
    /// and default settings.
    pub async fn clear_all(&self) -> Result<(), AppError> {
        self.tickets.clear().await?;
        self.settings.clear().await
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::{
        db::RecordStore,
        models::ticket::{NewTicket, ProductType, TicketStatus},
    };

    async fn service() -> (ExportService, TicketRepository, SettingsRepository) {
        let store = RecordStore::new(crate::db::test_pool().await);
        let tickets = TicketRepository::new(store.clone());
        let settings = SettingsRepository::new(store);
        (
            ExportService::new(tickets.clone(), settings.clone()),
            tickets,
            settings,
        )
    }

    fn sample() -> NewTicket {
        NewTicket {
            client_name: "Ana Pop".to_string(),
            client_phone: "0722111222".to_string(),
            client_email: String::new(),
            product_type: ProductType::Laptop,
            product_model: "Dell XPS".to_string(),
            product_serial_number: String::new(),
            problem_description: String::new(),
            diagnostic: String::new(),
            solution_applied: String::new(),
            cost: Decimal::from(250),
            status: TicketStatus::Pending,
            technician_name: "Ion".to_string(),
            date_received: Utc::now(),
            date_delivered: None,
            telegram_sent: false,
            telegram_message_id: None,
        }
    }

    #[tokio::test]
    async fn export_bundles_tickets_and_settings() {
        let (export, tickets, settings) = service().await;
        tickets.create(sample()).await.unwrap();
        settings
            .update_technician_name("Ioana".to_string())
            .await
            .unwrap();

        let bundle = export.export().await;
        assert_eq!(bundle.tickets.len(), 1);
        assert_eq!(bundle.settings.technician_name, "Ioana");
        assert!(bundle.export_date <= Utc::now());
    }

    #[tokio::test]
    async fn clear_all_wipes_both_records() {
        let (export, tickets, settings) = service().await;
        tickets.create(sample()).await.unwrap();
        settings
            .update_technician_name("Ioana".to_string())
            .await
            .unwrap();

        export.clear_all().await.unwrap();
        assert!(tickets.list().await.is_empty());
        assert_eq!(settings.get().await.technician_name, "Technician");
    }
}
