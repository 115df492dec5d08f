// src/services/telegram_service.rs
//
// Posts ticket copies to the shop's Telegram group and scrapes recent
// bot updates back out of it. Everything here is best-effort: missing
// configuration and API failures become `success = false` outcomes, and
// nothing is ever retried. Only the repositories record whether a ticket
// made it to the channel.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::{
    db::{SettingsRepository, TicketRepository},
    models::{
        settings::TelegramConfig,
        ticket::{NewTicket, ProductType, ServiceTicket, TicketStatus},
    },
};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Result of one channel interaction, mirrored to the caller as-is.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendOutcome {
    fn sent(message_id: Option<String>) -> Self {
        Self {
            success: true,
            message_id,
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Result of a best-effort channel scrape.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub success: bool,
    /// Tickets imported from the channel this run.
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// Envelope every Bot API method responds with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

#[derive(Debug, Deserialize)]
struct BotProfile {}

#[derive(Debug, Deserialize)]
struct Update {
    message: Option<ChannelMessage>,
    channel_post: Option<ChannelMessage>,
}

#[derive(Debug, Deserialize)]
struct ChannelMessage {
    message_id: i64,
    chat: ChatRef,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatRef {
    id: i64,
}

#[derive(Clone)]
pub struct TelegramService {
    http: reqwest::Client,
    settings: SettingsRepository,
    tickets: TicketRepository,
}

impl TelegramService {
    pub fn new(settings: SettingsRepository, tickets: TicketRepository) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
            tickets,
        }
    }

    /// Posts the full service sheet for a freshly created ticket.
    pub async fn send_ticket(&self, ticket: &ServiceTicket) -> SendOutcome {
        let config = self.settings.telegram_config().await;
        if !config.is_configured() {
            return SendOutcome::failed(
                "Telegram configuration is missing. Please configure bot token and group ID in settings.",
            );
        }
        self.post_html(&config, format_ticket_message(ticket)).await
    }

    /// Posts an update notice wrapping the full sheet.
    pub async fn send_update(&self, ticket: &ServiceTicket) -> SendOutcome {
        let config = self.settings.telegram_config().await;
        if !config.is_configured() {
            return SendOutcome::failed("Telegram configuration is missing.");
        }
        self.post_html(&config, format_update_message(ticket)).await
    }

    /// Validates the bot token via `getMe`, then proves the bot can post
    /// to the configured group.
    pub async fn test_connection(&self) -> SendOutcome {
        let config = self.settings.telegram_config().await;
        if !config.is_configured() {
            return SendOutcome::failed("Telegram configuration is missing.");
        }

        if let Err(error) = self.get_me(&config).await {
            return SendOutcome::failed(error);
        }

        let probe = self
            .post_html(&config, "✅ Conexiune Telegram testată cu succes!".to_string())
            .await;
        if probe.success {
            probe
        } else {
            SendOutcome::failed(
                "Invalid group ID or bot does not have permission to send messages",
            )
        }
    }

    /// Best-effort removal of a previously posted message.
    pub async fn delete_message(&self, message_id: &str) -> SendOutcome {
        let config = self.settings.telegram_config().await;
        if !config.is_configured() {
            return SendOutcome::failed("Telegram configuration is missing.");
        }
        let Ok(message_id) = message_id.parse::<i64>() else {
            return SendOutcome::failed("Message ID is missing or invalid.");
        };

        let url = format!(
            "{}/bot{}/deleteMessage",
            TELEGRAM_API_BASE, config.bot_token
        );
        let body = json!({ "chat_id": config.group_id, "message_id": message_id });
        match self.call::<serde_json::Value>(&url, Some(body)).await {
            Ok(_) => SendOutcome::sent(None),
            Err(error) => {
                tracing::error!("telegram delete failed: {}", error);
                SendOutcome::failed(error)
            }
        }
    }

    /// Scrapes recent bot updates from the configured group and imports
    /// every JSON-formatted ticket message that has not been imported
    /// yet. Imported tickets are marked as already posted.
    pub async fn sync_from_channel(&self) -> SyncOutcome {
        let config = self.settings.telegram_config().await;
        if !config.is_configured() {
            return SyncOutcome {
                success: false,
                count: 0,
                error: Some("Token-ul Telegram sau ID-ul grupului nu sunt configurate".to_string()),
            };
        }
        if !config.bot_token.contains(':') {
            return SyncOutcome {
                success: false,
                count: 0,
                error: Some("Token-ul Telegram este invalid".to_string()),
            };
        }
        let Ok(group_id) = config.group_id.parse::<i64>() else {
            return SyncOutcome {
                success: false,
                count: 0,
                error: Some("ID-ul grupului Telegram este invalid".to_string()),
            };
        };

        if let Err(error) = self.get_me(&config).await {
            return SyncOutcome {
                success: false,
                count: 0,
                error: Some(error),
            };
        }

        let url = format!(
            "{}/bot{}/getUpdates?limit=100",
            TELEGRAM_API_BASE, config.bot_token
        );
        let updates = match self.call::<Vec<Update>>(&url, None).await {
            Ok(updates) => updates,
            Err(error) => {
                return SyncOutcome {
                    success: false,
                    count: 0,
                    error: Some(error),
                }
            }
        };

        let known_message_ids: std::collections::HashSet<String> = self
            .tickets
            .list()
            .await
            .into_iter()
            .filter_map(|t| t.telegram_message_id)
            .collect();

        let mut count = 0;
        for update in updates {
            let Some(message) = update.message.or(update.channel_post) else {
                continue;
            };
            if message.chat.id != group_id {
                continue;
            }
            let message_id = message.message_id.to_string();
            if known_message_ids.contains(&message_id) {
                continue;
            }
            let Some(mut ticket) = message.text.as_deref().and_then(parse_ticket_message) else {
                continue;
            };

            ticket.telegram_message_id = Some(message_id);
            if let Err(error) = self.tickets.create(ticket).await {
                return SyncOutcome {
                    success: false,
                    count,
                    error: Some(error.to_string()),
                };
            }
            count += 1;
        }

        SyncOutcome {
            success: true,
            count,
            error: None,
        }
    }

    async fn get_me(&self, config: &TelegramConfig) -> Result<(), String> {
        let url = format!("{}/bot{}/getMe", TELEGRAM_API_BASE, config.bot_token);
        self.call::<BotProfile>(&url, None)
            .await
            .map(|_| ())
            .map_err(|_| "Invalid bot token".to_string())
    }

    async fn post_html(&self, config: &TelegramConfig, text: String) -> SendOutcome {
        let url = format!(
            "{}/bot{}/sendMessage",
            TELEGRAM_API_BASE, config.bot_token
        );
        let body = json!({
            "chat_id": config.group_id,
            "text": text,
            "parse_mode": "HTML",
        });

        match self.call::<SentMessage>(&url, Some(body)).await {
            Ok(sent) => SendOutcome::sent(Some(sent.message_id.to_string())),
            Err(error) => {
                tracing::error!("telegram send failed: {}", error);
                SendOutcome::failed(error)
            }
        }
    }

    // One Bot API round-trip: POST when a body is given, GET otherwise.
    // Collapses transport errors, non-2xx statuses and `ok: false`
    // envelopes into a displayable message.
    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, String> {
        let request = match body {
            Some(body) => self.http.post(url).json(&body),
            None => self.http.get(url),
        };
        let response = request
            .send()
            .await
            .map_err(|e| format!("Nu se poate conecta la Telegram API: {e}"))?;

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| format!("Unexpected Telegram API response: {e}"))?;

        if !envelope.ok {
            return Err(envelope
                .description
                .unwrap_or_else(|| "Telegram API error".to_string()));
        }
        envelope
            .result
            .ok_or_else(|| "Telegram API returned an empty result".to_string())
    }
}

/// Renders the Romanian service-sheet message posted on creation.
pub(crate) fn format_ticket_message(ticket: &ServiceTicket) -> String {
    format!(
        "📋 <b>FIȘĂ DE SERVICE</b>\n\
         \n\
         <b>👤 CLIENT:</b>\n\
         • Nume: {name}\n\
         • Telefon: {phone}\n\
         • Email: {email}\n\
         \n\
         <b>📱 PRODUS:</b>\n\
         • Tip: {product}\n\
         • Model: {model}\n\
         • Serie: {serial}\n\
         \n\
         <b>🔍 DIAGNOSTIC:</b>\n{problem}\n\
         \n\
         <b>🛠️ SOLUȚIE:</b>\n{solution}\n\
         \n\
         <b>💰 COST:</b> {cost} RON\n\
         \n\
         <b>👨‍🔧 TEHNICIAN:</b> {technician}\n\
         \n\
         <b>📅 DATE:</b>\n\
         • Primit: {received}\n\
         • Predat: {delivered}\n\
         \n\
         <b>📊 STATUS:</b> {status}\n\
         \n\
         <i>ID: {id}</i>",
        name = ticket.client_name,
        phone = ticket.client_phone,
        email = ticket.client_email,
        product = ticket.product_type.label_ro(),
        model = ticket.product_model,
        serial = ticket.product_serial_number,
        problem = ticket.problem_description,
        solution = ticket.solution_applied,
        cost = ticket.cost,
        technician = ticket.technician_name,
        received = format_date_ro(ticket.date_received),
        delivered = ticket
            .date_delivered
            .map(format_date_ro)
            .unwrap_or_else(|| "N/A".to_string()),
        status = format_status(ticket.status),
        id = ticket.id,
    )
}

/// Renders the update notice posted when an existing ticket changes.
pub(crate) fn format_update_message(ticket: &ServiceTicket) -> String {
    format!(
        "🔄 <b>ACTUALIZARE FIȘĂ</b>\n\n{}\n\n<i>Actualizat: {}</i>",
        format_ticket_message(ticket),
        Utc::now().format("%d.%m.%Y %H:%M"),
    )
}

fn format_status(status: TicketStatus) -> String {
    let emoji = match status {
        TicketStatus::Pending => "⏳",
        TicketStatus::InProgress => "🔧",
        TicketStatus::Completed => "✅",
        TicketStatus::OnHold => "⏸️",
    };
    format!("{} {}", emoji, status.label_ro())
}

fn format_date_ro(date: DateTime<Utc>) -> String {
    date.format("%d.%m.%Y").to_string()
}

// Shape of the JSON messages users post in the group for re-import.
// Only the client name and product type are mandatory.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TicketMessagePayload {
    client_name: String,
    product_type: ProductType,
    #[serde(default)]
    client_phone: String,
    #[serde(default)]
    client_email: String,
    #[serde(default)]
    product_model: String,
    #[serde(default)]
    product_serial_number: String,
    #[serde(default)]
    problem_description: String,
    #[serde(default)]
    diagnostic: String,
    #[serde(default)]
    solution_applied: String,
    #[serde(default)]
    cost: Decimal,
    #[serde(default)]
    status: TicketStatus,
    #[serde(default)]
    technician_name: Option<String>,
    #[serde(default)]
    date_received: Option<DateTime<Utc>>,
    #[serde(default)]
    date_delivered: Option<DateTime<Utc>>,
}

/// Parses one channel message into an importable ticket; `None` when the
/// text is not a JSON ticket.
pub(crate) fn parse_ticket_message(text: &str) -> Option<NewTicket> {
    let payload: TicketMessagePayload = serde_json::from_str(text).ok()?;
    if payload.client_name.is_empty() {
        return None;
    }

    Some(NewTicket {
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
        technician_name: payload
            .technician_name
            .unwrap_or_else(|| "Tehnician".to_string()),
        date_received: payload.date_received.unwrap_or_else(Utc::now),
        date_delivered: payload.date_delivered,
        telegram_sent: true,
        telegram_message_id: None,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;
    use crate::db::RecordStore;

    fn sample_ticket() -> ServiceTicket {
        ServiceTicket {
            id: Uuid::new_v4(),
            client_name: "Ana Pop".to_string(),
            client_phone: "0722111222".to_string(),
            client_email: "ana@example.com".to_string(),
            product_type: ProductType::Laptop,
            product_model: "Dell XPS".to_string(),
            product_serial_number: "SN-42".to_string(),
            problem_description: "nu pornește".to_string(),
            diagnostic: "placă de bază".to_string(),
            solution_applied: "reball GPU".to_string(),
            cost: Decimal::from(250),
            status: TicketStatus::Completed,
            technician_name: "Ion".to_string(),
            date_received: Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0).unwrap(),
            date_delivered: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            telegram_sent: false,
            telegram_message_id: None,
        }
    }

    async fn service() -> TelegramService {
        let store = RecordStore::new(crate::db::test_pool().await);
        TelegramService::new(
            SettingsRepository::new(store.clone()),
            TicketRepository::new(store),
        )
    }

    #[test]
    fn message_contains_every_section() {
        let ticket = sample_ticket();
        let message = format_ticket_message(&ticket);

        assert!(message.starts_with("📋 <b>FIȘĂ DE SERVICE</b>"));
        assert!(message.contains("• Nume: Ana Pop"));
        assert!(message.contains("• Telefon: 0722111222"));
        assert!(message.contains("• Tip: Laptop"));
        assert!(message.contains("<b>💰 COST:</b> 250 RON"));
        assert!(message.contains("• Primit: 10.03.2025"));
        assert!(message.contains("• Predat: N/A"));
        assert!(message.contains("✅ Finalizat"));
        assert!(message.contains(&ticket.id.to_string()));
    }

    #[test]
    fn update_message_wraps_the_sheet() {
        let message = format_update_message(&sample_ticket());
        assert!(message.starts_with("🔄 <b>ACTUALIZARE FIȘĂ</b>"));
        assert!(message.contains("FIȘĂ DE SERVICE"));
        assert!(message.contains("<i>Actualizat:"));
    }

    #[test]
    fn parses_json_ticket_message_with_defaults() {
        let ticket = parse_ticket_message(
            r#"{ "clientName": "Ana Pop", "productType": "laptop", "cost": 120 }"#,
        )
        .expect("valid ticket payload");

        assert_eq!(ticket.client_name, "Ana Pop");
        assert_eq!(ticket.product_type, ProductType::Laptop);
        assert_eq!(ticket.cost, Decimal::from(120));
        assert_eq!(ticket.status, TicketStatus::Pending);
        assert_eq!(ticket.technician_name, "Tehnician");
        assert!(ticket.telegram_sent);
    }

    #[test]
    fn rejects_non_ticket_messages() {
        assert!(parse_ticket_message("hello everyone").is_none());
        assert!(parse_ticket_message(r#"{ "clientName": "Ana" }"#).is_none());
        assert!(parse_ticket_message(r#"{ "productType": "laptop" }"#).is_none());
        assert!(parse_ticket_message(r#"{ "clientName": "", "productType": "laptop" }"#).is_none());
    }

    #[tokio::test]
    async fn send_without_configuration_fails_fast() {
        let service = service().await;
        let outcome = service.send_ticket(&sample_ticket()).await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("configuration"));
    }

    #[tokio::test]
    async fn sync_without_configuration_fails_fast() {
        let service = service().await;
        let outcome = service.sync_from_channel().await;
        assert!(!outcome.success);
        assert_eq!(outcome.count, 0);
        assert!(outcome.error.unwrap().contains("nu sunt configurate"));
    }

    #[tokio::test]
    async fn delete_requires_numeric_message_id() {
        let store = RecordStore::new(crate::db::test_pool().await);
        let settings = SettingsRepository::new(store.clone());
        settings
            .update_telegram_config(crate::models::settings::TelegramConfig {
                bot_token: "123:abc".to_string(),
                group_id: "-100123".to_string(),
            })
            .await
            .unwrap();
        let service = TelegramService::new(settings, TicketRepository::new(store));

        let outcome = service.delete_message("").await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("Message ID"));
    }
}
