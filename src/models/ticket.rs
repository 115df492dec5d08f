// src/models/ticket.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Category of device brought in for repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Laptop,
    Pc,
    Phone,
    Printer,
    Gps,
    Tv,
    Box,
    Tablet,
}

impl ProductType {
    /// Romanian display name, used on labels and channel messages.
    pub fn label_ro(&self) -> &'static str {
        match self {
            ProductType::Laptop => "Laptop",
            ProductType::Pc => "PC",
            ProductType::Phone => "Telefon",
            ProductType::Printer => "Imprimantă",
            ProductType::Gps => "GPS",
            ProductType::Tv => "TV",
            ProductType::Box => "Box",
            ProductType::Tablet => "Tabletă",
        }
    }
}

/// Workflow state of a ticket. Any status may move to any other; there is
/// no enforced transition graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    OnHold,
}

impl TicketStatus {
    pub fn label_ro(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "În așteptare",
            TicketStatus::InProgress => "În curs",
            TicketStatus::Completed => "Finalizat",
            TicketStatus::OnHold => "Suspendat",
        }
    }

    /// Everything that is not completed counts as open work.
    pub fn is_open(&self) -> bool {
        !matches!(self, TicketStatus::Completed)
    }
}

/// One repair job. Stored as part of the tickets collection blob; the
/// repository owns `id`, `created_at` and `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTicket {
    pub id: Uuid,

    #[schema(example = "Ana Pop")]
    pub client_name: String,
    #[schema(example = "0722111222")]
    pub client_phone: String,
    /// May be empty; the shop does not require an e-mail address.
    #[serde(default)]
    pub client_email: String,

    pub product_type: ProductType,
    #[schema(example = "Dell XPS 13")]
    pub product_model: String,
    #[serde(default)]
    pub product_serial_number: String,

    #[serde(default)]
    pub problem_description: String,
    #[serde(default)]
    pub diagnostic: String,
    #[serde(default)]
    pub solution_applied: String,

    /// Cost in RON.
    #[schema(example = 250.0)]
    pub cost: Decimal,
    pub status: TicketStatus,
    pub technician_name: String,

    pub date_received: DateTime<Utc>,
    pub date_delivered: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Whether a copy of this ticket was posted to the Telegram group at
    /// least once. The message id may be absent even when this is true.
    #[serde(default)]
    pub telegram_sent: bool,
    #[serde(default)]
    pub telegram_message_id: Option<String>,
}

/// Fields supplied when opening a ticket. The repository assigns the id
/// and both audit timestamps.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub client_name: String,
    pub client_phone: String,
    pub client_email: String,
    pub product_type: ProductType,
    pub product_model: String,
    pub product_serial_number: String,
    pub problem_description: String,
    pub diagnostic: String,
    pub solution_applied: String,
    pub cost: Decimal,
    pub status: TicketStatus,
    pub technician_name: String,
    pub date_received: DateTime<Utc>,
    pub date_delivered: Option<DateTime<Utc>>,
    pub telegram_sent: bool,
    pub telegram_message_id: Option<String>,
}

/// Partial update merged over an existing ticket. Absent fields are left
/// unchanged; `dateDelivered` and `telegramMessageId` accept an explicit
/// JSON `null` to clear the stored value. `id` and `createdAt` cannot be
/// patched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketPatch {
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
    pub product_type: Option<ProductType>,
    pub product_model: Option<String>,
    pub product_serial_number: Option<String>,
    pub problem_description: Option<String>,
    pub diagnostic: Option<String>,
    pub solution_applied: Option<String>,
    pub cost: Option<Decimal>,
    pub status: Option<TicketStatus>,
    pub technician_name: Option<String>,
    pub date_received: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub date_delivered: Option<Option<DateTime<Utc>>>,
    pub telegram_sent: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub telegram_message_id: Option<Option<String>>,
}

// Distinguishes `"field": null` (Some(None), clear it) from an absent
// field (None, keep it).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// In-memory filter over the ticket collection. Criteria are ANDed;
/// absent criteria match everything. The date range applies only when
/// both bounds are present and matches on the calendar day of
/// `dateReceived`, inclusive.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FilterOptions {
    /// Case-insensitive substring match on the client name.
    pub client_name: Option<String>,
    pub product_type: Option<ProductType>,
    pub status: Option<TicketStatus>,
    /// Case-insensitive substring match on the technician name.
    pub technician_name: Option<String>,
    pub date_range_start: Option<NaiveDate>,
    pub date_range_end: Option<NaiveDate>,
}

impl FilterOptions {
    pub fn is_empty(&self) -> bool {
        self.client_name.is_none()
            && self.product_type.is_none()
            && self.status.is_none()
            && self.technician_name.is_none()
            && self.date_range_start.is_none()
            && self.date_range_end.is_none()
    }
}
