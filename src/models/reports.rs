// src/models/reports.rs
//
// Derived report shapes. Nothing here is persisted; every report is
// recomputed from the ticket collection on demand.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::ticket::{ProductType, ServiceTicket};

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Per-product slice of the revenue report. The cost column is the fixed
/// 30% cost-of-goods estimate, not a recorded value.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductBreakdown {
    pub count: usize,
    pub revenue: Decimal,
    pub cost: Decimal,
    pub profit: Decimal,
}

/// Revenue over completed tickets in a date range.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub total_revenue: Decimal,
    /// Estimated cost of goods (30% of revenue per ticket).
    pub total_cost: Decimal,
    pub total_profit: Decimal,
    pub ticket_count: usize,
    pub average_ticket_value: Decimal,
    pub date_range: DateRange,
    pub by_product_type: BTreeMap<ProductType, ProductBreakdown>,
}

/// Per-technician workload and revenue. Revenue sums the cost of tickets
/// in *every* status, unlike the revenue report.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianReport {
    pub technician_name: String,
    pub ticket_count: usize,
    pub completed_count: usize,
    pub pending_count: usize,
    pub completion_rate: f64,
    pub total_revenue: Decimal,
    pub average_ticket_value: Decimal,
    pub date_range: DateRange,
}

/// Per-product-type repair stats. `failure_rate` carries the ratio of
/// completed to total repairs (the wire name is kept for client
/// compatibility with the original app).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductReport {
    pub product_type: ProductType,
    pub repair_count: usize,
    pub failure_rate: f64,
    pub average_cost: Decimal,
    pub total_revenue: Decimal,
    pub date_range: DateRange,
}

/// Whole-history view of a single client, matched by exact
/// case-insensitive name.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientReport {
    pub client_name: String,
    pub client_phone: String,
    pub client_email: String,
    pub ticket_count: usize,
    pub total_spent: Decimal,
    pub first_service_date: chrono::DateTime<chrono::Utc>,
    pub last_service_date: chrono::DateTime<chrono::Utc>,
    pub average_ticket_value: Decimal,
    pub tickets: Vec<ServiceTicket>,
}

/// Whole-collection counters for the dashboard, independent of any date
/// filter. "Today" is the server's local calendar day.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_tickets: usize,
    pub completed_tickets: usize,
    pub pending_tickets: usize,
    pub today_tickets: usize,
    pub total_revenue: Decimal,
    pub average_ticket_value: Decimal,
}
