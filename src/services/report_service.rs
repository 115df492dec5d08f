// src/services/report_service.rs

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    db::TicketRepository,
    models::{
        reports::{
            ClientReport, DashboardStats, DateRange, ProductBreakdown, ProductReport,
            RevenueReport, TechnicianReport,
        },
        ticket::{FilterOptions, ProductType, ServiceTicket, TicketStatus},
    },
};

/// Derives aggregate views by scanning the ticket collection on demand.
/// Holds no state of its own; every report is fully re-derivable at any
/// time. Empty collections and ranges yield zero counts and zero
/// averages, never an error.
#[derive(Clone)]
pub struct ReportService {
    tickets: TicketRepository,
}

// No real cost-of-goods field exists on a ticket; reports estimate it as
// a fixed 30% of revenue.
fn cost_estimate(cost: Decimal) -> Decimal {
    cost * Decimal::new(3, 1)
}

fn average(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(count as u64)
    }
}

impl ReportService {
    pub fn new(tickets: TicketRepository) -> Self {
        Self { tickets }
    }

    /// Revenue over *completed* tickets received in the range, with a
    /// per-product-type breakdown.
    pub async fn revenue_report(&self, start: NaiveDate, end: NaiveDate) -> RevenueReport {
        let completed: Vec<ServiceTicket> = self
            .in_range(start, end)
            .await
            .into_iter()
            .filter(|t| t.status == TicketStatus::Completed)
            .collect();

        let mut total_revenue = Decimal::ZERO;
        let mut total_cost = Decimal::ZERO;
        let mut by_product_type: BTreeMap<ProductType, ProductBreakdown> = BTreeMap::new();

        for ticket in &completed {
            let estimate = cost_estimate(ticket.cost);
            total_revenue += ticket.cost;
            total_cost += estimate;

            let entry = by_product_type.entry(ticket.product_type).or_default();
            entry.count += 1;
            entry.revenue += ticket.cost;
            entry.cost += estimate;
            entry.profit = entry.revenue - entry.cost;
        }

        RevenueReport {
            total_revenue,
            total_cost,
            total_profit: total_revenue - total_cost,
            ticket_count: completed.len(),
            average_ticket_value: average(total_revenue, completed.len()),
            date_range: DateRange { start, end },
            by_product_type,
        }
    }

    /// Workload per technician over *all* statuses in the range. Revenue
    /// here sums every ticket's cost regardless of status, unlike the
    /// revenue report. Sorted by total revenue, highest first.
    pub async fn technician_report(&self, start: NaiveDate, end: NaiveDate) -> Vec<TechnicianReport> {
        let mut groups: BTreeMap<String, Vec<ServiceTicket>> = BTreeMap::new();
        for ticket in self.in_range(start, end).await {
            groups
                .entry(ticket.technician_name.clone())
                .or_default()
                .push(ticket);
        }

        let mut reports: Vec<TechnicianReport> = groups
            .into_iter()
            .map(|(technician_name, tickets)| {
                let completed_count = tickets
                    .iter()
                    .filter(|t| t.status == TicketStatus::Completed)
                    .count();
                let pending_count = tickets.iter().filter(|t| t.status.is_open()).count();
                let total_revenue: Decimal = tickets.iter().map(|t| t.cost).sum();

                TechnicianReport {
                    technician_name,
                    ticket_count: tickets.len(),
                    completed_count,
                    pending_count,
                    completion_rate: ratio(completed_count, tickets.len()),
                    total_revenue,
                    average_ticket_value: average(total_revenue, tickets.len()),
                    date_range: DateRange { start, end },
                }
            })
            .collect();

        reports.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue));
        reports
    }

    /// Repair stats per product type in the range, sorted by repair
    /// count, highest first. The `failure_rate` field is the completed /
    /// total ratio (the historical wire name is misleading).
    pub async fn product_report(&self, start: NaiveDate, end: NaiveDate) -> Vec<ProductReport> {
        let mut groups: BTreeMap<ProductType, Vec<ServiceTicket>> = BTreeMap::new();
        for ticket in self.in_range(start, end).await {
            groups.entry(ticket.product_type).or_default().push(ticket);
        }

        let mut reports: Vec<ProductReport> = groups
            .into_iter()
            .map(|(product_type, tickets)| {
                let completed_count = tickets
                    .iter()
                    .filter(|t| t.status == TicketStatus::Completed)
                    .count();
                let total_revenue: Decimal = tickets.iter().map(|t| t.cost).sum();

                ProductReport {
                    product_type,
                    repair_count: tickets.len(),
                    failure_rate: ratio(completed_count, tickets.len()),
                    average_cost: average(total_revenue, tickets.len()),
                    total_revenue,
                    date_range: DateRange { start, end },
                }
            })
            .collect();

        reports.sort_by(|a, b| b.repair_count.cmp(&a.repair_count));
        reports
    }

    /// Whole-history view of one client, matched by exact
    /// case-insensitive name. `None` when the client has no tickets.
    pub async fn client_report(&self, client_name: &str) -> Option<ClientReport> {
        let needle = client_name.to_lowercase();
        let mut tickets: Vec<ServiceTicket> = self
            .tickets
            .list()
            .await
            .into_iter()
            .filter(|t| t.client_name.to_lowercase() == needle)
            .collect();

        if tickets.is_empty() {
            return None;
        }

        tickets.sort_by_key(|t| t.date_received);
        let first = tickets.first().expect("non-empty").clone();
        let last_service_date = tickets.last().expect("non-empty").date_received;
        let total_spent: Decimal = tickets.iter().map(|t| t.cost).sum();

        Some(ClientReport {
            client_name: first.client_name,
            client_phone: first.client_phone,
            client_email: first.client_email,
            ticket_count: tickets.len(),
            total_spent,
            first_service_date: first.date_received,
            last_service_date,
            average_ticket_value: average(total_spent, tickets.len()),
            tickets,
        })
    }

    /// Whole-collection counters, independent of any date filter.
    /// "Today" compares `dateReceived` against the server's local
    /// calendar day. Revenue sums completed tickets only; the average is
    /// taken over the whole collection.
    pub async fn dashboard_stats(&self) -> DashboardStats {
        let tickets = self.tickets.list().await;
        let today = chrono::Local::now().date_naive();

        let completed_tickets = tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Completed)
            .count();
        let pending_tickets = tickets.iter().filter(|t| t.status.is_open()).count();
        let today_tickets = tickets
            .iter()
            .filter(|t| t.date_received.with_timezone(&chrono::Local).date_naive() == today)
            .count();
        let total_revenue: Decimal = tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Completed)
            .map(|t| t.cost)
            .sum();

        DashboardStats {
            total_tickets: tickets.len(),
            completed_tickets,
            pending_tickets,
            today_tickets,
            total_revenue,
            average_ticket_value: average(total_revenue, tickets.len()),
        }
    }

    /// Sorted unique client names, for the UI's pickers.
    pub async fn client_names(&self) -> Vec<String> {
        let names: BTreeSet<String> = self
            .tickets
            .list()
            .await
            .into_iter()
            .map(|t| t.client_name)
            .collect();
        names.into_iter().collect()
    }

    /// Sorted unique technician names.
    pub async fn technician_names(&self) -> Vec<String> {
        let names: BTreeSet<String> = self
            .tickets
            .list()
            .await
            .into_iter()
            .map(|t| t.technician_name)
            .collect();
        names.into_iter().collect()
    }

    async fn in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<ServiceTicket> {
        self.tickets
            .filter(&FilterOptions {
                date_range_start: Some(start),
                date_range_end: Some(end),
                ..FilterOptions::default()
            })
            .await
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
