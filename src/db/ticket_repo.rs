// src/db/ticket_repo.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::record_store::{RecordStore, TICKETS_KEY},
    models::ticket::{FilterOptions, NewTicket, ServiceTicket, TicketPatch},
};

/// CRUD and filtering over the ticket collection, built on whole-blob
/// reads/writes of the tickets record.
///
/// Error policy (deliberately asymmetric): read or parse failures are
/// logged and the collection is treated as empty, so `list`/`get`/`filter`
/// never fail; write failures propagate to the caller. Not-found is a
/// `None`/`false` result, never an error.
///
/// Mutations are read-whole / modify / write-whole with no locking; the
/// last write wins. The app runs single-user on a single device.
#[derive(Clone)]
pub struct TicketRepository {
    store: RecordStore,
}

impl TicketRepository {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// The full collection; empty if never written or unreadable.
    pub async fn list(&self) -> Vec<ServiceTicket> {
        match self.load().await {
            Ok(tickets) => tickets,
            Err(e) => {
                tracing::error!("failed to read ticket collection: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<ServiceTicket> {
        self.list().await.into_iter().find(|t| t.id == id)
    }

    /// Assigns a fresh id, stamps both audit timestamps and persists the
    /// grown collection.
    pub async fn create(&self, input: NewTicket) -> Result<ServiceTicket, AppError> {
        let now = Utc::now();
        let ticket = ServiceTicket {
            id: Uuid::new_v4(),
            client_name: input.client_name,
            client_phone: input.client_phone,
            client_email: input.client_email,
            product_type: input.product_type,
            product_model: input.product_model,
            product_serial_number: input.product_serial_number,
            problem_description: input.problem_description,
            diagnostic: input.diagnostic,
            solution_applied: input.solution_applied,
            cost: input.cost,
            status: input.status,
            technician_name: input.technician_name,
            date_received: input.date_received,
            date_delivered: input.date_delivered,
            created_at: now,
            updated_at: now,
            telegram_sent: input.telegram_sent,
            telegram_message_id: input.telegram_message_id,
        };

        let mut tickets = self.list().await;
        tickets.push(ticket.clone());
        self.persist(&tickets).await?;

        Ok(ticket)
    }

    /// Merges `patch` over the stored ticket and refreshes `updated_at`.
    /// Returns `None` without writing when the id is unknown. `id` and
    /// `created_at` are not touchable through this path.
    pub async fn update(
        &self,
        id: Uuid,
        patch: TicketPatch,
    ) -> Result<Option<ServiceTicket>, AppError> {
        let mut tickets = self.list().await;
        let Some(ticket) = tickets.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };

        if let Some(v) = patch.client_name {
            ticket.client_name = v;
        }
        if let Some(v) = patch.client_phone {
            ticket.client_phone = v;
        }
        if let Some(v) = patch.client_email {
            ticket.client_email = v;
        }
        if let Some(v) = patch.product_type {
            ticket.product_type = v;
        }
        if let Some(v) = patch.product_model {
            ticket.product_model = v;
        }
        if let Some(v) = patch.product_serial_number {
            ticket.product_serial_number = v;
        }
        if let Some(v) = patch.problem_description {
            ticket.problem_description = v;
        }
        if let Some(v) = patch.diagnostic {
            ticket.diagnostic = v;
        }
        if let Some(v) = patch.solution_applied {
            ticket.solution_applied = v;
        }
        if let Some(v) = patch.cost {
            ticket.cost = v;
        }
        if let Some(v) = patch.status {
            ticket.status = v;
        }
        if let Some(v) = patch.technician_name {
            ticket.technician_name = v;
        }
        if let Some(v) = patch.date_received {
            ticket.date_received = v;
        }
        if let Some(v) = patch.date_delivered {
            ticket.date_delivered = v;
        }
        if let Some(v) = patch.telegram_sent {
            ticket.telegram_sent = v;
        }
        if let Some(v) = patch.telegram_message_id {
            ticket.telegram_message_id = v;
        }
        ticket.updated_at = Utc::now();

        let updated = ticket.clone();
        self.persist(&tickets).await?;

        Ok(Some(updated))
    }

    /// Removes the ticket; returns `false` without writing when nothing
    /// matched.
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let tickets = self.list().await;
        let before = tickets.len();
        let remaining: Vec<ServiceTicket> = tickets.into_iter().filter(|t| t.id != id).collect();

        if remaining.len() == before {
            tracing::warn!("ticket not found for deletion: {}", id);
            return Ok(false);
        }

        self.persist(&remaining).await?;
        Ok(true)
    }

    /// ANDed in-memory filtering; see [`FilterOptions`] for the matching
    /// rules of each criterion.
    pub async fn filter(&self, options: &FilterOptions) -> Vec<ServiceTicket> {
        let mut tickets = self.list().await;

        if let Some(name) = &options.client_name {
            let needle = name.to_lowercase();
            tickets.retain(|t| t.client_name.to_lowercase().contains(&needle));
        }
        if let Some(product_type) = options.product_type {
            tickets.retain(|t| t.product_type == product_type);
        }
        if let Some(status) = options.status {
            tickets.retain(|t| t.status == status);
        }
        if let Some(name) = &options.technician_name {
            let needle = name.to_lowercase();
            tickets.retain(|t| t.technician_name.to_lowercase().contains(&needle));
        }
        if let (Some(start), Some(end)) = (options.date_range_start, options.date_range_end) {
            tickets.retain(|t| {
                let day = t.date_received.date_naive();
                day >= start && day <= end
            });
        }

        tickets
    }

    /// Records a successful post to the Telegram group.
    pub async fn mark_telegram_sent(
        &self,
        id: Uuid,
        message_id: Option<String>,
    ) -> Result<bool, AppError> {
        let patch = TicketPatch {
            telegram_sent: Some(true),
            telegram_message_id: Some(message_id),
            ..TicketPatch::default()
        };
        Ok(self.update(id, patch).await?.is_some())
    }

    /// Drops the whole collection (used by the data wipe).
    pub async fn clear(&self) -> Result<(), AppError> {
        self.store.remove(TICKETS_KEY).await
    }

    async fn load(&self) -> Result<Vec<ServiceTicket>, AppError> {
        match self.store.read(TICKETS_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn persist(&self, tickets: &[ServiceTicket]) -> Result<(), AppError> {
        let raw = serde_json::to_string(tickets)?;
        self.store.write(TICKETS_KEY, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::ticket::{ProductType, TicketStatus};

    async fn repo() -> TicketRepository {
        TicketRepository::new(RecordStore::new(crate::db::test_pool().await))
    }

    fn new_ticket(client: &str, product: ProductType, cost: i64) -> NewTicket {
        NewTicket {
            client_name: client.to_string(),
            client_phone: "0722111222".to_string(),
            client_email: String::new(),
            product_type: product,
            product_model: "Dell XPS".to_string(),
            product_serial_number: String::new(),
            problem_description: "nu pornește".to_string(),
            diagnostic: String::new(),
            solution_applied: String::new(),
            cost: Decimal::from(cost),
            status: TicketStatus::Pending,
            technician_name: "Ion".to_string(),
            date_received: Utc.with_ymd_and_hms(2025, 3, 10, 9, 30, 0).unwrap(),
            date_delivered: None,
            telegram_sent: false,
            telegram_message_id: None,
        }
    }

    #[tokio::test]
    async fn list_is_empty_before_first_write() {
        assert!(repo().await.list().await.is_empty());
    }

    #[tokio::test]
    async fn create_then_get_returns_equal_record() {
        let repo = repo().await;
        let created = repo
            .create(new_ticket("Ana Pop", ProductType::Laptop, 250))
            .await
            .unwrap();

        let fetched = repo.get(created.id).await.expect("ticket present");
        assert_eq!(fetched.client_name, "Ana Pop");
        assert_eq!(fetched.cost, Decimal::from(250));
        assert_eq!(fetched.created_at, created.created_at);
        assert_eq!(fetched.created_at, fetched.updated_at);
        assert_eq!(repo.list().await.len(), 1);
    }

    #[tokio::test]
    async fn update_merges_and_keeps_identity() {
        let repo = repo().await;
        let created = repo
            .create(new_ticket("Ana Pop", ProductType::Laptop, 250))
            .await
            .unwrap();

        let patch = TicketPatch {
            status: Some(TicketStatus::Completed),
            diagnostic: Some("placă de bază".to_string()),
            ..TicketPatch::default()
        };
        let updated = repo.update(created.id, patch).await.unwrap().unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.status, TicketStatus::Completed);
        assert_eq!(updated.diagnostic, "placă de bază");
        // untouched fields survive the merge
        assert_eq!(updated.client_name, "Ana Pop");
        assert_eq!(updated.cost, Decimal::from(250));
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn update_unknown_id_returns_none() {
        let repo = repo().await;
        let patch = TicketPatch::default();
        assert!(repo.update(Uuid::new_v4(), patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn patch_can_clear_delivery_date() {
        let repo = repo().await;
        let mut input = new_ticket("Ana Pop", ProductType::Laptop, 250);
        input.date_delivered = Some(Utc::now());
        let created = repo.create(input).await.unwrap();

        let patch: TicketPatch =
            serde_json::from_str(r#"{ "dateDelivered": null }"#).unwrap();
        let updated = repo.update(created.id, patch).await.unwrap().unwrap();
        assert!(updated.date_delivered.is_none());

        // an absent field leaves the stored value alone
        let patch: TicketPatch = serde_json::from_str(r#"{ "cost": 80 }"#).unwrap();
        let updated = repo.update(created.id, patch).await.unwrap().unwrap();
        assert!(updated.date_delivered.is_none());
        assert_eq!(updated.cost, Decimal::from(80));
    }

    #[tokio::test]
    async fn delete_is_idempotent_safe() {
        let repo = repo().await;
        let created = repo
            .create(new_ticket("Ana Pop", ProductType::Laptop, 250))
            .await
            .unwrap();
        repo.create(new_ticket("Dan Ile", ProductType::Phone, 90))
            .await
            .unwrap();

        assert!(!repo.delete(Uuid::new_v4()).await.unwrap());
        assert_eq!(repo.list().await.len(), 2);

        assert!(repo.delete(created.id).await.unwrap());
        assert_eq!(repo.list().await.len(), 1);
        assert!(!repo.delete(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn filter_is_conjunctive_and_empty_filter_lists_all() {
        let repo = repo().await;
        let laptop = repo
            .create(new_ticket("Ana Pop", ProductType::Laptop, 250))
            .await
            .unwrap();
        repo.update(
            laptop.id,
            TicketPatch {
                status: Some(TicketStatus::Completed),
                ..TicketPatch::default()
            },
        )
        .await
        .unwrap();
        repo.create(new_ticket("Ana Maria", ProductType::Laptop, 120))
            .await
            .unwrap();
        repo.create(new_ticket("Dan Ile", ProductType::Phone, 90))
            .await
            .unwrap();

        let both = repo
            .filter(&FilterOptions {
                status: Some(TicketStatus::Completed),
                product_type: Some(ProductType::Laptop),
                ..FilterOptions::default()
            })
            .await;
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].id, laptop.id);

        // substring match on the client name is case-insensitive
        let anas = repo
            .filter(&FilterOptions {
                client_name: Some("ana".to_string()),
                ..FilterOptions::default()
            })
            .await;
        assert_eq!(anas.len(), 2);

        let all = repo.filter(&FilterOptions::default()).await;
        assert_eq!(all.len(), repo.list().await.len());
    }

    #[tokio::test]
    async fn filter_date_range_is_inclusive_by_calendar_day() {
        let repo = repo().await;
        repo.create(new_ticket("Ana Pop", ProductType::Laptop, 250))
            .await
            .unwrap();

        let day = chrono::NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let hit = repo
            .filter(&FilterOptions {
                date_range_start: Some(day),
                date_range_end: Some(day),
                ..FilterOptions::default()
            })
            .await;
        assert_eq!(hit.len(), 1);

        // a single bound is a no-op
        let unbounded = repo
            .filter(&FilterOptions {
                date_range_start: Some(day),
                ..FilterOptions::default()
            })
            .await;
        assert_eq!(unbounded.len(), 1);

        let miss = repo
            .filter(&FilterOptions {
                date_range_start: Some(day.succ_opt().unwrap()),
                date_range_end: Some(day.succ_opt().unwrap()),
                ..FilterOptions::default()
            })
            .await;
        assert!(miss.is_empty());
    }

    #[tokio::test]
    async fn mark_telegram_sent_records_message_id() {
        let repo = repo().await;
        let created = repo
            .create(new_ticket("Ana Pop", ProductType::Laptop, 250))
            .await
            .unwrap();

        assert!(repo
            .mark_telegram_sent(created.id, Some("42".to_string()))
            .await
            .unwrap());
        let ticket = repo.get(created.id).await.unwrap();
        assert!(ticket.telegram_sent);
        assert_eq!(ticket.telegram_message_id.as_deref(), Some("42"));

        assert!(!repo
            .mark_telegram_sent(Uuid::new_v4(), None)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn unreadable_collection_is_treated_as_empty() {
        let store = RecordStore::new(crate::db::test_pool().await);
        store.write(TICKETS_KEY, "not json at all").await.unwrap();
        let repo = TicketRepository::new(store);
        assert!(repo.list().await.is_empty());
    }
}
