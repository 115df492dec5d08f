pub mod record_store;
pub use record_store::RecordStore;
pub mod ticket_repo;
pub use ticket_repo::TicketRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;

/// In-memory SQLite pool with migrations applied, shared by the unit
/// tests. A single connection keeps every test on the same `:memory:`
/// database.
#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    sqlx::migrate!().run(&pool).await.expect("migrations");
    pool
}
