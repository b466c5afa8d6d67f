//! The waiting list model and the `WaitlistStore` seam every handler talks to.
//!
//! Handlers never see a concrete database. They get an `Arc<dyn WaitlistStore>` through the
//! `AppState`, so the production `DbManager` and the in-process `MemoryStore` are interchangeable.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

// ###################################
// ->   STRUCTS
// ###################################
/// A single sign-up on the waiting list. Entries are write-once.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct WaitlistEntry {
    pub id: Uuid,
    /// Unique key, stored exactly as submitted.
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WaitlistEntry {
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        WaitlistEntry {
            id: Uuid::new_v4(),
            email: email.into(),
            name,
            created_at: Utc::now(),
        }
    }
}

/// What happened to an `insert_if_absent` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyPresent,
}

// ###################################
// ->   STORE
// ###################################
#[async_trait]
pub trait WaitlistStore: Send + Sync + 'static {
    /// Stores `entry` unless an entry with the same email already exists.
    /// The existence check and the insert happen as one atomic operation.
    async fn insert_if_absent(&self, entry: WaitlistEntry) -> StoreResult<InsertOutcome>;

    /// `Ok(None)` means no such entry, `Err` means the lookup itself failed.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<WaitlistEntry>>;

    async fn count(&self) -> StoreResult<i64>;

    async fn ping(&self) -> StoreResult<()>;

    /// Releases the underlying connections. Called once on shutdown.
    async fn close(&self) {}
}

// ###################################
// ->   ERROR
// ###################################
pub type StoreResult<T> = core::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached: connection or pool failures, or a simulated outage.
    #[error("store is unavailable")]
    Unavailable(#[source] Option<sqlx::Error>),
    /// The backend was reached but the query itself failed.
    #[error("query failed: {0}")]
    QueryFailed(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(er: sqlx::Error) -> Self {
        match er {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(Some(er)),
            er => StoreError::QueryFailed(er),
        }
    }
}
