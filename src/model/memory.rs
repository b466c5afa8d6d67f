use std::{
    collections::{hash_map::Entry, HashMap},
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{InsertOutcome, StoreError, StoreResult, WaitlistEntry, WaitlistStore};

/// An in-process `WaitlistStore` keyed by email.
///
/// Used to exercise the handlers without a database. It can be switched into an
/// unavailable state to simulate a store outage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, WaitlistEntry>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every following call fails with `StoreError::Unavailable` while this is set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(None));
        }
        Ok(())
    }
}

#[async_trait]
impl WaitlistStore for MemoryStore {
    async fn insert_if_absent(&self, entry: WaitlistEntry) -> StoreResult<InsertOutcome> {
        self.check_available()?;

        let mut entries = self.entries.lock().await;
        match entries.entry(entry.email.clone()) {
            Entry::Occupied(_) => Ok(InsertOutcome::AlreadyPresent),
            Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<WaitlistEntry>> {
        self.check_available()?;
        Ok(self.entries.lock().await.get(email).cloned())
    }

    async fn count(&self) -> StoreResult<i64> {
        self.check_available()?;
        Ok(self.entries.lock().await.len() as i64)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }
}
