//! Entry store boundary
//!
//! Defines the behavioral contract a persistent entry store must satisfy
//! (any transport is acceptable), plus the in-process default
//! implementation used by the server and by tests.

use async_trait::async_trait;
use std::sync::Arc;

pub mod error;
pub mod memory;
pub mod models;
pub mod retry;

pub use error::{StoreError, StoreErrorCode, StoreResult};
pub use memory::MemoryStore;
pub use retry::{with_retry, RetryPolicy};

// Re-export commonly used types
pub use models::{
    DeletedEntry, Entry, EntryFilter, EntryPatch, EntryStatus, NewEntry, PaymentMode,
};

/// Store reference type
pub type StoreRef = Arc<dyn EntryStore>;

/// Behavioral contract of the persistent entry store.
///
/// Implementations must serialize mutations on a single entry id: of two
/// racing transitions, the second observes the first's resulting state
/// (via the `expected_status` guard on [`EntryPatch`]) and fails.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Insert a new entry; the store assigns id, sequence number and
    /// creation timestamp, and the entry starts out pending
    async fn insert(&self, new: NewEntry) -> StoreResult<Entry>;

    /// Fetch a live entry. Soft-deleted ids report `NotFound` here
    /// (they are visible through [`EntryStore::get_deleted`]); purged ids
    /// report `Gone`
    async fn get_by_id(&self, id: &str) -> StoreResult<Entry>;

    /// Apply a partial update to a live entry
    async fn update(&self, id: &str, patch: EntryPatch) -> StoreResult<Entry>;

    /// List live entries matching the filter, ordered by transaction date
    /// then sequence number, with the total match count before paging
    async fn list_by_filter(
        &self,
        filter: &EntryFilter,
        limit: usize,
        offset: usize,
    ) -> StoreResult<(Vec<Entry>, usize)>;

    /// Move a live entry into the deleted shadow set
    async fn soft_delete(&self, id: &str, by: &str) -> StoreResult<DeletedEntry>;

    /// Fetch the deleted shadow for an id
    async fn get_deleted(&self, id: &str) -> StoreResult<DeletedEntry>;

    /// List deleted shadows matching the filter, most recent deletion first
    async fn list_deleted(&self, filter: &EntryFilter) -> StoreResult<Vec<DeletedEntry>>;

    /// Move a shadow back into the live set as pending, clearing the
    /// deletion fields; the original id and data are preserved
    async fn restore(&self, id: &str) -> StoreResult<Entry>;

    /// Permanently remove a shadow. Irreversible; the id is remembered so
    /// later operations can distinguish purged from never-existed
    async fn purge(&self, id: &str) -> StoreResult<()>;

    /// Idempotent reference upserts; an already-present row reports
    /// `Duplicate`, which callers may swallow
    async fn upsert_company(&self, name: &str) -> StoreResult<()>;
    async fn upsert_account(&self, company: &str, account: &str) -> StoreResult<()>;
    async fn upsert_sub_account(
        &self,
        company: &str,
        account: &str,
        sub_account: &str,
    ) -> StoreResult<()>;

    /// All known companies, sorted
    async fn companies(&self) -> StoreResult<Vec<String>>;

    /// Accounts observed for a company (or all accounts when `None`), sorted
    async fn accounts_for(&self, company: Option<&str>) -> StoreResult<Vec<String>>;

    /// Sub-accounts observed for a company/account selection, sorted
    async fn sub_accounts_for(
        &self,
        company: Option<&str>,
        account: Option<&str>,
    ) -> StoreResult<Vec<String>>;
}
