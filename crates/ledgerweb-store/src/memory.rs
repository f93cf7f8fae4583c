//! In-memory entry store
//!
//! The default store implementation: all tables live behind a single
//! `RwLock`, so every mutation holds the write lock and transitions on
//! one entry id are serialized. A transition that loses a race observes
//! the winner's resulting state and fails its `expected_status` guard.

use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::models::{DeletedEntry, Entry, EntryFilter, EntryPatch, EntryStatus, NewEntry};
use crate::EntryStore;

#[derive(Default)]
struct Tables {
    entries: HashMap<String, Entry>,
    deleted: HashMap<String, DeletedEntry>,
    purged: HashSet<String>,
    companies: BTreeSet<String>,
    accounts: BTreeSet<(String, String)>,
    sub_accounts: BTreeSet<(String, String, String)>,
    next_sequence: u64,
}

impl Tables {
    /// NotFound for unknown or soft-deleted ids, Gone for purged ids
    fn missing_live(&self, id: &str) -> StoreError {
        if self.purged.contains(id) {
            StoreError::Gone { id: id.to_string() }
        } else {
            StoreError::NotFound { id: id.to_string() }
        }
    }
}

/// In-memory implementation of [`EntryStore`]
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| {
        a.transaction_date
            .cmp(&b.transaction_date)
            .then(a.sequence_number.cmp(&b.sequence_number))
    });
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn insert(&self, new: NewEntry) -> StoreResult<Entry> {
        let mut tables = self.tables.write().await;
        tables.next_sequence += 1;
        let sequence = tables.next_sequence;

        let content = format!(
            "{}|{}|{}|{}|{}",
            new.company_name, new.account_name, new.transaction_date, new.credit_amount, new.debit_amount
        );
        let id = ledgerweb_utils::generate_entry_id(sequence, &content);

        let entry = Entry {
            id: id.clone(),
            sequence_number: sequence,
            company_name: new.company_name,
            account_name: new.account_name,
            sub_account_name: new.sub_account_name.filter(|s| !s.is_empty()),
            staff: new.staff,
            entered_by: new.entered_by,
            credit_amount: new.credit_amount,
            debit_amount: new.debit_amount,
            sale_quantity: new.sale_quantity,
            purchase_quantity: new.purchase_quantity,
            payment_mode: new.payment_mode,
            transaction_date: new.transaction_date,
            entry_timestamp: Utc::now(),
            status: EntryStatus::Pending,
            edited: false,
            edit_count: 0,
            locked: false,
            particulars: new.particulars,
        };

        tables.entries.insert(id, entry.clone());
        log::debug!(target: "ledgerweb::store", "inserted entry {} (seq {})", entry.id, sequence);
        Ok(entry)
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Entry> {
        let tables = self.tables.read().await;
        tables
            .entries
            .get(id)
            .cloned()
            .ok_or_else(|| tables.missing_live(id))
    }

    async fn update(&self, id: &str, patch: EntryPatch) -> StoreResult<Entry> {
        let mut tables = self.tables.write().await;
        if tables.purged.contains(id) {
            return Err(StoreError::Gone { id: id.to_string() });
        }
        let entry = tables
            .entries
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        if let Some(expected) = patch.expected_status {
            if entry.status != expected {
                return Err(StoreError::Conflict {
                    id: id.to_string(),
                    message: format!("expected status {}, found {}", expected, entry.status),
                });
            }
        }

        patch.apply_to(entry);
        Ok(entry.clone())
    }

    async fn list_by_filter(
        &self,
        filter: &EntryFilter,
        limit: usize,
        offset: usize,
    ) -> StoreResult<(Vec<Entry>, usize)> {
        let tables = self.tables.read().await;
        let mut matched: Vec<Entry> = tables
            .entries
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        sort_entries(&mut matched);

        let total = matched.len();
        let page = matched.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }

    async fn soft_delete(&self, id: &str, by: &str) -> StoreResult<DeletedEntry> {
        let mut tables = self.tables.write().await;
        if tables.purged.contains(id) {
            return Err(StoreError::Gone { id: id.to_string() });
        }
        if tables.deleted.contains_key(id) {
            return Err(StoreError::Conflict {
                id: id.to_string(),
                message: "already pending deletion".to_string(),
            });
        }
        let mut entry = tables
            .entries
            .remove(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        entry.status = EntryStatus::DeletedPending;

        let shadow = DeletedEntry {
            entry,
            deleted_by: by.to_string(),
            deleted_at: Utc::now(),
        };
        tables.deleted.insert(id.to_string(), shadow.clone());
        log::debug!(target: "ledgerweb::store", "soft-deleted entry {} by {}", id, by);
        Ok(shadow)
    }

    async fn get_deleted(&self, id: &str) -> StoreResult<DeletedEntry> {
        let tables = self.tables.read().await;
        if let Some(shadow) = tables.deleted.get(id) {
            return Ok(shadow.clone());
        }
        if tables.purged.contains(id) {
            return Err(StoreError::Gone { id: id.to_string() });
        }
        Err(StoreError::NotFound { id: id.to_string() })
    }

    async fn list_deleted(&self, filter: &EntryFilter) -> StoreResult<Vec<DeletedEntry>> {
        let tables = self.tables.read().await;
        let mut matched: Vec<DeletedEntry> = tables
            .deleted
            .values()
            .filter(|d| filter.matches(&d.entry))
            .cloned()
            .collect();
        // Most recent deletion first; sequence breaks ties deterministically
        matched.sort_by(|a, b| {
            b.deleted_at
                .cmp(&a.deleted_at)
                .then(b.entry.sequence_number.cmp(&a.entry.sequence_number))
        });
        Ok(matched)
    }

    async fn restore(&self, id: &str) -> StoreResult<Entry> {
        let mut tables = self.tables.write().await;
        if tables.purged.contains(id) {
            return Err(StoreError::Gone { id: id.to_string() });
        }
        let shadow = tables
            .deleted
            .remove(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        let mut entry = shadow.entry;
        entry.status = EntryStatus::Pending;
        tables.entries.insert(id.to_string(), entry.clone());
        log::debug!(target: "ledgerweb::store", "restored entry {}", id);
        Ok(entry)
    }

    async fn purge(&self, id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.purged.contains(id) {
            return Err(StoreError::Gone { id: id.to_string() });
        }
        if tables.deleted.remove(id).is_none() {
            if tables.entries.contains_key(id) {
                return Err(StoreError::Conflict {
                    id: id.to_string(),
                    message: "entry is live, not pending deletion".to_string(),
                });
            }
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        // Remove any remaining original row as well
        tables.entries.remove(id);
        tables.purged.insert(id.to_string());
        log::debug!(target: "ledgerweb::store", "purged entry {}", id);
        Ok(())
    }

    async fn upsert_company(&self, name: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.companies.insert(name.to_string()) {
            return Err(StoreError::Duplicate { what: format!("company {}", name) });
        }
        Ok(())
    }

    async fn upsert_account(&self, company: &str, account: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.accounts.insert((company.to_string(), account.to_string())) {
            return Err(StoreError::Duplicate {
                what: format!("account {}/{}", company, account),
            });
        }
        Ok(())
    }

    async fn upsert_sub_account(
        &self,
        company: &str,
        account: &str,
        sub_account: &str,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let key = (company.to_string(), account.to_string(), sub_account.to_string());
        if !tables.sub_accounts.insert(key) {
            return Err(StoreError::Duplicate {
                what: format!("sub-account {}/{}/{}", company, account, sub_account),
            });
        }
        Ok(())
    }

    async fn companies(&self) -> StoreResult<Vec<String>> {
        let tables = self.tables.read().await;
        Ok(tables.companies.iter().cloned().collect())
    }

    async fn accounts_for(&self, company: Option<&str>) -> StoreResult<Vec<String>> {
        let tables = self.tables.read().await;
        let mut names: Vec<String> = tables
            .accounts
            .iter()
            .filter(|(c, _)| company.map(|sel| sel == c).unwrap_or(true))
            .map(|(_, a)| a.clone())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn sub_accounts_for(
        &self,
        company: Option<&str>,
        account: Option<&str>,
    ) -> StoreResult<Vec<String>> {
        let tables = self.tables.read().await;
        let mut names: Vec<String> = tables
            .sub_accounts
            .iter()
            .filter(|(c, a, _)| {
                company.map(|sel| sel == c).unwrap_or(true)
                    && account.map(|sel| sel == a).unwrap_or(true)
            })
            .map(|(_, _, s)| s.clone())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }
}

// ==================== Tests ====================
