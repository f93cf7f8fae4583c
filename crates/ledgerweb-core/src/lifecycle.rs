//! Entry lifecycle state machine
//!
//! Legal transitions:
//!
//! ```text
//! create ─▶ pending ─▶ approved ──┐
//!              │  ▲        │      │
//!              │  └─ rejected ◀───┘
//!              ▼
//!        deleted_pending ─▶ purged (terminal)
//!              │
//!              └─▶ pending (restore / deletion rejected)
//! ```
//!
//! Every mutating transition reports which aggregates it made stale.
//! Approval-class transitions are admin-gated; edit and soft-delete are
//! open to ordinary users. Bulk variants apply the single-entry
//! transition independently per id and never let one failure block
//! another.

use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    BulkFailure, BulkOutcome, DeletionOutcome, MutationOutcome, Role, StaleAggregates,
};
use crate::Ledger;
use ledgerweb_store::{
    with_retry, Entry, EntryFilter, EntryPatch, EntryStatus, NewEntry, StoreError,
};

fn validate_amount(name: &str, value: Decimal) -> LedgerResult<()> {
    if value < Decimal::ZERO {
        return Err(LedgerError::Validation {
            message: format!("{} must be non-negative, got {}", name, value),
        });
    }
    Ok(())
}

fn validate_new_entry(new: &NewEntry) -> LedgerResult<()> {
    if new.company_name.trim().is_empty() {
        return Err(LedgerError::Validation { message: "company name is required".to_string() });
    }
    if new.account_name.trim().is_empty() {
        return Err(LedgerError::Validation { message: "account name is required".to_string() });
    }
    validate_amount("credit amount", new.credit_amount)?;
    validate_amount("debit amount", new.debit_amount)?;
    validate_amount("sale quantity", new.sale_quantity)?;
    validate_amount("purchase quantity", new.purchase_quantity)?;
    Ok(())
}

fn validate_update(update: &EntryPatch) -> LedgerResult<()> {
    if let Some(ref company) = update.company_name {
        if company.trim().is_empty() {
            return Err(LedgerError::Validation { message: "company name cannot be cleared".to_string() });
        }
    }
    if let Some(ref account) = update.account_name {
        if account.trim().is_empty() {
            return Err(LedgerError::Validation { message: "account name cannot be cleared".to_string() });
        }
    }
    if let Some(credit) = update.credit_amount {
        validate_amount("credit amount", credit)?;
    }
    if let Some(debit) = update.debit_amount {
        validate_amount("debit amount", debit)?;
    }
    if let Some(qty) = update.sale_quantity {
        validate_amount("sale quantity", qty)?;
    }
    if let Some(qty) = update.purchase_quantity {
        validate_amount("purchase quantity", qty)?;
    }
    Ok(())
}

impl Ledger {
    fn require_admin(&self, role: Role, operation: &str) -> LedgerResult<()> {
        if role.is_admin() {
            Ok(())
        } else {
            Err(LedgerError::Permission {
                role: role.to_string(),
                operation: operation.to_string(),
            })
        }
    }

    /// Fetch a live entry for a transition, classifying the miss:
    /// a deleted shadow or a purged id is an illegal source state,
    /// anything else is unknown.
    async fn fetch_for_transition(&self, id: &str, operation: &str) -> LedgerResult<Entry> {
        let result = with_retry(&self.retry, operation, || self.store.get_by_id(id)).await;
        match result {
            Ok(entry) => Ok(entry),
            Err(StoreError::Gone { id }) => Err(LedgerError::InvalidState {
                id,
                status: EntryStatus::Purged.to_string(),
                operation: operation.to_string(),
            }),
            Err(StoreError::NotFound { id }) => match self.store.get_deleted(&id).await {
                Ok(_) => Err(LedgerError::InvalidState {
                    id,
                    status: EntryStatus::DeletedPending.to_string(),
                    operation: operation.to_string(),
                }),
                Err(StoreError::Gone { id }) => Err(LedgerError::InvalidState {
                    id,
                    status: EntryStatus::Purged.to_string(),
                    operation: operation.to_string(),
                }),
                Err(_) => Err(LedgerError::NotFound { id }),
            },
            Err(err) => Err(err.into()),
        }
    }

    /// Fetch the deleted shadow for a deletion-queue transition
    async fn fetch_shadow(&self, id: &str, operation: &str) -> LedgerResult<ledgerweb_store::DeletedEntry> {
        let result = with_retry(&self.retry, operation, || self.store.get_deleted(id)).await;
        match result {
            Ok(shadow) => Ok(shadow),
            Err(StoreError::Gone { id }) => Err(LedgerError::InvalidState {
                id,
                status: EntryStatus::Purged.to_string(),
                operation: operation.to_string(),
            }),
            Err(StoreError::NotFound { id }) => match self.store.get_by_id(&id).await {
                Ok(entry) => Err(LedgerError::InvalidState {
                    id,
                    status: entry.status.to_string(),
                    operation: operation.to_string(),
                }),
                Err(_) => Err(LedgerError::NotFound { id }),
            },
            Err(err) => Err(err.into()),
        }
    }

    /// Apply a patch through the store, mapping a lost conditional-update
    /// race to an invalid-state error for this operation
    async fn apply_patch(
        &self,
        id: &str,
        patch: EntryPatch,
        operation: &str,
    ) -> LedgerResult<Entry> {
        let result =
            with_retry(&self.retry, operation, || self.store.update(id, patch.clone())).await;
        match result {
            Ok(entry) => Ok(entry),
            Err(StoreError::Conflict { id, message }) => Err(LedgerError::InvalidState {
                id,
                status: message,
                operation: operation.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Upsert the reference rows for a classification, swallowing
    /// duplicate-exists failures
    async fn ensure_references(
        &self,
        company: &str,
        account: &str,
        sub_account: Option<&str>,
    ) -> LedgerResult<()> {
        match self.store.upsert_company(company).await {
            Ok(()) | Err(StoreError::Duplicate { .. }) => {}
            Err(err) => return Err(err.into()),
        }
        match self.store.upsert_account(company, account).await {
            Ok(()) | Err(StoreError::Duplicate { .. }) => {}
            Err(err) => return Err(err.into()),
        }
        if let Some(sub) = sub_account.filter(|s| !s.is_empty()) {
            match self.store.upsert_sub_account(company, account, sub).await {
                Ok(()) | Err(StoreError::Duplicate { .. }) => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    // ==================== Single-entry transitions ====================

    /// Create a new entry; it starts out pending review
    pub async fn create(&self, new: NewEntry) -> LedgerResult<MutationOutcome> {
        validate_new_entry(&new)?;
        self.ensure_references(
            &new.company_name,
            &new.account_name,
            new.sub_account_name.as_deref(),
        )
        .await?;

        let entry =
            with_retry(&self.retry, "insert entry", || self.store.insert(new.clone())).await?;
        log::info!(
            target: "ledgerweb::lifecycle",
            "created entry {} for {} / {}",
            entry.id,
            entry.company_name,
            entry.account_name
        );
        Ok(MutationOutcome { stale: StaleAggregates::for_entry(&entry), entry })
    }

    /// Edit a live, unlocked entry. Bumps the audit counter and leaves
    /// the approval state untouched; reverting an approval is a separate,
    /// explicit operator action.
    pub async fn edit(&self, id: &str, update: EntryPatch) -> LedgerResult<MutationOutcome> {
        validate_update(&update)?;
        let entry = self.fetch_for_transition(id, "edit").await?;
        if entry.locked {
            return Err(LedgerError::LockedRecord { id: id.to_string() });
        }

        // Keep the reference catalogs in step with a reclassification
        let company = update.company_name.as_deref().unwrap_or(&entry.company_name);
        let account = update.account_name.as_deref().unwrap_or(&entry.account_name);
        let sub = update
            .sub_account_name
            .as_deref()
            .or(entry.sub_account_name.as_deref());
        self.ensure_references(company, account, sub).await?;

        let patch = EntryPatch {
            status: None,
            locked: None,
            register_edit: true,
            expected_status: Some(entry.status),
            ..update
        };
        let updated = self.apply_patch(id, patch, "edit").await?;

        // Both the old and the new classification are now stale
        let mut stale = StaleAggregates::for_entry(&entry);
        stale.merge(StaleAggregates::for_entry(&updated));
        Ok(MutationOutcome { entry: updated, stale })
    }

    /// Approve a pending (or previously rejected) entry. Approving an
    /// already-approved entry is a no-op.
    pub async fn approve(&self, id: &str, role: Role) -> LedgerResult<MutationOutcome> {
        self.require_admin(role, "approve")?;
        self.approve_one(id).await
    }

    async fn approve_one(&self, id: &str) -> LedgerResult<MutationOutcome> {
        let entry = self.fetch_for_transition(id, "approve").await?;
        match entry.status {
            EntryStatus::Approved => {
                Ok(MutationOutcome { stale: StaleAggregates::default(), entry })
            }
            EntryStatus::Pending | EntryStatus::Rejected => {
                let patch = EntryPatch::status_transition(entry.status, EntryStatus::Approved);
                let updated = self.apply_patch(id, patch, "approve").await?;
                Ok(MutationOutcome { stale: StaleAggregates::for_entry(&updated), entry: updated })
            }
            other => Err(LedgerError::InvalidState {
                id: id.to_string(),
                status: other.to_string(),
                operation: "approve".to_string(),
            }),
        }
    }

    /// Reject a pending entry, or reverse an earlier approval
    pub async fn reject(&self, id: &str, role: Role) -> LedgerResult<MutationOutcome> {
        self.require_admin(role, "reject")?;
        let entry = self.fetch_for_transition(id, "reject").await?;
        match entry.status {
            EntryStatus::Rejected => {
                Ok(MutationOutcome { stale: StaleAggregates::default(), entry })
            }
            EntryStatus::Pending | EntryStatus::Approved => {
                let patch = EntryPatch::status_transition(entry.status, EntryStatus::Rejected);
                let updated = self.apply_patch(id, patch, "reject").await?;
                Ok(MutationOutcome { stale: StaleAggregates::for_entry(&updated), entry: updated })
            }
            other => Err(LedgerError::InvalidState {
                id: id.to_string(),
                status: other.to_string(),
                operation: "reject".to_string(),
            }),
        }
    }

    /// Lock or unlock an entry. Administrative override: a locked entry
    /// rejects ordinary edits until unlocked.
    pub async fn set_locked(
        &self,
        id: &str,
        locked: bool,
        role: Role,
    ) -> LedgerResult<MutationOutcome> {
        self.require_admin(role, "lock")?;
        let entry = self.fetch_for_transition(id, "lock").await?;
        let patch = EntryPatch {
            locked: Some(locked),
            expected_status: Some(entry.status),
            ..Default::default()
        };
        let updated = self.apply_patch(id, patch, "lock").await?;
        Ok(MutationOutcome { stale: StaleAggregates::default(), entry: updated })
    }

    /// Soft-delete: move the entry into the deletion queue. The record is
    /// retained in full for restoration; nothing is destroyed here.
    pub async fn soft_delete(&self, id: &str, by: &str) -> LedgerResult<DeletionOutcome> {
        let result = with_retry(&self.retry, "soft delete", || self.store.soft_delete(id, by)).await;
        let shadow = match result {
            Ok(shadow) => shadow,
            Err(StoreError::Conflict { id, .. }) => {
                return Err(LedgerError::InvalidState {
                    id,
                    status: EntryStatus::DeletedPending.to_string(),
                    operation: "soft delete".to_string(),
                })
            }
            Err(StoreError::Gone { id }) => {
                return Err(LedgerError::InvalidState {
                    id,
                    status: EntryStatus::Purged.to_string(),
                    operation: "soft delete".to_string(),
                })
            }
            Err(err) => return Err(err.into()),
        };
        log::info!(
            target: "ledgerweb::lifecycle",
            "entry {} moved to deletion queue by {}",
            id,
            by
        );
        Ok(DeletionOutcome { stale: StaleAggregates::for_entry(&shadow.entry), deleted: shadow })
    }

    /// Approve a pending deletion: permanently purge the entry
    pub async fn approve_deletion(&self, id: &str, role: Role) -> LedgerResult<StaleAggregates> {
        self.require_admin(role, "approve deletion")?;
        self.purge_shadow(id, "approve deletion").await
    }

    /// Administrative direct purge, bypassing the deletion queue review
    pub async fn purge(&self, id: &str, role: Role) -> LedgerResult<StaleAggregates> {
        self.require_admin(role, "purge")?;
        self.purge_shadow(id, "purge").await
    }

    async fn purge_shadow(&self, id: &str, operation: &str) -> LedgerResult<StaleAggregates> {
        let shadow = self.fetch_shadow(id, operation).await?;
        with_retry(&self.retry, operation, || self.store.purge(id))
            .await
            .map_err(|err| match err {
                StoreError::Conflict { id, message } => LedgerError::InvalidState {
                    id,
                    status: message,
                    operation: operation.to_string(),
                },
                other => other.into(),
            })?;
        log::warn!(target: "ledgerweb::lifecycle", "entry {} permanently purged", id);
        Ok(StaleAggregates::for_entry(&shadow.entry))
    }

    /// Reject a pending deletion: the entry returns to the pending queue
    /// with its deletion fields cleared
    pub async fn reject_deletion(&self, id: &str, role: Role) -> LedgerResult<MutationOutcome> {
        self.require_admin(role, "reject deletion")?;
        // Classify a miss before attempting the restore
        self.fetch_shadow(id, "reject deletion").await?;
        let entry = with_retry(&self.retry, "reject deletion", || self.store.restore(id)).await?;
        Ok(MutationOutcome { stale: StaleAggregates::for_entry(&entry), entry })
    }

    /// Administrative restoration from the recovery view. Identical in
    /// effect to a rejected deletion; fails with not-found when no shadow
    /// exists for the id.
    pub async fn restore(&self, id: &str, role: Role) -> LedgerResult<MutationOutcome> {
        self.require_admin(role, "restore")?;
        let result = with_retry(&self.retry, "restore", || self.store.restore(id)).await;
        match result {
            Ok(entry) => {
                log::info!(target: "ledgerweb::lifecycle", "entry {} restored", id);
                Ok(MutationOutcome { stale: StaleAggregates::for_entry(&entry), entry })
            }
            // No shadow: never existed, still live, or already purged
            Err(StoreError::Gone { id }) | Err(StoreError::NotFound { id }) => {
                Err(LedgerError::NotFound { id })
            }
            Err(err) => Err(err.into()),
        }
    }

    // ==================== Bulk transitions ====================

    /// Approve each id independently; failures never block other items
    pub async fn approve_many(&self, ids: &[String], role: Role) -> LedgerResult<BulkOutcome> {
        self.require_admin(role, "approve")?;
        Ok(self.approve_ids(ids.to_vec()).await)
    }

    /// Approve every pending entry of one company
    pub async fn approve_all_for_company(
        &self,
        company: &str,
        role: Role,
    ) -> LedgerResult<BulkOutcome> {
        self.require_admin(role, "approve")?;
        let filter = EntryFilter {
            company_name: Some(company.to_string()),
            status: Some(EntryStatus::Pending),
            ..Default::default()
        };
        let ids = self.matching_ids(&filter).await?;
        Ok(self.approve_ids(ids).await)
    }

    /// Approve every pending entry attributed to one staff member
    pub async fn approve_all_for_staff(
        &self,
        staff: &str,
        role: Role,
    ) -> LedgerResult<BulkOutcome> {
        self.require_admin(role, "approve")?;
        let filter = EntryFilter {
            staff: Some(staff.to_string()),
            status: Some(EntryStatus::Pending),
            ..Default::default()
        };
        let ids = self.matching_ids(&filter).await?;
        Ok(self.approve_ids(ids).await)
    }

    /// Approve every pending entry in the ledger
    pub async fn approve_all_pending(&self, role: Role) -> LedgerResult<BulkOutcome> {
        self.require_admin(role, "approve")?;
        let filter = EntryFilter { status: Some(EntryStatus::Pending), ..Default::default() };
        let ids = self.matching_ids(&filter).await?;
        Ok(self.approve_ids(ids).await)
    }

    async fn matching_ids(&self, filter: &EntryFilter) -> LedgerResult<Vec<String>> {
        let (entries, _) = with_retry(&self.retry, "list entries", || {
            self.store.list_by_filter(filter, usize::MAX, 0)
        })
        .await?;
        Ok(entries.into_iter().map(|e| e.id).collect())
    }

    async fn approve_ids(&self, ids: Vec<String>) -> BulkOutcome {
        let concurrency = self.bulk_concurrency.max(1);
        let results: Vec<(String, LedgerResult<MutationOutcome>)> =
            stream::iter(ids.into_iter().map(|id| async move {
                let result = self.approve_one(&id).await;
                (id, result)
            }))
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut bulk = BulkOutcome::default();
        for (id, result) in results {
            match result {
                Ok(outcome) => {
                    bulk.success_count += 1;
                    bulk.stale.merge(outcome.stale);
                }
                Err(err) => {
                    bulk.failed_count += 1;
                    bulk.failures.push(BulkFailure {
                        id,
                        code: err.code(),
                        reason: err.to_string(),
                    });
                }
            }
        }
        // buffer_unordered finishes in completion order; report failures
        // deterministically
        bulk.failures.sort_by(|a, b| a.id.cmp(&b.id));
        log::info!(
            target: "ledgerweb::lifecycle",
            "bulk approve finished: {} succeeded, {} failed",
            bulk.success_count,
            bulk.failed_count
        );
        bulk
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::Ledger;
    use chrono::NaiveDate;
    use ledgerweb_config::Config;
    use ledgerweb_store::{MemoryStore, PaymentMode};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn ledger() -> Ledger {
        Ledger::new(Config::default(), Arc::new(MemoryStore::new()))
    }

    fn new_entry(company: &str, account: &str, credit: Decimal) -> NewEntry {
        NewEntry {
            company_name: company.to_string(),
            account_name: account.to_string(),
            sub_account_name: None,
            staff: "Ravi".to_string(),
            entered_by: "clerk".to_string(),
            credit_amount: credit,
            debit_amount: dec!(0),
            sale_quantity: dec!(0),
            purchase_quantity: dec!(0),
            payment_mode: PaymentMode::Cash,
            transaction_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            particulars: "test entry".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_starts_pending_and_registers_references() {
        let ledger = ledger();
        let outcome = ledger.create(new_entry("Acme", "Cash", dec!(100))).await.unwrap();
        assert_eq!(outcome.entry.status, EntryStatus::Pending);
        assert!(outcome.stale.companies.contains("Acme"));

        let companies = ledger.store().companies().await.unwrap();
        assert_eq!(companies, vec!["Acme".to_string()]);

        // A second entry for the same company must not trip on the
        // duplicate reference rows
        ledger.create(new_entry("Acme", "Cash", dec!(50))).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_rejects_missing_account() {
        let ledger = ledger();
        let err = ledger.create(new_entry("Acme", "  ", dec!(1))).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Validation);
    }

    #[tokio::test]
    async fn test_create_rejects_negative_amounts() {
        let ledger = ledger();
        let mut bad = new_entry("Acme", "Cash", dec!(1));
        bad.debit_amount = dec!(-5);
        let err = ledger.create(bad).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Validation);
    }

    #[tokio::test]
    async fn test_edit_count_tracks_number_of_edits() {
        let ledger = ledger();
        let created = ledger.create(new_entry("Acme", "Cash", dec!(100))).await.unwrap();
        let id = created.entry.id.clone();

        for i in 1..=3u32 {
            let update = EntryPatch {
                particulars: Some(format!("revision {}", i)),
                ..Default::default()
            };
            let outcome = ledger.edit(&id, update).await.unwrap();
            assert_eq!(outcome.entry.edit_count, i);
            assert!(outcome.entry.edited);
        }
    }

    #[tokio::test]
    async fn test_edit_does_not_touch_approval() {
        let ledger = ledger();
        let created = ledger.create(new_entry("Acme", "Cash", dec!(100))).await.unwrap();
        let id = created.entry.id.clone();
        ledger.approve(&id, Role::Admin).await.unwrap();

        let update = EntryPatch { particulars: Some("tweak".to_string()), ..Default::default() };
        let outcome = ledger.edit(&id, update).await.unwrap();
        assert_eq!(outcome.entry.status, EntryStatus::Approved);
        assert_eq!(outcome.entry.approved(), Some(true));
    }

    #[tokio::test]
    async fn test_locked_entry_rejects_edit() {
        let ledger = ledger();
        let created = ledger.create(new_entry("Acme", "Cash", dec!(100))).await.unwrap();
        let id = created.entry.id.clone();
        ledger.set_locked(&id, true, Role::Admin).await.unwrap();

        let update = EntryPatch { particulars: Some("nope".to_string()), ..Default::default() };
        let err = ledger.edit(&id, update).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::LockedRecord);

        // Audit counter untouched by the failed edit
        let entry = ledger.store().get_by_id(&id).await.unwrap();
        assert_eq!(entry.edit_count, 0);
        assert!(!entry.edited);

        // Unlock is the administrative way back
        ledger.set_locked(&id, false, Role::Admin).await.unwrap();
        let update = EntryPatch { particulars: Some("now fine".to_string()), ..Default::default() };
        assert!(ledger.edit(&id, update).await.is_ok());
    }

    #[tokio::test]
    async fn test_approval_transitions() {
        let ledger = ledger();
        let created = ledger.create(new_entry("Acme", "Cash", dec!(100))).await.unwrap();
        let id = created.entry.id.clone();

        let approved = ledger.approve(&id, Role::Admin).await.unwrap();
        assert_eq!(approved.entry.status, EntryStatus::Approved);

        // Idempotent re-approve reports nothing stale
        let again = ledger.approve(&id, Role::Admin).await.unwrap();
        assert!(again.stale.is_empty());

        // Operators may reverse an approval
        let rejected = ledger.reject(&id, Role::Admin).await.unwrap();
        assert_eq!(rejected.entry.status, EntryStatus::Rejected);
        assert_eq!(rejected.entry.approved(), Some(false));

        // And approve a rejected entry again
        let re_approved = ledger.approve(&id, Role::Admin).await.unwrap();
        assert_eq!(re_approved.entry.status, EntryStatus::Approved);
    }

    #[tokio::test]
    async fn test_approval_requires_admin() {
        let ledger = ledger();
        let created = ledger.create(new_entry("Acme", "Cash", dec!(100))).await.unwrap();
        let id = created.entry.id.clone();

        for result in [
            ledger.approve(&id, Role::User).await.err(),
            ledger.reject(&id, Role::User).await.err(),
            ledger.approve_deletion(&id, Role::User).await.err(),
            ledger.reject_deletion(&id, Role::User).await.err(),
            ledger.purge(&id, Role::User).await.err(),
            ledger.restore(&id, Role::User).await.err(),
        ] {
            assert_eq!(result.unwrap().code(), ErrorCode::Permission);
        }
    }

    #[tokio::test]
    async fn test_approve_unknown_id_is_not_found() {
        let ledger = ledger();
        let err = ledger.approve("ent-0:missing", Role::Admin).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_approve_deleted_pending_is_invalid_state() {
        let ledger = ledger();
        let created = ledger.create(new_entry("Acme", "Cash", dec!(100))).await.unwrap();
        let id = created.entry.id.clone();
        ledger.soft_delete(&id, "clerk").await.unwrap();

        let err = ledger.approve(&id, Role::Admin).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidState);
    }

    #[tokio::test]
    async fn test_approved_entry_leaves_approval_on_soft_delete() {
        let ledger = ledger();
        let created = ledger.create(new_entry("Acme", "Cash", dec!(100))).await.unwrap();
        let id = created.entry.id.clone();
        ledger.approve(&id, Role::Admin).await.unwrap();

        // An entry is never approved and shadow-deleted at the same time
        let outcome = ledger.soft_delete(&id, "clerk").await.unwrap();
        assert_eq!(outcome.deleted.entry.status, EntryStatus::DeletedPending);
        assert_eq!(outcome.deleted.entry.approved(), None);
    }

    #[tokio::test]
    async fn test_soft_delete_restore_round_trip() {
        let ledger = ledger();
        let created = ledger.create(new_entry("Acme", "Cash", dec!(100))).await.unwrap();
        let before = created.entry.clone();

        ledger.soft_delete(&before.id, "clerk").await.unwrap();
        let restored = ledger.restore(&before.id, Role::Admin).await.unwrap();

        // Byte-for-byte identical: deletion fields live on the shadow,
        // which is discarded, and the entry was pending before
        assert_eq!(restored.entry, before);
    }

    #[tokio::test]
    async fn test_reject_deletion_returns_entry_to_pending() {
        let ledger = ledger();
        let created = ledger.create(new_entry("Acme", "Cash", dec!(100))).await.unwrap();
        let id = created.entry.id.clone();
        ledger.soft_delete(&id, "clerk").await.unwrap();

        let outcome = ledger.reject_deletion(&id, Role::Admin).await.unwrap();
        assert_eq!(outcome.entry.status, EntryStatus::Pending);
        assert!(ledger.store().get_deleted(&id).await.is_err());
    }

    #[tokio::test]
    async fn test_approve_deletion_purges_permanently() {
        let ledger = ledger();
        let created = ledger.create(new_entry("Acme", "Cash", dec!(100))).await.unwrap();
        let id = created.entry.id.clone();
        ledger.soft_delete(&id, "clerk").await.unwrap();

        let stale = ledger.approve_deletion(&id, Role::Admin).await.unwrap();
        assert!(stale.companies.contains("Acme"));

        // No shadow remains; restore reports not-found
        let err = ledger.restore(&id, Role::Admin).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_approve_deletion_requires_deletion_queue() {
        let ledger = ledger();
        let created = ledger.create(new_entry("Acme", "Cash", dec!(100))).await.unwrap();
        let err = ledger
            .approve_deletion(&created.entry.id, Role::Admin)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidState);
    }

    #[tokio::test]
    async fn test_restore_without_shadow_is_not_found() {
        let ledger = ledger();
        let err = ledger.restore("ent-0:missing", Role::Admin).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_bulk_approve_partial_failure() {
        let ledger = ledger();
        let mut ids = Vec::new();
        for i in 0..5 {
            let outcome = ledger
                .create(new_entry("Acme", "Cash", Decimal::from(i + 1)))
                .await
                .unwrap();
            ids.push(outcome.entry.id);
        }

        // Purge one of them first
        let purged_id = ids[2].clone();
        ledger.soft_delete(&purged_id, "clerk").await.unwrap();
        ledger.purge(&purged_id, Role::Admin).await.unwrap();

        let outcome = ledger.approve_many(&ids, Role::Admin).await.unwrap();
        assert_eq!(outcome.success_count, 4);
        assert_eq!(outcome.failed_count, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].id, purged_id);
        assert_eq!(outcome.failures[0].code, ErrorCode::InvalidState);
        assert!(outcome.failures[0].reason.contains("purged"));
    }

    #[tokio::test]
    async fn test_bulk_approve_requires_admin() {
        let ledger = ledger();
        let err = ledger
            .approve_many(&["ent-1:x".to_string()], Role::User)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Permission);
    }

    #[tokio::test]
    async fn test_approve_all_for_company_scopes_to_company() {
        let ledger = ledger();
        ledger.create(new_entry("Acme", "Cash", dec!(1))).await.unwrap();
        ledger.create(new_entry("Acme", "Bank", dec!(2))).await.unwrap();
        let other = ledger.create(new_entry("Beta", "Cash", dec!(3))).await.unwrap();

        let outcome = ledger.approve_all_for_company("Acme", Role::Admin).await.unwrap();
        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.failed_count, 0);

        let untouched = ledger.store().get_by_id(&other.entry.id).await.unwrap();
        assert_eq!(untouched.status, EntryStatus::Pending);
    }

    #[tokio::test]
    async fn test_approve_all_for_staff_and_all_pending() {
        let ledger = ledger();
        let mut by_staff = new_entry("Acme", "Cash", dec!(1));
        by_staff.staff = "Meena".to_string();
        ledger.create(by_staff).await.unwrap();
        ledger.create(new_entry("Acme", "Cash", dec!(2))).await.unwrap();

        let outcome = ledger.approve_all_for_staff("Meena", Role::Admin).await.unwrap();
        assert_eq!(outcome.success_count, 1);

        let outcome = ledger.approve_all_pending(Role::Admin).await.unwrap();
        assert_eq!(outcome.success_count, 1);

        // Nothing pending remains
        let outcome = ledger.approve_all_pending(Role::Admin).await.unwrap();
        assert_eq!(outcome.success_count, 0);
        assert_eq!(outcome.failed_count, 0);
    }
}
