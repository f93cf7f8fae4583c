//! Core ledger domain: lifecycle workflow, aggregation, filtering
//!
//! [`Ledger`] is the façade the server (and tests) drive. It owns a
//! handle to the entry store and implements the entry lifecycle state
//! machine, the pure aggregation engine, and the filter layer on top of
//! it. Persistence itself stays behind the [`ledgerweb_store::EntryStore`]
//! trait.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod lifecycle;
pub mod models;

pub use error::{ErrorCode, ErrorSeverity, LedgerError, LedgerResult};
pub use filter::FilterState;
pub use models::{
    AccountSummary, BalancePosition, BulkFailure, BulkOutcome, CompanySummary,
    DeletedEntriesResponse, DeletionOutcome, EntriesResponse, FilterOptions, LedgerSummary,
    MutationOutcome, Role, RunningBalanceRow, StaleAggregates, SubAccountSummary,
};

use ledgerweb_config::Config;
use ledgerweb_store::{
    with_retry, DeletedEntry, Entry, EntryFilter, EntryStatus, RetryPolicy, StoreError, StoreRef,
};

/// The ledger service facade
pub struct Ledger {
    config: Config,
    store: StoreRef,
    retry: RetryPolicy,
    bulk_concurrency: usize,
}

impl Ledger {
    pub fn new(config: Config, store: StoreRef) -> Self {
        let retry = RetryPolicy {
            max_retries: config.retry.max_retries,
            initial_backoff: Duration::from_millis(config.retry.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.retry.max_backoff_ms),
            backoff_multiplier: config.retry.backoff_multiplier,
        };
        let bulk_concurrency = config.workflow.bulk_concurrency;
        Self { config, store, retry, bulk_concurrency }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &StoreRef {
        &self.store
    }

    // ==================== Queries ====================

    /// One page of live entries matching the filter. Pages are 1-based;
    /// the page size comes from configuration.
    pub async fn entries(&self, filter: &EntryFilter, page: usize) -> LedgerResult<EntriesResponse> {
        let page = page.max(1);
        let page_size = self.config.pagination.records_per_page;
        // Page numbers come straight from clients; an absurd one must
        // land past the end, not overflow the offset
        let offset = (page - 1).checked_mul(page_size).unwrap_or(usize::MAX);

        let (entries, total_count) = with_retry(&self.retry, "list entries", || {
            self.store.list_by_filter(filter, page_size, offset)
        })
        .await?;

        Ok(EntriesResponse { entries, total_count, page, page_size })
    }

    /// Every live entry matching the filter, in ledger order
    pub async fn all_matching(&self, filter: &EntryFilter) -> LedgerResult<Vec<Entry>> {
        let (entries, _) = with_retry(&self.retry, "list entries", || {
            self.store.list_by_filter(filter, usize::MAX, 0)
        })
        .await?;
        Ok(entries)
    }

    /// Fetch one live entry. A soft-deleted or purged id reports
    /// not-found here; the deletion queue has its own view.
    pub async fn entry(&self, id: &str) -> LedgerResult<Entry> {
        let result = with_retry(&self.retry, "get entry", || self.store.get_by_id(id)).await;
        match result {
            Ok(entry) => Ok(entry),
            Err(StoreError::Gone { id }) => Err(LedgerError::NotFound { id }),
            Err(err) => Err(err.into()),
        }
    }

    /// The deletion queue, most recent deletion first
    pub async fn deleted_entries(
        &self,
        filter: &EntryFilter,
    ) -> LedgerResult<DeletedEntriesResponse> {
        let entries =
            with_retry(&self.retry, "list deleted", || self.store.list_deleted(filter)).await?;
        let total_count = entries.len();
        Ok(DeletedEntriesResponse { entries, total_count })
    }

    /// Fetch one deleted shadow
    pub async fn deleted_entry(&self, id: &str) -> LedgerResult<DeletedEntry> {
        let result = with_retry(&self.retry, "get deleted", || self.store.get_deleted(id)).await;
        match result {
            Ok(shadow) => Ok(shadow),
            Err(StoreError::Gone { id }) => Err(LedgerError::NotFound { id }),
            Err(err) => Err(err.into()),
        }
    }

    // ==================== Aggregation ====================

    /// Running-balance view over the filtered entries
    pub async fn running_balance(
        &self,
        filter: &EntryFilter,
        cancel: &CancellationToken,
    ) -> LedgerResult<Vec<RunningBalanceRow>> {
        let entries = self.all_matching(filter).await?;
        aggregate::running_balance(entries, cancel)
    }

    /// Per-company totals over the filtered entries
    pub async fn company_summaries(
        &self,
        filter: &EntryFilter,
        cancel: &CancellationToken,
    ) -> LedgerResult<Vec<CompanySummary>> {
        let entries = self.all_matching(filter).await?;
        aggregate::summarize_by_company(&entries, cancel)
    }

    /// Per-account totals; an active company filter collapses the key to
    /// the account name
    pub async fn account_summaries(
        &self,
        filter: &EntryFilter,
        cancel: &CancellationToken,
    ) -> LedgerResult<Vec<AccountSummary>> {
        let entries = self.all_matching(filter).await?;
        aggregate::summarize_by_account(&entries, filter.company_active(), cancel)
    }

    /// Per-sub-account totals, same keying rule one level deeper
    pub async fn sub_account_summaries(
        &self,
        filter: &EntryFilter,
        cancel: &CancellationToken,
    ) -> LedgerResult<Vec<SubAccountSummary>> {
        let entries = self.all_matching(filter).await?;
        aggregate::summarize_by_sub_account(&entries, filter.company_active(), cancel)
    }

    /// Whole-ledger overview: status counts and net position
    pub async fn summary(&self) -> LedgerResult<LedgerSummary> {
        let filter = EntryFilter::default();
        let entries = self.all_matching(&filter).await?;
        let deleted =
            with_retry(&self.retry, "list deleted", || self.store.list_deleted(&filter)).await?;
        let companies =
            with_retry(&self.retry, "list companies", || self.store.companies()).await?;

        let mut summary = LedgerSummary {
            entry_count: entries.len(),
            pending_count: 0,
            approved_count: 0,
            rejected_count: 0,
            deleted_pending_count: deleted.len(),
            company_count: companies.len(),
            total_credit: rust_decimal::Decimal::ZERO,
            total_debit: rust_decimal::Decimal::ZERO,
            balance: rust_decimal::Decimal::ZERO,
            position: BalancePosition::Cr,
        };
        for entry in &entries {
            match entry.status {
                EntryStatus::Pending => summary.pending_count += 1,
                EntryStatus::Approved => summary.approved_count += 1,
                EntryStatus::Rejected => summary.rejected_count += 1,
                _ => {}
            }
            summary.total_credit += entry.credit_amount;
            summary.total_debit += entry.debit_amount;
        }
        summary.balance = summary.total_credit - summary.total_debit;
        summary.position = BalancePosition::of(summary.balance);
        Ok(summary)
    }

    // ==================== Filter options ====================

    /// Valid filter choices for the current selection: all companies,
    /// the accounts of the selected company, the sub-accounts of the
    /// selected account
    pub async fn filter_options(
        &self,
        company: Option<&str>,
        account: Option<&str>,
    ) -> LedgerResult<FilterOptions> {
        let companies =
            with_retry(&self.retry, "list companies", || self.store.companies()).await?;
        let accounts = with_retry(&self.retry, "list accounts", || {
            self.store.accounts_for(company)
        })
        .await?;
        let sub_accounts = with_retry(&self.retry, "list sub-accounts", || {
            self.store.sub_accounts_for(company, account)
        })
        .await?;
        Ok(FilterOptions { companies, accounts, sub_accounts })
    }
}

/// Shared ledger handle
pub type LedgerRef = Arc<Ledger>;

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledgerweb_store::{MemoryStore, NewEntry, PaymentMode};
    use rust_decimal_macros::dec;

    fn ledger() -> Ledger {
        Ledger::new(Config::default(), Arc::new(MemoryStore::new()))
    }

    fn new_entry(company: &str, account: &str, credit: rust_decimal::Decimal) -> NewEntry {
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
            particulars: "entry".to_string(),
        }
    }

    #[tokio::test]
    async fn test_entries_pages_with_configured_size() {
        let mut config = Config::default();
        config.pagination.records_per_page = 2;
        let ledger = Ledger::new(config, Arc::new(MemoryStore::new()));

        for i in 1..=5 {
            ledger.create(new_entry("Acme", "Cash", rust_decimal::Decimal::from(i))).await.unwrap();
        }

        let page1 = ledger.entries(&EntryFilter::default(), 1).await.unwrap();
        assert_eq!(page1.entries.len(), 2);
        assert_eq!(page1.total_count, 5);
        assert_eq!(page1.page, 1);

        let page3 = ledger.entries(&EntryFilter::default(), 3).await.unwrap();
        assert_eq!(page3.entries.len(), 1);

        // Page zero is clamped to the first page
        let page0 = ledger.entries(&EntryFilter::default(), 0).await.unwrap();
        assert_eq!(page0.page, 1);
        assert_eq!(page0.entries, page1.entries);
    }

    #[tokio::test]
    async fn test_entries_huge_page_number_is_an_empty_page() {
        let ledger = ledger();
        ledger.create(new_entry("Acme", "Cash", dec!(10))).await.unwrap();

        let page = ledger.entries(&EntryFilter::default(), usize::MAX).await.unwrap();
        assert!(page.entries.is_empty());
        assert_eq!(page.total_count, 1);
        assert_eq!(page.page, usize::MAX);
    }

    #[tokio::test]
    async fn test_entry_lookup_hides_deleted_and_purged() {
        let ledger = ledger();
        let created = ledger.create(new_entry("Acme", "Cash", dec!(10))).await.unwrap();
        let id = created.entry.id.clone();
        assert!(ledger.entry(&id).await.is_ok());

        ledger.soft_delete(&id, "clerk").await.unwrap();
        assert_eq!(ledger.entry(&id).await.unwrap_err().code(), ErrorCode::NotFound);
        assert!(ledger.deleted_entry(&id).await.is_ok());

        ledger.purge(&id, Role::Admin).await.unwrap();
        assert_eq!(ledger.entry(&id).await.unwrap_err().code(), ErrorCode::NotFound);
        assert_eq!(ledger.deleted_entry(&id).await.unwrap_err().code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_summary_counts_statuses() {
        let ledger = ledger();
        let a = ledger.create(new_entry("Acme", "Cash", dec!(100))).await.unwrap();
        let b = ledger.create(new_entry("Acme", "Bank", dec!(50))).await.unwrap();
        let c = ledger.create(new_entry("Beta", "Cash", dec!(25))).await.unwrap();
        ledger.approve(&a.entry.id, Role::Admin).await.unwrap();
        ledger.soft_delete(&c.entry.id, "clerk").await.unwrap();
        let _ = b;

        let summary = ledger.summary().await.unwrap();
        assert_eq!(summary.entry_count, 2);
        assert_eq!(summary.approved_count, 1);
        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.deleted_pending_count, 1);
        assert_eq!(summary.company_count, 2);
        assert_eq!(summary.total_credit, dec!(150));
        assert_eq!(summary.position, BalancePosition::Cr);
    }

    #[tokio::test]
    async fn test_filter_options_cascade() {
        let ledger = ledger();
        let mut with_sub = new_entry("Acme", "Cash", dec!(1));
        with_sub.sub_account_name = Some("Till".to_string());
        ledger.create(with_sub).await.unwrap();
        ledger.create(new_entry("Beta", "Bank", dec!(2))).await.unwrap();

        let options = ledger.filter_options(None, None).await.unwrap();
        assert_eq!(options.companies, vec!["Acme".to_string(), "Beta".to_string()]);
        assert_eq!(options.accounts.len(), 2);

        let options = ledger.filter_options(Some("Acme"), Some("Cash")).await.unwrap();
        assert_eq!(options.accounts, vec!["Cash".to_string()]);
        assert_eq!(options.sub_accounts, vec!["Till".to_string()]);
    }

    #[tokio::test]
    async fn test_running_balance_over_filtered_entries() {
        let ledger = ledger();
        ledger.create(new_entry("Acme", "Cash", dec!(100))).await.unwrap();
        let mut debit = new_entry("Acme", "Cash", dec!(0));
        debit.debit_amount = dec!(30);
        ledger.create(debit).await.unwrap();
        ledger.create(new_entry("Beta", "Cash", dec!(999))).await.unwrap();

        let filter = EntryFilter {
            company_name: Some("Acme".to_string()),
            ..Default::default()
        };
        let rows = ledger
            .running_balance(&filter, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].running_balance, dec!(70));
    }
}
