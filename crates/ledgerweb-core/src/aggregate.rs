//! Aggregation engine: running balances and grouped summaries
//!
//! All computations are pure over their input and use exact decimal
//! arithmetic. The engine owns the ordering: callers never have to
//! pre-sort. Long computations poll a cancellation token so an abandoned
//! query stops instead of reporting a stale partial result.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    AccountSummary, BalancePosition, CompanySummary, RunningBalanceRow, SubAccountSummary,
};
use ledgerweb_store::Entry;

/// How often the fold loops poll for cancellation
const CANCEL_CHECK_INTERVAL: usize = 1024;

fn check_cancelled(i: usize, cancel: &CancellationToken, operation: &str) -> LedgerResult<()> {
    if i % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
        return Err(LedgerError::Cancelled { operation: operation.to_string() });
    }
    Ok(())
}

/// Deterministic ledger order: transaction date, then sequence number
fn sort_chronological(entries: &mut [Entry]) {
    entries.sort_by(|a, b| {
        a.transaction_date
            .cmp(&b.transaction_date)
            .then(a.sequence_number.cmp(&b.sequence_number))
    });
}

/// Compute the running balance over the entries in chronological order.
///
/// Single forward pass after the engine's own sort; the running total
/// starts at zero.
pub fn running_balance(
    mut entries: Vec<Entry>,
    cancel: &CancellationToken,
) -> LedgerResult<Vec<RunningBalanceRow>> {
    sort_chronological(&mut entries);

    let mut rows = Vec::with_capacity(entries.len());
    let mut running = Decimal::ZERO;
    for (i, entry) in entries.into_iter().enumerate() {
        check_cancelled(i, cancel, "running balance")?;
        let balance = entry.balance();
        running += balance;
        rows.push(RunningBalanceRow {
            balance,
            running_balance: running,
            position: BalancePosition::of(running),
            entry,
        });
    }
    Ok(rows)
}

/// Group totals per company, ordered by absolute balance descending
/// (largest exposure first); ties break on the company name
pub fn summarize_by_company(
    entries: &[Entry],
    cancel: &CancellationToken,
) -> LedgerResult<Vec<CompanySummary>> {
    let mut groups: HashMap<&str, (Decimal, Decimal)> = HashMap::new();
    for (i, entry) in entries.iter().enumerate() {
        check_cancelled(i, cancel, "company summary")?;
        let totals = groups.entry(entry.company_name.as_str()).or_default();
        totals.0 += entry.credit_amount;
        totals.1 += entry.debit_amount;
    }

    let mut summaries: Vec<CompanySummary> = groups
        .into_iter()
        .map(|(company, (credit, debit))| {
            let balance = credit - debit;
            CompanySummary {
                company_name: company.to_string(),
                total_credit: credit,
                total_debit: debit,
                balance,
                position: BalancePosition::of(balance),
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.balance
            .abs()
            .cmp(&a.balance.abs())
            .then_with(|| a.company_name.cmp(&b.company_name))
    });
    Ok(summaries)
}

/// Group totals per account.
///
/// Without an active company filter the key is (company, account), so the
/// same account name under two companies never merges. With a company
/// filter pinning one company the key collapses to the account name.
pub fn summarize_by_account(
    entries: &[Entry],
    company_filter_active: bool,
    cancel: &CancellationToken,
) -> LedgerResult<Vec<AccountSummary>> {
    type Key = (Option<String>, String);
    let mut groups: HashMap<Key, (Decimal, Decimal, usize)> = HashMap::new();

    for (i, entry) in entries.iter().enumerate() {
        check_cancelled(i, cancel, "account summary")?;
        let key: Key = if company_filter_active {
            (None, entry.account_name.clone())
        } else {
            (Some(entry.company_name.clone()), entry.account_name.clone())
        };
        let totals = groups.entry(key).or_default();
        totals.0 += entry.credit_amount;
        totals.1 += entry.debit_amount;
        totals.2 += 1;
    }

    let mut summaries: Vec<AccountSummary> = groups
        .into_iter()
        .map(|((company, account), (credit, debit, count))| {
            let balance = credit - debit;
            AccountSummary {
                company_name: company,
                account_name: account,
                total_credit: credit,
                total_debit: debit,
                balance,
                transaction_count: count,
                position: BalancePosition::of(balance),
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        a.company_name
            .cmp(&b.company_name)
            .then_with(|| a.account_name.cmp(&b.account_name))
    });
    Ok(summaries)
}

/// Group totals per sub-account, same keying rule one level deeper.
/// Entries without a sub-account are excluded at this level.
pub fn summarize_by_sub_account(
    entries: &[Entry],
    company_filter_active: bool,
    cancel: &CancellationToken,
) -> LedgerResult<Vec<SubAccountSummary>> {
    type Key = (Option<String>, String, String);
    let mut groups: HashMap<Key, (Decimal, Decimal, usize)> = HashMap::new();

    for (i, entry) in entries.iter().enumerate() {
        check_cancelled(i, cancel, "sub-account summary")?;
        let sub = match entry.sub_account_name {
            Some(ref sub) if !sub.is_empty() => sub.clone(),
            _ => continue,
        };
        let key: Key = if company_filter_active {
            (None, entry.account_name.clone(), sub)
        } else {
            (Some(entry.company_name.clone()), entry.account_name.clone(), sub)
        };
        let totals = groups.entry(key).or_default();
        totals.0 += entry.credit_amount;
        totals.1 += entry.debit_amount;
        totals.2 += 1;
    }

    let mut summaries: Vec<SubAccountSummary> = groups
        .into_iter()
        .map(|((company, account, sub), (credit, debit, count))| {
            let balance = credit - debit;
            SubAccountSummary {
                company_name: company,
                account_name: account,
                sub_account_name: sub,
                total_credit: credit,
                total_debit: debit,
                balance,
                transaction_count: count,
                position: BalancePosition::of(balance),
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        a.company_name
            .cmp(&b.company_name)
            .then_with(|| a.account_name.cmp(&b.account_name))
            .then_with(|| a.sub_account_name.cmp(&b.sub_account_name))
    });
    Ok(summaries)
}

// ==================== Tests ====================
