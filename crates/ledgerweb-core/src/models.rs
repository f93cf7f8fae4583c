//! Derived types: roles, summaries, bulk outcomes, API responses
//!
//! Summary types are ephemeral aggregates recomputed from the live entry
//! set on every query; none of them are persisted.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use ledgerweb_store::{DeletedEntry, Entry};

// ==================== Roles ====================

/// Caller role for workflow transitions.
///
/// Approval-class transitions (approve, reject, deletion approval or
/// rejection, purge) require `Admin`; edit and soft-delete do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::str::FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

// ==================== Balance position ====================

/// Display convention: non-negative balances show as credit position (CR),
/// negative as debit position (DR)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BalancePosition {
    Cr,
    Dr,
}

impl BalancePosition {
    pub fn of(balance: Decimal) -> Self {
        if balance >= Decimal::ZERO {
            BalancePosition::Cr
        } else {
            BalancePosition::Dr
        }
    }
}

impl std::fmt::Display for BalancePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalancePosition::Cr => write!(f, "CR"),
            BalancePosition::Dr => write!(f, "DR"),
        }
    }
}

// ==================== Aggregates ====================

/// One row of a running-balance view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunningBalanceRow {
    pub entry: Entry,
    /// Signed net of this entry (credit minus debit)
    pub balance: Decimal,
    /// Cumulative net up to and including this entry
    pub running_balance: Decimal,
    pub position: BalancePosition,
}

/// Per-company totals, ordered by absolute balance descending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub company_name: String,
    pub total_credit: Decimal,
    pub total_debit: Decimal,
    pub balance: Decimal,
    pub position: BalancePosition,
}

/// Per-account totals.
///
/// `company_name` carries the group's company when no company filter was
/// active; a pinned company collapses the key to the account name alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub company_name: Option<String>,
    pub account_name: String,
    pub total_credit: Decimal,
    pub total_debit: Decimal,
    pub balance: Decimal,
    pub transaction_count: usize,
    pub position: BalancePosition,
}

/// Per-sub-account totals; entries without a sub-account are excluded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubAccountSummary {
    pub company_name: Option<String>,
    pub account_name: String,
    pub sub_account_name: String,
    pub total_credit: Decimal,
    pub total_debit: Decimal,
    pub balance: Decimal,
    pub transaction_count: usize,
    pub position: BalancePosition,
}

// ==================== Cache invalidation ====================

/// Aggregate keys made stale by a mutation.
///
/// Callers holding cached summaries use this instead of any global
/// refresh signal: recompute only what is named here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaleAggregates {
    pub companies: BTreeSet<String>,
    pub accounts: BTreeSet<(String, String)>,
    pub sub_accounts: BTreeSet<(String, String, String)>,
}

impl StaleAggregates {
    /// The keys a mutation of this entry invalidates
    pub fn for_entry(entry: &Entry) -> Self {
        let mut stale = Self::default();
        stale.companies.insert(entry.company_name.clone());
        stale
            .accounts
            .insert((entry.company_name.clone(), entry.account_name.clone()));
        if let Some(ref sub) = entry.sub_account_name {
            stale.sub_accounts.insert((
                entry.company_name.clone(),
                entry.account_name.clone(),
                sub.clone(),
            ));
        }
        stale
    }

    /// Merge another set of stale keys into this one
    pub fn merge(&mut self, other: StaleAggregates) {
        self.companies.extend(other.companies);
        self.accounts.extend(other.accounts);
        self.sub_accounts.extend(other.sub_accounts);
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty() && self.accounts.is_empty() && self.sub_accounts.is_empty()
    }
}

// ==================== Mutation results ====================

/// Result of a single mutating transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationOutcome {
    pub entry: Entry,
    pub stale: StaleAggregates,
}

/// Result of a soft deletion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionOutcome {
    pub deleted: DeletedEntry,
    pub stale: StaleAggregates,
}

/// Failure record for one item of a bulk operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkFailure {
    pub id: String,
    pub code: ErrorCode,
    pub reason: String,
}

/// Aggregate result of a bulk operation; no item's failure blocks another
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub success_count: usize,
    pub failed_count: usize,
    pub failures: Vec<BulkFailure>,
    pub stale: StaleAggregates,
}

// ==================== Responses ====================

/// Entries list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntriesResponse {
    pub entries: Vec<Entry>,
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Deleted entries list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedEntriesResponse {
    pub entries: Vec<DeletedEntry>,
    pub total_count: usize,
}

/// Valid filter choices for the current company/account selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    pub companies: Vec<String>,
    pub accounts: Vec<String>,
    pub sub_accounts: Vec<String>,
}

/// Cheap whole-ledger overview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub entry_count: usize,
    pub pending_count: usize,
    pub approved_count: usize,
    pub rejected_count: usize,
    pub deleted_pending_count: usize,
    pub company_count: usize,
    pub total_credit: Decimal,
    pub total_debit: Decimal,
    pub balance: Decimal,
    pub position: BalancePosition,
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_position() {
        assert_eq!(BalancePosition::of(dec!(10)), BalancePosition::Cr);
        assert_eq!(BalancePosition::of(dec!(0)), BalancePosition::Cr);
        assert_eq!(BalancePosition::of(dec!(-0.01)), BalancePosition::Dr);
        assert_eq!(BalancePosition::Cr.to_string(), "CR");
        assert_eq!(BalancePosition::Dr.to_string(), "DR");
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert!("root".parse::<Role>().is_err());
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
    }

    #[test]
    fn test_stale_aggregates_merge() {
        let mut a = StaleAggregates::default();
        a.companies.insert("Acme".to_string());
        let mut b = StaleAggregates::default();
        b.companies.insert("Beta".to_string());
        b.accounts.insert(("Beta".to_string(), "Cash".to_string()));

        a.merge(b);
        assert_eq!(a.companies.len(), 2);
        assert_eq!(a.accounts.len(), 1);
        assert!(!a.is_empty());
    }
}
