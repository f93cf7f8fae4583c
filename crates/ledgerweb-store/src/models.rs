//! Entry data model shared by the store and its consumers
//!
//! The filter predicate lives next to the model so that server-side
//! evaluation (inside a store) and client-side evaluation (over an
//! in-memory set) run the exact same code and cannot diverge.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==================== Enumerations ====================

/// Lifecycle status of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Created, awaiting review
    Pending,
    /// Reviewed and approved
    Approved,
    /// Reviewed and rejected
    Rejected,
    /// Soft-deleted, awaiting deletion approval
    DeletedPending,
    /// Permanently removed (terminal)
    Purged,
}

impl Default for EntryStatus {
    fn default() -> Self {
        EntryStatus::Pending
    }
}

impl std::str::FromStr for EntryStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(EntryStatus::Pending),
            "approved" => Ok(EntryStatus::Approved),
            "rejected" => Ok(EntryStatus::Rejected),
            "deleted_pending" | "deleted-pending" => Ok(EntryStatus::DeletedPending),
            "purged" => Ok(EntryStatus::Purged),
            _ => Err(format!("Invalid entry status: {}", s)),
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryStatus::Pending => write!(f, "pending"),
            EntryStatus::Approved => write!(f, "approved"),
            EntryStatus::Rejected => write!(f, "rejected"),
            EntryStatus::DeletedPending => write!(f, "deleted_pending"),
            EntryStatus::Purged => write!(f, "purged"),
        }
    }
}

/// Payment mode of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Cash,
    BankTransfer,
    Online,
    /// No payment mode recorded
    Unset,
}

impl Default for PaymentMode {
    fn default() -> Self {
        PaymentMode::Unset
    }
}

impl std::str::FromStr for PaymentMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash" => Ok(PaymentMode::Cash),
            "bank_transfer" | "bank transfer" | "bank" => Ok(PaymentMode::BankTransfer),
            "online" => Ok(PaymentMode::Online),
            "" | "unset" | "none" => Ok(PaymentMode::Unset),
            _ => Err(format!("Invalid payment mode: {}", s)),
        }
    }
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMode::Cash => write!(f, "cash"),
            PaymentMode::BankTransfer => write!(f, "bank_transfer"),
            PaymentMode::Online => write!(f, "online"),
            PaymentMode::Unset => write!(f, "unset"),
        }
    }
}

// ==================== Entry ====================

/// One ledger transaction record (credit or debit leg)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Opaque unique key
    pub id: String,
    /// Monotonic integer for display ordering; never reused
    pub sequence_number: u64,
    /// Company the entry belongs to
    pub company_name: String,
    /// Account within the company
    pub account_name: String,
    /// Optional sub-account within the account
    pub sub_account_name: Option<String>,
    /// Staff member the entry is attributed to
    pub staff: String,
    /// User who entered the record
    pub entered_by: String,
    /// Credit amount (non-negative)
    pub credit_amount: Decimal,
    /// Debit amount (non-negative)
    pub debit_amount: Decimal,
    /// Quantity sold, if any
    pub sale_quantity: Decimal,
    /// Quantity purchased, if any
    pub purchase_quantity: Decimal,
    /// Payment mode
    pub payment_mode: PaymentMode,
    /// Business transaction date
    pub transaction_date: NaiveDate,
    /// Creation instant
    pub entry_timestamp: DateTime<Utc>,
    /// Lifecycle status
    pub status: EntryStatus,
    /// True once the entry has been edited at least once
    pub edited: bool,
    /// Number of post-creation mutations
    pub edit_count: u32,
    /// Locked entries reject ordinary edits
    pub locked: bool,
    /// Free-text description
    pub particulars: String,
}

impl Entry {
    /// Signed net amount of this entry (credit minus debit)
    pub fn balance(&self) -> Decimal {
        self.credit_amount - self.debit_amount
    }

    /// Tri-state approval view derived from status:
    /// approved => Some(true), rejected => Some(false), otherwise None
    pub fn approved(&self) -> Option<bool> {
        match self.status {
            EntryStatus::Approved => Some(true),
            EntryStatus::Rejected => Some(false),
            _ => None,
        }
    }
}

/// Retained copy of an entry pending permanent purge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedEntry {
    /// The original entry, id preserved, status set to deleted_pending
    pub entry: Entry,
    /// Who requested the deletion
    pub deleted_by: String,
    /// When the deletion was requested
    pub deleted_at: DateTime<Utc>,
}

/// Fields supplied when creating a new entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEntry {
    pub company_name: String,
    pub account_name: String,
    #[serde(default)]
    pub sub_account_name: Option<String>,
    #[serde(default)]
    pub staff: String,
    pub entered_by: String,
    #[serde(default)]
    pub credit_amount: Decimal,
    #[serde(default)]
    pub debit_amount: Decimal,
    #[serde(default)]
    pub sale_quantity: Decimal,
    #[serde(default)]
    pub purchase_quantity: Decimal,
    #[serde(default)]
    pub payment_mode: PaymentMode,
    pub transaction_date: NaiveDate,
    #[serde(default)]
    pub particulars: String,
}

/// Partial field update for an entry.
///
/// `expected_status` is the conditional-update guard: when set, the store
/// rejects the update with a conflict if the entry is no longer in that
/// status, so racing transitions on the same id cannot both succeed.
/// `register_edit` marks the mutation as a user edit (bumps the audit
/// counter); status-only transitions leave it false.
///
/// An empty string in `sub_account_name` clears the sub-account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryPatch {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub sub_account_name: Option<String>,
    #[serde(default)]
    pub staff: Option<String>,
    #[serde(default)]
    pub credit_amount: Option<Decimal>,
    #[serde(default)]
    pub debit_amount: Option<Decimal>,
    #[serde(default)]
    pub sale_quantity: Option<Decimal>,
    #[serde(default)]
    pub purchase_quantity: Option<Decimal>,
    #[serde(default)]
    pub payment_mode: Option<PaymentMode>,
    #[serde(default)]
    pub transaction_date: Option<NaiveDate>,
    #[serde(default)]
    pub particulars: Option<String>,
    #[serde(default)]
    pub status: Option<EntryStatus>,
    #[serde(default)]
    pub locked: Option<bool>,
    #[serde(default)]
    pub register_edit: bool,
    #[serde(default)]
    pub expected_status: Option<EntryStatus>,
}

impl EntryPatch {
    /// A patch that only moves the entry to a new status,
    /// guarded on the status it is expected to currently hold
    pub fn status_transition(from: EntryStatus, to: EntryStatus) -> Self {
        Self {
            status: Some(to),
            expected_status: Some(from),
            ..Default::default()
        }
    }

    /// Apply this patch to an entry in place, updating audit fields
    pub fn apply_to(&self, entry: &mut Entry) {
        if let Some(ref v) = self.company_name {
            entry.company_name = v.clone();
        }
        if let Some(ref v) = self.account_name {
            entry.account_name = v.clone();
        }
        if let Some(ref v) = self.sub_account_name {
            entry.sub_account_name = if v.is_empty() { None } else { Some(v.clone()) };
        }
        if let Some(ref v) = self.staff {
            entry.staff = v.clone();
        }
        if let Some(v) = self.credit_amount {
            entry.credit_amount = v;
        }
        if let Some(v) = self.debit_amount {
            entry.debit_amount = v;
        }
        if let Some(v) = self.sale_quantity {
            entry.sale_quantity = v;
        }
        if let Some(v) = self.purchase_quantity {
            entry.purchase_quantity = v;
        }
        if let Some(v) = self.payment_mode {
            entry.payment_mode = v;
        }
        if let Some(v) = self.transaction_date {
            entry.transaction_date = v;
        }
        if let Some(ref v) = self.particulars {
            entry.particulars = v.clone();
        }
        if let Some(v) = self.status {
            entry.status = v;
        }
        if let Some(v) = self.locked {
            entry.locked = v;
        }
        if self.register_edit {
            entry.edit_count += 1;
            entry.edited = entry.edit_count > 0;
        }
    }
}

// ==================== Filter ====================

/// Structured entry filter; fields compose by logical AND.
///
/// The default filter matches every entry. The date range only applies
/// when `between_dates` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryFilter {
    /// Apply the from/to date range
    #[serde(default)]
    pub between_dates: bool,
    /// Range start, inclusive
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Range end, inclusive
    #[serde(default)]
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub account_name: Option<String>,
    #[serde(default)]
    pub sub_account_name: Option<String>,
    #[serde(default)]
    pub staff: Option<String>,
    #[serde(default)]
    pub payment_mode: Option<PaymentMode>,
    /// Lifecycle status (pending queue, rejected list, and so on)
    #[serde(default)]
    pub status: Option<EntryStatus>,
    /// Exact credit amount match
    #[serde(default)]
    pub credit_amount: Option<Decimal>,
    /// Exact debit amount match
    #[serde(default)]
    pub debit_amount: Option<Decimal>,
    /// Case-insensitive free-text search
    #[serde(default)]
    pub search: Option<String>,
}

impl EntryFilter {
    /// True when no criterion is set
    pub fn is_empty(&self) -> bool {
        *self == EntryFilter::default()
    }

    /// Whether a company criterion is active (controls summary grouping keys)
    pub fn company_active(&self) -> bool {
        self.company_name.as_deref().map(|c| !c.is_empty()).unwrap_or(false)
    }

    /// Pure predicate: does this entry satisfy every active criterion?
    pub fn matches(&self, entry: &Entry) -> bool {
        if self.between_dates {
            if let Some(from) = self.from {
                if entry.transaction_date < from {
                    return false;
                }
            }
            if let Some(to) = self.to {
                if entry.transaction_date > to {
                    return false;
                }
            }
        }

        if let Some(ref company) = self.company_name {
            if !company.is_empty() && entry.company_name != *company {
                return false;
            }
        }
        if let Some(ref account) = self.account_name {
            if !account.is_empty() && entry.account_name != *account {
                return false;
            }
        }
        if let Some(ref sub) = self.sub_account_name {
            if !sub.is_empty() && entry.sub_account_name.as_deref() != Some(sub.as_str()) {
                return false;
            }
        }
        if let Some(ref staff) = self.staff {
            if !staff.is_empty() && entry.staff != *staff {
                return false;
            }
        }
        if let Some(mode) = self.payment_mode {
            if entry.payment_mode != mode {
                return false;
            }
        }
        if let Some(status) = self.status {
            if entry.status != status {
                return false;
            }
        }
        if let Some(credit) = self.credit_amount {
            if entry.credit_amount != credit {
                return false;
            }
        }
        if let Some(debit) = self.debit_amount {
            if entry.debit_amount != debit {
                return false;
            }
        }

        if let Some(ref search) = self.search {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty() && !Self::search_matches(entry, &needle) {
                return false;
            }
        }

        true
    }

    fn search_matches(entry: &Entry, needle: &str) -> bool {
        entry.particulars.to_lowercase().contains(needle)
            || entry.company_name.to_lowercase().contains(needle)
            || entry.account_name.to_lowercase().contains(needle)
            || entry
                .sub_account_name
                .as_deref()
                .map(|s| s.to_lowercase().contains(needle))
                .unwrap_or(false)
            || entry.staff.to_lowercase().contains(needle)
            || entry.credit_amount.to_string().contains(needle)
            || entry.debit_amount.to_string().contains(needle)
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_entry() -> Entry {
        Entry {
            id: "ent-1:deadbeef".to_string(),
            sequence_number: 1,
            company_name: "Acme Traders".to_string(),
            account_name: "Cash".to_string(),
            sub_account_name: Some("Till".to_string()),
            staff: "Ravi".to_string(),
            entered_by: "admin".to_string(),
            credit_amount: dec!(150.00),
            debit_amount: dec!(0),
            sale_quantity: dec!(0),
            purchase_quantity: dec!(0),
            payment_mode: PaymentMode::Cash,
            transaction_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            entry_timestamp: Utc::now(),
            status: EntryStatus::Pending,
            edited: false,
            edit_count: 0,
            locked: false,
            particulars: "Opening sale".to_string(),
        }
    }

    #[test]
    fn test_status_round_trip() {
        for s in ["pending", "approved", "rejected", "deleted_pending", "purged"] {
            let status: EntryStatus = s.parse().unwrap();
            assert_eq!(status.to_string(), s);
        }
        assert!("unknown".parse::<EntryStatus>().is_err());
    }

    #[test]
    fn test_payment_mode_parse_variants() {
        assert_eq!("bank transfer".parse::<PaymentMode>().unwrap(), PaymentMode::BankTransfer);
        assert_eq!("".parse::<PaymentMode>().unwrap(), PaymentMode::Unset);
        assert!("cheque".parse::<PaymentMode>().is_err());
    }

    #[test]
    fn test_entry_balance_and_approved() {
        let mut entry = sample_entry();
        assert_eq!(entry.balance(), dec!(150.00));
        assert_eq!(entry.approved(), None);
        entry.status = EntryStatus::Approved;
        assert_eq!(entry.approved(), Some(true));
        entry.status = EntryStatus::Rejected;
        assert_eq!(entry.approved(), Some(false));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = EntryFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&sample_entry()));
    }

    #[test]
    fn test_filter_fields_compose_by_and() {
        let entry = sample_entry();
        let mut filter = EntryFilter {
            company_name: Some("Acme Traders".to_string()),
            payment_mode: Some(PaymentMode::Cash),
            ..Default::default()
        };
        assert!(filter.matches(&entry));

        filter.payment_mode = Some(PaymentMode::Online);
        assert!(!filter.matches(&entry));
    }

    #[test]
    fn test_date_range_applies_only_when_flagged() {
        let entry = sample_entry();
        let mut filter = EntryFilter {
            from: Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
            ..Default::default()
        };
        // Flag off: range ignored
        assert!(filter.matches(&entry));

        filter.between_dates = true;
        assert!(!filter.matches(&entry));

        filter.from = Some(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        filter.to = Some(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        // Inclusive on both ends
        assert!(filter.matches(&entry));
    }

    #[test]
    fn test_search_is_case_insensitive_and_covers_amounts() {
        let entry = sample_entry();
        let hit = |s: &str| EntryFilter { search: Some(s.to_string()), ..Default::default() };

        assert!(hit("OPENING").matches(&entry));
        assert!(hit("acme").matches(&entry));
        assert!(hit("till").matches(&entry));
        assert!(hit("ravi").matches(&entry));
        assert!(hit("150").matches(&entry));
        assert!(!hit("warehouse").matches(&entry));
    }

    #[test]
    fn test_exact_amount_match() {
        let entry = sample_entry();
        let filter = EntryFilter { credit_amount: Some(dec!(150.00)), ..Default::default() };
        assert!(filter.matches(&entry));
        let filter = EntryFilter { credit_amount: Some(dec!(150.01)), ..Default::default() };
        assert!(!filter.matches(&entry));
    }

    #[test]
    fn test_patch_apply_registers_edit() {
        let mut entry = sample_entry();
        let patch = EntryPatch {
            particulars: Some("Corrected sale".to_string()),
            register_edit: true,
            ..Default::default()
        };
        patch.apply_to(&mut entry);
        assert_eq!(entry.particulars, "Corrected sale");
        assert_eq!(entry.edit_count, 1);
        assert!(entry.edited);
    }

    #[test]
    fn test_patch_clears_sub_account_with_empty_string() {
        let mut entry = sample_entry();
        let patch = EntryPatch {
            sub_account_name: Some(String::new()),
            ..Default::default()
        };
        patch.apply_to(&mut entry);
        assert_eq!(entry.sub_account_name, None);
    }
}
