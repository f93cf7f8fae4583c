//! Filter state with cascading company/account/sub-account selection
//!
//! The predicate itself lives with the entry model
//! ([`ledgerweb_store::EntryFilter`]) so server-side and in-memory
//! evaluation share one implementation. This module owns the selection
//! rules around it: choosing a company narrows the account choices and
//! resets any finer selection, and likewise one level down.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use ledgerweb_store::{EntryFilter, EntryStatus, PaymentMode};

/// Mutable filter selection implementing the cascade rules
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    filter: EntryFilter,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current filter value
    pub fn filter(&self) -> &EntryFilter {
        &self.filter
    }

    pub fn into_filter(self) -> EntryFilter {
        self.filter
    }

    /// Select a company. Any account and sub-account selection is reset:
    /// they belonged to the previous company's catalog.
    pub fn set_company(&mut self, company: Option<String>) {
        self.filter.company_name = company.filter(|c| !c.is_empty());
        self.filter.account_name = None;
        self.filter.sub_account_name = None;
    }

    /// Select an account; the sub-account selection is reset
    pub fn set_account(&mut self, account: Option<String>) {
        self.filter.account_name = account.filter(|a| !a.is_empty());
        self.filter.sub_account_name = None;
    }

    pub fn set_sub_account(&mut self, sub_account: Option<String>) {
        self.filter.sub_account_name = sub_account.filter(|s| !s.is_empty());
    }

    /// Set the inclusive date range; `None` clears it
    pub fn set_date_range(&mut self, range: Option<(NaiveDate, NaiveDate)>) {
        match range {
            Some((from, to)) => {
                self.filter.between_dates = true;
                self.filter.from = Some(from);
                self.filter.to = Some(to);
            }
            None => {
                self.filter.between_dates = false;
                self.filter.from = None;
                self.filter.to = None;
            }
        }
    }

    pub fn set_staff(&mut self, staff: Option<String>) {
        self.filter.staff = staff.filter(|s| !s.is_empty());
    }

    pub fn set_payment_mode(&mut self, mode: Option<PaymentMode>) {
        self.filter.payment_mode = mode;
    }

    pub fn set_status(&mut self, status: Option<EntryStatus>) {
        self.filter.status = status;
    }

    pub fn set_credit_amount(&mut self, amount: Option<Decimal>) {
        self.filter.credit_amount = amount;
    }

    pub fn set_debit_amount(&mut self, amount: Option<Decimal>) {
        self.filter.debit_amount = amount;
    }

    pub fn set_search(&mut self, search: Option<String>) {
        self.filter.search = search.filter(|s| !s.trim().is_empty());
    }

    /// Reset every criterion
    pub fn clear(&mut self) {
        self.filter = EntryFilter::default();
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_change_resets_account_and_sub_account() {
        let mut state = FilterState::new();
        state.set_company(Some("Acme".to_string()));
        state.set_account(Some("Cash".to_string()));
        state.set_sub_account(Some("Till".to_string()));

        state.set_company(Some("Beta".to_string()));
        assert_eq!(state.filter().company_name.as_deref(), Some("Beta"));
        assert_eq!(state.filter().account_name, None);
        assert_eq!(state.filter().sub_account_name, None);
    }

    #[test]
    fn test_account_change_resets_sub_account_only() {
        let mut state = FilterState::new();
        state.set_company(Some("Acme".to_string()));
        state.set_account(Some("Cash".to_string()));
        state.set_sub_account(Some("Till".to_string()));

        state.set_account(Some("Bank".to_string()));
        assert_eq!(state.filter().company_name.as_deref(), Some("Acme"));
        assert_eq!(state.filter().account_name.as_deref(), Some("Bank"));
        assert_eq!(state.filter().sub_account_name, None);
    }

    #[test]
    fn test_empty_selection_clears_field() {
        let mut state = FilterState::new();
        state.set_company(Some(String::new()));
        assert_eq!(state.filter().company_name, None);
        state.set_search(Some("   ".to_string()));
        assert_eq!(state.filter().search, None);
    }

    #[test]
    fn test_date_range_toggle() {
        let mut state = FilterState::new();
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        state.set_date_range(Some((from, to)));
        assert!(state.filter().between_dates);

        state.set_date_range(None);
        assert!(!state.filter().between_dates);
        assert_eq!(state.filter().from, None);
    }

    #[test]
    fn test_clear_returns_to_default() {
        let mut state = FilterState::new();
        state.set_company(Some("Acme".to_string()));
        state.set_staff(Some("Ravi".to_string()));
        state.clear();
        assert!(state.filter().is_empty());
    }
}
