//! Route handlers, grouped by resource
//!
//! - routes::entries: entry list, detail, create, edit
//! - routes::workflow: lifecycle transitions, single and bulk
//! - routes::deleted: the deletion queue and recovery view
//! - routes::summaries: running balance and grouped totals
//! - routes::options: cascading filter option catalogs
//! - routes::import: batch row import

pub mod deleted;
pub mod entries;
pub mod import;
pub mod options;
pub mod summaries;
pub mod workflow;

use std::collections::HashMap;

use axum::http::HeaderMap;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use ledgerweb_core::Role;
use ledgerweb_store::{EntryFilter, EntryStatus, PaymentMode};

use crate::error::ApiError;

/// Caller role from the `x-role` header; absent or unknown means an
/// ordinary user
pub(crate) fn role_from_headers(headers: &HeaderMap) -> Role {
    headers
        .get("x-role")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<Role>().ok())
        .unwrap_or(Role::User)
}

/// Acting username from the `x-user` header
pub(crate) fn user_from_headers(headers: &HeaderMap) -> String {
    headers
        .get("x-user")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("anonymous")
        .to_string()
}

fn parse_date(params: &HashMap<String, String>, key: &str) -> Result<Option<NaiveDate>, ApiError> {
    match params.get(key) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::BadRequest {
                message: format!("{} must be a YYYY-MM-DD date, got {:?}", key, raw),
            }),
    }
}

fn parse_amount(
    params: &HashMap<String, String>,
    key: &str,
) -> Result<Option<Decimal>, ApiError> {
    match params.get(key) {
        None => Ok(None),
        Some(raw) => raw.parse::<Decimal>().map(Some).map_err(|_| ApiError::BadRequest {
            message: format!("{} must be a decimal amount, got {:?}", key, raw),
        }),
    }
}

pub(crate) fn non_empty(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params.get(key).map(|s| s.trim()).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Build an entry filter from query parameters. The date range only
/// applies when both ends are present.
pub(crate) fn filter_from_params(
    params: &HashMap<String, String>,
) -> Result<EntryFilter, ApiError> {
    let from = parse_date(params, "from")?;
    let to = parse_date(params, "to")?;

    let payment_mode = match non_empty(params, "payment_mode") {
        None => None,
        Some(raw) => Some(raw.parse::<PaymentMode>().map_err(|e| ApiError::BadRequest {
            message: e,
        })?),
    };
    let status = match non_empty(params, "status") {
        None => None,
        Some(raw) => Some(raw.parse::<EntryStatus>().map_err(|e| ApiError::BadRequest {
            message: e,
        })?),
    };

    Ok(EntryFilter {
        between_dates: from.is_some() && to.is_some(),
        from,
        to,
        company_name: non_empty(params, "company"),
        account_name: non_empty(params, "account"),
        sub_account_name: non_empty(params, "sub_account"),
        staff: non_empty(params, "staff"),
        payment_mode,
        status,
        credit_amount: parse_amount(params, "credit_amount")?,
        debit_amount: parse_amount(params, "debit_amount")?,
        search: non_empty(params, "q"),
    })
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_empty_params_give_empty_filter() {
        let filter = filter_from_params(&params(&[])).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_date_range_requires_both_ends() {
        let filter = filter_from_params(&params(&[("from", "2024-01-01")])).unwrap();
        assert!(!filter.between_dates);

        let filter =
            filter_from_params(&params(&[("from", "2024-01-01"), ("to", "2024-06-30")])).unwrap();
        assert!(filter.between_dates);
        assert_eq!(filter.from, NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn test_malformed_values_are_bad_requests() {
        assert!(filter_from_params(&params(&[("from", "January")])).is_err());
        assert!(filter_from_params(&params(&[("credit_amount", "lots")])).is_err());
        assert!(filter_from_params(&params(&[("payment_mode", "barter")])).is_err());
        assert!(filter_from_params(&params(&[("status", "limbo")])).is_err());
    }

    #[test]
    fn test_blank_params_are_ignored() {
        let filter =
            filter_from_params(&params(&[("company", "  "), ("q", ""), ("staff", "Ravi")]))
                .unwrap();
        assert_eq!(filter.company_name, None);
        assert_eq!(filter.search, None);
        assert_eq!(filter.staff.as_deref(), Some("Ravi"));
    }

    #[test]
    fn test_role_header_defaults_to_user() {
        let mut headers = HeaderMap::new();
        assert_eq!(role_from_headers(&headers), Role::User);
        headers.insert("x-role", "admin".parse().unwrap());
        assert_eq!(role_from_headers(&headers), Role::Admin);
        headers.insert("x-role", "superuser".parse().unwrap());
        assert_eq!(role_from_headers(&headers), Role::User);
    }
}
