//! Row-to-entry mapping: alias resolution, sanitization, defaults
//!
//! Imported files come from many bookkeeping tools, so every target
//! field resolves through an ordered list of acceptable header
//! spellings. Missing values fall back to documented defaults instead
//! of rejecting the row; the only hard requirement is an account name.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;

use ledgerweb_store::{NewEntry, PaymentMode};

use crate::error::RowError;

/// One loosely-typed row of an imported file, keyed by header
pub type RawRow = HashMap<String, String>;

/// Sentinel company for rows with no recognizable company column
pub const DEFAULT_COMPANY: &str = "Default Company";

/// Minimal credit assigned when both legs of a row are zero, so the row
/// stays a visible ledger entry instead of silently vanishing
pub fn minimal_credit() -> Decimal {
    Decimal::new(1, 2)
}

// ==================== Header aliases ====================

/// Ordered alias lists, most specific spelling first. Header matching is
/// case-insensitive and ignores spaces, underscores and dots.
static COMPANY_ALIASES: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["companyname", "company", "firmname", "firm", "party", "partyname"]);

static ACCOUNT_ALIASES: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["accountname", "account", "ledgername", "ledger", "head", "accounthead"]);

static SUB_ACCOUNT_ALIASES: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["subaccountname", "subaccount", "subledger", "subhead"]);

static STAFF_ALIASES: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["staffname", "staff", "employee", "salesman", "agent"]);

static CREDIT_ALIASES: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["creditamount", "credit", "creditamt", "cramount", "cr"]);

static DEBIT_ALIASES: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["debitamount", "debit", "debitamt", "dramount", "dr"]);

static SALE_QTY_ALIASES: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["salequantity", "saleqty", "salesqty", "qtysold"]);

static PURCHASE_QTY_ALIASES: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["purchasequantity", "purchaseqty", "purchqty", "qtybought"]);

static PAYMENT_MODE_ALIASES: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["paymentmode", "paymode", "mode", "payment"]);

static DATE_ALIASES: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["transactiondate", "txndate", "entrydate", "date"]);

static PARTICULARS_ALIASES: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["particulars", "description", "narration", "details", "remarks"]);

/// Date formats tried in priority order
static DATE_FORMATS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec!["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%m/%d/%Y", "%d.%m.%Y", "%Y/%m/%d"]
});

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '.' | '-'))
        .collect::<String>()
        .to_lowercase()
}

/// Resolve a field through its alias list; first non-blank match wins
fn resolve<'a>(row: &HashMap<String, &'a str>, aliases: &[&str]) -> Option<&'a str> {
    for alias in aliases {
        if let Some(value) = row.get(*alias) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed);
            }
        }
    }
    None
}

// ==================== Coercion ====================

/// Strip everything that is not part of a number (currency symbols,
/// thousands separators, stray text) and parse; unparseable input
/// defaults to zero
pub fn sanitize_amount(raw: &str) -> Decimal {
    let negative = raw.trim().starts_with('-') || (raw.contains('(') && raw.contains(')'));
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    let value = digits.parse::<Decimal>().unwrap_or(Decimal::ZERO);
    if negative {
        -value
    } else {
        value
    }
}

/// Parse a date against the prioritized format list; total failure falls
/// back to the current date so the row still imports
pub fn parse_date(raw: &str) -> NaiveDate {
    let trimmed = raw.trim();
    for format in DATE_FORMATS.iter() {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date;
        }
    }
    Utc::now().date_naive()
}

// ==================== Row mapping ====================

/// Map one raw row onto a new entry. `index` is the zero-based row
/// position in the file, used for default particulars and error
/// messages.
pub fn map_row(index: usize, raw: &RawRow, entered_by: &str) -> Result<NewEntry, RowError> {
    // Normalize the headers once, then resolve every field against it
    let row: HashMap<String, &str> = raw
        .iter()
        .map(|(k, v)| (normalize_header(k), v.as_str()))
        .collect();
    let row = &row;

    let account_name = resolve(row, &ACCOUNT_ALIASES)
        .ok_or(RowError::MissingAccount { row: index + 1 })?
        .to_string();

    let company_name = resolve(row, &COMPANY_ALIASES)
        .unwrap_or(DEFAULT_COMPANY)
        .to_string();

    let mut credit_amount =
        resolve(row, &CREDIT_ALIASES).map(sanitize_amount).unwrap_or(Decimal::ZERO);
    let debit_amount =
        resolve(row, &DEBIT_ALIASES).map(sanitize_amount).unwrap_or(Decimal::ZERO);

    if credit_amount < Decimal::ZERO || debit_amount < Decimal::ZERO {
        return Err(RowError::NegativeAmount { row: index + 1 });
    }
    // Both legs zero: coerce to a minimal credit rather than dropping
    if credit_amount.is_zero() && debit_amount.is_zero() {
        credit_amount = minimal_credit();
    }

    let payment_mode = resolve(row, &PAYMENT_MODE_ALIASES)
        .and_then(|raw| raw.parse::<PaymentMode>().ok())
        .unwrap_or(PaymentMode::Unset);

    let transaction_date = resolve(row, &DATE_ALIASES)
        .map(parse_date)
        .unwrap_or_else(|| Utc::now().date_naive());

    let particulars = resolve(row, &PARTICULARS_ALIASES)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Transaction {}", index + 1));

    Ok(NewEntry {
        company_name,
        account_name,
        sub_account_name: resolve(row, &SUB_ACCOUNT_ALIASES).map(str::to_string),
        staff: resolve(row, &STAFF_ALIASES).unwrap_or("").to_string(),
        entered_by: entered_by.to_string(),
        credit_amount,
        debit_amount,
        sale_quantity: resolve(row, &SALE_QTY_ALIASES)
            .map(sanitize_amount)
            .unwrap_or(Decimal::ZERO),
        purchase_quantity: resolve(row, &PURCHASE_QTY_ALIASES)
            .map(sanitize_amount)
            .unwrap_or(Decimal::ZERO),
        payment_mode,
        transaction_date,
        particulars,
    })
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_alias_resolution_is_header_insensitive() {
        let r = row(&[("Company Name", "Acme"), ("ACCOUNT", "Cash"), ("Credit Amt", "100")]);
        let entry = map_row(0, &r, "importer").unwrap();
        assert_eq!(entry.company_name, "Acme");
        assert_eq!(entry.account_name, "Cash");
        assert_eq!(entry.credit_amount, dec!(100));
    }

    #[test]
    fn test_missing_company_gets_default() {
        let r = row(&[("account", "Cash"), ("credit", "50")]);
        let entry = map_row(0, &r, "importer").unwrap();
        assert_eq!(entry.company_name, DEFAULT_COMPANY);
    }

    #[test]
    fn test_missing_account_is_an_error() {
        let r = row(&[("company", "Acme"), ("credit", "50")]);
        let err = map_row(4, &r, "importer").unwrap_err();
        assert!(matches!(err, RowError::MissingAccount { row: 5 }));
    }

    #[test]
    fn test_missing_particulars_defaults_to_row_label() {
        let r = row(&[("account", "Cash"), ("credit", "50")]);
        let entry = map_row(2, &r, "importer").unwrap();
        assert_eq!(entry.particulars, "Transaction 3");
    }

    #[test]
    fn test_sanitize_amount_strips_noise() {
        assert_eq!(sanitize_amount("1,234.50"), dec!(1234.50));
        assert_eq!(sanitize_amount("Rs 99"), dec!(99));
        assert_eq!(sanitize_amount("-42"), dec!(-42));
        assert_eq!(sanitize_amount("n/a"), dec!(0));
        assert_eq!(sanitize_amount(""), dec!(0));
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let r = row(&[("account", "Cash"), ("debit", "-10")]);
        let err = map_row(0, &r, "importer").unwrap_err();
        assert!(matches!(err, RowError::NegativeAmount { .. }));
    }

    #[test]
    fn test_zero_zero_row_coerced_to_minimal_credit() {
        let r = row(&[("account", "Cash"), ("credit", "0"), ("debit", "0")]);
        let entry = map_row(0, &r, "importer").unwrap();
        assert_eq!(entry.credit_amount, dec!(0.01));
        assert_eq!(entry.debit_amount, dec!(0));
    }

    #[test]
    fn test_date_formats_in_priority_order() {
        assert_eq!(parse_date("2024-03-15"), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(parse_date("15/03/2024"), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(parse_date("15-03-2024"), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(parse_date("15.03.2024"), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    }

    #[test]
    fn test_unparseable_date_falls_back_to_today() {
        assert_eq!(parse_date("soon"), Utc::now().date_naive());
    }

    #[test]
    fn test_payment_mode_parse_with_fallback() {
        let r = row(&[("account", "Cash"), ("credit", "1"), ("payment mode", "Bank Transfer")]);
        assert_eq!(map_row(0, &r, "i").unwrap().payment_mode, PaymentMode::BankTransfer);

        let r = row(&[("account", "Cash"), ("credit", "1"), ("mode", "barter")]);
        assert_eq!(map_row(0, &r, "i").unwrap().payment_mode, PaymentMode::Unset);
    }
}
