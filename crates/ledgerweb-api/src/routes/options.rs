//! Cascading filter option catalogs
//!
//! Selecting a company narrows the account choices; selecting an
//! account narrows the sub-accounts. The client re-fetches this after
//! each selection change.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;

use ledgerweb_core::FilterOptions;

use crate::error::ApiError;
use crate::routes::non_empty;
use crate::AppState;

pub async fn filter_options(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<FilterOptions>, ApiError> {
    let company = non_empty(&params, "company");
    let account = non_empty(&params, "account");
    let options = state
        .ledger
        .filter_options(company.as_deref(), account.as_deref())
        .await?;
    Ok(Json(options))
}
