//! Entry list, detail, create and edit endpoints

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;

use ledgerweb_core::{EntriesResponse, MutationOutcome};
use ledgerweb_store::{Entry, EntryPatch, NewEntry};

use crate::error::ApiError;
use crate::routes::{filter_from_params, user_from_headers};
use crate::AppState;

/// One page of live entries matching the query filter
pub async fn list_entries(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<EntriesResponse>, ApiError> {
    let filter = filter_from_params(&params)?;
    let page = params.get("page").and_then(|s| s.parse().ok()).unwrap_or(1);
    let response = state.ledger.entries(&filter, page).await?;
    Ok(Json(response))
}

/// Single live entry detail
pub async fn entry_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Entry>, ApiError> {
    let entry = state.ledger.entry(&id).await?;
    Ok(Json(entry))
}

/// Create a new entry; it enters the pending queue
pub async fn create_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut new): Json<NewEntry>,
) -> Result<Json<MutationOutcome>, ApiError> {
    if new.entered_by.trim().is_empty() {
        new.entered_by = user_from_headers(&headers);
    }
    let outcome = state.ledger.create(new).await?;
    Ok(Json(outcome))
}

/// Edit a live entry. Lifecycle fields in the patch are ignored; the
/// workflow routes own status changes.
pub async fn edit_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<EntryPatch>,
) -> Result<Json<MutationOutcome>, ApiError> {
    let outcome = state.ledger.edit(&id, patch).await?;
    Ok(Json(outcome))
}
