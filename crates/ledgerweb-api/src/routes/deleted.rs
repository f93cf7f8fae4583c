//! Deletion queue and recovery endpoints
//!
//! A soft-deleted entry waits here for an admin to approve the deletion
//! (permanent purge) or reject it (back to pending). The recovery view
//! uses the same shadow set.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;

use ledgerweb_core::{DeletedEntriesResponse, MutationOutcome, StaleAggregates};
use ledgerweb_store::DeletedEntry;

use crate::error::ApiError;
use crate::routes::{filter_from_params, role_from_headers};
use crate::AppState;

/// The deletion queue, most recent deletion first
pub async fn list_deleted(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<DeletedEntriesResponse>, ApiError> {
    let filter = filter_from_params(&params)?;
    let response = state.ledger.deleted_entries(&filter).await?;
    Ok(Json(response))
}

pub async fn deleted_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedEntry>, ApiError> {
    let shadow = state.ledger.deleted_entry(&id).await?;
    Ok(Json(shadow))
}

/// Approve the deletion: permanently purge the entry
pub async fn approve_deletion(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<StaleAggregates>, ApiError> {
    let stale = state.ledger.approve_deletion(&id, role_from_headers(&headers)).await?;
    Ok(Json(stale))
}

/// Reject the deletion: the entry returns to the pending queue
pub async fn reject_deletion(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<MutationOutcome>, ApiError> {
    let outcome = state.ledger.reject_deletion(&id, role_from_headers(&headers)).await?;
    Ok(Json(outcome))
}

/// Administrative restore from the recovery view
pub async fn restore_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<MutationOutcome>, ApiError> {
    let outcome = state.ledger.restore(&id, role_from_headers(&headers)).await?;
    Ok(Json(outcome))
}

/// Administrative direct purge, bypassing deletion review
pub async fn purge_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<StaleAggregates>, ApiError> {
    let stale = state.ledger.purge(&id, role_from_headers(&headers)).await?;
    Ok(Json(stale))
}
