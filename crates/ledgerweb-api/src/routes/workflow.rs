//! Lifecycle transition endpoints, single and bulk
//!
//! The caller's role travels in the `x-role` header; approval-class
//! transitions reject non-admin callers with 403.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use ledgerweb_core::{BulkOutcome, DeletionOutcome, MutationOutcome};

use crate::error::ApiError;
use crate::routes::{role_from_headers, user_from_headers};
use crate::AppState;

pub async fn approve_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<MutationOutcome>, ApiError> {
    let outcome = state.ledger.approve(&id, role_from_headers(&headers)).await?;
    Ok(Json(outcome))
}

pub async fn reject_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<MutationOutcome>, ApiError> {
    let outcome = state.ledger.reject(&id, role_from_headers(&headers)).await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct LockBody {
    pub locked: bool,
}

/// Administrative lock toggle
pub async fn lock_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<LockBody>,
) -> Result<Json<MutationOutcome>, ApiError> {
    let outcome = state
        .ledger
        .set_locked(&id, body.locked, role_from_headers(&headers))
        .await?;
    Ok(Json(outcome))
}

/// Soft-delete an entry into the deletion queue
pub async fn soft_delete_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<DeletionOutcome>, ApiError> {
    let by = user_from_headers(&headers);
    let outcome = state.ledger.soft_delete(&id, &by).await?;
    Ok(Json(outcome))
}

// ==================== Bulk approvals ====================

#[derive(Debug, Deserialize)]
pub struct ApproveManyBody {
    pub ids: Vec<String>,
}

pub async fn approve_many(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ApproveManyBody>,
) -> Result<Json<BulkOutcome>, ApiError> {
    let outcome = state
        .ledger
        .approve_many(&body.ids, role_from_headers(&headers))
        .await?;
    Ok(Json(outcome))
}

pub async fn approve_company(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(company): Path<String>,
) -> Result<Json<BulkOutcome>, ApiError> {
    let outcome = state
        .ledger
        .approve_all_for_company(&company, role_from_headers(&headers))
        .await?;
    Ok(Json(outcome))
}

pub async fn approve_staff(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(staff): Path<String>,
) -> Result<Json<BulkOutcome>, ApiError> {
    let outcome = state
        .ledger
        .approve_all_for_staff(&staff, role_from_headers(&headers))
        .await?;
    Ok(Json(outcome))
}

pub async fn approve_pending(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BulkOutcome>, ApiError> {
    let outcome = state.ledger.approve_all_pending(role_from_headers(&headers)).await?;
    Ok(Json(outcome))
}
