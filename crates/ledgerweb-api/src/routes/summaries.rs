//! Aggregation endpoints: running balance and grouped totals
//!
//! The aggregation runs on a spawned task holding a cancellation token
//! whose guard lives in the handler future. When the client disconnects
//! axum drops the handler, the guard cancels the token, and the
//! spawned fold stops instead of finishing for nobody.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use tokio_util::sync::CancellationToken;

use ledgerweb_core::{
    AccountSummary, CompanySummary, LedgerError, LedgerSummary, RunningBalanceRow,
    SubAccountSummary,
};

use crate::error::ApiError;
use crate::routes::filter_from_params;
use crate::AppState;

fn join_error(err: tokio::task::JoinError) -> ApiError {
    ApiError::Ledger(LedgerError::Internal { message: err.to_string() })
}

/// Running balance over the filtered entries, chronological
pub async fn running_balance(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<RunningBalanceRow>>, ApiError> {
    let filter = filter_from_params(&params)?;
    let token = CancellationToken::new();
    let _guard = token.clone().drop_guard();

    let ledger = state.ledger.clone();
    let rows = tokio::spawn(async move { ledger.running_balance(&filter, &token).await })
        .await
        .map_err(join_error)??;
    Ok(Json(rows))
}

/// Per-company totals, largest absolute exposure first
pub async fn company_summaries(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<CompanySummary>>, ApiError> {
    let filter = filter_from_params(&params)?;
    let token = CancellationToken::new();
    let _guard = token.clone().drop_guard();

    let ledger = state.ledger.clone();
    let summaries = tokio::spawn(async move { ledger.company_summaries(&filter, &token).await })
        .await
        .map_err(join_error)??;
    Ok(Json(summaries))
}

/// Per-account totals; keyed per company unless one is pinned
pub async fn account_summaries(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<AccountSummary>>, ApiError> {
    let filter = filter_from_params(&params)?;
    let token = CancellationToken::new();
    let _guard = token.clone().drop_guard();

    let ledger = state.ledger.clone();
    let summaries = tokio::spawn(async move { ledger.account_summaries(&filter, &token).await })
        .await
        .map_err(join_error)??;
    Ok(Json(summaries))
}

/// Per-sub-account totals
pub async fn sub_account_summaries(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<SubAccountSummary>>, ApiError> {
    let filter = filter_from_params(&params)?;
    let token = CancellationToken::new();
    let _guard = token.clone().drop_guard();

    let ledger = state.ledger.clone();
    let summaries =
        tokio::spawn(async move { ledger.sub_account_summaries(&filter, &token).await })
            .await
            .map_err(join_error)??;
    Ok(Json(summaries))
}

/// Whole-ledger overview
pub async fn ledger_summary(
    State(state): State<AppState>,
) -> Result<Json<LedgerSummary>, ApiError> {
    let summary = state.ledger.summary().await?;
    Ok(Json(summary))
}
