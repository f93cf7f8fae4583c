//! Batch import endpoint
//!
//! The client hands over an already-tabular row set (file parsing is a
//! client concern); the response carries the full import report. Row
//! failures are part of the report, never an HTTP error.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use ledgerweb_import::{ImportReport, Importer, RawRow};

use crate::error::ApiError;
use crate::routes::user_from_headers;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ImportBody {
    pub rows: Vec<RawRow>,
}

pub async fn import_rows(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ImportBody>,
) -> Result<Json<ImportReport>, ApiError> {
    let entered_by = user_from_headers(&headers);
    let importer = Importer::new(state.ledger.clone());
    let report = importer.import_rows(body.rows, &entered_by, None).await;
    Ok(Json(report))
}
