//! HTTP JSON API server
//!
//! Routes are organized into modules:
//! - routes::entries: entry list, detail, create, edit
//! - routes::workflow: lifecycle transitions, single and bulk
//! - routes::deleted: deletion queue and recovery
//! - routes::summaries: running balance and grouped totals
//! - routes::options: cascading filter option catalogs
//! - routes::import: batch row import

pub mod error;
pub mod routes;

use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use ledgerweb_config::Config;
use ledgerweb_core::LedgerRef;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub ledger: LedgerRef,
    pub config: Config,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::deleted::{
        approve_deletion, deleted_detail, list_deleted, purge_entry, reject_deletion,
        restore_entry,
    };
    use routes::entries::{create_entry, edit_entry, entry_detail, list_entries};
    use routes::import::import_rows;
    use routes::options::filter_options;
    use routes::summaries::{
        account_summaries, company_summaries, ledger_summary, running_balance,
        sub_account_summaries,
    };
    use routes::workflow::{
        approve_company, approve_entry, approve_many, approve_pending, approve_staff,
        lock_entry, reject_entry, soft_delete_entry,
    };

    Router::new()
        .route("/api/health", get(health_check))
        // Entries
        .route("/api/entries", get(list_entries).post(create_entry))
        .route(
            "/api/entries/:id",
            get(entry_detail).put(edit_entry).delete(soft_delete_entry),
        )
        // Lifecycle transitions
        .route("/api/entries/:id/approve", post(approve_entry))
        .route("/api/entries/:id/reject", post(reject_entry))
        .route("/api/entries/:id/lock", put(lock_entry))
        // Bulk approvals
        .route("/api/approvals", post(approve_many))
        .route("/api/approvals/pending", post(approve_pending))
        .route("/api/approvals/company/:company", post(approve_company))
        .route("/api/approvals/staff/:staff", post(approve_staff))
        // Deletion queue and recovery
        .route("/api/deleted", get(list_deleted))
        .route("/api/deleted/:id", get(deleted_detail).delete(purge_entry))
        .route("/api/deleted/:id/approve", post(approve_deletion))
        .route("/api/deleted/:id/reject", post(reject_deletion))
        .route("/api/deleted/:id/restore", post(restore_entry))
        // Aggregation
        .route("/api/summary", get(ledger_summary))
        .route("/api/summaries/companies", get(company_summaries))
        .route("/api/summaries/accounts", get(account_summaries))
        .route("/api/summaries/sub-accounts", get(sub_account_summaries))
        .route("/api/running-balance", get(running_balance))
        // Filter options
        .route("/api/options", get(filter_options))
        // Import
        .route("/api/import", post(import_rows))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Start the HTTP server.
///
/// Creates the router, binds to the configured address, and serves
/// until the process is stopped.
pub async fn start_server(config: Config, ledger: LedgerRef) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState { ledger, config };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!(target: "ledgerweb::api", "listening on http://{}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}
