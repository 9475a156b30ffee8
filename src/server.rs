//! The read-only HTTP route layer.
//!
//! - `GET /transactions` returns the current snapshot as a JSON array, or 503 if no ingestion pass
//!   has succeeded yet.
//! - `POST /transactions/refresh` runs a new pass. On success it returns the new list, otherwise
//!   503 and the previous snapshot stays in place.

use crate::error::{ErrorType, IntoResult};
use crate::ingest::{Ingestor, Snapshot};
use crate::Result;
use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub const TRANSACTIONS: &str = "/transactions";
pub const REFRESH: &str = "/transactions/refresh";

/// Shared state for the handlers.
#[derive(Clone)]
pub struct AppState {
    ingestor: Arc<Ingestor>,
    snapshot: Snapshot,
}

impl AppState {
    pub fn new(ingestor: Arc<Ingestor>, snapshot: Snapshot) -> Self {
        Self { ingestor, snapshot }
    }

    pub fn ingestor(&self) -> &Ingestor {
        &self.ingestor
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

/// Return a router with all the app's routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(TRANSACTIONS, get(get_transactions))
        .route(REFRESH, post(refresh_transactions))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `addr` and serves `router(state)` until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Unable to listen on {addr}"))
        .pub_result(ErrorType::Service)?;
    let local = listener
        .local_addr()
        .context("Unable to read the listening address")
        .pub_result(ErrorType::Service)?;
    info!("Serving transactions at http://{local}{TRANSACTIONS}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("The HTTP server failed")
        .pub_result(ErrorType::Service)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Unable to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn get_transactions(State(state): State<AppState>) -> Response {
    match state.snapshot.current().await {
        Some(transactions) => Json(transactions.to_vec()).into_response(),
        None => unavailable(json!({
            "error": "Transactions have not been ingested yet",
        })),
    }
}

async fn refresh_transactions(State(state): State<AppState>) -> Response {
    match state.snapshot.refresh(&state.ingestor).await {
        Ok(transactions) => Json(transactions.to_vec()).into_response(),
        Err(e) => {
            error!("Refreshing transactions failed: {e}");
            unavailable(json!({
                "error": "Ingestion failed",
                "kind": e.error_type(),
            }))
        }
    }
}

fn unavailable(body: serde_json::Value) -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
}
