//! HTTP surface of the service.
//!
//! Every route lives under `/api` and answers with the [`response::ApiResponse`]
//! envelope. Core errors become responses through the `IntoResponse` impl in
//! [`error`].

pub mod auth;
pub mod error;
pub mod extract;
pub mod response;
pub mod routes;
pub mod validate;

use crate::errors::Result;
use auth::TokenKeys;
use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub tokens: Arc<TokenKeys>,
}

impl AppState {
    #[must_use]
    pub fn new(db: DatabaseConnection, tokens: TokenKeys) -> Self {
        Self {
            db,
            tokens: Arc::new(tokens),
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the router on `bind` until Ctrl-C.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(state: AppState, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
