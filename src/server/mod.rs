//! HTTP API
//!
//! ```bash
//! ripescanner serve --bind 127.0.0.1:5000
//!
//! curl -X POST http://localhost:5000/validate \
//!   -H "Content-Type: application/json" \
//!   -d '{"ip_address": "8.8.8.8"}'
//!
//! curl -X POST http://localhost:5000/batch_lookup \
//!   --data-urlencode $'ip_list=8.8.8.8\n1.1.1.1'
//!
//! curl -O http://localhost:5000/export/csv
//! curl http://localhost:5000/analytics
//! ```

pub mod routes;

use crate::config::ScannerConfig;
use crate::core::scanner::Scanner;
use crate::utils::error::{ErrorCategory, ScannerError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::Router;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// 包裝 `ScannerError` 以轉成 HTTP 回應
#[derive(Debug)]
pub struct ApiError(pub ScannerError);

impl From<ScannerError> for ApiError {
    fn from(e: ScannerError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match (&self.0, self.0.category()) {
            (ScannerError::NotFound { .. }, _) => StatusCode::NOT_FOUND,
            (_, ErrorCategory::Input) => StatusCode::BAD_REQUEST,
            (_, ErrorCategory::Network | ErrorCategory::Upstream) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: self.0.user_friendly_message(),
            }),
        )
            .into_response()
    }
}

pub fn create_router(scanner: Arc<Scanner>) -> Router {
    routes::api_routes()
        .with_state(scanner)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(config: &ScannerConfig) -> anyhow::Result<()> {
    let scanner = Arc::new(Scanner::from_config(config)?);
    let app = create_router(scanner);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("🌐 Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
