use crate::core::export::ExportFormat;
use crate::core::scanner::Scanner;
use crate::domain::model::{
    AnalyticsSnapshot, AsnInfo, BatchItem, BatchReport, GeoLocation, HistoryEntry, Outcome,
    RdapSummary, ValidationResult,
};
use crate::server::ApiError;
use crate::utils::error::ScannerError;
use axum::{
    extract::{Form, Path, State},
    http::header,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

type AppState = Arc<Scanner>;

#[derive(Debug, Deserialize)]
pub struct IpRequest {
    #[serde(default)]
    pub ip_address: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub ip_list: String,
}

#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub result: RdapSummary,
    pub query: String,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/validate", post(validate))
        .route("/lookup", post(lookup))
        .route("/enhanced_lookup", post(enhanced_lookup))
        .route("/batch_lookup", post(batch_lookup))
        .route("/export/:format", get(export))
        .route("/analytics", get(analytics))
        .route("/api/stats", get(analytics))
        .route("/geolocation/:ip", get(geolocation))
        .route("/asn/:ip", get(asn))
        .route("/history", get(history))
        .route("/clear_history", post(clear_history))
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// POST /validate
async fn validate(
    State(scanner): State<AppState>,
    Json(req): Json<IpRequest>,
) -> Json<ValidationResult> {
    Json(scanner.validate(&req.ip_address).await)
}

/// POST /lookup
async fn lookup(
    State(scanner): State<AppState>,
    Form(req): Form<IpRequest>,
) -> Result<Json<LookupResponse>, ApiError> {
    let query = req.ip_address.trim().to_string();
    let result = scanner.lookup(&query).await?;

    Ok(Json(LookupResponse {
        result,
        query,
        history: scanner.history().await,
    }))
}

/// POST /enhanced_lookup
async fn enhanced_lookup(
    State(scanner): State<AppState>,
    Json(req): Json<IpRequest>,
) -> Result<Json<BatchItem>, ApiError> {
    Ok(Json(scanner.enhanced_lookup(&req.ip_address).await?))
}

/// POST /batch_lookup
async fn batch_lookup(
    State(scanner): State<AppState>,
    Form(req): Form<BatchRequest>,
) -> Result<Json<BatchReport>, ApiError> {
    if req.ip_list.trim().is_empty() {
        return Err(ScannerError::invalid_input("Please enter IP addresses to process").into());
    }

    let report = scanner.batch(&req.ip_list).await?;
    Ok(Json(report.truncated(scanner.display_limit())))
}

/// GET /export/:format
async fn export(
    State(scanner): State<AppState>,
    Path(format): Path<String>,
) -> Result<Response, ApiError> {
    let format: ExportFormat = format.parse()?;
    let file = scanner.export_last(format).await?;

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.data,
    )
        .into_response())
}

/// GET /analytics, GET /api/stats
async fn analytics(State(scanner): State<AppState>) -> Json<AnalyticsSnapshot> {
    Json(scanner.analytics().await)
}

/// GET /geolocation/:ip
async fn geolocation(
    State(scanner): State<AppState>,
    Path(ip): Path<String>,
) -> Json<Outcome<GeoLocation>> {
    Json(scanner.locate(&ip).await.into())
}

/// GET /asn/:ip
async fn asn(
    State(scanner): State<AppState>,
    Path(ip): Path<String>,
) -> Json<Outcome<AsnInfo>> {
    Json(scanner.resolve_asn(&ip).await.into())
}

/// GET /history
async fn history(State(scanner): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(scanner.history().await)
}

/// POST /clear_history
async fn clear_history(State(scanner): State<AppState>) -> Json<MessageResponse> {
    scanner.clear_history().await;
    Json(MessageResponse {
        success: true,
        message: "Search history cleared".to_string(),
    })
}
