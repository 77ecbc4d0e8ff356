//! HTTP handlers for scoring, products and reports

use crate::error::AnalyzerError;
use crate::metrics::METRICS;
use crate::product::ProductRecord;
use crate::report::{GenerateOptions, StructuredReport};
use crate::scoring::{ScoreBreakdown, ScoringStrategy};
use crate::service::ProductAnalyzer;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Message shown for failed generations; details stay in the logs
pub const GENERATION_FAILED_MESSAGE: &str = "generation failed, please retry";

/// Application state shared by handlers
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<ProductAnalyzer>,
    /// Variant used when a report request carries no body
    pub default_professional: bool,
}

/// API error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

/// Map a crate error to a status code and body
pub fn error_response(err: AnalyzerError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        AnalyzerError::Validation(_) => StatusCode::BAD_REQUEST,
        AnalyzerError::NotFound(_) => StatusCode::NOT_FOUND,
        AnalyzerError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
        AnalyzerError::Upstream(_) => StatusCode::BAD_GATEWAY,
        AnalyzerError::Persistence(_) | AnalyzerError::Serialization(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let message = if err.is_generation_failure() {
        GENERATION_FAILED_MESSAGE.to_string()
    } else {
        err.to_string()
    };

    (status, Json(ApiError::new(err.code(), message)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.render(),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct ScoreQuery {
    #[serde(default)]
    pub model: Option<ScoringStrategy>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub score: u8,
    pub model: ScoringStrategy,
    pub breakdown: ScoreBreakdown,
}

/// Score a record without storing it
///
/// POST /api/v1/score?model=standard|advanced
pub async fn score_product(
    State(state): State<AppState>,
    Query(query): Query<ScoreQuery>,
    Json(record): Json<ProductRecord>,
) -> Json<ScoreResponse> {
    let model = query.model.unwrap_or_default();
    let breakdown = state.analyzer.breakdown(&record, model);

    Json(ScoreResponse {
        score: breakdown.final_score(),
        model,
        breakdown,
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProductResponse {
    pub id: Uuid,
}

/// POST /api/v1/products
pub async fn create_product(
    State(state): State<AppState>,
    Json(record): Json<ProductRecord>,
) -> ApiResult<(StatusCode, Json<CreateProductResponse>)> {
    match state.analyzer.create_product(record).await {
        Ok(saved) => {
            let id = saved.id.unwrap_or_else(Uuid::nil);
            info!(product_id = %id, "Product created");
            Ok((StatusCode::CREATED, Json(CreateProductResponse { id })))
        }
        Err(e) => {
            warn!("Product rejected: {}", e);
            Err(error_response(e))
        }
    }
}

/// GET /api/v1/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProductRecord>> {
    state
        .analyzer
        .get_product(id)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Options of a report request; an empty body selects the server defaults
pub fn parse_generate_options(
    body: &[u8],
    default_professional: bool,
) -> Result<GenerateOptions, AnalyzerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerateOptions {
            professional: default_professional,
            regenerate: false,
        });
    }
    serde_json::from_slice(body)
        .map_err(|e| AnalyzerError::Validation(format!("invalid report options: {}", e)))
}

/// Generate, or return the existing, report of a product
///
/// POST /api/v1/products/:id/report
pub async fn generate_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> ApiResult<Json<StructuredReport>> {
    let options = match parse_generate_options(&body, state.default_professional) {
        Ok(options) => options,
        Err(e) => {
            warn!(product_id = %id, "Report request rejected: {}", e);
            return Err(error_response(e));
        }
    };
    info!(
        product_id = %id,
        professional = options.professional,
        regenerate = options.regenerate,
        "Report request"
    );

    match state.analyzer.generate_report(id, options).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            error!(product_id = %id, "Report request failed: {}", e);
            Err(error_response(e))
        }
    }
}

/// GET /api/v1/products/:id/report
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StructuredReport>> {
    match state.analyzer.latest_report(id).await {
        Ok(Some(report)) => Ok(Json(report)),
        Ok(None) => Err(error_response(AnalyzerError::NotFound(format!(
            "no report for product {}",
            id
        )))),
        Err(e) => Err(error_response(e)),
    }
}
