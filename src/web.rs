use crate::advisory::{self, Suggestion};
use crate::errors::{CropWaterError, CropWaterResult};
use crate::input_parameters::{input_schema, InputParameters, InputRecord};
use crate::water_advisor::WaterAdvisor;
use axum::{
    extract::{Extension, FromRequest, Request},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub request_id: Uuid,
    pub model_id: String,
    pub water_requirement_mm_per_day: f64,
    /// e.g. "6.46 mm/day"
    pub formatted: String,
    pub balanced: bool,
    pub suggestions: Vec<Suggestion>,
    /// Display lines: suggestions, or the balanced message
    pub messages: Vec<String>,
    pub features: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdviseResponse {
    pub balanced: bool,
    pub suggestions: Vec<Suggestion>,
    pub messages: Vec<String>,
}

/// JSON request body whose parse failures answer like any other input error.
pub struct InputJson(pub InputRecord);

impl<S> FromRequest<S> for InputJson
where
    S: Send + Sync,
{
    type Rejection = CropWaterError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(record) = Json::<InputRecord>::from_request(req, state)
            .await
            .map_err(|rejection| CropWaterError::invalid_input(rejection.body_text()))?;
        Ok(Self(record))
    }
}

/// Build the JSON API around a loaded advisor, with versioned aliases and health checks
pub fn build_router(advisor: Arc<WaterAdvisor>) -> Router {
    Router::new()
        // current endpoints
        .route("/api/predict", post(predict))
        .route("/api/advise", post(advise))
        .route("/api/schema", get(schema))
        .route("/api/status", get(status))
        // versioned aliases
        .route("/v1/predict", post(predict))
        .route("/v1/advise", post(advise))
        .route("/v1/schema", get(schema))
        // health endpoints
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .layer(Extension(advisor))
        .layer(CorsLayer::permissive())
}

async fn predict(
    Extension(advisor): Extension<Arc<WaterAdvisor>>,
    InputJson(record): InputJson,
) -> CropWaterResult<Json<PredictResponse>> {
    let params = InputParameters::try_from(record)?;
    let report = advisor.advise(&params)?;

    Ok(Json(PredictResponse {
        request_id: report.request_id,
        model_id: report.model_id.clone(),
        water_requirement_mm_per_day: report.prediction.mm_per_day,
        formatted: report.prediction.to_string(),
        balanced: report.advisory.is_balanced(),
        suggestions: report.advisory.suggestions().to_vec(),
        messages: report.advisory.lines(),
        features: report.features.to_vec(),
    }))
}

async fn advise(InputJson(record): InputJson) -> CropWaterResult<Json<AdviseResponse>> {
    let params = InputParameters::try_from(record)?;
    let advisory = advisory::evaluate(&params);

    Ok(Json(AdviseResponse {
        balanced: advisory.is_balanced(),
        suggestions: advisory.suggestions().to_vec(),
        messages: advisory.lines(),
    }))
}

async fn schema() -> Json<serde_json::Value> {
    Json(input_schema())
}

async fn status(Extension(advisor): Extension<Arc<WaterAdvisor>>) -> Json<serde_json::Value> {
    Json(advisor.status())
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// The model is loaded before the router exists, so a running server is ready.
async fn readyz(Extension(advisor): Extension<Arc<WaterAdvisor>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "ready": true,
        "model_id": advisor.prediction_service().metadata().model_id,
    }))
}

/// Bind and serve until the process is stopped.
pub async fn serve(advisor: Arc<WaterAdvisor>, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {addr}: {e}"))?;
    tracing::info!("HTTP server listening on http://{addr}");
    axum::serve(listener, build_router(advisor)).await?;
    Ok(())
}
