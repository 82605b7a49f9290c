//! Layout API handlers.
//!
//! Request bodies are parsed by hand rather than through `Json<T>` so that
//! every malformed template or data context answers `400` with a JSON
//! `{"error": ...}` body naming the problem.

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::data::DataContext;
use crate::layout::{LayoutEngine, RenderTree};
use crate::mock::synthesize;
use crate::template::Template;
use crate::units::UnitConfig;

use super::super::state::AppState;

type ApiError = (StatusCode, Json<Value>);

fn bad_request(message: impl std::fmt::Display) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message.to_string() })))
}

/// Body of `POST /api/layout`.
#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    pub template: Value,
    /// Data context; synthesized from the template when absent.
    #[serde(default)]
    pub data: Option<Value>,
    /// Zoom factor. Default: 1.
    #[serde(default)]
    pub scale: Option<f64>,
    /// Target device resolution; overrides the server's unit preset.
    #[serde(default)]
    pub dpi: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    pub tree: RenderTree,
    pub data: DataContext,
    /// Whether `data` was synthesized rather than supplied.
    pub synthesized: bool,
}

/// Handle GET /api/health.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Handle POST /api/mock - synthesize sample data for a template.
pub async fn mock(body: Bytes) -> Result<Json<DataContext>, ApiError> {
    let value: Value = serde_json::from_slice(&body).map_err(bad_request)?;
    let template = Template::from_value(value).map_err(bad_request)?;
    Ok(Json(synthesize(&template)))
}

/// Handle POST /api/layout - lay out a template against data.
pub async fn layout(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<LayoutResponse>, ApiError> {
    let request: LayoutRequest = serde_json::from_slice(&body).map_err(bad_request)?;
    let template = Template::from_value(request.template).map_err(bad_request)?;

    let scale = request.scale.unwrap_or(1.0);
    if !(scale.is_finite() && scale > 0.0) {
        return Err(bad_request(format!("scale must be a positive number, got {}", scale)));
    }

    let units = match request.dpi {
        Some(dpi) if dpi.is_finite() && dpi > 0.0 => UnitConfig::from_dpi(dpi),
        Some(dpi) => return Err(bad_request(format!("dpi must be a positive number, got {}", dpi))),
        None => state.config.units,
    };

    let (data, synthesized) = match request.data {
        Some(Value::Null) | None => (synthesize(&template), true),
        Some(value) => (DataContext::from_value(value).map_err(bad_request)?, false),
    };

    let tree = LayoutEngine::new(units).layout(&template, &data, scale);
    tracing::debug!(nodes = tree.nodes.len(), synthesized, "layout request served");

    Ok(Json(LayoutResponse {
        tree,
        data,
        synthesized,
    }))
}
