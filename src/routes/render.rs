//! Rendering routes
//!
//! Turns a markup string or a named template into PDF bytes and delivers
//! them as an attachment, inline, or onto a storage disk. Rendering is
//! CPU-bound and blocking, so each document runs on the blocking pool with
//! its own engine instance.

use std::collections::BTreeMap;

use axum::{
    extract::State,
    response::Response,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::{Document, RenderOptions};
use crate::error::{AppError, RenderError};
use crate::response;
use crate::state::AppState;

/// Create the render router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(render))
        .route("/view", post(render_view))
        .route("/save", post(render_save))
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    /// Literal markup; takes precedence over `template`
    #[serde(default)]
    pub html: Option<String>,
    /// Named template resolved through the view renderer
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub merge_data: Option<Value>,
    /// Engine options, forwarded verbatim
    #[serde(default)]
    pub options: Option<RenderOptions>,
    /// Document metadata (title, author, ...)
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, String>>,
    /// Per-request override of the configured warning policy
    #[serde(default)]
    pub strict_warnings: Option<bool>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub disposition: Option<Disposition>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Attachment,
    Inline,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    #[serde(flatten)]
    pub render: RenderRequest,
    /// Destination path on the disk
    pub path: String,
    /// Disk name; the configured default when omitted
    #[serde(default)]
    pub disk: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub disk: String,
    pub path: String,
    pub size: usize,
}

/// Render markup or a template and return the PDF
async fn render(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Response, AppError> {
    let filename = request
        .filename
        .clone()
        .unwrap_or_else(|| "document.pdf".to_string());
    let disposition = request.disposition.unwrap_or(Disposition::Attachment);

    let bytes = generate(state, request).await?;

    Ok(match disposition {
        Disposition::Attachment => response::download(bytes, &filename),
        Disposition::Inline => response::stream(bytes, &filename),
    })
}

/// Render a named template; `template` is required here
async fn render_view(
    State(state): State<AppState>,
    Json(request): Json<RenderRequest>,
) -> Result<Response, AppError> {
    if request.template.is_none() {
        return Err(AppError::InvalidRequest(
            "`template` is required".to_string(),
        ));
    }
    render(State(state), Json(request)).await
}

/// Render and persist to a disk
async fn render_save(
    State(state): State<AppState>,
    Json(request): Json<SaveRequest>,
) -> Result<Json<SaveResponse>, AppError> {
    let bytes = generate(state.clone(), request.render).await?;

    let (disk_name, disk) = state.disks().resolve(request.disk.as_deref())?;
    let disk_name = disk_name.to_string();
    disk.put(&request.path, &bytes).await?;

    tracing::info!(
        "Persisted {} bytes to {}:{}",
        bytes.len(),
        disk_name,
        request.path
    );

    Ok(Json(SaveResponse {
        disk: disk_name,
        path: request.path,
        size: bytes.len(),
    }))
}

/// Drive one document through the facade on the blocking pool
async fn generate(state: AppState, request: RenderRequest) -> Result<Vec<u8>, AppError> {
    if request.html.is_none() && request.template.is_none() {
        return Err(AppError::InvalidRequest(
            "request must include `html` or `template`".to_string(),
        ));
    }

    let bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, RenderError> {
        let mut doc = Document::with_config(state.engines().create()?, state.config());

        if let Some(strict) = request.strict_warnings {
            doc.set_strict_warnings(strict);
        }
        if let Some(options) = request.options {
            doc.set_options(options);
        }
        if let Some(metadata) = &request.metadata {
            for (key, value) in metadata {
                doc.add_info(key, value);
            }
        }

        if let Some(html) = &request.html {
            doc.load_html(html)?;
        } else if let Some(template) = &request.template {
            let data = request.data.clone().unwrap_or(Value::Null);
            let merge_data = request.merge_data.clone().unwrap_or(Value::Null);
            doc.load_view(state.views().as_ref(), template, &data, &merge_data)?;
        }

        doc.bytes_default()
    })
    .await
    .map_err(|e| RenderError::Engine(format!("render task failed: {e}")))??;

    Ok(bytes)
}
