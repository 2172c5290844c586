//! Error types
//!
//! Unified error handling for the rendering facade and the HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Unified rendering error type
///
/// Every failure is a single propagate-or-translate decision: engine and
/// storage failures carry the backend's message unmodified, nothing is
/// retried or swallowed.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A forwarded method resolves to nothing on the engine
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The engine cannot provide a required capability (e.g. encryption)
    #[error("Unsupported capability: {0}")]
    UnsupportedCapability(&'static str),

    /// Rendering completed but the engine reported warnings and the
    /// document is in strict mode
    #[error("Rendering completed with warnings:\n{0}")]
    RenderedWithWarnings(String),

    /// Any error surfaced by the wrapped engine during load/render/serialize
    #[error("Engine error: {0}")]
    Engine(String),

    /// Storage backend failure, propagated unmodified
    #[error("Storage error: {0}")]
    Storage(String),

    /// View template failure (missing template, render error, bad data)
    #[error("Template error: {0}")]
    Template(String),

    /// IO error (std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for rendering operations
pub type Result<T> = std::result::Result<T, RenderError>;

/// Route-level error wrapper
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "InvalidRequest", self.to_string()),
            Self::Render(ref e) => match e {
                RenderError::UnsupportedOperation(_) | RenderError::Template(_) => {
                    (StatusCode::BAD_REQUEST, "InvalidRequest", self.to_string())
                }
                RenderError::UnsupportedCapability(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "UnsupportedCapability",
                    self.to_string(),
                ),
                RenderError::RenderedWithWarnings(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "RenderedWithWarnings",
                    self.to_string(),
                ),
                RenderError::Engine(_) => {
                    tracing::error!("Engine failure: {}", e);
                    (StatusCode::BAD_GATEWAY, "EngineFailure", self.to_string())
                }
                RenderError::Storage(_) | RenderError::Io(_) => {
                    tracing::error!("Internal error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "InternalError",
                        "An internal error occurred".to_string(),
                    )
                }
            },
        };

        let body = Json(json!({
            "error": code,
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_operation_names_method() {
        let err = RenderError::UnsupportedOperation("get_dom".to_string());
        assert!(err.to_string().contains("get_dom"));
    }

    #[test]
    fn test_warning_message_is_multiline() {
        let err = RenderError::RenderedWithWarnings("first\nsecond".to_string());
        let msg = err.to_string();
        assert!(msg.contains("first\nsecond"));
    }
}
