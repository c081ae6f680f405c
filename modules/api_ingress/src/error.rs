use std::any::Any;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::request_id::XRequestId;

/// Failures produced by the HTTP layer itself. GraphQL errors never take this
/// path; they travel inside the 200 response envelope.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<&'a str>,
    #[cfg(feature = "debug-errors")]
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    pub fn into_response_with(self, request_id: Option<&str>) -> Response {
        use AppError::*;

        let (status, code, safe_msg) = match &self {
            NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            ),
        };

        let rid = request_id.unwrap_or("n/a");
        match &self {
            Internal(err) => tracing::error!(
                request_id = %rid,
                error = %format!("{err:#}"),
                status = status.as_u16(),
                "request failed"
            ),
            other => tracing::warn!(
                request_id = %rid,
                error = %other,
                status = status.as_u16(),
                "request failed"
            ),
        }

        let body = ErrorBody {
            code,
            message: safe_msg,
            request_id,
            #[cfg(feature = "debug-errors")]
            details: match &self {
                Internal(err) => Some(format!("{err:#}")),
                _ => None,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_response_with(None)
    }
}

/// Fallback for unknown routes.
pub async fn not_found(req: Request<Body>) -> Response {
    let rid = req.extensions().get::<XRequestId>().map(|r| r.0.clone());
    AppError::NotFound(format!("No route for {} {}", req.method(), req.uri().path()))
        .into_response_with(rid.as_deref())
}

/// Converts a handler panic into a 500 JSON response.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}
