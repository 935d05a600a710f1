//! HTTP error mapping.
//!
//! Every failure leaves the server as a status plus a small JSON object.
//! Tool-backed endpoints answer `{"success": false, "error": ...}`; the
//! rest answer `{"error": ...}`.

use abbi_core::{DispatchError, GatewayError, ValidationError};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::warn;

use crate::store::StoreError;

#[derive(Debug)]
pub enum ApiError {
    /// Rejected before any outbound call.
    Validation(ValidationError),
    NotFound(String),
    /// A gateway tool produced nothing usable.
    Tool(String),
    /// Raw gateway passthrough failed.
    Gateway(GatewayError),
    Dispatch(DispatchError),
    Store(StoreError),
}

impl ApiError {
    /// Tool failure with a fixed message for replies that carried no payload.
    pub fn tool(err: GatewayError, no_data: &str) -> Self {
        match err {
            GatewayError::MissingPayload => Self::Tool(no_data.to_string()),
            other => Self::Tool(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        Self::Dispatch(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(ValidationError::MalformedBody(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(ValidationError::MalformedBody(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Validation(ValidationError::MethodNotAllowed) => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "error": ValidationError::MethodNotAllowed.to_string() }),
            ),
            Self::Validation(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Self::NotFound(what) => (StatusCode::NOT_FOUND, json!({ "error": what })),
            Self::Tool(message) => {
                warn!(error = %message, "Gateway tool call failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "success": false, "error": message }),
                )
            }
            Self::Gateway(err) => {
                warn!(error = %err, "Gateway passthrough failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": err.to_string() }),
                )
            }
            Self::Dispatch(err) => {
                warn!(error = %err, "Provider dispatch failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": err.to_string() }),
                )
            }
            Self::Store(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": err.to_string() }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Fallback for methods a route does not serve.
pub async fn method_not_allowed() -> ApiError {
    ApiError::Validation(ValidationError::MethodNotAllowed)
}

/// Bare `OPTIONS` answer; CORS headers come from the layer.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
