//! Error types for the ABBI domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] wraps them all.

use thiserror::Error;

/// The top-level error type for all ABBI operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Remote tool gateway ---
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    // --- Provider dispatch ---
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    // --- Inbound validation ---
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures talking to the remote JSON-RPC tool gateway.
///
/// `MissingPayload` and `MalformedPayload` describe a reply that arrived
/// but did not carry a usable nested document; `Transport` means no usable
/// reply arrived at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("gateway transport failure: {0}")]
    Transport(String),

    #[error("gateway reply has no text content element")]
    MissingPayload,

    #[error("gateway payload is not valid JSON: {0}")]
    MalformedPayload(String),
}

/// Failures reaching an upstream LLM provider.
///
/// A provider that answers with a non-2xx status is *not* an error here:
/// that answer is relayed to the caller unchanged.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("{provider} request failed: {message}")]
    Transport { provider: String, message: String },
}

/// Inbound request problems detected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(String),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("invalid request body: {0}")]
    MalformedBody(String),

    #[error("Method not allowed")]
    MethodNotAllowed,
}
