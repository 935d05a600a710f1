//! # ABBI Core
//!
//! Domain types, traits, and error definitions for the ABBI chat gateway.
//! This crate has no framework dependencies: it defines the model that the
//! config, context, provider and server crates implement against.

pub mod error;
pub mod message;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{DispatchError, Error, GatewayError, Result, ValidationError};
pub use message::{ChatRequest, DEFAULT_MAX_TOKENS, Message, MessageContent};
pub use provider::{ChatAdapter, ProviderFamily, ProviderHttpRequest, UpstreamReply};
