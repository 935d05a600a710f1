//! Shared context for ABBI chat turns.
//!
//! - [`client`]: JSON-RPC client for the remote tool gateway
//! - [`envelope`]: request building and nested-payload decoding
//! - [`hivemind`]: shared-memory read/write tools
//! - [`skills`]: active skill / boot-context queries
//! - [`assembler`]: best-effort, concurrent context retrieval
//! - [`prompt`]: system prompt template

pub mod assembler;
pub mod client;
pub mod envelope;
pub mod hivemind;
pub mod prompt;
pub mod skills;

pub use assembler::{ContextAssembler, ContextBundle, ContextFragment, EMPTY_FRAGMENT};
pub use client::{GatewayClient, ToolGateway};
pub use hivemind::{MemoryFilter, MemoryRecord, MemoryWrite};
pub use prompt::{SessionParams, render_system_prompt};
pub use skills::SkillRecord;
