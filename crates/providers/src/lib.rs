//! Provider adapters for ABBI.
//!
//! Each adapter implements `abbi_core::ChatAdapter` and turns a
//! normalized chat request into one provider's native HTTP call. The
//! router picks the adapter from the model name and the dispatcher
//! performs the call.

pub mod anthropic;
pub mod dispatch;
pub mod gemini;
pub mod openai_compat;
pub mod router;

pub use anthropic::AnthropicAdapter;
pub use dispatch::Dispatcher;
pub use gemini::GeminiAdapter;
pub use openai_compat::OpenAiCompatAdapter;
pub use router::{adapter_for, select_adapter, select_family};
