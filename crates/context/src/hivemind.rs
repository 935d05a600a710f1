//! Shared-memory ("Hive Mind") tools on the gateway.
//!
//! Entries are written by any AI session and read back to give a new
//! conversation continuity. The backing warehouse returns upper-case column
//! names, so record fields accept both spellings.

use abbi_core::{GatewayError, ValidationError};
use serde::{Deserialize, Deserializer, Serialize};

use crate::client::ToolGateway;
use crate::envelope;

pub const READ_TOOL: &str = "hivemind_read";
pub const WRITE_TOOL: &str = "hivemind_write";

/// Default page size for direct reads (the chat prompt uses its own limit).
pub const DEFAULT_READ_LIMIT: usize = 10;

pub const DEFAULT_WORKSTREAM: &str = "GENERAL";
pub const DEFAULT_PRIORITY: &str = "MEDIUM";

/// A shared-memory entry as returned by `hivemind_read`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MemoryRecord {
    #[serde(default, alias = "CATEGORY", deserialize_with = "null_as_empty")]
    pub category: String,
    #[serde(default, alias = "SUMMARY", deserialize_with = "null_as_empty")]
    pub summary: String,
    #[serde(default, alias = "WORKSTREAM")]
    pub workstream: Option<String>,
}

/// Warehouse columns may be NULL; treat that like a missing column.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Filters for `hivemind_read`.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryFilter {
    #[serde(default = "default_read_limit")]
    pub limit: usize,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub workstream: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

fn default_read_limit() -> usize {
    DEFAULT_READ_LIMIT
}

impl MemoryFilter {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            category: None,
            workstream: None,
            source: None,
        }
    }

    /// Tool arguments; unset filters are omitted rather than sent as null.
    pub fn to_arguments(&self) -> serde_json::Value {
        let mut args = serde_json::json!({ "limit": self.limit });
        for (key, value) in [
            ("category", &self.category),
            ("workstream", &self.workstream),
            ("source", &self.source),
        ] {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                args[key] = serde_json::json!(v);
            }
        }
        args
    }
}

impl Default for MemoryFilter {
    fn default() -> Self {
        Self::with_limit(DEFAULT_READ_LIMIT)
    }
}

/// A new shared-memory entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryWrite {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub workstream: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl MemoryWrite {
    /// `source`, `category` and `summary` are mandatory.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing = [
            ("source", &self.source),
            ("category", &self.category),
            ("summary", &self.summary),
        ]
        .into_iter()
        .filter(|(_, v)| v.as_deref().is_none_or(str::is_empty))
        .map(|(name, _)| name)
        .collect::<Vec<_>>();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingField(missing.join(", ")))
        }
    }

    /// Tool arguments with defaults filled in.
    pub fn to_arguments(&self) -> serde_json::Value {
        serde_json::json!({
            "source": self.source,
            "category": self.category,
            "workstream": self.workstream.as_deref().unwrap_or(DEFAULT_WORKSTREAM),
            "summary": self.summary,
            "details": self.details.clone().unwrap_or_else(|| serde_json::json!({})),
            "priority": self.priority.as_deref().unwrap_or(DEFAULT_PRIORITY),
            "tags": self.tags.clone().unwrap_or_default(),
        })
    }
}

/// Read entries; returns the decoded tool payload unchanged.
pub async fn read(
    gateway: &dyn ToolGateway,
    filter: &MemoryFilter,
) -> Result<serde_json::Value, GatewayError> {
    gateway.call_tool(READ_TOOL, filter.to_arguments()).await
}

/// Write an entry. Fire-and-forget: the raw gateway reply is returned
/// without looking inside it.
pub async fn write(
    gateway: &dyn ToolGateway,
    entry: &MemoryWrite,
) -> Result<serde_json::Value, GatewayError> {
    let request = envelope::tool_call(WRITE_TOOL, entry.to_arguments());
    gateway.post_rpc(&request).await
}
