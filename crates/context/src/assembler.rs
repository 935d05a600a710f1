//! Context assembly: best-effort retrieval of shared memory and active
//! skills for the system prompt.
//!
//! Two sources are fetched concurrently and independently:
//!
//! 1. **Recent memory**: `hivemind_read` with a small limit
//! 2. **Active skills**: bounded warehouse query for HOT/ACTIVE skills
//!
//! Either source failing (transport, missing or malformed payload, a tool
//! reporting `success: false`, an unexpected shape) yields an empty fragment
//! and a `warn!` event. Nothing here ever fails the chat turn.
//!
//! Both fetches complete, or the deadline elapses, before anything is
//! rendered. On deadline both fragments are empty.

use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::client::ToolGateway;
use crate::envelope::ToolPayload;
use crate::hivemind::{self, MemoryFilter, MemoryRecord};
use crate::skills::{self, SkillRecord};

/// Rendered in place of an empty fragment so the prompt keeps its shape.
pub const EMPTY_FRAGMENT: &str = "(no data)";

pub const DEFAULT_MEMORY_LIMIT: usize = 5;
pub const DEFAULT_SKILLS_LIMIT: usize = 10;

// ── Types ─────────────────────────────────────────────────────────────────

/// Ordered, human-readable context lines. Built per request, never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextFragment {
    lines: Vec<String>,
}

impl ContextFragment {
    /// `- [CATEGORY] summary (workstream)`, workstream omitted when absent.
    pub fn from_memory(records: &[MemoryRecord]) -> Self {
        let lines = records
            .iter()
            .map(|r| match r.workstream.as_deref().filter(|w| !w.is_empty()) {
                Some(ws) => format!("- [{}] {} ({ws})", r.category, r.summary),
                None => format!("- [{}] {}", r.category, r.summary),
            })
            .collect();
        Self { lines }
    }

    /// `- name (tier)`.
    pub fn from_skills(records: &[SkillRecord]) -> Self {
        let lines = records
            .iter()
            .map(|r| format!("- {} ({})", r.skill_name, r.tier))
            .collect();
        Self { lines }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Newline-joined lines, or [`EMPTY_FRAGMENT`].
    pub fn render(&self) -> String {
        if self.lines.is_empty() {
            EMPTY_FRAGMENT.to_string()
        } else {
            self.lines.join("\n")
        }
    }
}

/// Both context sources for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextBundle {
    pub recent_memory: ContextFragment,
    pub active_skills: ContextFragment,
}

#[derive(Debug, thiserror::Error)]
enum SourceError {
    #[error(transparent)]
    Gateway(#[from] abbi_core::GatewayError),

    #[error("tool reported failure: {0}")]
    Rejected(String),

    #[error("unexpected payload shape: {0}")]
    UnexpectedShape(String),
}

// ── Assembler ─────────────────────────────────────────────────────────────

/// Fetches and formats context for the system prompt.
pub struct ContextAssembler {
    gateway: Arc<dyn ToolGateway>,
    skills_limit: usize,
    deadline: Option<Duration>,
}

impl ContextAssembler {
    pub fn new(gateway: Arc<dyn ToolGateway>) -> Self {
        Self {
            gateway,
            skills_limit: DEFAULT_SKILLS_LIMIT,
            deadline: None,
        }
    }

    pub fn with_skills_limit(mut self, limit: usize) -> Self {
        self.skills_limit = limit;
        self
    }

    /// Bound the whole assembly (both fetches) by `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn from_config(gateway: Arc<dyn ToolGateway>, config: &abbi_config::ContextConfig) -> Self {
        Self::new(gateway)
            .with_skills_limit(config.skills_limit)
            .with_deadline(config.deadline())
    }

    /// Fetch both sources; `limit` bounds the recent-memory entries.
    pub async fn assemble(&self, limit: usize) -> ContextBundle {
        let fetch = async {
            let (recent_memory, active_skills) =
                tokio::join!(self.recent_memory(limit), self.active_skills());
            ContextBundle {
                recent_memory,
                active_skills,
            }
        };

        let bundle = match self.deadline {
            Some(deadline) => match tokio::time::timeout(deadline, fetch).await {
                Ok(bundle) => bundle,
                Err(_) => {
                    warn!(
                        deadline_ms = deadline.as_millis() as u64,
                        "Context assembly deadline elapsed, continuing without context"
                    );
                    ContextBundle::default()
                }
            },
            None => fetch.await,
        };

        debug!(
            memory_lines = bundle.recent_memory.lines().len(),
            skill_lines = bundle.active_skills.lines().len(),
            "Context assembled"
        );
        bundle
    }

    async fn recent_memory(&self, limit: usize) -> ContextFragment {
        let args = MemoryFilter::with_limit(limit).to_arguments();
        match self.fetch_records::<MemoryRecord>(hivemind::READ_TOOL, args).await {
            Ok(records) => ContextFragment::from_memory(&records),
            Err(e) => {
                warn!(source = "recent_memory", error = %e, "Context source unavailable");
                ContextFragment::default()
            }
        }
    }

    async fn active_skills(&self) -> ContextFragment {
        let args = skills::query_arguments(skills::active_skills_sql(self.skills_limit));
        match self.fetch_records::<SkillRecord>(skills::QUERY_TOOL, args).await {
            Ok(records) => ContextFragment::from_skills(&records),
            Err(e) => {
                warn!(source = "active_skills", error = %e, "Context source unavailable");
                ContextFragment::default()
            }
        }
    }

    async fn fetch_records<T: DeserializeOwned>(
        &self,
        tool: &str,
        arguments: serde_json::Value,
    ) -> Result<Vec<T>, SourceError> {
        let payload = self.gateway.call_tool(tool, arguments).await?;
        let payload: ToolPayload = serde_json::from_value(payload)
            .map_err(|e| SourceError::UnexpectedShape(e.to_string()))?;
        let data = payload.into_data().map_err(SourceError::Rejected)?;
        serde_json::from_value(data).map_err(|e| SourceError::UnexpectedShape(e.to_string()))
    }
}
