//! System prompt template.
//!
//! Used only when the caller did not send its own `system` string.

use abbi_core::ChatRequest;

use crate::assembler::ContextBundle;

pub const DEFAULT_SESSION_ID: &str = "ABBI-SESSION";
pub const DEFAULT_FOCUS: &str = "general";
pub const DEFAULT_TONE: &str = "warm but efficient";

pub const MEMORY_HEADING: &str = "## Recent Hive Mind Context";
pub const SKILLS_HEADING: &str = "## Active Skills";

const IDENTITY: &str = "# SOVEREIGN MIND - ABBI INSTANCE

## Identity
You are ABBI (Adaptive Second Brain Intelligence), the AI layer of the Sovereign Mind system. You act as a cognitive extension of the person you are working with.

## Core Behaviors
1. **AUTONOMY** - Execute without asking for permission when the intent is clear.
2. **CONTINUITY** - Use the Hive Mind context below. When the user says \"continue\", you already know where things stand.
3. **TOKEN EFFICIENCY** - Brief confirmations. Limit result listings to 5 rows unless asked otherwise.
4. **EXECUTE FIRST** - Act on expressed intent immediately.";

pub const CAPABILITIES_HEADING: &str = "## Available Capabilities";

const CAPABILITIES: &str = "- MCP Gateway: tool calls routed to every connected backend
- Backends: Asana, Google Drive, M365, Make.com, Snowflake, DealCloud, Dropbox, GitHub, Azure, Vertex AI, and more
- Shared memory: read and write Hive Mind entries through `hivemind_read` / `hivemind_write`";

const COMMUNICATION: &str = "## Communication
- Address the user as \"Your Grace\"
- Professional, direct, results-oriented
- No verbose explanations: state what was done";

/// Per-request substitutions, defaulted when the client sent none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    pub session_id: String,
    pub focus: String,
    pub tone: String,
}

impl SessionParams {
    pub fn from_request(request: &ChatRequest) -> Self {
        fn or_default(value: &Option<String>, default: &str) -> String {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(default)
                .to_string()
        }

        Self {
            session_id: or_default(&request.session_id, DEFAULT_SESSION_ID),
            focus: or_default(&request.focus, DEFAULT_FOCUS),
            tone: or_default(&request.tone, DEFAULT_TONE),
        }
    }
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            session_id: DEFAULT_SESSION_ID.into(),
            focus: DEFAULT_FOCUS.into(),
            tone: DEFAULT_TONE.into(),
        }
    }
}

/// Render the full system prompt. Pure: same inputs, same output.
pub fn render_system_prompt(session: &SessionParams, context: &ContextBundle) -> String {
    format!(
        "{IDENTITY}

{CAPABILITIES_HEADING}
{CAPABILITIES}

## Session
- Session: {session_id}
- Focus: {focus}
- Tone: {tone}

{MEMORY_HEADING}
{memory}

{SKILLS_HEADING}
{skills}

{COMMUNICATION}
- Tone: {tone}",
        session_id = session.session_id,
        focus = session.focus,
        tone = session.tone,
        memory = context.recent_memory.render(),
        skills = context.active_skills.render(),
    )
}
