//! Active skill records, read through the gateway's warehouse query tool.

use abbi_core::GatewayError;
use serde::Deserialize;

use crate::client::ToolGateway;

pub const QUERY_TOOL: &str = "sm_query_snowflake";

const BOOT_CONTEXT_VIEW: &str = "SOVEREIGN_MIND.RAW.V_BOOT_CONTEXT";
const ACTIVE_TIERS: &str = "('HOT', 'ACTIVE')";

/// A ranked capability descriptor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SkillRecord {
    #[serde(
        default,
        alias = "SKILL_NAME",
        alias = "name",
        deserialize_with = "crate::hivemind::null_as_empty"
    )]
    pub skill_name: String,
    #[serde(default, alias = "TIER", deserialize_with = "crate::hivemind::null_as_empty")]
    pub tier: String,
}

/// Bounded query for the prompt's skill list.
pub fn active_skills_sql(limit: usize) -> String {
    format!(
        "SELECT SKILL_NAME, TIER FROM {BOOT_CONTEXT_VIEW} \
         WHERE TIER IN {ACTIVE_TIERS} ORDER BY TIER, SKILL_NAME LIMIT {limit}"
    )
}

/// Full boot-context query, as served by the boot-context endpoint.
pub fn boot_context_sql() -> String {
    format!(
        "SELECT SKILL_NAME, TIER, CATEGORY, DESCRIPTION, USAGE_PATTERN, TAGS \
         FROM {BOOT_CONTEXT_VIEW} WHERE TIER IN {ACTIVE_TIERS} ORDER BY TIER, SKILL_NAME"
    )
}

pub fn query_arguments(sql: String) -> serde_json::Value {
    serde_json::json!({ "sql": sql })
}

/// Fetch the full boot context; returns the decoded tool payload unchanged.
pub async fn boot_context(gateway: &dyn ToolGateway) -> Result<serde_json::Value, GatewayError> {
    gateway
        .call_tool(QUERY_TOOL, query_arguments(boot_context_sql()))
        .await
}
