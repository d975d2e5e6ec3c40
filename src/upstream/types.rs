//! Response types returned by the agent provider.
//!
//! The provider's schema drifts (fields appear, vanish or change shape), so
//! every field defaults and loosely-typed ones stay as `serde_json::Value`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::null_as_default;

/// Result of creating an agent.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentResponse {
    pub id: String,
    pub name: String,
    pub status: String,
    pub message: String,
    pub agent_id: String,
}

/// One agent as listed by the provider.
///
/// The provider sends `null` for fields it has not filled in; those decode to
/// the type's default.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Agent {
    #[serde(rename = "_id", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub api_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    pub agent_role: Option<String>,
    pub agent_instructions: Option<String>,
    pub agent_goal: Option<String>,
    pub agent_context: Value,
    pub agent_output: Value,
    pub examples: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub features: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
    pub tool_usage_description: Value,
    pub response_format: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub provider_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(deserialize_with = "null_as_default")]
    pub top_p: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub temperature: f64,
    pub managed_agents: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updated_at: String,
    #[serde(deserialize_with = "null_as_default")]
    pub llm_credential_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_type: Option<String>,
}

/// Agents listed by the provider, as served to gateway clients.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ListAgentsResponse {
    pub agents: Vec<Agent>,
}

/// The list endpoint answers either a bare array or `{"agents": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListAgentsBody {
    Wrapped { agents: Vec<Agent> },
    Bare(Vec<Agent>),
}

impl From<ListAgentsBody> for ListAgentsResponse {
    fn from(body: ListAgentsBody) -> Self {
        match body {
            ListAgentsBody::Wrapped { agents } | ListAgentsBody::Bare(agents) => Self { agents },
        }
    }
}

/// Result of creating a credential. Unknown provider fields are kept.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct CredentialResponse {
    #[serde(default)]
    pub credential_id: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_accepts_both_shapes() {
        let agent = json!({"_id": "a1", "name": "bot", "features": [], "top_p": 1.0});

        let bare: ListAgentsBody = serde_json::from_value(json!([agent.clone()])).unwrap();
        let wrapped: ListAgentsBody = serde_json::from_value(json!({"agents": [agent]})).unwrap();

        let bare = ListAgentsResponse::from(bare);
        assert_eq!(bare, ListAgentsResponse::from(wrapped));
        assert_eq!(bare.agents[0].id, "a1");
    }

    #[test]
    fn agent_tolerates_nulls_and_missing_fields() {
        let agent: Agent = serde_json::from_value(json!({
            "_id": "a1",
            "agent_role": null,
            "features": null,
            "model": null,
            "tool_usage_description": {"search": "web"},
            "managed_agents": []
        }))
        .unwrap();
        assert_eq!(agent.agent_role, None);
        assert!(agent.tools.is_none());
        assert_eq!(agent.model, "");
    }

    #[test]
    fn credential_keeps_unknown_fields() {
        let resp: CredentialResponse =
            serde_json::from_value(json!({"credential_id": "c1", "provider_id": "openai"})).unwrap();
        assert_eq!(resp.credential_id, "c1");
        assert_eq!(resp.extra["provider_id"], "openai");
    }
}
