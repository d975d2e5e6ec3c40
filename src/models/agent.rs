//! Create-agent payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{require_text, ValidationError, ValidationErrors};

pub const TOP_P_RANGE: (f64, f64) = (0.0, 1.0);
pub const TEMPERATURE_RANGE: (f64, f64) = (0.0, 2.0);

/// A capability attached to an agent.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Feature {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Feature settings. Must be present, may be an empty object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,

    #[serde(default)]
    pub priority: i64,
}

impl Feature {
    fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        require_text(&mut errors, "type", &self.kind);
        if self.config.is_none() {
            errors.push(ValidationError::Required("config"));
        }
        if self.priority < 0 {
            errors.push(ValidationError::TooSmall {
                field: "priority",
                min: 0,
                value: self.priority,
            });
        }
        errors
    }
}

/// Body of `POST /v1/agents`, forwarded upstream once validated.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct AgentPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub features: Vec<Feature>,

    #[serde(default)]
    pub tools: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_credential_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Map<String, Value>>,
}

impl AgentPayload {
    /// Check every field constraint. Deterministic: the same payload always
    /// yields the same list of failures.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        require_text(&mut errors, "name", &self.name);
        require_text(&mut errors, "system_prompt", &self.system_prompt);
        require_text(&mut errors, "llm_credential_id", &self.llm_credential_id);
        require_text(&mut errors, "provider_id", &self.provider_id);
        require_text(&mut errors, "model", &self.model);
        check_range(&mut errors, "top_p", self.top_p, TOP_P_RANGE);
        check_range(&mut errors, "temperature", self.temperature, TEMPERATURE_RANGE);
        if self.response_format.is_none() {
            errors.push(ValidationError::Required("response_format"));
        }

        for (index, feature) in self.features.iter().enumerate() {
            errors.extend(feature.validate().into_iter().map(|source| ValidationError::Item {
                field: "features",
                index,
                source: Box::new(source),
            }));
        }

        ValidationErrors::into_result(errors)
    }
}

fn check_range(
    errors: &mut Vec<ValidationError>,
    field: &'static str,
    value: Option<f64>,
    (min, max): (f64, f64),
) {
    match value {
        None => errors.push(ValidationError::Required(field)),
        // NaN fails both comparisons and lands here too.
        Some(v) if !(v >= min && v <= max) => errors.push(ValidationError::OutOfRange {
            field,
            min,
            max,
            value: v,
        }),
        Some(_) => {}
    }
}
