//! Create-credential payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::models::{require_text, ValidationError, ValidationErrors};

/// Body of `POST /v1/credentials`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct CredentialPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,

    /// Secret material, e.g. `{"api_key": "..."}`.
    #[serde(default)]
    pub credentials: HashMap<String, String>,

    #[serde(default)]
    pub meta_data: Map<String, Value>,
}

impl CredentialPayload {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        require_text(&mut errors, "name", &self.name);
        require_text(&mut errors, "provider_id", &self.provider_id);
        if self.credentials.is_empty() {
            errors.push(ValidationError::Empty("credentials"));
        }
        ValidationErrors::into_result(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_the_dashboard_shape() {
        let payload: CredentialPayload = serde_json::from_value(json!({
            "name": "openai-prod",
            "provider_id": "openai",
            "credentials": {"api_key": "sk-test"},
            "meta_data": {}
        }))
        .unwrap();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn empty_credentials_fail() {
        let payload = CredentialPayload {
            name: Some("openai-prod".into()),
            provider_id: Some("openai".into()),
            ..Default::default()
        };
        assert_eq!(
            payload.validate().unwrap_err().errors(),
            &[ValidationError::Empty("credentials")]
        );
    }

    #[test]
    fn missing_everything_reports_all() {
        let errors = CredentialPayload::default().validate().unwrap_err();
        assert_eq!(errors.errors().len(), 3);
    }
}
