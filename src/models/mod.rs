//! Request payloads accepted by the CRUD endpoints.
//!
//! # Responsibilities
//! - Deserialize create-agent and create-credential bodies
//! - Validate required fields, numeric ranges and collection sizes
//!   before anything is forwarded upstream
//!
//! # Design Decisions
//! - Optional wire fields are `Option<T>` so "missing" and "zero" differ
//! - Validation returns every failing constraint, not just the first
//! - Payloads are immutable values owned by the request that parsed them

pub mod agent;
pub mod credential;

pub use agent::{AgentPayload, Feature};
pub use credential::CredentialPayload;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// The constraint a field failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{field} must be >= {min}, got {value}")]
    TooSmall {
        field: &'static str,
        min: i64,
        value: i64,
    },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field}[{index}]: {source}")]
    Item {
        field: &'static str,
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

/// All constraints a payload failed, in field order.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub(crate) fn into_result(errors: Vec<ValidationError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self(errors))
        }
    }
}

pub(crate) fn require_text(errors: &mut Vec<ValidationError>, field: &'static str, value: &Option<String>) {
    match value {
        Some(text) if !text.trim().is_empty() => {}
        _ => errors.push(ValidationError::Required(field)),
    }
}

/// Decode JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
