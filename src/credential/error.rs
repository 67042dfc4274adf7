use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClaimSetError {
    /// A builder step received an empty or invalid value.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    /// A required value could not be resolved from configuration.
    #[error("resolving configuration: `{0}`")]
    ConfigResolution(String),
}

impl ClaimSetError {
    pub(crate) fn empty(field: &'static str) -> Self {
        Self::Validation {
            field,
            reason: "must not be null or empty".to_string(),
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending field for validation errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Validation { field, .. } => Some(field),
            Self::ConfigResolution(_) => None,
        }
    }
}
