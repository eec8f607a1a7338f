/// Domain error type for LeadCRM operations
///
/// Services return [`CrmResult`]. Visibility misses are reported as
/// [`CrmError::NotFound`] rather than a permission error so callers cannot
/// tell "exists but hidden" from "does not exist".

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::password::PasswordError;
use crate::store::StoreError;

/// Result alias for service operations
pub type CrmResult<T> = Result<T, CrmError>;

/// Validation failure for a single input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    /// Target is outside the principal's visibility scope (or does not exist)
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// Malformed input or a cross-organisation reference
    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<FieldError>),

    /// Role is not permitted to perform the action
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Unique constraint violation (e.g. email already registered)
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Store(StoreError),

    #[error("Password operation failed: {0}")]
    Password(#[from] PasswordError),
}

impl CrmError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        CrmError::NotFound { entity, id }
    }

    /// Single-field validation error
    pub fn invalid(field: &str, message: &str) -> Self {
        CrmError::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<StoreError> for CrmError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => CrmError::Conflict(msg),
            other => CrmError::Store(other),
        }
    }
}

impl From<validator::ValidationErrors> for CrmError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    FieldError::new(
                        field.to_string(),
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Validation failed".to_string()),
                    )
                })
            })
            .collect();

        // HashMap iteration order is unstable
        details.sort_by(|a, b| a.field.cmp(&b.field));
        CrmError::Validation(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,

        #[validate(email(message = "Invalid email format"))]
        email: String,
    }

    #[test]
    fn test_validation_errors_conversion() {
        let probe = Probe {
            name: String::new(),
            email: "nope".to_string(),
        };

        let err: CrmError = probe.validate().unwrap_err().into();
        match err {
            CrmError::Validation(details) => {
                assert_eq!(details.len(), 2);
                assert_eq!(details[0], FieldError::new("email", "Invalid email format"));
                assert_eq!(details[1], FieldError::new("name", "Name is required"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_store_conflict_maps_to_conflict() {
        let err: CrmError = StoreError::Conflict("Email already exists".to_string()).into();
        assert!(matches!(err, CrmError::Conflict(msg) if msg == "Email already exists"));
    }

    #[test]
    fn test_error_display() {
        let id = Uuid::nil();
        assert_eq!(
            CrmError::not_found("Lead", id).to_string(),
            format!("Lead {} not found", id)
        );
        assert_eq!(
            CrmError::invalid("agent", "bad").to_string(),
            "Validation failed: 1 errors"
        );
    }
}
