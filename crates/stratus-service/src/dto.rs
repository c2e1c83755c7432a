//! Request DTOs.
//!
//! Constraints are declared on the types; the boundary layer hands these to
//! the facade, which validates them through
//! [`stratus_core::ValidateExt::into_validated`] before anything else runs.

use serde::{Deserialize, Serialize};
use stratus_core::rules;
use validator::Validate;

/// Request to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Identifier for the new user.
    pub id: u64,

    #[validate(custom(function = rules::not_blank))]
    #[validate(length(max = 64, message = "Name cannot exceed 64 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Request to update an existing user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(custom(function = rules::not_blank))]
    #[validate(length(max = 64, message = "Name cannot exceed 64 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_core::{StratusError, ValidateExt};

    #[test]
    fn test_valid_create_request() {
        let request = CreateUserRequest {
            id: 3,
            name: "Carol".to_string(),
            email: "carol@example.com".to_string(),
        };
        assert!(request.into_validated().is_ok());
    }

    #[test]
    fn test_create_request_reports_all_violations() {
        let request = CreateUserRequest {
            id: 3,
            name: "  ".to_string(),
            email: "not-an-email".to_string(),
        };
        let err = request.into_validated().unwrap_err();
        let StratusError::Validation(violations) = err else {
            panic!("expected validation error");
        };
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().any(|v| v.field == "name"));
        assert!(violations.iter().any(|v| v.field == "email"));
    }

    #[test]
    fn test_update_request_rejects_oversized_name() {
        let request = UpdateUserRequest {
            name: "x".repeat(65),
            email: "valid@example.com".to_string(),
        };
        let err = request.into_validated().unwrap_err();
        let StratusError::Validation(violations) = err else {
            panic!("expected validation error");
        };
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "name");
    }
}
