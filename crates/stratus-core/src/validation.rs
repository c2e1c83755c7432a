//! Validation utilities.
//!
//! Validation is a pure function of the request and collects *all*
//! violations rather than stopping at the first, so a caller sees the
//! complete error set in one round-trip.

use crate::{FieldViolation, StratusError};
use validator::{Validate, ValidationErrors};

/// A request that has passed validation.
///
/// Downstream components accepting a `Validated<T>` never need to re-check
/// the constraints declared on `T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated<T>(T);

impl<T> Validated<T> {
    /// Consumes the wrapper, returning the inner request.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }

    /// Returns a reference to the inner request.
    #[must_use]
    pub fn get(&self) -> &T {
        &self.0
    }
}

impl<T> std::ops::Deref for Validated<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

/// Extension trait for validation.
pub trait ValidateExt: Validate + Sized {
    /// Runs every declared constraint and returns either the typed,
    /// validated request or the full set of violations.
    fn into_validated(self) -> Result<Validated<Self>, StratusError> {
        match self.validate() {
            Ok(()) => Ok(Validated(self)),
            Err(errors) => Err(StratusError::Validation(collect_violations(&errors))),
        }
    }
}

impl<T: Validate> ValidateExt for T {}

/// Flattens `validator::ValidationErrors` into field violations.
#[must_use]
pub fn collect_violations(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldViolation {
                field: (*field).to_string(),
                message: error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string),
                code: error.code.to_string(),
            })
        })
        .collect();

    // Stable ordering so the same invalid request always reports the same way.
    violations.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
    violations
}

/// Common validation functions.
pub mod rules {
    use validator::ValidationError;

    /// Validates that a string is not blank (not empty after trimming).
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            let mut error = ValidationError::new("not_blank");
            error.message = Some(std::borrow::Cow::Borrowed("must not be blank"));
            return Err(error);
        }
        Ok(())
    }
}
