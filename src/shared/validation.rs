//! Validation Utilities

use validator::ValidationErrors;

use super::error::AppError;

/// Flatten validation errors into a single `field: message` line.
///
/// Only the first failing field is reported; clients fix one thing at a time.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .find_map(|(field, errs)| {
            errs.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, message)
            })
        })
        .unwrap_or_else(|| "Validation failed".into())
}

/// Convert validation errors to AppError
pub fn validation_error(errors: ValidationErrors) -> AppError {
    AppError::Validation(describe(&errors))
}
