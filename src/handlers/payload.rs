use crate::error::{AppError, AppResult};
use axum::{extract::rejection::JsonRejection, Json};
use validator::{Validate, ValidationError};

/// Unwrap and validate a JSON body. Handlers call this only once the caller is
/// allowed to perform the action, so a bad body never masks a 403 or a login redirect.
pub fn validated<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    let Json(body) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    body.validate().map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(body)
}

/// Rejects text that is empty once surrounding whitespace is ignored.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}
