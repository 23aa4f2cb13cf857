//! Field validators shared by request payloads.

use std::borrow::Cow;

use validator::ValidationError;

/// Rejects empty and whitespace-only strings.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank")
            .with_message(Cow::Borrowed("This field may not be blank.")));
    }
    Ok(())
}

/// Error for a field explicitly sent as `null`.
pub fn not_null() -> ValidationError {
    ValidationError::new("null").with_message(Cow::Borrowed("This field may not be null."))
}
