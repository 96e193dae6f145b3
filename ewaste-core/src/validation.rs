//! Input validation applied before anything reaches the store.

use thiserror::Error;

/// Missing or malformed caller input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field was absent or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A decision carried a status outside `{Approved, Rejected}`.
    #[error("invalid status: {0:?}")]
    InvalidStatus(Option<String>),

    /// The body could not be read as the expected shape.
    #[error("malformed body: {0}")]
    MalformedBody(String),
}

/// Return the trimmed value of a required text field.
pub fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_owned()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims_value() {
        assert_eq!(
            required("item_name", Some("  laptop ".to_string())),
            Ok("laptop".to_string())
        );
    }

    #[test]
    fn test_required_rejects_absent_and_blank() {
        assert_eq!(
            required("contact", None),
            Err(ValidationError::MissingField("contact"))
        );
        assert_eq!(
            required("contact", Some("   ".to_string())),
            Err(ValidationError::MissingField("contact"))
        );
    }
}
