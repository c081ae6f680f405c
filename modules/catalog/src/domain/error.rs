use mongodb::bson::oid::ObjectId;
use thiserror::Error;
use validator::ValidationErrors;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid id '{value}': expected a 24-character hex ObjectId")]
    InvalidId { value: String },

    #[error("User not found: {id}")]
    UserNotFound { id: ObjectId },

    #[error("Movie not found: {id}")]
    MovieNotFound { id: ObjectId },

    #[error("Password hashing failed: {message}")]
    PasswordHash { message: String },

    #[error("{message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_id(value: impl Into<String>) -> Self {
        Self::InvalidId {
            value: value.into(),
        }
    }

    pub fn user_not_found(id: ObjectId) -> Self {
        Self::UserNotFound { id }
    }

    pub fn movie_not_found(id: ObjectId) -> Self {
        Self::MovieNotFound { id }
    }

    pub fn password_hash(message: impl Into<String>) -> Self {
        Self::PasswordHash {
            message: message.into(),
        }
    }

    /// Storage faults keep the full driver error chain as the message.
    pub fn storage(err: anyhow::Error) -> Self {
        Self::Storage {
            message: format!("{err:#}"),
        }
    }

    /// True for faults of the backing store or hashing, as opposed to bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::PasswordHash { .. })
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        let mut parts: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{field}: {msg}")
                })
            })
            .collect();
        parts.sort();
        Self::validation(parts.join("; "))
    }
}

/// Parse a client-supplied identifier into an ObjectId. The input must be
/// exactly 24 hex characters; surrounding whitespace is rejected.
pub fn parse_id(raw: &str) -> Result<ObjectId, DomainError> {
    ObjectId::parse_str(raw).map_err(|_| DomainError::invalid_id(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::NewMovie;
    use validator::Validate;

    #[test]
    fn parse_id_accepts_hex_and_rejects_garbage() {
        let id = ObjectId::new();
        assert_eq!(parse_id(&id.to_hex()).unwrap(), id);

        match parse_id("not-an-id") {
            Err(DomainError::InvalidId { value }) => assert_eq!(value, "not-an-id"),
            other => panic!("Expected InvalidId, got {other:?}"),
        }
    }

    #[test]
    fn parse_id_rejects_padded_hex() {
        let hex = ObjectId::new().to_hex();
        for raw in [format!(" {hex}"), format!("{hex} "), format!("{hex}\n")] {
            assert!(
                matches!(parse_id(&raw), Err(DomainError::InvalidId { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn storage_error_keeps_the_cause_chain() {
        let err = anyhow::anyhow!("E11000 duplicate key error").context("insert user failed");
        let domain = DomainError::storage(err);
        assert_eq!(
            domain.to_string(),
            "insert user failed: E11000 duplicate key error"
        );
        assert!(domain.is_internal());
    }

    #[test]
    fn validation_errors_are_flattened_and_sorted() {
        let movie = NewMovie {
            title: " ".into(),
            genre: "Drama".into(),
            rating: 42,
            duration: "120".into(),
        };
        let domain = DomainError::from(movie.validate().unwrap_err());
        assert_eq!(
            domain.to_string(),
            "Validation failed: rating: must be between 0 and 10; title: must not be blank"
        );
        assert!(!domain.is_internal());
    }
}
