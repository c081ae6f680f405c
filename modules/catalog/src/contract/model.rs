use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use std::fmt;
use validator::{Validate, ValidationError};

/// Stored user. `password` always holds the bcrypt hash, never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: ObjectId,
    pub email: String,
    pub username: String,
    pub password: String,
    pub is_admin: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full field set for creating a user or replacing one (no partial updates).
#[derive(Clone, PartialEq, Eq, Validate)]
pub struct NewUser {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(
        length(min = 1, max = 64, message = "must be between 1 and 64 characters"),
        custom(function = "not_blank")
    )]
    pub username: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
    pub is_admin: bool,
}

// Keeps the plaintext password out of logs and span fields.
impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("is_admin", &self.is_admin)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub id: ObjectId,
    pub title: String,
    pub genre: String,
    pub rating: i32,
    pub duration: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full field set for creating a movie or replacing one.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewMovie {
    #[validate(custom(function = "not_blank"))]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub genre: String,
    #[validate(range(min = 0, max = 10, message = "must be between 0 and 10"))]
    pub rating: i32,
    #[validate(custom(function = "not_blank"))]
    pub duration: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}
