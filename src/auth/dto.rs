use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::User;
use crate::error::ApiError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        if !is_valid_email(&self.email) {
            errors.push("email must be a valid email address".to_string());
        }
        if self.password.len() < 8 {
            errors.push("password must be at least 8 characters".to_string());
        }
        if self.username.trim().is_empty() {
            errors.push("username must not be empty".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if is_valid_email(&self.email) {
            Ok(())
        } else {
            Err(ApiError::Validation(vec![
                "email must be a valid email address".to_string(),
            ]))
        }
    }
}

/// Response returned after signup or signin.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plausible_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.io"));
    }

    #[test]
    fn rejects_bad_emails() {
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@mail.com"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn register_collects_all_field_errors() {
        let req = RegisterRequest {
            email: "bad".into(),
            password: "short".into(),
            username: "  ".into(),
        };
        let err = req.validate().unwrap_err();
        match err {
            ApiError::Validation(msgs) => assert_eq!(msgs.len(), 3),
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn register_passes_valid_input() {
        let req = RegisterRequest {
            email: "user@example.com".into(),
            password: "longenough".into(),
            username: "john_doe".into(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn public_user_never_carries_the_digest() {
        let user = User {
            id: Uuid::new_v4(),
            email: "user@example.com".into(),
            password_hash: "$argon2id$fake".into(),
            username: "john_doe".into(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
        assert!(json.contains("user@example.com"));
    }
}
