//! Authentication DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::application::Signup;
use crate::auth::{CredentialPair, IssuedToken, MAX_PASSWORD_BYTES};
use crate::domain::{User, UserId};

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 2, max = 50, message = "must be 2-50 characters"))]
    pub first_name: String,
    #[validate(length(min = 2, max = 50, message = "must be 2-50 characters"))]
    pub last_name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[validate(
        length(min = 8, message = "must be at least 8 characters"),
        custom(function = "validate_password_bytes")
    )]
    pub password: String,
}

/// bcrypt reads at most 72 bytes; longer passwords would be silently truncated.
fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        let mut err = ValidationError::new("password_too_long");
        err.message = Some("must be at most 72 bytes".into());
        return Err(err);
    }
    Ok(())
}

impl From<SignupRequest> for Signup {
    fn from(request: SignupRequest) -> Self {
        Self {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            birth_date: request.birth_date,
            password: request.password,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, max = 255, message = "must be 8-255 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "refresh token is required"))]
    pub refresh_token: String,
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            birth_date: user.birth_date,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Signup and login payload: the user plus a fresh credential pair.
#[derive(Debug, Serialize)]
pub struct CredentialsResponse {
    pub user: UserResponse,
    #[serde(flatten)]
    pub credentials: CredentialPair,
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub access_token_expiration: i64,
}

impl From<IssuedToken> for AccessTokenResponse {
    fn from(token: IssuedToken) -> Self {
        Self {
            access_token: token.token,
            access_token_expiration: token.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup_request(first_name: &str, password: &str) -> SignupRequest {
        SignupRequest {
            first_name: first_name.into(),
            last_name: "Doe".into(),
            email: "john@example.com".into(),
            birth_date: None,
            password: password.into(),
        }
    }

    #[test]
    fn test_signup_validation() {
        assert!(signup_request("John", "password123").validate().is_ok());
        assert!(signup_request("J", "password123").validate().is_err());
        assert!(signup_request("John", "short").validate().is_err());
        assert!(signup_request(&"x".repeat(51), "password123").validate().is_err());
    }

    #[test]
    fn test_signup_password_byte_limit() {
        assert!(signup_request("John", &"a".repeat(72)).validate().is_ok());

        let long = format!("{}REAL-SUFFIX", "a".repeat(72));
        let errors = signup_request("John", &long).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));

        // 40 characters, 80 bytes
        assert!(signup_request("John", &"é".repeat(40)).validate().is_err());
    }

    #[test]
    fn test_birth_date_is_optional() {
        let request: SignupRequest = serde_json::from_value(serde_json::json!({
            "first_name": "John",
            "last_name": "Doe",
            "email": "john@example.com",
            "password": "password123",
        }))
        .unwrap();
        assert!(request.birth_date.is_none());

        let request: SignupRequest = serde_json::from_value(serde_json::json!({
            "first_name": "John",
            "last_name": "Doe",
            "email": "john@example.com",
            "birth_date": "1990-05-17",
            "password": "password123",
        }))
        .unwrap();
        assert_eq!(request.birth_date, NaiveDate::from_ymd_opt(1990, 5, 17));
    }

    #[test]
    fn test_credentials_response_is_flat() {
        let now = Utc::now();
        let response = CredentialsResponse {
            user: UserResponse {
                id: 1,
                first_name: "John".into(),
                last_name: "Doe".into(),
                email: "john@example.com".into(),
                birth_date: None,
                created_at: now,
                updated_at: now,
            },
            credentials: CredentialPair {
                access_token: "a".into(),
                access_token_expiration: 10,
                refresh_token: "r".into(),
                refresh_token_expiration: 20,
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["user"]["email"], "john@example.com");
        assert_eq!(json["access_token"], "a");
        assert_eq!(json["refresh_token_expiration"], 20);
        assert!(json["user"].get("password_hash").is_none());
    }
}
