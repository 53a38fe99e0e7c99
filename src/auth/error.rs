//! Authentication errors and their HTTP rendering

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use super::password::PasswordError;
use crate::interfaces::http::common::ApiResponse;
use crate::shared::DomainError;

/// Errors that can occur during authentication.
///
/// Token and user-lookup failures share one message so a client cannot tell a
/// forged token from a deleted account.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No usable `Authorization` header
    #[error("Not authenticated.")]
    MissingCredentials,
    /// Scheme other than `Bearer`
    #[error("Invalid authentication scheme.")]
    InvalidScheme,
    /// Bad signature, expired, malformed, or wrong token type
    #[error("Invalid credentials.")]
    InvalidToken,
    /// Token subject or login email does not resolve to a user
    #[error("Invalid credentials.")]
    UserNotFound,
    /// Password does not match the stored hash
    #[error("Invalid credentials.")]
    HashMismatch,

    #[error("Failed to sign token: {0}")]
    TokenEncoding(#[from] jsonwebtoken::errors::Error),

    #[error("Failed to hash password: {0}")]
    PasswordHashing(#[from] PasswordError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredentials | Self::InvalidScheme => StatusCode::FORBIDDEN,
            Self::InvalidToken | Self::UserNotFound | Self::HashMismatch => {
                StatusCode::UNAUTHORIZED
            }
            Self::Domain(DomainError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Domain(DomainError::Validation(_))
            | Self::PasswordHashing(PasswordError::TooLong { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Domain(DomainError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Domain(DomainError::Storage(_))
            | Self::TokenEncoding(_)
            | Self::PasswordHashing(PasswordError::Bcrypt(_))
            | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Domain(DomainError::Conflict(msg)) | Self::Domain(DomainError::Validation(msg)) => {
                msg.clone()
            }
            Self::PasswordHashing(e @ PasswordError::TooLong { .. }) => e.to_string(),
            e if e.status_code().is_server_error() => "Internal server error.".to_string(),
            e => e.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = Json(ApiResponse::<()>::error(self.public_message()));

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_failures_share_a_message() {
        assert_eq!(AuthError::InvalidToken.to_string(), "Invalid credentials.");
        assert_eq!(AuthError::UserNotFound.to_string(), "Invalid credentials.");
        assert_eq!(AuthError::HashMismatch.to_string(), "Invalid credentials.");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::MissingCredentials.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::InvalidScheme.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::Domain(DomainError::Conflict("Email already registered.".into()))
                .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AuthError::Domain(DomainError::Storage("disk full".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unauthorized_response_has_challenge() {
        let response = AuthError::InvalidToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn test_long_password_is_unprocessable() {
        let err = AuthError::from(PasswordError::TooLong { len: 80 });
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.public_message(), "Password must be at most 72 bytes, got 80.");
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let err = AuthError::Domain(DomainError::Storage("secret table name".into()));
        assert_eq!(err.public_message(), "Internal server error.");
    }
}
