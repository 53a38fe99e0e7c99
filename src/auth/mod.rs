//! Authentication module
//!
//! JWT credential issuance and verification, bcrypt password hashing, and the
//! bearer-token middleware guarding protected routes.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use error::AuthError;
pub use jwt::{
    CredentialPair, IssuedToken, JwtConfig, TokenClaims, TokenIssuer, TokenKind, TokenVerifier,
};
pub use middleware::{auth_middleware, AuthState, AuthenticatedUser, CurrentUser};
pub use password::{PasswordError, PasswordHasher, MAX_PASSWORD_BYTES};
