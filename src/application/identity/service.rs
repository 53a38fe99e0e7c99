//! Authentication service, the application-layer orchestration
//!
//! Signup, login and token refresh live here. HTTP handlers are thin
//! wrappers that delegate to this service.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::auth::{
    AuthError, AuthState, CredentialPair, IssuedToken, JwtConfig, PasswordHasher, TokenClaims,
    TokenIssuer, TokenKind, TokenVerifier,
};
use crate::domain::{DomainError, NewUser, User, UserIdentity, UserStore};

/// Registration input, password still in plaintext
#[derive(Debug, Clone)]
pub struct Signup {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub password: String,
}

/// Result of a successful signup or login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub user: User,
    pub credentials: CredentialPair,
}

/// Orchestrates the identity use-cases over a [`UserStore`].
///
/// Refresh tokens are neither rotated nor revoked: one stays usable for its
/// whole lifetime, however many access tokens it has minted.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    issuer: TokenIssuer,
    verifier: Arc<TokenVerifier>,
    hasher: PasswordHasher,
    /// Checked against on unknown emails so both login failures cost one bcrypt verify.
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_config: &JwtConfig, hasher: PasswordHasher) -> Self {
        Self {
            users,
            issuer: TokenIssuer::new(jwt_config),
            verifier: Arc::new(TokenVerifier::new(jwt_config)),
            hasher,
            dummy_hash: OnceCell::new(),
        }
    }

    /// State for [`crate::auth::auth_middleware`], sharing this service's verifier and store.
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            verifier: Arc::clone(&self.verifier),
            users: Arc::clone(&self.users),
        }
    }

    pub fn users(&self) -> Arc<dyn UserStore> {
        Arc::clone(&self.users)
    }

    // ── Token entry points ──────────────────────────────────────

    pub fn issue_credential_pair(&self, identity: &UserIdentity) -> Result<CredentialPair, AuthError> {
        Ok(self.issuer.issue_credential_pair(identity)?)
    }

    pub fn verify(&self, token: &str) -> Option<TokenClaims> {
        self.verifier.verify(token)
    }

    // ── Registration ────────────────────────────────────────────

    /// Hash the password, persist the user and hand out credentials.
    pub async fn signup(&self, signup: Signup) -> Result<AuthResult, AuthError> {
        if self.users.find_by_email(&signup.email).await?.is_some() {
            return Err(DomainError::Conflict("Email already registered.".into()).into());
        }

        let password_hash = self.hash_password(signup.password).await?;

        let user = self
            .users
            .insert(NewUser {
                first_name: signup.first_name,
                last_name: signup.last_name,
                email: signup.email,
                birth_date: signup.birth_date,
                password_hash,
            })
            .await?;

        let credentials = self.issue_credential_pair(&user.identity())?;

        info!(user_id = user.id, "New user registered");
        Ok(AuthResult { user, credentials })
    }

    // ── Authentication ──────────────────────────────────────────

    /// Authenticate by email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            let dummy = self
                .dummy_hash
                .get_or_try_init(|| self.hash_password("not-a-real-password".to_string()))
                .await?;
            self.check_password(password.to_string(), dummy.clone()).await?;
            debug!("Login rejected: unknown email");
            return Err(AuthError::UserNotFound);
        };

        if !self.check_password(password.to_string(), user.password_hash.clone()).await? {
            debug!(user_id = user.id, "Login rejected: password mismatch");
            return Err(AuthError::HashMismatch);
        }

        let credentials = self.issue_credential_pair(&user.identity())?;

        info!(user_id = user.id, "User logged in");
        Ok(AuthResult { user, credentials })
    }

    /// Mint a new access token from a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedToken, AuthError> {
        let claims = self
            .verifier
            .verify(refresh_token)
            .ok_or(AuthError::InvalidToken)?;

        if !claims.is_kind(TokenKind::Refresh) {
            debug!(kind = %claims.kind, "Refresh rejected: not a refresh token");
            return Err(AuthError::InvalidToken);
        }

        let user_id = claims.user_id().ok_or(AuthError::UserNotFound)?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let access = self.issuer.issue(TokenKind::Access, &user.identity())?;

        debug!(user_id = user.id, "Access token refreshed");
        Ok(access)
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.hasher;
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;
        Ok(hash)
    }

    async fn check_password(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let hasher = self.hasher;
        Ok(tokio::task::spawn_blocking(move || hasher.check(&password, &hash)).await?)
    }
}
