//! JWT token issuance and verification
//!
//! Access and refresh tokens are HS256-signed JWTs carrying a `type` claim.
//! [`TokenIssuer`] mints them from a [`UserIdentity`]; [`TokenVerifier`]
//! checks signature and expiry and fails closed, returning `None` for any
//! token it cannot vouch for. Neither component checks the `type` claim
//! against what the caller expects; that is the caller's job.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{UserId, UserIdentity};

/// Default access token lifetime: one day.
pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 1440;
/// Default refresh token lifetime: seven days.
pub const DEFAULT_REFRESH_TOKEN_TTL_MINUTES: i64 = 10080;

/// Kind of credential, carried in the `type` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Lifetime of access tokens
    pub access_token_ttl: Duration,
    /// Lifetime of refresh tokens
    pub refresh_token_ttl: Duration,
}

impl JwtConfig {
    /// Config with the given secret and the default token lifetimes.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_token_ttl: Duration::minutes(DEFAULT_ACCESS_TOKEN_TTL_MINUTES),
            refresh_token_ttl: Duration::minutes(DEFAULT_REFRESH_TOKEN_TTL_MINUTES),
        }
    }

    pub fn with_ttl_minutes(mut self, access: i64, refresh: i64) -> Self {
        self.access_token_ttl = Duration::minutes(access);
        self.refresh_token_ttl = Duration::minutes(refresh);
        self
    }

    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_token_ttl,
            TokenKind::Refresh => self.refresh_token_ttl,
        }
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish()
    }
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Email, present on access tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Full name, present on access tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Token kind
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl TokenClaims {
    fn new(kind: TokenKind, identity: &UserIdentity, now: DateTime<Utc>, ttl: Duration) -> Self {
        let (email, name) = match kind {
            TokenKind::Access => (Some(identity.email.clone()), Some(identity.name.clone())),
            TokenKind::Refresh => (None, None),
        };

        Self {
            sub: identity.sub.to_string(),
            email,
            name,
            kind,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn is_kind(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Subject parsed back into a user id. `None` if the subject is not numeric.
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

/// A signed token together with its absolute expiry (Unix seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
}

/// Access and refresh tokens handed out at signup and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialPair {
    pub access_token: String,
    pub access_token_expiration: i64,
    pub refresh_token: String,
    pub refresh_token_expiration: i64,
}

/// Signs access and refresh tokens.
pub struct TokenIssuer {
    key: EncodingKey,
    header: Header,
    config: JwtConfig,
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            key: EncodingKey::from_secret(config.secret.as_bytes()),
            header: Header::new(Algorithm::HS256),
            config: config.clone(),
        }
    }

    /// Issue a token of the given kind, valid from now for the configured TTL.
    pub fn issue(
        &self,
        kind: TokenKind,
        identity: &UserIdentity,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        self.issue_at(kind, identity, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        kind: TokenKind,
        identity: &UserIdentity,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
        let claims = TokenClaims::new(kind, identity, now, self.config.ttl(kind));
        let token = encode(&self.header, &claims, &self.key)?;

        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
        })
    }

    /// Issue an access token and a refresh token stamped with the same time.
    pub fn issue_credential_pair(
        &self,
        identity: &UserIdentity,
    ) -> Result<CredentialPair, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let access = self.issue_at(TokenKind::Access, identity, now)?;
        let refresh = self.issue_at(TokenKind::Refresh, identity, now)?;

        Ok(CredentialPair {
            access_token: access.token,
            access_token_expiration: access.expires_at,
            refresh_token: refresh.token,
            refresh_token_expiration: refresh.expires_at,
        })
    }
}

/// Checks token signatures and expiry.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared against an explicit clock in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Decode and check a token. Returns `None` for anything invalid.
    pub fn verify(&self, token: &str) -> Option<TokenClaims> {
        self.verify_at(token, Utc::now())
    }

    /// Like [`verify`](Self::verify), with expiry checked against `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<TokenClaims> {
        let claims = match decode::<TokenClaims>(token, &self.key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!(error = %e, "Rejected token");
                return None;
            }
        };

        if claims.exp <= claims.iat {
            debug!(exp = claims.exp, iat = claims.iat, "Rejected token: exp not after iat");
            return None;
        }

        if claims.is_expired_at(now) {
            debug!(exp = claims.exp, "Rejected token: expired");
            return None;
        }

        Some(claims)
    }
}
