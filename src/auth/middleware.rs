//! Authentication middleware for Axum
//!
//! A request moves through three stages: the bearer credential is pulled
//! from the `Authorization` header, verified as an access token, and its
//! subject is resolved to a stored user. Only a request that clears all three
//! reaches the handler, with the user available through [`CurrentUser`].

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::error::AuthError;
use super::jwt::{TokenClaims, TokenKind, TokenVerifier};
use crate::domain::{User, UserId, UserStore};

const BEARER_SCHEME: &str = "Bearer";

/// State shared with the authentication middleware
#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<TokenVerifier>,
    pub users: Arc<dyn UserStore>,
}

/// User resolved from a valid access token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user: User,
    pub claims: TokenClaims,
}

impl AuthenticatedUser {
    pub fn id(&self) -> UserId {
        self.user.id
    }
}

/// Pull the bearer credential out of the request headers.
///
/// Only an absent header is `MissingCredentials`. A header that is present
/// but is not exactly `Bearer <token>` is `InvalidScheme`.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidScheme)?;

    match value.split_once(' ') {
        Some((BEARER_SCHEME, credentials)) if !credentials.trim().is_empty() => {
            Ok(credentials.trim())
        }
        _ => Err(AuthError::InvalidScheme),
    }
}

/// Verify a presented credential and require it to be an access token.
pub fn verify_access_token(verifier: &TokenVerifier, token: &str) -> Result<TokenClaims, AuthError> {
    let claims = verifier.verify(token).ok_or(AuthError::InvalidToken)?;

    if !claims.is_kind(TokenKind::Access) {
        debug!(kind = %claims.kind, "Rejected non-access token");
        return Err(AuthError::InvalidToken);
    }

    Ok(claims)
}

/// Resolve the token subject to a stored user.
pub async fn load_user(users: &dyn UserStore, claims: &TokenClaims) -> Result<User, AuthError> {
    let id = claims.user_id().ok_or(AuthError::UserNotFound)?;
    users.find_by_id(id).await?.ok_or(AuthError::UserNotFound)
}

/// Run the full authentication sequence against a set of request headers.
pub async fn authenticate(
    state: &AuthState,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, AuthError> {
    let token = extract_bearer(headers)?;
    let claims = verify_access_token(&state.verifier, token)?;
    let user = load_user(state.users.as_ref(), &claims).await?;

    Ok(AuthenticatedUser { user, claims })
}

/// JWT authentication middleware - requires a valid access token
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&auth_state, request.headers()).await {
        Ok(user) => {
            debug!(user_id = user.id(), "Request authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            debug!(error = ?e, "Authentication failed");
            e.into_response()
        }
    }
}

/// Extractor for the user attached by [`auth_middleware`].
///
/// Rejects with `MissingCredentials` when used on a route without the middleware.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AuthError::MissingCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderValue, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    use crate::auth::jwt::{JwtConfig, TokenIssuer};
    use crate::domain::{NewUser, UserIdentity};
    use crate::infrastructure::storage::InMemoryUserStore;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert!(matches!(
            extract_bearer(&HeaderMap::new()),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            extract_bearer(&headers("Bearer")),
            Err(AuthError::InvalidScheme)
        ));
        assert!(matches!(
            extract_bearer(&headers("Bearer ")),
            Err(AuthError::InvalidScheme)
        ));
        assert!(matches!(
            extract_bearer(&headers("Basic")),
            Err(AuthError::InvalidScheme)
        ));
        assert!(matches!(
            extract_bearer(&headers("")),
            Err(AuthError::InvalidScheme)
        ));
        assert!(matches!(
            extract_bearer(&headers("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidScheme)
        ));
        assert!(matches!(
            extract_bearer(&headers("bearer abc")),
            Err(AuthError::InvalidScheme)
        ));
    }

    struct Fixture {
        app: Router,
        issuer: TokenIssuer,
        identity: UserIdentity,
    }

    async fn whoami(CurrentUser(user): CurrentUser) -> String {
        user.user.email
    }

    async fn fixture() -> Fixture {
        let config = JwtConfig::new("middleware-secret");
        let users = Arc::new(InMemoryUserStore::new());
        let user = users
            .insert(NewUser {
                first_name: "Grace".into(),
                last_name: "Hopper".into(),
                email: "grace@example.com".into(),
                birth_date: None,
                password_hash: "unused".into(),
            })
            .await
            .unwrap();

        let state = AuthState {
            verifier: Arc::new(TokenVerifier::new(&config)),
            users,
        };
        let app = Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn_with_state(state, auth_middleware));

        Fixture {
            app,
            issuer: TokenIssuer::new(&config),
            identity: user.identity(),
        }
    }

    async fn call(app: Router, authorization: Option<String>) -> Response {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_valid_access_token_reaches_handler() {
        let f = fixture().await;
        let token = f.issuer.issue(TokenKind::Access, &f.identity).unwrap().token;

        let response = call(f.app, Some(format!("Bearer {token}"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "grace@example.com");
    }

    #[tokio::test]
    async fn test_missing_header_is_forbidden() {
        let f = fixture().await;
        let response = call(f.app, None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(body_string(response).await.contains("Not authenticated."));
    }

    #[tokio::test]
    async fn test_wrong_scheme_is_forbidden() {
        let f = fixture().await;
        let token = f.issuer.issue(TokenKind::Access, &f.identity).unwrap().token;

        let response = call(f.app, Some(format!("Token {token}"))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(body_string(response).await.contains("Invalid authentication scheme."));
    }

    #[tokio::test]
    async fn test_bearer_without_token_is_invalid_scheme() {
        let f = fixture().await;
        let response = call(f.app, Some("Bearer ".to_string())).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(body_string(response).await.contains("Invalid authentication scheme."));
    }

    #[tokio::test]
    async fn test_refresh_token_is_not_accepted() {
        let f = fixture().await;
        let token = f.issuer.issue(TokenKind::Refresh, &f.identity).unwrap().token;

        let response = call(f.app, Some(format!("Bearer {token}"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthorized() {
        let f = fixture().await;
        let response = call(f.app, Some("Bearer not-a-jwt".to_string())).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(response).await.contains("Invalid credentials."));
    }

    #[tokio::test]
    async fn test_unknown_user_looks_like_invalid_token() {
        let f = fixture().await;
        let ghost = UserIdentity {
            sub: 9999,
            ..f.identity.clone()
        };
        let token = f.issuer.issue(TokenKind::Access, &ghost).unwrap().token;

        let response = call(f.app, Some(format!("Bearer {token}"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(response).await.contains("Invalid credentials."));
    }

    #[tokio::test]
    async fn test_current_user_without_middleware_is_rejected() {
        let app = Router::new().route("/whoami", get(whoami));
        let response = call(app, None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
