//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use super::dto::{
    AccessTokenResponse, CredentialsResponse, LoginRequest, MeResponse, RefreshRequest,
    SignupRequest,
};
use crate::application::{AuthResult, AuthService};
use crate::auth::{AuthError, CurrentUser};
use crate::interfaces::http::common::{ApiResponse, ValidatedJson};

impl From<AuthResult> for CredentialsResponse {
    fn from(result: AuthResult) -> Self {
        Self {
            user: result.user.into(),
            credentials: result.credentials,
        }
    }
}

/// `POST /api/v1/auth/signup`
pub async fn signup(
    State(service): State<Arc<AuthService>>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CredentialsResponse>>), AuthError> {
    let result = service.signup(request.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(result.into())),
    ))
}

/// `POST /api/v1/auth/login`
pub async fn login(
    State(service): State<Arc<AuthService>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<CredentialsResponse>>, AuthError> {
    let result = service.login(&request.email, &request.password).await?;
    Ok(Json(ApiResponse::success(result.into())))
}

/// `POST /api/v1/auth/refresh`
pub async fn refresh(
    State(service): State<Arc<AuthService>>,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<AccessTokenResponse>>, AuthError> {
    let access = service.refresh(&request.refresh_token).await?;
    Ok(Json(ApiResponse::success(access.into())))
}

/// `GET /api/v1/auth/me`, behind the auth middleware
pub async fn me(CurrentUser(current): CurrentUser) -> Json<ApiResponse<MeResponse>> {
    Json(ApiResponse::success(MeResponse {
        user: current.user.into(),
    }))
}
