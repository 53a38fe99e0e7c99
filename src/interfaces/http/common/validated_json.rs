//! JSON body extractor with `validator` checks
//!
//! Malformed bodies are rejected with 400, bodies that parse but fail their
//! `Validate` rules with 422 and a `field: message` list in the envelope.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::ApiResponse;

/// Like `axum::Json<T>`, but the value has passed `Validate::validate`.
pub struct ValidatedJson<T>(pub T);

#[derive(Debug)]
pub enum ValidatedJsonRejection {
    /// Body is not JSON or does not match the target type
    Json(JsonRejection),
    /// Body parsed but broke a validation rule
    Invalid(ValidationErrors),
}

impl ValidatedJsonRejection {
    fn describe(errors: &ValidationErrors) -> String {
        let mut messages: Vec<String> = errors
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
        // HashMap order is unstable
        messages.sort();

        if messages.is_empty() {
            "Validation failed".to_string()
        } else {
            messages.join("; ")
        }
    }
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Json(rejection) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid JSON: {}", rejection.body_text()),
            ),
            Self::Invalid(errors) => (StatusCode::UNPROCESSABLE_ENTITY, Self::describe(&errors)),
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Json)?;

        value.validate().map_err(ValidatedJsonRejection::Invalid)?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize, Validate)]
    struct Credentials {
        #[validate(email(message = "invalid email format"))]
        email: String,
        #[validate(length(min = 8, message = "too short"))]
        password: String,
    }

    async fn handler(ValidatedJson(body): ValidatedJson<Credentials>) -> String {
        format!("{}:{}", body.email, body.password.len())
    }

    async fn post_body(body: impl Into<Body>) -> Response {
        Router::new()
            .route("/login", post(handler))
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/login")
                    .header("content-type", "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_reaches_handler() {
        let body = serde_json::json!({"email": "a@b.com", "password": "password123"});
        let resp = post_body(serde_json::to_vec(&body).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let resp = post_body("{not json").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().starts_with("Invalid JSON"));
    }

    #[tokio::test]
    async fn test_rule_violations_are_listed() {
        let body = serde_json::json!({"email": "nope", "password": "short"});
        let resp = post_body(serde_json::to_vec(&body).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(resp).await;
        assert_eq!(
            json["error"],
            "email: invalid email format; password: too short"
        );
    }
}
