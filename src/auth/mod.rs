use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use std::sync::Arc;

use crate::{config::IdentityConfig, dto::ProfileResponse};

/// Client for the external identity provider.
///
/// The provider owns authentication entirely: this client forwards the
/// caller's bearer token to the provider's user endpoint and decodes the
/// profile it answers with. Tokens are never inspected locally.
pub struct IdentityClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity provider rejected the token")]
    Unauthorized,

    #[error("unexpected identity provider response: {0}")]
    UpstreamStatus(reqwest::StatusCode),

    #[error("failed to reach identity provider: {0}")]
    Transport(#[from] reqwest::Error),
}

impl IdentityClient {
    pub fn new(config: IdentityConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: config.base_url,
            client,
        }
    }

    pub async fn fetch_profile(&self, token: &str) -> Result<ProfileResponse, IdentityError> {
        let response = self
            .client
            .get(format!("{}/user", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(IdentityError::Unauthorized);
        }
        if !status.is_success() {
            return Err(IdentityError::UpstreamStatus(status));
        }

        Ok(response.json::<ProfileResponse>().await?)
    }
}

/// Gate for the authenticated routes. Resolves the bearer token through the
/// identity provider and stashes the profile in request extensions for
/// handlers that display it.
pub async fn require_auth(
    State(identity): State<Arc<IdentityClient>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    let Some(token) = token else {
        return (StatusCode::UNAUTHORIZED, "Missing bearer token").into_response();
    };

    match identity.fetch_profile(&token).await {
        Ok(profile) => {
            request.extensions_mut().insert(profile);
            next.run(request).await
        }
        Err(IdentityError::Unauthorized) => {
            (StatusCode::UNAUTHORIZED, "Invalid bearer token").into_response()
        }
        Err(e) => {
            tracing::error!("failed to resolve user profile: {e}");
            (StatusCode::BAD_GATEWAY, "Identity provider unavailable").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, body::Body, http::Request as HttpRequest, middleware, routing::get};
    use std::time::Duration;
    use tower::ServiceExt;

    async fn spawn_stub_provider() -> String {
        let app = Router::new().route(
            "/user",
            get(|headers: axum::http::HeaderMap| async move {
                let authorized = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    == Some("Bearer valid-token");

                if authorized {
                    Json(serde_json::json!({
                        "id": "user-1",
                        "email": "someone@example.com"
                    }))
                    .into_response()
                } else {
                    StatusCode::UNAUTHORIZED.into_response()
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub provider");
        let addr = listener.local_addr().expect("stub provider addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve stub");
        });

        format!("http://{addr}")
    }

    fn identity_for(base_url: String) -> Arc<IdentityClient> {
        Arc::new(IdentityClient::new(IdentityConfig {
            base_url,
            request_timeout: Duration::from_secs(2),
        }))
    }

    fn guarded_app(identity: Arc<IdentityClient>) -> Router {
        Router::new()
            .route(
                "/profile",
                get(|axum::Extension(profile): axum::Extension<ProfileResponse>| async move {
                    Json(profile)
                }),
            )
            .route_layer(middleware::from_fn_with_state(identity, require_auth))
    }

    #[tokio::test]
    async fn accepted_token_resolves_to_a_profile() {
        let identity = identity_for(spawn_stub_provider().await);

        let profile = identity
            .fetch_profile("valid-token")
            .await
            .expect("profile should resolve");
        assert_eq!(profile.id, "user-1");
        assert_eq!(profile.email.as_deref(), Some("someone@example.com"));
    }

    #[tokio::test]
    async fn rejected_token_maps_to_unauthorized() {
        let identity = identity_for(spawn_stub_provider().await);

        let err = identity
            .fetch_profile("wrong-token")
            .await
            .expect_err("token must be rejected");
        assert!(matches!(err, IdentityError::Unauthorized));
    }

    #[tokio::test]
    async fn request_without_a_token_is_rejected_before_the_provider() {
        // Unroutable base URL: the middleware must answer without it.
        let app = guarded_app(identity_for("http://127.0.0.1:9".to_string()));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/profile")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_passes_the_guard_and_exposes_the_profile() {
        let app = guarded_app(identity_for(spawn_stub_provider().await));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/profile")
                    .header(header::AUTHORIZATION, "Bearer valid-token")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let profile: ProfileResponse = serde_json::from_slice(&body).expect("profile json");
        assert_eq!(profile.id, "user-1");
    }

    #[tokio::test]
    async fn unreachable_provider_maps_to_bad_gateway() {
        let app = guarded_app(identity_for("http://127.0.0.1:9".to_string()));

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/profile")
                    .header(header::AUTHORIZATION, "Bearer valid-token")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
