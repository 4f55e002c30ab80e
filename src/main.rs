mod auth;
mod cache;
mod config;
mod dto;
mod handlers;
mod models;
mod repository;
mod service;

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{any, delete, get, post},
};

use std::sync::Arc;

use handlers::rest;
use repository::Repository;

use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::IdentityClient;
use service::NoteService;

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt::init();

    // Load config
    let cfg = config::load_config().expect("failed to locate or load config file");
    tracing::info!("Successfully loaded memo-server config");

    // Repository creation and migration
    let mut repo = Repository::new(cfg.database_dsn.clone())
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to establish database connection: {e}");
            panic!("failed to establish database connection: {e}");
        });

    repo.migrate().await.unwrap_or_else(|e| {
        tracing::error!("Failed to migrate database: {e}");
        panic!("failed to migrate database: {e}");
    });

    // Service and identity client creation
    let service = Arc::new(NoteService::new(Arc::new(repo)));
    let identity = Arc::new(IdentityClient::new(cfg.identity.clone()));

    // Router config; everything except the liveness route sits behind the
    // identity provider guard
    let api_router = Router::new()
        .route("/notes", post(rest::create_note))
        .route("/notes", get(rest::list_notes))
        .route("/notes/{id}", delete(rest::delete_note))
        .route("/profile", get(rest::get_profile))
        .route_layer(middleware::from_fn_with_state(identity, auth::require_auth))
        .with_state(service);

    let router = Router::new()
        .route("/", any(root))
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", rest::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", cfg.port))
        .await
        .expect("failed to bind to address");
    let addr = listener.local_addr().unwrap();

    tracing::info!("memo-server starting, listening on {}", addr);
    tracing::info!("Server is ready to accept connections");

    axum::serve(listener, router)
        .await
        .expect("failed to start server");
}

async fn root() -> Response {
    (StatusCode::OK, "Hello from memo-server!").into_response()
}
