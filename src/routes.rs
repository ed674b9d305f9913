// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, header},
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    handlers::{forms, health, submissions},
    state::AppState,
};

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
}

/// Assembles the main application router.
///
/// * Form CRUD and submissions under `/api/forms`.
/// * Banner, health check and a JSON 404 fallback.
/// * Global middleware: Trace, CORS and the request body limit.
pub fn create_router(state: AppState) -> Router {
    health::mark_started();

    let api_routes = Router::new()
        .route(
            "/api/forms",
            get(forms::list_forms).post(forms::create_form),
        )
        .route("/api/forms/my", get(forms::my_forms))
        .route(
            "/api/forms/{id}",
            get(forms::get_form)
                .put(forms::update_form)
                .delete(forms::delete_form),
        )
        .route(
            "/api/forms/{id}/submissions",
            get(submissions::list_submissions).post(submissions::submit_form),
        )
        .route(
            "/api/forms/{id}/submissions/{submission_id}",
            get(submissions::get_submission),
        );

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .merge(api_routes)
        .fallback(health::not_found)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config)),
        )
        .layer(DefaultBodyLimit::max(state.config.body_limit_bytes))
        .with_state(state)
}
