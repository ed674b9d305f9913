// src/handlers/health.rs

use std::{sync::LazyLock, time::Instant};

use axum::{
    Json,
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use serde_json::json;
use sqlx::SqlitePool;

static STARTED: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Pins the uptime clock. Called once when the router is built.
pub fn mark_started() {
    LazyLock::force(&STARTED);
}

/// Service banner.
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Form Builder API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": { "forms": "/api/forms" },
        "status": "running",
    }))
}

/// Liveness plus a database round trip.
pub async fn health(State(pool): State<SqlitePool>) -> impl IntoResponse {
    let database = match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => "connected",
        Err(e) => {
            tracing::error!("Health check could not reach the database: {:?}", e);
            "disconnected"
        }
    };

    Json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now(),
        "database": database,
        "uptime": STARTED.elapsed().as_secs_f64(),
    }))
}

/// 404 for every unmatched route.
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Route not found", "path": uri.path() })),
    )
}
