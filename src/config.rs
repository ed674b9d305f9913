// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Extra origins that are always allowed next to `CLIENT_URL`.
const DEV_ORIGINS: [&str; 3] = [
    "http://localhost:5174",
    "http://localhost:5175",
    "http://localhost:3000",
];

const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Expected `iss` claim, checked only when set.
    pub jwt_issuer: Option<String>,
    /// Expected `aud` claim, checked only when set.
    pub jwt_audience: Option<String>,
    pub rust_log: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://forms.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_issuer = env::var("JWT_ISSUER").ok().filter(|v| !v.is_empty());
        let jwt_audience = env::var("JWT_AUDIENCE").ok().filter(|v| !v.is_empty());

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let client_url = env::var("CLIENT_URL")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());
        let mut cors_origins = vec![client_url];
        for origin in DEV_ORIGINS {
            if !cors_origins.iter().any(|o| o == origin) {
                cors_origins.push(origin.to_string());
            }
        }

        let body_limit_bytes = env::var("BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_BODY_LIMIT);

        Self {
            database_url,
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            rust_log,
            port,
            cors_origins,
            body_limit_bytes,
        }
    }

    /// Settings for tests and local tooling: in-memory database, fixed secret.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: jwt_secret.to_string(),
            jwt_issuer: None,
            jwt_audience: None,
            rust_log: "info".to_string(),
            port: 0,
            cors_origins: vec!["http://localhost:5173".to_string()],
            body_limit_bytes: DEFAULT_BODY_LIMIT,
        }
    }
}
