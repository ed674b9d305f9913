// tests/common/mod.rs

#![allow(dead_code)]

use std::net::SocketAddr;

use form_builder::{config::Config, routes, state::AppState, utils::jwt::sign_jwt};
use serde_json::{Value, json};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

pub const TEST_SECRET: &str = "test_secret_for_integration_tests";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Creates a form as `owner` and returns its id.
    pub async fn create_form(&self, owner: &str, body: &Value) -> String {
        let response = self
            .client
            .post(self.url("/api/forms"))
            .bearer_auth(token(owner))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);

        let body: Value = response.json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    pub async fn submit(&self, form_id: &str, bearer: Option<&str>, answers: Value) -> reqwest::Response {
        let mut request = self
            .client
            .post(self.url(&format!("/api/forms/{}/submissions", form_id)))
            .json(&json!({ "answers": answers }));
        if let Some(user) = bearer {
            request = request.bearer_auth(token(user));
        }
        request.send().await.expect("Failed to execute request")
    }
}

/// Bearer token for `user`, signed with the test secret.
pub fn token(user: &str) -> String {
    sign_jwt(user, Some(&format!("{}@example.com", user)), TEST_SECRET, 600).unwrap()
}

/// Helper function to spawn the app on a random port for testing.
///
/// Each app gets its own in-memory SQLite database; the single pooled
/// connection is kept alive so the database survives between requests.
pub async fn spawn_app() -> TestApp {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let state = AppState {
        pool: pool.clone(),
        config: Config::for_tests(TEST_SECRET),
    };
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        pool,
        client: reqwest::Client::new(),
    }
}

/// A form with one question of each type.
pub fn sample_form(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Mixed question types",
        "questions": [
            {
                "type": "categorize",
                "categories": ["Fruits", "Vegetables"],
                "items": [
                    { "id": "i1", "text": "Apple", "correctCategory": "Fruits" },
                    { "id": "i2", "text": "Carrot", "correctCategory": "Vegetables" }
                ]
            },
            {
                "type": "cloze",
                "text": "The capital of France is [b1].",
                "blanks": [{ "id": "b1", "answerHint": "Paris" }],
                "options": ["Paris", "Lyon"]
            },
            {
                "type": "comprehension",
                "passage": "The quick brown fox jumps over the lazy dog.",
                "questions": [{
                    "id": "m1",
                    "questionText": "What colour is the fox?",
                    "options": ["Red", "Brown", "Grey"],
                    "correctIndex": 1
                }]
            }
        ]
    })
}
