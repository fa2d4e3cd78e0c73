/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test user creation
/// - JWT token generation
/// - API client helpers
///
/// Tests expect `DATABASE_URL` and `JWT_SECRET` in the environment (a
/// `.env` file works); each context creates its own user, so suites can
/// run concurrently against one database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use recipevault_api::app::{build_router, AppState};
use recipevault_api::config::Config;
use recipevault_shared::auth::jwt::{create_token, Claims, TokenType};
use recipevault_shared::auth::password;
use recipevault_shared::models::user::{CreateUser, User};
use serde_json::json;
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Password used by every test account
pub const TEST_PASSWORD: &str = "TestPass123";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context with a fresh user
    pub async fn new() -> anyhow::Result<Self> {
        // Load test configuration
        let mut config = Config::from_env()?;

        // Keep uploaded blobs out of the working tree
        config.media.root = std::env::temp_dir()
            .join(format!("recipevault-test-{}", Uuid::new_v4()))
            .to_string_lossy()
            .into_owned();

        // Connect to database
        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations").run(&db).await?;

        // Create test user
        let user = create_user(&db, "Test User").await?;

        // Generate JWT token
        let claims = Claims::new(user.id, TokenType::Access);
        let jwt_token = create_token(&claims, &config.jwt.secret)?;

        // Build app
        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Creates a second user and a token for it (for cross-owner tests)
    pub async fn other_user(&self) -> anyhow::Result<(User, String)> {
        let user = create_user(&self.db, "Other User").await?;
        let claims = Claims::new(user.id, TokenType::Access);
        let token = create_token(&claims, &self.config.jwt.secret)?;
        Ok((user, format!("Bearer {}", token)))
    }

    /// Sends a JSON request with the context's bearer token
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> axum::response::Response {
        self.request_as(method, uri, &self.auth_header(), body).await
    }

    /// Sends a JSON request with an explicit Authorization header value
    pub async fn request_as(
        &self,
        method: &str,
        uri: &str,
        auth: &str,
        body: Option<serde_json::Value>,
    ) -> axum::response::Response {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", auth)
            .header("content-type", "application/json");

        let request = match body {
            Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.app.clone().call(request).await.unwrap()
    }

    /// Creates a recipe via the API and returns its JSON detail
    pub async fn create_recipe(&self, payload: serde_json::Value) -> serde_json::Value {
        let response = self.request("POST", "/v1/recipes", Some(payload)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    /// Cleans up test data
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        // Delete test user (cascades to recipes, tags, ingredients)
        User::delete(&self.db, self.user.id).await?;
        Ok(())
    }
}

/// Creates a user directly in the database with the shared test password
pub async fn create_user(db: &PgPool, name: &str) -> anyhow::Result<User> {
    let user = User::create(
        db,
        CreateUser {
            email: format!("test-{}@example.com", Uuid::new_v4()),
            password_hash: password::hash_password(TEST_PASSWORD)?,
            name: Some(name.to_string()),
        },
    )
    .await?;
    Ok(user)
}

/// Parses a response body as JSON
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A minimal valid recipe payload
pub fn sample_recipe(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "time_minutes": 10,
        "price": "5.00"
    })
}
