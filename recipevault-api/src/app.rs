/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use recipevault_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = recipevault_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use recipevault_shared::{
    auth::{jwt, middleware::AuthContext},
    media::MediaStore,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Maximum accepted image upload size in bytes (5 MiB)
const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Filesystem store for uploaded recipe images
    pub media: MediaStore,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let media = MediaStore::new(&config.media.root);
        Self {
            db,
            config: Arc::new(config),
            media,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// ├── /v1/                           # API v1 (versioned)
/// │   ├── /auth/                     # Authentication endpoints (public)
/// │   │   ├── POST /register
/// │   │   ├── POST /login
/// │   │   └── POST /refresh
/// │   ├── /users/me                  # Profile (authenticated)
/// │   │   ├── GET
/// │   │   └── PATCH
/// │   ├── /recipes/                  # Recipe catalog (authenticated)
/// │   │   ├── GET    /               # List (filterable by tags/ingredients)
/// │   │   ├── POST   /               # Create
/// │   │   ├── GET    /:id            # Detail
/// │   │   ├── PUT    /:id            # Replace (full payload)
/// │   │   ├── PATCH  /:id            # Partial update
/// │   │   ├── DELETE /:id            # Delete
/// │   │   └── POST   /:id/upload-image
/// │   ├── /tags/                     # Tag management (authenticated)
/// │   │   ├── GET    /
/// │   │   ├── PATCH  /:id
/// │   │   └── DELETE /:id
/// │   └── /ingredients/              # Ingredient management (authenticated)
/// │       ├── GET    /
/// │       ├── PATCH  /:id
/// │       └── DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    // Import route handlers
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Profile routes (require JWT authentication)
    let user_routes = Router::new()
        .route("/me", get(routes::users::get_me))
        .route("/me", patch(routes::users::update_me))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Recipe routes (require JWT authentication)
    let recipe_routes = Router::new()
        .route("/", get(routes::recipes::list_recipes))
        .route("/", post(routes::recipes::create_recipe))
        .route("/:id", get(routes::recipes::get_recipe))
        .route("/:id", put(routes::recipes::replace_recipe))
        .route("/:id", patch(routes::recipes::update_recipe))
        .route("/:id", delete(routes::recipes::delete_recipe))
        .route("/:id/upload-image", post(routes::recipes::upload_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Tag routes (require JWT authentication)
    let tag_routes = Router::new()
        .route("/", get(routes::tags::list_tags))
        .route("/:id", patch(routes::tags::update_tag))
        .route("/:id", delete(routes::tags::delete_tag))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Ingredient routes (require JWT authentication)
    let ingredient_routes = Router::new()
        .route("/", get(routes::ingredients::list_ingredients))
        .route("/:id", patch(routes::ingredients::update_ingredient))
        .route("/:id", delete(routes::ingredients::delete_ingredient))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/recipes", recipe_routes)
        .nest("/tags", tag_routes)
        .nest("/ingredients", ingredient_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates JWT token from Authorization header,
/// then injects AuthContext into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| crate::error::ApiError::BadRequest("Expected Bearer token".to_string()))?;

    // Validate token
    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    // Create auth context
    let auth_context = AuthContext::from_jwt(claims.sub);

    // Insert into request extensions
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
