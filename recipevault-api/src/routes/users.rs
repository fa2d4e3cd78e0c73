/// Authenticated user profile endpoints
///
/// # Endpoints
///
/// - `GET /v1/users/me` - Fetch the authenticated user's profile
/// - `PATCH /v1/users/me` - Update email, password, or display name
///
/// The profile never includes the password hash. Updating the password
/// re-validates strength and stores a fresh Argon2id hash.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::Json,
};
use axum::{extract::State, Extension};
use chrono::{DateTime, Utc};
use recipevault_shared::{
    auth::{middleware::AuthContext, password},
    models::user::{UpdateUser, User},
};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Profile response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID
    pub id: String,

    /// Email address
    pub email: String,

    /// Optional display name
    pub name: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the user last logged in
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
            created_at: user.created_at,
            last_login_at: user.last_login_at,
        }
    }
}

/// Profile update request
///
/// Absent fields are untouched. `name` distinguishes absent (keep) from
/// explicit null (clear).
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeRequest {
    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New password (validated for strength, stored hashed)
    pub password: Option<String>,

    /// New display name (null clears it)
    #[serde(default, deserialize_with = "double_option")]
    pub name: Option<Option<String>>,
}

/// Deserializes a nullable-when-present field
///
/// Serde collapses `Option<Option<T>>` so that JSON null becomes outer
/// None; wrapping the inner result restores the absent/null distinction.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// Fetch the authenticated user's profile
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: Account no longer exists
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Update the authenticated user's profile
///
/// # Endpoint
///
/// ```text
/// PATCH /v1/users/me
/// Content-Type: application/json
///
/// {
///   "email": "new@example.com",
///   "password": "NewSecurePass123",
///   "name": "New Name"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: Account no longer exists
/// - `409 Conflict`: Email already taken
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateMeRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;

    let password_hash = match req.password {
        Some(ref plaintext) => {
            password::validate_password_strength(plaintext)
                .map_err(|e| ApiError::validation("password", e))?;
            Some(password::hash_password(plaintext)?)
        }
        None => None,
    };

    let user = User::update(
        &state.db,
        auth.user_id,
        UpdateUser {
            email: req.email,
            password_hash,
            name: req.name,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}
