/// Ingredient management endpoints
///
/// # Endpoints
///
/// - `GET /v1/ingredients` - List the caller's ingredients
/// - `PATCH /v1/ingredients/:id` - Rename an ingredient
/// - `DELETE /v1/ingredients/:id` - Delete an ingredient
///
/// The same conventions as tags apply: created implicitly through
/// recipe payloads, `assigned_only=1` filtering, owner scoping with
/// 404 for foreign rows.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::Json,
    routes::{recipes::IngredientResponse, tags::parse_assigned_only},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
};
use recipevault_shared::{auth::middleware::AuthContext, models::ingredient::Ingredient};
use serde::Deserialize;
use validator::Validate;

/// List query parameters
#[derive(Debug, Default, Deserialize)]
pub struct IngredientListQuery {
    /// Restrict to ingredients attached to at least one recipe
    /// (integer flag: nonzero = true)
    pub assigned_only: Option<String>,
}

/// Rename request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateIngredientRequest {
    /// New ingredient name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// List the caller's ingredients, ordered by descending name
///
/// # Endpoint
///
/// ```text
/// GET /v1/ingredients?assigned_only=1
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed `assigned_only` value
/// - `401 Unauthorized`: Missing or invalid token
pub async fn list_ingredients(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<IngredientListQuery>,
) -> ApiResult<Json<Vec<IngredientResponse>>> {
    let assigned_only = parse_assigned_only(query.assigned_only.as_deref())?;

    let ingredients = Ingredient::list_by_owner(&state.db, auth.user_id, assigned_only).await?;

    Ok(Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

/// Rename an ingredient
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: No such ingredient owned by the caller
/// - `409 Conflict`: The caller already has an ingredient with that name
pub async fn update_ingredient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateIngredientRequest>,
) -> ApiResult<Json<IngredientResponse>> {
    req.validate()?;

    let ingredient = Ingredient::update_name(&state.db, id, auth.user_id, &req.name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Ingredient not found".to_string()))?;

    Ok(Json(ingredient.into()))
}

/// Delete an ingredient
///
/// Links from recipes to the ingredient are removed by cascade; the
/// recipes themselves are untouched.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: No such ingredient owned by the caller
pub async fn delete_ingredient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = Ingredient::delete(&state.db, id, auth.user_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Ingredient not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
