/// Tag management endpoints
///
/// # Endpoints
///
/// - `GET /v1/tags` - List the caller's tags
/// - `PATCH /v1/tags/:id` - Rename a tag
/// - `DELETE /v1/tags/:id` - Delete a tag
///
/// Tags are created implicitly through recipe payloads; there is no
/// create endpoint. Listing accepts `assigned_only=1` to restrict the
/// result to tags currently attached to at least one recipe. Everything
/// is scoped to the authenticated owner; foreign tags report 404.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::Json,
    routes::recipes::TagResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
};
use recipevault_shared::{auth::middleware::AuthContext, models::tag::Tag};
use serde::Deserialize;
use validator::Validate;

/// List query parameters
#[derive(Debug, Default, Deserialize)]
pub struct TagListQuery {
    /// Restrict to tags attached to at least one recipe
    /// (integer flag: nonzero = true)
    pub assigned_only: Option<String>,
}

/// Rename request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTagRequest {
    /// New tag name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Parses the `assigned_only` query value
///
/// The value is an integer flag: any nonzero value is truthy, zero is
/// falsy, anything unparseable is a validation failure.
pub(crate) fn parse_assigned_only(raw: Option<&str>) -> Result<bool, ApiError> {
    match raw {
        None => Ok(false),
        Some(value) => value
            .trim()
            .parse::<i64>()
            .map(|n| n != 0)
            .map_err(|_| ApiError::validation("assigned_only", "Expected an integer flag")),
    }
}

/// List the caller's tags, ordered by descending name
///
/// # Endpoint
///
/// ```text
/// GET /v1/tags?assigned_only=1
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed `assigned_only` value
/// - `401 Unauthorized`: Missing or invalid token
pub async fn list_tags(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<TagListQuery>,
) -> ApiResult<Json<Vec<TagResponse>>> {
    let assigned_only = parse_assigned_only(query.assigned_only.as_deref())?;

    let tags = Tag::list_by_owner(&state.db, auth.user_id, assigned_only).await?;

    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

/// Rename a tag
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: No such tag owned by the caller
/// - `409 Conflict`: The caller already has a tag with that name
pub async fn update_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTagRequest>,
) -> ApiResult<Json<TagResponse>> {
    req.validate()?;

    let tag = Tag::update_name(&state.db, id, auth.user_id, &req.name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    Ok(Json(tag.into()))
}

/// Delete a tag
///
/// Links from recipes to the tag are removed by cascade; the recipes
/// themselves are untouched.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: No such tag owned by the caller
pub async fn delete_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = Tag::delete(&state.db, id, auth.user_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Tag not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assigned_only() {
        assert!(!parse_assigned_only(None).unwrap());
        assert!(parse_assigned_only(Some("1")).unwrap());
        assert!(!parse_assigned_only(Some("0")).unwrap());
        assert!(parse_assigned_only(Some("yes")).is_err());
        assert!(parse_assigned_only(Some("")).is_err());
    }

    #[test]
    fn test_parse_assigned_only_nonzero_is_truthy() {
        assert!(parse_assigned_only(Some("2")).unwrap());
        assert!(parse_assigned_only(Some("-1")).unwrap());
        assert!(parse_assigned_only(Some(" 1 ")).unwrap());
    }
}
