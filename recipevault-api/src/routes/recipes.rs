/// Recipe catalog endpoints
///
/// # Endpoints
///
/// - `GET /v1/recipes` - List the caller's recipes (filterable)
/// - `POST /v1/recipes` - Create a recipe
/// - `GET /v1/recipes/:id` - Recipe detail
/// - `PUT /v1/recipes/:id` - Replace a recipe (full payload)
/// - `PATCH /v1/recipes/:id` - Partially update a recipe
/// - `DELETE /v1/recipes/:id` - Delete a recipe
/// - `POST /v1/recipes/:id/upload-image` - Attach an image
///
/// Every operation is scoped to the authenticated owner. A recipe that
/// exists but belongs to someone else is reported as `404 Not Found`,
/// for reads and writes alike.
///
/// # Child collections
///
/// `tags` and `ingredients` in create/update payloads are lists of
/// `{"name": "..."}` specs. Names are resolved per owner with
/// get-or-create, so referring to an existing name links the existing
/// row and a new name creates one. On update, an omitted collection is
/// left untouched while an explicit empty list clears it. The recipe
/// write and its collection reconciliation commit in one transaction.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::Json,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension,
};
use recipevault_shared::{
    auth::middleware::AuthContext,
    media::ImageFormat,
    models::{
        ingredient::Ingredient,
        recipe::{CreateRecipe, Recipe, RecipeFilter, UpdateRecipe},
        tag::Tag,
    },
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Child-collection spec: a tag or ingredient referenced by name
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NameSpec {
    /// Tag or ingredient name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Tag as returned in recipe payloads and tag listings
#[derive(Debug, Serialize)]
pub struct TagResponse {
    /// Tag ID
    pub id: i64,

    /// Tag name
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

/// Ingredient as returned in recipe payloads and ingredient listings
#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    /// Ingredient ID
    pub id: i64,

    /// Ingredient name
    pub name: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
        }
    }
}

/// Recipe as returned by the list endpoint
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    /// Recipe ID
    pub id: i64,

    /// Title
    pub title: String,

    /// Preparation time in minutes
    pub time_minutes: i32,

    /// Price (serialized as a decimal string)
    pub price: Decimal,

    /// Optional external URL
    pub link: Option<String>,

    /// Attached tags
    pub tags: Vec<TagResponse>,

    /// Attached ingredients
    pub ingredients: Vec<IngredientResponse>,

    /// Relative path of the stored image, if any
    pub image_path: Option<String>,
}

/// Recipe as returned by detail, create, and update
///
/// Extends the summary with the description.
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    /// Recipe ID
    pub id: i64,

    /// Title
    pub title: String,

    /// Preparation time in minutes
    pub time_minutes: i32,

    /// Price (serialized as a decimal string)
    pub price: Decimal,

    /// Optional external URL
    pub link: Option<String>,

    /// Optional free-form description
    pub description: Option<String>,

    /// Attached tags
    pub tags: Vec<TagResponse>,

    /// Attached ingredients
    pub ingredients: Vec<IngredientResponse>,

    /// Relative path of the stored image, if any
    pub image_path: Option<String>,
}

impl RecipeDetail {
    fn assemble(recipe: Recipe, tags: Vec<Tag>, ingredients: Vec<Ingredient>) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            description: recipe.description,
            tags: tags.into_iter().map(TagResponse::from).collect(),
            ingredients: ingredients
                .into_iter()
                .map(IngredientResponse::from)
                .collect(),
            image_path: recipe.image_path,
        }
    }
}

/// Upload-image response
#[derive(Debug, Serialize)]
pub struct RecipeImageResponse {
    /// Recipe ID
    pub id: i64,

    /// Relative path of the stored image
    pub image_path: String,
}

/// List query parameters
///
/// `tags` and `ingredients` take comma-separated integer id lists, e.g.
/// `GET /v1/recipes?tags=1,2&ingredients=7`.
#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    /// Comma-separated tag ids
    pub tags: Option<String>,

    /// Comma-separated ingredient ids
    pub ingredients: Option<String>,
}

/// Create request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecipeRequest {
    /// Title (required, non-empty)
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Preparation time in minutes (non-negative)
    pub time_minutes: i32,

    /// Price (non-negative decimal)
    pub price: Decimal,

    /// Optional external URL
    #[validate(length(max = 255, message = "Link must be at most 255 characters"))]
    pub link: Option<String>,

    /// Optional description
    pub description: Option<String>,

    /// Tags to attach (absent behaves like an empty list on create)
    #[validate(nested)]
    pub tags: Option<Vec<NameSpec>>,

    /// Ingredients to attach (absent behaves like an empty list on create)
    #[validate(nested)]
    pub ingredients: Option<Vec<NameSpec>>,
}

/// Update request
///
/// Absent scalar fields are untouched; `link` and `description` accept
/// explicit null to clear. Absent collections are untouched; an empty
/// list clears the collection.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateRecipeRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New preparation time
    pub time_minutes: Option<i32>,

    /// New price
    pub price: Option<Decimal>,

    /// New link (null clears it)
    #[serde(default, deserialize_with = "double_option")]
    pub link: Option<Option<String>>,

    /// New description (null clears it)
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    /// Replacement tag set (absent = untouched, `[]` = clear)
    #[validate(nested)]
    pub tags: Option<Vec<NameSpec>>,

    /// Replacement ingredient set (absent = untouched, `[]` = clear)
    #[validate(nested)]
    pub ingredients: Option<Vec<NameSpec>>,
}

/// Replace request (PUT)
///
/// Unlike [`UpdateRecipeRequest`], the required fields must all be
/// present; the body of a PUT is the full resource, not a delta.
#[derive(Debug, Deserialize, Validate)]
pub struct ReplaceRecipeRequest {
    /// Title (required)
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Preparation time in minutes (required)
    pub time_minutes: i32,

    /// Price (required)
    pub price: Decimal,

    /// New link (null clears it)
    #[serde(default, deserialize_with = "double_option")]
    pub link: Option<Option<String>>,

    /// New description (null clears it)
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    /// Replacement tag set (absent = untouched, `[]` = clear)
    #[validate(nested)]
    pub tags: Option<Vec<NameSpec>>,

    /// Replacement ingredient set (absent = untouched, `[]` = clear)
    #[validate(nested)]
    pub ingredients: Option<Vec<NameSpec>>,
}

impl From<ReplaceRecipeRequest> for UpdateRecipeRequest {
    fn from(req: ReplaceRecipeRequest) -> Self {
        Self {
            title: Some(req.title),
            time_minutes: Some(req.time_minutes),
            price: Some(req.price),
            link: req.link,
            description: req.description,
            tags: req.tags,
            ingredients: req.ingredients,
        }
    }
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

/// Parses a comma-separated id list query value
///
/// Empty segments (as in `tags=1,,2` or a bare `tags=`) are rejected
/// rather than ignored.
fn parse_id_list(field: &str, raw: &str) -> Result<Vec<i64>, ApiError> {
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .map_err(|_| ApiError::validation(field, "Expected a comma-separated list of ids"))
        })
        .collect()
}

/// Checks the numeric invariants shared by create and update
fn check_numeric_bounds(time_minutes: Option<i32>, price: Option<Decimal>) -> Result<(), ApiError> {
    if let Some(minutes) = time_minutes {
        if minutes < 0 {
            return Err(ApiError::validation(
                "time_minutes",
                "Time must be non-negative",
            ));
        }
    }
    if let Some(price) = price {
        if price < Decimal::ZERO {
            return Err(ApiError::validation("price", "Price must be non-negative"));
        }
    }
    Ok(())
}

fn spec_names(specs: &[NameSpec]) -> Vec<String> {
    specs.iter().map(|s| s.name.clone()).collect()
}

/// Loads a recipe's child collections and assembles the detail response
async fn load_detail(state: &AppState, recipe: Recipe) -> ApiResult<RecipeDetail> {
    let tags = Tag::list_for_recipe(&state.db, recipe.id).await?;
    let ingredients = Ingredient::list_for_recipe(&state.db, recipe.id).await?;
    Ok(RecipeDetail::assemble(recipe, tags, ingredients))
}

/// List the caller's recipes, newest first
///
/// # Endpoint
///
/// ```text
/// GET /v1/recipes?tags=1,2&ingredients=7
/// ```
///
/// Filters are intersected: with both given, a recipe must carry at
/// least one requested tag AND at least one requested ingredient.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed filter value
/// - `401 Unauthorized`: Missing or invalid token
pub async fn list_recipes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<RecipeListQuery>,
) -> ApiResult<Json<Vec<RecipeSummary>>> {
    let filter = RecipeFilter {
        tag_ids: query
            .tags
            .as_deref()
            .map(|raw| parse_id_list("tags", raw))
            .transpose()?,
        ingredient_ids: query
            .ingredients
            .as_deref()
            .map(|raw| parse_id_list("ingredients", raw))
            .transpose()?,
    };

    let recipes = Recipe::list_by_owner(&state.db, auth.user_id, &filter).await?;

    let mut summaries = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        let tags = Tag::list_for_recipe(&state.db, recipe.id).await?;
        let ingredients = Ingredient::list_for_recipe(&state.db, recipe.id).await?;

        summaries.push(RecipeSummary {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            tags: tags.into_iter().map(TagResponse::from).collect(),
            ingredients: ingredients
                .into_iter()
                .map(IngredientResponse::from)
                .collect(),
            image_path: recipe.image_path,
        });
    }

    Ok(Json(summaries))
}

/// Create a recipe
///
/// # Endpoint
///
/// ```text
/// POST /v1/recipes
/// Content-Type: application/json
///
/// {
///   "title": "Pongal",
///   "time_minutes": 35,
///   "price": "6.50",
///   "tags": [{"name": "Breakfast"}],
///   "ingredients": [{"name": "Rice"}, {"name": "Lentils"}]
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid token
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateRecipeRequest>,
) -> ApiResult<(StatusCode, Json<RecipeDetail>)> {
    req.validate()?;
    check_numeric_bounds(Some(req.time_minutes), Some(req.price))?;

    let mut tx = state.db.begin().await?;

    let recipe = Recipe::create(
        &mut *tx,
        auth.user_id,
        CreateRecipe {
            title: req.title,
            time_minutes: req.time_minutes,
            price: req.price,
            link: req.link,
            description: req.description,
        },
    )
    .await?;

    let tag_names = req.tags.as_deref().map(spec_names).unwrap_or_default();
    let ingredient_names = req
        .ingredients
        .as_deref()
        .map(spec_names)
        .unwrap_or_default();

    let tags = Recipe::reconcile_tags(&mut *tx, recipe.id, auth.user_id, &tag_names).await?;
    let ingredients =
        Recipe::reconcile_ingredients(&mut *tx, recipe.id, auth.user_id, &ingredient_names).await?;

    tx.commit().await?;

    tracing::info!(recipe_id = recipe.id, user_id = %auth.user_id, "Created recipe");

    Ok((
        StatusCode::CREATED,
        Json(RecipeDetail::assemble(recipe, tags, ingredients)),
    ))
}

/// Fetch one recipe with its full detail
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: No such recipe owned by the caller
pub async fn get_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<RecipeDetail>> {
    let recipe = Recipe::find_by_id_and_owner(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

    Ok(Json(load_detail(&state, recipe).await?))
}

/// Partially update a recipe (PATCH)
///
/// Scalar fields are merged; collections follow the absent/empty
/// convention described in the module docs. The row update and any
/// reconciliation commit atomically.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: No such recipe owned by the caller
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRecipeRequest>,
) -> ApiResult<Json<RecipeDetail>> {
    req.validate()?;
    apply_recipe_update(&state, auth, id, req).await
}

/// Replace a recipe (PUT)
///
/// The payload must carry every required field (`title`,
/// `time_minutes`, `price`); a body missing one of them is rejected
/// rather than treated as a partial update. Optional fields and
/// collections keep the PATCH conventions.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or required field missing
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: No such recipe owned by the caller
pub async fn replace_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(req): Json<ReplaceRecipeRequest>,
) -> ApiResult<Json<RecipeDetail>> {
    req.validate()?;
    apply_recipe_update(&state, auth, id, req.into()).await
}

/// Shared PUT/PATCH write path: row update plus child reconciliation
/// in one transaction
async fn apply_recipe_update(
    state: &AppState,
    auth: AuthContext,
    id: i64,
    req: UpdateRecipeRequest,
) -> ApiResult<Json<RecipeDetail>> {
    check_numeric_bounds(req.time_minutes, req.price)?;

    let mut tx = state.db.begin().await?;

    let recipe = Recipe::update(
        &mut *tx,
        id,
        auth.user_id,
        UpdateRecipe {
            title: req.title,
            time_minutes: req.time_minutes,
            price: req.price,
            link: req.link,
            description: req.description,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

    // Reconcile only the collections the payload actually carried
    let reconciled_tags = match req.tags {
        Some(specs) => Some(
            Recipe::reconcile_tags(&mut *tx, recipe.id, auth.user_id, &spec_names(&specs)).await?,
        ),
        None => None,
    };
    let reconciled_ingredients = match req.ingredients {
        Some(specs) => Some(
            Recipe::reconcile_ingredients(&mut *tx, recipe.id, auth.user_id, &spec_names(&specs))
                .await?,
        ),
        None => None,
    };

    tx.commit().await?;

    // Untouched collections are read back for the response
    let tags = match reconciled_tags {
        Some(tags) => tags,
        None => Tag::list_for_recipe(&state.db, recipe.id).await?,
    };
    let ingredients = match reconciled_ingredients {
        Some(ingredients) => ingredients,
        None => Ingredient::list_for_recipe(&state.db, recipe.id).await?,
    };

    Ok(Json(RecipeDetail::assemble(recipe, tags, ingredients)))
}

/// Delete a recipe
///
/// Removes the recipe and its child links (via cascading foreign keys).
/// Tags and ingredients themselves survive; they belong to the user,
/// not to the recipe.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: No such recipe owned by the caller
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = Recipe::delete(&state.db, id, auth.user_id).await?;

    if !deleted {
        return Err(ApiError::NotFound("Recipe not found".to_string()));
    }

    tracing::info!(recipe_id = id, user_id = %auth.user_id, "Deleted recipe");

    Ok(StatusCode::NO_CONTENT)
}

/// Attach an image to a recipe
///
/// Accepts a multipart form with an `image` part. The payload is
/// validated by content (magic bytes), never by the client-supplied
/// filename or content type. Uploading over an existing image replaces
/// it and deletes the orphaned blob.
///
/// # Endpoint
///
/// ```text
/// POST /v1/recipes/:id/upload-image
/// Content-Type: multipart/form-data
///
/// --boundary
/// Content-Disposition: form-data; name="image"; filename="dish.png"
/// ...
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing `image` part or unsupported payload
/// - `401 Unauthorized`: Missing or invalid token
/// - `404 Not Found`: No such recipe owned by the caller
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<Json<RecipeImageResponse>> {
    // Reject unknown recipes before touching the filesystem
    Recipe::find_by_id_and_owner(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

    let mut image_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read image data: {}", e)))?;
            image_data = Some(bytes.to_vec());
        }
    }

    let data = image_data
        .ok_or_else(|| ApiError::validation("image", "Multipart field 'image' is required"))?;

    let format = ImageFormat::detect(&data).ok_or_else(|| {
        ApiError::validation("image", "Payload is not a supported image (PNG, JPEG, GIF, WebP)")
    })?;

    let image_path = state.media.store_recipe_image(id, format, &data).await?;

    // The recipe can vanish between the ownership check and the path
    // swap; clean up the fresh blob if it did
    let previous = match Recipe::replace_image_path(&state.db, id, auth.user_id, &image_path).await?
    {
        Some(previous) => previous,
        None => {
            state.media.delete(&image_path).await?;
            return Err(ApiError::NotFound("Recipe not found".to_string()));
        }
    };

    // Remove the replaced blob; losing this cleanup only leaks a file
    if let Some(old_path) = previous {
        if let Err(e) = state.media.delete(&old_path).await {
            tracing::warn!(recipe_id = id, path = %old_path, error = %e, "Failed to delete replaced image");
        }
    }

    tracing::info!(recipe_id = id, user_id = %auth.user_id, path = %image_path, "Stored recipe image");

    Ok(Json(RecipeImageResponse { id, image_path }))
}
