/// Recipe model and database operations
///
/// Recipes are the central entity: single-owner rows carrying scalar fields
/// plus two many-to-many child collections (tags, ingredients) and an
/// optional image path. This module owns the two pieces of nontrivial
/// behavior in the system:
///
/// - **Reconciliation**: [`Recipe::reconcile_tags`] /
///   [`Recipe::reconcile_ingredients`] implement clear-then-relink with
///   get-or-create semantics for `{name}` specs. Callers run them inside
///   the same transaction as the recipe insert/update, so a failed spec
///   never leaves a partial link set behind.
/// - **Filtered listing**: [`Recipe::list_by_owner`] translates optional
///   tag/ingredient id lists into `EXISTS ... = ANY($ids)` subqueries
///   (OR within one list, AND between the two), always owner-scoped,
///   ordered newest-first by id, duplicate-free by construction.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE recipes (
///     id BIGSERIAL PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     time_minutes INTEGER NOT NULL CHECK (time_minutes >= 0),
///     price NUMERIC(5, 2) NOT NULL CHECK (price >= 0),
///     link VARCHAR(512),
///     description TEXT,
///     image_path VARCHAR(512),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use recipevault_shared::models::recipe::{Recipe, CreateRecipe};
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// # async fn example(pool: sqlx::PgPool, owner: Uuid) -> Result<(), sqlx::Error> {
/// let mut tx = pool.begin().await?;
///
/// let recipe = Recipe::create(&mut tx, owner, CreateRecipe {
///     title: "Pongal".to_string(),
///     time_minutes: 60,
///     price: "6.50".parse::<Decimal>().unwrap(),
///     link: None,
///     description: None,
/// }).await?;
///
/// Recipe::reconcile_tags(&mut tx, recipe.id, owner, &["Indian".into(), "Breakfast".into()]).await?;
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::{ingredient::Ingredient, tag::Tag};

/// Recipe model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    /// Unique recipe ID (monotonically assigned)
    pub id: i64,

    /// Owner of the recipe
    pub user_id: Uuid,

    /// Recipe title
    pub title: String,

    /// Preparation time in minutes (non-negative)
    pub time_minutes: i32,

    /// Price (non-negative, two decimal places)
    pub price: Decimal,

    /// Optional external URL
    pub link: Option<String>,

    /// Optional free-form description
    pub description: Option<String>,

    /// Path of the stored image blob, relative to the media root
    pub image_path: Option<String>,

    /// When the recipe was created
    pub created_at: DateTime<Utc>,

    /// When the recipe was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecipe {
    /// Recipe title
    pub title: String,

    /// Preparation time in minutes
    pub time_minutes: i32,

    /// Price
    pub price: Decimal,

    /// Optional external URL
    pub link: Option<String>,

    /// Optional description
    pub description: Option<String>,
}

/// Input for partially updating a recipe
///
/// All fields are optional. Only non-None fields will be updated; the
/// owner is never among them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRecipe {
    /// New title
    pub title: Option<String>,

    /// New preparation time
    pub time_minutes: Option<i32>,

    /// New price
    pub price: Option<Decimal>,

    /// New link (use Some(None) to clear)
    pub link: Option<Option<String>>,

    /// New description (use Some(None) to clear)
    pub description: Option<Option<String>>,
}

/// Listing filter over associated tag/ingredient ids
///
/// Within one list a recipe matches if it is linked to ANY of the ids;
/// when both lists are given a recipe must match both.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Restrict to recipes linked to at least one of these tag ids
    pub tag_ids: Option<Vec<i64>>,

    /// Restrict to recipes linked to at least one of these ingredient ids
    pub ingredient_ids: Option<Vec<i64>>,
}

impl Recipe {
    /// Creates a new recipe owned by `owner`
    ///
    /// Takes a connection so the caller can reconcile child collections in
    /// the same transaction; the recipe row must exist before links to it
    /// can be inserted.
    pub async fn create(
        conn: &mut PgConnection,
        owner: Uuid,
        data: CreateRecipe,
    ) -> Result<Self, sqlx::Error> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (user_id, title, time_minutes, price, link, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, title, time_minutes, price, link, description,
                      image_path, created_at, updated_at
            "#,
        )
        .bind(owner)
        .bind(data.title)
        .bind(data.time_minutes)
        .bind(data.price)
        .bind(data.link)
        .bind(data.description)
        .fetch_one(conn)
        .await?;

        Ok(recipe)
    }

    /// Finds a recipe by ID, scoped to its owner
    ///
    /// A recipe owned by someone else is reported as absent, so callers
    /// surface not-found rather than leaking its existence.
    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        id: i64,
        owner: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let recipe = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, user_id, title, time_minutes, price, link, description,
                   image_path, created_at, updated_at
            FROM recipes
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await?;

        Ok(recipe)
    }

    /// Lists the owner's recipes, newest first
    ///
    /// `EXISTS` subqueries keep the result set duplicate-free even when a
    /// recipe matches several of the requested ids.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner: Uuid,
        filter: &RecipeFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = String::from(
            "SELECT r.id, r.user_id, r.title, r.time_minutes, r.price, r.link, \
             r.description, r.image_path, r.created_at, r.updated_at \
             FROM recipes r WHERE r.user_id = $1",
        );
        let mut bind_count = 1;

        if filter.tag_ids.is_some() {
            bind_count += 1;
            query.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM recipe_tags rt \
                 WHERE rt.recipe_id = r.id AND rt.tag_id = ANY(${}))",
                bind_count
            ));
        }
        if filter.ingredient_ids.is_some() {
            bind_count += 1;
            query.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM recipe_ingredients ri \
                 WHERE ri.recipe_id = r.id AND ri.ingredient_id = ANY(${}))",
                bind_count
            ));
        }

        query.push_str(" ORDER BY r.id DESC");

        let mut q = sqlx::query_as::<_, Recipe>(&query).bind(owner);

        if let Some(ref tag_ids) = filter.tag_ids {
            q = q.bind(tag_ids.clone());
        }
        if let Some(ref ingredient_ids) = filter.ingredient_ids {
            q = q.bind(ingredient_ids.clone());
        }

        let recipes = q.fetch_all(pool).await?;

        Ok(recipes)
    }

    /// Partially updates a recipe, scoped to its owner
    ///
    /// Only non-None fields in `data` are updated; the row's owner is not
    /// part of the update under any input. Takes a connection so child
    /// reconciliation can share the transaction.
    ///
    /// # Returns
    ///
    /// The updated recipe, or None if no recipe with that id belongs to
    /// `owner`
    pub async fn update(
        conn: &mut PgConnection,
        id: i64,
        owner: Uuid,
        data: UpdateRecipe,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE recipes SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.time_minutes.is_some() {
            bind_count += 1;
            query.push_str(&format!(", time_minutes = ${}", bind_count));
        }
        if data.price.is_some() {
            bind_count += 1;
            query.push_str(&format!(", price = ${}", bind_count));
        }
        if data.link.is_some() {
            bind_count += 1;
            query.push_str(&format!(", link = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND user_id = $2 \
             RETURNING id, user_id, title, time_minutes, price, link, description, \
             image_path, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Recipe>(&query).bind(id).bind(owner);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(time_minutes) = data.time_minutes {
            q = q.bind(time_minutes);
        }
        if let Some(price) = data.price {
            q = q.bind(price);
        }
        if let Some(link_opt) = data.link {
            q = q.bind(link_opt);
        }
        if let Some(description_opt) = data.description {
            q = q.bind(description_opt);
        }

        let recipe = q.fetch_optional(conn).await?;

        Ok(recipe)
    }

    /// Deletes a recipe, scoped to its owner
    ///
    /// Links cascade. Returns false when no recipe with that id belongs to
    /// `owner`, which callers surface as not-found.
    pub async fn delete(pool: &PgPool, id: i64, owner: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replaces the recipe's stored image path, scoped to its owner
    ///
    /// # Returns
    ///
    /// The previous image path (so the caller can delete the orphaned
    /// blob), or None if no recipe with that id belongs to `owner`
    pub async fn replace_image_path(
        pool: &PgPool,
        id: i64,
        owner: Uuid,
        image_path: &str,
    ) -> Result<Option<Option<String>>, sqlx::Error> {
        let previous: Option<(Option<String>,)> = sqlx::query_as(
            r#"
            UPDATE recipes r
            SET image_path = $3, updated_at = NOW()
            FROM (SELECT id, image_path FROM recipes WHERE id = $1 AND user_id = $2 FOR UPDATE) old
            WHERE r.id = old.id
            RETURNING old.image_path
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(image_path)
        .fetch_optional(pool)
        .await?;

        Ok(previous.map(|(path,)| path))
    }

    /// Reconciles the recipe's tag set against a list of `{name}` specs
    ///
    /// Clears all existing tag links, then resolves each name with an
    /// atomic get-or-create scoped to `owner` and links the result. An
    /// empty slice therefore clears the set; callers skip the call
    /// entirely when the payload omitted the collection. Repeated names
    /// in one list collapse to a single returned tag.
    pub async fn reconcile_tags(
        conn: &mut PgConnection,
        recipe_id: i64,
        owner: Uuid,
        names: &[String],
    ) -> Result<Vec<Tag>, sqlx::Error> {
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *conn)
            .await?;

        let mut tags: Vec<Tag> = Vec::with_capacity(names.len());
        for name in names {
            // Duplicate names in one request resolve to one linked tag
            if tags.iter().any(|t| t.name == *name) {
                continue;
            }

            let tag = Tag::get_or_create(&mut *conn, owner, name).await?;

            sqlx::query(
                "INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(recipe_id)
            .bind(tag.id)
            .execute(&mut *conn)
            .await?;

            tags.push(tag);
        }

        Ok(tags)
    }

    /// Reconciles the recipe's ingredient set against a list of `{name}` specs
    ///
    /// Identical algorithm to [`Recipe::reconcile_tags`] over the
    /// ingredient tables.
    pub async fn reconcile_ingredients(
        conn: &mut PgConnection,
        recipe_id: i64,
        owner: Uuid,
        names: &[String],
    ) -> Result<Vec<Ingredient>, sqlx::Error> {
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *conn)
            .await?;

        let mut ingredients: Vec<Ingredient> = Vec::with_capacity(names.len());
        for name in names {
            if ingredients.iter().any(|i| i.name == *name) {
                continue;
            }

            let ingredient = Ingredient::get_or_create(&mut *conn, owner, name).await?;

            sqlx::query(
                "INSERT INTO recipe_ingredients (recipe_id, ingredient_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(recipe_id)
            .bind(ingredient.id)
            .execute(&mut *conn)
            .await?;

            ingredients.push(ingredient);
        }

        Ok(ingredients)
    }
}
