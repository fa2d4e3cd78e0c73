/// Ingredient model and database operations
///
/// Ingredients are structurally identical to tags (owner-scoped `{id, name}`
/// rows) but form a separate entity type with its own link table
/// (`recipe_ingredients`). Like tags, they are created only through
/// [`Ingredient::get_or_create`] during recipe reconciliation; the listing
/// endpoint exists so users can pick from what they already have.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE ingredients (
///     id BIGSERIAL PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT ingredients_user_id_name_key UNIQUE (user_id, name)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Ingredient model representing an owner-scoped recipe component
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingredient {
    /// Unique ingredient ID (monotonically assigned)
    pub id: i64,

    /// Owner of the ingredient
    pub user_id: Uuid,

    /// Ingredient name, unique per owner
    pub name: String,

    /// When the ingredient was created
    pub created_at: DateTime<Utc>,
}

impl Ingredient {
    /// Looks up an ingredient by `(owner, name)`, creating it if absent
    ///
    /// Single atomic upsert; see [`crate::models::tag::Tag::get_or_create`]
    /// for the duplicate-row reasoning.
    pub async fn get_or_create(
        conn: &mut PgConnection,
        owner: Uuid,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            r#"
            INSERT INTO ingredients (user_id, name)
            VALUES ($1, $2)
            ON CONFLICT (user_id, name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(owner)
        .bind(name)
        .fetch_one(conn)
        .await?;

        Ok(ingredient)
    }

    /// Lists the owner's ingredients, ordered by descending name
    ///
    /// With `assigned_only`, restricts to ingredients linked to at least
    /// one recipe, without duplicates.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner: Uuid,
        assigned_only: bool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = String::from(
            "SELECT i.id, i.user_id, i.name, i.created_at FROM ingredients i WHERE i.user_id = $1",
        );

        if assigned_only {
            query.push_str(
                " AND EXISTS (SELECT 1 FROM recipe_ingredients ri WHERE ri.ingredient_id = i.id)",
            );
        }

        query.push_str(" ORDER BY i.name DESC");

        let ingredients = sqlx::query_as::<_, Ingredient>(&query)
            .bind(owner)
            .fetch_all(pool)
            .await?;

        Ok(ingredients)
    }

    /// Lists the ingredients linked to a recipe
    pub async fn list_for_recipe(
        pool: &PgPool,
        recipe_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let ingredients = sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT i.id, i.user_id, i.name, i.created_at
            FROM ingredients i
            JOIN recipe_ingredients ri ON ri.ingredient_id = i.id
            WHERE ri.recipe_id = $1
            ORDER BY i.name
            "#,
        )
        .bind(recipe_id)
        .fetch_all(pool)
        .await?;

        Ok(ingredients)
    }

    /// Finds an ingredient by ID, scoped to its owner
    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        id: i64,
        owner: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "SELECT id, user_id, name, created_at FROM ingredients WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await?;

        Ok(ingredient)
    }

    /// Renames an ingredient, scoped to its owner
    pub async fn update_name(
        pool: &PgPool,
        id: i64,
        owner: Uuid,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            r#"
            UPDATE ingredients
            SET name = $3
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(ingredient)
    }

    /// Deletes an ingredient, scoped to its owner
    pub async fn delete(pool: &PgPool, id: i64, owner: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
