/// Tag model and database operations
///
/// Tags are owner-scoped labels attached to recipes through the
/// `recipe_tags` link table. There is no direct creation endpoint: tags
/// come into existence only through [`Tag::get_or_create`] during recipe
/// create/update reconciliation.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tags (
///     id BIGSERIAL PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT tags_user_id_name_key UNIQUE (user_id, name)
/// );
/// ```
///
/// The `(user_id, name)` unique constraint makes get-or-create a single
/// atomic upsert: concurrent identical requests resolve to the same row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Tag model representing an owner-scoped recipe label
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    /// Unique tag ID (monotonically assigned)
    pub id: i64,

    /// Owner of the tag
    pub user_id: Uuid,

    /// Tag name, unique per owner
    pub name: String,

    /// When the tag was created
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Looks up a tag by `(owner, name)`, creating it if absent
    ///
    /// Implemented as `INSERT ... ON CONFLICT DO UPDATE ... RETURNING`, so
    /// the lookup/insert pair is one atomic statement and repeated names in
    /// a single request (or concurrent identical requests) yield the same
    /// row instead of duplicates.
    ///
    /// Takes a connection rather than a pool so it composes under the
    /// caller's transaction.
    pub async fn get_or_create(
        conn: &mut PgConnection,
        owner: Uuid,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (user_id, name)
            VALUES ($1, $2)
            ON CONFLICT (user_id, name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, user_id, name, created_at
            "#,
        )
        .bind(owner)
        .bind(name)
        .fetch_one(conn)
        .await?;

        Ok(tag)
    }

    /// Lists the owner's tags, ordered by descending name
    ///
    /// With `assigned_only`, restricts to tags linked to at least one
    /// recipe. The `EXISTS` subquery keeps results free of duplicates even
    /// when a tag is attached to many recipes.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner: Uuid,
        assigned_only: bool,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = String::from(
            "SELECT t.id, t.user_id, t.name, t.created_at FROM tags t WHERE t.user_id = $1",
        );

        if assigned_only {
            query.push_str(
                " AND EXISTS (SELECT 1 FROM recipe_tags rt WHERE rt.tag_id = t.id)",
            );
        }

        query.push_str(" ORDER BY t.name DESC");

        let tags = sqlx::query_as::<_, Tag>(&query)
            .bind(owner)
            .fetch_all(pool)
            .await?;

        Ok(tags)
    }

    /// Lists the tags linked to a recipe
    pub async fn list_for_recipe(
        pool: &PgPool,
        recipe_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.user_id, t.name, t.created_at
            FROM tags t
            JOIN recipe_tags rt ON rt.tag_id = t.id
            WHERE rt.recipe_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(recipe_id)
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    /// Finds a tag by ID, scoped to its owner
    ///
    /// A tag owned by someone else is reported as absent.
    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        id: i64,
        owner: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            "SELECT id, user_id, name, created_at FROM tags WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await?;

        Ok(tag)
    }

    /// Renames a tag, scoped to its owner
    ///
    /// # Returns
    ///
    /// The updated tag, or None if no tag with that id belongs to `owner`
    ///
    /// # Errors
    ///
    /// Renaming to a name the owner already uses violates the
    /// `(user_id, name)` constraint and surfaces as a database error.
    pub async fn update_name(
        pool: &PgPool,
        id: i64,
        owner: Uuid,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            UPDATE tags
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

        Ok(tag)
    }

    /// Deletes a tag, scoped to its owner
    ///
    /// Links to recipes cascade. Returns false when no tag with that id
    /// belongs to `owner`.
    pub async fn delete(pool: &PgPool, id: i64, owner: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_serialization() {
        let tag = Tag {
            id: 7,
            user_id: Uuid::new_v4(),
            name: "Vegan".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["name"], "Vegan");
    }
}
