/// Database models for RecipeVault
///
/// This module contains all database models and their owner-scoped data
/// access operations.
///
/// # Models
///
/// - `user`: User accounts and authentication
/// - `recipe`: Recipes with tag/ingredient associations and an optional image
/// - `tag`: Owner-scoped recipe tags
/// - `ingredient`: Owner-scoped recipe ingredients
///
/// # Ownership
///
/// Every query and mutation against recipes, tags, and ingredients takes the
/// owner's user id and restricts the SQL to `user_id = $owner`. A row owned
/// by someone else is indistinguishable from a row that does not exist.
///
/// # Example
///
/// ```no_run
/// use recipevault_shared::models::user::{User, CreateUser};
/// use recipevault_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     name: Some("John Doe".to_string()),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod ingredient;
pub mod recipe;
pub mod tag;
pub mod user;
