/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh)
/// - `users`: Authenticated user profile endpoints
/// - `recipes`: Recipe catalog endpoints
/// - `tags`: Tag management endpoints
/// - `ingredients`: Ingredient management endpoints

pub mod auth;
pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;
