/// Request-scoped authentication context
///
/// After the API's bearer-token middleware validates a JWT, it inserts an
/// [`AuthContext`] into the request extensions. Handlers extract it with
/// Axum's `Extension` extractor and pass the user id explicitly into every
/// model call — the authenticated identity is never ambient state.
///
/// # Example
///
/// ```ignore
/// use axum::Extension;
/// use recipevault_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authentication context added to request extensions
///
/// Every owner-scoped query in the system takes `user_id` from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    pub fn from_jwt(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_jwt() {
        let user_id = Uuid::new_v4();
        let ctx = AuthContext::from_jwt(user_id);
        assert_eq!(ctx.user_id, user_id);
    }
}
