use uuid::Uuid;

use super::role::RoleType;

/// A `users/{uid}` document.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub user_email: String,
    pub user_password_hash: String,
    pub role: RoleType,
}
