use serde_derive::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    Admin,
    User,
}

impl RoleType {
    /// Unknown role strings are treated as plain users.
    pub fn from_role_str(role: &str) -> Self {
        match role.trim() {
            "admin" => RoleType::Admin,
            _ => RoleType::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleType::Admin => "admin",
            RoleType::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, RoleType::Admin)
    }
}
