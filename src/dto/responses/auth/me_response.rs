use chrono::{DateTime, Utc};
use serde_derive::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::auth::role::RoleType;

#[derive(Serialize, ToSchema)]
pub struct MeResponse {
    pub user_id: Uuid,
    pub user_email: String,
    pub role: RoleType,
    pub is_admin: bool,
    pub session_expires_at: DateTime<Utc>,
}
