use chrono::Utc;
use uuid::Uuid;

use crate::domain::auth::role::RoleType;

pub const DEFAULT_SESSION_DURATION: chrono::Duration = chrono::Duration::hours(1);

#[derive(Debug, Clone, serde_derive::Serialize, serde_derive::Deserialize)]
pub struct Session {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub role: RoleType,
    pub created_at: chrono::DateTime<Utc>,
    pub expires_at: chrono::DateTime<Utc>,
}

impl Session {
    pub fn is_valid(&self) -> bool {
        let now = Utc::now();

        self.created_at <= now && self.expires_at > now
    }

    pub fn get_user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn get_user_email(&self) -> &str {
        &self.user_email
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(created_offset: i64, ttl_minutes: i64) -> Session {
        let created_at = Utc::now() + chrono::Duration::minutes(created_offset);
        Session {
            session_id: Uuid::new_v4(),
            user_id: Uuid::now_v7(),
            user_email: "owner@example.com".to_string(),
            role: RoleType::Admin,
            created_at,
            expires_at: created_at + chrono::Duration::minutes(ttl_minutes),
        }
    }

    #[test]
    fn validity_window() {
        assert!(session(-1, 60).is_valid());
        assert!(!session(-120, 60).is_valid());
        assert!(!session(10, 60).is_valid());
    }
}
