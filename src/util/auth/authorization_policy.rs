use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::gateway::DocumentStore;

/// Decides whether the caller may mutate the gallery.
///
/// This is a client-side courtesy check; the backend's own access rules remain the real
/// enforcement point.
#[async_trait]
pub trait AuthorizationPolicy: Send + Sync {
    async fn can_edit(&self) -> anyhow::Result<bool>;
}

/// Grants edit rights when `users/{uid}.role` is `admin`.
///
/// The role is read at most once per policy instance, i.e. once per gallery view session.
/// Failed lookups are not cached.
pub struct RoleAuthorizationPolicy {
    documents: Arc<dyn DocumentStore>,
    user_id: Option<Uuid>,
    decision: OnceCell<bool>,
}

impl RoleAuthorizationPolicy {
    pub fn new(documents: Arc<dyn DocumentStore>, user_id: Option<Uuid>) -> Self {
        RoleAuthorizationPolicy {
            documents,
            user_id,
            decision: OnceCell::new(),
        }
    }
}

#[async_trait]
impl AuthorizationPolicy for RoleAuthorizationPolicy {
    async fn can_edit(&self) -> anyhow::Result<bool> {
        let Some(user_id) = self.user_id else {
            return Ok(false);
        };

        let decision = self
            .decision
            .get_or_try_init(|| async {
                let is_admin = match self.documents.get_user(user_id).await? {
                    Some(user) => user.role.is_admin(),
                    None => {
                        warn!(user_id = %user_id, "Session user has no user document");
                        false
                    }
                };
                debug!(user_id = %user_id, is_admin, "Resolved gallery edit rights");
                Ok::<bool, anyhow::Error>(is_admin)
            })
            .await?;

        Ok(*decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::auth::{role::RoleType, user::User},
        gateway::memory::InMemoryDocumentStore,
    };

    async fn store_with(role: RoleType) -> (Arc<InMemoryDocumentStore>, Uuid) {
        let store = Arc::new(InMemoryDocumentStore::new());
        let user_id = Uuid::now_v7();
        store
            .insert_user(User {
                user_id,
                user_email: "someone@example.com".to_string(),
                user_password_hash: String::new(),
                role,
            })
            .await;
        (store, user_id)
    }

    #[tokio::test]
    async fn admin_role_grants_edit() {
        let (store, user_id) = store_with(RoleType::Admin).await;
        let policy = RoleAuthorizationPolicy::new(store, Some(user_id));
        assert!(policy.can_edit().await.unwrap());
    }

    #[tokio::test]
    async fn plain_user_and_anonymous_are_denied() {
        let (store, user_id) = store_with(RoleType::User).await;
        let user_policy = RoleAuthorizationPolicy::new(store.clone(), Some(user_id));
        assert!(!user_policy.can_edit().await.unwrap());

        let reads_before = store.read_count();
        let anonymous = RoleAuthorizationPolicy::new(store.clone(), None);
        assert!(!anonymous.can_edit().await.unwrap());
        assert_eq!(store.read_count(), reads_before);
    }

    #[tokio::test]
    async fn decision_is_cached_for_the_session() {
        let (store, user_id) = store_with(RoleType::Admin).await;
        let policy = RoleAuthorizationPolicy::new(store.clone(), Some(user_id));
        assert!(policy.can_edit().await.unwrap());
        let reads = store.read_count();

        store.set_fail_reads(true);
        assert!(policy.can_edit().await.unwrap());
        assert_eq!(store.read_count(), reads);
    }

    #[tokio::test]
    async fn failed_lookup_is_retried() {
        let (store, user_id) = store_with(RoleType::Admin).await;
        let policy = RoleAuthorizationPolicy::new(store.clone(), Some(user_id));

        store.set_fail_reads(true);
        assert!(policy.can_edit().await.is_err());

        store.set_fail_reads(false);
        assert!(policy.can_edit().await.unwrap());
    }
}
