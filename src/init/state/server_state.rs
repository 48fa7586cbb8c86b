use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    domain::auth::user::User,
    errors::code_error::{CodeError, HandlerResponse, code_err},
    gallery::controller::GalleryController,
    gateway::Gateway,
    init::config::GalleryConfig,
    util::auth::authorization_policy::RoleAuthorizationPolicy,
};

use super::builder::ServerStateBuilder;
use super::gallery_view::GalleryView;
use super::session::{DEFAULT_SESSION_DURATION, Session};

pub struct ServerState {
    pub(crate) app_name_version: String,
    pub(crate) server_start_time: tokio::time::Instant,
    pub(crate) responses_handled: AtomicU64,
    pub(crate) gateway: Gateway,
    pub(crate) gallery_config: GalleryConfig,
    pub(crate) secure_cookies: bool,
    pub(crate) session_map: scc::HashMap<Uuid, Session>, // read/write
    pub(crate) view_map: scc::HashMap<Uuid, GalleryView>, // read/write
}

impl ServerState {
    pub fn builder() -> ServerStateBuilder {
        ServerStateBuilder::default()
    }

    pub async fn new_session(
        &self,
        user: &User,
        valid_for: Option<chrono::Duration>,
    ) -> anyhow::Result<Uuid> {
        let session_id = Uuid::new_v4();
        let now = Utc::now();
        let expires_at = now + valid_for.unwrap_or(DEFAULT_SESSION_DURATION);
        match self
            .session_map
            .insert_async(
                session_id,
                Session {
                    session_id,
                    user_id: user.user_id,
                    user_email: user.user_email.clone(),
                    role: user.role,
                    created_at: now,
                    expires_at,
                },
            )
            .await
        {
            Ok(_) => (),
            Err(_) => {
                return Err(anyhow::anyhow!(
                    "Failed to insert session into scc::HashMap; key already exists!"
                ));
            }
        };

        Ok(session_id)
    }

    pub async fn get_session(&self, session_id: &Uuid) -> anyhow::Result<Session> {
        match self
            .session_map
            .read_async(session_id, |_, v| v.clone())
            .await
        {
            Some(session) => Ok(session),
            None => Err(anyhow::anyhow!("Session not found")),
        }
    }

    pub fn get_session_length(&self) -> usize {
        self.session_map.len()
    }

    pub async fn remove_session(&self, session_id: Uuid) -> anyhow::Result<(Uuid, usize)> {
        match self.session_map.remove_async(&session_id).await {
            Some((session_id, _)) => Ok((session_id, self.session_map.len())),
            None => Err(anyhow::anyhow!("Session map out of sync!")),
        }
    }

    pub async fn purge_expired_sessions(&self) -> (usize, usize) {
        let now = Utc::now();
        let (mut pruned, mut remaining): (usize, usize) = (0, 0);

        self.session_map
            .iter_mut_async(|entry| {
                if entry.expires_at < now {
                    pruned += 1;
                    let _ = entry.consume();
                } else {
                    remaining += 1;
                }
                true
            })
            .await;

        (pruned, remaining)
    }

    /// Opens a new gallery view for `owner` and loads its first page.
    pub async fn open_view(
        &self,
        owner: Option<Uuid>,
        category: Option<String>,
    ) -> HandlerResponse<(Uuid, Arc<GalleryController>)> {
        self.make_room_for(owner).await?;

        let policy = Arc::new(RoleAuthorizationPolicy::new(
            Arc::clone(self.gateway.documents()),
            owner,
        ));
        let controller = GalleryController::open(
            self.gateway.clone(),
            policy,
            self.gallery_config.page_size,
            category,
        )
        .await;

        let view = GalleryView::new(Arc::clone(&controller), owner);
        let view_id = Uuid::now_v7();

        if self.view_map.insert_async(view_id, view).await.is_err() {
            return Err(code_err(
                CodeError::SESSION_ID_ALREADY_EXISTS,
                format!("Gallery view {view_id} already exists"),
            ));
        }

        info!(view_id = %view_id, owner = ?owner, views = self.view_map.len(), "Gallery view opened");
        Ok((view_id, controller))
    }

    /// Enforces the view limits before a new view is opened.
    ///
    /// A signed-in owner at the limit is refused. Signed-out visitors share one pool whose
    /// least recently seen view makes way for the new one.
    async fn make_room_for(&self, owner: Option<Uuid>) -> HandlerResponse<()> {
        let mut owned = 0usize;
        let mut idlest: Option<(Uuid, DateTime<Utc>)> = None;
        self.view_map
            .iter_async(|view_id, view| {
                if view.is_owned_by(owner) {
                    owned += 1;
                    if idlest.is_none_or(|(_, seen)| view.last_seen < seen) {
                        idlest = Some((*view_id, view.last_seen));
                    }
                }
                true
            })
            .await;

        match owner {
            Some(user_id) if owned >= self.gallery_config.max_views_per_owner => {
                return Err(code_err(
                    CodeError::TOO_MANY_VIEWS,
                    format!("user_id={user_id} already has {owned} views open"),
                ));
            }
            None if owned >= self.gallery_config.max_anonymous_views => {
                if let Some((view_id, last_seen)) = idlest
                    && self.view_map.remove_async(&view_id).await.is_some()
                {
                    debug!(view_id = %view_id, %last_seen, "Evicted idlest anonymous gallery view");
                }
            }
            _ => {}
        }

        if self.view_map.len() >= self.gallery_config.max_views {
            return Err(code_err(
                CodeError::TOO_MANY_VIEWS,
                format!("{} views open server-wide", self.view_map.len()),
            ));
        }
        Ok(())
    }

    /// Looks up a view owned by `requester` and marks it as seen.
    ///
    /// Views owned by someone else are reported as missing.
    pub async fn get_view(
        &self,
        view_id: Uuid,
        requester: Option<Uuid>,
    ) -> HandlerResponse<Arc<GalleryController>> {
        self.view_map
            .update_async(&view_id, |_, view| {
                if !view.is_owned_by(requester) {
                    return None;
                }
                view.last_seen = Utc::now();
                Some(Arc::clone(&view.controller))
            })
            .await
            .flatten()
            .ok_or_else(|| code_err(CodeError::VIEW_NOT_FOUND, format!("view_id={view_id}")))
    }

    pub async fn close_view(&self, view_id: Uuid, requester: Option<Uuid>) -> HandlerResponse<()> {
        match self
            .view_map
            .remove_if_async(&view_id, |view| view.is_owned_by(requester))
            .await
        {
            Some(_) => {
                info!(view_id = %view_id, views = self.view_map.len(), "Gallery view closed");
                Ok(())
            }
            None => Err(code_err(
                CodeError::VIEW_NOT_FOUND,
                format!("view_id={view_id}"),
            )),
        }
    }

    pub fn get_view_count(&self) -> usize {
        self.view_map.len()
    }

    /// Drops views that have not been touched for the configured idle period.
    pub async fn purge_idle_views(&self) -> (usize, usize) {
        let cutoff = Utc::now() - chrono::Duration::seconds(self.gallery_config.view_idle_secs);
        let (mut pruned, mut remaining): (usize, usize) = (0, 0);

        self.view_map
            .iter_mut_async(|entry| {
                if entry.is_idle(cutoff) {
                    pruned += 1;
                    let _ = entry.consume();
                } else {
                    remaining += 1;
                }
                true
            })
            .await;

        (pruned, remaining)
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn page_size(&self) -> usize {
        self.gallery_config.page_size
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    pub fn get_app_name_version(&self) -> String {
        self.app_name_version.clone()
    }

    pub fn get_uptime(&self) -> tokio::time::Duration {
        self.server_start_time.elapsed()
    }

    pub fn get_responses_handled(&self) -> u64 {
        self.responses_handled
            .load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn add_responses_handled(&self) {
        self.responses_handled
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        domain::auth::role::RoleType,
        gateway::memory::{InMemoryBlobStore, InMemoryDocumentStore},
    };

    use super::*;

    async fn state() -> (ServerState, User) {
        state_with(GalleryConfig::default()).await
    }

    async fn state_with(gallery_config: GalleryConfig) -> (ServerState, User) {
        let documents = Arc::new(InMemoryDocumentStore::new());
        let user = User {
            user_id: Uuid::now_v7(),
            user_email: "owner@example.com".to_string(),
            user_password_hash: String::new(),
            role: RoleType::Admin,
        };
        documents.insert_user(user.clone()).await;

        let gateway = Gateway::from_parts(
            documents,
            Arc::new(InMemoryBlobStore::new("https://cdn.test")),
        );
        let state = ServerState::builder()
            .app_name_version("folio-gallery test".to_string())
            .server_start_time(tokio::time::Instant::now())
            .gateway(gateway)
            .gallery_config(gallery_config)
            .build()
            .unwrap();
        (state, user)
    }

    #[tokio::test]
    async fn views_are_private_to_their_owner() {
        let (state, user) = state().await;
        let (view_id, _) = state.open_view(Some(user.user_id), None).await.unwrap();

        assert!(state.get_view(view_id, Some(user.user_id)).await.is_ok());
        let err = state.get_view(view_id, None).await.err().unwrap();
        assert_eq!(err.error_code, CodeError::VIEW_NOT_FOUND.error_code);
        assert!(state.close_view(view_id, None).await.is_err());

        state.close_view(view_id, Some(user.user_id)).await.unwrap();
        assert_eq!(state.get_view_count(), 0);
    }

    #[tokio::test]
    async fn idle_views_are_purged() {
        let (state, _) = state().await;
        let (stale, _) = state.open_view(None, None).await.unwrap();
        let (fresh, _) = state.open_view(None, None).await.unwrap();

        state
            .view_map
            .update_async(&stale, |_, view| {
                view.last_seen = Utc::now() - chrono::Duration::hours(2);
            })
            .await;

        assert_eq!(state.purge_idle_views().await, (1, 1));
        assert!(state.get_view(fresh, None).await.is_ok());
        assert!(state.get_view(stale, None).await.is_err());
    }

    #[tokio::test]
    async fn signed_in_owner_is_limited() {
        let (state, user) = state_with(GalleryConfig {
            max_views_per_owner: 2,
            ..GalleryConfig::default()
        })
        .await;

        state.open_view(Some(user.user_id), None).await.unwrap();
        state.open_view(Some(user.user_id), None).await.unwrap();
        let err = state.open_view(Some(user.user_id), None).await.err().unwrap();
        assert_eq!(err.error_code, CodeError::TOO_MANY_VIEWS.error_code);

        // other visitors are unaffected
        assert!(state.open_view(None, None).await.is_ok());
        assert_eq!(state.get_view_count(), 3);
    }

    #[tokio::test]
    async fn anonymous_pool_evicts_the_idlest_view() {
        let (state, _) = state_with(GalleryConfig {
            max_anonymous_views: 2,
            ..GalleryConfig::default()
        })
        .await;

        let (oldest, _) = state.open_view(None, None).await.unwrap();
        let (recent, _) = state.open_view(None, None).await.unwrap();
        state
            .view_map
            .update_async(&oldest, |_, view| {
                view.last_seen = Utc::now() - chrono::Duration::minutes(5);
            })
            .await;

        let (newest, _) = state.open_view(None, None).await.unwrap();
        assert_eq!(state.get_view_count(), 2);
        assert!(state.get_view(oldest, None).await.is_err());
        assert!(state.get_view(recent, None).await.is_ok());
        assert!(state.get_view(newest, None).await.is_ok());
    }

    #[tokio::test]
    async fn server_wide_view_limit_is_enforced() {
        let (state, user) = state_with(GalleryConfig {
            max_views: 1,
            ..GalleryConfig::default()
        })
        .await;

        state.open_view(None, None).await.unwrap();
        let err = state.open_view(Some(user.user_id), None).await.err().unwrap();
        assert_eq!(err.error_code, CodeError::TOO_MANY_VIEWS.error_code);
    }

    #[tokio::test]
    async fn sessions_round_trip() {
        let (state, user) = state().await;
        let session_id = state.new_session(&user, None).await.unwrap();

        let session = state.get_session(&session_id).await.unwrap();
        assert_eq!(session.get_user_id(), user.user_id);
        assert!(session.is_valid());

        let expired = state
            .new_session(&user, Some(chrono::Duration::seconds(-1)))
            .await
            .unwrap();
        assert_eq!(state.purge_expired_sessions().await, (1, 1));
        assert!(state.get_session(&expired).await.is_err());

        assert_eq!(state.remove_session(session_id).await.unwrap().1, 0);
    }
}
