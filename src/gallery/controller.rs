use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    errors::code_error::{CodeError, HandlerResponse, code_err},
    gateway::Gateway,
    util::auth::authorization_policy::AuthorizationPolicy,
};

use super::{
    cache::{FetchTicket, GalleryViewState, ImageRecordCache},
    pagination::fetch_page,
};

/// Drives one gallery view session: paged fetch, filtering, reordering and per-record edits.
///
/// The cache lock is only ever held between awaits, never across a gateway call, so a
/// filter change can overtake a slow fetch. Results of the overtaken fetch are dropped.
/// Work that must finish once started (fetches, reorder write-back) runs on spawned tasks
/// holding their own `Arc`, which is why the view is always handled through one.
pub struct GalleryController {
    pub(super) gateway: Gateway,
    pub(super) policy: Arc<dyn AuthorizationPolicy>,
    pub(super) page_size: usize,
    pub(super) cache: Mutex<ImageRecordCache>,
}

impl GalleryController {
    fn new(
        gateway: Gateway,
        policy: Arc<dyn AuthorizationPolicy>,
        page_size: usize,
        category: Option<String>,
    ) -> Self {
        GalleryController {
            gateway,
            policy,
            page_size: page_size.max(1),
            cache: Mutex::new(ImageRecordCache::new(category)),
        }
    }

    /// Creates the view and loads its first page. A failed first load is left in the
    /// view's error state for the caller to retry.
    pub async fn open(
        gateway: Gateway,
        policy: Arc<dyn AuthorizationPolicy>,
        page_size: usize,
        category: Option<String>,
    ) -> Arc<Self> {
        let controller = Arc::new(GalleryController::new(gateway, policy, page_size, category));
        if let Err(e) = controller.reload().await {
            warn!(error = %e, "Initial gallery page could not be loaded");
        }
        controller
    }

    pub async fn snapshot(&self) -> GalleryViewState {
        let can_edit = match self.policy.can_edit().await {
            Ok(can_edit) => can_edit,
            Err(e) => {
                warn!(error = %e, "Could not resolve edit rights; hiding admin affordances");
                false
            }
        };
        self.cache.lock().await.snapshot(can_edit)
    }

    /// Fetches the page after the current cursor. Does nothing when a fetch is already in
    /// flight or the previous page came back short.
    pub async fn load_more(self: &Arc<Self>) -> HandlerResponse<()> {
        let ticket = self.cache.lock().await.begin_next_page();
        match ticket {
            Some(ticket) => self.run_fetch(ticket).await,
            None => {
                debug!("load_more skipped; fetch in flight or no more pages");
                Ok(())
            }
        }
    }

    /// Switches the category filter. Always a full reset followed by a first-page fetch.
    pub async fn set_filter(self: &Arc<Self>, category: Option<String>) -> HandlerResponse<()> {
        let category = category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        let ticket = self.cache.lock().await.reset(category);
        self.run_fetch(ticket).await
    }

    /// Discards local state and refetches the first page with the active filter.
    pub async fn reload(self: &Arc<Self>) -> HandlerResponse<()> {
        let ticket = {
            let mut cache = self.cache.lock().await;
            let category = cache.category().map(str::to_string);
            cache.reset(category)
        };
        self.run_fetch(ticket).await
    }

    /// Runs the fetch on a task of its own so that a dropped request cannot leave the view
    /// stuck in `loading`.
    async fn run_fetch(self: &Arc<Self>, ticket: FetchTicket) -> HandlerResponse<()> {
        let controller = Arc::clone(self);
        let task_ticket = ticket.clone();
        match tokio::spawn(async move { controller.apply_fetch(task_ticket).await }).await {
            Ok(result) => result,
            Err(e) => {
                self.cache
                    .lock()
                    .await
                    .fail_fetch(&ticket, format!("fetch task failed: {e}"));
                Err(code_err(CodeError::GATEWAY_READ_ERROR, e))
            }
        }
    }

    async fn apply_fetch(&self, ticket: FetchTicket) -> HandlerResponse<()> {
        let result = fetch_page(
            self.gateway.documents().as_ref(),
            self.page_size,
            ticket.cursor,
            ticket.category.as_deref(),
        )
        .await;

        let mut cache = self.cache.lock().await;
        match result {
            Ok(page) => {
                let fetched = page.records.len();
                let has_more = page.has_more;
                if cache.apply_page(&ticket, page) {
                    debug!(
                        fetched,
                        has_more,
                        loaded = cache.len(),
                        category = ?ticket.category,
                        "Gallery page loaded"
                    );
                } else {
                    debug!(generation = ticket.generation, "Discarded stale gallery page");
                }
                Ok(())
            }
            Err(e) => {
                if cache.fail_fetch(&ticket, e.to_string()) {
                    Err(code_err(CodeError::GATEWAY_READ_ERROR, e))
                } else {
                    debug!(error = %e, "Ignoring failure of a stale gallery fetch");
                    Ok(())
                }
            }
        }
    }

    /// Fails with `NOT_AUTHORIZED` unless the session may edit the gallery.
    pub(super) async fn require_editor(&self, action: &str) -> HandlerResponse<()> {
        match self.policy.can_edit().await {
            Ok(true) => Ok(()),
            Ok(false) => {
                info!(action, "Rejected gallery mutation from non-admin session");
                Err(code_err(
                    CodeError::NOT_AUTHORIZED,
                    format!("{action} requires the admin role"),
                ))
            }
            Err(e) => Err(code_err(CodeError::AUTHORIZATION_LOOKUP_ERROR, e)),
        }
    }

    pub async fn toggle_selection(&self, image_id: Uuid) -> HandlerResponse<()> {
        self.require_editor("select").await?;

        let mut cache = self.cache.lock().await;
        if !cache.contains(image_id) {
            return Err(code_err(
                CodeError::IMAGE_NOT_FOUND,
                format!("Image {image_id} is not loaded in this view"),
            ));
        }
        cache.selection_mut().toggle(image_id);
        Ok(())
    }

    pub async fn clear_selection(&self) {
        self.cache.lock().await.selection_mut().clear();
    }

    /// Starts inline editing of one record, replacing any edit already open.
    pub async fn begin_edit(&self, image_id: Uuid) -> HandlerResponse<()> {
        self.require_editor("edit").await?;

        let mut cache = self.cache.lock().await;
        if !cache.contains(image_id) {
            return Err(code_err(
                CodeError::IMAGE_NOT_FOUND,
                format!("Image {image_id} is not loaded in this view"),
            ));
        }
        cache.set_editing(Some(image_id));
        Ok(())
    }

    pub async fn cancel_edit(&self) {
        self.cache.lock().await.set_editing(None);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::super::test_support::{Fixture, admin_fixture, visitor_fixture, wait_until_loaded};
    use super::*;

    #[tokio::test]
    async fn open_loads_the_first_page() {
        let fixture = admin_fixture(5).await;
        let controller = fixture.open(2, None).await;

        let state = controller.snapshot().await;
        assert_eq!(state.records.len(), 2);
        assert!(state.has_more);
        assert!(!state.loading);
        assert!(state.can_edit);
    }

    #[tokio::test]
    async fn load_more_until_exhausted() {
        let fixture = admin_fixture(4).await;
        let controller = fixture.open(2, None).await;

        controller.load_more().await.unwrap();
        let state = controller.snapshot().await;
        assert_eq!(state.records.len(), 4);
        assert!(state.has_more);

        // exact multiple of the page size: one more, empty fetch ends pagination
        controller.load_more().await.unwrap();
        let state = controller.snapshot().await;
        assert_eq!(state.records.len(), 4);
        assert!(!state.has_more);

        let reads = fixture.documents.read_count();
        controller.load_more().await.unwrap();
        assert_eq!(fixture.documents.read_count(), reads);
    }

    #[tokio::test]
    async fn fetch_failure_preserves_loaded_records() {
        let fixture = admin_fixture(5).await;
        let controller = fixture.open(2, None).await;
        let before = controller.snapshot().await.records;

        fixture.documents.set_fail_reads(true);
        let err = controller.load_more().await.unwrap_err();
        assert_eq!(err.error_code, CodeError::GATEWAY_READ_ERROR.error_code);

        let state = controller.snapshot().await;
        assert_eq!(state.records, before);
        assert!(state.error.is_some());

        fixture.documents.set_fail_reads(false);
        controller.load_more().await.unwrap();
        let state = controller.snapshot().await;
        assert_eq!(state.records.len(), 4);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn filter_change_resets_instead_of_merging() {
        let fixture = admin_fixture(6).await;
        let controller = fixture.open(12, None).await;
        assert_eq!(controller.snapshot().await.records.len(), 6);

        controller
            .set_filter(Some("even".to_string()))
            .await
            .unwrap();
        let state = controller.snapshot().await;
        assert_eq!(state.category.as_deref(), Some("even"));
        assert_eq!(state.records.len(), 3);
        assert!(state.records.iter().all(|r| r.has_label("even")));

        controller.set_filter(Some("  ".to_string())).await.unwrap();
        let state = controller.snapshot().await;
        assert_eq!(state.category, None);
        assert_eq!(state.records.len(), 6);
    }

    #[tokio::test]
    async fn dropped_load_more_still_finishes_the_fetch() {
        let fixture = admin_fixture(5).await;
        let controller = fixture.open(2, None).await;

        let held = fixture.documents.hold_images().await;
        let dropped = timeout(Duration::from_millis(50), controller.load_more()).await;
        assert!(dropped.is_err());
        drop(held);

        wait_until_loaded(&controller).await;
        assert_eq!(controller.snapshot().await.records.len(), 4);

        controller.load_more().await.unwrap();
        let state = controller.snapshot().await;
        assert_eq!(state.records.len(), 5);
        assert!(!state.has_more);
    }

    #[tokio::test]
    async fn filter_change_overtakes_an_in_flight_page() {
        let fixture = admin_fixture(6).await;
        let controller = fixture.open(2, None).await;

        let held = fixture.documents.hold_images().await;
        let next_page = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.load_more().await }
        });
        while !controller.snapshot().await.loading {
            tokio::task::yield_now().await;
        }

        let filtered = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.set_filter(Some("even".to_string())).await }
        });
        while controller.snapshot().await.category.is_none() {
            tokio::task::yield_now().await;
        }
        drop(held);

        next_page.await.unwrap().unwrap();
        filtered.await.unwrap().unwrap();

        let state = controller.snapshot().await;
        assert_eq!(state.category.as_deref(), Some("even"));
        assert_eq!(state.records.len(), 2);
        assert!(state.records.iter().all(|r| r.has_label("even")));
        assert!(state.has_more);
    }

    #[tokio::test]
    async fn categories_only_reflect_loaded_pages() {
        let fixture = Fixture::new(true).await;
        fixture.seed(0, &["landscape"]).await;
        fixture.seed(1, &["street"]).await;
        fixture.seed(2, &["portrait"]).await;

        let controller = fixture.open(2, None).await;
        let state = controller.snapshot().await;
        assert_eq!(state.categories.len(), 2);
        assert!(!state.categories.contains(&"portrait".to_string()));

        controller.load_more().await.unwrap();
        assert_eq!(controller.snapshot().await.categories.len(), 3);
    }

    #[tokio::test]
    async fn visitors_cannot_select_or_edit() {
        let fixture = visitor_fixture(3).await;
        let controller = fixture.open(12, None).await;
        let image_id = controller.snapshot().await.records[0].id;

        let err = controller.toggle_selection(image_id).await.unwrap_err();
        assert_eq!(err.error_code, CodeError::NOT_AUTHORIZED.error_code);
        assert!(controller.begin_edit(image_id).await.is_err());

        let state = controller.snapshot().await;
        assert!(!state.can_edit);
        assert!(state.selected_ids.is_empty());
        assert_eq!(state.editing_id, None);
    }

    #[tokio::test]
    async fn only_one_record_is_edited_at_a_time() {
        let fixture = admin_fixture(3).await;
        let controller = fixture.open(12, None).await;
        let ids: Vec<Uuid> = controller
            .snapshot()
            .await
            .records
            .iter()
            .map(|r| r.id)
            .collect();

        controller.begin_edit(ids[0]).await.unwrap();
        controller.begin_edit(ids[1]).await.unwrap();
        assert_eq!(controller.snapshot().await.editing_id, Some(ids[1]));

        controller.cancel_edit().await;
        assert_eq!(controller.snapshot().await.editing_id, None);
    }

    #[tokio::test]
    async fn selecting_unloaded_records_is_rejected() {
        let fixture = admin_fixture(1).await;
        let controller = fixture.open(12, None).await;
        let err = controller.toggle_selection(Uuid::now_v7()).await.unwrap_err();
        assert_eq!(err.error_code, CodeError::IMAGE_NOT_FOUND.error_code);
    }
}
