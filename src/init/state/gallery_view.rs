use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::gallery::controller::GalleryController;

/// An open gallery view: one controller per browser tab.
pub struct GalleryView {
    pub controller: Arc<GalleryController>,
    /// `None` for anonymous visitors.
    pub owner: Option<Uuid>,
    pub last_seen: DateTime<Utc>,
}

impl GalleryView {
    pub fn new(controller: Arc<GalleryController>, owner: Option<Uuid>) -> Self {
        GalleryView {
            controller,
            owner,
            last_seen: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, requester: Option<Uuid>) -> bool {
        self.owner == requester
    }

    pub fn is_idle(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_seen < cutoff
    }
}
