use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    domain::{
        auth::{role::RoleType, user::User},
        gallery::image_record::ImageRecord,
    },
    gateway::{
        BlobStore, Gateway,
        memory::{InMemoryBlobStore, InMemoryDocumentStore},
    },
    util::auth::authorization_policy::{AuthorizationPolicy, RoleAuthorizationPolicy},
};

use super::controller::GalleryController;

pub struct Fixture {
    pub documents: Arc<InMemoryDocumentStore>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub gateway: Gateway,
    pub user_id: Uuid,
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

impl Fixture {
    pub async fn new(admin: bool) -> Self {
        let documents = Arc::new(InMemoryDocumentStore::new());
        let blobs = Arc::new(InMemoryBlobStore::new("https://cdn.test"));
        let gateway = Gateway::from_parts(documents.clone(), blobs.clone());

        let user_id = Uuid::now_v7();
        documents
            .insert_user(User {
                user_id,
                user_email: "owner@example.com".to_string(),
                user_password_hash: String::new(),
                role: if admin { RoleType::Admin } else { RoleType::User },
            })
            .await;

        Fixture {
            documents,
            blobs,
            gateway,
            user_id,
        }
    }

    /// Seeds record `n`; lower `n` is newer. Its asset is stored in the blob store too.
    pub async fn seed(&self, n: i64, labels: &[&str]) -> ImageRecord {
        let key = format!("images/seed-{n}.jpg");
        let url = self
            .blobs
            .upload(&key, vec![0u8; 16], "image/jpeg", &|_| {})
            .await
            .unwrap();

        let record = ImageRecord {
            id: Uuid::new_v4(),
            url,
            file_name: format!("seed-{n}.jpg"),
            description: format!("Photo {n}"),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            created_at: base_time() - Duration::hours(n),
            position: None,
        };
        self.documents.insert_image(record.clone()).await;
        record
    }

    pub fn policy(&self) -> Arc<dyn AuthorizationPolicy> {
        Arc::new(RoleAuthorizationPolicy::new(
            self.documents.clone(),
            Some(self.user_id),
        ))
    }

    pub async fn open(&self, page_size: usize, category: Option<&str>) -> Arc<GalleryController> {
        GalleryController::open(
            self.gateway.clone(),
            self.policy(),
            page_size,
            category.map(str::to_string),
        )
        .await
    }
}

async fn seeded_fixture(admin: bool, count: i64) -> Fixture {
    let fixture = Fixture::new(admin).await;
    for n in 0..count {
        let parity = if n % 2 == 0 { "even" } else { "odd" };
        fixture.seed(n, &[parity]).await;
    }
    fixture
}

pub async fn admin_fixture(count: i64) -> Fixture {
    seeded_fixture(true, count).await
}

pub async fn visitor_fixture(count: i64) -> Fixture {
    seeded_fixture(false, count).await
}

/// Waits for a fetch that was started by a request which has since gone away.
pub async fn wait_until_loaded(controller: &GalleryController) {
    for _ in 0..200 {
        if !controller.snapshot().await.loading {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!("gallery view never finished loading");
}
