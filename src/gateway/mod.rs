//! Seam between the gallery and the managed backend that stores its documents and files.
//!
//! Everything behind these traits is somebody else's system. The gallery only relies on
//! the query, point-operation and blob semantics spelled out on each method.

pub mod memory;
pub mod postgres;
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use serde_derive::Serialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{
        auth::{role::RoleType, user::User},
        gallery::{
            image_record::{ImageRecord, ImageRecordPatch, NewImageRecord},
            page_cursor::PageCursor,
            site_settings::{SiteSettings, SiteSettingsPatch},
        },
    },
    init::config::{GatewayBackend, GatewayConfig},
    util::{crypto::hash_pw::hash_pw, string::normalize_email::normalize_email},
};

use self::{
    memory::{InMemoryBlobStore, InMemoryDocumentStore},
    postgres::PgDocumentStore,
    s3::S3BlobStore,
};

/// An ordered query over the `images` collection.
#[derive(Debug, Clone, Default)]
pub struct ImageQuery {
    /// Only records whose labels contain this value.
    pub label: Option<String>,
    /// Start strictly after this record.
    pub start_after: Option<PageCursor>,
    pub limit: usize,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Ordered by `created_at` descending, ties broken by id descending.
    async fn query_images(&self, query: &ImageQuery) -> anyhow::Result<Vec<ImageRecord>>;

    async fn get_image(&self, image_id: Uuid) -> anyhow::Result<Option<ImageRecord>>;

    async fn create_image(&self, new_image: NewImageRecord) -> anyhow::Result<ImageRecord>;

    /// Returns `false` when the document does not exist.
    async fn update_image(&self, image_id: Uuid, patch: ImageRecordPatch)
    -> anyhow::Result<bool>;

    /// Returns `false` when the document does not exist.
    async fn delete_image(&self, image_id: Uuid) -> anyhow::Result<bool>;

    async fn get_site_settings(&self) -> anyhow::Result<SiteSettings>;

    async fn update_site_settings(&self, patch: SiteSettingsPatch)
    -> anyhow::Result<SiteSettings>;

    async fn get_user(&self, user_id: Uuid) -> anyhow::Result<Option<User>>;

    async fn find_user_by_email(&self, user_email: &str) -> anyhow::Result<Option<User>>;

    /// After this returns every other call fails.
    async fn shutdown(&self) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UploadState {
    Running,
    Error,
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct UploadProgress {
    /// 0 to 100.
    pub percent: u8,
    pub state: UploadState,
}

impl UploadProgress {
    pub fn running(sent: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100
        } else {
            ((sent.min(total) * 100) / total) as u8
        };
        UploadProgress {
            percent,
            state: UploadState::Running,
        }
    }

    pub fn success() -> Self {
        UploadProgress {
            percent: 100,
            state: UploadState::Success,
        }
    }

    pub fn error(percent: u8) -> Self {
        UploadProgress {
            percent,
            state: UploadState::Error,
        }
    }
}

pub type ProgressFn<'a> = dyn Fn(UploadProgress) + Send + Sync + 'a;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the retrievable URL.
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        progress: &ProgressFn<'_>,
    ) -> anyhow::Result<String>;

    /// Returns `false` when nothing was stored at `url`.
    async fn delete(&self, url: &str) -> anyhow::Result<bool>;

    fn resolve_url(&self, key: &str) -> String;
}

/// Explicitly constructed handle to the backend, passed down to whoever needs it.
#[derive(Clone)]
pub struct Gateway {
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
}

impl Gateway {
    pub fn from_parts(documents: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Gateway { documents, blobs }
    }

    pub async fn connect(config: &GatewayConfig) -> anyhow::Result<Self> {
        let gateway = match config.backend {
            GatewayBackend::Memory => {
                info!("Using in-memory gallery gateway; nothing will be persisted");
                let documents = InMemoryDocumentStore::new();
                if let Some(admin) = &config.bootstrap_admin {
                    documents
                        .insert_user(User {
                            user_id: Uuid::now_v7(),
                            user_email: normalize_email(&admin.email),
                            user_password_hash: hash_pw(admin.password.clone()).await?,
                            role: RoleType::Admin,
                        })
                        .await;
                    info!(user_email = %admin.email, "Seeded in-memory admin account");
                }
                Gateway::from_parts(
                    Arc::new(documents),
                    Arc::new(InMemoryBlobStore::new(&config.public_base_url)),
                )
            }
            GatewayBackend::Remote => {
                let db = config
                    .db
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("Remote gateway requires DB configuration"))?;
                let s3 = config
                    .s3
                    .as_ref()
                    .ok_or_else(|| anyhow::anyhow!("Remote gateway requires S3 configuration"))?;

                let documents = PgDocumentStore::connect(db).await?;
                let blobs = S3BlobStore::connect(s3).await;
                Gateway::from_parts(Arc::new(documents), Arc::new(blobs))
            }
        };

        Ok(gateway)
    }

    pub fn documents(&self) -> &Arc<dyn DocumentStore> {
        &self.documents
    }

    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.documents.shutdown().await?;
        info!("Gallery gateway shut down");
        Ok(())
    }
}
