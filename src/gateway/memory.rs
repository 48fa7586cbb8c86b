use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    auth::user::User,
    gallery::{
        image_record::{ImageRecord, ImageRecordPatch, NewImageRecord},
        site_settings::{SiteSettings, SiteSettingsPatch},
    },
};

use super::{BlobStore, DocumentStore, ImageQuery, ProgressFn, UploadProgress};

const UPLOAD_PROGRESS_CHUNK: usize = 64 * 1024;

/// Document store kept entirely in process memory.
///
/// Backs `GATEWAY_BACKEND=memory` for local work and drives the test suite, which is why it
/// can be told to fail reads or individual writes and counts every call it receives.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    images: RwLock<HashMap<Uuid, ImageRecord>>,
    settings: RwLock<SiteSettings>,
    users: RwLock<HashMap<Uuid, User>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    failing_ids: RwLock<HashSet<Uuid>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    closed: AtomicBool,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record as-is, bypassing id and timestamp assignment.
    pub async fn insert_image(&self, record: ImageRecord) {
        self.images.write().await.insert(record.id, record);
    }

    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.user_id, user);
    }

    pub async fn image(&self, image_id: Uuid) -> Option<ImageRecord> {
        self.images.read().await.get(&image_id).cloned()
    }

    pub async fn image_count(&self) -> usize {
        self.images.read().await.len()
    }

    /// Blocks every image read and write until the guard is dropped.
    #[cfg(test)]
    pub async fn hold_images(&self) -> tokio::sync::RwLockWriteGuard<'_, HashMap<Uuid, ImageRecord>> {
        self.images.write().await
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every write touching `image_id` fail.
    pub async fn fail_writes_for(&self, image_id: Uuid) {
        self.failing_ids.write().await.insert(image_id);
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_open(&self) -> anyhow::Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Document store has been shut down"));
        }
        Ok(())
    }

    fn begin_read(&self) -> anyhow::Result<()> {
        self.check_open()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Injected read failure"));
        }
        Ok(())
    }

    async fn begin_write(&self, image_id: Option<Uuid>) -> anyhow::Result<()> {
        self.check_open()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Injected write failure"));
        }
        if let Some(image_id) = image_id
            && self.failing_ids.read().await.contains(&image_id)
        {
            return Err(anyhow::anyhow!("Injected write failure for image {image_id}"));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn query_images(&self, query: &ImageQuery) -> anyhow::Result<Vec<ImageRecord>> {
        self.begin_read()?;

        let images = self.images.read().await;
        let mut matching: Vec<ImageRecord> = images
            .values()
            .filter(|record| match &query.label {
                Some(label) => record.has_label(label),
                None => true,
            })
            .filter(|record| match &query.start_after {
                Some(cursor) => (record.created_at, record.id) < (cursor.created_at, cursor.id),
                None => true,
            })
            .cloned()
            .collect();
        drop(images);

        matching.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        matching.truncate(query.limit);

        Ok(matching)
    }

    async fn get_image(&self, image_id: Uuid) -> anyhow::Result<Option<ImageRecord>> {
        self.begin_read()?;
        Ok(self.images.read().await.get(&image_id).cloned())
    }

    async fn create_image(&self, new_image: NewImageRecord) -> anyhow::Result<ImageRecord> {
        self.begin_write(None).await?;

        let record = ImageRecord {
            id: Uuid::now_v7(),
            url: new_image.url,
            file_name: new_image.file_name,
            description: new_image.description,
            labels: new_image.labels,
            created_at: Utc::now().trunc_subsecs(6),
            position: new_image.position,
        };
        self.images.write().await.insert(record.id, record.clone());

        Ok(record)
    }

    async fn update_image(
        &self,
        image_id: Uuid,
        patch: ImageRecordPatch,
    ) -> anyhow::Result<bool> {
        self.begin_write(Some(image_id)).await?;

        match self.images.write().await.get_mut(&image_id) {
            Some(record) => {
                patch.apply_to(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_image(&self, image_id: Uuid) -> anyhow::Result<bool> {
        self.begin_write(Some(image_id)).await?;
        Ok(self.images.write().await.remove(&image_id).is_some())
    }

    async fn get_site_settings(&self) -> anyhow::Result<SiteSettings> {
        self.begin_read()?;
        Ok(self.settings.read().await.clone())
    }

    async fn update_site_settings(
        &self,
        patch: SiteSettingsPatch,
    ) -> anyhow::Result<SiteSettings> {
        self.begin_write(None).await?;

        let mut settings = self.settings.write().await;
        patch.apply_to(&mut settings, Utc::now());
        Ok(settings.clone())
    }

    async fn get_user(&self, user_id: Uuid) -> anyhow::Result<Option<User>> {
        self.begin_read()?;
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, user_email: &str) -> anyhow::Result<Option<User>> {
        self.begin_read()?;
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.user_email == user_email)
            .cloned())
    }

    async fn shutdown(&self) -> anyhow::Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Blob store kept in process memory; URLs are `{base_url}/{key}`.
pub struct InMemoryBlobStore {
    base_url: String,
    blobs: RwLock<HashMap<String, (String, Vec<u8>)>>,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl InMemoryBlobStore {
    pub fn new(base_url: &str) -> Self {
        InMemoryBlobStore {
            base_url: base_url.trim_end_matches('/').to_string(),
            blobs: RwLock::new(HashMap::new()),
            fail_uploads: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub async fn contains_url(&self, url: &str) -> bool {
        match self.key_for(url) {
            Some(key) => self.blobs.read().await.contains_key(key),
            None => false,
        }
    }

    pub async fn blob_count(&self) -> usize {
        self.blobs.read().await.len()
    }

    fn key_for<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(self.base_url.as_str())
            .map(|rest| rest.trim_start_matches('/'))
            .filter(|key| !key.is_empty())
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        progress: &ProgressFn<'_>,
    ) -> anyhow::Result<String> {
        let total = bytes.len();
        progress(UploadProgress::running(0, total));

        if self.fail_uploads.load(Ordering::SeqCst) {
            progress(UploadProgress::error(0));
            return Err(anyhow::anyhow!("Injected upload failure for {key}"));
        }

        let mut sent = 0usize;
        for chunk in bytes.chunks(UPLOAD_PROGRESS_CHUNK) {
            sent += chunk.len();
            progress(UploadProgress::running(sent, total));
        }

        self.blobs
            .write()
            .await
            .insert(key.to_string(), (content_type.to_string(), bytes));
        progress(UploadProgress::success());

        Ok(self.resolve_url(key))
    }

    async fn delete(&self, url: &str) -> anyhow::Result<bool> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Injected delete failure for {url}"));
        }
        let Some(key) = self.key_for(url) else {
            return Ok(false);
        };
        Ok(self.blobs.write().await.remove(key).is_some())
    }

    fn resolve_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }
}
