use serde_derive::Serialize;
use tracing::{debug, error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::gallery::{
        image_record::{ImageRecord, ImageRecordPatch, NewImageRecord},
        site_settings::{SiteSettings, SiteSettingsPatch},
    },
    errors::code_error::{CodeError, HandlerResponse, code_err},
    gateway::ProgressFn,
    util::string::{blob_key::image_blob_key, parse_labels::parse_labels},
};

use super::controller::GalleryController;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FailedDeletion {
    pub image_id: Uuid,
    pub error: String,
}

/// Outcome of a delete request, one bucket per id.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct DeleteReport {
    pub deleted: Vec<Uuid>,
    /// Already gone before we got to it. Not a failure.
    pub missing: Vec<Uuid>,
    pub failed: Vec<FailedDeletion>,
}

impl DeleteReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A file handed over by the presentation layer.
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub description: String,
    /// Raw comma-separated labels.
    pub labels: Option<String>,
}

enum DeleteOutcome {
    Deleted,
    Missing,
}

impl GalleryController {
    /// Partial metadata update. Labels arrive as the raw comma-separated input.
    ///
    /// Local state only changes after the backend accepted the write.
    pub async fn update_metadata(
        &self,
        image_id: Uuid,
        description: Option<String>,
        labels: Option<String>,
    ) -> HandlerResponse<ImageRecordPatch> {
        self.require_editor("update metadata").await?;

        let patch = ImageRecordPatch {
            description,
            labels: labels.as_deref().map(parse_labels),
            position: None,
        };
        if patch.is_empty() {
            return Err(code_err(
                CodeError::INVALID_REQUEST,
                "Nothing to update; supply a description or labels",
            ));
        }

        match self
            .gateway
            .documents()
            .update_image(image_id, patch.clone())
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                return Err(code_err(
                    CodeError::IMAGE_NOT_FOUND,
                    format!("Image {image_id} no longer exists"),
                ));
            }
            Err(e) => return Err(code_err(CodeError::GATEWAY_WRITE_ERROR, e)),
        }

        let mut cache = self.cache.lock().await;
        cache.patch_record(image_id, &patch);
        if cache.editing() == Some(image_id) {
            cache.set_editing(None);
        }

        info!(%image_id, "Image metadata updated");
        Ok(patch)
    }

    pub async fn delete_one(&self, image_id: Uuid) -> HandlerResponse<DeleteReport> {
        self.delete_many(&[image_id]).await
    }

    /// Deletes each record's asset and then its document, continuing past failures.
    ///
    /// Deleted and already-missing records leave the local list. Records whose deletion
    /// failed stay visible and the whole call is reported as an error.
    pub async fn delete_many(&self, image_ids: &[Uuid]) -> HandlerResponse<DeleteReport> {
        self.require_editor("delete").await?;

        let mut report = DeleteReport::default();
        for &image_id in image_ids {
            match self.delete_remote(image_id).await {
                Ok(DeleteOutcome::Deleted) => report.deleted.push(image_id),
                Ok(DeleteOutcome::Missing) => {
                    debug!(%image_id, "Image already gone; skipping");
                    report.missing.push(image_id);
                }
                Err(e) => {
                    error!(%image_id, error = %e, "Failed to delete image");
                    report.failed.push(FailedDeletion {
                        image_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        let removed: Vec<Uuid> = report
            .deleted
            .iter()
            .chain(report.missing.iter())
            .copied()
            .collect();
        self.cache.lock().await.remove_records(&removed);

        if !report.is_success() {
            let failed_ids: Vec<String> = report
                .failed
                .iter()
                .map(|f| format!("{}: {}", f.image_id, f.error))
                .collect();
            return Err(code_err(
                CodeError::IMAGE_DELETION_ERROR,
                format!(
                    "{} of {} deletions failed ({})",
                    report.failed.len(),
                    image_ids.len(),
                    failed_ids.join("; ")
                ),
            ));
        }

        info!(
            deleted = report.deleted.len(),
            missing = report.missing.len(),
            "Images deleted"
        );
        Ok(report)
    }

    /// Bulk-deletes the current selection. On success selection mode ends; on failure
    /// only the records that could not be deleted remain selected.
    pub async fn delete_selected(&self) -> HandlerResponse<DeleteReport> {
        let selected = self.cache.lock().await.selection().selected();
        if selected.is_empty() {
            return Err(code_err(CodeError::INVALID_REQUEST, "No images are selected"));
        }

        let report = self.delete_many(&selected).await?;
        self.cache.lock().await.selection_mut().clear();
        Ok(report)
    }

    async fn delete_remote(&self, image_id: Uuid) -> anyhow::Result<DeleteOutcome> {
        let documents = self.gateway.documents();

        let Some(record) = documents.get_image(image_id).await? else {
            return Ok(DeleteOutcome::Missing);
        };

        if !self.gateway.blobs().delete(&record.url).await? {
            warn!(%image_id, url = %record.url, "Asset was already gone from blob storage");
        }

        if documents.delete_image(image_id).await? {
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::Missing)
        }
    }

    /// Uploads the asset, then creates its document. A document that cannot be created
    /// takes its freshly uploaded asset with it.
    pub async fn upload(
        &self,
        upload: ImageUpload,
        progress: &ProgressFn<'_>,
    ) -> HandlerResponse<ImageRecord> {
        self.require_editor("upload").await?;

        if upload.bytes.is_empty() {
            return Err(code_err(
                CodeError::FILE_UPLOAD_ERROR,
                format!("{} is empty", upload.file_name),
            ));
        }

        let size_bytes = upload.bytes.len();
        let key = image_blob_key(Uuid::new_v4(), &upload.file_name);
        let url = self
            .gateway
            .blobs()
            .upload(&key, upload.bytes, &upload.content_type, progress)
            .await
            .map_err(|e| code_err(CodeError::GATEWAY_WRITE_ERROR, e))?;

        let new_image = NewImageRecord {
            url: url.clone(),
            file_name: upload.file_name,
            description: upload.description,
            labels: upload.labels.as_deref().map(parse_labels).unwrap_or_default(),
            position: None,
        };

        let record = match self.gateway.documents().create_image(new_image).await {
            Ok(record) => record,
            Err(e) => {
                if let Err(cleanup_err) = self.gateway.blobs().delete(&url).await {
                    warn!(url = %url, error = %cleanup_err, "Could not remove orphaned upload");
                }
                return Err(code_err(CodeError::GATEWAY_WRITE_ERROR, e));
            }
        };

        let shown = self.cache.lock().await.insert_uploaded(record.clone());
        info!(image_id = %record.id, size_bytes, shown, "Image uploaded");
        Ok(record)
    }

    pub async fn set_as_background(&self, url: &str) -> HandlerResponse<SiteSettings> {
        self.require_editor("set background").await?;

        let url = url.trim();
        if url.is_empty() {
            return Err(code_err(CodeError::INVALID_REQUEST, "Background URL is empty"));
        }

        let patch = SiteSettingsPatch {
            login_background_url: Some(url.to_string()),
            ..Default::default()
        };
        let settings = self
            .gateway
            .documents()
            .update_site_settings(patch)
            .await
            .map_err(|e| code_err(CodeError::GATEWAY_WRITE_ERROR, e))?;

        info!(url, "Login background updated");
        Ok(settings)
    }

    pub async fn update_about(
        &self,
        about_text: Option<String>,
        about_image: Option<String>,
    ) -> HandlerResponse<SiteSettings> {
        self.require_editor("update about").await?;

        if about_text.is_none() && about_image.is_none() {
            return Err(code_err(
                CodeError::INVALID_REQUEST,
                "Nothing to update; supply about text or an about image",
            ));
        }

        let patch = SiteSettingsPatch {
            about_text,
            about_image,
            ..Default::default()
        };
        self.gateway
            .documents()
            .update_site_settings(patch)
            .await
            .map_err(|e| code_err(CodeError::GATEWAY_WRITE_ERROR, e))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::gateway::{DocumentStore, UploadProgress, UploadState};

    use super::super::test_support::{Fixture, admin_fixture, visitor_fixture};
    use super::*;

    fn upload_of(file_name: &str, size: usize, labels: Option<&str>) -> ImageUpload {
        ImageUpload {
            file_name: file_name.to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![7u8; size],
            description: "New".to_string(),
            labels: labels.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn labels_are_split_and_trimmed_but_not_deduplicated() {
        let fixture = admin_fixture(2).await;
        let controller = fixture.open(12, None).await;
        let image_id = controller.snapshot().await.records[0].id;

        controller
            .update_metadata(image_id, None, Some("a, b ,  , b".to_string()))
            .await
            .unwrap();

        let stored = fixture.documents.image(image_id).await.unwrap();
        assert_eq!(stored.labels, vec!["a", "b", "b"]);
        let local = controller.snapshot().await.records[0].clone();
        assert_eq!(local.labels, vec!["a", "b", "b"]);
    }

    #[tokio::test]
    async fn failed_metadata_update_leaves_local_state() {
        let fixture = admin_fixture(1).await;
        let controller = fixture.open(12, None).await;
        let before = controller.snapshot().await.records;
        controller.begin_edit(before[0].id).await.unwrap();

        fixture.documents.set_fail_writes(true);
        let err = controller
            .update_metadata(before[0].id, Some("changed".to_string()), None)
            .await
            .unwrap_err();
        assert_eq!(err.error_code, CodeError::GATEWAY_WRITE_ERROR.error_code);

        let state = controller.snapshot().await;
        assert_eq!(state.records, before);
        assert_eq!(state.editing_id, Some(before[0].id));
    }

    #[tokio::test]
    async fn successful_update_ends_the_edit() {
        let fixture = admin_fixture(1).await;
        let controller = fixture.open(12, None).await;
        let image_id = controller.snapshot().await.records[0].id;
        controller.begin_edit(image_id).await.unwrap();

        controller
            .update_metadata(image_id, Some("Golden hour".to_string()), None)
            .await
            .unwrap();

        let state = controller.snapshot().await;
        assert_eq!(state.editing_id, None);
        assert_eq!(state.records[0].description, "Golden hour");
    }

    #[tokio::test]
    async fn deleting_a_vanished_record_succeeds() {
        let fixture = admin_fixture(2).await;
        let controller = fixture.open(12, None).await;
        let image_id = controller.snapshot().await.records[0].id;

        // removed behind the view's back
        fixture.documents.delete_image(image_id).await.unwrap();

        let report = controller.delete_one(image_id).await.unwrap();
        assert_eq!(report.missing, vec![image_id]);
        let state = controller.snapshot().await;
        assert!(state.records.iter().all(|r| r.id != image_id));
    }

    #[tokio::test]
    async fn delete_removes_asset_and_document() {
        let fixture = admin_fixture(2).await;
        let controller = fixture.open(12, None).await;
        let record = controller.snapshot().await.records[0].clone();

        let report = controller.delete_one(record.id).await.unwrap();
        assert_eq!(report.deleted, vec![record.id]);
        assert!(!fixture.blobs.contains_url(&record.url).await);
        assert!(fixture.documents.image(record.id).await.is_none());
        assert_eq!(controller.snapshot().await.records.len(), 1);
    }

    #[tokio::test]
    async fn failed_bulk_delete_is_reported_and_keeps_failures_selected() {
        let fixture = admin_fixture(3).await;
        let controller = fixture.open(12, None).await;
        let ids: Vec<Uuid> = controller
            .snapshot()
            .await
            .records
            .iter()
            .map(|r| r.id)
            .collect();

        controller.toggle_selection(ids[0]).await.unwrap();
        controller.toggle_selection(ids[1]).await.unwrap();
        fixture.documents.fail_writes_for(ids[1]).await;

        let err = controller.delete_selected().await.unwrap_err();
        assert_eq!(err.error_code, CodeError::IMAGE_DELETION_ERROR.error_code);

        let state = controller.snapshot().await;
        let remaining: Vec<Uuid> = state.records.iter().map(|r| r.id).collect();
        assert_eq!(remaining, vec![ids[1], ids[2]]);
        assert_eq!(state.selected_ids, vec![ids[1]]);
    }

    #[tokio::test]
    async fn successful_bulk_delete_ends_selection() {
        let fixture = admin_fixture(3).await;
        let controller = fixture.open(12, None).await;
        let ids: Vec<Uuid> = controller
            .snapshot()
            .await
            .records
            .iter()
            .map(|r| r.id)
            .collect();

        controller.toggle_selection(ids[0]).await.unwrap();
        controller.toggle_selection(ids[2]).await.unwrap();
        let report = controller.delete_selected().await.unwrap();
        assert_eq!(report.deleted.len(), 2);

        let state = controller.snapshot().await;
        assert_eq!(state.records.len(), 1);
        assert!(state.selected_ids.is_empty());
        assert_eq!(fixture.documents.image_count().await, 1);
    }

    #[tokio::test]
    async fn visitors_cannot_delete() {
        let fixture = visitor_fixture(1).await;
        let controller = fixture.open(12, None).await;
        let image_id = controller.snapshot().await.records[0].id;

        let err = controller.delete_one(image_id).await.unwrap_err();
        assert_eq!(err.error_code, CodeError::NOT_AUTHORIZED.error_code);
        assert_eq!(fixture.documents.image_count().await, 1);
    }

    #[tokio::test]
    async fn upload_reports_progress_and_prepends() {
        let fixture = admin_fixture(2).await;
        let controller = fixture.open(12, None).await;

        let seen: Arc<Mutex<Vec<UploadProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let record = controller
            .upload(
                upload_of("dunes.jpg", 200 * 1024, Some("desert, film")),
                &move |p| sink.lock().unwrap().push(p),
            )
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.first().map(|p| p.percent), Some(0));
        assert_eq!(seen.last().map(|p| p.state), Some(UploadState::Success));
        assert!(seen.windows(2).all(|w| w[0].percent <= w[1].percent));

        assert_eq!(record.labels, vec!["desert", "film"]);
        assert!(fixture.blobs.contains_url(&record.url).await);
        let state = controller.snapshot().await;
        assert_eq!(state.records[0].id, record.id);
        assert_eq!(state.records.len(), 3);
    }

    #[tokio::test]
    async fn upload_outside_filter_is_not_shown() {
        let fixture = admin_fixture(2).await;
        let controller = fixture.open(12, Some("even")).await;

        controller
            .upload(upload_of("x.jpg", 10, Some("odd")), &|_| {})
            .await
            .unwrap();

        assert_eq!(controller.snapshot().await.records.len(), 1);
        assert_eq!(fixture.documents.image_count().await, 3);
    }

    #[tokio::test]
    async fn failed_document_create_removes_uploaded_asset() {
        let fixture = admin_fixture(0).await;
        let controller = fixture.open(12, None).await;
        fixture.documents.set_fail_writes(true);

        let err = controller
            .upload(upload_of("x.jpg", 10, None), &|_| {})
            .await
            .unwrap_err();
        assert_eq!(err.error_code, CodeError::GATEWAY_WRITE_ERROR.error_code);
        assert_eq!(fixture.blobs.blob_count().await, 0);
        assert!(controller.snapshot().await.records.is_empty());
    }

    #[tokio::test]
    async fn progress_callback_may_borrow_caller_state() {
        let fixture = admin_fixture(0).await;
        let controller = fixture.open(12, None).await;

        let last: Mutex<Option<UploadProgress>> = Mutex::new(None);
        controller
            .upload(upload_of("x.jpg", 10, None), &|p| {
                *last.lock().unwrap() = Some(p);
            })
            .await
            .unwrap();

        let last = last.into_inner().unwrap();
        assert_eq!(last.map(|p| p.state), Some(UploadState::Success));
    }

    #[tokio::test]
    async fn failed_upload_reports_error_and_creates_nothing() {
        let fixture = admin_fixture(1).await;
        let controller = fixture.open(12, None).await;
        let before = controller.snapshot().await.records;
        fixture.blobs.set_fail_uploads(true);

        let seen: Arc<Mutex<Vec<UploadProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let err = controller
            .upload(upload_of("x.jpg", 10, None), &move |p| {
                sink.lock().unwrap().push(p)
            })
            .await
            .unwrap_err();
        assert_eq!(err.error_code, CodeError::GATEWAY_WRITE_ERROR.error_code);

        let last = seen.lock().unwrap().last().copied();
        assert_eq!(last.map(|p| p.state), Some(UploadState::Error));
        assert_eq!(fixture.documents.image_count().await, 1);
        assert_eq!(fixture.blobs.blob_count().await, 1);
        assert_eq!(controller.snapshot().await.records, before);
    }

    #[tokio::test]
    async fn failed_asset_delete_keeps_the_record() {
        let fixture = admin_fixture(2).await;
        let controller = fixture.open(12, None).await;
        let record = controller.snapshot().await.records[0].clone();
        fixture.blobs.set_fail_deletes(true);

        let err = controller.delete_one(record.id).await.unwrap_err();
        assert_eq!(err.error_code, CodeError::IMAGE_DELETION_ERROR.error_code);

        assert!(fixture.documents.image(record.id).await.is_some());
        assert!(fixture.blobs.contains_url(&record.url).await);
        let state = controller.snapshot().await;
        assert_eq!(state.records.len(), 2);
        assert_eq!(state.records[0].id, record.id);
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let fixture = Fixture::new(true).await;
        let controller = fixture.open(12, None).await;
        let err = controller
            .upload(upload_of("x.jpg", 0, None), &|_| {})
            .await
            .unwrap_err();
        assert_eq!(err.error_code, CodeError::FILE_UPLOAD_ERROR.error_code);
    }

    #[tokio::test]
    async fn set_as_background_writes_site_settings() {
        let fixture = admin_fixture(1).await;
        let controller = fixture.open(12, None).await;
        let url = controller.snapshot().await.records[0].url.clone();

        let settings = controller.set_as_background(&url).await.unwrap();
        assert_eq!(settings.login_background_url.as_deref(), Some(url.as_str()));
        assert!(settings.updated_at.is_some());

        let stored = fixture.documents.get_site_settings().await.unwrap();
        assert_eq!(stored.login_background_url.as_deref(), Some(url.as_str()));
    }

    #[tokio::test]
    async fn update_about_keeps_background() {
        let fixture = admin_fixture(1).await;
        let controller = fixture.open(12, None).await;
        controller
            .set_as_background("https://cdn.test/bg.jpg")
            .await
            .unwrap();

        let settings = controller
            .update_about(Some("Hi, I shoot film.".to_string()), None)
            .await
            .unwrap();
        assert_eq!(settings.about_text.as_deref(), Some("Hi, I shoot film."));
        assert_eq!(
            settings.login_background_url.as_deref(),
            Some("https://cdn.test/bg.jpg")
        );
    }
}
