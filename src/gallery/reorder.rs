use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    domain::gallery::image_record::ImageRecordPatch,
    errors::code_error::{CodeError, HandlerResponse, code_err},
};

use super::controller::GalleryController;

impl GalleryController {
    /// Moves the record at `source_index` to `destination_index` and renumbers every loaded
    /// record's `position`.
    ///
    /// The local order changes before anything is written. Positions are then written back
    /// concurrently, one point update per loaded record. If any write fails the view is
    /// reloaded from the backend instead of rolled back record by record. Write-back and
    /// reload run detached from the caller, so a dropped request still ends in one or the
    /// other.
    ///
    /// Only the loaded prefix is renumbered; records on pages not yet fetched keep whatever
    /// positions they had. Returns the number of position writes issued.
    pub async fn reorder(
        self: &Arc<Self>,
        source_index: usize,
        destination_index: Option<usize>,
    ) -> HandlerResponse<usize> {
        let Some(destination_index) = destination_index else {
            return Ok(0);
        };
        if destination_index == source_index {
            return Ok(0);
        }

        self.require_editor("reorder").await?;

        let writes = {
            let mut cache = self.cache.lock().await;
            let len = cache.len();
            if source_index >= len || destination_index >= len {
                return Err(code_err(
                    CodeError::INVALID_REORDER,
                    format!(
                        "source {source_index} / destination {destination_index} with {len} loaded"
                    ),
                ));
            }
            cache.move_record(source_index, destination_index)
        };

        let controller = Arc::clone(self);
        let write_back = tokio::spawn(async move {
            controller
                .write_back_positions(writes, source_index, destination_index)
                .await
        });
        match write_back.await {
            Ok(result) => result,
            Err(e) => Err(code_err(CodeError::REORDER_WRITE_BACK_ERROR, e)),
        }
    }

    async fn write_back_positions(
        self: Arc<Self>,
        writes: Vec<(Uuid, i32)>,
        source_index: usize,
        destination_index: usize,
    ) -> HandlerResponse<usize> {
        let total = writes.len();
        let mut join_set = JoinSet::new();
        for (image_id, position) in writes {
            let documents = Arc::clone(self.gateway.documents());
            join_set.spawn(async move {
                let result = documents
                    .update_image(image_id, ImageRecordPatch::position(position))
                    .await;
                (image_id, result)
            });
        }

        let mut failures: Vec<String> = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((_, Ok(true))) => {}
                Ok((image_id, Ok(false))) => {
                    failures.push(format!("{image_id}: document no longer exists"));
                }
                Ok((image_id, Err(e))) => failures.push(format!("{image_id}: {e}")),
                Err(e) => failures.push(format!("write-back task failed: {e}")),
            }
        }

        if failures.is_empty() {
            info!(
                source_index,
                destination_index,
                positions_written = total,
                "Gallery reorder saved"
            );
            return Ok(total);
        }

        warn!(
            failed = failures.len(),
            total,
            "Gallery reorder partially saved; reloading view"
        );

        let mut detail = format!(
            "{} of {} position writes failed ({})",
            failures.len(),
            total,
            failures.join("; ")
        );
        if let Err(e) = self.reload().await {
            detail.push_str(&format!("; reload failed: {}", e.error_message));
        }

        Err(code_err(CodeError::REORDER_WRITE_BACK_ERROR, detail))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::{sleep, timeout};

    use super::super::test_support::{admin_fixture, visitor_fixture};
    use super::*;

    #[tokio::test]
    async fn reorder_updates_locally_and_remotely() {
        let fixture = admin_fixture(4).await;
        let controller = fixture.open(12, None).await;
        let before: Vec<Uuid> = controller
            .snapshot()
            .await
            .records
            .iter()
            .map(|r| r.id)
            .collect();

        let written = controller.reorder(0, Some(2)).await.unwrap();
        assert_eq!(written, 4);

        let state = controller.snapshot().await;
        let after: Vec<Uuid> = state.records.iter().map(|r| r.id).collect();
        assert_eq!(after, vec![before[1], before[2], before[0], before[3]]);
        for (index, record) in state.records.iter().enumerate() {
            assert_eq!(record.position, Some(index as i32));
            let stored = fixture.documents.image(record.id).await.unwrap();
            assert_eq!(stored.position, Some(index as i32));
        }
    }

    #[tokio::test]
    async fn unchanged_or_missing_target_is_a_no_op() {
        let fixture = admin_fixture(3).await;
        let controller = fixture.open(12, None).await;
        let before = controller.snapshot().await.records;
        let writes = fixture.documents.write_count();

        assert_eq!(controller.reorder(1, Some(1)).await.unwrap(), 0);
        assert_eq!(controller.reorder(1, None).await.unwrap(), 0);

        assert_eq!(fixture.documents.write_count(), writes);
        assert_eq!(controller.snapshot().await.records, before);
    }

    #[tokio::test]
    async fn visitors_are_rejected_without_side_effects() {
        let fixture = visitor_fixture(3).await;
        let controller = fixture.open(12, None).await;
        let before = controller.snapshot().await.records;
        let writes = fixture.documents.write_count();

        let err = controller.reorder(0, Some(2)).await.unwrap_err();
        assert_eq!(err.error_code, CodeError::NOT_AUTHORIZED.error_code);

        assert_eq!(fixture.documents.write_count(), writes);
        assert_eq!(controller.snapshot().await.records, before);
    }

    #[tokio::test]
    async fn out_of_range_indices_are_rejected() {
        let fixture = admin_fixture(2).await;
        let controller = fixture.open(12, None).await;
        let err = controller.reorder(0, Some(5)).await.unwrap_err();
        assert_eq!(err.error_code, CodeError::INVALID_REORDER.error_code);
    }

    #[tokio::test]
    async fn failed_write_back_reloads_the_view() {
        let fixture = admin_fixture(3).await;
        let controller = fixture.open(12, None).await;
        let records = controller.snapshot().await.records;
        fixture.documents.fail_writes_for(records[1].id).await;

        let err = controller.reorder(0, Some(2)).await.unwrap_err();
        assert_eq!(err.error_code, CodeError::REORDER_WRITE_BACK_ERROR.error_code);

        // Reloaded from the backend: newest-first order again, not the optimistic one.
        let state = controller.snapshot().await;
        let reloaded: Vec<Uuid> = state.records.iter().map(|r| r.id).collect();
        let original: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        assert_eq!(reloaded, original);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn dropped_reorder_still_writes_back() {
        let fixture = admin_fixture(3).await;
        let controller = fixture.open(12, None).await;

        let held = fixture.documents.hold_images().await;
        let dropped = timeout(Duration::from_millis(50), controller.reorder(0, Some(2))).await;
        assert!(dropped.is_err());
        drop(held);

        let records = controller.snapshot().await.records;
        let mut in_sync = false;
        for _ in 0..200 {
            let mut matching = 0;
            for record in &records {
                let stored = fixture.documents.image(record.id).await.unwrap();
                if stored.position == record.position {
                    matching += 1;
                }
            }
            if matching == records.len() {
                in_sync = true;
                break;
            }
            sleep(Duration::from_millis(5)).await;
        }
        assert!(in_sync);
        for (index, record) in records.iter().enumerate() {
            assert_eq!(record.position, Some(index as i32));
        }
    }
}
