use std::collections::{BTreeSet, HashSet};

use serde_derive::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::gallery::{
    image_record::{ImageRecord, ImageRecordPatch},
    page_cursor::PageCursor,
};

use super::{
    pagination::Page,
    selection::{SelectionKind, SelectionMode},
};

/// Parameters of one in-flight fetch, stamped with the generation it belongs to.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub generation: u64,
    pub cursor: Option<PageCursor>,
    pub category: Option<String>,
}

/// What the presentation layer renders.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GalleryViewState {
    pub records: Vec<ImageRecord>,
    pub category: Option<String>,
    /// Labels seen on loaded pages only; grows as more pages load.
    pub categories: Vec<String>,
    pub has_more: bool,
    pub selection_mode: SelectionKind,
    pub selected_ids: Vec<Uuid>,
    pub editing_id: Option<Uuid>,
    pub loading: bool,
    pub error: Option<String>,
    pub can_edit: bool,
}

/// The loaded prefix of the remote collection plus pagination and admin UI state.
#[derive(Debug, Default)]
pub struct ImageRecordCache {
    records: Vec<ImageRecord>,
    cursor: Option<PageCursor>,
    has_more: bool,
    category: Option<String>,
    categories: BTreeSet<String>,
    generation: u64,
    loading: bool,
    last_error: Option<String>,
    selection: SelectionMode,
    editing: Option<Uuid>,
}

impl ImageRecordCache {
    pub fn new(category: Option<String>) -> Self {
        ImageRecordCache {
            category,
            has_more: true,
            ..Default::default()
        }
    }

    /// Drops every loaded record and cursor and starts a new generation.
    ///
    /// Accumulated categories survive so the filter chips stay usable while filtered.
    pub fn reset(&mut self, category: Option<String>) -> FetchTicket {
        self.generation += 1;
        self.records.clear();
        self.cursor = None;
        self.has_more = true;
        self.category = category;
        self.loading = true;
        self.last_error = None;
        self.selection.clear();
        self.editing = None;

        FetchTicket {
            generation: self.generation,
            cursor: None,
            category: self.category.clone(),
        }
    }

    /// `None` while another fetch is in flight or once the end has been reached.
    pub fn begin_next_page(&mut self) -> Option<FetchTicket> {
        if self.loading || !self.has_more {
            return None;
        }
        self.loading = true;
        Some(FetchTicket {
            generation: self.generation,
            cursor: self.cursor,
            category: self.category.clone(),
        })
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Appends a fetched page. Returns `false` (and changes nothing) for a stale ticket.
    pub fn apply_page(&mut self, ticket: &FetchTicket, page: Page) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        // An upload may already have put a record from this page at the head.
        let known: HashSet<Uuid> = self.records.iter().map(|r| r.id).collect();
        for record in page.records {
            if known.contains(&record.id) {
                continue;
            }
            self.categories.extend(record.labels.iter().cloned());
            self.records.push(record);
        }

        if let Some(next_cursor) = page.next_cursor {
            self.cursor = Some(next_cursor);
        }
        self.has_more = page.has_more;
        self.loading = false;
        self.last_error = None;
        true
    }

    /// Records a failed fetch without touching loaded records or the cursor.
    pub fn fail_fetch(&mut self, ticket: &FetchTicket, error: String) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.loading = false;
        self.last_error = Some(error);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn contains(&self, image_id: Uuid) -> bool {
        self.records.iter().any(|r| r.id == image_id)
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Moves one record and renumbers every loaded record's position to its new index.
    ///
    /// Returns the `(id, position)` pairs that must be written back. Callers validate
    /// both indices first.
    pub fn move_record(&mut self, source_index: usize, destination_index: usize) -> Vec<(Uuid, i32)> {
        let moved = self.records.remove(source_index);
        self.records.insert(destination_index, moved);

        self.records
            .iter_mut()
            .enumerate()
            .map(|(index, record)| {
                record.position = Some(index as i32);
                (record.id, index as i32)
            })
            .collect()
    }

    pub fn patch_record(&mut self, image_id: Uuid, patch: &ImageRecordPatch) {
        if let Some(record) = self.records.iter_mut().find(|r| r.id == image_id) {
            patch.apply_to(record);
            self.categories.extend(record.labels.iter().cloned());
        }
    }

    pub fn remove_records(&mut self, image_ids: &[Uuid]) {
        self.records.retain(|r| !image_ids.contains(&r.id));
        self.selection.forget(image_ids);
        if self.editing.is_some_and(|id| image_ids.contains(&id)) {
            self.editing = None;
        }
    }

    /// Puts a freshly created record at the head when it belongs to the active filter.
    pub fn insert_uploaded(&mut self, record: ImageRecord) -> bool {
        let visible = match &self.category {
            Some(category) => record.has_label(category),
            None => true,
        };
        if !visible || self.contains(record.id) {
            return false;
        }
        self.categories.extend(record.labels.iter().cloned());
        self.records.insert(0, record);
        true
    }

    pub fn selection(&self) -> &SelectionMode {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionMode {
        &mut self.selection
    }

    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    pub fn set_editing(&mut self, image_id: Option<Uuid>) {
        self.editing = image_id;
    }

    pub fn snapshot(&self, can_edit: bool) -> GalleryViewState {
        GalleryViewState {
            records: self.records.clone(),
            category: self.category.clone(),
            categories: self.categories.iter().cloned().collect(),
            has_more: self.has_more,
            selection_mode: self.selection.kind(),
            selected_ids: self.selection.selected(),
            editing_id: self.editing,
            loading: self.loading,
            error: self.last_error.clone(),
            can_edit,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn record(n: i64, labels: &[&str]) -> ImageRecord {
        ImageRecord {
            id: Uuid::new_v4(),
            url: format!("https://cdn.test/{n}.jpg"),
            file_name: format!("{n}.jpg"),
            description: String::new(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap() - Duration::hours(n),
            position: None,
        }
    }

    fn page(records: Vec<ImageRecord>, page_size: usize) -> Page {
        Page {
            next_cursor: records.last().map(ImageRecord::cursor),
            has_more: records.len() == page_size,
            records,
        }
    }

    #[test]
    fn stale_pages_are_discarded() {
        let mut cache = ImageRecordCache::new(None);
        let old = cache.reset(None);
        let current = cache.reset(Some("film".to_string()));

        assert!(!cache.apply_page(&old, page(vec![record(0, &[])], 2)));
        assert_eq!(cache.len(), 0);

        assert!(cache.apply_page(&current, page(vec![record(1, &["film"])], 2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_fetch_keeps_loaded_records_and_cursor() {
        let mut cache = ImageRecordCache::new(None);
        let first = cache.reset(None);
        cache.apply_page(&first, page(vec![record(0, &[]), record(1, &[])], 2));

        let next = cache.begin_next_page().unwrap();
        let cursor_before = next.cursor;
        assert!(cache.fail_fetch(&next, "boom".to_string()));

        assert_eq!(cache.len(), 2);
        let snapshot = cache.snapshot(false);
        assert_eq!(snapshot.error.as_deref(), Some("boom"));
        assert!(!snapshot.loading);

        let retry = cache.begin_next_page().unwrap();
        assert_eq!(retry.cursor, cursor_before);
    }

    #[test]
    fn no_next_page_while_loading_or_exhausted() {
        let mut cache = ImageRecordCache::new(None);
        let first = cache.reset(None);
        assert!(cache.begin_next_page().is_none());

        cache.apply_page(&first, page(vec![record(0, &[])], 2));
        assert!(cache.begin_next_page().is_none());
    }

    #[test]
    fn categories_accumulate_from_loaded_pages_only() {
        let mut cache = ImageRecordCache::new(None);
        let first = cache.reset(None);
        cache.apply_page(&first, page(vec![record(0, &["street", "night"])], 1));
        let names: Vec<&String> = cache.categories.iter().collect();
        assert_eq!(names, vec!["night", "street"]);

        let next = cache.begin_next_page().unwrap();
        cache.apply_page(&next, page(vec![record(1, &["portrait", "street"])], 1));
        assert_eq!(cache.categories.len(), 3);
    }

    #[test]
    fn move_record_renumbers_everything() {
        let mut cache = ImageRecordCache::new(None);
        let ticket = cache.reset(None);
        let records: Vec<ImageRecord> = (0..4).map(|n| record(n, &[])).collect();
        let moved_id = records[3].id;
        cache.apply_page(&ticket, page(records, 4));

        let writes = cache.move_record(3, 0);
        assert_eq!(writes.len(), 4);
        assert_eq!(cache.records[0].id, moved_id);
        for (index, record) in cache.records.iter().enumerate() {
            assert_eq!(record.position, Some(index as i32));
        }
    }

    #[test]
    fn uploaded_record_respects_active_filter() {
        let mut cache = ImageRecordCache::new(Some("film".to_string()));
        cache.reset(Some("film".to_string()));

        assert!(!cache.insert_uploaded(record(0, &["digital"])));
        assert!(cache.insert_uploaded(record(1, &["film"])));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn page_skips_records_already_inserted_by_upload() {
        let mut cache = ImageRecordCache::new(None);
        let ticket = cache.reset(None);
        let uploaded = record(0, &[]);
        cache.insert_uploaded(uploaded.clone());

        cache.apply_page(&ticket, page(vec![uploaded, record(1, &[])], 2));
        assert_eq!(cache.len(), 2);
    }
}
