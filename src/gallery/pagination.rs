use crate::{
    domain::gallery::{image_record::ImageRecord, page_cursor::PageCursor},
    gateway::{DocumentStore, ImageQuery},
};

/// One page of the image collection, newest first.
#[derive(Debug, Clone)]
pub struct Page {
    pub records: Vec<ImageRecord>,
    /// Cursor of the last returned record; `None` when the page is empty.
    pub next_cursor: Option<PageCursor>,
    /// `true` when the page came back full. A collection whose size is an exact multiple of
    /// the page size therefore needs one extra, empty fetch before this turns `false`.
    pub has_more: bool,
}

pub async fn fetch_page(
    documents: &dyn DocumentStore,
    page_size: usize,
    cursor: Option<PageCursor>,
    category: Option<&str>,
) -> anyhow::Result<Page> {
    let records = documents
        .query_images(&ImageQuery {
            label: category.map(str::to_string),
            start_after: cursor,
            limit: page_size,
        })
        .await?;

    let next_cursor = records.last().map(ImageRecord::cursor);
    let has_more = records.len() == page_size;

    Ok(Page {
        records,
        next_cursor,
        has_more,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::gateway::memory::InMemoryDocumentStore;

    async fn seeded(count: i64, label_every: Option<i64>) -> InMemoryDocumentStore {
        let store = InMemoryDocumentStore::new();
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        for n in 0..count {
            let labels = match label_every {
                Some(every) if n % every == 0 => vec!["film".to_string()],
                _ => vec!["digital".to_string()],
            };
            store
                .insert_image(ImageRecord {
                    id: Uuid::new_v4(),
                    url: format!("https://cdn.test/images/{n}.jpg"),
                    file_name: format!("{n}.jpg"),
                    description: String::new(),
                    labels,
                    created_at: base + Duration::hours(n),
                    position: None,
                })
                .await;
        }
        store
    }

    #[tokio::test]
    async fn three_records_in_pages_of_two() {
        let store = seeded(3, None).await;

        let first = fetch_page(&store, 2, None, None).await.unwrap();
        assert_eq!(first.records.len(), 2);
        assert!(first.has_more);

        let second = fetch_page(&store, 2, first.next_cursor, None).await.unwrap();
        assert_eq!(second.records.len(), 1);
        assert!(!second.has_more);
    }

    #[tokio::test]
    async fn exact_multiple_needs_one_empty_page_to_terminate() {
        let store = seeded(4, None).await;

        let first = fetch_page(&store, 2, None, None).await.unwrap();
        let second = fetch_page(&store, 2, first.next_cursor, None).await.unwrap();
        assert_eq!(second.records.len(), 2);
        assert!(second.has_more);

        let third = fetch_page(&store, 2, second.next_cursor, None).await.unwrap();
        assert!(third.records.is_empty());
        assert!(!third.has_more);
        assert!(third.next_cursor.is_none());
    }

    #[tokio::test]
    async fn concatenated_pages_are_unique_and_newest_first() {
        let store = seeded(11, None).await;
        let mut all: Vec<ImageRecord> = Vec::new();
        let mut cursor = None;

        loop {
            let page = fetch_page(&store, 3, cursor, None).await.unwrap();
            all.extend(page.records.iter().cloned());
            cursor = page.next_cursor.or(cursor);
            if !page.has_more {
                break;
            }
        }

        assert_eq!(all.len(), 11);
        let ids: HashSet<Uuid> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 11);
        assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn category_filter_only_returns_matching_records() {
        let store = seeded(9, Some(3)).await;
        let page = fetch_page(&store, 12, None, Some("film")).await.unwrap();
        assert_eq!(page.records.len(), 3);
        assert!(page.records.iter().all(|r| r.has_label("film")));
        assert!(!page.has_more);
    }
}
