use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::page_cursor::PageCursor;

/// One photograph's metadata, shaped like the `images/{id}` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: Uuid,
    pub url: String,
    pub file_name: String,
    pub description: String,
    pub labels: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub position: Option<i32>,
}

impl ImageRecord {
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Continuation token pointing just past this record.
    pub fn cursor(&self) -> PageCursor {
        PageCursor::new(self.created_at, self.id)
    }
}

/// Fields supplied by the client at upload time; id and created_at come from the store.
#[derive(Debug, Clone)]
pub struct NewImageRecord {
    pub url: String,
    pub file_name: String,
    pub description: String,
    pub labels: Vec<String>,
    pub position: Option<i32>,
}

/// Partial update of an image document. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageRecordPatch {
    pub description: Option<String>,
    pub labels: Option<Vec<String>>,
    pub position: Option<i32>,
}

impl ImageRecordPatch {
    pub fn position(position: i32) -> Self {
        ImageRecordPatch {
            position: Some(position),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.labels.is_none() && self.position.is_none()
    }

    pub fn apply_to(&self, record: &mut ImageRecord) {
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
        if let Some(labels) = &self.labels {
            record.labels = labels.clone();
        }
        if let Some(position) = self.position {
            record.position = Some(position);
        }
    }
}
