use serde_derive::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct ReorderRequest {
    pub source_index: usize,
    /// Absent when the drag was dropped outside the grid.
    pub destination_index: Option<usize>,
}
