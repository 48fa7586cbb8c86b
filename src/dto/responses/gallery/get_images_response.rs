use serde_derive::Serialize;
use utoipa::ToSchema;

use crate::domain::gallery::image_record::ImageRecord;

#[derive(Serialize, ToSchema)]
pub struct GetImagesResponse {
    pub images: Vec<ImageRecord>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}
