use serde_derive::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::gallery::image_record::ImageRecord,
    gallery::{cache::GalleryViewState, mutations::DeleteReport},
    gateway::UploadProgress,
};

#[derive(Serialize, ToSchema)]
pub struct ViewResponse {
    pub view_id: Uuid,
    pub state: GalleryViewState,
}

#[derive(Serialize, ToSchema)]
pub struct ReorderResponse {
    pub positions_written: usize,
    pub state: GalleryViewState,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteImagesResponse {
    pub report: DeleteReport,
    pub state: GalleryViewState,
}

#[derive(Serialize, ToSchema)]
pub struct UploadImageResponse {
    pub image: ImageRecord,
    pub progress: UploadProgress,
    pub state: GalleryViewState,
}
