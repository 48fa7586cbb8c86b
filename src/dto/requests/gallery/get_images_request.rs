use serde_derive::Deserialize;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
pub struct GetImagesRequest {
    /// Defaults to the configured gallery page size.
    pub page_size: Option<usize>,
    /// `next_cursor` of the previous page.
    pub cursor: Option<String>,
    pub category: Option<String>,
}
