use serde_derive::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct UpdateAboutRequest {
    pub about_text: Option<String>,
    pub about_image: Option<String>,
}
