use serde_derive::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct UpdateImageRequest {
    pub description: Option<String>,
    /// Comma-separated, as typed.
    pub labels: Option<String>,
}
