use serde_derive::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct SetFilterRequest {
    /// `null` or blank shows every category.
    pub category: Option<String>,
}
