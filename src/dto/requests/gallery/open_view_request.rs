use serde_derive::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema, Default)]
pub struct OpenViewRequest {
    pub category: Option<String>,
}
