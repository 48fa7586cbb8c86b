use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The singleton `settings/site` document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub login_background_url: Option<String>,
    pub about_image: Option<String>,
    pub about_text: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct SiteSettingsPatch {
    pub login_background_url: Option<String>,
    pub about_image: Option<String>,
    pub about_text: Option<String>,
}

impl SiteSettingsPatch {
    pub fn apply_to(&self, settings: &mut SiteSettings, now: DateTime<Utc>) {
        if let Some(url) = &self.login_background_url {
            settings.login_background_url = Some(url.clone());
        }
        if let Some(image) = &self.about_image {
            settings.about_image = Some(image.clone());
        }
        if let Some(text) = &self.about_text {
            settings.about_text = Some(text.clone());
        }
        settings.updated_at = Some(now);
    }
}
