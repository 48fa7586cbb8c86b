use uuid::Uuid;

/// Builds a collision-free storage key for an uploaded file, keeping a readable name.
pub fn image_blob_key(image_key_id: Uuid, file_name: &str) -> String {
    let sanitized: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim_matches('.');

    if sanitized.is_empty() {
        format!("images/{image_key_id}")
    } else {
        format!("images/{image_key_id}-{sanitized}")
    }
}
