use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{Multipart, Path, State},
    response::IntoResponse,
};
use tracing::{debug, error};
use uuid::Uuid;

use crate::{
    dto::responses::{gallery::view_response::UploadImageResponse, response_data::http_resp},
    errors::code_error::{CodeError, CodeErrorResp, HandlerResponse, code_err},
    gallery::mutations::ImageUpload,
    gateway::UploadProgress,
    init::state::ServerState,
    routers::middleware::is_logged_in::AuthStatus,
    util::time::now::tokio_now,
};

const ALLOWED_MIME_TYPES: [&str; 7] = [
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/webp",
    "image/tiff",
    "image/avif",
    "image/bmp",
];

/// Multipart fields: `file` (required), `description`, `labels` (comma-separated).
#[utoipa::path(
    post,
    path = "/api/gallery/views/{view_id}/upload",
    tag = "gallery-view",
    params(("view_id" = Uuid, Path, description = "Gallery view id")),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image uploaded", body = UploadImageResponse),
        (status = 400, description = "Missing, empty or unsupported file", body = CodeErrorResp),
        (status = 403, description = "Not an admin", body = CodeErrorResp),
        (status = 404, description = "View not found or expired", body = CodeErrorResp),
        (status = 502, description = "Backend write failed", body = CodeErrorResp)
    )
)]
pub async fn upload_image(
    Extension(auth_status): Extension<AuthStatus>,
    State(state): State<Arc<ServerState>>,
    Path(view_id): Path<Uuid>,
    mut multipart: Multipart,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let controller = state.get_view(view_id, auth_status.user_id()).await?;

    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut description = String::new();
    let mut labels: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!(error = ?e, view_id = %view_id, "Failed to fetch next multipart field");
        code_err(CodeError::FILE_UPLOAD_ERROR, e)
    })? {
        let name = field.name().map(str::to_owned);

        match name.as_deref() {
            Some("file") | None => {
                let file_name = field
                    .file_name()
                    .map(str::to_owned)
                    .ok_or_else(|| code_err(CodeError::FILE_UPLOAD_ERROR, "Missing file name"))?;
                let content_type = match field.content_type() {
                    Some(mime) => mime.to_string(),
                    None => mime_guess::from_path(&file_name)
                        .first_or_octet_stream()
                        .to_string(),
                };
                if !ALLOWED_MIME_TYPES.contains(&content_type.as_str()) {
                    return Err(code_err(
                        CodeError::FILE_UPLOAD_ERROR,
                        format!("Unsupported image type: {content_type}"),
                    ));
                }

                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| code_err(CodeError::FILE_UPLOAD_ERROR, e))?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            Some("description") => {
                description = field
                    .text()
                    .await
                    .map_err(|e| code_err(CodeError::FILE_UPLOAD_ERROR, e))?;
            }
            Some("labels") => {
                labels = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| code_err(CodeError::FILE_UPLOAD_ERROR, e))?,
                );
            }
            Some(other) => {
                debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    let (file_name, content_type, bytes) =
        file.ok_or_else(|| code_err(CodeError::FILE_UPLOAD_ERROR, "No file field in upload"))?;

    let last_progress = Mutex::new(UploadProgress::running(0, bytes.len()));
    let on_progress = |progress: UploadProgress| {
        debug!(
            view_id = %view_id,
            percent = progress.percent,
            state = ?progress.state,
            "Upload progress"
        );
        if let Ok(mut last) = last_progress.lock() {
            *last = progress;
        }
    };

    let image = controller
        .upload(
            ImageUpload {
                file_name,
                content_type,
                bytes,
                description,
                labels,
            },
            &on_progress,
        )
        .await?;

    let progress = last_progress
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    Ok(http_resp(
        UploadImageResponse {
            image,
            progress,
            state: controller.snapshot().await,
        },
        (),
        start,
    ))
}
