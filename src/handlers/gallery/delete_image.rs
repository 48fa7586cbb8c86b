use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    dto::responses::{gallery::view_response::DeleteImagesResponse, response_data::http_resp},
    errors::code_error::{CodeErrorResp, HandlerResponse},
    init::state::ServerState,
    routers::middleware::is_logged_in::AuthStatus,
    util::time::now::tokio_now,
};

#[utoipa::path(
    delete,
    path = "/api/gallery/views/{view_id}/images/{image_id}",
    tag = "gallery-view",
    params(
        ("view_id" = Uuid, Path, description = "Gallery view id"),
        ("image_id" = Uuid, Path, description = "Image id")
    ),
    responses(
        (status = 200, description = "Deleted, or already gone", body = DeleteImagesResponse),
        (status = 403, description = "Not an admin", body = CodeErrorResp),
        (status = 404, description = "View not found or expired", body = CodeErrorResp),
        (status = 502, description = "Deletion failed; image kept", body = CodeErrorResp)
    )
)]
pub async fn delete_image(
    Extension(auth_status): Extension<AuthStatus>,
    State(state): State<Arc<ServerState>>,
    Path((view_id, image_id)): Path<(Uuid, Uuid)>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let controller = state.get_view(view_id, auth_status.user_id()).await?;
    let report = controller.delete_one(image_id).await?;

    Ok(http_resp(
        DeleteImagesResponse {
            report,
            state: controller.snapshot().await,
        },
        (),
        start,
    ))
}
