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

/// Bulk delete of the selection. Partial failure is an error; the failed images stay
/// loaded and selected.
#[utoipa::path(
    post,
    path = "/api/gallery/views/{view_id}/selection/delete",
    tag = "gallery-view",
    params(("view_id" = Uuid, Path, description = "Gallery view id")),
    responses(
        (status = 200, description = "Every selected image deleted", body = DeleteImagesResponse),
        (status = 400, description = "Nothing selected", body = CodeErrorResp),
        (status = 403, description = "Not an admin", body = CodeErrorResp),
        (status = 404, description = "View not found or expired", body = CodeErrorResp),
        (status = 502, description = "Some deletions failed", body = CodeErrorResp)
    )
)]
pub async fn delete_selected(
    Extension(auth_status): Extension<AuthStatus>,
    State(state): State<Arc<ServerState>>,
    Path(view_id): Path<Uuid>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let controller = state.get_view(view_id, auth_status.user_id()).await?;
    let report = controller.delete_selected().await?;

    Ok(http_resp(
        DeleteImagesResponse {
            report,
            state: controller.snapshot().await,
        },
        (),
        start,
    ))
}
