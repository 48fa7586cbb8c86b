use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    dto::responses::{gallery::view_response::ViewResponse, response_data::http_resp},
    errors::code_error::{CodeErrorResp, HandlerResponse},
    init::state::ServerState,
    routers::middleware::is_logged_in::AuthStatus,
    util::time::now::tokio_now,
};

#[utoipa::path(
    post,
    path = "/api/gallery/views/{view_id}/edit/{image_id}",
    tag = "gallery-view",
    params(
        ("view_id" = Uuid, Path, description = "Gallery view id"),
        ("image_id" = Uuid, Path, description = "Image id")
    ),
    responses(
        (status = 200, description = "Image is now being edited", body = ViewResponse),
        (status = 403, description = "Not an admin", body = CodeErrorResp),
        (status = 404, description = "View or image not found", body = CodeErrorResp)
    )
)]
pub async fn begin_edit(
    Extension(auth_status): Extension<AuthStatus>,
    State(state): State<Arc<ServerState>>,
    Path((view_id, image_id)): Path<(Uuid, Uuid)>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let controller = state.get_view(view_id, auth_status.user_id()).await?;
    controller.begin_edit(image_id).await?;

    Ok(http_resp(
        ViewResponse {
            view_id,
            state: controller.snapshot().await,
        },
        (),
        start,
    ))
}
