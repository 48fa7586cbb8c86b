use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    dto::{
        requests::gallery::reorder_request::ReorderRequest,
        responses::{gallery::view_response::ReorderResponse, response_data::http_resp},
    },
    errors::code_error::{CodeErrorResp, HandlerResponse},
    init::state::ServerState,
    routers::middleware::is_logged_in::AuthStatus,
    util::time::now::tokio_now,
};

#[utoipa::path(
    post,
    path = "/api/gallery/views/{view_id}/reorder",
    tag = "gallery-view",
    params(("view_id" = Uuid, Path, description = "Gallery view id")),
    request_body = ReorderRequest,
    responses(
        (status = 200, description = "Reorder saved", body = ReorderResponse),
        (status = 400, description = "Index out of range", body = CodeErrorResp),
        (status = 403, description = "Not an admin", body = CodeErrorResp),
        (status = 404, description = "View not found or expired", body = CodeErrorResp),
        (status = 409, description = "Write-back failed; view reloaded", body = CodeErrorResp)
    )
)]
pub async fn reorder_images(
    Extension(auth_status): Extension<AuthStatus>,
    State(state): State<Arc<ServerState>>,
    Path(view_id): Path<Uuid>,
    Json(request): Json<ReorderRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let controller = state.get_view(view_id, auth_status.user_id()).await?;
    let positions_written = controller
        .reorder(request.source_index, request.destination_index)
        .await?;

    Ok(http_resp(
        ReorderResponse {
            positions_written,
            state: controller.snapshot().await,
        },
        (),
        start,
    ))
}
