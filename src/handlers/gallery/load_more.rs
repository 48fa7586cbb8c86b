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

/// Appends the next page. A no-op once `has_more` is false or while a fetch is running.
#[utoipa::path(
    post,
    path = "/api/gallery/views/{view_id}/load-more",
    tag = "gallery-view",
    params(("view_id" = Uuid, Path, description = "Gallery view id")),
    responses(
        (status = 200, description = "View state after the fetch", body = ViewResponse),
        (status = 404, description = "View not found or expired", body = CodeErrorResp),
        (status = 502, description = "Backend read failed; loaded records kept", body = CodeErrorResp)
    )
)]
pub async fn load_more(
    Extension(auth_status): Extension<AuthStatus>,
    State(state): State<Arc<ServerState>>,
    Path(view_id): Path<Uuid>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let controller = state.get_view(view_id, auth_status.user_id()).await?;
    controller.load_more().await?;

    Ok(http_resp(
        ViewResponse {
            view_id,
            state: controller.snapshot().await,
        },
        (),
        start,
    ))
}
