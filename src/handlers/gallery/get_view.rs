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
    get,
    path = "/api/gallery/views/{view_id}",
    tag = "gallery-view",
    params(("view_id" = Uuid, Path, description = "Gallery view id")),
    responses(
        (status = 200, description = "Current view state", body = ViewResponse),
        (status = 404, description = "View not found or expired", body = CodeErrorResp)
    )
)]
pub async fn get_view(
    Extension(auth_status): Extension<AuthStatus>,
    State(state): State<Arc<ServerState>>,
    Path(view_id): Path<Uuid>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let controller = state.get_view(view_id, auth_status.user_id()).await?;

    Ok(http_resp(
        ViewResponse {
            view_id,
            state: controller.snapshot().await,
        },
        (),
        start,
    ))
}
