use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    dto::{
        requests::gallery::set_filter_request::SetFilterRequest,
        responses::{gallery::view_response::ViewResponse, response_data::http_resp},
    },
    errors::code_error::{CodeErrorResp, HandlerResponse},
    init::state::ServerState,
    routers::middleware::is_logged_in::AuthStatus,
    util::time::now::tokio_now,
};

#[utoipa::path(
    put,
    path = "/api/gallery/views/{view_id}/filter",
    tag = "gallery-view",
    params(("view_id" = Uuid, Path, description = "Gallery view id")),
    request_body = SetFilterRequest,
    responses(
        (status = 200, description = "First page under the new filter", body = ViewResponse),
        (status = 404, description = "View not found or expired", body = CodeErrorResp),
        (status = 502, description = "Backend read failed", body = CodeErrorResp)
    )
)]
pub async fn set_filter(
    Extension(auth_status): Extension<AuthStatus>,
    State(state): State<Arc<ServerState>>,
    Path(view_id): Path<Uuid>,
    Json(request): Json<SetFilterRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let controller = state.get_view(view_id, auth_status.user_id()).await?;
    controller.set_filter(request.category).await?;

    Ok(http_resp(
        ViewResponse {
            view_id,
            state: controller.snapshot().await,
        },
        (),
        start,
    ))
}
