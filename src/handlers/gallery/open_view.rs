use std::sync::Arc;

use axum::{Extension, extract::State, response::IntoResponse};

use crate::{
    dto::{
        requests::gallery::open_view_request::OpenViewRequest,
        responses::{gallery::view_response::ViewResponse, response_data::http_resp},
    },
    errors::code_error::{CodeErrorResp, HandlerResponse},
    init::state::ServerState,
    routers::middleware::is_logged_in::AuthStatus,
    util::time::now::tokio_now,
};

/// Mounts a gallery view. The first page is loaded before this returns; a failed first
/// load shows up in `state.error` rather than failing the request.
#[utoipa::path(
    post,
    path = "/api/gallery/views",
    tag = "gallery-view",
    request_body = OpenViewRequest,
    responses(
        (status = 200, description = "View opened", body = ViewResponse),
        (status = 429, description = "Too many views open", body = CodeErrorResp),
        (status = 500, description = "Internal server error", body = CodeErrorResp)
    )
)]
pub async fn open_view(
    Extension(auth_status): Extension<AuthStatus>,
    State(state): State<Arc<ServerState>>,
    body: Option<axum::Json<OpenViewRequest>>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let request = body.map(|axum::Json(request)| request).unwrap_or_default();
    let category = request
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let (view_id, controller) = state.open_view(auth_status.user_id(), category).await?;

    Ok(http_resp(
        ViewResponse {
            view_id,
            state: controller.snapshot().await,
        },
        (),
        start,
    ))
}
