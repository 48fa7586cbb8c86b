use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    dto::responses::response_data::http_resp,
    errors::code_error::{CodeErrorResp, HandlerResponse},
    init::state::ServerState,
    routers::middleware::is_logged_in::AuthStatus,
    util::time::now::tokio_now,
};

/// Unmounts the view. Fetches still in flight for it finish and are dropped.
#[utoipa::path(
    delete,
    path = "/api/gallery/views/{view_id}",
    tag = "gallery-view",
    params(("view_id" = Uuid, Path, description = "Gallery view id")),
    responses(
        (status = 200, description = "View closed"),
        (status = 404, description = "View not found or expired", body = CodeErrorResp)
    )
)]
pub async fn close_view(
    Extension(auth_status): Extension<AuthStatus>,
    State(state): State<Arc<ServerState>>,
    Path(view_id): Path<Uuid>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    state.close_view(view_id, auth_status.user_id()).await?;

    Ok(http_resp(view_id, (), start))
}
