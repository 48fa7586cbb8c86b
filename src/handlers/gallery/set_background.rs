use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    domain::gallery::site_settings::SiteSettings,
    dto::{
        requests::gallery::set_background_request::SetBackgroundRequest,
        responses::response_data::http_resp,
    },
    errors::code_error::{CodeErrorResp, HandlerResponse},
    init::state::ServerState,
    routers::middleware::is_logged_in::AuthStatus,
    util::time::now::tokio_now,
};

#[utoipa::path(
    put,
    path = "/api/gallery/views/{view_id}/background",
    tag = "gallery-view",
    params(("view_id" = Uuid, Path, description = "Gallery view id")),
    request_body = SetBackgroundRequest,
    responses(
        (status = 200, description = "Login background updated", body = SiteSettings),
        (status = 400, description = "Empty URL", body = CodeErrorResp),
        (status = 403, description = "Not an admin", body = CodeErrorResp),
        (status = 502, description = "Backend write failed", body = CodeErrorResp)
    )
)]
pub async fn set_background(
    Extension(auth_status): Extension<AuthStatus>,
    State(state): State<Arc<ServerState>>,
    Path(view_id): Path<Uuid>,
    Json(request): Json<SetBackgroundRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let controller = state.get_view(view_id, auth_status.user_id()).await?;
    let settings = controller.set_as_background(&request.url).await?;

    Ok(http_resp(settings, (), start))
}
