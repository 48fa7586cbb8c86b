use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    dto::{
        requests::gallery::update_image_request::UpdateImageRequest,
        responses::{gallery::view_response::ViewResponse, response_data::http_resp},
    },
    errors::code_error::{CodeErrorResp, HandlerResponse},
    init::state::ServerState,
    routers::middleware::is_logged_in::AuthStatus,
    util::time::now::tokio_now,
};

#[utoipa::path(
    patch,
    path = "/api/gallery/views/{view_id}/images/{image_id}",
    tag = "gallery-view",
    params(
        ("view_id" = Uuid, Path, description = "Gallery view id"),
        ("image_id" = Uuid, Path, description = "Image id")
    ),
    request_body = UpdateImageRequest,
    responses(
        (status = 200, description = "Metadata updated", body = ViewResponse),
        (status = 403, description = "Not an admin", body = CodeErrorResp),
        (status = 404, description = "View or image not found", body = CodeErrorResp),
        (status = 502, description = "Backend write failed; nothing changed", body = CodeErrorResp)
    )
)]
pub async fn update_image(
    Extension(auth_status): Extension<AuthStatus>,
    State(state): State<Arc<ServerState>>,
    Path((view_id, image_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateImageRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let controller = state.get_view(view_id, auth_status.user_id()).await?;
    controller
        .update_metadata(image_id, request.description, request.labels)
        .await?;

    Ok(http_resp(
        ViewResponse {
            view_id,
            state: controller.snapshot().await,
        },
        (),
        start,
    ))
}
