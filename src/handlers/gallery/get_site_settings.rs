use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};

use crate::{
    domain::gallery::site_settings::SiteSettings,
    dto::responses::response_data::http_resp,
    errors::code_error::{CodeError, CodeErrorResp, HandlerResponse, code_err},
    init::state::ServerState,
    util::time::now::tokio_now,
};

#[utoipa::path(
    get,
    path = "/api/gallery/settings",
    tag = "gallery",
    responses(
        (status = 200, description = "Login background and about section", body = SiteSettings),
        (status = 502, description = "Backend read failed", body = CodeErrorResp)
    )
)]
pub async fn get_site_settings(
    State(state): State<Arc<ServerState>>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let settings = state
        .gateway()
        .documents()
        .get_site_settings()
        .await
        .map_err(|e| code_err(CodeError::GATEWAY_READ_ERROR, e))?;

    Ok(http_resp(settings, (), start))
}
