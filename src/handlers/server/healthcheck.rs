use std::sync::Arc;

use axum::{extract::State, response::IntoResponse};
use serde_derive::Serialize;
use utoipa::ToSchema;

use crate::{
    build_info::{AXUM_VERSION, BUILD_TIME, RUST_VERSION},
    dto::responses::response_data::http_resp,
    init::state::ServerState,
    util::time::now::tokio_now,
};

#[derive(Serialize, ToSchema)]
pub struct ServerHealthcheckResponse {
    pub app_name_version: String,
    pub build_time: &'static str,
    pub axum_version: &'static str,
    pub rust_version: &'static str,
    pub uptime_secs: u64,
    pub responses_handled: u64,
    pub active_sessions: usize,
    pub open_gallery_views: usize,
}

#[utoipa::path(
    get,
    path = "/api/healthcheck/server",
    tag = "server",
    responses(
        (status = 200, description = "Server is healthy", body = ServerHealthcheckResponse)
    )
)]
pub async fn healthcheck(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let start = tokio_now();

    http_resp(
        ServerHealthcheckResponse {
            app_name_version: state.get_app_name_version(),
            build_time: BUILD_TIME,
            axum_version: AXUM_VERSION,
            rust_version: RUST_VERSION,
            uptime_secs: state.get_uptime().as_secs(),
            responses_handled: state.get_responses_handled(),
            active_sessions: state.get_session_length(),
            open_gallery_views: state.get_view_count(),
        },
        (),
        start,
    )
}
