use std::sync::Arc;

use axum::{Extension, extract::State, response::IntoResponse};
use axum_extra::extract::cookie::{Cookie, SameSite};
use tracing::{error, info};

use crate::{
    dto::responses::{auth::logout_response::LogoutResponse, response_data::http_resp_with_cookies},
    errors::code_error::{CodeErrorResp, HandlerResponse},
    init::state::{ServerState, session::Session},
    util::time::now::tokio_now,
};

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logout successful", body = LogoutResponse),
        (status = 401, description = "Not logged in", body = CodeErrorResp)
    )
)]
pub async fn logout(
    Extension(session): Extension<Session>,
    State(state): State<Arc<ServerState>>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let mut cookie = Cookie::build(("session_id", ""))
        .path("/")
        .http_only(true)
        .secure(state.secure_cookies())
        .same_site(SameSite::Strict)
        .build();
    cookie.make_removal();

    match state.remove_session(session.session_id).await {
        Ok((removed_session_id, session_count)) => {
            info!(
                removed_session_id = %removed_session_id,
                session_count = %session_count,
                "User logout; session removed.",
            );
        }
        Err(e) => {
            error!(error = %e, "Failed to remove session from state");
        }
    };

    Ok(http_resp_with_cookies(
        LogoutResponse {
            message: "Logout successful".to_string(),
        },
        (),
        start,
        None,
        Some(vec![cookie]),
    ))
}
