use axum::{Extension, response::IntoResponse};

use crate::{
    dto::responses::{auth::me_response::MeResponse, response_data::http_resp},
    errors::code_error::{CodeErrorResp, HandlerResponse},
    init::state::session::Session,
    util::time::now::tokio_now,
};

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current session", body = MeResponse),
        (status = 401, description = "Not logged in", body = CodeErrorResp)
    )
)]
pub async fn me_handler(
    Extension(session): Extension<Session>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    Ok(http_resp(
        MeResponse {
            user_id: session.user_id,
            user_email: session.user_email.clone(),
            role: session.role,
            is_admin: session.role.is_admin(),
            session_expires_at: session.expires_at,
        },
        (),
        start,
    ))
}
