use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use axum_extra::extract::cookie::{Cookie, SameSite};
use tracing::info;
use uuid::Uuid;

use crate::{
    dto::{
        requests::auth::login_request::LoginRequest,
        responses::{auth::login_response::LoginResponse, response_data::http_resp_with_cookies},
    },
    errors::code_error::{CodeError, CodeErrorResp, HandlerResponse, code_err},
    init::state::ServerState,
    util::{
        crypto::verify_pw::verify_pw, string::normalize_email::normalize_email,
        time::now::tokio_now,
    },
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; session cookie set", body = LoginResponse),
        (status = 400, description = "Malformed email", body = CodeErrorResp),
        (status = 401, description = "Wrong password", body = CodeErrorResp),
        (status = 404, description = "User not found", body = CodeErrorResp)
    )
)]
pub async fn login(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<LoginRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let user_email = normalize_email(&request.user_email);
    if !email_address::EmailAddress::is_valid(&user_email) {
        return Err(code_err(
            CodeError::INVALID_REQUEST,
            "Email address is malformed",
        ));
    }

    let user = state
        .gateway()
        .documents()
        .find_user_by_email(&user_email)
        .await
        .map_err(|e| code_err(CodeError::GATEWAY_READ_ERROR, e))?
        .ok_or_else(|| CodeErrorResp::from(CodeError::USER_NOT_FOUND))?;

    match verify_pw(&request.user_password, &user.user_password_hash).await {
        Ok(true) => (),
        Ok(false) => return Err(CodeError::WRONG_PW.into()),
        Err(e) => return Err(code_err(CodeError::COULD_NOT_VERIFY_PW, e)),
    }

    let session_id: Uuid = state
        .new_session(&user, None)
        .await
        .map_err(|e| code_err(CodeError::SESSION_ID_ALREADY_EXISTS, e))?;

    let cookie = Cookie::build(("session_id", session_id.to_string()))
        .path("/")
        .http_only(true)
        .secure(state.secure_cookies())
        .same_site(SameSite::Strict)
        .build();

    info!(
        user_id = %user.user_id,
        role = user.role.as_str(),
        session_count = state.get_session_length(),
        "User logged in"
    );

    Ok(http_resp_with_cookies(
        LoginResponse {
            message: "Login successful".to_string(),
            user_id: user.user_id,
        },
        (),
        start,
        Some(vec![cookie]),
        None,
    ))
}
