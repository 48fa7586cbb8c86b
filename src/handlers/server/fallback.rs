use axum::{http::Uri, response::IntoResponse};

use crate::errors::code_error::{CodeError, HandlerResponse, code_err};

pub async fn fallback_handler(uri: Uri) -> HandlerResponse<impl IntoResponse> {
    Err::<(), _>(code_err(CodeError::ROUTE_NOT_FOUND, uri.path()))
}
