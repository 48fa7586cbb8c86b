use std::{str::FromStr, sync::Arc};

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};

use crate::{
    domain::gallery::page_cursor::PageCursor,
    dto::{
        requests::gallery::get_images_request::GetImagesRequest,
        responses::{gallery::get_images_response::GetImagesResponse, response_data::http_resp},
    },
    errors::code_error::{CodeError, CodeErrorResp, HandlerResponse, code_err},
    gallery::pagination::fetch_page,
    init::state::ServerState,
    util::time::now::tokio_now,
};

const MAX_PAGE_SIZE: usize = 100;

/// Stateless page fetch for clients that keep their own cursor.
#[utoipa::path(
    get,
    path = "/api/gallery/images",
    tag = "gallery",
    params(GetImagesRequest),
    responses(
        (status = 200, description = "One page of images, newest first", body = GetImagesResponse),
        (status = 400, description = "Malformed cursor", body = CodeErrorResp),
        (status = 502, description = "Backend read failed", body = CodeErrorResp)
    )
)]
pub async fn get_images(
    State(state): State<Arc<ServerState>>,
    Query(request): Query<GetImagesRequest>,
) -> HandlerResponse<impl IntoResponse> {
    let start = tokio_now();

    let page_size = request
        .page_size
        .unwrap_or_else(|| state.page_size())
        .clamp(1, MAX_PAGE_SIZE);

    let cursor = match request.cursor.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => Some(
            PageCursor::from_str(token).map_err(|e| code_err(CodeError::INVALID_CURSOR, e))?,
        ),
        _ => None,
    };

    let category = request
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let page = fetch_page(
        state.gateway().documents().as_ref(),
        page_size,
        cursor,
        category,
    )
    .await
    .map_err(|e| code_err(CodeError::GATEWAY_READ_ERROR, e))?;

    Ok(http_resp(
        GetImagesResponse {
            images: page.records,
            next_cursor: page.next_cursor.map(|c| c.to_string()),
            has_more: page.has_more,
        },
        (),
        start,
    ))
}
