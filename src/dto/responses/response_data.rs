use axum::response::IntoResponse;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_derive::Serialize;

use super::response_meta::ResponseMeta;

#[derive(Serialize)]
pub struct Response<D: serde::Serialize, M: serde::Serialize> {
    success: bool,
    data: D,
    meta: ResponseMeta<M>,
}

impl<D: serde::Serialize, M: serde::Serialize> IntoResponse for Response<D, M> {
    fn into_response(self) -> axum::response::Response {
        axum::response::Json(self).into_response()
    }
}

pub fn http_resp<D: serde::Serialize, M: serde::Serialize>(
    data: D,
    meta: M,
    start: tokio::time::Instant,
) -> Response<D, M> {
    Response {
        success: true,
        data,
        meta: ResponseMeta::from(start, meta),
    }
}

/// Same envelope, plus cookies to set and cookies to clear.
pub fn http_resp_with_cookies<D: serde::Serialize, M: serde::Serialize>(
    data: D,
    meta: M,
    start: tokio::time::Instant,
    cookies_to_set: Option<Vec<Cookie<'static>>>,
    cookies_to_unset: Option<Vec<Cookie<'static>>>,
) -> impl IntoResponse {
    let mut jar = CookieJar::new();
    for cookie in cookies_to_set.unwrap_or_default() {
        jar = jar.add(cookie);
    }
    for cookie in cookies_to_unset.unwrap_or_default() {
        jar = jar.remove(cookie);
    }

    (jar, http_resp(data, meta, start))
}
