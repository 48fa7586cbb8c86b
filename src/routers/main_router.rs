use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    docs::ApiDoc,
    handlers::{
        auth::{login::login, logout::logout, me::me_handler},
        gallery::{
            begin_edit::begin_edit, cancel_edit::cancel_edit, clear_selection::clear_selection,
            close_view::close_view, delete_image::delete_image, delete_selected::delete_selected,
            get_images::get_images, get_site_settings::get_site_settings, get_view::get_view,
            load_more::load_more, open_view::open_view, reload_view::reload_view,
            reorder_images::reorder_images, set_background::set_background,
            set_filter::set_filter, toggle_selection::toggle_selection,
            update_about::update_about, update_image::update_image, upload_image::upload_image,
        },
        server::{fallback::fallback_handler, healthcheck::healthcheck},
    },
    init::state::ServerState,
};

use super::middleware::{
    auth::auth_middleware, is_logged_in::is_logged_in_middleware, logging::log_middleware,
};

const MAX_REQUEST_SIZE: usize = 1024 * 1024 * 150; // 150MB

pub fn build_router(state: Arc<ServerState>) -> axum::Router {
    let auth_middleware = from_fn_with_state(state.clone(), auth_middleware);
    let log_middleware = from_fn_with_state(state.clone(), log_middleware);
    let is_logged_in_middleware = from_fn_with_state(state.clone(), is_logged_in_middleware);
    let compression_middleware = CompressionLayer::new().gzip(true).zstd(true);
    let cors_layer = CorsLayer::very_permissive();

    // Publicly accessible API routes; admin-only view operations check the role themselves
    let public_router = Router::new()
        .route("/api/healthcheck/server", get(healthcheck))
        .route("/api/auth/login", post(login))
        .route("/api/gallery/images", get(get_images))
        .route("/api/gallery/settings", get(get_site_settings))
        .route("/api/gallery/views", post(open_view))
        .route(
            "/api/gallery/views/{view_id}",
            get(get_view).delete(close_view),
        )
        .route("/api/gallery/views/{view_id}/load-more", post(load_more))
        .route("/api/gallery/views/{view_id}/filter", put(set_filter))
        .route("/api/gallery/views/{view_id}/reload", post(reload_view))
        .route("/api/gallery/views/{view_id}/reorder", post(reorder_images))
        .route(
            "/api/gallery/views/{view_id}/images/{image_id}",
            delete(delete_image).patch(update_image),
        )
        .route(
            "/api/gallery/views/{view_id}/selection",
            delete(clear_selection),
        )
        .route(
            "/api/gallery/views/{view_id}/selection/delete",
            post(delete_selected),
        )
        .route(
            "/api/gallery/views/{view_id}/selection/{image_id}",
            post(toggle_selection),
        )
        .route("/api/gallery/views/{view_id}/edit", delete(cancel_edit))
        .route(
            "/api/gallery/views/{view_id}/edit/{image_id}",
            post(begin_edit),
        )
        .route("/api/gallery/views/{view_id}/upload", post(upload_image))
        .route("/api/gallery/views/{view_id}/background", put(set_background))
        .route("/api/gallery/views/{view_id}/about", put(update_about));

    // API routes requiring authentication
    let protected_router = Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me_handler))
        .layer(auth_middleware);

    let api_router = public_router
        .merge(protected_router)
        .layer(is_logged_in_middleware)
        .layer(compression_middleware)
        .layer(log_middleware)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_SIZE))
        .layer(cors_layer)
        .with_state(state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(fallback_handler)
}
