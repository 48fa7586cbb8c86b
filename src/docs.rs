//! OpenAPI documentation registration for Swagger UI.
//!
//! Utoipa only exposes operations listed in `#[openapi(paths(...))]`; each handler still
//! carries its own `#[utoipa::path(...)]`.

use utoipa::OpenApi;

// ---- handlers (for `paths(...)`) ----
use crate::handlers::{
    auth::{login, logout, me},
    gallery::{
        begin_edit, cancel_edit, clear_selection, close_view, delete_image, delete_selected,
        get_images, get_site_settings, get_view, load_more, open_view, reload_view,
        reorder_images, set_background, set_filter, toggle_selection, update_about, update_image,
        upload_image,
    },
    server::healthcheck,
};

// ---- schemas (for `components(schemas(...))`) ----
use crate::domain::{
    auth::role::RoleType,
    gallery::{image_record::ImageRecord, site_settings::SiteSettings},
};
use crate::dto::{
    requests::{
        auth::login_request::LoginRequest,
        gallery::{
            open_view_request::OpenViewRequest, reorder_request::ReorderRequest,
            set_background_request::SetBackgroundRequest, set_filter_request::SetFilterRequest,
            update_about_request::UpdateAboutRequest, update_image_request::UpdateImageRequest,
        },
    },
    responses::{
        auth::{
            login_response::LoginResponse, logout_response::LogoutResponse,
            me_response::MeResponse,
        },
        gallery::{
            get_images_response::GetImagesResponse,
            view_response::{
                DeleteImagesResponse, ReorderResponse, UploadImageResponse, ViewResponse,
            },
        },
    },
};
use crate::errors::code_error::CodeErrorResp;
use crate::gallery::{
    cache::GalleryViewState,
    mutations::{DeleteReport, FailedDeletion},
    selection::SelectionKind,
};
use crate::gateway::{UploadProgress, UploadState};
use crate::handlers::server::healthcheck::ServerHealthcheckResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- server ---
        healthcheck::healthcheck,

        // --- auth ---
        login::login,
        logout::logout,
        me::me_handler,

        // --- gallery (stateless) ---
        get_images::get_images,
        get_site_settings::get_site_settings,

        // --- gallery views ---
        open_view::open_view,
        get_view::get_view,
        close_view::close_view,
        load_more::load_more,
        set_filter::set_filter,
        reload_view::reload_view,
        reorder_images::reorder_images,
        update_image::update_image,
        delete_image::delete_image,
        toggle_selection::toggle_selection,
        clear_selection::clear_selection,
        delete_selected::delete_selected,
        begin_edit::begin_edit,
        cancel_edit::cancel_edit,
        upload_image::upload_image,
        set_background::set_background,
        update_about::update_about,
    ),
    components(
        schemas(
            CodeErrorResp,
            ServerHealthcheckResponse,

            LoginRequest,
            LoginResponse,
            LogoutResponse,
            MeResponse,
            RoleType,

            ImageRecord,
            SiteSettings,
            GetImagesResponse,
            OpenViewRequest,
            SetFilterRequest,
            ReorderRequest,
            UpdateImageRequest,
            SetBackgroundRequest,
            UpdateAboutRequest,
            ViewResponse,
            ReorderResponse,
            DeleteImagesResponse,
            UploadImageResponse,
            GalleryViewState,
            SelectionKind,
            DeleteReport,
            FailedDeletion,
            UploadProgress,
            UploadState,
        )
    ),
    tags(
        (name = "server", description = "Server status endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "gallery", description = "Public gallery reads"),
        (name = "gallery-view", description = "Stateful gallery views: paging, filtering, reordering and admin edits")
    )
)]
pub struct ApiDoc;
