use init::{config::LogConfig, logging::init_logging, server_init::server_init_proc};
use mimalloc::MiMalloc;
use tracing::info;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub mod build_info {
    include!(concat!(env!("OUT_DIR"), "/build_info.rs"));
}

// modules tree
pub mod docs;
pub mod schema;
pub mod domain {
    pub mod auth {
        pub mod role;
        pub mod user;
    }
    pub mod gallery {
        pub mod image_record;
        pub mod page_cursor;
        pub mod site_settings;
    }
}
pub mod dto {
    pub mod requests {
        pub mod auth {
            pub mod login_request;
        }
        pub mod gallery {
            pub mod get_images_request;
            pub mod open_view_request;
            pub mod reorder_request;
            pub mod set_background_request;
            pub mod set_filter_request;
            pub mod update_about_request;
            pub mod update_image_request;
        }
    }
    pub mod responses {
        pub mod auth {
            pub mod login_response;
            pub mod logout_response;
            pub mod me_response;
        }
        pub mod gallery {
            pub mod get_images_response;
            pub mod view_response;
        }
        pub mod response_data;
        pub mod response_meta;
    }
}
pub mod errors {
    pub mod code_error;
}
pub mod gallery {
    pub mod cache;
    pub mod controller;
    pub mod mutations;
    pub mod pagination;
    pub mod reorder;
    pub mod selection;
    #[cfg(test)]
    mod test_support;
}
pub mod gateway;
pub mod handlers {
    pub mod auth {
        pub mod login;
        pub mod logout;
        pub mod me;
    }
    pub mod gallery {
        pub mod begin_edit;
        pub mod cancel_edit;
        pub mod clear_selection;
        pub mod close_view;
        pub mod delete_image;
        pub mod delete_selected;
        pub mod get_images;
        pub mod get_site_settings;
        pub mod get_view;
        pub mod load_more;
        pub mod open_view;
        pub mod reload_view;
        pub mod reorder_images;
        pub mod set_background;
        pub mod set_filter;
        pub mod toggle_selection;
        pub mod update_about;
        pub mod update_image;
        pub mod upload_image;
    }
    pub mod server {
        pub mod fallback;
        pub mod healthcheck;
    }
}
pub mod init {
    pub mod config;
    pub mod logging;
    pub mod server_init;
    pub mod state;
}
pub mod jobs {
    pub mod auth {
        pub mod invalidate_sessions;
    }
    pub mod gallery {
        pub mod purge_idle_views;
    }
    pub mod job_funcs {
        pub mod every_minute;
        pub mod init_scheduler;
    }
}
pub mod routers {
    pub mod main_router;
    pub mod middleware {
        pub mod auth;
        pub mod is_logged_in;
        pub mod logging;
    }
}
pub mod util {
    pub mod auth {
        pub mod authorization_policy;
    }
    pub mod crypto {
        pub mod hash_pw;
        pub mod verify_pw;
    }
    pub mod string {
        pub mod blob_key;
        pub mod normalize_email;
        pub mod parse_labels;
    }
    pub mod time {
        pub mod now;
    }
}

// main function
#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let start = tokio::time::Instant::now();

    if std::env::var("IS_AWS").is_err() {
        // a missing .env is fine; the environment may already be populated
        let _ = dotenvy::dotenv();
    }

    let _log_guard = init_logging(&LogConfig::from_env())?;

    info!(
        cores = num_cpus::get(),
        "Initializing server..."
    );
    server_init_proc(start).await?;

    Ok(())
}
