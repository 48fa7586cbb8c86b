use std::{net::SocketAddr, sync::Arc};

use tracing::{error, info};

use crate::{
    gateway::Gateway, jobs::job_funcs::init_scheduler::task_init,
    routers::main_router::build_router,
};

use super::{config::AppConfig, state::ServerState};

pub async fn server_init_proc(start: tokio::time::Instant) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    let gateway = Gateway::connect(&config.gateway).await?;

    let state = Arc::new(
        ServerState::builder()
            .app_name_version(format!(
                "{} {}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .server_start_time(start)
            .gateway(gateway)
            .gallery_config(config.gallery)
            .secure_cookies(config.server.secure_cookies)
            .build()?,
    );

    task_init(Arc::clone(&state)).await?;

    let listener = tokio::net::TcpListener::bind(config.server.bind_addr()).await?;

    info!(
        addr = %config.server.bind_addr(),
        page_size = config.gallery.page_size,
        elapsed = ?start.elapsed(),
        "Backend server starting..."
    );

    axum::serve(
        listener,
        build_router(Arc::clone(&state)).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!(uptime = ?state.get_uptime(), "Server stopped; shutting down gateway");
    if let Err(e) = state.gateway().shutdown().await {
        error!(error = %e, "Gateway shutdown failed");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
