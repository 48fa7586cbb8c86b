use std::sync::atomic::AtomicU64;

use crate::{gateway::Gateway, init::config::GalleryConfig};

use super::server_state::ServerState;

#[derive(Default)]
pub struct ServerStateBuilder {
    app_name_version: Option<String>,
    server_start_time: Option<tokio::time::Instant>,
    gateway: Option<Gateway>,
    gallery_config: Option<GalleryConfig>,
    secure_cookies: Option<bool>,
}

impl ServerStateBuilder {
    pub fn app_name_version(mut self, app_name_version: String) -> Self {
        self.app_name_version = Some(app_name_version);
        self
    }

    pub fn server_start_time(mut self, server_start_time: tokio::time::Instant) -> Self {
        self.server_start_time = Some(server_start_time);
        self
    }

    pub fn gateway(mut self, gateway: Gateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn gallery_config(mut self, gallery_config: GalleryConfig) -> Self {
        self.gallery_config = Some(gallery_config);
        self
    }

    pub fn secure_cookies(mut self, secure_cookies: bool) -> Self {
        self.secure_cookies = Some(secure_cookies);
        self
    }

    pub fn build(self) -> anyhow::Result<ServerState> {
        Ok(ServerState {
            app_name_version: self
                .app_name_version
                .ok_or_else(|| anyhow::anyhow!("app_name_version is required"))?,
            server_start_time: self
                .server_start_time
                .ok_or_else(|| anyhow::anyhow!("server_start_time is required"))?,
            responses_handled: AtomicU64::new(0u64),
            gateway: self
                .gateway
                .ok_or_else(|| anyhow::anyhow!("gateway is required"))?,
            gallery_config: self.gallery_config.unwrap_or_default(),
            secure_cookies: self.secure_cookies.unwrap_or(true),
            session_map: scc::HashMap::new(),
            view_map: scc::HashMap::new(),
        })
    }
}
