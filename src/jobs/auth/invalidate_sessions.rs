use std::sync::Arc;

use tracing::info;

use crate::{init::state::ServerState, util::time::now::tokio_now};

pub async fn invalidate_sessions(state: Arc<ServerState>) {
    let start = tokio_now();
    let (pruned, remaining) = state.purge_expired_sessions().await;

    if pruned > 0 {
        info!(
            pruned,
            remaining,
            elapsed = ?start.elapsed(),
            "Invalidated expired sessions"
        );
    }
}
