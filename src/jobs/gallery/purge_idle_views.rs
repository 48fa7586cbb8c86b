use std::sync::Arc;

use tracing::info;

use crate::{init::state::ServerState, util::time::now::tokio_now};

pub async fn purge_idle_views(state: Arc<ServerState>) {
    let start = tokio_now();
    let (pruned, remaining) = state.purge_idle_views().await;

    if pruned > 0 {
        info!(
            pruned,
            remaining,
            elapsed = ?start.elapsed(),
            "Purged idle gallery views"
        );
    }
}
