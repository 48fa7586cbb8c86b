use std::sync::Arc;

use tracing::info;

use crate::{
    init::state::ServerState,
    jobs::{
        auth::invalidate_sessions::invalidate_sessions,
        gallery::purge_idle_views::purge_idle_views,
        job_funcs::every_minute::schedule_task_every_minute_at,
    },
};

pub async fn task_init(state: Arc<ServerState>) -> anyhow::Result<()> {
    info!("Task scheduler running...");

    let coroutine_state = Arc::clone(&state);
    tokio::spawn(async move {
        schedule_task_every_minute_at(
            coroutine_state,
            move |coroutine_state: Arc<ServerState>| async move {
                invalidate_sessions(coroutine_state).await
            },
            String::from("INVALIDATE_EXPIRED_SESSIONS"),
            0, // seconds
            0, // milliseconds
        )
        .await
    });

    let coroutine_state = Arc::clone(&state);
    tokio::spawn(async move {
        schedule_task_every_minute_at(
            coroutine_state,
            move |coroutine_state: Arc<ServerState>| async move {
                purge_idle_views(coroutine_state).await
            },
            String::from("PURGE_IDLE_GALLERY_VIEWS"),
            30,  // seconds
            0,   // milliseconds
        )
        .await
    });

    Ok(())
}
