use std::sync::Arc;

use anyhow::{Result, anyhow};
use chrono::{Timelike, Utc};
use tracing::{debug, error};

use crate::init::state::ServerState;

/// Next UTC instant at `second_offset` seconds and `millisecond_offset` milliseconds past a
/// minute boundary that is strictly later than `now`.
pub fn next_scheduled_mark(
    now: chrono::DateTime<chrono::Utc>,
    second_offset: u32,
    millisecond_offset: u32,
) -> Result<chrono::DateTime<chrono::Utc>> {
    let truncated_to_minute = now
        .with_second(0)
        .and_then(|dt| dt.with_nanosecond(0))
        .ok_or_else(|| anyhow!("Could not truncate to minute."))?;

    let mut target_time = truncated_to_minute
        + chrono::Duration::seconds(second_offset as i64)
        + chrono::Duration::milliseconds(millisecond_offset as i64);

    if target_time <= now {
        target_time += chrono::Duration::seconds(60);
    }

    Ok(target_time)
}

pub fn next_scheduled_delay(
    task_descriptor: &str,
    second_offset: u32,
    millisecond_offset: u32,
) -> Result<(tokio::time::Duration, String)> {
    let now = Utc::now();
    let next_mark = next_scheduled_mark(now, second_offset, millisecond_offset)?;

    let delay = (next_mark - now).to_std().map_err(|e| {
        anyhow!(
            "Could not schedule job at next_scheduled_mark(). Chrono->Std error: {:?}",
            e
        )
    })?;

    let schedule_msg = format!(
        "Task '{}' will run at {} (in {:?})",
        task_descriptor,
        next_mark.format("%H:%M:%S%.3f"),
        delay
    );

    Ok((delay, schedule_msg))
}

/// Runs `task` once per minute at a fixed second+millisecond offset.
pub async fn schedule_task_every_minute_at<F, Fut>(
    state: Arc<ServerState>,
    task: F,
    task_descriptor: String,
    second_offset: u32,
    millisecond_offset: u32,
) -> Result<()>
where
    F: Fn(Arc<ServerState>) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    loop {
        let (delay, schedule_message) =
            match next_scheduled_delay(&task_descriptor, second_offset, millisecond_offset) {
                Ok((d, m)) => (d, m),
                Err(e) => {
                    error!(
                        "Could not calculate next scheduled time for {}: {:?}",
                        task_descriptor, e
                    );
                    tokio::time::sleep(std::time::Duration::from_secs(10)).await;
                    continue;
                }
            };

        debug!("{}", schedule_message);

        tokio::time::sleep(delay).await;

        task(Arc::clone(&state)).await;
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn mark_later_in_the_same_minute() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 10, 15, 5).unwrap();
        let mark = next_scheduled_mark(now, 30, 0).unwrap();
        assert_eq!(mark, Utc.with_ymd_and_hms(2025, 3, 1, 10, 15, 30).unwrap());
    }

    #[test]
    fn mark_rolls_over_to_the_next_minute() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 10, 59, 45).unwrap();
        let mark = next_scheduled_mark(now, 30, 0).unwrap();
        assert_eq!(mark, Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 30).unwrap());

        // exactly on the mark is already too late
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 10, 15, 30).unwrap();
        let mark = next_scheduled_mark(now, 30, 0).unwrap();
        assert_eq!(mark, Utc.with_ymd_and_hms(2025, 3, 1, 10, 16, 30).unwrap());
    }
}
