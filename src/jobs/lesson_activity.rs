// ==================== LESSON ACTIVITY REFRESH ====================
// Keeps the stored `isActive` flag in line with the lesson start time so
// clients that read the flag directly stop offering lessons that began.

use crate::{services::lesson_service, store::SharedStore, utils::schedule_time};
use tokio::time::{interval, Duration};

/// Spawns the refresh loop. Runs once on startup, then every `every_secs`.
pub fn start_lesson_activity_refresh(store: SharedStore, every_secs: u64) {
    log::info!("📅 Starting lesson activity refresh (every {}s)", every_secs);

    tokio::spawn(async move {
        // The first tick completes immediately
        let mut interval = interval(Duration::from_secs(every_secs.max(1)));

        loop {
            interval.tick().await;

            match lesson_service::refresh_activity(store.as_ref(), schedule_time::now_local()).await {
                Ok(0) => log::debug!("⏰ Lesson activity unchanged"),
                Ok(changed) => log::info!("✅ Lesson activity refreshed: {} lessons updated", changed),
                Err(e) => log::error!("❌ Lesson activity refresh failed: {}", e),
            }
        }
    });
}
