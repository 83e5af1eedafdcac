use actix_web::web;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::AppState;

const LIMITER_EVICTION_SECS: u64 = 10 * 60;

/// Periodically registers stored objects that have no database record.
pub async fn start_sync_task(state: web::Data<AppState>, every: Duration) {
    let mut interval = interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        match state.sync_handler.run_sweep().await {
            Ok(report) if report.added > 0 || report.failed > 0 => tracing::info!(
                added = report.added,
                skipped = report.skipped,
                failed = report.failed,
                "Scheduled storage sync finished"
            ),
            Ok(_) => tracing::debug!("Scheduled storage sync found nothing new"),
            Err(e) => tracing::error!("Scheduled storage sync failed: {}", e),
        }
    }
}

/// Drops rate limiter entries whose windows have gone quiet.
pub async fn start_limiter_eviction(state: web::Data<AppState>) {
    let mut interval = interval(Duration::from_secs(LIMITER_EVICTION_SECS));

    loop {
        interval.tick().await;

        let evicted = state.ai_limiter.evict_stale() + state.contact_limiter.evict_stale();
        if evicted > 0 {
            tracing::debug!("Evicted {} idle rate limiter entries", evicted);
        }
    }
}
