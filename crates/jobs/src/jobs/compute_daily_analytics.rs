use chrono::{Duration, Utc};
use ticketing_core::analytics::compute_daily_analytics as compute;
use ticketing_db::PgPool;

/// Aggregate yesterday's booking activity into `BookingAnalytics` and
/// `RouteAnalytics`. Runs daily at 03:00 local. Idempotent: reruns upsert the
/// same date.
pub async fn compute_daily_analytics(pool: &PgPool) -> anyhow::Result<()> {
    let yesterday = (Utc::now() - Duration::days(1)).date_naive();
    compute(pool, yesterday).await?;
    Ok(())
}
