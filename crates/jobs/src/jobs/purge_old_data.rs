use chrono::{Duration, Utc};
use ticketing_db::{queries, PgPool};

const NOTIFICATION_RETENTION_DAYS: i64 = 90;
const WEBHOOK_LOG_RETENTION_DAYS: i64 = 180;

/// Delete terminal-state notifications older than 90 days and
/// processed/duplicate webhook logs older than 180 days. Runs daily at 03:00
/// local.
pub async fn purge_old_data(pool: &PgPool) -> anyhow::Result<()> {
    let notification_cutoff = Utc::now() - Duration::days(NOTIFICATION_RETENTION_DAYS);
    let webhook_cutoff = Utc::now() - Duration::days(WEBHOOK_LOG_RETENTION_DAYS);

    let deleted_notifications = queries::notifications::purge_older_than(pool, notification_cutoff).await?;
    let deleted_logs = queries::webhook_logs::purge_older_than(pool, webhook_cutoff).await?;

    if deleted_notifications > 0 || deleted_logs > 0 {
        tracing::info!(deleted_notifications, deleted_logs, "purged old data");
    }

    Ok(())
}
