use ticketing_db::PgPool;
use ticketing_notify::NotificationQueue;

/// Load notifications that are `pending` and due but not currently queued
/// (a missed `try_send`, or recovery after a restart) and nudge a worker for
/// each. Runs every 1 minute.
pub async fn process_pending_notifications(pool: &PgPool, queue: &NotificationQueue) -> anyhow::Result<()> {
    let count = queue.sweep(pool).await?;
    if count > 0 {
        tracing::debug!(count, "swept pending notifications");
    }
    Ok(())
}
