use crate::models::Notification;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Notification>> {
    let notification = sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(notification)
}

#[allow(clippy::too_many_arguments)]
pub async fn create(
    pool: &PgPool,
    booking_id: Option<Uuid>,
    passenger_id: Option<Uuid>,
    notification_type: &str,
    channel: &str,
    recipient: &str,
    payload: &Value,
) -> Result<Notification> {
    let notification = sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (booking_id, passenger_id, notification_type, channel, recipient, payload, status)
        VALUES ($1, $2, $3, $4, $5, $6, 'pending')
        RETURNING *
        "#,
    )
    .bind(booking_id)
    .bind(passenger_id)
    .bind(notification_type)
    .bind(channel)
    .bind(recipient)
    .bind(payload)
    .fetch_one(pool)
    .await?;

    Ok(notification)
}

/// Rows left `pending` (or due for retry) from a prior process lifetime,
/// picked up by `ProcessPendingNotifications` and by the queue's own
/// startup sweep.
pub async fn list_due(pool: &PgPool, now: DateTime<Utc>, limit: i64) -> Result<Vec<Notification>> {
    let notifications = sqlx::query_as::<_, Notification>(
        r#"
        SELECT * FROM notifications
        WHERE status = 'pending'
          AND (next_attempt_at IS NULL OR next_attempt_at <= $1)
        ORDER BY created_at ASC
        LIMIT $2
        "#,
    )
    .bind(now)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(notifications)
}

pub async fn mark_sent(pool: &PgPool, id: Uuid) -> Result<()> {
    sqlx::query("UPDATE notifications SET status = 'sent', sent_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn mark_retry(
    pool: &PgPool,
    id: Uuid,
    retry_count: i32,
    next_attempt_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE notifications
        SET retry_count = $2, next_attempt_at = $3
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(retry_count)
    .bind(next_attempt_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn mark_failed(pool: &PgPool, id: Uuid) -> Result<()> {
    sqlx::query("UPDATE notifications SET status = 'failed' WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete terminal (sent/failed) notifications older than the retention
/// window, for `PurgeOldData`.
pub async fn purge_older_than(pool: &PgPool, before: DateTime<Utc>) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM notifications
        WHERE created_at < $1 AND status IN ('sent', 'failed')
        "#,
    )
    .bind(before)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Notifications of a given type already existing for a passenger, used by
/// `SendTripReminders` to avoid creating duplicate reminders. Keyed by
/// passenger rather than booking, since a booking can carry several
/// passengers each needing their own reminder.
pub async fn exists_for_passenger_and_type(
    pool: &PgPool,
    passenger_id: Uuid,
    notification_type: &str,
) -> Result<bool> {
    let (exists,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM notifications
            WHERE passenger_id = $1 AND notification_type = $2
        )
        "#,
    )
    .bind(passenger_id)
    .bind(notification_type)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}
