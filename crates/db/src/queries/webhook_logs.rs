use crate::models::PaymentWebhookLog;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Dedupe check: has an event of this `(external_order_code, event_type)`
/// already been applied? Checked after inserting the new audit row, rather
/// than relying on a `provider_event_id` uniqueness constraint, since a
/// redelivery of an event that failed to apply the first time must be
/// retried, not permanently misclassified as a duplicate just because the
/// gateway reused (or varied) its event id.
pub async fn find_processed(
    pool: &PgPool,
    external_order_code: &str,
    event_type: &str,
) -> Result<Option<PaymentWebhookLog>> {
    let log = sqlx::query_as::<_, PaymentWebhookLog>(
        r#"
        SELECT * FROM payment_webhook_logs
        WHERE external_order_code = $1 AND event_type = $2 AND processed_status = 'processed'
        ORDER BY received_at DESC
        LIMIT 1
        "#,
    )
    .bind(external_order_code)
    .bind(event_type)
    .fetch_optional(pool)
    .await?;

    Ok(log)
}

/// Insert the raw event unconditionally; the caller checks `find_processed`
/// afterward and finalizes this row as `duplicate` if it turns out to be one.
pub async fn insert(
    pool: &PgPool,
    payment_id: Option<Uuid>,
    external_order_code: &str,
    event_type: &str,
    provider_event_id: &str,
    raw_payload: &Value,
) -> Result<PaymentWebhookLog> {
    let log = sqlx::query_as::<_, PaymentWebhookLog>(
        r#"
        INSERT INTO payment_webhook_logs (
            payment_id, external_order_code, event_type, provider_event_id,
            raw_payload, signature_valid, processed_status
        )
        VALUES ($1, $2, $3, $4, $5, false, 'pending')
        RETURNING *
        "#,
    )
    .bind(payment_id)
    .bind(external_order_code)
    .bind(event_type)
    .bind(provider_event_id)
    .bind(raw_payload)
    .fetch_one(pool)
    .await?;

    Ok(log)
}

pub async fn mark_signature_checked(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    signature_valid: bool,
) -> Result<()> {
    sqlx::query("UPDATE payment_webhook_logs SET signature_valid = $2 WHERE id = $1")
        .bind(id)
        .bind(signature_valid)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

pub async fn finalize(
    pool: &PgPool,
    id: Uuid,
    processed_status: &str,
    payment_id: Option<Uuid>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE payment_webhook_logs
        SET processed_status = $2,
            payment_id = COALESCE($3, payment_id),
            processed_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(processed_status)
    .bind(payment_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Failed events under the retry ceiling, picked up by the secondary
/// reprocessing pass inside `ExpireUnpaidBookings`.
pub async fn find_failed_for_retry(pool: &PgPool, retry_ceiling: i32) -> Result<Vec<PaymentWebhookLog>> {
    let logs = sqlx::query_as::<_, PaymentWebhookLog>(
        r#"
        SELECT * FROM payment_webhook_logs
        WHERE processed_status = 'failed' AND retry_count < $1
        ORDER BY received_at ASC
        "#,
    )
    .bind(retry_ceiling)
    .fetch_all(pool)
    .await?;

    Ok(logs)
}

pub async fn increment_retry(pool: &PgPool, id: Uuid) -> Result<()> {
    sqlx::query("UPDATE payment_webhook_logs SET retry_count = retry_count + 1 WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete processed/duplicate logs older than the retention window.
pub async fn purge_older_than(pool: &PgPool, before: DateTime<Utc>) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM payment_webhook_logs
        WHERE received_at < $1 AND processed_status IN ('processed', 'duplicate')
        "#,
    )
    .bind(before)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
