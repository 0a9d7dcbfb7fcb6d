use crate::models::Payment;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Insert the payment row as `pending` with no provider link yet. The link
/// is attached separately via `attach_link` once the gateway call succeeds,
/// so a gateway failure leaves a `pending` row with no link rather than no
/// row at all — the booking's payment attempt is still visible and can be
/// retried or expired on schedule.
pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
    external_order_code: &str,
    amount_minor_units: i64,
    currency: &str,
    expires_at: DateTime<Utc>,
) -> Result<Payment> {
    let payment = sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO payments (
            booking_id, external_order_code, amount_minor_units, currency,
            status, expires_at
        )
        VALUES ($1, $2, $3, $4, 'pending', $5)
        RETURNING *
        "#,
    )
    .bind(booking_id)
    .bind(external_order_code)
    .bind(amount_minor_units)
    .bind(currency)
    .bind(expires_at)
    .fetch_one(&mut **tx)
    .await?;

    Ok(payment)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(payment)
}

pub async fn find_by_order_code(
    tx: &mut Transaction<'_, Postgres>,
    external_order_code: &str,
) -> Result<Option<Payment>> {
    let payment = sqlx::query_as::<_, Payment>(
        "SELECT * FROM payments WHERE external_order_code = $1 FOR UPDATE",
    )
    .bind(external_order_code)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(payment)
}

/// Record the gateway's reference and link once the provider call succeeds.
/// Status stays `pending` — this only fills in the fields the provider call
/// produced.
pub async fn attach_link(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    provider_reference: &str,
    payment_link_url: &str,
) -> Result<Payment> {
    let payment = sqlx::query_as::<_, Payment>(
        r#"
        UPDATE payments
        SET provider_reference = $2,
            payment_link_url = $3,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(provider_reference)
    .bind(payment_link_url)
    .fetch_one(&mut **tx)
    .await?;

    Ok(payment)
}

pub async fn set_status(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    status: &str,
    provider_reference: Option<&str>,
) -> Result<Payment> {
    let payment = sqlx::query_as::<_, Payment>(
        r#"
        UPDATE payments
        SET status = $2,
            provider_reference = COALESCE($3, provider_reference),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(provider_reference)
    .fetch_one(&mut **tx)
    .await?;

    Ok(payment)
}

/// Payments still `pending` past their link expiry, for the scheduler to
/// mark `failed` so a stale link can't be paid against after the fact.
pub async fn find_expired_pending(pool: &PgPool, before: DateTime<Utc>) -> Result<Vec<Payment>> {
    let payments = sqlx::query_as::<_, Payment>(
        "SELECT * FROM payments WHERE status = 'pending' AND expires_at <= $1",
    )
    .bind(before)
    .fetch_all(pool)
    .await?;

    Ok(payments)
}

pub async fn mark_failed(pool: &PgPool, id: Uuid) -> Result<()> {
    sqlx::query("UPDATE payments SET status = 'failed', updated_at = NOW() WHERE id = $1 AND status = 'pending'")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
