use chrono::{Duration as ChronoDuration, Utc};
use serde_json::json;
use ticketing_db::models::Payment;
use ticketing_db::{queries, PgPool};
use ticketing_integrations::PaymentProvider;
use ticketing_notify::NotificationQueue;
use ticketing_types::{AppError, Result};
use uuid::Uuid;

use crate::payment::webhook::process_webhook;
use crate::reference::generate_order_code;

/// Payment links are honoured for 15 minutes, both by the gateway and by the
/// scheduler marking stale pending payments `failed` after this passes.
pub const PAYMENT_LINK_TTL_MINUTES: i64 = 15;

/// Create a payment link for a Pending booking. Fails if the booking is not
/// `pending`, and separately if it already has a completed payment attached,
/// since a booking is paid at most once (refund/retry flows create a new
/// booking rather than reopening this one). The payment row is inserted
/// `pending` before the gateway is ever called, so a gateway failure still
/// leaves an auditable attempt rather than silently discarding it.
pub async fn create_payment(
    pool: &PgPool,
    queue: &NotificationQueue,
    provider: &dyn PaymentProvider,
    booking_id: Uuid,
    mock_payments: bool,
) -> Result<Payment> {
    let booking = queries::bookings::find_by_id(pool, booking_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("booking not found".to_string()))?;

    if booking.status != "pending" {
        return Err(AppError::InvalidBookingState(format!(
            "cannot create a payment for a booking in state {}",
            booking.status
        )));
    }
    if booking.payment_status == "completed" {
        return Err(AppError::AlreadyPaid);
    }

    let order_code = generate_order_code();
    let expires_at = Utc::now() + ChronoDuration::minutes(PAYMENT_LINK_TTL_MINUTES);

    let mut tx = pool.begin().await.map_err(AppError::Database)?;
    let payment = queries::payments::create(
        &mut tx,
        booking_id,
        &order_code,
        booking.total_amount_minor_units,
        &booking.currency,
        expires_at,
    )
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?;
    tx.commit().await.map_err(AppError::Database)?;

    let link = match provider
        .create_payment_link(&order_code, booking.total_amount_minor_units, &booking.currency)
        .await
    {
        Ok(link) => link,
        Err(error) => {
            queries::payments::mark_failed(pool, payment.id)
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;
            return Err(AppError::ProviderError(error.to_string()));
        }
    };

    let mut tx = pool.begin().await.map_err(AppError::Database)?;
    let payment = queries::payments::attach_link(&mut tx, payment.id, &link.provider_reference, &link.payment_link_url)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    tx.commit().await.map_err(AppError::Database)?;

    tracing::info!(booking_id = %booking_id, order_code = %order_code, "payment link created");

    // Development convenience: synthesize and apply a successful webhook
    // inline instead of waiting on (or ever calling) the real gateway.
    if mock_payments {
        let mock_payload = json!({
            "order_code": order_code,
            "event_type": "payment.success",
            "status": "PAID",
        });
        let provider_event_id = format!("mock-{order_code}");
        let raw_body = serde_json::to_vec(&mock_payload).unwrap_or_default();
        if let Err(error) = process_webhook(
            pool,
            queue,
            provider,
            &provider_event_id,
            &raw_body,
            "mock-signature",
            mock_payload,
        )
        .await
        {
            tracing::error!(booking_id = %booking_id, %error, "mock payment auto-webhook failed to apply");
        }
    }

    Ok(payment)
}
