//! Secondary reprocessing pass for webhook events that failed to apply the
//! first time (payment not yet created when the event arrived, a transient
//! database error, etc). Only events whose signature already checked out are
//! retried; a signature failure is permanent.

use ticketing_db::models::PaymentWebhookLog;
use ticketing_db::{queries, PgPool};
use ticketing_notify::NotificationQueue;
use ticketing_types::enums::{BookingPaymentStatus, PaymentOutcome, PaymentStatus, WebhookProcessedStatus};
use ticketing_types::{AppError, Result};

use crate::booking::confirm_booking;

/// Re-attempt classification and application for one previously failed
/// webhook log, using the payload captured on first delivery. Bumps
/// `retry_count` regardless of outcome so the caller's retry ceiling check
/// (`processed_status = 'failed' AND retry_count < N`) eventually stops
/// retrying a permanently unresolvable event.
pub async fn retry_failed_webhook(pool: &PgPool, queue: &NotificationQueue, log: &PaymentWebhookLog) -> Result<()> {
    if !log.signature_valid {
        return Ok(());
    }

    let order_code = log.raw_payload.get("order_code").and_then(serde_json::Value::as_str);
    let gateway_status = log
        .raw_payload
        .get("status")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("UNKNOWN");

    let Some(order_code) = order_code else {
        queries::webhook_logs::increment_retry(pool, log.id)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        return Ok(());
    };

    let mut tx = pool.begin().await.map_err(AppError::Database)?;
    let payment = queries::payments::find_by_order_code(&mut tx, order_code)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let Some(payment) = payment else {
        tx.rollback().await.ok();
        queries::webhook_logs::increment_retry(pool, log.id)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        return Ok(());
    };

    let outcome = PaymentOutcome::from_gateway_status(gateway_status);

    match outcome {
        PaymentOutcome::Success => {
            queries::payments::set_status(&mut tx, payment.id, PaymentStatus::Completed.as_str(), None)
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;
            queries::bookings::set_payment_status(
                &mut tx,
                payment.booking_id,
                BookingPaymentStatus::Completed.as_str(),
            )
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
            tx.commit().await.map_err(AppError::Database)?;

            if let Err(error) = confirm_booking(pool, queue, payment.booking_id).await {
                tracing::warn!(booking_id = %payment.booking_id, %error, "payment settled but booking confirmation did not apply");
            }

            queries::webhook_logs::finalize(
                pool,
                log.id,
                WebhookProcessedStatus::Processed.as_str(),
                Some(payment.id),
            )
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        }
        PaymentOutcome::Failed | PaymentOutcome::Cancelled | PaymentOutcome::Expired => {
            queries::payments::set_status(&mut tx, payment.id, PaymentStatus::Failed.as_str(), None)
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;
            queries::bookings::set_payment_status(
                &mut tx,
                payment.booking_id,
                BookingPaymentStatus::Failed.as_str(),
            )
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
            tx.commit().await.map_err(AppError::Database)?;

            queries::webhook_logs::finalize(
                pool,
                log.id,
                WebhookProcessedStatus::Processed.as_str(),
                Some(payment.id),
            )
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        }
        PaymentOutcome::Pending | PaymentOutcome::Unknown => {
            tx.rollback().await.ok();
            queries::webhook_logs::increment_retry(pool, log.id)
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;
        }
    }

    Ok(())
}
