//! Idempotent webhook processing. Every inbound event runs through the same
//! ordered pipeline: log, dedupe, verify signature, resolve the payment,
//! classify the outcome, apply it, finalize the audit row. Each step is a
//! short transaction of its own so a crash mid-pipeline leaves the log row
//! in a state the next delivery attempt (the gateway retries undelivered
//! webhooks) can resume from correctly rather than double-applying anything.

use serde_json::Value;
use ticketing_db::{queries, PgPool};
use ticketing_integrations::PaymentProvider;
use ticketing_notify::NotificationQueue;
use ticketing_types::enums::{BookingPaymentStatus, PaymentOutcome, PaymentStatus, WebhookProcessedStatus};
use ticketing_types::{AppError, Result};

use crate::booking::confirm_booking;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Applied(PaymentOutcome),
    Duplicate,
    SignatureInvalid,
}

pub async fn process_webhook(
    pool: &PgPool,
    queue: &NotificationQueue,
    provider: &dyn PaymentProvider,
    provider_event_id: &str,
    raw_body: &[u8],
    signature_header: &str,
    payload: Value,
) -> Result<WebhookOutcome> {
    // A payload missing either field can't be deduped or resolved to a
    // payment at all.
    let order_code = payload
        .get("order_code")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::InvalidInput("webhook payload missing order_code".to_string()))?
        .to_string();
    let event_type = payload
        .get("event_type")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();

    // Step 1: log unconditionally.
    let log = queries::webhook_logs::insert(pool, None, &order_code, &event_type, provider_event_id, &payload)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // Step 2: dedupe against any earlier log for this (order_code,
    // event_type) that already applied. A redelivery of an event that
    // failed to apply the first time is retried rather than permanently
    // misclassified as a duplicate.
    if queries::webhook_logs::find_processed(pool, &order_code, &event_type)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .is_some()
    {
        tracing::info!(order_code, event_type, "duplicate webhook event, ignoring");
        queries::webhook_logs::finalize(pool, log.id, WebhookProcessedStatus::Duplicate.as_str(), None)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        return Ok(WebhookOutcome::Duplicate);
    }

    // Step 3: verify signature.
    let signature_valid = provider.verify_webhook_signature(raw_body, signature_header);
    {
        let mut tx = pool.begin().await.map_err(AppError::Database)?;
        queries::webhook_logs::mark_signature_checked(&mut tx, log.id, signature_valid)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        tx.commit().await.map_err(AppError::Database)?;
    }

    if !signature_valid {
        tracing::warn!(provider_event_id, "webhook signature invalid");
        queries::webhook_logs::finalize(pool, log.id, WebhookProcessedStatus::Failed.as_str(), None)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        return Ok(WebhookOutcome::SignatureInvalid);
    }

    // Step 4: resolve the payment this event refers to.
    let gateway_status = payload
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("UNKNOWN");

    let mut tx = pool.begin().await.map_err(AppError::Database)?;
    let payment = queries::payments::find_by_order_code(&mut tx, &order_code)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let Some(payment) = payment else {
        tx.rollback().await.ok();
        tracing::warn!(order_code, "webhook refers to unknown order code");
        queries::webhook_logs::finalize(pool, log.id, WebhookProcessedStatus::Failed.as_str(), None)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        return Err(AppError::NotFound(format!("no payment for order code {order_code}")));
    };

    // Step 5: classify.
    let outcome = PaymentOutcome::from_gateway_status(gateway_status);

    // Step 6: apply.
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

            // The payment itself is settled regardless of what happens next:
            // a booking that already expired or was cancelled before this
            // (possibly late) webhook arrived can't be confirmed, but the
            // payment mutation above still stands for audit, and this event
            // is still fully processed rather than left pending retry.
            if let Err(error) = confirm_booking(pool, queue, payment.booking_id).await {
                tracing::warn!(booking_id = %payment.booking_id, %error, "payment settled but booking confirmation did not apply");
            }
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
        }
        PaymentOutcome::Pending | PaymentOutcome::Unknown => {
            tx.rollback().await.ok();
        }
    }

    // Step 7: finalize the audit row.
    queries::webhook_logs::finalize(
        pool,
        log.id,
        WebhookProcessedStatus::Processed.as_str(),
        Some(payment.id),
    )
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(WebhookOutcome::Applied(outcome))
}
