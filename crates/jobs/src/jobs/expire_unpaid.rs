use chrono::Utc;
use serde_json::json;
use ticketing_core::payment::retry_failed_webhook;
use ticketing_db::{queries, PgPool};
use ticketing_notify::NotificationQueue;
use ticketing_types::enums::{BookingStatus, NotificationChannel, NotificationType};

const WEBHOOK_RETRY_CEILING: i32 = 10;

/// For each pending booking past its payment deadline: transition to
/// `expired` and enqueue a `booking_expired` notification. Runs every 5
/// minutes.
///
/// Also drives the secondary reprocessing pass for webhook events that
/// failed to apply on first delivery.
pub async fn expire_unpaid_bookings(pool: &PgPool, queue: &NotificationQueue) -> anyhow::Result<()> {
    let now = Utc::now();
    let expired = queries::bookings::find_expired_pending(pool, now).await?;

    if !expired.is_empty() {
        tracing::info!(count = expired.len(), "expiring unpaid bookings");
    }

    for booking in expired {
        let mut tx = match pool.begin().await {
            Ok(tx) => tx,
            Err(error) => {
                tracing::error!(booking_id = %booking.id, %error, "failed to open transaction for expiry");
                continue;
            }
        };

        if let Err(error) = queries::bookings::set_status(&mut tx, booking.id, BookingStatus::Expired.as_str()).await {
            tracing::error!(booking_id = %booking.id, %error, "failed to mark booking expired");
            continue;
        }

        if let Err(error) = tx.commit().await {
            tracing::error!(booking_id = %booking.id, %error, "failed to commit booking expiry");
            continue;
        }

        let payload = json!({ "booking_reference": booking.booking_reference });
        if let Err(error) = queue
            .enqueue(
                pool,
                Some(booking.id),
                None,
                NotificationType::BookingExpired,
                NotificationChannel::Email,
                &booking.contact_email,
                payload,
            )
            .await
        {
            tracing::error!(booking_id = %booking.id, %error, "failed to enqueue expiry notification");
        }
    }

    // Payment links left dangling past their own TTL (the link expired
    // before the booking's own deadline, or the booking deadline never
    // fired because the payment was already failing) are marked failed so
    // they stop showing up as actionable.
    match queries::payments::find_expired_pending(pool, now).await {
        Ok(stale) => {
            for payment in stale {
                if let Err(error) = queries::payments::mark_failed(pool, payment.id).await {
                    tracing::error!(payment_id = %payment.id, %error, "failed to mark stale payment failed");
                }
            }
        }
        Err(error) => tracing::error!(%error, "failed to list expired pending payments"),
    }

    match queries::webhook_logs::find_failed_for_retry(pool, WEBHOOK_RETRY_CEILING).await {
        Ok(logs) => {
            for log in logs {
                if let Err(error) = retry_failed_webhook(pool, queue, &log).await {
                    tracing::warn!(webhook_log_id = %log.id, %error, "failed webhook retry did not apply");
                }
            }
        }
        Err(error) => tracing::error!(%error, "failed to list webhook logs for retry"),
    }

    Ok(())
}
