use serde_json::json;
use ticketing_db::{queries, PgPool};
use ticketing_notify::NotificationQueue;
use ticketing_types::enums::{BookingStatus, NotificationChannel, NotificationType};
use ticketing_types::{AppError, Result};
use uuid::Uuid;

/// Move a booking from Pending to Confirmed once its payment has settled.
/// Tickets were already issued at booking creation; this only flips status,
/// stamps `confirmed_at`, and enqueues the confirmation/receipt/ticket
/// notifications. Idempotent: calling this twice on an already-confirmed
/// booking is a no-op rather than an error, since the payment webhook
/// pipeline may retry this step.
pub async fn confirm_booking(
    pool: &PgPool,
    queue: &NotificationQueue,
    booking_id: Uuid,
) -> Result<ticketing_db::models::Booking> {
    let mut tx = pool.begin().await.map_err(AppError::Database)?;

    let booking = queries::bookings::find_by_id_for_update(&mut tx, booking_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("booking not found".to_string()))?;

    let status: BookingStatus = booking.status.parse().unwrap_or_default();
    if status == BookingStatus::Confirmed {
        tx.rollback().await.ok();
        return Ok(booking);
    }
    if status.is_terminal() {
        return Err(AppError::InvalidBookingState(format!(
            "cannot confirm a booking in terminal state {status:?}"
        )));
    }

    let confirmed = queries::bookings::confirm(&mut tx, booking.id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tx.commit().await.map_err(AppError::Database)?;

    tracing::info!(booking_id = %booking_id, "booking confirmed, tickets now valid");

    let payload = json!({ "booking_reference": confirmed.booking_reference });

    if let Err(error) = queue
        .enqueue(
            pool,
            Some(confirmed.id),
            None,
            NotificationType::BookingConfirmation,
            NotificationChannel::Email,
            &confirmed.contact_email,
            payload.clone(),
        )
        .await
    {
        tracing::error!(booking_id = %booking_id, %error, "failed to enqueue booking confirmation");
    }

    if let Err(error) = queue
        .enqueue(
            pool,
            Some(confirmed.id),
            None,
            NotificationType::PaymentReceipt,
            NotificationChannel::Email,
            &confirmed.contact_email,
            payload.clone(),
        )
        .await
    {
        tracing::error!(booking_id = %booking_id, %error, "failed to enqueue payment receipt");
    }

    if let Err(error) = queue
        .enqueue(
            pool,
            Some(confirmed.id),
            None,
            NotificationType::TicketDelivery,
            NotificationChannel::Email,
            &confirmed.contact_email,
            payload.clone(),
        )
        .await
    {
        tracing::error!(booking_id = %booking_id, %error, "failed to enqueue ticket delivery");
    }

    if !confirmed.is_guest {
        let in_app_payload = json!({
            "booking_reference": confirmed.booking_reference,
            "message": format!("Booking {} is confirmed and your tickets are ready.", confirmed.booking_reference),
        });
        if let Err(error) = queue
            .enqueue(
                pool,
                Some(confirmed.id),
                None,
                NotificationType::InApp,
                NotificationChannel::InApp,
                &confirmed.contact_email,
                in_app_payload,
            )
            .await
        {
            tracing::error!(booking_id = %booking_id, %error, "failed to enqueue in-app confirmation mirror");
        }
    }

    Ok(confirmed)
}
