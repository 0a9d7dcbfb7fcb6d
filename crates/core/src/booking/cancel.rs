use chrono::Utc;
use ticketing_db::{queries, PgPool};
use ticketing_types::enums::BookingStatus;
use ticketing_types::{AppError, Result};
use uuid::Uuid;

/// How many hours before departure a booking may still be cancelled.
/// Configurable per DESIGN.md's Open Question decision; this is the default
/// applied when no override is supplied.
pub const DEFAULT_CANCELLATION_CUTOFF_HOURS: i64 = 2;

pub async fn cancel_booking(
    pool: &PgPool,
    booking_id: Uuid,
    cancellation_cutoff_hours: i64,
    cancellation_reason: Option<&str>,
) -> Result<ticketing_db::models::Booking> {
    let mut tx = pool.begin().await.map_err(AppError::Database)?;

    let booking = queries::bookings::find_by_id_for_update(&mut tx, booking_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("booking not found".to_string()))?;

    let status: BookingStatus = booking.status.parse().unwrap_or_default();
    if status.is_terminal() {
        return Err(AppError::InvalidBookingState(format!(
            "booking is already in terminal state {status:?}"
        )));
    }

    let trip = queries::trips::find_by_id_for_update(&mut tx, booking.trip_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("trip not found".to_string()))?;

    let cutoff = trip.departure_time - chrono::Duration::hours(cancellation_cutoff_hours);
    if Utc::now() > cutoff {
        return Err(AppError::DeadlineExceeded(format!(
            "cancellation deadline has passed; bookings must be cancelled at least {cancellation_cutoff_hours} hours before departure"
        )));
    }

    let cancelled = queries::bookings::cancel(&mut tx, booking_id, cancellation_reason)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tx.commit().await.map_err(AppError::Database)?;

    tracing::info!(booking_id = %booking_id, "booking cancelled");

    Ok(cancelled)
}
