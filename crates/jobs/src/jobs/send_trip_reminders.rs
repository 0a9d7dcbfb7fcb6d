use chrono::{Duration, Utc};
use serde_json::json;
use ticketing_db::{queries, PgPool};
use ticketing_notify::NotificationQueue;
use ticketing_types::enums::{NotificationChannel, NotificationType, TripStatus};

/// For trips departing in the next [23h, 24h) that are still `scheduled`,
/// send one reminder per confirmed passenger that hasn't already received
/// one. Dedup is per-passenger, not per-booking, since a booking can carry
/// several passengers and each needs their own reminder. Idempotence comes
/// from the "not already existing" check, so re-running this job within the
/// same hour is harmless. Runs hourly.
pub async fn send_trip_reminders(pool: &PgPool, queue: &NotificationQueue) -> anyhow::Result<()> {
    let now = Utc::now();
    let window_start = now + Duration::hours(23);
    let window_end = now + Duration::hours(24);

    let trips = queries::trips::list_departing_within(pool, window_start, window_end).await?;
    let trips: Vec<_> = trips
        .into_iter()
        .filter(|trip| trip.status == TripStatus::Scheduled.as_str())
        .collect();

    if trips.is_empty() {
        return Ok(());
    }

    let trip_ids: Vec<_> = trips.iter().map(|trip| trip.id).collect();
    let bookings = queries::bookings::find_confirmed_for_trips(pool, &trip_ids).await?;

    for booking in bookings {
        let passengers = queries::passengers::list_for_booking(pool, booking.id).await?;
        let trip = trips.iter().find(|trip| trip.id == booking.trip_id);
        let departure_time = trip.map(|trip| trip.departure_time.to_rfc3339()).unwrap_or_default();

        for passenger in passengers {
            let already_sent = queries::notifications::exists_for_passenger_and_type(
                pool,
                passenger.id,
                NotificationType::TripReminder.as_str(),
            )
            .await?;
            if already_sent {
                continue;
            }

            let payload = json!({
                "booking_reference": booking.booking_reference,
                "passenger_name": passenger.full_name,
                "departure_time": departure_time,
            });

            if let Err(error) = queue
                .enqueue(
                    pool,
                    Some(booking.id),
                    Some(passenger.id),
                    NotificationType::TripReminder,
                    NotificationChannel::Email,
                    &booking.contact_email,
                    payload,
                )
                .await
            {
                tracing::error!(passenger_id = %passenger.id, %error, "failed to enqueue trip reminder");
            }
        }
    }

    Ok(())
}
