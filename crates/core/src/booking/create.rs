use chrono::{Duration as ChronoDuration, Utc};
use std::collections::HashSet;
use std::time::Duration;
use ticketing_db::{queries, PgPool};
use ticketing_types::money::seat_price_minor_units;
use ticketing_types::{AppError, Result};
use uuid::Uuid;

use crate::availability::all_available_for_session;
use crate::reference::{generate_booking_reference, generate_ticket_number, qr_payload};

pub struct PassengerInput {
    pub seat_id: Uuid,
    pub full_name: String,
    pub document_id: Option<String>,
}

/// Create a booking against the seats the session currently holds. Every
/// seat in `passengers` must be one the session holds (or that is otherwise
/// still available to it) on `trip_id`; any mismatch is rejected rather than
/// silently booking a subset. Issues one ticket per passenger and clears the
/// session's holds as part of the same transaction — they are subsumed by
/// the concrete passenger/ticket rows, not attached to the booking.
#[allow(clippy::too_many_arguments)]
pub async fn create_booking(
    pool: &PgPool,
    trip_id: Uuid,
    session_id: &str,
    passengers: Vec<PassengerInput>,
    user_id: Option<Uuid>,
    contact_name: &str,
    contact_email: &str,
    contact_phone: Option<&str>,
    booking_expiry: Duration,
) -> Result<ticketing_db::models::Booking> {
    if passengers.is_empty() {
        return Err(AppError::InvalidInput("at least one passenger is required".to_string()));
    }

    let mut seen_seat_ids = HashSet::with_capacity(passengers.len());
    for passenger in &passengers {
        if !seen_seat_ids.insert(passenger.seat_id) {
            return Err(AppError::InvalidInput(format!(
                "seat {} was requested for more than one passenger",
                passenger.seat_id
            )));
        }
    }

    let mut tx = pool.begin().await.map_err(AppError::Database)?;

    let trip = queries::trips::find_by_id_for_update(&mut tx, trip_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("trip not found".to_string()))?;

    let route: (String, String) = sqlx::query_as("SELECT origin, destination FROM routes WHERE id = $1")
        .bind(trip.route_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;

    let holds = queries::reservations::find_by_session(&mut tx, session_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if holds.is_empty() {
        return Err(AppError::InvalidInput("no active seat hold for this session".to_string()));
    }
    if holds.iter().any(|h| h.trip_id != trip_id) {
        return Err(AppError::InvalidInput("hold does not belong to this trip".to_string()));
    }

    let held_seat_ids: HashSet<Uuid> = holds.iter().map(|h| h.seat_id).collect();
    let passenger_seat_ids: HashSet<Uuid> = passengers.iter().map(|p| p.seat_id).collect();
    if held_seat_ids != passenger_seat_ids {
        return Err(AppError::InvalidInput(
            "passenger seats must exactly match the session's held seats".to_string(),
        ));
    }

    let booking_reference = generate_booking_reference();
    let expires_at = Utc::now() + ChronoDuration::from_std(booking_expiry).unwrap_or_default();
    let total_seats = passengers.len() as i32;

    // Price every seat before creating the booking so total_amount is known
    // up front.
    let mut priced = Vec::with_capacity(passengers.len());
    let mut total_amount_minor_units: i64 = 0;
    for passenger in passengers {
        let seat = queries::seats::find_by_id_in_tx(&mut tx, passenger.seat_id)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("seat {} not found", passenger.seat_id)))?;

        let price = seat_price_minor_units(trip.base_fare_minor_units, seat.price_multiplier);
        total_amount_minor_units += price;
        priced.push((passenger, seat, price));
    }

    let booking = queries::bookings::create(
        &mut tx,
        trip_id,
        &booking_reference,
        user_id,
        contact_name,
        total_seats,
        total_amount_minor_units,
        &trip.currency,
        contact_email,
        contact_phone,
        user_id.is_none(),
        expires_at,
    )
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?;

    for (index, (passenger, seat, price)) in priced.into_iter().enumerate() {
        let created = queries::passengers::create(
            &mut tx,
            booking.id,
            passenger.seat_id,
            &passenger.full_name,
            passenger.document_id.as_deref(),
            price,
        )
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

        let ticket_number = generate_ticket_number(&booking.booking_reference, (index + 1) as u32);
        let payload = qr_payload(
            &ticket_number,
            &booking.booking_reference,
            &passenger.full_name,
            &route.0,
            &route.1,
            &seat.seat_number,
            trip.departure_time,
        );

        queries::tickets::create(
            &mut tx,
            booking.id,
            created.id,
            passenger.seat_id,
            &ticket_number,
            &payload,
        )
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    }

    queries::reservations::release_in_tx(&mut tx, session_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tx.commit().await.map_err(AppError::Database)?;

    tracing::info!(booking_id = %booking.id, reference = %booking.booking_reference, "booking created");

    Ok(booking)
}

/// Whether `seat_ids` are all still bookable by `session_id` on `trip_id` —
/// either genuinely available or already held by this same session. Used by
/// handlers to give a fast client-facing check before attempting a hold.
pub async fn seats_available_for_session(
    pool: &PgPool,
    trip_id: Uuid,
    seat_ids: &[Uuid],
    session_id: &str,
) -> Result<bool> {
    let views = crate::availability::resolve_trip_availability(pool, trip_id).await?;
    Ok(all_available_for_session(&views, seat_ids, session_id))
}
