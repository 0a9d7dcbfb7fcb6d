use chrono::Utc;
use ticketing_db::{queries, PgPool};
use ticketing_types::enums::{BookingStatus, SeatType};
use ticketing_types::money::seat_price_minor_units;
use ticketing_types::{AppError, Result};
use uuid::Uuid;

use crate::availability::{all_available_for_session, resolve_trip_availability};
use crate::reference::{generate_ticket_number, qr_payload};

/// How many hours before departure a confirmed booking may still be edited
/// (seat change, passenger info, adding a passenger). Configurable per
/// DESIGN.md's Open Question decision; this is the default applied when no
/// override is supplied.
pub const DEFAULT_MODIFICATION_CUTOFF_HOURS: i64 = 24;

async fn load_confirmed_booking_and_trip(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    booking_id: Uuid,
    modification_cutoff_hours: i64,
) -> Result<(ticketing_db::models::Booking, ticketing_db::models::Trip)> {
    let booking = queries::bookings::find_by_id_for_update(tx, booking_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("booking not found".to_string()))?;

    let status: BookingStatus = booking.status.parse().unwrap_or_default();
    if status != BookingStatus::Confirmed {
        return Err(AppError::InvalidBookingState(format!(
            "booking must be confirmed to modify, found {status:?}"
        )));
    }

    let trip = queries::trips::find_by_id_for_update(tx, booking.trip_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("trip not found".to_string()))?;

    let cutoff = trip.departure_time - chrono::Duration::hours(modification_cutoff_hours);
    if Utc::now() > cutoff {
        return Err(AppError::DeadlineExceeded(format!(
            "modification deadline has passed; bookings must be modified at least {modification_cutoff_hours} hours before departure"
        )));
    }

    Ok((booking, trip))
}

/// Move one passenger on a confirmed, not-yet-departed booking to a
/// different seat. The caller must hold `new_seat_id` under `session_id`
/// (via `ReservationManager::hold_seats`) or the seat must otherwise
/// currently resolve as available to that session; the hold is consumed as
/// part of the same transaction that reassigns the passenger, so the seat is
/// never briefly owned by neither. If the new seat's price differs from the
/// old one, the difference is recorded on the booking as an unsettled price
/// delta rather than charged or refunded automatically.
pub async fn modify_seat(
    pool: &PgPool,
    booking_id: Uuid,
    passenger_id: Uuid,
    session_id: &str,
    new_seat_id: Uuid,
    modification_cutoff_hours: i64,
) -> Result<ticketing_db::models::Booking> {
    let mut tx = pool.begin().await.map_err(AppError::Database)?;

    let (booking, trip) =
        load_confirmed_booking_and_trip(&mut tx, booking_id, modification_cutoff_hours).await?;

    let new_seat = queries::seats::find_by_id_in_tx(&mut tx, new_seat_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("seat not found".to_string()))?;

    let seat_type: SeatType = new_seat.seat_type.parse().unwrap_or_default();
    if !new_seat.bookable || seat_type.intrinsically_unbookable() {
        return Err(AppError::InvalidInput("new seat is not bookable".to_string()));
    }

    let views = resolve_trip_availability(pool, booking.trip_id).await?;
    if !all_available_for_session(&views, std::slice::from_ref(&new_seat_id), session_id) {
        return Err(AppError::SeatsUnavailable(format!(
            "seat {new_seat_id} is not available"
        )));
    }

    let passengers = queries::passengers::list_for_booking_in_tx(&mut tx, booking_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let passenger = passengers
        .iter()
        .find(|p| p.id == passenger_id)
        .ok_or_else(|| AppError::NotFound("passenger not found on this booking".to_string()))?;
    if passengers.iter().any(|p| p.id != passenger_id && p.seat_id == new_seat_id) {
        return Err(AppError::SeatsUnavailable(format!(
            "seat {new_seat_id} is already assigned on this booking"
        )));
    }

    let old_price = passenger.seat_price_minor_units;
    let new_price = seat_price_minor_units(trip.base_fare_minor_units, new_seat.price_multiplier);
    let delta = new_price - old_price;

    sqlx::query("UPDATE passengers SET seat_id = $2, seat_price_minor_units = $3 WHERE id = $1")
        .bind(passenger_id)
        .bind(new_seat.id)
        .bind(new_price)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

    sqlx::query("UPDATE tickets SET seat_id = $2 WHERE booking_id = $1 AND passenger_id = $3")
        .bind(booking_id)
        .bind(new_seat.id)
        .bind(passenger_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

    sqlx::query("UPDATE bookings SET total_amount_minor_units = total_amount_minor_units + $2, updated_at = NOW() WHERE id = $1")
        .bind(booking_id)
        .bind(delta)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

    if delta != 0 {
        queries::bookings::add_price_delta(&mut tx, booking_id, delta)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
    }

    queries::reservations::release_in_tx(&mut tx, session_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let updated = queries::bookings::find_by_id_for_update(&mut tx, booking_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("booking not found".to_string()))?;

    tx.commit().await.map_err(AppError::Database)?;

    tracing::info!(booking_id = %booking_id, passenger_id = %passenger_id, delta, "booking seat modified");

    Ok(updated)
}

/// Update a passenger's name and document on a confirmed, not-yet-departed
/// booking. No re-pricing happens here: seat and fare only change via
/// `modify_seat`.
pub async fn edit_passenger_info(
    pool: &PgPool,
    booking_id: Uuid,
    passenger_id: Uuid,
    full_name: &str,
    document_id: Option<&str>,
    modification_cutoff_hours: i64,
) -> Result<ticketing_db::models::Passenger> {
    let mut tx = pool.begin().await.map_err(AppError::Database)?;

    load_confirmed_booking_and_trip(&mut tx, booking_id, modification_cutoff_hours).await?;

    let passengers = queries::passengers::list_for_booking_in_tx(&mut tx, booking_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if !passengers.iter().any(|p| p.id == passenger_id) {
        return Err(AppError::NotFound("passenger not found on this booking".to_string()));
    }

    let updated = queries::passengers::update_info(&mut tx, passenger_id, full_name, document_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tx.commit().await.map_err(AppError::Database)?;

    tracing::info!(booking_id = %booking_id, passenger_id = %passenger_id, "passenger info updated");

    Ok(updated)
}

/// Add a new passenger (and a matching ticket) to a confirmed, not-yet-
/// departed booking. The target seat must be bookable and available to
/// `session_id` (either held by it or genuinely free), and must not already
/// be assigned to another passenger on this trip. Bumps `total_seats` and
/// `total_amount_minor_units` on the booking.
pub async fn add_passenger(
    pool: &PgPool,
    booking_id: Uuid,
    session_id: &str,
    seat_id: Uuid,
    full_name: &str,
    document_id: Option<&str>,
    modification_cutoff_hours: i64,
) -> Result<ticketing_db::models::Booking> {
    let mut tx = pool.begin().await.map_err(AppError::Database)?;

    let (booking, trip) =
        load_confirmed_booking_and_trip(&mut tx, booking_id, modification_cutoff_hours).await?;

    let seat = queries::seats::find_by_id_in_tx(&mut tx, seat_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("seat not found".to_string()))?;

    let seat_type: SeatType = seat.seat_type.parse().unwrap_or_default();
    if !seat.bookable || seat_type.intrinsically_unbookable() {
        return Err(AppError::InvalidInput("seat is not bookable".to_string()));
    }

    let views = resolve_trip_availability(pool, booking.trip_id).await?;
    if !all_available_for_session(&views, std::slice::from_ref(&seat_id), session_id) {
        return Err(AppError::SeatsUnavailable(format!("seat {seat_id} is not available")));
    }

    let existing_passengers = queries::passengers::list_for_booking_in_tx(&mut tx, booking_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    if existing_passengers.iter().any(|p| p.seat_id == seat_id) {
        return Err(AppError::SeatsUnavailable(format!(
            "seat {seat_id} is already assigned on this booking"
        )));
    }

    let route: (String, String) = sqlx::query_as("SELECT origin, destination FROM routes WHERE id = $1")
        .bind(trip.route_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::Database)?;

    let price = seat_price_minor_units(trip.base_fare_minor_units, seat.price_multiplier);

    let passenger = queries::passengers::create(&mut tx, booking_id, seat_id, full_name, document_id, price)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let ticket_number = generate_ticket_number(&booking.booking_reference, (existing_passengers.len() + 1) as u32);
    let payload = qr_payload(
        &ticket_number,
        &booking.booking_reference,
        full_name,
        &route.0,
        &route.1,
        &seat.seat_number,
        trip.departure_time,
    );

    queries::tickets::create(&mut tx, booking_id, passenger.id, seat_id, &ticket_number, &payload)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    queries::reservations::release_in_tx(&mut tx, session_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let updated = queries::bookings::add_seat_and_amount(&mut tx, booking_id, price)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tx.commit().await.map_err(AppError::Database)?;

    tracing::info!(booking_id = %booking_id, passenger_id = %passenger.id, "passenger added to booking");

    Ok(updated)
}
