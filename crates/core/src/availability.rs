//! Seat Availability Resolver: for a given trip, classifies every seat on its
//! seat map as available, held, sold, or not bookable.

use std::collections::HashSet;
use ticketing_db::models::{Seat, Trip, Vehicle};
use ticketing_db::{queries, PgPool};
use ticketing_types::enums::SeatAvailability;
use ticketing_types::{AppError, Result};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SeatAvailabilityView {
    pub seat: Seat,
    pub availability: SeatAvailability,
    /// The session currently holding this seat, when `availability` is
    /// `Held`. Lets a caller treat "held by me" as available for a new hold
    /// or booking attempt against the same session.
    pub held_by_session: Option<String>,
}

/// Resolve every seat's availability for `trip_id`, read-only (no lock is
/// taken — callers that need a consistent snapshot before mutating run this
/// logic again inside their own `FOR UPDATE` transaction instead of reusing
/// this result).
pub async fn resolve_trip_availability(
    pool: &PgPool,
    trip_id: Uuid,
) -> Result<Vec<SeatAvailabilityView>> {
    let trip = queries::trips::find_by_id(pool, trip_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("trip not found".to_string()))?;

    let seats = seats_for_trip(pool, &trip).await?;

    let mut tx = pool.begin().await.map_err(AppError::Database)?;
    let sold: HashSet<Uuid> = queries::seats::sold_seat_ids_for_trip(&mut tx, trip_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .into_iter()
        .collect();
    let held: std::collections::HashMap<Uuid, String> =
        queries::reservations::active_holds_for_trip(&mut tx, trip_id)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .into_iter()
            .map(|h| (h.seat_id, h.session_id))
            .collect();
    tx.commit().await.map_err(AppError::Database)?;

    let views = seats
        .into_iter()
        .map(|seat| {
            let held_by_session = held.get(&seat.id).cloned();
            SeatAvailabilityView {
                availability: classify(&seat, &sold, &held),
                held_by_session,
                seat,
            }
        })
        .collect();

    Ok(views)
}

fn classify(seat: &Seat, sold: &HashSet<Uuid>, held: &std::collections::HashMap<Uuid, String>) -> SeatAvailability {
    let seat_type: ticketing_types::enums::SeatType = seat.seat_type.parse().unwrap_or_default();

    if !seat.bookable || seat_type.intrinsically_unbookable() {
        SeatAvailability::NotBookable
    } else if sold.contains(&seat.id) {
        SeatAvailability::Sold
    } else if held.contains_key(&seat.id) {
        SeatAvailability::Held
    } else {
        SeatAvailability::Available
    }
}

async fn seats_for_trip(pool: &PgPool, trip: &Trip) -> Result<Vec<Seat>> {
    let vehicle: Option<Vehicle> = sqlx::query_as("SELECT * FROM vehicles WHERE id = $1")
        .bind(trip.vehicle_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)?;
    let vehicle = vehicle.ok_or_else(|| {
        AppError::TripMisconfigured(format!("trip {} has no vehicle assigned", trip.id))
    })?;

    let seat_map = queries::seats::find_seat_map(pool, vehicle.seat_map_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| {
            AppError::TripMisconfigured(format!("vehicle {} has no seat map", vehicle.id))
        })?;

    let seats = queries::seats::list_seats_for_map(pool, seat_map.id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(seats)
}

/// True only when every seat in `seat_ids` currently resolves to
/// `Available`, or to `Held` by `session_id` itself, for this trip. Used by
/// the Reservation Manager immediately before taking a hold and by booking
/// creation, so a session can re-request or convert its own hold without
/// being blocked by the hold it is itself holding.
pub fn all_available_for_session(views: &[SeatAvailabilityView], seat_ids: &[Uuid], session_id: &str) -> bool {
    seat_ids.iter().all(|id| {
        views
            .iter()
            .find(|v| &v.seat.id == id)
            .map(|v| match v.availability {
                SeatAvailability::Available => true,
                SeatAvailability::Held => v.held_by_session.as_deref() == Some(session_id),
                _ => false,
            })
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn seat(bookable: bool, seat_type: &str) -> Seat {
        Seat {
            id: Uuid::new_v4(),
            seat_map_id: Uuid::new_v4(),
            seat_number: "1A".to_string(),
            seat_type: seat_type.to_string(),
            price_multiplier: Decimal::ONE,
            bookable,
        }
    }

    fn view(seat: Seat, availability: SeatAvailability, held_by_session: Option<&str>) -> SeatAvailabilityView {
        SeatAvailabilityView {
            seat,
            availability,
            held_by_session: held_by_session.map(str::to_string),
        }
    }

    #[test]
    fn classify_unbookable_seat_wins_over_sold_or_held() {
        let sold = HashSet::new();
        let held = std::collections::HashMap::new();
        assert_eq!(classify(&seat(false, "standard"), &sold, &held), SeatAvailability::NotBookable);
        assert_eq!(classify(&seat(true, "aisle"), &sold, &held), SeatAvailability::NotBookable);
    }

    #[test]
    fn classify_sold_before_held() {
        let seat = seat(true, "standard");
        let mut sold = HashSet::new();
        sold.insert(seat.id);
        let mut held = std::collections::HashMap::new();
        held.insert(seat.id, "session-a".to_string());
        assert_eq!(classify(&seat, &sold, &held), SeatAvailability::Sold);
    }

    #[test]
    fn own_session_can_treat_its_own_hold_as_available() {
        let seat_a = seat(true, "standard");
        let seat_id = seat_a.id;
        let views = vec![view(seat_a, SeatAvailability::Held, Some("session-a"))];

        assert!(all_available_for_session(&views, &[seat_id], "session-a"));
        assert!(!all_available_for_session(&views, &[seat_id], "session-b"));
    }

    #[test]
    fn missing_seat_is_never_available() {
        let views: Vec<SeatAvailabilityView> = vec![];
        assert!(!all_available_for_session(&views, &[Uuid::new_v4()], "session-a"));
    }
}
