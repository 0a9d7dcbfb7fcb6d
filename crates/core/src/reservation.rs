//! Reservation Manager: short-lived seat holds that precede booking
//! creation, and their expiry.

use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;
use ticketing_db::models::SeatReservation;
use ticketing_db::{queries, PgPool};
use ticketing_types::{AppError, Result};
use uuid::Uuid;

use crate::availability::{all_available_for_session, resolve_trip_availability};

pub struct ReservationManager {
    pool: PgPool,
    hold_ttl: Duration,
}

impl ReservationManager {
    pub fn new(pool: PgPool, hold_ttl: Duration) -> Self {
        Self { pool, hold_ttl }
    }

    /// Hold every seat in `seat_ids` for `trip_id` under `session_id`, or
    /// fail the whole request if any seat is no longer available to this
    /// session. The trip row is locked for the duration of the
    /// check-then-insert so a concurrent caller can never observe the same
    /// seat as available twice. Calling this again for seats the same
    /// session already holds simply refreshes their expiry.
    pub async fn hold_seats(&self, trip_id: Uuid, seat_ids: &[Uuid], session_id: &str) -> Result<()> {
        if seat_ids.is_empty() {
            return Err(AppError::InvalidInput("at least one seat is required".to_string()));
        }

        let views = resolve_trip_availability(&self.pool, trip_id).await?;
        if !all_available_for_session(&views, seat_ids, session_id) {
            return Err(AppError::SeatsUnavailable(
                "one or more requested seats are no longer available".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        queries::trips::find_by_id_for_update(&mut tx, trip_id)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .ok_or_else(|| AppError::NotFound("trip not found".to_string()))?;

        // Re-check under the lock: availability above was computed before we
        // held the trip row, so a concurrent holder could have slipped in.
        let sold = queries::seats::sold_seat_ids_for_trip(&mut tx, trip_id)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let held = queries::reservations::active_holds_for_trip(&mut tx, trip_id)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        for seat_id in seat_ids {
            let held_by_other = held
                .iter()
                .any(|h| &h.seat_id == seat_id && h.session_id != session_id);
            if sold.contains(seat_id) || held_by_other {
                return Err(AppError::SeatsUnavailable(format!(
                    "seat {seat_id} was taken by a concurrent request"
                )));
            }
        }

        let expires_at = Utc::now() + ChronoDuration::from_std(self.hold_ttl).unwrap_or_default();

        for seat_id in seat_ids {
            queries::reservations::upsert_hold(&mut tx, trip_id, *seat_id, session_id, expires_at)
                .await
                .map_err(|e| AppError::Internal(e.to_string()))?;
        }

        tx.commit().await.map_err(AppError::Database)?;

        Ok(())
    }

    /// Release every hold the session owns (e.g. the client abandoned
    /// checkout).
    pub async fn release(&self, session_id: &str) -> Result<()> {
        queries::reservations::release(&self.pool, session_id)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(())
    }

    /// Delete every hold whose TTL has lapsed without becoming a booking.
    /// Invoked by the `ReleaseStaleHolds` scheduler job.
    pub async fn release_expired(&self) -> Result<Vec<SeatReservation>> {
        let released = queries::reservations::release_expired(&self.pool, Utc::now())
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        if !released.is_empty() {
            tracing::info!(count = released.len(), "released expired seat holds");
        }

        Ok(released)
    }
}
