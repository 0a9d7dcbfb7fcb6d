use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A temporary hold on one seat of one trip, created by the Reservation
/// Manager ahead of booking creation and keyed by the client's session —
/// not by a fresh token — so a session can discover and refresh its own
/// holds. Orphanable: a session that disappears leaves its holds to expire
/// and be released by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SeatReservation {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub seat_id: Uuid,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
