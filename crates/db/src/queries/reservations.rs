use crate::models::SeatReservation;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Active (non-expired) holds for a trip, held for update so the caller's
/// transaction sees a consistent snapshot while deciding availability.
pub async fn active_holds_for_trip(
    tx: &mut Transaction<'_, Postgres>,
    trip_id: Uuid,
) -> Result<Vec<SeatReservation>> {
    let holds = sqlx::query_as::<_, SeatReservation>(
        r#"
        SELECT * FROM seat_reservations
        WHERE trip_id = $1 AND expires_at > NOW()
        FOR UPDATE
        "#,
    )
    .bind(trip_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(holds)
}

/// Take or refresh a hold on one seat for one session. Idempotent: a second
/// call from the same session for the same seat refreshes `expires_at`
/// rather than inserting a duplicate row, since a client polling/retrying a
/// hold request should extend its own hold, not stack holds.
pub async fn upsert_hold(
    tx: &mut Transaction<'_, Postgres>,
    trip_id: Uuid,
    seat_id: Uuid,
    session_id: &str,
    expires_at: DateTime<Utc>,
) -> Result<SeatReservation> {
    let hold = sqlx::query_as::<_, SeatReservation>(
        r#"
        INSERT INTO seat_reservations (trip_id, seat_id, session_id, expires_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (trip_id, seat_id) DO UPDATE
        SET session_id = EXCLUDED.session_id, expires_at = EXCLUDED.expires_at
        WHERE seat_reservations.session_id = EXCLUDED.session_id
        RETURNING *
        "#,
    )
    .bind(trip_id)
    .bind(seat_id)
    .bind(session_id)
    .bind(expires_at)
    .fetch_one(&mut **tx)
    .await?;

    Ok(hold)
}

pub async fn find_by_session(
    tx: &mut Transaction<'_, Postgres>,
    session_id: &str,
) -> Result<Vec<SeatReservation>> {
    let holds = sqlx::query_as::<_, SeatReservation>(
        "SELECT * FROM seat_reservations WHERE session_id = $1 AND expires_at > NOW() FOR UPDATE",
    )
    .bind(session_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(holds)
}

/// Delete every hold the session owns, in the same transaction that creates
/// their replacement passenger rows — they are subsumed by the concrete
/// booking, not consumed/attached.
pub async fn release_in_tx(tx: &mut Transaction<'_, Postgres>, session_id: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM seat_reservations WHERE session_id = $1")
        .bind(session_id)
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected())
}

pub async fn release(pool: &PgPool, session_id: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM seat_reservations WHERE session_id = $1")
        .bind(session_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Delete every hold whose TTL has lapsed and that never turned into a
/// booking (there is no longer a `booking_id` column: a hold that became a
/// booking is deleted outright by `release_in_tx` at commit time, so any row
/// still here by its expiry genuinely never converted).
pub async fn release_expired(pool: &PgPool, now: DateTime<Utc>) -> Result<Vec<SeatReservation>> {
    let released = sqlx::query_as::<_, SeatReservation>(
        r#"
        DELETE FROM seat_reservations
        WHERE expires_at <= $1
        RETURNING *
        "#,
    )
    .bind(now)
    .fetch_all(pool)
    .await?;

    Ok(released)
}
