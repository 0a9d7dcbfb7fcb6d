use crate::models::Booking;
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(booking)
}

pub async fn find_by_id_for_update(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(booking)
}

pub async fn find_by_reference(pool: &PgPool, reference: &str) -> Result<Option<Booking>> {
    let booking =
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE booking_reference = $1")
            .bind(reference)
            .fetch_optional(pool)
            .await?;

    Ok(booking)
}

#[allow(clippy::too_many_arguments)]
pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    trip_id: Uuid,
    booking_reference: &str,
    user_id: Option<Uuid>,
    contact_name: &str,
    total_seats: i32,
    total_amount_minor_units: i64,
    currency: &str,
    contact_email: &str,
    contact_phone: Option<&str>,
    is_guest: bool,
    expires_at: DateTime<Utc>,
) -> Result<Booking> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        INSERT INTO bookings (
            trip_id, booking_reference, status, payment_status, user_id, contact_name,
            total_seats, total_amount_minor_units, currency, contact_email, contact_phone,
            is_guest, expires_at
        )
        VALUES ($1, $2, 'pending', 'pending', $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(trip_id)
    .bind(booking_reference)
    .bind(user_id)
    .bind(contact_name)
    .bind(total_seats)
    .bind(total_amount_minor_units)
    .bind(currency)
    .bind(contact_email)
    .bind(contact_phone)
    .bind(is_guest)
    .bind(expires_at)
    .fetch_one(&mut **tx)
    .await?;

    Ok(booking)
}

pub async fn set_status(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    status: &str,
) -> Result<Booking> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET status = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_one(&mut **tx)
    .await?;

    Ok(booking)
}

/// Move a booking to `confirmed`, stamping `confirmed_at`. Distinct from the
/// generic `set_status` since only this transition needs the timestamp.
pub async fn confirm(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Booking> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET status = 'confirmed', confirmed_at = NOW(), updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(booking)
}

pub async fn set_payment_status(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    payment_status: &str,
) -> Result<Booking> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET payment_status = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(payment_status)
    .fetch_one(&mut **tx)
    .await?;

    Ok(booking)
}

/// Cancel a booking, recording `cancellation_reason`. A confirmed booking
/// whose payment had completed has its `payment_status` marked `refunded`
/// alongside — actual refund settlement at the gateway is out of scope, this
/// only records the intent.
pub async fn cancel(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    cancellation_reason: Option<&str>,
) -> Result<Booking> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET status = 'cancelled',
            cancelled_at = NOW(),
            cancellation_reason = $2,
            payment_status = CASE WHEN payment_status = 'completed' THEN 'refunded' ELSE payment_status END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(cancellation_reason)
    .fetch_one(&mut **tx)
    .await?;

    Ok(booking)
}

/// Add `delta` (positive or negative) to the booking's running unsettled
/// price delta, e.g. when a post-confirmation seat change lands on a
/// differently priced seat.
pub async fn add_price_delta(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    delta: i64,
) -> Result<Booking> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET price_delta_minor_units = price_delta_minor_units + $2, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(delta)
    .fetch_one(&mut **tx)
    .await?;

    Ok(booking)
}

/// Bump `total_seats` and `total_amount_minor_units` by the given amounts,
/// for adding a passenger to an already-confirmed booking.
pub async fn add_seat_and_amount(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    amount_delta: i64,
) -> Result<Booking> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET total_seats = total_seats + 1,
            total_amount_minor_units = total_amount_minor_units + $2,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(amount_delta)
    .fetch_one(&mut **tx)
    .await?;

    Ok(booking)
}

/// Pending bookings whose expiry deadline has passed, for
/// `ExpireUnpaidBookings`.
pub async fn find_expired_pending(pool: &PgPool, before: DateTime<Utc>) -> Result<Vec<Booking>> {
    let bookings = sqlx::query_as::<_, Booking>(
        r#"
        SELECT * FROM bookings
        WHERE status = 'pending'
          AND expires_at IS NOT NULL
          AND expires_at < $1
        "#,
    )
    .bind(before)
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}

/// Confirmed bookings on trips departing within the reminder window, for
/// `SendTripReminders`.
pub async fn find_confirmed_for_trips(
    pool: &PgPool,
    trip_ids: &[Uuid],
) -> Result<Vec<Booking>> {
    let bookings = sqlx::query_as::<_, Booking>(
        r#"
        SELECT * FROM bookings
        WHERE status = 'confirmed' AND trip_id = ANY($1)
        "#,
    )
    .bind(trip_ids)
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}

/// `(total_bookings, confirmed_bookings, revenue_minor_units, cancelled_bookings)`
/// for the given window. `total_bookings` counts every booking created in
/// the window regardless of how it resolved; `confirmed_bookings` is the
/// subset that reached (or passed through) `confirmed`, used together to
/// derive a conversion rate.
pub async fn count_in_range(
    pool: &PgPool,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<(i64, i64, i64, i64)> {
    let row: (i64, i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COUNT(*) FILTER (WHERE status IN ('confirmed', 'completed') OR confirmed_at IS NOT NULL),
            COALESCE(SUM(total_amount_minor_units) FILTER (WHERE status IN ('confirmed', 'completed') OR confirmed_at IS NOT NULL), 0),
            COUNT(*) FILTER (WHERE status = 'cancelled')
        FROM bookings
        WHERE created_at >= $1 AND created_at < $2
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
