use crate::models::{BookingAnalytics, RouteAnalytics};
use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;

#[allow(clippy::too_many_arguments)]
pub async fn upsert_booking_analytics(
    pool: &PgPool,
    date: NaiveDate,
    total_bookings: i32,
    confirmed_bookings: i32,
    total_revenue_minor_units: i64,
    cancelled_count: i32,
    conversion_rate: f64,
) -> Result<BookingAnalytics> {
    let row = sqlx::query_as::<_, BookingAnalytics>(
        r#"
        INSERT INTO booking_analytics (
            date, total_bookings, confirmed_bookings, total_revenue_minor_units,
            cancelled_count, conversion_rate
        )
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (date) DO UPDATE SET
            total_bookings = EXCLUDED.total_bookings,
            confirmed_bookings = EXCLUDED.confirmed_bookings,
            total_revenue_minor_units = EXCLUDED.total_revenue_minor_units,
            cancelled_count = EXCLUDED.cancelled_count,
            conversion_rate = EXCLUDED.conversion_rate,
            computed_at = NOW()
        RETURNING *
        "#,
    )
    .bind(date)
    .bind(total_bookings)
    .bind(confirmed_bookings)
    .bind(total_revenue_minor_units)
    .bind(cancelled_count)
    .bind(conversion_rate)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn upsert_route_analytics(
    pool: &PgPool,
    route_id: uuid::Uuid,
    date: NaiveDate,
    total_bookings: i32,
    total_revenue_minor_units: i64,
    occupancy_rate: f64,
) -> Result<RouteAnalytics> {
    let row = sqlx::query_as::<_, RouteAnalytics>(
        r#"
        INSERT INTO route_analytics (route_id, date, total_bookings, total_revenue_minor_units, occupancy_rate)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (route_id, date) DO UPDATE SET
            total_bookings = EXCLUDED.total_bookings,
            total_revenue_minor_units = EXCLUDED.total_revenue_minor_units,
            occupancy_rate = EXCLUDED.occupancy_rate,
            computed_at = NOW()
        RETURNING *
        "#,
    )
    .bind(route_id)
    .bind(date)
    .bind(total_bookings)
    .bind(total_revenue_minor_units)
    .bind(occupancy_rate)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Per-trip activity for trips departing in `[from, to)`: `(route_id,
/// confirmed_bookings, revenue_minor_units, confirmed_passengers,
/// seat_capacity)`. One row per trip — the caller sums across trips sharing
/// a route to get `RouteAnalytics`, since pre-grouping in SQL across two
/// independent one-to-many joins (bookings, passengers) would double-count.
pub async fn trip_activity_in_range(
    pool: &PgPool,
    from: chrono::DateTime<chrono::Utc>,
    to: chrono::DateTime<chrono::Utc>,
) -> Result<Vec<(uuid::Uuid, i64, i64, i64, i64)>> {
    let rows: Vec<(uuid::Uuid, i64, i64, i64, i64)> = sqlx::query_as(
        r#"
        SELECT
            t.route_id,
            COALESCE(bs.confirmed_bookings, 0),
            COALESCE(bs.revenue, 0),
            COALESCE(ps.confirmed_passengers, 0),
            COALESCE(vs.capacity, 0)
        FROM trips t
        JOIN vehicles v ON v.id = t.vehicle_id
        LEFT JOIN LATERAL (
            SELECT
                COUNT(*) AS confirmed_bookings,
                SUM(b.total_amount_minor_units) AS revenue
            FROM bookings b
            WHERE b.trip_id = t.id
              AND (b.status IN ('confirmed', 'completed') OR b.confirmed_at IS NOT NULL)
              AND b.created_at >= $1 AND b.created_at < $2
        ) bs ON true
        LEFT JOIN LATERAL (
            SELECT COUNT(p.id) AS confirmed_passengers
            FROM passengers p
            JOIN bookings b2 ON b2.id = p.booking_id
            WHERE b2.trip_id = t.id
              AND (b2.status IN ('confirmed', 'completed') OR b2.confirmed_at IS NOT NULL)
              AND b2.created_at >= $1 AND b2.created_at < $2
        ) ps ON true
        LEFT JOIN LATERAL (
            SELECT COUNT(*) AS capacity FROM seats s WHERE s.seat_map_id = v.seat_map_id AND s.bookable
        ) vs ON true
        WHERE t.departure_time >= $1 AND t.departure_time < $2
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
