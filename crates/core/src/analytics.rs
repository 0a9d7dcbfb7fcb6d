//! Analytics Aggregator: rolls up booking activity into daily snapshots.
//! Computation is triggered by the `ComputeDailyAnalytics` scheduler job;
//! this module holds the pure aggregation logic it calls.

use chrono::{Duration, NaiveDate, Utc};
use ticketing_db::models::BookingAnalytics;
use ticketing_db::{queries, PgPool};
use ticketing_types::{AppError, Result};

/// Aggregate the previous UTC day's booking activity into `booking_analytics`
/// and, per route, into `route_analytics`.
pub async fn compute_daily_analytics(pool: &PgPool, date: NaiveDate) -> Result<BookingAnalytics> {
    let from = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
    let to = from + Duration::days(1);

    let (total_bookings, confirmed_bookings, total_revenue_minor_units, cancelled_count) =
        queries::bookings::count_in_range(pool, from, to)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

    let conversion_rate = if total_bookings > 0 {
        confirmed_bookings as f64 / total_bookings as f64
    } else {
        0.0
    };

    let booking_analytics = queries::analytics::upsert_booking_analytics(
        pool,
        date,
        total_bookings as i32,
        confirmed_bookings as i32,
        total_revenue_minor_units,
        cancelled_count as i32,
        conversion_rate,
    )
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?;

    let trip_rows = queries::analytics::trip_activity_in_range(pool, from, to)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // Sum per-trip activity onto its route. Occupancy is
    // confirmed-passengers-across-the-route divided by
    // seat-capacity-across-the-route, not an average of per-trip rates, so a
    // handful of nearly-empty trips on a high-capacity route isn't masked by
    // one full minibus.
    let mut by_route: std::collections::HashMap<uuid::Uuid, (i64, i64, i64, i64)> =
        std::collections::HashMap::new();
    for (route_id, bookings_count, revenue, passengers, capacity) in trip_rows {
        let entry = by_route.entry(route_id).or_insert((0, 0, 0, 0));
        entry.0 += bookings_count;
        entry.1 += revenue;
        entry.2 += passengers;
        entry.3 += capacity;
    }

    for (route_id, (bookings_count, revenue, passengers, capacity)) in by_route {
        let occupancy_rate = if capacity > 0 {
            passengers as f64 / capacity as f64
        } else {
            0.0
        };

        queries::analytics::upsert_route_analytics(
            pool,
            route_id,
            date,
            bookings_count as i32,
            revenue,
            occupancy_rate,
        )
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    }

    tracing::info!(
        date = %date,
        bookings = total_bookings,
        revenue = total_revenue_minor_units,
        "daily analytics computed"
    );

    Ok(booking_analytics)
}

/// A convenience wrapper for ad-hoc lookback windows ("last 7 days" etc.),
/// grounded on the same `PeriodFilter` the rest of the workspace uses for
/// date-range queries.
pub async fn compute_for_period(pool: &PgPool, period: &str) -> Result<Vec<BookingAnalytics>> {
    let filter = ticketing_types::parse_period(period);
    let since = filter.since_or_default().date_naive();
    let today = Utc::now().date_naive();

    let mut results = Vec::new();
    let mut date = since;
    while date <= today {
        results.push(compute_daily_analytics(pool, date).await?);
        date += Duration::days(1);
    }

    Ok(results)
}
