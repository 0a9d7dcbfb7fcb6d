use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One day's rolled-up booking activity, computed by the
/// `ComputeDailyAnalytics` job.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BookingAnalytics {
    pub id: Uuid,
    pub date: NaiveDate,
    pub total_bookings: i32,
    pub confirmed_bookings: i32,
    pub total_revenue_minor_units: i64,
    pub cancelled_count: i32,
    /// `confirmed_bookings / total_bookings`, 0.0 when no bookings were
    /// created that day.
    pub conversion_rate: f64,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RouteAnalytics {
    pub id: Uuid,
    pub route_id: Uuid,
    pub date: NaiveDate,
    pub total_bookings: i32,
    pub total_revenue_minor_units: i64,
    pub occupancy_rate: f64,
    pub computed_at: DateTime<Utc>,
}
