use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The layout a vehicle's seats are drawn from. Immutable once a trip has
/// been scheduled against it (Open Question, see DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SeatMap {
    pub id: Uuid,
    pub label: String,
    pub row_count: i32,
    pub column_count: i32,
    pub created_at: DateTime<Utc>,
}

/// A single seat position within a `SeatMap`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Seat {
    pub id: Uuid,
    pub seat_map_id: Uuid,
    pub seat_number: String,
    pub seat_type: String,
    pub price_multiplier: rust_decimal::Decimal,
    pub bookable: bool,
}
