use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A physical vehicle assigned to trips, carrying a fixed seat map. Authoring
/// is out of scope; only read accessors exist here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub plate_number: String,
    pub seat_map_id: Uuid,
    pub created_at: DateTime<Utc>,
}
