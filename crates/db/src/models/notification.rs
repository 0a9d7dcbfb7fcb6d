use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A queued outbound message. Rows back the in-process bounded queue so a
/// process restart can sweep and re-enqueue anything left `pending`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub booking_id: Option<Uuid>,
    /// The passenger this notification concerns, when it is specific to one
    /// (e.g. a trip reminder) rather than the whole booking.
    pub passenger_id: Option<Uuid>,
    pub notification_type: String,
    pub channel: String,
    pub recipient: String,
    pub payload: Value,
    pub status: String,
    pub retry_count: i32,
    pub next_attempt_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}
