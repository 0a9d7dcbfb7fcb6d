use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub user_id: Option<Uuid>,
    pub booking_reference: String,
    pub status: String,
    pub payment_status: String,
    pub total_seats: i32,
    pub total_amount_minor_units: i64,
    pub currency: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub is_guest: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    /// Cumulative unsettled price delta from post-confirmation seat changes;
    /// positive means the passenger owes more, negative means a credit is
    /// owed. Recorded as an audit trail only — settling it (charge or
    /// refund) is a separate, out-of-band operation.
    pub price_delta_minor_units: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Passenger {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub seat_id: Uuid,
    pub full_name: String,
    pub document_id: Option<String>,
    pub seat_price_minor_units: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub passenger_id: Uuid,
    pub seat_id: Uuid,
    pub ticket_number: String,
    pub qr_payload: String,
    pub issued_at: DateTime<Utc>,
}
