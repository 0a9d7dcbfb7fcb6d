use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    /// Monotonic `(unix_millis << 20) | local_counter` code handed to the
    /// gateway as the external order reference.
    pub external_order_code: String,
    pub provider_reference: Option<String>,
    pub amount_minor_units: i64,
    pub currency: String,
    pub status: String,
    pub payment_link_url: Option<String>,
    /// When the payment link stops being honoured by the gateway; enforced
    /// both by the gateway and by the scheduler marking stale pending
    /// payments `failed` after this passes.
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only audit log of every inbound webhook event. Dedupe keys on
/// `(external_order_code, event_type)` against rows already `processed`, not
/// on `provider_event_id` alone, so a redelivery of an event that failed to
/// apply the first time is retried rather than permanently misclassified as
/// a duplicate. Immutable except for the `processed_status` /
/// `processed_at` fields, which are set once processing completes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentWebhookLog {
    pub id: Uuid,
    pub payment_id: Option<Uuid>,
    pub external_order_code: String,
    pub event_type: String,
    pub provider_event_id: String,
    pub raw_payload: Value,
    pub signature_valid: bool,
    pub processed_status: String,
    pub retry_count: i32,
    pub received_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}
