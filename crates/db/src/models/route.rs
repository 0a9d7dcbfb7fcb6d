use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A fixed origin/destination pair. Authoring (creating or editing routes) is
/// out of scope here; this is a read model used by trip lookups and
/// `RouteAnalytics` grouping.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Route {
    pub id: Uuid,
    pub origin: String,
    pub destination: String,
    pub distance_km: f64,
    pub created_at: DateTime<Utc>,
}
