//! Process-wide configuration, built once from the environment and passed by
//! value into every constructor that needs it. There is no global mutable
//! singleton: a caller that needs config holds its own `AppConfig` (or a
//! cheap `Clone` of one), the same way the booking/reservation/notification
//! constructors below take it as an explicit argument.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,

    /// How long a Pending booking may sit unpaid before the scheduler expires it.
    pub booking_expiry: Duration,
    /// How long a seat hold survives before it is released back to availability.
    pub hold_ttl: Duration,
    /// How long a payment link stays valid before the gateway considers it expired.
    pub payment_expiry: Duration,

    pub notification_workers: usize,
    pub notification_queue_size: usize,
    pub notification_retry_max: u32,

    /// When true, `ticketing-integrations` wires a `MockProvider` instead of
    /// a real gateway HTTP client — used in local/dev/test environments.
    pub mock_payments: bool,
    pub gateway_base_url: String,
    pub gateway_api_key: String,
    pub gateway_webhook_secret: String,

    pub mail_from_address: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,

    pub cron_expire_unpaid_bookings: String,
    pub cron_release_stale_holds: String,
    pub cron_process_pending_notifications: String,
    pub cron_send_trip_reminders: String,
    pub cron_compute_daily_analytics: String,
    pub cron_purge_old_data: String,
}

impl AppConfig {
    /// Load configuration from the process environment, applying a `.env`
    /// file first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: require_env("DATABASE_URL")?,

            booking_expiry: Duration::from_secs(env_u64("BOOKING_EXPIRY_SECS", 15 * 60)),
            hold_ttl: Duration::from_secs(env_u64("HOLD_TTL_SECS", 10 * 60)),
            payment_expiry: Duration::from_secs(env_u64("PAYMENT_EXPIRY_SECS", 30 * 60)),

            notification_workers: env_u64("NOTIFICATION_WORKERS", 3) as usize,
            notification_queue_size: env_u64("NOTIFICATION_QUEUE_SIZE", 100) as usize,
            notification_retry_max: env_u64("NOTIFICATION_RETRY_MAX", 5) as u32,

            mock_payments: env_bool("MOCK_PAYMENTS", false),
            gateway_base_url: env_or("GATEWAY_BASE_URL", "https://gateway.example.invalid"),
            gateway_api_key: env_or("GATEWAY_API_KEY", ""),
            gateway_webhook_secret: env_or("GATEWAY_WEBHOOK_SECRET", ""),

            mail_from_address: env_or("MAIL_FROM_ADDRESS", "tickets@example.invalid"),
            smtp_host: env_or("SMTP_HOST", "localhost"),
            smtp_port: env_u64("SMTP_PORT", 587) as u16,
            smtp_username: env_or("SMTP_USERNAME", ""),
            smtp_password: env_or("SMTP_PASSWORD", ""),

            cron_expire_unpaid_bookings: env_or("CRON_EXPIRE_UNPAID_BOOKINGS", "0 */5 * * * *"),
            cron_release_stale_holds: env_or("CRON_RELEASE_STALE_HOLDS", "0 */5 * * * *"),
            cron_process_pending_notifications: env_or(
                "CRON_PROCESS_PENDING_NOTIFICATIONS",
                "0 * * * * *",
            ),
            cron_send_trip_reminders: env_or("CRON_SEND_TRIP_REMINDERS", "0 0 * * * *"),
            cron_compute_daily_analytics: env_or("CRON_COMPUTE_DAILY_ANALYTICS", "0 0 3 * * *"),
            cron_purge_old_data: env_or("CRON_PURGE_OLD_DATA", "0 0 3 * * *"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("missing required environment variable {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}
