pub mod compute_daily_analytics;
pub mod expire_unpaid;
pub mod process_pending_notifications;
pub mod purge_old_data;
pub mod release_stale_holds;
pub mod send_trip_reminders;

pub use compute_daily_analytics::compute_daily_analytics;
pub use expire_unpaid::expire_unpaid_bookings;
pub use process_pending_notifications::process_pending_notifications;
pub use purge_old_data::purge_old_data;
pub use release_stale_holds::release_stale_holds;
pub use send_trip_reminders::send_trip_reminders;
