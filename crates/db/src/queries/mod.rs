pub mod analytics;
pub mod bookings;
pub mod locks;
pub mod notifications;
pub mod passengers;
pub mod payments;
pub mod reservations;
pub mod seats;
pub mod tickets;
pub mod trips;
pub mod webhook_logs;
