pub mod analytics;
pub mod booking;
pub mod notification;
pub mod payment;
pub mod route;
pub mod seat_map;
pub mod seat_reservation;
pub mod trip;
pub mod vehicle;

pub use analytics::{BookingAnalytics, RouteAnalytics};
pub use booking::{Booking, Passenger, Ticket};
pub use notification::Notification;
pub use payment::{Payment, PaymentWebhookLog};
pub use route::Route;
pub use seat_map::{Seat, SeatMap};
pub use seat_reservation::SeatReservation;
pub use trip::Trip;
pub use vehicle::Vehicle;
