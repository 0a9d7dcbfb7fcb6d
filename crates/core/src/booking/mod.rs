pub mod cancel;
pub mod confirm;
pub mod create;
pub mod modify;

pub use cancel::cancel_booking;
pub use confirm::confirm_booking;
pub use create::{create_booking, PassengerInput};
pub use modify::{add_passenger, edit_passenger_info, modify_seat, DEFAULT_MODIFICATION_CUTOFF_HOURS};
