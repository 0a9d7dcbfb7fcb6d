pub mod mail;
pub mod payment_provider;

pub use mail::MailTransport;
pub use payment_provider::{PaymentLink, PaymentProvider};
