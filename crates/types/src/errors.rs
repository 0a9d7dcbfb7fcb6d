use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// The single error type returned by every `ticketing-core` public function.
///
/// Variants correspond one-to-one with the error-kind table; `status_code()`
/// carries the client-visible mapping from that table.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Seats unavailable: {0}")]
    SeatsUnavailable(String),

    #[error("Trip misconfigured: {0}")]
    TripMisconfigured(String),

    #[error("Invalid booking state: {0}")]
    InvalidBookingState(String),

    #[error("Payment already applied to this booking")]
    AlreadyPaid,

    #[error("Webhook signature invalid")]
    SignatureInvalid,

    #[error("Payment provider error: {0}")]
    ProviderError(String),

    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Database(_) | Self::Internal(_) => 500,
            Self::InvalidInput(_) => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound(_) => 404,
            Self::SeatsUnavailable(_) | Self::InvalidBookingState(_) | Self::AlreadyPaid => 409,
            Self::TripMisconfigured(_) => 500,
            Self::SignatureInvalid => 401,
            Self::ProviderError(_) => 502,
            Self::DeadlineExceeded(_) => 408,
        }
    }
}
