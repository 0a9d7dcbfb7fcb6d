//! Validation helpers for enum-backed string fields and input payloads.

/// Valid seat type values, as stored in `seat.seat_type`.
pub const VALID_SEAT_TYPES: &[&str] = &["standard", "vip", "sleeper", "aisle", "unavailable"];

/// Valid trip status values.
pub const VALID_TRIP_STATUSES: &[&str] =
    &["scheduled", "boarding", "departed", "completed", "cancelled"];

/// Valid notification channel values.
pub const VALID_NOTIFICATION_CHANNELS: &[&str] = &["email", "in_app"];

pub fn validate_enum_value(value: &str, valid_values: &[&str], field_name: &str) -> Result<(), String> {
    if valid_values.contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "Invalid {}. Must be one of: {}",
            field_name,
            valid_values.join(", ")
        ))
    }
}

pub fn validate_seat_type(value: &str) -> Result<(), String> {
    validate_enum_value(value, VALID_SEAT_TYPES, "seat type")
}

pub fn validate_trip_status(value: &str) -> Result<(), String> {
    validate_enum_value(value, VALID_TRIP_STATUSES, "trip status")
}

pub fn validate_notification_channel(value: &str) -> Result<(), String> {
    validate_enum_value(value, VALID_NOTIFICATION_CHANNELS, "notification channel")
}

/// A passenger name must be non-empty and within a sane display length.
pub fn validate_passenger_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("passenger name must not be empty".to_string());
    }
    if trimmed.chars().count() > 120 {
        return Err("passenger name must be at most 120 characters".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_seat_type() {
        assert!(validate_seat_type("vip").is_ok());
        assert!(validate_seat_type("standard").is_ok());
        assert!(validate_seat_type("first_class").is_err());
    }

    #[test]
    fn validates_trip_status() {
        assert!(validate_trip_status("boarding").is_ok());
        assert!(validate_trip_status("derailed").is_err());
    }

    #[test]
    fn validates_passenger_name() {
        assert!(validate_passenger_name("Nguyen Van A").is_ok());
        assert!(validate_passenger_name("   ").is_err());
        assert!(validate_passenger_name(&"x".repeat(121)).is_err());
    }
}
