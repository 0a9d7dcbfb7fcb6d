//! Human-facing identifier formats: booking references, ticket numbers, and
//! the QR payload printed on an issued ticket.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Generate a booking reference of the form `BK` + `YYYYMMDD` + 8 lowercase
/// hex characters, the external format every other ticketing surface
/// (emails, QR payload) quotes back to the passenger.
pub fn generate_booking_reference() -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix: u32 = rand::thread_rng().gen();
    format!("BK{date}{suffix:08x}")
}

/// Generate a ticket number of the form `<booking_reference>-T<NN>`, one per
/// passenger, numbered by their 1-based position within the booking.
pub fn generate_ticket_number(booking_reference: &str, passenger_index: u32) -> String {
    format!("{booking_reference}-T{passenger_index:02}")
}

/// The payload encoded into a ticket's QR code: a JSON object carrying
/// enough context to verify a ticket at the gate without a database round
/// trip against anything but the ticket number itself.
pub fn qr_payload(
    ticket_number: &str,
    booking_reference: &str,
    passenger_name: &str,
    trip_origin: &str,
    trip_destination: &str,
    seat_number: &str,
    departure_time: DateTime<Utc>,
) -> String {
    json!({
        "ticket_number": ticket_number,
        "booking_reference": booking_reference,
        "passenger_name": passenger_name,
        "trip_origin": trip_origin,
        "trip_destination": trip_destination,
        "seat_number": seat_number,
        "departure_time": departure_time.to_rfc3339(),
    })
    .to_string()
}

static ORDER_CODE_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Monotonic external order code handed to the payment gateway:
/// `(unix_millis << 20) | process_local_counter`. Strictly increasing within
/// a process and, because the millisecond component dominates, effectively
/// strictly increasing across processes too — replacing a naive
/// time-in-seconds scheme that collides under any real load.
pub fn generate_order_code() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_millis() as u64;
    let counter = ORDER_CODE_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xF_FFFF;
    let code = (millis << 20) | counter as u64;
    code.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_reference_has_expected_shape() {
        let reference = generate_booking_reference();
        assert!(reference.starts_with("BK"));
        assert_eq!(reference.len(), 2 + 8 + 8);
        assert!(reference.chars().skip(2).take(8).all(|c| c.is_ascii_digit()));
        assert!(reference.chars().skip(10).all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn ticket_number_is_sequential() {
        assert_eq!(generate_ticket_number("BK20260101abcd1234", 1), "BK20260101abcd1234-T01");
        assert_eq!(generate_ticket_number("BK20260101abcd1234", 12), "BK20260101abcd1234-T12");
    }

    #[test]
    fn qr_payload_embeds_every_required_key() {
        let departure = Utc::now();
        let payload = qr_payload("TKT-T01", "BK20260101abcd1234", "Jane Doe", "Hanoi", "Saigon", "3A", departure);
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        for key in [
            "ticket_number",
            "booking_reference",
            "passenger_name",
            "trip_origin",
            "trip_destination",
            "seat_number",
            "departure_time",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn order_codes_are_monotonic() {
        let a = generate_order_code().parse::<u64>().unwrap();
        let b = generate_order_code().parse::<u64>().unwrap();
        assert!(b > a);
    }
}
