//! Plain-text rendering for each notification type. Kept deliberately
//! simple — no templating engine — since the payload shapes are small and
//! fixed per `NotificationType`.

use serde_json::Value;
use ticketing_types::enums::NotificationType;

pub struct Rendered {
    pub subject: String,
    pub body: String,
}

pub fn render(notification_type: NotificationType, payload: &Value) -> Rendered {
    let reference = payload
        .get("booking_reference")
        .and_then(Value::as_str)
        .unwrap_or("");

    match notification_type {
        NotificationType::BookingConfirmation => Rendered {
            subject: format!("Booking {reference} confirmed"),
            body: format!("Your booking {reference} is confirmed. Have a safe trip."),
        },
        NotificationType::PaymentReceipt => Rendered {
            subject: format!("Payment received for {reference}"),
            body: format!("We received your payment for booking {reference}."),
        },
        NotificationType::TicketDelivery => Rendered {
            subject: format!("Your tickets for {reference}"),
            body: format!("Your e-tickets for booking {reference} are attached."),
        },
        NotificationType::TripReminder => {
            let departure = payload.get("departure_time").and_then(Value::as_str).unwrap_or("soon");
            Rendered {
                subject: format!("Upcoming trip for booking {reference}"),
                body: format!("Your trip for booking {reference} departs at {departure}."),
            }
        }
        NotificationType::Cancellation => Rendered {
            subject: format!("Booking {reference} cancelled"),
            body: format!("Your booking {reference} has been cancelled."),
        },
        NotificationType::BookingExpired => Rendered {
            subject: format!("Booking {reference} expired"),
            body: format!("Booking {reference} was not paid in time and has expired."),
        },
        NotificationType::InApp => Rendered {
            subject: String::new(),
            body: payload.get("message").and_then(Value::as_str).unwrap_or("").to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn booking_confirmation_embeds_reference() {
        let rendered = render(
            NotificationType::BookingConfirmation,
            &json!({ "booking_reference": "TKT-ABC123" }),
        );
        assert!(rendered.subject.contains("TKT-ABC123"));
        assert!(rendered.body.contains("TKT-ABC123"));
    }

    #[test]
    fn trip_reminder_falls_back_when_departure_missing() {
        let rendered = render(
            NotificationType::TripReminder,
            &json!({ "booking_reference": "TKT-XYZ" }),
        );
        assert!(rendered.body.contains("soon"));
    }

    #[test]
    fn in_app_has_no_subject() {
        let rendered = render(NotificationType::InApp, &json!({ "message": "gate changed" }));
        assert_eq!(rendered.subject, "");
        assert_eq!(rendered.body, "gate changed");
    }
}
