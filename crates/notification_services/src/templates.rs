use booking_core::Reservation;

use crate::types::{BrandConfig, NotificationKind, RenderedMessage};

/// Renders the message for a notification kind. Pure; no I/O, so identical
/// inputs always produce the same subject and bodies.
pub fn render(
    kind: NotificationKind,
    reservation: &Reservation,
    brand: &BrandConfig,
) -> RenderedMessage {
    let check_in = reservation.check_in.format("%B %d, %Y");
    let check_out = reservation.check_out.format("%B %d, %Y");

    let (subject, body) = match kind {
        NotificationKind::PreArrival => (
            format!("Your stay at {} is almost here", brand.property_name),
            format!(
                "Hi {}!\n\n\
                 We're looking forward to welcoming you in two days.\n\n\
                 Check-in: {}\n\
                 Check-out: {} ({} nights)\n\n\
                 Check-in opens at 3pm. Reply to this email if your plans change.",
                reservation.guest_name, check_in, check_out, reservation.nights
            ),
        ),
        NotificationKind::CheckInDay => (
            format!("Welcome to {} — check-in today", brand.property_name),
            format!(
                "Hi {}!\n\n\
                 Today is check-in day. Your room is ready from 3pm.\n\n\
                 Check-out: {}\n\n\
                 Safe travels — see you soon!",
                reservation.guest_name, check_out
            ),
        ),
        NotificationKind::CheckoutReminder => (
            format!("Check-out tomorrow at {}", brand.property_name),
            format!(
                "Hi {}!\n\n\
                 A quick reminder that check-out is tomorrow, {}, by 11am.\n\n\
                 We hope you've enjoyed your stay.",
                reservation.guest_name, check_out
            ),
        ),
        NotificationKind::PostStay => (
            format!("Thanks for staying at {}", brand.property_name),
            format!(
                "Hi {}!\n\n\
                 Thank you for staying with us from {} to {}.\n\n\
                 We'd love to see you again — you can book your next stay at {}.",
                reservation.guest_name, check_in, check_out, brand.website_url
            ),
        ),
    };

    let html = format!(
        r#"<html>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
    <div style="padding: 20px; text-align: center; background: #2c3e50;">
        <h1 style="color: white; margin: 0;">{}</h1>
    </div>
    <div style="padding: 30px; background: white; white-space: pre-line;">{}</div>
    <div style="background: #f9fafb; padding: 20px; text-align: center; color: #6b7280; font-size: 12px;">
        <p><a href="{}">{}</a></p>
    </div>
</body>
</html>"#,
        brand.property_name, body, brand.website_url, brand.website_url
    );

    RenderedMessage {
        subject,
        html,
        text: body,
    }
}

#[cfg(test)]
mod tests {
    use booking_core::{PaymentStatus, ReservationStatus, nights_between};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::*;

    fn reservation() -> Reservation {
        let check_in = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let check_out = NaiveDate::from_ymd_opt(2024, 6, 13).unwrap();
        Reservation {
            id: Uuid::new_v4(),
            unit_id: "U1".to_string(),
            guest_name: "Alex Guest".to_string(),
            guest_email: "alex@example.com".to_string(),
            guest_phone: None,
            check_in,
            check_out,
            nights: nights_between(check_in, check_out),
            total_price: 1350.0,
            status: ReservationStatus::Confirmed,
            admin_notes: None,
            payment_status: PaymentStatus::Unpaid,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn brand() -> BrandConfig {
        BrandConfig {
            property_name: "Innkeeper Guesthouse".to_string(),
            from_email: "stay@innkeeper.example".to_string(),
            website_url: "https://innkeeper.example".to_string(),
        }
    }

    #[test]
    fn every_kind_renders_subject_and_both_bodies() {
        let reservation = reservation();
        let brand = brand();

        for kind in [
            NotificationKind::PreArrival,
            NotificationKind::CheckInDay,
            NotificationKind::CheckoutReminder,
            NotificationKind::PostStay,
        ] {
            let message = render(kind, &reservation, &brand);
            assert!(!message.subject.is_empty());
            assert!(message.text.contains("Alex Guest"));
            assert!(message.html.contains("Innkeeper Guesthouse"));
        }
    }

    #[test]
    fn pre_arrival_mentions_the_stay_dates() {
        let message = render(NotificationKind::PreArrival, &reservation(), &brand());
        assert!(message.text.contains("June 10, 2024"));
        assert!(message.text.contains("June 13, 2024"));
        assert!(message.text.contains("3 nights"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let reservation = reservation();
        let brand = brand();
        let a = render(NotificationKind::PostStay, &reservation, &brand);
        let b = render(NotificationKind::PostStay, &reservation, &brand);
        assert_eq!(a, b);
    }
}
