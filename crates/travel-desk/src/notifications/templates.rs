//! Subjects and HTML bodies for every outbound message. Subjects are plain
//! text; anything a visitor typed is escaped before it reaches a body.

use crate::contact::ContactMessage;
use crate::trips::domain::TripRequest;

/// Subject and body, not yet addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn travel_dates(trip: &TripRequest) -> String {
    match trip.return_date {
        Some(back) => format!("{} to {}", trip.take_off_day, back),
        None => format!("{} (no return date)", trip.take_off_day),
    }
}

/// Lead notification for the agency inbox.
pub fn trip_lead(trip: &TripRequest) -> RenderedEmail {
    let rows = [
        ("Traveler", trip.full_name.clone()),
        ("Email", trip.email.clone()),
        ("Phone", trip.phone.clone().unwrap_or_else(|| "N/A".to_string())),
        ("Destination", trip.destination.clone()),
        ("Departure City", trip.departure_city.clone()),
        ("Dates", travel_dates(trip)),
        ("People", trip.people.to_string()),
        ("Visa Type", trip.visa_type.clone()),
        (
            "Preferences",
            trip.preferences.clone().unwrap_or_else(|| "None".to_string()),
        ),
    ];

    let mut html = String::from("<h2>New Trip Request!</h2>\n");
    for (label, value) in rows {
        html.push_str(&format!(
            "<p><strong>{label}:</strong> {}</p>\n",
            escape_html(&value)
        ));
    }
    html.push_str(&format!("<p><small>Request ID: {}</small></p>\n", trip.id));

    RenderedEmail {
        subject: format!("NEW TRIP LEAD: {} ({})", trip.destination, trip.full_name),
        html,
    }
}

/// Acknowledgement sent to the traveler.
pub fn trip_confirmation(trip: &TripRequest) -> RenderedEmail {
    let destination = escape_html(&trip.destination);
    let preferences = trip
        .preferences
        .as_deref()
        .map(escape_html)
        .unwrap_or_else(|| "None".to_string());

    let html = format!(
        concat!(
            "<div style=\"font-family: Arial, sans-serif; color: #333;\">\n",
            "<h1 style=\"color: #d1a340;\">Thank you for choosing Greater &amp; Better!</h1>\n",
            "<p>Hi {name},</p>\n",
            "<p>We have received your request to plan a trip to <strong>{destination}</strong>.</p>\n",
            "<p>Our travel specialists are reviewing your details and will get back to you ",
            "shortly with a personalized itinerary.</p>\n",
            "<hr style=\"border: 0; border-top: 1px solid #eee;\">\n",
            "<h3>Your Request Details:</h3>\n",
            "<ul>\n",
            "<li><strong>Destination:</strong> {destination}</li>\n",
            "<li><strong>Dates:</strong> {dates}</li>\n",
            "<li><strong>Travelers:</strong> {people}</li>\n",
            "<li><strong>Preferences:</strong> {preferences}</li>\n",
            "</ul>\n",
            "<p>Warm regards,<br>The Greater &amp; Better Team</p>\n",
            "</div>\n",
        ),
        name = escape_html(&trip.full_name),
        destination = destination,
        dates = travel_dates(trip),
        people = trip.people,
        preferences = preferences,
    );

    RenderedEmail {
        subject: format!("Trip Request Received: {}", trip.destination),
        html,
    }
}

/// Contact-form message forwarded to the agency.
pub fn contact_lead(message: &ContactMessage) -> RenderedEmail {
    let html = format!(
        concat!(
            "<h2>New Contact Message</h2>\n",
            "<p><strong>Name:</strong> {name}</p>\n",
            "<p><strong>Email:</strong> {email}</p>\n",
            "<p><strong>Phone:</strong> {phone}</p>\n",
            "<p><strong>Message:</strong><br>{body}</p>\n",
        ),
        name = escape_html(&message.full_name()),
        email = escape_html(&message.email),
        phone = escape_html(message.phone.as_deref().unwrap_or("N/A")),
        body = escape_html(&message.message).replace('\n', "<br>"),
    );

    RenderedEmail {
        subject: format!("NEW CONTACT MESSAGE: {}", message.full_name()),
        html,
    }
}

pub fn contact_acknowledgement(message: &ContactMessage) -> RenderedEmail {
    let html = format!(
        concat!(
            "<p>Hi {name},</p>\n",
            "<p>Thanks for getting in touch with Greater &amp; Better Travel. ",
            "One of our specialists will reply to you shortly.</p>\n",
            "<p>Warm regards,<br>The Greater &amp; Better Team</p>\n",
        ),
        name = escape_html(&message.first_name),
    );

    RenderedEmail {
        subject: "We received your message".to_string(),
        html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trips::domain::TripRequestId;
    use crate::trips::status::TripStatus;
    use chrono::{NaiveDate, Utc};

    fn trip() -> TripRequest {
        let now = Utc::now();
        TripRequest {
            id: TripRequestId::generate(),
            user_id: None,
            full_name: "Ama <b>Mensah</b>".to_string(),
            email: "ama@example.com".to_string(),
            phone: None,
            destination: "Dubai".to_string(),
            departure_city: "Accra".to_string(),
            take_off_day: NaiveDate::from_ymd_opt(2026, 12, 20).expect("date"),
            return_date: NaiveDate::from_ymd_opt(2026, 12, 28),
            people: 2,
            visa_type: "tourist".to_string(),
            preferences: None,
            status: TripStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn escape_html_covers_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn lead_subject_names_destination_and_traveler() {
        let email = trip_lead(&trip());
        assert_eq!(email.subject, "NEW TRIP LEAD: Dubai (Ama <b>Mensah</b>)");
        assert!(email.html.contains("Ama &lt;b&gt;Mensah&lt;/b&gt;"));
        assert!(!email.html.contains("<b>Mensah"));
        assert!(email.html.contains("2026-12-20 to 2026-12-28"));
        assert!(email.html.contains("<strong>Phone:</strong> N/A"));
    }

    #[test]
    fn confirmation_defaults_preferences_to_none() {
        let email = trip_confirmation(&trip());
        assert_eq!(email.subject, "Trip Request Received: Dubai");
        assert!(email.html.contains("<strong>Preferences:</strong> None"));
        assert!(email.html.contains("<strong>Travelers:</strong> 2"));
    }

    #[test]
    fn contact_message_body_keeps_line_breaks() {
        let message = ContactMessage {
            first_name: "Kofi".to_string(),
            last_name: "Boateng".to_string(),
            email: "kofi@example.com".to_string(),
            phone: None,
            message: "line one\nline <two>".to_string(),
        };
        let email = contact_lead(&message);
        assert_eq!(email.subject, "NEW CONTACT MESSAGE: Kofi Boateng");
        assert!(email.html.contains("line one<br>line &lt;two&gt;"));
        assert!(contact_acknowledgement(&message).html.contains("Hi Kofi,"));
    }
}
