use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::status::TripStatus;
use crate::accounts::domain::UserId;
use crate::validation::{optional_text, ValidationErrors};

/// Largest party size accepted; `people` is stored as a Postgres `INTEGER`.
pub const MAX_PEOPLE: u32 = i32::MAX as u32;

/// Identifier wrapper for trip requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripRequestId(pub Uuid);

impl TripRequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// `None` for anything that is not a UUID; callers report that as not found.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl fmt::Display for TripRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A stored trip lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub id: TripRequestId,
    /// Submitting account, when the request arrived with a valid token.
    pub user_id: Option<UserId>,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub destination: String,
    pub departure_city: String,
    pub take_off_day: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub people: u32,
    pub visa_type: String,
    pub preferences: Option<String>,
    pub status: TripStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Name and email of the account behind a record, joined in for the admin list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerSummary {
    pub name: String,
    pub email: String,
}

/// Admin list row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripRequestEntry {
    #[serde(flatten)]
    pub trip: TripRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerSummary>,
}

/// Raw `POST /api/plan-trip` body. Everything is optional here so that one
/// response can list every missing field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripSubmission {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub destination: Option<String>,
    pub departure_city: Option<String>,
    pub take_off_day: Option<String>,
    pub return_date: Option<String>,
    /// Number or numeric string.
    pub people: Option<Value>,
    pub visa_type: Option<String>,
    pub preferences: Option<String>,
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTripRequest {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub destination: String,
    pub departure_city: String,
    pub take_off_day: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub people: u32,
    pub visa_type: String,
    pub preferences: Option<String>,
}

impl TripSubmission {
    pub fn validate(self) -> Result<NewTripRequest, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let full_name = errors.required("fullName", self.full_name, "Full name is required");
        let email = errors.email("email", self.email);
        let destination = errors.required("destination", self.destination, "Destination is required");
        let departure_city =
            errors.required("departureCity", self.departure_city, "Departure city is required");

        let take_off_raw =
            errors.required("takeOffDay", self.take_off_day, "Take-off date is required");
        let take_off_day = if take_off_raw.is_empty() {
            None
        } else {
            let parsed = parse_date(&take_off_raw);
            if parsed.is_none() {
                errors.push("takeOffDay", "Take-off date must be a valid date");
            }
            parsed
        };

        let return_date = match optional_text(self.return_date) {
            None => None,
            Some(raw) => match parse_date(&raw) {
                Some(date) => Some(date),
                None => {
                    errors.push("returnDate", "Return date must be a valid date");
                    None
                }
            },
        };
        if let (Some(departure), Some(back)) = (take_off_day, return_date) {
            if back < departure {
                errors.push("returnDate", "Return date cannot be before the take-off date");
            }
        }

        let people = match parse_people(self.people.as_ref()) {
            Ok(count) => count,
            Err(message) => {
                errors.push("people", message);
                0
            }
        };

        let visa_type = errors.required("visaType", self.visa_type, "Visa type is required");

        match take_off_day {
            Some(take_off_day) => errors.finish(NewTripRequest {
                full_name,
                email,
                phone: optional_text(self.phone),
                destination,
                departure_city,
                take_off_day,
                return_date,
                people,
                visa_type,
                preferences: optional_text(self.preferences),
            }),
            None => Err(errors),
        }
    }
}

impl NewTripRequest {
    /// Stamp identity and timestamps. New records always start `pending`.
    pub fn into_record(self, owner: Option<UserId>, now: DateTime<Utc>) -> TripRequest {
        TripRequest {
            id: TripRequestId::generate(),
            user_id: owner,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            destination: self.destination,
            departure_city: self.departure_city,
            take_off_day: self.take_off_day,
            return_date: self.return_date,
            people: self.people,
            visa_type: self.visa_type,
            preferences: self.preferences,
            status: TripStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (date part kept).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.date_naive()))
}

fn parse_people(raw: Option<&Value>) -> Result<u32, &'static str> {
    let count = match raw {
        None | Some(Value::Null) => return Err("Number of people is required"),
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|value| value.fract() == 0.0)
                    .map(|value| value as i64)
            })
            .ok_or("Number of people must be a whole number")?,
        Some(Value::String(text)) if text.trim().is_empty() => {
            return Err("Number of people is required")
        }
        Some(Value::String(text)) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| "Number of people must be a whole number")?,
        Some(_) => return Err("Number of people must be a whole number"),
    };
    if count < 1 {
        return Err("At least 1 person required");
    }
    u32::try_from(count)
        .ok()
        .filter(|count| *count <= MAX_PEOPLE)
        .ok_or("Number of people is too large")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission() -> TripSubmission {
        serde_json::from_value(json!({
            "fullName": "Ama Mensah",
            "email": "Ama@Example.com",
            "destination": "Dubai",
            "departureCity": "Accra",
            "takeOffDay": "2026-12-20",
            "people": 2,
            "visaType": "tourist"
        }))
        .expect("valid submission json")
    }

    #[test]
    fn valid_submission_is_normalized() {
        let request = submission().validate().expect("valid");
        assert_eq!(request.email, "ama@example.com");
        assert_eq!(request.people, 2);
        assert_eq!(
            request.take_off_day,
            NaiveDate::from_ymd_opt(2026, 12, 20).expect("date")
        );
        assert_eq!(request.phone, None);
        assert_eq!(request.return_date, None);
    }

    #[test]
    fn every_missing_field_is_reported() {
        let errors = TripSubmission::default().validate().expect_err("empty body");
        for field in [
            "fullName",
            "email",
            "destination",
            "departureCity",
            "takeOffDay",
            "people",
            "visaType",
        ] {
            assert!(errors.contains(field), "missing {field}");
        }
    }

    #[test]
    fn people_accepts_numeric_strings_but_not_zero() {
        let mut input = submission();
        input.people = Some(json!("3"));
        assert_eq!(input.validate().expect("valid").people, 3);

        let mut input = submission();
        input.people = Some(json!(0));
        let errors = input.validate().expect_err("zero travelers");
        assert_eq!(errors.fields()[0].message, "At least 1 person required");

        let mut input = submission();
        input.people = Some(json!("many"));
        assert!(input.validate().expect_err("not numeric").contains("people"));
    }

    #[test]
    fn people_is_capped_at_the_stored_integer_range() {
        let mut input = submission();
        input.people = Some(json!(i64::from(MAX_PEOPLE)));
        assert_eq!(input.validate().expect("largest party").people, MAX_PEOPLE);

        let mut input = submission();
        input.people = Some(json!(3_000_000_000u64));
        let errors = input.validate().expect_err("party too large");
        assert_eq!(errors.fields()[0].message, "Number of people is too large");

        let mut input = submission();
        input.people = Some(json!("2147483648"));
        assert!(input.validate().expect_err("string too large").contains("people"));
    }

    #[test]
    fn empty_optional_strings_are_absent() {
        let mut input = submission();
        input.phone = Some(String::new());
        input.return_date = Some("  ".to_string());
        input.preferences = Some("".to_string());
        let request = input.validate().expect("valid");
        assert_eq!(request.phone, None);
        assert_eq!(request.return_date, None);
        assert_eq!(request.preferences, None);
    }

    #[test]
    fn return_before_take_off_is_rejected() {
        let mut input = submission();
        input.return_date = Some("2026-12-01".to_string());
        assert!(input.validate().expect_err("backwards").contains("returnDate"));
    }

    #[test]
    fn dates_accept_rfc3339_timestamps() {
        assert_eq!(
            parse_date("2026-12-20T09:30:00Z"),
            NaiveDate::from_ymd_opt(2026, 12, 20)
        );
        assert_eq!(parse_date("20/12/2026"), None);
    }

    #[test]
    fn new_records_start_pending_with_matching_timestamps() {
        let now = Utc::now();
        let record = submission().validate().expect("valid").into_record(None, now);
        assert_eq!(record.status, TripStatus::Pending);
        assert_eq!(record.created_at, record.updated_at);
        assert_eq!(record.user_id, None);
    }

    #[test]
    fn records_serialize_in_camel_case() {
        let record = submission()
            .validate()
            .expect("valid")
            .into_record(Some(UserId::generate()), Utc::now());
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["takeOffDay"], "2026-12-20");
        assert_eq!(value["status"], "pending");
        assert!(value.get("userId").is_some());
    }

    #[test]
    fn trip_ids_reject_non_uuid_input() {
        assert!(TripRequestId::parse("not-an-id").is_none());
        let id = TripRequestId::generate();
        assert_eq!(TripRequestId::parse(&id.to_string()), Some(id));
    }
}
