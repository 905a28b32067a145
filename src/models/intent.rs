use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::booking::{is_confirmation_number, CONFIRMATION_PREFIX};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IntentKind {
    Booking,
    Status,
    Cancellation,
    Unclear,
}

impl IntentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::Booking => "booking",
            IntentKind::Status => "status",
            IntentKind::Cancellation => "cancellation",
            IntentKind::Unclear => "unclear",
        }
    }

    /// Exact label match only; callers decide what an unknown label means.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "booking" => Some(IntentKind::Booking),
            "status" => Some(IntentKind::Status),
            "cancellation" => Some(IntentKind::Cancellation),
            "unclear" => Some(IntentKind::Unclear),
            _ => None,
        }
    }
}

/// One slot of an extraction. `Invalid` keeps the raw text the model gave us
/// so replies can quote it back.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Absent,
    Invalid(String),
    Present(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> Field<T> {
    pub fn present(&self) -> Option<&T> {
        match self {
            Field::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }
}

/// Structured reading of a single message. Every slot is validated and
/// normalized before it lands here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub flight_number: Field<String>,
    pub passenger_name: Field<String>,
    pub passenger_email: Field<String>,
    pub travel_date: Field<NaiveDateTime>,
    pub destination: Field<String>,
    pub origin: Field<String>,
    pub confirmation_number: Field<String>,
}

impl ExtractedFields {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(obj: &Map<String, Value>) -> Self {
        Self {
            flight_number: field(obj, &["flight_number", "flightNumber"], parse_flight_number),
            passenger_name: field(obj, &["passenger_name", "passengerName"], parse_text),
            passenger_email: field(obj, &["passenger_email", "passengerEmail"], parse_email),
            travel_date: field(obj, &["travel_date", "travelDate"], parse_travel_date),
            destination: field(obj, &["destination"], parse_text),
            origin: field(obj, &["origin"], parse_text),
            confirmation_number: field(
                obj,
                &["confirmation_number", "confirmationNumber"],
                parse_confirmation_number,
            ),
        }
    }
}

fn field<T>(obj: &Map<String, Value>, keys: &[&str], parse: fn(&str) -> Option<T>) -> Field<T> {
    let value = keys
        .iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null());

    match value {
        None => Field::Absent,
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
                return Field::Absent;
            }
            match parse(trimmed) {
                Some(v) => Field::Present(v),
                None => Field::Invalid(trimmed.to_string()),
            }
        }
        Some(other) => Field::Invalid(other.to_string()),
    }
}

fn parse_text(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

/// 3-8 ASCII alphanumerics with at least one digit, e.g. `AA101`, `UA2`.
pub fn parse_flight_number(raw: &str) -> Option<String> {
    let code: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    let valid = (3..=8).contains(&code.len())
        && code.chars().all(|c| c.is_ascii_alphanumeric())
        && code.chars().any(|c| c.is_ascii_digit());
    valid.then_some(code)
}

/// Accepts `BK-ABC123` or the bare `ABC123`, returns the prefixed form.
pub fn parse_confirmation_number(raw: &str) -> Option<String> {
    let upper = raw.trim().to_uppercase();
    let code = if upper.starts_with(CONFIRMATION_PREFIX) {
        upper
    } else {
        format!("{CONFIRMATION_PREFIX}{upper}")
    };
    is_confirmation_number(&code).then_some(code)
}

pub fn parse_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    if email.chars().any(char::is_whitespace) {
        return None;
    }
    let (local, domain) = email.rsplit_once('@')?;
    let (host, tld) = domain.rsplit_once('.')?;
    if local.is_empty() || host.is_empty() || tld.is_empty() {
        return None;
    }
    Some(email)
}

pub fn parse_travel_date(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(v: Value) -> ExtractedFields {
        ExtractedFields::from_json(v.as_object().unwrap())
    }

    #[test]
    fn test_intent_labels() {
        assert_eq!(IntentKind::from_label("booking"), Some(IntentKind::Booking));
        assert_eq!(IntentKind::from_label("unclear"), Some(IntentKind::Unclear));
        assert_eq!(IntentKind::from_label("Booking"), None);
        assert_eq!(IntentKind::from_label("book"), None);
    }

    #[test]
    fn test_from_json_snake_case() {
        let f = fields(json!({
            "flight_number": " aa101 ",
            "passenger_name": "John   Doe",
            "passenger_email": "John@Example.COM",
            "travel_date": "2025-02-15",
            "destination": null
        }));
        assert_eq!(f.flight_number, Field::Present("AA101".to_string()));
        assert_eq!(f.passenger_name, Field::Present("John Doe".to_string()));
        assert_eq!(f.passenger_email, Field::Present("john@example.com".to_string()));
        assert_eq!(
            f.travel_date.present().map(|d| d.to_string()),
            Some("2025-02-15 00:00:00".to_string())
        );
        assert!(f.destination.is_absent());
        assert!(f.confirmation_number.is_absent());
    }

    #[test]
    fn test_from_json_camel_case_aliases() {
        let f = fields(json!({"flightNumber": "UA 245", "confirmationNumber": "abc123"}));
        assert_eq!(f.flight_number, Field::Present("UA245".to_string()));
        assert_eq!(f.confirmation_number, Field::Present("BK-ABC123".to_string()));
    }

    #[test]
    fn test_absent_vs_invalid() {
        let f = fields(json!({
            "flight_number": "tomorrow",
            "passenger_email": "not an email",
            "passenger_name": "",
            "origin": "null",
            "destination": 42,
            "travel_date": "next tuesday"
        }));
        assert_eq!(f.flight_number, Field::Invalid("tomorrow".to_string()));
        assert_eq!(f.passenger_email, Field::Invalid("not an email".to_string()));
        assert!(f.passenger_name.is_absent());
        assert!(f.origin.is_absent());
        assert_eq!(f.destination, Field::Invalid("42".to_string()));
        assert_eq!(f.travel_date, Field::Invalid("next tuesday".to_string()));
    }

    #[test]
    fn test_confirmation_number_forms() {
        assert_eq!(parse_confirmation_number("bk-abc123").as_deref(), Some("BK-ABC123"));
        assert_eq!(parse_confirmation_number("XYZ789").as_deref(), Some("BK-XYZ789"));
        assert_eq!(parse_confirmation_number("BK-AB"), None);
        assert_eq!(parse_confirmation_number("BK-ABC-12"), None);
    }

    #[test]
    fn test_flight_number_rules() {
        assert_eq!(parse_flight_number("dl9").as_deref(), Some("DL9"));
        assert_eq!(parse_flight_number("AB"), None);
        assert_eq!(parse_flight_number("ABCDEF"), None);
        assert_eq!(parse_flight_number("AA-101"), None);
    }

    #[test]
    fn test_email_rules() {
        assert!(parse_email("a@b.co").is_some());
        assert!(parse_email("a@b").is_none());
        assert!(parse_email("@b.co").is_none());
        assert!(parse_email("a@.co").is_none());
    }

    #[test]
    fn test_travel_date_formats() {
        assert!(parse_travel_date("2025-02-15T09:30:00Z").is_some());
        assert!(parse_travel_date("2025-02-15 09:30").is_some());
        assert!(parse_travel_date("2025-02-15T09:30").is_some());
        assert!(parse_travel_date("15/02/2025").is_none());
    }
}
