use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const CONFIRMATION_PREFIX: &str = "BK-";
const CONFIRMATION_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CONFIRMATION_LEN: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: String,
    pub confirmation_number: String,
    pub user_id: String,
    pub flight_number: String,
    pub passenger_name: String,
    pub passenger_email: String,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
    pub travel_date: NaiveDateTime,
}

/// Fields supplied by the caller when inserting a booking. The store assigns
/// the id, confirmation number, status and creation time.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: String,
    pub flight_number: String,
    pub passenger_name: String,
    pub passenger_email: String,
    pub travel_date: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Confirmed,
        }
    }
}

/// A fresh `BK-XXXXXX` code. Uniqueness is enforced by the store, which
/// retries on collision.
pub fn generate_confirmation_number() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..CONFIRMATION_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CONFIRMATION_ALPHABET.len());
            CONFIRMATION_ALPHABET[idx] as char
        })
        .collect();
    format!("{CONFIRMATION_PREFIX}{suffix}")
}

pub fn is_confirmation_number(s: &str) -> bool {
    s.strip_prefix(CONFIRMATION_PREFIX)
        .map(|rest| {
            rest.len() == CONFIRMATION_LEN
                && rest
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        })
        .unwrap_or(false)
}
