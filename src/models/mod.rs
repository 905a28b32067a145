pub mod booking;
pub mod flight;
pub mod intent;
pub mod user;

pub use booking::{Booking, BookingStatus, NewBooking};
pub use flight::{normalize_flight_number, Flight, FlightStatus};
pub use intent::{parse_confirmation_number, ExtractedFields, Field, IntentKind};
pub use user::Caller;
