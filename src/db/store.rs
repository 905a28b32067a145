use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::db::queries;
use crate::errors::StoreError;
use crate::models::{Booking, BookingStatus, Flight, FlightStatus, NewBooking};

/// Candidate-flight query used for destination suggestions.
#[derive(Debug, Clone, Default)]
pub struct FlightSearch {
    pub destinations: Vec<String>,
    /// Restricts origins when non-empty.
    pub origins: Vec<String>,
    pub exclude_cancelled: bool,
    pub min_available_seats: i64,
    pub limit: usize,
}

/// Plain listing filter for the flights API. Fields left `None` match anything.
#[derive(Debug, Clone, Default)]
pub struct FlightFilter {
    pub origins: Option<Vec<String>>,
    pub destinations: Option<Vec<String>>,
    pub status: Option<FlightStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub user_id: Option<String>,
    pub confirmation_number: Option<String>,
    pub flight_number: Option<String>,
    pub status: Option<BookingStatus>,
}

impl BookingFilter {
    pub fn for_user(user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            ..Self::default()
        }
    }

    pub fn confirmation_number(mut self, code: &str) -> Self {
        self.confirmation_number = Some(code.to_string());
        self
    }

    pub fn flight_number(mut self, flight_number: &str) -> Self {
        self.flight_number = Some(flight_number.to_string());
        self
    }

    pub fn status(mut self, status: BookingStatus) -> Self {
        self.status = Some(status);
        self
    }
}

pub trait FlightStore: Send + Sync {
    fn find_by_number(&self, flight_number: &str) -> anyhow::Result<Option<Flight>>;

    /// Ordered by departure ascending, capped at `search.limit`.
    fn search(&self, search: &FlightSearch) -> anyhow::Result<Vec<Flight>>;

    fn list(&self, filter: &FlightFilter) -> anyhow::Result<Vec<Flight>>;

    fn upsert(&self, flight: &Flight) -> anyhow::Result<()>;
}

pub trait BookingStore: Send + Sync {
    fn find_one(&self, filter: &BookingFilter) -> anyhow::Result<Option<Booking>>;

    /// Newest first.
    fn find_many(&self, filter: &BookingFilter, limit: usize) -> anyhow::Result<Vec<Booking>>;

    /// Inserts a confirmed booking under a freshly generated confirmation
    /// number and takes one seat from the flight, atomically.
    fn create(&self, booking: NewBooking) -> Result<Booking, StoreError>;

    fn save(&self, booking: &Booking) -> anyhow::Result<()>;
}

/// Both stores over one shared SQLite connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    pub fn open(path: &str) -> anyhow::Result<Self> {
        let conn = super::init_db(path)?;
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database connection lock poisoned"))
    }
}

impl FlightStore for SqliteStore {
    fn find_by_number(&self, flight_number: &str) -> anyhow::Result<Option<Flight>> {
        let conn = self.lock()?;
        queries::get_flight(&conn, flight_number)
    }

    fn search(&self, search: &FlightSearch) -> anyhow::Result<Vec<Flight>> {
        let conn = self.lock()?;
        queries::search_flights(&conn, search)
    }

    fn list(&self, filter: &FlightFilter) -> anyhow::Result<Vec<Flight>> {
        let conn = self.lock()?;
        queries::list_flights(&conn, filter)
    }

    fn upsert(&self, flight: &Flight) -> anyhow::Result<()> {
        let conn = self.lock()?;
        queries::upsert_flight(&conn, flight)
    }
}

impl BookingStore for SqliteStore {
    fn find_one(&self, filter: &BookingFilter) -> anyhow::Result<Option<Booking>> {
        let conn = self.lock()?;
        Ok(queries::find_bookings(&conn, filter, 1)?.into_iter().next())
    }

    fn find_many(&self, filter: &BookingFilter, limit: usize) -> anyhow::Result<Vec<Booking>> {
        let conn = self.lock()?;
        queries::find_bookings(&conn, filter, limit)
    }

    fn create(&self, booking: NewBooking) -> Result<Booking, StoreError> {
        let mut conn = self.lock()?;
        queries::insert_booking(&mut conn, &booking)
    }

    fn save(&self, booking: &Booking) -> anyhow::Result<()> {
        let conn = self.lock()?;
        if !queries::update_booking(&conn, booking)? {
            anyhow::bail!("booking {} does not exist", booking.confirmation_number);
        }
        Ok(())
    }
}
