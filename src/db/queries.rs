use anyhow::Context;
use chrono::{NaiveDateTime, Timelike, Utc};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, TransactionBehavior};

use crate::db::store::{BookingFilter, FlightFilter, FlightSearch};
use crate::errors::StoreError;
use crate::models::booking::generate_confirmation_number;
use crate::models::{normalize_flight_number, Booking, BookingStatus, Flight, FlightStatus, NewBooking};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MAX_CONFIRMATION_ATTEMPTS: usize = 16;

const FLIGHT_COLUMNS: &str = "flight_number, airline, origin, destination, departure_time, \
     arrival_time, status, price, available_seats";
const BOOKING_COLUMNS: &str = "id, confirmation_number, user_id, flight_number, passenger_name, \
     passenger_email, status, created_at, travel_date";

fn fmt_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

fn parse_ts(raw: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TS_FORMAT)
        .with_context(|| format!("invalid stored timestamp: {raw}"))
}

fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Flights ──

pub fn upsert_flight(conn: &Connection, flight: &Flight) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO flights (flight_number, airline, origin, destination, departure_time, arrival_time, status, price, available_seats)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(flight_number) DO UPDATE SET
           airline = excluded.airline,
           origin = excluded.origin,
           destination = excluded.destination,
           departure_time = excluded.departure_time,
           arrival_time = excluded.arrival_time,
           status = excluded.status,
           price = excluded.price,
           available_seats = excluded.available_seats",
        params![
            normalize_flight_number(&flight.flight_number),
            flight.airline.trim(),
            flight.origin.trim().to_uppercase(),
            flight.destination.trim().to_uppercase(),
            fmt_ts(&flight.departure_time),
            fmt_ts(&flight.arrival_time),
            flight.status.as_str(),
            flight.price,
            flight.available_seats,
        ],
    )
    .with_context(|| format!("failed to upsert flight {}", flight.flight_number))?;
    Ok(())
}

pub fn get_flight(conn: &Connection, flight_number: &str) -> anyhow::Result<Option<Flight>> {
    let result = conn.query_row(
        &format!("SELECT {FLIGHT_COLUMNS} FROM flights WHERE flight_number = ?1"),
        params![flight_number],
        |row| Ok(parse_flight_row(row)),
    );

    match result {
        Ok(flight) => Ok(Some(flight?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn search_flights(conn: &Connection, search: &FlightSearch) -> anyhow::Result<Vec<Flight>> {
    if search.destinations.is_empty() || search.limit == 0 {
        return Ok(vec![]);
    }

    let mut clauses = vec![];
    let mut values: Vec<Box<dyn ToSql>> = vec![];

    clauses.push(format!(
        "destination IN ({})",
        placeholders(values.len() + 1, search.destinations.len())
    ));
    for code in &search.destinations {
        values.push(Box::new(code.clone()));
    }

    if !search.origins.is_empty() {
        clauses.push(format!(
            "origin IN ({})",
            placeholders(values.len() + 1, search.origins.len())
        ));
        for code in &search.origins {
            values.push(Box::new(code.clone()));
        }
    }

    if search.exclude_cancelled {
        clauses.push("status != 'cancelled'".to_string());
    }

    values.push(Box::new(search.min_available_seats));
    clauses.push(format!("available_seats >= ?{}", values.len()));

    values.push(Box::new(search.limit as i64));
    let sql = format!(
        "SELECT {FLIGHT_COLUMNS} FROM flights WHERE {} ORDER BY departure_time ASC, flight_number ASC LIMIT ?{}",
        clauses.join(" AND "),
        values.len()
    );

    query_flights(conn, &sql, &values)
}

pub fn list_flights(conn: &Connection, filter: &FlightFilter) -> anyhow::Result<Vec<Flight>> {
    let mut clauses = vec!["1 = 1".to_string()];
    let mut values: Vec<Box<dyn ToSql>> = vec![];

    for (column, codes) in [("origin", &filter.origins), ("destination", &filter.destinations)] {
        if let Some(codes) = codes {
            if codes.is_empty() {
                return Ok(vec![]);
            }
            clauses.push(format!(
                "{column} IN ({})",
                placeholders(values.len() + 1, codes.len())
            ));
            for code in codes {
                values.push(Box::new(code.clone()));
            }
        }
    }

    if let Some(status) = filter.status {
        values.push(Box::new(status.as_str()));
        clauses.push(format!("status = ?{}", values.len()));
    }

    let sql = format!(
        "SELECT {FLIGHT_COLUMNS} FROM flights WHERE {} ORDER BY departure_time ASC, flight_number ASC",
        clauses.join(" AND ")
    );

    query_flights(conn, &sql, &values)
}

fn query_flights(
    conn: &Connection,
    sql: &str,
    values: &[Box<dyn ToSql>],
) -> anyhow::Result<Vec<Flight>> {
    let mut stmt = conn.prepare(sql)?;
    let params_refs: Vec<&dyn ToSql> = values.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_flight_row(row)))?;

    let mut flights = vec![];
    for row in rows {
        flights.push(row??);
    }
    Ok(flights)
}

fn parse_flight_row(row: &rusqlite::Row) -> anyhow::Result<Flight> {
    let departure_str: String = row.get(4)?;
    let arrival_str: String = row.get(5)?;
    let status_str: String = row.get(6)?;

    Ok(Flight {
        flight_number: row.get(0)?,
        airline: row.get(1)?,
        origin: row.get(2)?,
        destination: row.get(3)?,
        departure_time: parse_ts(&departure_str)?,
        arrival_time: parse_ts(&arrival_str)?,
        status: FlightStatus::parse(&status_str),
        price: row.get(7)?,
        available_seats: row.get(8)?,
    })
}

// ── Bookings ──

/// Inserts under a fresh confirmation number, retrying on code collisions.
/// The seat decrement shares the transaction, so a sold-out flight leaves no
/// booking behind.
pub fn insert_booking(conn: &mut Connection, new: &NewBooking) -> Result<Booking, StoreError> {
    for attempt in 1..=MAX_CONFIRMATION_ATTEMPTS {
        let now = Utc::now().naive_utc();
        let booking = Booking {
            id: uuid::Uuid::new_v4().to_string(),
            confirmation_number: generate_confirmation_number(),
            user_id: new.user_id.clone(),
            flight_number: new.flight_number.clone(),
            passenger_name: new.passenger_name.clone(),
            passenger_email: new.passenger_email.clone(),
            status: BookingStatus::Confirmed,
            created_at: now.with_nanosecond(0).unwrap_or(now),
            travel_date: new.travel_date,
        };

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let inserted = tx.execute(
            &format!(
                "INSERT INTO bookings ({BOOKING_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ),
            params![
                booking.id,
                booking.confirmation_number,
                booking.user_id,
                booking.flight_number,
                booking.passenger_name,
                booking.passenger_email,
                booking.status.as_str(),
                fmt_ts(&booking.created_at),
                fmt_ts(&booking.travel_date),
            ],
        );

        if let Err(e) = inserted {
            match unique_violation(&e) {
                Some(msg) if msg.contains("bookings.user_id") => {
                    return Err(StoreError::DuplicateBooking {
                        flight_number: new.flight_number.clone(),
                    });
                }
                Some(_) => {
                    tracing::debug!(attempt, "confirmation number collision, retrying");
                    continue;
                }
                None => return Err(e.into()),
            }
        }

        let seats = tx.execute(
            "UPDATE flights SET available_seats = available_seats - 1
             WHERE flight_number = ?1 AND available_seats > 0",
            params![booking.flight_number],
        )?;
        if seats == 0 {
            return Err(StoreError::SoldOut {
                flight_number: booking.flight_number,
            });
        }

        tx.commit()?;
        return Ok(booking);
    }

    Err(StoreError::ConfirmationCodeExhausted {
        attempts: MAX_CONFIRMATION_ATTEMPTS,
    })
}

fn unique_violation(err: &rusqlite::Error) -> Option<&str> {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && msg.starts_with("UNIQUE constraint failed") =>
        {
            Some(msg.as_str())
        }
        _ => None,
    }
}

pub fn find_bookings(
    conn: &Connection,
    filter: &BookingFilter,
    limit: usize,
) -> anyhow::Result<Vec<Booking>> {
    let mut clauses = vec!["1 = 1".to_string()];
    let mut values: Vec<Box<dyn ToSql>> = vec![];

    let text_filters = [
        ("user_id", &filter.user_id),
        ("confirmation_number", &filter.confirmation_number),
        ("flight_number", &filter.flight_number),
    ];
    for (column, value) in text_filters {
        if let Some(v) = value {
            values.push(Box::new(v.clone()));
            clauses.push(format!("{column} = ?{}", values.len()));
        }
    }

    if let Some(status) = filter.status {
        values.push(Box::new(status.as_str()));
        clauses.push(format!("status = ?{}", values.len()));
    }

    values.push(Box::new(limit as i64));
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE {} ORDER BY created_at DESC, rowid DESC LIMIT ?{}",
        clauses.join(" AND "),
        values.len()
    );

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn ToSql> = values.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn update_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET passenger_name = ?1, passenger_email = ?2, status = ?3, travel_date = ?4
         WHERE id = ?5",
        params![
            booking.passenger_name,
            booking.passenger_email,
            booking.status.as_str(),
            fmt_ts(&booking.travel_date),
            booking.id,
        ],
    )?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let status_str: String = row.get(6)?;
    let created_at_str: String = row.get(7)?;
    let travel_date_str: String = row.get(8)?;

    Ok(Booking {
        id: row.get(0)?,
        confirmation_number: row.get(1)?,
        user_id: row.get(2)?,
        flight_number: row.get(3)?,
        passenger_name: row.get(4)?,
        passenger_email: row.get(5)?,
        status: BookingStatus::parse(&status_str),
        created_at: parse_ts(&created_at_str)?,
        travel_date: parse_ts(&travel_date_str)?,
    })
}
