use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{Booking, BookingStatus, Client, Service, User};

// ── Users ──

pub fn create_user(conn: &Connection, user: &User) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO users (id, email, business_name, full_name, google_calendar_connected, twilio_token_connected, twilio_token)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user.id,
            user.email,
            user.business_name,
            user.full_name,
            user.google_calendar_connected as i32,
            user.twilio_token_connected as i32,
            user.twilio_token,
        ],
    )?;
    Ok(())
}

pub fn save_user(conn: &Connection, user: &User) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO users (id, email, business_name, full_name, google_calendar_connected, twilio_token_connected, twilio_token)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
           email = excluded.email,
           business_name = excluded.business_name,
           full_name = excluded.full_name,
           google_calendar_connected = excluded.google_calendar_connected,
           twilio_token_connected = excluded.twilio_token_connected,
           twilio_token = excluded.twilio_token,
           updated_at = datetime('now')",
        params![
            user.id,
            user.email,
            user.business_name,
            user.full_name,
            user.google_calendar_connected as i32,
            user.twilio_token_connected as i32,
            user.twilio_token,
        ],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, email, business_name, full_name, google_calendar_connected, twilio_token_connected, twilio_token
         FROM users WHERE id = ?1",
        params![id],
        parse_user_row,
    );

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, email, business_name, full_name, google_calendar_connected, twilio_token_connected, twilio_token
         FROM users WHERE email = ?1",
        params![email],
        parse_user_row,
    );

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_user_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        business_name: row.get(2)?,
        full_name: row.get(3)?,
        google_calendar_connected: row.get::<_, i32>(4)? != 0,
        twilio_token_connected: row.get::<_, i32>(5)? != 0,
        twilio_token: row.get(6)?,
    })
}

// ── Services ──

pub fn list_services(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<Service>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, duration_minutes, price, enable_payment
         FROM services WHERE user_id = ?1 ORDER BY name ASC",
    )?;

    let rows = stmt.query_map(params![user_id], parse_service_row)?;

    let mut services = vec![];
    for row in rows {
        services.push(row?);
    }
    Ok(services)
}

pub fn get_service(conn: &Connection, user_id: &str, id: &str) -> anyhow::Result<Option<Service>> {
    let result = conn.query_row(
        "SELECT id, user_id, name, duration_minutes, price, enable_payment
         FROM services WHERE user_id = ?1 AND id = ?2",
        params![user_id, id],
        parse_service_row,
    );

    match result {
        Ok(service) => Ok(Some(service)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn save_service(conn: &Connection, service: &Service) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO services (id, user_id, name, duration_minutes, price, enable_payment)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
           name = excluded.name,
           duration_minutes = excluded.duration_minutes,
           price = excluded.price,
           enable_payment = excluded.enable_payment",
        params![
            service.id,
            service.user_id,
            service.name,
            service.duration_minutes,
            service.price,
            service.enable_payment as i32,
        ],
    )?;
    Ok(())
}

pub fn delete_service(conn: &Connection, user_id: &str, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "DELETE FROM services WHERE user_id = ?1 AND id = ?2",
        params![user_id, id],
    )?;
    Ok(count > 0)
}

fn parse_service_row(row: &rusqlite::Row) -> rusqlite::Result<Service> {
    Ok(Service {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        duration_minutes: row.get(3)?,
        price: row.get(4)?,
        enable_payment: row.get::<_, i32>(5)? != 0,
    })
}

// ── Bookings ──

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    let created_at = booking.created_at.format("%Y-%m-%d %H:%M:%S").to_string();
    let updated_at = booking.updated_at.format("%Y-%m-%d %H:%M:%S").to_string();

    conn.execute(
        "INSERT INTO bookings (id, user_id, service_id, service_name, client_name, client_phone, date, time, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            booking.id,
            booking.user_id,
            booking.service_id,
            booking.service_name,
            booking.client_name,
            booking.client_phone,
            booking.date,
            booking.time,
            booking.status.as_str(),
            created_at,
            updated_at,
        ],
    )?;
    Ok(())
}

pub fn list_bookings(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, service_id, service_name, client_name, client_phone, date, time, status, created_at, updated_at
         FROM bookings WHERE user_id = ?1 ORDER BY date ASC, time ASC",
    )?;

    let rows = stmt.query_map(params![user_id], parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

pub fn get_booking(conn: &Connection, user_id: &str, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        "SELECT id, user_id, service_id, service_name, client_name, client_phone, date, time, status, created_at, updated_at
         FROM bookings WHERE user_id = ?1 AND id = ?2",
        params![user_id, id],
        parse_booking_row,
    );

    match result {
        Ok(booking) => Ok(Some(booking)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Times on the given date that are held by a non-cancelled booking.
pub fn occupied_times(conn: &Connection, user_id: &str, date: &str) -> anyhow::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT time FROM bookings
         WHERE user_id = ?1 AND date = ?2 AND status != 'cancelled'",
    )?;

    let rows = stmt.query_map(params![user_id, date], |row| row.get(0))?;

    let mut times = vec![];
    for row in rows {
        times.push(row?);
    }
    Ok(times)
}

pub fn slot_taken(conn: &Connection, user_id: &str, date: &str, time: &str) -> anyhow::Result<bool> {
    let taken: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM bookings
         WHERE user_id = ?1 AND date = ?2 AND time = ?3 AND status != 'cancelled'",
        params![user_id, date, time],
        |row| row.get(0),
    )?;
    Ok(taken)
}

pub fn set_booking_status(
    conn: &Connection,
    user_id: &str,
    id: &str,
    status: &BookingStatus,
) -> anyhow::Result<bool> {
    let now = Utc::now()
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE user_id = ?3 AND id = ?4",
        params![status.as_str(), now, user_id, id],
    )?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> rusqlite::Result<Booking> {
    let status_str: String = row.get(8)?;
    let created_at_str: String = row.get(9)?;
    let updated_at_str: String = row.get(10)?;

    let created_at = NaiveDateTime::parse_from_str(&created_at_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());
    let updated_at = NaiveDateTime::parse_from_str(&updated_at_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());

    Ok(Booking {
        id: row.get(0)?,
        user_id: row.get(1)?,
        service_id: row.get(2)?,
        service_name: row.get(3)?,
        client_name: row.get(4)?,
        client_phone: row.get(5)?,
        date: row.get(6)?,
        time: row.get(7)?,
        status: BookingStatus::parse(&status_str),
        created_at,
        updated_at,
    })
}

// ── Clients ──

pub fn list_clients(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<Client>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, phone, last_visit, total_bookings
         FROM clients WHERE user_id = ?1 ORDER BY last_visit DESC",
    )?;

    let rows = stmt.query_map(params![user_id], parse_client_row)?;

    let mut clients = vec![];
    for row in rows {
        clients.push(row?);
    }
    Ok(clients)
}

pub fn get_client_by_phone(
    conn: &Connection,
    user_id: &str,
    phone: &str,
) -> anyhow::Result<Option<Client>> {
    let result = conn.query_row(
        "SELECT id, user_id, name, phone, last_visit, total_bookings
         FROM clients WHERE user_id = ?1 AND phone = ?2",
        params![user_id, phone],
        parse_client_row,
    );

    match result {
        Ok(client) => Ok(Some(client)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn save_client(conn: &Connection, client: &Client) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO clients (id, user_id, name, phone, last_visit, total_bookings)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(user_id, phone) DO UPDATE SET
           last_visit = excluded.last_visit,
           total_bookings = excluded.total_bookings",
        params![
            client.id,
            client.user_id,
            client.name,
            client.phone,
            client.last_visit,
            client.total_bookings,
        ],
    )?;
    Ok(())
}

fn parse_client_row(row: &rusqlite::Row) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        last_visit: row.get(4)?,
        total_bookings: row.get(5)?,
    })
}
