use chrono::{NaiveDate, NaiveTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, Client};

pub struct BookingRequest {
    pub user_id: String,
    pub service_id: String,
    pub date: String,
    pub time: String,
    pub client_name: String,
    pub client_phone: String,
}

/// Validates and commits a new booking. The booking row and the derived
/// client aggregate are written in one transaction: a failure at any point
/// leaves both tables untouched.
pub fn create_booking(conn: &mut Connection, req: &BookingRequest) -> Result<Booking, AppError> {
    let mut missing = vec![];
    if req.user_id.trim().is_empty() {
        missing.push("user_id");
    }
    if req.client_name.trim().is_empty() {
        missing.push("client_name");
    }
    if req.service_id.trim().is_empty() {
        missing.push("service_id");
    }
    if req.date.trim().is_empty() {
        missing.push("date");
    }
    if req.time.trim().is_empty() {
        missing.push("time");
    }
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    let date = NaiveDate::parse_from_str(&req.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date: {}", req.date)))?;
    NaiveTime::parse_from_str(&req.time, "%H:%M")
        .map_err(|_| AppError::Validation(format!("invalid time: {}", req.time)))?;

    let tx = conn.transaction()?;

    let service = queries::get_service(&tx, &req.user_id, &req.service_id)?
        .ok_or_else(|| AppError::NotFound(format!("service {}", req.service_id)))?;

    if queries::slot_taken(&tx, &req.user_id, &req.date, &req.time)? {
        return Err(AppError::Conflict(format!(
            "slot {} {} is already booked",
            req.date, req.time
        )));
    }

    let now = Utc::now().naive_utc();
    let booking = Booking {
        id: Uuid::new_v4().to_string(),
        user_id: req.user_id.clone(),
        service_id: service.id.clone(),
        service_name: service.name.clone(),
        client_name: req.client_name.clone(),
        client_phone: req.client_phone.clone(),
        date: req.date.clone(),
        time: req.time.clone(),
        status: BookingStatus::Confirmed,
        created_at: now,
        updated_at: now,
    };
    queries::insert_booking(&tx, &booking)?;

    match queries::get_client_by_phone(&tx, &req.user_id, &req.client_phone)? {
        Some(mut client) => {
            client.total_bookings += 1;
            // Out-of-order creation (e.g. backfilled bookings) must not
            // regress the aggregate, so take the later of the two dates.
            let last_seen = NaiveDate::parse_from_str(&client.last_visit, "%Y-%m-%d").ok();
            if last_seen.map_or(true, |seen| date > seen) {
                client.last_visit = req.date.clone();
            }
            queries::save_client(&tx, &client)?;
        }
        None => {
            queries::save_client(
                &tx,
                &Client {
                    id: Uuid::new_v4().to_string(),
                    user_id: req.user_id.clone(),
                    name: req.client_name.clone(),
                    phone: req.client_phone.clone(),
                    last_visit: req.date.clone(),
                    total_bookings: 1,
                },
            )?;
        }
    }

    tx.commit()?;

    Ok(booking)
}

/// Flips a booking to cancelled within the owner's partition. Cancelling an
/// already-cancelled booking succeeds again; an unknown id is reported, not
/// swallowed. There is no un-cancel.
pub fn cancel_booking(conn: &Connection, user_id: &str, booking_id: &str) -> Result<(), AppError> {
    let updated = queries::set_booking_status(conn, user_id, booking_id, &BookingStatus::Cancelled)?;
    if !updated {
        return Err(AppError::NotFound(format!("booking {booking_id}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::Service;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn seed_service(conn: &Connection, user_id: &str, id: &str, name: &str) {
        queries::save_service(
            conn,
            &Service {
                id: id.to_string(),
                user_id: user_id.to_string(),
                name: name.to_string(),
                duration_minutes: 30,
                price: 20.0,
                enable_payment: false,
            },
        )
        .unwrap();
    }

    fn request(date: &str, time: &str) -> BookingRequest {
        BookingRequest {
            user_id: "u1".to_string(),
            service_id: "s1".to_string(),
            date: date.to_string(),
            time: time.to_string(),
            client_name: "Ana".to_string(),
            client_phone: "600111222".to_string(),
        }
    }

    #[test]
    fn test_happy_path_creates_booking_and_client() {
        let mut conn = setup_db();
        seed_service(&conn, "u1", "s1", "Haircut");

        let booking = create_booking(&mut conn, &request("2025-05-15", "10:30")).unwrap();

        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.service_name, "Haircut");
        assert_eq!(booking.date, "2025-05-15");
        assert_eq!(booking.time, "10:30");

        let clients = queries::list_clients(&conn, "u1").unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].phone, "600111222");
        assert_eq!(clients[0].total_bookings, 1);
        assert_eq!(clients[0].last_visit, "2025-05-15");
    }

    #[test]
    fn test_service_name_is_a_snapshot() {
        let mut conn = setup_db();
        seed_service(&conn, "u1", "s1", "Haircut");

        let booking = create_booking(&mut conn, &request("2025-05-15", "10:30")).unwrap();

        // Rename the service afterwards; the booking keeps the old name.
        seed_service(&conn, "u1", "s1", "Premium Cut");
        let stored = queries::get_booking(&conn, "u1", &booking.id)
            .unwrap()
            .unwrap();
        assert_eq!(stored.service_name, "Haircut");
    }

    #[test]
    fn test_missing_fields_rejected() {
        let mut conn = setup_db();
        seed_service(&conn, "u1", "s1", "Haircut");

        let mut req = request("2025-05-15", "10:30");
        req.client_name = String::new();
        req.time = String::new();

        let err = create_booking(&mut conn, &req).unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("client_name"));
                assert!(msg.contains("time"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(queries::list_bookings(&conn, "u1").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_date_rejected() {
        let mut conn = setup_db();
        seed_service(&conn, "u1", "s1", "Haircut");

        let result = create_booking(&mut conn, &request("15-05-2025", "10:30"));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_unknown_service_leaves_store_untouched() {
        let mut conn = setup_db();

        let result = create_booking(&mut conn, &request("2025-05-15", "10:30"));
        assert!(matches!(result, Err(AppError::NotFound(_))));

        assert!(queries::list_bookings(&conn, "u1").unwrap().is_empty());
        assert!(queries::list_clients(&conn, "u1").unwrap().is_empty());
    }

    #[test]
    fn test_double_booking_rejected() {
        let mut conn = setup_db();
        seed_service(&conn, "u1", "s1", "Haircut");

        create_booking(&mut conn, &request("2025-05-15", "10:30")).unwrap();

        let mut second = request("2025-05-15", "10:30");
        second.client_name = "Luis".to_string();
        second.client_phone = "600333444".to_string();

        let result = create_booking(&mut conn, &second);
        assert!(matches!(result, Err(AppError::Conflict(_))));

        // The losing attempt must not leave a client behind either.
        let clients = queries::list_clients(&conn, "u1").unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].phone, "600111222");
    }

    #[test]
    fn test_cancelled_slot_can_be_rebooked() {
        let mut conn = setup_db();
        seed_service(&conn, "u1", "s1", "Haircut");

        let first = create_booking(&mut conn, &request("2025-05-15", "10:30")).unwrap();
        cancel_booking(&conn, "u1", &first.id).unwrap();

        let second = create_booking(&mut conn, &request("2025-05-15", "10:30")).unwrap();
        assert_eq!(second.status, BookingStatus::Confirmed);
    }

    #[test]
    fn test_client_aggregation_counts_every_booking() {
        let mut conn = setup_db();
        seed_service(&conn, "u1", "s1", "Haircut");

        create_booking(&mut conn, &request("2025-05-10", "09:00")).unwrap();
        create_booking(&mut conn, &request("2025-05-12", "11:00")).unwrap();
        create_booking(&mut conn, &request("2025-05-15", "10:30")).unwrap();

        let clients = queries::list_clients(&conn, "u1").unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].total_bookings, 3);
        assert_eq!(clients[0].last_visit, "2025-05-15");
    }

    #[test]
    fn test_out_of_order_bookings_keep_latest_visit() {
        let mut conn = setup_db();
        seed_service(&conn, "u1", "s1", "Haircut");

        create_booking(&mut conn, &request("2025-05-15", "10:30")).unwrap();
        // A backfilled booking with an earlier date.
        create_booking(&mut conn, &request("2025-04-01", "09:00")).unwrap();

        let clients = queries::list_clients(&conn, "u1").unwrap();
        assert_eq!(clients[0].total_bookings, 2);
        assert_eq!(clients[0].last_visit, "2025-05-15");
    }

    #[test]
    fn test_cancellation_does_not_decrement_aggregate() {
        let mut conn = setup_db();
        seed_service(&conn, "u1", "s1", "Haircut");

        let booking = create_booking(&mut conn, &request("2025-05-15", "10:30")).unwrap();
        cancel_booking(&conn, "u1", &booking.id).unwrap();

        let clients = queries::list_clients(&conn, "u1").unwrap();
        assert_eq!(clients[0].total_bookings, 1);
    }

    #[test]
    fn test_same_phone_under_two_tenants_stays_separate() {
        let mut conn = setup_db();
        seed_service(&conn, "u1", "s1", "Haircut");
        seed_service(&conn, "u2", "s2", "Massage");

        create_booking(&mut conn, &request("2025-05-15", "10:30")).unwrap();

        let mut other = request("2025-05-16", "12:00");
        other.user_id = "u2".to_string();
        other.service_id = "s2".to_string();
        create_booking(&mut conn, &other).unwrap();

        assert_eq!(queries::list_clients(&conn, "u1").unwrap().len(), 1);
        assert_eq!(queries::list_clients(&conn, "u2").unwrap().len(), 1);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut conn = setup_db();
        seed_service(&conn, "u1", "s1", "Haircut");

        let booking = create_booking(&mut conn, &request("2025-05-15", "10:30")).unwrap();

        cancel_booking(&conn, "u1", &booking.id).unwrap();
        cancel_booking(&conn, "u1", &booking.id).unwrap();

        let stored = queries::get_booking(&conn, "u1", &booking.id)
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_cancel_unknown_booking_reported() {
        let conn = setup_db();
        let result = cancel_booking(&conn, "u1", "nope");
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_cancel_is_partition_scoped() {
        let mut conn = setup_db();
        seed_service(&conn, "u1", "s1", "Haircut");

        let booking = create_booking(&mut conn, &request("2025-05-15", "10:30")).unwrap();

        // Another tenant cannot cancel it.
        let result = cancel_booking(&conn, "u2", &booking.id);
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let stored = queries::get_booking(&conn, "u1", &booking.id)
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, BookingStatus::Confirmed);
    }
}
