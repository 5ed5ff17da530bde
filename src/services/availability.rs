use std::collections::HashSet;

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::TimeSlot;

pub const OPENING_HOUR: u32 = 9;
pub const CLOSING_HOUR: u32 = 19;

/// The fixed half-hour grid offered every day: 09:00, 09:30, ..., 18:30,
/// 19:00. The closing hour contributes only its :00 slot, so the grid has 21
/// entries.
pub fn slot_grid() -> Vec<String> {
    let mut slots: Vec<String> = (OPENING_HOUR..CLOSING_HOUR)
        .flat_map(|hour| [format!("{hour:02}:00"), format!("{hour:02}:30")])
        .collect();
    slots.push(format!("{CLOSING_HOUR:02}:00"));
    slots
}

/// Availability for a business on a date: the full grid minus the times held
/// by non-cancelled bookings. Depends only on persisted bookings, so the same
/// state always yields the same answer.
pub fn available_slots(
    conn: &Connection,
    user_id: &str,
    date: &str,
) -> Result<Vec<TimeSlot>, AppError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date: {date}")))?;

    let occupied: HashSet<String> = queries::occupied_times(conn, user_id, date)?
        .into_iter()
        .collect();

    Ok(slot_grid()
        .into_iter()
        .map(|time| {
            let available = !occupied.contains(&time);
            TimeSlot { time, available }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::services::booking::{self, BookingRequest};

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn seed_service(conn: &Connection, user_id: &str, id: &str) {
        crate::db::queries::save_service(
            conn,
            &crate::models::Service {
                id: id.to_string(),
                user_id: user_id.to_string(),
                name: "Haircut".to_string(),
                duration_minutes: 30,
                price: 20.0,
                enable_payment: false,
            },
        )
        .unwrap();
    }

    #[test]
    fn test_grid_has_21_half_hour_slots() {
        let grid = slot_grid();
        assert_eq!(grid.len(), 21);
        assert_eq!(grid.first().unwrap(), "09:00");
        assert_eq!(grid.last().unwrap(), "19:00");
        assert!(grid.contains(&"09:30".to_string()));
        assert!(grid.contains(&"18:30".to_string()));
        assert!(!grid.contains(&"19:30".to_string()));
    }

    #[test]
    fn test_empty_schedule_is_fully_available() {
        let conn = setup_db();
        let slots = available_slots(&conn, "u1", "2025-05-15").unwrap();
        assert_eq!(slots.len(), 21);
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn test_booked_slot_is_unavailable() {
        let mut conn = setup_db();
        seed_service(&conn, "u1", "s1");
        booking::create_booking(
            &mut conn,
            &BookingRequest {
                user_id: "u1".to_string(),
                service_id: "s1".to_string(),
                date: "2025-05-15".to_string(),
                time: "10:30".to_string(),
                client_name: "Ana".to_string(),
                client_phone: "600111222".to_string(),
            },
        )
        .unwrap();

        let slots = available_slots(&conn, "u1", "2025-05-15").unwrap();
        let taken: Vec<_> = slots.iter().filter(|s| !s.available).collect();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].time, "10:30");
    }

    #[test]
    fn test_cancelled_booking_frees_the_slot() {
        let mut conn = setup_db();
        seed_service(&conn, "u1", "s1");
        let created = booking::create_booking(
            &mut conn,
            &BookingRequest {
                user_id: "u1".to_string(),
                service_id: "s1".to_string(),
                date: "2025-05-15".to_string(),
                time: "10:30".to_string(),
                client_name: "Ana".to_string(),
                client_phone: "600111222".to_string(),
            },
        )
        .unwrap();

        booking::cancel_booking(&conn, "u1", &created.id).unwrap();

        let slots = available_slots(&conn, "u1", "2025-05-15").unwrap();
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn test_other_tenants_bookings_do_not_block() {
        let mut conn = setup_db();
        seed_service(&conn, "u1", "s1");
        booking::create_booking(
            &mut conn,
            &BookingRequest {
                user_id: "u1".to_string(),
                service_id: "s1".to_string(),
                date: "2025-05-15".to_string(),
                time: "10:30".to_string(),
                client_name: "Ana".to_string(),
                client_phone: "600111222".to_string(),
            },
        )
        .unwrap();

        let slots = available_slots(&conn, "u2", "2025-05-15").unwrap();
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn test_same_state_same_answer() {
        let conn = setup_db();
        let first = available_slots(&conn, "u1", "2025-05-15").unwrap();
        let second = available_slots(&conn, "u1", "2025-05-15").unwrap();
        let times = |slots: &[TimeSlot]| {
            slots
                .iter()
                .map(|s| (s.time.clone(), s.available))
                .collect::<Vec<_>>()
        };
        assert_eq!(times(&first), times(&second));
    }

    #[test]
    fn test_invalid_date_rejected() {
        let conn = setup_db();
        let result = available_slots(&conn, "u1", "15/05/2025");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
