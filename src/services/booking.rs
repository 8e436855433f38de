use std::collections::BTreeSet;

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, SeatHolder, TicketDetails};
use crate::services::pricing;

const SEAT_ROWS: std::ops::RangeInclusive<char> = 'A'..='Z';
const SEATS_PER_ROW: u32 = 20;

/// Seat codes of a hall in row-major order (`A1`..`A20`, `B1`, ...).
///
/// The grid has 26 rows of 20 seats and is cut off after `capacity` seats.
pub fn seat_grid(capacity: i32) -> Vec<String> {
    let limit = usize::try_from(capacity).unwrap_or(0);
    SEAT_ROWS
        .flat_map(|row| (1..=SEATS_PER_ROW).map(move |n| format!("{row}{n}")))
        .take(limit)
        .collect()
}

/// Seats of a screening held by a booking that is not cancelled.
pub fn get_occupied_seats(
    conn: &Connection,
    screening_id: i64,
) -> Result<BTreeSet<String>, AppError> {
    Ok(queries::get_occupied_seats(conn, screening_id)?
        .into_iter()
        .collect())
}

fn free_seats(capacity: i32, occupied: &BTreeSet<String>) -> Vec<String> {
    seat_grid(capacity)
        .into_iter()
        .filter(|seat| !occupied.contains(seat))
        .collect()
}

/// Seats of a screening that can still be booked, in grid order.
pub fn available_seats(conn: &Connection, screening_id: i64) -> Result<Vec<String>, AppError> {
    let screening = queries::get_screening_details(conn, screening_id)?
        .ok_or_else(|| AppError::NotFound(format!("screening {screening_id}")))?;
    let occupied = get_occupied_seats(conn, screening_id)?;
    Ok(free_seats(screening.hall_capacity, &occupied))
}

#[derive(Debug, Clone, Serialize)]
pub struct SeatMap {
    pub screening_id: i64,
    pub seat_price: Decimal,
    pub occupied: Vec<String>,
    pub available: Vec<String>,
}

/// Occupied and free seats of a screening, plus what one seat costs.
pub fn seat_map(
    conn: &Connection,
    base_price: Decimal,
    screening_id: i64,
) -> Result<SeatMap, AppError> {
    let screening = queries::get_screening_details(conn, screening_id)?
        .ok_or_else(|| AppError::NotFound(format!("screening {screening_id}")))?;

    let occupied = get_occupied_seats(conn, screening_id)?;
    let available = free_seats(screening.hall_capacity, &occupied);
    let seat_price = pricing::compute_final_price(conn, base_price, screening.hall_type_id)?;

    Ok(SeatMap {
        screening_id,
        seat_price,
        occupied: occupied.into_iter().collect(),
        available,
    })
}

/// Books `seats` of a screening for a user and returns the booking id.
///
/// Every seat costs the same: `base_price` times the hall type multiplier.
/// Seat availability is checked again inside the same transaction that
/// inserts the booking and its tickets.
pub fn create_booking(
    conn: &Connection,
    base_price: Decimal,
    user_id: i64,
    screening_id: i64,
    seats: &[String],
) -> Result<i64, AppError> {
    if seats.is_empty() {
        return Err(AppError::NoSeatsSelected);
    }

    let mut requested = BTreeSet::new();
    for seat in seats {
        if !requested.insert(seat.as_str()) {
            return Err(AppError::InvalidSeat(format!("{seat} requested more than once")));
        }
    }

    if queries::get_user(conn, user_id)?.is_none() {
        return Err(AppError::NotFound(format!("user {user_id}")));
    }
    let screening = queries::get_screening_details(conn, screening_id)?
        .ok_or_else(|| AppError::NotFound(format!("screening {screening_id}")))?;

    let grid = seat_grid(screening.hall_capacity);
    if let Some(seat) = seats.iter().find(|s| !grid.contains(*s)) {
        return Err(AppError::InvalidSeat(format!(
            "{seat} is not a seat of hall {}",
            screening.hall_name
        )));
    }

    let (booking_id, total) = db::with_transaction(conn, |tx| -> Result<(i64, Decimal), AppError> {
        let occupied = get_occupied_seats(tx, screening_id)?;
        if let Some(seat) = seats.iter().find(|s| occupied.contains(*s)) {
            return Err(AppError::SeatUnavailable(seat.clone()));
        }

        let final_price = pricing::compute_final_price(tx, base_price, screening.hall_type_id)?;
        let total = final_price
            .checked_mul(Decimal::from(seats.len()))
            .ok_or_else(|| AppError::Validation("booking total is out of range".to_string()))?;

        let booking_id =
            queries::insert_booking(tx, user_id, total, BookingStatus::Confirmed)?;
        for seat in seats {
            queries::insert_ticket(tx, seat, base_price, final_price, booking_id, screening_id)?;
        }
        Ok((booking_id, total))
    })?;

    tracing::info!(
        booking_id,
        user_id,
        screening_id,
        seats = seats.len(),
        "created booking, total {total}"
    );
    Ok(booking_id)
}

/// Removes tickets from a booking as one transaction.
///
/// Ticket ids that belong to another booking are skipped. The booking total
/// becomes the sum of the remaining tickets, and a booking left without
/// tickets is cancelled. Nothing is changed if any step fails.
pub fn cancel_tickets(
    conn: &Connection,
    booking_id: i64,
    ticket_ids: &[i64],
) -> Result<Booking, AppError> {
    if queries::get_booking(conn, booking_id)?.is_none() {
        return Err(AppError::NotFound(format!("booking {booking_id}")));
    }

    let removed = db::with_transaction(conn, |tx| -> anyhow::Result<usize> {
        let mut removed = 0;
        for &ticket_id in ticket_ids {
            if queries::delete_ticket(tx, ticket_id, booking_id)? {
                removed += 1;
            }
        }

        let remaining = queries::get_tickets_for_booking(tx, booking_id)?;
        let total: Decimal = remaining.iter().map(|t| t.final_price).sum();
        queries::update_booking_total(tx, booking_id, total)?;

        if remaining.is_empty() {
            queries::update_booking_status(tx, booking_id, BookingStatus::Cancelled)?;
        }
        Ok(removed)
    })
    .map_err(|e| AppError::CancellationFailed(e.to_string()))?;

    tracing::info!(booking_id, removed, "cancelled tickets");
    get_booking(conn, booking_id)
}

/// Marks a whole booking cancelled. Its tickets stay as history but no
/// longer hold their seats.
pub fn cancel_booking(conn: &Connection, booking_id: i64) -> Result<(), AppError> {
    if !queries::update_booking_status(conn, booking_id, BookingStatus::Cancelled)? {
        return Err(AppError::NotFound(format!("booking {booking_id}")));
    }
    tracing::info!(booking_id, "cancelled booking");
    Ok(())
}

/// Deletes a booking together with its tickets.
pub fn delete_booking(conn: &Connection, booking_id: i64) -> Result<(), AppError> {
    if !queries::delete_booking(conn, booking_id)? {
        return Err(AppError::NotFound(format!("booking {booking_id}")));
    }
    tracing::info!(booking_id, "deleted booking");
    Ok(())
}

pub fn get_booking(conn: &Connection, booking_id: i64) -> Result<Booking, AppError> {
    queries::get_booking(conn, booking_id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))
}

pub fn list_bookings(conn: &Connection) -> Result<Vec<Booking>, AppError> {
    Ok(queries::list_bookings(conn)?)
}

pub fn list_bookings_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Booking>, AppError> {
    Ok(queries::list_bookings_for_user(conn, user_id)?)
}

pub fn get_tickets_for_booking(
    conn: &Connection,
    booking_id: i64,
) -> Result<Vec<TicketDetails>, AppError> {
    Ok(queries::get_ticket_details_for_booking(conn, booking_id)?)
}

pub fn get_tickets_for_screening(
    conn: &Connection,
    screening_id: i64,
) -> Result<Vec<SeatHolder>, AppError> {
    Ok(queries::get_seat_holders(conn, screening_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CinemaHallInput, HallTypeInput, MovieInput, ScreeningInput, UserInput};
    use chrono::NaiveDateTime;
    use rust_decimal_macros::dec;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    struct Fixture {
        conn: Connection,
        user_id: i64,
        screening_id: i64,
    }

    /// One user and one screening in a hall of the given multiplier and capacity.
    fn fixture(multiplier: Decimal, capacity: i32) -> Fixture {
        let conn = setup_db();
        let user_id = queries::insert_user(
            &conn,
            &UserInput {
                name: "Ivy".to_string(),
                email: "ivy@example.com".to_string(),
                phone: Some("+100200300".to_string()),
                role_id: None,
            },
            2,
        )
        .unwrap();
        let movie_id = queries::insert_movie(
            &conn,
            &MovieInput {
                title: "Dune".to_string(),
                genre: "Sci-Fi".to_string(),
                duration_minutes: 155,
                description: None,
            },
        )
        .unwrap();
        let type_id = queries::insert_hall_type(
            &conn,
            &HallTypeInput {
                name: "IMAX".to_string(),
                price_multiplier: multiplier,
                description: None,
            },
        )
        .unwrap();
        let hall_id = queries::insert_hall(
            &conn,
            &CinemaHallInput {
                name: "Big".to_string(),
                capacity,
                type_id,
            },
        )
        .unwrap();
        let start = NaiveDateTime::parse_from_str("2025-06-16 18:00", "%Y-%m-%d %H:%M").unwrap();
        let screening_id = queries::insert_screening(
            &conn,
            &ScreeningInput {
                start_time: start,
                end_time: start + chrono::Duration::minutes(155),
                movie_id,
                hall_id,
            },
        )
        .unwrap();
        Fixture {
            conn,
            user_id,
            screening_id,
        }
    }

    fn seats(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_seat_grid_bounded_by_capacity() {
        let grid = seat_grid(25);
        assert_eq!(grid.len(), 25);
        assert_eq!(grid[0], "A1");
        assert_eq!(grid[19], "A20");
        assert_eq!(grid[20], "B1");
        assert_eq!(grid[24], "B5");

        let full = seat_grid(10_000);
        assert_eq!(full.len(), 520);
        assert_eq!(full.last().map(String::as_str), Some("Z20"));

        assert!(seat_grid(0).is_empty());
        assert!(seat_grid(-3).is_empty());
    }

    #[test]
    fn test_total_uses_hall_multiplier() {
        let f = fixture(dec!(1.5), 100);
        let id = create_booking(&f.conn, dec!(300), f.user_id, f.screening_id, &seats(&["A1", "A2"]))
            .unwrap();

        let booking = get_booking(&f.conn, id).unwrap();
        assert_eq!(booking.total_amount, dec!(900.00));
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.customer_name, "Ivy");

        let tickets = get_tickets_for_booking(&f.conn, id).unwrap();
        assert_eq!(tickets.len(), 2);
        for ticket in &tickets {
            assert_eq!(ticket.base_price, dec!(300));
            assert_eq!(ticket.final_price, dec!(450));
            assert_eq!(ticket.movie_title, "Dune");
        }
    }

    #[test]
    fn test_booked_seats_become_occupied() {
        let f = fixture(dec!(1), 100);
        create_booking(&f.conn, dec!(300), f.user_id, f.screening_id, &seats(&["C3", "C4", "D1"]))
            .unwrap();

        let occupied = get_occupied_seats(&f.conn, f.screening_id).unwrap();
        for seat in ["C3", "C4", "D1"] {
            assert!(occupied.contains(seat));
        }
        assert_eq!(occupied.len(), 3);

        let map = seat_map(&f.conn, dec!(300), f.screening_id).unwrap();
        assert_eq!(map.available.len(), 97);
        assert!(!map.available.contains(&"C3".to_string()));
        assert_eq!(map.seat_price, dec!(300));

        let available = available_seats(&f.conn, f.screening_id).unwrap();
        assert_eq!(available, map.available);
        assert_eq!(available[0], "A1");
        assert!(matches!(
            available_seats(&f.conn, 999),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_taken_seat_is_rejected() {
        let f = fixture(dec!(1), 100);
        create_booking(&f.conn, dec!(300), f.user_id, f.screening_id, &seats(&["A1", "A2"]))
            .unwrap();

        let result = create_booking(&f.conn, dec!(300), f.user_id, f.screening_id, &seats(&["A3", "A1"]));
        assert!(matches!(result, Err(AppError::SeatUnavailable(seat)) if seat == "A1"));

        // nothing from the failed attempt was written
        assert_eq!(list_bookings(&f.conn).unwrap().len(), 1);
        assert!(!get_occupied_seats(&f.conn, f.screening_id).unwrap().contains("A3"));
    }

    #[test]
    fn test_empty_and_invalid_seat_requests() {
        let f = fixture(dec!(1), 20);
        assert!(matches!(
            create_booking(&f.conn, dec!(300), f.user_id, f.screening_id, &[]),
            Err(AppError::NoSeatsSelected)
        ));
        // capacity 20 means row A only
        assert!(matches!(
            create_booking(&f.conn, dec!(300), f.user_id, f.screening_id, &seats(&["B1"])),
            Err(AppError::InvalidSeat(_))
        ));
        assert!(matches!(
            create_booking(&f.conn, dec!(300), f.user_id, f.screening_id, &seats(&["A1", "A1"])),
            Err(AppError::InvalidSeat(_))
        ));
    }

    #[test]
    fn test_unknown_user_or_screening() {
        let f = fixture(dec!(1), 20);
        assert!(matches!(
            create_booking(&f.conn, dec!(300), 999, f.screening_id, &seats(&["A1"])),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            create_booking(&f.conn, dec!(300), f.user_id, 999, &seats(&["A1"])),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_partial_cancellation_keeps_booking_confirmed() {
        let f = fixture(dec!(1.5), 100);
        let id = create_booking(&f.conn, dec!(300), f.user_id, f.screening_id, &seats(&["A1", "A2", "A3"]))
            .unwrap();
        let tickets = queries::get_tickets_for_booking(&f.conn, id).unwrap();

        let booking = cancel_tickets(&f.conn, id, &[tickets[0].id, tickets[1].id]).unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.total_amount, tickets[2].final_price);

        let occupied = get_occupied_seats(&f.conn, f.screening_id).unwrap();
        assert_eq!(occupied.into_iter().collect::<Vec<_>>(), vec!["A3".to_string()]);
    }

    #[test]
    fn test_cancelling_last_ticket_cancels_booking() {
        let f = fixture(dec!(1.5), 100);
        let id = create_booking(&f.conn, dec!(300), f.user_id, f.screening_id, &seats(&["B7"]))
            .unwrap();
        let tickets = queries::get_tickets_for_booking(&f.conn, id).unwrap();

        let booking = cancel_tickets(&f.conn, id, &[tickets[0].id]).unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert_eq!(booking.total_amount, Decimal::ZERO);

        // repeating the cancellation is a no-op
        let again = cancel_tickets(&f.conn, id, &[tickets[0].id]).unwrap();
        assert_eq!(again.status, BookingStatus::Cancelled);
        assert_eq!(again.total_amount, Decimal::ZERO);
    }

    #[test]
    fn test_foreign_ticket_ids_are_ignored() {
        let f = fixture(dec!(1), 100);
        let first = create_booking(&f.conn, dec!(300), f.user_id, f.screening_id, &seats(&["A1"]))
            .unwrap();
        let second = create_booking(&f.conn, dec!(300), f.user_id, f.screening_id, &seats(&["A2", "A3"]))
            .unwrap();
        let foreign = queries::get_tickets_for_booking(&f.conn, second).unwrap();

        let booking = cancel_tickets(&f.conn, first, &[foreign[0].id, 12345]).unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.total_amount, dec!(300));
        assert_eq!(queries::get_tickets_for_booking(&f.conn, second).unwrap().len(), 2);
    }

    #[test]
    fn test_failed_cancellation_changes_nothing() {
        let f = fixture(dec!(1.5), 100);
        let id = create_booking(&f.conn, dec!(300), f.user_id, f.screening_id, &seats(&["C1", "C2"]))
            .unwrap();
        let tickets = queries::get_tickets_for_booking(&f.conn, id).unwrap();

        // the ticket deletes succeed, then the total update aborts
        f.conn
            .execute_batch(
                "CREATE TEMP TRIGGER bookings_read_only BEFORE UPDATE ON bookings
                 BEGIN SELECT RAISE(ABORT, 'bookings are read-only'); END;",
            )
            .unwrap();

        let result = cancel_tickets(&f.conn, id, &[tickets[0].id]);
        assert!(matches!(result, Err(AppError::CancellationFailed(_))));
        let result = cancel_tickets(&f.conn, id, &[tickets[0].id, tickets[1].id]);
        assert!(matches!(result, Err(AppError::CancellationFailed(_))));

        assert_eq!(queries::get_tickets_for_booking(&f.conn, id).unwrap(), tickets);
        let booking = get_booking(&f.conn, id).unwrap();
        assert_eq!(booking.total_amount, dec!(900));
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(get_occupied_seats(&f.conn, f.screening_id).unwrap().len(), 2);
    }

    #[test]
    fn test_price_overflow_is_rejected() {
        let f = fixture(Decimal::MAX, 100);
        let result = create_booking(&f.conn, dec!(300), f.user_id, f.screening_id, &seats(&["A1"]));
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(matches!(
            seat_map(&f.conn, dec!(300), f.screening_id),
            Err(AppError::Validation(_))
        ));

        // the seat price fits but the total for three seats does not
        let f = fixture(Decimal::MAX / dec!(2), 100);
        let result = create_booking(&f.conn, dec!(1), f.user_id, f.screening_id, &seats(&["A1", "A2", "A3"]));
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(list_bookings(&f.conn).unwrap().is_empty());
    }

    #[test]
    fn test_cancel_tickets_of_unknown_booking() {
        let f = fixture(dec!(1), 100);
        assert!(matches!(
            cancel_tickets(&f.conn, 404, &[1]),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_cancelled_booking_frees_seats_but_keeps_tickets() {
        let f = fixture(dec!(1), 100);
        let id = create_booking(&f.conn, dec!(300), f.user_id, f.screening_id, &seats(&["E5", "E6"]))
            .unwrap();

        cancel_booking(&f.conn, id).unwrap();

        assert_eq!(get_booking(&f.conn, id).unwrap().status, BookingStatus::Cancelled);
        assert_eq!(get_tickets_for_booking(&f.conn, id).unwrap().len(), 2);
        assert!(get_occupied_seats(&f.conn, f.screening_id).unwrap().is_empty());

        // the freed seat can be booked again
        assert!(create_booking(&f.conn, dec!(300), f.user_id, f.screening_id, &seats(&["E5"])).is_ok());
    }

    #[test]
    fn test_legacy_upper_case_status_frees_seats() {
        let f = fixture(dec!(1), 100);
        let id = create_booking(&f.conn, dec!(300), f.user_id, f.screening_id, &seats(&["F1"]))
            .unwrap();
        f.conn
            .execute(
                "UPDATE bookings SET status = 'CANCELLED' WHERE id = ?1",
                rusqlite::params![id],
            )
            .unwrap();

        assert!(get_occupied_seats(&f.conn, f.screening_id).unwrap().is_empty());
        assert_eq!(get_booking(&f.conn, id).unwrap().status, BookingStatus::Cancelled);
    }

    #[test]
    fn test_delete_booking_removes_tickets() {
        let f = fixture(dec!(1), 100);
        let id = create_booking(&f.conn, dec!(300), f.user_id, f.screening_id, &seats(&["G1"]))
            .unwrap();

        delete_booking(&f.conn, id).unwrap();
        assert!(queries::get_tickets_for_booking(&f.conn, id).unwrap().is_empty());
        assert!(matches!(delete_booking(&f.conn, id), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_bookings_per_user_and_seat_holders() {
        let f = fixture(dec!(1), 100);
        let other = queries::insert_user(
            &f.conn,
            &UserInput {
                name: "Jon".to_string(),
                email: "jon@example.com".to_string(),
                phone: None,
                role_id: None,
            },
            2,
        )
        .unwrap();
        create_booking(&f.conn, dec!(300), f.user_id, f.screening_id, &seats(&["A1"])).unwrap();
        create_booking(&f.conn, dec!(300), other, f.screening_id, &seats(&["A2"])).unwrap();

        assert_eq!(list_bookings(&f.conn).unwrap().len(), 2);
        let mine = list_bookings_for_user(&f.conn, other).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].customer_name, "Jon");

        let holders = get_tickets_for_screening(&f.conn, f.screening_id).unwrap();
        let names: Vec<&str> = holders.iter().map(|h| h.customer_name.as_str()).collect();
        assert_eq!(names, vec!["Ivy", "Jon"]);
    }
}
