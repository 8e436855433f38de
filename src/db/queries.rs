use anyhow::Context;
use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;

use crate::db::DATETIME_FORMAT;
use crate::models::{
    Booking, BookingStatus, CinemaHall, CinemaHallInput, HallType, HallTypeInput, Movie,
    MovieInput, Role, Screening, ScreeningDetails, ScreeningInput, SeatHolder, Ticket,
    TicketDetails, User, UserInput,
};

fn format_dt(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

fn parse_dt(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .with_context(|| format!("malformed timestamp in database: {s}"))
}

fn parse_decimal(s: &str) -> anyhow::Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("malformed decimal in database: {s}"))
}

// ── Roles ──

pub fn list_roles(conn: &Connection) -> anyhow::Result<Vec<Role>> {
    let mut stmt =
        conn.prepare("SELECT id, name, description, created_date FROM roles ORDER BY name")?;
    let rows = stmt.query_map([], |row| Ok(parse_role_row(row)))?;

    let mut roles = vec![];
    for row in rows {
        roles.push(row??);
    }
    Ok(roles)
}

pub fn get_role(conn: &Connection, id: i64) -> anyhow::Result<Option<Role>> {
    let result = conn.query_row(
        "SELECT id, name, description, created_date FROM roles WHERE id = ?1",
        params![id],
        |row| Ok(parse_role_row(row)),
    );

    match result {
        Ok(role) => Ok(Some(role?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_role_by_name(conn: &Connection, name: &str) -> anyhow::Result<Option<Role>> {
    let result = conn.query_row(
        "SELECT id, name, description, created_date FROM roles WHERE name = ?1",
        params![name],
        |row| Ok(parse_role_row(row)),
    );

    match result {
        Ok(role) => Ok(Some(role?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_role_row(row: &Row) -> anyhow::Result<Role> {
    let created_date: String = row.get(3)?;
    Ok(Role {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        created_date: parse_dt(&created_date)?,
    })
}

// ── Users ──

const USER_SELECT: &str = "SELECT u.id, u.name, u.email, u.phone, u.role_id, r.name
     FROM users u INNER JOIN roles r ON u.role_id = r.id";

pub fn insert_user(conn: &Connection, user: &UserInput, role_id: i64) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO users (name, email, phone, role_id) VALUES (?1, ?2, ?3, ?4)",
        params![user.name, user.email, user.phone, role_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_user(conn: &Connection, id: i64, user: &UserInput) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE users SET name = ?1, email = ?2, phone = ?3 WHERE id = ?4",
        params![user.name, user.email, user.phone, id],
    )?;
    Ok(count > 0)
}

pub fn delete_user(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn change_user_role(conn: &Connection, id: i64, role_id: i64) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE users SET role_id = ?1 WHERE id = ?2",
        params![role_id, id],
    )?;
    Ok(count > 0)
}

pub fn list_users(conn: &Connection) -> anyhow::Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!("{USER_SELECT} ORDER BY u.name"))?;
    let rows = stmt.query_map([], parse_user_row)?;

    let mut users = vec![];
    for row in rows {
        users.push(row?);
    }
    Ok(users)
}

pub fn list_users_by_role(conn: &Connection, role_name: &str) -> anyhow::Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!("{USER_SELECT} WHERE r.name = ?1 ORDER BY u.name"))?;
    let rows = stmt.query_map(params![role_name], parse_user_row)?;

    let mut users = vec![];
    for row in rows {
        users.push(row?);
    }
    Ok(users)
}

pub fn get_user(conn: &Connection, id: i64) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        &format!("{USER_SELECT} WHERE u.id = ?1"),
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
        &format!("{USER_SELECT} WHERE u.email = ?1"),
        params![email],
        parse_user_row,
    );

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_user_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        role_id: row.get(4)?,
        role_name: row.get(5)?,
    })
}

pub fn count_bookings_for_user(conn: &Connection, user_id: i64) -> anyhow::Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM bookings WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

// ── Movies ──

pub fn insert_movie(conn: &Connection, movie: &MovieInput) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO movies (title, genre, duration_minutes, description) VALUES (?1, ?2, ?3, ?4)",
        params![
            movie.title,
            movie.genre,
            movie.duration_minutes,
            movie.description
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_movie(conn: &Connection, id: i64, movie: &MovieInput) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE movies SET title = ?1, genre = ?2, duration_minutes = ?3, description = ?4
         WHERE id = ?5",
        params![
            movie.title,
            movie.genre,
            movie.duration_minutes,
            movie.description,
            id
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_movie(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM movies WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn list_movies(conn: &Connection) -> anyhow::Result<Vec<Movie>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, genre, duration_minutes, description FROM movies ORDER BY title",
    )?;
    let rows = stmt.query_map([], parse_movie_row)?;

    let mut movies = vec![];
    for row in rows {
        movies.push(row?);
    }
    Ok(movies)
}

pub fn get_movie(conn: &Connection, id: i64) -> anyhow::Result<Option<Movie>> {
    let result = conn.query_row(
        "SELECT id, title, genre, duration_minutes, description FROM movies WHERE id = ?1",
        params![id],
        parse_movie_row,
    );

    match result {
        Ok(movie) => Ok(Some(movie)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_movie_row(row: &Row) -> rusqlite::Result<Movie> {
    Ok(Movie {
        id: row.get(0)?,
        title: row.get(1)?,
        genre: row.get(2)?,
        duration_minutes: row.get(3)?,
        description: row.get(4)?,
    })
}

pub fn count_screenings_for_movie(conn: &Connection, movie_id: i64) -> anyhow::Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM screenings WHERE movie_id = ?1",
        params![movie_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

// ── Hall Types ──

pub fn insert_hall_type(conn: &Connection, hall_type: &HallTypeInput) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO hall_types (name, price_multiplier, description) VALUES (?1, ?2, ?3)",
        params![
            hall_type.name,
            hall_type.price_multiplier.to_string(),
            hall_type.description
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_hall_types(conn: &Connection) -> anyhow::Result<Vec<HallType>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, price_multiplier, description FROM hall_types ORDER BY name",
    )?;
    let rows = stmt.query_map([], |row| Ok(parse_hall_type_row(row)))?;

    let mut hall_types = vec![];
    for row in rows {
        hall_types.push(row??);
    }
    Ok(hall_types)
}

pub fn get_hall_type(conn: &Connection, id: i64) -> anyhow::Result<Option<HallType>> {
    let result = conn.query_row(
        "SELECT id, name, price_multiplier, description FROM hall_types WHERE id = ?1",
        params![id],
        |row| Ok(parse_hall_type_row(row)),
    );

    match result {
        Ok(hall_type) => Ok(Some(hall_type?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// The multiplier of a hall type, or `None` when the type does not exist
/// or carries no multiplier.
pub fn get_price_multiplier(conn: &Connection, type_id: i64) -> anyhow::Result<Option<Decimal>> {
    let result = conn.query_row(
        "SELECT price_multiplier FROM hall_types WHERE id = ?1",
        params![type_id],
        |row| row.get::<_, Option<String>>(0),
    );

    match result {
        Ok(Some(raw)) => Ok(Some(parse_decimal(&raw)?)),
        Ok(None) | Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_hall_type_row(row: &Row) -> anyhow::Result<HallType> {
    let multiplier: String = row.get(2)?;
    Ok(HallType {
        id: row.get(0)?,
        name: row.get(1)?,
        price_multiplier: parse_decimal(&multiplier)?,
        description: row.get(3)?,
    })
}

// ── Cinema Halls ──

const HALL_SELECT: &str = "SELECT h.id, h.name, h.capacity, h.type_id, ht.name, ht.price_multiplier
     FROM cinema_halls h INNER JOIN hall_types ht ON h.type_id = ht.id";

pub fn insert_hall(conn: &Connection, hall: &CinemaHallInput) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO cinema_halls (name, capacity, type_id) VALUES (?1, ?2, ?3)",
        params![hall.name, hall.capacity, hall.type_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_halls(conn: &Connection) -> anyhow::Result<Vec<CinemaHall>> {
    let mut stmt = conn.prepare(&format!("{HALL_SELECT} ORDER BY h.name"))?;
    let rows = stmt.query_map([], |row| Ok(parse_hall_row(row)))?;

    let mut halls = vec![];
    for row in rows {
        halls.push(row??);
    }
    Ok(halls)
}

pub fn get_hall(conn: &Connection, id: i64) -> anyhow::Result<Option<CinemaHall>> {
    let result = conn.query_row(
        &format!("{HALL_SELECT} WHERE h.id = ?1"),
        params![id],
        |row| Ok(parse_hall_row(row)),
    );

    match result {
        Ok(hall) => Ok(Some(hall?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_hall_row(row: &Row) -> anyhow::Result<CinemaHall> {
    let multiplier: String = row.get(5)?;
    Ok(CinemaHall {
        id: row.get(0)?,
        name: row.get(1)?,
        capacity: row.get(2)?,
        type_id: row.get(3)?,
        type_name: row.get(4)?,
        price_multiplier: parse_decimal(&multiplier)?,
    })
}

// ── Screenings ──

const SCREENING_DETAILS_SELECT: &str = "SELECT s.id, s.start_time, s.end_time, s.movie_id, m.title, m.duration_minutes,
            s.hall_id, h.name, h.capacity, h.type_id, ht.name, ht.price_multiplier
     FROM screenings s
     INNER JOIN movies m ON s.movie_id = m.id
     INNER JOIN cinema_halls h ON s.hall_id = h.id
     INNER JOIN hall_types ht ON h.type_id = ht.id";

pub fn insert_screening(conn: &Connection, screening: &ScreeningInput) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO screenings (start_time, end_time, movie_id, hall_id) VALUES (?1, ?2, ?3, ?4)",
        params![
            format_dt(&screening.start_time),
            format_dt(&screening.end_time),
            screening.movie_id,
            screening.hall_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_screening(
    conn: &Connection,
    id: i64,
    screening: &ScreeningInput,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE screenings SET start_time = ?1, end_time = ?2, movie_id = ?3, hall_id = ?4
         WHERE id = ?5",
        params![
            format_dt(&screening.start_time),
            format_dt(&screening.end_time),
            screening.movie_id,
            screening.hall_id,
            id,
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_screening(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM screenings WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

/// Every screening ever scheduled in a hall, past ones included.
pub fn get_screenings_for_hall(conn: &Connection, hall_id: i64) -> anyhow::Result<Vec<Screening>> {
    let mut stmt = conn.prepare(
        "SELECT id, start_time, end_time, movie_id, hall_id FROM screenings
         WHERE hall_id = ?1 ORDER BY start_time",
    )?;
    let rows = stmt.query_map(params![hall_id], |row| Ok(parse_screening_row(row)))?;

    let mut screenings = vec![];
    for row in rows {
        screenings.push(row??);
    }
    Ok(screenings)
}

pub fn get_screening(conn: &Connection, id: i64) -> anyhow::Result<Option<Screening>> {
    let result = conn.query_row(
        "SELECT id, start_time, end_time, movie_id, hall_id FROM screenings WHERE id = ?1",
        params![id],
        |row| Ok(parse_screening_row(row)),
    );

    match result {
        Ok(screening) => Ok(Some(screening?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_screening_row(row: &Row) -> anyhow::Result<Screening> {
    let start_time: String = row.get(1)?;
    let end_time: String = row.get(2)?;
    Ok(Screening {
        id: row.get(0)?,
        start_time: parse_dt(&start_time)?,
        end_time: parse_dt(&end_time)?,
        movie_id: row.get(3)?,
        hall_id: row.get(4)?,
    })
}

pub fn get_screening_details(
    conn: &Connection,
    id: i64,
) -> anyhow::Result<Option<ScreeningDetails>> {
    let result = conn.query_row(
        &format!("{SCREENING_DETAILS_SELECT} WHERE s.id = ?1"),
        params![id],
        |row| Ok(parse_screening_details_row(row)),
    );

    match result {
        Ok(details) => Ok(Some(details?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_screening_details(conn: &Connection) -> anyhow::Result<Vec<ScreeningDetails>> {
    let mut stmt = conn.prepare(&format!("{SCREENING_DETAILS_SELECT} ORDER BY s.start_time"))?;
    let rows = stmt.query_map([], |row| Ok(parse_screening_details_row(row)))?;

    let mut screenings = vec![];
    for row in rows {
        screenings.push(row??);
    }
    Ok(screenings)
}

/// Screenings starting in `[from, to)`.
pub fn list_screening_details_starting_between(
    conn: &Connection,
    from: &NaiveDateTime,
    to: &NaiveDateTime,
) -> anyhow::Result<Vec<ScreeningDetails>> {
    let mut stmt = conn.prepare(&format!(
        "{SCREENING_DETAILS_SELECT} WHERE s.start_time >= ?1 AND s.start_time < ?2 ORDER BY s.start_time"
    ))?;
    let rows = stmt.query_map(params![format_dt(from), format_dt(to)], |row| {
        Ok(parse_screening_details_row(row))
    })?;

    let mut screenings = vec![];
    for row in rows {
        screenings.push(row??);
    }
    Ok(screenings)
}

fn parse_screening_details_row(row: &Row) -> anyhow::Result<ScreeningDetails> {
    let start_time: String = row.get(1)?;
    let end_time: String = row.get(2)?;
    let multiplier: String = row.get(11)?;
    Ok(ScreeningDetails {
        id: row.get(0)?,
        start_time: parse_dt(&start_time)?,
        end_time: parse_dt(&end_time)?,
        movie_id: row.get(3)?,
        movie_title: row.get(4)?,
        duration_minutes: row.get(5)?,
        hall_id: row.get(6)?,
        hall_name: row.get(7)?,
        hall_capacity: row.get(8)?,
        hall_type_id: row.get(9)?,
        hall_type_name: row.get(10)?,
        price_multiplier: parse_decimal(&multiplier)?,
    })
}

pub fn count_tickets_for_screening(conn: &Connection, screening_id: i64) -> anyhow::Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM tickets WHERE screening_id = ?1",
        params![screening_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

// ── Bookings ──

const BOOKING_SELECT: &str = "SELECT b.id, b.order_date, b.total_amount, b.status, b.user_id, u.name
     FROM bookings b INNER JOIN users u ON b.user_id = u.id";

pub fn insert_booking(
    conn: &Connection,
    user_id: i64,
    total_amount: Decimal,
    status: BookingStatus,
) -> anyhow::Result<i64> {
    let order_date = format_dt(&Utc::now().naive_utc());
    conn.execute(
        "INSERT INTO bookings (order_date, total_amount, status, user_id) VALUES (?1, ?2, ?3, ?4)",
        params![order_date, total_amount.to_string(), status.as_str(), user_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_booking_status(
    conn: &Connection,
    id: i64,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(count > 0)
}

pub fn update_booking_total(
    conn: &Connection,
    id: i64,
    total_amount: Decimal,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET total_amount = ?1 WHERE id = ?2",
        params![total_amount.to_string(), id],
    )?;
    Ok(count > 0)
}

pub fn delete_booking(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn get_booking(conn: &Connection, id: i64) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("{BOOKING_SELECT} WHERE b.id = ?1"),
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_bookings(conn: &Connection) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!("{BOOKING_SELECT} ORDER BY b.order_date DESC, b.id DESC"))?;
    let rows = stmt.query_map([], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn list_bookings_for_user(conn: &Connection, user_id: i64) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "{BOOKING_SELECT} WHERE b.user_id = ?1 ORDER BY b.order_date DESC, b.id DESC"
    ))?;
    let rows = stmt.query_map(params![user_id], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

fn parse_booking_row(row: &Row) -> anyhow::Result<Booking> {
    let order_date: String = row.get(1)?;
    let total_amount: String = row.get(2)?;
    let status: String = row.get(3)?;
    Ok(Booking {
        id: row.get(0)?,
        order_date: parse_dt(&order_date)?,
        total_amount: parse_decimal(&total_amount)?,
        status: BookingStatus::parse(&status),
        user_id: row.get(4)?,
        customer_name: row.get(5)?,
    })
}

// ── Tickets ──

pub fn insert_ticket(
    conn: &Connection,
    seat_number: &str,
    base_price: Decimal,
    final_price: Decimal,
    booking_id: i64,
    screening_id: i64,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO tickets (seat_number, base_price, final_price, booking_id, screening_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            seat_number,
            base_price.to_string(),
            final_price.to_string(),
            booking_id,
            screening_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Deletes a ticket only if it belongs to `booking_id`.
pub fn delete_ticket(conn: &Connection, ticket_id: i64, booking_id: i64) -> anyhow::Result<bool> {
    let count = conn.execute(
        "DELETE FROM tickets WHERE id = ?1 AND booking_id = ?2",
        params![ticket_id, booking_id],
    )?;
    Ok(count > 0)
}

pub fn get_tickets_for_booking(conn: &Connection, booking_id: i64) -> anyhow::Result<Vec<Ticket>> {
    let mut stmt = conn.prepare(
        "SELECT id, seat_number, base_price, final_price, booking_id, screening_id
         FROM tickets WHERE booking_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![booking_id], |row| Ok(parse_ticket_row(row)))?;

    let mut tickets = vec![];
    for row in rows {
        tickets.push(row??);
    }
    Ok(tickets)
}

fn parse_ticket_row(row: &Row) -> anyhow::Result<Ticket> {
    let base_price: String = row.get(2)?;
    let final_price: String = row.get(3)?;
    Ok(Ticket {
        id: row.get(0)?,
        seat_number: row.get(1)?,
        base_price: parse_decimal(&base_price)?,
        final_price: parse_decimal(&final_price)?,
        booking_id: row.get(4)?,
        screening_id: row.get(5)?,
    })
}

pub fn get_ticket_details_for_booking(
    conn: &Connection,
    booking_id: i64,
) -> anyhow::Result<Vec<TicketDetails>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.seat_number, t.base_price, t.final_price, t.screening_id,
                m.title, s.start_time, h.name
         FROM tickets t
         INNER JOIN screenings s ON t.screening_id = s.id
         INNER JOIN movies m ON s.movie_id = m.id
         INNER JOIN cinema_halls h ON s.hall_id = h.id
         WHERE t.booking_id = ?1
         ORDER BY t.seat_number",
    )?;
    let rows = stmt.query_map(params![booking_id], |row| {
        let base_price: String = row.get(2)?;
        let final_price: String = row.get(3)?;
        let start_time: String = row.get(6)?;
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            base_price,
            final_price,
            row.get::<_, i64>(4)?,
            row.get::<_, String>(5)?,
            start_time,
            row.get::<_, String>(7)?,
        ))
    })?;

    let mut tickets = vec![];
    for row in rows {
        let (id, seat_number, base_price, final_price, screening_id, movie_title, start_time, hall_name) =
            row?;
        tickets.push(TicketDetails {
            id,
            seat_number,
            base_price: parse_decimal(&base_price)?,
            final_price: parse_decimal(&final_price)?,
            screening_id,
            movie_title,
            start_time: parse_dt(&start_time)?,
            hall_name,
        });
    }
    Ok(tickets)
}

/// Seats of a screening held by bookings that are not cancelled.
pub fn get_occupied_seats(conn: &Connection, screening_id: i64) -> anyhow::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.seat_number
         FROM tickets t
         INNER JOIN bookings b ON t.booking_id = b.id
         WHERE t.screening_id = ?1 AND lower(b.status) != 'cancelled'",
    )?;
    let rows = stmt.query_map(params![screening_id], |row| row.get::<_, String>(0))?;

    let mut seats = vec![];
    for row in rows {
        seats.push(row?);
    }
    Ok(seats)
}

pub fn get_seat_holders(conn: &Connection, screening_id: i64) -> anyhow::Result<Vec<SeatHolder>> {
    let mut stmt = conn.prepare(
        "SELECT t.seat_number, t.final_price, u.name
         FROM tickets t
         INNER JOIN bookings b ON t.booking_id = b.id
         INNER JOIN users u ON b.user_id = u.id
         WHERE t.screening_id = ?1 AND lower(b.status) != 'cancelled'
         ORDER BY t.seat_number",
    )?;
    let rows = stmt.query_map(params![screening_id], |row| {
        let final_price: String = row.get(1)?;
        Ok((row.get::<_, String>(0)?, final_price, row.get::<_, String>(2)?))
    })?;

    let mut holders = vec![];
    for row in rows {
        let (seat_number, final_price, customer_name) = row?;
        holders.push(SeatHolder {
            seat_number,
            final_price: parse_decimal(&final_price)?,
            customer_name,
        });
    }
    Ok(holders)
}
