use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::Connection;

use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::{CinemaHall, ScreeningDetails, ScreeningInput};

/// Half-open intervals `[s1, e1)` and `[s2, e2)` overlap unless one ends
/// before (or exactly when) the other starts.
pub fn intervals_overlap(
    s1: &NaiveDateTime,
    e1: &NaiveDateTime,
    s2: &NaiveDateTime,
    e2: &NaiveDateTime,
) -> bool {
    !(e1 <= s2 || s1 >= e2)
}

pub fn validate_interval(start: &NaiveDateTime, end: &NaiveDateTime) -> Result<(), AppError> {
    if start >= end {
        return Err(AppError::InvalidInterval);
    }
    Ok(())
}

/// Whether no screening in the hall overlaps `[start, end)`. Past screenings
/// count too.
pub fn is_hall_available(
    conn: &Connection,
    hall_id: i64,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> anyhow::Result<bool> {
    hall_available_except(conn, hall_id, start, end, None)
}

fn hall_available_except(
    conn: &Connection,
    hall_id: i64,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
    except_screening: Option<i64>,
) -> anyhow::Result<bool> {
    let screenings = queries::get_screenings_for_hall(conn, hall_id)?;

    let conflict = screenings
        .iter()
        .filter(|s| Some(s.id) != except_screening)
        .any(|s| intervals_overlap(&s.start_time, &s.end_time, start, end));

    Ok(!conflict)
}

fn ensure_references_exist(conn: &Connection, screening: &ScreeningInput) -> Result<(), AppError> {
    if queries::get_movie(conn, screening.movie_id)?.is_none() {
        return Err(AppError::NotFound(format!("movie {}", screening.movie_id)));
    }
    if queries::get_hall(conn, screening.hall_id)?.is_none() {
        return Err(AppError::NotFound(format!("hall {}", screening.hall_id)));
    }
    Ok(())
}

pub fn create_screening(conn: &Connection, screening: &ScreeningInput) -> Result<i64, AppError> {
    validate_interval(&screening.start_time, &screening.end_time)?;

    let id = db::with_transaction(conn, |tx| -> Result<i64, AppError> {
        ensure_references_exist(tx, screening)?;

        if !is_hall_available(tx, screening.hall_id, &screening.start_time, &screening.end_time)? {
            return Err(AppError::HallConflict {
                hall_id: screening.hall_id,
            });
        }

        Ok(queries::insert_screening(tx, screening)?)
    })?;

    tracing::info!(
        screening_id = id,
        hall_id = screening.hall_id,
        "scheduled screening {} - {}",
        screening.start_time,
        screening.end_time
    );
    Ok(id)
}

/// Moves a screening. Its own current slot never counts as a conflict.
pub fn update_screening(
    conn: &Connection,
    id: i64,
    screening: &ScreeningInput,
) -> Result<(), AppError> {
    validate_interval(&screening.start_time, &screening.end_time)?;

    db::with_transaction(conn, |tx| -> Result<(), AppError> {
        if queries::get_screening(tx, id)?.is_none() {
            return Err(AppError::NotFound(format!("screening {id}")));
        }
        ensure_references_exist(tx, screening)?;

        let available = hall_available_except(
            tx,
            screening.hall_id,
            &screening.start_time,
            &screening.end_time,
            Some(id),
        )?;
        if !available {
            return Err(AppError::HallConflict {
                hall_id: screening.hall_id,
            });
        }

        queries::update_screening(tx, id, screening)?;
        Ok(())
    })?;

    tracing::info!(screening_id = id, "rescheduled screening");
    Ok(())
}

pub fn delete_screening(conn: &Connection, id: i64) -> Result<(), AppError> {
    if queries::count_tickets_for_screening(conn, id)? > 0 {
        return Err(AppError::Conflict(format!(
            "screening {id} has tickets and cannot be deleted"
        )));
    }
    if !queries::delete_screening(conn, id)? {
        return Err(AppError::NotFound(format!("screening {id}")));
    }
    tracing::info!(screening_id = id, "deleted screening");
    Ok(())
}

pub fn get_screening(conn: &Connection, id: i64) -> Result<ScreeningDetails, AppError> {
    queries::get_screening_details(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("screening {id}")))
}

pub fn list_screenings(conn: &Connection) -> Result<Vec<ScreeningDetails>, AppError> {
    Ok(queries::list_screening_details(conn)?)
}

/// Screenings starting on the given calendar day.
pub fn list_screenings_on(
    conn: &Connection,
    date: NaiveDate,
) -> Result<Vec<ScreeningDetails>, AppError> {
    let from = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::Validation(format!("invalid date {date}")))?;
    let to = from + Duration::days(1);
    Ok(queries::list_screening_details_starting_between(conn, &from, &to)?)
}

/// Halls with no screening overlapping `[start, end)`.
pub fn available_halls(
    conn: &Connection,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
) -> Result<Vec<CinemaHall>, AppError> {
    validate_interval(start, end)?;

    let mut available = vec![];
    for hall in queries::list_halls(conn)? {
        if is_hall_available(conn, hall.id, start, end)? {
            available.push(hall);
        }
    }
    Ok(available)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CinemaHallInput, HallTypeInput, MovieInput};
    use rust_decimal_macros::dec;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    /// Returns (movie_id, hall_id).
    fn seed(conn: &Connection) -> (i64, i64) {
        let movie_id = queries::insert_movie(
            conn,
            &MovieInput {
                title: "Arrival".to_string(),
                genre: "Sci-Fi".to_string(),
                duration_minutes: 116,
                description: None,
            },
        )
        .unwrap();
        let type_id = queries::insert_hall_type(
            conn,
            &HallTypeInput {
                name: "Standard".to_string(),
                price_multiplier: dec!(1),
                description: None,
            },
        )
        .unwrap();
        let hall_id = queries::insert_hall(
            conn,
            &CinemaHallInput {
                name: "Hall 1".to_string(),
                capacity: 100,
                type_id,
            },
        )
        .unwrap();
        (movie_id, hall_id)
    }

    fn slot(movie_id: i64, hall_id: i64, start: &str, end: &str) -> ScreeningInput {
        ScreeningInput {
            start_time: dt(start),
            end_time: dt(end),
            movie_id,
            hall_id,
        }
    }

    #[test]
    fn test_overlap_rule() {
        let (a, b) = (dt("2025-06-16 18:00"), dt("2025-06-16 20:00"));
        // partial overlap
        assert!(intervals_overlap(&a, &b, &dt("2025-06-16 19:00"), &dt("2025-06-16 21:00")));
        // containment
        assert!(intervals_overlap(&a, &b, &dt("2025-06-16 18:30"), &dt("2025-06-16 19:30")));
        assert!(intervals_overlap(&dt("2025-06-16 17:00"), &dt("2025-06-16 22:00"), &a, &b));
        // touching ends are not a conflict
        assert!(!intervals_overlap(&a, &b, &b, &dt("2025-06-16 22:00")));
        assert!(!intervals_overlap(&a, &b, &dt("2025-06-16 16:00"), &a));
        // disjoint
        assert!(!intervals_overlap(&a, &b, &dt("2025-06-17 18:00"), &dt("2025-06-17 20:00")));
    }

    #[test]
    fn test_overlapping_screening_is_rejected() {
        let conn = setup_db();
        let (movie_id, hall_id) = seed(&conn);
        create_screening(&conn, &slot(movie_id, hall_id, "2025-06-16 19:00", "2025-06-16 21:00"))
            .unwrap();

        let result =
            create_screening(&conn, &slot(movie_id, hall_id, "2025-06-16 18:00", "2025-06-16 20:00"));
        assert!(matches!(result, Err(AppError::HallConflict { .. })));
    }

    #[test]
    fn test_touching_screening_is_accepted() {
        let conn = setup_db();
        let (movie_id, hall_id) = seed(&conn);
        create_screening(&conn, &slot(movie_id, hall_id, "2025-06-16 18:00", "2025-06-16 20:00"))
            .unwrap();

        let result =
            create_screening(&conn, &slot(movie_id, hall_id, "2025-06-16 20:00", "2025-06-16 22:00"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_past_screenings_still_block_the_hall() {
        let conn = setup_db();
        let (movie_id, hall_id) = seed(&conn);
        create_screening(&conn, &slot(movie_id, hall_id, "2001-01-01 10:00", "2001-01-01 12:00"))
            .unwrap();

        assert!(!is_hall_available(&conn, hall_id, &dt("2001-01-01 11:00"), &dt("2001-01-01 13:00"))
            .unwrap());
    }

    #[test]
    fn test_invalid_interval() {
        let conn = setup_db();
        let (movie_id, hall_id) = seed(&conn);

        let equal = create_screening(&conn, &slot(movie_id, hall_id, "2025-06-16 18:00", "2025-06-16 18:00"));
        assert!(matches!(equal, Err(AppError::InvalidInterval)));

        let reversed =
            create_screening(&conn, &slot(movie_id, hall_id, "2025-06-16 20:00", "2025-06-16 18:00"));
        assert!(matches!(reversed, Err(AppError::InvalidInterval)));
    }

    #[test]
    fn test_unknown_movie_or_hall() {
        let conn = setup_db();
        let (movie_id, hall_id) = seed(&conn);

        let no_movie = create_screening(&conn, &slot(999, hall_id, "2025-06-16 18:00", "2025-06-16 20:00"));
        assert!(matches!(no_movie, Err(AppError::NotFound(_))));

        let no_hall = create_screening(&conn, &slot(movie_id, 999, "2025-06-16 18:00", "2025-06-16 20:00"));
        assert!(matches!(no_hall, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_update_on_unchanged_slot_does_not_conflict_with_itself() {
        let conn = setup_db();
        let (movie_id, hall_id) = seed(&conn);
        let input = slot(movie_id, hall_id, "2025-06-16 18:00", "2025-06-16 20:00");
        let id = create_screening(&conn, &input).unwrap();

        assert!(update_screening(&conn, id, &input).is_ok());

        let shifted = slot(movie_id, hall_id, "2025-06-16 18:30", "2025-06-16 20:30");
        update_screening(&conn, id, &shifted).unwrap();
        let stored = get_screening(&conn, id).unwrap();
        assert_eq!(stored.start_time, dt("2025-06-16 18:30"));
    }

    #[test]
    fn test_update_into_other_screening_conflicts() {
        let conn = setup_db();
        let (movie_id, hall_id) = seed(&conn);
        create_screening(&conn, &slot(movie_id, hall_id, "2025-06-16 18:00", "2025-06-16 20:00"))
            .unwrap();
        let late = create_screening(&conn, &slot(movie_id, hall_id, "2025-06-16 21:00", "2025-06-16 23:00"))
            .unwrap();

        let result = update_screening(
            &conn,
            late,
            &slot(movie_id, hall_id, "2025-06-16 19:30", "2025-06-16 21:30"),
        );
        assert!(matches!(result, Err(AppError::HallConflict { .. })));
    }

    #[test]
    fn test_update_unknown_screening() {
        let conn = setup_db();
        let (movie_id, hall_id) = seed(&conn);
        let result = update_screening(
            &conn,
            42,
            &slot(movie_id, hall_id, "2025-06-16 18:00", "2025-06-16 20:00"),
        );
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_available_halls_excludes_busy_hall() {
        let conn = setup_db();
        let (movie_id, busy_hall) = seed(&conn);
        let free_hall = queries::insert_hall(
            &conn,
            &CinemaHallInput {
                name: "Hall 2".to_string(),
                capacity: 50,
                type_id: 1,
            },
        )
        .unwrap();
        create_screening(&conn, &slot(movie_id, busy_hall, "2025-06-16 18:00", "2025-06-16 20:00"))
            .unwrap();

        let halls =
            available_halls(&conn, &dt("2025-06-16 19:00"), &dt("2025-06-16 21:00")).unwrap();
        let ids: Vec<i64> = halls.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![free_hall]);
    }

    #[test]
    fn test_list_screenings_on_date() {
        let conn = setup_db();
        let (movie_id, hall_id) = seed(&conn);
        create_screening(&conn, &slot(movie_id, hall_id, "2025-06-16 10:00", "2025-06-16 12:00"))
            .unwrap();
        create_screening(&conn, &slot(movie_id, hall_id, "2025-06-17 10:00", "2025-06-17 12:00"))
            .unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        let screenings = list_screenings_on(&conn, date).unwrap();
        assert_eq!(screenings.len(), 1);
        assert_eq!(screenings[0].movie_title, "Arrival");
        assert_eq!(screenings[0].hall_name, "Hall 1");
    }

    #[test]
    fn test_delete_screening() {
        let conn = setup_db();
        let (movie_id, hall_id) = seed(&conn);
        let id = create_screening(&conn, &slot(movie_id, hall_id, "2025-06-16 10:00", "2025-06-16 12:00"))
            .unwrap();

        delete_screening(&conn, id).unwrap();
        assert!(matches!(delete_screening(&conn, id), Err(AppError::NotFound(_))));
    }
}
