//! SQLite persistence for normalized lessons.
//!
//! Lessons are keyed by their external calendar event id, so re-syncing the
//! same export is an idempotent upsert. The store holds everything needed to
//! rebuild a [`Lesson`] except `earned`, which is recomputed on load.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::debug;

use invoice_core::error::{InvoiceError, Result};
use invoice_core::models::Lesson;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Persistent store of normalized lessons keyed by calendar event id.
pub struct LessonStore {
    conn: Connection,
}

/// One row of the `lessons` table before date parsing.
struct LessonRow {
    event_id: String,
    date: String,
    weekday: u8,
    student: String,
    duration: f64,
    hourly_rate: f64,
}

impl LessonStore {
    /// Open (creating if necessary) the lesson database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(store_err)?;
        Self::init(conn)
    }

    /// Open an in-memory database; used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS lessons (
                event_id    TEXT PRIMARY KEY,
                date        TEXT NOT NULL,
                weekday     INTEGER NOT NULL,
                student     TEXT NOT NULL,
                duration    REAL NOT NULL,
                hourly_rate REAL NOT NULL
            )",
        )
        .map_err(store_err)?;
        Ok(Self { conn })
    }

    /// Insert or replace the given lessons in a single transaction.
    pub fn upsert_lessons(&mut self, lessons: &[Lesson]) -> Result<()> {
        let tx = self.conn.transaction().map_err(store_err)?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO lessons
                        (event_id, date, weekday, student, duration, hourly_rate)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .map_err(store_err)?;
            for lesson in lessons {
                stmt.execute(rusqlite::params![
                    lesson.event_id,
                    lesson.date.format(DATE_FORMAT).to_string(),
                    lesson.weekday,
                    lesson.student,
                    lesson.duration,
                    lesson.hourly_rate,
                ])
                .map_err(store_err)?;
            }
        }
        tx.commit().map_err(store_err)?;
        debug!("Upserted {} lessons", lessons.len());
        Ok(())
    }

    /// Fetch all lessons within the given billing month, ordered by date.
    pub fn fetch_month(&self, month: u32, year: i32) -> Result<Vec<Lesson>> {
        let start = first_of_month(year, month)?;
        let end = first_of_next_month(year, month)?;

        let mut stmt = self
            .conn
            .prepare(
                "SELECT event_id, date, weekday, student, duration, hourly_rate
                 FROM lessons
                 WHERE date >= ?1 AND date < ?2
                 ORDER BY date",
            )
            .map_err(store_err)?;

        let rows = stmt
            .query_map(
                rusqlite::params![
                    start.format(DATE_FORMAT).to_string(),
                    end.format(DATE_FORMAT).to_string(),
                ],
                |row| {
                    Ok(LessonRow {
                        event_id: row.get(0)?,
                        date: row.get(1)?,
                        weekday: row.get(2)?,
                        student: row.get(3)?,
                        duration: row.get(4)?,
                        hourly_rate: row.get(5)?,
                    })
                },
            )
            .map_err(store_err)?;

        let mut lessons = Vec::new();
        for row in rows {
            let row = row.map_err(store_err)?;
            let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT).map_err(|e| {
                InvoiceError::Store(format!("invalid date in lessons table: {}", e))
            })?;
            lessons.push(Lesson {
                event_id: row.event_id,
                date,
                weekday: row.weekday,
                student: row.student,
                duration: row.duration,
                hourly_rate: row.hourly_rate,
                earned: row.duration * row.hourly_rate,
            });
        }

        debug!("Fetched {} lessons for {}/{}", lessons.len(), month, year);
        Ok(lessons)
    }

    /// Number of lessons currently stored.
    pub fn lesson_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM lessons", [], |row| row.get(0))
            .map_err(store_err)?;
        Ok(count as usize)
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn store_err(e: rusqlite::Error) -> InvoiceError {
    InvoiceError::Store(e.to_string())
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        InvoiceError::InvalidConfiguration(format!("invalid billing month {}/{}", month, year))
    })
}

fn first_of_next_month(year: i32, month: u32) -> Result<NaiveDate> {
    if month == 12 {
        first_of_month(year + 1, 1)
    } else {
        first_of_month(year, month + 1)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn make_lesson(id: &str, date_str: &str, student: &str, duration: f64) -> Lesson {
        let date = NaiveDate::parse_from_str(date_str, DATE_FORMAT).unwrap();
        Lesson {
            event_id: id.to_string(),
            date,
            weekday: date.weekday().num_days_from_monday() as u8,
            student: student.to_string(),
            duration,
            hourly_rate: 20.0,
            earned: duration * 20.0,
        }
    }

    #[test]
    fn test_round_trip() {
        let mut store = LessonStore::open_in_memory().unwrap();
        store
            .upsert_lessons(&[make_lesson("evt-1", "2024-03-04", "Alice", 1.5)])
            .unwrap();

        let lessons = store.fetch_month(3, 2024).unwrap();
        assert_eq!(lessons.len(), 1);
        assert_eq!(lessons[0].event_id, "evt-1");
        assert_eq!(lessons[0].student, "Alice");
        assert_eq!(lessons[0].weekday, 0);
        assert!((lessons[0].earned - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_upsert_replaces_same_event_id() {
        let mut store = LessonStore::open_in_memory().unwrap();
        store
            .upsert_lessons(&[make_lesson("evt-1", "2024-03-04", "Alice", 1.0)])
            .unwrap();
        // The event was edited in the calendar and re-synced.
        store
            .upsert_lessons(&[make_lesson("evt-1", "2024-03-04", "Alice", 2.0)])
            .unwrap();

        let lessons = store.fetch_month(3, 2024).unwrap();
        assert_eq!(lessons.len(), 1);
        assert!((lessons[0].duration - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fetch_month_filters_other_months() {
        let mut store = LessonStore::open_in_memory().unwrap();
        store
            .upsert_lessons(&[
                make_lesson("evt-1", "2024-02-29", "Alice", 1.0),
                make_lesson("evt-2", "2024-03-04", "Bob", 1.0),
                make_lesson("evt-3", "2024-04-01", "Cara", 1.0),
            ])
            .unwrap();

        let lessons = store.fetch_month(3, 2024).unwrap();
        assert_eq!(lessons.len(), 1);
        assert_eq!(lessons[0].student, "Bob");
    }

    #[test]
    fn test_fetch_month_ordered_by_date() {
        let mut store = LessonStore::open_in_memory().unwrap();
        store
            .upsert_lessons(&[
                make_lesson("evt-2", "2024-03-11", "Bob", 1.0),
                make_lesson("evt-1", "2024-03-04", "Alice", 1.0),
            ])
            .unwrap();

        let lessons = store.fetch_month(3, 2024).unwrap();
        let students: Vec<&str> = lessons.iter().map(|l| l.student.as_str()).collect();
        assert_eq!(students, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_fetch_december_rolls_over_year() {
        let mut store = LessonStore::open_in_memory().unwrap();
        store
            .upsert_lessons(&[
                make_lesson("evt-1", "2024-12-30", "Alice", 1.0),
                make_lesson("evt-2", "2025-01-02", "Bob", 1.0),
            ])
            .unwrap();

        let lessons = store.fetch_month(12, 2024).unwrap();
        assert_eq!(lessons.len(), 1);
        assert_eq!(lessons[0].student, "Alice");
    }

    #[test]
    fn test_fetch_invalid_month_is_config_error() {
        let store = LessonStore::open_in_memory().unwrap();
        let err = store.fetch_month(13, 2024).unwrap_err();
        assert!(matches!(err, InvoiceError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_lesson_count() {
        let mut store = LessonStore::open_in_memory().unwrap();
        assert_eq!(store.lesson_count().unwrap(), 0);
        store
            .upsert_lessons(&[
                make_lesson("evt-1", "2024-03-04", "Alice", 1.0),
                make_lesson("evt-2", "2024-03-05", "Bob", 1.0),
            ])
            .unwrap();
        assert_eq!(store.lesson_count().unwrap(), 2);
    }

    #[test]
    fn test_open_creates_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("lessons.db");
        {
            let mut store = LessonStore::open(&path).unwrap();
            store
                .upsert_lessons(&[make_lesson("evt-1", "2024-03-04", "Alice", 1.0)])
                .unwrap();
        }
        assert!(path.exists());

        // Reopen and read back.
        let store = LessonStore::open(&path).unwrap();
        assert_eq!(store.lesson_count().unwrap(), 1);
    }
}
