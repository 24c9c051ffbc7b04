//! Week grouping and aggregation.
//!
//! Partitions a month's lessons into contiguous calendar-week groups with a
//! single linear scan, then sums per-week and monthly totals. All sums are
//! computed on numeric values; display-string conversion is a separate,
//! terminal projection ([`crate::models::render_invoice`]).

use chrono::Datelike;
use tracing::debug;

use crate::models::{Lesson, MonthlyInvoiceResult, WeekGroup};

/// Partition `lessons` into calendar-week groups and compute totals.
///
/// Lessons are stably sorted by date (same-date ties keep their input
/// order), then walked once with a current-group accumulator. The function
/// is total over any well-formed input: an empty list yields an empty
/// result, and every emitted group contains at least one lesson.
pub fn group_by_week(mut lessons: Vec<Lesson>) -> MonthlyInvoiceResult {
    if lessons.is_empty() {
        return MonthlyInvoiceResult::default();
    }

    lessons.sort_by_key(|lesson| lesson.date);

    let mut weeks: Vec<WeekGroup> = Vec::new();
    let mut current: Vec<Lesson> = Vec::new();

    let mut iter = lessons.into_iter().peekable();
    while let Some(lesson) = iter.next() {
        let boundary = match iter.peek() {
            None => true,
            Some(next) => week_boundary(&lesson, next),
        };

        current.push(lesson);

        if boundary {
            let total = current.iter().map(|l| l.earned).sum();
            weeks.push(WeekGroup {
                lessons: std::mem::take(&mut current),
                total,
            });
        }
    }

    let weekly_totals: Vec<f64> = weeks.iter().map(|w| w.total).collect();
    let grand_total = weekly_totals.iter().sum();

    debug!(
        "group_by_week: {} lessons partitioned into {} weeks",
        weeks.iter().map(|w| w.lessons.len()).sum::<usize>(),
        weeks.len()
    );

    MonthlyInvoiceResult {
        weeks,
        weekly_totals,
        grand_total,
    }
}

/// `true` when `next` belongs to a new calendar week relative to `prev`.
///
/// Two signals close a week: the weekday index regressing (e.g. Sunday back
/// to Monday), and the raw day-of-month jumping by 7 or more, which catches
/// a fully missed week with no regression in between. The day jump compares
/// day-of-month numbers only, so it never fires across a month boundary
/// (day 29 followed by day 6 of the next month stays in one group); the
/// regression test below pins that inherited behaviour.
fn week_boundary(prev: &Lesson, next: &Lesson) -> bool {
    next.weekday < prev.weekday || next.date.day() >= prev.date.day() + 7
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_lesson(date_str: &str, student: &str, duration: f64, rate: f64) -> Lesson {
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap();
        Lesson {
            event_id: format!("evt-{}-{}", date_str, student),
            date,
            weekday: date.weekday().num_days_from_monday() as u8,
            student: student.to_string(),
            duration,
            hourly_rate: rate,
            earned: duration * rate,
        }
    }

    #[test]
    fn test_empty_input_yields_empty_result() {
        let result = group_by_week(vec![]);
        assert!(result.weeks.is_empty());
        assert!(result.weekly_totals.is_empty());
        assert_eq!(result.grand_total, 0.0);
    }

    #[test]
    fn test_single_lesson_single_group() {
        let result = group_by_week(vec![make_lesson("2024-03-04", "Alice", 1.0, 20.0)]);
        assert_eq!(result.weeks.len(), 1);
        assert_eq!(result.weeks[0].lessons.len(), 1);
        assert_eq!(result.weekly_totals, vec![20.0]);
        assert!((result.grand_total - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_same_week_stays_in_one_group() {
        // Monday, Wednesday, Saturday of one week.
        let result = group_by_week(vec![
            make_lesson("2024-03-04", "Alice", 1.0, 20.0),
            make_lesson("2024-03-06", "Bob", 1.0, 20.0),
            make_lesson("2024-03-09", "Cara", 1.0, 20.0),
        ]);
        assert_eq!(result.weeks.len(), 1);
        assert_eq!(result.weeks[0].lessons.len(), 3);
    }

    #[test]
    fn test_weekday_regression_starts_new_group() {
        // Friday then the following Monday.
        let result = group_by_week(vec![
            make_lesson("2024-03-08", "Alice", 1.0, 20.0),
            make_lesson("2024-03-11", "Bob", 1.0, 20.0),
        ]);
        assert_eq!(result.weeks.len(), 2);
        assert_eq!(result.weeks[0].lessons[0].student, "Alice");
        assert_eq!(result.weeks[1].lessons[0].student, "Bob");
    }

    #[test]
    fn test_day_jump_splits_monday_to_monday() {
        // Monday to the next Monday: no weekday regression, but the
        // day-of-month jumps by exactly 7.
        let result = group_by_week(vec![
            make_lesson("2024-03-04", "Alice", 1.0, 20.0),
            make_lesson("2024-03-11", "Alice", 1.0, 20.0),
        ]);
        assert_eq!(result.weeks.len(), 2);
    }

    #[test]
    fn test_day_jump_splits_missed_week() {
        // Monday then the Tuesday twelve days later: weekday moves forward,
        // only the day jump closes the first week.
        let result = group_by_week(vec![
            make_lesson("2024-01-08", "Alice", 1.0, 20.0),
            make_lesson("2024-01-16", "Bob", 1.0, 20.0),
        ]);
        assert_eq!(result.weeks.len(), 2);
    }

    #[test]
    fn test_day_jump_does_not_fire_across_month_boundary() {
        // Monday Jan 29 to Tuesday Feb 6: eight days elapse and no weekday
        // regression occurs, yet day-of-month 6 < 29 + 7, so the inherited
        // rule keeps both lessons in one group. Pins the quirk described in
        // the grouping rules; do not "fix" without redefining the boundary.
        let result = group_by_week(vec![
            make_lesson("2024-01-29", "Alice", 1.0, 20.0),
            make_lesson("2024-02-06", "Bob", 1.0, 20.0),
        ]);
        assert_eq!(result.weeks.len(), 1);
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let result = group_by_week(vec![
            make_lesson("2024-03-11", "Bob", 1.0, 20.0),
            make_lesson("2024-03-04", "Alice", 1.0, 20.0),
            make_lesson("2024-03-06", "Cara", 1.0, 20.0),
        ]);
        assert_eq!(result.weeks.len(), 2);
        assert_eq!(result.weeks[0].lessons[0].student, "Alice");
        assert_eq!(result.weeks[0].lessons[1].student, "Cara");
        assert_eq!(result.weeks[1].lessons[0].student, "Bob");
    }

    #[test]
    fn test_same_date_ties_keep_input_order() {
        let result = group_by_week(vec![
            make_lesson("2024-03-04", "Zoe", 1.0, 20.0),
            make_lesson("2024-03-04", "Alice", 1.0, 20.0),
        ]);
        assert_eq!(result.weeks.len(), 1);
        let students: Vec<&str> = result.weeks[0]
            .lessons
            .iter()
            .map(|l| l.student.as_str())
            .collect();
        assert_eq!(students, vec!["Zoe", "Alice"]);
    }

    #[test]
    fn test_weekly_totals_and_grand_total() {
        let result = group_by_week(vec![
            make_lesson("2024-03-04", "Alice", 1.5, 20.0), // 30
            make_lesson("2024-03-06", "Bob", 1.0, 20.0),   // 20
            make_lesson("2024-03-11", "Alice", 2.0, 20.0), // 40
        ]);
        assert_eq!(result.weekly_totals.len(), 2);
        assert!((result.weekly_totals[0] - 50.0).abs() < 1e-9);
        assert!((result.weekly_totals[1] - 40.0).abs() < 1e-9);
        assert!((result.grand_total - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_sum_invariant() {
        let lessons = vec![
            make_lesson("2024-03-01", "Alice", 1.0, 25.0),
            make_lesson("2024-03-04", "Bob", 1.5, 25.0),
            make_lesson("2024-03-08", "Cara", 0.75, 25.0),
            make_lesson("2024-03-11", "Alice", 2.0, 25.0),
            make_lesson("2024-03-22", "Bob", 1.0, 25.0),
        ];
        let flat_sum: f64 = lessons.iter().map(|l| l.earned).sum();
        let result = group_by_week(lessons);
        let weekly_sum: f64 = result.weekly_totals.iter().sum();
        assert!((weekly_sum - flat_sum).abs() < 1e-9);
        assert!((result.grand_total - flat_sum).abs() < 1e-9);
    }

    #[test]
    fn test_no_empty_groups() {
        let result = group_by_week(vec![
            make_lesson("2024-03-04", "Alice", 1.0, 20.0),
            make_lesson("2024-03-11", "Bob", 1.0, 20.0),
            make_lesson("2024-03-25", "Cara", 1.0, 20.0),
        ]);
        assert!(result.weeks.iter().all(|w| !w.lessons.is_empty()));
    }

    #[test]
    fn test_grouping_is_idempotent() {
        let lessons = vec![
            make_lesson("2024-03-04", "Alice", 1.0, 20.0),
            make_lesson("2024-03-06", "Bob", 1.5, 20.0),
            make_lesson("2024-03-11", "Cara", 1.0, 20.0),
        ];
        let first = group_by_week(lessons.clone());
        let flattened: Vec<Lesson> = first
            .weeks
            .iter()
            .flat_map(|w| w.lessons.iter().cloned())
            .collect();
        let second = group_by_week(flattened);

        assert_eq!(first.weeks.len(), second.weeks.len());
        assert_eq!(first.weekly_totals, second.weekly_totals);
        assert_eq!(first.grand_total, second.grand_total);
    }

    #[test]
    fn test_full_month_partitioning() {
        // March 2024: lessons in four distinct calendar weeks.
        let result = group_by_week(vec![
            make_lesson("2024-03-01", "Alice", 1.0, 20.0), // Fri, week 1
            make_lesson("2024-03-05", "Bob", 1.0, 20.0),   // Tue, week 2
            make_lesson("2024-03-07", "Alice", 1.0, 20.0), // Thu, week 2
            make_lesson("2024-03-12", "Bob", 1.0, 20.0),   // Tue, week 3
            make_lesson("2024-03-18", "Cara", 1.0, 20.0),  // Mon, week 4
            make_lesson("2024-03-22", "Alice", 1.0, 20.0), // Fri, week 4
        ]);
        let sizes: Vec<usize> = result.weeks.iter().map(|w| w.lessons.len()).collect();
        assert_eq!(sizes, vec![1, 2, 1, 2]);
    }
}
