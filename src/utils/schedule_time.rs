// Lesson date/time parsing and calendar-week math.
// Lessons are stored as local "YYYY-MM-DD" + "HH:MM" strings, so everything
// here works on naive (studio local) time.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

const TIME_FORMATS: [&str; 4] = ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p"];

pub fn parse_lesson_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    // Older records sometimes carry a full ISO timestamp
    let date_part = date.split('T').next().unwrap_or(date);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

pub fn parse_lesson_time(time: &str) -> Option<NaiveTime> {
    let time = time.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time, fmt).ok())
}

/// Lesson start, or None when either field is unparseable
pub fn lesson_start(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = parse_lesson_date(date)?;
    let time = parse_lesson_time(time)?;
    Some(date.and_time(time))
}

/// Sunday that opens the calendar week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

pub fn same_week(a: NaiveDate, b: NaiveDate) -> bool {
    week_start(a) == week_start(b)
}

/// First day of the following week. For a Sunday this is a week later.
pub fn next_sunday(date: NaiveDate) -> NaiveDate {
    week_start(date) + Duration::days(7)
}

pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}
