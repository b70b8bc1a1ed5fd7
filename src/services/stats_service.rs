// ==================== STATISTICS ====================
// Admin dashboard numbers and the per-member activity summary.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::{
    models::{Lesson, RegisteredLesson, User},
    store::StudioStore,
    utils::{schedule_time, AppError},
};

#[derive(Debug, Clone, Serialize, PartialEq, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuickStats {
    pub active_users: usize,
    pub active_lessons: usize,
    pub weekly_registrations: u32,
    pub monthly_registrations: u32,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub lessons_this_week: Vec<RegisteredLesson>,
    pub past_lessons_count: usize,
    pub weeks_since_joining: i64,
    /// Rounded to two decimals
    pub lessons_per_week: f64,
    /// Keyed "YYYY-M"
    pub monthly_counts: BTreeMap<String, u32>,
}

fn registrations_since(lessons: &[Lesson], from: NaiveDate, to: NaiveDate) -> u32 {
    lessons
        .iter()
        .filter(|l| l.day().is_some_and(|d| d >= from && d <= to))
        .map(|l| l.registered_participants)
        .sum()
}

pub fn quick_stats(users: &[User], lessons: &[Lesson], now: NaiveDateTime) -> QuickStats {
    let today = now.date();
    let week_ago = today - chrono::Duration::days(7);
    let month_ago = today.checked_sub_months(Months::new(1)).unwrap_or(week_ago);

    QuickStats {
        active_users: users.len(),
        active_lessons: lessons.iter().filter(|l| l.is_upcoming(now)).count(),
        weekly_registrations: registrations_since(lessons, week_ago, today),
        monthly_registrations: registrations_since(lessons, month_ago, today),
    }
}

pub async fn load_quick_stats(store: &dyn StudioStore, now: NaiveDateTime) -> Result<QuickStats, AppError> {
    let users = store.list_users().await?;
    let lessons = store.list_lessons().await?;
    Ok(quick_stats(&users, &lessons, now))
}

pub fn month_key(day: NaiveDate) -> String {
    format!("{}-{}", day.year(), day.month())
}

pub fn user_summary(user: &User, today: NaiveDate) -> UserSummary {
    // From today through the coming Sunday, inclusive
    let end_of_week = schedule_time::next_sunday(today);

    let lessons_this_week: Vec<RegisteredLesson> = user
        .registered_lessons
        .iter()
        .filter(|l| l.day().is_some_and(|d| d >= today && d <= end_of_week))
        .cloned()
        .collect();

    let past_lessons_count = user
        .registered_lessons
        .iter()
        .filter(|l| l.day().is_some_and(|d| d < today))
        .count();

    let weeks_since_joining = user
        .join_date
        .as_deref()
        .and_then(schedule_time::parse_lesson_date)
        .map(|joined| {
            let days = (today - joined).num_days();
            (days + 6).div_euclid(7)
        })
        .unwrap_or(0)
        .max(1);

    let lessons_per_week = (past_lessons_count as f64 / weeks_since_joining as f64 * 100.0).round() / 100.0;

    let mut monthly_counts = BTreeMap::new();
    for day in user.registered_lessons.iter().filter_map(|l| l.day()) {
        *monthly_counts.entry(month_key(day)).or_insert(0) += 1;
    }

    UserSummary {
        lessons_this_week,
        past_lessons_count,
        weeks_since_joining,
        lessons_per_week,
        monthly_counts,
    }
}

pub async fn load_user_summary(
    store: &dyn StudioStore,
    phone: &str,
    today: NaiveDate,
) -> Result<UserSummary, AppError> {
    let user = store
        .get_user(phone)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", phone)))?;
    Ok(user_summary(&user, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MembershipType;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn booked(date: &str) -> RegisteredLesson {
        RegisteredLesson {
            id: date.to_string(),
            date: date.to_string(),
            time: "09:00".to_string(),
            lesson_type: "Mat".to_string(),
            instructor: "Lior".to_string(),
        }
    }

    fn lesson(date: &str, registered: u32) -> Lesson {
        serde_json::from_value(serde_json::json!({
            "date": date,
            "time": "10:00",
            "maxParticipants": 10,
            "registeredParticipants": registered
        }))
        .unwrap()
    }

    fn member(join_date: Option<&str>, lessons: &[&str]) -> User {
        User {
            phone: "0547805845".to_string(),
            name: "Yael".to_string(),
            is_admin: false,
            membership_type: MembershipType::default(),
            remaining_lessons: 0,
            registered_lessons: lessons.iter().map(|d| booked(d)).collect(),
            completed_lessons: 0,
            join_date: join_date.map(str::to_string),
        }
    }

    #[test]
    fn quick_stats_sum_recent_registrations() {
        let now = day("2025-03-15").and_hms_opt(12, 0, 0).unwrap();
        let lessons = vec![
            lesson("2025-03-14", 4), // this week
            lesson("2025-03-01", 3), // this month only
            lesson("2025-01-01", 9), // too old
            lesson("2025-03-20", 2), // upcoming
        ];
        let users = vec![member(None, &[]), member(None, &[])];

        let stats = quick_stats(&users, &lessons, now);
        assert_eq!(
            stats,
            QuickStats {
                active_users: 2,
                active_lessons: 1,
                weekly_registrations: 4,
                monthly_registrations: 7,
            }
        );
    }

    #[test]
    fn summary_splits_week_and_past() {
        // 2025-03-12 is a Wednesday; the window runs through Sunday 2025-03-16
        let user = member(
            Some("2025-02-12T10:00:00+00:00"),
            &["2025-02-20", "2025-03-03", "2025-03-11", "2025-03-13", "2025-03-16"],
        );
        let summary = user_summary(&user, day("2025-03-12"));

        let dates: Vec<&str> = summary.lessons_this_week.iter().map(|l| l.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-03-13", "2025-03-16"]);
        assert_eq!(summary.past_lessons_count, 3);
        assert_eq!(summary.weeks_since_joining, 4);
        assert_eq!(summary.lessons_per_week, 0.75);
        assert_eq!(summary.monthly_counts.get("2025-2"), Some(&1));
        assert_eq!(summary.monthly_counts.get("2025-3"), Some(&4));
    }

    #[test]
    fn summary_on_a_sunday_looks_one_week_ahead() {
        let user = member(None, &["2025-03-16", "2025-03-22", "2025-03-23", "2025-03-24"]);
        let summary = user_summary(&user, day("2025-03-16"));

        let dates: Vec<&str> = summary.lessons_this_week.iter().map(|l| l.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-03-16", "2025-03-22", "2025-03-23"]);
    }

    #[test]
    fn summary_without_join_date_uses_one_week() {
        let user = member(None, &["2025-03-01", "2025-03-02", "2025-03-03"]);
        let summary = user_summary(&user, day("2025-03-12"));
        assert_eq!(summary.weeks_since_joining, 1);
        assert_eq!(summary.lessons_per_week, 3.0);
    }
}
