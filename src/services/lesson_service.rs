use chrono::NaiveDateTime;

use crate::{
    models::{CreateLessonRequest, Lesson},
    store::StudioStore,
    utils::{schedule_time, AppError},
};

pub fn lesson_title(lesson_type: &str, instructor: &str) -> String {
    format!("{} - {}", lesson_type, instructor)
}

/// Lessons ordered by start; unparseable dates sort last
fn sort_by_start(lessons: &mut [Lesson]) {
    lessons.sort_by(|a, b| match (a.start(), b.start()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.date.cmp(&b.date),
    });
}

pub async fn list_lessons(
    store: &dyn StudioStore,
    upcoming_only: bool,
    now: NaiveDateTime,
) -> Result<Vec<Lesson>, AppError> {
    let mut lessons = store.list_lessons().await?;

    if upcoming_only {
        lessons.retain(|l| l.is_upcoming(now));
        for lesson in lessons.iter_mut() {
            lesson.is_active = true;
        }
    }

    sort_by_start(&mut lessons);
    Ok(lessons)
}

pub async fn get_lesson(store: &dyn StudioStore, lesson_id: &str) -> Result<Lesson, AppError> {
    store
        .get_lesson(lesson_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lesson {} not found", lesson_id)))
}

pub fn validate_lesson(request: &CreateLessonRequest) -> Result<(), AppError> {
    if request.instructor.trim().is_empty() {
        return Err(AppError::InvalidRequest("Instructor is required".to_string()));
    }
    if request.lesson_type.trim().is_empty() {
        return Err(AppError::InvalidRequest("Lesson type is required".to_string()));
    }
    if request.max_participants == 0 {
        return Err(AppError::InvalidRequest(
            "maxParticipants must be greater than 0".to_string(),
        ));
    }
    if schedule_time::parse_lesson_date(&request.date).is_none() {
        return Err(AppError::InvalidRequest(format!("Invalid date: {}", request.date)));
    }
    if schedule_time::parse_lesson_time(&request.time).is_none() {
        return Err(AppError::InvalidRequest(format!("Invalid time: {}", request.time)));
    }
    Ok(())
}

pub async fn create_lesson(
    store: &dyn StudioStore,
    request: CreateLessonRequest,
    now: NaiveDateTime,
) -> Result<Lesson, AppError> {
    validate_lesson(&request)?;

    let instructor = request.instructor.trim().to_string();
    let lesson_type = request.lesson_type.trim().to_string();

    let mut lesson = Lesson {
        id: None,
        date: request.date.trim().to_string(),
        time: request.time.trim().to_string(),
        title: lesson_title(&lesson_type, &instructor),
        instructor,
        lesson_type,
        max_participants: request.max_participants,
        registered_participants: 0,
        waiting_list: Vec::new(),
        is_active: false,
        created_at: Some(schedule_time::now_iso()),
    };
    lesson.is_active = lesson.is_upcoming(now);

    let stored = store.insert_lesson(lesson).await?;
    log::info!("📅 Lesson created: {} on {} {}", stored.title, stored.date, stored.time);
    Ok(stored)
}

pub async fn delete_lesson(store: &dyn StudioStore, lesson_id: &str) -> Result<(), AppError> {
    if !store.delete_lesson(lesson_id).await? {
        return Err(AppError::NotFound(format!("Lesson {} not found", lesson_id)));
    }
    log::info!("🗑️  Lesson {} deleted", lesson_id);
    Ok(())
}

pub async fn clear_lessons(store: &dyn StudioStore) -> Result<u64, AppError> {
    let removed = store.clear_lessons().await?;
    log::warn!("🗑️  Cleared {} lessons", removed);
    Ok(removed)
}

/// Persists `isActive` where it no longer matches the lesson start; returns how many changed
pub async fn refresh_activity(store: &dyn StudioStore, now: NaiveDateTime) -> Result<usize, AppError> {
    let mut changed = 0;

    for lesson in store.list_lessons().await? {
        let active = lesson.is_upcoming(now);
        if active == lesson.is_active {
            continue;
        }
        if store.set_lesson_active(&lesson.id_hex(), active).await? {
            changed += 1;
        }
    }

    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn request(date: &str, time: &str, max: u32) -> CreateLessonRequest {
        CreateLessonRequest {
            date: date.to_string(),
            time: time.to_string(),
            instructor: " Dana ".to_string(),
            lesson_type: "Reformer".to_string(),
            max_participants: max,
        }
    }

    #[tokio::test]
    async fn create_sets_defaults() {
        let store = MemoryStore::new();
        let lesson = create_lesson(&store, request("2025-03-11", "09:30", 6), now()).await.unwrap();

        assert!(lesson.id.is_some());
        assert_eq!(lesson.title, "Reformer - Dana");
        assert_eq!(lesson.registered_participants, 0);
        assert!(lesson.waiting_list.is_empty());
        assert!(lesson.is_active);
        assert!(lesson.created_at.is_some());
    }

    #[tokio::test]
    async fn create_rejects_invalid_input() {
        let store = MemoryStore::new();
        for bad in [
            request("2025-03-11", "09:30", 0),
            request("11/03/2025", "09:30", 6),
            request("2025-03-11", "half past", 6),
            CreateLessonRequest { instructor: "  ".into(), ..request("2025-03-11", "09:30", 6) },
        ] {
            let err = create_lesson(&store, bad, now()).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidRequest(_)));
        }
        assert!(store.list_lessons().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upcoming_listing_is_sorted_and_filtered() {
        let store = MemoryStore::new();
        create_lesson(&store, request("2025-03-12", "08:00", 6), now()).await.unwrap();
        create_lesson(&store, request("2025-03-11", "18:00", 6), now()).await.unwrap();
        create_lesson(&store, request("2025-03-01", "08:00", 6), now()).await.unwrap();

        let upcoming = list_lessons(&store, true, now()).await.unwrap();
        let dates: Vec<_> = upcoming.iter().map(|l| l.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-03-11", "2025-03-12"]);

        assert_eq!(list_lessons(&store, false, now()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn refresh_flips_started_lessons() {
        let store = MemoryStore::new();
        let lesson = create_lesson(&store, request("2025-03-10", "13:00", 6), now()).await.unwrap();
        assert!(lesson.is_active);

        let later = now() + chrono::Duration::hours(2);
        assert_eq!(refresh_activity(&store, later).await.unwrap(), 1);
        assert_eq!(refresh_activity(&store, later).await.unwrap(), 0);
        assert!(!get_lesson(&store, &lesson.id_hex()).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn delete_missing_lesson_is_not_found() {
        let store = MemoryStore::new();
        let err = delete_lesson(&store, "65a1b2c3d4e5f60718293a4b").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
