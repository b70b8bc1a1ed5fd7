// ==================== LESSON REGISTRATION BOOKKEEPING ====================
// Quota checks plus the paired Lesson/User writes for register and cancel.
// The two writes are independent: lesson first, then user. A failure on the
// second write is logged and surfaced, never rolled back.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::{
    models::{Lesson, User},
    store::{SeatChange, StudioStore},
    utils::{schedule_time, AppError},
};

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Eligibility {
    pub can_register: bool,
    pub membership_type: String,
    pub lessons_this_week: u32,
    pub weekly_limit: Option<u32>,
    /// Only reported for punch-card plans
    pub remaining_lessons: Option<u32>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingReceipt {
    pub lesson_id: String,
    pub phone: String,
    pub registered_participants: u32,
    pub remaining_lessons: Option<u32>,
}

/// How many of the user's registered lessons fall in the calendar week of `lesson`
pub fn lessons_in_week(user: &User, lesson: &Lesson) -> u32 {
    let Some(target) = lesson.day() else {
        return 0;
    };

    user.registered_lessons
        .iter()
        .filter_map(|l| l.day())
        .filter(|day| schedule_time::same_week(*day, target))
        .count() as u32
}

pub fn can_register(user: &User, lesson: &Lesson) -> bool {
    let membership = &user.membership_type;

    if membership.is_punch_card() {
        return user.remaining_lessons > 0;
    }

    match membership.weekly_limit() {
        Some(limit) => lessons_in_week(user, lesson) < limit,
        None => true,
    }
}

pub fn eligibility(user: &User, lesson: &Lesson) -> Eligibility {
    let membership = &user.membership_type;
    Eligibility {
        can_register: can_register(user, lesson),
        membership_type: membership.to_string(),
        lessons_this_week: lessons_in_week(user, lesson),
        weekly_limit: membership.weekly_limit(),
        remaining_lessons: membership.is_punch_card().then_some(user.remaining_lessons),
    }
}

fn is_registered(user: &User, lesson: &Lesson) -> bool {
    lesson.has_participant(&user.phone) || user.is_registered_for(&lesson.id_hex())
}

pub async fn register(
    store: &dyn StudioStore,
    user: &User,
    lesson: &Lesson,
    now: NaiveDateTime,
) -> Result<BookingReceipt, AppError> {
    let lesson_id = lesson.id_hex();

    if !lesson.is_upcoming(now) {
        return Err(AppError::LessonNotActive);
    }
    if is_registered(user, lesson) {
        return Err(AppError::AlreadyRegistered);
    }
    if !can_register(user, lesson) {
        log::info!("🚫 Quota reached for {} ({})", user.phone, user.membership_type);
        return Err(AppError::QuotaExceeded);
    }
    if lesson.is_full() {
        return Err(AppError::LessonFull);
    }

    if !store.update_lesson_seat(&lesson_id, &user.phone, SeatChange::Take).await? {
        // Either the lesson is gone or a concurrent request took the seat first
        return Err(match store.get_lesson(&lesson_id).await? {
            Some(current) if current.has_participant(&user.phone) => AppError::AlreadyRegistered,
            _ => AppError::NotFound(format!("Lesson {} not found", lesson_id)),
        });
    }

    let punch_card = user.membership_type.is_punch_card();
    let user_write = store
        .add_registered_lesson(&user.phone, &lesson.summary(), punch_card)
        .await;
    ensure_user_write(user_write, "register", &user.phone, &lesson_id)?;

    log::info!("✅ {} registered for lesson {}", user.phone, lesson_id);

    Ok(BookingReceipt {
        lesson_id,
        phone: user.phone.clone(),
        registered_participants: lesson.registered_participants + 1,
        remaining_lessons: punch_card.then(|| user.remaining_lessons.saturating_sub(1)),
    })
}

pub async fn cancel(
    store: &dyn StudioStore,
    user: &User,
    lesson: &Lesson,
    now: NaiveDateTime,
    cancellation_window_hours: i64,
) -> Result<BookingReceipt, AppError> {
    let lesson_id = lesson.id_hex();

    if !is_registered(user, lesson) {
        return Err(AppError::NotRegistered);
    }

    let window = Duration::hours(cancellation_window_hours);
    let cancelable = lesson
        .start()
        .map(|start| start - now > window)
        .unwrap_or(false);
    if !cancelable {
        return Err(AppError::CancellationWindowClosed { hours: cancellation_window_hours });
    }

    if !store.update_lesson_seat(&lesson_id, &user.phone, SeatChange::Release).await? {
        return Err(AppError::NotFound(format!("Lesson {} not found", lesson_id)));
    }

    let punch_card = user.membership_type.is_punch_card();
    let refunded = punch_card && user.is_registered_for(&lesson_id);
    let user_write = store
        .remove_registered_lesson(&user.phone, &lesson_id, punch_card)
        .await;
    ensure_user_write(user_write, "cancel", &user.phone, &lesson_id)?;

    log::info!("✅ {} cancelled lesson {}", user.phone, lesson_id);

    Ok(BookingReceipt {
        lesson_id,
        phone: user.phone.clone(),
        registered_participants: lesson.registered_participants.saturating_sub(1),
        remaining_lessons: punch_card.then(|| user.remaining_lessons + u32::from(refunded)),
    })
}

/// The lesson side is already written at this point
fn ensure_user_write(
    result: Result<bool, AppError>,
    action: &str,
    phone: &str,
    lesson_id: &str,
) -> Result<(), AppError> {
    match result {
        Ok(true) => Ok(()),
        Ok(false) => {
            log::error!(
                "⚠️  {}: lesson {} updated but user {} matched nothing; collections out of sync",
                action, lesson_id, phone
            );
            Err(AppError::DatabaseError(format!("User {} was not updated", phone)))
        }
        Err(e) => {
            log::error!(
                "⚠️  {}: lesson {} updated but user {} write failed: {}",
                action, lesson_id, phone, e
            );
            Err(e)
        }
    }
}

/// Loads both documents, then registers
pub async fn register_by_id(
    store: &dyn StudioStore,
    phone: &str,
    lesson_id: &str,
    now: NaiveDateTime,
) -> Result<BookingReceipt, AppError> {
    let (user, lesson) = load_pair(store, phone, lesson_id).await?;
    register(store, &user, &lesson, now).await
}

pub async fn cancel_by_id(
    store: &dyn StudioStore,
    phone: &str,
    lesson_id: &str,
    now: NaiveDateTime,
    cancellation_window_hours: i64,
) -> Result<BookingReceipt, AppError> {
    let (user, lesson) = load_pair(store, phone, lesson_id).await?;
    cancel(store, &user, &lesson, now, cancellation_window_hours).await
}

pub async fn eligibility_by_id(
    store: &dyn StudioStore,
    phone: &str,
    lesson_id: &str,
) -> Result<Eligibility, AppError> {
    let (user, lesson) = load_pair(store, phone, lesson_id).await?;
    Ok(eligibility(&user, &lesson))
}

async fn load_pair(
    store: &dyn StudioStore,
    phone: &str,
    lesson_id: &str,
) -> Result<(User, Lesson), AppError> {
    let user = store
        .get_user(phone)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", phone)))?;
    let lesson = store
        .get_lesson(lesson_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lesson {} not found", lesson_id)))?;
    Ok((user, lesson))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{membership, MembershipType, RegisteredLesson};
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn user(membership: &str, remaining: u32) -> User {
        User {
            phone: "0547805845".to_string(),
            name: "Maya".to_string(),
            is_admin: false,
            membership_type: MembershipType::from(membership),
            remaining_lessons: remaining,
            registered_lessons: Vec::new(),
            completed_lessons: 0,
            join_date: None,
        }
    }

    fn lesson(date: &str, time: &str, max: u32) -> Lesson {
        Lesson {
            id: None,
            date: date.to_string(),
            time: time.to_string(),
            instructor: "Dana".to_string(),
            lesson_type: "Reformer".to_string(),
            max_participants: max,
            registered_participants: 0,
            waiting_list: Vec::new(),
            is_active: true,
            title: "Reformer - Dana".to_string(),
            created_at: None,
        }
    }

    fn booked(date: &str) -> RegisteredLesson {
        RegisteredLesson {
            id: format!("booked-{}", date),
            date: date.to_string(),
            time: "08:00".to_string(),
            lesson_type: "Mat".to_string(),
            instructor: "Lior".to_string(),
        }
    }

    async fn seed(store: &MemoryStore, user: &User, lesson: Lesson) -> Lesson {
        store.put_user(user).await.unwrap();
        store.insert_lesson(lesson).await.unwrap()
    }

    #[test]
    fn weekly_limit_reached_blocks_registration() {
        // 2025-01-08 is a Wednesday; its week runs 2025-01-05..=2025-01-11
        let target = lesson("2025-01-08", "10:00", 10);

        let mut twice = user(membership::TWICE_A_WEEK, 0);
        twice.registered_lessons = vec![booked("2025-01-05"), booked("2025-01-11")];
        assert!(!can_register(&twice, &target));

        // Lessons from the neighbouring weeks do not count
        twice.registered_lessons = vec![booked("2025-01-04"), booked("2025-01-12")];
        assert!(can_register(&twice, &target));
    }

    #[test]
    fn each_weekly_plan_allows_exactly_its_limit() {
        let target = lesson("2025-01-08", "10:00", 10);
        for (plan, limit) in [
            (membership::ONCE_A_WEEK, 1),
            (membership::TWICE_A_WEEK, 2),
            (membership::THREE_TIMES_A_WEEK, 3),
        ] {
            let mut u = user(plan, 0);
            u.registered_lessons = (0..limit - 1).map(|i| booked(&format!("2025-01-0{}", 6 + i))).collect();
            assert!(can_register(&u, &target), "{} below limit", plan);

            u.registered_lessons.push(booked("2025-01-10"));
            assert!(!can_register(&u, &target), "{} at limit", plan);
        }
    }

    #[test]
    fn punch_card_without_credits_is_blocked_regardless_of_week() {
        let target = lesson("2025-01-08", "10:00", 10);
        let empty = user(membership::PUNCH_CARD, 0);
        assert!(!can_register(&empty, &target));

        let mut loaded = user(membership::PUNCH_CARD, 1);
        loaded.registered_lessons = vec![booked("2025-01-06"), booked("2025-01-07"), booked("2025-01-09")];
        assert!(can_register(&loaded, &target));
    }

    #[test]
    fn unrestricted_plans_always_pass() {
        let target = lesson("2025-01-08", "10:00", 10);
        let mut regular = user("רגיל", 0);
        regular.registered_lessons = (5..=9).map(|d| booked(&format!("2025-01-0{}", d))).collect();
        assert!(can_register(&regular, &target));

        let info = eligibility(&regular, &target);
        assert_eq!(info.lessons_this_week, 5);
        assert_eq!(info.weekly_limit, None);
        assert_eq!(info.remaining_lessons, None);
    }

    #[tokio::test]
    async fn register_then_cancel_restores_counters() {
        let store = MemoryStore::new();
        let member = user(membership::PUNCH_CARD, 3);
        let stored = seed(&store, &member, lesson("2025-01-20", "18:00", 8)).await;
        let id = stored.id_hex();

        let receipt = register_by_id(&store, &member.phone, &id, now()).await.unwrap();
        assert_eq!(receipt.registered_participants, 1);
        assert_eq!(receipt.remaining_lessons, Some(2));

        let after_register = store.get_lesson(&id).await.unwrap().unwrap();
        assert_eq!(after_register.registered_participants, 1);
        assert_eq!(after_register.waiting_list, vec![member.phone.clone()]);
        let user_after = store.get_user(&member.phone).await.unwrap().unwrap();
        assert_eq!(user_after.remaining_lessons, 2);
        assert!(user_after.is_registered_for(&id));

        cancel_by_id(&store, &member.phone, &id, now(), 24).await.unwrap();

        let lesson_back = store.get_lesson(&id).await.unwrap().unwrap();
        let user_back = store.get_user(&member.phone).await.unwrap().unwrap();
        assert_eq!(lesson_back.registered_participants, 0);
        assert!(lesson_back.waiting_list.is_empty());
        assert_eq!(user_back.remaining_lessons, 3);
        assert!(user_back.registered_lessons.is_empty());
    }

    #[tokio::test]
    async fn quota_rejection_performs_no_mutation() {
        let store = MemoryStore::new();
        let member = user(membership::PUNCH_CARD, 0);
        let stored = seed(&store, &member, lesson("2025-01-20", "18:00", 8)).await;
        let id = stored.id_hex();

        let err = register_by_id(&store, &member.phone, &id, now()).await.unwrap_err();
        assert_eq!(err, AppError::QuotaExceeded);

        let untouched = store.get_lesson(&id).await.unwrap().unwrap();
        assert_eq!(untouched.registered_participants, 0);
        assert!(untouched.waiting_list.is_empty());
        assert!(store.get_user(&member.phone).await.unwrap().unwrap().registered_lessons.is_empty());
    }

    #[tokio::test]
    async fn full_past_and_duplicate_registrations_are_rejected() {
        let store = MemoryStore::new();
        let member = user("רגיל", 0);

        let full = seed(&store, &member, lesson("2025-01-20", "18:00", 0)).await;
        assert_eq!(
            register_by_id(&store, &member.phone, &full.id_hex(), now()).await.unwrap_err(),
            AppError::LessonFull
        );

        let past = store.insert_lesson(lesson("2024-12-30", "18:00", 8)).await.unwrap();
        assert_eq!(
            register_by_id(&store, &member.phone, &past.id_hex(), now()).await.unwrap_err(),
            AppError::LessonNotActive
        );

        let open = store.insert_lesson(lesson("2025-01-20", "18:00", 8)).await.unwrap();
        register_by_id(&store, &member.phone, &open.id_hex(), now()).await.unwrap();
        assert_eq!(
            register_by_id(&store, &member.phone, &open.id_hex(), now()).await.unwrap_err(),
            AppError::AlreadyRegistered
        );
        assert_eq!(
            store.get_lesson(&open.id_hex()).await.unwrap().unwrap().registered_participants,
            1
        );
    }

    #[tokio::test]
    async fn cancel_inside_window_is_rejected() {
        let store = MemoryStore::new();
        let member = user("רגיל", 0);
        // Starts 20 hours after `now()`
        let soon = seed(&store, &member, lesson("2025-01-02", "05:00", 8)).await;
        let id = soon.id_hex();

        register_by_id(&store, &member.phone, &id, now()).await.unwrap();
        let err = cancel_by_id(&store, &member.phone, &id, now(), 24).await.unwrap_err();
        assert_eq!(err, AppError::CancellationWindowClosed { hours: 24 });
        assert_eq!(store.get_lesson(&id).await.unwrap().unwrap().registered_participants, 1);

        // A shorter window lets it through
        cancel_by_id(&store, &member.phone, &id, now(), 12).await.unwrap();
    }

    #[tokio::test]
    async fn participants_never_go_negative() {
        let store = MemoryStore::new();
        let member = user("רגיל", 0);
        let stored = seed(&store, &member, lesson("2025-01-20", "18:00", 8)).await;
        let id = stored.id_hex();

        register_by_id(&store, &member.phone, &id, now()).await.unwrap();
        cancel_by_id(&store, &member.phone, &id, now(), 24).await.unwrap();

        for _ in 0..3 {
            let err = cancel_by_id(&store, &member.phone, &id, now(), 24).await.unwrap_err();
            assert_eq!(err, AppError::NotRegistered);
            store.update_lesson_seat(&id, &member.phone, SeatChange::Release).await.unwrap();
        }

        assert_eq!(store.get_lesson(&id).await.unwrap().unwrap().registered_participants, 0);
    }

    #[tokio::test]
    async fn failed_user_write_leaves_lesson_updated() {
        let store = MemoryStore::new();
        let member = user("רגיל", 0);
        let stored = seed(&store, &member, lesson("2025-01-20", "18:00", 8)).await;
        let id = stored.id_hex();

        store.fail_user_writes(true);
        let err = register_by_id(&store, &member.phone, &id, now()).await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(_)));

        // No rollback: the seat stays taken while the user record is unchanged
        let lesson_after = store.get_lesson(&id).await.unwrap().unwrap();
        assert_eq!(lesson_after.registered_participants, 1);
        assert!(store.get_user(&member.phone).await.unwrap().unwrap().registered_lessons.is_empty());
    }

    #[tokio::test]
    async fn cancel_after_failed_user_write_refunds_nothing() {
        let store = MemoryStore::new();
        let member = user(membership::PUNCH_CARD, 3);
        let stored = seed(&store, &member, lesson("2025-01-20", "18:00", 8)).await;
        let id = stored.id_hex();

        store.fail_user_writes(true);
        assert!(register_by_id(&store, &member.phone, &id, now()).await.is_err());
        store.fail_user_writes(false);

        // The phone is still on the lesson, so the cancel goes through
        let receipt = cancel_by_id(&store, &member.phone, &id, now(), 24).await.unwrap();
        assert_eq!(receipt.remaining_lessons, Some(3));

        let user_after = store.get_user(&member.phone).await.unwrap().unwrap();
        assert_eq!(user_after.remaining_lessons, 3);
        assert!(user_after.registered_lessons.is_empty());
        let lesson_after = store.get_lesson(&id).await.unwrap().unwrap();
        assert_eq!(lesson_after.registered_participants, 0);
        assert!(lesson_after.waiting_list.is_empty());
    }

    #[tokio::test]
    async fn simultaneous_requests_book_the_same_user_once() {
        let store = MemoryStore::new();
        let member = user(membership::PUNCH_CARD, 3);
        let stored = seed(&store, &member, lesson("2025-01-20", "18:00", 8)).await;

        // Both requests pass the pre-checks on the same snapshot
        let (first, second) = tokio::join!(
            register(&store, &member, &stored, now()),
            register(&store, &member, &stored, now())
        );
        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(AppError::AlreadyRegistered))));

        let lesson_after = store.get_lesson(&stored.id_hex()).await.unwrap().unwrap();
        assert_eq!(lesson_after.registered_participants, 1);
        assert_eq!(lesson_after.waiting_list, vec![member.phone.clone()]);

        let user_after = store.get_user(&member.phone).await.unwrap().unwrap();
        assert_eq!(user_after.remaining_lessons, 2);
        assert_eq!(user_after.registered_lessons.len(), 1);
    }
}
