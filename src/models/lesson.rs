use chrono::{NaiveDate, NaiveDateTime};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::schedule_time;

/// Lesson as stored in the "Lessons" collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// YYYY-MM-DD
    pub date: String,

    /// HH:MM
    #[serde(alias = "hour")]
    pub time: String,

    #[serde(default, alias = "trainerName")]
    pub instructor: String,

    #[serde(rename = "type", default)]
    pub lesson_type: String,

    #[serde(default, deserialize_with = "deserialize_count")]
    pub max_participants: u32,

    #[serde(default, deserialize_with = "deserialize_count")]
    pub registered_participants: u32,

    /// Phones currently registered (the field name predates the booking flow)
    #[serde(default)]
    pub waiting_list: Vec<String>,

    #[serde(default)]
    pub is_active: bool,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Lesson {
    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        schedule_time::lesson_start(&self.date, &self.time)
    }

    pub fn day(&self) -> Option<NaiveDate> {
        schedule_time::parse_lesson_date(&self.date)
    }

    /// A lesson with an unparseable start is never bookable
    pub fn is_upcoming(&self, now: NaiveDateTime) -> bool {
        self.start().map(|start| start >= now).unwrap_or(false)
    }

    pub fn free_seats(&self) -> u32 {
        self.max_participants.saturating_sub(self.registered_participants)
    }

    pub fn is_full(&self) -> bool {
        self.free_seats() == 0
    }

    pub fn has_participant(&self, phone: &str) -> bool {
        self.waiting_list.iter().any(|p| p == phone)
    }

    pub fn summary(&self) -> RegisteredLesson {
        RegisteredLesson {
            id: self.id_hex(),
            date: self.date.clone(),
            time: self.time.clone(),
            lesson_type: self.lesson_type.clone(),
            instructor: self.instructor.clone(),
        }
    }
}

/// Denormalized lesson copy kept in the user's "registeredLessons"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RegisteredLesson {
    #[serde(default)]
    pub id: String,
    pub date: String,
    #[serde(default, alias = "hour")]
    pub time: String,
    #[serde(rename = "type", default)]
    pub lesson_type: String,
    #[serde(default, alias = "trainerName")]
    pub instructor: String,
}

impl RegisteredLesson {
    pub fn day(&self) -> Option<NaiveDate> {
        schedule_time::parse_lesson_date(&self.date)
    }
}

/// Body of POST /api/v1/admin/lessons
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLessonRequest {
    pub date: String,
    pub time: String,
    pub instructor: String,
    #[serde(rename = "type")]
    pub lesson_type: String,
    #[serde(deserialize_with = "deserialize_count")]
    pub max_participants: u32,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonResponse {
    pub id: String,
    pub date: String,
    pub time: String,
    pub instructor: String,
    #[serde(rename = "type")]
    pub lesson_type: String,
    pub title: String,
    pub max_participants: u32,
    pub registered_participants: u32,
    pub free_seats: u32,
    pub is_active: bool,
    pub is_registered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<String>>,
}

impl LessonResponse {
    /// Participant phones are only exposed to admins
    pub fn for_viewer(lesson: Lesson, phone: &str, is_admin: bool) -> Self {
        let is_registered = lesson.has_participant(phone);
        let free_seats = lesson.free_seats();
        LessonResponse {
            id: lesson.id_hex(),
            date: lesson.date,
            time: lesson.time,
            instructor: lesson.instructor,
            lesson_type: lesson.lesson_type,
            title: lesson.title,
            max_participants: lesson.max_participants,
            registered_participants: lesson.registered_participants,
            free_seats,
            is_active: lesson.is_active,
            is_registered,
            participants: if is_admin { Some(lesson.waiting_list) } else { None },
        }
    }
}

/// Counts were historically written both as numbers and as strings
fn deserialize_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCount {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match RawCount::deserialize(deserializer)? {
        RawCount::Int(n) => Ok(n.max(0).min(u32::MAX as i64) as u32),
        RawCount::Float(f) => Ok(f.max(0.0).min(u32::MAX as f64) as u32),
        RawCount::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(0);
            }
            s.parse::<u32>()
                .map_err(|_| serde::de::Error::custom(format!("Invalid count: {}", s)))
        }
    }
}
