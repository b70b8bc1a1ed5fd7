use serde::{Deserialize, Serialize};

use super::{MembershipType, RegisteredLesson};

/// Studio member, stored in "Users" keyed by phone
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub phone: String,  // PRIMARY IDENTIFIER - the document key
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, alias = "membership")]
    pub membership_type: MembershipType,
    /// Only meaningful for punch-card plans
    #[serde(default)]
    pub remaining_lessons: u32,
    #[serde(default)]
    pub registered_lessons: Vec<RegisteredLesson>,
    #[serde(default)]
    pub completed_lessons: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_date: Option<String>,
}

impl User {
    pub fn is_registered_for(&self, lesson_id: &str) -> bool {
        self.registered_lessons.iter().any(|l| l.id == lesson_id)
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, alias = "membership")]
    pub membership_type: Option<String>,
    #[serde(default)]
    pub remaining_lessons: Option<u32>,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub is_admin: Option<bool>,
    #[serde(alias = "membership")]
    pub membership_type: Option<String>,
    pub remaining_lessons: Option<u32>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.is_admin.is_none()
            && self.membership_type.is_none()
            && self.remaining_lessons.is_none()
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub phone: String,
    pub name: String,
    pub is_admin: bool,
    pub membership_type: String,
    pub remaining_lessons: u32,
    pub completed_lessons: u32,
    pub registered_lessons: Vec<RegisteredLesson>,
    pub join_date: Option<String>,
}

impl From<User> for UserInfo {
    fn from(u: User) -> Self {
        UserInfo {
            phone: u.phone,
            name: u.name,
            is_admin: u.is_admin,
            membership_type: u.membership_type.to_string(),
            remaining_lessons: u.remaining_lessons,
            completed_lessons: u.completed_lessons,
            registered_lessons: u.registered_lessons,
            join_date: u.join_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_legacy_membership_field() {
        let user: User = serde_json::from_value(serde_json::json!({
            "_id": "0547805845",
            "name": "Test User",
            "membership": "כרטיסייה",
            "remainingLessons": 10
        }))
        .unwrap();
        assert!(user.membership_type.is_punch_card());
        assert_eq!(user.remaining_lessons, 10);
        assert!(user.registered_lessons.is_empty());
        assert!(!user.is_admin);
    }

    #[test]
    fn defaults_to_regular_membership() {
        let user: User = serde_json::from_value(serde_json::json!({ "_id": "0501234567" })).unwrap();
        assert_eq!(user.membership_type.weekly_limit(), None);
        assert_eq!(UserInfo::from(user).membership_type, "רגיל");
    }
}
