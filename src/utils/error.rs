use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    DatabaseError(String),
    NotFound(String),
    InvalidRequest(String),
    Unauthorized(String),
    Forbidden(String),
    /// Membership plan does not allow another lesson (weekly limit or no credits left)
    QuotaExceeded,
    LessonFull,
    LessonNotActive,
    AlreadyRegistered,
    NotRegistered,
    CancellationWindowClosed { hours: i64 },
}

impl AppError {
    /// Translated string shown to the client as an alert
    pub fn alert_message(&self) -> String {
        match self {
            AppError::DatabaseError(_) => "אירעה שגיאה, נסו שוב מאוחר יותר.".to_string(),
            AppError::NotFound(_) => "הפריט המבוקש לא נמצא".to_string(),
            AppError::InvalidRequest(_) => "אנא מלא את כל השדות בטופס".to_string(),
            AppError::Unauthorized(_) => "יש להתחבר מחדש".to_string(),
            AppError::Forbidden(_) => "אין הרשאה לפעולה זו".to_string(),
            AppError::QuotaExceeded => "הגעת למכסת השיעורים של המנוי שלך".to_string(),
            AppError::LessonFull => "השיעור מלא".to_string(),
            AppError::LessonNotActive => "השיעור כבר התקיים".to_string(),
            AppError::AlreadyRegistered => "כבר נרשמת לשיעור זה".to_string(),
            AppError::NotRegistered => "לא נרשמת לשיעור זה".to_string(),
            AppError::CancellationWindowClosed { hours } => {
                format!("ניתן לבטל שיעור עד {} שעות לפני תחילתו", hours)
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::QuotaExceeded => write!(f, "Membership quota exceeded"),
            AppError::LessonFull => write!(f, "Lesson is full"),
            AppError::LessonNotActive => write!(f, "Lesson already started"),
            AppError::AlreadyRegistered => write!(f, "User already registered for lesson"),
            AppError::NotRegistered => write!(f, "User is not registered for lesson"),
            AppError::CancellationWindowClosed { hours } => {
                write!(f, "Cancellation closes {} hours before the lesson", hours)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl From<mongodb::error::Error> for AppError {
    fn from(e: mongodb::error::Error) -> Self {
        AppError::DatabaseError(e.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(e: mongodb::bson::ser::Error) -> Self {
        AppError::DatabaseError(format!("BSON serialization failed: {}", e))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::QuotaExceeded
            | AppError::LessonFull
            | AppError::LessonNotActive
            | AppError::AlreadyRegistered
            | AppError::NotRegistered
            | AppError::CancellationWindowClosed { .. } => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        crate::api::metrics::increment_error_count();
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": self.to_string(),
            "message": self.alert_message()
        }))
    }
}
