use serde::{Deserialize, Serialize};
use std::fmt;

pub const ONCE_A_WEEK: &str = "פעם בשבוע";
pub const TWICE_A_WEEK: &str = "פעמיים בשבוע";
pub const THREE_TIMES_A_WEEK: &str = "3 פעמים בשבוע";
pub const PUNCH_CARD: &str = "כרטיסייה";
pub const REGULAR: &str = "רגיל";

/// Membership plan stored as a free-form label on the user document.
/// Unknown labels are kept verbatim and treated as unrestricted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MembershipType {
    Weekly { per_week: u32, label: String },
    PunchCard,
    Unrestricted(String),
}

impl MembershipType {
    /// Maximum registrations per calendar week, if the plan has one
    pub fn weekly_limit(&self) -> Option<u32> {
        match self {
            MembershipType::Weekly { per_week, .. } => Some(*per_week),
            _ => None,
        }
    }

    pub fn is_punch_card(&self) -> bool {
        matches!(self, MembershipType::PunchCard)
    }

    pub fn label(&self) -> &str {
        match self {
            MembershipType::Weekly { label, .. } => label,
            MembershipType::PunchCard => PUNCH_CARD,
            MembershipType::Unrestricted(label) => label,
        }
    }
}

impl Default for MembershipType {
    fn default() -> Self {
        MembershipType::Unrestricted(REGULAR.to_string())
    }
}

impl From<String> for MembershipType {
    fn from(raw: String) -> Self {
        let trimmed = raw.trim();
        let per_week = match trimmed {
            ONCE_A_WEEK | "פעם אחת בשבוע" | "1 פעמים בשבוע" => Some(1),
            TWICE_A_WEEK | "2 פעמים בשבוע" => Some(2),
            THREE_TIMES_A_WEEK | "שלוש פעמים בשבוע" => Some(3),
            _ => None,
        };

        if let Some(per_week) = per_week {
            return MembershipType::Weekly { per_week, label: trimmed.to_string() };
        }
        if trimmed == PUNCH_CARD {
            return MembershipType::PunchCard;
        }
        if trimmed.is_empty() {
            return MembershipType::default();
        }
        MembershipType::Unrestricted(trimmed.to_string())
    }
}

impl From<&str> for MembershipType {
    fn from(raw: &str) -> Self {
        MembershipType::from(raw.to_string())
    }
}

impl From<MembershipType> for String {
    fn from(m: MembershipType) -> Self {
        m.label().to_string()
    }
}

impl fmt::Display for MembershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Plans created by the seed on first start
pub fn default_plans() -> Vec<&'static str> {
    vec![ONCE_A_WEEK, TWICE_A_WEEK, THREE_TIMES_A_WEEK, PUNCH_CARD, REGULAR]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekly_plans_have_limits() {
        assert_eq!(MembershipType::from(ONCE_A_WEEK).weekly_limit(), Some(1));
        assert_eq!(MembershipType::from(TWICE_A_WEEK).weekly_limit(), Some(2));
        assert_eq!(MembershipType::from(THREE_TIMES_A_WEEK).weekly_limit(), Some(3));
        assert_eq!(MembershipType::from(PUNCH_CARD).weekly_limit(), None);
    }

    #[test]
    fn unknown_labels_survive_round_trip() {
        let plan = MembershipType::from("Premium");
        assert_eq!(plan, MembershipType::Unrestricted("Premium".into()));
        assert_eq!(String::from(plan), "Premium");
        assert_eq!(MembershipType::from("  "), MembershipType::default());
    }

    #[test]
    fn serializes_as_plain_label() {
        let json = serde_json::to_string(&MembershipType::PunchCard).unwrap();
        assert_eq!(json, format!("\"{}\"", PUNCH_CARD));
        let back: MembershipType = serde_json::from_str(&json).unwrap();
        assert!(back.is_punch_card());
    }
}
