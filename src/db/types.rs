use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Unsigned,
    Student,
    Teacher,
    Admin,
}

impl UserRole {
    /// Any authenticated tier above the default unsigned one.
    pub(crate) fn is_verified(self) -> bool {
        !matches!(self, UserRole::Unsigned)
    }

    pub(crate) fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin)
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            UserRole::Unsigned => "unsigned",
            UserRole::Student => "student",
            UserRole::Teacher => "teacher",
            UserRole::Admin => "admin",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "unsigned" => Some(UserRole::Unsigned),
            "student" => Some(UserRole::Student),
            "teacher" => Some(UserRole::Teacher),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}
