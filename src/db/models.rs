use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) name: String,
    pub(crate) role: UserRole,
    pub(crate) school_id: String,
    pub(crate) is_active: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct School {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Theme {
    pub(crate) id: String,
    pub(crate) name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Activity {
    pub(crate) id: String,
    pub(crate) creator_id: String,
    pub(crate) school_id: String,
    pub(crate) theme_id: String,
    pub(crate) title: String,
    pub(crate) complexity: i32,
    pub(crate) initial_date: PrimitiveDateTime,
    pub(crate) final_date: PrimitiveDateTime,
    pub(crate) objective: String,
    pub(crate) diagnostic: String,
    pub(crate) meta: String,
    pub(crate) resources: String,
    pub(crate) participants: String,
    pub(crate) evaluation_indicator: String,
    pub(crate) evaluation_method: String,
    pub(crate) is_finished: bool,
    pub(crate) report: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ActivityImage {
    pub(crate) id: String,
    pub(crate) activity_id: String,
    pub(crate) kind: String,
    pub(crate) url: String,
    pub(crate) order_index: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Meeting {
    pub(crate) id: String,
    pub(crate) school_id: String,
    pub(crate) creator_id: String,
    pub(crate) date: PrimitiveDateTime,
    pub(crate) description: String,
    pub(crate) room: String,
    pub(crate) ata: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct AtaImage {
    pub(crate) id: String,
    pub(crate) meeting_id: String,
    pub(crate) url: String,
    pub(crate) order_index: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Badge {
    pub(crate) id: i32,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct UserBadge {
    pub(crate) user_id: String,
    pub(crate) badge_id: i32,
    pub(crate) is_highlight: bool,
    pub(crate) awarded_at: PrimitiveDateTime,
}
