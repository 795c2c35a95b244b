use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::{Badge, User, UserBadge};
use crate::db::types::UserRole;
use crate::repositories::seeds::SeedTotals;

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) name: String,
    pub(crate) role: UserRole,
    pub(crate) school_id: String,
    pub(crate) created_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            school_id: user.school_id,
            created_at: format_primitive(user.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct BadgeResponse {
    pub(crate) id: i32,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) image: String,
    pub(crate) is_highlight: bool,
}

impl BadgeResponse {
    pub(crate) fn from_db(badge: Badge, held: UserBadge) -> Self {
        Self {
            id: badge.id,
            title: badge.title,
            description: badge.description,
            image: badge.image,
            is_highlight: held.is_highlight,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ProfileResponse {
    #[serde(flatten)]
    pub(crate) user: UserResponse,
    pub(crate) badges: Vec<BadgeResponse>,
    pub(crate) month_seeds: i64,
    pub(crate) total_seeds: i64,
}

impl ProfileResponse {
    pub(crate) fn new(user: User, badges: Vec<BadgeResponse>, totals: SeedTotals) -> Self {
        Self {
            user: UserResponse::from_db(user),
            badges,
            month_seeds: totals.month_seeds,
            total_seeds: totals.total_seeds,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoleUpdate {
    pub(crate) role: String,
}
