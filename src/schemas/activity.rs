use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Activity, Theme};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ActivityCreate {
    #[serde(alias = "themeId")]
    #[validate(length(min = 1, message = "theme_id must not be empty"))]
    pub(crate) theme_id: String,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: String,
    #[validate(range(min = 1, max = 5, message = "complexity must be between 1 and 5"))]
    pub(crate) complexity: i32,
    #[serde(alias = "initialDate", with = "time::serde::rfc3339")]
    pub(crate) initial_date: OffsetDateTime,
    #[serde(alias = "finalDate", with = "time::serde::rfc3339")]
    pub(crate) final_date: OffsetDateTime,
    #[validate(length(min = 1, message = "objective must not be empty"))]
    pub(crate) objective: String,
    #[validate(length(min = 1, message = "diagnostic must not be empty"))]
    pub(crate) diagnostic: String,
    #[validate(length(min = 1, message = "meta must not be empty"))]
    pub(crate) meta: String,
    #[validate(length(min = 1, message = "resources must not be empty"))]
    pub(crate) resources: String,
    #[validate(length(min = 1, message = "participants must not be empty"))]
    pub(crate) participants: String,
    #[serde(alias = "evaluationIndicator")]
    #[validate(length(min = 1, message = "evaluation_indicator must not be empty"))]
    pub(crate) evaluation_indicator: String,
    #[serde(alias = "evaluationMethod")]
    #[validate(length(min = 1, message = "evaluation_method must not be empty"))]
    pub(crate) evaluation_method: String,
    #[serde(default)]
    pub(crate) images: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActivityFinish {
    #[serde(default)]
    pub(crate) report: Option<String>,
    #[serde(default)]
    pub(crate) images: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ActivityResponse {
    pub(crate) id: String,
    pub(crate) creator_id: String,
    pub(crate) school_id: String,
    pub(crate) theme_id: String,
    pub(crate) title: String,
    pub(crate) complexity: i32,
    pub(crate) initial_date: String,
    pub(crate) final_date: String,
    pub(crate) objective: String,
    pub(crate) diagnostic: String,
    pub(crate) meta: String,
    pub(crate) resources: String,
    pub(crate) participants: String,
    pub(crate) evaluation_indicator: String,
    pub(crate) evaluation_method: String,
    pub(crate) is_finished: bool,
    pub(crate) images: Vec<String>,
}

impl ActivityResponse {
    pub(crate) fn from_db(activity: Activity, images: Vec<String>) -> Self {
        Self {
            id: activity.id,
            creator_id: activity.creator_id,
            school_id: activity.school_id,
            theme_id: activity.theme_id,
            title: activity.title,
            complexity: activity.complexity,
            initial_date: format_primitive(activity.initial_date),
            final_date: format_primitive(activity.final_date),
            objective: activity.objective,
            diagnostic: activity.diagnostic,
            meta: activity.meta,
            resources: activity.resources,
            participants: activity.participants,
            evaluation_indicator: activity.evaluation_indicator,
            evaluation_method: activity.evaluation_method,
            is_finished: activity.is_finished,
            images,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) report: String,
    pub(crate) images: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ThemeResponse {
    pub(crate) id: String,
    pub(crate) name: String,
}

impl ThemeResponse {
    pub(crate) fn from_db(theme: Theme) -> Self {
        Self { id: theme.id, name: theme.name }
    }
}
