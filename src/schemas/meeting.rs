use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, PrimitiveDateTime};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Meeting;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct MeetingCreate {
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) date: OffsetDateTime,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub(crate) description: String,
    #[validate(length(min = 1, message = "room must not be empty"))]
    pub(crate) room: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AtaCreate {
    #[serde(default)]
    pub(crate) ata: Option<String>,
    #[serde(default)]
    pub(crate) images: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MeetingResponse {
    pub(crate) id: String,
    pub(crate) creator_id: String,
    pub(crate) school_id: String,
    pub(crate) date: String,
    pub(crate) description: String,
    pub(crate) room: String,
    pub(crate) status: &'static str,
    pub(crate) has_ata: bool,
}

impl MeetingResponse {
    /// Status is computed against a single pivot instant captured once per
    /// request, so one listing never mixes clock readings.
    pub(crate) fn from_db(meeting: Meeting, pivot: PrimitiveDateTime) -> Self {
        let status = if meeting.date < pivot { "past" } else { "scheduled" };
        Self {
            id: meeting.id,
            creator_id: meeting.creator_id,
            school_id: meeting.school_id,
            date: format_primitive(meeting.date),
            description: meeting.description,
            room: meeting.room,
            status,
            has_ata: meeting.ata.is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AtaResponse {
    pub(crate) id: String,
    pub(crate) ata: String,
    pub(crate) images: Vec<String>,
}
