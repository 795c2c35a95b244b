use std::collections::HashMap;

use serde::Serialize;

pub(crate) mod activity;
pub(crate) mod auth;
pub(crate) mod meeting;
pub(crate) mod user;

/// Success envelope shared by every endpoint: `{"success": true, "data": ...}`.
#[derive(Debug, Serialize)]
pub(crate) struct DataResponse<T> {
    pub(crate) success: bool,
    pub(crate) data: T,
}

impl<T> DataResponse<T> {
    pub(crate) fn new(data: T) -> Self {
        Self { success: true, data }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: String,
    pub(crate) status: String,
    pub(crate) components: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
}
