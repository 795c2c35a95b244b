use std::sync::Arc;

use sqlx::PgPool;

use crate::core::{config::Settings, redis::RedisHandle};
use crate::services::images::ImageHostService;
use crate::tasks::gamification::GamificationHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    redis: RedisHandle,
    images: Option<ImageHostService>,
    gamification: GamificationHandle,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        db: PgPool,
        redis: RedisHandle,
        images: Option<ImageHostService>,
        gamification: GamificationHandle,
    ) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, redis, images, gamification }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn redis(&self) -> &RedisHandle {
        &self.inner.redis
    }

    pub(crate) fn images(&self) -> Option<&ImageHostService> {
        self.inner.images.as_ref()
    }

    pub(crate) fn gamification(&self) -> &GamificationHandle {
        &self.inner.gamification
    }
}
