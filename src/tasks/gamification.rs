use sqlx::PgPool;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::repositories::badges::AwardOutcome;

const SEEDS_ACTIVITY_CREATED: i32 = 40;
const SEEDS_ACTIVITY_FINISHED: i32 = 100;
const SEEDS_MEETING_CREATED: i32 = 20;
const SEEDS_ATA_ADDED: i32 = 30;

const BADGE_ACTIVITY_CREATED: i32 = 1;
const BADGE_ACTIVITY_FINISHED: i32 = 2;
const BADGE_MEETING_CREATED: i32 = 3;
const BADGE_ATA_ADDED: i32 = 4;

/// Domain event enqueued after the primary write commits. Consumed by the
/// ledger worker; never part of the triggering request's failure path.
#[derive(Debug)]
pub(crate) enum GamificationEvent {
    ActivityCreated { user_id: String },
    ActivityFinished { user_id: String },
    MeetingCreated { user_id: String },
    AtaAdded { user_id: String },
}

impl GamificationEvent {
    fn user_id(&self) -> &str {
        match self {
            GamificationEvent::ActivityCreated { user_id }
            | GamificationEvent::ActivityFinished { user_id }
            | GamificationEvent::MeetingCreated { user_id }
            | GamificationEvent::AtaAdded { user_id } => user_id,
        }
    }

    fn seeds(&self) -> i32 {
        match self {
            GamificationEvent::ActivityCreated { .. } => SEEDS_ACTIVITY_CREATED,
            GamificationEvent::ActivityFinished { .. } => SEEDS_ACTIVITY_FINISHED,
            GamificationEvent::MeetingCreated { .. } => SEEDS_MEETING_CREATED,
            GamificationEvent::AtaAdded { .. } => SEEDS_ATA_ADDED,
        }
    }

    fn badge_id(&self) -> i32 {
        match self {
            GamificationEvent::ActivityCreated { .. } => BADGE_ACTIVITY_CREATED,
            GamificationEvent::ActivityFinished { .. } => BADGE_ACTIVITY_FINISHED,
            GamificationEvent::MeetingCreated { .. } => BADGE_MEETING_CREATED,
            GamificationEvent::AtaAdded { .. } => BADGE_ATA_ADDED,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            GamificationEvent::ActivityCreated { .. } => "activity_created",
            GamificationEvent::ActivityFinished { .. } => "activity_finished",
            GamificationEvent::MeetingCreated { .. } => "meeting_created",
            GamificationEvent::AtaAdded { .. } => "ata_added",
        }
    }
}

#[derive(Clone)]
pub(crate) struct GamificationHandle {
    tx: UnboundedSender<GamificationEvent>,
}

impl GamificationHandle {
    /// Fire-and-forget enqueue; a closed worker is logged, never surfaced.
    pub(crate) fn dispatch(&self, event: GamificationEvent) {
        if let Err(err) = self.tx.send(event) {
            tracing::warn!(error = %err, "Gamification worker is gone; dropping event");
        }
    }
}

pub(crate) fn channel() -> (GamificationHandle, UnboundedReceiver<GamificationEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (GamificationHandle { tx }, rx)
}

/// Worker loop draining the event queue. Exits when every handle is dropped.
pub(crate) fn spawn(pool: PgPool, mut rx: UnboundedReceiver<GamificationEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let kind = event.kind();
            match apply_event(&pool, &event).await {
                Ok(()) => {
                    metrics::counter!("gamification_events_total", "kind" => kind, "status" => "ok")
                        .increment(1);
                }
                Err(err) => {
                    metrics::counter!("gamification_events_total", "kind" => kind, "status" => "failed")
                        .increment(1);
                    tracing::error!(error = %err, kind, "Failed to apply gamification event");
                }
            }
        }
        tracing::info!("Gamification worker stopped");
    })
}

pub(crate) async fn apply_event(pool: &PgPool, event: &GamificationEvent) -> anyhow::Result<()> {
    let now = primitive_now_utc();
    let user_id = event.user_id();

    match repositories::badges::award(pool, user_id, event.badge_id(), now).await? {
        AwardOutcome::Awarded => {
            tracing::info!(user_id, badge_id = event.badge_id(), "Badge unlocked");
        }
        AwardOutcome::AlreadyHeld => {}
        AwardOutcome::UnknownBadge => {
            tracing::warn!(badge_id = event.badge_id(), "Badge missing from catalog");
        }
    }

    repositories::seeds::append(pool, &Uuid::new_v4().to_string(), user_id, event.seeds(), now)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_event, GamificationEvent};
    use crate::core::time::primitive_now_utc;
    use crate::db::types::UserRole;
    use crate::repositories;
    use crate::test_support;

    #[tokio::test]
    async fn awarding_twice_leaves_one_badge_and_two_ledger_rows() {
        let ctx = test_support::setup_test_context().await;
        let school = test_support::insert_school(ctx.state.db(), "Escola Pinhal").await;
        let user = test_support::insert_user(
            ctx.state.db(),
            "pinhal@escola.pt",
            "Student",
            UserRole::Student,
            &school.id,
        )
        .await;

        let event = GamificationEvent::ActivityCreated { user_id: user.id.clone() };
        apply_event(ctx.state.db(), &event).await.expect("first event");
        apply_event(ctx.state.db(), &event).await.expect("second event");

        let badges = repositories::badges::list_for_user(ctx.state.db(), &user.id)
            .await
            .expect("badges");
        assert_eq!(badges.len(), 1);

        let totals =
            repositories::seeds::totals(ctx.state.db(), &user.id, primitive_now_utc())
                .await
                .expect("totals");
        assert_eq!(totals.total_seeds, 80);
        assert_eq!(totals.month_seeds, 80);
    }

    #[tokio::test]
    async fn unknown_badge_is_non_fatal() {
        let ctx = test_support::setup_test_context().await;
        let school = test_support::insert_school(ctx.state.db(), "Escola Serra").await;
        let user = test_support::insert_user(
            ctx.state.db(),
            "serra@escola.pt",
            "Student",
            UserRole::Student,
            &school.id,
        )
        .await;

        let outcome =
            repositories::badges::award(ctx.state.db(), &user.id, 999, primitive_now_utc())
                .await
                .expect("award");
        assert_eq!(outcome, repositories::badges::AwardOutcome::UnknownBadge);
    }
}
