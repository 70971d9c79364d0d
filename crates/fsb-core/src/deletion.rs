//! Deferred per-message deletion.
//!
//! Lifecycle of one pending deletion:
//! `Scheduled -> Fired -> Deleted | AlreadyGone | Suppressed | Failed`.
//! Each timer fires once and its outcome is final.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};

use crate::{
    domain::MessageRef, errors::PlatformErrorKind, messaging::port::MessagingPort,
    scheduler::OnceScheduler,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingDeletion {
    pub target: MessageRef,
    pub fire_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeletionOutcome {
    Deleted,
    /// The message was removed out-of-band; treated like success.
    AlreadyGone,
    /// The bot may not delete here (blocked, kicked, no rights).
    Suppressed,
    Failed,
}

/// Issue the single delete attempt for a fired timer and log its outcome.
pub async fn fire(messenger: &dyn MessagingPort, pending: PendingDeletion) -> DeletionOutcome {
    let chat_id = pending.target.chat_id.0;
    let message_id = pending.target.message_id.0;

    match messenger.delete_message(pending.target).await {
        Ok(()) => {
            tracing::info!(chat_id, message_id, "auto-deleted message");
            DeletionOutcome::Deleted
        }
        Err(e) => match e.platform_kind() {
            Some(PlatformErrorKind::MessageGone) => {
                tracing::info!(chat_id, message_id, "message already deleted");
                DeletionOutcome::AlreadyGone
            }
            Some(PlatformErrorKind::Forbidden) => {
                tracing::warn!(chat_id, message_id, error = %e, "not allowed to auto-delete message");
                DeletionOutcome::Suppressed
            }
            _ => {
                tracing::error!(chat_id, message_id, error = %e, "auto-deletion failed");
                DeletionOutcome::Failed
            }
        },
    }
}

/// Registers one-shot deletions with a fixed delay.
#[derive(Clone)]
pub struct DeletionTimer {
    scheduler: Arc<dyn OnceScheduler>,
    messenger: Arc<dyn MessagingPort>,
    delay: Duration,
}

impl DeletionTimer {
    pub fn new(
        scheduler: Arc<dyn OnceScheduler>,
        messenger: Arc<dyn MessagingPort>,
        delay: Duration,
    ) -> Self {
        Self {
            scheduler,
            messenger,
            delay,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Timers registered and not yet fired.
    pub fn outstanding(&self) -> usize {
        self.scheduler.outstanding()
    }

    pub fn register(&self, target: MessageRef) -> PendingDeletion {
        let now = Utc::now();
        let fire_at = chrono::Duration::from_std(self.delay)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(now);
        let pending = PendingDeletion { target, fire_at };

        let messenger = self.messenger.clone();
        self.scheduler.schedule_once(
            self.delay,
            Box::pin(async move {
                fire(messenger.as_ref(), pending).await;
            }),
        );

        tracing::debug!(
            chat_id = target.chat_id.0,
            message_id = target.message_id.0,
            %fire_at,
            "scheduled message for deletion"
        );
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatId, MessageId};
    use crate::testing::{FakeMessenger, ManualScheduler};

    fn target() -> MessageRef {
        MessageRef {
            chat_id: ChatId(7),
            message_id: MessageId(11),
        }
    }

    fn pending() -> PendingDeletion {
        PendingDeletion {
            target: target(),
            fire_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn fire_classifies_outcomes() {
        let api = FakeMessenger::new();
        assert_eq!(fire(&api, pending()).await, DeletionOutcome::Deleted);

        api.fail_deletes(PlatformErrorKind::MessageGone);
        assert_eq!(fire(&api, pending()).await, DeletionOutcome::AlreadyGone);

        api.fail_deletes(PlatformErrorKind::Forbidden);
        assert_eq!(fire(&api, pending()).await, DeletionOutcome::Suppressed);

        api.fail_deletes(PlatformErrorKind::Network);
        assert_eq!(fire(&api, pending()).await, DeletionOutcome::Failed);

        // One attempt per fire, never retried.
        assert_eq!(api.deletes().len(), 4);
    }

    #[tokio::test]
    async fn register_schedules_one_delete_per_message() {
        let api = Arc::new(FakeMessenger::new());
        let sched = Arc::new(ManualScheduler::new());
        let timer = DeletionTimer::new(sched.clone(), api.clone(), Duration::from_secs(1200));

        let before = Utc::now();
        let p = timer.register(target());
        assert_eq!(p.target, target());
        assert!(p.fire_at >= before + chrono::Duration::seconds(1200));
        assert_eq!(sched.delays(), vec![Duration::from_secs(1200)]);
        assert_eq!(timer.outstanding(), 1);
        assert!(api.deletes().is_empty());

        sched.fire_all().await;
        assert_eq!(api.deletes(), vec![target()]);
        assert_eq!(timer.outstanding(), 0);
    }

    #[tokio::test]
    async fn gone_message_does_not_raise() {
        let api = Arc::new(FakeMessenger::new());
        api.fail_deletes(PlatformErrorKind::MessageGone);
        let sched = Arc::new(ManualScheduler::new());
        let timer = DeletionTimer::new(sched.clone(), api.clone(), Duration::from_secs(1));

        timer.register(target());
        sched.fire_all().await;
        assert_eq!(api.deletes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_backed_timer_deletes_after_delay() {
        let api = Arc::new(FakeMessenger::new());
        let sched = Arc::new(crate::scheduler::TokioScheduler::new());
        let timer = DeletionTimer::new(sched, api.clone(), Duration::from_secs(1200));

        timer.register(target());
        tokio::time::sleep(Duration::from_secs(1199)).await;
        assert!(api.deletes().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(api.deletes(), vec![target()]);
    }
}
