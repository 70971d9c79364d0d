//! Request fulfillment: send every available file of a catalog entry and
//! schedule each sent message for deletion.

use std::sync::Arc;

use crate::{
    catalog::CatalogEntry,
    deletion::{DeletionTimer, PendingDeletion},
    domain::{ChatId, DeliveryRequest},
    errors::PlatformErrorKind,
    formatting::{escape_html, format_delay, short_ref},
    messaging::port::MessagingPort,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    /// One per successfully sent file.
    pub pending: Vec<PendingDeletion>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The entry has no sendable references; nothing was sent.
    NothingAvailable,
    Completed(DeliveryReport),
}

pub struct DeliveryFlow {
    messenger: Arc<dyn MessagingPort>,
    deletions: DeletionTimer,
}

impl DeliveryFlow {
    pub fn new(messenger: Arc<dyn MessagingPort>, deletions: DeletionTimer) -> Self {
        Self {
            messenger,
            deletions,
        }
    }

    pub fn deletions(&self) -> &DeletionTimer {
        &self.deletions
    }

    pub async fn deliver(&self, entry: &CatalogEntry, req: &DeliveryRequest) -> DeliveryOutcome {
        let refs = entry.available_refs();
        if refs.is_empty() {
            return DeliveryOutcome::NothingAvailable;
        }

        let chat_id = req.destination;
        let user_id = req.requesting_user.map(|u| u.0);
        let total = refs.len();

        let notice = format!(
            "✅ Got it! Sending you {total} file(s) for <b>{}</b>.\n\n🕒 <i>These files will be automatically deleted in {}.</i>",
            escape_html(&entry.display_name),
            format_delay(self.deletions.delay())
        );
        if let Err(e) = self.messenger.send_html(chat_id, &notice).await {
            tracing::warn!(chat_id = chat_id.0, error = %e, "failed to send delivery notice");
        }
        tracing::info!(key = %entry.key, total, ?user_id, chat_id = chat_id.0, "processing request");

        let mut report = DeliveryReport {
            total,
            ..Default::default()
        };

        for (idx, file_ref) in refs.iter().enumerate() {
            let part = idx + 1;
            let caption = format!("{} - Part {part}", entry.display_name);

            match self
                .messenger
                .send_document(chat_id, file_ref, &caption)
                .await
            {
                Ok(msg) => {
                    report.sent += 1;
                    tracing::info!(
                        key = %entry.key,
                        part,
                        total,
                        file = %short_ref(file_ref),
                        ?user_id,
                        "sent file"
                    );
                    report.pending.push(self.deletions.register(msg));
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        key = %entry.key,
                        part,
                        file = %short_ref(file_ref),
                        ?user_id,
                        error = %e,
                        "failed to send file"
                    );
                    // Only the first failure of a run reaches the user.
                    if report.failed == 1 {
                        self.warn_user(chat_id, e.platform_kind(), part).await;
                    }
                }
            }
        }

        if report.failed > 0 {
            tracing::warn!(
                key = %entry.key,
                sent = report.sent,
                failed = report.failed,
                ?user_id,
                "finished sending with failures"
            );
        } else {
            tracing::info!(key = %entry.key, sent = report.sent, ?user_id, "sent all files");
        }

        DeliveryOutcome::Completed(report)
    }

    async fn warn_user(&self, chat_id: ChatId, kind: Option<PlatformErrorKind>, part: usize) {
        let text = failure_warning(kind, part);
        if let Err(e) = self.messenger.send_html(chat_id, &text).await {
            tracing::warn!(chat_id = chat_id.0, error = %e, "failed to send failure warning");
        }
    }
}

fn failure_warning(kind: Option<PlatformErrorKind>, part: usize) -> String {
    match kind {
        Some(PlatformErrorKind::Forbidden) => {
            "⚠️ I couldn't send one or more files. I might be blocked or lack permissions."
                .to_string()
        }
        Some(PlatformErrorKind::InvalidReference) => format!(
            "⚠️ Couldn't send file {part}. The file ID seems invalid or the file was removed."
        ),
        Some(PlatformErrorKind::BadRequest) => {
            format!("⚠️ Couldn't send file {part} due to a request error.")
        }
        _ => format!("⚠️ An error occurred while sending file {part}. Please try again later."),
    }
}
