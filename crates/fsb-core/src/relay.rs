//! Inbound command handling, independent of the chat platform.

use std::sync::Arc;

use crate::{
    catalog::Catalog,
    config::Config,
    deletion::DeletionTimer,
    delivery::{DeliveryFlow, DeliveryOutcome, DeliveryReport},
    domain::{ChatId, DeliveryRequest},
    formatting::escape_html,
    messaging::{port::MessagingPort, types::Command},
    scheduler::OnceScheduler,
    Result,
};

/// What a `/start` command ended up doing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// No key given; the user was pointed at the public channel.
    Welcome,
    /// No key given and no public channel configured.
    NotConfigured,
    UnknownKey,
    /// Known key without any sendable file yet.
    Unavailable,
    Delivered(DeliveryReport),
}

pub struct Relay {
    cfg: Arc<Config>,
    catalog: Arc<Catalog>,
    messenger: Arc<dyn MessagingPort>,
    flow: DeliveryFlow,
}

impl Relay {
    pub fn new(
        cfg: Arc<Config>,
        catalog: Arc<Catalog>,
        messenger: Arc<dyn MessagingPort>,
        scheduler: Arc<dyn OnceScheduler>,
    ) -> Self {
        let deletions = DeletionTimer::new(scheduler, messenger.clone(), cfg.delete_after);
        let flow = DeliveryFlow::new(messenger.clone(), deletions);
        Self {
            cfg,
            catalog,
            messenger,
            flow,
        }
    }

    /// Deletions registered but not yet fired. They are lost on exit.
    pub fn pending_deletions(&self) -> usize {
        self.flow.deletions().outstanding()
    }

    pub async fn handle_command(&self, cmd: &Command) -> Result<()> {
        match cmd.name.as_str() {
            "start" => {
                self.handle_start(cmd).await?;
            }
            "chatid" => self.handle_chatid(cmd).await?,
            other => {
                tracing::debug!(command = other, chat_id = cmd.chat_id.0, "ignoring command");
            }
        }
        Ok(())
    }

    pub async fn handle_start(&self, cmd: &Command) -> Result<StartOutcome> {
        let chat_id = cmd.chat_id;
        let user_id = cmd.user_id.map(|u| u.0);
        tracing::info!(
            ?user_id,
            username = cmd.username.as_deref().unwrap_or("unknown"),
            chat_id = chat_id.0,
            args = %cmd.args,
            "received /start"
        );

        let Some(arg) = cmd.first_arg() else {
            return self.welcome(chat_id).await;
        };

        let key = arg.to_lowercase();
        let Some(entry) = self.catalog.resolve(&key) else {
            tracing::warn!(?user_id, key = %key, "unknown request key");
            self.reply(
                chat_id,
                "😕 Sorry, I don't recognize that request key. \
                 Please ensure you clicked a valid button from the channel.",
            )
            .await?;
            return Ok(StartOutcome::UnknownKey);
        };

        let req = DeliveryRequest {
            destination: chat_id,
            content_key: key,
            requesting_user: cmd.user_id,
        };
        match self.flow.deliver(entry, &req).await {
            DeliveryOutcome::Completed(report) => Ok(StartOutcome::Delivered(report)),
            DeliveryOutcome::NothingAvailable => {
                tracing::warn!(?user_id, key = %req.content_key, "no valid file ids for key");
                let msg = format!(
                    "🚧 The files for <b>{}</b> seem to be missing or not configured correctly yet. \
                     Please check back later or contact an admin.",
                    escape_html(&entry.display_name)
                );
                self.reply(chat_id, &msg).await?;
                Ok(StartOutcome::Unavailable)
            }
        }
    }

    async fn welcome(&self, chat_id: ChatId) -> Result<StartOutcome> {
        let Some(channel) = &self.cfg.public_channel else {
            tracing::error!("PUBLIC_CHANNEL_ID is not configured; cannot point user to the channel");
            self.reply(chat_id, "Bot configuration error. Please contact admin.")
                .await?;
            return Ok(StartOutcome::NotConfigured);
        };

        let msg = format!(
            "Hello! 👋 Please use the buttons in our public channel ({}) to request files.",
            escape_html(&channel.to_string())
        );
        self.reply(chat_id, &msg).await?;
        Ok(StartOutcome::Welcome)
    }

    pub async fn handle_chatid(&self, cmd: &Command) -> Result<()> {
        tracing::info!(
            user_id = ?cmd.user_id.map(|u| u.0),
            chat_id = cmd.chat_id.0,
            chat_kind = cmd.chat_kind.as_str(),
            "/chatid requested"
        );
        let msg = format!(
            "Chat ID: <code>{}</code>\nChat Type: {}",
            cmd.chat_id.0,
            cmd.chat_kind.as_str()
        );
        self.reply(cmd.chat_id, &msg).await
    }

    async fn reply(&self, chat_id: ChatId, html: &str) -> Result<()> {
        self.messenger.send_html(chat_id, html).await?;
        Ok(())
    }
}
