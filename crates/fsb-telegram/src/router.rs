use std::{collections::HashMap, sync::Arc};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tokio::sync::{Mutex, OwnedMutexGuard};

use fsb_core::messaging::throttled::{ThrottleConfig, ThrottledMessenger};
use fsb_core::{
    catalog::Catalog,
    config::Config,
    errors::PlatformErrorKind,
    messaging::port::MessagingPort,
    publisher::{resolve_bot_username, ButtonPublisher},
    relay::Relay,
    scheduler::{OnceScheduler, TokioScheduler},
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub chat_locks: Arc<ChatLocks>,
}

#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub async fn lock_chat(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            // Held guards and waiters keep a clone; anything else is idle.
            map.retain(|id, l| *id == chat_id || Arc::strong_count(l) > 1);
            map.entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn tracked_chats(&self) -> usize {
        self.inner.lock().await.len()
    }
}

pub async fn run_polling(cfg: Arc<Config>, catalog: Arc<Catalog>) -> anyhow::Result<()> {
    tracing::info!("starting Telegram bot");
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Every outbound call goes through the throttle; the adapter itself never retries.
    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let messenger: Arc<dyn MessagingPort> = Arc::new(ThrottledMessenger::new(
        raw_messenger,
        ThrottleConfig::from_config(&cfg),
    ));

    let bot_username = resolve_bot_username(cfg.bot_username.as_deref(), messenger.as_ref()).await;
    log_config_summary(&cfg, &catalog, bot_username.as_deref());
    catalog.log_summary();

    let scheduler: Arc<dyn OnceScheduler> = Arc::new(TokioScheduler::new());
    let relay = Arc::new(Relay::new(
        cfg.clone(),
        catalog.clone(),
        messenger.clone(),
        scheduler,
    ));

    if cfg.auto_setup_buttons {
        spawn_button_setup(cfg, catalog, messenger, bot_username);
    } else {
        tracing::info!("automatic button setup on startup is disabled");
    }

    let state = Arc::new(AppState {
        relay: relay.clone(),
        chat_locks: Arc::new(ChatLocks::default()),
    });

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(handlers::handle_message))
        .branch(Update::filter_channel_post().endpoint(handlers::handle_channel_post));

    tracing::info!("starting Telegram polling");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|_upd| async {})
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    let dropped = relay.pending_deletions();
    if dropped > 0 {
        tracing::warn!(
            dropped,
            "stopping with pending deletions; those messages will not be auto-deleted"
        );
    }
    tracing::info!("Telegram polling stopped");

    Ok(())
}

fn log_config_summary(cfg: &Config, catalog: &Catalog, bot_username: Option<&str>) {
    let channel = cfg
        .public_channel
        .as_ref()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "NOT SET".to_string());
    tracing::info!(
        bot_username = bot_username.unwrap_or("NOT SET"),
        public_channel = %channel,
        private_channel = cfg.private_channel_id.as_deref().unwrap_or("NOT SET"),
        catalog = %cfg.catalog_path.display(),
        keys = catalog.len(),
        delete_after_secs = cfg.delete_after.as_secs(),
        auto_setup_buttons = cfg.auto_setup_buttons,
        "configuration summary"
    );
}

fn spawn_button_setup(
    cfg: Arc<Config>,
    catalog: Arc<Catalog>,
    messenger: Arc<dyn MessagingPort>,
    bot_username: Option<String>,
) {
    let (Some(channel), Some(bot_username)) = (cfg.public_channel.clone(), bot_username) else {
        tracing::error!("cannot auto-setup buttons: PUBLIC_CHANNEL_ID or bot username is missing");
        return;
    };

    tokio::spawn(async move {
        tokio::time::sleep(cfg.button_setup_delay).await;
        tracing::info!(%channel, "setting up buttons in public channel");

        let publisher = ButtonPublisher::new(messenger);
        let res = publisher
            .publish(&catalog, &channel, &bot_username, cfg.delete_after)
            .await;
        if let Err(e) = res {
            match e.platform_kind() {
                Some(PlatformErrorKind::Forbidden) => tracing::error!(
                    %channel,
                    error = %e,
                    "failed to post buttons; check the bot's admin rights"
                ),
                Some(PlatformErrorKind::BadRequest) => tracing::error!(
                    %channel,
                    error = %e,
                    "failed to post buttons; check PUBLIC_CHANNEL_ID"
                ),
                _ => tracing::error!(%channel, error = %e, "failed to post buttons"),
            }
        }
    });
}
