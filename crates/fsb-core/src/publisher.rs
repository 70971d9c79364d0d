//! Deep-link buttons for the public channel.

use std::{sync::Arc, time::Duration};

use crate::{
    catalog::Catalog,
    domain::{Destination, MessageRef},
    formatting::{escape_html, format_delay},
    messaging::{
        port::MessagingPort,
        types::{LinkButton, LinkKeyboard},
    },
    Result,
};

/// `https://t.me/<bot>?start=<key>`.
pub fn deep_link(bot_username: &str, key: &str) -> String {
    format!(
        "https://t.me/{}?start={key}",
        bot_username.trim_start_matches('@')
    )
}

/// One button per available entry, sorted by key.
pub fn build_keyboard(catalog: &Catalog, bot_username: &str) -> LinkKeyboard {
    let buttons = catalog
        .available()
        .map(|entry| LinkButton {
            label: format!("🎬 {}", entry.display_name),
            url: deep_link(bot_username, &entry.key),
        })
        .collect();
    LinkKeyboard { buttons }
}

pub fn announcement_html(bot_username: &str, delete_after: Duration) -> String {
    let bot = escape_html(bot_username.trim_start_matches('@'));
    format!(
        "✨ <b>Welcome!</b> ✨\n\n\
         Select the content you'd like to receive below.\n\
         Clicking a button will start a chat with me (@{bot}), and I'll send you the files directly.\n\n\
         <i>(Files are automatically removed after {}.)</i>",
        format_delay(delete_after)
    )
}

/// Username for deep links: the configured one if set, else the platform's.
///
/// A configured name that differs from the real account only produces a
/// warning; the links would point at the wrong bot.
pub async fn resolve_bot_username(
    configured: Option<&str>,
    messenger: &dyn MessagingPort,
) -> Option<String> {
    match messenger.identity().await {
        Ok(me) => {
            tracing::info!(username = %me.username, id = me.id.0, "bot initialized");
            match configured {
                Some(name) => {
                    if !name.eq_ignore_ascii_case(&me.username) {
                        tracing::warn!(
                            configured = name,
                            actual = %me.username,
                            "BOT_USERNAME does not match the actual bot username"
                        );
                    }
                    Some(name.to_string())
                }
                None => Some(me.username),
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to fetch bot identity");
            configured.map(str::to_string)
        }
    }
}

/// Posts the button announcement.
///
/// Every call sends a new message; earlier announcements are left in place.
pub struct ButtonPublisher {
    messenger: Arc<dyn MessagingPort>,
}

impl ButtonPublisher {
    pub fn new(messenger: Arc<dyn MessagingPort>) -> Self {
        Self { messenger }
    }

    /// Returns `None` when no entry has a sendable file.
    pub async fn publish(
        &self,
        catalog: &Catalog,
        channel: &Destination,
        bot_username: &str,
        delete_after: Duration,
    ) -> Result<Option<MessageRef>> {
        let keyboard = build_keyboard(catalog, bot_username);
        if keyboard.buttons.is_empty() {
            tracing::warn!("no catalog entries with available files; not posting buttons");
            return Ok(None);
        }

        let count = keyboard.buttons.len();
        let html = announcement_html(bot_username, delete_after);
        let msg = self
            .messenger
            .send_link_keyboard(channel, &html, keyboard)
            .await?;

        tracing::info!(%channel, buttons = count, "posted button message");
        Ok(Some(msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use crate::testing::FakeMessenger;

    fn catalog() -> Catalog {
        Catalog::from_entries([
            CatalogEntry::new("b", vec!["valid-b".to_string()]),
            CatalogEntry::new("a", vec!["valid-a".to_string()]),
            CatalogEntry::new("c", vec!["FILE_ID_C1".to_string()]),
        ])
        .unwrap()
    }

    #[test]
    fn buttons_skip_placeholder_entries_and_sort_by_key() {
        let kb = build_keyboard(&catalog(), "@FileShareBot");
        assert_eq!(
            kb.buttons,
            vec![
                LinkButton {
                    label: "🎬 A".to_string(),
                    url: "https://t.me/FileShareBot?start=a".to_string(),
                },
                LinkButton {
                    label: "🎬 B".to_string(),
                    url: "https://t.me/FileShareBot?start=b".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn publish_sends_a_new_message_each_time() {
        let api = Arc::new(FakeMessenger::new());
        let publisher = ButtonPublisher::new(api.clone());
        let channel = Destination::Channel("@files_public".to_string());

        let first = publisher
            .publish(&catalog(), &channel, "FileShareBot", Duration::from_secs(1200))
            .await
            .unwrap();
        let second = publisher
            .publish(&catalog(), &channel, "FileShareBot", Duration::from_secs(1200))
            .await
            .unwrap();

        assert!(first.is_some());
        assert_ne!(first, second);

        let sent = api.keyboards();
        assert_eq!(sent.len(), 2);
        let (dest, text, kb) = &sent[0];
        assert_eq!(dest, &channel);
        assert!(text.contains("@FileShareBot"));
        assert!(text.contains("20 minutes"));
        assert_eq!(kb.buttons.len(), 2);
    }

    #[tokio::test]
    async fn bot_username_prefers_config_then_platform() {
        let api = FakeMessenger::new();
        assert_eq!(
            resolve_bot_username(Some("OtherBot"), &api).await,
            Some("OtherBot".to_string())
        );
        assert_eq!(
            resolve_bot_username(None, &api).await,
            Some("FileShareBot".to_string())
        );
    }

    #[tokio::test]
    async fn publish_without_available_entries_is_a_no_op() {
        let api = Arc::new(FakeMessenger::new());
        let publisher = ButtonPublisher::new(api.clone());
        let only_placeholders =
            Catalog::from_entries([CatalogEntry::new("c", vec!["FILE_ID_C1".to_string()])])
                .unwrap();

        let out = publisher
            .publish(
                &only_placeholders,
                &Destination::Channel("@files_public".to_string()),
                "FileShareBot",
                Duration::from_secs(1200),
            )
            .await
            .unwrap();
        assert!(out.is_none());
        assert!(api.calls().is_empty());
    }
}
