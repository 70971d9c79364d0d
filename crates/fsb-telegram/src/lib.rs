//! Telegram adapter (teloxide).
//!
//! This crate implements the `fsb-core` MessagingPort over the Telegram Bot
//! API and runs the update dispatcher.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile, ParseMode, Recipient},
    ApiError, RequestError,
};

pub mod handlers;
pub mod router;

use fsb_core::{
    domain::{ChatId, Destination, MessageId, MessageRef, UserId},
    errors::{Error, PlatformErrorKind},
    messaging::{
        port::MessagingPort,
        types::{BotIdentity, LinkKeyboard, MessagingCapabilities},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn tg_recipient(destination: &Destination) -> Recipient {
        match destination {
            Destination::Chat(id) => Recipient::Id(Self::tg_chat(*id)),
            Destination::Channel(name) => Recipient::ChannelUsername(name.clone()),
        }
    }

    fn map_err(e: RequestError) -> Error {
        Error::platform(classify(&e), format!("telegram error: {e}"))
    }
}

/// Decide the failure category once, where the Telegram error is received.
pub fn classify(e: &RequestError) -> PlatformErrorKind {
    match e {
        RequestError::Api(api) => classify_api(api),
        RequestError::Network(_) | RequestError::RetryAfter(_) => PlatformErrorKind::Network,
        _ => PlatformErrorKind::Unknown,
    }
}

fn classify_api(e: &ApiError) -> PlatformErrorKind {
    match e {
        ApiError::BotBlocked
        | ApiError::BotKicked
        | ApiError::BotKickedFromSupergroup
        | ApiError::UserDeactivated
        | ApiError::CantInitiateConversation
        | ApiError::CantTalkWithBots
        | ApiError::NotEnoughRightsToPostMessages
        | ApiError::MessageCantBeDeleted => PlatformErrorKind::Forbidden,

        ApiError::MessageToDeleteNotFound | ApiError::MessageIdInvalid => {
            PlatformErrorKind::MessageGone
        }

        ApiError::WrongFileId | ApiError::WrongFileIdOrUrl | ApiError::FailedToGetUrlContent => {
            PlatformErrorKind::InvalidReference
        }

        ApiError::Unknown(text) => classify_unknown(text),
        _ => PlatformErrorKind::BadRequest,
    }
}

/// Descriptions teloxide has no dedicated variant for.
fn classify_unknown(description: &str) -> PlatformErrorKind {
    let d = description.to_lowercase();
    if d.starts_with("forbidden") {
        PlatformErrorKind::Forbidden
    } else if d.contains("file_id_invalid") || d.contains("wrong file") {
        PlatformErrorKind::InvalidReference
    } else if d.contains("message_id_invalid") || d.contains("message to delete not found") {
        PlatformErrorKind::MessageGone
    } else {
        PlatformErrorKind::BadRequest
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_caption_len: 1024,
        }
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        let msg = self
            .bot
            .send_message(Self::tg_chat(chat_id), html.to_string())
            .parse_mode(ParseMode::Html)
            .await
            .map_err(Self::map_err)?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn send_document(
        &self,
        chat_id: ChatId,
        file_ref: &str,
        caption: &str,
    ) -> Result<MessageRef> {
        let caption: String = caption
            .chars()
            .take(self.capabilities().max_caption_len)
            .collect();
        let msg = self
            .bot
            .send_document(
                Self::tg_chat(chat_id),
                InputFile::file_id(file_ref.to_string()),
            )
            .caption(caption)
            .await
            .map_err(Self::map_err)?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.bot
            .delete_message(Self::tg_chat(msg.chat_id), Self::tg_msg_id(msg.message_id))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn send_link_keyboard(
        &self,
        destination: &Destination,
        html: &str,
        keyboard: LinkKeyboard,
    ) -> Result<MessageRef> {
        let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::with_capacity(keyboard.buttons.len());
        for b in keyboard.buttons {
            let url = url::Url::parse(&b.url)
                .map_err(|e| Error::External(format!("invalid button url {}: {e}", b.url)))?;
            rows.push(vec![InlineKeyboardButton::url(b.label, url)]);
        }
        let markup = InlineKeyboardMarkup::new(rows);

        let msg = self
            .bot
            .send_message(Self::tg_recipient(destination), html.to_string())
            .parse_mode(ParseMode::Html)
            .disable_web_page_preview(true)
            .reply_markup(markup)
            .await
            .map_err(Self::map_err)?;

        Ok(MessageRef {
            chat_id: ChatId(msg.chat.id.0),
            message_id: MessageId(msg.id.0),
        })
    }

    async fn identity(&self) -> Result<BotIdentity> {
        let me = self.bot.get_me().await.map_err(Self::map_err)?;
        Ok(BotIdentity {
            id: UserId(me.id.0 as i64),
            username: me.username().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_kinds() {
        let kind = |e: ApiError| classify(&RequestError::Api(e));

        assert_eq!(kind(ApiError::BotBlocked), PlatformErrorKind::Forbidden);
        assert_eq!(kind(ApiError::BotKicked), PlatformErrorKind::Forbidden);
        assert_eq!(
            kind(ApiError::MessageToDeleteNotFound),
            PlatformErrorKind::MessageGone
        );
        assert_eq!(kind(ApiError::MessageIdInvalid), PlatformErrorKind::MessageGone);
        assert_eq!(kind(ApiError::WrongFileId), PlatformErrorKind::InvalidReference);
        assert_eq!(kind(ApiError::ChatNotFound), PlatformErrorKind::BadRequest);
    }

    #[test]
    fn unknown_descriptions_are_classified_once() {
        assert_eq!(
            classify_unknown("Bad Request: FILE_ID_INVALID"),
            PlatformErrorKind::InvalidReference
        );
        assert_eq!(
            classify_unknown("Bad Request: MESSAGE_ID_INVALID"),
            PlatformErrorKind::MessageGone
        );
        assert_eq!(
            classify_unknown("Forbidden: bot is not a member of the channel chat"),
            PlatformErrorKind::Forbidden
        );
        assert_eq!(
            classify_unknown("Bad Request: something new"),
            PlatformErrorKind::BadRequest
        );
    }

    #[test]
    fn recipients_follow_destination_kind() {
        assert_eq!(
            TelegramMessenger::tg_recipient(&Destination::Chat(ChatId(-100))),
            Recipient::Id(teloxide::types::ChatId(-100))
        );
        assert_eq!(
            TelegramMessenger::tg_recipient(&Destination::Channel("@files".to_string())),
            Recipient::ChannelUsername("@files".to_string())
        );
    }
}
