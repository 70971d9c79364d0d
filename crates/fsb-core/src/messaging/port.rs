use async_trait::async_trait;

use crate::{
    domain::{ChatId, Destination, MessageRef},
    messaging::types::{BotIdentity, LinkKeyboard, MessagingCapabilities},
    Result,
};

/// Outbound side of the chat platform.
///
/// Implementations make exactly one attempt per call and report failures as
/// `Error::Platform` with a classified `PlatformErrorKind`.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef>;

    /// Re-send a previously uploaded file by its platform handle.
    async fn send_document(
        &self,
        chat_id: ChatId,
        file_ref: &str,
        caption: &str,
    ) -> Result<MessageRef>;

    async fn delete_message(&self, msg: MessageRef) -> Result<()>;

    async fn send_link_keyboard(
        &self,
        destination: &Destination,
        html: &str,
        keyboard: LinkKeyboard,
    ) -> Result<MessageRef>;

    async fn identity(&self) -> Result<BotIdentity>;
}
