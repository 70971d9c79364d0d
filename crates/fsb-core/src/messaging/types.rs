use crate::domain::{ChatId, UserId};

/// Platform-agnostic inbound command, e.g. `/start season1`.
#[derive(Clone, Debug)]
pub struct Command {
    pub chat_id: ChatId,
    pub chat_kind: ChatKind,
    /// Absent for channel posts.
    pub user_id: Option<UserId>,
    pub username: Option<String>,
    pub name: String,
    pub args: String,
}

impl Command {
    /// First whitespace-separated argument, if any.
    pub fn first_arg(&self) -> Option<&str> {
        self.args.split_whitespace().next()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Group => "group",
            Self::Supergroup => "supergroup",
            Self::Channel => "channel",
        }
    }
}

/// Keyboard of URL buttons, one button per row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkKeyboard {
    pub buttons: Vec<LinkButton>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

/// The bot's own account as reported by the platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: UserId,
    pub username: String,
}

/// Limits of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub max_caption_len: usize,
}
