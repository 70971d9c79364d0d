/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Where an announcement goes: a numeric chat or a public `@channel`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Destination {
    Chat(ChatId),
    Channel(String),
}

impl Destination {
    /// Parse `-100123...` as a chat id, anything else as a channel username.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(id) = raw.parse::<i64>() {
            return Some(Self::Chat(ChatId(id)));
        }
        let name = raw.trim_start_matches('@');
        if name.is_empty() {
            return None;
        }
        Some(Self::Channel(format!("@{name}")))
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chat(id) => write!(f, "{}", id.0),
            Self::Channel(name) => f.write_str(name),
        }
    }
}

/// Transient inbound request for a catalog key. Never persisted.
#[derive(Clone, Debug)]
pub struct DeliveryRequest {
    pub destination: ChatId,
    pub content_key: String,
    pub requesting_user: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_parses_ids_and_usernames() {
        assert_eq!(
            Destination::parse("-1001234567890"),
            Some(Destination::Chat(ChatId(-1001234567890)))
        );
        assert_eq!(
            Destination::parse("@my_channel"),
            Some(Destination::Channel("@my_channel".to_string()))
        );
        assert_eq!(
            Destination::parse("my_channel"),
            Some(Destination::Channel("@my_channel".to_string()))
        );
        assert_eq!(Destination::parse("  "), None);
        assert_eq!(Destination::parse("@"), None);
    }
}
