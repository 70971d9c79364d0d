use std::sync::Arc;

use teloxide::{prelude::*, types::Chat};

use fsb_core::{
    domain::{ChatId, UserId},
    messaging::types::{ChatKind, Command},
};

use crate::router::AppState;

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

fn chat_kind(chat: &Chat) -> ChatKind {
    if chat.is_channel() {
        ChatKind::Channel
    } else if chat.is_supergroup() {
        ChatKind::Supergroup
    } else if chat.is_group() {
        ChatKind::Group
    } else {
        ChatKind::Private
    }
}

/// `(name, args)` when `text` is a command, `None` for plain text.
fn command_parts(text: &str) -> Option<(String, String)> {
    if !text.starts_with('/') {
        return None;
    }
    let (name, args) = parse_command(text);
    if name.is_empty() {
        return None;
    }
    Some((name, args))
}

/// Channel posts only get `/chatid`; files are never delivered into a channel.
pub(super) fn answers_in_channel(name: &str) -> bool {
    name == "chatid"
}

pub(super) fn to_command(msg: &Message) -> Option<Command> {
    let (name, args) = command_parts(msg.text()?)?;

    let user = msg.from();
    Some(Command {
        chat_id: ChatId(msg.chat.id.0),
        chat_kind: chat_kind(&msg.chat),
        user_id: user.map(|u| UserId(u.id.0 as i64)),
        username: user.and_then(|u| u.username.clone()),
        name,
        args,
    })
}

pub(super) async fn handle_command(cmd: Command, state: Arc<AppState>) -> ResponseResult<()> {
    // One delivery at a time per chat.
    let _guard = if cmd.name == "start" {
        Some(state.chat_locks.lock_chat(cmd.chat_id.0).await)
    } else {
        None
    };

    if let Err(e) = state.relay.handle_command(&cmd).await {
        tracing::error!(
            command = %cmd.name,
            chat_id = cmd.chat_id.0,
            error = %e,
            "command failed"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_addressed_commands() {
        assert_eq!(
            parse_command("/start season1"),
            ("start".to_string(), "season1".to_string())
        );
        assert_eq!(
            parse_command("/Start@FileShareBot  Season1 "),
            ("start".to_string(), "Season1".to_string())
        );
        assert_eq!(parse_command("/chatid"), ("chatid".to_string(), String::new()));
        assert_eq!(parse_command("/"), (String::new(), String::new()));
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(command_parts("hello there"), None);
        assert_eq!(command_parts(" /start"), None);
        assert_eq!(command_parts("/"), None);
        assert_eq!(
            command_parts("/chatid@FileShareBot"),
            Some(("chatid".to_string(), String::new()))
        );
    }

    #[test]
    fn channels_only_answer_chatid() {
        assert!(answers_in_channel("chatid"));
        for name in ["start", "help", ""] {
            assert!(!answers_in_channel(name), "{name}");
        }
    }
}
