//! Telegram update handlers.
//!
//! Each handler turns a teloxide `Message` into a platform-agnostic
//! `Command` and hands it to the core `Relay`.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use crate::router::AppState;
mod commands;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(cmd) = commands::to_command(&msg) else {
        return Ok(());
    };
    commands::handle_command(cmd, state).await
}

pub async fn handle_channel_post(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(cmd) = commands::to_command(&msg) else {
        return Ok(());
    };
    if !commands::answers_in_channel(&cmd.name) {
        return Ok(());
    }
    commands::handle_command(cmd, state).await
}
