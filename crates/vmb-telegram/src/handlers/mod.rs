//! Telegram update handlers.
//!
//! Each handler is a small adapter that parses the update, asks `vmb-core`
//! to compose the reply and hands the result to the messenger.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use crate::router::AppState;

mod commands;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    if !text.starts_with(state.cfg.command_prefix.as_str()) {
        return Ok(());
    }

    let (name, _) = commands::parse_command(text, &state.cfg.command_prefix);
    if let Err(err) = commands::handle_command(&msg, &state).await {
        let log_msg = format!("Ignoring exception in command {name}:");
        state
            .report_error(
                "traceback (on_command_error)",
                "tb_command_error.py",
                &log_msg,
                &err,
            )
            .await;
    }
    Ok(())
}
