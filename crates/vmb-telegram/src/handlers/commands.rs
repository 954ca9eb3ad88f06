use teloxide::types::Message;

use vmb_core::{
    compose::OutgoingMessage,
    domain::{ChatId, UserId},
    embed::Embed,
    errors::ComposeError,
    eval::cleanup_code,
    messaging::port::deliver,
    notice::{missing_argument, Notice},
    security::is_owner,
};

use crate::{catalog, router::AppState};

/// Split `/cmd@botname arg1 ...` into (`cmd`, `arg1 ...`).
pub(crate) fn parse_command(text: &str, prefix: &str) -> (String, String) {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .strip_prefix(prefix)
        .unwrap_or(first)
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

/// Build the embed described by `args`, or an error notice saying why not.
pub(crate) fn preview_embed(args: &str) -> Result<Embed, ComposeError> {
    let json = cleanup_code(args);
    let parsed = serde_json::from_str(&json)
        .map_err(|e| ComposeError::InvalidArgument(format!("malformed embed: {e}")))
        .and_then(Embed::from_value);
    match parsed {
        Ok(embed) if !embed.is_empty() => Ok(embed),
        Ok(_) => Notice::Error.embed("invalid embed", Some("embed has no visible text")),
        Err(e) => Notice::Error.embed("invalid embed", Some(e.to_string().as_str())),
    }
}

pub(crate) async fn handle_command(msg: &Message, state: &AppState) -> anyhow::Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat_id = ChatId(msg.chat.id.0);
    let user_id = msg.from().map(|u| UserId(u.id.0 as i64));
    let (cmd, args) = parse_command(text, &state.cfg.command_prefix);
    tracing::info!(chat_id = chat_id.0, command = %cmd, "command");

    if catalog::is_owner_only(&state.categories, &cmd) && !is_owner(user_id, state.cfg.owner_id) {
        return Ok(());
    }
    let missing = catalog::find(&state.categories, &cmd)
        .and_then(|c| c.required_params().first().map(|p| p.to_string()))
        .filter(|_| args.is_empty());

    let reply = match (cmd.as_str(), missing) {
        (_, Some(param)) => OutgoingMessage::embed(missing_argument(&param)?),
        ("help", _) => state.help.render(&state.categories, &args)?,
        ("start", _) => state.help.render(&state.categories, "")?,
        ("extensions", _) => {
            let names = catalog::extension_names(&state.categories)
                .iter()
                .map(|n| format!("`{n}`"))
                .collect::<Vec<_>>()
                .join("\n");
            OutgoingMessage::embed(Notice::Info.embed("extensions", Some(names.as_str()))?)
        }
        ("embed", _) => OutgoingMessage::embed(preview_embed(&args)?),
        (other, _) => {
            let message = state.help.command_not_found(other);
            OutgoingMessage::embed(Notice::Error.embed("unknown command", Some(message.as_str()))?)
        }
    };

    deliver(state.messenger.as_ref(), chat_id, &reply).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use vmb_core::embed::Colour;

    use super::*;

    #[test]
    fn parses_bot_suffix_and_args() {
        assert_eq!(
            parse_command("/Help@market_bot eval", "/"),
            ("help".to_string(), "eval".to_string())
        );
        assert_eq!(parse_command("/start", "/"), ("start".to_string(), String::new()));
        assert_eq!(
            parse_command("!help  market sell ", "!"),
            ("help".to_string(), "market sell".to_string())
        );
    }

    #[test]
    fn previews_fenced_embed_json() {
        let embed = preview_embed("```json\n{\"title\": \"hi\", \"color\": 3447003}\n```").unwrap();
        assert_eq!(embed.title(), Some("hi"));
        assert_eq!(embed.colour(), Some(Colour::blue()));
    }

    #[test]
    fn invalid_embed_json_becomes_error_notice() {
        let too_long = format!("{{\"title\": \"{}\"}}", "x".repeat(300));
        for args in ["not json", "{}", too_long.as_str()] {
            let embed = preview_embed(args).unwrap();
            assert_eq!(embed.colour(), Some(Notice::Error.colour()));
            assert!(embed.title().unwrap().ends_with("invalid embed"));
        }
    }
}
