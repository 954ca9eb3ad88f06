use std::{env, fs, path::Path};

use crate::{compose::RoutePolicy, embed::Colour, errors::Error, Result};

/// Typed configuration, read from the environment (and `.env` when present).
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    /// Receives error reports and may use owner-only commands.
    pub owner_id: i64,
    pub default_embed_colour: Colour,
    pub command_prefix: String,
    pub bot_description: String,

    // Composer thresholds
    pub error_report_threshold: usize,
    pub field_chunk_size: usize,
    pub message_limit: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process environment in `load`).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bot_token = get("BOT_TOKEN")
            .or_else(|| get("TELEGRAM_BOT_TOKEN"))
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("BOT_TOKEN environment variable is required".to_string())
            })?;

        let owner_id = get("BOT_OWNER_ID")
            .and_then(|s| s.trim().parse::<i64>().ok())
            .ok_or_else(|| {
                Error::Config("BOT_OWNER_ID environment variable is required".to_string())
            })?;

        let default_embed_colour = match get("DEFAULT_EMBED_COLOR").and_then(non_empty) {
            Some(raw) => parse_colour(&raw).ok_or_else(|| {
                Error::Config(format!("DEFAULT_EMBED_COLOR is not a colour: {raw:?}"))
            })?,
            None => Colour::blue(),
        };

        let command_prefix = get("COMMAND_PREFIX")
            .and_then(non_empty)
            .unwrap_or_else(|| "/".to_string());
        let bot_description = get("BOT_DESCRIPTION")
            .unwrap_or_else(|| "this is a virtual market bot.".to_string());

        let parse_usize = |key: &str| get(key).and_then(|s| s.trim().parse::<usize>().ok());
        let error_report_threshold = parse_usize("ERROR_REPORT_THRESHOLD")
            .unwrap_or(RoutePolicy::error_report().short_threshold);
        let field_chunk_size = parse_usize("FIELD_CHUNK_SIZE")
            .unwrap_or(RoutePolicy::error_report().chunk_budget);
        let message_limit = parse_usize("MESSAGE_LIMIT").unwrap_or(4096);

        if field_chunk_size == 0 {
            return Err(Error::Config("FIELD_CHUNK_SIZE must be positive".to_string()));
        }

        Ok(Self {
            bot_token,
            owner_id,
            default_embed_colour,
            command_prefix,
            bot_description,
            error_report_threshold,
            field_chunk_size,
            message_limit,
        })
    }

    /// Routing thresholds for owner error reports.
    pub fn error_report_policy(&self) -> RoutePolicy {
        RoutePolicy {
            short_threshold: self.error_report_threshold,
            chunk_budget: self.field_chunk_size,
            ..RoutePolicy::error_report()
        }
    }
}

/// Parse `1234`, `#rrggbb` or `0xrrggbb`.
pub fn parse_colour(raw: &str) -> Option<Colour> {
    let s = raw.trim();
    let hex = s
        .strip_prefix('#')
        .or_else(|| s.strip_prefix("0x"))
        .or_else(|| s.strip_prefix("0X"));
    let value = match hex {
        Some(h) => u32::from_str_radix(h, 16).ok()?,
        None => s.parse::<u32>().ok()?,
    };
    Colour::checked(value)
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
