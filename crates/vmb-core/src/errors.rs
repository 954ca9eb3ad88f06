use crate::limits::LimitKind;

/// Core error type for the bot.
///
/// Adapter crates should map their specific errors into this type so the bot
/// core can handle failures consistently (owner report vs user-facing notice).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Rejections raised while chunking text or mutating an embed.
///
/// `TooLong` and `TooMany` are content problems: callers react by routing the
/// text to a file attachment. `IndexOutOfRange` and `InvalidArgument` are
/// caller defects and should propagate.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ComposeError {
    #[error("{kind} is too long ({len} >= {limit})")]
    TooLong {
        kind: LimitKind,
        len: usize,
        limit: usize,
    },

    #[error("cannot add to fields (limit {limit})")]
    TooMany { limit: usize },

    #[error("field index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ComposeError {
    /// True when the fallback (attach as file) is the expected reaction.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::TooLong { .. } | Self::TooMany { .. })
    }
}
