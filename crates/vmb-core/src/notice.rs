//! Status notices (success / error / info / confirm) as embeds.

use crate::{
    embed::{Colour, Embed},
    errors::ComposeError,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    Success,
    Error,
    Info,
    Confirm,
}

impl Notice {
    pub const fn emoji(self) -> &'static str {
        match self {
            Notice::Success => "\u{2705}",
            Notice::Error => "\u{26a0}",
            Notice::Info => "\u{2139}\u{fe0f}",
            Notice::Confirm => "\u{2754}",
        }
    }

    pub const fn colour(self) -> Colour {
        match self {
            Notice::Success => Colour::green(),
            Notice::Error => Colour::dark_red(),
            Notice::Info => Colour::blue(),
            Notice::Confirm => Colour::gold(),
        }
    }

    pub fn embed(self, title: &str, description: Option<&str>) -> Result<Embed, ComposeError> {
        let mut embed = Embed::with_colour(self.colour());
        embed.set_title(format!("{} {title}", self.emoji()))?;
        embed.set_description(description.unwrap_or_default())?;
        Ok(embed)
    }
}

/// Error notice for a missing required command argument.
pub fn missing_argument(param: &str) -> Result<Embed, ComposeError> {
    Notice::Error.embed(&format!("`{param}` is required."), None)
}
