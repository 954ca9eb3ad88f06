//! Command metadata for the help renderer.

use vmb_core::help::{Category, CommandInfo};

pub const OWNER_CATEGORY: &str = "Owner";

/// Every command the router handles, grouped by category.
pub fn categories() -> Vec<Category> {
    vec![
        Category {
            name: None,
            description: String::new(),
            commands: vec![
                CommandInfo::new("help", "Show this message.")
                    .usage("[command]")
                    .help("Help for this bot. Pass a command or category name for details."),
                CommandInfo::new("start", "Show the command overview.").hidden(),
            ],
        },
        Category {
            name: Some(OWNER_CATEGORY.to_string()),
            description: "Commands only the bot owner can use.".to_string(),
            commands: vec![
                CommandInfo::new("extensions", "List command categories."),
                CommandInfo::new("embed", "Preview an embed from its JSON form.")
                    .usage("<json>")
                    .help("Pass the embed JSON, optionally inside a code block."),
            ],
        },
    ]
}

/// The command called `name`, searched across categories.
pub fn find<'a>(categories: &'a [Category], name: &str) -> Option<&'a CommandInfo> {
    categories
        .iter()
        .flat_map(|c| c.commands.iter())
        .find(|c| c.name == name)
}

pub fn is_owner_only(categories: &[Category], name: &str) -> bool {
    categories
        .iter()
        .filter(|c| c.name.as_deref() == Some(OWNER_CATEGORY))
        .any(|c| c.commands.iter().any(|cmd| cmd.name == name))
}

/// Names of the loaded command categories.
pub fn extension_names(categories: &[Category]) -> Vec<String> {
    let mut names: Vec<String> = categories
        .iter()
        .filter_map(|c| c.name.clone())
        .collect();
    names.sort();
    names
}
