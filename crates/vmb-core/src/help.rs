//! Help command rendering.
//!
//! The command framework owns the commands; this module only needs their
//! metadata to build size-checked help embeds.

use crate::{
    compose::{OutgoingMessage, Report, RoutePolicy},
    embed::{Colour, Embed},
    errors::ComposeError,
};

const NO_CATEGORY: &str = "No Category";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: String,
    /// Parameter signature, e.g. `<code>`.
    pub usage: String,
    pub short_doc: String,
    pub description: String,
    pub help: Option<String>,
    pub hidden: bool,
    pub children: Vec<CommandInfo>,
}

impl CommandInfo {
    pub fn new(name: &str, short_doc: &str) -> Self {
        Self {
            name: name.to_string(),
            short_doc: short_doc.to_string(),
            ..Self::default()
        }
    }

    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    pub fn help(mut self, help: &str) -> Self {
        self.help = Some(help.to_string());
        self
    }

    pub fn child(mut self, child: CommandInfo) -> Self {
        self.children.push(child);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Names of the `<required>` parameters in `usage`.
    pub fn required_params(&self) -> Vec<&str> {
        self.usage
            .split_whitespace()
            .filter_map(|p| p.strip_prefix('<')?.strip_suffix('>'))
            .collect()
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Category {
    pub name: Option<String>,
    pub description: String,
    pub commands: Vec<CommandInfo>,
}

impl Category {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(NO_CATEGORY)
    }
}

/// Result of looking up a `/help <query>` argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HelpTarget<'a> {
    Category(&'a Category),
    /// A command together with its parent names (outermost first).
    Command {
        command: &'a CommandInfo,
        parents: Vec<String>,
    },
}

#[derive(Clone, Debug)]
pub struct HelpRenderer {
    pub prefix: String,
    pub help_command: String,
    pub bot_description: String,
    pub colour: Colour,
}

impl HelpRenderer {
    pub fn new(prefix: &str, bot_description: &str, colour: Colour) -> Self {
        Self {
            prefix: prefix.to_string(),
            help_command: "help".to_string(),
            bot_description: bot_description.to_string(),
            colour,
        }
    }

    /// `{prefix}{parents} {name} {usage}`.
    pub fn signature(&self, command: &CommandInfo, parents: &[String]) -> String {
        let mut sig = self.prefix.clone();
        for p in parents {
            sig.push_str(p);
            sig.push(' ');
        }
        sig.push_str(&command.name);
        if !command.usage.is_empty() {
            sig.push(' ');
            sig.push_str(&command.usage);
        }
        sig
    }

    pub fn ending_note(&self) -> String {
        let cmd = format!("{}{}", self.prefix, self.help_command);
        format!(
            "Use {cmd} <command_name> for help on a command.\n\
             Use {cmd} <category_name> for details on a category."
        )
    }

    pub fn command_not_found(&self, name: &str) -> String {
        format!("No command called \"{name}\" found.")
    }

    pub fn subcommand_not_found(&self, command: &CommandInfo, qualified: &str, name: &str) -> String {
        if command.is_group() {
            format!("Command \"{qualified}\" has no subcommand named {name}.")
        } else {
            format!("Command \"{qualified}\" has no subcommands.")
        }
    }

    /// Indented listing of `commands` and their visible descendants.
    ///
    /// Each line is `{"-" * depth}`signature` : short_doc`; the shallowest
    /// visible depth is shifted to zero.
    pub fn command_tree(&self, commands: &[CommandInfo], parents: &[String]) -> String {
        let mut lines: Vec<(usize, String)> = Vec::new();
        let mut path = parents.to_vec();
        self.walk(commands, 0, &mut path, &mut lines);

        let min_depth = lines.iter().map(|(d, _)| *d).min().unwrap_or(0);
        let out = lines
            .into_iter()
            .map(|(depth, line)| format!("{}{line}", "-".repeat(depth - min_depth)))
            .collect::<Vec<_>>()
            .join("\n");

        if out.is_empty() {
            "No commands.".to_string()
        } else {
            out
        }
    }

    fn walk(
        &self,
        commands: &[CommandInfo],
        depth: usize,
        path: &mut Vec<String>,
        lines: &mut Vec<(usize, String)>,
    ) {
        for cmd in commands {
            if !cmd.hidden {
                let sig = self.signature(cmd, path);
                lines.push((depth, format!("`{sig}` : {}", cmd.short_doc)));
            }
            path.push(cmd.name.clone());
            self.walk(&cmd.children, depth + 1, path, lines);
            path.pop();
        }
    }

    /// A report with title, description and the ending note in place.
    fn report(&self, title: &str, description: &str) -> Result<Report, ComposeError> {
        let mut embed = Embed::with_colour(self.colour);
        embed.set_footer(self.ending_note(), None)?;

        let mut report = Report::new(embed, RoutePolicy::help());
        report.title(title, "help_title.txt")?;
        if !description.is_empty() {
            report.description(description, "help_description.txt")?;
        }
        Ok(report)
    }

    fn section(report: &mut Report, name: &str, text: &str) -> Result<(), ComposeError> {
        report.section(name, text, None, &attachment_name(name))?;
        Ok(())
    }

    /// Overview of every category.
    pub fn bot_help(&self, categories: &[Category]) -> Result<OutgoingMessage, ComposeError> {
        let mut report = self.report("help", &self.bot_description)?;

        for category in categories {
            let mut visible: Vec<&CommandInfo> =
                category.commands.iter().filter(|c| !c.hidden).collect();
            visible.sort_by(|a, b| a.name.cmp(&b.name));

            let content: String = visible
                .iter()
                .map(|c| format!("`{}{}` - {}\n", self.prefix, c.name, c.short_doc))
                .collect();
            if content.is_empty() {
                continue;
            }
            Self::section(&mut report, category.display_name(), &content)?;
        }

        report.finish()
    }

    pub fn category_help(&self, category: &Category) -> Result<OutgoingMessage, ComposeError> {
        let mut report = self.report(category.display_name(), &category.description)?;
        let tree = self.command_tree(&category.commands, &[]);
        Self::section(&mut report, "Command List", &tree)?;
        report.finish()
    }

    pub fn group_help(
        &self,
        group: &CommandInfo,
        parents: &[String],
    ) -> Result<OutgoingMessage, ComposeError> {
        let mut report = self.report(&self.signature(group, parents), &group.description)?;
        if let Some(help) = group.help.as_deref().filter(|h| !h.is_empty()) {
            Self::section(&mut report, "Help Text", help)?;
        }
        let mut path = parents.to_vec();
        path.push(group.name.clone());
        let tree = self.command_tree(&group.children, &path);
        Self::section(&mut report, "Subcommand List", &tree)?;
        report.finish()
    }

    pub fn command_help(
        &self,
        command: &CommandInfo,
        parents: &[String],
    ) -> Result<OutgoingMessage, ComposeError> {
        let mut report = self.report(&self.signature(command, parents), &command.description)?;
        if let Some(help) = command.help.as_deref().filter(|h| !h.is_empty()) {
            Self::section(&mut report, "Help Text", help)?;
        }
        report.finish()
    }

    pub fn error_help(&self, message: &str) -> Result<OutgoingMessage, ComposeError> {
        self.report("Help Error", message)?.finish()
    }

    /// Render help for `query` (empty → overview), or the not-found message.
    pub fn render(&self, categories: &[Category], query: &str) -> Result<OutgoingMessage, ComposeError> {
        let query = query.trim();
        if query.is_empty() {
            return self.bot_help(categories);
        }

        match resolve(categories, query) {
            Ok(HelpTarget::Category(c)) => self.category_help(c),
            Ok(HelpTarget::Command { command, parents }) if command.is_group() => {
                self.group_help(command, &parents)
            }
            Ok(HelpTarget::Command { command, parents }) => self.command_help(command, &parents),
            Err(Missing::Command(name)) => self.error_help(&self.command_not_found(name)),
            Err(Missing::Subcommand { command, qualified, name }) => {
                self.error_help(&self.subcommand_not_found(command, &qualified, name))
            }
        }
    }
}

/// `help_<section>.txt`, lowercased with anything but ASCII alphanumerics
/// replaced by `_`.
fn attachment_name(section: &str) -> String {
    let slug: String = section
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("help_{slug}.txt")
}

/// Why a help query did not resolve.
#[derive(Debug, PartialEq, Eq)]
pub enum Missing<'a> {
    Command(&'a str),
    Subcommand {
        command: &'a CommandInfo,
        qualified: String,
        name: &'a str,
    },
}

/// Look up a category by name, else a command by space-separated path.
pub fn resolve<'a>(
    categories: &'a [Category],
    query: &'a str,
) -> Result<HelpTarget<'a>, Missing<'a>> {
    if let Some(c) = categories.iter().find(|c| c.name.as_deref() == Some(query)) {
        return Ok(HelpTarget::Category(c));
    }

    let mut words = query.split_whitespace();
    let Some(first) = words.next() else {
        return Err(Missing::Command(query));
    };
    let Some(mut command) = categories
        .iter()
        .flat_map(|c| c.commands.iter())
        .find(|c| c.name == first)
    else {
        return Err(Missing::Command(first));
    };

    let mut parents: Vec<String> = Vec::new();
    for word in words {
        let Some(child) = command.children.iter().find(|c| c.name == word) else {
            let mut qualified = parents.clone();
            qualified.push(command.name.clone());
            return Err(Missing::Subcommand {
                command,
                qualified: qualified.join(" "),
                name: word,
            });
        };
        parents.push(command.name.clone());
        command = child;
    }

    Ok(HelpTarget::Command { command, parents })
}
