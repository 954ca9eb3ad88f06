//! Fallback routing: embed fields for short text, file attachments for long text.

use crate::{
    chunk::{LongLines, SplitLines},
    embed::Embed,
    errors::ComposeError,
    formatting::code_block,
    limits::char_len,
};

/// A file to send alongside (or instead of) an embed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn text(filename: impl Into<String>, content: &str) -> Self {
        Self {
            filename: filename.into(),
            content: content.as_bytes().to_vec(),
        }
    }
}

/// What a caller hands to the transport.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub embed: Option<Embed>,
    pub files: Vec<Attachment>,
}

impl OutgoingMessage {
    pub fn embed(embed: Embed) -> Self {
        Self {
            embed: Some(embed),
            files: Vec::new(),
        }
    }

    pub fn file(file: Attachment) -> Self {
        Self {
            embed: None,
            files: vec![file],
        }
    }
}

/// Thresholds for one kind of caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoutePolicy {
    /// Text at least this long goes to a file.
    pub short_threshold: usize,
    /// Chunk size for each field body.
    pub chunk_budget: usize,
    pub long_lines: LongLines,
}

impl RoutePolicy {
    /// Command/event error tracebacks sent to the owner.
    pub const fn error_report() -> Self {
        Self {
            short_threshold: 5000,
            chunk_budget: 1000,
            long_lines: LongLines::Split,
        }
    }

    /// Owner `eval` output.
    pub const fn eval() -> Self {
        Self {
            short_threshold: 2000,
            chunk_budget: 1000,
            long_lines: LongLines::Split,
        }
    }

    /// Help listings and help text.
    pub const fn help() -> Self {
        Self {
            short_threshold: 5000,
            chunk_budget: 1000,
            long_lines: LongLines::Split,
        }
    }

    pub fn is_short(&self, text: &str) -> bool {
        char_len(text) < self.short_threshold
    }
}

/// Where a block of text ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Routed {
    /// Added as this many fields.
    Fields(usize),
    /// Stored in the title or description.
    Placed,
    Attached,
}

/// Add `text` to `embed` as one field per chunk, all-or-nothing.
///
/// On any rejection the fields added by this call are removed again.
pub fn add_chunked_fields(
    embed: &mut Embed,
    name: &str,
    text: &str,
    fence: Option<&str>,
    policy: &RoutePolicy,
) -> Result<usize, ComposeError> {
    let start = embed.fields().len();
    let chunks = SplitLines::new(text, policy.chunk_budget, policy.long_lines)?;

    let mut added = 0;
    for chunk in chunks {
        let value = match fence {
            Some(lang) => code_block(lang, chunk),
            None => chunk.to_string(),
        };
        if let Err(e) = embed.add_field(name, &value, false) {
            embed.truncate_fields(start);
            return Err(e);
        }
        added += 1;
    }
    Ok(added)
}

/// Section-by-section composition of one embed plus attachments.
#[derive(Debug)]
pub struct Report {
    embed: Embed,
    files: Vec<Attachment>,
    policy: RoutePolicy,
}

impl Report {
    pub fn new(embed: Embed, policy: RoutePolicy) -> Self {
        Self {
            embed,
            files: Vec::new(),
            policy,
        }
    }

    pub fn embed(&self) -> &Embed {
        &self.embed
    }

    pub fn files(&self) -> &[Attachment] {
        &self.files
    }

    /// Route one block of text: fields when short and accepted, else `filename`.
    pub fn section(
        &mut self,
        name: &str,
        text: &str,
        fence: Option<&str>,
        filename: &str,
    ) -> Result<Routed, ComposeError> {
        if self.policy.is_short(text) {
            match add_chunked_fields(&mut self.embed, name, text, fence, &self.policy) {
                Ok(n) => return Ok(Routed::Fields(n)),
                Err(e) if e.is_recoverable() => {
                    tracing::debug!(section = name, error = %e, "embed rejected section, attaching");
                }
                Err(e) => return Err(e),
            }
        }

        self.files.push(Attachment::text(filename, text));
        Ok(Routed::Attached)
    }

    /// Put `text` in the title, or attach it when the embed rejects it.
    pub fn title(&mut self, text: &str, filename: &str) -> Result<Routed, ComposeError> {
        let res = self.embed.set_title(text).map(|_| ());
        self.fit_or_attach(res, text, filename)
    }

    /// Put `text` in the description, or attach it when the embed rejects it.
    pub fn description(&mut self, text: &str, filename: &str) -> Result<Routed, ComposeError> {
        let res = self.embed.set_description(text).map(|_| ());
        self.fit_or_attach(res, text, filename)
    }

    fn fit_or_attach(
        &mut self,
        res: Result<(), ComposeError>,
        text: &str,
        filename: &str,
    ) -> Result<Routed, ComposeError> {
        match res {
            Ok(()) => Ok(Routed::Placed),
            Err(e) if e.is_recoverable() => {
                tracing::debug!(file = filename, error = %e, "embed rejected text, attaching");
                self.files.push(Attachment::text(filename, text));
                Ok(Routed::Attached)
            }
            Err(e) => Err(e),
        }
    }

    /// Finish the report, never producing a visibly empty embed.
    pub fn finish(mut self) -> Result<OutgoingMessage, ComposeError> {
        fill_placeholder(&mut self.embed, !self.files.is_empty())?;
        Ok(OutgoingMessage {
            embed: Some(self.embed),
            files: self.files,
        })
    }
}

/// Give an empty embed something to show: a pointer at the files, or a
/// "No data" field.
fn fill_placeholder(embed: &mut Embed, has_files: bool) -> Result<(), ComposeError> {
    if embed.is_empty() {
        if has_files {
            embed.set_description("see files")?;
        } else {
            embed.add_field("anything", "No data", false)?;
        }
    }
    Ok(())
}

/// Compose a traceback for the owner: an embed of fenced fields when it is
/// short enough and the embed accepts it, otherwise a single file.
pub fn error_report(
    mut base: Embed,
    title: &str,
    traceback: &str,
    filename: &str,
    policy: &RoutePolicy,
) -> Result<OutgoingMessage, ComposeError> {
    if policy.is_short(traceback) {
        match fill_error_embed(&mut base, title, traceback, policy) {
            Ok(()) => {
                fill_placeholder(&mut base, false)?;
                return Ok(OutgoingMessage::embed(base));
            }
            Err(e) if e.is_recoverable() => {
                tracing::debug!(error = %e, "traceback does not fit an embed, attaching");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(OutgoingMessage::file(Attachment::text(filename, traceback)))
}

fn fill_error_embed(
    embed: &mut Embed,
    title: &str,
    traceback: &str,
    policy: &RoutePolicy,
) -> Result<(), ComposeError> {
    embed.set_title(title)?;
    add_chunked_fields(embed, "traceback", traceback, Some("py"), policy)?;
    Ok(())
}
