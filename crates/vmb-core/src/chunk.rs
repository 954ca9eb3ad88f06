//! Line-preserving text splitter.
//!
//! Splits text into pieces of at most `budget` characters without breaking a
//! line in the middle. The pieces are slices of the input and concatenate back
//! to it exactly.

use std::iter::FusedIterator;

use crate::errors::ComposeError;

/// What to do with a single line that is longer than the budget on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LongLines {
    /// Emit the whole line as one oversized chunk.
    #[default]
    Keep,
    /// Hard-cut the line into `budget`-sized pieces.
    Split,
}

/// Split `text` into line-aligned chunks of at most `budget` characters.
///
/// Oversized lines are kept whole (see [`LongLines::Keep`]).
pub fn split_lines(text: &str, budget: usize) -> Result<SplitLines<'_>, ComposeError> {
    SplitLines::new(text, budget, LongLines::Keep)
}

/// Like [`split_lines`], but hard-cuts lines longer than `budget`, so every
/// chunk fits.
pub fn split_lines_hard(text: &str, budget: usize) -> Result<SplitLines<'_>, ComposeError> {
    SplitLines::new(text, budget, LongLines::Split)
}

/// Lazy iterator over chunks. Cloning it restarts from the current position.
#[derive(Clone, Debug)]
pub struct SplitLines<'a> {
    rest: &'a str,
    budget: usize,
    long_lines: LongLines,
}

impl<'a> SplitLines<'a> {
    pub fn new(text: &'a str, budget: usize, long_lines: LongLines) -> Result<Self, ComposeError> {
        if budget == 0 {
            return Err(ComposeError::InvalidArgument(
                "chunk budget must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            rest: text,
            budget,
            long_lines,
        })
    }

    /// Byte length of the next chunk.
    fn next_cut(&self) -> usize {
        // Byte index just past the first `budget` characters, if the rest is longer.
        let Some((end, _)) = self.rest.char_indices().nth(self.budget) else {
            return self.rest.len();
        };

        let prefix = &self.rest[..end];
        if prefix.ends_with('\n') {
            return end;
        }
        if let Some(nl) = prefix.rfind('\n') {
            return nl + 1;
        }

        match self.long_lines {
            LongLines::Split => end,
            LongLines::Keep => self.rest[end..]
                .find('\n')
                .map(|nl| end + nl + 1)
                .unwrap_or(self.rest.len()),
        }
    }
}

impl<'a> Iterator for SplitLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let cut = self.next_cut();
        let (chunk, rest) = self.rest.split_at(cut);
        self.rest = rest;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.rest.is_empty() {
            (0, Some(0))
        } else {
            (1, Some(self.rest.len()))
        }
    }
}

impl FusedIterator for SplitLines<'_> {}
