//! Embed size limits.
//!
//! The bounds mirror the chat platform's documented embed limits. A value
//! whose length *equals* a bound is already too long: the bound is the first
//! disallowed length, not the last allowed one.

use std::fmt;

use serde::Serialize;

use crate::errors::ComposeError;

pub const TITLE: usize = 256;
pub const DESCRIPTION: usize = 2048;
pub const FIELD_NAME: usize = 256;
pub const FIELD_VALUE: usize = 1024;
pub const FOOTER_TEXT: usize = 2048;
pub const AUTHOR_NAME: usize = 256;
/// Maximum number of fields in one embed (25 fields fit, the 26th does not).
pub const FIELD_COUNT: usize = 25;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitKind {
    Title,
    Description,
    FieldName,
    FieldValue,
    FooterText,
    AuthorName,
    FieldCount,
}

impl LimitKind {
    pub const ALL: [LimitKind; 7] = [
        LimitKind::Title,
        LimitKind::Description,
        LimitKind::FieldName,
        LimitKind::FieldValue,
        LimitKind::FooterText,
        LimitKind::AuthorName,
        LimitKind::FieldCount,
    ];

    pub const fn limit(self) -> usize {
        match self {
            LimitKind::Title => TITLE,
            LimitKind::Description => DESCRIPTION,
            LimitKind::FieldName => FIELD_NAME,
            LimitKind::FieldValue => FIELD_VALUE,
            LimitKind::FooterText => FOOTER_TEXT,
            LimitKind::AuthorName => AUTHOR_NAME,
            LimitKind::FieldCount => FIELD_COUNT,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            LimitKind::Title => "title",
            LimitKind::Description => "description",
            LimitKind::FieldName => "field name",
            LimitKind::FieldValue => "field value",
            LimitKind::FooterText => "footer text",
            LimitKind::AuthorName => "author name",
            LimitKind::FieldCount => "field count",
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Length as the platform counts it (Unicode scalar values).
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Check a scalar value against its bound (`len >= limit` is rejected).
pub fn validate(kind: LimitKind, value: &str) -> Result<(), ComposeError> {
    let len = char_len(value);
    let limit = kind.limit();
    if len >= limit {
        return Err(ComposeError::TooLong { kind, len, limit });
    }
    Ok(())
}

/// Check that one more field may be added to an embed holding `current`.
pub fn check_field_count(current: usize) -> Result<(), ComposeError> {
    if current >= FIELD_COUNT {
        return Err(ComposeError::TooMany { limit: FIELD_COUNT });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_first_disallowed_length() {
        for kind in LimitKind::ALL {
            if kind == LimitKind::FieldCount {
                continue;
            }
            let limit = kind.limit();
            assert!(validate(kind, &"x".repeat(limit - 1)).is_ok(), "{kind}");
            assert_eq!(
                validate(kind, &"x".repeat(limit)),
                Err(ComposeError::TooLong {
                    kind,
                    len: limit,
                    limit
                })
            );
        }
    }

    #[test]
    fn counts_chars_not_bytes() {
        // 255 three-byte characters still fit in a title.
        let title = "あ".repeat(TITLE - 1);
        assert!(title.len() > TITLE);
        assert!(validate(LimitKind::Title, &title).is_ok());
    }

    #[test]
    fn field_count_rejects_once_full() {
        assert!(check_field_count(0).is_ok());
        assert!(check_field_count(FIELD_COUNT - 1).is_ok());
        assert_eq!(
            check_field_count(FIELD_COUNT),
            Err(ComposeError::TooMany { limit: FIELD_COUNT })
        );
    }
}
