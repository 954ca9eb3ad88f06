//! Size-checked structured message ("embed").
//!
//! Every mutation validates against [`crate::limits`] before it is applied, so
//! an `Embed` never holds out-of-limit content. A rejected mutation leaves the
//! embed untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::{
    errors::ComposeError,
    limits::{self, char_len, LimitKind},
};

/// 24-bit RGB colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Colour(u32);

impl Colour {
    pub const MAX: u32 = 0x00ff_ffff;

    /// Keeps the low 24 bits of `rgb`.
    pub const fn new(rgb: u32) -> Self {
        Self(rgb & Self::MAX)
    }

    /// `None` when `rgb` does not fit in 24 bits.
    pub const fn checked(rgb: u32) -> Option<Self> {
        if rgb > Self::MAX {
            None
        } else {
            Some(Self(rgb))
        }
    }

    pub const fn green() -> Self {
        Self(0x2ecc71)
    }

    pub const fn dark_red() -> Self {
        Self(0x992d22)
    }

    pub const fn blue() -> Self {
        Self(0x3498db)
    }

    pub const fn gold() -> Self {
        Self(0xf1c40f)
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Field {
    name: String,
    value: String,
    inline: bool,
}

impl Field {
    fn checked(name: &str, value: &str, inline: bool) -> Result<Self, ComposeError> {
        limits::validate(LimitKind::FieldName, name)?;
        limits::validate(LimitKind::FieldValue, value)?;
        Ok(Self {
            name: name.to_string(),
            value: value.to_string(),
            inline,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn inline(&self) -> bool {
        self.inline
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Footer {
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_url: Option<String>,
}

impl Footer {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn icon_url(&self) -> Option<&str> {
        self.icon_url.as_deref()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Author {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_url: Option<String>,
}

impl Author {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn icon_url(&self) -> Option<&str> {
        self.icon_url.as_deref()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Media {
    url: String,
}

/// A structured display payload.
///
/// Not `Clone`: duplicates go through [`Embed::copy`], which re-validates.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(rename = "color", skip_serializing_if = "Option::is_none")]
    colour: Option<Colour>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_timestamp"
    )]
    timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<Footer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<Author>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<Media>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail: Option<Media>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<Field>,
}

fn serialize_timestamp<S: Serializer>(
    ts: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match ts {
        Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
        None => serializer.serialize_none(),
    }
}

impl Embed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_colour(colour: Colour) -> Self {
        Self {
            colour: Some(colour),
            ..Self::default()
        }
    }

    // ============== Accessors ==============

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn colour(&self) -> Option<Colour> {
        self.colour
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn footer(&self) -> Option<&Footer> {
        self.footer.as_ref()
    }

    pub fn author(&self) -> Option<&Author> {
        self.author.as_ref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image.as_ref().map(|m| m.url.as_str())
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail.as_ref().map(|m| m.url.as_str())
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Total displayed text length (title, description, fields, footer, author).
    pub fn total_len(&self) -> usize {
        let opt = |s: &Option<String>| s.as_deref().map(char_len).unwrap_or(0);
        opt(&self.title)
            + opt(&self.description)
            + self
                .fields
                .iter()
                .map(|f| char_len(&f.name) + char_len(&f.value))
                .sum::<usize>()
            + self.footer.as_ref().map(|f| char_len(&f.text)).unwrap_or(0)
            + self.author.as_ref().map(|a| char_len(&a.name)).unwrap_or(0)
    }

    /// True when nothing textual would be displayed.
    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    // ============== Scalar Mutators ==============

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<&mut Self, ComposeError> {
        let title = title.into();
        limits::validate(LimitKind::Title, &title)?;
        self.title = Some(title);
        Ok(self)
    }

    pub fn set_description(
        &mut self,
        description: impl Into<String>,
    ) -> Result<&mut Self, ComposeError> {
        let description = description.into();
        limits::validate(LimitKind::Description, &description)?;
        self.description = Some(description);
        Ok(self)
    }

    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url = Some(url.into());
        self
    }

    pub fn set_colour(&mut self, colour: Colour) -> &mut Self {
        self.colour = Some(colour);
        self
    }

    pub fn set_timestamp(&mut self, ts: DateTime<Utc>) -> &mut Self {
        self.timestamp = Some(ts);
        self
    }

    pub fn set_footer(
        &mut self,
        text: impl Into<String>,
        icon_url: Option<&str>,
    ) -> Result<&mut Self, ComposeError> {
        let text = text.into();
        limits::validate(LimitKind::FooterText, &text)?;
        self.footer = Some(Footer {
            text,
            icon_url: icon_url.map(str::to_string),
        });
        Ok(self)
    }

    pub fn set_author(
        &mut self,
        name: impl Into<String>,
        url: Option<&str>,
        icon_url: Option<&str>,
    ) -> Result<&mut Self, ComposeError> {
        let name = name.into();
        limits::validate(LimitKind::AuthorName, &name)?;
        self.author = Some(Author {
            name,
            url: url.map(str::to_string),
            icon_url: icon_url.map(str::to_string),
        });
        Ok(self)
    }

    pub fn remove_author(&mut self) -> &mut Self {
        self.author = None;
        self
    }

    pub fn set_image(&mut self, url: impl Into<String>) -> &mut Self {
        self.image = Some(Media { url: url.into() });
        self
    }

    pub fn set_thumbnail(&mut self, url: impl Into<String>) -> &mut Self {
        self.thumbnail = Some(Media { url: url.into() });
        self
    }

    // ============== Fields ==============

    pub fn add_field(
        &mut self,
        name: &str,
        value: &str,
        inline: bool,
    ) -> Result<&mut Self, ComposeError> {
        let field = Field::checked(name, value, inline)?;
        limits::check_field_count(self.fields.len())?;
        self.fields.push(field);
        Ok(self)
    }

    pub fn insert_field_at(
        &mut self,
        index: usize,
        name: &str,
        value: &str,
        inline: bool,
    ) -> Result<&mut Self, ComposeError> {
        if index > self.fields.len() {
            return Err(self.out_of_range(index));
        }
        let field = Field::checked(name, value, inline)?;
        limits::check_field_count(self.fields.len())?;
        self.fields.insert(index, field);
        Ok(self)
    }

    pub fn set_field_at(
        &mut self,
        index: usize,
        name: &str,
        value: &str,
        inline: bool,
    ) -> Result<&mut Self, ComposeError> {
        if index >= self.fields.len() {
            return Err(self.out_of_range(index));
        }
        self.fields[index] = Field::checked(name, value, inline)?;
        Ok(self)
    }

    pub fn remove_field(&mut self, index: usize) -> Result<Field, ComposeError> {
        if index >= self.fields.len() {
            return Err(self.out_of_range(index));
        }
        Ok(self.fields.remove(index))
    }

    pub fn clear_fields(&mut self) -> &mut Self {
        self.fields.clear();
        self
    }

    /// Drop every field from `len` onward (used to roll back a partial batch).
    pub fn truncate_fields(&mut self, len: usize) -> &mut Self {
        self.fields.truncate(len);
        self
    }

    fn out_of_range(&self, index: usize) -> ComposeError {
        ComposeError::IndexOutOfRange {
            index,
            len: self.fields.len(),
        }
    }

    // ============== Wire Form ==============

    pub fn to_value(&self) -> serde_json::Value {
        // Every member serializes to plain JSON; this cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Build an embed from its wire form, validating every limit.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ComposeError> {
        let raw: RawEmbed = serde_json::from_value(value)
            .map_err(|e| ComposeError::InvalidArgument(format!("malformed embed: {e}")))?;
        raw.into_embed()
    }

    /// Independent duplicate, rebuilt from the wire form.
    pub fn copy(&self) -> Result<Self, ComposeError> {
        Self::from_value(self.to_value())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEmbed {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    color: Option<u32>,
    timestamp: Option<String>,
    footer: Option<RawFooter>,
    author: Option<RawAuthor>,
    image: Option<Media>,
    thumbnail: Option<Media>,
    fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
struct RawFooter {
    #[serde(default)]
    text: String,
    icon_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    #[serde(default)]
    name: String,
    url: Option<String>,
    icon_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: String,
    #[serde(default = "default_inline")]
    inline: bool,
}

fn default_inline() -> bool {
    true
}

impl RawEmbed {
    fn into_embed(self) -> Result<Embed, ComposeError> {
        if self.fields.len() > limits::FIELD_COUNT {
            return Err(ComposeError::TooMany {
                limit: limits::FIELD_COUNT,
            });
        }

        let mut embed = Embed::new();
        if let Some(title) = self.title {
            embed.set_title(title)?;
        }
        if let Some(description) = self.description {
            embed.set_description(description)?;
        }
        if let Some(url) = self.url {
            embed.set_url(url);
        }
        if let Some(color) = self.color {
            let colour = Colour::checked(color).ok_or_else(|| {
                ComposeError::InvalidArgument(format!("color {color:#x} is not 24-bit RGB"))
            })?;
            embed.set_colour(colour);
        }
        if let Some(ts) = self.timestamp {
            let ts = DateTime::parse_from_rfc3339(&ts)
                .map_err(|e| ComposeError::InvalidArgument(format!("timestamp {ts:?}: {e}")))?;
            embed.set_timestamp(ts.with_timezone(&Utc));
        }
        if let Some(footer) = self.footer {
            embed.set_footer(footer.text, footer.icon_url.as_deref())?;
        }
        if let Some(author) = self.author {
            embed.set_author(author.name, author.url.as_deref(), author.icon_url.as_deref())?;
        }
        if let Some(image) = self.image {
            embed.set_image(image.url);
        }
        if let Some(thumbnail) = self.thumbnail {
            embed.set_thumbnail(thumbnail.url);
        }
        for f in &self.fields {
            embed.add_field(&f.name, &f.value, f.inline)?;
        }
        Ok(embed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::limits::{FIELD_COUNT, FIELD_VALUE, TITLE};

    fn full_embed() -> Embed {
        let mut e = Embed::with_colour(Colour::gold());
        e.set_title("title").unwrap();
        e.set_description("desc").unwrap();
        e.set_url("https://example.com");
        e.set_timestamp(Utc.with_ymd_and_hms(2021, 5, 17, 22, 57, 58).unwrap());
        e.set_footer("foot", Some("https://example.com/icon.png"))
            .unwrap();
        e.set_author("me", None, None).unwrap();
        e.set_image("https://example.com/a.png");
        e.add_field("a", "1", true).unwrap();
        e.add_field("b", "2", false).unwrap();
        e
    }

    #[test]
    fn title_at_limit_is_rejected() {
        let mut e = Embed::new();
        let err = e.set_title("x".repeat(TITLE)).unwrap_err();
        assert!(matches!(err, ComposeError::TooLong { kind: LimitKind::Title, .. }));
        assert_eq!(e.title(), None);

        e.set_title("x".repeat(TITLE - 1)).unwrap();
        assert_eq!(e.title().map(char_len), Some(TITLE - 1));
    }

    #[test]
    fn field_value_at_limit_is_rejected() {
        let mut e = Embed::new();
        assert!(e.add_field("n", &"v".repeat(FIELD_VALUE), true).is_err());
        assert!(e.fields().is_empty());
        e.add_field("n", &"v".repeat(FIELD_VALUE - 1), true).unwrap();
        assert_eq!(e.fields().len(), 1);
    }

    #[test]
    fn twenty_sixth_field_is_rejected_without_change() {
        let mut e = Embed::new();
        for i in 0..FIELD_COUNT {
            e.add_field(&format!("f{i}"), "v", true).unwrap();
        }
        let before = e.to_value();

        let err = e.add_field("extra", "v", true).unwrap_err();
        assert_eq!(err, ComposeError::TooMany { limit: FIELD_COUNT });
        assert!(e.insert_field_at(0, "extra", "v", true).is_err());
        assert_eq!(e.to_value(), before);
    }

    #[test]
    fn insert_and_remove_respect_bounds() {
        let mut e = Embed::new();
        e.add_field("a", "1", true).unwrap();
        e.add_field("c", "3", true).unwrap();
        e.insert_field_at(1, "b", "2", false).unwrap();
        let names: Vec<_> = e.fields().iter().map(Field::name).collect();
        assert_eq!(names, ["a", "b", "c"]);

        assert_eq!(
            e.insert_field_at(9, "x", "y", true).unwrap_err(),
            ComposeError::IndexOutOfRange { index: 9, len: 3 }
        );
        assert!(e.remove_field(3).is_err());

        let removed = e.remove_field(0).unwrap();
        assert_eq!(removed.name(), "a");
        e.clear_fields();
        assert!(e.fields().is_empty());
    }

    #[test]
    fn set_field_at_replaces_in_place() {
        let mut e = Embed::new();
        e.add_field("a", "1", true).unwrap();
        e.set_field_at(0, "z", "9", false).unwrap();
        assert_eq!(e.fields()[0].value(), "9");
        assert!(!e.fields()[0].inline());

        assert!(e.set_field_at(0, "z", &"v".repeat(FIELD_VALUE), true).is_err());
        assert_eq!(e.fields()[0].value(), "9");
        assert!(matches!(
            e.set_field_at(1, "z", "9", true),
            Err(ComposeError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn serializes_discord_style_keys() {
        let v = full_embed().to_value();
        assert_eq!(v["title"], "title");
        assert_eq!(v["color"], 0xf1c40f);
        assert_eq!(v["timestamp"], "2021-05-17T22:57:58+00:00");
        assert_eq!(v["footer"]["icon_url"], "https://example.com/icon.png");
        assert_eq!(v["image"]["url"], "https://example.com/a.png");
        assert_eq!(v["fields"][1]["inline"], false);
        assert!(v.get("thumbnail").is_none());
        assert!(v["author"].get("url").is_none());
    }

    #[test]
    fn empty_embed_serializes_to_empty_object() {
        assert_eq!(Embed::new().to_value(), serde_json::json!({}));
    }

    #[test]
    fn copy_is_equal_and_independent() {
        let original = full_embed();
        let mut copy = original.copy().unwrap();
        assert_eq!(copy, original);

        copy.add_field("c", "3", true).unwrap();
        assert_eq!(original.fields().len(), 2);
        assert_eq!(copy.fields().len(), 3);
    }

    #[test]
    fn from_value_rejects_out_of_limit_documents() {
        let long_title = serde_json::json!({ "title": "x".repeat(TITLE) });
        assert!(matches!(
            Embed::from_value(long_title),
            Err(ComposeError::TooLong { .. })
        ));

        let fields: Vec<_> = (0..=FIELD_COUNT)
            .map(|i| serde_json::json!({ "name": i.to_string(), "value": "v" }))
            .collect();
        assert_eq!(
            Embed::from_value(serde_json::json!({ "fields": fields })).unwrap_err(),
            ComposeError::TooMany { limit: FIELD_COUNT }
        );

        let bad_footer = serde_json::json!({ "footer": { "text": "f".repeat(2048) } });
        assert!(Embed::from_value(bad_footer).is_err());

        let bad_ts = serde_json::json!({ "timestamp": "yesterday" });
        assert!(matches!(
            Embed::from_value(bad_ts),
            Err(ComposeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn colour_stays_within_24_bits() {
        assert_eq!(Colour::new(0xff00_0000).value(), 0);
        assert_eq!(Colour::checked(0xff00_0000), None);
        assert_eq!(Colour::checked(0xff_ffff), Some(Colour::new(0xff_ffff)));

        let mut e = Embed::new();
        e.set_colour(Colour::new(0x1ab_cdef));
        assert_eq!(e.copy().unwrap().colour(), Some(Colour::new(0xab_cdef)));

        let wide = serde_json::json!({ "color": 0xff00_0000u32 });
        assert!(matches!(
            Embed::from_value(wide),
            Err(ComposeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn from_value_accepts_full_field_list() {
        let fields: Vec<_> = (0..FIELD_COUNT)
            .map(|i| serde_json::json!({ "name": i.to_string(), "value": "v" }))
            .collect();
        let e = Embed::from_value(serde_json::json!({ "fields": fields })).unwrap();
        assert_eq!(e.fields().len(), FIELD_COUNT);
        assert!(e.fields()[0].inline());
    }

    #[test]
    fn total_len_counts_displayed_text() {
        let e = full_embed();
        // title(5) + desc(4) + a1 b2 (4) + foot(4) + me(2)
        assert_eq!(e.total_len(), 19);
        assert!(!e.is_empty());

        let mut bare = Embed::with_colour(Colour::blue());
        bare.set_image("https://example.com/a.png");
        assert!(bare.is_empty());
    }
}
