//! Formatting utilities (code fences, embed → Telegram HTML).

use std::sync::OnceLock;

use regex::Regex;

use crate::{chunk::split_lines_hard, embed::Embed};

/// Smallest message size the HTML renderer keeps every block under.
pub const MIN_MESSAGE_LEN: usize = 256;

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Wrap `body` in a fenced code block tagged with `lang`.
pub fn code_block(lang: &str, body: &str) -> String {
    let nl = if body.ends_with('\n') { "" } else { "\n" };
    format!("```{lang}\n{body}{nl}```")
}

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\A```([A-Za-z0-9_+\-]*)\n(.*?)\n?```\z").expect("valid regex"))
}

/// Split a fenced code block into `(lang, body)`.
pub fn parse_code_block(text: &str) -> Option<(&str, &str)> {
    let caps = fence_re().captures(text)?;
    let lang = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let body = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    Some((lang, body))
}

// ============== Embed → HTML ==============

fn text_html(raw: &str) -> String {
    match parse_code_block(raw) {
        Some((lang, body)) if !lang.is_empty() => format!(
            "<pre><code class=\"language-{lang}\">{}</code></pre>",
            escape_html(body)
        ),
        Some((_, body)) => format!("<pre>{}</pre>", escape_html(body)),
        None => escape_html(raw),
    }
}

/// Render one titled block, re-splitting the raw text when escaping pushes
/// the result past `limit`.
fn titled_blocks(heading: Option<String>, raw: &str, limit: usize) -> Vec<String> {
    let render = |body: &str| match &heading {
        Some(h) => format!("{h}\n{}", text_html(body)),
        None => text_html(body),
    };

    let whole = render(raw);
    if whole.len() <= limit {
        return vec![whole];
    }

    // Worst-case escape growth is 6x (`"` → `&quot;`); leave room for tags.
    let (lang, body) = parse_code_block(raw).unwrap_or(("", raw));
    let overhead = heading.as_ref().map(|h| h.len()).unwrap_or(0) + 64 + lang.len();
    let budget = (limit.saturating_sub(overhead) / 6).max(1);
    let Ok(pieces) = split_lines_hard(body, budget) else {
        return vec![whole];
    };

    pieces
        .map(|piece| {
            if lang.is_empty() && parse_code_block(raw).is_none() {
                render(piece)
            } else {
                render(&format!("```{lang}\n{piece}```"))
            }
        })
        .collect()
}

/// `raw` escaped between `open` and `close`, re-split so each block fits `limit`.
fn wrapped_blocks(open: &str, close: &str, raw: &str, limit: usize) -> Vec<String> {
    let whole = format!("{open}{}{close}", escape_html(raw));
    if whole.len() <= limit {
        return vec![whole];
    }

    let budget = (limit.saturating_sub(open.len() + close.len()) / 6).max(1);
    let Ok(pieces) = split_lines_hard(raw, budget) else {
        return vec![whole];
    };
    pieces
        .map(|piece| format!("{open}{}{close}", escape_html(piece)))
        .collect()
}

/// Render an embed as a sequence of HTML blocks, none longer than `limit`
/// bytes when `limit` is at least [`MIN_MESSAGE_LEN`].
pub fn embed_to_html_blocks(embed: &Embed, limit: usize) -> Vec<String> {
    let mut blocks = Vec::new();

    if let Some(author) = embed.author() {
        blocks.extend(wrapped_blocks("<i>", "</i>", author.name(), limit));
    }
    if let Some(title) = embed.title() {
        let linked = embed.url().map(|url| {
            format!("<b><a href=\"{}\">{}</a></b>", escape_html(url), escape_html(title))
        });
        match linked {
            Some(block) if block.len() <= limit => blocks.push(block),
            _ => blocks.extend(wrapped_blocks("<b>", "</b>", title, limit)),
        }
    }
    if let Some(description) = embed.description().filter(|d| !d.is_empty()) {
        blocks.extend(titled_blocks(None, description, limit));
    }
    for field in embed.fields() {
        let mut heading = wrapped_blocks("<b>", "</b>", field.name(), limit);
        // A heading shares its block only while it leaves half the room to the value.
        if heading.len() == 1 && heading[0].len() * 2 <= limit {
            blocks.extend(titled_blocks(heading.pop(), field.value(), limit));
        } else {
            blocks.extend(heading);
            blocks.extend(titled_blocks(None, field.value(), limit));
        }
    }
    if let Some(footer) = embed.footer() {
        blocks.extend(titled_blocks(None, footer.text(), limit));
    }

    blocks
}

/// Greedily pack blocks into messages of at most `limit` bytes.
pub fn pack_blocks(blocks: Vec<String>, limit: usize) -> Vec<String> {
    const SEP: &str = "\n\n";

    let mut out = Vec::new();
    let mut current = String::new();
    for block in blocks {
        if !current.is_empty() && current.len() + SEP.len() + block.len() > limit {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str(SEP);
        }
        current.push_str(&block);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_html() {
        let s = r#"<a href="x&y">"#;
        assert_eq!(escape_html(s), "&lt;a href=&quot;x&amp;y&quot;&gt;");
    }

    #[test]
    fn code_block_does_not_double_trailing_newline() {
        assert_eq!(code_block("py", "x = 1"), "```py\nx = 1\n```");
        assert_eq!(code_block("py", "x = 1\n"), "```py\nx = 1\n```");
    }

    #[test]
    fn parses_fenced_blocks() {
        assert_eq!(parse_code_block("```py\nprint(1)\n```"), Some(("py", "print(1)")));
        assert_eq!(parse_code_block("```\na\nb```"), Some(("", "a\nb")));
        assert_eq!(parse_code_block("plain"), None);
    }

    #[test]
    fn renders_fields_with_pre_blocks() {
        let mut e = Embed::new();
        e.set_title("traceback").unwrap();
        e.add_field("tb", &code_block("py", "a < b"), false).unwrap();
        let blocks = embed_to_html_blocks(&e, 4096);
        assert_eq!(
            blocks,
            [
                "<b>traceback</b>",
                "<b>tb</b>\n<pre><code class=\"language-py\">a &lt; b</code></pre>",
            ]
        );
    }

    #[test]
    fn heavy_escaping_is_resplit_under_limit() {
        let mut e = Embed::new();
        e.add_field("q", &"\"".repeat(1000), false).unwrap();
        let blocks = embed_to_html_blocks(&e, 1024);
        assert!(blocks.len() > 1);
        assert!(blocks.iter().all(|b| b.len() <= 1024));
        let quotes: usize = blocks.iter().map(|b| b.matches("&quot;").count()).sum();
        assert_eq!(quotes, 1000);
    }

    #[test]
    fn headings_fit_small_message_limits() {
        let mut e = Embed::new();
        e.set_author("<".repeat(200), None, None).unwrap();
        e.set_title("\"".repeat(255)).unwrap();
        e.set_url("https://example.com/");
        e.add_field(&"&".repeat(255), "value", false).unwrap();

        let blocks = embed_to_html_blocks(&e, MIN_MESSAGE_LEN);
        assert!(blocks.iter().all(|b| b.len() <= MIN_MESSAGE_LEN), "{blocks:?}");
        let quotes: usize = blocks.iter().map(|b| b.matches("&quot;").count()).sum();
        assert_eq!(quotes, 255);
        assert!(blocks.iter().any(|b| b == "value"));

        let messages = pack_blocks(blocks, MIN_MESSAGE_LEN);
        assert!(messages.iter().all(|m| m.len() <= MIN_MESSAGE_LEN));
    }

    #[test]
    fn short_linked_title_keeps_its_link() {
        let mut e = Embed::new();
        e.set_title("docs").unwrap();
        e.set_url("https://example.com/?a=1&b=2");
        assert_eq!(
            embed_to_html_blocks(&e, 4096),
            ["<b><a href=\"https://example.com/?a=1&amp;b=2\">docs</a></b>"]
        );
    }

    #[test]
    fn packs_blocks_greedily() {
        let blocks = vec!["a".repeat(5), "b".repeat(5), "c".repeat(5)];
        assert_eq!(
            pack_blocks(blocks, 12),
            ["aaaaa\n\nbbbbb".to_string(), "ccccc".to_string()]
        );
    }
}
