//! Entity decoding and whitespace normalization.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Matches a character entity reference (`&amp;`, `&#167;`, `&#xA7;`).
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ENTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

fn named_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "sect" => Some('§'),
        "mdash" => Some('—'),
        "ndash" => Some('–'),
        _ => None,
    }
}

fn numeric_entity(body: &str) -> Option<char> {
    let code = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        body.strip_prefix('#')?.parse::<u32>().ok()?
    };
    char::from_u32(code)
}

fn decode_once(text: &str) -> String {
    ENTITY_PATTERN
        .replace_all(text, |caps: &Captures<'_>| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let body = caps.get(1).map_or("", |m| m.as_str());
            let decoded = if body.starts_with('#') {
                numeric_entity(body)
            } else {
                named_entity(body)
            };
            decoded.map_or_else(|| whole.to_string(), String::from)
        })
        .into_owned()
}

/// Decode character entities left in text after XML parsing.
///
/// The DOM already decodes one level of escaping; this handles text that
/// was escaped again at the source. Decoding repeats until nothing changes,
/// so a character produced by one pass that completes a new entity is
/// decoded too. Unknown entities are left untouched.
///
/// # Examples
/// ```
/// use taxgraph_parser::text::decode_entities;
///
/// assert_eq!(decode_entities("A &amp; B"), "A & B");
/// assert_eq!(decode_entities("&#167; 1"), "§ 1");
/// assert_eq!(decode_entities("&amp;amp;"), "&");
/// assert_eq!(decode_entities("&bogus;"), "&bogus;");
/// ```
pub fn decode_entities(text: &str) -> String {
    // Every decode shortens the text, so this terminates.
    let mut result = decode_once(text);
    loop {
        let next = decode_once(&result);
        if next == result {
            return result;
        }
        result = next;
    }
}

/// Normalize extracted text: decode entities, collapse whitespace runs
/// (newlines included) to a single space and trim.
///
/// The result is a fixed point: cleaning it again returns it unchanged.
///
/// # Examples
/// ```
/// use taxgraph_parser::text::clean_text;
///
/// assert_eq!(clean_text("  In\n   general &amp; more  "), "In general & more");
/// ```
pub fn clean_text(text: &str) -> String {
    let decoded = decode_entities(text);
    WHITESPACE_RUN.replace_all(&decoded, " ").trim().to_string()
}
