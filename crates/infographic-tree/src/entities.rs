//! Entity normalization ahead of tokenizing.
//!
//! HTML allows named entities the XML tokenizer does not know, and bare `&`
//! and `<` characters in text. These are rewritten so the tokenizer only ever
//! sees the five XML entities, numeric references and real markup. Comments
//! and CDATA sections pass through as written.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `&` optionally followed by a complete reference.
static AMPERSAND_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+;|#[xX][0-9a-fA-F]+;|[A-Za-z][A-Za-z0-9]*;)?")
        .expect("invalid ampersand regex")
});

/// Comment or CDATA section.
static OPAQUE_SECTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<!\[CDATA\[.*?\]\]>").expect("invalid opaque section regex")
});

/// Prepare a markup run for the tokenizer.
///
/// Entities are normalized and stray `<` characters escaped everywhere except
/// inside comments and CDATA sections.
pub(crate) fn normalize_markup(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for section in OPAQUE_SECTION_PATTERN.find_iter(html) {
        push_normalized(&html[last..section.start()], &mut out);
        out.push_str(section.as_str());
        last = section.end();
    }
    push_normalized(&html[last..], &mut out);
    out
}

/// Append `markup` with entities normalized and every `<` that cannot open a
/// tag, comment, declaration or processing instruction escaped.
fn push_normalized(markup: &str, out: &mut String) {
    let markup = normalize_entities(markup);
    let bytes = markup.as_bytes();
    let mut last = 0;
    for (i, _) in markup.match_indices('<') {
        let opens_markup = bytes
            .get(i + 1)
            .is_some_and(|&b| b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'));
        if !opens_markup {
            out.push_str(&markup[last..i]);
            out.push_str("&lt;");
            last = i + 1;
        }
    }
    out.push_str(&markup[last..]);
}

/// Rewrite HTML entities into a form the XML tokenizer accepts.
///
/// Known named entities become their Unicode characters, XML entities and
/// numeric references are kept, and anything else has its `&` escaped.
pub(crate) fn normalize_entities(html: &str) -> Cow<'_, str> {
    if !html.contains('&') {
        return Cow::Borrowed(html);
    }
    AMPERSAND_PATTERN.replace_all(html, |caps: &Captures| {
        let Some(reference) = caps.get(1).map(|m| m.as_str()) else {
            return "&amp;".to_owned();
        };
        if reference.starts_with('#') {
            return format!("&{reference}");
        }
        let name = &reference[..reference.len() - 1];
        match name {
            "amp" | "lt" | "gt" | "quot" | "apos" => format!("&{reference}"),
            _ => named_entity(name).map_or_else(|| format!("&amp;{reference}"), str::to_owned),
        }
    })
}

/// Decode a reference reported by the tokenizer (without `&` and `;`).
pub(crate) fn decode_reference(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = match s.strip_prefix("#x").or_else(|| s.strip_prefix("#X")) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => s[1..].parse::<u32>().ok(),
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), String::from)
        }
        _ => format!("&{entity};"),
    }
}

fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "nbsp" => "\u{00a0}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "hellip" => "\u{2026}",
        "bull" => "\u{2022}",
        "middot" => "\u{00b7}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",
        "larr" => "\u{2190}",
        "rarr" => "\u{2192}",
        "uarr" => "\u{2191}",
        "darr" => "\u{2193}",
        "times" => "\u{00d7}",
        "divide" => "\u{00f7}",
        "plusmn" => "\u{00b1}",
        "le" => "\u{2264}",
        "ge" => "\u{2265}",
        "ne" => "\u{2260}",
        "deg" => "\u{00b0}",
        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",
        "euro" => "\u{20ac}",
        "pound" => "\u{00a3}",
        "yen" => "\u{00a5}",
        "cent" => "\u{00a2}",
        "sect" => "\u{00a7}",
        "para" => "\u{00b6}",
        _ => return None,
    })
}
