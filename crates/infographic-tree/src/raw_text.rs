//! Raw text elements.
//!
//! The content of `script` and `style` is not markup, and `textarea` content
//! only knows character references. The XML tokenizer has no such states, so
//! these contents are cut out of the source before tokenizing.

use std::sync::LazyLock;

use regex::Regex;

/// Comment, or the start tag of a raw text element.
static RAW_TEXT_START_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!--.*?-->|<(script|style|textarea)(?:[\s/][^>]*)?>")
        .expect("invalid raw text start regex")
});

/// Piece of the source between raw text boundaries.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    /// Markup for the tokenizer.
    Markup(&'a str),
    /// `script` or `style` content, kept verbatim.
    RawText(&'a str),
    /// `textarea` content: references are decoded, tags are text.
    EscapableText(&'a str),
}

/// Split `html` so each raw text element's content is its own segment.
///
/// Start tags inside comments are ignored. Content without an end tag runs to
/// the end of input.
pub(crate) fn split_raw_text(html: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;
    let mut cursor = 0;

    while let Some(caps) = RAW_TEXT_START_PATTERN.captures_at(html, cursor) {
        let Some(start_tag) = caps.get(0) else {
            break;
        };
        cursor = start_tag.end();
        let Some(name) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if start_tag.as_str().ends_with("/>") {
            continue;
        }

        let content_start = start_tag.end();
        let content_end = find_end_tag(&html[content_start..], name)
            .map_or(html.len(), |offset| content_start + offset);
        let content = &html[content_start..content_end];

        segments.push(Segment::Markup(&html[last..content_start]));
        segments.push(if name.eq_ignore_ascii_case("textarea") {
            Segment::EscapableText(content)
        } else {
            Segment::RawText(content)
        });
        last = content_end;
        cursor = content_end;
    }

    segments.push(Segment::Markup(&html[last..]));
    segments
}

/// Byte offset of `</name` followed by whitespace, `/` or `>`.
fn find_end_tag(content: &str, name: &str) -> Option<usize> {
    let lower = content.to_ascii_lowercase();
    let needle = format!("</{}", name.to_ascii_lowercase());
    lower.match_indices(&needle).map(|(i, _)| i).find(|&i| {
        matches!(
            lower.as_bytes().get(i + needle.len()),
            Some(b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_script_content() {
        let segments = split_raw_text("<p>a</p><script>if (a<b) { x(); }</script><p>b</p>");
        assert_eq!(
            segments,
            vec![
                Segment::Markup("<p>a</p><script>"),
                Segment::RawText("if (a<b) { x(); }"),
                Segment::Markup("</script><p>b</p>"),
            ]
        );
    }

    #[test]
    fn test_split_case_insensitive_with_attributes() {
        let segments = split_raw_text("<STYLE media=\"x\">a>b</Style >");
        assert_eq!(
            segments,
            vec![
                Segment::Markup("<STYLE media=\"x\">"),
                Segment::RawText("a>b"),
                Segment::Markup("</Style >"),
            ]
        );
    }

    #[test]
    fn test_split_textarea_is_escapable() {
        let segments = split_raw_text("<textarea><b>&amp;</textarea>");
        assert_eq!(segments[1], Segment::EscapableText("<b>&amp;"));
    }

    #[test]
    fn test_split_ignores_lookalike_end_tags() {
        let segments = split_raw_text("<script>'</scripts>'</script>");
        assert_eq!(segments[1], Segment::RawText("'</scripts>'"));
    }

    #[test]
    fn test_split_skips_comments_and_self_closing() {
        let html = "<!-- <script> --><script src=\"a.js\" /><p>x</p>";
        assert_eq!(split_raw_text(html), vec![Segment::Markup(html)]);
    }

    #[test]
    fn test_split_unclosed_runs_to_end() {
        let segments = split_raw_text("<script>let a = 1 < 2;");
        assert_eq!(
            segments,
            vec![
                Segment::Markup("<script>"),
                Segment::RawText("let a = 1 < 2;"),
                Segment::Markup(""),
            ]
        );
    }

    #[test]
    fn test_split_custom_element_not_raw() {
        let html = "<style-guide><b>x</b></style-guide>";
        assert_eq!(split_raw_text(html), vec![Segment::Markup(html)]);
    }
}
