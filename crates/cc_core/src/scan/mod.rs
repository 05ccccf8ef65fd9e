use once_cell::sync::Lazy;
use regex::Regex;

use crate::decode::decode_attribute_value;
use crate::domain::ExtractionWarning;
use crate::normalize::{assign_str, AssignOutcome, RawFragment};

// The boundary class keeps `<citeX` from matching as a tag opener.
static CITE_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<cite[\s/>]").expect("cite open pattern"));
static CITE_CLOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</cite\s*>").expect("cite close pattern"));

/// Find every well-formed inline citation fragment in `text`.
///
/// Handles both shapes: self-closing (`<cite a='v' />`) and paired
/// (`<cite a='v'>ignored</cite>`, inter-tag content discarded). Supports
/// arbitrary attribute order, escaped quotes inside values, values spanning
/// literal newlines, and attribute names carrying markdown-escape
/// backslashes. An unterminated or unparsable fragment is skipped with a
/// warning and scanning resumes past its opener.
///
/// The caller bounds the input length; the scan itself is a single forward
/// pass (the anchors above are regex-crate patterns, so matching is
/// guaranteed linear with no backtracking blowup).
pub fn scan_inline_tags(text: &str, warnings: &mut Vec<ExtractionWarning>) -> Vec<RawFragment> {
    let mut out = Vec::new();
    let mut cursor = 0usize;

    // All closing-tag offsets, found in one pass up front. Paired openers
    // binary-search this list instead of re-scanning the tail of the input,
    // so a run of unclosed openers stays linear overall.
    let closes: Vec<(usize, usize)> = CITE_CLOSE_RE
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();

    while cursor < text.len() {
        let open = match CITE_OPEN_RE.find_at(text, cursor) {
            Some(m) => m,
            None => break,
        };
        let attrs_start = open.start() + "<cite".len();
        match parse_fragment(text, attrs_start, &closes, warnings) {
            Ok((frag, end)) => {
                out.push(frag);
                cursor = end;
            }
            Err(reason) => {
                warnings.push(
                    ExtractionWarning::new(
                        "CITE_FRAGMENT_MALFORMED",
                        "Citation tag skipped: unparsable fragment",
                    )
                    .with_details(format!("offset={}; reason={reason}", open.start())),
                );
                // Resume just past the opener so later fragments are found.
                cursor = attrs_start;
            }
        }
    }

    out
}

/// Parse attributes from just after `<cite` until the tag terminator.
/// Returns the collected fragment and the byte offset past the fragment.
fn parse_fragment(
    text: &str,
    mut pos: usize,
    closes: &[(usize, usize)],
    warnings: &mut Vec<ExtractionWarning>,
) -> Result<(RawFragment, usize), &'static str> {
    // Quotes, backslashes, and whitespace are ASCII; UTF-8 continuation
    // bytes never collide with them, so byte scanning is char-safe and
    // every slice boundary below falls on a delimiter.
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut frag = RawFragment::default();

    loop {
        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= len {
            return Err("unterminated tag");
        }
        match bytes[pos] {
            b'/' => {
                return if pos + 1 < len && bytes[pos + 1] == b'>' {
                    Ok((frag, pos + 2))
                } else {
                    Err("stray slash in tag")
                };
            }
            b'>' => {
                // Paired form: discard content, require a closing tag.
                let idx = closes.partition_point(|&(start, _)| start < pos + 1);
                return match closes.get(idx) {
                    Some(&(_, close_end)) => Ok((frag, close_end)),
                    None => Err("missing closing tag"),
                };
            }
            _ => {}
        }

        let name_start = pos;
        while pos < len && is_name_byte(bytes[pos]) {
            pos += 1;
        }
        if pos == name_start {
            return Err("unexpected character in tag");
        }
        let name = &text[name_start..pos];

        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= len || bytes[pos] != b'=' {
            return Err("attribute missing '='");
        }
        pos += 1;
        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= len || (bytes[pos] != b'\'' && bytes[pos] != b'"') {
            return Err("attribute missing quoted value");
        }
        let quote = bytes[pos];
        pos += 1;
        let value_start = pos;
        loop {
            if pos >= len {
                return Err("unterminated attribute value");
            }
            match bytes[pos] {
                b'\\' => pos += 2,
                b if b == quote => break,
                _ => pos += 1,
            }
        }
        let raw_value = &text[value_start..pos];
        pos += 1;

        if assign_str(&mut frag, name, &decode_attribute_value(raw_value)) == AssignOutcome::Unsafe
        {
            warnings.push(
                ExtractionWarning::new(
                    "CITE_UNSAFE_FIELD_NAME",
                    "Attribute dropped: name collides with reserved mapping keys",
                )
                .with_details(format!("name={name}")),
            );
        }
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'\\'
}
