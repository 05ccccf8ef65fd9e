use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Candidate entity sequences. Bounded length so an adversarial run of
/// `&aaaa...` can never match more than a short window.
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[a-zA-Z]{1,8});").expect("entity pattern")
});

/// Decode a raw attribute value captured between matching quote delimiters.
///
/// Contract:
/// - `\'` and `\"` become literal quote characters; `\\` becomes a single
///   backslash. Any other backslash sequence is preserved as-is.
/// - Named entities (`&lt;` `&gt;` `&amp;` `&quot;` `&apos;`) and numeric
///   entities (`&#39;` `&#x27;`) decode to their characters; unrecognized
///   entity sequences pass through unchanged.
/// - Total and pure: never fails, never allocates beyond the output, leaves
///   all other content untouched (forward slashes, `=`, literal newlines).
pub fn decode_attribute_value(raw: &str) -> String {
    let unescaped = unescape_quotes(raw);
    decode_entities(&unescaped).into_owned()
}

fn unescape_quotes(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('\'') | Some('"') | Some('\\') => {
                    // Consume the escape, keep the escaped character.
                    out.push(chars.next().unwrap_or(c));
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

fn decode_entities<'a>(raw: &'a str) -> Cow<'a, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }
    ENTITY_RE.replace_all(raw, |caps: &Captures<'_>| {
        let m = &caps[0];
        decode_one_entity(m).unwrap_or_else(|| m.to_string())
    })
}

fn decode_one_entity(entity: &str) -> Option<String> {
    // `entity` includes the surrounding `&` and `;`.
    let body = &entity[1..entity.len() - 1];
    let decoded = match body {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let code = if let Some(hexpart) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
                u32::from_str_radix(hexpart, 16).ok()?
            } else if let Some(decpart) = body.strip_prefix('#') {
                decpart.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)?
        }
    };
    Some(decoded.to_string())
}
