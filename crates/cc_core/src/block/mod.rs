use serde_json::Value;

use crate::error::AppError;

/// Literal marker opening the deferred citation block.
pub const START_MARKER: &str = "[[citations]]";
/// Literal marker closing it; optional, the block runs to end-of-string
/// when absent.
pub const END_MARKER: &str = "[[/citations]]";

/// Split of a raw document around the deferred block.
///
/// `visible_text` is the only content ever safe to display and is valid even
/// when the data block fails to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredBlock<'a> {
    pub visible_text: String,
    pub data_block: &'a str,
}

/// Which parse path produced the recovered value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAttempt {
    Strict(Value),
    Repaired(Value),
    Failed(AppError),
}

pub fn split_deferred_block(text: &str) -> Option<DeferredBlock<'_>> {
    let start = text.find(START_MARKER)?;
    let visible_text = text[..start].trim().to_string();
    let after = &text[start + START_MARKER.len()..];
    let data_block = match after.find(END_MARKER) {
        Some(end) => &after[..end],
        None => after,
    };
    Some(DeferredBlock {
        visible_text,
        data_block,
    })
}

/// Parse the data block: strict first, then one repair pass.
///
/// The repair pass strips surrounding code-fence wrappers, drops trailing
/// separators before closing brackets, closes an unterminated string, and
/// balances unmatched opening brackets/braces by appending the missing
/// closers. Generators truncate mid-block often enough that this recovers a
/// useful share of otherwise-lost citations.
pub fn parse_data_block(block: &str) -> ParseAttempt {
    let strict_err = match parse_strict(block) {
        Ok(v) => return ParseAttempt::Strict(v),
        Err(e) => e,
    };
    let repaired = repair_block(block);
    match parse_strict(&repaired) {
        Ok(v) => ParseAttempt::Repaired(v),
        Err(repair_err) => ParseAttempt::Failed(
            AppError::new("CITE_BLOCK_UNPARSEABLE", "Deferred citation block unparsable")
                .with_details(format!("strict={strict_err}; repaired={repair_err}")),
        ),
    }
}

fn parse_strict(s: &str) -> Result<Value, String> {
    let v: Value = serde_json::from_str(s.trim()).map_err(|e| e.to_string())?;
    if v.is_array() {
        Ok(v)
    } else {
        Err("expected a top-level array".to_string())
    }
}

fn strip_code_fences(s: &str) -> &str {
    let mut t = s.trim();
    if let Some(rest) = t.strip_prefix("```") {
        // Drop the fence line including any language tag.
        t = match rest.find('\n') {
            Some(i) => &rest[i + 1..],
            None => rest,
        };
    }
    if let Some(rest) = t.trim_end().strip_suffix("```") {
        t = rest.trim_end();
    }
    t
}

/// Single string-aware pass over the block. Commas inside string literals
/// are never touched; bracket balancing only counts structural characters.
fn repair_block(raw: &str) -> String {
    let t = strip_code_fences(raw);
    let chars: Vec<char> = t.chars().collect();
    let mut out = String::with_capacity(t.len() + 8);
    let mut closers: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '{' => {
                closers.push('}');
                out.push(c);
            }
            '[' => {
                closers.push(']');
                out.push(c);
            }
            '}' | ']' => {
                if closers.last() == Some(&c) {
                    closers.pop();
                }
                out.push(c);
            }
            ',' => {
                let mut j = i + 1;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                let next = chars.get(j);
                if next != Some(&']') && next != Some(&'}') {
                    out.push(c);
                }
                // A separator directly before a closer is dropped.
            }
            _ => out.push(c),
        }
        i += 1;
    }

    if in_string {
        out.push('"');
    }
    while out.ends_with(|c: char| c.is_whitespace()) {
        out.pop();
    }
    if out.ends_with(',') {
        out.pop();
    }
    while let Some(closer) = closers.pop() {
        out.push(closer);
    }
    out
}
