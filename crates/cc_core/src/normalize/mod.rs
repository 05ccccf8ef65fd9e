use serde_json::Value;

use crate::domain::{Citation, ExtractionWarning, Timestamps};
use crate::interpret::line_ranges::{interpret_line_ranges, LineRangeOutcome};
use crate::interpret::page_key::interpret_page_key;

/// Intermediate shape a fragment from either wire format is collected into.
///
/// Fields are only ever written through [`assign_str`]/[`assign_json`], which
/// match incoming names against an explicit allow-list. External keys are
/// never copied verbatim into a general-purpose map, so reserved-key
/// collisions cannot occur regardless of what the generator emits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFragment {
    pub attachment_id: Option<String>,
    pub url: Option<String>,
    pub full_phrase: Option<String>,
    pub key_span: Option<String>,
    pub page_number: Option<i64>,
    pub start_page_key: Option<String>,
    pub line_ids_raw: Option<String>,
    pub citation_number: Option<u32>,
    pub reasoning: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Result of offering one external field to the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    Assigned,
    /// Not a recognized field name; dropped, rest of the fragment kept.
    Ignored,
    /// Name looks like a host-mapping internal; dropped with a warning.
    Unsafe,
}

fn looks_reserved(name: &str) -> bool {
    name.starts_with("__") || name == "constructor" || name == "prototype"
}

/// Assign a string-valued field under its externally-supplied name.
///
/// Attribute names arrive with markdown-escaping artifacts
/// (`full\_phrase`), so backslashes are stripped before alias matching.
pub fn assign_str(frag: &mut RawFragment, name: &str, value: &str) -> AssignOutcome {
    let clean: String = name.chars().filter(|c| *c != '\\').collect();
    if looks_reserved(&clean) {
        return AssignOutcome::Unsafe;
    }
    match clean.as_str() {
        "attachment_id" | "attachmentId" => frag.attachment_id = Some(value.to_string()),
        "url" => frag.url = Some(value.to_string()),
        "full_phrase" | "fullPhrase" | "phrase" => frag.full_phrase = Some(value.to_string()),
        "key_span" | "keySpan" | "anchor_text" | "anchorText" => {
            frag.key_span = Some(value.to_string())
        }
        "page_number" | "pageNumber" | "page" => match value.trim().parse::<i64>() {
            Ok(v) => frag.page_number = Some(v),
            Err(_) => return AssignOutcome::Ignored,
        },
        "start_page_key" | "startPageKey" | "page_key" | "pageKey" => {
            frag.start_page_key = Some(value.to_string())
        }
        "line_ids" | "lineIds" | "lines" => frag.line_ids_raw = Some(value.to_string()),
        "id" | "citation_number" | "citationNumber" => match value.trim().parse::<u32>() {
            Ok(v) => frag.citation_number = Some(v),
            Err(_) => return AssignOutcome::Ignored,
        },
        "reasoning" | "reason" => frag.reasoning = Some(value.to_string()),
        "start_time" | "startTime" => frag.start_time = Some(value.trim().to_string()),
        "end_time" | "endTime" => frag.end_time = Some(value.trim().to_string()),
        _ => return AssignOutcome::Ignored,
    }
    AssignOutcome::Assigned
}

/// Assign a JSON-valued field from a recovered deferred-block object.
///
/// Scalars are stringified; `line_ids` arrays are flattened back into the
/// compact comma form so both wire formats share one interpreter; the
/// `timestamps` object is unpacked into its two scalar fields. Values of an
/// unusable JSON type are ignored.
pub fn assign_json(frag: &mut RawFragment, name: &str, value: &Value) -> AssignOutcome {
    let clean: String = name.chars().filter(|c| *c != '\\').collect();
    if looks_reserved(&clean) {
        return AssignOutcome::Unsafe;
    }
    if clean == "timestamps" {
        if let Value::Object(map) = value {
            for (k, v) in map {
                if let Some(s) = json_scalar_to_string(v) {
                    match k.as_str() {
                        "start_time" | "startTime" => frag.start_time = Some(s),
                        "end_time" | "endTime" => frag.end_time = Some(s),
                        _ => {}
                    }
                }
            }
            return AssignOutcome::Assigned;
        }
        return AssignOutcome::Ignored;
    }
    let stringified = match value {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(json_scalar_to_string).collect();
            Some(parts.join(", "))
        }
        other => json_scalar_to_string(other),
    };
    match stringified {
        Some(s) => assign_str(frag, &clean, &s),
        None => AssignOutcome::Ignored,
    }
}

fn json_scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Canonicalize a collected fragment into a `Citation`.
///
/// Contract:
/// - A fragment with no non-empty `full_phrase` yields `None` (with a
///   `CITE_MISSING_FULL_PHRASE` warning) — never a Citation with empty core
///   content.
/// - An over-cap line-range drops only `line_ids`; every other field of the
///   citation is kept (`CITE_RANGE_TOO_LARGE` warning).
/// - `fallback_number` is the 1-based appearance ordinal, used when the
///   fragment carried no explicit marker id.
pub fn build_citation(
    frag: RawFragment,
    fallback_number: u32,
    warnings: &mut Vec<ExtractionWarning>,
) -> Option<Citation> {
    let full_phrase = match frag.full_phrase {
        Some(p) if !p.trim().is_empty() => p,
        _ => {
            warnings.push(ExtractionWarning::new(
                "CITE_MISSING_FULL_PHRASE",
                "Citation fragment dropped: no full phrase",
            ));
            return None;
        }
    };

    let line_ids = match frag.line_ids_raw.as_deref() {
        Some(raw) => match interpret_line_ranges(raw) {
            LineRangeOutcome::Lines(ids) => Some(ids),
            LineRangeOutcome::TooLarge { span } => {
                warnings.push(
                    ExtractionWarning::new(
                        "CITE_RANGE_TOO_LARGE",
                        "Line range exceeds expansion cap; line ids dropped",
                    )
                    .with_details(format!("span={span}")),
                );
                None
            }
            LineRangeOutcome::Empty => None,
        },
        None => None,
    };

    let start_page_key = frag
        .start_page_key
        .as_deref()
        .and_then(interpret_page_key);

    let timestamps = if frag.start_time.is_some() || frag.end_time.is_some() {
        Some(Timestamps {
            start_time: frag.start_time,
            end_time: frag.end_time,
        })
    } else {
        None
    };

    Some(Citation {
        attachment_id: frag.attachment_id,
        url: frag.url,
        full_phrase,
        key_span: frag.key_span,
        page_number: frag.page_number,
        start_page_key,
        timestamps,
        line_ids,
        citation_number: frag.citation_number.or(Some(fallback_number)),
        reasoning: frag.reasoning,
    })
}
