use serde_json::Value;

use crate::block::{self, ParseAttempt};
use crate::domain::{CitationMap, ExtractionResult, ExtractionWarning};
use crate::keys::citation_key;
use crate::normalize::{assign_json, build_citation, AssignOutcome, RawFragment};
use crate::scan::scan_inline_tags;

/// Input cap applied before any pattern matching runs. Keeps worst-case CPU
/// and memory bounded on untrusted generator output.
pub const MAX_SCAN_CHARS: usize = 100_000;

/// Extract every citation from raw generator output.
///
/// Contract:
/// - Never fails, for any input: zero-length, non-text, or adversarially
///   large (inputs beyond the cap are truncated with a warning).
/// - The two wire formats are mutually exclusive per document: when the
///   deferred-block start marker is present the block is the only citation
///   source; otherwise the whole text is scanned for inline tags.
/// - Deterministic: byte-identical input produces a byte-identical
///   `CitationMap` (same keys, same field values).
/// - A malformed citation never aborts extraction of the others, and
///   citation failures never cost the caller the visible text.
pub fn extract_citations(raw: &str) -> ExtractionResult {
    let mut warnings: Vec<ExtractionWarning> = Vec::new();
    let (bounded, truncated) = bound_input(raw);
    if truncated {
        warnings.push(
            ExtractionWarning::new(
                "CITE_INPUT_TRUNCATED",
                "Input exceeded the scan cap and was truncated",
            )
            .with_details(format!("cap={MAX_SCAN_CHARS}")),
        );
    }

    if let Some(split) = block::split_deferred_block(bounded) {
        let citations = extract_from_block(split.data_block, &mut warnings);
        return ExtractionResult {
            visible_text: split.visible_text,
            citations,
            warnings,
        };
    }

    let fragments = scan_inline_tags(bounded, &mut warnings);
    let citations = collect_citations(fragments, &mut warnings);
    ExtractionResult {
        visible_text: bounded.to_string(),
        citations,
        warnings,
    }
}

fn extract_from_block(data_block: &str, warnings: &mut Vec<ExtractionWarning>) -> CitationMap {
    let value = match block::parse_data_block(data_block) {
        ParseAttempt::Strict(v) => v,
        ParseAttempt::Repaired(v) => {
            warnings.push(ExtractionWarning::new(
                "CITE_BLOCK_REPAIRED",
                "Deferred citation block recovered by the repair pass",
            ));
            v
        }
        ParseAttempt::Failed(err) => {
            warnings.push(
                ExtractionWarning::new(
                    "CITE_BLOCK_UNPARSEABLE",
                    "Deferred citation block dropped; visible text unaffected",
                )
                .with_details(err.to_string()),
            );
            return CitationMap::new();
        }
    };

    let items = match value {
        Value::Array(items) => items,
        // parse_data_block only yields arrays.
        _ => Vec::new(),
    };

    let mut fragments = Vec::with_capacity(items.len());
    for item in &items {
        let obj = match item.as_object() {
            Some(obj) => obj,
            None => {
                warnings.push(
                    ExtractionWarning::new(
                        "CITE_FRAGMENT_MALFORMED",
                        "Deferred block element skipped: not an object",
                    )
                    .with_details(format!("element={item}")),
                );
                continue;
            }
        };
        let mut frag = RawFragment::default();
        for (name, value) in obj {
            if assign_json(&mut frag, name, value) == AssignOutcome::Unsafe {
                warnings.push(
                    ExtractionWarning::new(
                        "CITE_UNSAFE_FIELD_NAME",
                        "Field dropped: name collides with reserved mapping keys",
                    )
                    .with_details(format!("name={name}")),
                );
            }
        }
        fragments.push(frag);
    }

    collect_citations(fragments, warnings)
}

fn collect_citations(
    fragments: Vec<RawFragment>,
    warnings: &mut Vec<ExtractionWarning>,
) -> CitationMap {
    let mut map = CitationMap::new();
    for (ordinal, frag) in fragments.into_iter().enumerate() {
        let fallback_number = (ordinal + 1) as u32;
        if let Some(citation) = build_citation(frag, fallback_number, warnings) {
            let key = citation_key(&citation);
            // Identical logical citations share a key; first occurrence wins.
            map.entry(key).or_insert(citation);
        }
    }
    map
}

fn bound_input(text: &str) -> (&str, bool) {
    match text.char_indices().nth(MAX_SCAN_CHARS) {
        Some((byte_offset, _)) => (&text[..byte_offset], true),
        None => (text, false),
    }
}
