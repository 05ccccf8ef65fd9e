//! End-to-end extraction over the deferred-block wire format.
//!
//! Ensures that:
//! - The block is preferred over inline tags whenever its marker is present
//! - Visible text survives every block failure mode
//! - The repair pass recovers fenced, comma-damaged, and truncated blocks

use pretty_assertions::assert_eq;

use cc_core::extract_citations;

#[test]
fn strict_block_parses_to_citations_and_visible_text() {
    let text = concat!(
        "The answer cites two passages.\n\n",
        "[[citations]]",
        r#"[
            {"id": 1, "attachment_id": "att-1", "full_phrase": "first passage", "key_span": "first", "line_ids": [3, 1, 2]},
            {"id": 2, "attachment_id": "att-2", "full_phrase": "second passage", "page_key": "page_number_5_index_1"}
        ]"#,
        "[[/citations]]"
    );
    let result = extract_citations(text);

    assert_eq!(result.visible_text, "The answer cites two passages.");
    assert_eq!(result.citations.len(), 2);
    assert!(result.warnings.is_empty());

    let by_number = |n: u32| {
        result
            .citations
            .values()
            .find(|c| c.citation_number == Some(n))
            .expect("citation present")
    };
    assert_eq!(by_number(1).full_phrase, "first passage");
    assert_eq!(by_number(1).line_ids, Some(vec![1, 2, 3]));
    assert_eq!(by_number(2).start_page_key.map(|k| k.page_number), Some(5));
}

#[test]
fn trailing_separator_block_is_repaired_to_all_citations() {
    let text = concat!(
        "Visible answer.\n",
        "[[citations]]",
        r#"[{"id": 1, "full_phrase": "one"}, {"id": 2, "full_phrase": "two"},]"#,
        "[[/citations]]"
    );
    let result = extract_citations(text);

    assert_eq!(result.citations.len(), 2);
    assert_eq!(result.visible_text, "Visible answer.");
    assert!(result.warnings.iter().any(|w| w.code == "CITE_BLOCK_REPAIRED"));
}

#[test]
fn fenced_and_truncated_block_is_repaired() {
    // Generator wrapped the block in a code fence and stopped mid-array.
    let text = concat!(
        "Answer.\n",
        "[[citations]]\n",
        "```json\n",
        r#"[{"id": 1, "full_phrase": "recovered one"}, {"id": 2, "full_phrase": "recovered two"}"#,
        "\n```"
    );
    let result = extract_citations(text);

    assert_eq!(result.visible_text, "Answer.");
    assert_eq!(result.citations.len(), 2);
    assert!(result.warnings.iter().any(|w| w.code == "CITE_BLOCK_REPAIRED"));
}

#[test]
fn unparsable_block_still_returns_visible_text() {
    let text = "The visible answer.\n[[citations]] complete garbage }{ not an array";
    let result = extract_citations(text);

    assert_eq!(result.visible_text, "The visible answer.");
    assert!(result.citations.is_empty());
    assert!(result
        .warnings
        .iter()
        .any(|w| w.code == "CITE_BLOCK_UNPARSEABLE"));
}

#[test]
fn block_marker_disables_inline_tag_scanning() {
    // The two wire formats are mutually exclusive per document.
    let text = concat!(
        "prose <cite full_phrase='inline ignored'/> prose\n",
        "[[citations]]",
        r#"[{"id": 1, "full_phrase": "block wins"}]"#,
        "[[/citations]]"
    );
    let result = extract_citations(text);

    assert_eq!(result.citations.len(), 1);
    let citation = result.citations.values().next().unwrap();
    assert_eq!(citation.full_phrase, "block wins");
}

#[test]
fn timestamps_are_carried_for_time_based_media() {
    let text = concat!(
        "Audio answer.\n",
        "[[citations]]",
        r#"[{"id": 1, "attachment_id": "rec-1", "full_phrase": "spoken words",
            "timestamps": {"start_time": 12.5, "end_time": "17"}}]"#,
        "[[/citations]]"
    );
    let result = extract_citations(text);

    let citation = result.citations.values().next().unwrap();
    let ts = citation.timestamps.as_ref().expect("timestamps carried");
    assert_eq!(ts.start_time.as_deref(), Some("12.5"));
    assert_eq!(ts.end_time.as_deref(), Some("17"));
}

#[test]
fn non_object_elements_are_skipped_not_fatal() {
    let text = concat!(
        "Answer.\n",
        "[[citations]]",
        r#"[42, {"id": 1, "full_phrase": "kept"}, "stray"]"#,
        "[[/citations]]"
    );
    let result = extract_citations(text);

    assert_eq!(result.citations.len(), 1);
    assert_eq!(
        result
            .warnings
            .iter()
            .filter(|w| w.code == "CITE_FRAGMENT_MALFORMED")
            .count(),
        2
    );
}

#[test]
fn camel_case_aliases_resolve_in_block_objects() {
    let text = concat!(
        "Answer.\n",
        "[[citations]]",
        r#"[{"id": 3, "attachmentId": "att-7", "fullPhrase": "aliased", "keySpan": "ali", "lineIds": "2-4"}]"#,
        "[[/citations]]"
    );
    let result = extract_citations(text);

    let citation = result.citations.values().next().unwrap();
    assert_eq!(citation.attachment_id.as_deref(), Some("att-7"));
    assert_eq!(citation.full_phrase, "aliased");
    assert_eq!(citation.key_span.as_deref(), Some("ali"));
    assert_eq!(citation.line_ids, Some(vec![2, 3, 4]));
    assert_eq!(citation.citation_number, Some(3));
}
