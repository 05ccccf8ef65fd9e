//! Citation key and orchestrator determinism properties.

use pretty_assertions::assert_eq;

use cc_core::extract_citations;
use cc_core::keys::citation_key;

#[test]
fn orchestrator_is_deterministic_on_identical_input() {
    let text = concat!(
        "prose <cite attachment_id='a' full_phrase='phrase one' key_span='one' line_ids='1-3'/>",
        " more <cite url='https://example.com/doc' full_phrase='phrase two' page_number='7'/>"
    );
    let first = extract_citations(text);
    let second = extract_citations(text);

    assert_eq!(first, second);
    assert_eq!(
        first.citations.keys().collect::<Vec<_>>(),
        second.citations.keys().collect::<Vec<_>>()
    );
}

#[test]
fn same_logical_citation_from_either_wire_format_shares_a_key() {
    let inline = extract_citations(
        "<cite attachment_id='att-1' full_phrase='identical phrase' key_span='identical' />",
    );
    let block = extract_citations(concat!(
        "text\n[[citations]]",
        r#"[{"id": 1, "attachment_id": "att-1", "full_phrase": "identical phrase", "key_span": "identical"}]"#,
        "[[/citations]]"
    ));

    let inline_key = inline.citations.keys().next().expect("inline citation");
    let block_key = block.citations.keys().next().expect("block citation");
    assert_eq!(inline_key, block_key);
}

#[test]
fn duplicate_citations_collapse_to_one_entry() {
    let tag = "<cite attachment_id='a' full_phrase='same phrase' key_span='same' />";
    let result = extract_citations(&format!("{tag} and again {tag}"));
    assert_eq!(result.citations.len(), 1);
}

#[test]
fn differing_identity_fields_produce_differing_keys() {
    let result = extract_citations(concat!(
        "<cite attachment_id='a' full_phrase='phrase' key_span='s' page_number='1'/>",
        "<cite attachment_id='a' full_phrase='phrase' key_span='s' page_number='2'/>",
        "<cite attachment_id='b' full_phrase='phrase' key_span='s' page_number='1'/>",
        "<cite attachment_id='a' full_phrase='other' key_span='s' page_number='1'/>",
    ));
    // All four differ in at least one identity field.
    assert_eq!(result.citations.len(), 4);
}

#[test]
fn keys_are_stable_across_extraction_order() {
    let a = "<cite attachment_id='x' full_phrase='alpha' />";
    let b = "<cite attachment_id='y' full_phrase='beta' />";

    let ab = extract_citations(&format!("{a}{b}"));
    let ba = extract_citations(&format!("{b}{a}"));

    for (key, citation) in &ab.citations {
        let twin = ba.citations.get(key).expect("key present in both orders");
        assert_eq!(citation.full_phrase, twin.full_phrase);
        assert_eq!(citation_key(citation), *key);
    }
}
