use sha2::{Digest, Sha256};

use crate::domain::Citation;

/// Fixed key length in hex characters (8 digest bytes). Ample collision
/// headroom for the thousands-per-document citation volumes this core sees.
pub const KEY_LEN: usize = 16;

/// Deterministic content address of a citation's identity-bearing fields.
///
/// Contract:
/// - Pure: identical identity fields yield the identical key regardless of
///   process, platform, call order, or which wire format produced the
///   citation.
/// - Non-identity fields (`line_ids`, `citation_number`, `reasoning`) do not
///   participate; editing them cannot move a citation to a new key.
/// - Each field is length-prefixed in the digest input, so an embedded
///   separator in one field cannot alias a neighboring field's content.
pub fn citation_key(citation: &Citation) -> String {
    let source = citation
        .attachment_id
        .as_deref()
        .or(citation.url.as_deref())
        .unwrap_or("");
    let page = citation
        .page_number
        .map(|p| p.to_string())
        .unwrap_or_default();
    let page_key = citation
        .start_page_key
        .map(|k| format!("{}:{}", k.page_number, k.index))
        .unwrap_or_default();
    let timestamps = citation
        .timestamps
        .as_ref()
        .map(|t| {
            format!(
                "{}..{}",
                t.start_time.as_deref().unwrap_or(""),
                t.end_time.as_deref().unwrap_or("")
            )
        })
        .unwrap_or_default();

    let mut input = String::from("v1");
    for field in [
        source,
        citation.full_phrase.as_str(),
        citation.key_span.as_deref().unwrap_or(""),
        page.as_str(),
        page_key.as_str(),
        timestamps.as_str(),
    ] {
        input.push('|');
        input.push_str(&field.len().to_string());
        input.push(':');
        input.push_str(field);
    }

    let digest = Sha256::digest(input.as_bytes());
    hex::encode(&digest[..KEY_LEN / 2])
}

#[cfg(test)]
mod tests {
    use super::{citation_key, KEY_LEN};
    use crate::domain::Citation;

    fn base() -> Citation {
        Citation {
            attachment_id: Some("att-1".to_string()),
            url: None,
            full_phrase: "the quoted phrase".to_string(),
            key_span: Some("quoted".to_string()),
            page_number: Some(4),
            start_page_key: None,
            timestamps: None,
            line_ids: Some(vec![1, 2, 3]),
            citation_number: Some(1),
            reasoning: Some("why".to_string()),
        }
    }

    #[test]
    fn key_is_fixed_length_hex() {
        let key = citation_key(&base());
        assert_eq!(key.len(), KEY_LEN);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn non_identity_fields_do_not_move_the_key() {
        let a = base();
        let mut b = base();
        b.line_ids = None;
        b.citation_number = Some(9);
        b.reasoning = None;
        assert_eq!(citation_key(&a), citation_key(&b));
    }

    #[test]
    fn identity_fields_move_the_key() {
        let a = base();
        let mut b = base();
        b.full_phrase = "a different phrase".to_string();
        assert_ne!(citation_key(&a), citation_key(&b));

        let mut c = base();
        c.page_number = Some(5);
        assert_ne!(citation_key(&a), citation_key(&c));
    }

    #[test]
    fn embedded_separators_cannot_alias_fields() {
        let mut a = base();
        a.full_phrase = "x|1:y".to_string();
        a.key_span = None;
        let mut b = base();
        b.full_phrase = "x".to_string();
        b.key_span = Some("y".to_string());
        assert_ne!(citation_key(&a), citation_key(&b));
    }
}
