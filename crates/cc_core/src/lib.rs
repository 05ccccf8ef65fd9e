pub mod block;
pub mod decode;
pub mod domain;
pub mod error;
pub mod extract;
pub mod interpret;
pub mod keys;
pub mod normalize;
pub mod scan;
pub mod status;

pub use domain::{Citation, CitationMap, CitationStatus, ExtractionResult, Verification};
pub use extract::extract_citations;
pub use status::classify_status;

#[cfg(test)]
mod tests {
    use super::extract_citations;

    #[test]
    fn extraction_never_fails_on_trivial_input() {
        let result = extract_citations("");
        assert!(result.citations.is_empty());
        assert_eq!(result.visible_text, "");

        let result = extract_citations("plain text without any citations");
        assert!(result.citations.is_empty());
    }
}
