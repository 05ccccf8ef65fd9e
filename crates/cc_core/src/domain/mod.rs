use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical citation representation produced by extraction.
///
/// Notes:
/// - `full_phrase` is the only required field; a fragment with no phrase is
///   dropped during normalization, so a constructed `Citation` always has
///   non-empty core content.
/// - Source identity is `attachment_id` or `url`; location is
///   `page_number`/`start_page_key` for paginated sources or `timestamps`
///   for time-based media. `line_ids` is ascending and deduplicated when
///   present.
/// - `reasoning` and `citation_number` are carried for consumers but are not
///   identity-bearing; they do not participate in key generation.
/// - Immutable once constructed: extraction builds the value and stores it in
///   a `CitationMap`; nothing mutates it afterward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citation {
    pub attachment_id: Option<String>,
    pub url: Option<String>,
    pub full_phrase: String,
    pub key_span: Option<String>,
    pub page_number: Option<i64>,
    pub start_page_key: Option<PageKey>,
    pub timestamps: Option<Timestamps>,
    pub line_ids: Option<Vec<u64>>,
    pub citation_number: Option<u32>,
    pub reasoning: Option<String>,
}

/// Page/sub-index pair extracted from a `page_number_<N>_index_<I>` token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageKey {
    pub page_number: i64,
    pub index: i64,
}

/// Start/end offsets for time-based media, carried as canonical decimal
/// strings (the upstream generator emits both numbers and numeric strings).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timestamps {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Citation key -> Citation. Built once per extraction call and replaced
/// wholesale, never mutated field-by-field. Ordered map so iteration order is
/// deterministic for byte-identical input.
pub type CitationMap = BTreeMap<String, Citation>;

/// Externally produced verification record, joined to a `Citation` by the
/// same key. Opaque input to the status classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Verification {
    /// Raw status token; `None` means the backend has not reported yet.
    pub status: Option<String>,
    pub verified_match_snippet: Option<String>,
    pub verified_page_number: Option<i64>,
    pub verified_line_ids: Option<Vec<u64>>,
    pub proof_image_ref: Option<String>,
}

pub type VerificationMap = BTreeMap<String, Verification>;

/// Semantic flags derived from a raw verification status token. Computed
/// fresh on every read, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CitationStatus {
    pub is_verified: bool,
    pub is_partial_match: bool,
    pub is_miss: bool,
    pub is_pending: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionWarning {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl ExtractionWarning {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Output of the extraction entry point.
///
/// `visible_text` is the only content safe to display and is always present,
/// even when citation parsing failed entirely. Warnings explain excluded or
/// degraded citations; end users never see them except as a reduced citation
/// count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionResult {
    pub visible_text: String,
    pub citations: CitationMap,
    pub warnings: Vec<ExtractionWarning>,
}
