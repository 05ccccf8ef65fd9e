use crate::domain::{CitationStatus, Verification};

/// Single display tier derived from the status flags. Partial is checked
/// before plain verified, so `partial_text_found` never renders as a full
/// match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTier {
    Partial,
    Verified,
    Miss,
    Pending,
    Skipped,
}

const PENDING: CitationStatus = CitationStatus {
    is_verified: false,
    is_partial_match: false,
    is_miss: false,
    is_pending: true,
};

const NEUTRAL: CitationStatus = CitationStatus {
    is_verified: false,
    is_partial_match: false,
    is_miss: false,
    is_pending: false,
};

/// Map a raw verification status token to semantic flags.
///
/// Pure and total: `None` (the backend has not reported) classifies as
/// pending, as do the literal `pending`/`loading`/`null`/`undefined` tokens
/// some backends emit. Unrecognized tokens classify like `skipped` — no flag
/// set — rather than failing.
pub fn classify_status(raw: Option<&str>) -> CitationStatus {
    let token = match raw {
        Some(t) => t.trim(),
        None => return PENDING,
    };
    match token {
        "found" | "found_phrase_missed_anchor_text" => CitationStatus {
            is_verified: true,
            is_partial_match: false,
            is_miss: false,
            is_pending: false,
        },
        "found_anchor_text_only"
        | "found_on_other_page"
        | "found_on_other_line"
        | "partial_text_found"
        | "first_word_found" => CitationStatus {
            is_verified: true,
            is_partial_match: true,
            is_miss: false,
            is_pending: false,
        },
        "not_found" => CitationStatus {
            is_verified: false,
            is_partial_match: false,
            is_miss: true,
            is_pending: false,
        },
        "pending" | "loading" | "null" | "undefined" | "" => PENDING,
        _ => NEUTRAL,
    }
}

impl CitationStatus {
    /// Classify directly from a verification record.
    pub fn of(verification: &Verification) -> CitationStatus {
        classify_status(verification.status.as_deref())
    }

    pub fn display_tier(&self) -> DisplayTier {
        if self.is_partial_match {
            DisplayTier::Partial
        } else if self.is_verified {
            DisplayTier::Verified
        } else if self.is_miss {
            DisplayTier::Miss
        } else if self.is_pending {
            DisplayTier::Pending
        } else {
            DisplayTier::Skipped
        }
    }
}
