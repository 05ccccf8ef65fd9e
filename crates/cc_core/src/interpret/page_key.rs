use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::PageKey;

static PAGE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"page_number_([0-9]{1,12})_index_([0-9]{1,12})").expect("page key pattern"));

/// Extract the page/sub-index pair from a `page_number_<N>_index_<I>` token.
///
/// Upstream markdown escaping can leave backslashes scattered through the
/// token (`page\_number\_3\_index\_0`), so those are stripped before
/// matching. Returns `None` for anything unparsable; never fails.
pub fn interpret_page_key(raw: &str) -> Option<PageKey> {
    let cleaned: String = raw.chars().filter(|c| *c != '\\').collect();
    let caps = PAGE_KEY_RE.captures(&cleaned)?;
    let page_number: i64 = caps.get(1)?.as_str().parse().ok()?;
    let index: i64 = caps.get(2)?.as_str().parse().ok()?;
    Some(PageKey { page_number, index })
}
