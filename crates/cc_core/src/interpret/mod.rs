pub mod line_ranges;
pub mod page_key;
