//! Pull structured inputs out of a violation's free-text fields

pub mod locator;
pub mod search_text;

pub use locator::{parse_locator, Locator};
pub use search_text::{is_valid_search_text, search_text_for};
