//! Article form validation.
//!
//! Lengths are counted in Unicode scalar values, so `"标题长"` is three
//! characters long even though it is nine bytes.

use std::collections::BTreeMap;

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 40;
pub const BODY_MIN: usize = 10;

/// Field name to message. Empty means the submission is valid.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

/// Checks a title and body independently; both may fail at once.
pub fn validate(title: &str, body: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if title.is_empty() {
        errors.insert("title", "title required");
    } else if !(TITLE_MIN..=TITLE_MAX).contains(&title.chars().count()) {
        errors.insert("title", "title length must be between 3 and 40");
    }

    if body.is_empty() {
        errors.insert("body", "body required");
    } else if body.chars().count() < BODY_MIN {
        errors.insert("body", "body length must be at least 10");
    }

    errors
}
