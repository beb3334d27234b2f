//! Style label to heading level mapping.
//!
//! Word style names are free-form, so headings are recognised by the words
//! "title" and "heading" anywhere in the name, case-insensitively:
//!
//! | label                         | level |
//! |-------------------------------|-------|
//! | absent or empty               | none  |
//! | contains `title`              | 1     |
//! | `heading N` / `headingN`, N 1-9 | min(N, 6) |
//! | contains `heading`, no digit  | 2     |
//! | anything else                 | none  |
//!
//! The title rule is a plain substring test, so "Subtitle" and "Book Title"
//! are level 1 as well.

use crate::model::HeadingLevel;

/// Level used for "heading" styles that carry no number.
const UNNUMBERED_HEADING: u8 = 2;

/// Classify a paragraph style label.
///
/// # Example
///
/// ```
/// use docdown::render::classify_style;
/// use docdown::HeadingLevel;
///
/// assert_eq!(classify_style(Some("Heading 3")), HeadingLevel::H3);
/// assert_eq!(classify_style(Some("Subtitle")), HeadingLevel::H1);
/// assert_eq!(classify_style(Some("Normal")), HeadingLevel::None);
/// assert_eq!(classify_style(None), HeadingLevel::None);
/// ```
pub fn classify_style(label: Option<&str>) -> HeadingLevel {
    let Some(label) = label.filter(|l| !l.is_empty()) else {
        return HeadingLevel::None;
    };
    let name = label.to_lowercase();

    if name.contains("title") {
        return HeadingLevel::H1;
    }
    if let Some(n) = heading_number(&name) {
        return HeadingLevel::from_number(n.min(6));
    }
    if name.contains("heading") {
        return HeadingLevel::from_number(UNNUMBERED_HEADING);
    }
    HeadingLevel::None
}

/// Find the digit following "heading" in a lowercased name.
///
/// Whitespace between the word and the digit is ignored. Only one digit is
/// read, so "heading 12" is level 1. With several matches the smallest wins.
fn heading_number(name: &str) -> Option<u8> {
    name.match_indices("heading")
        .filter_map(|(start, word)| {
            name[start + word.len()..]
                .trim_start()
                .chars()
                .next()?
                .to_digit(10)
        })
        .filter(|d| (1..=9).contains(d))
        .min()
        .map(|d| d as u8)
}
