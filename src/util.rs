// Small text helpers shared by the loader and console output.
use num_format::{Locale, ToFormattedString};

/// `Some(s)` only when the cell holds non-whitespace text.
pub fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

/// Remove control characters, keeping tab and both line-break characters so
/// row structure survives until newlines are normalised.
pub fn strip_control_chars(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages, e.g. `10,000 reports`.
    n.to_formatted_string(&Locale::en)
}
