//! Rules for combining the stored content with new text.
//!
//! Kept free of I/O so the store and the HTTP layer validate input the
//! same way.

/// Separator placed between existing content and an appended sentence.
pub const SEPARATOR: &str = " ";

/// Trim an incoming sentence, returning `None` if nothing is left.
pub fn trim_addition(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Join an already-trimmed addition onto the current content.
///
/// Empty content takes the addition as-is, so the result never starts
/// with a separator.
pub fn join_content(current: &str, addition: &str) -> String {
    if current.is_empty() {
        addition.to_string()
    } else {
        let mut joined = String::with_capacity(current.len() + SEPARATOR.len() + addition.len());
        joined.push_str(current);
        joined.push_str(SEPARATOR);
        joined.push_str(addition);
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_addition_strips_whitespace() {
        assert_eq!(trim_addition("  world \n"), Some("world"));
        assert_eq!(trim_addition("a b"), Some("a b"));
    }

    #[test]
    fn test_trim_addition_rejects_blank() {
        assert_eq!(trim_addition(""), None);
        assert_eq!(trim_addition("   "), None);
        assert_eq!(trim_addition("\t\n"), None);
    }

    #[test]
    fn test_join_on_empty_has_no_separator() {
        assert_eq!(join_content("", "hello"), "hello");
    }

    #[test]
    fn test_join_uses_single_space() {
        assert_eq!(join_content("hello", "world"), "hello world");
        // Existing trailing whitespace is left alone; only the addition is trimmed.
        assert_eq!(join_content("hello ", "world"), "hello  world");
    }
}
