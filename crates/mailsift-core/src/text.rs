//! Free-text sanitization for tabular output.

/// Replace every carriage-return, line-feed, and horizontal-tab character
/// with a single space.
///
/// This is the only normalization applied before rows are serialized:
/// consecutive spaces survive, nothing is trimmed or collapsed. One pass
/// leaves no control characters behind, so applying it twice is a no-op.
pub fn clean_text(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\r' | '\n' | '\t' => ' ',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_each_control_char_with_one_space() {
        assert_eq!(clean_text("Bob\tSmith\nCorp"), "Bob Smith Corp");
    }

    #[test]
    fn test_crlf_becomes_two_spaces() {
        assert_eq!(clean_text("a\r\nb"), "a  b");
    }

    #[test]
    fn test_clean_input_untouched() {
        assert_eq!(clean_text("plain sender <a@b.example>"), "plain sender <a@b.example>");
    }

    #[test]
    fn test_consecutive_spaces_preserved() {
        assert_eq!(clean_text("a  b"), "a  b");
    }

    #[test]
    fn test_no_trimming() {
        assert_eq!(clean_text("  padded  "), "  padded  ");
    }

    #[test]
    fn test_idempotent() {
        let once = clean_text("x\ty\r\nz");
        assert_eq!(clean_text(&once), once);
    }

    #[test]
    fn test_output_has_no_control_chars() {
        let out = clean_text("a\tb\rc\nd\te");
        assert!(!out.contains('\t'));
        assert!(!out.contains('\r'));
        assert!(!out.contains('\n'));
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(clean_text(""), "");
    }
}
