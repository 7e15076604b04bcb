//! Indentation post-processing
//!
//! Re-indents a rendered block by a caller-specified nesting depth, used
//! when a parent type's template embeds a nested type's output. The nested
//! template itself stays unaware of its embedding depth.

/// Indent unit prepended once per depth level
pub const INDENT_UNIT: &str = "    ";

/// Prefix every line of `text` with `depth` indent units
///
/// Line endings are preserved; depth 0 returns the text unchanged.
pub fn reindent(text: &str, depth: usize) -> String {
    if depth == 0 {
        return text.to_string();
    }
    let prefix = INDENT_UNIT.repeat(depth);
    let mut out = String::with_capacity(text.len() + prefix.len() * text.lines().count());
    for line in text.split_inclusive('\n') {
        out.push_str(&prefix);
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reindent_two_levels() {
        assert_eq!(reindent("a\nb\n", 2), "        a\n        b\n");
    }

    #[test]
    fn test_depth_zero_is_identity() {
        let text = "a\n  b\n";
        assert_eq!(reindent(text, 0), text);
    }

    #[test]
    fn test_last_line_without_newline() {
        assert_eq!(reindent("a\nb", 1), "    a\n    b");
    }

    #[test]
    fn test_preserves_crlf_endings() {
        assert_eq!(reindent("a\r\nb\r\n", 1), "    a\r\n    b\r\n");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(reindent("", 3), "");
    }
}
