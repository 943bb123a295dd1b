//! Payload normalization for the `exc` command.
//!
//! Owners usually paste code inside a Discord code fence. A fenced payload
//! loses its first line (the fence plus the language hint) and its last line
//! (the closing fence); anything else only loses surrounding backticks,
//! spaces and newlines.

const FENCE: &str = "```";

/// Strips a Discord code fence (or stray inline backticks) from `payload`.
pub fn normalize(payload: &str) -> String {
    if payload.starts_with(FENCE) && payload.ends_with(FENCE) {
        let lines: Vec<&str> = payload.split('\n').collect();
        if lines.len() < 2 {
            return String::new();
        }
        return lines[1..lines.len() - 1].join("\n");
    }

    payload
        .trim_matches(|c| matches!(c, '`' | ' ' | '\n'))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_payload_drops_fence_lines() {
        for lang in ["py", "python", "", "rust"] {
            let payload = format!("```{}\nx = 1\nprint(x)\n```", lang);
            assert_eq!(normalize(&payload), "x = 1\nprint(x)");
        }
    }

    #[test]
    fn test_fenced_payload_keeps_inner_whitespace() {
        let payload = "```py\n  indented\n\n```";
        assert_eq!(normalize(payload), "  indented\n");
    }

    #[test]
    fn test_single_line_fence_is_empty() {
        assert_eq!(normalize("```print(1)```"), "");
    }

    #[test]
    fn test_inline_backticks_are_stripped() {
        assert_eq!(normalize("`print(1+1)`"), "print(1+1)");
        assert_eq!(normalize(" \n`` return 5 ``\n "), "return 5");
    }

    #[test]
    fn test_plain_payload_is_untouched_inside() {
        assert_eq!(normalize("a = 'x`y'\nprint(a)"), "a = 'x`y'\nprint(a)");
    }

    #[test]
    fn test_tabs_are_not_stripped() {
        assert_eq!(normalize("\tpass\t"), "\tpass\t");
    }
}
