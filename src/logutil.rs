//! Helpers for keeping player input on one log line.

/// Longest preview of a single input kept in the log.
pub const MAX_INPUT_PREVIEW: usize = 120;

/// Escape player input for single-line logging. Backslashes and control
/// characters are escaped; anything past [`MAX_INPUT_PREVIEW`] characters is
/// cut with an ellipsis.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_INPUT_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_INPUT_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pasted_multiline_input_stays_on_one_line() {
        assert_eq!(escape_log("look\nbuy torch\r\t"), "look\\nbuy torch\\r\\t");
        assert_eq!(escape_log("\u{1b}[2J"), "\\x1B[2J");
    }

    #[test]
    fn long_input_is_truncated() {
        let long = "a".repeat(MAX_INPUT_PREVIEW + 50);
        let esc = escape_log(&long);
        assert_eq!(esc.chars().count(), MAX_INPUT_PREVIEW + 1);
        assert!(esc.ends_with('…'));
    }
}
