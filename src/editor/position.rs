//! Cursor offset to line/column conversion
//!
//! The editing surface only reports a flat character offset; turning that into
//! a line and column for the status line is done here.

// ─────────────────────────────────────────────────────────────────────────────
// CursorPosition
// ─────────────────────────────────────────────────────────────────────────────

/// A cursor location as (line, column), both 0-indexed.
///
/// Columns count characters, not bytes. The status presenter adds one to each
/// when rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct CursorPosition {
    pub line: usize,
    pub column: usize,
}

impl CursorPosition {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helper Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Convert a character offset into a line/column position.
///
/// Offsets past the end of the text are clamped to the end.
pub fn offset_to_position(text: &str, offset: usize) -> CursorPosition {
    let mut position = CursorPosition::default();
    for ch in text.chars().take(offset) {
        if ch == '\n' {
            position.line += 1;
            position.column = 0;
        } else {
            position.column += 1;
        }
    }
    position
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_zero_is_origin() {
        assert_eq!(offset_to_position("{\n  \"a\": 1\n}", 0), CursorPosition::new(0, 0));
        assert_eq!(offset_to_position("", 0), CursorPosition::new(0, 0));
    }

    #[test]
    fn test_offset_within_second_line() {
        let text = "{\n  \"a\": 1\n}";
        // '{' '\n' ' ' ' ' -> line 1, column 2
        assert_eq!(offset_to_position(text, 4), CursorPosition::new(1, 2));
    }

    #[test]
    fn test_offset_right_after_newline() {
        assert_eq!(offset_to_position("ab\ncd", 3), CursorPosition::new(1, 0));
    }

    #[test]
    fn test_offset_counts_characters_not_bytes() {
        let text = "héllo\nwörld";
        assert_eq!(offset_to_position(text, 5), CursorPosition::new(0, 5));
        assert_eq!(offset_to_position(text, 8), CursorPosition::new(1, 2));
    }

    #[test]
    fn test_offset_past_end_is_clamped() {
        assert_eq!(offset_to_position("ab\nc", 100), CursorPosition::new(1, 1));
    }
}
