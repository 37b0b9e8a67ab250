//! Display Map - the coordinate bridge between document text and screen pixels
//!
//! The outline core never touches the host editor directly. Everything it needs
//! is expressed through the traits in this module:
//!
//! - **LineSource**: line-oriented read access to the document text
//! - **CoordinateBridge**: `(line, ch)` positions <-> linear char offsets, plus
//!   the optional zoom range that restricts where connectors may appear
//! - **LayoutView**: what the viewport currently shows and where each line sits
//!   in pixels
//!
//! Positions and offsets are expected to be valid. Out-of-range input is a
//! programming error and panics; callers clamp against the viewport first.
//!
//! ## Usage
//!
//! ```ignore
//! let offset = doc.pos_to_offset(Position::new(3, 2));
//! let block = doc.line_block_at(offset);
//! ```

mod point;
mod fold_map;
mod tab_map;

pub use point::*;
pub use fold_map::*;
pub use tab_map::*;

use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;

/// Line-oriented read access to document text
pub trait LineSource {
    /// Number of lines in the document
    fn line_count(&self) -> usize;

    /// Text of `line` without its line terminator
    fn line_text(&self, line: usize) -> Cow<'_, str>;
}

/// Converts between `(line, ch)` positions and char offsets
pub trait CoordinateBridge {
    /// Position of a char offset
    fn offset_to_pos(&self, offset: usize) -> Position;

    /// Char offset of a position
    fn pos_to_offset(&self, pos: Position) -> usize;

    /// Currently focused sub-range, if the host is zoomed into a subtree
    fn zoom_range(&self) -> Option<ZoomRange>;

    /// Offset of the first char of `line`
    fn line_start_offset(&self, line: usize) -> usize {
        self.pos_to_offset(Position::new(line, 0))
    }

    /// Offset just past the last char of `line`, before its terminator
    fn line_end_offset(&self, line: usize) -> usize;
}

/// What the host viewport shows and how lines are laid out
pub trait LayoutView: CoordinateBridge {
    /// Visible document ranges as char offsets, top to bottom
    ///
    /// Empty when there is no viewport.
    fn visible_ranges(&self) -> Vec<Range<usize>>;

    /// Vertical pixel window of the viewport (document-relative)
    fn viewport_pixels(&self) -> PixelRange;

    /// Pixel block of the line containing `offset`
    fn line_block_at(&self, offset: usize) -> LineBlock;

    /// Configured tab width in columns
    fn tab_width(&self) -> usize;

    /// Whether the active theme can host the guide overlay
    fn supports_overlay(&self) -> bool {
        true
    }
}

/// Length of a rope line in chars, excluding `\n` / `\r\n`
pub(crate) fn rope_line_len(rope: &Rope, line: usize) -> usize {
    let slice = rope.line(line);
    let mut len = slice.len_chars();
    if len > 0 && slice.char(len - 1) == '\n' {
        len -= 1;
        if len > 0 && slice.char(len - 1) == '\r' {
            len -= 1;
        }
    }
    len
}

impl LineSource for Rope {
    fn line_count(&self) -> usize {
        self.len_lines()
    }

    fn line_text(&self, line: usize) -> Cow<'_, str> {
        let slice = self.line(line);
        let text: Cow<'_, str> = slice.into();
        match text {
            Cow::Borrowed(s) => Cow::Borrowed(s.trim_end_matches(|c| c == '\n' || c == '\r')),
            Cow::Owned(s) => Cow::Owned(s.trim_end_matches(|c| c == '\n' || c == '\r').to_string()),
        }
    }
}

impl CoordinateBridge for Rope {
    fn offset_to_pos(&self, offset: usize) -> Position {
        let line = self.char_to_line(offset);
        Position::new(line, offset - self.line_to_char(line))
    }

    fn pos_to_offset(&self, pos: Position) -> usize {
        let line_len = rope_line_len(self, pos.line);
        assert!(
            pos.ch <= line_len,
            "column {} out of range for line {} (len {})",
            pos.ch,
            pos.line,
            line_len
        );
        self.line_to_char(pos.line) + pos.ch
    }

    fn zoom_range(&self) -> Option<ZoomRange> {
        None
    }

    fn line_end_offset(&self, line: usize) -> usize {
        self.line_to_char(line) + rope_line_len(self, line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rope_line_text_strips_terminators() {
        let rope = Rope::from_str("- a\r\n  - b\n- c");
        assert_eq!(rope.line_text(0), "- a");
        assert_eq!(rope.line_text(1), "  - b");
        assert_eq!(rope.line_text(2), "- c");
    }

    #[test]
    fn test_offset_pos_conversion() {
        let rope = Rope::from_str("- a\n  - b\n- c\n");
        assert_eq!(rope.offset_to_pos(0), Position::new(0, 0));
        assert_eq!(rope.offset_to_pos(4), Position::new(1, 0));
        assert_eq!(rope.offset_to_pos(8), Position::new(1, 4));

        assert_eq!(rope.pos_to_offset(Position::new(1, 4)), 8);
        assert_eq!(rope.line_start_offset(2), 10);
        assert_eq!(rope.line_end_offset(1), 9);
    }

    #[test]
    fn test_multibyte_columns_are_chars() {
        let rope = Rope::from_str("- é\n- ü");
        assert_eq!(rope.line_end_offset(0), 3);
        assert_eq!(rope.pos_to_offset(Position::new(1, 2)), 6);
        assert_eq!(rope.offset_to_pos(6), Position::new(1, 2));
    }

    #[test]
    #[should_panic]
    fn test_pos_past_line_end_panics() {
        let rope = Rope::from_str("- a\n- b");
        rope.pos_to_offset(Position::new(0, 10));
    }

    #[test]
    fn test_rope_has_no_zoom() {
        assert!(Rope::from_str("- a").zoom_range().is_none());
    }
}
