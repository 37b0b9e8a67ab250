//! Point and range types shared by the outline model and the geometry engine

use serde::{Deserialize, Serialize};

/// A (line, column) position in the document
///
/// Both fields are 0-indexed. `ch` is counted in chars, matching ropey's
/// char indexing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

impl Position {
    pub const ZERO: Position = Position { line: 0, ch: 0 };

    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// An inclusive range of document lines
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LineRange {
    /// First line (0-indexed)
    pub start: usize,
    /// Last line (0-indexed, inclusive)
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "line range {start}..={end} is inverted");
        Self { start, end }
    }

    /// A range covering exactly one line
    pub fn single(line: usize) -> Self {
        Self { start: line, end: line }
    }

    /// Whether `other` lies entirely inside this range
    pub fn contains(&self, other: &LineRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    pub fn line_count(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Focused sub-range of the document
///
/// When the host is zoomed into a subtree, connectors are only produced for
/// content between `from` and `to` (both inclusive).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoomRange {
    pub from: Position,
    pub to: Position,
}

impl ZoomRange {
    pub fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos >= self.from && pos <= self.to
    }
}

/// Vertical pixel extent of one laid-out line
///
/// Document-relative: `top` of the first line is the top margin, not
/// the scroll position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineBlock {
    pub top: f32,
    pub bottom: f32,
}

impl LineBlock {
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Vertical pixel window currently shown by the viewport (document-relative)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelRange {
    pub top: f32,
    pub bottom: f32,
}

impl PixelRange {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }

    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }

    pub fn clamp(&self, y: f32) -> f32 {
        y.clamp(self.top, self.bottom.max(self.top))
    }
}
