//! Document state shared by the outline systems
//!
//! `OutlineDocument` is the in-process host surface: it owns the text, the
//! fold regions, the zoom range and the scroll/viewport geometry, and exposes
//! them through the `display_map` and `interaction` traits. Applications that
//! already have their own editor can implement those traits instead.

use bevy::prelude::*;
use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;

use crate::display_map::{
    rope_line_len, CoordinateBridge, FoldMap, LayoutView, LineBlock, LineRange, LineSource,
    PixelRange, Position, ZoomRange,
};
use crate::interaction::OutlineCommands;
use crate::outline::Outline;

/// A folded (or foldable) range of lines
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FoldRegion {
    /// Head line of the region, stays visible when folded (0-indexed)
    pub start_line: usize,
    /// Last line of the region (0-indexed, inclusive)
    pub end_line: usize,
    /// Whether this region is currently folded
    pub is_folded: bool,
}

impl FoldRegion {
    pub fn new(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line,
            is_folded: false,
        }
    }

    /// Get the number of hidden lines when folded
    pub fn hidden_line_count(&self) -> usize {
        if self.is_folded {
            self.end_line.saturating_sub(self.start_line)
        } else {
            0
        }
    }
}

/// All fold regions of a document, sorted by start line
#[derive(Clone, Debug, Default)]
pub struct FoldState {
    pub regions: Vec<FoldRegion>,
}

impl FoldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// Fold `range`, creating the region if needed
    ///
    /// Returns `true` if the fold state changed. A single-line range has
    /// nothing to hide and is ignored.
    pub fn fold(&mut self, range: LineRange) -> bool {
        if range.start == range.end {
            return false;
        }
        match self.regions.iter_mut().find(|r| r.start_line == range.start) {
            Some(region) => {
                let changed = !region.is_folded || region.end_line != range.end;
                region.end_line = range.end;
                region.is_folded = true;
                changed
            }
            None => {
                let pos = self
                    .regions
                    .iter()
                    .position(|r| r.start_line > range.start)
                    .unwrap_or(self.regions.len());
                let mut region = FoldRegion::new(range.start, range.end);
                region.is_folded = true;
                self.regions.insert(pos, region);
                true
            }
        }
    }

    /// Unfold the region starting at `line`
    pub fn unfold(&mut self, line: usize) -> bool {
        match self.regions.iter_mut().find(|r| r.start_line == line) {
            Some(region) if region.is_folded => {
                region.is_folded = false;
                true
            }
            _ => false,
        }
    }

    /// Check if a line is the head of a folded region
    pub fn is_folded_line(&self, line: usize) -> bool {
        self.regions.iter().any(|r| r.start_line == line && r.is_folded)
    }

    /// Get total number of hidden lines, counting nested folds once
    pub fn total_hidden_lines(&self, line_count: usize) -> usize {
        line_count - FoldMap::from_regions(line_count, &self.regions).visible_row_count()
    }

    /// Move regions with the lines an edit shifted
    pub fn apply_line_edit(&mut self, edit: &LineEdit) {
        self.regions.retain_mut(|region| match edit.map_head(region.start_line) {
            Some(start) => {
                region.end_line = edit.map_end(region.end_line);
                region.start_line = start;
                region.end_line > start
            }
            None => false,
        });
        self.regions.dedup_by_key(|region| region.start_line);
    }

    /// Clamp regions to `line_count` lines, dropping any left without a body
    pub fn retain_within(&mut self, line_count: usize) {
        let last_line = line_count.saturating_sub(1);
        self.regions.retain_mut(|region| {
            region.end_line = region.end_line.min(last_line);
            region.start_line < region.end_line
        });
    }
}

/// How an edit moved whole lines
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineEdit {
    /// `count` line breaks were inserted on `line`
    Inserted {
        line: usize,
        /// The insertion point was the first char of `line`
        at_line_start: bool,
        count: usize,
    },
    /// The line breaks between `start_line` and `end_line` were removed
    Removed {
        start_line: usize,
        end_line: usize,
        /// The removed text was exactly lines `start_line..end_line`
        whole_lines: bool,
    },
}

impl LineEdit {
    /// New line of a line's first char, or `None` if that char was deleted
    pub fn map_head(&self, line: usize) -> Option<usize> {
        match *self {
            LineEdit::Inserted {
                line: edited,
                at_line_start,
                count,
            } => {
                if line > edited || (line == edited && at_line_start) {
                    Some(line + count)
                } else {
                    Some(line)
                }
            }
            LineEdit::Removed {
                start_line,
                end_line,
                whole_lines,
            } => {
                if line < start_line {
                    Some(line)
                } else if line > end_line {
                    Some(line - (end_line - start_line))
                } else if line == start_line {
                    (!whole_lines).then_some(line)
                } else if line == end_line && whole_lines {
                    Some(start_line)
                } else {
                    None
                }
            }
        }
    }

    /// New line of a line's last char
    pub fn map_end(&self, line: usize) -> usize {
        match *self {
            LineEdit::Inserted {
                line: edited,
                count,
                ..
            } => {
                if line >= edited {
                    line + count
                } else {
                    line
                }
            }
            LineEdit::Removed {
                start_line,
                end_line,
                ..
            } => {
                if line < start_line {
                    line
                } else if line > end_line {
                    line - (end_line - start_line)
                } else {
                    start_line
                }
            }
        }
    }
}

/// The document the outline guides are drawn over
#[derive(Resource, Clone, Debug)]
pub struct OutlineDocument {
    rope: Rope,
    folds: FoldState,
    fold_map: FoldMap,
    zoom: Option<ZoomRange>,

    /// Pixels scrolled from the top of the document (>= 0)
    scroll_offset: f32,

    /// Viewport height in pixels
    pub viewport_height: f32,

    /// Height of one display row in pixels
    pub line_height: f32,

    /// Space above the first line in pixels
    pub margin_top: f32,

    /// Tab width in columns
    pub tab_width: usize,

    /// Whether the active theme can show the overlay
    pub theme_supported: bool,

    /// Bumped on every text edit
    content_version: u64,

    /// Bumped on every fold or zoom change
    view_version: u64,
}

impl Default for OutlineDocument {
    fn default() -> Self {
        Self::new("")
    }
}

impl OutlineDocument {
    pub fn new(text: &str) -> Self {
        let rope = Rope::from_str(text);
        let fold_map = FoldMap::from_regions(rope.len_lines(), &[]);
        Self {
            rope,
            folds: FoldState::new(),
            fold_map,
            zoom: None,
            scroll_offset: 0.0,
            viewport_height: 600.0,
            line_height: 20.0,
            margin_top: 10.0,
            tab_width: 4,
            theme_supported: true,
            content_version: 0,
            view_version: 0,
        }
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn folds(&self) -> &FoldState {
        &self.folds
    }

    pub fn content_version(&self) -> u64 {
        self.content_version
    }

    pub fn view_version(&self) -> u64 {
        self.view_version
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// Replace the whole text
    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.after_edit();
    }

    /// Insert `text` at a char offset
    ///
    /// Folds and the zoom range move with the lines they were on.
    pub fn insert(&mut self, char_idx: usize, text: &str) {
        let line = self.rope.char_to_line(char_idx);
        let at_line_start = self.rope.line_to_char(line) == char_idx;
        let lines_before = self.rope.len_lines();
        self.rope.insert(char_idx, text);

        let count = self.rope.len_lines() - lines_before;
        if count > 0 {
            self.shift_lines(LineEdit::Inserted {
                line,
                at_line_start,
                count,
            });
        }
        self.after_edit();
    }

    /// Remove a char range
    ///
    /// Folds whose head line is deleted are dropped; the rest move with
    /// their lines.
    pub fn remove(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let start_line = self.rope.char_to_line(range.start);
        let end_line = self.rope.char_to_line(range.end);
        let whole_lines = end_line > start_line
            && self.rope.line_to_char(start_line) == range.start
            && self.rope.line_to_char(end_line) == range.end;
        self.rope.remove(range);

        if end_line > start_line {
            self.shift_lines(LineEdit::Removed {
                start_line,
                end_line,
                whole_lines,
            });
        }
        self.after_edit();
    }

    fn shift_lines(&mut self, edit: LineEdit) {
        self.folds.apply_line_edit(&edit);
        if let Some(zoom) = self.zoom {
            self.zoom = edit.map_head(zoom.from.line).map(|from_line| {
                let to_line = edit.map_end(zoom.to.line).max(from_line);
                ZoomRange::new(
                    Position::new(from_line, zoom.from.ch),
                    Position::new(to_line, zoom.to.ch),
                )
            });
            if self.zoom.is_none() {
                self.view_version += 1;
            }
        }
    }

    fn after_edit(&mut self) {
        self.content_version += 1;
        let line_count = self.rope.len_lines();
        self.folds.retain_within(line_count);
        if let Some(zoom) = self.zoom {
            let last = line_count - 1;
            if zoom.from.line > last {
                self.zoom = None;
            } else {
                let to_line = zoom.to.line.min(last);
                let to = Position::new(to_line, rope_line_len(&self.rope, to_line));
                let from_ch = zoom.from.ch.min(rope_line_len(&self.rope, zoom.from.line));
                self.zoom = Some(ZoomRange::new(Position::new(zoom.from.line, from_ch), to));
            }
        }
        self.rebuild_fold_map();
        self.scroll_to(self.scroll_offset);
    }

    fn rebuild_fold_map(&mut self) {
        self.fold_map.update(self.rope.len_lines(), &self.folds.regions);
    }

    /// Total laid-out height in pixels
    pub fn content_height(&self) -> f32 {
        self.margin_top + self.fold_map.visible_row_count() as f32 * self.line_height
    }

    /// Scroll to `offset` pixels, clamped to the scrollable range
    pub fn scroll_to(&mut self, offset: f32) {
        let max_scroll = (self.content_height() - self.viewport_height).max(0.0);
        self.scroll_offset = offset.clamp(0.0, max_scroll);
    }

    pub fn scroll_by(&mut self, delta: f32) {
        self.scroll_to(self.scroll_offset + delta);
    }

    /// Leave the zoomed view
    pub fn zoom_out(&mut self) {
        if self.zoom.take().is_some() {
            self.view_version += 1;
        }
    }

    /// Set the zoom range directly
    pub fn set_zoom_range(&mut self, zoom: Option<ZoomRange>) {
        self.zoom = zoom;
        self.view_version += 1;
    }

    /// Visible rows as an inclusive `(first, last)` pair
    fn visible_rows(&self) -> Option<(usize, usize)> {
        let row_count = self.fold_map.visible_row_count();
        if self.viewport_height <= 0.0 || self.line_height <= 0.0 || row_count == 0 {
            return None;
        }

        let top = self.scroll_offset - self.margin_top;
        let bottom = top + self.viewport_height;
        let first = (top / self.line_height).floor().max(0.0) as usize;
        let last = ((bottom / self.line_height).ceil() as usize)
            .saturating_sub(1)
            .min(row_count - 1);
        (bottom > 0.0 && first <= last).then_some((first, last))
    }
}

impl LineSource for OutlineDocument {
    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_text(&self, line: usize) -> Cow<'_, str> {
        self.rope.line_text(line)
    }
}

impl CoordinateBridge for OutlineDocument {
    fn offset_to_pos(&self, offset: usize) -> Position {
        self.rope.offset_to_pos(offset)
    }

    fn pos_to_offset(&self, pos: Position) -> usize {
        self.rope.pos_to_offset(pos)
    }

    fn zoom_range(&self) -> Option<ZoomRange> {
        self.zoom
    }

    fn line_end_offset(&self, line: usize) -> usize {
        self.rope.line_end_offset(line)
    }
}

impl LayoutView for OutlineDocument {
    fn visible_ranges(&self) -> Vec<Range<usize>> {
        let Some((first_row, last_row)) = self.visible_rows() else {
            return Vec::new();
        };

        let first_line = self.fold_map.row_to_line(first_row);
        let mut last_line = self.fold_map.row_to_line(last_row);
        // A folded head on the last row drags its hidden lines into view
        if let Some(region) = self
            .folds
            .regions
            .iter()
            .find(|r| r.start_line == last_line && r.is_folded)
        {
            last_line = region.end_line;
        }

        vec![self.line_start_offset(first_line)..self.line_end_offset(last_line)]
    }

    fn viewport_pixels(&self) -> PixelRange {
        PixelRange::new(self.scroll_offset, self.scroll_offset + self.viewport_height.max(0.0))
    }

    fn line_block_at(&self, offset: usize) -> LineBlock {
        let line = self.rope.char_to_line(offset);
        let row = self.fold_map.line_to_row(line);
        let top = self.margin_top + row as f32 * self.line_height;
        LineBlock {
            top,
            bottom: top + self.line_height,
        }
    }

    fn tab_width(&self) -> usize {
        self.tab_width
    }

    fn supports_overlay(&self) -> bool {
        self.theme_supported
    }
}

impl OutlineCommands for OutlineDocument {
    fn is_folded(&self, line: usize) -> bool {
        self.folds.is_folded_line(line)
    }

    fn fold(&mut self, range: LineRange) {
        if self.folds.fold(range) {
            self.rebuild_fold_map();
            self.view_version += 1;
            self.scroll_to(self.scroll_offset);
        }
    }

    fn unfold(&mut self, line: usize) {
        if self.folds.unfold(line) {
            self.rebuild_fold_map();
            self.view_version += 1;
        }
    }

    fn zoom_in(&mut self, line: usize) {
        let folds = &self.folds;
        let outline = match Outline::parse_range_with_tab_width(
            &self.rope,
            line,
            line,
            self.tab_width,
            |l| folds.is_folded_line(l),
        ) {
            Ok(outline) => outline,
            Err(err) => {
                warn!("cannot zoom into line {}: {}", line, err);
                return;
            }
        };
        let Some(id) = outline.item_at_line(line) else {
            debug!("line {} is not a list item, zoom ignored", line);
            return;
        };

        let item = outline.item(id);
        let end_line = item.range().end;
        self.zoom = Some(ZoomRange::new(
            item.first_line_content_start(),
            Position::new(end_line, rope_line_len(&self.rope, end_line)),
        ));
        self.view_version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "- a\n  - b\n  - c\n- d";

    fn doc() -> OutlineDocument {
        let mut doc = OutlineDocument::new(DOC);
        doc.line_height = 20.0;
        doc.margin_top = 0.0;
        doc.viewport_height = 400.0;
        doc
    }

    #[test]
    fn test_fold_state_fold_and_unfold() {
        let mut folds = FoldState::new();
        assert!(folds.fold(LineRange::new(3, 5)));
        assert!(folds.fold(LineRange::new(0, 2)));
        assert!(!folds.fold(LineRange::new(0, 2)));
        assert_eq!(folds.regions[0].start_line, 0);

        assert!(folds.is_folded_line(3));
        assert!(!folds.is_folded_line(4));
        assert!(!folds.fold(LineRange::single(7)));
        assert!(!folds.is_folded_line(7));

        assert!(folds.unfold(3));
        assert!(!folds.unfold(3));
        assert!(!folds.is_folded_line(3));
        assert_eq!(folds.total_hidden_lines(10), 2);
    }

    #[test]
    fn test_line_blocks_follow_folds() {
        let mut doc = doc();
        let d = doc.line_start_offset(3);
        assert_eq!(doc.line_block_at(d), LineBlock { top: 60.0, bottom: 80.0 });

        doc.fold(LineRange::new(0, 2));
        assert_eq!(doc.line_block_at(d), LineBlock { top: 20.0, bottom: 40.0 });
        // Hidden line collapses onto its fold head
        let b = doc.line_start_offset(1);
        assert_eq!(doc.line_block_at(b), LineBlock { top: 0.0, bottom: 20.0 });
    }

    #[test]
    fn test_visible_ranges_whole_document() {
        let doc = doc();
        assert_eq!(doc.visible_ranges(), vec![0..doc.rope().len_chars()]);
        assert_eq!(doc.viewport_pixels(), PixelRange::new(0.0, 400.0));
    }

    #[test]
    fn test_visible_ranges_scrolled() {
        let text: String = (0..100).map(|i| format!("- item {i}\n")).collect();
        let mut doc = OutlineDocument::new(&text);
        doc.line_height = 10.0;
        doc.margin_top = 0.0;
        doc.viewport_height = 50.0;
        doc.scroll_to(200.0);

        let ranges = doc.visible_ranges();
        assert_eq!(ranges.len(), 1);
        assert_eq!(doc.offset_to_pos(ranges[0].start).line, 20);
        assert_eq!(doc.offset_to_pos(ranges[0].end).line, 24);
    }

    #[test]
    fn test_no_viewport_has_no_visible_ranges() {
        let mut doc = doc();
        doc.viewport_height = 0.0;
        assert!(doc.visible_ranges().is_empty());
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut doc = doc();
        doc.viewport_height = 40.0;
        doc.scroll_to(1000.0);
        assert_eq!(doc.scroll_offset(), 40.0);
        doc.scroll_by(-500.0);
        assert_eq!(doc.scroll_offset(), 0.0);
    }

    #[test]
    fn test_zoom_in_targets_item_subtree() {
        let mut doc = doc();
        doc.zoom_in(0);
        assert_eq!(
            doc.zoom_range(),
            Some(ZoomRange::new(Position::new(0, 2), Position::new(2, 5)))
        );

        doc.zoom_out();
        assert!(doc.zoom_range().is_none());

        // Not a list item
        let mut prose = OutlineDocument::new("prose\n- a");
        prose.zoom_in(0);
        assert!(prose.zoom_range().is_none());
    }

    fn folded_lines(doc: &OutlineDocument) -> Vec<usize> {
        (0..doc.line_count()).filter(|&l| doc.is_folded(l)).collect()
    }

    #[test]
    fn test_insert_above_fold_moves_it() {
        let mut doc = OutlineDocument::new("- a\n  - b\n- c\n  - d");
        doc.fold(LineRange::new(0, 1));
        doc.insert(0, "- z\n");

        assert_eq!(folded_lines(&doc), vec![1]);
        assert_eq!(doc.folds().regions[0].end_line, 2);

        let connectors =
            crate::scheduler::recompute(&doc, &crate::settings::OutlinerSettings::default())
                .unwrap();
        let heads: Vec<usize> = connectors.iter().map(|c| c.head_line).collect();
        assert_eq!(heads, vec![3]);
    }

    #[test]
    fn test_insert_inside_fold_head_extends_it() {
        let mut doc = OutlineDocument::new("- a\n  - b\n- c");
        doc.fold(LineRange::new(0, 1));
        // Split line 0 after its text
        doc.insert(3, "\n  - a1");
        assert_eq!(folded_lines(&doc), vec![0]);
        assert_eq!(doc.folds().regions[0].end_line, 2);
    }

    #[test]
    fn test_remove_lines_shifts_and_drops_folds() {
        let mut doc = OutlineDocument::new("- a\n  - b\n- c\n  - d\n- e\n  - f");
        doc.fold(LineRange::new(2, 3));
        doc.fold(LineRange::new(4, 5));

        // Delete "- c" and "  - d" entirely
        let start = doc.line_start_offset(2);
        let end = doc.line_start_offset(4);
        doc.remove(start..end);

        assert_eq!(doc.text(), "- a\n  - b\n- e\n  - f");
        assert_eq!(folded_lines(&doc), vec![2]);
        assert_eq!(doc.folds().regions.len(), 1);
        assert_eq!(doc.folds().regions[0].end_line, 3);
    }

    #[test]
    fn test_zoom_follows_edits() {
        let mut doc = doc();
        doc.zoom_in(0);
        doc.insert(0, "intro\n");
        assert_eq!(
            doc.zoom_range(),
            Some(ZoomRange::new(Position::new(1, 2), Position::new(3, 5)))
        );

        // Deleting the zoomed item's head leaves the zoom
        let end = doc.line_start_offset(2);
        doc.remove(doc.line_start_offset(1)..end);
        assert!(doc.zoom_range().is_none());
    }

    #[test]
    fn test_edits_bump_version_and_clamp_folds() {
        let mut doc = doc();
        doc.fold(LineRange::new(3, 4));
        let before = doc.content_version();

        doc.set_text("- a");
        assert_eq!(doc.content_version(), before + 1);
        assert!(doc.folds().regions.is_empty());

        doc.insert(3, "\n- b");
        assert_eq!(doc.line_count(), 2);
        doc.remove(3..7);
        assert_eq!(doc.text(), "- a");
    }
}
