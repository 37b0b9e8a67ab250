//! Fold Map - maps document lines to display rows by hiding folded regions
//!
//! A folded list item keeps its head line visible and hides everything below
//! it up to the end of its range. Nested folds inside an already hidden region
//! are absorbed by the outer fold.

use crate::types::FoldRegion;

/// Cached summary for a fold region to enable O(log n) lookups
#[derive(Clone, Debug)]
struct FoldSummary {
    start_line: usize,
    end_line: usize,
    /// Cumulative hidden lines before this fold (exclusive)
    hidden_before: usize,
    /// Cumulative hidden lines including this fold (inclusive)
    hidden_through: usize,
}

/// Tracks which document lines map to which display rows
#[derive(Clone, Debug, Default)]
pub struct FoldMap {
    /// Outermost folded regions, sorted by start line
    summaries: Vec<FoldSummary>,
    /// Total number of visible rows after folding
    visible_row_count: usize,
    /// Total number of document lines
    line_count: usize,
}

impl FoldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fold map for a document with `line_count` lines
    pub fn from_regions(line_count: usize, regions: &[FoldRegion]) -> Self {
        let mut map = Self::new();
        map.update(line_count, regions);
        map
    }

    /// Rebuild from the current fold regions
    pub fn update(&mut self, line_count: usize, regions: &[FoldRegion]) {
        self.line_count = line_count;

        let mut folded: Vec<&FoldRegion> = regions
            .iter()
            .filter(|r| r.is_folded && r.end_line > r.start_line && r.start_line < line_count)
            .collect();
        folded.sort_by_key(|r| r.start_line);

        self.summaries.clear();
        let mut cumulative_hidden = 0usize;

        for region in folded {
            let end_line = region.end_line.min(line_count.saturating_sub(1));
            if let Some(last) = self.summaries.last_mut() {
                if region.start_line <= last.end_line {
                    // Head line already hidden (or shared): the outer fold wins,
                    // but it may need to grow if the inner one reaches further.
                    if end_line > last.end_line {
                        let extra = end_line - last.end_line;
                        last.end_line = end_line;
                        last.hidden_through += extra;
                        cumulative_hidden += extra;
                    }
                    continue;
                }
            }

            let hidden = end_line - region.start_line;
            self.summaries.push(FoldSummary {
                start_line: region.start_line,
                end_line,
                hidden_before: cumulative_hidden,
                hidden_through: cumulative_hidden + hidden,
            });
            cumulative_hidden += hidden;
        }

        self.visible_row_count = line_count.saturating_sub(cumulative_hidden);
    }

    /// Convert a document line to its display row - O(log n)
    ///
    /// Hidden lines map to the row of the fold's head line.
    pub fn line_to_row(&self, line: usize) -> usize {
        let idx = self.summaries.partition_point(|s| s.start_line < line);
        if idx == 0 {
            return line;
        }

        let prev = &self.summaries[idx - 1];
        if line <= prev.end_line {
            prev.start_line - prev.hidden_before
        } else {
            line - prev.hidden_through
        }
    }

    /// Convert a display row back to the document line shown on it - O(log n)
    pub fn row_to_line(&self, row: usize) -> usize {
        let idx = self
            .summaries
            .partition_point(|s| s.start_line - s.hidden_before <= row);
        if idx == 0 {
            return row;
        }

        let summary = &self.summaries[idx - 1];
        let fold_row = summary.start_line - summary.hidden_before;
        if row == fold_row {
            summary.start_line
        } else {
            row + summary.hidden_through
        }
    }

    /// Number of display rows after folding
    pub fn visible_row_count(&self) -> usize {
        self.visible_row_count
    }

    /// Number of effective (outermost) folds
    pub fn fold_count(&self) -> usize {
        self.summaries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folded(start: usize, end: usize) -> FoldRegion {
        let mut region = FoldRegion::new(start, end);
        region.is_folded = true;
        region
    }

    #[test]
    fn test_no_folds() {
        let map = FoldMap::from_regions(4, &[]);
        assert_eq!(map.visible_row_count(), 4);
        assert_eq!(map.line_to_row(2), 2);
        assert_eq!(map.row_to_line(3), 3);
    }

    #[test]
    fn test_unfolded_regions_are_ignored() {
        let map = FoldMap::from_regions(5, &[FoldRegion::new(0, 3)]);
        assert_eq!(map.visible_row_count(), 5);
        assert_eq!(map.line_to_row(1), 1);
    }

    #[test]
    fn test_single_fold() {
        let map = FoldMap::from_regions(6, &[folded(1, 3)]);

        assert_eq!(map.visible_row_count(), 4);

        assert_eq!(map.line_to_row(0), 0);
        assert_eq!(map.line_to_row(1), 1);
        assert_eq!(map.line_to_row(2), 1);
        assert_eq!(map.line_to_row(4), 2);

        assert_eq!(map.row_to_line(1), 1);
        assert_eq!(map.row_to_line(2), 4);
        assert_eq!(map.row_to_line(3), 5);
    }

    #[test]
    fn test_multiple_folds() {
        let map = FoldMap::from_regions(10, &[folded(5, 7), folded(1, 2)]);

        assert_eq!(map.visible_row_count(), 7);
        assert_eq!(map.line_to_row(3), 2);
        assert_eq!(map.line_to_row(6), 4);
        assert_eq!(map.line_to_row(8), 5);
        assert_eq!(map.row_to_line(4), 5);
        assert_eq!(map.row_to_line(5), 8);
    }

    #[test]
    fn test_nested_fold_is_absorbed() {
        // Parent 0..=5 folded, child 2..=4 folded as well
        let map = FoldMap::from_regions(8, &[folded(0, 5), folded(2, 4)]);

        assert_eq!(map.fold_count(), 1);
        assert_eq!(map.visible_row_count(), 3);
        assert_eq!(map.line_to_row(6), 1);
        assert_eq!(map.row_to_line(1), 6);
    }

    #[test]
    fn test_fold_clamped_to_document() {
        let map = FoldMap::from_regions(3, &[folded(1, 10)]);
        assert_eq!(map.visible_row_count(), 2);
        assert_eq!(map.line_to_row(2), 1);
    }
}
