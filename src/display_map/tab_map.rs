//! Tab Map - measures list indentation in character units
//!
//! Connector positions are derived from the literal leading whitespace of a
//! list item. Every tab counts as a full tab width, every other character as
//! one column. This is deliberately not tab-stop expansion: an indent of
//! `" \t"` is `1 + tab_size` columns wide.

/// Measures indentation strings for display
#[derive(Clone, Debug)]
pub struct TabMap {
    /// Tab size in columns
    tab_size: usize,
}

impl Default for TabMap {
    fn default() -> Self {
        Self::new(4)
    }
}

impl TabMap {
    /// Create a new tab map with the specified tab size
    pub fn new(tab_size: usize) -> Self {
        Self {
            tab_size: tab_size.max(1),
        }
    }

    /// Get the tab size
    pub fn tab_size(&self) -> usize {
        self.tab_size
    }

    /// Width of an indentation string in columns
    pub fn indent_columns(&self, indent: &str) -> usize {
        indent
            .chars()
            .map(|ch| if ch == '\t' { self.tab_size } else { 1 })
            .sum()
    }

    /// Horizontal pixel offset of an indentation string
    pub fn indent_offset(&self, indent: &str, char_width: f32) -> f32 {
        self.indent_columns(indent) as f32 * char_width
    }

    /// Split a line into its leading whitespace and the rest
    pub fn split_indent(line: &str) -> (&str, &str) {
        let end = line
            .char_indices()
            .find(|(_, ch)| *ch != ' ' && *ch != '\t')
            .map(|(i, _)| i)
            .unwrap_or(line.len());
        line.split_at(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_indent() {
        let tab_map = TabMap::new(4);
        assert_eq!(tab_map.indent_columns(""), 0);
    }

    #[test]
    fn test_spaces_count_one_each() {
        let tab_map = TabMap::new(4);
        assert_eq!(tab_map.indent_columns("  "), 2);
        assert_eq!(tab_map.indent_columns("      "), 6);
    }

    #[test]
    fn test_single_tab() {
        let tab_map = TabMap::new(4);
        assert_eq!(tab_map.indent_columns("\t"), 4);
        assert_eq!(tab_map.indent_offset("\t", 8.0), 32.0);
    }

    #[test]
    fn test_mixed_tabs_are_not_tab_stops() {
        let tab_map = TabMap::new(4);
        // A space then a tab: 1 + 4, not rounded up to the next stop
        assert_eq!(tab_map.indent_columns(" \t"), 5);
        assert_eq!(tab_map.indent_columns("\t\t "), 9);
    }

    #[test]
    fn test_zero_tab_size_is_clamped() {
        let tab_map = TabMap::new(0);
        assert_eq!(tab_map.tab_size(), 1);
        assert_eq!(tab_map.indent_columns("\t\t"), 2);
    }

    #[test]
    fn test_split_indent() {
        assert_eq!(TabMap::split_indent("\t  - item"), ("\t  ", "- item"));
        assert_eq!(TabMap::split_indent("- item"), ("", "- item"));
        assert_eq!(TabMap::split_indent("   "), ("   ", ""));
    }
}
