//! Outline tree model
//!
//! A parsed forest of Markdown list items. The forest is an immutable snapshot:
//! it is rebuilt from the document on every pass and never patched, so item
//! handles are only meaningful for the snapshot that produced them.
//!
//! Items live in a flat arena. A parent owns its children through their
//! `ItemId`s; the child's `parent` field is a plain lookup handle.

mod parser;

pub use parser::*;

use crate::display_map::{LineRange, Position};

/// Handle to a `ListItem` inside one `Outline` snapshot
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub(crate) u32);

impl ItemId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One list item and the lines it owns
#[derive(Clone, Debug, PartialEq)]
pub struct ListItem {
    /// Where this item's own text begins, after indent, marker and checkbox
    pub(crate) content_start: Position,
    /// Literal leading whitespace of the item's first line
    pub(crate) indent: String,
    /// Lines owned by this item, descendants included
    pub(crate) range: LineRange,
    pub(crate) children: Vec<ItemId>,
    pub(crate) parent: Option<ItemId>,
    pub(crate) folded: bool,
    /// Whether the item's own text (descendants excluded) is whitespace-only
    pub(crate) empty: bool,
}

impl ListItem {
    pub fn first_line_content_start(&self) -> Position {
        self.content_start
    }

    pub fn first_line_indent(&self) -> &str {
        &self.indent
    }

    /// Line holding the item's marker
    pub fn head_line(&self) -> usize {
        self.content_start.line
    }

    pub fn range(&self) -> LineRange {
        self.range
    }

    pub fn children(&self) -> &[ItemId] {
        &self.children
    }

    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_folded(&self) -> bool {
        self.folded
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }
}

/// Forest of list items parsed from a line range
#[derive(Clone, Debug, Default)]
pub struct Outline {
    items: Vec<ListItem>,
    roots: Vec<ItemId>,
}

impl Outline {
    /// An outline with no items
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[ItemId] {
        &self.roots
    }

    pub fn item(&self, id: ItemId) -> &ListItem {
        &self.items[id.index()]
    }

    pub fn children(&self, id: ItemId) -> &[ItemId] {
        &self.item(id).children
    }

    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.item(id).parent
    }

    /// The sibling that follows `id`, or `None` if it is the last one
    ///
    /// Root items are siblings of each other.
    pub fn next_sibling_of(&self, id: ItemId) -> Option<ItemId> {
        let siblings = match self.parent(id) {
            Some(parent) => self.children(parent),
            None => &self.roots,
        };
        let position = siblings.iter().position(|&s| s == id)?;
        siblings.get(position + 1).copied()
    }

    /// The item whose marker sits on `line`
    pub fn item_at_line(&self, line: usize) -> Option<ItemId> {
        // Items are allocated in document order
        self.items
            .binary_search_by_key(&line, |item| item.head_line())
            .ok()
            .map(|index| ItemId(index as u32))
    }

    /// All items in document order
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &ListItem)> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| (ItemId(index as u32), item))
    }

    /// Proper descendants of `id` in document order
    pub fn descendants(&self, id: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut stack: Vec<ItemId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Topmost ancestor of `id` (itself for a root)
    pub fn root_of(&self, id: ItemId) -> ItemId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Push a new item and link it to its parent
    pub(crate) fn push(&mut self, mut item: ListItem, parent: Option<ItemId>) -> ItemId {
        let id = ItemId(self.items.len() as u32);
        item.parent = parent;
        self.items.push(item);
        match parent {
            Some(parent) => self.items[parent.index()].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub(crate) fn extend_to_line(&mut self, id: ItemId, line: usize) {
        let range = &mut self.items[id.index()].range;
        range.end = range.end.max(line);
    }

    pub(crate) fn mark_not_empty(&mut self, id: ItemId) {
        self.items[id.index()].empty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ropey::Rope;

    fn parse(text: &str) -> Outline {
        let rope = Rope::from_str(text);
        let last = rope.len_lines() - 1;
        Outline::parse_range(&rope, 0, last, |_| false).unwrap()
    }

    fn head(outline: &Outline, id: ItemId) -> usize {
        outline.item(id).head_line()
    }

    #[test]
    fn test_next_sibling_of() {
        let outline = parse("- a\n  - b\n  - c\n- d");
        let a = outline.item_at_line(0).unwrap();
        let b = outline.item_at_line(1).unwrap();
        let c = outline.item_at_line(2).unwrap();
        let d = outline.item_at_line(3).unwrap();

        assert_eq!(outline.next_sibling_of(a), Some(d));
        assert_eq!(outline.next_sibling_of(b), Some(c));
        assert_eq!(outline.next_sibling_of(c), None);
        assert_eq!(outline.next_sibling_of(d), None);
    }

    #[test]
    fn test_parent_links() {
        let outline = parse("- a\n  - b\n    - c\n- d");
        let a = outline.item_at_line(0).unwrap();
        let c = outline.item_at_line(2).unwrap();

        let b = outline.parent(c).unwrap();
        assert_eq!(head(&outline, b), 1);
        assert_eq!(outline.parent(b), Some(a));
        assert_eq!(outline.parent(a), None);
        assert_eq!(outline.root_of(c), a);
    }

    #[test]
    fn test_descendants_in_document_order() {
        let outline = parse("- a\n  - b\n    - c\n  - d\n- e");
        let a = outline.item_at_line(0).unwrap();
        let lines: Vec<usize> = outline
            .descendants(a)
            .into_iter()
            .map(|id| head(&outline, id))
            .collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn test_children_nested_inside_parent_ranges() {
        let outline = parse(
            "- a\n  - b\n    note\n    - c\n  text\n  - d\n- e\n  - f\n\n- g\n\t- h\n\t\t- i",
        );

        for (id, item) in outline.iter() {
            let children = outline.children(id);
            assert_eq!(item.is_leaf(), children.is_empty());

            let mut previous_end: Option<usize> = None;
            for &child in children {
                let child_range = outline.item(child).range();
                assert!(item.range().contains(&child_range));
                assert!(child_range.start > item.head_line());
                if let Some(end) = previous_end {
                    assert_eq!(child_range.start, end + 1, "sibling ranges not contiguous");
                }
                previous_end = Some(child_range.end);
            }
        }
    }

    #[test]
    fn test_item_at_line_misses_note_lines() {
        let outline = parse("- a\n  note\n  - b");
        assert!(outline.item_at_line(0).is_some());
        assert!(outline.item_at_line(1).is_none());
        assert!(outline.item_at_line(2).is_some());
    }
}
