//! Line classification and list parsing
//!
//! A list line is `indent marker [checkbox] text`, where the marker is `-`,
//! `*`, `+` or a number followed by `.` or `)`. The marker must be followed by
//! whitespace or the end of the line.
//!
//! Lines that are not list lines attach to the deepest open item, as long as
//! they are indented past the outermost one (note lines). A blank line, or a
//! non-list line that no open item can own, ends the list block.

use bevy::log::trace;

use super::{ItemId, ListItem, Outline};
use crate::display_map::{LineRange, LineSource, Position, TabMap};
use crate::error::{OutlineError, Result};

/// Longest ordered-list number accepted as a marker
const MAX_ORDINAL_DIGITS: usize = 9;

/// What a single document line is, as far as lists are concerned
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Empty or whitespace-only
    Blank,
    /// A list item line
    Item {
        indent: &'a str,
        /// Column (in chars) where the item's own text begins
        content_col: usize,
        /// The item's own text on this line
        text: &'a str,
    },
    /// Any other non-blank line
    Text { indent: &'a str },
}

/// Classify one line of text
pub fn classify_line(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }

    let (indent, rest) = TabMap::split_indent(line);
    match marker_len(rest) {
        Some(marker) => {
            let after_marker = &rest[marker..];
            let text = skip_separator(after_marker);
            let text = skip_checkbox(text);
            let consumed = rest.len() - text.len();
            LineKind::Item {
                indent,
                content_col: indent.chars().count() + rest[..consumed].chars().count(),
                text,
            }
        }
        None => LineKind::Text { indent },
    }
}

/// Byte length of a list marker at the start of `rest`, if there is one
fn marker_len(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let len = match bytes.first()? {
        b'-' | b'*' | b'+' => 1,
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits > MAX_ORDINAL_DIGITS {
                return None;
            }
            match bytes.get(digits) {
                Some(b'.') | Some(b')') => digits + 1,
                _ => return None,
            }
        }
        _ => return None,
    };

    match bytes.get(len) {
        None | Some(b' ') | Some(b'\t') => Some(len),
        _ => None,
    }
}

/// Skip the single whitespace char separating marker and text
fn skip_separator(text: &str) -> &str {
    text.strip_prefix(' ')
        .or_else(|| text.strip_prefix('\t'))
        .unwrap_or(text)
}

/// Skip a task checkbox like `[ ] ` or `[x] `
fn skip_checkbox(text: &str) -> &str {
    let mut chars = text.chars();
    if chars.next() != Some('[') {
        return text;
    }
    let Some(state) = chars.next() else {
        return text;
    };
    if state == ']' || chars.next() != Some(']') {
        return text;
    }
    let after = chars.as_str();
    if after.is_empty() {
        after
    } else if after.starts_with(' ') || after.starts_with('\t') {
        &after[1..]
    } else {
        text
    }
}

/// An item still accepting children or note lines
struct OpenItem {
    id: ItemId,
    indent_width: usize,
}

impl Outline {
    /// Parse every list item that touches lines `from..=to`
    ///
    /// The range is widened to whole list blocks so items crossing either
    /// boundary are never truncated. `folded` reports the host's fold state
    /// for an item's head line.
    pub fn parse_range<S, F>(source: &S, from: usize, to: usize, folded: F) -> Result<Outline>
    where
        S: LineSource + ?Sized,
        F: Fn(usize) -> bool,
    {
        Self::parse_range_with_tab_width(source, from, to, 4, folded)
    }

    /// Like `parse_range`, measuring indents with the given tab width
    pub fn parse_range_with_tab_width<S, F>(
        source: &S,
        from: usize,
        to: usize,
        tab_width: usize,
        folded: F,
    ) -> Result<Outline>
    where
        S: LineSource + ?Sized,
        F: Fn(usize) -> bool,
    {
        if from > to {
            return Ok(Outline::empty());
        }

        let line_count = source.line_count();
        if to >= line_count {
            return Err(OutlineError::RangeOutOfBounds { from, to, line_count });
        }

        let tab_map = TabMap::new(tab_width);
        let start = block_start(source, from);
        let mut outline = Outline::empty();
        let mut open: Vec<OpenItem> = Vec::new();

        for line in start..line_count {
            let text = source.line_text(line);
            match classify_line(&text) {
                LineKind::Blank => {
                    if line >= to {
                        break;
                    }
                    open.clear();
                }
                LineKind::Item {
                    indent,
                    content_col,
                    text: own_text,
                } => {
                    let indent_width = tab_map.indent_columns(indent);
                    while open.last().is_some_and(|top| top.indent_width >= indent_width) {
                        open.pop();
                    }
                    // A new root past the requested range belongs to nobody we need
                    if line > to && open.is_empty() {
                        break;
                    }

                    let parent = open.last().map(|top| top.id);
                    let item = ListItem {
                        content_start: Position::new(line, content_col),
                        indent: indent.to_string(),
                        range: LineRange::single(line),
                        children: Vec::new(),
                        parent,
                        folded: folded(line),
                        empty: own_text.trim().is_empty(),
                    };
                    let id = outline.push(item, parent);
                    for ancestor in &open {
                        outline.extend_to_line(ancestor.id, line);
                    }
                    open.push(OpenItem { id, indent_width });
                }
                LineKind::Text { indent } => {
                    let indent_width = tab_map.indent_columns(indent);
                    // Lazy continuation: any line indented past the outermost
                    // open item belongs to the deepest one, so sibling ranges
                    // stay contiguous
                    let owned = open.first().is_some_and(|root| root.indent_width < indent_width);
                    let Some(owner) = open.last().filter(|_| owned) else {
                        open.clear();
                        if line >= to {
                            break;
                        }
                        continue;
                    };
                    outline.mark_not_empty(owner.id);
                    for ancestor in &open {
                        outline.extend_to_line(ancestor.id, line);
                    }
                }
            }
        }

        trace!(
            "parsed {} list items from lines {}..={} (block start {})",
            outline.len(),
            from,
            to,
            start
        );
        Ok(outline)
    }
}

/// First line of the list block containing `line`
///
/// Walks upward over list lines and indented text. A blank line or an
/// unindented non-list line always leaves the parser with no open items, so
/// parsing from the line after it yields the same tree as parsing the whole
/// document.
fn block_start<S: LineSource + ?Sized>(source: &S, line: usize) -> usize {
    let mut start = line;
    while start > 0 {
        let above = source.line_text(start - 1);
        let continues = match classify_line(&above) {
            LineKind::Blank => false,
            LineKind::Item { .. } => true,
            LineKind::Text { indent } => !indent.is_empty(),
        };
        if !continues {
            break;
        }
        start -= 1;
    }
    start
}
