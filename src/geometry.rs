//! Connector geometry
//!
//! For every visible list item with children, compute the vertical line that
//! runs from the row under the item's marker down to the row before its next
//! sibling (or the end of its topmost ancestor). Only the part that is on
//! screen is described: tops and bottoms are clamped to the viewport's pixel
//! window, and the zoom range clips which items may appear at all.

use std::fmt;
use std::ops::Range;

use crate::display_map::{LayoutView, PixelRange, TabMap, ZoomRange};
use crate::outline::{ItemId, ListItem, Outline};

/// Layout constants for connector geometry
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GuideMetrics {
    /// Width of one indent column in pixels
    pub char_width: f32,
    /// Font size in pixels, the size of one em
    pub em: f32,
    /// Tab width in columns
    pub tab_width: usize,
    /// Trailing margin when a visible next sibling follows, in em
    pub sibling_margin_em: f32,
    /// Trailing margin at the end of a list, in em
    pub end_margin_em: f32,
}

impl Default for GuideMetrics {
    fn default() -> Self {
        Self {
            char_width: 8.0,
            em: 14.0,
            tab_width: 4,
            sibling_margin_em: 1.5,
            end_margin_em: 2.0,
        }
    }
}

/// How a connector ends
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectorTail {
    /// A next sibling is visible below; stop short of its marker
    BeforeSibling,
    /// No visible next sibling
    EndOfList,
}

/// One vertical connector for the current frame
///
/// Coordinates are document-relative pixels, like `LineBlock`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectorDescriptor {
    pub top: f32,
    pub left: f32,
    /// On-screen pixel height before the trailing margin is applied
    pub height: f32,
    pub tail: ConnectorTail,
    /// The item starts above the visible window
    pub continues_above: bool,
    /// Source item in the frame's outline snapshot
    pub item: ItemId,
    /// Head line of the source item, used to re-resolve it on click
    pub head_line: usize,
}

impl ConnectorDescriptor {
    /// Trailing margin in em for this connector's tail
    pub fn trailing_margin_em(&self, metrics: &GuideMetrics) -> f32 {
        match self.tail {
            ConnectorTail::BeforeSibling => metrics.sibling_margin_em,
            ConnectorTail::EndOfList => metrics.end_margin_em,
        }
    }

    /// CSS-style height, e.g. `calc(40px - 1.5em)`
    pub fn height_expression(&self, metrics: &GuideMetrics) -> String {
        HeightExpression {
            px: self.height,
            margin_em: self.trailing_margin_em(metrics),
        }
        .to_string()
    }

    /// Height in pixels with the trailing margin resolved against `em_px`
    pub fn resolved_height(&self, metrics: &GuideMetrics, em_px: f32) -> f32 {
        (self.height - self.trailing_margin_em(metrics) * em_px).max(0.0)
    }

    /// Vertical extent a pixel renderer draws
    ///
    /// The trailing margin is resolved against `metrics.em`. A connector that
    /// continues above the viewport reaches `overscan` pixels past its top
    /// (negative is upward).
    pub fn drawn_span(&self, metrics: &GuideMetrics, overscan: f32) -> PixelRange {
        let bottom = self.top + self.resolved_height(metrics, metrics.em);
        let top = if self.continues_above {
            self.top + overscan
        } else {
            self.top
        };
        PixelRange::new(top, bottom)
    }
}

struct HeightExpression {
    px: f32,
    margin_em: f32,
}

impl fmt::Display for HeightExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "calc({}px - {}em)", self.px, self.margin_em)
    }
}

/// What the viewport shows, in offsets and pixels
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleRegion {
    /// First visible char offset
    pub from: usize,
    /// Last visible char offset (end of the last visible line)
    pub to: usize,
    pub pixels: PixelRange,
}

impl VisibleRegion {
    /// Span the host's visible ranges; `None` when nothing is visible
    pub fn from_view<V: LayoutView + ?Sized>(view: &V) -> Option<Self> {
        let ranges = view.visible_ranges();
        Self::from_ranges(&ranges, view.viewport_pixels())
    }

    pub fn from_ranges(ranges: &[Range<usize>], pixels: PixelRange) -> Option<Self> {
        let first = ranges.first()?;
        let last = ranges.last()?;
        if pixels.height() <= 0.0 {
            return None;
        }
        Some(Self {
            from: first.start,
            to: last.end,
            pixels,
        })
    }
}

/// Compute the connectors of every visible item in `outline`
///
/// The result is ordered by `top`, then `left`.
pub fn compute_connectors<V>(
    outline: &Outline,
    view: &V,
    region: &VisibleRegion,
    zoom: Option<ZoomRange>,
    metrics: &GuideMetrics,
) -> Vec<ConnectorDescriptor>
where
    V: LayoutView + ?Sized,
{
    let (window_from, window_to) = match zoom {
        Some(z) => (
            region.from.max(view.pos_to_offset(z.from)),
            region.to.min(view.pos_to_offset(z.to)),
        ),
        None => (region.from, region.to),
    };

    let mut pass = GeometryPass {
        outline,
        view,
        pixels: region.pixels,
        zoom,
        window_from,
        window_to,
        tab_map: TabMap::new(metrics.tab_width),
        char_width: metrics.char_width,
        out: Vec::new(),
    };

    if window_from <= window_to {
        for &root in outline.roots() {
            let root_end = outline.item(root).range().end;
            pass.visit(root, root_end);
        }
    }

    let mut connectors = pass.out;
    connectors.sort_by(|a, b| a.top.total_cmp(&b.top).then(a.left.total_cmp(&b.left)));
    connectors
}

struct GeometryPass<'a, V: ?Sized> {
    outline: &'a Outline,
    view: &'a V,
    pixels: PixelRange,
    zoom: Option<ZoomRange>,
    window_from: usize,
    window_to: usize,
    tab_map: TabMap,
    char_width: f32,
    out: Vec<ConnectorDescriptor>,
}

impl<V: LayoutView + ?Sized> GeometryPass<'_, V> {
    fn visit(&mut self, id: ItemId, root_end: usize) {
        let outline = self.outline;
        let item = outline.item(id);
        // Folding hides the whole subtree, not just this connector
        if item.is_leaf() || item.is_folded() {
            return;
        }

        let range = item.range();
        if self.view.line_start_offset(range.start) > self.window_to
            || self.view.line_end_offset(range.end) < self.window_from
        {
            return;
        }

        for &child in outline.children(id) {
            if !outline.item(child).is_empty() {
                self.visit(child, root_end);
            }
        }

        if let Some(connector) = self.connector_for(id, item, root_end) {
            self.out.push(connector);
        }
    }

    fn connector_for(&self, id: ItemId, item: &ListItem, root_end: usize) -> Option<ConnectorDescriptor> {
        if self
            .zoom
            .is_some_and(|zoom| !zoom.contains(item.first_line_content_start()))
        {
            return None;
        }

        let next_sibling = self.outline.next_sibling_of(id).map(|s| self.outline.item(s));

        let from_offset = self.view.line_start_offset(item.head_line() + 1);
        let till_offset = match next_sibling {
            Some(sibling) => self.view.line_end_offset(sibling.head_line() - 1),
            None => self.view.line_end_offset(root_end),
        };

        if from_offset > self.window_to || till_offset < self.window_from {
            return None;
        }

        let starts_above = from_offset < self.window_from;
        let top_block = if starts_above {
            self.view.line_block_at(self.window_from)
        } else {
            self.view.line_block_at(from_offset)
        };
        let bottom_block = if till_offset > self.window_to {
            self.view.line_block_at(self.window_to)
        } else {
            self.view.line_block_at(till_offset)
        };

        let top = self.pixels.clamp(top_block.top);
        let bottom = self.pixels.clamp(bottom_block.bottom);
        let height = bottom - top;
        if height <= 0.0 {
            return None;
        }

        let has_visible_sibling = next_sibling.is_some_and(|sibling| {
            self.view.pos_to_offset(sibling.first_line_content_start()) <= self.window_to
        });

        Some(ConnectorDescriptor {
            top,
            left: self
                .tab_map
                .indent_offset(item.first_line_indent(), self.char_width),
            height,
            tail: if has_visible_sibling {
                ConnectorTail::BeforeSibling
            } else {
                ConnectorTail::EndOfList
            },
            continues_above: starts_above || top_block.top < self.pixels.top,
            item: id,
            head_line: item.head_line(),
        })
    }
}
