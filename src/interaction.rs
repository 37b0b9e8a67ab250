//! Pointer interaction on connectors
//!
//! A click on a connector resolves to the list item that produced it and runs
//! the configured `ClickAction`. The item is identified by its head line and
//! re-parsed from the live document, never by a cached offset or item handle.

use bevy::log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::display_map::{LineRange, LineSource};
use crate::geometry::ConnectorDescriptor;
use crate::outline::Outline;
use crate::settings::OutlinerSettings;

/// Fold and zoom commands offered by the host editor
pub trait OutlineCommands: LineSource {
    /// Whether the item headed at `line` is folded
    fn is_folded(&self, line: usize) -> bool;

    /// Fold `range`, keeping its first line visible
    fn fold(&mut self, range: LineRange);

    /// Unfold the region headed at `line`
    fn unfold(&mut self, line: usize);

    /// Enter a focused view of the item headed at `line`
    fn zoom_in(&mut self, line: usize);
}

/// What a click on a connector does
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClickAction {
    /// Focus the editor on the clicked item's subtree
    #[default]
    ZoomIn,
    /// Fold or unfold all of the item's direct children at once
    ToggleFolding,
}

/// Result of handling one click
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionOutcome {
    ZoomedIn { line: usize },
    Folded { lines: Vec<usize> },
    Unfolded { lines: Vec<usize> },
    NoOp,
}

/// Run `action` for the item whose marker is on `head_line`
pub fn handle_click<H>(
    action: ClickAction,
    head_line: usize,
    tab_width: usize,
    host: &mut H,
) -> InteractionOutcome
where
    H: OutlineCommands + ?Sized,
{
    trace!("connector click on line {} ({:?})", head_line, action);
    match action {
        ClickAction::ZoomIn => zoom_in(head_line, host),
        ClickAction::ToggleFolding => toggle_folding(head_line, tab_width, host),
    }
}

fn zoom_in<H: OutlineCommands + ?Sized>(head_line: usize, host: &mut H) -> InteractionOutcome {
    host.zoom_in(head_line);
    InteractionOutcome::ZoomedIn { line: head_line }
}

/// Fold every direct child, or unfold them all if all are folded
///
/// Only children with lines below their head take part: empty items and
/// single-line leaves have nothing to fold. The fold/unfold decision is made
/// once for the whole sibling group.
pub fn toggle_folding<H>(head_line: usize, tab_width: usize, host: &mut H) -> InteractionOutcome
where
    H: OutlineCommands + ?Sized,
{
    if head_line >= host.line_count() {
        debug!("toggle-folding on line {} past end of document", head_line);
        return InteractionOutcome::NoOp;
    }

    let outline = match Outline::parse_range_with_tab_width(
        &*host,
        head_line,
        head_line,
        tab_width,
        |line| host.is_folded(line),
    ) {
        Ok(outline) => outline,
        Err(err) => {
            debug!("toggle-folding parse failed: {}", err);
            return InteractionOutcome::NoOp;
        }
    };

    let Some(id) = outline.item_at_line(head_line) else {
        debug!("line {} no longer heads a list item", head_line);
        return InteractionOutcome::NoOp;
    };

    let children: Vec<(usize, LineRange, bool)> = outline
        .children(id)
        .iter()
        .map(|&child| outline.item(child))
        .filter(|child| !child.is_empty() && child.range().line_count() > 1)
        .map(|child| (child.head_line(), child.range(), child.is_folded()))
        .collect();

    if children.is_empty() {
        return InteractionOutcome::NoOp;
    }

    if children.iter().all(|(_, _, folded)| *folded) {
        let lines: Vec<usize> = children.iter().map(|(line, _, _)| *line).collect();
        for &line in &lines {
            host.unfold(line);
        }
        InteractionOutcome::Unfolded { lines }
    } else {
        let mut lines = Vec::new();
        for (line, range, folded) in children {
            if !folded {
                host.fold(range);
                lines.push(line);
            }
        }
        InteractionOutcome::Folded { lines }
    }
}

/// Index of the connector under the pointer
///
/// `x`/`y` are in the same coordinate space as the descriptors. A connector
/// is hit inside the span the renderer draws, widened horizontally by
/// `hit_slop`. Later (deeper) connectors win when strips overlap.
pub fn hit_test(
    descriptors: &[ConnectorDescriptor],
    x: f32,
    y: f32,
    settings: &OutlinerSettings,
) -> Option<usize> {
    let metrics = settings.metrics(0);
    let center_offset = settings.guide_width / 2.0;
    descriptors
        .iter()
        .enumerate()
        .rev()
        .find(|(_, d)| {
            let span = d.drawn_span(&metrics, settings.overscan);
            (x - (d.left + center_offset)).abs() <= settings.hit_slop
                && y >= span.top
                && y <= span.bottom
        })
        .map(|(index, _)| index)
}
