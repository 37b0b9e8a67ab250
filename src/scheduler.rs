//! Render scheduling
//!
//! Every host change (edit, scroll, resize, fold, reconfigure) requests a
//! pass. Requests made in the same tick collapse into one pending pass; a new
//! request replaces the pending one, so a stale pass never reaches the
//! screen. The pass runs on the next tick and its connectors are matched to
//! pooled slots by index.

use bevy::log::trace;
use bevy::prelude::Resource;

use crate::display_map::LayoutView;
use crate::error::{OutlineError, Result};
use crate::geometry::{compute_connectors, ConnectorDescriptor, VisibleRegion};
use crate::interaction::OutlineCommands;
use crate::outline::Outline;
use crate::settings::OutlinerSettings;

/// Why a pass was requested
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Text was edited
    DocumentChanged,
    /// The visible range changed, including fold and zoom changes
    ViewportChanged,
    /// Line heights or the viewport size changed
    GeometryChanged,
    /// The overlay was (re)attached
    Reconfigured,
    SettingsChanged,
    Scrolled,
}

/// Identifies one requested pass
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PassId(u64);

/// A pass waiting for the next tick
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingPass {
    pub id: PassId,
    /// Every trigger coalesced into this pass, in first-seen order
    pub triggers: Vec<Trigger>,
}

/// Debounces pass requests to at most one pass per tick
#[derive(Resource, Debug)]
pub struct RenderScheduler {
    next_id: u64,
    pending: Option<PendingPass>,
    attached: bool,
}

impl Default for RenderScheduler {
    fn default() -> Self {
        Self {
            next_id: 0,
            pending: None,
            attached: true,
        }
    }
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a pass for the next tick, replacing any pending one
    ///
    /// Returns `None` while detached.
    pub fn request(&mut self, trigger: Trigger) -> Option<PassId> {
        if !self.attached {
            trace!("ignoring {:?}: overlay detached", trigger);
            return None;
        }

        let id = PassId(self.next_id);
        self.next_id += 1;

        let mut triggers = self.pending.take().map(|p| p.triggers).unwrap_or_default();
        if !triggers.contains(&trigger) {
            triggers.push(trigger);
        }
        self.pending = Some(PendingPass { id, triggers });
        Some(id)
    }

    /// Take the pass to run this tick
    pub fn take_pending(&mut self) -> Option<PendingPass> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Cancel pending work and ignore requests until `attach`
    pub fn detach(&mut self) {
        self.pending = None;
        self.attached = false;
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

/// One pooled connector element
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectorSlot {
    pub top: f32,
    pub left: f32,
    pub height: f32,
    pub visible: bool,
}

impl ConnectorSlot {
    fn show(&mut self, descriptor: &ConnectorDescriptor) {
        self.top = descriptor.top;
        self.left = descriptor.left;
        self.height = descriptor.height;
        self.visible = true;
    }

    fn hide(&mut self) {
        *self = Self::default();
    }
}

/// What a reconcile pass did to the pool
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub reused: usize,
    pub created: usize,
    pub hidden: usize,
}

/// Connector slots reused across passes, plus the current frame
///
/// Slots are matched to descriptors by position. The pool only grows;
/// surplus slots are hidden, never removed.
#[derive(Resource, Debug, Default)]
pub struct ConnectorPool {
    slots: Vec<ConnectorSlot>,
    frame: Vec<ConnectorDescriptor>,
}

impl ConnectorPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `descriptors` in slot order
    pub fn reconcile(&mut self, descriptors: &[ConnectorDescriptor]) -> ReconcileStats {
        let mut stats = ReconcileStats::default();

        for (index, descriptor) in descriptors.iter().enumerate() {
            match self.slots.get_mut(index) {
                Some(slot) => {
                    slot.show(descriptor);
                    stats.reused += 1;
                }
                None => {
                    let mut slot = ConnectorSlot::default();
                    slot.show(descriptor);
                    self.slots.push(slot);
                    stats.created += 1;
                }
            }
        }

        for slot in self.slots.iter_mut().skip(descriptors.len()) {
            if slot.visible {
                stats.hidden += 1;
            }
            slot.hide();
        }

        self.frame = descriptors.to_vec();
        stats
    }

    /// Hide every slot and forget the frame
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.hide();
        }
        self.frame.clear();
    }

    pub fn slots(&self) -> &[ConnectorSlot] {
        &self.slots
    }

    /// Descriptors of the last reconciled frame, in slot order
    pub fn frame(&self) -> &[ConnectorDescriptor] {
        &self.frame
    }

    pub fn descriptor(&self, index: usize) -> Result<&ConnectorDescriptor> {
        self.frame.get(index).ok_or(OutlineError::UnknownConnector {
            index,
            len: self.frame.len(),
        })
    }

    pub fn visible_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.visible).count()
    }
}

/// Run one full pass against the host
///
/// Disabled guides, a theme that cannot host the overlay and a missing
/// viewport all yield an empty set.
pub fn recompute<H>(host: &H, settings: &OutlinerSettings) -> Result<Vec<ConnectorDescriptor>>
where
    H: LayoutView + OutlineCommands + ?Sized,
{
    if !settings.enabled || !host.supports_overlay() {
        return Ok(Vec::new());
    }
    let Some(region) = VisibleRegion::from_view(host) else {
        return Ok(Vec::new());
    };

    let first_line = host.offset_to_pos(region.from).line;
    let last_line = host.offset_to_pos(region.to).line;
    let tab_width = host.tab_width();
    let outline =
        Outline::parse_range_with_tab_width(host, first_line, last_line, tab_width, |line| {
            host.is_folded(line)
        })?;

    let connectors = compute_connectors(
        &outline,
        host,
        &region,
        host.zoom_range(),
        &settings.metrics(tab_width),
    );
    trace!(
        "pass over lines {}..={}: {} items, {} connectors",
        first_line,
        last_line,
        outline.len(),
        connectors.len()
    );
    Ok(connectors)
}
