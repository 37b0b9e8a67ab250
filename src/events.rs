//! Outline messages for inter-plugin communication

use bevy::prelude::*;

use crate::interaction::{ClickAction, InteractionOutcome};
use crate::scheduler::Trigger;

/// Ask for a connector pass on the next tick
///
/// Hosts that change the document behind the plugin's back (or change
/// anything `OutlineDocument` cannot see, like line heights) send this.
#[derive(Message, Clone, Copy, Debug)]
pub struct OutlineTrigger(pub Trigger);

/// A connector was clicked and its action applied
#[derive(Message, Clone, Debug)]
pub struct ConnectorClicked {
    /// Index of the connector in the frame it was clicked in
    pub index: usize,
    /// Head line of the item the connector belongs to
    pub head_line: usize,
    pub action: ClickAction,
    pub outcome: InteractionOutcome,
}

/// Detach the overlay: cancel pending passes and hide all connectors
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct OutlineTeardown;

/// Re-attach the overlay after a teardown
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct OutlineAttach;
