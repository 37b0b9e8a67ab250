//! # Bevy Outline Guides
//!
//! Vertical connector lines for nested Markdown lists, drawn as an overlay
//! plugin for Bevy.
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_outline_guides::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(OutlinerPlugin::default())
//!         .insert_resource(OutlineDocument::new("- a\n  - b\n  - c\n- d"))
//!         .run();
//! }
//! ```
//!
//! ## Customization
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_outline_guides::prelude::*;
//!
//! fn main() {
//!     let settings = OutlinerSettingsBuilder::new()
//!         .click_action(ClickAction::ToggleFolding)
//!         .font_size(16.0)
//!         .build();
//!
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(OutlinerPlugin::new().with_settings(settings))
//!         .run();
//! }
//! ```
//!
//! Editors with their own text model implement `LayoutView` and
//! `OutlineCommands` and call `scheduler::recompute` directly.

pub mod display_map;
pub mod error;
pub mod events;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod outline;
pub mod plugin;
pub mod scheduler;
pub mod settings;
pub mod types;

pub mod prelude {
    //! Convenient re-exports for common usage
    pub use crate::plugin::{ConnectorSprite, OutlineSet, OutlinerPlugin};
    pub use crate::settings::*;
    pub use crate::types::*;
    pub use crate::events::*;
    pub use crate::error::{OutlineError, Result as OutlineResult};

    pub use crate::display_map::{
        CoordinateBridge, LayoutView, LineBlock, LineRange, LineSource, PixelRange, Position,
        ZoomRange,
    };
    pub use crate::geometry::{ConnectorDescriptor, ConnectorTail, GuideMetrics};
    pub use crate::interaction::{ClickAction, InteractionOutcome, OutlineCommands};
    pub use crate::outline::{ItemId, ListItem, Outline};
    pub use crate::scheduler::{ConnectorPool, RenderScheduler, Trigger};
}
