//! Bevy plugin for the outline connector overlay
//!
//! Each frame runs four chained stages:
//!
//! - **Detect**: compare the document and settings with what was last seen
//!   and request a pass for whatever changed
//! - **Compute**: run at most one pending pass and reconcile the pool
//! - **Render**: mirror the pool into pooled sprite entities
//! - **Input**: hit-test clicks against the current frame

mod connectors;

pub use connectors::ConnectorSprite;
pub(crate) use connectors::*;

use bevy::prelude::*;

use crate::events::*;
use crate::scheduler::{ConnectorPool, RenderScheduler, Trigger};
use crate::settings::OutlinerSettings;
use crate::types::OutlineDocument;

/// System sets of the overlay, chained in `Update`
#[derive(SystemSet, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutlineSet {
    Detect,
    Compute,
    Render,
    Input,
}

/// Outline connector plugin
///
/// Insert an `OutlineDocument` resource (or replace it later) to get guides.
#[derive(Default)]
pub struct OutlinerPlugin {
    settings: OutlinerSettings,
}

impl OutlinerPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom settings
    pub fn with_settings(mut self, settings: OutlinerSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl Plugin for OutlinerPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.settings.clone());
        app.init_resource::<RenderScheduler>();
        app.init_resource::<ConnectorPool>();

        app.add_message::<OutlineTrigger>();
        app.add_message::<ConnectorClicked>();
        app.add_message::<OutlineTeardown>();
        app.add_message::<OutlineAttach>();

        app.configure_sets(
            Update,
            (
                OutlineSet::Detect,
                OutlineSet::Compute,
                OutlineSet::Render,
                OutlineSet::Input,
            )
                .chain(),
        );

        app.add_systems(
            Update,
            (handle_lifecycle, detect_changes)
                .chain()
                .in_set(OutlineSet::Detect),
        );
        app.add_systems(Update, run_pending_pass.in_set(OutlineSet::Compute));
        app.add_systems(Update, update_connector_sprites.in_set(OutlineSet::Render));
        app.add_systems(
            Update,
            crate::input::handle_connector_clicks.in_set(OutlineSet::Input),
        );
    }
}

/// Host state as of the last frame
#[derive(Default)]
pub(crate) struct LastSeen {
    initialized: bool,
    content_version: u64,
    view_version: u64,
    scroll_offset: f32,
    viewport_height: f32,
    line_height: f32,
    margin_top: f32,
    tab_width: usize,
    theme_supported: bool,
    settings: Option<OutlinerSettings>,
}

/// Turn document and settings changes into pass requests
pub(crate) fn detect_changes(
    document: Option<Res<OutlineDocument>>,
    settings: Res<OutlinerSettings>,
    mut external: MessageReader<OutlineTrigger>,
    mut scheduler: ResMut<RenderScheduler>,
    mut last: Local<LastSeen>,
) {
    for OutlineTrigger(trigger) in external.read() {
        scheduler.request(*trigger);
    }

    if settings.is_changed() {
        let layout_changed = last
            .settings
            .as_ref()
            .is_none_or(|previous| previous.affects_layout(&settings));
        if layout_changed {
            scheduler.request(Trigger::SettingsChanged);
        }
        last.settings = Some((*settings).clone());
    }

    let Some(document) = document else {
        last.initialized = false;
        return;
    };

    if !last.initialized || document.is_added() {
        scheduler.request(Trigger::Reconfigured);
    } else {
        if document.content_version() != last.content_version {
            scheduler.request(Trigger::DocumentChanged);
        }
        if document.view_version() != last.view_version {
            scheduler.request(Trigger::ViewportChanged);
        }
        if document.scroll_offset() != last.scroll_offset {
            scheduler.request(Trigger::Scrolled);
        }
        if document.viewport_height != last.viewport_height
            || document.line_height != last.line_height
            || document.margin_top != last.margin_top
            || document.tab_width != last.tab_width
        {
            scheduler.request(Trigger::GeometryChanged);
        }
        if document.theme_supported != last.theme_supported {
            scheduler.request(Trigger::Reconfigured);
        }
    }

    last.initialized = true;
    last.content_version = document.content_version();
    last.view_version = document.view_version();
    last.scroll_offset = document.scroll_offset();
    last.viewport_height = document.viewport_height;
    last.line_height = document.line_height;
    last.margin_top = document.margin_top;
    last.tab_width = document.tab_width;
    last.theme_supported = document.theme_supported;
}

/// Handle teardown and re-attach requests
pub(crate) fn handle_lifecycle(
    mut teardown: MessageReader<OutlineTeardown>,
    mut attach: MessageReader<OutlineAttach>,
    mut scheduler: ResMut<RenderScheduler>,
    mut pool: ResMut<ConnectorPool>,
) {
    if teardown.read().count() > 0 {
        scheduler.detach();
        pool.clear();
        debug!("outline overlay detached");
    }
    if attach.read().count() > 0 && !scheduler.is_attached() {
        scheduler.attach();
        scheduler.request(Trigger::Reconfigured);
        debug!("outline overlay attached");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display_map::LineRange;
    use crate::interaction::OutlineCommands;

    fn app_with(text: &str) -> App {
        let mut app = App::new();
        app.add_plugins(OutlinerPlugin::new());
        let mut document = OutlineDocument::new(text);
        document.margin_top = 0.0;
        app.insert_resource(document);
        app
    }

    fn visible_sprites(app: &mut App) -> usize {
        let world = app.world_mut();
        let mut query = world.query::<(&ConnectorSprite, &Visibility)>();
        query
            .iter(world)
            .filter(|(_, visibility)| **visibility != Visibility::Hidden)
            .count()
    }

    #[test]
    fn test_first_frame_draws_connectors() {
        let mut app = app_with("- a\n  - b\n  - c\n- d\n  - e");
        app.update();

        let pool = app.world().resource::<ConnectorPool>();
        assert_eq!(pool.frame().len(), 2);
        assert_eq!(visible_sprites(&mut app), 2);
    }

    #[test]
    fn test_fold_hides_connector_and_keeps_sprite() {
        let mut app = app_with("- a\n  - b\n  - c\n- d\n  - e");
        app.update();

        app.world_mut()
            .resource_mut::<OutlineDocument>()
            .fold(LineRange::new(0, 2));
        app.update();

        let pool = app.world().resource::<ConnectorPool>();
        assert_eq!(pool.frame().len(), 1);
        assert_eq!(pool.slots().len(), 2);
        assert_eq!(visible_sprites(&mut app), 1);
    }

    #[test]
    fn test_unsupported_theme_hides_connectors() {
        let mut app = app_with("- a\n  - b");
        app.update();
        assert_eq!(visible_sprites(&mut app), 1);

        app.world_mut().resource_mut::<OutlineDocument>().theme_supported = false;
        app.update();
        assert_eq!(visible_sprites(&mut app), 0);

        app.world_mut().resource_mut::<OutlineDocument>().theme_supported = true;
        app.update();
        assert_eq!(visible_sprites(&mut app), 1);
    }

    #[test]
    fn test_teardown_and_attach() {
        let mut app = app_with("- a\n  - b");
        app.update();

        app.world_mut().write_message(OutlineTeardown);
        app.update();
        assert!(!app.world().resource::<RenderScheduler>().is_attached());
        assert_eq!(visible_sprites(&mut app), 0);

        // Edits while detached draw nothing
        app.world_mut()
            .resource_mut::<OutlineDocument>()
            .insert(0, "- z\n  - y\n");
        app.update();
        assert_eq!(visible_sprites(&mut app), 0);

        app.world_mut().write_message(OutlineAttach);
        app.update();
        assert_eq!(visible_sprites(&mut app), 2);
    }

    #[test]
    fn test_disabling_settings_clears_connectors() {
        let mut app = app_with("- a\n  - b");
        app.update();
        assert_eq!(visible_sprites(&mut app), 1);

        app.world_mut().resource_mut::<OutlinerSettings>().enabled = false;
        app.update();
        assert_eq!(visible_sprites(&mut app), 0);
    }
}
