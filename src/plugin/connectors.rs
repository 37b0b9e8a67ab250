//! Connector passes and sprite rendering

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::geometry::ConnectorDescriptor;
use crate::scheduler::{recompute, ConnectorPool, RenderScheduler};
use crate::settings::OutlinerSettings;
use crate::types::OutlineDocument;

/// Marker for a pooled connector sprite
#[derive(Component, Debug)]
pub struct ConnectorSprite {
    /// Slot index in the `ConnectorPool`
    pub index: usize,
}

/// Run the pending pass, if any, and reconcile the pool with its result
pub(crate) fn run_pending_pass(
    document: Option<Res<OutlineDocument>>,
    settings: Res<OutlinerSettings>,
    mut scheduler: ResMut<RenderScheduler>,
    mut pool: ResMut<ConnectorPool>,
) {
    let Some(pass) = scheduler.take_pending() else {
        return;
    };
    let Some(document) = document else {
        trace!("pass {:?} dropped: no document", pass.id);
        return;
    };

    match recompute(&*document, &settings) {
        Ok(connectors) => {
            let stats = pool.reconcile(&connectors);
            debug!(
                "pass {:?} ({:?}): {} connectors, {} reused, {} created, {} hidden",
                pass.id,
                pass.triggers,
                connectors.len(),
                stats.reused,
                stats.created,
                stats.hidden
            );
        }
        Err(err) => {
            error!("connector pass {:?} failed: {}", pass.id, err);
            debug_assert!(false, "connector pass failed: {err}");
        }
    }
}

/// Mirror the pool into sprite entities, spawning only when it grew
pub(crate) fn update_connector_sprites(
    mut commands: Commands,
    pool: Res<ConnectorPool>,
    settings: Res<OutlinerSettings>,
    document: Option<Res<OutlineDocument>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut sprite_query: Query<(&ConnectorSprite, &mut Sprite, &mut Transform, &mut Visibility)>,
) {
    if !pool.is_changed() && !settings.is_changed() {
        return;
    }

    let Some(document) = document else {
        for (_, _, _, mut visibility) in sprite_query.iter_mut() {
            *visibility = Visibility::Hidden;
        }
        return;
    };

    let viewport = SpriteViewport {
        width: window_query.iter().next().map(|w| w.width()).unwrap_or(0.0),
        height: document.viewport_height,
        scroll_offset: document.scroll_offset(),
    };
    let frame = pool.frame();

    let mut existing = 0;
    for (sprite_marker, mut sprite, mut transform, mut visibility) in sprite_query.iter_mut() {
        existing += 1;
        match frame.get(sprite_marker.index) {
            Some(descriptor) => {
                let (size, translation) = viewport.place(descriptor, &settings);
                sprite.custom_size = Some(size);
                sprite.color = settings.color;
                transform.translation = translation;
                *visibility = Visibility::Visible;
            }
            None => {
                *visibility = Visibility::Hidden;
            }
        }
    }

    for (index, descriptor) in frame.iter().enumerate().skip(existing) {
        let (size, translation) = viewport.place(descriptor, &settings);
        commands.spawn((
            Sprite {
                color: settings.color,
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(translation),
            ConnectorSprite { index },
            Name::new(format!("OutlineConnector_{}", index)),
            Visibility::Visible,
        ));
    }
}

/// Window-space placement of connector sprites
struct SpriteViewport {
    width: f32,
    height: f32,
    scroll_offset: f32,
}

impl SpriteViewport {
    /// Sprite size and center-origin translation for `descriptor`
    fn place(&self, descriptor: &ConnectorDescriptor, settings: &OutlinerSettings) -> (Vec2, Vec3) {
        let span = descriptor.drawn_span(&settings.metrics(0), settings.overscan);
        let top = span.top - self.scroll_offset;
        let height = span.height();

        let x = settings.text_area_left + descriptor.left + settings.guide_width / 2.0;
        let center_y = top + height / 2.0;
        let translation = Vec3::new(
            x - self.width / 2.0,
            self.height / 2.0 - center_y,
            0.1, // behind text
        );
        (Vec2::new(settings.guide_width, height.max(0.0)), translation)
    }
}
