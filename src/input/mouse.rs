use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::events::ConnectorClicked;
use crate::interaction::{handle_click, hit_test};
use crate::scheduler::{ConnectorPool, RenderScheduler};
use crate::settings::OutlinerSettings;
use crate::types::OutlineDocument;

/// Convert a window cursor position (top-left origin) to document pixels
fn screen_to_document(screen_pos: Vec2, settings: &OutlinerSettings, scroll_offset: f32) -> Vec2 {
    Vec2::new(
        screen_pos.x - settings.text_area_left,
        screen_pos.y + scroll_offset,
    )
}

/// System to apply the click action to the connector under the pointer
///
/// Does nothing until a primary window, mouse input and a document exist;
/// it simply retries on the next frame.
pub fn handle_connector_clicks(
    mouse_button: Option<Res<ButtonInput<MouseButton>>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    document: Option<ResMut<OutlineDocument>>,
    pool: Res<ConnectorPool>,
    scheduler: Res<RenderScheduler>,
    settings: Res<OutlinerSettings>,
    mut clicked: MessageWriter<ConnectorClicked>,
    mut waiting_logged: Local<bool>,
) {
    let window = window_query.iter().next();
    let (Some(mouse_button), Some(window), Some(mut document)) = (mouse_button, window, document)
    else {
        if !*waiting_logged {
            debug!("connector input waiting for window and document");
            *waiting_logged = true;
        }
        return;
    };
    *waiting_logged = false;

    if !mouse_button.just_pressed(MouseButton::Left) || !scheduler.is_attached() {
        return;
    }

    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let pos = screen_to_document(cursor, &settings, document.scroll_offset());

    let Some(index) = hit_test(pool.frame(), pos.x, pos.y, &settings) else {
        return;
    };
    let descriptor = match pool.descriptor(index) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            warn!("{}", err);
            return;
        }
    };

    let head_line = descriptor.head_line;
    let tab_width = document.tab_width;
    let outcome = handle_click(settings.click_action, head_line, tab_width, &mut *document);
    debug!("connector {} on line {}: {:?}", index, head_line, outcome);

    clicked.write(ConnectorClicked {
        index,
        head_line,
        action: settings.click_action,
        outcome,
    });
}
