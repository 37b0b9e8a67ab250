//! Pointer input for the outline overlay

mod mouse;

pub use mouse::handle_connector_clicks;
