//! Settings for the outline guides
//!
//! Use `OutlinerSettingsBuilder` for convenient initialization.

mod guides;

pub use guides::*;

use bevy::prelude::*;

use crate::interaction::ClickAction;

/// Builder for `OutlinerSettings`
///
/// # Example
/// ```no_run
/// use bevy_outline_guides::settings::OutlinerSettingsBuilder;
/// use bevy_outline_guides::interaction::ClickAction;
///
/// let settings = OutlinerSettingsBuilder::default()
///     .font_size(16.0)
///     .click_action(ClickAction::ToggleFolding)
///     .build();
/// ```
#[derive(Default)]
pub struct OutlinerSettingsBuilder {
    settings: OutlinerSettings,
}

impl OutlinerSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.settings.enabled = enabled;
        self
    }

    pub fn click_action(mut self, action: ClickAction) -> Self {
        self.settings.click_action = action;
        self
    }

    /// Set the font size; the indent column width follows it
    pub fn font_size(mut self, size: f32) -> Self {
        self.settings.font_size = size;
        self.settings.char_width = size * 0.6;
        self
    }

    pub fn char_width(mut self, width: f32) -> Self {
        self.settings.char_width = width;
        self
    }

    pub fn guide_width(mut self, width: f32) -> Self {
        self.settings.guide_width = width;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.settings.color = color;
        self
    }

    pub fn hit_slop(mut self, slop: f32) -> Self {
        self.settings.hit_slop = slop;
        self
    }

    pub fn overscan(mut self, overscan: f32) -> Self {
        self.settings.overscan = overscan;
        self
    }

    pub fn margins_em(mut self, sibling: f32, end: f32) -> Self {
        self.settings.sibling_margin_em = sibling;
        self.settings.end_margin_em = end;
        self
    }

    pub fn text_area_left(mut self, left: f32) -> Self {
        self.settings.text_area_left = left;
        self
    }

    pub fn build(self) -> OutlinerSettings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let settings = OutlinerSettingsBuilder::new()
            .font_size(20.0)
            .click_action(ClickAction::ToggleFolding)
            .margins_em(1.0, 3.0)
            .build();

        assert_eq!(settings.font_size, 20.0);
        assert_eq!(settings.char_width, 12.0);
        assert_eq!(settings.click_action, ClickAction::ToggleFolding);
        assert_eq!(settings.sibling_margin_em, 1.0);
        assert_eq!(settings.end_margin_em, 3.0);
        assert!(settings.enabled);
    }

    #[test]
    fn test_partial_config_deserializes() {
        let settings: OutlinerSettings =
            serde_json::from_str(r#"{"click_action": "toggle-folding", "enabled": false}"#).unwrap();
        assert_eq!(settings.click_action, ClickAction::ToggleFolding);
        assert!(!settings.enabled);
        assert_eq!(settings.overscan, OutlinerSettings::default().overscan);
    }

    #[test]
    fn test_metrics_from_settings() {
        let settings = OutlinerSettings::default();
        let metrics = settings.metrics(2);
        assert_eq!(metrics.tab_width, 2);
        assert_eq!(metrics.char_width, settings.char_width);
        assert_eq!(metrics.em, settings.font_size);
    }

    #[test]
    fn test_click_action_does_not_affect_layout() {
        let base = OutlinerSettings::default();
        let input_only = OutlinerSettingsBuilder::new()
            .click_action(ClickAction::ToggleFolding)
            .hit_slop(10.0)
            .build();
        assert!(!base.affects_layout(&input_only));

        let moved = OutlinerSettingsBuilder::new().text_area_left(40.0).build();
        assert!(base.affects_layout(&moved));
    }
}
