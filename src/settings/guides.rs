//! Connector guide settings

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::geometry::GuideMetrics;
use crate::interaction::ClickAction;

/// Settings for the outline connector overlay
///
/// Missing fields fall back to their defaults when deserialized, so a partial
/// config such as `{"click_action": "toggle-folding"}` is valid.
#[derive(Clone, Debug, PartialEq, Resource, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlinerSettings {
    /// Draw connectors at all
    pub enabled: bool,

    /// What clicking a connector does
    pub click_action: ClickAction,

    /// Width of one indent column in pixels
    pub char_width: f32,

    /// Font size in pixels (one em)
    pub font_size: f32,

    /// Connector line width in pixels
    pub guide_width: f32,

    /// Connector line color
    pub color: Color,

    /// Horizontal distance from a connector that still counts as a hit (pixels)
    pub hit_slop: f32,

    /// How far a connector reaches above the viewport when its item started
    /// above it (pixels, negative is upward)
    pub overscan: f32,

    /// Trailing margin in em when a next sibling is visible
    pub sibling_margin_em: f32,

    /// Trailing margin in em at the end of a list
    pub end_margin_em: f32,

    /// Left edge of the text area in window pixels
    pub text_area_left: f32,
}

impl Default for OutlinerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            click_action: ClickAction::ZoomIn,
            char_width: 8.4,
            font_size: 14.0,
            guide_width: 1.0,
            color: Color::srgba(0.5, 0.5, 0.5, 0.4),
            hit_slop: 4.0,
            overscan: -20.0,
            sibling_margin_em: 1.5,
            end_margin_em: 2.0,
            text_area_left: 10.0,
        }
    }
}

impl OutlinerSettings {
    /// Geometry constants for a host with the given tab width
    pub fn metrics(&self, tab_width: usize) -> GuideMetrics {
        GuideMetrics {
            char_width: self.char_width,
            em: self.font_size,
            tab_width,
            sibling_margin_em: self.sibling_margin_em,
            end_margin_em: self.end_margin_em,
        }
    }

    /// Whether a settings change moves or restyles connectors
    ///
    /// `click_action` and `hit_slop` only affect input.
    pub fn affects_layout(&self, other: &Self) -> bool {
        self.enabled != other.enabled
            || self.char_width != other.char_width
            || self.font_size != other.font_size
            || self.guide_width != other.guide_width
            || self.color != other.color
            || self.overscan != other.overscan
            || self.sibling_margin_em != other.sibling_margin_em
            || self.end_margin_em != other.end_margin_em
            || self.text_area_left != other.text_area_left
    }
}
