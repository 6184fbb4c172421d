//! Live-editable scene parameters
//!
//! The parameter set is created once from configuration and then only changed
//! through the debug panel. Every edit is expressed as a [`ParameterChange`]
//! so the scene side can apply exactly what changed.

use serde::{Deserialize, Serialize};

use crate::color::HexColor;

/// Smallest firefly base size the panel allows
pub const FIREFLIES_SIZE_MIN: f32 = 0.0;
/// Largest firefly base size the panel allows
pub const FIREFLIES_SIZE_MAX: f32 = 500.0;
/// Slider step for the firefly base size
pub const FIREFLIES_SIZE_STEP: f32 = 1.0;

/// The debug-panel parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Renderer background
    #[serde(default = "default_clear_color")]
    pub clear_color: HexColor,
    /// Pole and torch light material color
    #[serde(default = "default_light_color")]
    pub light_color: HexColor,
    /// Fire light material color
    #[serde(default = "default_fire_color")]
    pub fire_color: HexColor,
    /// Portal gradient start
    #[serde(default = "default_portal_color_start")]
    pub portal_color_start: HexColor,
    /// Portal gradient end
    #[serde(default = "default_portal_color_end")]
    pub portal_color_end: HexColor,
    /// Firefly base point size in pixels
    #[serde(default = "default_fireflies_size")]
    pub fireflies_size: f32,
}

fn default_clear_color() -> HexColor {
    HexColor::new(0x1a, 0x1a, 0x1a)
}

fn default_light_color() -> HexColor {
    HexColor::new(0xff, 0xff, 0xff)
}

fn default_fire_color() -> HexColor {
    HexColor::new(0xff, 0x96, 0x33)
}

fn default_portal_color_start() -> HexColor {
    HexColor::new(0x9b, 0x26, 0xe8)
}

fn default_portal_color_end() -> HexColor {
    HexColor::new(0x12, 0x04, 0xe8)
}

fn default_fireflies_size() -> f32 {
    300.0
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            clear_color: default_clear_color(),
            light_color: default_light_color(),
            fire_color: default_fire_color(),
            portal_color_start: default_portal_color_start(),
            portal_color_end: default_portal_color_end(),
            fireflies_size: default_fireflies_size(),
        }
    }
}

/// A single edit to the parameter set
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterChange {
    ClearColor(HexColor),
    LightColor(HexColor),
    FireColor(HexColor),
    PortalColorStart(HexColor),
    PortalColorEnd(HexColor),
    FirefliesSize(f32),
}

impl ParameterChange {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            ParameterChange::ClearColor(_) => "clearColor",
            ParameterChange::LightColor(_) => "lightColor",
            ParameterChange::FireColor(_) => "fireColor",
            ParameterChange::PortalColorStart(_) => "portalColorStart",
            ParameterChange::PortalColorEnd(_) => "portalColorEnd",
            ParameterChange::FirefliesSize(_) => "firefliesSize",
        }
    }
}

/// Clamp a size to the slider range and snap it to the slider step
fn snap_fireflies_size(size: f32) -> f32 {
    if !size.is_finite() {
        return FIREFLIES_SIZE_MIN;
    }
    let snapped = (size / FIREFLIES_SIZE_STEP).round() * FIREFLIES_SIZE_STEP;
    snapped.clamp(FIREFLIES_SIZE_MIN, FIREFLIES_SIZE_MAX)
}

impl ParameterSet {
    /// Set the firefly size, clamped and snapped to the slider step
    pub fn set_fireflies_size(&mut self, size: f32) -> ParameterChange {
        self.fireflies_size = snap_fireflies_size(size);
        ParameterChange::FirefliesSize(self.fireflies_size)
    }

    /// Record a change in the parameter set
    pub fn apply(&mut self, change: ParameterChange) {
        match change {
            ParameterChange::ClearColor(c) => self.clear_color = c,
            ParameterChange::LightColor(c) => self.light_color = c,
            ParameterChange::FireColor(c) => self.fire_color = c,
            ParameterChange::PortalColorStart(c) => self.portal_color_start = c,
            ParameterChange::PortalColorEnd(c) => self.portal_color_end = c,
            ParameterChange::FirefliesSize(size) => {
                self.set_fireflies_size(size);
            }
        }
    }

    /// Changes needed to go from `self` to `newer`, in panel order
    pub fn diff(&self, newer: &ParameterSet) -> Vec<ParameterChange> {
        let mut changes = Vec::new();
        if self.clear_color != newer.clear_color {
            changes.push(ParameterChange::ClearColor(newer.clear_color));
        }
        if self.light_color != newer.light_color {
            changes.push(ParameterChange::LightColor(newer.light_color));
        }
        if self.fire_color != newer.fire_color {
            changes.push(ParameterChange::FireColor(newer.fire_color));
        }
        if self.portal_color_start != newer.portal_color_start {
            changes.push(ParameterChange::PortalColorStart(newer.portal_color_start));
        }
        if self.portal_color_end != newer.portal_color_end {
            changes.push(ParameterChange::PortalColorEnd(newer.portal_color_end));
        }
        if self.fireflies_size != newer.fireflies_size {
            changes.push(ParameterChange::FirefliesSize(newer.fireflies_size));
        }
        changes
    }
}
