//! Debug panel for live-tweaking scene colors and the firefly size

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use portal_core::params::{FIREFLIES_SIZE_MAX, FIREFLIES_SIZE_MIN, FIREFLIES_SIZE_STEP};
use portal_core::{AudioState, HexColor, ParameterSet};

use crate::assets::AssetStatus;
use crate::audio::Soundtrack;
use crate::camera::PointerCapture;
use crate::materials::{DebugParameters, ParameterTargets};
use crate::SceneConfig;

fn color_row(ui: &mut egui::Ui, label: &str, color: &mut HexColor) {
    ui.horizontal(|ui| {
        ui.color_edit_button_srgb(&mut color.0);
        ui.label(label);
    });
}

/// Draw the parameter controls, editing `params` in place
pub fn parameter_controls(ui: &mut egui::Ui, params: &mut ParameterSet) {
    color_row(ui, "Clear Color", &mut params.clear_color);
    color_row(ui, "Pole Light Color", &mut params.light_color);
    color_row(ui, "Fire Light Color", &mut params.fire_color);
    color_row(ui, "Portal Light Color A", &mut params.portal_color_start);
    color_row(ui, "Portal Light Color B", &mut params.portal_color_end);

    let mut size = params.fireflies_size;
    ui.add(
        egui::Slider::new(&mut size, FIREFLIES_SIZE_MIN..=FIREFLIES_SIZE_MAX)
            .step_by(FIREFLIES_SIZE_STEP as f64)
            .text("Fireflies Size"),
    );
    params.set_fireflies_size(size);
}

fn debug_panel(
    mut contexts: EguiContexts,
    config: Res<SceneConfig>,
    mut params: ResMut<DebugParameters>,
    mut targets: ParameterTargets,
    status: Res<AssetStatus>,
    soundtrack: Res<Soundtrack>,
    mut capture: ResMut<PointerCapture>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    let before = params.0.clone();
    let mut edited = before.clone();

    egui::Window::new("Debug")
        .default_width(config.debug.panel_width)
        .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            parameter_controls(ui, &mut edited);

            let warnings = status.warnings();
            if !warnings.is_empty() {
                ui.separator();
                for warning in warnings {
                    ui.label(egui::RichText::new(warning).color(egui::Color32::from_rgb(255, 120, 80)));
                }
            }

            if soundtrack.state() == AudioState::Waiting {
                ui.separator();
                ui.label(
                    egui::RichText::new("Click anywhere to start the soundtrack")
                        .small()
                        .color(egui::Color32::GRAY),
                );
            }
        });

    for change in before.diff(&edited) {
        targets.apply(change);
        params.0.apply(change);
    }

    capture.0 = ctx.wants_pointer_input() || ctx.is_pointer_over_area();
}

/// Plugin showing the debug panel
pub struct DebugPanelPlugin;

impl Plugin for DebugPanelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(EguiPrimaryContextPass, debug_panel);
    }
}
