//! Per-frame shader clock and viewport tracking

use bevy::prelude::*;
use bevy::time::Real;
use bevy::window::PrimaryWindow;
use portal_core::Viewport;

use crate::materials::{FirefliesMaterial, MaterialBank, PortalMaterial};
use crate::SceneConfig;

/// Current render surface, refreshed when the window changes
#[derive(Debug, Clone, Copy, Default, Resource)]
pub struct ViewportState(pub Viewport);

/// Write the elapsed time into both animated materials
pub fn write_shader_time(
    elapsed: f32,
    bank: &MaterialBank,
    portal: &mut Assets<PortalMaterial>,
    fireflies: &mut Assets<FirefliesMaterial>,
) {
    if let Some(material) = portal.get_mut(&bank.portal) {
        material.uniform.time = elapsed;
    }
    if let Some(material) = fireflies.get_mut(&bank.fireflies) {
        material.uniform.time = elapsed;
    }
}

/// Wall-clock seconds since startup, unaffected by virtual time clamping
pub(crate) fn advance_shader_clock(
    time: Res<Time<Real>>,
    bank: Option<Res<MaterialBank>>,
    mut portal: ResMut<Assets<PortalMaterial>>,
    mut fireflies: ResMut<Assets<FirefliesMaterial>>,
) {
    let Some(bank) = bank else {
        return;
    };
    write_shader_time(time.elapsed_secs(), &bank, &mut portal, &mut fireflies);
}

fn track_viewport(
    windows: Query<&Window, (With<PrimaryWindow>, Changed<Window>)>,
    config: Res<SceneConfig>,
    bank: Option<Res<MaterialBank>>,
    mut viewport: ResMut<ViewportState>,
    mut fireflies: ResMut<Assets<FirefliesMaterial>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let next = Viewport::new(window.width(), window.height(), window.scale_factor());
    if next == viewport.0 {
        return;
    }
    let previous_ratio = viewport.0.pixel_ratio(config.fireflies.max_pixel_ratio);
    viewport.0 = next;
    tracing::debug!(
        "Viewport {}x{} (aspect {:.3})",
        next.width,
        next.height,
        next.aspect_ratio()
    );

    let pixel_ratio = next.pixel_ratio(config.fireflies.max_pixel_ratio);
    if pixel_ratio == previous_ratio {
        return;
    }
    if let Some(material) = bank.and_then(|bank| fireflies.get_mut(&bank.fireflies)) {
        material.uniform.pixel_ratio = pixel_ratio;
    }
}

/// Drives the shader clock and follows window resizes
pub struct FramePlugin;

impl Plugin for FramePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViewportState>()
            .add_systems(Update, track_viewport)
            .add_systems(Update, advance_shader_clock.after(track_viewport));
    }
}
