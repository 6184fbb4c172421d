//! Portal Scene - Bevy plugins rendering the portal
//!
//! This crate provides everything the entry points share: asset loading,
//! the material bank and its shaders, model assembly, the firefly field,
//! orbit camera, soundtrack, debug panel and the per-frame updates.
//! The host app adds `DefaultPlugins` and `EguiPlugin` before
//! [`PortalScenePlugin`].

pub mod assembly;
pub mod assets;
pub mod audio;
pub mod camera;
pub mod debug_panel;
pub mod fireflies;
pub mod frame;
pub mod materials;

use bevy::prelude::*;
use portal_core::PortalConfig;

/// Configuration the scene was started with
#[derive(Debug, Clone, Resource, Deref)]
pub struct SceneConfig(pub PortalConfig);

/// Plugin that sets up the whole portal scene
pub struct PortalScenePlugin {
    pub config: PortalConfig,
}

impl Plugin for PortalScenePlugin {
    fn build(&self, app: &mut App) {
        let params = self.config.params.clone();

        app.insert_resource(SceneConfig(self.config.clone()))
            .insert_resource(ClearColor(materials::to_color(params.clear_color)))
            .insert_resource(materials::DebugParameters(params))
            .add_plugins(assets::PortalAssetsPlugin)
            .add_plugins(materials::MaterialsPlugin)
            .add_plugins(assembly::AssemblyPlugin)
            .add_plugins(fireflies::FirefliesPlugin)
            .add_plugins(camera::CameraPlugin)
            .add_plugins(audio::SoundtrackPlugin)
            .add_plugins(frame::FramePlugin);

        if self.config.debug.enabled {
            app.add_plugins(debug_panel::DebugPanelPlugin);
        } else {
            tracing::info!("Debug panel disabled");
        }
    }
}

// Re-export commonly used types
pub use assets::{AssetStatus, LoadStatus, PortalAssets, SceneStatus};
pub use camera::{MainCamera, OrbitControls};
pub use materials::{FirefliesMaterial, MaterialBank, PortalMaterial};
