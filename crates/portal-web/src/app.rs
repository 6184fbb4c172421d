//! Bevy application setup

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::DefaultPickingPlugins;
use portal_core::{ConfigError, PortalConfig};
use portal_scene::PortalScenePlugin;

use crate::url_params::UrlOverrides;

/// Configuration compiled into the browser build
const DEFAULT_CONFIG: &str = include_str!("../portal.toml");

fn embedded_config() -> Result<PortalConfig, ConfigError> {
    PortalConfig::from_toml(DEFAULT_CONFIG)
}

/// Embedded configuration with the URL overrides applied
pub fn resolve_config(overrides: &UrlOverrides) -> PortalConfig {
    let mut config = embedded_config().unwrap_or_else(|e| {
        tracing::warn!("Embedded configuration rejected, using defaults: {}", e);
        PortalConfig::default()
    });

    if let Some(debug) = overrides.debug {
        let state = if debug { "enabled" } else { "disabled" };
        tracing::info!("Debug panel {} by URL parameter", state);
        config.debug.enabled = debug;
    }
    config
}

/// Run the Bevy application
pub fn run(overrides: UrlOverrides) {
    let config = resolve_config(&overrides);

    App::new()
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: config.window.title.clone(),
                    canvas: Some(config.window.canvas.clone()),
                    fit_canvas_to_parent: true,
                    prevent_default_event_handling: false,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                // Assets are served next to the page
                file_path: "".to_string(),
                // Don't look for .meta files - server doesn't have them
                meta_check: bevy::asset::AssetMetaCheck::Never,
                ..default()
            })
        )
        // Must come before EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(EguiPlugin::default())
        .add_plugins(PortalScenePlugin { config })
        .run();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_is_valid() {
        let config = embedded_config().unwrap();
        assert_eq!(config, PortalConfig::default());
    }

    #[test]
    fn test_debug_override() {
        let config = resolve_config(&UrlOverrides {
            debug: Some(false),
            log_level: None,
        });
        assert!(!config.debug.enabled);

        let config = resolve_config(&UrlOverrides::default());
        assert!(config.debug.enabled);
    }
}
