//! Baked texture, model and soundtrack loading
//!
//! The three loads are issued together at startup and resolve independently.
//! A failed load only disables the feature that depends on it; the frame loop
//! keeps running and the debug panel lists the failure.

use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::image::ImageLoaderSettings;
use bevy::prelude::*;

use crate::SceneConfig;

/// Handles of the three startup assets
#[derive(Resource, Debug, Clone)]
pub struct PortalAssets {
    pub baked_texture: Handle<Image>,
    pub model: Handle<Gltf>,
    pub soundtrack: Handle<AudioSource>,
}

/// Progress of a single asset load
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Pending,
    Ready,
    Failed(String),
}

impl LoadStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadStatus::Ready)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, LoadStatus::Pending)
    }

    /// Map an asset server load state; `None` while nothing changed
    pub fn from_load_state(state: Option<LoadState>) -> Option<LoadStatus> {
        match state {
            Some(LoadState::Loaded) => Some(LoadStatus::Ready),
            Some(LoadState::Failed(err)) => Some(LoadStatus::Failed(err.to_string())),
            _ => None,
        }
    }

    /// Move a pending load to its final state; settled loads never change again
    ///
    /// Returns true on the frame the load settles.
    pub fn advance(&mut self, state: Option<LoadState>) -> bool {
        if !self.is_pending() {
            return false;
        }
        match LoadStatus::from_load_state(state) {
            Some(next) => {
                *self = next;
                true
            }
            None => false,
        }
    }
}

/// Outcome of attaching materials to the loaded model
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SceneStatus {
    #[default]
    Waiting,
    Assembled,
    Failed(String),
}

/// Load and assembly progress shown by the debug panel
#[derive(Resource, Debug, Clone, Default)]
pub struct AssetStatus {
    pub baked_texture: LoadStatus,
    pub model: LoadStatus,
    pub soundtrack: LoadStatus,
    pub scene: SceneStatus,
}

impl AssetStatus {
    /// Human readable problems, one per failed asset or assembly step
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for (label, status) in [
            ("Baked texture", &self.baked_texture),
            ("Model", &self.model),
            ("Soundtrack", &self.soundtrack),
        ] {
            if let LoadStatus::Failed(reason) = status {
                warnings.push(format!("{label} failed to load: {reason}"));
            }
        }
        if let SceneStatus::Failed(reason) = &self.scene {
            warnings.push(reason.clone());
        }
        warnings
    }
}

pub(crate) fn load_portal_assets(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<SceneConfig>,
) {
    let paths = &config.assets;
    tracing::info!(
        "Loading assets: texture={} model={} soundtrack={}",
        paths.baked_texture,
        paths.model,
        paths.soundtrack
    );

    let baked_texture = asset_server.load_with_settings(
        paths.baked_texture.clone(),
        |settings: &mut ImageLoaderSettings| settings.is_srgb = true,
    );
    let model = asset_server.load(paths.model.clone());
    let soundtrack = asset_server.load(paths.soundtrack.clone());

    commands.insert_resource(PortalAssets {
        baked_texture,
        model,
        soundtrack,
    });
}

fn track_asset_loads(
    assets: Option<Res<PortalAssets>>,
    asset_server: Res<AssetServer>,
    mut status: ResMut<AssetStatus>,
) {
    let Some(assets) = assets else {
        return;
    };

    let AssetStatus {
        baked_texture,
        model,
        soundtrack,
        ..
    } = &mut *status;
    let tracked = [
        ("baked texture", assets.baked_texture.id().untyped(), baked_texture),
        ("model", assets.model.id().untyped(), model),
        ("soundtrack", assets.soundtrack.id().untyped(), soundtrack),
    ];

    for (label, id, slot) in tracked {
        if !slot.advance(asset_server.get_load_state(id)) {
            continue;
        }
        match slot {
            LoadStatus::Failed(reason) => tracing::error!("Failed to load {}: {}", label, reason),
            _ => tracing::info!("Loaded {}", label),
        }
    }
}

/// Issues the startup loads and tracks their completion
pub struct PortalAssetsPlugin;

impl Plugin for PortalAssetsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AssetStatus>()
            .add_systems(Startup, load_portal_assets)
            .add_systems(PreUpdate, track_asset_loads);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_state_mapping() {
        assert_eq!(LoadStatus::from_load_state(None), None);
        assert_eq!(LoadStatus::from_load_state(Some(LoadState::Loading)), None);
        assert_eq!(LoadStatus::from_load_state(Some(LoadState::NotLoaded)), None);
        assert_eq!(
            LoadStatus::from_load_state(Some(LoadState::Loaded)),
            Some(LoadStatus::Ready)
        );
    }

    #[test]
    fn test_load_settles_once() {
        let mut status = LoadStatus::default();
        assert!(!status.advance(None));
        assert!(!status.advance(Some(LoadState::Loading)));
        assert!(status.is_pending());

        assert!(status.advance(Some(LoadState::Loaded)));
        assert_eq!(status, LoadStatus::Ready);

        // Later states are ignored once settled
        assert!(!status.advance(Some(LoadState::NotLoaded)));
        assert!(!status.advance(Some(LoadState::Loaded)));
        assert_eq!(status, LoadStatus::Ready);
    }

    #[test]
    fn test_warnings_list_failures_only() {
        let mut status = AssetStatus::default();
        assert!(status.warnings().is_empty());

        status.baked_texture = LoadStatus::Ready;
        status.soundtrack = LoadStatus::Failed("not found".to_string());
        status.scene = SceneStatus::Failed("Model is missing required nodes: baked".to_string());

        assert_eq!(
            status.warnings(),
            vec![
                "Soundtrack failed to load: not found".to_string(),
                "Model is missing required nodes: baked".to_string(),
            ]
        );
    }
}
