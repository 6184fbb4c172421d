//! Background soundtrack started by the first click

use bevy::audio::Volume;
use bevy::prelude::*;
use portal_core::{AudioGate, AudioState};

use crate::assets::{AssetStatus, PortalAssets};
use crate::SceneConfig;

/// Gate state of the soundtrack
#[derive(Debug, Default, Resource)]
pub struct Soundtrack {
    pub gate: AudioGate,
}

impl Soundtrack {
    pub fn state(&self) -> AudioState {
        self.gate.state()
    }
}

/// Marker for the entity playing the soundtrack
#[derive(Component)]
pub struct SoundtrackPlayer;

fn start_soundtrack(
    mut commands: Commands,
    mut soundtrack: ResMut<Soundtrack>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    status: Res<AssetStatus>,
    assets: Option<Res<PortalAssets>>,
    config: Res<SceneConfig>,
) {
    if soundtrack.gate.is_playing() {
        return;
    }

    let clip_ready = status.soundtrack.is_ready();
    let clicked = mouse_button.get_just_pressed().next().is_some() || touch_input.any_just_pressed();

    let start = if clicked && soundtrack.gate.is_listening() {
        tracing::info!("First click received, starting soundtrack");
        soundtrack.gate.on_click(clip_ready)
    } else {
        soundtrack.gate.on_clip_ready(clip_ready)
    };
    if !start {
        return;
    }
    let Some(assets) = assets else {
        return;
    };

    let playback = if config.audio.looped {
        PlaybackSettings::LOOP
    } else {
        PlaybackSettings::ONCE
    };
    commands.spawn((
        AudioPlayer::new(assets.soundtrack.clone()),
        playback.with_volume(Volume::Linear(config.audio.volume)),
        SoundtrackPlayer,
    ));
}

/// Arms the soundtrack on the first click and plays it once loaded
pub struct SoundtrackPlugin;

impl Plugin for SoundtrackPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Soundtrack>()
            .add_systems(Update, start_soundtrack);
    }
}
