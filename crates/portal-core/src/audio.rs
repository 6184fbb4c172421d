//! One-shot gate for the background soundtrack
//!
//! Browsers only allow audio after a user gesture, so playback waits for the
//! first click. The click listener fires once; later clicks are ignored.

/// Soundtrack playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioState {
    /// No click yet
    #[default]
    Waiting,
    /// Clicked, but the clip has not finished loading
    Armed,
    /// Playback started; loops until the page unloads
    Playing,
}

#[derive(Debug, Clone, Default)]
pub struct AudioGate {
    state: AudioState,
}

impl AudioGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AudioState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == AudioState::Playing
    }

    /// Whether the click listener is still installed
    pub fn is_listening(&self) -> bool {
        self.state == AudioState::Waiting
    }

    /// Handle a click. Returns `true` when playback must start now.
    pub fn on_click(&mut self, clip_ready: bool) -> bool {
        if self.state != AudioState::Waiting {
            return false;
        }
        self.state = AudioState::Armed;
        self.on_clip_ready(clip_ready)
    }

    /// Poll after the clip load state changes. Returns `true` when playback
    /// must start now.
    pub fn on_clip_ready(&mut self, clip_ready: bool) -> bool {
        if self.state == AudioState::Armed && clip_ready {
            self.state = AudioState::Playing;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_playing_before_click() {
        let mut gate = AudioGate::new();
        assert_eq!(gate.state(), AudioState::Waiting);
        assert!(gate.is_listening());
        // Clip loading alone does not start playback
        assert!(!gate.on_clip_ready(true));
        assert!(!gate.is_playing());
    }

    #[test]
    fn test_first_click_starts_playback() {
        let mut gate = AudioGate::new();
        assert!(gate.on_click(true));
        assert!(gate.is_playing());
        assert!(!gate.is_listening());
    }

    #[test]
    fn test_second_click_has_no_effect() {
        let mut gate = AudioGate::new();
        assert!(gate.on_click(true));
        assert!(!gate.on_click(true));
        assert_eq!(gate.state(), AudioState::Playing);
    }

    #[test]
    fn test_click_before_clip_loaded() {
        let mut gate = AudioGate::new();
        assert!(!gate.on_click(false));
        assert_eq!(gate.state(), AudioState::Armed);

        // Further clicks are ignored, the listener is gone
        assert!(!gate.on_click(true));
        assert_eq!(gate.state(), AudioState::Armed);

        // Playback starts once the clip arrives
        assert!(gate.on_clip_ready(true));
        assert!(gate.is_playing());
        assert!(!gate.on_clip_ready(true));
    }
}
