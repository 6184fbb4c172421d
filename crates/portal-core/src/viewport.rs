//! Render surface dimensions

/// Logical size of the render surface and the device scale factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scale_factor: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            scale_factor: 1.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32, scale_factor: f32) -> Self {
        Self {
            width,
            height,
            scale_factor,
        }
    }

    /// Camera aspect ratio; 1.0 while the surface is collapsed
    pub fn aspect_ratio(&self) -> f32 {
        if self.width <= 0.0 || self.height <= 0.0 {
            return 1.0;
        }
        self.width / self.height
    }

    /// Device pixel ratio capped at `max`
    pub fn pixel_ratio(&self, max: f32) -> f32 {
        self.scale_factor.min(max)
    }
}
