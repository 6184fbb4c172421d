//! Firefly point cloud generation and the math of the firefly shader
//!
//! The field is generated once at startup. The shader functions below are the
//! host-side mirror of `fireflies.wgsl` and are what the tests exercise.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Amplitude of the vertical bobbing, in world units per unit of scale
pub const BOB_AMPLITUDE: f32 = 0.2;
/// Spatial frequency of the bobbing phase along x
pub const BOB_PHASE_FREQUENCY: f32 = 100.0;

/// Bounding volume the fireflies are scattered in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireflyVolume {
    /// Number of fireflies
    pub count: usize,
    /// x and z are drawn from [-half_extent, half_extent)
    pub half_extent: f32,
    /// y is drawn from [0, height)
    pub height: f32,
}

impl Default for FireflyVolume {
    fn default() -> Self {
        Self {
            count: 30,
            half_extent: 3.0,
            height: 4.0,
        }
    }
}

/// Generated firefly positions and scales, as two parallel buffers
#[derive(Debug, Clone, PartialEq)]
pub struct FireflyField {
    pub positions: Vec<[f32; 3]>,
    pub scales: Vec<f32>,
}

impl FireflyField {
    /// Scatter `volume.count` fireflies uniformly inside the volume
    pub fn generate<R: Rng + ?Sized>(volume: &FireflyVolume, rng: &mut R) -> Self {
        let mut positions = Vec::with_capacity(volume.count);
        let mut scales = Vec::with_capacity(volume.count);

        for _ in 0..volume.count {
            let x = (rng.gen::<f32>() - 0.5) * 2.0 * volume.half_extent;
            let y = rng.gen::<f32>() * volume.height;
            let z = (rng.gen::<f32>() - 0.5) * 2.0 * volume.half_extent;
            positions.push([x, y, z]);
            scales.push(rng.gen::<f32>());
        }

        Self { positions, scales }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Vertical displacement applied by the vertex stage
pub fn vertical_offset(time: f32, x: f32, scale: f32) -> f32 {
    (time + x * BOB_PHASE_FREQUENCY).sin() * scale * BOB_AMPLITUDE
}

/// On-screen sprite size in physical pixels for a view-space depth `view_z`
///
/// `view_z` is negative in front of the camera.
pub fn point_size(base_size: f32, scale: f32, pixel_ratio: f32, view_z: f32) -> f32 {
    base_size * scale * pixel_ratio * (1.0 / -view_z)
}

/// Sprite opacity at `distance` from the sprite center (0.5 at the edge midpoints)
pub fn sprite_alpha(distance: f32) -> f32 {
    if distance <= 0.0 {
        return 1.0;
    }
    (0.05 / distance - 0.1).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generation_bounds() {
        let volume = FireflyVolume::default();
        let mut rng = StdRng::seed_from_u64(7);
        let field = FireflyField::generate(&volume, &mut rng);

        assert_eq!(field.len(), 30);
        assert_eq!(field.scales.len(), 30);
        for ([x, y, z], scale) in field.positions.iter().zip(&field.scales) {
            assert!((-3.0..3.0).contains(x), "x out of range: {x}");
            assert!((0.0..4.0).contains(y), "y out of range: {y}");
            assert!((-3.0..3.0).contains(z), "z out of range: {z}");
            assert!((0.0..1.0).contains(scale), "scale out of range: {scale}");
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let volume = FireflyVolume::default();
        let a = FireflyField::generate(&volume, &mut StdRng::seed_from_u64(1));
        let b = FireflyField::generate(&volume, &mut StdRng::seed_from_u64(2));
        assert_ne!(a.positions, b.positions);

        // Same seed reproduces the field
        let c = FireflyField::generate(&volume, &mut StdRng::seed_from_u64(1));
        assert_eq!(a, c);
    }

    #[test]
    fn test_vertical_offset() {
        assert_eq!(vertical_offset(0.0, 0.0, 1.0), 0.0);
        let t = std::f32::consts::FRAC_PI_2;
        assert!((vertical_offset(t, 0.0, 1.0) - 0.2).abs() < 1e-6);
        assert!((vertical_offset(t, 0.0, 0.5) - 0.1).abs() < 1e-6);
        // Zero scale never moves
        assert_eq!(vertical_offset(12.3, 0.7, 0.0), 0.0);
    }

    #[test]
    fn test_point_size_decreases_with_depth() {
        let mut previous = f32::INFINITY;
        for depth in [0.5_f32, 1.0, 2.0, 5.0, 10.0, 50.0] {
            let size = point_size(300.0, 0.5, 2.0, -depth);
            assert!(size < previous, "size {size} at depth {depth} not below {previous}");
            previous = size;
        }
        assert!((point_size(300.0, 0.5, 2.0, -10.0) - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_sprite_alpha_falloff() {
        assert_eq!(sprite_alpha(0.0), 1.0);
        assert_eq!(sprite_alpha(0.025), 1.0);
        assert!((sprite_alpha(0.25) - 0.1).abs() < 1e-6);
        // Fully transparent from 0.5 outwards
        assert_eq!(sprite_alpha(0.5), 0.0);
        assert_eq!(sprite_alpha(0.7), 0.0);
    }
}
