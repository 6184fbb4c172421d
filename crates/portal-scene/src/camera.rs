//! Camera controls and orbit navigation
//!
//! Orbit, dolly and pan deltas are accumulated from pointer input and eased
//! into the camera pose a fraction at a time, which gives the controls their
//! inertia. The camera is Y-up and starts looking at the target.

use std::f32::consts::{PI, TAU};

use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use crate::SceneConfig;

/// Keeps the camera off the poles
const POLAR_EPSILON: f32 = 1e-4;
/// Dolly scale per wheel step
const DOLLY_BASE: f32 = 0.95;
/// Pixel scroll deltas per wheel step
const PIXELS_PER_STEP: f32 = 100.0;

/// Damped orbit controller state
#[derive(Debug, Clone, Resource)]
pub struct OrbitControls {
    pub target: Vec3,
    pub radius: f32,
    /// Angle around +Y, zero on +Z
    pub azimuth: f32,
    /// Angle from +Y
    pub polar: f32,
    /// Vertical field of view in radians, used to scale panning
    pub fov: f32,
    /// Fraction of the pending motion applied per update, 1.0 disables inertia
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pending_azimuth: f32,
    pending_polar: f32,
    pending_pan: Vec3,
    pending_scale: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::from_pose(Vec3::new(-10.0, 5.0, 10.0), Vec3::ZERO, 45f32.to_radians(), 0.05)
    }
}

impl OrbitControls {
    /// Controller placing the camera at `position`, looking at `target`
    pub fn from_pose(position: Vec3, target: Vec3, fov: f32, damping_factor: f32) -> Self {
        let offset = position - target;
        let radius = offset.length();
        let (azimuth, polar) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, PI / 2.0)
        };

        Self {
            target,
            radius,
            azimuth,
            polar: polar.clamp(POLAR_EPSILON, PI - POLAR_EPSILON),
            fov,
            damping_factor: damping_factor.clamp(f32::EPSILON, 1.0),
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_pan: Vec3::ZERO,
            pending_scale: 1.0,
        }
    }

    /// Queue an orbit for a pointer drag of `delta` pixels
    pub fn rotate(&mut self, delta: Vec2, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.pending_azimuth -= TAU * delta.x / height * self.rotate_speed;
        self.pending_polar -= TAU * delta.y / height * self.rotate_speed;
    }

    /// Queue a dolly; positive steps move towards the target
    pub fn dolly(&mut self, steps: f32) {
        self.pending_scale *= DOLLY_BASE.powf(steps * self.zoom_speed);
    }

    /// Queue a dolly by a distance ratio, as produced by a pinch
    pub fn dolly_ratio(&mut self, ratio: f32) {
        if ratio.is_finite() && ratio > 0.0 {
            self.pending_scale *= ratio;
        }
    }

    /// Queue a pan for a pointer drag of `delta` pixels
    ///
    /// The target moves in the camera plane so that the point under the
    /// pointer follows it at the target's depth.
    pub fn pan(&mut self, delta: Vec2, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        let distance = self.radius * (self.fov / 2.0).tan();
        let transform = self.transform();
        let left = -transform.right() * (2.0 * delta.x * distance / height);
        let up = transform.up() * (2.0 * delta.y * distance / height);
        self.pending_pan += (left + up) * self.pan_speed;
    }

    /// Advance one step and return the new camera pose
    pub fn update(&mut self) -> Transform {
        let damping = self.damping_factor;

        self.azimuth += self.pending_azimuth * damping;
        self.polar = (self.polar + self.pending_polar * damping)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.radius = (self.radius * self.pending_scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pending_pan * damping;

        self.pending_azimuth *= 1.0 - damping;
        self.pending_polar *= 1.0 - damping;
        self.pending_pan *= 1.0 - damping;
        self.pending_scale = 1.0;

        self.transform()
    }

    pub fn position(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.target
            + self.radius
                * Vec3::new(
                    sin_polar * self.azimuth.sin(),
                    self.polar.cos(),
                    sin_polar * self.azimuth.cos(),
                )
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position()).looking_at(self.target, Vec3::Y)
    }
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Whether the debug panel currently owns the pointer
#[derive(Debug, Default, Resource)]
pub struct PointerCapture(pub bool);

fn spawn_camera(mut commands: Commands, config: Res<SceneConfig>) {
    let camera = &config.camera;
    let fov = camera.fov_degrees.to_radians();
    let controls = OrbitControls::from_pose(
        Vec3::from_array(camera.position),
        Vec3::from_array(camera.target),
        fov,
        camera.damping_factor,
    );
    let msaa = if config.window.antialias {
        Msaa::Sample4
    } else {
        Msaa::Off
    };

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov,
            near: camera.near,
            far: camera.far,
            ..default()
        }),
        // Baked colors are displayed as authored
        Tonemapping::None,
        msaa,
        controls.transform(),
        MainCamera,
    ));
    commands.insert_resource(controls);
}

fn orbit_input(
    mut controls: ResMut<OrbitControls>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    windows: Query<&Window>,
    capture: Res<PointerCapture>,
) {
    let total_motion: Vec2 = mouse_motion.read().map(|motion| motion.delta).sum();
    let scroll_steps: f32 = mouse_wheel
        .read()
        .map(|scroll| match scroll.unit {
            MouseScrollUnit::Line => scroll.y,
            MouseScrollUnit::Pixel => scroll.y / PIXELS_PER_STEP,
        })
        .sum();

    // Drained above either way so nothing queues up while the panel is used
    if capture.0 {
        return;
    }

    let height = windows.iter().next().map(|w| w.height()).unwrap_or(720.0);

    if mouse_button.pressed(MouseButton::Left) {
        controls.rotate(total_motion, height);
    }
    if mouse_button.pressed(MouseButton::Right) {
        controls.pan(total_motion, height);
    }
    if scroll_steps != 0.0 {
        controls.dolly(scroll_steps);
    }

    // Touch support for mobile
    let touches: Vec<_> = touch_input.iter().collect();
    match touches.as_slice() {
        [touch] => controls.rotate(touch.delta(), height),
        [t1, t2] => {
            // Pinch to zoom
            let curr_dist = t1.position().distance(t2.position());
            let prev_dist = (t1.position() - t1.delta()).distance(t2.position() - t2.delta());
            controls.dolly_ratio(prev_dist / curr_dist.max(1.0));
        }
        _ => {}
    }
}

pub(crate) fn update_orbit_camera(
    mut controls: ResMut<OrbitControls>,
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
) {
    let pose = controls.update();
    if let Ok(mut transform) = camera_query.single_mut() {
        *transform = pose;
    }
}

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerCapture>()
            .init_resource::<OrbitControls>()
            .add_systems(Startup, spawn_camera)
            .add_systems(Update, orbit_input)
            .add_systems(
                Update,
                update_orbit_camera
                    .after(orbit_input)
                    .after(crate::frame::advance_shader_clock),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_near(a: Vec3, b: Vec3) {
        assert!(a.distance(b) < 1e-3, "{a} != {b}");
    }

    #[test]
    fn test_initial_pose() {
        let controls = OrbitControls::default();
        assert!((controls.radius - 15.0).abs() < 1e-4);
        assert_vec_near(controls.position(), Vec3::new(-10.0, 5.0, 10.0));

        let transform = controls.transform();
        assert_vec_near(transform.forward().as_vec3(), Vec3::new(10.0, -5.0, -10.0).normalize());
    }

    #[test]
    fn test_update_without_input_is_stable() {
        let mut controls = OrbitControls::default();
        let before = controls.position();
        for _ in 0..10 {
            controls.update();
        }
        assert_vec_near(controls.position(), before);
    }

    #[test]
    fn test_damping_eases_rotation() {
        let mut controls = OrbitControls::default();
        let start = controls.azimuth;
        controls.rotate(Vec2::new(-100.0, 0.0), 1000.0);
        let total = TAU * 100.0 / 1000.0;

        // First step applies only the damping fraction
        controls.update();
        assert!((controls.azimuth - start - total * 0.05).abs() < 1e-5);

        // The rest arrives over later frames
        for _ in 0..500 {
            controls.update();
        }
        assert!((controls.azimuth - start - total).abs() < 1e-3);
    }

    #[test]
    fn test_without_damping_rotation_snaps() {
        let mut controls = OrbitControls::from_pose(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 1.0, 1.0);
        controls.rotate(Vec2::new(-250.0, 0.0), 1000.0);
        controls.update();
        assert!((controls.azimuth - TAU / 4.0).abs() < 1e-5);
        assert_vec_near(controls.position(), Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_polar_angle_is_clamped() {
        let mut controls = OrbitControls::from_pose(Vec3::new(0.0, 5.0, 5.0), Vec3::ZERO, 1.0, 1.0);
        controls.rotate(Vec2::new(0.0, 10_000.0), 100.0);
        controls.update();
        assert_eq!(controls.polar, POLAR_EPSILON);
        assert!(controls.position().is_finite());
        assert!(controls.transform().rotation.is_finite());
    }

    #[test]
    fn test_dolly_in_and_out() {
        let mut controls = OrbitControls::default();
        controls.dolly(1.0);
        controls.update();
        assert!((controls.radius - 15.0 * 0.95).abs() < 1e-4);

        controls.dolly(-2.0);
        controls.update();
        assert!((controls.radius - 15.0 / 0.95).abs() < 1e-3);
    }

    #[test]
    fn test_distance_limits() {
        let mut controls = OrbitControls::default();
        controls.min_distance = 5.0;
        controls.dolly(1000.0);
        controls.update();
        assert_eq!(controls.radius, 5.0);
    }

    #[test]
    fn test_pan_moves_target_in_view_plane() {
        let mut controls = OrbitControls::from_pose(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, 1.0, 1.0);
        controls.pan(Vec2::new(100.0, 0.0), 1000.0);
        controls.update();

        // Dragging right moves the target towards -X, keeping the view direction
        assert!(controls.target.x < 0.0);
        assert!(controls.target.y.abs() < 1e-5);
        assert!(controls.target.z.abs() < 1e-5);
        assert!((controls.position().z - 10.0).abs() < 1e-4);
    }
}
