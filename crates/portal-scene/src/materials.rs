//! Scene materials and live parameter application
//!
//! Four materials are built once at startup and shared by handle: the unlit
//! baked material, two flat light colors, and the portal gradient shader. The
//! firefly sprite material lives here too since it shares the shader clock.

use bevy::asset::{embedded_asset, embedded_path, AssetPath};
use bevy::ecs::system::SystemParam;
use bevy::pbr::{Material, MaterialPlugin};
use bevy::prelude::*;
use bevy::render::render_resource::{AsBindGroup, ShaderType};
use bevy::shader::ShaderRef;
use portal_core::{HexColor, MaterialSlot, ParameterChange, ParameterSet};

use crate::assets::PortalAssets;
use crate::SceneConfig;

fn portal_shader() -> ShaderRef {
    AssetPath::from_path_buf(embedded_path!("shaders/portal.wgsl"))
        .with_source("embedded")
        .into()
}

fn fireflies_shader() -> ShaderRef {
    AssetPath::from_path_buf(embedded_path!("shaders/fireflies.wgsl"))
        .with_source("embedded")
        .into()
}

/// Convert a panel color to a render color
pub fn to_color(color: HexColor) -> Color {
    Color::srgb_u8(color.r(), color.g(), color.b())
}

fn to_linear_vec4(color: HexColor) -> Vec4 {
    to_color(color).to_linear().to_vec4()
}

#[derive(Clone, Copy, Debug, Default, ShaderType)]
pub struct PortalUniform {
    pub color_start: Vec4,
    pub color_end: Vec4,
    pub time: f32,
}

/// Animated noise gradient drawn on the portal surface
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct PortalMaterial {
    #[uniform(0)]
    pub uniform: PortalUniform,
}

impl PortalMaterial {
    pub fn new(color_start: HexColor, color_end: HexColor) -> Self {
        Self {
            uniform: PortalUniform {
                color_start: to_linear_vec4(color_start),
                color_end: to_linear_vec4(color_end),
                time: 0.0,
            },
        }
    }

    pub fn set_color_start(&mut self, color: HexColor) {
        self.uniform.color_start = to_linear_vec4(color);
    }

    pub fn set_color_end(&mut self, color: HexColor) {
        self.uniform.color_end = to_linear_vec4(color);
    }
}

impl Material for PortalMaterial {
    fn fragment_shader() -> ShaderRef {
        portal_shader()
    }
}

#[derive(Clone, Copy, Debug, Default, ShaderType)]
pub struct FirefliesUniform {
    pub time: f32,
    /// Base sprite size in pixels
    pub size: f32,
    pub pixel_ratio: f32,
    pub _padding: f32,
}

/// Additive soft sprites for the firefly field
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct FirefliesMaterial {
    #[uniform(0)]
    pub uniform: FirefliesUniform,
}

impl FirefliesMaterial {
    pub fn new(size: f32, pixel_ratio: f32) -> Self {
        Self {
            uniform: FirefliesUniform {
                time: 0.0,
                size,
                pixel_ratio,
                _padding: 0.0,
            },
        }
    }
}

impl Material for FirefliesMaterial {
    fn vertex_shader() -> ShaderRef {
        fireflies_shader()
    }

    fn fragment_shader() -> ShaderRef {
        fireflies_shader()
    }

    fn alpha_mode(&self) -> AlphaMode {
        // Additive blending never writes depth
        AlphaMode::Add
    }
}

/// Handles of every material the scene uses
#[derive(Resource, Debug, Clone)]
pub struct MaterialBank {
    pub baked: Handle<StandardMaterial>,
    pub pole_light: Handle<StandardMaterial>,
    pub fire_light: Handle<StandardMaterial>,
    pub portal: Handle<PortalMaterial>,
    pub fireflies: Handle<FirefliesMaterial>,
}

/// Material handle for a slot of the model
#[derive(Debug, Clone, PartialEq)]
pub enum SlotMaterial {
    Standard(Handle<StandardMaterial>),
    Portal(Handle<PortalMaterial>),
}

impl MaterialBank {
    /// Build the bank from the current parameters
    pub fn build(
        params: &ParameterSet,
        baked_texture: Option<Handle<Image>>,
        pixel_ratio: f32,
        standard: &mut Assets<StandardMaterial>,
        portal: &mut Assets<PortalMaterial>,
        fireflies: &mut Assets<FirefliesMaterial>,
    ) -> Self {
        let baked = standard.add(StandardMaterial {
            base_color_texture: baked_texture,
            unlit: true,
            ..default()
        });
        let pole_light = standard.add(flat_color_material(params.light_color));
        let fire_light = standard.add(flat_color_material(params.fire_color));
        let portal = portal.add(PortalMaterial::new(
            params.portal_color_start,
            params.portal_color_end,
        ));
        let fireflies = fireflies.add(FirefliesMaterial::new(params.fireflies_size, pixel_ratio));

        Self {
            baked,
            pole_light,
            fire_light,
            portal,
            fireflies,
        }
    }

    pub fn slot(&self, slot: MaterialSlot) -> SlotMaterial {
        match slot {
            MaterialSlot::Baked => SlotMaterial::Standard(self.baked.clone()),
            MaterialSlot::PoleLight => SlotMaterial::Standard(self.pole_light.clone()),
            MaterialSlot::FireLight => SlotMaterial::Standard(self.fire_light.clone()),
            MaterialSlot::Portal => SlotMaterial::Portal(self.portal.clone()),
        }
    }
}

fn flat_color_material(color: HexColor) -> StandardMaterial {
    StandardMaterial {
        base_color: to_color(color),
        unlit: true,
        ..default()
    }
}

/// Push one parameter edit into the material or clear color it drives
pub fn apply_parameter_change(
    change: ParameterChange,
    bank: &MaterialBank,
    clear_color: &mut ClearColor,
    standard: &mut Assets<StandardMaterial>,
    portal: &mut Assets<PortalMaterial>,
    fireflies: &mut Assets<FirefliesMaterial>,
) {
    match change {
        ParameterChange::ClearColor(color) => clear_color.0 = to_color(color),
        ParameterChange::LightColor(color) => {
            if let Some(material) = standard.get_mut(&bank.pole_light) {
                material.base_color = to_color(color);
            }
        }
        ParameterChange::FireColor(color) => {
            if let Some(material) = standard.get_mut(&bank.fire_light) {
                material.base_color = to_color(color);
            }
        }
        ParameterChange::PortalColorStart(color) => {
            if let Some(material) = portal.get_mut(&bank.portal) {
                material.set_color_start(color);
            }
        }
        ParameterChange::PortalColorEnd(color) => {
            if let Some(material) = portal.get_mut(&bank.portal) {
                material.set_color_end(color);
            }
        }
        ParameterChange::FirefliesSize(size) => {
            if let Some(material) = fireflies.get_mut(&bank.fireflies) {
                material.uniform.size = size;
            }
        }
    }
    tracing::debug!("Applied parameter {}", change.name());
}

/// Everything a parameter edit can touch
#[derive(SystemParam)]
pub struct ParameterTargets<'w> {
    bank: Option<Res<'w, MaterialBank>>,
    clear_color: ResMut<'w, ClearColor>,
    standard: ResMut<'w, Assets<StandardMaterial>>,
    portal: ResMut<'w, Assets<PortalMaterial>>,
    fireflies: ResMut<'w, Assets<FirefliesMaterial>>,
}

impl ParameterTargets<'_> {
    pub fn apply(&mut self, change: ParameterChange) {
        let Some(bank) = self.bank.as_deref() else {
            return;
        };
        apply_parameter_change(
            change,
            bank,
            &mut self.clear_color,
            &mut self.standard,
            &mut self.portal,
            &mut self.fireflies,
        );
    }
}

/// Live-edited parameter values
#[derive(Resource, Debug, Clone, Default)]
pub struct DebugParameters(pub ParameterSet);

pub(crate) fn setup_material_bank(
    mut commands: Commands,
    config: Res<SceneConfig>,
    assets: Res<PortalAssets>,
    windows: Query<&Window>,
    mut standard: ResMut<Assets<StandardMaterial>>,
    mut portal: ResMut<Assets<PortalMaterial>>,
    mut fireflies: ResMut<Assets<FirefliesMaterial>>,
) {
    let scale_factor = windows.iter().next().map(|w| w.scale_factor()).unwrap_or(1.0);
    let pixel_ratio = scale_factor.min(config.fireflies.max_pixel_ratio);

    let bank = MaterialBank::build(
        &config.params,
        Some(assets.baked_texture.clone()),
        pixel_ratio,
        &mut standard,
        &mut portal,
        &mut fireflies,
    );
    tracing::info!("Material bank ready (pixel ratio {pixel_ratio})");
    commands.insert_resource(bank);
}

/// Registers the custom materials and builds the bank at startup
pub struct MaterialsPlugin;

impl Plugin for MaterialsPlugin {
    fn build(&self, app: &mut App) {
        embedded_asset!(app, "shaders/portal.wgsl");
        embedded_asset!(app, "shaders/fireflies.wgsl");

        app.add_plugins(MaterialPlugin::<PortalMaterial>::default())
            .add_plugins(MaterialPlugin::<FirefliesMaterial>::default())
            .add_systems(
                Startup,
                setup_material_bank.after(crate::assets::load_portal_assets),
            );
    }
}
