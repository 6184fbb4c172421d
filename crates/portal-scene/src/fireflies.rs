//! Firefly field spawning

use bevy::asset::RenderAssetUsages;
use bevy::camera::visibility::NoFrustumCulling;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use portal_core::FireflyField;

use crate::materials::MaterialBank;
use crate::SceneConfig;

/// Marker for the firefly sprite mesh
#[derive(Component)]
pub struct Fireflies;

const CORNERS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Build one sprite quad per firefly
///
/// The four vertices of a quad share the firefly position; the vertex shader
/// spreads them on screen using the corner in `UV_0` and the scale in `UV_1`.
pub fn build_firefly_mesh(field: &FireflyField) -> Mesh {
    let count = field.len();
    let mut positions = Vec::with_capacity(count * 4);
    let mut corners = Vec::with_capacity(count * 4);
    let mut scales = Vec::with_capacity(count * 4);
    let mut indices = Vec::with_capacity(count * 6);

    for (i, (position, scale)) in field.positions.iter().zip(&field.scales).enumerate() {
        let base = (i * 4) as u32;
        for corner in CORNERS {
            positions.push(*position);
            corners.push(corner);
            scales.push([*scale, 0.0]);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, corners)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_1, scales)
        .with_inserted_indices(Indices::U32(indices))
}

pub(crate) fn spawn_fireflies(
    mut commands: Commands,
    config: Res<SceneConfig>,
    bank: Res<MaterialBank>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    let field = FireflyField::generate(&config.fireflies.volume(), &mut rand::thread_rng());
    tracing::info!("Spawning {} fireflies", field.len());

    commands.spawn((
        Mesh3d(meshes.add(build_firefly_mesh(&field))),
        MeshMaterial3d(bank.fireflies.clone()),
        Transform::default(),
        // Vertices are displaced in the shader, the mesh bounds are meaningless
        NoFrustumCulling,
        Fireflies,
        Name::new("fireflies"),
    ));
}

/// Generates and spawns the firefly field at startup
pub struct FirefliesPlugin;

impl Plugin for FirefliesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            spawn_fireflies.after(crate::materials::setup_material_bank),
        );
    }
}
