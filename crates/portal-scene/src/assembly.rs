//! Attaching bank materials to the loaded model
//!
//! The model scene is spawned hidden as soon as the glTF is loaded. Once the
//! scene instance is ready its named nodes are resolved, every mesh below a
//! bound node gets the material of its slot, and the root is made visible.
//! A model missing any required node is despawned and reported instead.

use bevy::gltf::Gltf;
use bevy::prelude::*;
use bevy::scene::{SceneInstance, SceneSpawner};
use portal_core::{resolve_nodes, AssemblyError, NodeBindings};

use crate::assets::{AssetStatus, PortalAssets, SceneStatus};
use crate::materials::{MaterialBank, SlotMaterial};

/// Root entity of the spawned model scene
#[derive(Component)]
pub struct PortalModel;

/// Marker added once materials are attached
#[derive(Component)]
pub struct Assembled;

/// Resolve the named nodes below `root` and queue material assignments
///
/// Nodes are searched breadth first, so a node closer to the root wins over a
/// deeper one with the same name.
pub fn attach_materials(
    commands: &mut Commands,
    root: Entity,
    bank: &MaterialBank,
    names: &Query<&Name>,
    children: &Query<&Children>,
    meshes: &Query<(), With<Mesh3d>>,
) -> Result<NodeBindings<Entity>, AssemblyError> {
    let nodes = children
        .iter_descendants(root)
        .filter_map(|entity| names.get(entity).ok().map(|name| (entity, name.as_str())));
    let bindings = resolve_nodes(nodes)?;

    for (node, slot) in bindings.assignments() {
        let material = bank.slot(slot);
        let targets = std::iter::once(node)
            .chain(children.iter_descendants(node))
            .filter(|entity| meshes.contains(*entity));

        for target in targets {
            let mut entity = commands.entity(target);
            match &material {
                SlotMaterial::Standard(handle) => {
                    entity.insert(MeshMaterial3d(handle.clone()));
                }
                SlotMaterial::Portal(handle) => {
                    entity
                        .remove::<MeshMaterial3d<StandardMaterial>>()
                        .insert(MeshMaterial3d(handle.clone()));
                }
            }
        }
    }

    Ok(bindings)
}

fn spawn_portal_model(
    mut commands: Commands,
    assets: Option<Res<PortalAssets>>,
    gltf_assets: Res<Assets<Gltf>>,
    mut status: ResMut<AssetStatus>,
    existing: Query<(), With<PortalModel>>,
) {
    if !status.model.is_ready() || status.scene != SceneStatus::Waiting || !existing.is_empty() {
        return;
    }
    let Some(gltf) = assets.and_then(|assets| gltf_assets.get(&assets.model)) else {
        return;
    };

    // Use first scene if no default
    let scene = gltf
        .default_scene
        .clone()
        .or_else(|| gltf.scenes.first().cloned());
    spawn_model_root(&mut commands, &mut status, scene);
}

fn spawn_model_root(
    commands: &mut Commands,
    status: &mut AssetStatus,
    scene: Option<Handle<Scene>>,
) -> Option<Entity> {
    let Some(scene) = scene else {
        tracing::error!("Model contains no scenes");
        status.scene = SceneStatus::Failed("Model contains no scenes".to_string());
        return None;
    };

    tracing::info!("Spawning portal model");
    let root = commands
        .spawn((SceneRoot(scene), Visibility::Hidden, PortalModel, Name::new("portal")))
        .id();
    Some(root)
}

/// Attach materials below a ready root, then reveal it or drop it
fn finish_assembly(
    commands: &mut Commands,
    root: Entity,
    bank: &MaterialBank,
    status: &mut AssetStatus,
    names: &Query<&Name>,
    children: &Query<&Children>,
    meshes: &Query<(), With<Mesh3d>>,
) {
    match attach_materials(commands, root, bank, names, children, meshes) {
        Ok(bindings) => {
            tracing::info!("Portal model assembled ({} nodes)", bindings.len());
            commands.entity(root).insert((Visibility::Inherited, Assembled));
            status.scene = SceneStatus::Assembled;
        }
        Err(err) => {
            tracing::error!("Scene assembly aborted: {}", err);
            commands.entity(root).despawn();
            status.scene = SceneStatus::Failed(err.to_string());
        }
    }
}

fn assemble_portal_model(
    mut commands: Commands,
    scene_spawner: Res<SceneSpawner>,
    bank: Option<Res<MaterialBank>>,
    mut status: ResMut<AssetStatus>,
    roots: Query<(Entity, &SceneInstance), (With<PortalModel>, Without<Assembled>)>,
    names: Query<&Name>,
    children: Query<&Children>,
    meshes: Query<(), With<Mesh3d>>,
) {
    let Some(bank) = bank else {
        return;
    };

    for (root, instance) in &roots {
        if !scene_spawner.instance_is_ready(**instance) {
            continue;
        }

        finish_assembly(
            &mut commands,
            root,
            &bank,
            &mut status,
            &names,
            &children,
            &meshes,
        );
    }
}

/// Spawns the model once loaded and assembles it when the instance is ready
pub struct AssemblyPlugin;

impl Plugin for AssemblyPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (spawn_portal_model, assemble_portal_model).chain());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{FirefliesMaterial, PortalMaterial};
    use bevy::ecs::system::RunSystemOnce;
    use portal_core::{NodeRole, ParameterSet};

    const NODE_NAMES: [&str; 7] = [
        "baked",
        "poleLightA",
        "poleLightB",
        "torchLightA",
        "torchLightB",
        "fireLight",
        "portalLight",
    ];

    struct Model {
        root: Entity,
        /// Mesh primitive below each named node, in `NODE_NAMES` order
        primitives: Vec<Entity>,
    }

    fn bank() -> MaterialBank {
        MaterialBank::build(
            &ParameterSet::default(),
            None,
            1.0,
            &mut Assets::<StandardMaterial>::default(),
            &mut Assets::<PortalMaterial>::default(),
            &mut Assets::<FirefliesMaterial>::default(),
        )
    }

    /// Root, an unnamed scene node, then one named node per entry with a mesh child
    fn spawn_model(world: &mut World, names: &[&str]) -> Model {
        let root = world.spawn(PortalModel).id();
        let scene = world.spawn(ChildOf(root)).id();
        let mut primitives = Vec::new();
        for name in names {
            let node = world.spawn((Name::new(name.to_string()), ChildOf(scene))).id();
            let primitive = world
                .spawn((
                    Name::new(format!("{name}.mesh")),
                    Mesh3d(Handle::default()),
                    MeshMaterial3d(Handle::<StandardMaterial>::default()),
                    ChildOf(node),
                ))
                .id();
            primitives.push(primitive);
        }
        Model { root, primitives }
    }

    fn run_attach(
        world: &mut World,
        root: Entity,
        bank: &MaterialBank,
    ) -> Result<NodeBindings<Entity>, AssemblyError> {
        let bank = bank.clone();
        world
            .run_system_once(
                move |mut commands: Commands,
                      names: Query<&Name>,
                      children: Query<&Children>,
                      meshes: Query<(), With<Mesh3d>>| {
                    attach_materials(&mut commands, root, &bank, &names, &children, &meshes)
                },
            )
            .unwrap()
    }

    fn run_finish(world: &mut World, root: Entity, bank: &MaterialBank) {
        let bank = bank.clone();
        world
            .run_system_once(
                move |mut commands: Commands,
                      mut status: ResMut<AssetStatus>,
                      names: Query<&Name>,
                      children: Query<&Children>,
                      meshes: Query<(), With<Mesh3d>>| {
                    finish_assembly(
                        &mut commands,
                        root,
                        &bank,
                        &mut status,
                        &names,
                        &children,
                        &meshes,
                    );
                },
            )
            .unwrap();
    }

    fn model_roots(world: &mut World) -> Vec<Entity> {
        world
            .query_filtered::<Entity, With<PortalModel>>()
            .iter(world)
            .collect()
    }

    fn standard_handle(world: &World, entity: Entity) -> Option<Handle<StandardMaterial>> {
        world
            .get::<MeshMaterial3d<StandardMaterial>>(entity)
            .map(|m| m.0.clone())
    }

    #[test]
    fn test_full_model_gets_bank_materials() {
        let mut world = World::new();
        let bank = bank();
        let model = spawn_model(&mut world, &NODE_NAMES);

        let bindings = run_attach(&mut world, model.root, &bank).unwrap();
        assert_eq!(bindings.len(), 7);

        let [baked, pole_a, pole_b, torch_a, torch_b, fire, portal] = model.primitives[..] else {
            panic!("expected seven primitives");
        };
        assert_eq!(standard_handle(&world, baked), Some(bank.baked.clone()));
        for light in [pole_a, pole_b, torch_a, torch_b] {
            assert_eq!(standard_handle(&world, light), Some(bank.pole_light.clone()));
        }
        assert_eq!(standard_handle(&world, fire), Some(bank.fire_light.clone()));

        assert_eq!(standard_handle(&world, portal), None);
        let portal_material = world.get::<MeshMaterial3d<PortalMaterial>>(portal).unwrap();
        assert_eq!(portal_material.0, bank.portal);
    }

    #[test]
    fn test_missing_node_leaves_model_untouched() {
        let mut world = World::new();
        let bank = bank();
        let model = spawn_model(&mut world, &NODE_NAMES[..6]);

        let err = run_attach(&mut world, model.root, &bank).unwrap_err();
        assert_eq!(
            err,
            AssemblyError::MissingNodes {
                names: vec!["portalLight"]
            }
        );
        for primitive in model.primitives {
            assert_eq!(standard_handle(&world, primitive), Some(Handle::default()));
        }
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let mut world = World::new();
        let bank = bank();
        let model = spawn_model(&mut world, &NODE_NAMES);

        let first = run_attach(&mut world, model.root, &bank).unwrap();
        let second = run_attach(&mut world, model.root, &bank).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            standard_handle(&world, model.primitives[0]),
            Some(bank.baked.clone())
        );
        assert!(world
            .get::<MeshMaterial3d<PortalMaterial>>(model.primitives[6])
            .is_some());
    }

    #[test]
    fn test_shallow_node_wins() {
        let mut world = World::new();
        let bank = bank();
        let model = spawn_model(&mut world, &NODE_NAMES);

        // A deeper node reusing a required name is ignored
        let decoy = world
            .spawn((Name::new("baked"), ChildOf(model.primitives[1])))
            .id();

        let bindings = run_attach(&mut world, model.root, &bank).unwrap();
        let baked_node = world.get::<ChildOf>(model.primitives[0]).unwrap().parent();
        assert_eq!(bindings.get(NodeRole::Baked), Some(baked_node));
        assert_ne!(bindings.get(NodeRole::Baked), Some(decoy));
    }

    #[test]
    fn test_model_root_spawns_hidden() {
        let mut world = World::new();
        world.init_resource::<AssetStatus>();

        let root = world
            .run_system_once(|mut commands: Commands, mut status: ResMut<AssetStatus>| {
                spawn_model_root(&mut commands, &mut status, Some(Handle::default()))
            })
            .unwrap()
            .unwrap();

        assert_eq!(model_roots(&mut world), vec![root]);
        assert_eq!(world.get::<Visibility>(root), Some(&Visibility::Hidden));
        assert!(world.get::<Assembled>(root).is_none());
        assert_eq!(world.resource::<AssetStatus>().scene, SceneStatus::Waiting);
    }

    #[test]
    fn test_model_without_scene_is_reported() {
        let mut world = World::new();
        world.init_resource::<AssetStatus>();

        let root = world
            .run_system_once(|mut commands: Commands, mut status: ResMut<AssetStatus>| {
                spawn_model_root(&mut commands, &mut status, None)
            })
            .unwrap();

        assert_eq!(root, None);
        assert!(model_roots(&mut world).is_empty());
        assert!(matches!(
            world.resource::<AssetStatus>().scene,
            SceneStatus::Failed(_)
        ));
    }

    #[test]
    fn test_assembled_root_becomes_visible() {
        let mut world = World::new();
        world.init_resource::<AssetStatus>();
        let bank = bank();
        let model = spawn_model(&mut world, &NODE_NAMES);
        world.entity_mut(model.root).insert(Visibility::Hidden);

        run_finish(&mut world, model.root, &bank);

        assert_eq!(model_roots(&mut world), vec![model.root]);
        assert_eq!(world.get::<Visibility>(model.root), Some(&Visibility::Inherited));
        assert!(world.get::<Assembled>(model.root).is_some());
        assert_eq!(world.resource::<AssetStatus>().scene, SceneStatus::Assembled);
        assert!(world.resource::<AssetStatus>().warnings().is_empty());
    }

    #[test]
    fn test_missing_nodes_despawn_root() {
        let mut world = World::new();
        world.init_resource::<AssetStatus>();
        let bank = bank();
        let model = spawn_model(&mut world, &NODE_NAMES[1..]);

        run_finish(&mut world, model.root, &bank);

        assert!(world.get_entity(model.root).is_err());
        assert!(model_roots(&mut world).is_empty());
        let status = world.resource::<AssetStatus>();
        match &status.scene {
            SceneStatus::Failed(reason) => assert!(reason.contains("baked"), "{reason}"),
            other => panic!("expected failed assembly, got {other:?}"),
        }
        assert_eq!(status.warnings().len(), 1);
    }
}
