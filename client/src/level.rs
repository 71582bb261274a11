use bevy::{
    asset::LoadState, gltf::Gltf, mesh::VertexAttributeValues, prelude::*,
    scene::SceneInstanceReady,
};
use crypt_shared::{CollisionWorld, PoiRegistry, TriangleMesh, collision::Point3, is_saint_name};

/// One glTF model of the level.
#[derive(Clone, Copy, Debug)]
pub struct LevelModelDef {
    pub path: &'static str,
    /// Contributes triangles to the collision world.
    pub physical: bool,
    /// Rendered. Collision-only proxies are hidden.
    pub visible: bool,
    pub position: [f32; 3],
    /// Euler angles in radians, applied X, then Y, then Z.
    pub rotation: [f32; 3],
    pub scale: f32,
}

pub const LEVEL: &[LevelModelDef] = &[LevelModelDef {
    path: "models/crypt.glb",
    physical: true,
    visible: true,
    position: [0.0, 0.0, 0.0],
    rotation: [0.0, 0.0, 0.0],
    scale: 0.4,
}];

#[derive(Component, Debug, Clone, Copy)]
pub struct LevelModel {
    pub physical: bool,
}

/// The glTF file behind a level model, watched for load failures.
#[derive(Component, Debug)]
struct LevelSource(Handle<Gltf>);

/// Scene instance spawned, waiting one frame so its global transforms are propagated.
#[derive(Component, Debug, Default)]
struct PendingExtraction {
    frames_waited: u8,
}

/// Static collision geometry of every physical model loaded so far.
#[derive(Resource, Default)]
pub struct WorldCollision {
    pub world: CollisionWorld,
    meshes: Vec<TriangleMesh>,
}

/// Saint exhibits found while loading the level.
#[derive(Resource, Default, Deref, DerefMut)]
pub struct Exhibits(pub PoiRegistry);

/// Set once every level model has been processed.
#[derive(Resource, Default, Debug)]
pub struct LevelReady(pub bool);

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<WorldCollision>();
    app.init_resource::<Exhibits>();
    app.init_resource::<LevelReady>();
    app.add_systems(Startup, (spawn_level, spawn_lights));
    app.add_observer(on_scene_ready);
    app.add_systems(
        Update,
        (
            skip_failed_models,
            extract_level_geometry,
            update_level_ready,
        )
            .chain(),
    );
}

fn spawn_level(mut commands: Commands, asset_server: Res<AssetServer>) {
    for def in LEVEL {
        let [x, y, z] = def.position;
        let [rx, ry, rz] = def.rotation;
        let transform = Transform {
            translation: Vec3::new(x, y, z),
            rotation: Quat::from_euler(EulerRot::XYZ, rx, ry, rz),
            scale: Vec3::splat(def.scale),
        };
        let visibility = if def.visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };

        info!("loading level model {} (physical: {})", def.path, def.physical);
        commands.spawn((
            Name::new(def.path),
            SceneRoot(asset_server.load(GltfAssetLabel::Scene(0).from_asset(def.path))),
            transform,
            visibility,
            LevelModel {
                physical: def.physical,
            },
            LevelSource(asset_server.load(def.path)),
        ));
    }
}

fn spawn_lights(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::srgb(1.0, 0.92, 0.8),
        brightness: 120.0,
        ..default()
    });
    commands.spawn((
        PointLight {
            intensity: 2_000_000.0,
            range: 120.0,
            shadows_enabled: true,
            color: Color::srgb(1.0, 0.85, 0.6),
            ..default()
        },
        Transform::from_xyz(-13.0, 12.0, -40.0),
    ));
}

fn on_scene_ready(
    event: On<SceneInstanceReady>,
    mut commands: Commands,
    models: Query<(), With<LevelModel>>,
) {
    if models.get(event.entity).is_ok() {
        commands
            .entity(event.entity)
            .insert(PendingExtraction::default());
    }
}

/// A model whose file failed to load never becomes ready; count it as done
/// so the level still finishes, just without its geometry.
fn skip_failed_models(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    models: Query<
        (Entity, &LevelSource, Option<&Name>),
        (Without<LevelExtracted>, Without<PendingExtraction>),
    >,
) {
    for (entity, source, name) in &models {
        if matches!(
            asset_server.get_load_state(&source.0),
            Some(LoadState::Failed(_))
        ) {
            warn!(
                "level model {} failed to load, continuing without it",
                name.map(Name::as_str).unwrap_or("<unnamed>")
            );
            commands
                .entity(entity)
                .remove::<LevelSource>()
                .insert(LevelExtracted);
        }
    }
}

fn extract_level_geometry(
    mut commands: Commands,
    mut pending: Query<(Entity, &LevelModel, &mut PendingExtraction)>,
    children: Query<&Children>,
    nodes: Query<(Option<&Name>, &GlobalTransform, Option<&Mesh3d>)>,
    mesh_assets: Res<Assets<Mesh>>,
    mut collision: ResMut<WorldCollision>,
    mut exhibits: ResMut<Exhibits>,
) {
    let mut rebuilt = false;
    for (root, model, mut wait) in &mut pending {
        if wait.frames_waited == 0 {
            wait.frames_waited += 1;
            continue;
        }

        let mut triangles = 0usize;
        for entity in children.iter_descendants(root) {
            let Ok((name, global, mesh3d)) = nodes.get(entity) else {
                continue;
            };

            if let Some(name) = name.filter(|n| is_saint_name(n.as_str())) {
                let t = global.translation();
                exhibits.register_saint(name.as_str(), Point3::new(t.x, t.y, t.z));
            }

            if !model.physical {
                continue;
            }
            let Some(mesh) = mesh3d.and_then(|m| mesh_assets.get(&m.0)) else {
                continue;
            };
            if let Some(tris) = world_space_triangles(mesh, global) {
                triangles += tris.indices.len();
                collision.meshes.push(tris);
            }
        }

        if model.physical {
            info!("level model {root}: {triangles} collision triangles");
            rebuilt = true;
        }
        commands
            .entity(root)
            .remove::<(PendingExtraction, LevelSource)>()
            .insert(LevelExtracted);
    }

    if rebuilt {
        let WorldCollision { world, meshes } = &mut *collision;
        *world = CollisionWorld::build(meshes.iter());
        info!(
            "collision world rebuilt: {} triangles, {} exhibits",
            world.triangle_count(),
            exhibits.len()
        );
    }
}

fn update_level_ready(
    mut ready: ResMut<LevelReady>,
    remaining: Query<(), (With<LevelModel>, Without<LevelExtracted>)>,
) {
    if !ready.0 && remaining.is_empty() {
        ready.0 = true;
        info!("level ready");
    }
}

#[derive(Component, Debug)]
struct LevelExtracted;

/// Positions and indices of `mesh`, transformed into world space.
fn world_space_triangles(mesh: &Mesh, global: &GlobalTransform) -> Option<TriangleMesh> {
    let positions = match mesh.attribute(Mesh::ATTRIBUTE_POSITION)? {
        VertexAttributeValues::Float32x3(values) => values,
        _ => return None,
    };
    let affine = global.affine();
    let world: Vec<Point3> = positions
        .iter()
        .map(|&p| {
            let w = affine.transform_point3(Vec3::from_array(p));
            Point3::new(w.x, w.y, w.z)
        })
        .collect();

    let flat: Vec<u32> = match mesh.indices() {
        Some(indices) => indices.iter().map(|i| i as u32).collect(),
        None => (0..world.len() as u32).collect(),
    };
    Some(TriangleMesh::from_flat_indices(world, &flat))
}
