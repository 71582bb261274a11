use bevy::{camera::Exposure, core_pipeline::tonemapping::Tonemapping, prelude::*};
use crypt_shared::CameraPose;

use crate::player::{Player, PlayerMoved};

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(ClearColor(Color::BLACK));
    app.add_systems(Startup, add_camera);
    app.add_systems(
        Update,
        follow_player
            .in_set(PlayerMoved)
            .run_if(resource_exists::<Player>),
    );
}

const FOV_DEGREES: f32 = 60.0;
const NEAR: f32 = 1.0;
const FAR: f32 = 300.0;
const FOG_START: f32 = 1.0;
const FOG_END: f32 = 225.0;

fn add_camera(mut commands: Commands) {
    commands.spawn((
        Exposure::INDOOR,
        Tonemapping::AcesFitted,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: FOV_DEGREES.to_radians(),
            near: NEAR,
            far: FAR,
            ..default()
        }),
        Transform::default(),
        DistanceFog {
            color: Color::BLACK,
            falloff: FogFalloff::Linear {
                start: FOG_START,
                end: FOG_END,
            },
            ..default()
        },
    ));
}

fn follow_player(player: Res<Player>, mut camera: Single<&mut Transform, With<Camera3d>>) {
    **camera = pose_to_transform(&player.pose());
}

/// Yaw about +Y, then pitch about the local X axis.
pub fn pose_to_transform(pose: &CameraPose) -> Transform {
    Transform {
        translation: Vec3::new(pose.position.x, pose.position.y, pose.position.z),
        rotation: Quat::from_euler(EulerRot::YXZ, pose.yaw, pose.pitch, pose.roll),
        scale: Vec3::ONE,
    }
}
