//! Debug/performance tooling for native dev builds.
//!
//! Gated behind `dev_native` in `main.rs`. Shows the perf overlay plus a
//! readout of the controller state (eye position, speed, floor contact).

use bevy::diagnostic::{EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use iyes_perf_ui::prelude::*;

use crate::{
    level::WorldCollision,
    player::{LastFrame, Player, PlayerMoved},
};

#[derive(Component)]
struct ControllerReadout;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        PerfUiPlugin,
    ));

    app.add_systems(Startup, (spawn_perf_ui, spawn_readout));
    app.add_systems(
        Update,
        update_readout
            .after(PlayerMoved)
            .run_if(resource_exists::<Player>),
    );
}

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn(PerfUiAllEntries::default());
}

fn spawn_readout(mut commands: Commands) {
    commands.spawn((
        ControllerReadout,
        Text::new(""),
        TextFont {
            font_size: 12.0,
            ..default()
        },
        Node {
            position_type: PositionType::Absolute,
            right: Val::Px(8.0),
            bottom: Val::Px(8.0),
            ..default()
        },
    ));
}

fn update_readout(
    player: Res<Player>,
    last: Res<LastFrame>,
    collision: Res<WorldCollision>,
    mut readout: Single<&mut Text, With<ControllerReadout>>,
) {
    let pose = player.pose();
    let movement = player.movement();
    let contact = last
        .0
        .as_ref()
        .and_then(|f| f.step.collision)
        .map(|p| format!("{:.3} along ({:.2}, {:.2}, {:.2})", p.depth, p.normal.x, p.normal.y, p.normal.z))
        .unwrap_or_else(|| "none".to_string());

    readout.0 = format!(
        "eye ({:.2}, {:.2}, {:.2})  yaw {:.1}°  pitch {:.1}°\n\
         speed {:.2} m/s  floor {}  contact {}\n\
         collision triangles {}  input {}",
        pose.position.x,
        pose.position.y,
        pose.position.z,
        pose.yaw.to_degrees(),
        pose.pitch.to_degrees(),
        movement.velocity().norm(),
        movement.on_floor(),
        contact,
        collision.world.triangle_count(),
        if player.movement_enabled() { "on" } else { "off" },
    );
}
