use bevy::prelude::*;
use crypt_shared::{ControllerConfig, Feature, FirstPersonController, FrameOutput, SpawnPoint};

use crate::{
    input::{CollectInput, FrameInput},
    level::{Exhibits, WorldCollision},
};

/// The local first-person controller.
#[derive(Resource, Deref, DerefMut)]
pub struct Player(pub FirstPersonController);

/// Result of the most recent controller frame.
#[derive(Resource, Default, Debug)]
pub struct LastFrame(pub Option<FrameOutput>);

/// Runs after the controller has produced this frame's pose.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerMoved;

pub(super) fn plugin(app: &mut App) {
    let config = ControllerConfig::default()
        .with_spawn(SpawnPoint::INTRO)
        .with_feature(Feature::GroundDetection, true)
        .with_feature(Feature::PoiProximity, true);

    match FirstPersonController::new(config) {
        Ok(mut controller) => {
            // Input is handed over when the intro ends.
            controller.set_movement_enabled(false);
            app.insert_resource(Player(controller));
        }
        Err(err) => error!("invalid controller configuration: {err}"),
    }

    app.init_resource::<LastFrame>();
    app.add_systems(
        Update,
        drive_player
            .after(CollectInput)
            .before(PlayerMoved)
            .run_if(resource_exists::<Player>),
    );
}

fn drive_player(
    time: Res<Time>,
    mut player: ResMut<Player>,
    mut frame_input: ResMut<FrameInput>,
    collision: Res<WorldCollision>,
    exhibits: Res<Exhibits>,
    mut last: ResMut<LastFrame>,
) {
    let out = player.frame(
        time.delta_secs(),
        &mut *frame_input,
        &collision.world,
        &exhibits.0,
    );
    last.0 = Some(out);
}
