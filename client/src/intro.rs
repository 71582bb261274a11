use bevy::prelude::*;
use crypt_shared::{SpawnPoint, constants::INTRO_DURATION_SECS};
use leafwing_input_manager::prelude::ActionState;

use crate::{
    input::InputAction,
    level::LevelReady,
    player::{Player, PlayerMoved},
};

/// Counts down while the intro plays. Removed once control is handed over.
#[derive(Resource)]
struct Intro(Timer);

#[derive(Component)]
struct Instructions;

const INSTRUCTIONS: &str = "Klikni za pogled mišem, WASD za kretanje, Esc za izlaz\n\
Click to look around, WASD to walk, Esc to release the mouse\n\n\
Space / Enter: preskoči uvod / skip intro";

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(Intro(Timer::from_seconds(
        INTRO_DURATION_SECS,
        TimerMode::Once,
    )));
    app.add_systems(Startup, spawn_instructions);
    app.add_systems(
        Update,
        play_intro
            .before(PlayerMoved)
            .run_if(resource_exists::<Intro>.and(resource_exists::<Player>)),
    );
}

fn spawn_instructions(mut commands: Commands) {
    commands.spawn((
        Instructions,
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(32.0),
            width: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            ..default()
        },
        children![(
            Text::new(INSTRUCTIONS),
            TextFont {
                font_size: 18.0,
                ..default()
            },
            TextLayout::new_with_justify(Justify::Center),
            TextColor(Color::srgb(0.9, 0.9, 0.9)),
        )],
    ));
}

/// Ticks only once the level has loaded. Ends on timeout, or on skip at any time.
fn play_intro(
    mut commands: Commands,
    time: Res<Time>,
    mut intro: ResMut<Intro>,
    ready: Res<LevelReady>,
    actions: Res<ActionState<InputAction>>,
    mut player: ResMut<Player>,
    instructions: Query<Entity, With<Instructions>>,
) {
    let skipped = actions.just_pressed(&InputAction::SkipIntro);
    if !skipped && (!ready.0 || !intro.0.tick(time.delta()).is_finished()) {
        return;
    }

    info!("intro over (skipped: {skipped}), handing control to the player");
    player.teleport(&SpawnPoint::CONTROLS);
    player.set_movement_enabled(true);

    commands.remove_resource::<Intro>();
    for entity in &instructions {
        commands.entity(entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypt_shared::{ControllerConfig, FirstPersonController};

    fn intro_app(skip: bool) -> App {
        let mut app = App::new();
        app.init_resource::<Time>();
        app.init_resource::<LevelReady>();
        app.insert_resource(Intro(Timer::from_seconds(
            INTRO_DURATION_SECS,
            TimerMode::Once,
        )));

        let mut controller =
            FirstPersonController::new(ControllerConfig::default().with_spawn(SpawnPoint::INTRO))
                .expect("default config is valid");
        controller.set_movement_enabled(false);
        app.insert_resource(Player(controller));

        let mut actions = ActionState::<InputAction>::default();
        if skip {
            actions.press(&InputAction::SkipIntro);
        }
        app.insert_resource(actions);

        app.world_mut().spawn(Instructions);
        app.add_systems(Update, play_intro.run_if(resource_exists::<Intro>));
        app
    }

    #[test]
    fn skip_hands_over_control_before_the_level_is_ready() {
        let mut app = intro_app(true);
        app.update();

        let world = app.world_mut();
        assert!(!world.contains_resource::<Intro>());
        assert!(world.resource::<Player>().movement_enabled());
        let remaining = world
            .query_filtered::<Entity, With<Instructions>>()
            .iter(world)
            .count();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn intro_waits_for_the_level_without_skip() {
        let mut app = intro_app(false);
        app.update();

        assert!(app.world().contains_resource::<Intro>());
        assert!(!app.world().resource::<Player>().movement_enabled());
    }
}
