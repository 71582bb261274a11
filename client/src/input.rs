use bevy::{
    input::{ButtonState, keyboard::KeyboardInput, mouse::MouseMotion},
    prelude::*,
    window::{CursorGrabMode, CursorOptions, PrimaryWindow},
};
use crypt_shared::{InputSource, KeyEvent};
use leafwing_input_manager::prelude::*;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    CapturePointer,
    ReleasePointer,
    SkipIntro,
}

/// Raw platform input gathered this frame, handed to the controller as an `InputSource`.
#[derive(Resource, Default, Debug)]
pub struct FrameInput {
    keys: Vec<KeyEvent>,
    moves: Vec<(f32, f32)>,
    captured: bool,
}

impl InputSource for FrameInput {
    fn for_each_key_event(&mut self, f: &mut dyn FnMut(KeyEvent)) {
        for ev in self.keys.drain(..) {
            f(ev);
        }
    }

    fn for_each_pointer_move(&mut self, f: &mut dyn FnMut(f32, f32)) {
        for (dx, dy) in self.moves.drain(..) {
            f(dx, dy);
        }
    }

    fn is_pointer_captured(&self) -> bool {
        self.captured
    }
}

/// Gathering happens before the controller runs.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectInput;

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert(InputAction::CapturePointer, MouseButton::Left);
    input_map.insert(InputAction::ReleasePointer, KeyCode::Escape);
    input_map.insert(InputAction::SkipIntro, KeyCode::Space);
    input_map.insert(InputAction::SkipIntro, KeyCode::Enter);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<InputAction>::default());

    app.init_resource::<FrameInput>();
    app.add_systems(
        Update,
        (toggle_pointer_capture, collect_frame_input)
            .chain()
            .in_set(CollectInput),
    );
}

fn toggle_pointer_capture(
    actions: Res<ActionState<InputAction>>,
    mut cursor: Single<&mut CursorOptions, With<PrimaryWindow>>,
) {
    if actions.just_pressed(&InputAction::CapturePointer) && cursor.grab_mode == CursorGrabMode::None
    {
        cursor.grab_mode = CursorGrabMode::Locked;
        cursor.visible = false;
        debug!("pointer captured");
    } else if actions.just_pressed(&InputAction::ReleasePointer)
        && cursor.grab_mode != CursorGrabMode::None
    {
        cursor.grab_mode = CursorGrabMode::None;
        cursor.visible = true;
        debug!("pointer released");
    }
}

fn collect_frame_input(
    mut frame: ResMut<FrameInput>,
    mut keyboard: MessageReader<KeyboardInput>,
    mut motion: MessageReader<MouseMotion>,
    cursor: Single<&CursorOptions, With<PrimaryWindow>>,
) {
    for ev in keyboard.read() {
        if ev.repeat {
            continue;
        }
        // `KeyCode` debug names match the browser's `KeyboardEvent.code` ("KeyW", "ArrowUp").
        let code = format!("{:?}", ev.key_code);
        frame.keys.push(match ev.state {
            ButtonState::Pressed => KeyEvent::Down(code),
            ButtonState::Released => KeyEvent::Up(code),
        });
    }

    for ev in motion.read() {
        frame.moves.push((ev.delta.x, ev.delta.y));
    }

    frame.captured = cursor.grab_mode != CursorGrabMode::None;
}
