use bevy::prelude::*;

use crate::player::{LastFrame, PlayerMoved};

#[derive(Component)]
struct InfoPanel;

#[derive(Component)]
struct InfoText;

const HINT: &str = "E | Pritisni E za opis sveca / Press E to read about the saint";

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, spawn_info_panel);
    app.add_systems(Update, update_info_panel.after(PlayerMoved));
}

fn spawn_info_panel(mut commands: Commands) {
    commands.spawn((
        InfoPanel,
        Node {
            position_type: PositionType::Absolute,
            left: Val::Percent(15.0),
            bottom: Val::Px(32.0),
            width: Val::Percent(70.0),
            padding: UiRect::all(Val::Px(16.0)),
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.65)),
        Visibility::Hidden,
        children![(
            InfoText,
            Text::new(""),
            TextFont {
                font_size: 16.0,
                ..default()
            },
            TextColor(Color::srgb(0.95, 0.92, 0.85)),
        )],
    ));
}

/// Show the panel while an exhibit is within reach. Its text stays until the player walks away.
fn update_info_panel(
    last: Res<LastFrame>,
    mut panel: Single<&mut Visibility, With<InfoPanel>>,
    mut text: Single<&mut Text, With<InfoText>>,
) {
    let Some(frame) = last.0.as_ref() else {
        return;
    };

    match (&frame.nearby, &frame.display_text) {
        (Some(_), Some(info)) => {
            if text.0 != *info {
                text.0 = info.clone();
            }
            **panel = Visibility::Inherited;
        }
        (Some(_), None) => {
            if text.0.is_empty() {
                text.0 = HINT.to_string();
            }
            **panel = Visibility::Inherited;
        }
        (None, _) => {
            if !text.0.is_empty() {
                text.0.clear();
            }
            **panel = Visibility::Hidden;
        }
    }
}
