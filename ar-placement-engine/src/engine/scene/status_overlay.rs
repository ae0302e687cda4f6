use bevy::prelude::*;
use constants::render_settings::STATUS_FONT_SIZE;

#[derive(Component)]
pub struct StatusText;

pub fn spawn_status_overlay(mut commands: Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("Initialising AR..."),
                TextFont {
                    font_size: STATUS_FONT_SIZE,
                    ..default()
                },
                TextColor(Color::WHITE),
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(12.0),
                    left: Val::Px(12.0),
                    ..default()
                },
                StatusText,
            ));
        });
}
