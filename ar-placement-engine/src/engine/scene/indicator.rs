use bevy::prelude::*;
use constants::render_settings::{
    INDICATOR_COLOUR, INDICATOR_INNER_RADIUS, INDICATOR_OUTER_RADIUS,
};

use crate::engine::scene::PlacedVisual;
use crate::tools::placement::context::ArContext;

/// Marker for the preview ring.
#[derive(Component)]
pub struct PlacementIndicator;

pub fn spawn_placement_indicator(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Annulus::new(INDICATOR_INNER_RADIUS, INDICATOR_OUTER_RADIUS))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: INDICATOR_COLOUR,
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            double_sided: true,
            cull_mode: None,
            ..default()
        })),
        Transform::default(),
        Visibility::Hidden,
        PlacementIndicator,
        Name::new("placement_indicator"),
    ));
}

/// Mirror the session's preview state onto the ring.
pub fn update_placement_indicator(
    context: Res<ArContext>,
    mut indicators: Query<
        (&mut Transform, &mut Visibility),
        (With<PlacementIndicator>, Without<PlacedVisual>),
    >,
) {
    let preview = context.session.indicator_pose();
    for (mut transform, mut visibility) in &mut indicators {
        match preview {
            Some(pose) => {
                // Annulus meshes lie in XY; lay the ring flat on the surface.
                transform.translation = pose.position;
                transform.rotation =
                    pose.orientation * Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);
                *visibility = Visibility::Visible;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}
