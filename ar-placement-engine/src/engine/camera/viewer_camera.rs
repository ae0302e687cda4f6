use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;

use crate::engine::pose::CameraPose;

/// Eye height of the spawned camera above the ground plane.
const DEFAULT_EYE_HEIGHT: f32 = 1.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerSource {
    #[default]
    EngineCamera,
    /// Pushed by the page; engine camera tracking stops.
    Remote,
}

/// Latest known viewer pose. `None` until the first camera frame.
#[derive(Resource, Debug, Default)]
pub struct ViewerPose {
    pub pose: Option<CameraPose>,
    pub source: ViewerSource,
}

impl ViewerPose {
    pub fn set_remote(&mut self, pose: CameraPose) {
        self.pose = Some(pose);
        self.source = ViewerSource::Remote;
    }
}

/// Desktop look state.
#[derive(Resource, Debug)]
pub struct LookController {
    pub yaw: f32,
    pub pitch: f32,
    pub yaw_sensitivity: f32,
    pub pitch_sensitivity: f32,
    pub move_speed: f32,
}

impl Default for LookController {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: -0.35,
            yaw_sensitivity: 0.0035,
            pitch_sensitivity: 0.0030,
            move_speed: 2.0,
        }
    }
}

pub fn spawn_viewer_camera(mut commands: Commands, look: Res<LookController>) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, DEFAULT_EYE_HEIGHT, 0.0).with_rotation(Quat::from_euler(
            EulerRot::YXZ,
            -look.yaw,
            look.pitch,
            0.0,
        )),
    ));
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
}

/// Right-drag to look around, WASD/QE to move.
pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut look: ResMut<LookController>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
) {
    let Ok(mut transform) = camera_query.single_mut() else {
        return;
    };

    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
        look.yaw += mouse_delta.x * look.yaw_sensitivity;
        look.pitch -= mouse_delta.y * look.pitch_sensitivity;
        look.pitch = look.pitch.clamp(-1.55, 1.55);
    }

    let mut move_input = Vec3::ZERO;
    if keyboard.pressed(KeyCode::KeyW) { move_input.z -= 1.0; }
    if keyboard.pressed(KeyCode::KeyS) { move_input.z += 1.0; }
    if keyboard.pressed(KeyCode::KeyD) { move_input.x += 1.0; }
    if keyboard.pressed(KeyCode::KeyA) { move_input.x -= 1.0; }
    if keyboard.pressed(KeyCode::KeyE) { move_input.y += 1.0; } // Up
    if keyboard.pressed(KeyCode::KeyQ) { move_input.y -= 1.0; } // Down

    // Bevy yaw turns towards -X; viewer yaw turns towards +X.
    let rotation = Quat::from_euler(EulerRot::YXZ, -look.yaw, look.pitch, 0.0);
    transform.rotation = rotation;

    if move_input != Vec3::ZERO {
        let flat_rotation = Quat::from_rotation_y(-look.yaw);
        let world_delta = flat_rotation * Vec3::new(move_input.x, 0.0, move_input.z)
            + Vec3::Y * move_input.y;
        transform.translation += world_delta.normalize() * look.move_speed * time.delta_secs();
    }
}

/// Copy the engine camera into `ViewerPose` unless the page is driving it.
pub fn track_viewer_pose(
    cameras: Query<&GlobalTransform, With<Camera3d>>,
    mut viewer: ResMut<ViewerPose>,
) {
    if viewer.source == ViewerSource::Remote {
        return;
    }
    if let Ok(global) = cameras.single() {
        viewer.pose = Some(CameraPose::from_transform(&global.compute_transform()));
    }
}
