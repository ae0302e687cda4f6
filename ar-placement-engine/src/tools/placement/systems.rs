use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::context::ArContext;
use super::mode::PrimitiveKind;
use super::registry::{ObjectId, PlacedObject};
use super::resolver::PlacementInput;
use super::status::StatusLog;
use crate::engine::camera::viewer_camera::ViewerPose;
use crate::engine::scene::BevyScene;
use crate::engine::scene::status_overlay::StatusText;
use crate::engine::sensor::ActiveSensor;
use crate::rpc::web_rpc::{RpcError, WebRpcInterface, object_to_json};

/// A request against the object registry or the armed mode.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementCommand {
    SelectMode(PrimitiveKind),
    /// Name as received from the page; validated by the mode controller.
    SelectModeByName(String),
    Place(PlacementInput),
    Clear,
    Remove(ObjectId),
}

/// Commands from every input source share one queue and are applied in the
/// order they were written.
#[derive(Event, Debug, Clone)]
pub struct PlacementCommandEvent {
    pub command: PlacementCommand,
    /// JSON-RPC id answered once the command has been applied.
    pub reply_to: Option<serde_json::Value>,
}

impl PlacementCommandEvent {
    pub fn local(command: PlacementCommand) -> Self {
        Self {
            command,
            reply_to: None,
        }
    }
}

/// External session triggers.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Capability check passed; begin negotiating with the sensor.
    Start,
    /// Hardware or user ended the session.
    End,
}

/// Emitted after an object has been recorded.
#[derive(Event, Debug, Clone)]
pub struct ObjectPlacedEvent(pub PlacedObject);

#[derive(Event, Debug, Clone, Copy)]
pub struct ObjectsClearedEvent;

#[derive(SystemParam)]
pub struct PlacementOutcomes<'w> {
    placed: EventWriter<'w, ObjectPlacedEvent>,
    cleared: EventWriter<'w, ObjectsClearedEvent>,
}

pub fn handle_session_events(
    mut events: EventReader<SessionEvent>,
    mut context: ResMut<ArContext>,
    mut sensor: ResMut<ActiveSensor>,
    mut status: ResMut<StatusLog>,
) {
    for event in events.read() {
        match event {
            SessionEvent::Start => context.start_advanced_session(sensor.0.as_mut(), &mut *status),
            SessionEvent::End => context.end_session(sensor.0.as_mut(), &mut *status),
        }
    }
}

pub fn poll_surface_sensor(
    mut context: ResMut<ArContext>,
    mut sensor: ResMut<ActiveSensor>,
    viewer: Res<ViewerPose>,
    time: Res<Time>,
    mut status: ResMut<StatusLog>,
) {
    context.begin_frame(
        sensor.0.as_mut(),
        viewer.pose.as_ref(),
        time.delta_secs(),
        &mut *status,
    );
}

/// Left click or touch release on the primary window requests a placement.
pub fn collect_pointer_input(
    buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    interactions: Query<&Interaction>,
    time: Res<Time>,
    mut placement: EventWriter<PlacementCommandEvent>,
) {
    // Clicks on UI chrome never reach the pipeline.
    if interactions.iter().any(|i| *i != Interaction::None) {
        return;
    }

    let timestamp = time.elapsed_secs_f64();

    if buttons.just_pressed(MouseButton::Left) {
        if let Some(cursor) = windows.single().ok().and_then(Window::cursor_position) {
            placement.write(PlacementCommandEvent::local(PlacementCommand::Place(
                PlacementInput {
                    screen_position: cursor,
                    timestamp,
                },
            )));
        }
    }

    for touch in touches.iter_just_released() {
        placement.write(PlacementCommandEvent::local(PlacementCommand::Place(
            PlacementInput {
                screen_position: touch.position(),
                timestamp,
            },
        )));
    }
}

/// Apply queued commands in arrival order and answer the page where asked.
pub fn apply_placement_commands(
    mut events: EventReader<PlacementCommandEvent>,
    viewer: Res<ViewerPose>,
    mut context: ResMut<ArContext>,
    mut scene: BevyScene,
    mut status: ResMut<StatusLog>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut outcomes: PlacementOutcomes,
) {
    for event in events.read() {
        let result: Result<serde_json::Value, RpcError> = match &event.command {
            PlacementCommand::SelectMode(kind) => {
                context.select_mode(*kind, &mut *status);
                Ok(serde_json::json!({ "success": true, "mode": kind.as_str() }))
            }
            PlacementCommand::SelectModeByName(name) => context
                .select_mode_by_name(name, &mut *status)
                .map(|kind| serde_json::json!({ "success": true, "mode": kind.as_str() }))
                .map_err(|err| RpcError::invalid_params(&err.to_string())),
            PlacementCommand::Place(input) => {
                match context.request_placement(*input, viewer.pose, &mut scene, &mut *status) {
                    Some(object) => {
                        let placed = object_to_json(&object);
                        outcomes.placed.write(ObjectPlacedEvent(object));
                        Ok(serde_json::json!({ "success": true, "object": placed }))
                    }
                    None => Ok(serde_json::json!({ "success": false })),
                }
            }
            PlacementCommand::Clear => {
                context.clear_objects(&mut scene, &mut *status);
                outcomes.cleared.write(ObjectsClearedEvent);
                Ok(serde_json::json!({ "success": true }))
            }
            PlacementCommand::Remove(id) => {
                let removed = context.remove_object(*id, &mut scene, &mut *status);
                Ok(serde_json::json!({ "success": removed }))
            }
        };

        if let Some(id) = &event.reply_to {
            rpc_interface.respond(id.clone(), result);
        }
    }
}

pub fn apply_drift_correction(
    mut context: ResMut<ArContext>,
    mut scene: BevyScene,
    mut status: ResMut<StatusLog>,
) {
    let report = context.correct_drift(&mut scene, &mut *status);
    if !report.corrections.is_empty() || !report.lost.is_empty() || !report.failed.is_empty() {
        debug!(
            "Drift pass: {} checked, {} corrected, {} lost, {} failed",
            report.checked,
            report.corrections.len(),
            report.lost.len(),
            report.failed.len()
        );
    }
}

/// Forward queued status messages to the page and the on-screen text.
pub fn publish_status_messages(
    mut status: ResMut<StatusLog>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut texts: Query<&mut Text, With<StatusText>>,
) {
    let messages: Vec<String> = status.drain().collect();
    let Some(latest) = messages.last() else {
        return;
    };

    for message in &messages {
        rpc_interface.send_notification("status", serde_json::json!({ "message": message }));
    }
    for mut text in &mut texts {
        text.0 = latest.clone();
    }
}

/// Keyboard shortcuts (native builds only).
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_placement_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut placement: EventWriter<PlacementCommandEvent>,
    mut sessions: EventWriter<SessionEvent>,
) {
    let shortcuts = [
        (KeyCode::Digit1, PrimitiveKind::Cube),
        (KeyCode::Digit2, PrimitiveKind::Sphere),
        (KeyCode::Digit3, PrimitiveKind::Cylinder),
    ];
    for (key, kind) in shortcuts {
        if keyboard.just_pressed(key) {
            placement.write(PlacementCommandEvent::local(PlacementCommand::SelectMode(kind)));
        }
    }

    if keyboard.just_pressed(KeyCode::KeyC) {
        placement.write(PlacementCommandEvent::local(PlacementCommand::Clear));
    }
    if keyboard.just_pressed(KeyCode::KeyX) {
        sessions.write(SessionEvent::Start);
    }
    if keyboard.just_pressed(KeyCode::KeyZ) {
        sessions.write(SessionEvent::End);
    }
}

/// Placeholder system for WASM builds where keyboard shortcuts are disabled.
#[cfg(target_arch = "wasm32")]
pub fn handle_placement_shortcuts() {
    // Controlled from the page via RPC.
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::pose::CameraPose;
    use crate::engine::scene::PrimitiveAssets;
    use constants::placement::PRIMITIVE_SIZE;

    fn command_app() -> App {
        let mut meshes = Assets::<Mesh>::default();
        let mut materials = Assets::<StandardMaterial>::default();
        let primitives = PrimitiveAssets::build(PRIMITIVE_SIZE, &mut meshes, &mut materials);

        let mut app = App::new();
        app.add_event::<PlacementCommandEvent>()
            .add_event::<ObjectPlacedEvent>()
            .add_event::<ObjectsClearedEvent>()
            .init_resource::<ArContext>()
            .init_resource::<StatusLog>()
            .init_resource::<WebRpcInterface>()
            .insert_resource(ViewerPose {
                pose: Some(CameraPose::new(Vec3::ZERO, 0.0, 0.0)),
                ..default()
            })
            .insert_resource(primitives)
            .add_systems(Update, apply_placement_commands);
        app
    }

    fn place() -> PlacementCommandEvent {
        PlacementCommandEvent::local(PlacementCommand::Place(PlacementInput {
            screen_position: Vec2::ZERO,
            timestamp: 0.0,
        }))
    }

    fn placed_kinds(app: &App) -> Vec<PrimitiveKind> {
        app.world()
            .resource::<ArContext>()
            .registry
            .list()
            .iter()
            .map(|o| o.kind())
            .collect()
    }

    #[test]
    fn mode_change_after_place_applies_to_the_next_placement_only() {
        let mut app = command_app();
        app.world_mut().send_event(place());
        app.world_mut().send_event(PlacementCommandEvent::local(
            PlacementCommand::SelectMode(PrimitiveKind::Sphere),
        ));
        app.world_mut().send_event(place());
        app.update();

        assert_eq!(
            placed_kinds(&app),
            vec![PrimitiveKind::Cube, PrimitiveKind::Sphere]
        );
    }

    #[test]
    fn place_after_clear_survives_the_frame() {
        let mut app = command_app();
        app.world_mut().send_event(place());
        app.world_mut()
            .send_event(PlacementCommandEvent::local(PlacementCommand::Clear));
        app.world_mut().send_event(place());
        app.update();

        let context = app.world().resource::<ArContext>();
        assert_eq!(context.registry.len(), 1);
        assert_eq!(context.registry.list()[0].id().raw(), 1);

        let mut visuals = app.world_mut().query::<&crate::engine::scene::PlacedVisual>();
        assert_eq!(visuals.iter(app.world()).count(), 1);
    }

    #[test]
    fn unknown_mode_name_leaves_armed_kind_untouched() {
        let mut app = command_app();
        app.world_mut().send_event(PlacementCommandEvent {
            command: PlacementCommand::SelectModeByName("pyramid".into()),
            reply_to: Some(serde_json::json!(7)),
        });
        app.world_mut().send_event(place());
        app.update();

        assert_eq!(placed_kinds(&app), vec![PrimitiveKind::Cube]);
        let response = &app.world().resource::<WebRpcInterface>().responses()[0];
        assert_eq!(response.id, Some(serde_json::json!(7)));
        assert_eq!(response.error.as_ref().map(|e| e.code), Some(-32602));
    }
}
