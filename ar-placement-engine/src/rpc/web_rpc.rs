use crate::engine::camera::viewer_camera::ViewerPose;
use crate::engine::core::app_state::AppState;
use crate::engine::pose::{CameraPose, Pose};
use crate::engine::sensor::{SensorFeed, SensorFeedEvent};
use crate::tools::placement::PlacementSet;
use crate::tools::placement::context::ArContext;
use crate::tools::placement::registry::{ObjectId, PlacedObject};
use crate::tools::placement::resolver::PlacementInput;
use crate::tools::placement::systems::{
    ObjectPlacedEvent, ObjectsClearedEvent, PlacementCommand, PlacementCommandEvent, SessionEvent,
};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following specification.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication between the page and Bevy.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the page without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue the reply to request `id`.
    pub fn respond(&mut self, id: serde_json::Value, result: Result<serde_json::Value, RpcError>) {
        let (result, error) = match result {
            Ok(value) => (Some(value), None),
            Err(error) => (None, Some(error)),
        };
        self.outgoing_responses.push(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result,
            error,
            id: Some(id),
        });
    }

    #[cfg(test)]
    pub(crate) fn responses(&self) -> &[RpcResponse] {
        &self.outgoing_responses
    }
}

/// Plugin establishing the postMessage bridge for iframe deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (process_incoming_messages, handle_rpc_messages)
                    .chain()
                    .before(PlacementSet::Sense),
            )
            .add_systems(
                Update,
                (notify_placement_events, send_outgoing_messages)
                    .chain()
                    .after(PlacementSet::Present),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    match window() {
        Some(window) => {
            if let Err(e) =
                window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            {
                error!("Failed to register message listener: {:?}", e);
            }
        }
        None => error!("Window object not available"),
    }

    // Ownership moves to JS; the listener lives for the page lifetime.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing an incoming RPC message from the page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

/// Event writers for everything the page can ask the placement pipeline to do.
#[derive(SystemParam)]
struct PipelineWriters<'w> {
    commands: EventWriter<'w, PlacementCommandEvent>,
    sessions: EventWriter<'w, SessionEvent>,
    sensor_feed: EventWriter<'w, SensorFeedEvent>,
}

/// Methods that drive the placement pipeline and are refused while loading.
const RUNNING_ONLY_METHODS: [&str; 8] = [
    "set_mode",
    "place",
    "clear_objects",
    "remove_object",
    "start_advanced_session",
    "session_ended",
    "sensor_negotiated",
    "sensor_hit",
];

/// How a dispatched request gets its answer.
enum Reply {
    Now(Result<serde_json::Value, RpcError>),
    /// Answered by the placement pipeline once the command has been applied.
    Deferred,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    context: Res<ArContext>,
    app_state: Res<State<AppState>>,
    time: Res<Time>,
    mut viewer: ResMut<ViewerPose>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut pipeline: PipelineWriters,
) {
    let running = *app_state.get() == AppState::Running;

    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("Processing RPC method: {}", request.method);
                let reply = handle_rpc_request(
                    &request,
                    &context,
                    running,
                    time.elapsed_secs_f64(),
                    &mut viewer,
                    &mut pipeline,
                );
                if let (Reply::Now(result), Some(id)) = (reply, request.id) {
                    rpc_interface.respond(id, result);
                }
            }
            Err(parse_error) => {
                warn!("RPC parse error: {}", parse_error);
            }
        }
    }
}

/// Dispatch one request. Notifications (no id) are acted on but get no reply.
fn handle_rpc_request(
    request: &RpcRequest,
    context: &ArContext,
    running: bool,
    now: f64,
    viewer: &mut ViewerPose,
    pipeline: &mut PipelineWriters,
) -> Reply {
    if !running && RUNNING_ONLY_METHODS.contains(&request.method.as_str()) {
        warn!("Refusing '{}' while the engine is loading", request.method);
        return Reply::Now(Err(RpcError::not_ready()));
    }

    let params = &request.params;
    let result = match request.method.as_str() {
        "set_mode" => return queue_command(parse_set_mode(params), request, pipeline),
        "place" => {
            let command = parse_place(params, now).map(PlacementCommand::Place);
            return queue_command(command, request, pipeline);
        }
        "clear_objects" => return queue_command(Ok(PlacementCommand::Clear), request, pipeline),
        "remove_object" => return queue_command(parse_remove(params), request, pipeline),
        "list_objects" => Ok(list_objects(context)),
        "start_advanced_session" => {
            pipeline.sessions.write(SessionEvent::Start);
            Ok(serde_json::json!({ "success": true }))
        }
        "session_ended" => {
            pipeline.sessions.write(SessionEvent::End);
            Ok(serde_json::json!({ "success": true }))
        }
        "sensor_negotiated" => parse_negotiation(params).map(|outcome| {
            pipeline
                .sensor_feed
                .write(SensorFeedEvent(SensorFeed::Negotiated(outcome)));
            serde_json::json!({ "success": true })
        }),
        "sensor_hit" => parse_sensor_hit(params).map(|hit| {
            pipeline.sensor_feed.write(SensorFeedEvent(SensorFeed::Hit(hit)));
            serde_json::json!({ "success": true })
        }),
        "camera_pose" => parse_camera_pose(params).map(|pose| {
            viewer.set_remote(pose);
            serde_json::json!({ "success": true })
        }),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError::method_not_found(&request.method))
        }
    };

    Reply::Now(result)
}

/// Queue a registry or mode command behind any already queued this frame.
fn queue_command(
    command: Result<PlacementCommand, RpcError>,
    request: &RpcRequest,
    pipeline: &mut PipelineWriters,
) -> Reply {
    match command {
        Ok(command) => {
            pipeline.commands.write(PlacementCommandEvent {
                command,
                reply_to: request.id.clone(),
            });
            Reply::Deferred
        }
        Err(error) => Reply::Now(Err(error)),
    }
}

/// `{mode}`; the name itself is checked by the mode controller.
fn parse_set_mode(params: &serde_json::Value) -> Result<PlacementCommand, RpcError> {
    #[derive(Deserialize)]
    struct SetModeParams {
        mode: String,
    }

    let parsed = serde_json::from_value::<SetModeParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'mode' parameter"))?;
    Ok(PlacementCommand::SelectModeByName(parsed.mode))
}

fn parse_remove(params: &serde_json::Value) -> Result<PlacementCommand, RpcError> {
    #[derive(Deserialize)]
    struct RemoveParams {
        id: u64,
    }

    let parsed = serde_json::from_value::<RemoveParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected numeric 'id' parameter"))?;
    Ok(PlacementCommand::Remove(ObjectId::from_raw(parsed.id)))
}

/// `{x, y, timestamp?}`; a missing timestamp means "now".
fn parse_place(params: &serde_json::Value, now: f64) -> Result<PlacementInput, RpcError> {
    #[derive(Deserialize)]
    struct PlaceParams {
        x: f32,
        y: f32,
        timestamp: Option<f64>,
    }

    let parsed = serde_json::from_value::<PlaceParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'x' and 'y' parameters"))?;
    Ok(PlacementInput {
        screen_position: Vec2::new(parsed.x, parsed.y),
        timestamp: parsed.timestamp.unwrap_or(now),
    })
}

/// `{success, reason?}`.
fn parse_negotiation(params: &serde_json::Value) -> Result<Result<(), String>, RpcError> {
    #[derive(Deserialize)]
    struct NegotiationParams {
        success: bool,
        reason: Option<String>,
    }

    let parsed = serde_json::from_value::<NegotiationParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected boolean 'success' parameter"))?;
    if parsed.success {
        Ok(Ok(()))
    } else {
        Ok(Err(parsed
            .reason
            .unwrap_or_else(|| "surface sensing not supported".to_string())))
    }
}

/// `{position: [x,y,z], orientation: [x,y,z,w]}` or `null` for "no surface".
fn parse_sensor_hit(params: &serde_json::Value) -> Result<Option<Pose>, RpcError> {
    #[derive(Deserialize)]
    struct HitParams {
        position: [f32; 3],
        orientation: [f32; 4],
    }

    let parsed = serde_json::from_value::<Option<HitParams>>(params.clone()).map_err(|_| {
        RpcError::invalid_params("Expected 'position' and 'orientation' arrays or null")
    })?;
    let Some(hit) = parsed else {
        return Ok(None);
    };

    let orientation = Quat::from_array(hit.orientation);
    let length_squared = orientation.length_squared();
    if !length_squared.is_finite() || length_squared <= f32::EPSILON {
        return Err(RpcError::invalid_params("Orientation must be a non-zero quaternion"));
    }

    Ok(Some(Pose::new(
        Vec3::from_array(hit.position),
        orientation.normalize(),
    )))
}

/// `{position: [x,y,z], yaw, pitch}` in radians.
fn parse_camera_pose(params: &serde_json::Value) -> Result<CameraPose, RpcError> {
    #[derive(Deserialize)]
    struct CameraParams {
        position: [f32; 3],
        yaw: f32,
        pitch: f32,
    }

    let parsed = serde_json::from_value::<CameraParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'position', 'yaw' and 'pitch'"))?;
    Ok(CameraPose::new(
        Vec3::from_array(parsed.position),
        parsed.yaw,
        parsed.pitch,
    ))
}

pub(crate) fn object_to_json(object: &PlacedObject) -> serde_json::Value {
    let pose = object.anchor_pose();
    serde_json::json!({
        "id": object.id(),
        "label": object.id().to_string(),
        "kind": object.kind(),
        "anchor_mode": object.anchor_mode(),
        "position": pose.position.to_array(),
        "orientation": pose.orientation.to_array(),
        "created_at": object.created_at(),
    })
}

fn list_objects(context: &ArContext) -> serde_json::Value {
    let objects: Vec<serde_json::Value> =
        context.registry.list().iter().map(object_to_json).collect();
    serde_json::json!({
        "summary": context.registry.summary(),
        "mode": context.mode.current_mode().as_str(),
        "objects": objects,
    })
}

/// Push placement and clear notifications to the page.
fn notify_placement_events(
    mut placed: EventReader<ObjectPlacedEvent>,
    mut cleared: EventReader<ObjectsClearedEvent>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for ObjectPlacedEvent(object) in placed.read() {
        rpc_interface.send_notification("object_placed", object_to_json(object));
    }
    for _ in cleared.read() {
        rpc_interface.send_notification("objects_cleared", serde_json::json!({}));
    }
}

/// Send queued notifications and responses to the page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Responses after notifications to keep status ahead of replies.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No-op for non-WASM targets.
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(serde_json::json!({ "method": method })),
        }
    }

    /// Server-defined code: placement config not applied yet.
    pub fn not_ready() -> Self {
        Self {
            code: -32002,
            message: "Engine is still loading".to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::pose::ResolvedPose;
    use crate::engine::scene::MemoryScene;
    use crate::tools::placement::mode::PrimitiveKind;
    use crate::tools::placement::status::StatusSink;
    use bevy::state::app::StatesPlugin;

    fn rpc_app(state: AppState) -> App {
        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .insert_state(state)
            .add_event::<IncomingRpcMessage>()
            .add_event::<PlacementCommandEvent>()
            .add_event::<SessionEvent>()
            .add_event::<SensorFeedEvent>()
            .init_resource::<ArContext>()
            .init_resource::<ViewerPose>()
            .init_resource::<WebRpcInterface>()
            .init_resource::<Time>()
            .add_systems(Update, handle_rpc_messages);
        app
    }

    fn receive(app: &mut App, message: serde_json::Value) {
        app.world_mut().send_event(IncomingRpcMessage {
            content: message.to_string(),
        });
    }

    fn queued_commands(app: &App) -> Vec<PlacementCommand> {
        app.world()
            .resource::<Events<PlacementCommandEvent>>()
            .iter_current_update_events()
            .map(|e| e.command.clone())
            .collect()
    }

    #[test]
    fn page_commands_keep_their_arrival_order() {
        let mut app = rpc_app(AppState::Running);
        receive(&mut app, serde_json::json!({"jsonrpc": "2.0", "method": "clear_objects", "id": 1}));
        receive(&mut app, serde_json::json!({
            "jsonrpc": "2.0", "method": "place", "params": {"x": 1.0, "y": 2.0, "timestamp": 0.5}, "id": 2
        }));
        receive(&mut app, serde_json::json!({
            "jsonrpc": "2.0", "method": "set_mode", "params": {"mode": "sphere"}, "id": 3
        }));
        app.update();

        assert_eq!(
            queued_commands(&app),
            vec![
                PlacementCommand::Clear,
                PlacementCommand::Place(PlacementInput {
                    screen_position: Vec2::new(1.0, 2.0),
                    timestamp: 0.5,
                }),
                PlacementCommand::SelectModeByName("sphere".into()),
            ]
        );
        // Answered by the pipeline once applied.
        assert!(app.world().resource::<WebRpcInterface>().responses().is_empty());
    }

    #[test]
    fn pipeline_methods_are_refused_while_loading() {
        let mut app = rpc_app(AppState::Loading);
        receive(&mut app, serde_json::json!({
            "jsonrpc": "2.0", "method": "place", "params": {"x": 1.0, "y": 2.0}, "id": 9
        }));
        receive(&mut app, serde_json::json!({"jsonrpc": "2.0", "method": "list_objects", "id": 10}));
        app.update();

        assert!(queued_commands(&app).is_empty());
        let responses = app.world().resource::<WebRpcInterface>().responses();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].id, Some(serde_json::json!(9)));
        assert_eq!(responses[0].error.as_ref().map(|e| e.code), Some(-32002));
        assert!(responses[1].error.is_none());
    }

    #[test]
    fn request_without_params_deserializes() {
        let request: RpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"clear_objects","id":1}"#).unwrap();
        assert_eq!(request.method, "clear_objects");
        assert!(request.params.is_null());
    }

    #[test]
    fn sensor_hit_accepts_null_as_no_surface() {
        assert_eq!(parse_sensor_hit(&serde_json::Value::Null).unwrap(), None);
    }

    #[test]
    fn sensor_hit_normalizes_orientation() {
        let params = serde_json::json!({
            "position": [1.0, 0.0, -2.0],
            "orientation": [0.0, 0.0, 0.0, 2.0]
        });
        let pose = parse_sensor_hit(&params).unwrap().unwrap();
        assert_eq!(pose.position, Vec3::new(1.0, 0.0, -2.0));
        assert!((pose.orientation.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn sensor_hit_rejects_zero_quaternion() {
        let params = serde_json::json!({
            "position": [0.0, 0.0, 0.0],
            "orientation": [0.0, 0.0, 0.0, 0.0]
        });
        let err = parse_sensor_hit(&params).unwrap_err();
        assert_eq!(err.code, -32602);
    }

    #[test]
    fn failed_negotiation_carries_reason() {
        let outcome =
            parse_negotiation(&serde_json::json!({"success": false, "reason": "no hit-test"}))
                .unwrap();
        assert_eq!(outcome, Err("no hit-test".to_string()));

        let outcome = parse_negotiation(&serde_json::json!({"success": true})).unwrap();
        assert_eq!(outcome, Ok(()));
    }

    #[test]
    fn place_defaults_timestamp_to_now() {
        let input = parse_place(&serde_json::json!({"x": 10.0, "y": 20.0}), 4.5).unwrap();
        assert_eq!(input.screen_position, Vec2::new(10.0, 20.0));
        assert_eq!(input.timestamp, 4.5);

        let input =
            parse_place(&serde_json::json!({"x": 1.0, "y": 2.0, "timestamp": 9.0}), 4.5).unwrap();
        assert_eq!(input.timestamp, 9.0);
    }

    #[test]
    fn camera_pose_reads_radians() {
        let pose = parse_camera_pose(&serde_json::json!({
            "position": [0.0, 1.6, 0.0],
            "yaw": 0.5,
            "pitch": -0.25
        }))
        .unwrap();
        assert_eq!(pose.position, Vec3::new(0.0, 1.6, 0.0));
        assert_eq!(pose.yaw, 0.5);
        assert_eq!(pose.pitch, -0.25);
    }

    #[test]
    fn listing_reports_objects_in_creation_order() {
        let mut context = ArContext::default();
        let mut scene = MemoryScene::new();
        let mut status: Vec<String> = Vec::new();
        context.select_mode(PrimitiveKind::Sphere, &mut status as &mut dyn StatusSink);
        for x in [0.0, 1.0] {
            context
                .registry
                .create(
                    context.mode.current_mode(),
                    &ResolvedPose::precise(Pose::from_translation(Vec3::new(x, 0.0, -1.0))),
                    1.0,
                    &mut scene,
                )
                .unwrap();
        }

        let listing = list_objects(&context);
        assert_eq!(listing["summary"]["total"], 2);
        assert_eq!(listing["summary"]["sphere"], 2);
        assert_eq!(listing["mode"], "sphere");
        assert_eq!(listing["objects"][0]["id"], 0);
        assert_eq!(listing["objects"][1]["label"], "object_1");
        assert_eq!(listing["objects"][0]["kind"], "sphere");
        assert_eq!(listing["objects"][0]["anchor_mode"], "surface_anchored");
    }
}
