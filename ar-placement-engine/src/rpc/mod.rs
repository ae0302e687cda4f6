//! JSON-RPC 2.0 bridge to the hosting page.
//!
//! The engine runs in an iframe and talks to its parent over postMessage.
//! The page owns the WebXR session, so besides driving placement it also
//! acts as the surface sensor backend: it reports negotiation results,
//! per-frame hits and the viewer pose.
//!
//! ```text
//! Page (Parent Window)  <──postMessage──>  Bevy (iframe)
//!        ├─ Request (with ID) ─────────────────> │
//!        │ <──────────────── Response (with ID) ─┤
//!        │ <───────────── Notification (no ID) ──┤
//! ```
//!
//! ## Ordering
//!
//! `set_mode`, `place`, `clear_objects` and `remove_object` are queued as
//! `PlacementCommand`s together with pointer and keyboard input, applied in
//! arrival order, and answered only after they have been applied. Session
//! and sensor methods feed the start of the next placement tick.
//!
//! While the placement config is still loading every method except
//! `list_objects` and `camera_pose` is answered with error `-32002`.
//!
//! ## Methods
//!
//! ### Placement
//! - `set_mode`: Arm `"cube"`, `"sphere"` or `"cylinder"`; unknown names get `-32602`
//! - `place`: Request placement at `{x, y, timestamp?}`; replies with the object or `success: false`
//! - `clear_objects`: Remove every placed object
//! - `remove_object`: Remove one object by numeric `id`
//! - `list_objects`: Summary counts, armed mode and every object's anchor
//!
//! ### Session and Sensor Feed
//! - `start_advanced_session`: Begin sensor negotiation
//! - `sensor_negotiated`: `{success, reason?}` negotiation outcome
//! - `sensor_hit`: `{position, orientation}` for this frame, or `null`
//! - `session_ended`: Hardware or user ended the session
//! - `camera_pose`: `{position, yaw, pitch}` from the device camera
//!
//! ### Notifications
//! - `status`: `{message}` for every user-visible status line
//! - `object_placed`: The newly recorded object
//! - `objects_cleared`: Registry emptied

/// JSON-RPC 2.0 bidirectional communication system for the hosting page.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
