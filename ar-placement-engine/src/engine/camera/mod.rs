//! Viewer camera: where the user is looking from.
//!
//! On desktop the Bevy camera is the viewer and a mouse-look controller moves
//! it. In the browser the page may push the XR viewer pose instead, which
//! takes precedence over the engine camera.

/// Viewer pose resource, camera spawning and look controller.
pub mod viewer_camera;
