use bevy::prelude::*;
use constants::placement::{FALLBACK_EYE_HEIGHT_BIAS, FALLBACK_STANDOFF_DISTANCE};

use crate::engine::pose::{CameraPose, Pose, ResolvedPose};

/// Which resolution path the session has selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// Use the sensor hit when one is present.
    SurfaceHit,
    /// Project a point in front of the camera.
    CameraProjection,
}

/// Raw input event: where on screen and when.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementInput {
    pub screen_position: Vec2,
    /// Seconds since app start.
    pub timestamp: f64,
}

/// Everything the resolver needs, captured at request time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRequest {
    pub input: PlacementInput,
    pub strategy: ResolutionStrategy,
    pub sensor_hit: Option<Pose>,
    pub camera: Option<CameraPose>,
}

/// Turns a placement request into a pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementResolver {
    pub standoff_distance: f32,
    pub eye_height_bias: f32,
}

impl Default for PlacementResolver {
    fn default() -> Self {
        Self {
            standoff_distance: FALLBACK_STANDOFF_DISTANCE,
            eye_height_bias: FALLBACK_EYE_HEIGHT_BIAS,
        }
    }
}

impl PlacementResolver {
    /// Resolve a request. `None` means there is no usable camera or sensor
    /// state at all and the request should be dropped.
    pub fn resolve(&self, request: &PlacementRequest) -> Option<ResolvedPose> {
        if request.strategy == ResolutionStrategy::SurfaceHit {
            if let Some(hit) = request.sensor_hit {
                return Some(ResolvedPose::precise(hit));
            }
        }

        let camera = request.camera.as_ref()?;
        Some(ResolvedPose::estimated(self.project_from_camera(camera)))
    }

    /// Point at the standoff distance ahead of the camera, biased downwards.
    pub fn project_from_camera(&self, camera: &CameraPose) -> Pose {
        let d = self.standoff_distance;
        let position = Vec3::new(
            camera.position.x + camera.yaw.sin() * d,
            camera.position.y - camera.pitch.tan() * d - self.eye_height_bias,
            camera.position.z - camera.yaw.cos() * d,
        );
        Pose::from_translation(position)
    }
}
