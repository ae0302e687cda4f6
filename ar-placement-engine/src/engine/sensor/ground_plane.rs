use bevy::prelude::*;

use super::{NegotiationStatus, SurfaceSensor};
use crate::engine::pose::{CameraPose, Pose};

/// Intersects the viewer's forward ray with a horizontal plane.
#[derive(Debug, Clone)]
pub struct GroundPlaneSensor {
    pub ground_height: f32,
    pub max_distance: f32,
    negotiated: bool,
}

impl Default for GroundPlaneSensor {
    fn default() -> Self {
        Self {
            ground_height: 0.0,
            max_distance: 20.0,
            negotiated: false,
        }
    }
}

impl GroundPlaneSensor {
    fn flat_plane_intersection(&self, origin: Vec3, direction: Vec3) -> Option<Vec3> {
        if direction.y.abs() < 0.001 {
            return None;
        }
        let t = (self.ground_height - origin.y) / direction.y;
        if t > 0.0 && t <= self.max_distance {
            Some(origin + direction * t)
        } else {
            None
        }
    }
}

impl SurfaceSensor for GroundPlaneSensor {
    fn begin_negotiation(&mut self) {
        // Nothing to acquire on desktop.
        self.negotiated = true;
    }

    fn negotiation_status(&mut self) -> NegotiationStatus {
        if self.negotiated {
            NegotiationStatus::Ready
        } else {
            NegotiationStatus::Pending
        }
    }

    fn poll_hit(&mut self, viewer: Option<&CameraPose>) -> Option<Pose> {
        let viewer = viewer?;
        let hit = self.flat_plane_intersection(viewer.position, viewer.forward())?;
        // Face the ring and primitives the same way as the viewer.
        Some(Pose::new(hit, Quat::from_rotation_y(-viewer.yaw)))
    }

    fn shutdown(&mut self) {
        self.negotiated = false;
    }
}
