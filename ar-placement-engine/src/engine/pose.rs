use bevy::prelude::*;

/// Position plus orientation in world space.
///
/// Orientation is always a unit quaternion; every component that stores or
/// compares poses uses this representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn from_translation(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }

    /// Euclidean distance between the two positions. Orientation is ignored.
    pub fn distance(&self, other: &Pose) -> f32 {
        self.position.distance(other.position)
    }

    pub fn raised_by(&self, dy: f32) -> Self {
        Self {
            position: self.position + Vec3::Y * dy,
            orientation: self.orientation,
        }
    }

    pub fn to_transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.orientation)
    }

    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            position: transform.translation,
            orientation: transform.rotation,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// How a resolved pose was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confidence {
    /// Straight from a surface hit-test result.
    Precise,
    /// Projected in front of the camera.
    Estimated,
}

/// Output of the resolver, consumed immediately by the registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPose {
    pub pose: Pose,
    pub confidence: Confidence,
}

impl ResolvedPose {
    pub fn precise(pose: Pose) -> Self {
        Self {
            pose,
            confidence: Confidence::Precise,
        }
    }

    pub fn estimated(pose: Pose) -> Self {
        Self {
            pose,
            confidence: Confidence::Estimated,
        }
    }
}

/// Viewer position plus yaw/pitch in radians.
///
/// Yaw turns the forward direction from -Z towards +X. Pitch is positive when
/// looking up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl CameraPose {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
        }
    }

    pub fn from_degrees(position: Vec3, yaw_deg: f32, pitch_deg: f32) -> Self {
        Self::new(position, yaw_deg.to_radians(), pitch_deg.to_radians())
    }

    /// Derive yaw/pitch from an engine camera transform (which looks down -Z).
    pub fn from_transform(transform: &Transform) -> Self {
        let forward = transform.forward().as_vec3();
        Self {
            position: transform.translation,
            yaw: forward.x.atan2(-forward.z),
            pitch: forward.y.clamp(-1.0, 1.0).asin(),
        }
    }

    /// Unit vector the viewer is looking along.
    pub fn forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }
}
