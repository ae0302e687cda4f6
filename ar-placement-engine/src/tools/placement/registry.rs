use std::fmt;

use bevy::prelude::*;
use constants::placement::{
    CUBE_VERTICAL_OFFSET, CYLINDER_VERTICAL_OFFSET, SPHERE_VERTICAL_OFFSET,
};
use serde::{Deserialize, Serialize};

use super::mode::PrimitiveKind;
use crate::engine::pose::{Confidence, Pose, ResolvedPose};
use crate::engine::scene::{EntityHandle, Scene};
use crate::error::{PlacementError, PlacementResult};

/// Monotonic object identifier. Never reused, even across `clear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Rebuild an id received over the page boundary. Unknown ids are
    /// simply not found by the registry.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMode {
    /// Placed from a surface hit; watched by the drift corrector.
    SurfaceAnchored,
    /// Placed from a camera estimate; left alone.
    FreeFloating,
}

/// Lift applied per kind so the primitive's base rests on the resolved point.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct VerticalOffsets {
    pub cube: f32,
    pub sphere: f32,
    pub cylinder: f32,
}

impl Default for VerticalOffsets {
    fn default() -> Self {
        Self {
            cube: CUBE_VERTICAL_OFFSET,
            sphere: SPHERE_VERTICAL_OFFSET,
            cylinder: CYLINDER_VERTICAL_OFFSET,
        }
    }
}

impl VerticalOffsets {
    pub fn for_kind(&self, kind: PrimitiveKind) -> f32 {
        match kind {
            PrimitiveKind::Cube => self.cube,
            PrimitiveKind::Sphere => self.sphere,
            PrimitiveKind::Cylinder => self.cylinder,
        }
    }
}

/// One anchored primitive.
///
/// The anchor pose is fixed at creation. Corrections move the visual, never
/// this record.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedObject {
    id: ObjectId,
    kind: PrimitiveKind,
    anchor_pose: Pose,
    created_at: f64,
    anchor_mode: AnchorMode,
    handle: EntityHandle,
}

impl PlacedObject {
    pub fn id(&self) -> ObjectId {
        self.id
    }
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }
    pub fn anchor_pose(&self) -> &Pose {
        &self.anchor_pose
    }
    pub fn created_at(&self) -> f64 {
        self.created_at
    }
    pub fn anchor_mode(&self) -> AnchorMode {
        self.anchor_mode
    }
    pub fn handle(&self) -> EntityHandle {
        self.handle
    }
}

/// Object counts by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RegistrySummary {
    pub total: usize,
    pub cube: usize,
    pub sphere: usize,
    pub cylinder: usize,
}

/// Result of clearing the registry.
#[derive(Debug, Default)]
pub struct ClearOutcome {
    pub removed: usize,
    /// Destroy failures; the registry is emptied regardless.
    pub failures: Vec<PlacementError>,
}

/// Authoritative, insertion-ordered list of placed objects.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    objects: Vec<PlacedObject>,
    next_id: u64,
    offsets: VerticalOffsets,
}

impl AnchorRegistry {
    pub fn with_offsets(offsets: VerticalOffsets) -> Self {
        Self {
            offsets,
            ..default()
        }
    }

    pub fn set_offsets(&mut self, offsets: VerticalOffsets) {
        self.offsets = offsets;
    }

    pub fn offsets(&self) -> &VerticalOffsets {
        &self.offsets
    }

    /// Record a new object and instantiate its visual.
    ///
    /// If the scene refuses the entity nothing is recorded and no identifier
    /// is consumed.
    pub fn create(
        &mut self,
        kind: PrimitiveKind,
        pose: &ResolvedPose,
        created_at: f64,
        scene: &mut dyn Scene,
    ) -> PlacementResult<PlacedObject> {
        let anchor_pose = pose.pose.raised_by(self.offsets.for_kind(kind));
        let anchor_mode = match pose.confidence {
            Confidence::Precise => AnchorMode::SurfaceAnchored,
            Confidence::Estimated => AnchorMode::FreeFloating,
        };

        let handle = scene.create_entity(kind, &anchor_pose)?;

        let id = ObjectId(self.next_id);
        self.next_id += 1;

        let object = PlacedObject {
            id,
            kind,
            anchor_pose,
            created_at,
            anchor_mode,
            handle,
        };
        self.objects.push(object.clone());

        info!(
            "Placed {} {} at {:?} ({:?})",
            kind.as_str(),
            id,
            anchor_pose.position,
            anchor_mode
        );
        Ok(object)
    }

    /// Live view of all objects in insertion order.
    pub fn list(&self) -> &[PlacedObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn summary(&self) -> RegistrySummary {
        self.objects
            .iter()
            .fold(RegistrySummary::default(), |mut summary, object| {
                summary.total += 1;
                match object.kind {
                    PrimitiveKind::Cube => summary.cube += 1,
                    PrimitiveKind::Sphere => summary.sphere += 1,
                    PrimitiveKind::Cylinder => summary.cylinder += 1,
                }
                summary
            })
    }

    /// Remove one object. If the scene fails to destroy the visual the object
    /// stays registered.
    pub fn remove(
        &mut self,
        id: ObjectId,
        scene: &mut dyn Scene,
    ) -> PlacementResult<Option<PlacedObject>> {
        let Some(index) = self.objects.iter().position(|o| o.id == id) else {
            return Ok(None);
        };
        scene.destroy_entity(self.objects[index].handle)?;
        Ok(Some(self.objects.remove(index)))
    }

    /// Destroy every visual and empty the list. A failed destroy does not stop
    /// the remaining ones.
    pub fn clear(&mut self, scene: &mut dyn Scene) -> ClearOutcome {
        let mut outcome = ClearOutcome::default();
        for object in self.objects.drain(..) {
            if let Err(err) = scene.destroy_entity(object.handle) {
                warn!("Failed to destroy visual for {}: {}", object.id, err);
                outcome.failures.push(err);
            }
            outcome.removed += 1;
        }
        outcome
    }
}
