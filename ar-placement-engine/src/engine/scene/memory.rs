use std::collections::HashMap;

use super::{EntityHandle, Scene};
use crate::engine::pose::Pose;
use crate::error::{PlacementError, PlacementResult, SceneOp};
use crate::tools::placement::mode::PrimitiveKind;

#[derive(Debug, Clone, Copy)]
struct MemoryEntity {
    kind: PrimitiveKind,
    pose: Pose,
}

/// Scene that keeps entities in a map.
///
/// Failure switches let callers exercise the recovery paths of the pipeline.
#[derive(Debug, Default)]
pub struct MemoryScene {
    entities: HashMap<EntityHandle, MemoryEntity>,
    next_handle: u64,
    pub fail_creates: bool,
    pub fail_destroys: bool,
    pub fail_updates: bool,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.entities.contains_key(&handle)
    }

    pub fn kind_of(&self, handle: EntityHandle) -> Option<PrimitiveKind> {
        self.entities.get(&handle).map(|e| e.kind)
    }

    /// Move a visual without going through the pipeline, as tracking noise or
    /// an external system would.
    pub fn perturb(&mut self, handle: EntityHandle, offset: bevy::math::Vec3) {
        if let Some(entity) = self.entities.get_mut(&handle) {
            entity.pose.position += offset;
        }
    }

    /// Drop a visual behind the pipeline's back.
    pub fn forget(&mut self, handle: EntityHandle) {
        self.entities.remove(&handle);
    }
}

impl Scene for MemoryScene {
    fn create_entity(&mut self, kind: PrimitiveKind, pose: &Pose) -> PlacementResult<EntityHandle> {
        if self.fail_creates {
            return Err(PlacementError::scene(SceneOp::Create, "scene refused entity"));
        }
        let handle = EntityHandle::from_raw(self.next_handle);
        self.next_handle += 1;
        self.entities.insert(handle, MemoryEntity { kind, pose: *pose });
        Ok(handle)
    }

    fn destroy_entity(&mut self, handle: EntityHandle) -> PlacementResult<()> {
        if self.fail_destroys {
            return Err(PlacementError::scene(SceneOp::Destroy, "scene refused removal"));
        }
        self.entities.remove(&handle);
        Ok(())
    }

    fn get_transform(&self, handle: EntityHandle) -> PlacementResult<Pose> {
        self.entities
            .get(&handle)
            .map(|e| e.pose)
            .ok_or_else(|| PlacementError::scene(SceneOp::GetTransform, "no such entity"))
    }

    fn set_transform(&mut self, handle: EntityHandle, pose: &Pose) -> PlacementResult<()> {
        if self.fail_updates {
            return Err(PlacementError::scene(SceneOp::SetTransform, "scene refused update"));
        }
        let entity = self
            .entities
            .get_mut(&handle)
            .ok_or_else(|| PlacementError::scene(SceneOp::SetTransform, "no such entity"))?;
        entity.pose = *pose;
        Ok(())
    }
}
