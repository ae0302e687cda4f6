//! Scene capability consumed by the placement pipeline.
//!
//! The pipeline never touches the renderer directly. It creates, destroys and
//! moves visual entities through [`Scene`], which lets the same registry and
//! drift logic drive Bevy entities at runtime and a plain map in tests.

/// Bevy-backed scene: spawns primitive meshes and reads/writes their `Transform`.
pub mod bevy_scene;

/// Placement preview ring shown at the latest surface hit.
pub mod indicator;

/// In-memory scene for headless runs and tests.
pub mod memory;

/// On-screen status text.
pub mod status_overlay;

use bevy::prelude::Entity;

use crate::engine::pose::Pose;
use crate::error::PlacementResult;
use crate::tools::placement::mode::PrimitiveKind;

pub use bevy_scene::{BevyScene, PlacedVisual, PrimitiveAssets};
pub use memory::MemoryScene;

/// Opaque reference to a visual entity owned by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle(u64);

impl EntityHandle {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub fn from_entity(entity: Entity) -> Self {
        Self(entity.to_bits())
    }
}

/// Rendering-side operations the pipeline depends on.
pub trait Scene {
    /// Instantiate a visual for `kind` at `pose`.
    fn create_entity(&mut self, kind: PrimitiveKind, pose: &Pose) -> PlacementResult<EntityHandle>;

    /// Remove a visual. Removing a handle that is already gone is a no-op.
    fn destroy_entity(&mut self, handle: EntityHandle) -> PlacementResult<()>;

    /// Live transform of the visual.
    fn get_transform(&self, handle: EntityHandle) -> PlacementResult<Pose>;

    fn set_transform(&mut self, handle: EntityHandle, pose: &Pose) -> PlacementResult<()>;
}
