use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use constants::placement::{
    CYLINDER_HEIGHT_FACTOR, CYLINDER_RADIUS_FACTOR, PRIMITIVE_SIZE, SPHERE_RADIUS_FACTOR,
};
use constants::render_settings::{CUBE_COLOUR, CYLINDER_COLOUR, SPHERE_COLOUR};

use super::{EntityHandle, Scene};
use crate::engine::pose::Pose;
use crate::error::{PlacementError, PlacementResult, SceneOp};
use crate::tools::placement::mode::PrimitiveKind;

/// Marker on every spawned primitive visual.
#[derive(Component, Debug, Clone, Copy)]
pub struct PlacedVisual {
    pub kind: PrimitiveKind,
}

/// Shared mesh and material handles, one pair per primitive kind.
#[derive(Resource, Clone)]
pub struct PrimitiveAssets {
    pub size: f32,
    cube: (Handle<Mesh>, Handle<StandardMaterial>),
    sphere: (Handle<Mesh>, Handle<StandardMaterial>),
    cylinder: (Handle<Mesh>, Handle<StandardMaterial>),
}

impl PrimitiveAssets {
    pub fn build(
        size: f32,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
    ) -> Self {
        let material = |materials: &mut Assets<StandardMaterial>, colour: Color| {
            materials.add(StandardMaterial {
                base_color: colour,
                perceptual_roughness: 0.6,
                ..default()
            })
        };

        Self {
            size,
            cube: (
                meshes.add(Cuboid::from_length(size)),
                material(materials, CUBE_COLOUR),
            ),
            sphere: (
                meshes.add(Sphere::new(size * SPHERE_RADIUS_FACTOR)),
                material(materials, SPHERE_COLOUR),
            ),
            cylinder: (
                meshes.add(Cylinder::new(
                    size * CYLINDER_RADIUS_FACTOR,
                    size * CYLINDER_HEIGHT_FACTOR,
                )),
                material(materials, CYLINDER_COLOUR),
            ),
        }
    }

    fn handles(&self, kind: PrimitiveKind) -> &(Handle<Mesh>, Handle<StandardMaterial>) {
        match kind {
            PrimitiveKind::Cube => &self.cube,
            PrimitiveKind::Sphere => &self.sphere,
            PrimitiveKind::Cylinder => &self.cylinder,
        }
    }
}

/// Build primitive meshes with the default size at startup.
pub fn setup_primitive_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(PrimitiveAssets::build(
        PRIMITIVE_SIZE,
        &mut meshes,
        &mut materials,
    ));
}

/// Scene implementation over the Bevy world.
///
/// Spawns go through `Commands`, so a freshly created entity only becomes
/// visible to `get_transform` once the command buffer is applied.
#[derive(SystemParam)]
pub struct BevyScene<'w, 's> {
    commands: Commands<'w, 's>,
    primitives: Res<'w, PrimitiveAssets>,
    visuals: Query<'w, 's, &'static mut Transform, With<PlacedVisual>>,
}

fn to_entity(handle: EntityHandle, op: SceneOp) -> PlacementResult<Entity> {
    Entity::try_from_bits(handle.raw())
        .map_err(|e| PlacementError::scene(op, format!("invalid handle: {e:?}")))
}

impl Scene for BevyScene<'_, '_> {
    fn create_entity(&mut self, kind: PrimitiveKind, pose: &Pose) -> PlacementResult<EntityHandle> {
        let (mesh, material) = self.primitives.handles(kind).clone();
        let entity = self
            .commands
            .spawn((
                Mesh3d(mesh),
                MeshMaterial3d(material),
                pose.to_transform(),
                PlacedVisual { kind },
                Name::new(format!("{}_primitive", kind.as_str())),
            ))
            .id();
        Ok(EntityHandle::from_entity(entity))
    }

    fn destroy_entity(&mut self, handle: EntityHandle) -> PlacementResult<()> {
        let entity = to_entity(handle, SceneOp::Destroy)?;
        // Also covers entities spawned earlier in this system run, which the
        // query cannot see until commands are applied.
        if let Ok(mut visual) = self.commands.get_entity(entity) {
            visual.try_despawn();
        }
        Ok(())
    }

    fn get_transform(&self, handle: EntityHandle) -> PlacementResult<Pose> {
        let entity = to_entity(handle, SceneOp::GetTransform)?;
        self.visuals
            .get(entity)
            .map(Pose::from_transform)
            .map_err(|e| PlacementError::scene(SceneOp::GetTransform, e.to_string()))
    }

    fn set_transform(&mut self, handle: EntityHandle, pose: &Pose) -> PlacementResult<()> {
        let entity = to_entity(handle, SceneOp::SetTransform)?;
        let mut transform = self
            .visuals
            .get_mut(entity)
            .map_err(|e| PlacementError::scene(SceneOp::SetTransform, e.to_string()))?;
        transform.translation = pose.position;
        transform.rotation = pose.orientation;
        Ok(())
    }
}
