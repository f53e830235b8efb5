use glam::{Quat, Vec3};
use rapier3d::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::materials::MaterialId;
use crate::physics::{PhysicsWorld, ground_groups};
use crate::scene::{NodeId, SceneGraph, Visual};

use super::Tickable;

const PLANE_SIZE: f32 = 4000.0;
const PLANE_COLOR: u32 = 0x001f62;
const PLANE_DROP: f32 = 0.05;
const GRID_COLOR: u32 = 0x5c8fc3;

/// Static infinite ground plus its visual plane and grid.
pub struct Floor {
    body: RigidBodyHandle,
    collider: ColliderHandle,
    root: NodeId,
}

impl Floor {
    pub fn new(
        world: &mut PhysicsWorld,
        scene: &mut SceneGraph,
        material: MaterialId,
        height: f32,
    ) -> Result<Self> {
        let body = world.add_body(RigidBodyBuilder::fixed().translation(vector![0.0, height, 0.0]));
        let collider = world.add_collider(
            ColliderBuilder::halfspace(Vector::y_axis())
                .collision_groups(ground_groups())
                .friction(0.3)
                .restitution(0.0),
            material,
            Some(body),
        )?;

        let root = scene.add("floor", None, None);
        scene.set_transform(root, Vec3::new(0.0, height, 0.0), Quat::IDENTITY);

        let plane = scene.add(
            "floor-plane",
            Some(root),
            Some(Visual::Plane {
                size: PLANE_SIZE,
                color: PLANE_COLOR,
                texture: None,
                transparent: false,
            }),
        );
        // Sits just under the grid.
        scene.set_transform(plane, Vec3::new(0.0, -PLANE_DROP, 0.0), Quat::IDENTITY);

        scene.add(
            "floor-grid",
            Some(root),
            Some(Visual::Grid {
                minor: 2.0,
                major: 20.0,
                color: GRID_COLOR,
                distance: PLANE_SIZE,
            }),
        );

        debug!(height, "floor created");

        Ok(Self { body, collider, root })
    }

    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn collider(&self) -> ColliderHandle {
        self.collider
    }

    pub fn root(&self) -> NodeId {
        self.root
    }
}

impl Tickable for Floor {
    fn name(&self) -> &str {
        "floor"
    }

    // Nothing moves.
    fn tick(&mut self, _dt: f32, _world: &mut PhysicsWorld, _scene: &mut SceneGraph) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;

    #[test]
    fn floor_adds_a_fixed_ground_and_two_visuals() {
        let mut world = PhysicsWorld::new(&WorldConfig::default());
        let mut scene = SceneGraph::new();
        let ground = world.create_material("ground");

        let floor = Floor::new(&mut world, &mut scene, ground, 0.0).unwrap();

        assert!(world.body(floor.body()).unwrap().is_fixed());
        assert_eq!(world.collider_material(floor.collider()), Some(ground));
        assert_eq!(scene.children(floor.root()).count(), 2);

        let plane = scene.find("floor-plane").unwrap();
        let (position, _) = scene.world_transform(plane).unwrap();
        assert_eq!(position.y, -0.05);
    }
}
