//! Per-frame visual actors.
//!
//! Each actor owns its physics bodies (through handles into the world) and
//! its scene nodes, and is ticked once per frame after the physics step.

pub mod floor;
pub mod vehicle;

use glam::{Quat, Vec3};
use rapier3d::prelude::*;

use crate::physics::PhysicsWorld;
use crate::scene::SceneGraph;

pub use floor::Floor;
pub use vehicle::VehicleActor;

pub trait Tickable {
    fn name(&self) -> &str;

    /// Copies simulation state onto the actor's scene nodes.
    fn tick(&mut self, dt: f32, world: &mut PhysicsWorld, scene: &mut SceneGraph);
}

#[inline]
pub fn to_vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[inline]
pub fn to_quat(q: &Rotation<Real>) -> Quat {
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

#[inline]
pub fn to_glam(iso: &Isometry<Real>) -> (Vec3, Quat) {
    (to_vec3(&iso.translation.vector), to_quat(&iso.rotation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn isometry_converts_to_the_same_pose() {
        let iso = Isometry::new(vector![1.0, 2.0, 3.0], vector![0.0, 0.4, 0.0]);
        let (position, rotation) = to_glam(&iso);

        assert_eq!(position, Vec3::new(1.0, 2.0, 3.0));
        let turned = rotation * Vec3::Z;
        let expected = iso.rotation * vector![0.0, 0.0, 1.0];
        assert_relative_eq!(turned.x, expected.x, epsilon = 1e-6);
        assert_relative_eq!(turned.z, expected.z, epsilon = 1e-6);
    }
}
