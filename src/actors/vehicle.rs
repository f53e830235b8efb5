// ==============================================================================
// actors/vehicle.rs — VEHICLE ACTOR
// ------------------------------------------------------------------------------
// Construction (once, after resources are ready):
// - chassis + wheel surface materials, paired with the ground
// - dynamic chassis box, density chosen so the box weighs `mass`
// - raycast vehicle with four wheels on a rectangle of connection points
// - one kinematic body per wheel (pose only, never pushes the chassis)
// - scene: chassis node (+ offset model child), four wheel nodes, shadow quad
//
// tick (every frame, after the physics step):
// - chassis node  = chassis body pose, no interpolation
// - wheel i       = update_wheel_transform(i), copied to the node and set as
//                   the wheel body's next kinematic pose
// - shadow        = chassis x/z at a fixed height, chassis rotation
// ==============================================================================

use std::f32::consts::PI;

use glam::{Quat, Vec3};
use rapier3d::prelude::*;
use tracing::{info, warn};

use crate::config::{ContactConfig, VehicleConfig};
use crate::error::Result;
use crate::materials::{ContactMaterial, MaterialId};
use crate::physics::{PhysicsWorld, VehicleHandle, chassis_groups, wheel_groups};
use crate::raycast_vehicle::{RaycastVehicle, VehicleAxes, WheelOptions};
use crate::resources::Resources;
use crate::scene::{NodeId, SceneGraph, Visual};

use super::{Tickable, to_glam};

const SHADOW_COLOR: u32 = 0xffffff;

fn contact(a: MaterialId, b: MaterialId, config: &ContactConfig) -> ContactMaterial {
    ContactMaterial::new(a, b)
        .friction(config.friction)
        .restitution(config.restitution)
        .contact_stiffness(config.contact_stiffness)
}

/// Model visual for `asset`, or nothing when the asset never loaded.
fn model_visual(resources: &Resources, asset: &str, mirrored: bool) -> Option<Visual> {
    if resources.get(asset).is_none() {
        warn!(asset, "model asset unavailable, node left without a visual");
        return None;
    }
    Some(Visual::Model {
        asset: asset.to_string(),
        mirrored,
    })
}

pub struct VehicleActor {
    vehicle: VehicleHandle,
    chassis: RigidBodyHandle,
    wheel_bodies: Vec<RigidBodyHandle>,
    chassis_material: MaterialId,
    wheel_material: MaterialId,

    chassis_node: NodeId,
    chassis_model: NodeId,
    wheel_nodes: Vec<NodeId>,
    shadow: NodeId,
    shadow_height: f32,
}

impl VehicleActor {
    pub fn new(
        world: &mut PhysicsWorld,
        scene: &mut SceneGraph,
        resources: &Resources,
        config: &VehicleConfig,
        ground: MaterialId,
    ) -> Result<Self> {
        // --- Materials ---
        let chassis_material = world.create_material("chassis");
        let wheel_material = world.create_material("wheel");
        world.add_contact_material(contact(wheel_material, ground, &config.wheel_ground_contact))?;
        world.add_contact_material(contact(chassis_material, ground, &config.chassis_ground_contact))?;

        // --- Chassis ---
        let [sx, sy, sz] = config.spawn_position;
        let [hx, hy, hz] = config.chassis_half_extents;
        let volume = 8.0 * hx * hy * hz;    // box size
        let density = config.mass / volume; // ρ = m / V

        let chassis = world.add_body(
            RigidBodyBuilder::dynamic()
                .translation(vector![sx, sy, sz])
                .linear_damping(config.linear_damping)
                .angular_damping(config.angular_damping)
                .can_sleep(false),
        );
        world.add_collider(
            ColliderBuilder::cuboid(hx, hy, hz)
                .density(density)
                .collision_groups(chassis_groups()),
            chassis_material,
            Some(chassis),
        )?;

        // --- Raycast vehicle ---
        let mut raycast = RaycastVehicle::new(chassis, VehicleAxes::default());
        let connections = config.connection_points();
        for connection in connections {
            raycast.add_wheel(WheelOptions::from_config(&config.wheel, connection));
        }
        let vehicle = world.add_vehicle(raycast)?;

        // --- Wheel bodies ---
        let radius = config.wheel.radius;
        let half_width = radius / 4.0;
        let wheel_volume = PI * radius * radius * (2.0 * half_width);
        let mut wheel_bodies = Vec::with_capacity(connections.len());
        for _ in &connections {
            let body = world.add_body(RigidBodyBuilder::kinematic_position_based().can_sleep(false));
            world.add_collider(
                ColliderBuilder::cylinder(half_width, radius)
                    // cylinder axis along the axle
                    .rotation(vector![0.0, 0.0, PI / 2.0])
                    .density(config.wheel_body_mass / wheel_volume)
                    .collision_groups(wheel_groups()),
                wheel_material,
                Some(body),
            )?;
            wheel_bodies.push(body);
        }

        // --- Scene ---
        let chassis_node = scene.add("chassis", None, None);
        let chassis_model = scene.add(
            "chassis-model",
            Some(chassis_node),
            model_visual(resources, "chassis", false),
        );
        scene.set_transform(
            chassis_model,
            Vec3::from_array(config.chassis_model_offset),
            Quat::IDENTITY,
        );

        let wheel_nodes = connections
            .iter()
            .enumerate()
            .map(|(i, connection)| {
                // Wheels on the −x side show the model turned half a turn.
                let mirrored = connection[0] < 0.0;
                scene.add(&format!("wheel-{i}"), None, model_visual(resources, "wheel", mirrored))
            })
            .collect();

        let shadow_texture = resources.get("shadow").map(|a| a.name.clone());
        if shadow_texture.is_none() {
            warn!("shadow texture unavailable, shadow quad left untextured");
        }
        let shadow = scene.add(
            "shadow",
            None,
            Some(Visual::Plane {
                size: config.shadow_size,
                color: SHADOW_COLOR,
                texture: shadow_texture,
                transparent: true,
            }),
        );

        info!(
            mass = config.mass,
            wheels = connections.len(),
            spawn = ?config.spawn_position,
            "vehicle created"
        );

        let actor = Self {
            vehicle,
            chassis,
            wheel_bodies,
            chassis_material,
            wheel_material,
            chassis_node,
            chassis_model,
            wheel_nodes,
            shadow,
            shadow_height: config.shadow_height,
        };
        actor.sync(world, scene);
        Ok(actor)
    }

    /// Node carrying the chassis pose, for the camera to follow.
    pub fn get_vehicle(&self) -> NodeId {
        self.chassis_node
    }

    pub fn vehicle(&self) -> VehicleHandle {
        self.vehicle
    }

    pub fn chassis(&self) -> RigidBodyHandle {
        self.chassis
    }

    pub fn wheel_bodies(&self) -> &[RigidBodyHandle] {
        &self.wheel_bodies
    }

    pub fn wheel_nodes(&self) -> &[NodeId] {
        &self.wheel_nodes
    }

    pub fn chassis_model(&self) -> NodeId {
        self.chassis_model
    }

    pub fn shadow(&self) -> NodeId {
        self.shadow
    }

    pub fn chassis_material(&self) -> MaterialId {
        self.chassis_material
    }

    pub fn wheel_material(&self) -> MaterialId {
        self.wheel_material
    }

    fn sync(&self, world: &mut PhysicsWorld, scene: &mut SceneGraph) {
        let Some(body) = world.body(self.chassis) else {
            warn!(chassis = ?self.chassis, "chassis body missing, visuals not updated");
            return;
        };

        let (position, rotation) = to_glam(body.position());
        scene.set_transform(self.chassis_node, position, rotation);
        scene.set_transform(
            self.shadow,
            Vec3::new(position.x, self.shadow_height, position.z),
            rotation,
        );

        for (i, (&node, &wheel_body)) in self.wheel_nodes.iter().zip(&self.wheel_bodies).enumerate() {
            let transform = match world.update_wheel_transform(self.vehicle, i) {
                Ok(transform) => transform,
                Err(e) => {
                    warn!(wheel = i, error = %e, "wheel transform unavailable");
                    continue;
                }
            };

            let iso = transform.isometry();
            if let Some(body) = world.body_mut(wheel_body) {
                body.set_next_kinematic_position(iso);
            }
            let (position, rotation) = to_glam(&iso);
            scene.set_transform(node, position, rotation);
        }
    }
}

impl Tickable for VehicleActor {
    fn name(&self) -> &str {
        "vehicle"
    }

    fn tick(&mut self, _dt: f32, world: &mut PhysicsWorld, scene: &mut SceneGraph) {
        self.sync(world, scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::Floor;
    use crate::config::WorldConfig;
    use approx::assert_relative_eq;

    fn build() -> (PhysicsWorld, SceneGraph, VehicleActor) {
        let mut world = PhysicsWorld::new(&WorldConfig::default());
        let mut scene = SceneGraph::new();
        let ground = world.create_material("ground");
        Floor::new(&mut world, &mut scene, ground, 0.0).unwrap();
        let actor = VehicleActor::new(
            &mut world,
            &mut scene,
            &Resources::default(),
            &VehicleConfig::default(),
            ground,
        )
        .unwrap();
        (world, scene, actor)
    }

    #[test]
    fn construction_registers_every_touching_surface_pair() {
        let (world, _, actor) = build();
        assert!(world.validate_contact_materials().is_ok());
        assert_eq!(world.vehicle(actor.vehicle()).unwrap().num_wheels(), 4);
        assert_eq!(actor.wheel_bodies().len(), 4);
    }

    #[test]
    fn missing_assets_leave_nodes_without_visuals() {
        let (_, scene, actor) = build();
        assert!(scene.node(actor.chassis_model()).unwrap().visual.is_none());
        for &node in actor.wheel_nodes() {
            assert!(scene.node(node).unwrap().visual.is_none());
        }
        // the shadow quad is still there, just untextured
        assert!(matches!(
            scene.node(actor.shadow()).unwrap().visual,
            Some(Visual::Plane { texture: None, .. })
        ));
    }

    #[test]
    fn wheel_bodies_follow_the_hubs_after_a_step() {
        let (mut world, mut scene, mut actor) = build();
        world.step(1.0 / 60.0);
        actor.tick(1.0 / 60.0, &mut world, &mut scene);
        world.step(1.0 / 60.0);

        for (i, &handle) in actor.wheel_bodies().iter().enumerate() {
            let target = world.vehicle(actor.vehicle()).unwrap().wheels()[i].world_transform().position;
            let body = world.body(handle).unwrap();
            assert!(body.is_kinematic());
            assert_relative_eq!(body.translation().x, target.x, epsilon = 1e-5);
            assert_relative_eq!(body.translation().z, target.z, epsilon = 1e-5);
        }
    }

    #[test]
    fn tick_copies_physics_poses_onto_the_scene() {
        let (mut world, mut scene, mut actor) = build();
        for _ in 0..30 {
            world.step(1.0 / 60.0);
        }
        actor.tick(1.0 / 60.0, &mut world, &mut scene);

        let chassis = world.body(actor.chassis()).unwrap();
        let node = scene.node(actor.get_vehicle()).unwrap();
        assert_eq!(node.position.y, chassis.translation().y);

        let shadow = scene.node(actor.shadow()).unwrap();
        assert_eq!(shadow.position.y, 0.05);
        assert_eq!(shadow.position.x, node.position.x);
        assert_eq!(shadow.position.z, node.position.z);

        for (i, &wheel) in actor.wheel_nodes().iter().enumerate() {
            let cached = world.vehicle(actor.vehicle()).unwrap().wheels()[i].world_transform().position;
            let wheel_node = scene.node(wheel).unwrap();
            assert_relative_eq!(wheel_node.position.x, cached.x);
            assert_relative_eq!(wheel_node.position.y, cached.y);

            // kinematic bodies reach the pose on the next step
            let body = world.body(actor.wheel_bodies()[i]).unwrap();
            assert_relative_eq!(body.next_position().translation.vector.z, cached.z);
        }
    }
}
