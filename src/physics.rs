// src/physics.rs

use rapier3d::prelude::*;
use rapier3d::prelude::{Group, InteractionGroups};
use tracing::{debug, warn};

use crate::config::WorldConfig;
use crate::error::{Result, SimError};
use crate::materials::{ContactMaterial, MaterialId, MaterialTable};
use crate::raycast_vehicle::{RaycastVehicle, WheelTransform};

pub const GROUP_GROUND: Group = Group::from_bits_truncate(0b0001);
pub const GROUP_CHASSIS: Group = Group::from_bits_truncate(0b0010);
pub const GROUP_WHEEL: Group = Group::from_bits_truncate(0b0100);

/// Ground colliders touch chassis and wheels.
pub fn ground_groups() -> InteractionGroups {
    InteractionGroups::new(GROUP_GROUND, GROUP_CHASSIS | GROUP_WHEEL)
}

pub fn chassis_groups() -> InteractionGroups {
    InteractionGroups::new(GROUP_CHASSIS, GROUP_GROUND)
}

pub fn wheel_groups() -> InteractionGroups {
    InteractionGroups::new(GROUP_WHEEL, GROUP_GROUND)
}

/// Suspension rays only see the ground.
fn ray_filter(chassis: RigidBodyHandle) -> QueryFilter<'static> {
    QueryFilter::default()
        .exclude_rigid_body(chassis)
        .groups(InteractionGroups::new(GROUP_WHEEL, GROUP_GROUND))
}

/// Step length actually simulated for a frame delta: non-finite or negative
/// deltas simulate nothing, long frames are cut to `max_dt`.
#[inline]
pub fn clamp_dt(dt: Real, max_dt: Real) -> Real {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    dt.min(max_dt)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VehicleHandle(pub usize);

pub struct PhysicsWorld {
    pub gravity: Vector<Real>, // gravity vector
    pub pipeline: PhysicsPipeline, // physics pipeline
    pub island_manager: IslandManager, // manages islands of bodies
    pub broad_phase: DefaultBroadPhase, // broad-phase collision detection
    pub narrow_phase: NarrowPhase, // collision detection
    pub bodies: RigidBodySet, // for rigid bodies
    pub colliders: ColliderSet, // for collision shapes
    pub joints: ImpulseJointSet, // for constraints
    pub multibody_joints: MultibodyJointSet, // for articulated bodies
    pub ccd: CCDSolver, // continuous collision detection
    pub query_pipeline: QueryPipeline, // for suspension rays
    materials: MaterialTable,
    vehicles: Vec<RaycastVehicle>,
    max_dt: Real,
    steps: u64,
    elapsed: Real,
}

impl PhysicsWorld {
    pub fn new(config: &WorldConfig) -> Self {
        let [gx, gy, gz] = config.gravity;

        debug!(gravity = ?config.gravity, max_dt = config.max_dt, "physics world created");

        Self {
            gravity: vector![gx, gy, gz],
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            materials: MaterialTable::new(),
            vehicles: Vec::new(),
            max_dt: config.max_dt,
            steps: 0,
            elapsed: 0.0,
        }
    }

    pub fn max_dt(&self) -> Real {
        self.max_dt
    }

    /// Number of steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Simulated time so far (s).
    pub fn elapsed(&self) -> Real {
        self.elapsed
    }

    // --------------------------------------------------
    // materials
    // --------------------------------------------------

    pub fn create_material(&mut self, name: &str) -> MaterialId {
        self.materials.create(name)
    }

    pub fn add_contact_material(&mut self, pair: ContactMaterial) -> Result<()> {
        self.materials.register(pair)?;
        debug!(
            a = %self.materials.name(pair.a),
            b = %self.materials.name(pair.b),
            friction = pair.friction,
            restitution = pair.restitution,
            "contact material registered"
        );
        Ok(())
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    /// Material of a collider, as stored in its user data.
    pub fn collider_material(&self, handle: ColliderHandle) -> Option<MaterialId> {
        self.colliders
            .get(handle)
            .map(|c| MaterialId::from_user_data(c.user_data))
    }

    /// Fails on the first pair of colliders that can touch but whose surfaces
    /// have no registered contact material. Colliders on the same body and
    /// pairs of fixed colliders never touch.
    pub fn validate_contact_materials(&self) -> Result<()> {
        let colliders: Vec<&Collider> = self.colliders.iter().map(|(_, c)| c).collect();

        for (i, c1) in colliders.iter().enumerate() {
            for c2 in colliders.iter().skip(i + 1) {
                if c1.parent().is_some() && c1.parent() == c2.parent() {
                    continue;
                }
                if self.is_fixed(c1) && self.is_fixed(c2) {
                    continue;
                }
                if !c1.collision_groups().test(c2.collision_groups()) {
                    continue;
                }

                let a = MaterialId::from_user_data(c1.user_data);
                let b = MaterialId::from_user_data(c2.user_data);
                if self.materials.lookup(a, b).is_none() {
                    return Err(SimError::MissingContactMaterial {
                        a: self.materials.name(a),
                        b: self.materials.name(b),
                    });
                }
            }
        }

        Ok(())
    }

    fn is_fixed(&self, collider: &Collider) -> bool {
        collider
            .parent()
            .and_then(|h| self.bodies.get(h))
            .map_or(true, |b| b.is_fixed())
    }

    // --------------------------------------------------
    // bodies
    // --------------------------------------------------

    pub fn add_body(&mut self, body: impl Into<RigidBody>) -> RigidBodyHandle {
        self.bodies.insert(body)
    }

    /// Inserts a collider tagged with `material`, attached to `parent` when
    /// given. The collider takes part in per-pair material resolution.
    pub fn add_collider(
        &mut self,
        collider: impl Into<Collider>,
        material: MaterialId,
        parent: Option<RigidBodyHandle>,
    ) -> Result<ColliderHandle> {
        if self.materials.surface(material).is_none() {
            return Err(SimError::UnknownMaterial(material));
        }

        let mut collider = collider.into();
        collider.user_data = material.to_user_data();
        collider.set_active_hooks(collider.active_hooks() | ActiveHooks::MODIFY_SOLVER_CONTACTS);

        let handle = match parent {
            Some(parent) => {
                if !self.bodies.contains(parent) {
                    return Err(SimError::UnknownBody(format!("{parent:?}")));
                }
                self.colliders.insert_with_parent(collider, parent, &mut self.bodies)
            }
            None => self.colliders.insert(collider),
        };

        Ok(handle)
    }

    pub fn body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    // --------------------------------------------------
    // vehicles
    // --------------------------------------------------

    pub fn add_vehicle(&mut self, vehicle: RaycastVehicle) -> Result<VehicleHandle> {
        if !self.bodies.contains(vehicle.chassis()) {
            return Err(SimError::UnknownBody(format!("{:?}", vehicle.chassis())));
        }
        self.vehicles.push(vehicle);
        Ok(VehicleHandle(self.vehicles.len() - 1))
    }

    pub fn vehicle(&self, handle: VehicleHandle) -> Option<&RaycastVehicle> {
        self.vehicles.get(handle.0)
    }

    pub fn vehicle_mut(&mut self, handle: VehicleHandle) -> Option<&mut RaycastVehicle> {
        self.vehicles.get_mut(handle.0)
    }

    /// Recomputes the hub pose of one wheel from the current chassis pose.
    pub fn update_wheel_transform(&mut self, handle: VehicleHandle, wheel: usize) -> Result<WheelTransform> {
        let vehicle = self
            .vehicles
            .get_mut(handle.0)
            .ok_or(SimError::UnknownVehicle(handle.0))?;
        let chassis = self
            .bodies
            .get(vehicle.chassis())
            .ok_or_else(|| SimError::UnknownBody(format!("{:?}", vehicle.chassis())))?;

        vehicle
            .update_wheel_transform(wheel, chassis.position())
            .ok_or(SimError::UnknownWheel {
                vehicle: handle.0,
                wheel,
            })
    }

    // --------------------------------------------------
    // stepping
    // --------------------------------------------------

    /// Advances the world by `dt`, cut to the configured maximum. Returns the
    /// step length actually simulated.
    pub fn step(&mut self, dt: Real) -> Real {
        let dt = clamp_dt(dt, self.max_dt);
        if dt == 0.0 {
            return 0.0;
        }

        let events = ();

        // 1) Suspension, friction and wheel spin
        self.query_pipeline.update(&self.colliders);
        for vehicle in self.vehicles.iter_mut() {
            let filter = ray_filter(vehicle.chassis());
            vehicle.update_vehicle(
                dt,
                &mut self.bodies,
                &self.colliders,
                &self.query_pipeline,
                filter,
            );
        }

        // 2) Step physics.
        self.pipeline.step(
            &self.gravity,
            &IntegrationParameters {
                dt,
                ..IntegrationParameters::default()
            },
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &self.materials,
            &events,
        );

        self.steps += 1;
        self.elapsed += dt;

        // 3) Report bodies that left the finite range
        for (handle, body) in self.bodies.iter() {
            let pos = body.translation();
            if !pos.x.is_finite() || !pos.y.is_finite() || !pos.z.is_finite() {
                warn!(body = ?handle, step = self.steps, "body position is no longer finite");
            }
        }

        dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> PhysicsWorld {
        PhysicsWorld::new(&WorldConfig::default())
    }

    #[test]
    fn long_frames_are_cut_to_the_bound() {
        assert_eq!(clamp_dt(1.0, 1.0 / 20.0), 1.0 / 20.0);
        assert_eq!(clamp_dt(1.0 / 60.0, 1.0 / 20.0), 1.0 / 60.0);
        assert_eq!(clamp_dt(-0.5, 1.0 / 20.0), 0.0);
        assert_eq!(clamp_dt(Real::NAN, 1.0 / 20.0), 0.0);
    }

    #[test]
    fn step_reports_the_clamped_length() {
        let mut world = world();
        assert_eq!(world.step(0.5), 1.0 / 20.0);
        assert_eq!(world.step(0.0), 0.0);
        assert_eq!(world.steps(), 1);
    }

    #[test]
    fn falling_body_moves_down() {
        let mut world = world();
        let rock = world.create_material("rock");
        let handle = world.add_body(RigidBodyBuilder::dynamic().translation(vector![0.0, 5.0, 0.0]));
        world
            .add_collider(ColliderBuilder::ball(0.5).density(1.0), rock, Some(handle))
            .unwrap();
        for _ in 0..10 {
            world.step(1.0 / 60.0);
        }
        assert!(world.body(handle).unwrap().translation().y < 5.0);
    }

    #[test]
    fn touching_surfaces_need_a_contact_material() {
        let mut world = world();
        let ground = world.create_material("ground");
        let chassis = world.create_material("chassis");

        world
            .add_collider(ColliderBuilder::halfspace(Vector::y_axis()).collision_groups(ground_groups()), ground, None)
            .unwrap();
        let body = world.add_body(RigidBodyBuilder::dynamic().translation(vector![0.0, 1.0, 0.0]));
        world
            .add_collider(ColliderBuilder::cuboid(1.0, 0.3, 2.7).collision_groups(chassis_groups()), chassis, Some(body))
            .unwrap();

        let err = world.validate_contact_materials().unwrap_err();
        assert!(matches!(err, SimError::MissingContactMaterial { .. }));

        world
            .add_contact_material(ContactMaterial::new(chassis, ground))
            .unwrap();
        assert!(world.validate_contact_materials().is_ok());
    }

    #[test]
    fn filtered_out_pairs_need_no_material() {
        let mut world = world();
        let chassis = world.create_material("chassis");
        let wheel = world.create_material("wheel");

        let body = world.add_body(RigidBodyBuilder::dynamic());
        world
            .add_collider(ColliderBuilder::cuboid(1.0, 0.3, 2.7).collision_groups(chassis_groups()), chassis, Some(body))
            .unwrap();
        let hub = world.add_body(RigidBodyBuilder::kinematic_position_based());
        world
            .add_collider(ColliderBuilder::ball(0.25).collision_groups(wheel_groups()), wheel, Some(hub))
            .unwrap();

        assert!(world.validate_contact_materials().is_ok());
    }

    #[test]
    fn collider_with_unknown_material_is_rejected() {
        let mut world = world();
        let err = world
            .add_collider(ColliderBuilder::ball(1.0), MaterialId(3), None)
            .unwrap_err();
        assert!(matches!(err, SimError::UnknownMaterial(_)));
    }

    #[test]
    fn vehicle_needs_a_registered_chassis() {
        let mut world = world();
        let vehicle = RaycastVehicle::new(RigidBodyHandle::invalid(), Default::default());
        assert!(matches!(world.add_vehicle(vehicle), Err(SimError::UnknownBody(_))));
    }
}
