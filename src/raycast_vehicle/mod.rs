// ==============================================================================
// raycast_vehicle — RAYCAST SUSPENSION VEHICLE
// ------------------------------------------------------------------------------
// A chassis rigid body plus N wheels that exist only as rays. Per step:
// 1) wheel frames + hub transforms from the current chassis pose
// 2) signed speed along the chassis forward axis
// 3) one suspension ray per wheel
// 4) suspension forces, clamped, applied as impulses at the contact points
// 5) friction impulses (forward + side)
// 6) wheel spin from ground speed, or the custom sliding speed
//
// The vehicle only holds the chassis handle; PhysicsWorld owns the body and
// calls update_vehicle before each pipeline step.
// ==============================================================================

pub mod friction;
pub mod kinematics;
pub mod suspension;
pub mod wheel;

use rapier3d::prelude::*;
use tracing::warn;

pub use wheel::{RaycastResult, WheelInfo, WheelOptions, WheelTransform};

use kinematics::{hub_transform, update_wheel_frame, vehicle_axis_world};

const SPIN_DECAY: Real = 0.99;

/// Which chassis-local axis is right, up and forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleAxes {
    pub right: usize,
    pub up: usize,
    pub forward: usize,
}

impl Default for VehicleAxes {
    fn default() -> Self {
        Self { right: 0, up: 1, forward: 2 }
    }
}

#[derive(Debug, Clone)]
pub struct RaycastVehicle {
    chassis: RigidBodyHandle,
    axes: VehicleAxes,
    wheels: Vec<WheelInfo>,
    current_speed_kmh: Real,
    sliding: bool,
}

impl RaycastVehicle {
    pub fn new(chassis: RigidBodyHandle, axes: VehicleAxes) -> Self {
        Self {
            chassis,
            axes,
            wheels: Vec::new(),
            current_speed_kmh: 0.0,
            sliding: false,
        }
    }

    pub fn chassis(&self) -> RigidBodyHandle {
        self.chassis
    }

    pub fn axes(&self) -> VehicleAxes {
        self.axes
    }

    /// Appends a wheel and returns its index.
    pub fn add_wheel(&mut self, options: WheelOptions) -> usize {
        self.wheels.push(WheelInfo::new(options));
        self.wheels.len() - 1
    }

    pub fn wheels(&self) -> &[WheelInfo] {
        &self.wheels
    }

    pub fn wheel(&self, index: usize) -> Option<&WheelInfo> {
        self.wheels.get(index)
    }

    pub fn num_wheels(&self) -> usize {
        self.wheels.len()
    }

    /// # Panics
    /// If `index` is not a wheel of this vehicle.
    pub fn apply_engine_force(&mut self, force: Real, index: usize) {
        self.wheels[index].engine_force = force;
    }

    /// # Panics
    /// If `index` is not a wheel of this vehicle.
    pub fn set_steering_value(&mut self, value: Real, index: usize) {
        self.wheels[index].steering = value;
    }

    /// # Panics
    /// If `index` is not a wheel of this vehicle.
    pub fn set_brake(&mut self, brake: Real, index: usize) {
        self.wheels[index].brake = brake;
    }

    /// Signed ground speed in km/h, negative when rolling backwards.
    pub fn current_speed_kmh(&self) -> Real {
        self.current_speed_kmh
    }

    /// Whether any wheel lost grip during the last step.
    pub fn is_sliding(&self) -> bool {
        self.sliding
    }

    /// Recomputes the hub pose of wheel `index` from the given chassis pose
    /// and caches it on the wheel.
    pub fn update_wheel_transform(
        &mut self,
        index: usize,
        chassis_position: &Isometry<Real>,
    ) -> Option<WheelTransform> {
        let wheel = self.wheels.get_mut(index)?;
        update_wheel_frame(wheel, chassis_position);
        let transform = hub_transform(wheel, &chassis_position.rotation);
        wheel.world_transform = transform;
        Some(transform)
    }

    pub(crate) fn update_vehicle(
        &mut self,
        dt: Real,
        bodies: &mut RigidBodySet,
        colliders: &ColliderSet,
        query: &QueryPipeline,
        filter: QueryFilter,
    ) {
        let Some(chassis) = bodies.get(self.chassis) else {
            warn!(chassis = ?self.chassis, "vehicle chassis missing from body set");
            return;
        };

        // 1) wheel frames
        let chassis_position = *chassis.position();
        for wheel in self.wheels.iter_mut() {
            update_wheel_frame(wheel, &chassis_position);
            wheel.world_transform = hub_transform(wheel, &chassis_position.rotation);
        }

        // 2) speed
        let linvel = *chassis.linvel();
        let forward_world = vehicle_axis_world(&chassis_position.rotation, self.axes.forward);
        self.current_speed_kmh = 3.6 * linvel.norm();
        if forward_world.dot(&linvel) < 0.0 {
            self.current_speed_kmh = -self.current_speed_kmh;
        }

        // 3) + 4) rays and suspension forces
        let chassis_mass = chassis.mass();
        for wheel in self.wheels.iter_mut() {
            suspension::cast_ray(wheel, chassis, query, bodies, colliders, filter);
            wheel.suspension_force = suspension::suspension_force(wheel, chassis_mass);
        }

        let Some(chassis) = bodies.get_mut(self.chassis) else {
            return;
        };

        for wheel in self.wheels.iter() {
            if !wheel.raycast.in_contact {
                continue;
            }
            let force = wheel.suspension_force.min(wheel.options().max_suspension_force);
            let impulse = wheel.raycast.hit_normal_world * (force * dt);
            chassis.apply_impulse_at_point(impulse, wheel.raycast.hit_point_world, true);
        }

        // 5) friction
        self.sliding = friction::update_friction(
            &mut self.wheels,
            chassis,
            dt,
            self.axes.right,
            self.axes.up,
        );

        // 6) wheel spin
        let spin_sign: Real = if self.axes.up == 1 { -1.0 } else { 1.0 };
        for wheel in self.wheels.iter_mut() {
            let velocity = chassis.velocity_at_point(&wheel.chassis_connection_point_world);

            if wheel.raycast.in_contact {
                let normal = wheel.raycast.hit_normal_world;
                let forward = forward_world - normal * forward_world.dot(&normal);
                let ground_speed = forward.dot(&velocity);
                wheel.delta_rotation = spin_sign * ground_speed * dt / wheel.radius();
            }

            let options = wheel.options();
            if (wheel.sliding || !wheel.raycast.in_contact)
                && wheel.engine_force != 0.0
                && options.use_custom_sliding_rotational_speed
            {
                wheel.delta_rotation =
                    wheel.engine_force.signum() * options.custom_sliding_rotational_speed * dt;
            }

            if wheel.brake.abs() > wheel.engine_force.abs() {
                wheel.delta_rotation = 0.0;
            }

            wheel.rotation += wheel.delta_rotation;
            wheel.delta_rotation *= SPIN_DECAY;
        }
    }
}
