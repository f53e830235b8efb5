// ==============================================================================
// wheel.rs — WHEEL CONFIGURATION + RUNTIME STATE
// ------------------------------------------------------------------------------
// WheelOptions is the immutable per-wheel description handed to
// RaycastVehicle::add_wheel. Everything is chassis-local.
//
// WheelInfo pairs the options with the state rewritten every step:
// - control inputs: engine force, steering angle, brake
// - ray cast result: contact point/normal, suspension length
// - suspension: relative velocity, resulting force
// - friction: forward/side impulses, skid factor
// - kinematics: world connection point, axle, hub transform, spin
// ==============================================================================

use rapier3d::prelude::*;

use crate::config::WheelConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelOptions {
    pub radius: Real,
    pub direction_local: Vector<Real>,
    pub axle_local: Vector<Real>,
    pub chassis_connection_point_local: Point<Real>,
    pub suspension_stiffness: Real,
    pub suspension_rest_length: Real,
    pub friction_slip: Real,
    pub damping_relaxation: Real,
    pub damping_compression: Real,
    pub max_suspension_force: Real,
    pub roll_influence: Real,
    pub max_suspension_travel: Real,
    pub custom_sliding_rotational_speed: Real,
    pub use_custom_sliding_rotational_speed: bool,
}

impl WheelOptions {
    pub fn from_config(config: &WheelConfig, connection: [f32; 3]) -> Self {
        let [dx, dy, dz] = config.direction_local;
        let [ax, ay, az] = config.axle_local;
        let [cx, cy, cz] = connection;
        Self {
            radius: config.radius,
            direction_local: vector![dx, dy, dz],
            axle_local: vector![ax, ay, az],
            chassis_connection_point_local: point![cx, cy, cz],
            suspension_stiffness: config.suspension_stiffness,
            suspension_rest_length: config.suspension_rest_length,
            friction_slip: config.friction_slip,
            damping_relaxation: config.damping_relaxation,
            damping_compression: config.damping_compression,
            max_suspension_force: config.max_suspension_force,
            roll_influence: config.roll_influence,
            max_suspension_travel: config.max_suspension_travel,
            custom_sliding_rotational_speed: config.custom_sliding_rotational_speed,
            use_custom_sliding_rotational_speed: config.use_custom_sliding_rotational_speed,
        }
    }
}

/// World-space pose of a wheel hub.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelTransform {
    pub position: Point<Real>,
    pub rotation: Rotation<Real>,
}

impl WheelTransform {
    pub fn isometry(&self) -> Isometry<Real> {
        Isometry::from_parts(self.position.coords.into(), self.rotation)
    }
}

impl Default for WheelTransform {
    fn default() -> Self {
        Self {
            position: Point::origin(),
            rotation: Rotation::identity(),
        }
    }
}

/// Outcome of the last suspension ray cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastResult {
    pub in_contact: bool,
    pub hit_point_world: Point<Real>,
    pub hit_normal_world: Vector<Real>,
    pub hit_distance: Real,
    pub ground: Option<ColliderHandle>,
}

impl Default for RaycastResult {
    fn default() -> Self {
        Self {
            in_contact: false,
            hit_point_world: Point::origin(),
            hit_normal_world: Vector::y(),
            hit_distance: 0.0,
            ground: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WheelInfo {
    options: WheelOptions,

    // control
    pub(crate) engine_force: Real,
    pub(crate) steering: Real,
    pub(crate) brake: Real,

    // ray cast + suspension
    pub(crate) raycast: RaycastResult,
    pub(crate) suspension_length: Real,
    pub(crate) suspension_relative_velocity: Real,
    pub(crate) clipped_inv_contact_dot_suspension: Real,
    pub(crate) suspension_force: Real,

    // friction
    pub(crate) forward_impulse: Real,
    pub(crate) side_impulse: Real,
    pub(crate) skid_info: Real,
    pub(crate) sliding: bool,

    // kinematics
    pub(crate) chassis_connection_point_world: Point<Real>,
    pub(crate) direction_world: Vector<Real>,
    pub(crate) rotation: Real,
    pub(crate) delta_rotation: Real,
    pub(crate) world_transform: WheelTransform,
}

impl WheelInfo {
    pub fn new(options: WheelOptions) -> Self {
        Self {
            engine_force: 0.0,
            steering: 0.0,
            brake: 0.0,
            raycast: RaycastResult::default(),
            suspension_length: options.suspension_rest_length,
            suspension_relative_velocity: 0.0,
            clipped_inv_contact_dot_suspension: 1.0,
            suspension_force: 0.0,
            forward_impulse: 0.0,
            side_impulse: 0.0,
            skid_info: 1.0,
            sliding: false,
            chassis_connection_point_world: options.chassis_connection_point_local,
            direction_world: options.direction_local,
            rotation: 0.0,
            delta_rotation: 0.0,
            world_transform: WheelTransform::default(),
            options,
        }
    }

    pub fn options(&self) -> &WheelOptions {
        &self.options
    }

    pub fn radius(&self) -> Real {
        self.options.radius
    }

    pub fn engine_force(&self) -> Real {
        self.engine_force
    }

    pub fn steering(&self) -> Real {
        self.steering
    }

    pub fn brake(&self) -> Real {
        self.brake
    }

    pub fn is_in_contact(&self) -> bool {
        self.raycast.in_contact
    }

    pub fn raycast(&self) -> &RaycastResult {
        &self.raycast
    }

    pub fn suspension_length(&self) -> Real {
        self.suspension_length
    }

    /// Distance the suspension is compressed from its rest length, within
    /// `[0, max_suspension_travel]`; zero while airborne.
    pub fn compression(&self) -> Real {
        if !self.raycast.in_contact {
            return 0.0;
        }
        (self.options.suspension_rest_length - self.suspension_length)
            .clamp(0.0, self.options.max_suspension_travel)
    }

    pub fn suspension_force(&self) -> Real {
        self.suspension_force
    }

    pub fn forward_impulse(&self) -> Real {
        self.forward_impulse
    }

    pub fn side_impulse(&self) -> Real {
        self.side_impulse
    }

    pub fn skid_info(&self) -> Real {
        self.skid_info
    }

    pub fn is_sliding(&self) -> bool {
        self.sliding
    }

    /// Accumulated spin about the axle (rad).
    pub fn rotation(&self) -> Real {
        self.rotation
    }

    pub fn world_transform(&self) -> &WheelTransform {
        &self.world_transform
    }

    pub fn chassis_connection_point_world(&self) -> Point<Real> {
        self.chassis_connection_point_world
    }
}
