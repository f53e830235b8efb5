use serde::Serialize;

use crate::config::DrivetrainConfig;
use crate::raycast_vehicle::RaycastVehicle;

/// Control vector consumed by the vehicle once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ControlState {
    pub steer: f32,
    pub engine_force: f32,
    pub brake: f32,
}

impl ControlState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_neutral(&self) -> bool {
        self.steer == 0.0 && self.engine_force == 0.0 && self.brake == 0.0
    }
}

/// Which wheels the control vector reaches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drivetrain {
    pub driven_wheels: Vec<usize>,
    pub steered_wheels: Vec<usize>,
}

impl From<&DrivetrainConfig> for Drivetrain {
    fn from(config: &DrivetrainConfig) -> Self {
        Self {
            driven_wheels: config.driven_wheels.clone(),
            steered_wheels: config.steered_wheels.clone(),
        }
    }
}

impl Drivetrain {
    /// Engine force goes to the driven wheels, steering to the steered
    /// wheels, brake to every wheel.
    pub fn apply(&self, state: &ControlState, vehicle: &mut RaycastVehicle) {
        for wheel in 0..vehicle.num_wheels() {
            vehicle.set_brake(state.brake, wheel);
        }
        for &wheel in &self.driven_wheels {
            vehicle.apply_engine_force(state.engine_force, wheel);
        }
        for &wheel in &self.steered_wheels {
            vehicle.set_steering_value(state.steer, wheel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_WHEEL;
    use crate::raycast_vehicle::{VehicleAxes, WheelOptions};
    use rapier3d::prelude::RigidBodyHandle;

    #[test]
    fn only_the_configured_axle_drives_and_steers() {
        let mut vehicle = RaycastVehicle::new(RigidBodyHandle::invalid(), VehicleAxes::default());
        for _ in 0..4 {
            vehicle.add_wheel(WheelOptions::from_config(&DEFAULT_WHEEL, [0.0; 3]));
        }

        let drivetrain = Drivetrain::from(&DrivetrainConfig::default());
        let state = ControlState {
            steer: 0.3,
            engine_force: -800.0,
            brake: 0.0,
        };
        drivetrain.apply(&state, &mut vehicle);

        for passive in [0, 1] {
            assert_eq!(vehicle.wheels()[passive].engine_force(), 0.0);
            assert_eq!(vehicle.wheels()[passive].steering(), 0.0);
        }
        // The second axle pair both drives and steers.
        for active in [2, 3] {
            assert_eq!(vehicle.wheels()[active].engine_force(), -800.0);
            assert_eq!(vehicle.wheels()[active].steering(), 0.3);
        }
    }
}
