// ==============================================================================
// kinematics.rs — WHEEL FRAMES (WORLD SPACE)
// ------------------------------------------------------------------------------
// update_wheel_frame(...):
// - Moves the chassis-local connection point and suspension direction into
//   world space with the chassis isometry.
//
// hub_transform(...):
// - Hub orientation = chassis rotation × steering (about local up, i.e. the
//   negated suspension direction) × spin (about the local axle).
// - Hub position = world connection point + direction × suspension length.
//
// vehicle_axis_world(...):
// - World-space image of the chassis' i-th local unit axis.
// ==============================================================================

use rapier3d::prelude::*;

use super::wheel::{WheelInfo, WheelTransform};

#[inline]
pub fn vehicle_axis_world(chassis_rotation: &Rotation<Real>, axis_index: usize) -> Vector<Real> {
    chassis_rotation * Vector::ith(axis_index, 1.0)
}

pub fn update_wheel_frame(wheel: &mut WheelInfo, chassis_position: &Isometry<Real>) {
    let options = *wheel.options();
    wheel.chassis_connection_point_world = chassis_position * options.chassis_connection_point_local;
    wheel.direction_world = chassis_position.rotation * options.direction_local;
}

/// Steering rotation in chassis space.
#[inline]
pub fn steering_rotation(wheel: &WheelInfo) -> Rotation<Real> {
    let up_local = -wheel.options().direction_local;
    Rotation::new(up_local * wheel.steering)
}

pub fn hub_transform(wheel: &WheelInfo, chassis_rotation: &Rotation<Real>) -> WheelTransform {
    let options = wheel.options();
    let spin = Rotation::new(options.axle_local * wheel.rotation);
    let mut rotation = chassis_rotation * steering_rotation(wheel) * spin;
    rotation.renormalize();

    WheelTransform {
        position: wheel.chassis_connection_point_world + wheel.direction_world * wheel.suspension_length,
        rotation,
    }
}

/// Unit axle direction used for side friction: the chassis right axis turned
/// by the wheel's steering angle.
pub fn steered_axle_world(
    wheel: &WheelInfo,
    chassis_rotation: &Rotation<Real>,
    index_right_axis: usize,
) -> Vector<Real> {
    chassis_rotation * (steering_rotation(wheel) * Vector::ith(index_right_axis, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_WHEEL;
    use crate::raycast_vehicle::wheel::WheelOptions;
    use approx::assert_relative_eq;

    fn wheel_at(connection: [f32; 3]) -> WheelInfo {
        WheelInfo::new(WheelOptions::from_config(&DEFAULT_WHEEL, connection))
    }

    #[test]
    fn hub_hangs_below_the_connection_point() {
        let mut wheel = wheel_at([0.8, 0.0, 1.65]);
        let chassis = Isometry::translation(0.0, 1.0, 0.0);
        update_wheel_frame(&mut wheel, &chassis);
        wheel.suspension_length = 0.3;

        let hub = hub_transform(&wheel, &chassis.rotation);
        assert_relative_eq!(hub.position, point![0.8, 0.7, 1.65], epsilon = 1e-6);
        assert_relative_eq!(hub.rotation.angle(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn steering_turns_the_axle_about_up() {
        let mut wheel = wheel_at([0.8, 0.0, 1.65]);
        wheel.steering = std::f32::consts::FRAC_PI_2;
        let axle = steered_axle_world(&wheel, &Rotation::identity(), 0);
        // +x turned a quarter turn about +y lands on −z
        assert_relative_eq!(axle, vector![0.0, 0.0, -1.0], epsilon = 1e-6);
    }

    #[test]
    fn connection_point_follows_chassis_yaw() {
        let mut wheel = wheel_at([0.8, 0.0, 0.0]);
        let chassis = Isometry::new(vector![0.0, 0.0, 0.0], vector![0.0, std::f32::consts::PI, 0.0]);
        update_wheel_frame(&mut wheel, &chassis);
        assert_relative_eq!(wheel.chassis_connection_point_world, point![-0.8, 0.0, 0.0], epsilon = 1e-5);
        // connection point local is untouched
        assert_eq!(wheel.options().chassis_connection_point_local, point![0.8, 0.0, 0.0]);
    }

    #[test]
    fn forward_axis_is_local_z() {
        let forward = vehicle_axis_world(&Rotation::identity(), 2);
        assert_eq!(forward, vector![0.0, 0.0, 1.0]);
    }
}
