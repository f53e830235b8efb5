// ==============================================================================
// suspension.rs — RAYCAST SUSPENSION
// ------------------------------------------------------------------------------
// Each wheel casts one ray from its world-space connection point along the
// suspension direction, up to rest length + radius. On a hit:
// - suspension length = hit distance − radius, clamped to
//   [rest − max travel, rest + max travel]
// - suspension relative velocity = chassis point velocity projected on the
//   contact normal, scaled by 1 / (−normal · direction)
// On a miss the wheel is airborne and rests at its rest length.
//
// Forces (per wheel, before the max suspension force clamp):
//   spring = stiffness × compression × 1/(−n·d)
//   damper = (v_c ≥ 0 ? damping_compression : damping_relaxation) × v_c
//   force  = max(0, (spring + damper) × chassis mass)
// where v_c is the compression velocity (positive while compressing).
//
// Notes:
// - This file only measures. Impulses are applied by RaycastVehicle.
// ==============================================================================

use rapier3d::prelude::*;

use super::wheel::WheelInfo;

/// Spring force per kilogram of chassis for a compression in
/// `[0, max_suspension_travel]`.
#[inline]
pub fn spring_force(stiffness: Real, compression: Real) -> Real {
    stiffness * compression
}

/// Damper force per kilogram of chassis; `compression_velocity` is positive
/// while the suspension is being compressed.
#[inline]
pub fn damper_force(
    compression_velocity: Real,
    damping_compression: Real,
    damping_relaxation: Real,
) -> Real {
    let damping = if compression_velocity >= 0.0 {
        damping_compression
    } else {
        damping_relaxation
    };
    damping * compression_velocity
}

/// Resulting suspension force for a wheel, zero when airborne.
pub fn suspension_force(wheel: &WheelInfo, chassis_mass: Real) -> Real {
    if !wheel.raycast.in_contact {
        return 0.0;
    }

    let options = wheel.options();
    let spring = spring_force(options.suspension_stiffness, wheel.compression())
        * wheel.clipped_inv_contact_dot_suspension;
    let damper = damper_force(
        -wheel.suspension_relative_velocity,
        options.damping_compression,
        options.damping_relaxation,
    );

    ((spring + damper) * chassis_mass).max(0.0)
}

/// Casts the wheel's suspension ray and records contact, suspension length
/// and relative velocity. Expects the world-space connection point and
/// direction to be current.
pub fn cast_ray(
    wheel: &mut WheelInfo,
    chassis: &RigidBody,
    query: &QueryPipeline,
    bodies: &RigidBodySet,
    colliders: &ColliderSet,
    filter: QueryFilter,
) {
    let options = *wheel.options();
    let ray_length = options.suspension_rest_length + options.radius;
    let source = wheel.chassis_connection_point_world;
    let direction = wheel.direction_world;
    let ray = Ray::new(source, direction);

    wheel.raycast = Default::default();

    let hit = query.cast_ray(bodies, colliders, &ray, ray_length, true, filter);

    let Some((ground, distance)) = hit else {
        // Airborne: put the wheel back at rest
        wheel.suspension_length = options.suspension_rest_length;
        wheel.suspension_relative_velocity = 0.0;
        wheel.raycast.hit_normal_world = -direction;
        wheel.clipped_inv_contact_dot_suspension = 1.0;
        return;
    };

    // The ground is flat: its normal is world up.
    let normal = Vector::y();
    let hit_point = ray.point_at(distance);

    wheel.raycast = super::wheel::RaycastResult {
        in_contact: true,
        hit_point_world: hit_point,
        hit_normal_world: normal,
        hit_distance: distance,
        ground: Some(ground),
    };

    let min_length = options.suspension_rest_length - options.max_suspension_travel;
    let max_length = options.suspension_rest_length + options.max_suspension_travel;
    wheel.suspension_length = (distance - options.radius).clamp(min_length, max_length);

    let denominator = normal.dot(&direction);
    let chassis_velocity = chassis.velocity_at_point(&hit_point);
    let projected_velocity = normal.dot(&chassis_velocity);

    if denominator >= -0.1 {
        wheel.suspension_relative_velocity = 0.0;
        wheel.clipped_inv_contact_dot_suspension = 1.0 / 0.1;
    } else {
        let inv = -1.0 / denominator;
        wheel.suspension_relative_velocity = projected_velocity * inv;
        wheel.clipped_inv_contact_dot_suspension = inv;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_WHEEL;
    use crate::raycast_vehicle::wheel::{RaycastResult, WheelOptions};

    fn grounded_wheel(suspension_length: Real, relative_velocity: Real) -> WheelInfo {
        let mut wheel = WheelInfo::new(WheelOptions::from_config(&DEFAULT_WHEEL, [0.0; 3]));
        wheel.raycast = RaycastResult {
            in_contact: true,
            ..Default::default()
        };
        wheel.suspension_length = suspension_length;
        wheel.suspension_relative_velocity = relative_velocity;
        wheel.clipped_inv_contact_dot_suspension = 1.0;
        wheel
    }

    #[test]
    fn spring_force_never_decreases_with_compression() {
        let travel = DEFAULT_WHEEL.max_suspension_travel;
        let mut previous = spring_force(DEFAULT_WHEEL.suspension_stiffness, 0.0);
        for i in 1..=100 {
            let c = travel * i as Real / 100.0;
            let f = spring_force(DEFAULT_WHEEL.suspension_stiffness, c);
            assert!(f >= previous, "force dropped at compression {c}");
            previous = f;
        }
    }

    #[test]
    fn resting_wheel_force_scales_with_chassis_mass() {
        // 0.1 compression, no motion: 45 × 0.1 × 200
        let wheel = grounded_wheel(0.3, 0.0);
        approx::assert_relative_eq!(suspension_force(&wheel, 200.0), 900.0, epsilon = 1e-3);
    }

    #[test]
    fn damper_uses_compression_coefficient_while_compressing() {
        assert_eq!(damper_force(2.0, 4.5, 2.3), 9.0);
        assert_eq!(damper_force(-2.0, 4.5, 2.3), -4.6);
    }

    #[test]
    fn airborne_wheel_has_no_suspension_force() {
        let mut wheel = grounded_wheel(0.15, -1.0);
        wheel.raycast.in_contact = false;
        assert_eq!(suspension_force(&wheel, 200.0), 0.0);
    }

    #[test]
    fn fast_extension_cannot_pull_the_chassis_down() {
        // Moving away from the ground quickly: damper outweighs spring.
        let wheel = grounded_wheel(0.39, 5.0);
        assert_eq!(suspension_force(&wheel, 200.0), 0.0);
    }

    #[test]
    fn compression_is_clamped_to_travel() {
        let wheel = grounded_wheel(0.0, 0.0);
        assert_eq!(wheel.compression(), DEFAULT_WHEEL.max_suspension_travel);
        let extended = grounded_wheel(0.6, 0.0);
        assert_eq!(extended.compression(), 0.0);
    }
}
