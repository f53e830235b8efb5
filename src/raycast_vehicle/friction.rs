// ==============================================================================
// friction.rs — WHEEL/GROUND FRICTION (IMPULSE BASED)
// ------------------------------------------------------------------------------
// Per grounded wheel:
// 1) Axle = chassis right axis turned by the steering angle, projected onto
//    the contact plane. Forward = contact normal × axle.
// 2) Side impulse cancels a fraction (0.2) of the lateral point velocity.
// 3) Forward impulse = engine force × dt when the engine pushes, otherwise a
//    rolling friction impulse bounded by the brake.
// 4) Combined-slip check: if (0.5·forward)² + side² exceeds
//    (suspension force × dt × friction slip)², both impulses of the sliding
//    wheels are scaled down by the skid factor.
// 5) Forward impulses are applied at the contact point; side impulses at the
//    contact point pulled toward the chassis' up level by roll influence.
//
// Impulses scale with chassis mass only; the ground is static.
// ==============================================================================

use rapier3d::prelude::*;

use super::kinematics::{steered_axle_world, vehicle_axis_world};
use super::wheel::WheelInfo;

const SIDE_CONTACT_DAMPING: Real = 0.2;
const SIDE_FRICTION_STIFFNESS: Real = 1.0;
const SIDE_FACTOR: Real = 1.0;
const FORWARD_FACTOR: Real = 0.5;

/// Impulse along `normal` that removes part of the chassis' point velocity
/// relative to static ground.
pub fn resolve_single_bilateral(point_velocity: &Vector<Real>, normal: &Vector<Real>, mass: Real) -> Real {
    let rel_vel = normal.dot(point_velocity);
    -SIDE_CONTACT_DAMPING * rel_vel * mass
}

/// Impulse along `direction` that would stop the chassis' point velocity,
/// bounded by `max_impulse`.
pub fn rolling_friction(
    point_velocity: &Vector<Real>,
    direction: &Vector<Real>,
    mass: Real,
    max_impulse: Real,
) -> Real {
    let vrel = direction.dot(point_velocity);
    let j = -vrel * mass;
    j.clamp(-max_impulse, max_impulse)
}

#[derive(Debug, Default, Clone, Copy)]
struct WheelFrictionFrame {
    axle: Vector<Real>,
    forward: Vector<Real>,
}

/// Computes and applies friction impulses for every grounded wheel.
/// Returns whether any wheel exceeded its grip.
pub fn update_friction(
    wheels: &mut [WheelInfo],
    chassis: &mut RigidBody,
    dt: Real,
    index_right_axis: usize,
    index_up_axis: usize,
) -> bool {
    let chassis_rotation = *chassis.rotation();
    let mass = chassis.mass();
    let mut frames = vec![WheelFrictionFrame::default(); wheels.len()];

    for (wheel, frame) in wheels.iter_mut().zip(frames.iter_mut()) {
        wheel.side_impulse = 0.0;
        wheel.forward_impulse = 0.0;

        if !wheel.raycast.in_contact {
            continue;
        }

        let normal = wheel.raycast.hit_normal_world;
        let axle = steered_axle_world(wheel, &chassis_rotation, index_right_axis);
        let axle = (axle - normal * axle.dot(&normal))
            .try_normalize(1.0e-5)
            .unwrap_or_else(Vector::zeros);
        let forward = normal
            .cross(&axle)
            .try_normalize(1.0e-5)
            .unwrap_or_else(Vector::zeros);

        frame.axle = axle;
        frame.forward = forward;

        let point_velocity = chassis.velocity_at_point(&wheel.raycast.hit_point_world);
        wheel.side_impulse =
            resolve_single_bilateral(&point_velocity, &axle, mass) * SIDE_FRICTION_STIFFNESS;
    }

    let mut sliding = false;

    for (wheel, frame) in wheels.iter_mut().zip(frames.iter()) {
        wheel.skid_info = 1.0;
        wheel.sliding = false;

        if !wheel.raycast.in_contact {
            continue;
        }

        let rolling = if wheel.engine_force != 0.0 {
            wheel.engine_force * dt
        } else {
            let point_velocity = chassis.velocity_at_point(&wheel.raycast.hit_point_world);
            rolling_friction(&point_velocity, &frame.forward, mass, wheel.brake)
        };
        wheel.forward_impulse = rolling;

        let max_impulse = wheel.suspension_force * dt * wheel.options().friction_slip;
        let x = wheel.forward_impulse * FORWARD_FACTOR;
        let y = wheel.side_impulse * SIDE_FACTOR;
        let impulse_squared = x * x + y * y;

        if impulse_squared > max_impulse * max_impulse {
            sliding = true;
            wheel.sliding = true;
            wheel.skid_info *= max_impulse / impulse_squared.sqrt();
        }
    }

    if sliding {
        for wheel in wheels.iter_mut() {
            if wheel.side_impulse != 0.0 && wheel.skid_info < 1.0 {
                wheel.forward_impulse *= wheel.skid_info;
                wheel.side_impulse *= wheel.skid_info;
            }
        }
    }

    // apply the impulses
    let chassis_position = *chassis.translation();
    let chassis_up = vehicle_axis_world(&chassis_rotation, index_up_axis);

    for (wheel, frame) in wheels.iter().zip(frames.iter()) {
        if !wheel.raycast.in_contact {
            continue;
        }
        let hit_point = wheel.raycast.hit_point_world;

        if wheel.forward_impulse != 0.0 {
            chassis.apply_impulse_at_point(frame.forward * wheel.forward_impulse, hit_point, true);
        }

        if wheel.side_impulse != 0.0 {
            // Scale the chassis-up component of the lever arm by roll influence.
            let rel_pos = hit_point.coords - chassis_position;
            let up_part = chassis_up * rel_pos.dot(&chassis_up);
            let lever = rel_pos - up_part * (1.0 - wheel.options().roll_influence);
            let point = Point::from(chassis_position + lever);

            chassis.apply_impulse_at_point(frame.axle * wheel.side_impulse, point, true);
        }
    }

    sliding
}
