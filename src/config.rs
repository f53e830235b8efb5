// ==============================================================================
// config.rs — SIMULATION CONFIGURATION
// ------------------------------------------------------------------------------
// Typed configuration for the world, the vehicle, the camera rig and the asset
// manifest. Every field has a default equal to the tuned values the vehicle
// was built with, so an empty JSON object is a complete configuration.
//
// Stiffness and damping coefficients are per kilogram of chassis mass: the
// suspension multiplies them by the chassis mass before applying the force.
// ==============================================================================

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub world: WorldConfig,
    pub vehicle: VehicleConfig,
    pub camera: CameraConfig,
    pub assets: AssetManifest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: [f32; 3],   // m/s²
    pub max_dt: f32,         // upper bound of a single step (s)
    pub floor_height: f32,   // y of the ground surface
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            max_dt: 1.0 / 20.0,
            floor_height: 0.0,
        }
    }
}

/// Per-wheel suspension and tire parameters shared by all four wheels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    pub radius: f32,
    pub direction_local: [f32; 3],
    pub axle_local: [f32; 3],
    pub suspension_stiffness: f32,   // per kg of chassis
    pub suspension_rest_length: f32,
    pub friction_slip: f32,
    pub damping_relaxation: f32,     // per kg of chassis
    pub damping_compression: f32,    // per kg of chassis
    pub max_suspension_force: f32,   // N
    pub roll_influence: f32,
    pub max_suspension_travel: f32,
    pub custom_sliding_rotational_speed: f32,
    pub use_custom_sliding_rotational_speed: bool,
}

pub const DEFAULT_WHEEL: WheelConfig = WheelConfig {
    radius: 0.25,
    direction_local: [0.0, -1.0, 0.0],
    axle_local: [-1.0, 0.0, 0.0],
    suspension_stiffness: 45.0,
    suspension_rest_length: 0.4,
    friction_slip: 5.0,
    damping_relaxation: 2.3,
    damping_compression: 4.5,
    max_suspension_force: 200_000.0,
    roll_influence: 0.01,
    max_suspension_travel: 0.25,
    custom_sliding_rotational_speed: -30.0,
    use_custom_sliding_rotational_speed: true,
};

impl Default for WheelConfig {
    fn default() -> Self {
        DEFAULT_WHEEL
    }
}

/// Which wheels receive engine force and which receive steering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivetrainConfig {
    pub driven_wheels: Vec<usize>,
    pub steered_wheels: Vec<usize>,
}

impl Default for DrivetrainConfig {
    fn default() -> Self {
        // Wheels 2 and 3 both drive and steer; 0 and 1 are passive.
        Self {
            driven_wheels: vec![2, 3],
            steered_wheels: vec![2, 3],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlLimits {
    pub engine_force: f32,   // N, magnitude applied per driven wheel
    pub max_steer: f32,      // rad
}

impl Default for ControlLimits {
    fn default() -> Self {
        Self {
            engine_force: 800.0,
            max_steer: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub friction: f32,
    pub restitution: f32,
    pub contact_stiffness: f32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            friction: 0.3,
            restitution: 0.0,
            contact_stiffness: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    // --- Chassis ---
    pub mass: f32,                      // kg
    pub chassis_half_extents: [f32; 3], // [hx, hy, hz] meters
    pub spawn_position: [f32; 3],
    pub linear_damping: f32,
    pub angular_damping: f32,

    // --- Wheels ---
    pub wheel: WheelConfig,
    pub axle_half_width: f32,           // ± local x of every connection point
    pub axle_z_offsets: [f32; 2],       // local z of the first and second axle pair
    pub connection_height: f32,         // local y of every connection point
    pub wheel_body_mass: f32,

    pub drivetrain: DrivetrainConfig,
    pub limits: ControlLimits,

    // --- Surfaces ---
    pub wheel_ground_contact: ContactConfig,
    pub chassis_ground_contact: ContactConfig,

    // --- Visuals ---
    pub chassis_model_offset: [f32; 3],
    pub shadow_size: f32,
    pub shadow_height: f32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            mass: 200.0,
            chassis_half_extents: [1.0, 0.3, 2.7],
            spawn_position: [0.0, 0.5, 0.0],
            linear_damping: 0.01,
            angular_damping: 0.01,

            wheel: DEFAULT_WHEEL,
            axle_half_width: 0.8,
            axle_z_offsets: [-2.15, 1.65],
            connection_height: 0.0,
            wheel_body_mass: 1.0,

            drivetrain: DrivetrainConfig::default(),
            limits: ControlLimits::default(),

            wheel_ground_contact: ContactConfig::default(),
            chassis_ground_contact: ContactConfig::default(),

            chassis_model_offset: [0.0, 0.0, 0.7],
            shadow_size: 11.57 * 2.0,
            shadow_height: 0.05,
        }
    }
}

impl VehicleConfig {
    /// Chassis-local connection points in wheel insertion order: (+x, first
    /// axle), (−x, first axle), (+x, second axle), (−x, second axle).
    pub fn connection_points(&self) -> [[f32; 3]; 4] {
        let w = self.axle_half_width;
        let y = self.connection_height;
        let [z0, z1] = self.axle_z_offsets;
        [[w, y, z0], [-w, y, z0], [w, y, z1], [-w, y, z1]]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub free_position: [f32; 3],
    pub trailing_offset: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 30.0,
            z_near: 0.1,
            z_far: 10_000.0,
            free_position: [12.0, 12.0, 12.0],
            trailing_offset: [0.0, 10.0, -20.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Model,
    Texture,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetEntry {
    pub name: String,
    pub path: String,
    pub kind: AssetKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetManifest {
    pub base_dir: String,
    pub entries: Vec<AssetEntry>,
}

impl Default for AssetManifest {
    fn default() -> Self {
        let entry = |name: &str, path: &str, kind| AssetEntry {
            name: name.to_string(),
            path: path.to_string(),
            kind,
        };
        Self {
            base_dir: "assets".to_string(),
            entries: vec![
                entry("chassis", "models/chassis.glb", AssetKind::Model),
                entry("wheel", "models/wheel.glb", AssetKind::Model),
                entry("shadow", "textures/shadow.jpg", AssetKind::Texture),
            ],
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.world.max_dt > 0.0) {
            return Err(SimError::invalid_config("world.max_dt must be positive"));
        }

        let v = &self.vehicle;
        if !(v.mass > 0.0) {
            return Err(SimError::invalid_config("vehicle.mass must be positive"));
        }
        if v.chassis_half_extents.iter().any(|e| !(*e > 0.0)) {
            return Err(SimError::invalid_config(
                "vehicle.chassis_half_extents must be positive",
            ));
        }
        if !(v.wheel.radius > 0.0) || !(v.wheel.suspension_rest_length > 0.0) {
            return Err(SimError::invalid_config(
                "wheel radius and suspension rest length must be positive",
            ));
        }
        if v.wheel.max_suspension_travel < 0.0 {
            return Err(SimError::invalid_config(
                "wheel.max_suspension_travel must not be negative",
            ));
        }

        let wheel_count = v.connection_points().len();
        let indices = v
            .drivetrain
            .driven_wheels
            .iter()
            .chain(v.drivetrain.steered_wheels.iter());
        for &i in indices {
            if i >= wheel_count {
                return Err(SimError::invalid_config(format!(
                    "drivetrain references wheel {i} but the vehicle has {wheel_count} wheels"
                )));
            }
        }

        if v.limits.engine_force < 0.0 || v.limits.max_steer < 0.0 {
            return Err(SimError::invalid_config(
                "control limits are magnitudes and must not be negative",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = SimConfig::from_json_str("{}").unwrap();
        assert_eq!(config.vehicle.mass, 200.0);
        assert_eq!(config.vehicle.wheel, DEFAULT_WHEEL);
        assert_eq!(config.vehicle.drivetrain.driven_wheels, vec![2, 3]);
        assert_eq!(config.world.max_dt, 1.0 / 20.0);
        assert_eq!(config.assets.entries.len(), 3);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config =
            SimConfig::from_json_str(r#"{ "vehicle": { "wheel": { "radius": 0.3 } } }"#).unwrap();
        assert_eq!(config.vehicle.wheel.radius, 0.3);
        assert_eq!(config.vehicle.wheel.suspension_stiffness, 45.0);
        assert_eq!(config.vehicle.limits.engine_force, 800.0);
    }

    #[test]
    fn connection_points_form_a_rectangle() {
        let points = VehicleConfig::default().connection_points();
        assert_eq!(points[0], [0.8, 0.0, -2.15]);
        assert_eq!(points[1], [-0.8, 0.0, -2.15]);
        assert_eq!(points[2], [0.8, 0.0, 1.65]);
        assert_eq!(points[3], [-0.8, 0.0, 1.65]);
    }

    #[test]
    fn drivetrain_out_of_range_is_rejected() {
        let err = SimConfig::from_json_str(
            r#"{ "vehicle": { "drivetrain": { "driven_wheels": [4] } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }

    #[test]
    fn non_positive_step_bound_is_rejected() {
        let err = SimConfig::from_json_str(r#"{ "world": { "max_dt": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = SimConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, SimError::ConfigParse(_)));
    }
}
