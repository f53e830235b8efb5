//! Error types for simulation setup.
//!
//! The per-frame paths (stepping, ticking, input handling) never fail; every
//! variant here describes a configuration or setup defect.

use thiserror::Error;

use crate::materials::MaterialId;

/// Errors raised while configuring or assembling the simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// Two surface materials can touch but no contact material pairs them.
    #[error("no contact material registered for surfaces {a} and {b}")]
    MissingContactMaterial {
        /// Name of the first surface.
        a: String,
        /// Name of the second surface.
        b: String,
    },

    /// A surface pair was registered twice.
    #[error("contact material for surfaces {a} and {b} is already registered")]
    DuplicateContactMaterial {
        /// Name of the first surface.
        a: String,
        /// Name of the second surface.
        b: String,
    },

    /// A contact material refers to a material id the world never created.
    #[error("unknown surface material id {0:?}")]
    UnknownMaterial(MaterialId),

    /// Configuration values outside their domain.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration JSON could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Filesystem access failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A vehicle handle that the physics world does not know about.
    #[error("vehicle {0} is not registered with the physics world")]
    UnknownVehicle(usize),

    /// A rigid body handle that the physics world does not know about.
    #[error("rigid body {0} is not part of the physics world")]
    UnknownBody(String),

    /// A wheel index outside the vehicle's wheel list.
    #[error("vehicle {vehicle} has no wheel {wheel}")]
    UnknownWheel {
        /// Vehicle index.
        vehicle: usize,
        /// Requested wheel index.
        wheel: usize,
    },

    /// A textual input event could not be parsed.
    #[error("malformed input event: {0}")]
    InputParse(String),
}

impl SimError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Result alias for setup operations.
pub type Result<T> = std::result::Result<T, SimError>;
