pub mod actors;
pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod materials;
pub mod physics;
pub mod raycast_vehicle;
pub mod resources;
pub mod scene;
pub mod state;

pub use app::App;
pub use error::{Result, SimError};
pub use physics::PhysicsWorld;
pub use raycast_vehicle::RaycastVehicle;
