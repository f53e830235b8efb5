use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::Result;
use crate::input::{ControlState, Joystick};
use crate::physics::{PhysicsWorld, VehicleHandle};

#[derive(Debug, Clone, Serialize)]
pub struct WheelSnapshot {
    pub in_contact: bool,
    pub compression: f32,
    pub suspension_force: f32,
    pub steering: f32,
    pub engine_force: f32,
    pub rotation: f32,
    pub sliding: bool,
    pub position: [f32; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleSnapshot {
    pub position: [f32; 3],
    pub rotation: [f32; 4], // quaternion (x, y, z, w)
    pub linvel: [f32; 3],
    pub speed_kmh: f32,
    pub wheels: Vec<WheelSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub frame: u64,
    pub time: f32,
    pub controls: ControlState,
    pub joystick: Joystick,
    pub vehicle: Option<VehicleSnapshot>,
}

impl VehicleSnapshot {
    pub fn capture(world: &PhysicsWorld, handle: VehicleHandle) -> Option<Self> {
        let vehicle = world.vehicle(handle)?;
        let body = world.body(vehicle.chassis())?;

        let pos = body.translation();
        let rot = body.rotation();
        let vel = body.linvel();

        let wheels = vehicle
            .wheels()
            .iter()
            .map(|w| {
                let p = w.world_transform().position;
                WheelSnapshot {
                    in_contact: w.is_in_contact(),
                    compression: w.compression(),
                    suspension_force: w.suspension_force(),
                    steering: w.steering(),
                    engine_force: w.engine_force(),
                    rotation: w.rotation(),
                    sliding: w.is_sliding(),
                    position: [p.x, p.y, p.z],
                }
            })
            .collect();

        Some(Self {
            position: [pos.x, pos.y, pos.z],
            rotation: [rot.i, rot.j, rot.k, rot.w],
            linvel: [vel.x, vel.y, vel.z],
            speed_kmh: vehicle.current_speed_kmh(),
            wheels,
        })
    }
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Fans serialized snapshots out to every subscriber.
#[derive(Debug, Default)]
pub struct SnapshotHub {
    clients: Vec<UnboundedSender<String>>,
}

impl SnapshotHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.clients.push(tx);
        rx
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Serializes once and sends to every live subscriber, dropping the
    /// ones whose receiver is gone.
    pub fn broadcast(&mut self, snapshot: &Snapshot) -> Result<()> {
        let json = snapshot.to_json()?;
        self.clients.retain(|tx| tx.send(json.clone()).is_ok());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn empty_snapshot() -> Snapshot {
        Snapshot {
            frame: 7,
            time: 0.25,
            controls: ControlState::default(),
            joystick: Joystick::new(Vec2::new(800.0, 600.0)),
            vehicle: None,
        }
    }

    #[test]
    fn snapshot_serializes_controls_and_frame() {
        let json = empty_snapshot().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["frame"], 7);
        assert_eq!(value["controls"]["engine_force"], 0.0);
        assert!(value["vehicle"].is_null());
    }

    #[test]
    fn closed_subscribers_are_dropped() {
        let mut hub = SnapshotHub::new();
        let mut alive = hub.subscribe();
        drop(hub.subscribe());

        hub.broadcast(&empty_snapshot()).unwrap();
        assert_eq!(hub.len(), 1);
        assert!(alive.try_recv().unwrap().contains("\"frame\":7"));
    }
}
