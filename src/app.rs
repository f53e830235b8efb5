// ==============================================================================
// app.rs — FRAME LOOP
// ------------------------------------------------------------------------------
// One call to App::frame is one rendered frame:
// (a) clamp the frame delta
// (b) build the vehicle once resources are ready
// (c) drain queued input, hand viewport changes to the camera, write the
//     control state onto the vehicle
// (d) camera follows the vehicle node (pose from the previous tick)
// (e) step the physics world once
// (f) tick every actor
//
// The floor exists from startup; the vehicle only after the readiness
// signal fires. Nothing in a frame returns an error.
// ==============================================================================

use glam::Vec2;
use tracing::{error, info, warn};

use crate::actors::{Floor, Tickable, VehicleActor};
use crate::camera::CameraRig;
use crate::config::SimConfig;
use crate::error::Result;
use crate::input::{InputController, InputEvent};
use crate::materials::MaterialId;
use crate::physics::{PhysicsWorld, VehicleHandle, clamp_dt};
use crate::resources::{ReadySignal, Resources};
use crate::scene::{NodeId, SceneGraph};
use crate::state::{Snapshot, VehicleSnapshot};

use tokio::sync::mpsc::UnboundedSender;

/// Handles of the spawned vehicle that the loop itself needs.
#[derive(Debug, Clone, Copy)]
pub struct SpawnedVehicle {
    pub handle: VehicleHandle,
    pub node: NodeId,
}

pub struct App {
    config: SimConfig,
    world: PhysicsWorld,
    scene: SceneGraph,
    camera: CameraRig,
    input: InputController,
    ground: MaterialId,
    actors: Vec<Box<dyn Tickable>>,
    vehicle: Option<SpawnedVehicle>,
    resources: ReadySignal,
    frame: u64,
}

impl App {
    pub fn new(config: SimConfig, resources: ReadySignal, width: u32, height: u32) -> Result<Self> {
        config.validate()?;

        let mut world = PhysicsWorld::new(&config.world);
        let mut scene = SceneGraph::new();
        let ground = world.create_material("ground");
        let floor = Floor::new(&mut world, &mut scene, ground, config.world.floor_height)?;

        let camera = CameraRig::new(&config.camera, width, height);
        let input = InputController::new(&config.vehicle, Vec2::new(width as f32, height as f32));

        info!(width, height, "app started, waiting for resources");

        Ok(Self {
            config,
            world,
            scene,
            camera,
            input,
            ground,
            actors: vec![Box::new(floor)],
            vehicle: None,
            resources,
            frame: 0,
        })
    }

    /// App whose resources are already resolved.
    pub fn with_resources(config: SimConfig, resources: Resources, width: u32, height: u32) -> Result<Self> {
        Self::new(config, ReadySignal::ready(resources), width, height)
    }

    /// Runs one frame and returns the step length simulated.
    pub fn frame(&mut self, dt: f32) -> f32 {
        // (a)
        let max_dt = self.world.max_dt();
        if dt > max_dt {
            warn!(frame = self.frame, dt, max_dt, "frame delta clamped");
        }
        let dt = clamp_dt(dt, max_dt);

        // (b)
        if let Some(resources) = self.resources.try_take() {
            if let Err(e) = self.spawn_vehicle(&resources) {
                error!(error = %e, "vehicle setup failed");
            }
        }

        // (c)
        self.input.drain();
        self.apply_resize();
        if let Some(spawned) = self.vehicle {
            if let Some(vehicle) = self.world.vehicle_mut(spawned.handle) {
                self.input.apply(vehicle);
            }
        }

        // (d)
        let target = self
            .vehicle
            .and_then(|v| self.scene.world_transform(v.node))
            .map(|(position, _)| position);
        self.camera.update(target);

        // (e)
        let stepped = self.world.step(dt);

        // (f)
        for actor in self.actors.iter_mut() {
            actor.tick(stepped, &mut self.world, &mut self.scene);
        }

        self.frame += 1;
        stepped
    }

    fn spawn_vehicle(&mut self, resources: &Resources) -> Result<()> {
        let actor = VehicleActor::new(
            &mut self.world,
            &mut self.scene,
            resources,
            &self.config.vehicle,
            self.ground,
        )?;
        self.world.validate_contact_materials()?;

        self.vehicle = Some(SpawnedVehicle {
            handle: actor.vehicle(),
            node: actor.get_vehicle(),
        });
        self.actors.push(Box::new(actor));
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.input.handle_event(&InputEvent::Resized {
            width: width as f32,
            height: height as f32,
        });
        self.apply_resize();
    }

    fn apply_resize(&mut self) {
        if let Some(viewport) = self.input.take_resize() {
            self.camera.set_aspect(viewport.x as u32, viewport.y as u32);
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            frame: self.frame,
            time: self.world.elapsed(),
            controls: *self.input.state(),
            joystick: *self.input.joystick(),
            vehicle: self
                .vehicle
                .and_then(|v| VehicleSnapshot::capture(&self.world, v.handle)),
        }
    }

    pub fn input_sender(&self) -> UnboundedSender<InputEvent> {
        self.input.sender()
    }

    pub fn input(&self) -> &InputController {
        &self.input
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn vehicle(&self) -> Option<SpawnedVehicle> {
        self.vehicle
    }

    pub fn actors(&self) -> impl Iterator<Item = &str> {
        self.actors.iter().map(|a| a.name())
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }
}
