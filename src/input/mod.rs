//! Platform-agnostic vehicle input.
//!
//! An input source (keyboard, touch surface, stdin driver) sends
//! [`InputEvent`]s through the controller's channel. The frame loop drains
//! the channel once per frame, which is the only point where the control
//! state changes; the physics step then reads a settled [`ControlState`].
pub mod control;
pub mod keyboard;
pub mod touch;

use std::str::FromStr;

use glam::Vec2;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::config::VehicleConfig;
use crate::error::SimError;
use crate::raycast_vehicle::RaycastVehicle;

pub use control::{ControlState, Drivetrain};
pub use keyboard::{Direction, KeyboardController};
pub use touch::{Joystick, TouchController};

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Touch events (screen space)
    TouchStart { x: f32, y: f32 },
    TouchMove { x: f32, y: f32 },
    TouchEnd,

    // Window events
    FocusLost,
    Resized { width: f32, height: f32 },
}

impl FromStr for InputEvent {
    type Err = SimError;

    /// Parses the line protocol: `keydown <key>`, `keyup <key>`,
    /// `touchstart <x> <y>`, `touchmove <x> <y>`, `touchend`, `blur`,
    /// `resize <w> <h>`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(kind) = parts.next() else {
            return Err(SimError::InputParse("empty line".to_string()));
        };
        let args: Vec<&str> = parts.collect();

        let key = |args: &[&str]| match args {
            [name] => Ok(name.to_string()),
            _ => Err(SimError::InputParse(format!("`{kind}` expects one key"))),
        };
        let pair = |args: &[&str]| -> Result<(f32, f32), SimError> {
            let [a, b] = args else {
                return Err(SimError::InputParse(format!("`{kind}` expects two numbers")));
            };
            let parse = |s: &str| {
                s.parse::<f32>()
                    .map_err(|e| SimError::InputParse(format!("`{s}`: {e}")))
            };
            Ok((parse(*a)?, parse(*b)?))
        };

        match kind {
            "keydown" => Ok(Self::KeyDown(key(args.as_slice())?)),
            "keyup" => Ok(Self::KeyUp(key(args.as_slice())?)),
            "touchstart" => pair(args.as_slice()).map(|(x, y)| Self::TouchStart { x, y }),
            "touchmove" => pair(args.as_slice()).map(|(x, y)| Self::TouchMove { x, y }),
            "touchend" => Ok(Self::TouchEnd),
            "blur" => Ok(Self::FocusLost),
            "resize" => pair(args.as_slice()).map(|(width, height)| Self::Resized { width, height }),
            other => Err(SimError::InputParse(format!("unknown event `{other}`"))),
        }
    }
}

/// Owns the control state and both input variants.
pub struct InputController {
    sender: UnboundedSender<InputEvent>,
    receiver: UnboundedReceiver<InputEvent>,
    state: ControlState,
    keyboard: KeyboardController,
    touch: TouchController,
    drivetrain: Drivetrain,
    resized: Option<Vec2>,
}

impl InputController {
    pub fn new(config: &VehicleConfig, viewport: Vec2) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver,
            state: ControlState::default(),
            keyboard: KeyboardController::new(config.limits),
            touch: TouchController::new(config.limits, viewport),
            drivetrain: Drivetrain::from(&config.drivetrain),
            resized: None,
        }
    }

    /// Handle for event producers.
    pub fn sender(&self) -> UnboundedSender<InputEvent> {
        self.sender.clone()
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn joystick(&self) -> &Joystick {
        self.touch.joystick()
    }

    pub fn drivetrain(&self) -> &Drivetrain {
        &self.drivetrain
    }

    pub fn handle_event(&mut self, event: &InputEvent) {
        debug!(?event, "input event");
        match event {
            InputEvent::KeyDown(key) => self.keyboard.key_down(key, &mut self.state),
            InputEvent::KeyUp(key) => self.keyboard.key_up(key, &mut self.state),
            InputEvent::TouchStart { x, y } => self.touch.touch_start(Vec2::new(*x, *y)),
            InputEvent::TouchMove { x, y } => {
                self.touch.touch_move(Vec2::new(*x, *y), &mut self.state)
            }
            InputEvent::TouchEnd => self.touch.touch_end(&mut self.state),
            InputEvent::FocusLost => {
                // Key-ups never arrive once focus is gone.
                self.touch.touch_end(&mut self.state);
                self.state.reset();
                debug!("focus lost, controls released");
            }
            InputEvent::Resized { width, height } => {
                let viewport = Vec2::new(*width, *height);
                self.touch.resize(viewport);
                self.resized = Some(viewport);
            }
        }
    }

    /// Applies every queued event. Returns how many were handled.
    pub fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.receiver.try_recv() {
            self.handle_event(&event);
            handled += 1;
        }
        handled
    }

    /// Latest viewport seen since the last call, for consumers outside the
    /// controller (the camera).
    pub fn take_resize(&mut self) -> Option<Vec2> {
        self.resized.take()
    }

    /// Writes the current control state onto the vehicle's wheels.
    pub fn apply(&self, vehicle: &mut RaycastVehicle) {
        self.drivetrain.apply(&self.state, vehicle);
    }
}
