// ==============================================================================
// touch.rs — VIRTUAL JOYSTICK
// ------------------------------------------------------------------------------
// touch start  -> joystick center = finger
// touch move   -> joystick knob = finger; offset = center − knob
//                 offset.x > 0 steers left (+max), < 0 steers right (−max)
//                 offset.y > 0 accelerates (−force), < 0 reverses (+force)
//                 a zero component leaves that control as it was
// touch end    -> steer and engine force 0, joystick hidden
//
// Coordinates are screen space (pixels, y down).
// ==============================================================================

use glam::Vec2;
use serde::Serialize;

use crate::config::ControlLimits;

use super::control::ControlState;

pub const KNOB_RADIUS: f32 = 30.0;
pub const RING_RADIUS: f32 = 75.0;

/// What an overlay needs to draw the joystick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Joystick {
    pub center: Vec2,
    pub knob: Vec2,
    pub visible: bool,
    pub knob_radius: f32,
    pub ring_radius: f32,
}

impl Joystick {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            center: viewport * 0.5,
            knob: Vec2::ZERO,
            visible: false,
            knob_radius: KNOB_RADIUS,
            ring_radius: RING_RADIUS,
        }
    }

    pub fn set_center(&mut self, center: Vec2) {
        self.center = center;
        self.visible = true;
    }

    pub fn set_position(&mut self, knob: Vec2) {
        self.knob = knob;
        self.visible = true;
    }

    pub fn clear(&mut self) {
        self.visible = false;
    }

    /// Center minus knob.
    pub fn offset(&self) -> Vec2 {
        self.center - self.knob
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TouchController {
    limits: ControlLimits,
    joystick: Joystick,
}

impl TouchController {
    pub fn new(limits: ControlLimits, viewport: Vec2) -> Self {
        Self {
            limits,
            joystick: Joystick::new(viewport),
        }
    }

    pub fn joystick(&self) -> &Joystick {
        &self.joystick
    }

    /// Re-centres the idle joystick on a new viewport.
    pub fn resize(&mut self, viewport: Vec2) {
        if !self.joystick.visible {
            self.joystick.center = viewport * 0.5;
        }
    }

    pub fn touch_start(&mut self, at: Vec2) {
        self.joystick.set_center(at);
    }

    pub fn touch_move(&mut self, at: Vec2, state: &mut ControlState) {
        self.joystick.set_position(at);
        state.brake = 0.0;

        let offset = self.joystick.offset();
        if offset.x > 0.0 {
            state.steer = self.limits.max_steer;
        } else if offset.x < 0.0 {
            state.steer = -self.limits.max_steer;
        }
        if offset.y > 0.0 {
            state.engine_force = -self.limits.engine_force;
        } else if offset.y < 0.0 {
            state.engine_force = self.limits.engine_force;
        }
    }

    pub fn touch_end(&mut self, state: &mut ControlState) {
        state.steer = 0.0;
        state.engine_force = 0.0;
        self.joystick.clear();
    }
}
