//! Key-code mapping for the keyboard variant.
//!
//! Both the letter layout (z/q/s/d) and the arrow keys drive the same four
//! directions. Every key event, recognised or not, releases the brake.

use crate::config::ControlLimits;

use super::control::ControlState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Accelerate,
    Reverse,
    SteerLeft,
    SteerRight,
}

impl Direction {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "z" | "ArrowUp" => Some(Self::Accelerate),
            "s" | "ArrowDown" => Some(Self::Reverse),
            "q" | "ArrowLeft" => Some(Self::SteerLeft),
            "d" | "ArrowRight" => Some(Self::SteerRight),
            _ => None,
        }
    }

    fn is_throttle(self) -> bool {
        matches!(self, Self::Accelerate | Self::Reverse)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KeyboardController {
    limits: ControlLimits,
}

impl KeyboardController {
    pub fn new(limits: ControlLimits) -> Self {
        Self { limits }
    }

    pub fn key_down(&self, key: &str, state: &mut ControlState) {
        state.brake = 0.0;

        let Some(direction) = Direction::from_key(key) else {
            return;
        };

        // Negative engine force moves the vehicle forward.
        match direction {
            Direction::Accelerate => state.engine_force = -self.limits.engine_force,
            Direction::Reverse => state.engine_force = self.limits.engine_force,
            Direction::SteerRight => state.steer = -self.limits.max_steer,
            Direction::SteerLeft => state.steer = self.limits.max_steer,
        }
    }

    pub fn key_up(&self, key: &str, state: &mut ControlState) {
        state.brake = 0.0;

        match Direction::from_key(key) {
            Some(direction) if direction.is_throttle() => state.engine_force = 0.0,
            Some(_) => state.steer = 0.0,
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyboard() -> KeyboardController {
        KeyboardController::new(ControlLimits::default())
    }

    #[test]
    fn both_layouts_map_to_the_same_directions() {
        assert_eq!(Direction::from_key("z"), Direction::from_key("ArrowUp"));
        assert_eq!(Direction::from_key("s"), Direction::from_key("ArrowDown"));
        assert_eq!(Direction::from_key("q"), Direction::from_key("ArrowLeft"));
        assert_eq!(Direction::from_key("d"), Direction::from_key("ArrowRight"));
        assert_eq!(Direction::from_key("w"), None);
    }

    #[test]
    fn repeated_steer_key_stays_at_the_limit() {
        let keyboard = keyboard();
        let mut state = ControlState::default();
        for _ in 0..50 {
            keyboard.key_down("q", &mut state);
        }
        assert_eq!(state.steer, 0.3);

        for _ in 0..50 {
            keyboard.key_down("ArrowRight", &mut state);
        }
        assert_eq!(state.steer, -0.3);
    }

    #[test]
    fn accelerate_and_reverse_set_opposite_forces() {
        let keyboard = keyboard();
        let mut state = ControlState::default();
        keyboard.key_down("z", &mut state);
        assert_eq!(state.engine_force, -800.0);
        keyboard.key_down("s", &mut state);
        assert_eq!(state.engine_force, 800.0);
    }

    #[test]
    fn releasing_a_throttle_key_zeroes_the_engine() {
        let keyboard = keyboard();
        for (press, release) in [("z", "z"), ("ArrowUp", "s"), ("s", "ArrowUp"), ("ArrowDown", "ArrowDown")] {
            let mut state = ControlState::default();
            keyboard.key_down(press, &mut state);
            keyboard.key_down("d", &mut state);
            keyboard.key_up(release, &mut state);
            assert_eq!(state.engine_force, 0.0);
            // steering is untouched by a throttle release
            assert_eq!(state.steer, -0.3);
        }
    }

    #[test]
    fn any_key_event_releases_the_brake() {
        let keyboard = keyboard();
        let mut state = ControlState {
            brake: 10.0,
            ..Default::default()
        };
        keyboard.key_down("x", &mut state);
        assert_eq!(state.brake, 0.0);

        state.brake = 10.0;
        keyboard.key_up("x", &mut state);
        assert_eq!(state.brake, 0.0);
    }
}
