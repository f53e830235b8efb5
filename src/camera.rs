use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// Trailing camera. Before a target exists it sits at a fixed free position
/// looking at the origin; afterwards it keeps a constant world offset from
/// the target and looks at it.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
    free_position: Vec3,
    trailing_offset: Vec3,
}

impl CameraRig {
    pub fn new(config: &CameraConfig, width: u32, height: u32) -> Self {
        let free_position = Vec3::from_array(config.free_position);
        Self {
            eye: free_position,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: config.fov_y_degrees.to_radians(),
            aspect: aspect(width, height),
            z_near: config.z_near,
            z_far: config.z_far,
            free_position,
            trailing_offset: Vec3::from_array(config.trailing_offset),
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = aspect(width, height);
    }

    /// Follows `target` when given, otherwise returns to the free position.
    pub fn update(&mut self, target: Option<Vec3>) {
        match target {
            Some(target) => {
                self.eye = target + self.trailing_offset;
                self.target = target;
            }
            None => {
                self.eye = self.free_position;
                self.target = Vec3::ZERO;
            }
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * self.view()
    }
}

fn aspect(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn without_a_target_the_camera_watches_the_origin() {
        let mut rig = CameraRig::new(&CameraConfig::default(), 800, 600);
        rig.update(None);
        assert_eq!(rig.eye, Vec3::new(12.0, 12.0, 12.0));
        assert_eq!(rig.target, Vec3::ZERO);
    }

    #[test]
    fn trailing_offset_is_constant_in_world_space() {
        let mut rig = CameraRig::new(&CameraConfig::default(), 800, 600);
        rig.update(Some(Vec3::new(3.0, 0.6, 40.0)));
        assert_eq!(rig.eye, Vec3::new(3.0, 10.6, 20.0));
        assert_eq!(rig.target, Vec3::new(3.0, 0.6, 40.0));
    }

    #[test]
    fn target_projects_to_the_screen_center() {
        let mut rig = CameraRig::new(&CameraConfig::default(), 1280, 720);
        rig.update(Some(Vec3::new(5.0, 0.5, -7.0)));
        let clip = rig.view_proj() * rig.target.extend(1.0);
        assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-4);
        assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn zero_height_viewport_keeps_a_finite_aspect() {
        let mut rig = CameraRig::new(&CameraConfig::default(), 800, 600);
        rig.set_aspect(640, 0);
        assert!(rig.aspect.is_finite());
    }
}
