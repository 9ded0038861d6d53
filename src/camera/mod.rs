/// Camera system: a look-at camera re-derived every frame from one of the
/// controllers below (free-fly with mouse look, or third-person follow).
///
/// Forward convention: `(cos(pitch)·sin(yaw), sin(pitch), cos(pitch)·cos(yaw))`,
/// so yaw 0 looks down +Z.
use crate::math::{self, MAX_PITCH};
use glam::{Mat4, Vec3};

/// Eye/target/up triple. Never stored as a matrix across frames.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3, up: Vec3) -> Self {
        Self {
            position,
            target,
            up,
        }
    }

    /// Get view matrix
    pub fn view(&self) -> Mat4 {
        math::look_at(self.position, self.target, self.up)
    }

    /// Unit view direction, +Z when eye and target coincide
    pub fn forward(&self) -> Vec3 {
        math::safe_normalize(self.target - self.position, Vec3::Z)
    }
}

/// Orthonormal camera basis
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Basis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

/// Free-flying camera with yaw/pitch mouse look and roll
#[derive(Clone, Debug)]
pub struct FlyCamera {
    pub position: Vec3,
    pub yaw: f32,   // Rotation around Y axis (radians)
    pub pitch: f32, // Elevation (radians), clamped to ±MAX_PITCH
    pub roll: f32,  // Rotation about forward (radians)

    // Movement state
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
}

impl FlyCamera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            move_speed: 3.0,
            mouse_sensitivity: 0.0025,
        }
    }

    /// Forward, right and up, with roll applied to right and up.
    pub fn basis(&self) -> Basis {
        let forward = math::forward_from_yaw_pitch(self.yaw, self.pitch);
        let right = math::safe_normalize(forward.cross(Vec3::Y), Vec3::NEG_X);
        let up = math::safe_normalize(right.cross(forward), Vec3::Y);
        if self.roll == 0.0 {
            return Basis { forward, right, up };
        }
        Basis {
            forward,
            right: math::rotate_about_axis(right, forward, self.roll),
            up: math::rotate_about_axis(up, forward, self.roll),
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.basis().forward
    }

    pub fn right(&self) -> Vec3 {
        self.basis().right
    }

    pub fn up(&self) -> Vec3 {
        self.basis().up
    }

    /// Update orientation from mouse delta. Positive `dx` looks right,
    /// positive `dy` (screen down) looks down.
    pub fn rotate(&mut self, mouse_delta_x: f32, mouse_delta_y: f32) {
        self.yaw -= mouse_delta_x * self.mouse_sensitivity;
        self.pitch -= mouse_delta_y * self.mouse_sensitivity;
        self.pitch = self.pitch.clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn add_roll(&mut self, radians: f32) {
        self.roll += radians;
    }

    /// Move along forward, camera right and world up. The combined direction
    /// is normalized, so diagonals are not faster.
    pub fn move_local(&mut self, forward: f32, right: f32, up: f32, dt: f32) {
        let basis = self.basis();
        let dir = (basis.forward * forward + basis.right * right + Vec3::Y * up).normalize_or_zero();
        self.position += dir * self.move_speed * dt;
    }

    /// Camera for this frame
    pub fn camera(&self) -> Camera {
        let basis = self.basis();
        Camera::new(self.position, self.position + basis.forward, basis.up)
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.camera().view()
    }
}

/// Third-person camera orbiting a moving target
#[derive(Clone, Debug)]
pub struct FollowCamera {
    pub distance: f32,
    /// Height of the look-at point above the target
    pub height: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self {
            distance: 6.0,
            height: 1.5,
            yaw: 0.0,
            pitch: -0.35,
        }
    }
}

impl FollowCamera {
    pub fn rotate(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Camera looking at `target + height·Y` from `distance` behind it along
    /// the yaw/pitch forward direction.
    pub fn camera(&self, target: Vec3) -> Camera {
        let focus = target + Vec3::Y * self.height;
        let forward = math::forward_from_yaw_pitch(self.yaw, self.pitch);
        Camera::new(focus - forward * self.distance.max(0.0), focus, Vec3::Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn yaw_zero_looks_down_positive_z() {
        let cam = FlyCamera::new(Vec3::ZERO);
        let b = cam.basis();
        assert_relative_eq!(b.forward.z, 1.0, epsilon = 1e-6);
        assert_relative_eq!(b.right.x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(b.up.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = FlyCamera::new(Vec3::ZERO);
        cam.rotate(0.0, -100_000.0);
        assert_eq!(cam.pitch, MAX_PITCH);
        cam.rotate(0.0, 100_000.0);
        assert_eq!(cam.pitch, -MAX_PITCH);
    }

    #[test]
    fn roll_keeps_basis_orthonormal() {
        let mut cam = FlyCamera::new(Vec3::ZERO);
        cam.yaw = 0.7;
        cam.pitch = 0.3;
        cam.add_roll(0.9);
        let b = cam.basis();
        assert_relative_eq!(b.right.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(b.up.length(), 1.0, epsilon = 1e-5);
        assert!(b.right.dot(b.forward).abs() < 1e-5);
        assert!(b.up.dot(b.forward).abs() < 1e-5);
        assert!(b.up.dot(b.right).abs() < 1e-5);
    }

    #[test]
    fn move_local_is_normalized() {
        let mut cam = FlyCamera::new(Vec3::ZERO);
        cam.move_local(1.0, 1.0, 0.0, 1.0);
        assert_relative_eq!(cam.position.length(), cam.move_speed, epsilon = 1e-5);
    }

    #[test]
    fn follow_camera_keeps_distance() {
        let follow = FollowCamera::default();
        let target = Vec3::new(3.0, 0.0, -2.0);
        let cam = follow.camera(target);
        assert_relative_eq!(cam.position.distance(cam.target), follow.distance, epsilon = 1e-5);
        assert_relative_eq!(cam.target.y, follow.height, epsilon = 1e-6);
    }
}
