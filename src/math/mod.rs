/// Linear-algebra kernel
/// Thin layer over glam that pins down the conventions the clipper relies on:
/// right-handed view space looking down -Z, OpenGL clip volume (-w <= z <= w),
/// and yaw 0 facing +Z.
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

/// Pitch limit used by camera controllers to avoid flipping over the pole.
pub const MAX_PITCH: f32 = 1.55;

/// Normalize `v`, or return `fallback` when `v` has zero (or non-finite) length.
#[inline]
pub fn safe_normalize(v: Vec3, fallback: Vec3) -> Vec3 {
    v.try_normalize().unwrap_or(fallback)
}

/// View matrix for an eye looking at `target`.
///
/// Degenerate input never produces NaN: a zero-length view direction falls
/// back to looking down -Z, and an `up` parallel to the view direction is
/// replaced with whichever world axis is least aligned with it.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let forward = safe_normalize(target - eye, Vec3::NEG_Z);
    let mut up = safe_normalize(up, Vec3::Y);
    if forward.cross(up).length_squared() < 1e-12 {
        up = if forward.y.abs() < 0.9 { Vec3::Y } else { Vec3::Z };
    }
    Mat4::look_at_rh(eye, eye + forward, up)
}

/// Perspective projection into the OpenGL clip volume.
/// A non-positive aspect ratio is treated as 1.
pub fn perspective(fov_y_radians: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let aspect = if aspect > 0.0 { aspect } else { 1.0 };
    Mat4::perspective_rh_gl(fov_y_radians, aspect, near, far)
}

/// Orthographic projection into the OpenGL clip volume.
pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    Mat4::orthographic_rh_gl(left, right, bottom, top, near, far)
}

/// Orthographic projection sized to a surface: `half_height` world units
/// above and below the view axis, width derived from the surface aspect.
pub fn ortho_for_surface(width: usize, height: usize, half_height: f32, near: f32, far: f32) -> Mat4 {
    let aspect = if height > 0 {
        width as f32 / height as f32
    } else {
        1.0
    };
    let half_width = half_height * aspect;
    ortho(-half_width, half_width, -half_height, half_height, near, far)
}

/// Rotation matrix from a unit quaternion.
#[inline]
pub fn quat_to_mat4(q: Quat) -> Mat4 {
    debug_assert!(q.is_normalized(), "quat_to_mat4 expects a unit quaternion");
    Mat4::from_quat(q)
}

/// Local-to-parent transform from translation, rotation and scale.
#[inline]
pub fn trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}

/// Unit forward vector for a yaw/pitch pair.
/// yaw = 0 faces +Z, yaw = pi faces -Z, positive pitch looks up.
#[inline]
pub fn forward_from_yaw_pitch(yaw: f32, pitch: f32) -> Vec3 {
    let (sy, cy) = yaw.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    Vec3::new(cp * sy, sp, cp * cy)
}

/// Rotate `v` by `angle` radians about `axis` (right-hand rule).
/// A zero axis leaves `v` unchanged.
#[inline]
pub fn rotate_about_axis(v: Vec3, axis: Vec3, angle: f32) -> Vec3 {
    match axis.try_normalize() {
        Some(axis) => Quat::from_axis_angle(axis, angle) * v,
        None => v,
    }
}
