use nalgebra as na;

// NOTE: Pure math for the movement integrator. Nothing here touches the
// collision world or owns state; keep it that way so it stays trivially testable.
use crate::collision::{Vec3, settings::DIST_EPS};

/// World up axis.
#[inline]
pub fn up() -> Vec3 {
    Vec3::y()
}

/// Camera look direction (camera -Z) for a yaw/pitch pair, rotation order Y then X.
///
/// yaw = 0, pitch = 0 looks down -Z. Positive yaw turns left (toward -X),
/// positive pitch looks up.
#[inline]
pub fn look_direction(yaw: f32, pitch: f32) -> Vec3 {
    let (sy, cy) = yaw.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    Vec3::new(-sy * cp, sp, -cy * cp)
}

/// Rotation quaternion for a yaw/pitch pair (roll is always zero).
#[inline]
pub fn look_rotation(yaw: f32, pitch: f32) -> na::UnitQuaternion<f32> {
    na::UnitQuaternion::from_axis_angle(&na::Vector3::y_axis(), yaw)
        * na::UnitQuaternion::from_axis_angle(&na::Vector3::x_axis(), pitch)
}

/// Look direction flattened onto the XZ plane and normalized.
///
/// Returns `None` when the flattened vector has no length (looking straight up or down).
#[inline]
pub fn horizontal_forward(yaw: f32, pitch: f32) -> Option<Vec3> {
    let mut dir = look_direction(yaw, pitch);
    dir.y = 0.0;
    normalize_or_none(dir)
}

/// Strafe-right direction: horizontal forward crossed with world up.
#[inline]
pub fn side_vector(yaw: f32, pitch: f32) -> Option<Vec3> {
    horizontal_forward(yaw, pitch).and_then(|f| normalize_or_none(f.cross(&up())))
}

#[inline]
pub fn normalize_or_none(v: Vec3) -> Option<Vec3> {
    let len_sq = v.norm_squared();
    if !len_sq.is_finite() || len_sq <= DIST_EPS * DIST_EPS {
        return None;
    }
    Some(v / len_sq.sqrt())
}

/// Per-frame damping coefficient `k * (exp(-rate * dt) - 1)`.
///
/// Adding `velocity * coefficient` to the velocity shrinks it by the damping
/// factor. Clamped to `[-1, 0]` so a boosted `k` on a long frame stops the
/// body instead of reversing it.
#[inline]
pub fn damping_coefficient(rate: f32, dt: f32, k: f32) -> f32 {
    (k * ((-rate * dt).exp() - 1.0)).clamp(-1.0, 0.0)
}

/// Velocity change contributed by one held action this frame.
#[inline]
pub fn impulse(dir: Vec3, dt: f32, base_speed: f32, acceleration: f32) -> Vec3 {
    dir * (dt * base_speed * acceleration)
}

/// Sanitize a frame delta: non-finite or negative values become 0.
#[inline]
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 { dt } else { 0.0 }
}
