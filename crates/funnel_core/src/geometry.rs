//! Geometry helpers for depth-scaled placement and orientation stepping.
//!
//! The lateral sampling extents shrink linearly with depth; extrapolating
//! that same line to zero scale yields the convergence apex every idle unit
//! faces.

use nalgebra::{Point3, UnitQuaternion, Vector3};

use crate::config::WorldFrame;

/// Apex depth is clamped to this many depth offsets behind the master plane.
const APEX_MAX_DEPTH_FACTOR: f32 = 4.0;

/// Lateral scale factor for a plane at `depth_offset` from the master plane.
///
/// Negative offsets (toward the forward attack plane) map to `max_scale`,
/// positive offsets (toward the holding plane) to `min_scale`. The mapping
/// is linear and deliberately not clamped so it can be extrapolated for the
/// apex computation; callers sampling positions clamp to zero themselves.
#[inline]
pub fn depth_scale(frame: &WorldFrame, depth_offset: f32) -> f32 {
    let t = (depth_offset + frame.depth_offset) / (2.0 * frame.depth_offset);
    frame.max_scale + (frame.min_scale - frame.max_scale) * t
}

/// World point the holding formation converges toward.
///
/// Solves `depth_scale(d) == 0` for `d` and combines the (clamped) result
/// with the frame center's X/Y. The clamp keeps the apex at a usable
/// distance when the scale curve is nearly flat.
pub fn convergence_apex(frame: &WorldFrame) -> Point3<f32> {
    let slope = frame.min_scale - frame.max_scale;
    // slope is negative for any valid frame; validate() enforces min < max
    let t_zero = frame.max_scale / -slope;
    let depth = -frame.depth_offset + 2.0 * frame.depth_offset * t_zero;
    let depth = depth.clamp(frame.depth_offset, frame.depth_offset * APEX_MAX_DEPTH_FACTOR);
    Point3::new(frame.center.x, frame.center.y, frame.center.z + depth)
}

/// Unit forward vector (local +Z rotated into world space).
#[inline]
pub fn forward(orientation: &UnitQuaternion<f32>) -> Vector3<f32> {
    orientation.transform_vector(&Vector3::z())
}

/// Orientation whose forward vector points from `from` at `to`.
///
/// Returns `None` when the two points coincide (no defined direction).
pub fn look_at(from: &Point3<f32>, to: &Point3<f32>) -> Option<UnitQuaternion<f32>> {
    look_along(&(to - from))
}

/// Orientation whose forward vector points along `dir`.
pub fn look_along(dir: &Vector3<f32>) -> Option<UnitQuaternion<f32>> {
    if dir.norm_squared() < 1e-8 {
        return None;
    }
    Some(UnitQuaternion::face_towards(dir, &Vector3::y()))
}

/// Rotate `current` toward `target` by at most `max_angle_rad`.
///
/// Snaps to `target` once the remaining angle fits inside the step.
pub fn rotate_step(
    current: &UnitQuaternion<f32>,
    target: &UnitQuaternion<f32>,
    max_angle_rad: f32,
) -> UnitQuaternion<f32> {
    let angle = current.angle_to(target);
    if angle <= max_angle_rad || angle < 1e-6 {
        return *target;
    }
    let t = max_angle_rad / angle;
    current.try_slerp(target, t, 1e-6).unwrap_or(*target)
}

/// Angle in radians between a forward vector and the direction toward a point.
pub fn bearing_to(
    position: &Point3<f32>,
    orientation: &UnitQuaternion<f32>,
    point: &Point3<f32>,
) -> Option<f32> {
    let to_point = point - position;
    if to_point.norm_squared() < 1e-8 {
        return None;
    }
    let fwd = forward(orientation);
    let cos = (fwd.dot(&to_point) / (fwd.norm() * to_point.norm())).clamp(-1.0, 1.0);
    Some(cos.acos())
}
