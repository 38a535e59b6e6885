//! Reusable motion primitives underlying every mode choreography.
//!
//! Both primitives advance one simulation step per call and report arrival,
//! so the owning task can suspend between steps and abort mid-flight when
//! the mode switches or the unit dies.

use nalgebra::{Point3, UnitQuaternion};

use crate::geometry::{look_along, look_at, rotate_step};
use crate::unit::Funnel;

/// How a moving unit orients itself while traveling.
#[derive(Debug, Clone)]
pub enum FaceMode {
    /// Face the direction of travel.
    Travel,
    /// Keep facing a fixed world point, recomputed every step.
    TrackPoint(Point3<f32>),
    /// Blend from a captured starting orientation toward the live tracked
    /// target, interpolated over the travel distance rather than snapping.
    BlendToTarget { start: UnitQuaternion<f32>, total_distance: f32 },
    /// Leave orientation untouched.
    None,
}

/// Step-wise move toward a fixed target position.
#[derive(Debug, Clone)]
pub struct MoveTo {
    target: Point3<f32>,
    face: FaceMode,
    arrive_epsilon: f32,
}

impl MoveTo {
    pub fn new(target: Point3<f32>, face: FaceMode, arrive_epsilon: f32) -> Self {
        Self { target, face, arrive_epsilon }
    }

    pub fn target(&self) -> Point3<f32> {
        self.target
    }

    /// Advance one step; returns true once the unit is within epsilon of
    /// the target (position snapped exactly onto it).
    ///
    /// `live_target` feeds `FaceMode::BlendToTarget`; `None` degrades that
    /// mode to keeping the current blend endpoint unchanged for the tick.
    pub fn step(&self, unit: &Funnel, live_target: Option<Point3<f32>>, dt: f32) -> bool {
        let mut body = unit.body().borrow_mut();
        let to_target = self.target - body.position;
        let distance = to_target.norm();
        let step_len = unit.move_speed() * dt;

        let arrived = distance <= self.arrive_epsilon || distance <= step_len;
        if arrived {
            body.position = self.target;
        } else {
            body.position += to_target * (step_len / distance);
        }

        let max_turn = unit.rot_speed_rad() * dt;
        match &self.face {
            FaceMode::Travel => {
                if let Some(desired) = look_along(&to_target) {
                    body.orientation = rotate_step(&body.orientation, &desired, max_turn);
                }
            }
            FaceMode::TrackPoint(point) => {
                if let Some(desired) = look_at(&body.position, point) {
                    body.orientation = rotate_step(&body.orientation, &desired, max_turn);
                }
            }
            FaceMode::BlendToTarget { start, total_distance } => {
                if let Some(target_pos) = live_target {
                    if let Some(desired) = look_at(&body.position, &target_pos) {
                        let remaining = (self.target - body.position).norm();
                        let progress = if *total_distance > 1e-5 {
                            (1.0 - remaining / total_distance).clamp(0.0, 1.0)
                        } else {
                            1.0
                        };
                        body.orientation =
                            start.try_slerp(&desired, progress, 1e-6).unwrap_or(desired);
                    }
                }
                // no target: keep whatever orientation the blend last produced
            }
            FaceMode::None => {}
        }

        arrived
    }
}

/// Step-wise rotation toward a fixed orientation at the unit's rotation
/// speed; used when converging on the apex orientation at rest.
#[derive(Debug, Clone)]
pub struct RotateTo {
    target: UnitQuaternion<f32>,
    align_epsilon_rad: f32,
}

impl RotateTo {
    pub fn new(target: UnitQuaternion<f32>, align_epsilon_rad: f32) -> Self {
        Self { target, align_epsilon_rad }
    }

    /// Advance one step; returns true once within the alignment epsilon.
    pub fn step(&self, unit: &Funnel, dt: f32) -> bool {
        let mut body = unit.body().borrow_mut();
        body.orientation =
            rotate_step(&body.orientation, &self.target, unit.rot_speed_rad() * dt);
        body.orientation.angle_to(&self.target) <= self.align_epsilon_rad
    }
}
