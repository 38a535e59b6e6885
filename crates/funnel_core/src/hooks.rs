//! External collaborator interfaces.
//!
//! The core never renders, plays audio, or resolves projectile physics.
//! Hosts plug those concerns in through these traits; every one of them may
//! legitimately report "nothing there" and the core degrades to a no-op.

use nalgebra::Point3;

use crate::unit::{Body, UnitId};

/// Per-unit health source, polled every tick for pool pruning and at every
/// task suspension point for mid-task abort checks.
pub trait HealthProvider {
    fn current_health(&self) -> f32;

    fn is_dead(&self) -> bool {
        self.current_health() <= 0.0
    }
}

/// Locates the tracked enemy/player for aiming.
///
/// Returning `None` at any time is normal; aim-dependent steps skip their
/// reorientation for that tick instead of erroring.
pub trait TargetLocator {
    fn current_target_position(&self) -> Option<Point3<f32>>;
}

/// Scene overlap query used by the placement allocator.
pub trait CollisionQuery {
    fn overlaps_anything(&self, point: &Point3<f32>, radius: f32) -> bool;
}

/// Spawns a projectile from a unit's current pose. Side effect only; the
/// core never consumes a return value.
pub trait ProjectileSpawner {
    fn fire_from(&mut self, unit: UnitId, body: &Body);
}

/// Optional audio/visual hook fired when a unit begins a new move.
pub trait MotionCue {
    fn on_task_start(&mut self, unit: UnitId);
}

/// Bundle of collaborator references passed into each controller update.
///
/// Borrowed fresh every tick so hosts keep ownership of their own systems.
pub struct SwarmContext<'a> {
    pub target: &'a dyn TargetLocator,
    pub collision: &'a dyn CollisionQuery,
    pub projectiles: &'a mut dyn ProjectileSpawner,
    pub cues: &'a mut dyn MotionCue,
}
