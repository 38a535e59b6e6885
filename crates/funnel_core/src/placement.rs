//! Retrying randomized placement with collision avoidance and separation.
//!
//! Placement never fails: once the retries are spent, one final
//! unchecked sample is taken so the swarm keeps moving even under
//! pathological contention. Fallbacks are counted and logged as a degraded
//! condition.

use std::collections::HashMap;

use nalgebra::Point3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{SwarmConfig, WorldFrame};
use crate::geometry::{convergence_apex, depth_scale};
use crate::hooks::CollisionQuery;
use crate::unit::UnitId;

/// Assigns collision-free, depth-scaled positions to units.
///
/// The ledger holds each unit's most recent assignment and is only a
/// consistency hint for the separation check, not a reservation system.
pub struct PlacementAllocator {
    frame: WorldFrame,
    retries: u32,
    min_separation: f32,
    probe_radius: f32,
    rng: ChaCha8Rng,
    ledger: HashMap<UnitId, Point3<f32>>,
    fallbacks: u64,
}

impl PlacementAllocator {
    pub fn new(frame: WorldFrame, config: &SwarmConfig, seed: u64) -> Self {
        Self {
            min_separation: frame.min_separation,
            retries: config.placement_retries,
            probe_radius: config.collision_probe_radius,
            frame,
            rng: ChaCha8Rng::seed_from_u64(seed),
            ledger: HashMap::new(),
            fallbacks: 0,
        }
    }

    pub fn frame(&self) -> &WorldFrame {
        &self.frame
    }

    /// The world point idle units orient toward.
    pub fn apex(&self) -> Point3<f32> {
        convergence_apex(&self.frame)
    }

    /// Allocate a position for `unit` on the plane at `depth_offset` from
    /// the master plane.
    ///
    /// Up to `placement_retries` times: sample a uniform lateral position
    /// inside the depth-scaled extents, rejecting candidates that overlap
    /// scene collision or sit closer than the minimum separation to any
    /// other unit's last recorded position. Exhausting the retries falls
    /// back to one unchecked sample.
    pub fn allocate(
        &mut self,
        depth_offset: f32,
        unit: UnitId,
        collision: &dyn CollisionQuery,
    ) -> Point3<f32> {
        for _ in 0..self.retries {
            let candidate = self.sample(depth_offset);
            if collision.overlaps_anything(&candidate, self.probe_radius) {
                continue;
            }
            if self.too_close_to_others(unit, &candidate) {
                continue;
            }
            self.ledger.insert(unit, candidate);
            return candidate;
        }

        // Degraded path: every attempt was rejected. Place anyway.
        self.fallbacks += 1;
        let candidate = self.sample(depth_offset);
        log::warn!(
            "placement retries exhausted for unit {}; using unchecked position {:?}",
            unit,
            candidate
        );
        self.ledger.insert(unit, candidate);
        candidate
    }

    /// Drop a unit's ledger entry (cancelled task or dead unit).
    pub fn release(&mut self, unit: UnitId) {
        self.ledger.remove(&unit);
    }

    pub fn last_position(&self, unit: UnitId) -> Option<Point3<f32>> {
        self.ledger.get(&unit).copied()
    }

    /// Number of allocations that went through the unchecked fallback.
    pub fn fallback_count(&self) -> u64 {
        self.fallbacks
    }

    fn sample(&mut self, depth_offset: f32) -> Point3<f32> {
        let scale = depth_scale(&self.frame, depth_offset).max(0.0);
        let half_x = self.frame.extent_x * scale;
        let half_y = self.frame.extent_y * scale;
        Point3::new(
            self.frame.center.x + self.rng.gen_range(-half_x..=half_x),
            self.frame.center.y + self.rng.gen_range(-half_y..=half_y),
            self.frame.center.z + depth_offset,
        )
    }

    fn too_close_to_others(&self, unit: UnitId, candidate: &Point3<f32>) -> bool {
        self.ledger.iter().any(|(&id, position)| {
            id != unit && (position - candidate).norm() < self.min_separation
        })
    }
}
