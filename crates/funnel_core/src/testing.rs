//! Test fixtures and simple collaborator implementations.
//!
//! Centralized doubles for the external interfaces so unit tests, scenario
//! tests, and the headless CLI driver all build worlds the same way.

use std::cell::Cell;
use std::rc::Rc;

use nalgebra::Point3;

use crate::hooks::{CollisionQuery, HealthProvider, MotionCue, ProjectileSpawner, TargetLocator};
use crate::unit::{body_handle, Body, Funnel, UnitId};

/// Health source driven from the outside via `set` / `kill`.
pub struct ScriptedHealth {
    health: Cell<f32>,
}

impl ScriptedHealth {
    pub fn new(health: f32) -> Self {
        Self { health: Cell::new(health) }
    }

    pub fn set(&self, health: f32) {
        self.health.set(health);
    }

    pub fn kill(&self) {
        self.health.set(0.0);
    }
}

impl HealthProvider for ScriptedHealth {
    fn current_health(&self) -> f32 {
        self.health.get()
    }
}

/// Target locator returning a settable fixed position (or nothing).
pub struct FixedTarget {
    position: Cell<Option<Point3<f32>>>,
}

impl FixedTarget {
    pub fn new(position: Option<Point3<f32>>) -> Self {
        Self { position: Cell::new(position) }
    }

    pub fn set(&self, position: Option<Point3<f32>>) {
        self.position.set(position);
    }
}

impl TargetLocator for FixedTarget {
    fn current_target_position(&self) -> Option<Point3<f32>> {
        self.position.get()
    }
}

/// Collision query that never reports an overlap.
pub struct NoCollision;

impl CollisionQuery for NoCollision {
    fn overlaps_anything(&self, _point: &Point3<f32>, _radius: f32) -> bool {
        false
    }
}

/// O(n) sphere scan standing in for a real spatial index.
pub struct SphereObstacles {
    spheres: Vec<(Point3<f32>, f32)>,
}

impl SphereObstacles {
    pub fn new(spheres: Vec<(Point3<f32>, f32)>) -> Self {
        Self { spheres }
    }
}

impl CollisionQuery for SphereObstacles {
    fn overlaps_anything(&self, point: &Point3<f32>, radius: f32) -> bool {
        self.spheres
            .iter()
            .any(|(center, r)| (center - point).norm() < r + radius)
    }
}

/// Projectile spawner that records each shot.
#[derive(Default)]
pub struct RecordingSpawner {
    shots: Vec<(UnitId, Point3<f32>)>,
}

impl RecordingSpawner {
    pub fn count(&self) -> usize {
        self.shots.len()
    }

    pub fn shots(&self) -> &[(UnitId, Point3<f32>)] {
        &self.shots
    }
}

impl ProjectileSpawner for RecordingSpawner {
    fn fire_from(&mut self, unit: UnitId, body: &Body) {
        self.shots.push((unit, body.position));
    }
}

/// Motion cue hook that counts task starts.
#[derive(Default)]
pub struct CountingCue {
    starts: usize,
}

impl CountingCue {
    pub fn count(&self) -> usize {
        self.starts
    }
}

impl MotionCue for CountingCue {
    fn on_task_start(&mut self, _unit: UnitId) {
        self.starts += 1;
    }
}

/// A unit with default speeds (6.0 move, PI rotate) and full health.
pub fn make_test_unit(id: UnitId, position: Point3<f32>) -> Funnel {
    make_test_unit_with_health(id, position, 100.0).0
}

/// A unit plus its scriptable health handle.
pub fn make_test_unit_with_health(
    id: UnitId,
    position: Point3<f32>,
    health: f32,
) -> (Funnel, Rc<ScriptedHealth>) {
    let health = Rc::new(ScriptedHealth::new(health));
    let unit = Funnel::new(
        id,
        body_handle(position),
        health.clone(),
        6.0,
        std::f32::consts::PI,
    );
    (unit, health)
}
