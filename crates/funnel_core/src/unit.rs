//! Unit data model: the funnel record and its externally owned body.
//!
//! Units are created once at system initialization from a fixed list of
//! bodies, never spawned dynamically, and permanently removed from the live
//! pool once their health handle reports death or is dropped.

use std::cell::RefCell;
use std::rc::Rc;

use nalgebra::{Point3, UnitQuaternion};

use crate::hooks::HealthProvider;

/// Stable identifier for a unit, assigned at pool construction.
pub type UnitId = u32;

/// Movable, oriented body shared between the core and its host.
///
/// The host typically holds another handle to the same body for rendering;
/// the core only moves, rotates, and (de)activates it.
#[derive(Debug, Clone)]
pub struct Body {
    pub position: Point3<f32>,
    pub orientation: UnitQuaternion<f32>,
    /// Hidden/deactivated bodies are skipped by the host's presentation.
    pub active: bool,
}

impl Body {
    pub fn at(position: Point3<f32>) -> Self {
        Self { position, orientation: UnitQuaternion::identity(), active: true }
    }
}

pub type BodyHandle = Rc<RefCell<Body>>;

pub fn body_handle(position: Point3<f32>) -> BodyHandle {
    Rc::new(RefCell::new(Body::at(position)))
}

/// A funnel: body reference, health handle, attack cue, and speeds.
///
/// Cloning shares the underlying body and health handles; tasks hold a
/// clone so a unit pruned from the pool can still unwind its task cleanly.
#[derive(Clone)]
pub struct Funnel {
    id: UnitId,
    body: BodyHandle,
    health: Rc<dyn HealthProvider>,
    move_speed: f32,
    rot_speed_rad: f32,
}

impl Funnel {
    pub fn new(
        id: UnitId,
        body: BodyHandle,
        health: Rc<dyn HealthProvider>,
        move_speed: f32,
        rot_speed_rad: f32,
    ) -> Self {
        Self { id, body, health, move_speed, rot_speed_rad }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn body(&self) -> &BodyHandle {
        &self.body
    }

    pub fn position(&self) -> Point3<f32> {
        self.body.borrow().position
    }

    pub fn orientation(&self) -> UnitQuaternion<f32> {
        self.body.borrow().orientation
    }

    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    pub fn rot_speed_rad(&self) -> f32 {
        self.rot_speed_rad
    }

    pub fn is_dead(&self) -> bool {
        self.health.is_dead()
    }

    pub fn set_active(&self, active: bool) {
        self.body.borrow_mut().active = active;
    }
}

impl std::fmt::Debug for Funnel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Funnel")
            .field("id", &self.id)
            .field("position", &self.position())
            .field("dead", &self.is_dead())
            .finish()
    }
}
