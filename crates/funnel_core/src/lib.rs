//! # funnel_core - Deterministic Funnel Swarm Coordination Core
//!
//! This library coordinates a squad of autonomous "funnel" combat units
//! that orbit a boss entity: they hold a converging formation behind it,
//! run staggered attack choreographies against a tracked target, and
//! return to formation, all driven by a single-threaded tick.
//!
//! ## Features
//! - Mode machine (Default / StandBy / AttackPattern / Activate) with
//!   synchronous task cancellation on every transition
//! - Resumable per-unit tasks advanced once per simulation step
//! - Retrying randomized placement with collision avoidance, minimum
//!   separation, and a never-failing fallback
//! - 100% deterministic placement (same seed = same formation)
//!
//! Rendering, audio, projectile physics, and stage scripting stay outside
//! the core behind the traits in [`hooks`].

pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod hooks;
pub mod modes;
pub mod motion;
pub mod placement;
pub mod task;
pub mod testing;
pub mod unit;

mod scenario_tests;

pub use config::{SwarmConfig, WorldFrame};
pub use controller::{SwarmController, SwarmSnapshot};
pub use error::{Result, SwarmError};
pub use hooks::{
    CollisionQuery, HealthProvider, MotionCue, ProjectileSpawner, SwarmContext, TargetLocator,
};
pub use modes::ModeState;
pub use placement::PlacementAllocator;
pub use task::{FunnelTask, TaskKind, TaskStatus, TaskTick};
pub use unit::{body_handle, Body, BodyHandle, Funnel, UnitId};
