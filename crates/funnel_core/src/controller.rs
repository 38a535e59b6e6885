//! Single authority for the active mode and the unit pool.
//!
//! The controller owns every funnel, spawns one staggered task per live
//! unit when a mode is entered, cancels all outstanding tasks before any
//! transition, and auto-reverts transient attack modes to standby once the
//! last task finishes.

use serde::Serialize;

use crate::config::{SwarmConfig, WorldFrame};
use crate::error::Result;
use crate::hooks::SwarmContext;
use crate::modes::ModeState;
use crate::placement::PlacementAllocator;
use crate::task::{FunnelTask, TaskKind, TaskStatus};
use crate::unit::Funnel;

/// Read-only state summary for scripting and telemetry layers.
#[derive(Debug, Clone, Serialize)]
pub struct SwarmSnapshot {
    pub mode: ModeState,
    pub enabled: bool,
    pub live_units: usize,
    pub running_tasks: usize,
    pub completed_attacks: u32,
    pub destroyed_during_attack: u32,
    pub placement_fallbacks: u64,
}

/// Orchestrator owning the funnel pool and the mode machine.
pub struct SwarmController {
    config: SwarmConfig,
    pool: Vec<Funnel>,
    tasks: Vec<FunnelTask>,
    allocator: PlacementAllocator,
    mode: ModeState,
    enabled: bool,
    completed_attacks: u32,
    destroyed_during_attack: u32,
    phase_pool_size: usize,
}

impl SwarmController {
    /// Build a controller over a fixed unit pool. Units are never spawned
    /// after this point, only pruned on death.
    pub fn new(
        frame: WorldFrame,
        config: SwarmConfig,
        units: Vec<Funnel>,
        seed: u64,
    ) -> Result<Self> {
        frame.validate()?;
        config.validate()?;
        let allocator = PlacementAllocator::new(frame, &config, seed);
        Ok(Self {
            config,
            pool: units,
            tasks: Vec::new(),
            allocator,
            mode: ModeState::Default,
            enabled: false,
            completed_attacks: 0,
            destroyed_during_attack: 0,
            phase_pool_size: 0,
        })
    }

    // =========================================================================
    // Scripted control surface
    // =========================================================================

    /// Enable or disable the whole swarm. The only entry point that can
    /// activate the system from a disabled state; enabling forces standby,
    /// disabling forces the terminal off mode. No-op when unchanged.
    pub fn enable(&mut self, flag: bool) {
        if self.enabled == flag {
            return;
        }
        self.enabled = flag;
        if flag {
            self.transition(ModeState::StandBy);
        } else {
            self.transition(ModeState::Default);
        }
    }

    /// Ignored while disabled or already attacking.
    pub fn request_attack(&mut self) {
        if !self.enabled || self.mode == ModeState::AttackPattern {
            return;
        }
        self.transition(ModeState::AttackPattern);
    }

    /// Scripted named-attack phase with completion/destruction counters.
    /// Ignored while disabled or already in the phase.
    pub fn request_activate(&mut self) {
        if !self.enabled || self.mode == ModeState::Activate {
            return;
        }
        self.transition(ModeState::Activate);
    }

    /// Ignored while disabled.
    pub fn request_stand_by(&mut self) {
        if !self.enabled {
            return;
        }
        self.transition(ModeState::StandBy);
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advance the whole swarm by one simulation step.
    ///
    /// Order within the tick: prune dead units, advance tasks, then
    /// evaluate auto-revert for transient modes.
    pub fn update(&mut self, ctx: &mut SwarmContext<'_>, dt: f32) {
        self.prune_dead();

        let counting = self.mode == ModeState::Activate;
        let mut finished = Vec::new();
        for (i, task) in self.tasks.iter_mut().enumerate() {
            let tick = task.advance(ctx, &mut self.allocator, &self.config, dt);
            if counting && tick.fired {
                self.completed_attacks += 1;
            }
            if tick.status == TaskStatus::Done {
                if counting && tick.died && !task.has_fired() {
                    self.destroyed_during_attack += 1;
                }
                finished.push(i);
            }
        }
        for i in finished.into_iter().rev() {
            self.tasks.swap_remove(i);
        }

        if self.mode.is_transient() && self.tasks.is_empty() {
            log::debug!("all {} tasks finished, reverting to standby", self.mode_name());
            self.transition(ModeState::StandBy);
        }
    }

    // =========================================================================
    // Read-only surface
    // =========================================================================

    pub fn mode(&self) -> ModeState {
        self.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn units(&self) -> &[Funnel] {
        &self.pool
    }

    pub fn running_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Units that fired during the current/most recent Activate phase.
    pub fn completed_attacks(&self) -> u32 {
        self.completed_attacks
    }

    /// Units destroyed before firing during the current/most recent
    /// Activate phase.
    pub fn destroyed_during_attack(&self) -> u32 {
        self.destroyed_during_attack
    }

    /// Pool size captured when the current Activate phase began.
    pub fn phase_pool_size(&self) -> usize {
        self.phase_pool_size
    }

    pub fn placement_fallbacks(&self) -> u64 {
        self.allocator.fallback_count()
    }

    pub fn snapshot(&self) -> SwarmSnapshot {
        SwarmSnapshot {
            mode: self.mode,
            enabled: self.enabled,
            live_units: self.pool.len(),
            running_tasks: self.tasks.len(),
            completed_attacks: self.completed_attacks,
            destroyed_during_attack: self.destroyed_during_attack,
            placement_fallbacks: self.allocator.fallback_count(),
        }
    }

    // =========================================================================
    // Mode machine internals
    // =========================================================================

    /// Full exit-then-enter cycle: cancel every outstanding task of the
    /// outgoing mode before the new mode spawns anything.
    fn transition(&mut self, next: ModeState) {
        let previous = self.mode;
        log::info!("mode transition: {:?} -> {:?}", previous, next);
        self.exit_mode();
        self.mode = next;
        self.enter_mode();
    }

    fn exit_mode(&mut self) {
        self.cancel_all_tasks();
    }

    fn enter_mode(&mut self) {
        match self.mode {
            ModeState::Default => {
                for unit in &self.pool {
                    unit.set_active(false);
                }
            }
            ModeState::StandBy => {
                self.spawn_tasks(TaskKind::StandBy);
            }
            ModeState::AttackPattern => {
                self.spawn_tasks(TaskKind::Attack);
            }
            ModeState::Activate => {
                self.completed_attacks = 0;
                self.destroyed_during_attack = 0;
                self.phase_pool_size = self.pool.len();
                self.spawn_tasks(TaskKind::Attack);
            }
        }
    }

    /// One task per live unit, started with an index-proportional stagger
    /// so the formation does not move in lockstep.
    fn spawn_tasks(&mut self, kind: TaskKind) {
        debug_assert!(self.tasks.is_empty(), "outgoing tasks not cancelled");
        for (index, unit) in self.pool.iter().enumerate() {
            let delay = index as f32 * self.config.stagger_secs;
            log::debug!("spawning {:?} task for unit {} (delay {:.2}s)", kind, unit.id(), delay);
            self.tasks.push(FunnelTask::new(unit.clone(), kind, delay));
        }
    }

    /// Synchronous cancellation: abandoned moves are simply dropped, but
    /// ledger entries are released so nothing stale leaks into the next
    /// mode's separation checks.
    fn cancel_all_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            self.allocator.release(task.unit().id());
        }
    }

    /// Remove units whose health handle reports death; runs before task
    /// advancement and auto-revert evaluation every tick.
    fn prune_dead(&mut self) {
        let allocator = &mut self.allocator;
        self.pool.retain(|unit| {
            if unit.is_dead() {
                log::debug!("pruning dead unit {}", unit.id());
                allocator.release(unit.id());
                false
            } else {
                true
            }
        });
    }

    fn mode_name(&self) -> &'static str {
        match self.mode {
            ModeState::Default => "Default",
            ModeState::StandBy => "StandBy",
            ModeState::AttackPattern => "AttackPattern",
            ModeState::Activate => "Activate",
        }
    }
}
