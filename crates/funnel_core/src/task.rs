//! Per-unit resumable routines.
//!
//! A task is a state-holding object advanced once per simulation step. It
//! suspends after every incremental movement step, every fixed wait, and
//! every watch-loop poll, and it can be dropped (cancelled) or unwind on
//! unit death at any of those points.

use crate::config::SwarmConfig;
use crate::geometry::{bearing_to, look_at};
use crate::hooks::SwarmContext;
use crate::motion::{FaceMode, MoveTo, RotateTo};
use crate::placement::PlacementAllocator;
use crate::unit::Funnel;

/// Choreography a task runs for its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Travel to the holding plane, align to the apex, then watch and fire
    /// on the tracked target until the mode changes.
    StandBy,
    /// Master plane → forward plane (aiming) → pause → fire → return →
    /// align; terminates when back in formation.
    Attack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Done,
}

/// Result of advancing a task by one simulation step.
#[derive(Debug, Clone, Copy)]
pub struct TaskTick {
    pub status: TaskStatus,
    /// The unit fired a shot this step.
    pub fired: bool,
    /// The task unwound because its unit died. Reported exactly once, on
    /// the step the death was observed.
    pub died: bool,
}

impl TaskTick {
    fn running() -> Self {
        Self { status: TaskStatus::Running, fired: false, died: false }
    }

    fn done() -> Self {
        Self { status: TaskStatus::Done, fired: false, died: false }
    }

    fn died() -> Self {
        Self { status: TaskStatus::Done, fired: false, died: true }
    }
}

enum Phase {
    /// Index-proportional start delay; nothing moves until it elapses.
    Stagger { remaining: f32 },
    // standby choreography
    TravelToHold(MoveTo),
    AlignApex(RotateTo),
    Watch { probe_in: f32, cooldown: f32 },
    // attack choreography
    ToMaster(MoveTo),
    ToForward(MoveTo),
    HoldFire { remaining: f32 },
    ReturnToHold(MoveTo),
    FinalAlign(RotateTo),
    Finished,
}

/// Independently advancing routine bound to one unit.
pub struct FunnelTask {
    unit: Funnel,
    kind: TaskKind,
    phase: Phase,
    fired: bool,
}

impl FunnelTask {
    pub fn new(unit: Funnel, kind: TaskKind, start_delay: f32) -> Self {
        Self { unit, kind, phase: Phase::Stagger { remaining: start_delay }, fired: false }
    }

    pub fn unit(&self) -> &Funnel {
        &self.unit
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Whether this task has fired its shot (attack) or any shot (standby).
    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Advance one simulation step.
    ///
    /// Death is checked on entry so a unit dying at any suspension point
    /// unwinds immediately without completing its remaining steps.
    pub fn advance(
        &mut self,
        ctx: &mut SwarmContext<'_>,
        alloc: &mut PlacementAllocator,
        config: &SwarmConfig,
        dt: f32,
    ) -> TaskTick {
        if self.unit.is_dead() {
            log::debug!("unit {} died mid-task, unwinding", self.unit.id());
            return TaskTick::died();
        }

        match &mut self.phase {
            Phase::Stagger { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    self.begin(ctx, alloc, config);
                }
                TaskTick::running()
            }

            Phase::TravelToHold(mv) => {
                if mv.step(&self.unit, None, dt) {
                    self.phase = Phase::AlignApex(self.align_to_apex(alloc, config));
                }
                TaskTick::running()
            }

            Phase::AlignApex(rot) => {
                if rot.step(&self.unit, dt) {
                    self.phase =
                        Phase::Watch { probe_in: config.watch_interval_secs, cooldown: 0.0 };
                }
                TaskTick::running()
            }

            Phase::Watch { probe_in, cooldown } => {
                *cooldown = (*cooldown - dt).max(0.0);
                *probe_in -= dt;
                if *probe_in > 0.0 {
                    return TaskTick::running();
                }
                *probe_in += config.watch_interval_secs;

                let ready = *cooldown <= 0.0;
                if ready && self.target_in_probe(ctx, config) {
                    self.fire(ctx);
                    if let Phase::Watch { cooldown, .. } = &mut self.phase {
                        *cooldown = config.attack_cooldown_secs;
                    }
                    return TaskTick { status: TaskStatus::Running, fired: true, died: false };
                }
                TaskTick::running()
            }

            Phase::ToMaster(mv) => {
                if mv.step(&self.unit, None, dt) {
                    let depth = alloc.frame().depth_offset;
                    let position = alloc.allocate(-depth, self.unit.id(), ctx.collision);
                    let start = self.unit.orientation();
                    let total_distance = (position - self.unit.position()).norm();
                    self.phase = Phase::ToForward(MoveTo::new(
                        position,
                        FaceMode::BlendToTarget { start, total_distance },
                        config.arrive_epsilon,
                    ));
                }
                TaskTick::running()
            }

            Phase::ToForward(mv) => {
                let live_target = ctx.target.current_target_position();
                if mv.step(&self.unit, live_target, dt) {
                    self.phase = Phase::HoldFire { remaining: config.attack_pause_secs };
                }
                TaskTick::running()
            }

            Phase::HoldFire { remaining } => {
                *remaining -= dt;
                if *remaining > 0.0 {
                    return TaskTick::running();
                }
                self.fire(ctx);
                let depth = alloc.frame().depth_offset;
                let position = alloc.allocate(depth, self.unit.id(), ctx.collision);
                self.phase = Phase::ReturnToHold(MoveTo::new(
                    position,
                    FaceMode::TrackPoint(alloc.apex()),
                    config.arrive_epsilon,
                ));
                TaskTick { status: TaskStatus::Running, fired: true, died: false }
            }

            Phase::ReturnToHold(mv) => {
                if mv.step(&self.unit, None, dt) {
                    self.phase = Phase::FinalAlign(self.align_to_apex(alloc, config));
                }
                TaskTick::running()
            }

            Phase::FinalAlign(rot) => {
                if rot.step(&self.unit, dt) {
                    self.phase = Phase::Finished;
                    return TaskTick::done();
                }
                TaskTick::running()
            }

            Phase::Finished => TaskTick::done(),
        }
    }

    /// Set up the first movement once the stagger delay elapses.
    fn begin(
        &mut self,
        ctx: &mut SwarmContext<'_>,
        alloc: &mut PlacementAllocator,
        config: &SwarmConfig,
    ) {
        self.unit.set_active(true);
        ctx.cues.on_task_start(self.unit.id());
        let depth = alloc.frame().depth_offset;
        match self.kind {
            TaskKind::StandBy => {
                let position = alloc.allocate(depth, self.unit.id(), ctx.collision);
                self.phase = Phase::TravelToHold(MoveTo::new(
                    position,
                    FaceMode::TrackPoint(alloc.apex()),
                    config.arrive_epsilon,
                ));
            }
            TaskKind::Attack => {
                let position = alloc.allocate(0.0, self.unit.id(), ctx.collision);
                self.phase = Phase::ToMaster(MoveTo::new(
                    position,
                    FaceMode::Travel,
                    config.arrive_epsilon,
                ));
            }
        }
    }

    fn align_to_apex(&self, alloc: &PlacementAllocator, config: &SwarmConfig) -> RotateTo {
        let target = look_at(&self.unit.position(), &alloc.apex())
            .unwrap_or_else(|| self.unit.orientation());
        RotateTo::new(target, config.align_epsilon_rad)
    }

    /// Forward probe: target present, within range, inside the probe cone.
    fn target_in_probe(&self, ctx: &SwarmContext<'_>, config: &SwarmConfig) -> bool {
        let Some(target) = ctx.target.current_target_position() else {
            return false;
        };
        let position = self.unit.position();
        if (target - position).norm() > config.probe_range {
            return false;
        }
        match bearing_to(&position, &self.unit.orientation(), &target) {
            Some(bearing) => bearing <= config.probe_half_angle_rad,
            None => false,
        }
    }

    fn fire(&mut self, ctx: &mut SwarmContext<'_>) {
        self.fired = true;
        let body = self.unit.body().borrow();
        ctx.projectiles.fire_from(self.unit.id(), &body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldFrame;
    use crate::testing::{
        make_test_unit_with_health, CountingCue, FixedTarget, NoCollision, RecordingSpawner,
    };
    use nalgebra::Point3;

    struct Harness {
        alloc: PlacementAllocator,
        config: SwarmConfig,
        target: FixedTarget,
        spawner: RecordingSpawner,
        cues: CountingCue,
    }

    impl Harness {
        fn new(target: Option<Point3<f32>>) -> Self {
            let config = SwarmConfig::default();
            Self {
                alloc: PlacementAllocator::new(WorldFrame::default(), &config, 99),
                config,
                target: FixedTarget::new(target),
                spawner: RecordingSpawner::default(),
                cues: CountingCue::default(),
            }
        }

        fn advance(&mut self, task: &mut FunnelTask, dt: f32) -> TaskTick {
            let mut ctx = SwarmContext {
                target: &self.target,
                collision: &NoCollision,
                projectiles: &mut self.spawner,
                cues: &mut self.cues,
            };
            task.advance(&mut ctx, &mut self.alloc, &self.config, dt)
        }

        fn run(&mut self, task: &mut FunnelTask, ticks: usize, dt: f32) -> TaskTick {
            let mut last = TaskTick::running();
            for _ in 0..ticks {
                last = self.advance(task, dt);
                if last.status == TaskStatus::Done {
                    break;
                }
            }
            last
        }
    }

    #[test]
    fn test_standby_task_settles_on_holding_plane() {
        let mut h = Harness::new(None);
        let unit = make_test_unit_with_health(0, Point3::origin(), 10.0).0;
        let mut task = FunnelTask::new(unit.clone(), TaskKind::StandBy, 0.0);

        let tick = h.run(&mut task, 400, 0.05);
        // standby never terminates on its own
        assert_eq!(tick.status, TaskStatus::Running);
        let holding_z = h.alloc.frame().center.z + h.alloc.frame().depth_offset;
        assert!((unit.position().z - holding_z).abs() < 1e-4);
        assert_eq!(h.cues.count(), 1);
    }

    #[test]
    fn test_standby_watch_fires_within_cone_and_cooldown() {
        let mut h = Harness::new(None);
        let unit = make_test_unit_with_health(0, Point3::origin(), 10.0).0;
        let mut task = FunnelTask::new(unit.clone(), TaskKind::StandBy, 0.0);

        // settle into the holding formation with no target around
        h.run(&mut task, 400, 0.05);
        assert_eq!(h.spawner.count(), 0);

        // park the target straight down the unit's probe ray
        let fwd = crate::geometry::forward(&unit.orientation());
        h.target.set(Some(unit.position() + fwd * 10.0));
        h.run(&mut task, 200, 0.05);

        let shots = h.spawner.count();
        assert!(shots >= 1, "watch loop should have fired");
        // 2s per-unit cooldown over 10s of watching caps the volley
        assert!(shots <= 6, "cooldown not applied: {} shots", shots);
    }

    #[test]
    fn test_standby_watch_ignores_out_of_range_target() {
        let mut h = Harness::new(Some(Point3::new(0.0, 0.0, 200.0)));
        let unit = make_test_unit_with_health(0, Point3::origin(), 10.0).0;
        let mut task = FunnelTask::new(unit, TaskKind::StandBy, 0.0);
        h.run(&mut task, 600, 0.05);
        assert_eq!(h.spawner.count(), 0);
    }

    #[test]
    fn test_attack_task_fires_once_and_terminates() {
        let mut h = Harness::new(Some(Point3::new(0.0, 0.0, -12.0)));
        let unit = make_test_unit_with_health(0, Point3::origin(), 10.0).0;
        let mut task = FunnelTask::new(unit.clone(), TaskKind::Attack, 0.0);

        let tick = h.run(&mut task, 600, 0.05);
        assert_eq!(tick.status, TaskStatus::Done);
        assert!(!tick.died);
        assert!(task.has_fired());
        assert_eq!(h.spawner.count(), 1);
        // ends back on the holding plane
        let holding_z = h.alloc.frame().center.z + h.alloc.frame().depth_offset;
        assert!((unit.position().z - holding_z).abs() < 1e-4);
    }

    #[test]
    fn test_attack_task_fires_even_without_target() {
        let mut h = Harness::new(None);
        let unit = make_test_unit_with_health(0, Point3::origin(), 10.0).0;
        let mut task = FunnelTask::new(unit, TaskKind::Attack, 0.0);
        let tick = h.run(&mut task, 600, 0.05);
        assert_eq!(tick.status, TaskStatus::Done);
        assert_eq!(h.spawner.count(), 1);
    }

    #[test]
    fn test_death_unwinds_before_firing() {
        let mut h = Harness::new(Some(Point3::new(0.0, 0.0, -12.0)));
        let (unit, health) = make_test_unit_with_health(0, Point3::origin(), 10.0);
        let mut task = FunnelTask::new(unit, TaskKind::Attack, 0.0);

        // a few steps in, still traveling
        for _ in 0..5 {
            h.advance(&mut task, 0.05);
        }
        health.kill();
        let tick = h.advance(&mut task, 0.05);
        assert_eq!(tick.status, TaskStatus::Done);
        assert!(tick.died);
        assert!(!task.has_fired());
        assert_eq!(h.spawner.count(), 0);
    }

    #[test]
    fn test_stagger_delays_first_move() {
        let mut h = Harness::new(None);
        let unit = make_test_unit_with_health(0, Point3::origin(), 10.0).0;
        let mut task = FunnelTask::new(unit.clone(), TaskKind::StandBy, 0.5);

        for _ in 0..5 {
            h.advance(&mut task, 0.05);
        }
        assert_eq!(unit.position(), Point3::origin());
        assert_eq!(h.cues.count(), 0);

        for _ in 0..10 {
            h.advance(&mut task, 0.05);
        }
        assert_eq!(h.cues.count(), 1);
    }

    #[test]
    fn test_task_for_already_dead_unit_ends_immediately() {
        let mut h = Harness::new(None);
        let (unit, health) = make_test_unit_with_health(1, Point3::origin(), 5.0);
        health.kill();
        let mut task = FunnelTask::new(unit, TaskKind::Attack, 0.0);
        let tick = h.advance(&mut task, 0.05);
        assert_eq!(tick.status, TaskStatus::Done);
        assert!(tick.died);
        assert!(!tick.fired);
        assert_eq!(h.cues.count(), 0, "no motion cue for a dead unit");
    }
}
