//! Scenario-level tests driving the whole swarm through scripted phases.

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use nalgebra::Point3;

    use crate::config::{SwarmConfig, WorldFrame};
    use crate::controller::SwarmController;
    use crate::hooks::SwarmContext;
    use crate::modes::ModeState;
    use crate::testing::{
        make_test_unit_with_health, CountingCue, FixedTarget, NoCollision, RecordingSpawner,
        ScriptedHealth,
    };

    fn build_swarm(count: u32) -> (SwarmController, Vec<Rc<ScriptedHealth>>) {
        let mut units = Vec::new();
        let mut healths = Vec::new();
        for id in 0..count {
            let (unit, health) =
                make_test_unit_with_health(id, Point3::new(0.0, 0.0, 0.0), 50.0);
            units.push(unit);
            healths.push(health);
        }
        let controller =
            SwarmController::new(WorldFrame::default(), SwarmConfig::default(), units, 2026)
                .expect("controller init");
        (controller, healths)
    }

    fn run(
        controller: &mut SwarmController,
        target: &FixedTarget,
        spawner: &mut RecordingSpawner,
        cues: &mut CountingCue,
        ticks: usize,
    ) {
        for _ in 0..ticks {
            let mut ctx = SwarmContext {
                target,
                collision: &NoCollision,
                projectiles: &mut *spawner,
                cues: &mut *cues,
            };
            controller.update(&mut ctx, 0.05);
        }
    }

    #[test]
    fn test_full_boss_phase_script() {
        let (mut controller, healths) = build_swarm(6);
        let target = FixedTarget::new(Some(Point3::new(0.0, 0.0, -15.0)));
        let mut spawner = RecordingSpawner::default();
        let mut cues = CountingCue::default();

        // boss scripting turns the swarm on: standby formation forms
        controller.enable(true);
        assert_eq!(controller.mode(), ModeState::StandBy);
        run(&mut controller, &target, &mut spawner, &mut cues, 200);
        assert_eq!(cues.count(), 6, "every unit started its standby move");

        // every unit settled on the holding plane
        let holding_z = WorldFrame::default().center.z + WorldFrame::default().depth_offset;
        for unit in controller.units() {
            assert!((unit.position().z - holding_z).abs() < 0.1);
        }

        // named attack phase: one falls mid-pattern, the rest complete
        controller.request_activate();
        healths[3].kill();
        run(&mut controller, &target, &mut spawner, &mut cues, 1500);

        assert_eq!(controller.mode(), ModeState::StandBy, "phase self-terminated");
        assert_eq!(controller.completed_attacks(), 5);
        assert_eq!(controller.destroyed_during_attack(), 1);
        assert_eq!(controller.units().len(), 5);
        assert_eq!(spawner.count(), 5);

        // scripted shutdown
        controller.enable(false);
        assert_eq!(controller.mode(), ModeState::Default);
        assert_eq!(controller.running_tasks(), 0);
    }

    #[test]
    fn test_counter_consistency_under_heavy_losses() {
        let (mut controller, healths) = build_swarm(5);
        let target = FixedTarget::new(Some(Point3::new(0.0, 0.0, -15.0)));
        let mut spawner = RecordingSpawner::default();
        let mut cues = CountingCue::default();

        controller.enable(true);
        run(&mut controller, &target, &mut spawner, &mut cues, 200);
        controller.request_activate();
        let phase_size = controller.phase_pool_size();

        // stagger the deaths across the choreography
        for (i, health) in healths.iter().enumerate() {
            if i % 2 == 0 {
                health.kill();
            }
            run(&mut controller, &target, &mut spawner, &mut cues, 20);
        }
        run(&mut controller, &target, &mut spawner, &mut cues, 1500);

        let total = controller.completed_attacks() + controller.destroyed_during_attack();
        assert!(total as usize <= phase_size);
        assert_eq!(controller.mode(), ModeState::StandBy);
        // the ones that died before firing never show up in the spawner log
        assert_eq!(spawner.count(), controller.completed_attacks() as usize);
    }

    #[test]
    fn test_mode_switch_mid_attack_cancels_cleanly() {
        let (mut controller, _healths) = build_swarm(4);
        let target = FixedTarget::new(Some(Point3::new(0.0, 0.0, -15.0)));
        let mut spawner = RecordingSpawner::default();
        let mut cues = CountingCue::default();

        controller.enable(true);
        run(&mut controller, &target, &mut spawner, &mut cues, 200);
        controller.request_attack();
        run(&mut controller, &target, &mut spawner, &mut cues, 10);

        // scripted interrupt back to standby mid-choreography
        controller.request_stand_by();
        assert_eq!(controller.mode(), ModeState::StandBy);
        assert_eq!(controller.running_tasks(), 4, "fresh standby tasks spawned");

        // the interrupted attack never completes: units end up back in the
        // holding formation, not on the forward plane
        run(&mut controller, &target, &mut spawner, &mut cues, 600);
        let frame = WorldFrame::default();
        for unit in controller.units() {
            assert!((unit.position().z - (frame.center.z + frame.depth_offset)).abs() < 0.1);
        }
    }

    #[test]
    fn test_determinism_same_seed_same_trajectories() {
        let mut runs = Vec::new();
        for _ in 0..2 {
            let (mut controller, _healths) = build_swarm(4);
            let target = FixedTarget::new(Some(Point3::new(0.0, 0.0, -15.0)));
            let mut spawner = RecordingSpawner::default();
            let mut cues = CountingCue::default();
            controller.enable(true);
            run(&mut controller, &target, &mut spawner, &mut cues, 300);
            controller.request_attack();
            run(&mut controller, &target, &mut spawner, &mut cues, 300);
            let positions: Vec<_> =
                controller.units().iter().map(|u| u.position()).collect();
            runs.push(positions);
        }
        assert_eq!(runs[0], runs[1]);
    }
}
