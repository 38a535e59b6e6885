//! Headless driver for the funnel swarm core.
//!
//! Runs a scripted boss phase without any engine attached: builds a unit
//! pool from simple scripted collaborators, ticks the controller, and
//! prints a JSON snapshot at the end. Useful for eyeballing mode
//! transitions and counters with `RUST_LOG=debug`.

use anyhow::Result;
use clap::Parser;
use nalgebra::Point3;
use std::rc::Rc;

use funnel_core::testing::{
    CountingCue, FixedTarget, NoCollision, RecordingSpawner, ScriptedHealth,
};
use funnel_core::{
    body_handle, Funnel, SwarmConfig, SwarmContext, SwarmController, WorldFrame,
};

#[derive(Parser)]
#[command(name = "funnel_cli")]
#[command(about = "Run a scripted funnel swarm phase headlessly", long_about = None)]
struct Cli {
    /// Number of funnel units in the pool
    #[arg(long, default_value_t = 6)]
    units: u32,

    /// Placement RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Simulation steps to run
    #[arg(long, default_value_t = 1200)]
    ticks: u64,

    /// Seconds of simulated time per step
    #[arg(long, default_value_t = 0.05)]
    dt: f32,

    /// Tick at which the scripted attack phase starts
    #[arg(long, default_value_t = 200)]
    attack_at: u64,

    /// Use the counting Activate phase instead of plain AttackPattern
    #[arg(long)]
    activate: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let units: Vec<Funnel> = (0..cli.units)
        .map(|id| {
            let health = Rc::new(ScriptedHealth::new(100.0));
            Funnel::new(
                id,
                body_handle(Point3::new(id as f32 * 0.5, 0.0, 0.0)),
                health,
                6.0,
                std::f32::consts::PI,
            )
        })
        .collect();

    let mut controller =
        SwarmController::new(WorldFrame::default(), SwarmConfig::default(), units, cli.seed)?;

    let target = FixedTarget::new(Some(Point3::new(0.0, 0.0, -15.0)));
    let mut spawner = RecordingSpawner::default();
    let mut cues = CountingCue::default();

    controller.enable(true);
    for tick in 0..cli.ticks {
        if tick == cli.attack_at {
            if cli.activate {
                controller.request_activate();
            } else {
                controller.request_attack();
            }
        }
        let mut ctx = SwarmContext {
            target: &target,
            collision: &NoCollision,
            projectiles: &mut spawner,
            cues: &mut cues,
        };
        controller.update(&mut ctx, cli.dt);
    }

    log::info!("{} shots fired over {} ticks", spawner.count(), cli.ticks);
    println!("{}", serde_json::to_string_pretty(&controller.snapshot())?);
    Ok(())
}
