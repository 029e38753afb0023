//! Детерминизм: одинаковый seed + одинаковые вызовы → побайтово одинаковый мир

mod common;

use bevy::prelude::*;
use common::{solo_session, HOST};
use squadlink_simulation::*;

/// Две команды по три юнита, половина получает AttackEnemy, остальные бродят
fn run_skirmish(seed: u64, ticks: u32) -> String {
    let (mut app, _hub) = solo_session(SimulationConfig::default(), seed);

    let mut squad = Vec::new();
    for i in 0..3 {
        let x = i as f32 * 1.5;
        squad.push(register_agent(app.world_mut(), AgentSpawn::unit(TeamId(1), HOST, Vec2::new(x, 0.0))));
        register_agent(app.world_mut(), AgentSpawn::unit(TeamId(2), HOST, Vec2::new(x, 3.0)));
    }

    run_ticks(&mut app, 5, 0.1);
    for handle in squad.iter().take(2) {
        let _ = CommandRouter::dispatch(app.world_mut(), HOST, &handle.name, "AttackEnemy");
    }
    run_ticks(&mut app, ticks, 0.1);

    telemetry::world_digest(app.world_mut())
}

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;

    let first = run_skirmish(SEED, 300);
    let second = run_skirmish(SEED, 300);
    assert_eq!(first, second, "Симуляция с одинаковым seed ({}) дала разные результаты!", SEED);
}

#[test]
fn test_determinism_multiple_runs() {
    let snapshots: Vec<_> = (0..3).map(|_| run_skirmish(42, 150)).collect();
    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(snapshots[0], *snapshot, "Прогон {} дал результат отличный от прогона 0", i);
    }
}

#[test]
fn test_different_seeds_wander_differently() {
    let wander = |seed| {
        let (mut app, _hub) = solo_session(SimulationConfig::default(), seed);
        register_agent(app.world_mut(), AgentSpawn::unit(TeamId(1), HOST, Vec2::ZERO));
        run_ticks(&mut app, 30, 0.1);
        telemetry::world_digest(app.world_mut())
    };
    assert_ne!(wander(1), wander(2));
}
