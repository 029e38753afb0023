//! Headless SquadLink demo
//!
//! Два участника в одном процессе через LoopbackHub: host держит юнитов
//! двух команд, гость командует своим отрядом голосовыми командами.

use bevy::prelude::*;
use squadlink_simulation::authority::LoopbackHub;
use squadlink_simulation::{
    create_session, log_info, register_agent, step, telemetry, AgentSpawn, CommandRouter, ParticipantId,
    SimulationConfig, TeamId,
};

const DT: f32 = 0.1;

fn main() {
    let seed = 42;
    let config = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|err| err.to_string())
            .and_then(|text| SimulationConfig::from_toml_str(&text).map_err(|err| err.to_string()))
        {
            Ok(config) => config,
            Err(err) => {
                eprintln!("config {}: {}", path, err);
                std::process::exit(1);
            }
        },
        None => SimulationConfig::default(),
    };

    let host_id = ParticipantId(1);
    let guest_id = ParticipantId(2);
    let hub = LoopbackHub::new();
    let mut host = create_session(host_id, Box::new(hub.connect(host_id)), config.clone(), seed);
    let mut guest = create_session(guest_id, Box::new(hub.connect(guest_id)), config, seed + 1);

    let red = TeamId(1);
    let blue = TeamId(2);
    let squad: Vec<_> = (0..2)
        .map(|i| register_agent(host.world_mut(), AgentSpawn::unit(red, host_id, Vec2::new(i as f32 * 2.0, -4.0))))
        .collect();
    for i in 0..2 {
        register_agent(host.world_mut(), AgentSpawn::unit(blue, host_id, Vec2::new(i as f32 * 2.0, 6.0)));
    }
    register_agent(guest.world_mut(), AgentSpawn::avatar(red, guest_id, Vec2::new(0.0, -6.0)));

    let mut tick = 0u32;
    let mut advance = |host: &mut App, guest: &mut App, ticks: u32| {
        for _ in 0..ticks {
            step(host, DT);
            step(guest, DT);
            tick += 1;
        }
    };

    advance(&mut host, &mut guest, 10);
    let leader = &squad[0].name;
    if CommandRouter::dispatch(guest.world_mut(), guest_id, leader, "FollowMe").is_ok() {
        log_info(&format!("🎙️ guest: '{}, FollowMe'", leader));
    }
    advance(&mut host, &mut guest, 50);
    if CommandRouter::dispatch(guest.world_mut(), guest_id, leader, "AttackEnemy").is_ok() {
        log_info(&format!("🎙️ guest: '{}, AttackEnemy'", leader));
    }
    advance(&mut host, &mut guest, 200);

    for agent in guest.world().resource::<squadlink_simulation::AgentRegistry>().ids() {
        let world = guest.world();
        log_info(&format!(
            "{} state={:?} lock={:?} hp={:?} at {:?}",
            agent,
            telemetry::current_state_name(world, agent),
            telemetry::remaining_lock_time(world, agent),
            telemetry::health_snapshot(world, agent),
            telemetry::position_of(world, agent),
        ));
    }
    println!("Simulation complete after {} ticks", tick);
}
