//! Общие helpers для integration тестов
#![allow(dead_code)]

use bevy::prelude::*;
use squadlink_simulation::authority::LoopbackHub;
use squadlink_simulation::combat::Combatant;
use squadlink_simulation::movement::Mover;
use squadlink_simulation::{create_session, AgentId, ParticipantId, SimulationConfig};

pub const HOST: ParticipantId = ParticipantId(1);
pub const GUEST: ParticipantId = ParticipantId(2);

/// Конфиг без idle-wander смещения: агенты стоят на месте пока нет приказа
pub fn still_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.motion.max_distance = 0.0;
    config
}

pub fn solo_session(config: SimulationConfig, seed: u64) -> (App, LoopbackHub) {
    let hub = LoopbackHub::new();
    let app = create_session(HOST, Box::new(hub.connect(HOST)), config, seed);
    (app, hub)
}

/// Host + guest на одном LoopbackHub
pub fn paired_sessions(config: SimulationConfig) -> (App, App, LoopbackHub) {
    let hub = LoopbackHub::new();
    let host = create_session(HOST, Box::new(hub.connect(HOST)), config.clone(), 11);
    let guest = create_session(GUEST, Box::new(hub.connect(GUEST)), config, 12);
    (host, guest, hub)
}

pub fn combatant(app: &App, entity: Entity) -> Combatant {
    app.world()
        .get::<Combatant>(entity)
        .cloned()
        .expect("agent has no Combatant")
}

pub fn mover(app: &App, entity: Entity) -> Mover {
    app.world().get::<Mover>(entity).cloned().expect("agent has no Mover")
}

pub fn state_of(app: &App, agent: AgentId) -> String {
    squadlink_simulation::telemetry::current_state_name(app.world(), agent).expect("agent is not registered")
}
