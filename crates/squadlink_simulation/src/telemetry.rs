//! Telemetry queries
//!
//! Read-only, работают и на holder'е, и на observers (через replicas).

use bevy::prelude::*;

use crate::authority::ReplicatedState;
use crate::combat::Combatant;
use crate::command::AgentRegistry;
use crate::health::{HealthLedger, HealthSnapshot};
use crate::shared::{AgentId, SimClock};

/// CurrentStateName(agent)
pub fn current_state_name(world: &World, id: AgentId) -> Option<String> {
    let entity = world.resource::<AgentRegistry>().entity(id)?;
    if let Some(combatant) = world.get::<Combatant>(entity) {
        return Some(combatant.state.name().to_string());
    }
    if let Some(replicated) = world.get::<ReplicatedState>(entity) {
        return Some(replicated.state_name.clone());
    }
    Some("Avatar".to_string())
}

/// RemainingLockTime(agent): max(follow lock, reaggro block), 0 если нет
pub fn remaining_lock_time(world: &World, id: AgentId) -> Option<f32> {
    let entity = world.resource::<AgentRegistry>().entity(id)?;
    let clock = world.resource::<SimClock>();
    if let Some(combatant) = world.get::<Combatant>(entity) {
        return Some(combatant.remaining_lock(clock.now()));
    }
    Some(
        world
            .get::<ReplicatedState>(entity)
            .map(|replicated| clock.remaining(replicated.lock_until))
            .unwrap_or(0.0),
    )
}

pub fn health_snapshot(world: &World, id: AgentId) -> Option<HealthSnapshot> {
    let entity = world.resource::<AgentRegistry>().entity(id)?;
    world.get::<HealthLedger>(entity).map(HealthLedger::snapshot)
}

pub fn position_of(world: &World, id: AgentId) -> Option<Vec2> {
    let entity = world.resource::<AgentRegistry>().entity(id)?;
    world.get::<crate::components::Position>(entity).map(|p| p.0)
}

/// Стабильный digest всех агентов мира (проверка детерминизма)
///
/// Сортировка по AgentId, Debug-форматирование: два одинаковых прогона
/// дают побайтово одинаковую строку.
pub fn world_digest(world: &mut World) -> String {
    let mut query = world.query::<(
        &crate::components::Agent,
        &crate::components::Position,
        Option<&Combatant>,
        Option<&HealthLedger>,
    )>();
    let mut rows: Vec<_> = query
        .iter(world)
        .map(|(agent, position, combatant, ledger)| {
            (
                agent.id,
                format!(
                    "{} {:?} {:?} {:?}",
                    agent.id,
                    position.0,
                    combatant.map(|c| &c.state),
                    ledger.map(HealthLedger::snapshot)
                ),
            )
        })
        .collect();
    rows.sort_by_key(|(id, _)| *id);
    rows.into_iter().map(|(_, row)| row).collect::<Vec<_>>().join("\n")
}
