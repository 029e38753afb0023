//! Replication: inbound wire messages, directive flush, outbound snapshots
//!
//! Holder → observers:
//! - `Snapshot::Health` сразу при изменении HealthLedger
//! - `Snapshot::Agent` каждые `snapshot_interval` тиков
//! Observers ничего не считают сами - только применяют snapshots.

use bevy::prelude::*;

use super::directive::PendingDirectives;
use super::gate::AuthorityGate;
use super::transport::NetworkLink;
use super::wire::{decode, encode, AgentSnapshot, Snapshot, WireMessage};
use crate::combat::Combatant;
use crate::command::AgentRegistry;
use crate::components::{Agent, Facing, LocallyOwned, Position, Velocity};
use crate::config::SimulationConfig;
use crate::health::HealthLedger;
use crate::logger;
use crate::shared::{SimClock, SimTime};
use crate::spawn;

/// Поведенческое состояние replica (из последнего snapshot)
#[derive(Component, Debug, Clone, PartialEq)]
pub struct ReplicatedState {
    pub state_name: String,
    /// Локальное время окончания lock window (snapshot lock_remaining + время получения)
    pub lock_until: SimTime,
}

/// Exclusive system: разобрать входящие сообщения (TickSet::Inbound)
pub fn receive_wire_messages(world: &mut World) {
    let inbound = world.resource::<NetworkLink>().transport().drain();

    for bytes in inbound {
        let message = match decode(&bytes) {
            Ok(message) => message,
            Err(err) => {
                logger::log_warning(&format!("⚠️ dropping malformed wire message: {}", err));
                continue;
            }
        };

        match message {
            WireMessage::Directive(directive) => {
                if let Err(err) = AuthorityGate::receive(world, directive) {
                    logger::log(&format!("inbound directive not applied: {}", err));
                }
            }
            WireMessage::Snapshot(snapshot) => apply_snapshot(world, snapshot),
            WireMessage::Spawned(record) => spawn::spawn_replica(world, &record),
            WireMessage::Despawn { agent } => spawn::despawn_replica(world, agent),
            WireMessage::AuthorityTransferred { agent, holder } => {
                spawn::accept_authority_transfer(world, agent, holder)
            }
        }
    }
}

fn apply_snapshot(world: &mut World, snapshot: Snapshot) {
    let agent = match &snapshot {
        Snapshot::Agent(s) => s.agent,
        Snapshot::Health { agent, .. } => *agent,
    };
    let Some(entity) = world.resource::<AgentRegistry>().entity(agent) else {
        logger::log(&format!("snapshot for unknown {} skipped", agent));
        return;
    };
    // Holder не принимает чужие snapshots своего агента (гонка с transfer)
    if world.get::<LocallyOwned>(entity).is_some() {
        return;
    }

    let now = world.resource::<SimClock>().now();
    let Ok(mut replica) = world.get_entity_mut(entity) else {
        return;
    };

    match snapshot {
        Snapshot::Agent(s) => {
            replica.insert((
                Position(Vec2::from(s.position)),
                Velocity(Vec2::from(s.velocity)),
                Facing(Vec2::from(s.facing)),
                ReplicatedState {
                    state_name: s.state_name,
                    lock_until: now + SimTime::from(s.lock_remaining),
                },
            ));
            if let Some(health) = s.health {
                if let Some(mut ledger) = replica.get_mut::<HealthLedger>() {
                    ledger.apply_snapshot(&health);
                }
            }
        }
        Snapshot::Health { health, .. } => {
            if let Some(mut ledger) = replica.get_mut::<HealthLedger>() {
                ledger.apply_snapshot(&health);
            }
        }
    }
}

/// Exclusive system: прогнать накопленные directives через gate (TickSet::Dispatch)
pub fn flush_pending_directives(world: &mut World) {
    let directives = world.resource_mut::<PendingDirectives>().take();
    for directive in directives {
        if let Err(err) = AuthorityGate::invoke(world, directive) {
            logger::log(&format!("pending directive not delivered: {}", err));
        }
    }
}

/// System: snapshots holder → observers (TickSet::Replicate)
pub fn publish_snapshots(
    clock: Res<SimClock>,
    config: Res<SimulationConfig>,
    link: Res<NetworkLink>,
    changed_health: Query<(&Agent, &HealthLedger), (With<LocallyOwned>, Changed<HealthLedger>)>,
    agents: Query<
        (&Agent, &Position, &Velocity, &Facing, Option<&Combatant>, Option<&HealthLedger>),
        With<LocallyOwned>,
    >,
) {
    let mut outbound = Vec::new();

    let mut health_updates: Vec<_> = changed_health.iter().collect();
    health_updates.sort_by_key(|(agent, _)| agent.id);
    for (agent, ledger) in health_updates {
        outbound.push(WireMessage::Snapshot(Snapshot::Health {
            agent: agent.id,
            health: ledger.snapshot(),
        }));
    }

    if clock.tick() % config.snapshot_interval.max(1) == 0 {
        let now = clock.now();
        let mut periodic: Vec<_> = agents.iter().collect();
        periodic.sort_by_key(|(agent, ..)| agent.id);
        for (agent, position, velocity, facing, combatant, ledger) in periodic {
            outbound.push(WireMessage::Snapshot(Snapshot::Agent(AgentSnapshot {
                agent: agent.id,
                position: position.0.to_array(),
                velocity: velocity.0.to_array(),
                facing: facing.0.to_array(),
                state_name: combatant.map(|c| c.state.name()).unwrap_or("Avatar").to_string(),
                lock_remaining: combatant.map(|c| c.remaining_lock(now)).unwrap_or(0.0),
                health: ledger.map(|l| l.snapshot()),
            })));
        }
    }

    for message in outbound {
        let sent = encode(&message).and_then(|bytes| link.transport().broadcast(bytes));
        if let Err(err) = sent {
            logger::log_warning(&format!("⚠️ snapshot broadcast failed: {}", err));
        }
    }
}
