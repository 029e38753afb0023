//! Spawner interface: регистрация агентов, replicas, authority transfer, despawn
//!
//! Lifecycle юнита на holder'е:
//! register_agent → (ticks) → HealthLedger.dead → despawn_dead_agents
//! (AgentDied, registry release, Despawn broadcast).

use bevy::prelude::*;

use crate::authority::{
    wire::encode, LocalParticipant, NetworkLink, ReplicatedState, SpawnRecord, WireMessage,
};
use crate::combat::Combatant;
use crate::command::{AgentRegistry, RegistryEntry};
use crate::components::{
    Agent, AgentKind, AgentName, Authority, Classification, LayerMask, LocallyOwned, Position, Replica,
};
use crate::config::SimulationConfig;
use crate::error::AuthorityError;
use crate::health::{AgentDied, HealthLedger};
use crate::logger;
use crate::movement::Mover;
use crate::sensor::{ContactRegion, ContactTracking, Sensor};
use crate::shared::{AgentId, ParticipantId, SimClock, SimTime, TeamId};

#[derive(Debug, Clone, PartialEq)]
pub struct AgentSpawn {
    pub team: TeamId,
    /// Начальный authority holder (если не мы - authority сразу передаётся)
    pub holder: ParticipantId,
    pub position: Vec2,
    pub kind: AgentKind,
}

impl AgentSpawn {
    pub fn unit(team: TeamId, holder: ParticipantId, position: Vec2) -> Self {
        Self {
            team,
            holder,
            position,
            kind: AgentKind::Unit,
        }
    }

    pub fn avatar(team: TeamId, holder: ParticipantId, position: Vec2) -> Self {
        Self {
            team,
            holder,
            position,
            kind: AgentKind::Avatar,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentHandle {
    pub id: AgentId,
    pub entity: Entity,
    pub name: String,
}

/// RegisterAgent(id, team, initialAuthorityHolder)
pub fn register_agent(world: &mut World, spawn: AgentSpawn) -> AgentHandle {
    let local = world.resource::<LocalParticipant>().0;
    let config = world.resource::<SimulationConfig>().clone();

    let (id, name) = {
        let mut registry = world.resource_mut::<AgentRegistry>();
        let id = registry.allocate_id(local);
        let name = match spawn.kind {
            AgentKind::Unit => registry.acquire_name(id),
            AgentKind::Avatar => format!("Avatar_{}", spawn.holder),
        };
        (id, name)
    };

    let agent = Agent {
        id,
        team: spawn.team,
    };
    let mut entity_commands = world.spawn((
        agent,
        Position(spawn.position),
        Authority { holder: local },
        LocallyOwned,
        AgentName(name.clone()),
    ));
    match spawn.kind {
        AgentKind::Unit => {
            entity_commands.insert((
                Classification(LayerMask::UNITS),
                ContactRegion {
                    radius: config.sensor.contact_radius,
                },
                HealthLedger::from_config(&config.health),
            ));
            entity_commands.insert(behaviors(&config, spawn.position));
        }
        AgentKind::Avatar => {
            entity_commands.insert(Classification(LayerMask::AVATARS));
        }
    }
    let entity = entity_commands.id();

    world.resource_mut::<AgentRegistry>().insert(
        id,
        RegistryEntry {
            entity,
            holder: local,
            team: spawn.team,
            name: name.clone(),
            kind: spawn.kind,
        },
    );

    let health = world.get::<HealthLedger>(entity).map(|ledger| ledger.snapshot());
    broadcast(
        world,
        WireMessage::Spawned(SpawnRecord {
            agent: id,
            name: name.clone(),
            team: spawn.team,
            holder: local,
            kind: spawn.kind,
            position: spawn.position.to_array(),
            health,
        }),
    );
    logger::log_info(&format!(
        "🐣 registered {} '{}' ({:?}, {}) at {:?}",
        id, name, spawn.kind, spawn.team, spawn.position
    ));

    if spawn.holder != local {
        if let Err(err) = transfer_authority(world, id, spawn.holder) {
            logger::log_error(&format!("initial authority transfer of {} failed: {}", id, err));
        }
    }

    AgentHandle { id, entity, name }
}

/// UnregisterAgent(id): только holder
pub fn unregister_agent(world: &mut World, id: AgentId) -> Result<(), AuthorityError> {
    let local = world.resource::<LocalParticipant>().0;
    let holder = world
        .resource::<AgentRegistry>()
        .holder(id)
        .ok_or(AuthorityError::UnknownAgent(id))?;
    if holder != local {
        return Err(AuthorityError::NotHolder {
            agent: id,
            local,
            holder,
        });
    }

    if let Some(entry) = world.resource_mut::<AgentRegistry>().remove(id) {
        world.despawn(entry.entity);
        logger::log_info(&format!("👋 unregistered {} '{}'", id, entry.name));
    }
    broadcast(world, WireMessage::Despawn { agent: id });
    Ok(())
}

/// Передать authority другому участнику (только текущий holder)
pub fn transfer_authority(world: &mut World, id: AgentId, new_holder: ParticipantId) -> Result<(), AuthorityError> {
    let local = world.resource::<LocalParticipant>().0;
    let registry = world.resource::<AgentRegistry>();
    let holder = registry.holder(id).ok_or(AuthorityError::UnknownAgent(id))?;
    let entity = registry.entity(id).ok_or(AuthorityError::UnknownAgent(id))?;
    if holder != local {
        return Err(AuthorityError::NotHolder {
            agent: id,
            local,
            holder,
        });
    }
    if new_holder == local {
        return Ok(());
    }

    let now = world.resource::<SimClock>().now();
    let replicated = world.get::<Combatant>(entity).map(|combatant| ReplicatedState {
        state_name: combatant.state.name().to_string(),
        lock_until: now + SimTime::from(combatant.remaining_lock(now)),
    });

    world.resource_mut::<AgentRegistry>().set_holder(id, new_holder);
    if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
        entity_mut
            .remove::<(LocallyOwned, Combatant, Mover, Sensor, ContactTracking)>()
            .insert((Replica, Authority { holder: new_holder }));
        if let Some(replicated) = replicated {
            entity_mut.insert(replicated);
        }
    }

    broadcast(world, WireMessage::AuthorityTransferred { agent: id, holder: new_holder });
    logger::log_info(&format!("🔑 authority of {} transferred {} → {}", id, local, new_holder));
    Ok(())
}

/// Observer: AuthorityTransferred пришёл по сети
pub fn accept_authority_transfer(world: &mut World, id: AgentId, new_holder: ParticipantId) {
    let local = world.resource::<LocalParticipant>().0;
    let config = world.resource::<SimulationConfig>().clone();
    let mut registry = world.resource_mut::<AgentRegistry>();
    let Some(entry) = registry.get(id).cloned() else {
        logger::log_warning(&format!("⚠️ authority transfer for unknown {} ignored", id));
        return;
    };
    registry.set_holder(id, new_holder);

    let Ok(mut entity_mut) = world.get_entity_mut(entry.entity) else {
        return;
    };
    entity_mut.insert(Authority { holder: new_holder });

    if new_holder != local {
        return;
    }

    // Мы новый holder: replica → полноценный агент, поведение с Wander
    let position = entity_mut.get::<Position>().map(|p| p.0).unwrap_or_default();
    entity_mut.remove::<(Replica, ReplicatedState)>().insert(LocallyOwned);
    if entry.kind == AgentKind::Unit {
        entity_mut.insert(behaviors(&config, position));
        if !entity_mut.contains::<ContactRegion>() {
            entity_mut.insert(ContactRegion {
                radius: config.sensor.contact_radius,
            });
        }
        if !entity_mut.contains::<HealthLedger>() {
            entity_mut.insert(HealthLedger::from_config(&config.health));
        }
    }
    logger::log_info(&format!("🔑 {} now holds {} '{}'", local, id, entry.name));
}

/// Observer: Spawned пришёл по сети → read-only replica
pub fn spawn_replica(world: &mut World, record: &SpawnRecord) {
    if world.resource::<AgentRegistry>().contains(record.agent) {
        return;
    }
    let config = world.resource::<SimulationConfig>().clone();

    let layers = match record.kind {
        AgentKind::Unit => LayerMask::UNITS,
        AgentKind::Avatar => LayerMask::AVATARS,
    };
    let mut entity_mut = world.spawn((
        Agent {
            id: record.agent,
            team: record.team,
        },
        Position(Vec2::from(record.position)),
        Authority {
            holder: record.holder,
        },
        Replica,
        AgentName(record.name.clone()),
        Classification(layers),
    ));
    if record.kind == AgentKind::Unit {
        entity_mut.insert((
            ContactRegion {
                radius: config.sensor.contact_radius,
            },
            ReplicatedState {
                state_name: "Wander".to_string(),
                lock_until: 0.0,
            },
        ));
    }
    if let Some(health) = &record.health {
        entity_mut.insert(HealthLedger::from_snapshot(health, config.health.regen_interval));
    }
    let entity = entity_mut.id();

    world.resource_mut::<AgentRegistry>().insert(
        record.agent,
        RegistryEntry {
            entity,
            holder: record.holder,
            team: record.team,
            name: record.name.clone(),
            kind: record.kind,
        },
    );
    logger::log(&format!("🪞 replica of {} '{}' (held by {})", record.agent, record.name, record.holder));
}

/// Observer: Despawn пришёл по сети
pub fn despawn_replica(world: &mut World, id: AgentId) {
    let Some(entity) = world.resource::<AgentRegistry>().entity(id) else {
        return;
    };
    if world.get::<LocallyOwned>(entity).is_some() {
        logger::log_error(&format!("🚫 remote Despawn for locally owned {} rejected", id));
        return;
    }
    world.resource_mut::<AgentRegistry>().remove(id);
    world.despawn(entity);
    logger::log(&format!("🪞 replica of {} removed", id));
}

/// System: death → teardown (TickSet::Lifecycle)
///
/// Ledger умирает ровно один раз, entity исчезает в этом же тике,
/// поэтому AgentDied эмитится ровно один раз.
pub fn despawn_dead_agents(
    mut commands: Commands,
    mut registry: ResMut<AgentRegistry>,
    link: Res<NetworkLink>,
    mut died: EventWriter<AgentDied>,
    agents: Query<(Entity, &Agent, &HealthLedger), With<LocallyOwned>>,
) {
    let mut dead: Vec<(Entity, Agent)> = agents
        .iter()
        .filter(|(_, _, ledger)| ledger.is_dead())
        .map(|(entity, agent, _)| (entity, *agent))
        .collect();
    dead.sort_by_key(|(_, agent)| agent.id);

    for (entity, agent) in dead {
        let name = registry
            .remove(agent.id)
            .map(|entry| entry.name)
            .unwrap_or_default();
        commands.entity(entity).despawn();

        match encode(&WireMessage::Despawn { agent: agent.id }) {
            Ok(bytes) => {
                if let Err(err) = link.transport().broadcast(bytes) {
                    logger::log_warning(&format!("⚠️ despawn broadcast for {} failed: {}", agent.id, err));
                }
            }
            Err(err) => logger::log_error(&format!("despawn encode failed: {}", err)),
        }

        logger::log_info(&format!("⚰️ {} '{}' torn down", agent.id, name));
        died.write(AgentDied {
            agent: agent.id,
            team: agent.team,
            name,
        });
    }
}

/// Поведенческие capability-компоненты юнита (только у holder'а)
fn behaviors(config: &SimulationConfig, position: Vec2) -> (Sensor, Mover, Combatant) {
    (
        Sensor::from_config(&config.sensor),
        Mover::new(config.motion.move_speed, position),
        Combatant::default(),
    )
}

fn broadcast(world: &World, message: WireMessage) {
    let sent = encode(&message).and_then(|bytes| world.resource::<NetworkLink>().transport().broadcast(bytes));
    if let Err(err) = sent {
        logger::log_warning(&format!("⚠️ broadcast failed: {}", err));
    }
}
