//! Sensor systems (holder only)

use bevy::prelude::*;
use std::collections::HashSet;

use super::components::{ContactRegion, ContactTracking, Sensor};
use super::detection::{detect_target, Candidate, Observer};
use super::{ProximityEvent, SensorReport};
use crate::components::{Agent, Classification, Facing, LayerMask, LocallyOwned, Obstacle, Position};
use crate::health::HealthLedger;
use crate::logger;
use crate::shared::AgentId;

pub fn candidate_from(
    agent: &Agent,
    position: &Position,
    class: Option<&Classification>,
    health: Option<&HealthLedger>,
) -> Candidate {
    Candidate {
        id: agent.id,
        team: agent.team,
        position: position.0,
        layers: class.map(|c| c.0).unwrap_or(LayerMask::UNITS),
        alive: health.map(|h| !h.is_dead()).unwrap_or(true),
    }
}

/// Все агенты мира как кандидаты, отсортированные по AgentId (стабильный scan order)
pub fn gather_candidates(world: &mut World) -> Vec<Candidate> {
    let mut query = world.query::<(&Agent, &Position, Option<&Classification>, Option<&HealthLedger>)>();
    let mut candidates: Vec<Candidate> = query
        .iter(world)
        .map(|(agent, position, class, health)| candidate_from(agent, position, class, health))
        .collect();
    candidates.sort_by_key(|c| c.id);
    candidates
}

pub fn gather_obstacles(world: &mut World) -> Vec<Obstacle> {
    let mut query = world.query::<&Obstacle>();
    query.iter(world).copied().collect()
}

/// Свежий scan одного агента по текущему состоянию мира (для AttackNearest)
pub fn scan_nearest(world: &mut World, entity: Entity) -> Option<AgentId> {
    let candidates = gather_candidates(world);
    let obstacles = gather_obstacles(world);

    let mut query = world.query::<(&Agent, &Position, &Facing, &Sensor)>();
    let (agent, position, facing, sensor) = query.get(world, entity).ok()?;
    let observer = Observer {
        id: agent.id,
        team: agent.team,
        position: position.0,
        facing: facing.0,
    };
    detect_target(&observer, sensor, &candidates, &obstacles)
}

/// System: contact tracking (enter/exit diff overlaps с врагами)
///
/// Contact flag = есть хотя бы один активный overlap с агентом другой команды.
pub fn track_contacts(
    mut sensors: Query<
        (&Agent, &Position, &ContactRegion, &mut Sensor, &mut ContactTracking),
        With<LocallyOwned>,
    >,
    others: Query<(&Agent, &Position, Option<&ContactRegion>, Option<&HealthLedger>)>,
    mut proximity_events: EventWriter<ProximityEvent>,
) {
    for (agent, position, region, mut sensor, mut tracking) in sensors.iter_mut() {
        let current: HashSet<AgentId> = others
            .iter()
            .filter(|(other, _, _, health)| {
                other.id != agent.id
                    && agent.is_hostile_to(other)
                    && health.map(|h| !h.is_dead()).unwrap_or(true)
            })
            .filter(|(_, other_pos, other_region, _)| {
                let reach = region.radius + other_region.map(|r| r.radius).unwrap_or(0.0);
                position.0.distance(other_pos.0) <= reach
            })
            .map(|(other, _, _, _)| other.id)
            .collect();

        if current == tracking.overlapping {
            continue;
        }

        let mut entered: Vec<AgentId> = current.difference(&tracking.overlapping).copied().collect();
        let mut exited: Vec<AgentId> = tracking.overlapping.difference(&current).copied().collect();
        entered.sort();
        exited.sort();

        for other in entered {
            logger::log(&format!("🤜 {} contact ENTER with {}", agent.id, other));
            proximity_events.write(ProximityEvent::Entered {
                observer: agent.id,
                other,
            });
        }
        for other in exited {
            logger::log(&format!("🫲 {} contact EXIT with {}", agent.id, other));
            proximity_events.write(ProximityEvent::Exited {
                observer: agent.id,
                other,
            });
        }

        sensor.set_contact(!current.is_empty());
        tracking.overlapping = current;
    }
}

/// System: refresh nearest target, SensorReport при смене
pub fn refresh_sensor_targets(
    mut sensors: Query<(&Agent, &Position, &Facing, &mut Sensor), With<LocallyOwned>>,
    candidates: Query<(&Agent, &Position, Option<&Classification>, Option<&HealthLedger>)>,
    obstacles: Query<&Obstacle>,
    mut reports: EventWriter<SensorReport>,
) {
    let mut snapshot: Vec<Candidate> = candidates
        .iter()
        .map(|(agent, position, class, health)| candidate_from(agent, position, class, health))
        .collect();
    snapshot.sort_by_key(|c| c.id);
    let obstacles: Vec<Obstacle> = obstacles.iter().copied().collect();

    for (agent, position, facing, mut sensor) in sensors.iter_mut() {
        let observer = Observer {
            id: agent.id,
            team: agent.team,
            position: position.0,
            facing: facing.0,
        };
        let nearest = detect_target(&observer, &sensor, &snapshot, &obstacles);
        let previous = sensor.nearest();
        if nearest == previous {
            continue;
        }

        if let Some(lost) = previous {
            reports.write(SensorReport::TargetLost {
                observer: agent.id,
                target: lost,
            });
        }
        if let Some(acquired) = nearest {
            logger::log(&format!("👁️ {} spotted {}", agent.id, acquired));
            reports.write(SensorReport::TargetAcquired {
                observer: agent.id,
                target: acquired,
            });
        }
        sensor.set_nearest(nearest);
    }
}
