//! Motion systems (holder only): plan velocity → integrate position

use bevy::prelude::*;

use super::components::Mover;
use super::steering::{steer, SteeringOutcome, SteeringParams};
use super::wander::wander_step;
use crate::combat::{CombatState, Combatant, FollowGoal};
use crate::command::AgentRegistry;
use crate::components::{Agent, Facing, LocallyOwned, Position, Velocity};
use crate::config::SimulationConfig;
use crate::shared::{AgentId, DeterministicRng, SimClock};

/// System: выбрать velocity по текущему поведенческому состоянию
///
/// - Wander (или агент без Combatant) → idle wander
/// - FollowDirective → seek/flee blend к точке или к лидеру
/// - PursueHostile / Attacking → чистый seek к цели (движение не ждёт cooldown)
pub fn plan_motion(
    clock: Res<SimClock>,
    config: Res<SimulationConfig>,
    registry: Res<AgentRegistry>,
    mut rng: ResMut<DeterministicRng>,
    mut movers: Query<
        (&Agent, &Position, &mut Velocity, &mut Mover, Option<&mut Combatant>),
        With<LocallyOwned>,
    >,
    positions: Query<&Position>,
) {
    let dt = clock.delta();
    let now = clock.now();
    let motion = &config.motion;

    let position_of = |id: AgentId| -> Option<Vec2> {
        let entity = registry.entity(id)?;
        positions.get(entity).ok().map(|p| p.0)
    };

    for (_agent, position, mut velocity, mut mover, mut combatant) in movers.iter_mut() {
        let state = combatant.as_ref().map(|c| c.state.clone()).unwrap_or_default();

        let directed = match &state {
            CombatState::Wander => {
                velocity.0 = wander_step(&mut mover, position.0, dt, motion, &mut rng.rng);
                continue;
            }
            CombatState::FollowDirective { goal } => {
                let flee_from = combatant
                    .as_ref()
                    .and_then(|c| c.last_attacker)
                    .and_then(|attacker| position_of(attacker));
                match goal {
                    FollowGoal::Point { position: point, .. } => Some((
                        *point,
                        flee_from,
                        SteeringParams::from_config(motion, mover.move_speed, motion.arrive_epsilon),
                    )),
                    FollowGoal::Leader(leader) => position_of(*leader).map(|leader_pos| {
                        (
                            leader_pos,
                            flee_from,
                            SteeringParams::from_config(motion, mover.move_speed, motion.stop_radius_leader),
                        )
                    }),
                }
            }
            CombatState::PursueHostile { target } | CombatState::Attacking { target } => {
                position_of(*target).map(|target_pos| {
                    (
                        target_pos,
                        None,
                        SteeringParams::from_config(motion, mover.move_speed, motion.stop_radius_enemy),
                    )
                })
            }
        };

        // Цель не резолвится - стоим, coordinator откатит в Wander на следующем Decide
        let Some((target, flee_from, params)) = directed else {
            velocity.0 = Vec2::ZERO;
            continue;
        };

        match steer(position.0, target, flee_from, &params) {
            SteeringOutcome::Moving(mut desired) => {
                if mover.is_boosted(now) {
                    desired *= motion.boost_multiplier;
                }
                velocity.0 = desired;
            }
            SteeringOutcome::Arrived => {
                velocity.0 = Vec2::ZERO;
                if let Some(combatant) = combatant.as_mut() {
                    if combatant.last_attacker.is_some() {
                        combatant.last_attacker = None;
                    }
                }
            }
        }
    }
}

/// System: position += velocity · dt, facing по направлению движения
pub fn integrate_motion(
    clock: Res<SimClock>,
    mut bodies: Query<(&mut Position, &Velocity, &mut Facing), With<LocallyOwned>>,
) {
    let dt = clock.delta();
    if dt <= 0.0 {
        return;
    }

    for (mut position, velocity, mut facing) in bodies.iter_mut() {
        if velocity.0 == Vec2::ZERO {
            continue;
        }
        position.0 += velocity.0 * dt;
        if let Some(direction) = velocity.0.try_normalize() {
            facing.0 = direction;
        }
    }
}
