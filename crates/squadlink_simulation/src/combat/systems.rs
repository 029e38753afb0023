//! CombatCoordinator systems (holder only)

use bevy::prelude::*;

use super::coordinator::{request_transition, Body, Transition};
use super::state::{CombatState, Combatant, FollowGoal, PRIORITY_COMMAND};
use super::AttackLanded;
use crate::authority::{Directive, DirectiveOp, LocalParticipant, PendingDirectives};
use crate::command::AgentRegistry;
use crate::components::{Agent, LocallyOwned, Position, Velocity};
use crate::config::SimulationConfig;
use crate::health::HealthLedger;
use crate::logger;
use crate::movement::Mover;
use crate::sensor::Sensor;
use crate::shared::SimClock;

/// System: валидация целей (unresolved / dead / abandon radius / point reached)
///
/// Любой провал → Wander (arms reaggro block).
pub fn resolve_targets(
    clock: Res<SimClock>,
    config: Res<SimulationConfig>,
    registry: Res<AgentRegistry>,
    mut combatants: Query<
        (&Agent, &Position, &mut Combatant, Option<&mut Mover>, &mut Velocity),
        With<LocallyOwned>,
    >,
    others: Query<(&Position, Option<&HealthLedger>)>,
) {
    let now = clock.now();

    for (agent, position, mut combatant, mut mover, mut velocity) in combatants.iter_mut() {
        let state = combatant.state.clone();
        let lookup = |id| {
            registry
                .entity(id)
                .and_then(|entity| others.get(entity).ok())
                .filter(|(_, health)| !health.is_some_and(|h| h.is_dead()))
                .map(|(pos, _)| pos.0)
        };

        let (reason, anchor) = match &state {
            CombatState::PursueHostile { target } | CombatState::Attacking { target } => match lookup(*target) {
                None => (format!("target {} lost", target), None),
                Some(target_pos) if position.0.distance(target_pos) > config.combat.pursuit_abandon_radius => (
                    format!("target {} beyond abandon radius", target),
                    None,
                ),
                Some(_) => continue,
            },
            CombatState::FollowDirective {
                goal: FollowGoal::Leader(leader),
            } => match lookup(*leader) {
                None => (format!("leader {} lost", leader), None),
                Some(_) => continue,
            },
            CombatState::FollowDirective {
                goal: FollowGoal::Point { label, position: point },
            } => {
                if position.0.distance(*point) > config.motion.arrive_epsilon {
                    continue;
                }
                (format!("reached {}", label), Some(*point))
            }
            CombatState::Wander => continue,
        };

        let mut body = Body {
            agent: agent.id,
            position: position.0,
            combatant: &mut *combatant,
            mover: mover.as_deref_mut(),
            velocity: &mut *velocity,
        };
        logger::log(&format!("🎯 {}: {}", agent.id, reason));
        let applied = request_transition(&mut body, CombatState::Wander, PRIORITY_COMMAND, now, &config);

        // Дошли до точки - wander вокруг неё
        if applied == Transition::Applied {
            if let (Some(point), Some(mover)) = (anchor, body.mover.as_deref_mut()) {
                mover.anchor = point;
            }
        }
    }
}

/// System: attack cycle
///
/// - PursueHostile + contact flag → Attacking (старт cooldown)
/// - Attacking + cooldown истёк → PursueHostile; если цель жива -
///   ApplyDamage и следом ReactToAttack через AuthorityGate
pub fn run_attack_cycle(
    clock: Res<SimClock>,
    config: Res<SimulationConfig>,
    registry: Res<AgentRegistry>,
    local: Res<LocalParticipant>,
    mut pending: ResMut<PendingDirectives>,
    mut landed: EventWriter<AttackLanded>,
    mut combatants: Query<
        (&Agent, &Position, &mut Combatant, Option<&Sensor>, Option<&mut Mover>, &mut Velocity),
        With<LocallyOwned>,
    >,
    ledgers: Query<&HealthLedger>,
) {
    let now = clock.now();
    let damage = config.combat.damage;

    for (agent, position, mut combatant, sensor, mut mover, mut velocity) in combatants.iter_mut() {
        let state = combatant.state.clone();
        let mut body = Body {
            agent: agent.id,
            position: position.0,
            combatant: &mut *combatant,
            mover: mover.as_deref_mut(),
            velocity: &mut *velocity,
        };

        match state {
            CombatState::PursueHostile { target } => {
                if !sensor.is_some_and(|s| s.can_hit()) {
                    continue;
                }
                let started = request_transition(
                    &mut body,
                    CombatState::Attacking { target },
                    PRIORITY_COMMAND,
                    now,
                    &config,
                );
                if started == Transition::Applied {
                    logger::log(&format!(
                        "⚔️ {} swings at {} (cooldown {:.1})",
                        agent.id, target, config.combat.speed_attack
                    ));
                }
            }
            CombatState::Attacking { target } => {
                if !body.combatant.cooldown_elapsed(now) {
                    continue;
                }
                request_transition(
                    &mut body,
                    CombatState::PursueHostile { target },
                    PRIORITY_COMMAND,
                    now,
                    &config,
                );

                let target_alive = registry
                    .entity(target)
                    .and_then(|entity| ledgers.get(entity).ok())
                    .is_some_and(|ledger| !ledger.is_dead());
                if !target_alive {
                    continue;
                }

                pending.push(Directive {
                    target,
                    op: DirectiveOp::ApplyDamage {
                        amount: damage,
                        source: Some(agent.id),
                    },
                    issuer: local.0,
                });
                // Реакция всегда следом за уроном: holder цели сам отбросит её, если удар убил
                pending.push(Directive {
                    target,
                    op: DirectiveOp::ReactToAttack {
                        attacker: agent.id,
                        force_chase: false,
                    },
                    issuer: local.0,
                });
                landed.write(AttackLanded {
                    attacker: agent.id,
                    target,
                    damage,
                });
            }
            CombatState::Wander | CombatState::FollowDirective { .. } => {}
        }
    }
}
