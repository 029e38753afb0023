//! Применение behavior directives на holder'е (вызывается AuthorityGate)

use bevy::prelude::*;

use super::coordinator::{engage, react_to_attack, request_transition, Body, ReactionOutcome, Transition};
use super::state::{CombatState, Combatant, FollowGoal, PRIORITY_COMMAND};
use crate::authority::{Directive, DirectiveOp, Dispatch};
use crate::command::AgentRegistry;
use crate::components::{Agent, LocallyOwned, Position, Velocity};
use crate::config::SimulationConfig;
use crate::health::HealthLedger;
use crate::logger;
use crate::movement::Mover;
use crate::sensor;
use crate::shared::{AgentId, SimClock, SimTime};

/// Цель directive, заранее разрешённая через registry / sensor
enum Resolved {
    Target(AgentId),
    Missing,
}

pub fn apply_behavior_directive(world: &mut World, entity: Entity, directive: &Directive) -> Dispatch {
    let now = world.resource::<SimClock>().now();
    let config = world.resource::<SimulationConfig>().clone();

    if world.get::<HealthLedger>(entity).is_some_and(|ledger| ledger.is_dead()) {
        logger::log(&format!("{} is dead, {} ignored", directive.target, directive.op.name()));
        return Dispatch::Ignored;
    }

    // Всё, что требует world scan, резолвим до заимствования компонентов
    let resolved = match &directive.op {
        DirectiveOp::AttackNearest => match sensor::scan_nearest(world, entity) {
            Some(target) => Resolved::Target(target),
            None => Resolved::Missing,
        },
        DirectiveOp::AttackTarget { target } | DirectiveOp::Follow { leader: target } => {
            if world.resource::<AgentRegistry>().contains(*target) {
                Resolved::Target(*target)
            } else {
                Resolved::Missing
            }
        }
        _ => Resolved::Missing,
    };

    let mut query = world.query_filtered::<
        (&Agent, &Position, &mut Combatant, Option<&mut Mover>, &mut Velocity),
        With<LocallyOwned>,
    >();
    let Ok((agent, position, mut combatant, mut mover, mut velocity)) = query.get_mut(world, entity) else {
        logger::log_warning(&format!(
            "{} has no local CombatCoordinator, {} dropped",
            directive.target,
            directive.op.name()
        ));
        return Dispatch::Ignored;
    };

    let mut body = Body {
        agent: agent.id,
        position: position.0,
        combatant: &mut *combatant,
        mover: mover.as_deref_mut(),
        velocity: &mut *velocity,
    };

    // Новый приказ (или его снятие) забывает последнего атакующего: flee больше не от кого
    if matches!(
        directive.op,
        DirectiveOp::MoveTo { .. } | DirectiveOp::Follow { .. } | DirectiveOp::ClearDirective | DirectiveOp::Patrol
    ) {
        body.combatant.last_attacker = None;
    }

    let transition = match &directive.op {
        DirectiveOp::MoveTo { label, point } => {
            let goal = FollowGoal::Point {
                label: label.clone(),
                position: Vec2::from(*point),
            };
            request_transition(&mut body, CombatState::FollowDirective { goal }, PRIORITY_COMMAND, now, &config)
        }
        DirectiveOp::Follow { leader } => match resolved {
            Resolved::Target(_) => request_transition(
                &mut body,
                CombatState::FollowDirective {
                    goal: FollowGoal::Leader(*leader),
                },
                PRIORITY_COMMAND,
                now,
                &config,
            ),
            Resolved::Missing => fall_back_to_wander(&mut body, "leader", *leader, now, &config),
        },
        DirectiveOp::ClearDirective | DirectiveOp::Patrol => {
            request_transition(&mut body, CombatState::Wander, PRIORITY_COMMAND, now, &config)
        }
        DirectiveOp::AttackNearest => match resolved {
            Resolved::Target(target) => engage(&mut body, target, PRIORITY_COMMAND, now, &config),
            Resolved::Missing => {
                logger::log_warning(&format!("{} has no hostile in sight, back to Wander", body.agent));
                request_transition(&mut body, CombatState::Wander, PRIORITY_COMMAND, now, &config)
            }
        },
        DirectiveOp::AttackTarget { target } => match resolved {
            Resolved::Target(_) => engage(&mut body, *target, PRIORITY_COMMAND, now, &config),
            Resolved::Missing => fall_back_to_wander(&mut body, "attack target", *target, now, &config),
        },
        DirectiveOp::ReactToAttack { attacker, force_chase } => {
            return match react_to_attack(&mut body, *attacker, *force_chase, now, &config) {
                ReactionOutcome::Engaged
                | ReactionOutcome::HeldByFollowLock
                | ReactionOutcome::HeldByReaggroBlock => Dispatch::Applied,
                ReactionOutcome::AlreadyEngaged => Dispatch::Ignored,
                ReactionOutcome::Refused => Dispatch::Refused,
            };
        }
        DirectiveOp::ApplyDamage { .. } | DirectiveOp::Heal { .. } => {
            logger::log_error(&format!("{} routed to CombatCoordinator", directive.op.name()));
            return Dispatch::Ignored;
        }
    };

    match transition {
        Transition::Applied => Dispatch::Applied,
        Transition::Refused => Dispatch::Refused,
    }
}

/// Unresolved reference → Wander + warning
fn fall_back_to_wander(
    body: &mut Body,
    what: &str,
    missing: AgentId,
    now: SimTime,
    config: &SimulationConfig,
) -> Transition {
    logger::log_warning(&format!(
        "{}: {} {} is not registered, back to Wander",
        body.agent, what, missing
    ));
    request_transition(body, CombatState::Wander, PRIORITY_COMMAND, now, config)
}
