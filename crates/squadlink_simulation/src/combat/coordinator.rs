//! CombatCoordinator: переходы состояний, lock windows, реакция на атаку
//!
//! Работает над `Body` (заимствованные компоненты одного агента), поэтому
//! одинаково вызывается из систем и из AuthorityGate (exclusive world access).

use bevy::prelude::*;

use super::state::{CombatState, Combatant, PRIORITY_REACTION};
use crate::components::Velocity;
use crate::config::SimulationConfig;
use crate::logger;
use crate::movement::Mover;
use crate::shared::{AgentId, SimTime};

/// Заимствованные компоненты одного агента на holder'е
pub struct Body<'a> {
    pub agent: AgentId,
    pub position: Vec2,
    pub combatant: &'a mut Combatant,
    pub mover: Option<&'a mut Mover>,
    pub velocity: &'a mut Velocity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// Priority conflict: текущее состояние важнее и не прерываемо
    Refused,
}

/// Чем закончилась реакция на атаку
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOutcome {
    /// Переход в PursueHostile против атакующего
    Engaged,
    /// Уже преследуем/атакуем этого атакующего
    AlreadyEngaged,
    /// FollowDirective под follow lock: запомнили атакующего + speed boost
    HeldByFollowLock,
    /// Reaggro block после отменённого боя: только запомнили атакующего
    HeldByReaggroBlock,
    Refused,
}

/// Запрос перехода с priority rule и side effects входа в состояние
///
/// - → FollowDirective: arm follow lock
/// - → Wander: arm reaggro block, wander re-anchor на текущей позиции
/// - → Attacking: старт attack cooldown
/// - из Wander в directed: wander suspended, velocity = 0
pub fn request_transition(
    body: &mut Body,
    next: CombatState,
    priority: u8,
    now: SimTime,
    config: &SimulationConfig,
) -> Transition {
    if !body.combatant.accepts(priority) {
        logger::log_info(&format!(
            "⛔ {} refused {} → {} (priority {} < {}, non-interruptible)",
            body.agent,
            body.combatant.state.name(),
            next.name(),
            priority,
            body.combatant.state.priority()
        ));
        return Transition::Refused;
    }

    let previous = std::mem::replace(&mut body.combatant.state, next);
    match &body.combatant.state {
        CombatState::Wander => {
            body.combatant
                .arm_reaggro_block(now, config.combat.reaggro_block_duration);
            if let Some(mover) = body.mover.as_deref_mut() {
                mover.resume(body.position);
            }
        }
        CombatState::FollowDirective { .. } => {
            body.combatant
                .arm_follow_lock(now, config.combat.follow_lock_duration);
        }
        CombatState::Attacking { .. } => {
            body.combatant.attack_cooldown_until = now + SimTime::from(config.combat.speed_attack);
        }
        CombatState::PursueHostile { .. } => {}
    }

    if body.combatant.state != CombatState::Wander {
        if let Some(mover) = body.mover.as_deref_mut() {
            if !mover.is_suspended() {
                mover.suspend(body.velocity);
            }
        }
    }

    if previous.name() != body.combatant.state.name() {
        logger::log(&format!(
            "🧠 {} {} → {}",
            body.agent,
            previous.name(),
            body.combatant.state.name()
        ));
    }
    Transition::Applied
}

/// Начать преследование (attack directive или реакция) + speed boost на старте боя
pub fn engage(
    body: &mut Body,
    target: AgentId,
    priority: u8,
    now: SimTime,
    config: &SimulationConfig,
) -> Transition {
    let result = request_transition(body, CombatState::PursueHostile { target }, priority, now, config);
    if result == Transition::Applied {
        if let Some(mover) = body.mover.as_deref_mut() {
            mover.boost(now, config.motion.boost_duration);
        }
    }
    result
}

/// Реакция на атаку (anti-oscillation policy)
///
/// 1. уже воюем с этим атакующим → ничего не меняем
/// 2. FollowDirective под follow lock → держим приказ, flee от атакующего + boost
/// 3. reaggro block → держим текущее состояние, только запоминаем атакующего
/// 4. иначе → PursueHostile против атакующего
///
/// `force_chase` пропускает шаги 2 и 3.
pub fn react_to_attack(
    body: &mut Body,
    attacker: AgentId,
    force_chase: bool,
    now: SimTime,
    config: &SimulationConfig,
) -> ReactionOutcome {
    if body.combatant.state.target() == Some(attacker) {
        return ReactionOutcome::AlreadyEngaged;
    }

    if !force_chase {
        let following = matches!(body.combatant.state, CombatState::FollowDirective { .. });
        if following && body.combatant.is_follow_locked(now) {
            body.combatant.last_attacker = Some(attacker);
            if let Some(mover) = body.mover.as_deref_mut() {
                mover.boost(now, config.motion.boost_duration);
            }
            logger::log(&format!(
                "🛡️ {} attacked by {} under follow lock ({:.2}s left), keeping order",
                body.agent,
                attacker,
                body.combatant.follow_lock_until - now
            ));
            return ReactionOutcome::HeldByFollowLock;
        }

        if body.combatant.is_reaggro_blocked(now) {
            body.combatant.last_attacker = Some(attacker);
            logger::log(&format!(
                "⏳ {} attacked by {} during reaggro block, staying in {}",
                body.agent,
                attacker,
                body.combatant.state.name()
            ));
            return ReactionOutcome::HeldByReaggroBlock;
        }
    }

    body.combatant.last_attacker = Some(attacker);
    match engage(body, attacker, PRIORITY_REACTION, now, config) {
        Transition::Applied => ReactionOutcome::Engaged,
        Transition::Refused => ReactionOutcome::Refused,
    }
}
