//! Combat state machine: CombatState, FollowGoal, Combatant
//!
//! Priority / interruptibility:
//!
//! | State           | priority | interruptible |
//! |-----------------|----------|---------------|
//! | Wander          | 0        | yes           |
//! | PursueHostile   | 1        | yes           |
//! | FollowDirective | 2        | yes           |
//! | Attacking       | 2        | no            |
//!
//! Запрос отклоняется только если priority текущего состояния строго выше
//! priority запроса И текущее состояние non-interruptible.

use bevy::prelude::*;

use crate::shared::{AgentId, SimTime};

/// Priority реакции на атаку (RPC_ReactByAttack)
pub const PRIORITY_REACTION: u8 = 1;
/// Priority операторских команд и внутренних bookkeeping переходов
pub const PRIORITY_COMMAND: u8 = 3;

/// Куда ведёт FollowDirective
#[derive(Debug, Clone, PartialEq)]
pub enum FollowGoal {
    /// Именованная точка (Point_Base / Point_Mid / Point_Lair)
    Point { label: String, position: Vec2 },
    /// Аватар участника, отдавшего команду
    Leader(AgentId),
}

/// Поведенческое состояние агента (ровно одно активное)
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CombatState {
    #[default]
    Wander,
    FollowDirective {
        goal: FollowGoal,
    },
    PursueHostile {
        target: AgentId,
    },
    /// Sub-state PursueHostile пока идёт attack cooldown
    Attacking {
        target: AgentId,
    },
}

impl CombatState {
    pub fn name(&self) -> &'static str {
        match self {
            CombatState::Wander => "Wander",
            CombatState::FollowDirective { .. } => "FollowDirective",
            CombatState::PursueHostile { .. } => "PursueHostile",
            CombatState::Attacking { .. } => "Attacking",
        }
    }

    pub fn priority(&self) -> u8 {
        match self {
            CombatState::Wander => 0,
            CombatState::PursueHostile { .. } => 1,
            CombatState::FollowDirective { .. } => 2,
            CombatState::Attacking { .. } => 2,
        }
    }

    pub fn is_interruptible(&self) -> bool {
        !matches!(self, CombatState::Attacking { .. })
    }

    /// Враг, которого преследуем/атакуем
    pub fn target(&self) -> Option<AgentId> {
        match self {
            CombatState::PursueHostile { target } | CombatState::Attacking { target } => Some(*target),
            _ => None,
        }
    }
}

/// CombatCoordinator state агента
///
/// Все таймеры - абсолютные deadlines на `SimClock`; re-arm только вперёд.
#[derive(Component, Debug, Clone, Default)]
pub struct Combatant {
    pub state: CombatState,
    /// Weak reference на последнего атакующего (flee source)
    pub last_attacker: Option<AgentId>,
    pub follow_lock_until: SimTime,
    pub reaggro_block_until: SimTime,
    pub attack_cooldown_until: SimTime,
}

impl Combatant {
    /// Priority rule: отказ только если текущее строго важнее и не прерываемо
    pub fn accepts(&self, priority: u8) -> bool {
        !(self.state.priority() > priority && !self.state.is_interruptible())
    }

    pub fn arm_follow_lock(&mut self, now: SimTime, duration: f32) {
        self.follow_lock_until = self.follow_lock_until.max(now + SimTime::from(duration));
    }

    pub fn arm_reaggro_block(&mut self, now: SimTime, duration: f32) {
        self.reaggro_block_until = self.reaggro_block_until.max(now + SimTime::from(duration));
    }

    pub fn is_follow_locked(&self, now: SimTime) -> bool {
        now < self.follow_lock_until
    }

    pub fn is_reaggro_blocked(&self, now: SimTime) -> bool {
        now < self.reaggro_block_until
    }

    pub fn cooldown_elapsed(&self, now: SimTime) -> bool {
        now >= self.attack_cooldown_until
    }

    /// Максимум из оставшихся lock windows (0 если ни один не активен)
    pub fn remaining_lock(&self, now: SimTime) -> f32 {
        (self.follow_lock_until - now)
            .max(self.reaggro_block_until - now)
            .max(0.0) as f32
    }
}
