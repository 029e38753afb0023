//! Directive: intent-level инструкция агенту, маршрутизируемая через AuthorityGate

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::{AgentId, ParticipantId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub target: AgentId,
    pub op: DirectiveOp,
    /// Кто инициировал (оператор или holder атакующего агента)
    pub issuer: ParticipantId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DirectiveOp {
    /// Идти к именованной точке
    MoveTo { label: String, point: [f32; 2] },
    /// Следовать за агентом (аватаром участника)
    Follow { leader: AgentId },
    /// Снять приказ → Wander
    ClearDirective,
    /// Вернуться к патрулю: Wander с новым anchor, атакующий забыт
    Patrol,
    AttackNearest,
    AttackTarget { target: AgentId },
    /// RPC_ReactByAttack
    ReactToAttack { attacker: AgentId, force_chase: bool },
    ApplyDamage { amount: u32, source: Option<AgentId> },
    Heal { amount: u32 },
}

impl DirectiveOp {
    pub fn name(&self) -> &'static str {
        match self {
            DirectiveOp::MoveTo { .. } => "MoveTo",
            DirectiveOp::Follow { .. } => "Follow",
            DirectiveOp::ClearDirective => "ClearDirective",
            DirectiveOp::Patrol => "Patrol",
            DirectiveOp::AttackNearest => "AttackNearest",
            DirectiveOp::AttackTarget { .. } => "AttackTarget",
            DirectiveOp::ReactToAttack { .. } => "ReactToAttack",
            DirectiveOp::ApplyDamage { .. } => "ApplyDamage",
            DirectiveOp::Heal { .. } => "Heal",
        }
    }

    /// HealthLedger операции (остальные идут в CombatCoordinator)
    pub fn is_health_op(&self) -> bool {
        matches!(self, DirectiveOp::ApplyDamage { .. } | DirectiveOp::Heal { .. })
    }
}

/// Результат `AuthorityGate::invoke`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Выполнено локально
    Applied,
    /// Выполнено локально, но ничего не изменило (duplicate / stale / dead target)
    Ignored,
    /// Priority conflict, переход отклонён
    Refused,
    /// Отправлено holder'у (fire-and-forget)
    Forwarded,
}

/// Directives, накопленные системами за тик; `flush_pending_directives` прогоняет их через gate
#[derive(Resource, Debug, Default)]
pub struct PendingDirectives {
    queue: Vec<Directive>,
}

impl PendingDirectives {
    pub fn push(&mut self, directive: Directive) {
        self.queue.push(directive);
    }

    pub fn take(&mut self) -> Vec<Directive> {
        std::mem::take(&mut self.queue)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_ops_bypass_coordinator() {
        assert!(DirectiveOp::ApplyDamage {
            amount: 1,
            source: None
        }
        .is_health_op());
        assert!(DirectiveOp::Heal { amount: 2 }.is_health_op());
        assert!(!DirectiveOp::ReactToAttack {
            attacker: AgentId(3),
            force_chase: false
        }
        .is_health_op());
        assert!(!DirectiveOp::ClearDirective.is_health_op());
    }
}
