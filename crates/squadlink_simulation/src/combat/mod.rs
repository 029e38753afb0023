//! CombatCoordinator: Wander / FollowDirective / PursueHostile / Attacking
//!
//! Порядок выполнения (TickSet::Decide):
//! 1. resolve_targets - unresolved / dead / abandon radius / point reached → Wander
//! 2. run_attack_cycle - contact → Attacking, cooldown → damage + reaction
//!
//! Операторские и межагентные directives применяются через AuthorityGate
//! (`directives::apply_behavior_directive`).

use bevy::prelude::*;

pub mod coordinator;
pub mod directives;
pub mod state;
pub mod systems;

#[cfg(test)]
mod coordinator_tests;

pub use coordinator::{engage, react_to_attack, request_transition, Body, ReactionOutcome, Transition};
pub use state::{CombatState, Combatant, FollowGoal, PRIORITY_COMMAND, PRIORITY_REACTION};

use crate::schedule::TickSet;
use crate::shared::AgentId;

/// Cooldown завершился и удар отправлен через gate
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AttackLanded {
    pub attacker: AgentId,
    pub target: AgentId,
    pub damage: u32,
}

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AttackLanded>().add_systems(
            Update,
            (systems::resolve_targets, systems::run_attack_cycle)
                .chain()
                .in_set(TickSet::Decide),
        );
    }
}
