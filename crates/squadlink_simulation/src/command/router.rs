//! CommandRouter: внешняя команда → directive → AuthorityGate
//!
//! | Action      | Operation                       |
//! |-------------|---------------------------------|
//! | GoToBase    | MoveTo Point_Base               |
//! | GoToMid     | MoveTo Point_Mid                |
//! | GoToLair    | MoveTo Point_Lair               |
//! | FollowMe    | Follow аватара issuer'а         |
//! | StopFollow  | ClearDirective                  |
//! | Stop        | ClearDirective                  |
//! | AttackEnemy | AttackNearest                   |
//! | Patrol      | Patrol                          |
//!
//! Любая неразрешённая ссылка - warning и no-op, никогда не panic.

use bevy::prelude::*;

use super::action::Action;
use super::registry::AgentRegistry;
use super::waypoints::Waypoints;
use crate::authority::{AuthorityGate, Directive, DirectiveOp, Dispatch};
use crate::error::CommandError;
use crate::logger;
use crate::shared::{AgentId, ParticipantId};

pub struct CommandRouter;

impl CommandRouter {
    /// Команда по имени агента и строке action
    pub fn dispatch(
        world: &mut World,
        issuer: ParticipantId,
        agent_name: &str,
        action: &str,
    ) -> Result<Dispatch, CommandError> {
        let Some(agent) = world.resource::<AgentRegistry>().resolve_name(agent_name) else {
            logger::log_warning(&format!(
                "⚠️ command '{}' from {}: no live agent named '{}'",
                action, issuer, agent_name
            ));
            return Err(CommandError::UnknownAgent(agent_name.to_string()));
        };

        let action = match action.parse::<Action>() {
            Ok(action) => action,
            Err(err) => {
                logger::log_warning(&format!("⚠️ command for '{}' from {}: {}", agent_name, issuer, err));
                return Err(err);
            }
        };

        Self::dispatch_to(world, issuer, agent, action)
    }

    /// OnCommandReceived(agentId, actions[]): actions применяются по порядку
    pub fn on_command_received(
        world: &mut World,
        issuer: ParticipantId,
        agent: AgentId,
        actions: &[Action],
    ) -> Vec<Result<Dispatch, CommandError>> {
        actions
            .iter()
            .map(|action| Self::dispatch_to(world, issuer, agent, *action))
            .collect()
    }

    pub fn dispatch_to(
        world: &mut World,
        issuer: ParticipantId,
        agent: AgentId,
        action: Action,
    ) -> Result<Dispatch, CommandError> {
        let op = Self::operation_for(world, issuer, action).inspect_err(|err| {
            logger::log_warning(&format!("⚠️ {} for {} from {} dropped: {}", action, agent, issuer, err));
        })?;

        logger::log_info(&format!("🗣️ {} → {}: {}", issuer, agent, action));
        let dispatch = AuthorityGate::invoke(
            world,
            Directive {
                target: agent,
                op,
                issuer,
            },
        )?;
        Ok(dispatch)
    }

    /// Action → operation (waypoint и аватар резолвятся на стороне issuer'а)
    pub fn operation_for(world: &World, issuer: ParticipantId, action: Action) -> Result<DirectiveOp, CommandError> {
        if let Some(label) = action.waypoint() {
            let point = world
                .resource::<Waypoints>()
                .get(label)
                .ok_or_else(|| CommandError::UnknownWaypoint(label.to_string()))?;
            return Ok(DirectiveOp::MoveTo {
                label: label.to_string(),
                point: point.to_array(),
            });
        }

        let op = match action {
            Action::FollowMe => {
                let leader = world
                    .resource::<AgentRegistry>()
                    .avatar_of(issuer)
                    .ok_or(CommandError::NoAvatar(issuer))?;
                DirectiveOp::Follow { leader }
            }
            Action::StopFollow | Action::Stop => DirectiveOp::ClearDirective,
            Action::AttackEnemy => DirectiveOp::AttackNearest,
            Action::Patrol => DirectiveOp::Patrol,
            Action::GoToBase | Action::GoToMid | Action::GoToLair => {
                return Err(CommandError::UnknownWaypoint(action.to_string()));
            }
        };
        Ok(op)
    }
}
