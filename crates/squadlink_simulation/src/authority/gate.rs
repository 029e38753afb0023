//! AuthorityGate: local execute vs. forward-to-holder
//!
//! Одна сигнатура для локальных и удалённых агентов:
//! - holder == мы → операция выполняется синхронно
//! - holder == другой участник → directive сериализуется и отправляется (fire-and-forget)
//! - holder недоступен → directive выброшен, warning
//!
//! Входящие directives (`receive`) применяются только если мы действительно holder.

use bevy::prelude::*;

use super::directive::{Directive, DirectiveOp, Dispatch};
use super::transport::{LocalParticipant, NetworkLink};
use super::wire::{encode, WireMessage};
use crate::combat::directives::apply_behavior_directive;
use crate::command::AgentRegistry;
use crate::components::LocallyOwned;
use crate::error::AuthorityError;
use crate::health;
use crate::logger;

pub struct AuthorityGate;

impl AuthorityGate {
    pub fn invoke(world: &mut World, directive: Directive) -> Result<Dispatch, AuthorityError> {
        let local = world.resource::<LocalParticipant>().0;
        let Some(holder) = world.resource::<AgentRegistry>().holder(directive.target) else {
            logger::log_warning(&format!(
                "⚠️ {} for unknown {} dropped",
                directive.op.name(),
                directive.target
            ));
            return Err(AuthorityError::UnknownAgent(directive.target));
        };

        if holder == local {
            return Self::apply_local(world, &directive);
        }

        let agent = directive.target;
        let op_name = directive.op.name();
        let bytes = encode(&WireMessage::Directive(directive))?;
        match world.resource::<NetworkLink>().transport().send(holder, bytes) {
            Ok(()) => {
                logger::log(&format!("📨 {} for {} forwarded to {}", op_name, agent, holder));
                Ok(Dispatch::Forwarded)
            }
            Err(err) => {
                logger::log_warning(&format!(
                    "⚠️ {} for {} dropped: holder {} unreachable ({})",
                    op_name, agent, holder, err
                ));
                Err(AuthorityError::HolderUnreachable { agent, holder })
            }
        }
    }

    /// Directive пришёл по сети. Применяется только на holder'е.
    pub fn receive(world: &mut World, directive: Directive) -> Result<Dispatch, AuthorityError> {
        let local = world.resource::<LocalParticipant>().0;
        let Some(holder) = world.resource::<AgentRegistry>().holder(directive.target) else {
            logger::log_warning(&format!(
                "⚠️ inbound {} for unknown {} dropped",
                directive.op.name(),
                directive.target
            ));
            return Err(AuthorityError::UnknownAgent(directive.target));
        };

        if holder != local {
            logger::log_error(&format!(
                "🚫 {} from {} rejected: {} is held by {}, not {}",
                directive.op.name(),
                directive.issuer,
                directive.target,
                holder,
                local
            ));
            return Err(AuthorityError::NotHolder {
                agent: directive.target,
                local,
                holder,
            });
        }

        Self::apply_local(world, &directive)
    }

    fn apply_local(world: &mut World, directive: &Directive) -> Result<Dispatch, AuthorityError> {
        let local = world.resource::<LocalParticipant>().0;
        let entity = world
            .resource::<AgentRegistry>()
            .entity(directive.target)
            .ok_or(AuthorityError::UnknownAgent(directive.target))?;

        // Registry говорит "наш", но entity не помечен - не пишем в replica
        if world.get::<LocallyOwned>(entity).is_none() {
            logger::log_error(&format!(
                "🚫 {} rejected: {} is not locally owned",
                directive.op.name(),
                directive.target
            ));
            return Err(AuthorityError::NotHolder {
                agent: directive.target,
                local,
                holder: local,
            });
        }

        if !directive.op.is_health_op() {
            return Ok(apply_behavior_directive(world, entity, directive));
        }

        let dispatch = match directive.op {
            DirectiveOp::ApplyDamage { amount, source } => health::systems::apply_damage(world, entity, amount, source),
            DirectiveOp::Heal { amount } => health::systems::apply_heal(world, entity, amount),
            _ => Dispatch::Ignored,
        };
        Ok(dispatch)
    }
}
