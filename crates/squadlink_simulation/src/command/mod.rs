//! CommandRouter + registry
//!
//! Внешний распознаватель (голос, UI) выдаёт уже разобранные `Action`.
//! Host либо вызывает `CommandRouter` напрямую, либо кладёт команды в
//! `CommandInbox` - они разбираются в начале следующего тика.

use bevy::prelude::*;

pub mod action;
pub mod registry;
pub mod router;
pub mod waypoints;

pub use action::Action;
pub use registry::{AgentRegistry, NamePool, RegistryEntry};
pub use router::CommandRouter;
pub use waypoints::Waypoints;

use crate::schedule::TickSet;
use crate::shared::{AgentId, ParticipantId};

#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedCommand {
    pub issuer: ParticipantId,
    pub agent: AgentId,
    pub actions: Vec<Action>,
}

/// Очередь OnCommandReceived событий от внешнего распознавателя
#[derive(Resource, Debug, Default)]
pub struct CommandInbox {
    commands: Vec<ReceivedCommand>,
}

impl CommandInbox {
    pub fn push(&mut self, issuer: ParticipantId, agent: AgentId, actions: Vec<Action>) {
        self.commands.push(ReceivedCommand { issuer, agent, actions });
    }

    pub fn take(&mut self) -> Vec<ReceivedCommand> {
        std::mem::take(&mut self.commands)
    }
}

/// Exclusive system: разобрать CommandInbox (после inbound wire messages)
pub fn route_command_inbox(world: &mut World) {
    let commands = world.resource_mut::<CommandInbox>().take();
    for command in commands {
        // Ошибки уже залогированы роутером/gate'ом
        let _ = CommandRouter::on_command_received(world, command.issuer, command.agent, &command.actions);
    }
}

pub struct CommandPlugin;

impl Plugin for CommandPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AgentRegistry>()
            .init_resource::<Waypoints>()
            .init_resource::<CommandInbox>()
            .add_systems(
                Update,
                route_command_inbox
                    .in_set(TickSet::Inbound)
                    .after(crate::authority::replication::receive_wire_messages),
            );
    }
}
