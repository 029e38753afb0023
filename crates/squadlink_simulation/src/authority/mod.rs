//! AuthorityGate + replication plumbing
//!
//! Single-writer discipline: каждый агент мутируется только у своего holder'а.
//! Все cross-agent эффекты (damage, reactions, команды) - `Directive` через gate.
//!
//! Порядок в тике:
//! - TickSet::Inbound: receive_wire_messages (directives, snapshots, spawn/despawn, transfer)
//! - TickSet::Dispatch: flush_pending_directives (то, что системы накопили за тик)
//! - TickSet::Replicate: publish_snapshots

use bevy::prelude::*;

pub mod directive;
pub mod gate;
pub mod replication;
pub mod transport;
pub mod wire;

pub use directive::{Directive, DirectiveOp, Dispatch, PendingDirectives};
pub use gate::AuthorityGate;
pub use replication::ReplicatedState;
pub use transport::{LocalParticipant, LoopbackHub, LoopbackTransport, NetworkLink, Transport};
pub use wire::{AgentSnapshot, Snapshot, SpawnRecord, WireMessage};

use crate::schedule::TickSet;

pub struct AuthorityPlugin;

impl Plugin for AuthorityPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingDirectives>()
            .add_systems(Update, replication::receive_wire_messages.in_set(TickSet::Inbound))
            .add_systems(Update, replication::flush_pending_directives.in_set(TickSet::Dispatch))
            .add_systems(Update, replication::publish_snapshots.in_set(TickSet::Replicate));
    }
}
