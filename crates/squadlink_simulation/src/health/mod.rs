//! HealthLedger: HP bookkeeping, regen, damage, death signal
//!
//! Мутации только на holder'е. Observers применяют `HealthSnapshot`
//! (рассылается authority::replication при каждом изменении).

use bevy::prelude::*;

pub mod ledger;
pub mod systems;

pub use ledger::{HealthChange, HealthLedger, HealthSnapshot};

use crate::schedule::TickSet;
use crate::shared::{AgentId, TeamId};

/// Агент умер на holder'е (эмитится один раз, перед despawn)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AgentDied {
    pub agent: AgentId,
    pub team: TeamId,
    pub name: String,
}

pub struct HealthPlugin;

impl Plugin for HealthPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AgentDied>()
            .add_systems(Update, systems::regenerate_health.in_set(TickSet::Health));
    }
}
