//! Health systems: regen (holder only) + применение damage/heal directives

use bevy::prelude::*;

use super::ledger::{HealthChange, HealthLedger};
use crate::authority::Dispatch;
use crate::components::{Agent, LocallyOwned};
use crate::logger;
use crate::shared::{AgentId, SimClock};

/// System: passive regen (только holder; observers получают snapshots)
pub fn regenerate_health(
    clock: Res<SimClock>,
    mut ledgers: Query<(&Agent, &mut HealthLedger), With<LocallyOwned>>,
) {
    let dt = clock.delta();
    if dt <= 0.0 {
        return;
    }

    for (agent, mut ledger) in ledgers.iter_mut() {
        // Accumulator меняется каждый тик, а replication нужен только при изменении HP
        let healed = ledger.bypass_change_detection().tick(dt);
        if healed {
            ledger.set_changed();
            logger::log(&format!("💚 {} regen → {} HP", agent.id, ledger.current()));
        }
    }
}

/// Применить урон на holder'е (вызывается AuthorityGate)
pub fn apply_damage(world: &mut World, entity: Entity, amount: u32, source: Option<AgentId>) -> Dispatch {
    let Some(agent) = world.get::<Agent>(entity).copied() else {
        return Dispatch::Ignored;
    };
    let Some(mut ledger) = world.get_mut::<HealthLedger>(entity) else {
        logger::log_warning(&format!("{} has no HealthLedger, damage dropped", agent.id));
        return Dispatch::Ignored;
    };

    let source = source.map(|s| s.to_string()).unwrap_or_else(|| "environment".into());
    match ledger.apply_damage(amount) {
        HealthChange::Damaged { current } => {
            logger::log(&format!(
                "💥 {} took {} damage from {} → {}/{} HP",
                agent.id,
                amount,
                source,
                current,
                ledger.max()
            ));
            Dispatch::Applied
        }
        HealthChange::Died => {
            logger::log_info(&format!("💀 {} killed by {}", agent.id, source));
            Dispatch::Applied
        }
        HealthChange::Ignored => {
            logger::log(&format!("{} damage from {} ignored (dead or zero)", agent.id, source));
            Dispatch::Ignored
        }
    }
}

pub fn apply_heal(world: &mut World, entity: Entity, amount: u32) -> Dispatch {
    let Some(agent) = world.get::<Agent>(entity).copied() else {
        return Dispatch::Ignored;
    };
    let Some(mut ledger) = world.get_mut::<HealthLedger>(entity) else {
        return Dispatch::Ignored;
    };

    // Не трогаем change detection если ничего не добавилось
    let healed = ledger.bypass_change_detection().heal(amount);
    if healed == 0 {
        return Dispatch::Ignored;
    }
    ledger.set_changed();
    logger::log(&format!("💚 {} healed +{} → {} HP", agent.id, healed, ledger.current()));
    Dispatch::Applied
}
