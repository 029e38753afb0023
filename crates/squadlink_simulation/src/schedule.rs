//! Tick ordering
//!
//! Один тик = один `app.update()`. Порядок фаз фиксирован, поэтому два
//! прогона с одинаковым seed и одинаковыми вызовами дают одинаковый мир:
//!
//! Clock → Inbound → Sense → Decide → Move → Health → Dispatch → Lifecycle → Replicate

use bevy::prelude::*;

use crate::shared::{advance_clock, SimClock};

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// SimClock += dt
    Clock,
    /// Wire messages, внешние команды
    Inbound,
    /// Sensor: contact flag, nearest target, enter/exit
    Sense,
    /// CombatCoordinator: target resolution, attack cycle
    Decide,
    /// MotionPlanner: wander / steering / integrate
    Move,
    /// HealthLedger regen
    Health,
    /// Накопленные directives → AuthorityGate
    Dispatch,
    /// Death → teardown
    Lifecycle,
    /// Snapshots для observers
    Replicate,
}

pub fn configure_tick_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            TickSet::Clock,
            TickSet::Inbound,
            TickSet::Sense,
            TickSet::Decide,
            TickSet::Move,
            TickSet::Health,
            TickSet::Dispatch,
            TickSet::Lifecycle,
            TickSet::Replicate,
        )
            .chain(),
    )
    .add_systems(Update, advance_clock.in_set(TickSet::Clock));
}

/// Один тик симуляции с шагом dt
pub fn step(app: &mut App, dt: f32) {
    app.world_mut().resource_mut::<SimClock>().queue_step(dt);
    app.update();
}

/// N тиков с одинаковым dt
pub fn run_ticks(app: &mut App, ticks: u32, dt: f32) {
    for _ in 0..ticks {
        step(app, dt);
    }
}
