//! Sensor: radius/angle/obstruction target acquisition + melee contact flag
//!
//! Scan (`detect_target`) и contact flag независимы: scan выбирает цель,
//! contact (proximity overlap) разрешает melee атаку.

use bevy::prelude::*;

pub mod components;
pub mod detection;
pub mod los;
pub mod systems;

#[cfg(test)]
mod detection_tests;

pub use components::{ContactRegion, ContactTracking, Sensor};
pub use detection::{
    detect_all_targets, detect_target, detect_target_by_name, target_count, Candidate, Observer,
};
pub use systems::{gather_candidates, gather_obstacles, scan_nearest};

use crate::schedule::TickSet;
use crate::shared::AgentId;

/// Proximity region enter/exit (только враги)
#[derive(Event, Debug, Clone, PartialEq)]
pub enum ProximityEvent {
    Entered { observer: AgentId, other: AgentId },
    Exited { observer: AgentId, other: AgentId },
}

/// Смена ближайшей цели сенсора (для внешнего reporting)
#[derive(Event, Debug, Clone, PartialEq)]
pub enum SensorReport {
    TargetAcquired { observer: AgentId, target: AgentId },
    TargetLost { observer: AgentId, target: AgentId },
}

pub struct SensorPlugin;

impl Plugin for SensorPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ProximityEvent>()
            .add_event::<SensorReport>()
            .add_systems(
                Update,
                (systems::track_contacts, systems::refresh_sensor_targets)
                    .chain()
                    .in_set(TickSet::Sense),
            );
    }
}
