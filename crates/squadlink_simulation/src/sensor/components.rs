//! Sensor компоненты: Sensor, ContactRegion, ContactTracking

use bevy::prelude::*;
use std::collections::HashSet;

use crate::components::LayerMask;
use crate::config::SensorConfig;
use crate::shared::AgentId;

/// Сенсор агента (vision scan + melee contact flag)
///
/// Автоматически добавляет ContactTracking через Required Components.
#[derive(Component, Debug, Clone)]
#[require(ContactTracking)]
pub struct Sensor {
    pub view_radius: f32,
    /// Полный угол обзора в градусах; >= 360 → angle-фильтр выключен
    pub view_angle: f32,
    /// Кого ищем
    pub target_mask: LayerMask,
    /// Что блокирует visibility probe
    pub obstacle_mask: LayerMask,
    /// Contact flag (proximity overlap с врагом), НЕ результат radius scan
    contact: bool,
    /// Ближайшая цель по последнему scan (для SensorReport diff)
    nearest: Option<AgentId>,
}

impl Default for Sensor {
    fn default() -> Self {
        Self::from_config(&SensorConfig::default())
    }
}

impl Sensor {
    pub fn from_config(config: &SensorConfig) -> Self {
        let mut sensor = Self {
            view_radius: 0.0,
            view_angle: 360.0,
            target_mask: LayerMask::UNITS,
            obstacle_mask: LayerMask::WALLS.union(LayerMask::PROPS),
            contact: false,
            nearest: None,
        };
        sensor.set_view_radius(config.view_radius);
        sensor.set_view_angle(config.view_angle);
        sensor
    }

    /// Melee readiness gate
    pub fn can_hit(&self) -> bool {
        self.contact
    }

    pub fn nearest(&self) -> Option<AgentId> {
        self.nearest
    }

    pub fn set_view_radius(&mut self, radius: f32) {
        self.view_radius = radius.max(0.0);
    }

    pub fn set_view_angle(&mut self, degrees: f32) {
        self.view_angle = degrees.clamp(0.0, 360.0);
    }

    pub fn is_omnidirectional(&self) -> bool {
        self.view_angle >= 360.0
    }

    pub(crate) fn set_contact(&mut self, contact: bool) {
        self.contact = contact;
    }

    pub(crate) fn set_nearest(&mut self, nearest: Option<AgentId>) {
        self.nearest = nearest;
    }
}

/// Proximity region (trigger volume) вокруг агента
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ContactRegion {
    pub radius: f32,
}

/// Активные overlaps с вражескими агентами (diff между тиками → Entered/Exited)
#[derive(Component, Debug, Clone, Default)]
pub struct ContactTracking {
    pub overlapping: HashSet<AgentId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_clamp() {
        let mut sensor = Sensor::default();
        sensor.set_view_radius(-3.0);
        assert_eq!(sensor.view_radius, 0.0);

        sensor.set_view_angle(720.0);
        assert_eq!(sensor.view_angle, 360.0);
        assert!(sensor.is_omnidirectional());

        sensor.set_view_angle(-10.0);
        assert_eq!(sensor.view_angle, 0.0);
        assert!(!sensor.is_omnidirectional());
    }

    #[test]
    fn test_defaults_from_config() {
        let sensor = Sensor::default();
        assert_eq!(sensor.view_radius, 10.0);
        assert!(sensor.is_omnidirectional());
        assert!(!sensor.can_hit());
        assert_eq!(sensor.nearest(), None);
    }
}
