//! World classification: LayerMask, Classification, Obstacle

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Bit set классов (аналог physics layers): кого сенсор ищет и что блокирует обзор
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const UNITS: LayerMask = LayerMask(1 << 0);
    pub const AVATARS: LayerMask = LayerMask(1 << 1);
    pub const WALLS: LayerMask = LayerMask(1 << 2);
    pub const PROPS: LayerMask = LayerMask(1 << 3);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(self, other: LayerMask) -> LayerMask {
        LayerMask(self.0 | other.0)
    }
}

/// Класс entity для target-фильтра Sensor
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Classification(pub LayerMask);

impl Default for Classification {
    fn default() -> Self {
        Self(LayerMask::UNITS)
    }
}

/// Геометрия препятствия (2D)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstacleShape {
    Circle { center: Vec2, radius: f32 },
    /// Отрезок стены от `a` до `b`
    Wall { a: Vec2, b: Vec2 },
}

/// Статичное препятствие, блокирующее visibility probe
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub shape: ObstacleShape,
    pub layers: LayerMask,
}

impl Obstacle {
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self {
            shape: ObstacleShape::Circle { center, radius },
            layers: LayerMask::PROPS,
        }
    }

    pub fn wall(a: Vec2, b: Vec2) -> Self {
        Self {
            shape: ObstacleShape::Wall { a, b },
            layers: LayerMask::WALLS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_mask_ops() {
        let mask = LayerMask::WALLS.union(LayerMask::PROPS);
        assert!(mask.intersects(LayerMask::WALLS));
        assert!(mask.intersects(LayerMask::PROPS));
        assert!(!mask.intersects(LayerMask::UNITS));
        assert!(!LayerMask::NONE.intersects(LayerMask::ALL));
    }
}
