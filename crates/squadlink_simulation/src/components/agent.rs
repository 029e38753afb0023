//! Базовые компоненты агента: Agent, Position, Velocity, Facing, Authority

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::{AgentId, ParticipantId, TeamId};

/// Агент (юнит или аватар участника)
///
/// Автоматически добавляет Position, Velocity, Facing через Required Components.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
#[require(Position, Velocity, Facing)]
pub struct Agent {
    /// Стабильный ID (одинаковый у holder'а и у всех observers)
    pub id: AgentId,
    pub team: TeamId,
}

impl Agent {
    pub fn is_hostile_to(&self, other: &Agent) -> bool {
        self.team != other.team
    }
}

/// Позиция на плоскости (x, y)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Position(pub Vec2);

/// Скорость (units/sec). Пишется только holder'ом (MotionPlanner)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Velocity(pub Vec2);

/// Направление взгляда (unit vector). Используется angle-фильтром Sensor
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Facing(pub Vec2);

impl Default for Facing {
    fn default() -> Self {
        Self(Vec2::X)
    }
}

/// Текущий authority holder агента
///
/// Инвариант: ровно один holder; меняется только через `spawn::transfer_authority`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Authority {
    pub holder: ParticipantId,
}

/// Marker: этот participant - holder агента (все мутирующие системы фильтруют по нему)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct LocallyOwned;

/// Marker: read-only копия, обновляется только snapshots от holder'а
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Replica;

/// Имя агента, под которым его знает CommandRouter
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct AgentName(pub String);

/// Юнит (полный набор поведений) или аватар участника (цель для FollowMe)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    Unit,
    Avatar,
}
