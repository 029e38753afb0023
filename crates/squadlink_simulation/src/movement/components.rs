//! Mover: состояние wander + speed boost

use bevy::prelude::*;

use crate::components::Velocity;
use crate::shared::SimTime;

/// Фаза idle-wander (resumable wait вместо корутины)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WanderPhase {
    /// Нужно выбрать новую точку на следующем тике
    Pending,
    /// Идём к точке
    Seeking { goal: Vec2 },
    /// Стоим; `remaining` секунд до следующего sample
    Dwelling { remaining: f32 },
    /// Wander выключен (активна directed команда)
    Suspended,
}

#[derive(Component, Debug, Clone)]
pub struct Mover {
    pub move_speed: f32,
    /// Центр wander-диска
    pub anchor: Vec2,
    pub phase: WanderPhase,
    /// Абсолютное время окончания speed boost
    pub boost_until: SimTime,
}

impl Mover {
    pub fn new(move_speed: f32, anchor: Vec2) -> Self {
        Self {
            move_speed,
            anchor,
            phase: WanderPhase::Pending,
            boost_until: 0.0,
        }
    }

    /// Directed команда: velocity обнуляется сразу, sampling останавливается
    pub fn suspend(&mut self, velocity: &mut Velocity) {
        self.phase = WanderPhase::Suspended;
        velocity.0 = Vec2::ZERO;
    }

    /// Возврат в wander: anchor = текущая позиция
    pub fn resume(&mut self, position: Vec2) {
        self.anchor = position;
        self.phase = WanderPhase::Pending;
    }

    pub fn is_suspended(&self) -> bool {
        self.phase == WanderPhase::Suspended
    }

    pub fn boost(&mut self, now: SimTime, duration: f32) {
        self.boost_until = self.boost_until.max(now + SimTime::from(duration));
    }

    pub fn is_boosted(&self, now: SimTime) -> bool {
        now < self.boost_until
    }
}
