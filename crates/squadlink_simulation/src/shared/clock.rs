//! Simulation clock
//!
//! Один монотонный clock на World. Все lock-таймеры агентов (follow lock,
//! reaggro block, attack cooldown) хранятся как абсолютные deadlines и
//! сравниваются с `SimClock::now`.

use bevy::prelude::*;

/// Абсолютное время симуляции. f64: deadlines сравниваются точно и в длинных сессиях
pub type SimTime = f64;

#[derive(Resource, Debug, Clone, Default)]
pub struct SimClock {
    /// Текущее время симуляции (секунды с начала сессии)
    now: SimTime,
    /// Шаг последнего тика
    delta: f32,
    /// Номер тика
    tick: u64,
    /// Шаг, поставленный в очередь драйвером (`schedule::step`)
    pending: f32,
}

impl SimClock {
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Поставить шаг для следующего тика. Отрицательный dt игнорируется.
    pub fn queue_step(&mut self, dt: f32) {
        self.pending += dt.max(0.0);
    }

    /// Применить накопленный шаг (вызывается ровно раз за тик)
    pub fn advance(&mut self) {
        self.delta = self.pending;
        self.now += SimTime::from(self.pending);
        self.pending = 0.0;
        self.tick = self.tick.wrapping_add(1);
    }

    /// Сколько осталось до deadline (0 если уже прошёл)
    pub fn remaining(&self, deadline: SimTime) -> f32 {
        (deadline - self.now).max(0.0) as f32
    }
}

/// System: продвинуть clock (первым в тике)
pub fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.advance();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advance() {
        let mut clock = SimClock::default();
        clock.queue_step(0.5);
        clock.advance();
        assert_eq!(clock.now(), 0.5);
        assert_eq!(clock.delta(), 0.5);
        assert_eq!(clock.tick(), 1);

        // Отрицательный шаг не двигает время назад
        clock.queue_step(-1.0);
        clock.advance();
        assert_eq!(clock.now(), 0.5);
        assert_eq!(clock.delta(), 0.0);
    }

    #[test]
    fn test_remaining_saturates() {
        let mut clock = SimClock::default();
        clock.queue_step(2.0);
        clock.advance();
        assert_eq!(clock.remaining(3.5), 1.5);
        assert_eq!(clock.remaining(1.0), 0.0);
    }

    #[test]
    fn test_long_session_keeps_sub_tick_resolution() {
        let mut clock = SimClock::default();
        for _ in 0..2_000_000 {
            clock.queue_step(0.5);
            clock.advance();
        }
        assert_eq!(clock.now(), 1_000_000.0);

        // Deadline на 0.05 вперёд всё ещё различим
        let deadline = clock.now() + SimTime::from(0.05f32);
        assert!(clock.now() < deadline);
        assert!((clock.remaining(deadline) - 0.05).abs() < 1e-6);
    }
}
