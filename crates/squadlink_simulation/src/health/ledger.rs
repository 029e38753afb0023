//! HealthLedger: authoritative HP bookkeeping
//!
//! Инварианты:
//! - 0 ≤ current ≤ max
//! - HP уменьшается только через `apply_damage`, растёт только через regen/`heal`
//! - death flag ставится ровно один раз и необратим

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::HealthConfig;

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct HealthLedger {
    current: u32,
    max: u32,
    /// Секунды между +1 HP
    regen_interval: f32,
    /// Сколько осталось до следующего regen tick
    regen_accumulator: f32,
    dead: bool,
}

/// Результат `apply_damage`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthChange {
    Damaged { current: u32 },
    /// HP дошёл до 0 - возвращается ровно один раз за жизнь ledger'а
    Died,
    /// Уже мёртв или amount == 0
    Ignored,
}

/// Read-only копия для observers / telemetry / wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub current: u32,
    pub max: u32,
    pub dead: bool,
}

impl Default for HealthLedger {
    fn default() -> Self {
        Self::from_config(&HealthConfig::default())
    }
}

impl HealthLedger {
    pub fn new(max: u32, regen_interval: f32) -> Self {
        Self {
            current: max,
            max,
            regen_interval,
            regen_accumulator: regen_interval,
            dead: false,
        }
    }

    pub fn from_config(config: &HealthConfig) -> Self {
        Self::new(config.max_hp, config.regen_interval)
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn apply_damage(&mut self, amount: u32) -> HealthChange {
        if self.dead || amount == 0 {
            return HealthChange::Ignored;
        }

        self.current = self.current.saturating_sub(amount);
        if self.current == 0 {
            self.dead = true;
            HealthChange::Died
        } else {
            HealthChange::Damaged {
                current: self.current,
            }
        }
    }

    /// Passive regen. Возвращает true если HP вырос.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.dead {
            return false;
        }

        // На full HP accumulator остаётся на нуле: первый tick после урона сразу лечит
        self.regen_accumulator = (self.regen_accumulator - dt).max(0.0);
        if self.regen_accumulator > 0.0 || self.current >= self.max {
            return false;
        }

        self.regen_accumulator = self.regen_interval;
        self.current += 1;
        true
    }

    /// Явный heal (clamp к max). Мёртвых не лечим. Возвращает сколько реально добавлено.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if self.dead {
            return 0;
        }
        let before = self.current;
        self.current = self.current.saturating_add(amount).min(self.max);
        self.current - before
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            current: self.current,
            max: self.max,
            dead: self.dead,
        }
    }

    /// Единственная мутация на observer'е: копия состояния holder'а
    pub fn apply_snapshot(&mut self, snapshot: &HealthSnapshot) {
        self.max = snapshot.max;
        self.current = snapshot.current.min(snapshot.max);
        self.dead = snapshot.dead;
    }

    pub fn from_snapshot(snapshot: &HealthSnapshot, regen_interval: f32) -> Self {
        let mut ledger = Self::new(snapshot.max, regen_interval);
        ledger.apply_snapshot(snapshot);
        ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ten_hits_kill_exactly_once() {
        let mut ledger = HealthLedger::new(10, 10.0);
        let mut deaths = 0;

        for hit in 1..=10 {
            match ledger.apply_damage(1) {
                HealthChange::Died => {
                    deaths += 1;
                    assert_eq!(hit, 10, "death must fire on the 10th hit");
                }
                HealthChange::Damaged { current } => assert_eq!(current, 10 - hit),
                HealthChange::Ignored => panic!("live ledger ignored damage"),
            }
        }

        assert_eq!(deaths, 1);
        assert!(ledger.is_dead());

        // Повторный урон по трупу
        assert_eq!(ledger.apply_damage(1), HealthChange::Ignored);
        assert_eq!(ledger.apply_damage(50), HealthChange::Ignored);
        assert_eq!(ledger.current(), 0);
    }

    #[test]
    fn test_overkill_clamps_at_zero() {
        let mut ledger = HealthLedger::new(10, 10.0);
        assert_eq!(ledger.apply_damage(25), HealthChange::Died);
        assert_eq!(ledger.current(), 0);
    }

    #[test]
    fn test_regen_every_interval() {
        let mut ledger = HealthLedger::new(10, 10.0);
        ledger.apply_damage(3);

        assert!(!ledger.tick(9.0));
        assert_eq!(ledger.current(), 7);
        assert!(ledger.tick(1.0));
        assert_eq!(ledger.current(), 8);

        // Accumulator сброшен к интервалу
        assert!(!ledger.tick(5.0));
        assert!(ledger.tick(5.0));
        assert_eq!(ledger.current(), 9);
    }

    #[test]
    fn test_regen_stops_at_max_and_when_dead() {
        let mut ledger = HealthLedger::new(10, 1.0);
        assert!(!ledger.tick(1.0));
        assert_eq!(ledger.current(), 10);

        ledger.apply_damage(10);
        assert!(!ledger.tick(100.0));
        assert_eq!(ledger.current(), 0);
        assert_eq!(ledger.heal(5), 0);
    }

    #[test]
    fn test_idle_at_max_heals_on_first_tick_after_damage() {
        let mut ledger = HealthLedger::new(10, 10.0);
        assert!(!ledger.tick(15.0));

        ledger.apply_damage(1);
        assert!(ledger.tick(0.1));
        assert_eq!(ledger.current(), 10);

        // После heal'а снова полный интервал
        ledger.apply_damage(2);
        assert!(!ledger.tick(9.0));
        assert!(ledger.tick(1.0));
        assert_eq!(ledger.current(), 9);
    }

    #[test]
    fn test_heal_clamps() {
        let mut ledger = HealthLedger::new(10, 10.0);
        ledger.apply_damage(4);
        assert_eq!(ledger.heal(2), 2);
        assert_eq!(ledger.heal(100), 2);
        assert_eq!(ledger.current(), 10);
    }

    #[test]
    fn test_snapshot_mirrors_holder() {
        let mut holder = HealthLedger::new(10, 10.0);
        holder.apply_damage(6);

        let mut replica = HealthLedger::new(10, 10.0);
        replica.apply_snapshot(&holder.snapshot());
        assert_eq!(replica.snapshot(), holder.snapshot());
    }

    proptest! {
        /// HP монотонно убывает до смерти, смерть ровно одна
        #[test]
        fn prop_damage_monotone_and_single_death(hits in prop::collection::vec(0u32..6, 1..40)) {
            let mut ledger = HealthLedger::new(10, 10.0);
            let mut previous = ledger.current();
            let mut deaths = 0;

            for amount in hits {
                if ledger.apply_damage(amount) == HealthChange::Died {
                    deaths += 1;
                }
                prop_assert!(ledger.current() <= previous);
                previous = ledger.current();
            }

            prop_assert!(deaths <= 1);
            prop_assert_eq!(deaths == 1, ledger.is_dead());
            prop_assert_eq!(ledger.is_dead(), ledger.current() == 0);
        }
    }
}
