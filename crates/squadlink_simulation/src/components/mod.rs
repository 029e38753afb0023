//! ECS Components тела агента
//!
//! Организация по доменам:
//! - agent: identity, позиция/скорость/facing, authority markers
//! - world: классификация (LayerMask) и препятствия для visibility probe
//!
//! Поведенческие capability-компоненты живут рядом со своими системами:
//! `Sensor` (sensor), `Mover` (movement), `Combatant` (combat), `HealthLedger` (health).

pub mod agent;
pub mod world;

pub use agent::*;
pub use world::*;
