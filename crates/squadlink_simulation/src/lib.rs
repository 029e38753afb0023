//! SquadLink Simulation Core
//!
//! Authority-gated поведение агентов на Bevy 0.16 (headless ECS).
//!
//! Каждый агент мутируется только у своего authority holder'а; остальные
//! участники держат read-only replicas и получают snapshots. Все
//! cross-agent эффекты идут через `authority::AuthorityGate`.
//!
//! Модули:
//! - sensor: contact flag, nearest hostile, line of sight
//! - movement: wander / seek-flee steering
//! - combat: FSM (Wander / FollowDirective / PursueHostile / Attacking)
//! - health: HP ledger, regen, death
//! - command: operator commands → directives
//! - authority: gate, transport, wire, replication

use bevy::prelude::*;

pub mod authority;
pub mod combat;
pub mod command;
pub mod components;
pub mod config;
pub mod error;
pub mod health;
pub mod logger;
pub mod movement;
pub mod schedule;
pub mod sensor;
pub mod shared;
pub mod spawn;
pub mod telemetry;

pub use authority::{AuthorityGate, Directive, DirectiveOp, Dispatch, LoopbackHub, Transport};
pub use combat::{CombatState, Combatant};
pub use command::{Action, AgentRegistry, CommandRouter};
pub use components::{Agent, AgentKind, Position};
pub use config::SimulationConfig;
pub use error::{AuthorityError, CommandError, ConfigError, TransportError};
pub use health::{AgentDied, HealthLedger, HealthSnapshot};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use schedule::{run_ticks, step, TickSet};
pub use shared::{AgentId, DeterministicRng, ParticipantId, SimClock, SimTime, TeamId};
pub use spawn::{register_agent, transfer_authority, unregister_agent, AgentHandle, AgentSpawn};

use authority::{AuthorityPlugin, LocalParticipant, NetworkLink};
use combat::CombatPlugin;
use command::{CommandPlugin, NamePool, Waypoints};
use health::HealthPlugin;
use movement::MotionPlugin;
use sensor::SensorPlugin;

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Ожидает `LocalParticipant` и `NetworkLink` (ставит `create_session`).
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimClock>()
            .init_resource::<SimulationConfig>();
        schedule::configure_tick_sets(app);
        app.add_plugins((
            AuthorityPlugin,
            CommandPlugin,
            SensorPlugin,
            CombatPlugin,
            MotionPlugin,
            HealthPlugin,
        ))
        .add_systems(Update, spawn::despawn_dead_agents.in_set(TickSet::Lifecycle));
    }
}

/// Minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(SimClock::default());

    app
}

/// Сессия одного участника: headless app + transport + config
pub fn create_session(
    participant: ParticipantId,
    transport: Box<dyn Transport>,
    config: SimulationConfig,
    seed: u64,
) -> App {
    let mut app = create_headless_app(seed);

    let mut rng = DeterministicRng::new(seed);
    let names = NamePool::shuffled(&config.names.pool, &mut rng.rng);

    app.insert_resource(LocalParticipant(participant))
        .insert_resource(NetworkLink::new(transport))
        .insert_resource(Waypoints::from_config(&config.waypoints))
        .insert_resource(AgentRegistry::new(names))
        .insert_resource(config)
        .add_plugins(SimulationPlugin);

    logger::log_info(&format!("🚀 session for {} (seed: {})", participant, seed));
    app
}
