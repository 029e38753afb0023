//! Shared domain - cross-cutting типы
//!
//! - ids: AgentId, ParticipantId, TeamId
//! - clock: SimClock (единые монотонные часы для всех агентов)
//! - rng: DeterministicRng (seeded ChaCha8)

pub mod clock;
pub mod ids;
pub mod rng;

pub use clock::*;
pub use ids::*;
pub use rng::*;
