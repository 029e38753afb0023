//! Wire format (JSON) сообщений между участниками

use serde::{Deserialize, Serialize};

use super::directive::Directive;
use crate::components::AgentKind;
use crate::error::TransportError;
use crate::health::HealthSnapshot;
use crate::shared::{AgentId, ParticipantId, TeamId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WireMessage {
    /// Directive для holder'а агента
    Directive(Directive),
    /// Состояние от holder'а к observers
    Snapshot(Snapshot),
    /// Holder зарегистрировал агента - observers создают replica
    Spawned(SpawnRecord),
    /// Агент уничтожен (смерть или unregister)
    Despawn { agent: AgentId },
    AuthorityTransferred { agent: AgentId, holder: ParticipantId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Snapshot {
    /// Периодический snapshot (каждые `snapshot_interval` тиков)
    Agent(AgentSnapshot),
    /// Triggered snapshot при изменении HP
    Health { agent: AgentId, health: HealthSnapshot },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent: AgentId,
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub facing: [f32; 2],
    pub state_name: String,
    pub lock_remaining: f32,
    pub health: Option<HealthSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRecord {
    pub agent: AgentId,
    pub name: String,
    pub team: TeamId,
    pub holder: ParticipantId,
    pub kind: AgentKind,
    pub position: [f32; 2],
    pub health: Option<HealthSnapshot>,
}

pub fn encode(message: &WireMessage) -> Result<Vec<u8>, TransportError> {
    serde_json::to_vec(message).map_err(TransportError::Encode)
}

pub fn decode(bytes: &[u8]) -> Result<WireMessage, TransportError> {
    serde_json::from_slice(bytes).map_err(TransportError::Decode)
}
