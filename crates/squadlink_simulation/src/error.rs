//! Error types
//!
//! Ни одна из этих ошибок не фатальна для процесса: gate и router логируют
//! их на границе вызова и возвращают caller'у.

use thiserror::Error;

use crate::shared::{AgentId, ParticipantId};

/// Ошибки AuthorityGate (unresolved reference / authority miss / invariant violation)
#[derive(Debug, Error)]
pub enum AuthorityError {
    #[error("agent {0} is not registered")]
    UnknownAgent(AgentId),

    #[error("authority holder {holder} of agent {agent} is unreachable")]
    HolderUnreachable {
        agent: AgentId,
        holder: ParticipantId,
    },

    #[error("participant {local} is not the authority holder of agent {agent} (holder: {holder})")]
    NotHolder {
        agent: AgentId,
        local: ParticipantId,
        holder: ParticipantId,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("participant {0} is not connected")]
    Unreachable(ParticipantId),

    #[error("failed to encode wire message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode wire message: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("no live agent named '{0}'")]
    UnknownAgent(String),

    #[error("unknown action '{0}'")]
    UnknownAction(String),

    #[error("waypoint '{0}' is not defined")]
    UnknownWaypoint(String),

    #[error("participant {0} has no avatar to follow")]
    NoAvatar(ParticipantId),

    #[error(transparent)]
    Authority(#[from] AuthorityError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
