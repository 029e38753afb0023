//! Transport seam: надёжный упорядоченный канал между участниками
//!
//! Симуляция видит только `Transport`. `LoopbackHub` - in-process реализация
//! для headless прогонов и тестов (несколько World в одном процессе).

use bevy::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::TransportError;
use crate::shared::ParticipantId;

pub trait Transport: Send + Sync {
    /// Кто мы
    fn local(&self) -> ParticipantId;
    /// Отправить одному участнику
    fn send(&self, to: ParticipantId, bytes: Vec<u8>) -> Result<(), TransportError>;
    /// Отправить всем кроме себя
    fn broadcast(&self, bytes: Vec<u8>) -> Result<(), TransportError>;
    /// Забрать всё что пришло (в порядке отправки)
    fn drain(&self) -> Vec<Vec<u8>>;
}

/// Participant этого World
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalParticipant(pub ParticipantId);

/// Resource-обёртка над транспортом
#[derive(Resource)]
pub struct NetworkLink {
    transport: Box<dyn Transport>,
}

impl NetworkLink {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }
}

type Inboxes = HashMap<ParticipantId, VecDeque<Vec<u8>>>;

/// In-process "сеть": по inbox на подключённого участника
#[derive(Clone, Default)]
pub struct LoopbackHub {
    inboxes: Arc<Mutex<Inboxes>>,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, participant: ParticipantId) -> LoopbackTransport {
        self.lock().entry(participant).or_default();
        LoopbackTransport {
            hub: self.clone(),
            me: participant,
        }
    }

    /// Участник выпадает из сессии: его inbox удаляется, отправки ему → Unreachable
    pub fn disconnect(&self, participant: ParticipantId) {
        self.lock().remove(&participant);
    }

    pub fn is_connected(&self, participant: ParticipantId) -> bool {
        self.lock().contains_key(&participant)
    }

    pub fn pending_for(&self, participant: ParticipantId) -> usize {
        self.lock().get(&participant).map(|inbox| inbox.len()).unwrap_or(0)
    }

    fn lock(&self) -> MutexGuard<'_, Inboxes> {
        // Inbox - просто очередь байтов, после panic в другом потоке она остаётся валидной
        self.inboxes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct LoopbackTransport {
    hub: LoopbackHub,
    me: ParticipantId,
}

impl Transport for LoopbackTransport {
    fn local(&self) -> ParticipantId {
        self.me
    }

    fn send(&self, to: ParticipantId, bytes: Vec<u8>) -> Result<(), TransportError> {
        let mut inboxes = self.hub.lock();
        let inbox = inboxes.get_mut(&to).ok_or(TransportError::Unreachable(to))?;
        inbox.push_back(bytes);
        Ok(())
    }

    fn broadcast(&self, bytes: Vec<u8>) -> Result<(), TransportError> {
        let mut inboxes = self.hub.lock();
        let mut peers: Vec<ParticipantId> = inboxes.keys().copied().filter(|p| *p != self.me).collect();
        peers.sort();
        for peer in peers {
            if let Some(inbox) = inboxes.get_mut(&peer) {
                inbox.push_back(bytes.clone());
            }
        }
        Ok(())
    }

    fn drain(&self) -> Vec<Vec<u8>> {
        self.hub
            .lock()
            .get_mut(&self.me)
            .map(|inbox| inbox.drain(..).collect())
            .unwrap_or_default()
    }
}
