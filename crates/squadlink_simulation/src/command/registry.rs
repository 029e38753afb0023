//! Agent registry: AgentId → entity/holder/name, имя → AgentId, аватары участников
//!
//! Мутируется только spawn/despawn путями (`spawn` модуль), читается роутером,
//! gate'ом и системами.

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::components::AgentKind;
use crate::logger;
use crate::shared::{AgentId, ParticipantId, TeamId};

#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub entity: Entity,
    pub holder: ParticipantId,
    pub team: TeamId,
    pub name: String,
    pub kind: AgentKind,
}

/// Пул имён юнитов: выдаётся при регистрации, возвращается при unregister
#[derive(Debug, Clone, Default)]
pub struct NamePool {
    available: VecDeque<String>,
    pooled: HashSet<String>,
}

impl NamePool {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        let available: VecDeque<String> = names.into_iter().collect();
        let pooled = available.iter().cloned().collect();
        Self { available, pooled }
    }

    /// Детерминированно перемешанный пул (seed из DeterministicRng)
    pub fn shuffled(names: &[String], rng: &mut impl Rng) -> Self {
        let mut names = names.to_vec();
        names.shuffle(rng);
        Self::new(names)
    }

    /// Следующее свободное имя или `Unit_<id>` если пул исчерпан
    pub fn acquire(&mut self, id: AgentId) -> String {
        self.available
            .pop_front()
            .unwrap_or_else(|| format!("Unit_{}", id.0))
    }

    /// Имя занято агентом другого участника (replica) - не выдаём его
    pub fn reserve(&mut self, name: &str) {
        self.available.retain(|n| n != name);
    }

    pub fn release(&mut self, name: &str) {
        if self.pooled.contains(name) && !self.available.iter().any(|n| n == name) {
            self.available.push_back(name.to_string());
        }
    }

    pub fn available(&self) -> usize {
        self.available.len()
    }
}

#[derive(Resource, Debug, Default)]
pub struct AgentRegistry {
    entries: HashMap<AgentId, RegistryEntry>,
    /// lowercase name → id (только юниты)
    by_name: HashMap<String, AgentId>,
    avatars: HashMap<ParticipantId, AgentId>,
    names: NamePool,
    next_seq: u32,
}

impl AgentRegistry {
    pub fn new(names: NamePool) -> Self {
        Self {
            names,
            ..Default::default()
        }
    }

    /// Глобально уникальный id: старшие 32 бита - участник-создатель
    pub fn allocate_id(&mut self, local: ParticipantId) -> AgentId {
        self.next_seq += 1;
        AgentId(((local.0 as u64) << 32) | self.next_seq as u64)
    }

    pub fn acquire_name(&mut self, id: AgentId) -> String {
        self.names.acquire(id)
    }

    pub fn insert(&mut self, id: AgentId, entry: RegistryEntry) {
        match entry.kind {
            AgentKind::Unit => {
                self.names.reserve(&entry.name);
                let key = entry.name.to_lowercase();
                if let Some(existing) = self.by_name.get(&key) {
                    logger::log_warning(&format!(
                        "⚠️ name '{}' already used by {}, {} is reachable by id only",
                        entry.name, existing, id
                    ));
                } else {
                    self.by_name.insert(key, id);
                }
            }
            AgentKind::Avatar => {
                self.avatars.insert(entry.holder, id);
            }
        }
        self.entries.insert(id, entry);
    }

    pub fn remove(&mut self, id: AgentId) -> Option<RegistryEntry> {
        let entry = self.entries.remove(&id)?;
        let key = entry.name.to_lowercase();
        if self.by_name.get(&key) == Some(&id) {
            self.by_name.remove(&key);
        }
        self.avatars.retain(|_, avatar| *avatar != id);
        if entry.kind == AgentKind::Unit {
            self.names.release(&entry.name);
        }
        Some(entry)
    }

    pub fn get(&self, id: AgentId) -> Option<&RegistryEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn entity(&self, id: AgentId) -> Option<Entity> {
        self.entries.get(&id).map(|e| e.entity)
    }

    pub fn holder(&self, id: AgentId) -> Option<ParticipantId> {
        self.entries.get(&id).map(|e| e.holder)
    }

    pub fn set_holder(&mut self, id: AgentId, holder: ParticipantId) -> bool {
        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };
        entry.holder = holder;
        // Аватар принадлежит тому, кто им управляет
        if entry.kind == AgentKind::Avatar {
            self.avatars.retain(|_, avatar| *avatar != id);
            self.avatars.insert(holder, id);
        }
        true
    }

    pub fn name_of(&self, id: AgentId) -> Option<&str> {
        self.entries.get(&id).map(|e| e.name.as_str())
    }

    /// Имя → живой юнит (без учёта регистра, без fuzzy)
    pub fn resolve_name(&self, name: &str) -> Option<AgentId> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    pub fn avatar_of(&self, participant: ParticipantId) -> Option<AgentId> {
        self.avatars.get(&participant).copied()
    }

    /// Все id в стабильном порядке
    pub fn ids(&self) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self.entries.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn free_names(&self) -> usize {
        self.names.available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::DeterministicRng;

    fn entry(name: &str, kind: AgentKind, holder: u32) -> RegistryEntry {
        RegistryEntry {
            entity: Entity::PLACEHOLDER,
            holder: ParticipantId(holder),
            team: TeamId(0),
            name: name.to_string(),
            kind,
        }
    }

    #[test]
    fn test_name_pool_recycles() {
        let mut pool = NamePool::new(vec!["kisa".to_string(), "zaya".to_string()]);
        let a = pool.acquire(AgentId(1));
        let b = pool.acquire(AgentId(2));
        assert_eq!((a.as_str(), b.as_str()), ("kisa", "zaya"));

        // Пул пуст → fallback
        assert_eq!(pool.acquire(AgentId(3)), "Unit_3");

        pool.release(&a);
        pool.release("Unit_3");
        pool.release(&a);
        assert_eq!(pool.available(), 1);
        assert_eq!(pool.acquire(AgentId(4)), "kisa");
    }

    #[test]
    fn test_shuffle_is_deterministic() {
        let names: Vec<String> = ["a", "b", "c", "d", "e", "f"].iter().map(|s| s.to_string()).collect();
        let mut first = NamePool::shuffled(&names, &mut DeterministicRng::new(11).rng);
        let mut second = NamePool::shuffled(&names, &mut DeterministicRng::new(11).rng);
        for i in 0..6 {
            assert_eq!(first.acquire(AgentId(i)), second.acquire(AgentId(i)));
        }
    }

    #[test]
    fn test_registry_lookup_and_release() {
        let mut registry = AgentRegistry::new(NamePool::new(vec!["zhuzha".to_string()]));
        let id = registry.allocate_id(ParticipantId(1));
        let name = registry.acquire_name(id);
        registry.insert(id, entry(&name, AgentKind::Unit, 1));

        assert_eq!(registry.resolve_name("ZHUZHA"), Some(id));
        assert_eq!(registry.holder(id), Some(ParticipantId(1)));
        assert_eq!(registry.free_names(), 0);

        registry.remove(id);
        assert_eq!(registry.resolve_name("zhuzha"), None);
        assert_eq!(registry.free_names(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ids_are_unique_per_participant() {
        let mut a = AgentRegistry::default();
        let mut b = AgentRegistry::default();
        assert_ne!(a.allocate_id(ParticipantId(1)), b.allocate_id(ParticipantId(2)));
        assert_ne!(a.allocate_id(ParticipantId(1)), a.allocate_id(ParticipantId(1)));
    }

    #[test]
    fn test_avatar_lookup() {
        let mut registry = AgentRegistry::default();
        let avatar = registry.allocate_id(ParticipantId(2));
        registry.insert(avatar, entry("Avatar_P2", AgentKind::Avatar, 2));

        assert_eq!(registry.avatar_of(ParticipantId(2)), Some(avatar));
        // Аватары не адресуются по имени
        assert_eq!(registry.resolve_name("Avatar_P2"), None);
    }
}
