//! Target acquisition (чистые функции над snapshot'ом кандидатов)
//!
//! Фильтр кандидата, по порядку:
//! 1. сам наблюдатель, мёртвые и свои (same team) отбрасываются
//! 2. класс кандидата должен пересекаться с `target_mask`
//! 3. distance <= `view_radius`
//! 4. если обзор не круговой: угол к facing <= view_angle / 2
//! 5. visibility probe не пересекает препятствия из `obstacle_mask`
//!
//! Среди прошедших побеждает ближайший (при равенстве - первый в scan order).

use bevy::prelude::*;

use super::components::Sensor;
use super::los::has_line_of_sight;
use crate::components::{LayerMask, Obstacle};
use crate::shared::{AgentId, TeamId};

/// Наблюдатель в момент scan
#[derive(Debug, Clone, Copy)]
pub struct Observer {
    pub id: AgentId,
    pub team: TeamId,
    pub position: Vec2,
    pub facing: Vec2,
}

/// Кандидат в цели (любой агент мира, включая replicas)
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub id: AgentId,
    pub team: TeamId,
    pub position: Vec2,
    pub layers: LayerMask,
    pub alive: bool,
}

/// Ближайшая валидная цель или None
pub fn detect_target(
    observer: &Observer,
    sensor: &Sensor,
    candidates: &[Candidate],
    obstacles: &[Obstacle],
) -> Option<AgentId> {
    candidates
        .iter()
        .filter_map(|candidate| {
            qualify(observer, sensor, candidate, obstacles).map(|distance| (candidate.id, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Все валидные цели в scan order (для внешнего reporting, не для combat loop)
pub fn detect_all_targets(
    observer: &Observer,
    sensor: &Sensor,
    candidates: &[Candidate],
    obstacles: &[Obstacle],
) -> Vec<AgentId> {
    candidates
        .iter()
        .filter(|candidate| qualify(observer, sensor, candidate, obstacles).is_some())
        .map(|candidate| candidate.id)
        .collect()
}

pub fn target_count(
    observer: &Observer,
    sensor: &Sensor,
    candidates: &[Candidate],
    obstacles: &[Obstacle],
) -> usize {
    detect_all_targets(observer, sensor, candidates, obstacles).len()
}

/// Первая видимая цель, чьё имя содержит `fragment` (без учёта регистра)
pub fn detect_target_by_name<'a>(
    observer: &Observer,
    sensor: &Sensor,
    candidates: &[Candidate],
    obstacles: &[Obstacle],
    name_of: impl Fn(AgentId) -> Option<&'a str>,
    fragment: &str,
) -> Option<AgentId> {
    let needle = fragment.to_lowercase();
    detect_all_targets(observer, sensor, candidates, obstacles)
        .into_iter()
        .find(|id| {
            name_of(*id)
                .map(|name| name.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
}

/// Возвращает distance если кандидат проходит все фильтры
fn qualify(
    observer: &Observer,
    sensor: &Sensor,
    candidate: &Candidate,
    obstacles: &[Obstacle],
) -> Option<f32> {
    if candidate.id == observer.id || !candidate.alive || candidate.team == observer.team {
        return None;
    }
    if !sensor.target_mask.intersects(candidate.layers) {
        return None;
    }

    let offset = candidate.position - observer.position;
    let distance = offset.length();
    if distance > sensor.view_radius {
        return None;
    }

    if !sensor.is_omnidirectional() && !within_view_cone(observer.facing, offset, sensor.view_angle) {
        return None;
    }

    if !has_line_of_sight(observer.position, candidate.position, obstacles, sensor.obstacle_mask) {
        return None;
    }

    Some(distance)
}

fn within_view_cone(facing: Vec2, offset: Vec2, view_angle: f32) -> bool {
    let facing = facing.normalize_or_zero();
    let direction = offset.normalize_or_zero();
    // Совпадающая позиция или неопределённый facing - считаем в конусе
    if facing == Vec2::ZERO || direction == Vec2::ZERO {
        return true;
    }
    let half_angle = (view_angle * 0.5).to_radians();
    facing.dot(direction) >= half_angle.cos() - 1e-6
}
