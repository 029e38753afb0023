//! Line-of-sight helpers (2D visibility probe)
//!
//! Probe = отрезок от наблюдателя до кандидата. Кандидат невидим, если
//! отрезок пересекает хотя бы одно препятствие из obstacle mask.

use bevy::prelude::*;

use crate::components::{LayerMask, Obstacle, ObstacleShape};

const EPSILON: f32 = 1e-6;

/// Проверка visibility probe `from → to` против всех препятствий маски
pub fn has_line_of_sight(from: Vec2, to: Vec2, obstacles: &[Obstacle], mask: LayerMask) -> bool {
    !obstacles
        .iter()
        .filter(|obstacle| obstacle.layers.intersects(mask))
        .any(|obstacle| probe_blocked(from, to, &obstacle.shape))
}

pub fn probe_blocked(from: Vec2, to: Vec2, shape: &ObstacleShape) -> bool {
    match *shape {
        ObstacleShape::Circle { center, radius } => segment_hits_circle(from, to, center, radius),
        ObstacleShape::Wall { a, b } => segments_intersect(from, to, a, b),
    }
}

/// Отрезок AB проходит строго внутри круга (касание не блокирует)
pub fn segment_hits_circle(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> bool {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq < EPSILON {
        0.0
    } else {
        ((center - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    };
    let closest = a + ab * t;
    closest.distance_squared(center) < radius * radius
}

/// Пересечение отрезков P1P2 и Q1Q2 (включая концы и collinear overlap)
pub fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let r = p2 - p1;
    let s = q2 - q1;
    let qp = q1 - p1;
    let denom = r.perp_dot(s);

    if denom.abs() < EPSILON {
        // Параллельны: пересекаются только если collinear и проекции перекрываются
        if qp.perp_dot(r).abs() > EPSILON {
            return false;
        }
        let rr = r.dot(r);
        if rr < EPSILON {
            return segment_hits_circle(q1, q2, p1, EPSILON.sqrt());
        }
        let t0 = qp.dot(r) / rr;
        let t1 = t0 + s.dot(r) / rr;
        let (lo, hi) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        return hi >= 0.0 && lo <= 1.0;
    }

    let t = qp.perp_dot(s) / denom;
    let u = qp.perp_dot(r) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_blocks_center_line() {
        assert!(segment_hits_circle(Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(5.0, 0.0), 1.0));
        // Мимо
        assert!(!segment_hits_circle(Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(5.0, 3.0), 1.0));
        // Круг за концом отрезка
        assert!(!segment_hits_circle(Vec2::ZERO, Vec2::new(4.0, 0.0), Vec2::new(6.0, 0.0), 1.0));
    }

    #[test]
    fn test_wall_intersection() {
        let wall_a = Vec2::new(2.0, -1.0);
        let wall_b = Vec2::new(2.0, 1.0);
        assert!(segments_intersect(Vec2::ZERO, Vec2::new(4.0, 0.0), wall_a, wall_b));
        assert!(!segments_intersect(Vec2::ZERO, Vec2::new(1.0, 0.0), wall_a, wall_b));
        // Параллельная стена
        assert!(!segments_intersect(
            Vec2::ZERO,
            Vec2::new(4.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(4.0, 1.0)
        ));
        // Collinear overlap
        assert!(segments_intersect(
            Vec2::ZERO,
            Vec2::new(4.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(6.0, 0.0)
        ));
    }

    #[test]
    fn test_mask_filters_obstacles() {
        let wall = Obstacle::wall(Vec2::new(2.0, -1.0), Vec2::new(2.0, 1.0));
        let from = Vec2::ZERO;
        let to = Vec2::new(4.0, 0.0);

        assert!(!has_line_of_sight(from, to, &[wall], LayerMask::WALLS));
        // Стена не в маске → не блокирует
        assert!(has_line_of_sight(from, to, &[wall], LayerMask::PROPS));
    }
}
