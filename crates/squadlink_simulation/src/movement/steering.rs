//! Directed steering: seek + weighted flee blend
//!
//! direction = normalize(seek_weight · seek + flee_weight' · flee)
//! speed     = move_speed · min(1, distance / slow_radius)
//! flee_weight' = flee_weight × danger_multiplier внутри danger_radius

use bevy::prelude::*;

use crate::config::MotionConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringParams {
    pub move_speed: f32,
    pub seek_weight: f32,
    pub flee_weight: f32,
    pub danger_radius: f32,
    pub danger_multiplier: f32,
    pub slow_radius: f32,
    pub stop_radius: f32,
}

impl SteeringParams {
    pub fn from_config(config: &MotionConfig, move_speed: f32, stop_radius: f32) -> Self {
        Self {
            move_speed,
            seek_weight: config.seek_weight,
            flee_weight: config.flee_weight,
            danger_radius: config.danger_radius,
            danger_multiplier: config.danger_multiplier,
            slow_radius: config.slow_radius,
            stop_radius,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SteeringOutcome {
    Moving(Vec2),
    /// В stop radius: velocity = 0, flee reference сбрасывается вызывающим
    Arrived,
}

pub fn steer(position: Vec2, target: Vec2, flee_from: Option<Vec2>, params: &SteeringParams) -> SteeringOutcome {
    let to_target = target - position;
    let distance = to_target.length();
    if distance <= params.stop_radius || distance <= f32::EPSILON {
        return SteeringOutcome::Arrived;
    }

    let seek = to_target / distance;
    let mut blend = seek * params.seek_weight;

    if let Some(attacker) = flee_from {
        let away = position - attacker;
        let away_distance = away.length();
        if away_distance > f32::EPSILON {
            let mut weight = params.flee_weight;
            if away_distance < params.danger_radius {
                weight *= params.danger_multiplier;
            }
            blend += away / away_distance * weight;
        }
    }

    // Seek и flee погасили друг друга - идём чистым seek
    let direction = blend.try_normalize().unwrap_or(seek);

    let slow_down = if params.slow_radius > 0.0 {
        (distance / params.slow_radius).min(1.0)
    } else {
        1.0
    };
    SteeringOutcome::Moving(direction * params.move_speed * slow_down)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params(stop_radius: f32) -> SteeringParams {
        SteeringParams::from_config(&MotionConfig::default(), 2.0, stop_radius)
    }

    #[test]
    fn test_full_speed_far_from_target() {
        let SteeringOutcome::Moving(velocity) = steer(Vec2::ZERO, Vec2::new(10.0, 0.0), None, &params(2.0)) else {
            panic!("expected movement");
        };
        assert!((velocity - Vec2::new(2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_slows_down_on_approach() {
        let SteeringOutcome::Moving(velocity) = steer(Vec2::ZERO, Vec2::new(1.5, 0.0), None, &params(0.3)) else {
            panic!("expected movement");
        };
        // 1.5 / slow_radius 3 → половина скорости
        assert!((velocity.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_stop_radius_arrives() {
        assert_eq!(
            steer(Vec2::ZERO, Vec2::new(1.9, 0.0), Some(Vec2::new(-1.0, 0.0)), &params(2.0)),
            SteeringOutcome::Arrived
        );
        assert_eq!(steer(Vec2::ZERO, Vec2::new(2.0, 0.0), None, &params(2.0)), SteeringOutcome::Arrived);
    }

    #[test]
    fn test_flee_bends_direction_away_from_attacker() {
        let target = Vec2::new(10.0, 0.0);
        let attacker = Vec2::new(0.0, 1.0);
        let SteeringOutcome::Moving(velocity) = steer(Vec2::ZERO, target, Some(attacker), &params(2.0)) else {
            panic!("expected movement");
        };
        assert!(velocity.x > 0.0);
        assert!(velocity.y < 0.0, "should veer away from attacker: {velocity:?}");
    }

    #[test]
    fn test_danger_radius_amplifies_flee() {
        let target = Vec2::new(10.0, 0.0);
        let near = steer(Vec2::ZERO, target, Some(Vec2::new(0.0, 1.0)), &params(2.0));
        let far = steer(Vec2::ZERO, target, Some(Vec2::new(0.0, 5.0)), &params(2.0));
        let (SteeringOutcome::Moving(near), SteeringOutcome::Moving(far)) = (near, far) else {
            panic!("expected movement");
        };
        // Ближний атакующий сильнее отклоняет от seek
        assert!(near.normalize().y < far.normalize().y);
    }

    #[test]
    fn test_opposed_vectors_fall_back_to_seek() {
        let mut p = params(0.1);
        p.flee_weight = 1.0;
        p.danger_multiplier = 1.0;
        // Атакующий прямо за целью: seek и flee противоположны и равны
        let SteeringOutcome::Moving(velocity) = steer(Vec2::ZERO, Vec2::new(10.0, 0.0), Some(Vec2::new(5.0, 0.0)), &p) else {
            panic!("expected movement");
        };
        assert!(velocity.x > 0.0);
    }

    proptest! {
        /// |velocity| ≤ move_speed для любых позиций, целей и атакующих
        #[test]
        fn prop_steering_never_exceeds_move_speed(
            px in -100.0f32..100.0, py in -100.0f32..100.0,
            tx in -100.0f32..100.0, ty in -100.0f32..100.0,
            attacker in prop::option::of((-100.0f32..100.0, -100.0f32..100.0)),
            move_speed in 0.1f32..20.0,
            stop_radius in 0.0f32..3.0,
        ) {
            let p = SteeringParams::from_config(&MotionConfig::default(), move_speed, stop_radius);
            let flee_from = attacker.map(|(x, y)| Vec2::new(x, y));
            if let SteeringOutcome::Moving(velocity) = steer(Vec2::new(px, py), Vec2::new(tx, ty), flee_from, &p) {
                prop_assert!(velocity.length() <= move_speed * (1.0 + 1e-4));
            }
        }
    }
}
