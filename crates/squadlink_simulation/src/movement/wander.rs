//! Idle wander: sample → seek → dwell → re-anchor → sample

use bevy::prelude::*;
use rand::Rng;

use super::components::{Mover, WanderPhase};
use crate::config::MotionConfig;

/// Равномерная точка в диске радиуса `max_distance` вокруг anchor
pub fn sample_wander_goal(anchor: Vec2, max_distance: f32, rng: &mut impl Rng) -> Vec2 {
    let radius = max_distance.max(0.0) * rng.gen::<f32>().sqrt();
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    anchor + Vec2::from_angle(angle) * radius
}

/// Один тик wander. Возвращает желаемую velocity (никогда не перелетает goal).
pub fn wander_step(
    mover: &mut Mover,
    position: Vec2,
    dt: f32,
    config: &MotionConfig,
    rng: &mut impl Rng,
) -> Vec2 {
    match mover.phase {
        WanderPhase::Suspended => Vec2::ZERO,
        WanderPhase::Pending => {
            let goal = sample_wander_goal(mover.anchor, config.max_distance, rng);
            mover.phase = WanderPhase::Seeking { goal };
            seek_goal(mover, position, goal, dt, config, rng)
        }
        WanderPhase::Seeking { goal } => seek_goal(mover, position, goal, dt, config, rng),
        WanderPhase::Dwelling { remaining } => {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                mover.phase = WanderPhase::Dwelling { remaining };
            } else {
                mover.anchor = position;
                let goal = sample_wander_goal(mover.anchor, config.max_distance, rng);
                mover.phase = WanderPhase::Seeking { goal };
            }
            Vec2::ZERO
        }
    }
}

fn seek_goal(
    mover: &mut Mover,
    position: Vec2,
    goal: Vec2,
    dt: f32,
    config: &MotionConfig,
    rng: &mut impl Rng,
) -> Vec2 {
    let offset = goal - position;
    let distance = offset.length();

    if distance <= config.arrive_epsilon {
        let dwell = if config.dwell_max > config.dwell_min {
            rng.gen_range(config.dwell_min..=config.dwell_max)
        } else {
            config.dwell_min
        };
        mover.phase = WanderPhase::Dwelling { remaining: dwell };
        return Vec2::ZERO;
    }

    let mut speed = mover.move_speed;
    if dt > 0.0 {
        speed = speed.min(distance / dt);
    }
    offset / distance * speed
}
