//! MotionPlanner: idle wander + seek/flee steering + velocity integration
//!
//! Velocity пишется только на holder'е; observers получают позицию из snapshots.

use bevy::prelude::*;

pub mod components;
pub mod steering;
pub mod systems;
pub mod wander;

pub use components::{Mover, WanderPhase};
pub use steering::{steer, SteeringOutcome, SteeringParams};
pub use wander::{sample_wander_goal, wander_step};

use crate::schedule::TickSet;

pub struct MotionPlugin;

impl Plugin for MotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (systems::plan_motion, systems::integrate_motion)
                .chain()
                .in_set(TickSet::Move),
        );
    }
}
