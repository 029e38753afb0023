//! Named points (Point_Base / Point_Mid / Point_Lair)

use bevy::prelude::*;
use std::collections::HashMap;

use crate::config::WaypointConfig;

#[derive(Resource, Debug, Clone, Default)]
pub struct Waypoints {
    points: HashMap<String, Vec2>,
}

impl Waypoints {
    pub fn from_config(waypoints: &[WaypointConfig]) -> Self {
        Self {
            points: waypoints
                .iter()
                .map(|w| (w.name.clone(), Vec2::from(w.position)))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Vec2> {
        self.points.get(name).copied()
    }

    pub fn insert(&mut self, name: impl Into<String>, position: Vec2) {
        self.points.insert(name.into(), position);
    }
}
