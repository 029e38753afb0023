//! Simulation config
//!
//! Все tunables агентов в одном resource. Defaults совпадают с боевыми
//! значениями юнитов; host может переопределить любую часть через TOML.
//!
//! ```toml
//! snapshot_interval = 2
//!
//! [motion]
//! move_speed = 2.5
//!
//! [[waypoints]]
//! name = "Point_Base"
//! position = [0.0, -20.0]
//! ```

use bevy::prelude::*;
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub sensor: SensorConfig,
    pub motion: MotionConfig,
    pub combat: CombatConfig,
    pub health: HealthConfig,
    pub names: NameConfig,
    /// Именованные точки для GoToBase/GoToMid/GoToLair
    pub waypoints: Vec<WaypointConfig>,
    /// Agent snapshots рассылаются observers каждые N тиков (health - сразу при изменении)
    pub snapshot_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sensor: SensorConfig::default(),
            motion: MotionConfig::default(),
            combat: CombatConfig::default(),
            health: HealthConfig::default(),
            names: NameConfig::default(),
            waypoints: vec![
                WaypointConfig::new("Point_Base", [0.0, -20.0]),
                WaypointConfig::new("Point_Mid", [0.0, 0.0]),
                WaypointConfig::new("Point_Lair", [0.0, 20.0]),
            ],
            snapshot_interval: 1,
        }
    }
}

impl SimulationConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.motion.move_speed <= 0.0 {
            return Err(ConfigError::Invalid("motion.move_speed must be > 0".into()));
        }
        if self.motion.dwell_min > self.motion.dwell_max {
            return Err(ConfigError::Invalid(
                "motion.dwell_min must not exceed motion.dwell_max".into(),
            ));
        }
        if self.motion.slow_radius <= 0.0 {
            return Err(ConfigError::Invalid("motion.slow_radius must be > 0".into()));
        }
        if self.health.max_hp == 0 {
            return Err(ConfigError::Invalid("health.max_hp must be > 0".into()));
        }
        if self.snapshot_interval == 0 {
            return Err(ConfigError::Invalid("snapshot_interval must be >= 1".into()));
        }
        if !(0.0..=360.0).contains(&self.sensor.view_angle) {
            return Err(ConfigError::Invalid("sensor.view_angle must be in [0, 360]".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub view_radius: f32,
    /// Градусы; 360 = всенаправленный
    pub view_angle: f32,
    /// Радиус proximity-региона для contact flag (melee range)
    pub contact_radius: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            view_radius: 10.0,
            view_angle: 360.0,
            contact_radius: 0.6,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub move_speed: f32,
    /// Радиус случайной точки вокруг wander anchor
    pub max_distance: f32,
    pub arrive_epsilon: f32,
    pub dwell_min: f32,
    pub dwell_max: f32,
    pub slow_radius: f32,
    pub seek_weight: f32,
    pub flee_weight: f32,
    pub danger_radius: f32,
    /// Множитель flee weight внутри danger radius
    pub danger_multiplier: f32,
    /// Stop radius при следовании за лидером
    pub stop_radius_leader: f32,
    /// Stop radius при преследовании врага
    pub stop_radius_enemy: f32,
    pub boost_multiplier: f32,
    pub boost_duration: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            move_speed: 2.0,
            max_distance: 5.0,
            arrive_epsilon: 0.1,
            dwell_min: 3.0,
            dwell_max: 6.0,
            slow_radius: 3.0,
            seek_weight: 1.0,
            flee_weight: 1.6,
            danger_radius: 2.0,
            danger_multiplier: 1.5,
            stop_radius_leader: 2.0,
            stop_radius_enemy: 0.3,
            boost_multiplier: 1.5,
            boost_duration: 2.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Длительность attack cooldown (time units)
    pub speed_attack: f32,
    pub damage: u32,
    pub pursuit_abandon_radius: f32,
    pub follow_lock_duration: f32,
    pub reaggro_block_duration: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            speed_attack: 5.0,
            damage: 1,
            pursuit_abandon_radius: 6.0,
            follow_lock_duration: 1.5,
            reaggro_block_duration: 0.8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub max_hp: u32,
    /// Секунды между +1 HP regen
    pub regen_interval: f32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            max_hp: 10,
            regen_interval: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NameConfig {
    /// Пул имён, раздаваемых агентам при регистрации
    pub pool: Vec<String>,
}

impl Default for NameConfig {
    fn default() -> Self {
        Self {
            pool: ["zhuzha", "kisa", "tsypa", "zaya", "yaitsekus"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaypointConfig {
    pub name: String,
    pub position: [f32; 2],
}

impl WaypointConfig {
    pub fn new(name: impl Into<String>, position: [f32; 2]) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.motion.move_speed, 2.0);
        assert_eq!(config.combat.speed_attack, 5.0);
        assert_eq!(config.combat.follow_lock_duration, 1.5);
        assert_eq!(config.health.max_hp, 10);
        assert_eq!(config.waypoints.len(), 3);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let text = r#"
            snapshot_interval = 4

            [motion]
            move_speed = 3.5

            [[waypoints]]
            name = "Point_Base"
            position = [1.0, 2.0]
        "#;
        let config = SimulationConfig::from_toml_str(text).unwrap();
        assert_eq!(config.snapshot_interval, 4);
        assert_eq!(config.motion.move_speed, 3.5);
        assert_eq!(config.motion.flee_weight, 1.6);
        assert_eq!(config.waypoints.len(), 1);
        assert_eq!(config.waypoints[0].position, [1.0, 2.0]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let text = r#"
            [motion]
            dwell_min = 8.0
            dwell_max = 2.0
        "#;
        assert!(matches!(
            SimulationConfig::from_toml_str(text),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("snapshot_interval = \"x\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
