//! Фиксированный набор внешних команд

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    GoToBase,
    GoToMid,
    GoToLair,
    Patrol,
    FollowMe,
    StopFollow,
    AttackEnemy,
    Stop,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::GoToBase,
        Action::GoToMid,
        Action::GoToLair,
        Action::Patrol,
        Action::FollowMe,
        Action::StopFollow,
        Action::AttackEnemy,
        Action::Stop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::GoToBase => "GoToBase",
            Action::GoToMid => "GoToMid",
            Action::GoToLair => "GoToLair",
            Action::Patrol => "Patrol",
            Action::FollowMe => "FollowMe",
            Action::StopFollow => "StopFollow",
            Action::AttackEnemy => "AttackEnemy",
            Action::Stop => "Stop",
        }
    }

    /// Именованная точка для GoTo* команд
    pub fn waypoint(&self) -> Option<&'static str> {
        match self {
            Action::GoToBase => Some("Point_Base"),
            Action::GoToMid => Some("Point_Mid"),
            Action::GoToLair => Some("Point_Lair"),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = CommandError;

    /// Точное совпадение имени (fuzzy matching - забота внешнего распознавателя)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| CommandError::UnknownAction(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_actions() {
        for action in Action::ALL {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
    }

    #[test]
    fn test_unknown_action_is_error() {
        assert!(matches!(
            "Dance".parse::<Action>(),
            Err(CommandError::UnknownAction(name)) if name == "Dance"
        ));
        // Без fuzzy: регистр важен
        assert!("patrol".parse::<Action>().is_err());
    }

    #[test]
    fn test_waypoints() {
        assert_eq!(Action::GoToLair.waypoint(), Some("Point_Lair"));
        assert_eq!(Action::Patrol.waypoint(), None);
    }
}
