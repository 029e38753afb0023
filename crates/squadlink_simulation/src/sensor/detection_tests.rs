//! Tests for target acquisition.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use proptest::prelude::*;

    use super::super::components::Sensor;
    use super::super::detection::*;
    use super::super::detection::Observer;
    use crate::components::{LayerMask, Obstacle};
    use crate::shared::{AgentId, TeamId};

    fn observer_at_origin() -> Observer {
        Observer {
            id: AgentId(1),
            team: TeamId(0),
            position: Vec2::ZERO,
            facing: Vec2::X,
        }
    }

    fn hostile(id: u64, position: Vec2) -> Candidate {
        Candidate {
            id: AgentId(id),
            team: TeamId(1),
            position,
            layers: LayerMask::UNITS,
            alive: true,
        }
    }

    #[test]
    fn test_detects_target_inside_radius() {
        let sensor = Sensor::default();
        let candidates = [hostile(2, Vec2::new(4.0, 0.0))];

        let target = detect_target(&observer_at_origin(), &sensor, &candidates, &[]);
        assert_eq!(target, Some(AgentId(2)));
    }

    #[test]
    fn test_nearest_wins() {
        let sensor = Sensor::default();
        let candidates = [
            hostile(2, Vec2::new(8.0, 0.0)),
            hostile(3, Vec2::new(0.0, -3.0)),
            hostile(4, Vec2::new(5.0, 5.0)),
        ];

        let target = detect_target(&observer_at_origin(), &sensor, &candidates, &[]);
        assert_eq!(target, Some(AgentId(3)));

        let all = detect_all_targets(&observer_at_origin(), &sensor, &candidates, &[]);
        assert_eq!(all, vec![AgentId(2), AgentId(3), AgentId(4)]);
    }

    #[test]
    fn test_rejects_team_dead_and_out_of_range() {
        let sensor = Sensor::default();
        let mut friend = hostile(2, Vec2::new(1.0, 0.0));
        friend.team = TeamId(0);
        let mut corpse = hostile(3, Vec2::new(2.0, 0.0));
        corpse.alive = false;
        let far = hostile(4, Vec2::new(10.5, 0.0));
        let mut prop = hostile(5, Vec2::new(3.0, 0.0));
        prop.layers = LayerMask::PROPS;

        let candidates = [friend, corpse, far, prop];
        assert_eq!(detect_target(&observer_at_origin(), &sensor, &candidates, &[]), None);
        assert_eq!(target_count(&observer_at_origin(), &sensor, &candidates, &[]), 0);
    }

    #[test]
    fn test_view_angle_filter() {
        let mut sensor = Sensor::default();
        sensor.set_view_angle(90.0);

        let ahead = hostile(2, Vec2::new(5.0, 1.0));
        let behind = hostile(3, Vec2::new(-2.0, 0.0));

        let candidates = [behind, ahead];
        assert_eq!(detect_target(&observer_at_origin(), &sensor, &candidates, &[]), Some(AgentId(2)));

        // Круговой обзор видит и того, кто сзади
        sensor.set_view_angle(360.0);
        assert_eq!(detect_target(&observer_at_origin(), &sensor, &candidates, &[]), Some(AgentId(3)));
    }

    #[test]
    fn test_obstructed_target_skipped_for_visible_one() {
        let sensor = Sensor::default();
        let near_blocked = hostile(2, Vec2::new(3.0, 0.0));
        let far_visible = hostile(3, Vec2::new(0.0, 6.0));
        let wall = Obstacle::wall(Vec2::new(1.5, -1.0), Vec2::new(1.5, 1.0));

        let target = detect_target(&observer_at_origin(), &sensor, &[near_blocked, far_visible], &[wall]);
        assert_eq!(target, Some(AgentId(3)));
    }

    #[test]
    fn test_detect_by_name() {
        let sensor = Sensor::default();
        let candidates = [hostile(2, Vec2::new(3.0, 0.0)), hostile(3, Vec2::new(4.0, 0.0))];
        let names = |id: AgentId| match id.0 {
            2 => Some("Kisa"),
            3 => Some("Zhuzha"),
            _ => None,
        };

        let found = detect_target_by_name(&observer_at_origin(), &sensor, &candidates, &[], names, "zhu");
        assert_eq!(found, Some(AgentId(3)));

        let missing = detect_target_by_name(&observer_at_origin(), &sensor, &candidates, &[], names, "tsypa");
        assert_eq!(missing, None);
    }

    proptest! {
        /// Если линия до каждого врага перекрыта - цели нет, при любых радиусах и углах
        #[test]
        fn prop_obstructed_candidates_never_detected(
            view_radius in 0.0f32..50.0,
            view_angle in 0.0f32..=360.0,
            facing_angle in 0.0f32..std::f32::consts::TAU,
            targets in prop::collection::vec((0.0f32..std::f32::consts::TAU, 0.5f32..40.0), 1..8),
        ) {
            let mut sensor = Sensor::default();
            sensor.set_view_radius(view_radius);
            sensor.set_view_angle(view_angle);

            let observer = Observer {
                facing: Vec2::from_angle(facing_angle),
                ..observer_at_origin()
            };

            let mut candidates = Vec::new();
            let mut obstacles = Vec::new();
            for (index, (angle, distance)) in targets.iter().enumerate() {
                let position = Vec2::from_angle(*angle) * *distance;
                candidates.push(hostile(index as u64 + 10, position));
                // Препятствие ровно на середине линии
                obstacles.push(Obstacle::circle(position * 0.5, 0.2));
            }

            prop_assert_eq!(detect_target(&observer, &sensor, &candidates, &obstacles), None);
            prop_assert!(detect_all_targets(&observer, &sensor, &candidates, &obstacles).is_empty());
        }
    }
}
