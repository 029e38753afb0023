//! Tests for CombatCoordinator transitions and the anti-oscillation policy.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::coordinator::*;
    use super::super::state::*;
    use crate::components::Velocity;
    use crate::config::SimulationConfig;
    use crate::movement::{Mover, WanderPhase};
    use crate::shared::{AgentId, SimTime};

    const ATTACKER: AgentId = AgentId(77);

    struct Rig {
        combatant: Combatant,
        mover: Mover,
        velocity: Velocity,
        position: Vec2,
        config: SimulationConfig,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                combatant: Combatant::default(),
                mover: Mover::new(2.0, Vec2::ZERO),
                velocity: Velocity(Vec2::new(1.0, 0.0)),
                position: Vec2::new(3.0, 4.0),
                config: SimulationConfig::default(),
            }
        }

        fn body(&mut self) -> Body<'_> {
            Body {
                agent: AgentId(1),
                position: self.position,
                combatant: &mut self.combatant,
                mover: Some(&mut self.mover),
                velocity: &mut self.velocity,
            }
        }

        fn follow(&mut self, now: SimTime) -> Transition {
            let config = self.config.clone();
            let goal = FollowGoal::Point {
                label: "Point_Mid".into(),
                position: Vec2::new(10.0, 0.0),
            };
            request_transition(&mut self.body(), CombatState::FollowDirective { goal }, PRIORITY_COMMAND, now, &config)
        }

        fn react(&mut self, now: SimTime, force_chase: bool) -> ReactionOutcome {
            let config = self.config.clone();
            react_to_attack(&mut self.body(), ATTACKER, force_chase, now, &config)
        }
    }

    #[test]
    fn test_follow_suspends_wander_and_arms_lock() {
        let mut rig = Rig::new();
        assert_eq!(rig.follow(0.0), Transition::Applied);

        assert_eq!(rig.combatant.follow_lock_until, 1.5);
        assert!(rig.mover.is_suspended());
        assert_eq!(rig.velocity.0, Vec2::ZERO);
    }

    #[test]
    fn test_follow_lock_holds_order_then_expires() {
        let mut rig = Rig::new();
        rig.follow(0.0);

        // t=0.5: под lock - приказ сохраняется, атакующий записан, boost
        assert_eq!(rig.react(0.5, false), ReactionOutcome::HeldByFollowLock);
        assert_eq!(rig.combatant.state.name(), "FollowDirective");
        assert_eq!(rig.combatant.last_attacker, Some(ATTACKER));
        assert!(rig.mover.is_boosted(0.5));

        // t=2.0: lock истёк → преследование
        assert_eq!(rig.react(2.0, false), ReactionOutcome::Engaged);
        assert_eq!(rig.combatant.state, CombatState::PursueHostile { target: ATTACKER });
    }

    #[test]
    fn test_reaggro_block_after_clear() {
        let mut rig = Rig::new();
        let config = rig.config.clone();
        request_transition(&mut rig.body(), CombatState::PursueHostile { target: AgentId(5) }, PRIORITY_COMMAND, 0.0, &config);
        request_transition(&mut rig.body(), CombatState::Wander, PRIORITY_COMMAND, 1.0, &config);

        // Wander re-anchor на текущей позиции
        assert_eq!(rig.mover.anchor, rig.position);
        assert_eq!(rig.mover.phase, WanderPhase::Pending);

        assert_eq!(rig.react(1.5, false), ReactionOutcome::HeldByReaggroBlock);
        assert_eq!(rig.combatant.state, CombatState::Wander);
        assert_eq!(rig.combatant.last_attacker, Some(ATTACKER));

        assert_eq!(rig.react(1.9, false), ReactionOutcome::Engaged);
    }

    #[test]
    fn test_force_chase_bypasses_locks() {
        let mut rig = Rig::new();
        rig.follow(0.0);
        assert_eq!(rig.react(0.1, true), ReactionOutcome::Engaged);
        assert_eq!(rig.combatant.state.target(), Some(ATTACKER));
    }

    #[test]
    fn test_attacking_refuses_reaction() {
        let mut rig = Rig::new();
        let config = rig.config.clone();
        request_transition(&mut rig.body(), CombatState::Attacking { target: AgentId(5) }, PRIORITY_COMMAND, 0.0, &config);
        assert_eq!(rig.combatant.attack_cooldown_until, 5.0);

        assert_eq!(rig.react(1.0, false), ReactionOutcome::Refused);
        assert_eq!(rig.combatant.state, CombatState::Attacking { target: AgentId(5) });

        // Операторская команда прерывает
        assert_eq!(rig.follow(1.0), Transition::Applied);
    }

    #[test]
    fn test_duplicate_reaction_changes_state_at_most_once() {
        // Внутри follow lock: ни одного перехода
        let mut rig = Rig::new();
        rig.follow(0.0);
        let before = rig.combatant.state.clone();
        rig.react(0.2, false);
        rig.react(0.3, false);
        assert_eq!(rig.combatant.state, before);

        // Без lock: ровно один переход
        let mut rig = Rig::new();
        let mut changes = 0;
        let mut previous = rig.combatant.state.clone();
        for now in [0.2, 0.3] {
            rig.react(now, false);
            if rig.combatant.state != previous {
                changes += 1;
                previous = rig.combatant.state.clone();
            }
        }
        assert_eq!(changes, 1);
        assert_eq!(rig.react(0.4, false), ReactionOutcome::AlreadyEngaged);
    }

    #[test]
    fn test_engagement_boost_and_pursuit_keeps_suspension() {
        let mut rig = Rig::new();
        let config = rig.config.clone();
        assert_eq!(engage(&mut rig.body(), AgentId(5), PRIORITY_COMMAND, 0.0, &config), Transition::Applied);
        assert!(rig.mover.is_boosted(1.9));
        assert!(!rig.mover.is_boosted(2.0));

        rig.velocity.0 = Vec2::new(0.5, 0.5);
        request_transition(&mut rig.body(), CombatState::Attacking { target: AgentId(5) }, PRIORITY_COMMAND, 0.5, &config);
        // Уже suspended - pursuit velocity не сбрасывается
        assert_eq!(rig.velocity.0, Vec2::new(0.5, 0.5));
    }
}
