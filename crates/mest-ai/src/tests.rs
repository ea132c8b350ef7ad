#[cfg(test)]
mod tests {
    use mest_core::enums::{CombatKind, Side};
    use mest_core::types::{ModelId, Position};

    use crate::profiles::{get_profile, AiProfileKind};
    use crate::scorer::*;

    /// Open-ground stand-in for the battlefield.
    struct StubView {
        los: bool,
        hit: f64,
        shelter: Option<Position>,
    }

    impl TacticalView for StubView {
        fn has_line_of_sight(&self, _from: ModelId, _to: ModelId) -> bool {
            self.los
        }

        fn hit_chance(&self, _attacker: ModelId, _defender: ModelId, _kind: CombatKind) -> f64 {
            self.hit
        }

        fn defensive_bonus(&self, at: &Position, _enemies: &[Position]) -> i32 {
            if Some(*at) == self.shelter {
                3
            } else {
                0
            }
        }

        fn best_defensive_position(&self, start: &Position, _enemies: &[Position], _max_ap: f64) -> Position {
            self.shelter.unwrap_or(*start)
        }

        fn closest_reachable_point(&self, start: &Position, target: &Position, max_ap: f64) -> Position {
            let reach = max_ap * 2.0;
            let d = start.distance_to(target);
            if d <= reach {
                *target
            } else {
                start.lerp(target, reach / d)
            }
        }
    }

    fn stub(los: bool, hit: f64) -> StubView {
        StubView {
            los,
            hit,
            shelter: None,
        }
    }

    fn unit(id: u32, side: Side, x: f64, y: f64) -> UnitView {
        UnitView {
            id: ModelId(id),
            side,
            position: Position::new(x, y),
            available_ap: 2.0,
            can_shoot: true,
            hidden: false,
        }
    }

    #[test]
    fn test_adjacent_enemy_draws_close_combat() {
        let actor = unit(1, Side::SideA, 0.0, 0.0);
        let enemy = unit(2, Side::SideB, 0.0, 0.8);
        let choice = decide_action(
            &actor,
            &[enemy],
            &stub(true, 0.6),
            &get_profile(AiProfileKind::Balanced),
        );
        assert_eq!(choice.action, ActionKind::CloseCombat { target: ModelId(2) });
        assert!((choice.score - (10.0 * 0.6 - 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_distant_unseen_enemy_draws_advance() {
        let actor = unit(1, Side::SideA, 0.0, 0.0);
        let enemy = unit(2, Side::SideB, 0.0, 12.0);
        let view = stub(false, 0.5);
        let choice = decide_action(&actor, &[enemy], &view, &get_profile(AiProfileKind::Balanced));
        match choice.action {
            ActionKind::Move { target } => assert!((target.y - 4.0).abs() < 1e-9),
            other => panic!("expected a move, got {other:?}"),
        }

        let cautious = decide_action(&actor, &[enemy], &view, &get_profile(AiProfileKind::Cautious));
        assert_eq!(cautious.action, ActionKind::Wait);
    }

    #[test]
    fn test_no_ap_means_wait() {
        let mut actor = unit(1, Side::SideA, 0.0, 0.0);
        actor.available_ap = 0.0;
        let enemy = unit(2, Side::SideB, 0.5, 0.0);
        let candidates = enumerate_actions(
            &actor,
            &[enemy],
            &stub(true, 1.0),
            &get_profile(AiProfileKind::Aggressive),
        );
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].action, ActionKind::Wait);
    }

    #[test]
    fn test_ranged_requires_ammunition() {
        let mut actor = unit(1, Side::SideA, 0.0, 0.0);
        let enemy = unit(2, Side::SideB, 0.0, 12.0);
        let view = stub(true, 0.5);
        let profile = get_profile(AiProfileKind::Balanced);

        let shooting = decide_action(&actor, &[enemy], &view, &profile);
        assert_eq!(shooting.action, ActionKind::RangedCombat { target: ModelId(2) });

        actor.can_shoot = false;
        let candidates = enumerate_actions(&actor, &[enemy], &view, &profile);
        assert!(candidates
            .iter()
            .all(|c| !matches!(c.action, ActionKind::RangedCombat { .. })));
    }

    #[test]
    fn test_ties_go_to_first_candidate() {
        let actor = unit(1, Side::SideA, 0.0, 0.0);
        let enemy = unit(2, Side::SideB, 1.0, 0.0);
        // Cautious scores ranged and close combat identically.
        let choice = decide_action(
            &actor,
            &[enemy],
            &stub(true, 1.0),
            &get_profile(AiProfileKind::Cautious),
        );
        assert_eq!(choice.action, ActionKind::CloseCombat { target: ModelId(2) });
    }

    #[test]
    fn test_cautious_takes_cover() {
        let actor = unit(1, Side::SideA, 0.0, 0.0);
        let enemy = unit(2, Side::SideB, 0.0, 20.0);
        let shelter = Position::new(1.5, 0.5);
        let view = StubView {
            los: false,
            hit: 0.5,
            shelter: Some(shelter),
        };
        let choice = decide_action(&actor, &[enemy], &view, &get_profile(AiProfileKind::Cautious));
        assert_eq!(choice.action, ActionKind::Move { target: shelter });
        assert!((choice.heuristic - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_scores_subtract_ap_penalty() {
        let actor = unit(1, Side::SideA, 0.0, 0.0);
        let enemy = unit(2, Side::SideB, 0.0, 6.0);
        let candidates = enumerate_actions(
            &actor,
            &[enemy],
            &stub(true, 0.4),
            &get_profile(AiProfileKind::Balanced),
        );
        assert!(candidates.iter().any(|c| c.action == ActionKind::Hide));
        for c in &candidates {
            assert_eq!(c.score, c.heuristic - AP_PENALTY * c.action.ap_cost());
        }
    }

    #[test]
    fn test_profile_names() {
        assert_eq!(AiProfileKind::from_name("Aggressive"), Some(AiProfileKind::Aggressive));
        assert_eq!(AiProfileKind::from_name("defensive"), Some(AiProfileKind::Cautious));
        assert_eq!(AiProfileKind::from_name("berserk"), None);
        for kind in AiProfileKind::ALL {
            assert_eq!(get_profile(kind).kind, kind);
        }
    }
}
