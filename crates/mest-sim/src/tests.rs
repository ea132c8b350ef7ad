//! Tests for the battlefield session, ledgers, objectives and scoring.

use serde_json::json;

use mest_core::commands::Command;
use mest_core::enums::*;
use mest_core::error::{CombatError, EngineError, MissionError, MoveError};
use mest_core::events::RulesEvent;
use mest_core::mission::{MissionConfig, ObjectiveConfig, TerrainEntry, Zone};
use mest_core::types::{ModelId, Position};
use mest_ai::ActionKind;

use crate::combat::{hit_probability, CombatModifiers};
use crate::dice::{DiceRoller, ScriptedDice};
use crate::engine::{Battlefield, SimConfig};
use crate::hindrance::HindranceTracker;
use crate::objectives::{ModelState, ObjectiveTracker};
use crate::roster::IdentifierPool;
use crate::tokens::{token_spec, TokenLedger};
use crate::victory::{final_result, outnumbering_bonus, resource_vp, EndGameSchedule, VictoryState};

// ---- Fixtures ----

fn bp_for(game_size: &str) -> u32 {
    match game_size {
        "small" => 600,
        "large" => 900,
        _ => 750,
    }
}

/// Mission with default-profile models deployed by the standard rules.
fn mission(game_size: &str, side_a: usize, side_b: usize) -> MissionConfig {
    let bp = bp_for(game_size);
    serde_json::from_value(json!({
        "name": "Test Skirmish",
        "gameSize": game_size,
        "battlefield": "48x48",
        "sideA": { "name": "Red", "bp": bp, "models": vec![json!({}); side_a] },
        "sideB": { "name": "Blue", "bp": bp, "models": vec![json!({}); side_b] },
    }))
    .unwrap()
}

/// Mission with explicit model positions.
fn placed_mission(side_a: &[(f64, f64)], side_b: &[(f64, f64)]) -> MissionConfig {
    let models = |points: &[(f64, f64)]| -> Vec<serde_json::Value> {
        points
            .iter()
            .map(|(x, y)| json!({ "position": { "x": x, "y": y } }))
            .collect()
    };
    serde_json::from_value(json!({
        "name": "Placed Skirmish",
        "gameSize": "medium",
        "battlefield": "48x48",
        "sideA": { "name": "Red", "bp": 750, "models": models(side_a) },
        "sideB": { "name": "Blue", "bp": 750, "models": models(side_b) },
    }))
    .unwrap()
}

fn loaded(config: MissionConfig) -> Battlefield {
    let mut bf = Battlefield::new(SimConfig::default());
    bf.load_mission(config).unwrap();
    bf
}

fn loaded_with_dice(config: MissionConfig, rolls: Vec<u8>) -> Battlefield {
    let mut bf = Battlefield::with_dice(SimConfig::default(), ScriptedDice::new(rolls));
    bf.load_mission(config).unwrap();
    bf
}

fn side_ids(bf: &Battlefield, side: Side) -> Vec<ModelId> {
    bf.roster().ids_for(side)
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let run = || {
        let mut bf = Battlefield::new(SimConfig {
            seed: 12345,
            ..Default::default()
        });
        bf.load_mission(mission("small", 4, 4)).unwrap();
        let mut snapshots = Vec::new();
        for _ in 0..12 {
            if bf.process_end_of_turn().unwrap() != MissionPhase::Active {
                break;
            }
            bf.start_new_turn().unwrap();
            snapshots.push(serde_json::to_string(&bf.snapshot()).unwrap());
        }
        snapshots.push(serde_json::to_string(&bf.snapshot()).unwrap());
        snapshots
    };
    assert_eq!(run(), run(), "Snapshots diverged with same seed");
}

#[test]
fn test_seeded_dice_in_range() {
    use rand::SeedableRng;
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
    for _ in 0..500 {
        let roll = rng.roll_d6();
        assert!((1..=6).contains(&roll));
    }
}

#[test]
fn test_scripted_dice_fallback() {
    let mut dice = ScriptedDice::new([2, 9]);
    assert_eq!(dice.roll_d6(), 2);
    assert_eq!(dice.roll_d6(), 6, "out-of-range scripted rolls are clamped");
    assert_eq!(dice.remaining(), 0);
    assert_eq!(dice.roll_2d6(), 12);
}

// ---- Mission loading ----

#[test]
fn test_load_mission_assigns_pool_identifiers() {
    let mut bf = loaded(mission("medium", 4, 4));
    let snap = bf.snapshot();
    let ids: Vec<&str> = snap.models.iter().map(|m| m.identifier.as_str()).collect();
    assert_eq!(ids, ["A", "B", "C", "D", "Z", "Y", "X", "W"]);
    assert_eq!(snap.turn, 1);
    assert_eq!(snap.phase, MissionPhase::Active);
    assert!(matches!(snap.events[0], RulesEvent::MissionLoaded { .. }));
}

#[test]
fn test_custom_identifiers_are_reserved() {
    let mut config = mission("medium", 4, 4);
    config.side_a.models[0].identifier = Some("Z".into());
    let mut bf = loaded(config);
    let snap = bf.snapshot();
    let ids: Vec<&str> = snap.models.iter().map(|m| m.identifier.as_str()).collect();
    assert_eq!(ids, ["Z", "A", "B", "C", "Y", "X", "W", "V"]);
}

#[test]
fn test_identifier_pool_reuses_with_suffix() {
    let mut pool = IdentifierPool::new();
    let first: Vec<String> = (0..14).map(|_| pool.assign(Side::SideA)).collect();
    assert_eq!(first.first().map(String::as_str), Some("A"));
    assert_eq!(first.last().map(String::as_str), Some("N"));
    assert_eq!(pool.assign(Side::SideA), "A2");
    // M and N are already taken by side A.
    let b: Vec<String> = (0..13).map(|_| pool.assign(Side::SideB)).collect();
    assert_eq!(b.last().map(String::as_str), Some("Z2"));
}

#[test]
fn test_standard_deployment_on_home_edges() {
    let mut bf = loaded(mission("medium", 4, 4));
    let snap = bf.snapshot();
    for model in &snap.models {
        match model.side {
            Side::SideA => assert!((model.position.y + 20.0).abs() < 1e-9),
            Side::SideB => assert!((model.position.y - 20.0).abs() < 1e-9),
        }
    }
    let xs: Vec<f64> = snap.models[..4].iter().map(|m| m.position.x).collect();
    assert_eq!(xs, [-3.0, -1.0, 1.0, 3.0]);
}

#[test]
fn test_bp_split_evenly() {
    let bf = loaded(mission("small", 4, 4));
    for id in side_ids(&bf, Side::SideA) {
        assert_eq!(bf.roster().info(id).unwrap().bp, 150);
    }
}

#[test]
fn test_bp_mismatch_lenient_and_strict() {
    let mut config = mission("small", 4, 4);
    config.side_b.bp = 900;

    let mut lenient = Battlefield::new(SimConfig::default());
    assert!(lenient.load_mission(config.clone()).is_ok());

    let mut strict = Battlefield::new(SimConfig {
        strict_bp: true,
        ..Default::default()
    });
    let err = strict.load_mission(config).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Mission(MissionError::BpMismatch {
            side: Side::SideB,
            bp: 900,
            ..
        })
    ));
    assert_eq!(strict.phase(), MissionPhase::Setup);
    assert!(strict.roster().is_empty());
}

#[test]
fn test_invalid_mission_leaves_state_untouched() {
    let mut bf = loaded(mission("medium", 4, 4));
    bf.start_new_turn().unwrap();
    let err = bf.load_mission(mission("medium", 3, 4)).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Mission(MissionError::ModelCountOutOfRange { count: 3, .. })
    ));
    assert_eq!(bf.turn(), 2);
    assert_eq!(bf.roster().len(), 8);
}

#[test]
fn test_custom_terrain_rejection_fails_load() {
    let mut config = mission("medium", 4, 4);
    config.terrain.custom = vec![
        TerrainEntry::new(TerrainKind::Building, 0.0, 0.0),
        TerrainEntry::new(TerrainKind::Wall, 1.0, 0.0),
    ];
    let mut bf = Battlefield::new(SimConfig::default());
    let err = bf.load_mission(config).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Mission(MissionError::TerrainPlacement { index: 1, .. })
    ));
}

#[test]
fn test_preset_terrain_loaded() {
    let mut config = mission("medium", 4, 4);
    config.terrain.preset = Some("urban".into());
    let bf = loaded(config);
    assert_eq!(bf.terrain().len(), 10);
}

// ---- Movement ----

#[test]
fn test_move_spends_ap_and_respects_budget() {
    let mut bf = loaded(mission("medium", 4, 4));
    let model = side_ids(&bf, Side::SideA)[0];
    let outcome = bf.move_model(model, Position::new(-3.0, -18.0)).unwrap();
    assert!((outcome.ap_cost - 1.0).abs() < 1e-9);
    assert!((bf.available_ap(model).unwrap() - 1.0).abs() < 1e-9);

    let err = bf.move_model(model, Position::new(-3.0, -14.0)).unwrap_err();
    assert!(matches!(err, EngineError::Move(MoveError::InsufficientAp { .. })));
    assert_eq!(bf.roster().position(model).unwrap(), Position::new(-3.0, -18.0));
}

#[test]
fn test_move_into_building_has_no_path() {
    let mut bf = loaded(mission("medium", 4, 4));
    bf.place_terrain(&TerrainEntry::new(TerrainKind::Building, -3.0, -17.0))
        .unwrap();
    let model = side_ids(&bf, Side::SideA)[0];
    let err = bf.move_model(model, Position::new(-3.0, -17.0)).unwrap_err();
    assert!(matches!(err, EngineError::Move(MoveError::NoPath { .. })));
}

#[test]
fn test_first_crossing_awards_rp_once() {
    let mut bf = loaded(placed_mission(
        &[(0.0, -0.5), (2.0, -0.5), (4.0, -10.0), (6.0, -10.0)],
        &[(0.0, 10.0), (2.0, 10.0), (4.0, 10.0), (6.0, 10.0)],
    ));
    let a = side_ids(&bf, Side::SideA);
    bf.move_model(a[0], Position::new(0.0, 0.5)).unwrap();
    bf.move_model(a[1], Position::new(2.0, 0.5)).unwrap();
    let snap = bf.snapshot();
    assert_eq!(snap.score.side_a.rp, 1);
    let crossings = snap
        .events
        .iter()
        .filter(|e| matches!(e, RulesEvent::FirstCrossing { .. }))
        .count();
    assert_eq!(crossings, 1);

    // Half the side is across: aggression at turn end.
    bf.process_end_of_turn().unwrap();
    assert_eq!(bf.victory().score(Side::SideA).vp, 1);
    bf.start_new_turn().unwrap();
    bf.process_end_of_turn().unwrap();
    assert_eq!(bf.victory().score(Side::SideA).vp, 1, "aggression is one-time");
}

#[test]
fn test_unknown_ids_are_errors() {
    let mut bf = loaded(mission("medium", 4, 4));
    let ghost = ModelId(99);
    assert!(matches!(
        bf.add_token(ghost, TokenKind::Wait, 1),
        Err(EngineError::UnknownModel(id)) if id == ghost
    ));
    assert!(matches!(bf.token_counts(ghost), Err(EngineError::UnknownModel(_))));
    assert!(matches!(
        bf.remove_terrain(mest_core::types::TerrainId(7)),
        Err(EngineError::UnknownTerrain(_))
    ));
}

// ---- Tokens and hindrances ----

#[test]
fn test_ko_is_not_stackable() {
    let mut bf = loaded(mission("medium", 4, 4));
    let model = side_ids(&bf, Side::SideB)[0];
    bf.add_token(model, TokenKind::Ko, 1).unwrap();
    bf.add_token(model, TokenKind::Ko, 1).unwrap();
    assert_eq!(bf.token_counts(model).unwrap()[&TokenKind::Ko], 1);
    assert_eq!(bf.victory().score(Side::SideA).eliminated_bp, 188);
}

#[test]
fn test_turn_scoped_tokens_purged() {
    let mut bf = loaded(mission("medium", 4, 4));
    let model = side_ids(&bf, Side::SideA)[0];
    for kind in [TokenKind::Hidden, TokenKind::Wait, TokenKind::Done, TokenKind::OutOfAmmo] {
        bf.add_token(model, kind, 1).unwrap();
    }
    bf.add_token(model, TokenKind::Delay, 1).unwrap();
    bf.start_new_turn().unwrap();
    let counts = bf.token_counts(model).unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts[&TokenKind::OutOfAmmo], 1);
    assert_eq!(counts[&TokenKind::Delay], 1);
}

#[test]
fn test_ledger_add_remove() {
    let mut ledger = TokenLedger::new();
    let m = ModelId(1);
    assert_eq!(ledger.add(m, TokenKind::Wait, 3), 3);
    assert_eq!(ledger.remove(m, TokenKind::Wait), 2);
    assert_eq!(ledger.remove(m, TokenKind::Hidden), 0);
    assert_eq!(ledger.add(m, TokenKind::Eliminated, 4), 1);
    ledger.clear_model(m);
    assert!(ledger.counts(m).is_empty());
    assert!(!token_spec(TokenKind::Eliminated).stackable);
    assert!(token_spec(TokenKind::Wound).stackable);
}

#[test]
fn test_hindrance_tokens_route_to_tracker() {
    let mut bf = loaded(mission("medium", 4, 4));
    let model = side_ids(&bf, Side::SideA)[1];
    assert_eq!(bf.add_token(model, TokenKind::Fear, 3).unwrap(), 3);
    let h = bf.hindrances(model).unwrap();
    assert_eq!(h.fear, 3);
    assert_eq!(
        bf.roster().statuses(model).unwrap(),
        vec![ModelStatus::Nervous, ModelStatus::Disordered, ModelStatus::Panicked]
    );
    assert_eq!(bf.token_counts(model).unwrap()[&TokenKind::Fear], 3);
    assert_eq!(bf.remove_token(model, TokenKind::Fear).unwrap(), 2);
    assert_eq!(bf.hindrances(model).unwrap().fear, 2);
}

#[test]
fn test_hindrance_threshold_monotonicity() {
    let mut tracker = HindranceTracker::new();
    let m = ModelId(3);
    let mut previous = Vec::new();
    for kind in [
        HindranceKind::Delay,
        HindranceKind::Fear,
        HindranceKind::Delay,
        HindranceKind::Fear,
        HindranceKind::Wound,
        HindranceKind::Fear,
    ] {
        let statuses = tracker.add(m, kind).statuses();
        assert!(previous.iter().all(|s| statuses.contains(s)));
        previous = statuses;
    }
    assert_eq!(previous.len(), 6);

    for kind in [HindranceKind::Delay, HindranceKind::Fear, HindranceKind::Wound] {
        for _ in 0..4 {
            tracker.remove(m, kind);
        }
    }
    assert_eq!(tracker.tracked(), 0);
    assert!(tracker.get(m).statuses().is_empty());
}

#[test]
fn test_delay_reduces_available_ap() {
    let mut bf = loaded(mission("medium", 4, 4));
    let model = side_ids(&bf, Side::SideA)[0];
    bf.add_hindrance(model, HindranceKind::Delay).unwrap();
    assert_eq!(bf.available_ap(model).unwrap(), 1.0);
    bf.add_hindrance(model, HindranceKind::Delay).unwrap();
    bf.add_hindrance(model, HindranceKind::Delay).unwrap();
    assert_eq!(bf.available_ap(model).unwrap(), -1.0);
    let snap = bf.snapshot();
    assert_eq!(snap.models[0].available_ap, 0.0);
}

#[test]
fn test_wounds_knock_out() {
    let mut bf = loaded(mission("medium", 4, 4));
    let model = side_ids(&bf, Side::SideB)[0];
    bf.add_hindrance(model, HindranceKind::Wound).unwrap();
    assert!(!bf.is_out_of_action(model));
    bf.add_hindrance(model, HindranceKind::Wound).unwrap();
    assert!(bf.is_out_of_action(model));
    let snap = bf.snapshot();
    assert!(snap
        .events
        .iter()
        .any(|e| *e == RulesEvent::ModelOutOfAction { model, token: TokenKind::Ko }));
    assert_eq!(snap.score.side_a.eliminated_bp, 188);
}

#[test]
fn test_clear_tokens_wipes_ledger_and_hindrances() {
    let mut bf = loaded(mission("medium", 4, 4));
    let model = side_ids(&bf, Side::SideA)[2];
    bf.add_token(model, TokenKind::Wait, 1).unwrap();
    bf.add_token(model, TokenKind::Fear, 2).unwrap();
    bf.add_hindrance(model, HindranceKind::Delay).unwrap();
    bf.add_hindrance(model, HindranceKind::Wound).unwrap();
    assert_eq!(bf.token_counts(model).unwrap().len(), 4);
    bf.snapshot();

    let before = bf.history().len();
    bf.clear_tokens(model).unwrap();
    assert!(bf.token_counts(model).unwrap().is_empty());
    assert_eq!(bf.hindrances(model).unwrap(), Default::default());
    assert!(bf.roster().statuses(model).unwrap().is_empty());
    assert_eq!(bf.available_ap(model).unwrap(), 2.0);
    assert_eq!(bf.history().len(), before + 1);
    assert_eq!(bf.history().last(), Some(&Command::ClearTokens { model }));

    let events = bf.snapshot().events;
    assert_eq!(events, vec![RulesEvent::StatusChanged { model, statuses: vec![] }]);

    // Replayed through the command surface, and idempotent.
    bf.execute(Command::ClearTokens { model }).unwrap();
    assert!(bf.snapshot().events.is_empty());
    assert!(bf.clear_tokens(ModelId(999)).is_err());
}

// ---- Combat ----

#[test]
fn test_hit_probability_exact() {
    let even = hit_probability(CombatModifiers { attack: 0, defence: 0 });
    assert!((even - 721.0 / 1296.0).abs() < 1e-12);
    assert_eq!(hit_probability(CombatModifiers { attack: 20, defence: 0 }), 1.0);
    assert_eq!(hit_probability(CombatModifiers { attack: 0, defence: 20 }), 0.0);
}

fn duel() -> MissionConfig {
    placed_mission(
        &[(0.0, -10.0), (10.0, -20.0), (12.0, -20.0), (14.0, -20.0)],
        &[(0.0, -9.5), (0.0, 10.0), (12.0, 20.0), (14.0, 20.0)],
    )
}

#[test]
fn test_close_combat_wounds_then_knocks_out() {
    let mut bf = loaded_with_dice(duel(), vec![6, 6, 1, 1]);
    let attacker = side_ids(&bf, Side::SideA)[0];
    let defender = side_ids(&bf, Side::SideB)[0];

    let roll = bf.resolve_combat(attacker, defender, CombatKind::Close).unwrap();
    assert_eq!((roll.attack_total, roll.defence_total), (14, 4));
    assert!(roll.hit);
    assert_eq!(bf.hindrances(defender).unwrap().wounds, 1);
    assert_eq!(bf.roster().ap_spent(attacker).unwrap(), 1.0);

    // Dice are exhausted: 6+6+2 against 6+6+2 still hits.
    assert!(bf.resolve_combat(attacker, defender, CombatKind::Close).unwrap().hit);
    assert!(bf.is_out_of_action(defender));

    bf.start_new_turn().unwrap();
    let err = bf.resolve_combat(attacker, defender, CombatKind::Close).unwrap_err();
    assert!(matches!(err, EngineError::Combat(CombatError::OutOfAction { .. })));
}

#[test]
fn test_combat_requires_ap() {
    let mut bf = loaded_with_dice(duel(), vec![]);
    let attacker = side_ids(&bf, Side::SideA)[0];
    let defender = side_ids(&bf, Side::SideB)[0];
    bf.add_hindrance(attacker, HindranceKind::Delay).unwrap();
    bf.add_hindrance(attacker, HindranceKind::Delay).unwrap();
    let err = bf.resolve_combat(attacker, defender, CombatKind::Close).unwrap_err();
    assert!(matches!(err, EngineError::Combat(CombatError::InsufficientAp { .. })));
}

#[test]
fn test_ranged_combat_checks() {
    let mut bf = loaded(duel());
    let a = side_ids(&bf, Side::SideA);
    let b = side_ids(&bf, Side::SideB);

    let err = bf.resolve_combat(a[0], b[1], CombatKind::Close).unwrap_err();
    assert!(matches!(err, EngineError::Combat(CombatError::OutOfRange { .. })));

    // 40 MU apart.
    let err = bf.resolve_combat(a[2], b[2], CombatKind::Ranged).unwrap_err();
    assert!(matches!(err, EngineError::Combat(CombatError::OutOfRange { .. })));

    bf.place_terrain(&TerrainEntry::new(TerrainKind::Building, 0.0, 0.0))
        .unwrap();
    let err = bf.resolve_combat(a[0], b[1], CombatKind::Ranged).unwrap_err();
    assert!(matches!(err, EngineError::Combat(CombatError::NoLineOfSight { .. })));

    bf.add_token(a[0], TokenKind::OutOfAmmo, 1).unwrap();
    let err = bf.resolve_combat(a[0], b[0], CombatKind::Ranged).unwrap_err();
    assert!(matches!(err, EngineError::Combat(CombatError::CannotShoot { .. })));

    let err = bf.resolve_combat(a[0], a[1], CombatKind::Ranged).unwrap_err();
    assert!(matches!(err, EngineError::Combat(CombatError::SameSide { .. })));
}

#[test]
fn test_estimate_combat_uses_cover() {
    let mut bf = loaded(duel());
    let a = side_ids(&bf, Side::SideA);
    let b = side_ids(&bf, Side::SideB);
    let open = bf.estimate_combat(a[1], b[1], CombatKind::Ranged).unwrap();
    // Wall just in front of the defender, across the line of fire.
    bf.place_terrain(&TerrainEntry::new(TerrainKind::Wall, 0.0, 9.0))
        .unwrap();
    let covered = bf.estimate_combat(a[1], b[1], CombatKind::Ranged).unwrap();
    assert!(covered < open);
}

// ---- Line of sight and cover ----

#[test]
fn test_los_building_blocks_hill_does_not() {
    let mut bf = loaded(duel());
    let a = side_ids(&bf, Side::SideA)[0];
    let b = side_ids(&bf, Side::SideB)[1];
    assert!(bf.validate_los(a, b).unwrap().has_los);

    let hill = bf
        .place_terrain(&TerrainEntry::new(TerrainKind::Hill, 0.0, 0.0).with_size(HillSize::Small))
        .unwrap();
    assert!(bf.validate_los(a, b).unwrap().has_los);

    bf.remove_terrain(hill).unwrap();
    bf.place_terrain(&TerrainEntry::new(TerrainKind::Building, 0.0, 0.0))
        .unwrap();
    let los = bf.validate_los(a, b).unwrap();
    assert!(!los.has_los);
    assert_eq!(los.blocked_by, Some(TerrainKind::Building));

    // Short range always sees.
    let near = side_ids(&bf, Side::SideB)[0];
    assert!(bf.validate_los(a, near).unwrap().has_los);
}

#[test]
fn test_defensive_bonus_behind_wall_and_on_hill() {
    let mut bf = loaded(placed_mission(
        &[(0.0, -2.0), (10.0, -10.0), (12.0, -20.0), (14.0, -20.0)],
        &[(0.0, 10.0), (2.0, 20.0), (12.0, 20.0), (14.0, 20.0)],
    ));
    let enemy = side_ids(&bf, Side::SideB)[0];
    bf.place_terrain(&TerrainEntry::new(TerrainKind::Wall, 0.0, -1.0))
        .unwrap();
    bf.place_terrain(&TerrainEntry::new(TerrainKind::Hill, 10.0, -10.0).with_size(HillSize::Medium))
        .unwrap();

    let behind_wall = bf
        .calculate_defensive_bonus(&Position::new(0.0, -2.0), &[enemy])
        .unwrap();
    assert_eq!(behind_wall.cover, CoverCategory::Hard);
    assert_eq!(behind_wall.total, 3);

    let on_hill = bf
        .calculate_defensive_bonus(&Position::new(10.0, -10.0), &[enemy])
        .unwrap();
    assert_eq!(on_hill.cover, CoverCategory::None);
    assert!(on_hill.elevated);
    assert_eq!(on_hill.total, 1);

    let alone = bf
        .calculate_defensive_bonus(&Position::new(10.0, -10.0), &[])
        .unwrap();
    assert_eq!(alone.total, 0, "elevation needs at least one enemy");
}

#[test]
fn test_best_defensive_position_steps_behind_wall() {
    let mut bf = loaded(placed_mission(
        &[(0.0, -3.5), (10.0, -20.0), (12.0, -20.0), (14.0, -20.0)],
        &[(0.0, 10.0), (2.0, 20.0), (12.0, 20.0), (14.0, 20.0)],
    ));
    let enemy = side_ids(&bf, Side::SideB)[0];
    bf.place_terrain(&TerrainEntry::new(TerrainKind::Wall, 0.0, -1.0))
        .unwrap();
    let start = Position::new(0.0, -3.5);
    assert_eq!(
        bf.calculate_defensive_bonus(&start, &[enemy]).unwrap().total,
        0
    );

    let best = bf.find_best_defensive_position(&start, &[enemy], 2.0).unwrap();
    assert_eq!(best.bonus.cover, CoverCategory::Hard);
    assert!(best.path_cost <= 2.0);
    assert!((best.score - (best.bonus.total as f64 - best.path_cost)).abs() < 1e-12);
    assert!(best.score > 2.5);

    let stay = bf.find_best_defensive_position(&start, &[enemy], 0.0).unwrap();
    assert_eq!(stay.position, start);
}

// ---- Objectives ----

fn state(id: u32, side: Side, identifier: &str, x: f64, y: f64) -> ModelState {
    ModelState {
        id: ModelId(id),
        side,
        identifier: identifier.into(),
        position: Position::new(x, y),
        ko: false,
        eliminated: false,
    }
}

fn objective(kind: ObjectiveKind) -> ObjectiveConfig {
    ObjectiveConfig {
        kind,
        target: None,
        location: None,
        duration: None,
        points: 2,
        description: None,
        side: None,
    }
}

#[test]
fn test_objective_idempotence() {
    let mut config = mission("medium", 4, 4);
    config.objectives = vec![ObjectiveConfig {
        target: Some("Z".into()),
        points: 3,
        ..objective(ObjectiveKind::Eliminate)
    }];
    let mut bf = loaded(config);
    let report = bf.check_objectives().unwrap();
    assert_eq!(report.active, ["objective-0"]);

    let z = bf.roster().find_by_identifier("Z").unwrap();
    bf.add_token(z, TokenKind::Ko, 1).unwrap();
    let first = bf.check_objectives().unwrap();
    assert_eq!(first.completed, ["objective-0"]);
    assert_eq!(first.awarded.len(), 1);
    assert_eq!(bf.victory().score(Side::SideA).vp, 3);

    let again = bf.check_objectives().unwrap();
    assert!(again.awarded.is_empty());
    assert_eq!(bf.victory().score(Side::SideA).vp, 3);
    bf.process_end_of_turn().unwrap();
    assert_eq!(bf.victory().score(Side::SideA).vp, 3);
}

#[test]
fn test_control_objective_honours_duration() {
    let mut tracker = ObjectiveTracker::new();
    tracker.set_objectives(&[ObjectiveConfig {
        location: Some(Zone { x: 0.0, y: 0.0, radius: 3.0 }),
        duration: Some(2),
        side: Some(Side::SideB),
        ..objective(ObjectiveKind::Control)
    }]);
    let held = vec![
        state(1, Side::SideA, "A", 0.0, 1.0),
        state(2, Side::SideB, "Z", 1.0, 0.0),
        state(3, Side::SideB, "Y", -1.0, 0.0),
    ];
    let contested = vec![
        state(1, Side::SideA, "A", 0.0, 1.0),
        state(2, Side::SideB, "Z", 1.0, 0.0),
    ];

    tracker.end_of_turn(&held);
    assert!(tracker.check(&held, 1).awarded.is_empty());
    tracker.end_of_turn(&contested);
    assert_eq!(tracker.objectives()[0].control_streak, 0);
    tracker.end_of_turn(&held);
    tracker.end_of_turn(&held);
    let report = tracker.check(&held, 4);
    assert_eq!(report.awarded.len(), 1);
    assert_eq!(report.awarded[0].side, Side::SideB);
}

#[test]
fn test_control_without_duration_completes_on_contact() {
    let mut tracker = ObjectiveTracker::new();
    tracker.set_objectives(&[ObjectiveConfig {
        location: Some(Zone { x: 0.0, y: 0.0, radius: 3.0 }),
        ..objective(ObjectiveKind::Control)
    }]);
    let tie = vec![state(1, Side::SideA, "A", 0.0, 1.0), state(2, Side::SideB, "Z", 1.0, 0.0)];
    assert!(tracker.check(&tie, 1).awarded.is_empty(), "a tie is contested");
    let mut ko = tie.clone();
    ko[1].ko = true;
    assert_eq!(tracker.check(&ko, 1).awarded.len(), 1);
}

#[test]
fn test_other_objective_kinds() {
    let zone = Some(Zone { x: 5.0, y: 5.0, radius: 2.0 });
    let mut tracker = ObjectiveTracker::new();
    tracker.set_objectives(&[
        ObjectiveConfig {
            duration: Some(3),
            ..objective(ObjectiveKind::Survive)
        },
        ObjectiveConfig {
            location: zone,
            ..objective(ObjectiveKind::Capture)
        },
        ObjectiveConfig {
            target: Some("B".into()),
            location: zone,
            ..objective(ObjectiveKind::Escort)
        },
        ObjectiveConfig {
            target: Some("Z".into()),
            ..objective(ObjectiveKind::Intercept)
        },
        ObjectiveConfig {
            target: Some("Y".into()),
            ..objective(ObjectiveKind::Destroy)
        },
    ]);
    let mut models = vec![
        state(1, Side::SideA, "A", 0.0, 0.0),
        state(2, Side::SideA, "B", 5.0, 5.5),
        state(3, Side::SideB, "Z", 0.0, 3.0),
        state(4, Side::SideB, "Y", 20.0, 20.0),
    ];
    models[3].ko = true;

    let report = tracker.check(&models, 2);
    let done: Vec<&str> = report.awarded.iter().map(|a| a.objective.as_str()).collect();
    assert_eq!(done, ["objective-1", "objective-2"]);

    models[0].position = Position::new(0.0, 2.5);
    models[3].eliminated = true;
    let report = tracker.check(&models, 3);
    let done: Vec<&str> = report.awarded.iter().map(|a| a.objective.as_str()).collect();
    assert_eq!(done, ["objective-0", "objective-3", "objective-4"]);
    assert!(report.active.is_empty());
}

// ---- Turn end and victory ----

#[test]
fn test_morale_test_triggers_once() {
    let mut bf = loaded(mission("medium", 4, 4));
    let b = side_ids(&bf, Side::SideB);
    for &id in &b[..3] {
        bf.add_token(id, TokenKind::Ko, 1).unwrap();
    }
    assert!(matches!(
        bf.resolve_morale_test(Side::SideB, true),
        Err(EngineError::NoMoraleTestPending(Side::SideB))
    ));
    bf.process_end_of_turn().unwrap();
    let snap = bf.snapshot();
    assert!(snap
        .events
        .contains(&RulesEvent::MoraleTestTriggered { side: Side::SideB }));
    assert_eq!(snap.phase, MissionPhase::Active);

    bf.resolve_morale_test(Side::SideB, false).unwrap();
    assert!(bf.victory().score(Side::SideB).bottled_out);
    bf.start_new_turn().unwrap();
    bf.process_end_of_turn().unwrap();
    assert!(!bf
        .snapshot()
        .events
        .iter()
        .any(|e| matches!(e, RulesEvent::MoraleTestTriggered { .. })));

    let result = bf.mission_result();
    assert_eq!(result.side_a.bottled_out_bonus, 1);
    assert_eq!(result.side_a.elimination, 1);
    assert_eq!(result.winner, Some(Side::SideA));
}

#[test]
fn test_no_opposing_models_ends_mission() {
    let mut bf = loaded(mission("medium", 4, 4));
    for id in side_ids(&bf, Side::SideA) {
        bf.add_token(id, TokenKind::Eliminated, 1).unwrap();
    }
    assert_eq!(
        bf.process_end_of_turn().unwrap(),
        MissionPhase::Ended(EndReason::NoOpposingModels)
    );
    assert!(matches!(bf.start_new_turn(), Err(EngineError::MissionNotActive)));
    assert_eq!(bf.mission_result().reason, Some(EndReason::NoOpposingModels));
    assert_eq!(bf.mission_result().winner, Some(Side::SideB));
}

#[test]
fn test_final_kill_scores_objective_before_mission_ends() {
    let mut config = mission("medium", 4, 4);
    let mut bf = loaded(config.clone());
    let target = side_ids(&bf, Side::SideB)[0];
    let identifier = bf.roster().info(target).unwrap().identifier.clone();
    config.objectives = vec![ObjectiveConfig {
        target: Some(identifier),
        side: Some(Side::SideA),
        ..objective(ObjectiveKind::Eliminate)
    }];
    bf = loaded(config);

    for id in side_ids(&bf, Side::SideB) {
        bf.add_token(id, TokenKind::Eliminated, 1).unwrap();
    }
    assert_eq!(
        bf.process_end_of_turn().unwrap(),
        MissionPhase::Ended(EndReason::NoOpposingModels)
    );
    assert!(bf.objectives().is_completed("objective-0"));
    assert_eq!(bf.victory().score(Side::SideA).vp, 2);
}

#[test]
fn test_turn_limit_ends_mission() {
    let mut config = mission("large", 4, 4);
    config.special_rules.turn_limit = Some(2);
    let mut bf = loaded(config);
    assert_eq!(bf.process_end_of_turn().unwrap(), MissionPhase::Active);
    bf.start_new_turn().unwrap();
    assert_eq!(
        bf.process_end_of_turn().unwrap(),
        MissionPhase::Ended(EndReason::TurnLimit)
    );
}

#[test]
fn test_end_game_schedule() {
    let small = EndGameSchedule::for_size(GameSize::Small);
    assert_eq!(small.trigger_turn, 4);
    assert_eq!((3..=7).map(|t| small.dice_at(t)).collect::<Vec<_>>(), [0, 1, 1, 2, 2]);
    assert_eq!(EndGameSchedule::for_size(GameSize::Medium).trigger_turn, 6);
    assert_eq!(EndGameSchedule::for_size(GameSize::Large).extra_turns, [10]);
}

#[test]
fn test_end_game_override() {
    let config = SimConfig {
        end_game: Some(EndGameSchedule {
            trigger_turn: 1,
            extra_turns: vec![],
        }),
        ..Default::default()
    };
    let mut bf = Battlefield::with_dice(config, ScriptedDice::new([1]));
    bf.load_mission(mission("large", 4, 4)).unwrap();
    assert_eq!(
        bf.process_end_of_turn().unwrap(),
        MissionPhase::Ended(EndReason::EndGameTrigger)
    );
}

#[test]
fn test_outnumbering_and_resource_vp() {
    assert_eq!(outnumbering_bonus(4, 8), Some((Side::SideA, 2)));
    assert_eq!(outnumbering_bonus(9, 6), Some((Side::SideB, 1)));
    assert_eq!(outnumbering_bonus(5, 6), None);
    assert_eq!(resource_vp(20, 10), 2);
    assert_eq!(resource_vp(12, 6), 1);
    assert_eq!(resource_vp(5, 5), 0);
    assert_eq!(resource_vp(3, 5), 0);
}

#[test]
fn test_final_result_is_pure() {
    let mut state = VictoryState::new(4, 8);
    state.record_loss(ModelId(7), Side::SideB, 100);
    let a = final_result(&state, [4, 7], 5, Some(EndReason::TurnLimit));
    let b = final_result(&state, [4, 7], 5, Some(EndReason::TurnLimit));
    assert_eq!(a, b);
    assert_eq!(a.side_a.accrued, 2);
    assert_eq!(a.side_a.elimination, 1);
    assert_eq!(a.winner, Some(Side::SideA));
}

#[test]
fn test_winner_tiebreaks() {
    let draw = final_result(&VictoryState::new(4, 4), [4, 4], 3, None);
    assert_eq!(draw.winner, None);

    let mut state = VictoryState::new(4, 4);
    state.add_vp(Side::SideA, 1);
    state.add_rp(Side::SideB, 1);
    let result = final_result(&state, [4, 4], 3, None);
    assert_eq!(result.side_a.total(), result.side_b.total());
    assert_eq!(result.winner, Some(Side::SideB));
}

// ---- AI ----

#[test]
fn test_decide_action_attacks_adjacent_enemy() {
    let bf = loaded(placed_mission(
        &[(0.0, 0.0), (10.0, -20.0), (12.0, -20.0), (14.0, -20.0)],
        &[(0.0, 0.8), (2.0, 20.0), (12.0, 20.0), (14.0, 20.0)],
    ));
    let actor = side_ids(&bf, Side::SideA)[0];
    let target = side_ids(&bf, Side::SideB)[0];
    let choice = bf.decide_action(actor).unwrap();
    assert_eq!(choice.action, ActionKind::CloseCombat { target });
}

#[test]
fn test_ai_profile_from_mission() {
    let mut config = mission("medium", 4, 4);
    config.side_b.ai_profile = Some("aggressive".into());
    config.side_a.ai_profile = Some("berserk".into());
    let bf = loaded(config);
    assert_eq!(bf.ai_profile(Side::SideB), mest_ai::AiProfileKind::Aggressive);
    assert_eq!(bf.ai_profile(Side::SideA), mest_ai::AiProfileKind::Balanced);
}

// ---- Commands ----

#[test]
fn test_execute_records_history() {
    let mut bf = Battlefield::new(SimConfig::default());
    bf.execute(Command::LoadMission {
        mission: Box::new(mission("medium", 4, 4)),
    })
    .unwrap();
    let model = side_ids(&bf, Side::SideA)[0];
    bf.execute(Command::AddToken {
        model,
        token: TokenKind::Wait,
        count: None,
    })
    .unwrap();
    assert!(bf
        .execute(Command::RemoveTerrain {
            id: mest_core::types::TerrainId(1)
        })
        .is_err());
    assert_eq!(bf.history().len(), 2, "failed commands are not recorded");
    assert_eq!(bf.token_counts(model).unwrap()[&TokenKind::Wait], 1);
}

#[test]
fn test_commands_round_trip_json() {
    let json = r#"{"type":"MoveModel","model":3,"target":{"x":1.5,"y":-2.0}}"#;
    let command: Command = serde_json::from_str(json).unwrap();
    assert!(matches!(command, Command::MoveModel { model: ModelId(3), .. }));
}

#[test]
fn test_terrain_commands_emit_events() {
    let mut bf = Battlefield::new(SimConfig::default());
    let entry = TerrainEntry::new(TerrainKind::Debris, 5.0, 5.0);
    assert!(bf.is_valid_placement(&entry).is_ok());
    let id = bf.place_terrain(&entry).unwrap();
    bf.clear_terrain();
    assert!(bf.terrain().is_empty());
    let snap = bf.snapshot();
    assert_eq!(
        snap.events,
        vec![
            RulesEvent::TerrainPlaced { id, kind: TerrainKind::Debris },
            RulesEvent::TerrainRemoved { id },
        ]
    );
    assert!(snap.battlefield.is_none());
}

// ---- Full missions ----

#[test]
fn test_small_mission_end_game_dice() {
    let mut bf = loaded_with_dice(mission("small", 4, 4), vec![5, 4, 6, 2]);
    for turn in 1..=5 {
        assert_eq!(bf.process_end_of_turn().unwrap(), MissionPhase::Active, "turn {turn}");
        bf.start_new_turn().unwrap();
    }
    assert_eq!(
        bf.process_end_of_turn().unwrap(),
        MissionPhase::Ended(EndReason::EndGameTrigger)
    );
    let snap = bf.snapshot();
    let rolls: Vec<Vec<u8>> = snap
        .events
        .iter()
        .filter_map(|e| match e {
            RulesEvent::EndGameRoll { rolls, .. } => Some(rolls.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(rolls, vec![vec![5u8], vec![4], vec![6, 2]]);
    assert_eq!(bf.mission_result().turn, 6);
    assert_eq!(bf.mission_result().winner, None);
}

#[test]
fn test_history_replays_to_same_state() {
    let mut original = Battlefield::new(SimConfig::default());
    original.load_mission(mission("medium", 4, 4)).unwrap();
    let a = side_ids(&original, Side::SideA);
    let b = side_ids(&original, Side::SideB);
    original.move_model(a[0], Position::new(-3.0, -17.0)).unwrap();
    original.add_token(b[1], TokenKind::Fear, 2).unwrap();
    original
        .place_terrain(&TerrainEntry::new(TerrainKind::TreeCluster, 0.0, 0.0))
        .unwrap();
    original.process_end_of_turn().unwrap();
    original.start_new_turn().unwrap();

    let mut replay = Battlefield::new(SimConfig::default());
    for command in original.history().to_vec() {
        replay.execute(command).unwrap();
    }
    assert_eq!(
        serde_json::to_string(&original.snapshot()).unwrap(),
        serde_json::to_string(&replay.snapshot()).unwrap()
    );
    assert_eq!(original.history().len(), replay.history().len());
}
