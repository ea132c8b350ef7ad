//! Scoring through the public battlefield API with mission files as JSON.

use mest_sim::core::enums::{EndReason, MissionPhase, Side, TokenKind};
use mest_sim::core::mission::MissionConfig;
use mest_sim::{Battlefield, ScriptedDice, SimConfig};

fn mission_json(side_a: usize, side_b: usize, objectives: &str) -> String {
    let models = |n: usize| vec!["{}"; n].join(",");
    format!(
        r#"{{
            "name": "Hold the Crossroads",
            "gameSize": "medium",
            "battlefield": "48x48",
            "sideA": {{ "name": "Red", "bp": 750, "models": [{}] }},
            "sideB": {{ "name": "Blue", "bp": 750, "models": [{}] }},
            "objectives": {objectives}
        }}"#,
        models(side_a),
        models(side_b),
    )
}

fn load(json: &str, rolls: Vec<u8>) -> Battlefield {
    let mission = MissionConfig::from_json(json).unwrap();
    let mut bf = Battlefield::with_dice(SimConfig::default(), ScriptedDice::new(rolls));
    bf.load_mission(mission).unwrap();
    bf
}

#[test]
fn outnumbered_side_wins_on_bonus() {
    let bf = load(&mission_json(4, 8, "[]"), vec![]);
    assert_eq!(bf.victory().score(Side::SideA).vp, 2);
    assert_eq!(bf.victory().score(Side::SideB).vp, 0);

    let result = bf.mission_result();
    assert_eq!(result.side_a.accrued, 2);
    assert_eq!(result.winner, Some(Side::SideA));
    assert_eq!(result, bf.mission_result());
}

#[test]
fn objective_points_awarded_once() {
    let objectives = r#"[{ "type": "eliminate", "target": "Y", "points": 2, "side": "side-a" }]"#;
    let mut bf = load(&mission_json(4, 4, objectives), vec![]);
    let y = bf.roster().find_by_identifier("Y").unwrap();
    bf.add_token(y, TokenKind::Eliminated, 1).unwrap();

    for _ in 0..3 {
        bf.check_objectives().unwrap();
    }
    bf.process_end_of_turn().unwrap();
    assert_eq!(bf.victory().score(Side::SideA).vp, 2);
    assert!(bf.objectives().is_completed("objective-0"));
}

#[test]
fn medium_mission_runs_to_end_game() {
    // Turns 6 and 7 hold; turn 8 rolls two dice and one misses.
    let mut bf = load(&mission_json(4, 4, "[]"), vec![4, 5, 6, 1]);
    let mut turns = 1;
    while bf.process_end_of_turn().unwrap() == MissionPhase::Active {
        turns = bf.start_new_turn().unwrap();
    }
    assert_eq!(turns, 8);
    assert_eq!(bf.phase(), MissionPhase::Ended(EndReason::EndGameTrigger));
    assert_eq!(bf.mission_result().reason, Some(EndReason::EndGameTrigger));
}
