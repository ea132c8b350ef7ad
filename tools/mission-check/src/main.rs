//! mission-check: validate MEST QSR mission files and preview deployment.
//!
//! Usage:
//!   mission-check check skirmish.json --strict
//!   mission-check snapshot skirmish.json --seed 7
//!   mission-check presets

use std::path::{Path, PathBuf};
use std::process;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use mest_core::enums::Side;
use mest_core::mission::MissionConfig;
use mest_sim::{Battlefield, SimConfig};
use mest_terrain::presets::{preset_layout, PRESET_NAMES};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "check" => cmd_check(&args[2..]),
        "snapshot" => cmd_snapshot(&args[2..]),
        "presets" => cmd_presets(),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "mission-check: MEST QSR mission validation tool\n\
         \n\
         Commands:\n\
         \n\
         check     Validate a mission file and print its deployment\n\
         \n\
           <path>             Mission JSON file\n\
           --strict           Reject BP outside the game-size band\n\
         \n\
         snapshot  Load a mission and print the opening snapshot as JSON\n\
         \n\
           <path>             Mission JSON file\n\
           --seed <N>         Dice seed (default: 42)\n\
           --strict           Reject BP outside the game-size band\n\
         \n\
         presets   List terrain presets and their piece counts\n\
         \n\
         Set RUST_LOG=info (or debug) for engine logs.\n"
    );
}

fn parse_path(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .find(|a| !a.starts_with("--") && a.parse::<u64>().is_err())
        .map(PathBuf::from)
}

fn parse_seed(args: &[String], default: u64) -> u64 {
    for i in 0..args.len() {
        if args[i] == "--seed" && i + 1 < args.len() {
            if let Ok(n) = args[i + 1].parse::<u64>() {
                return n;
            }
        }
    }
    default
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn read_mission(path: &Path) -> MissionConfig {
    let json = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {e}", path.display());
            process::exit(1);
        }
    };
    match MissionConfig::from_json(&json) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error parsing {}: {e}", path.display());
            process::exit(1);
        }
    }
}

fn load(args: &[String]) -> Battlefield {
    let path = match parse_path(args) {
        Some(p) => p,
        None => {
            eprintln!("Error: mission file path is required");
            process::exit(1);
        }
    };
    let config = SimConfig {
        seed: parse_seed(args, 42),
        strict_bp: has_flag(args, "--strict"),
        ..Default::default()
    };
    debug!(path = %path.display(), seed = config.seed, strict = config.strict_bp, "loading mission");

    let mission = read_mission(&path);
    let mut battlefield = Battlefield::new(config);
    if let Err(e) = battlefield.load_mission(mission) {
        eprintln!("Invalid mission {}: {e}", path.display());
        process::exit(1);
    }
    battlefield
}

// --- Check command ---

fn cmd_check(args: &[String]) {
    let battlefield = load(args);
    let Some(mission) = battlefield.mission() else {
        return;
    };
    let size = battlefield.terrain().size();

    println!("Mission:      {}", mission.name);
    println!("Game size:    {:?}", mission.game_size);
    println!("Battlefield:  {0}x{0} MU", size.side);
    println!("Terrain:      {} piece(s)", battlefield.terrain().len());
    println!("Objectives:   {}", battlefield.objectives().objectives().len());
    if let Some(limit) = mission.special_rules.turn_limit {
        println!("Turn limit:   {limit}");
    }

    for side in Side::BOTH {
        let cfg = mission.side(side);
        let roster = battlefield.roster();
        let score = battlefield.victory().score(side);
        println!();
        println!(
            "{} ({}): {} BP, {} model(s), AI {:?}, starting VP {}",
            cfg.name,
            side.as_str(),
            cfg.bp,
            roster.ids_for(side).len(),
            battlefield.ai_profile(side),
            score.vp,
        );
        for id in roster.ids_for(side) {
            let (Ok(info), Ok(pos)) = (roster.info(id), roster.position(id)) else {
                continue;
            };
            println!(
                "  {:<4} {:<16} {:>4} BP  at ({:>6.2}, {:>6.2})",
                info.identifier, info.profile.name, info.bp, pos.x, pos.y
            );
        }
    }

    let mismatches = mission.bp_mismatches();
    if !mismatches.is_empty() {
        println!();
        for (side, bp) in mismatches {
            println!(
                "Warning: {} fields {bp} BP, outside the {:?} band",
                side.as_str(),
                mission.game_size
            );
        }
    }
    info!(mission = %mission.name, "mission OK");
}

// --- Snapshot command ---

fn cmd_snapshot(args: &[String]) {
    let mut battlefield = load(args);
    let snapshot = battlefield.snapshot();
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing snapshot: {e}");
            process::exit(1);
        }
    }
}

// --- Presets command ---

fn cmd_presets() {
    for name in PRESET_NAMES {
        match preset_layout(name) {
            Ok(pieces) => println!("{name:<10} {} piece(s)", pieces.len()),
            Err(e) => eprintln!("{name}: {e}"),
        }
    }
}
