//! Rules constants and tuning parameters (MEST QSR).

// --- Battlefield ---

/// Default battlefield side length (MU).
pub const DEFAULT_BATTLEFIELD_MU: f64 = 48.0;
/// Largest accepted battlefield side (MU).
pub const BATTLEFIELD_MAX_MU: f64 = 144.0;

/// Default model height (MU). Eye level sits at half height.
pub const DEFAULT_MODEL_HEIGHT: f64 = 2.0;

// --- Action points ---

/// Per-turn AP budget before delay tokens.
pub const BASE_AP_PER_TURN: f64 = 2.0;

// --- Line of sight ---

/// Pairs closer than this always see each other.
pub const LOS_AUTO_RANGE_MU: f64 = 8.0;

// --- Combat ranges ---

pub const MELEE_RANGE_MU: f64 = 1.0;
pub const RANGED_RANGE_MU: f64 = 24.0;

/// Range inside which the AI treats an enemy as visible without an LOS query.
pub const AI_VISIBLE_RANGE_MU: f64 = 8.0;

// --- Terrain footprints ---

pub const TREE_SINGLE_RADIUS_MU: f64 = 0.5;
pub const TREE_CLUSTER_RADIUS_MU: f64 = 3.0;
pub const TREE_STAND_RADIUS_MU: f64 = 6.0;
pub const DEBRIS_DEFAULT_RADIUS_MU: f64 = 1.5;

/// Trees are modelled as foliage spheres centred on standing eye level.
pub const TREE_VOLUME_CENTER_Z: f64 = DEFAULT_MODEL_HEIGHT / 2.0;

pub const DEBRIS_HEIGHT_MU: f64 = 0.5;

pub const BUILDING_DEFAULT_WIDTH_MU: f64 = 6.0;
pub const BUILDING_DEFAULT_DEPTH_MU: f64 = 4.0;
pub const BUILDING_DEFAULT_HEIGHT_MU: f64 = 4.0;

pub const WALL_DEFAULT_WIDTH_MU: f64 = 6.0;
pub const WALL_DEFAULT_DEPTH_MU: f64 = 0.5;
pub const WALL_DEFAULT_HEIGHT_MU: f64 = 2.0;

// --- Hills: (total radius, plateau radius, elevation) ---

pub const SMALL_HILL: (f64, f64, f64) = (3.0, 2.0, 1.0);
pub const MEDIUM_HILL: (f64, f64, f64) = (5.0, 3.5, 2.0);
pub const LARGE_HILL: (f64, f64, f64) = (8.0, 6.0, 3.0);

/// Rotation granularity for terrain (degrees).
pub const ROTATION_STEP_DEG: f64 = 15.0;

// --- Movement costs (AP per MU) ---

pub const OPEN_COST_PER_MU: f64 = 0.5;
pub const HILL_COST_PER_MU: f64 = 0.75;
pub const DIFFICULT_COST_PER_MU: f64 = 1.0;

/// Path grid resolution (MU per cell).
pub const PATH_GRID_CELL_MU: f64 = 1.0;

/// Sub-step length for integrating cost along a straight segment (MU).
pub const SEGMENT_SAMPLE_MU: f64 = 0.1;

// --- Spatial sampling ---

pub const SAMPLE_RING_STEP_MU: f64 = 0.5;
pub const SAMPLE_RING_ANGLES: u32 = 16;

// --- Cover ---

/// Terrain within this distance of a defender (along the line to the enemy) grants cover.
pub const COVER_PROXIMITY_MU: f64 = 2.0;

pub const ELEVATION_BONUS: i32 = 1;

// --- End game ---

/// End-game dice showing this value or less end the mission.
pub const END_GAME_DIE_MISS_MAX: u8 = 3;

/// Additional end-game dice join this many turns after the trigger turn.
pub const END_GAME_EXTRA_DIE_OFFSET: u32 = 2;

// --- Victory points ---

pub const OUTNUMBERED_MAJOR_RATIO: f64 = 2.0;
pub const OUTNUMBERED_MAJOR_VP: u32 = 2;
pub const OUTNUMBERED_MINOR_RATIO: f64 = 1.5;
pub const OUTNUMBERED_MINOR_VP: u32 = 1;

pub const AGGRESSION_VP: u32 = 1;
pub const FIRST_CROSSING_RP: u32 = 1;
pub const BOTTLED_OUT_VP: u32 = 1;
pub const ELIMINATION_VP: u32 = 1;
pub const RP_ADVANTAGE_VP: u32 = 1;
pub const RP_DOMINANCE_VP: u32 = 2;
pub const RP_DOMINANCE_RATIO: u32 = 2;
pub const RP_DOMINANCE_MARGIN: u32 = 10;

// --- Mission validation bounds ---

pub const BP_MIN: u32 = 500;
pub const BP_MAX: u32 = 1000;
pub const MODELS_PER_SIDE_MIN: usize = 4;
pub const MODELS_PER_SIDE_MAX: usize = 16;
pub const TURN_LIMIT_MIN: u32 = 1;
pub const TURN_LIMIT_MAX: u32 = 20;

// --- Identifiers ---

pub const CUSTOM_IDENTIFIER_MAX_LEN: usize = 12;

/// Side A letter pool, in assignment order.
pub const SIDE_A_IDENTIFIERS: [char; 14] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N',
];

/// Side B letter pool, in assignment order (Z down to M).
pub const SIDE_B_IDENTIFIERS: [char; 14] = [
    'Z', 'Y', 'X', 'W', 'V', 'U', 'T', 'S', 'R', 'Q', 'P', 'O', 'N', 'M',
];

// --- Combat profile defaults ---

pub const DEFAULT_ABILITY: i32 = 2;
pub const DEFAULT_WOUNDS_TO_KO: u32 = 2;
