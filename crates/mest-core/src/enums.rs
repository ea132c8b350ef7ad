//! Enumeration types used throughout the rules engine.

use serde::{Deserialize, Serialize};

/// The two opposing sides of a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "side-a")]
    SideA,
    #[serde(rename = "side-b")]
    SideB,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::SideA, Side::SideB];

    pub fn opponent(self) -> Side {
        match self {
            Side::SideA => Side::SideB,
            Side::SideB => Side::SideA,
        }
    }

    /// Sign of the y axis pointing toward the enemy deployment zone.
    /// Side A deploys south and advances north.
    pub fn forward_sign(self) -> f64 {
        match self {
            Side::SideA => 1.0,
            Side::SideB => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::SideA => "side-a",
            Side::SideB => "side-b",
        }
    }
}

/// Terrain object kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    Hill,
    TreeSingle,
    TreeCluster,
    TreeStand,
    Building,
    Wall,
    Debris,
}

impl TerrainKind {
    pub const ALL: [TerrainKind; 7] = [
        TerrainKind::Hill,
        TerrainKind::TreeSingle,
        TerrainKind::TreeCluster,
        TerrainKind::TreeStand,
        TerrainKind::Building,
        TerrainKind::Wall,
        TerrainKind::Debris,
    ];

    pub fn is_tree(self) -> bool {
        matches!(
            self,
            TerrainKind::TreeSingle | TerrainKind::TreeCluster | TerrainKind::TreeStand
        )
    }

    /// Buildings and walls share the structure placement rules.
    pub fn is_structure(self) -> bool {
        matches!(self, TerrainKind::Building | TerrainKind::Wall)
    }

    /// Whether this kind stops line of sight. Hills only grant elevation.
    pub fn blocks_los(self) -> bool {
        self.is_structure() || self.is_tree()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TerrainKind::Hill => "hill",
            TerrainKind::TreeSingle => "tree_single",
            TerrainKind::TreeCluster => "tree_cluster",
            TerrainKind::TreeStand => "tree_stand",
            TerrainKind::Building => "building",
            TerrainKind::Wall => "wall",
            TerrainKind::Debris => "debris",
        }
    }
}

/// Hill size category. Ordering is significant: small < medium < large.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HillSize {
    Small,
    #[default]
    Medium,
    Large,
}

/// Token lifetime across turn boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenLifetime {
    /// Purged by `start_new_turn`.
    Turn,
    /// Persists until explicitly removed.
    Permanent,
}

/// Token classification, used for display grouping and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenCategory {
    Status,
    Hindrance,
    Marker,
    WeaponMarker,
}

/// Every token kind the ledger knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    Done,
    Wait,
    Hidden,
    Wound,
    Delay,
    Fear,
    Ko,
    Eliminated,
    OutOfAmmo,
}

impl TokenKind {
    pub const ALL: [TokenKind; 9] = [
        TokenKind::Done,
        TokenKind::Wait,
        TokenKind::Hidden,
        TokenKind::Wound,
        TokenKind::Delay,
        TokenKind::Fear,
        TokenKind::Ko,
        TokenKind::Eliminated,
        TokenKind::OutOfAmmo,
    ];

    pub fn category(self) -> TokenCategory {
        match self {
            TokenKind::Done | TokenKind::Wait | TokenKind::Hidden => TokenCategory::Status,
            TokenKind::Wound | TokenKind::Delay | TokenKind::Fear => TokenCategory::Hindrance,
            TokenKind::Ko | TokenKind::Eliminated => TokenCategory::Marker,
            TokenKind::OutOfAmmo => TokenCategory::WeaponMarker,
        }
    }

    /// Non-stackable kinds are presence-only (count 0 or 1).
    pub fn is_stackable(self) -> bool {
        !matches!(self, TokenKind::Ko | TokenKind::Eliminated)
    }

    pub fn lifetime(self) -> TokenLifetime {
        match self {
            TokenKind::Done | TokenKind::Wait | TokenKind::Hidden => TokenLifetime::Turn,
            TokenKind::Wound
            | TokenKind::Delay
            | TokenKind::Fear
            | TokenKind::Ko
            | TokenKind::Eliminated
            | TokenKind::OutOfAmmo => TokenLifetime::Permanent,
        }
    }

    /// The hindrance counter this token feeds, if any.
    pub fn hindrance(self) -> Option<HindranceKind> {
        match self {
            TokenKind::Wound => Some(HindranceKind::Wound),
            TokenKind::Delay => Some(HindranceKind::Delay),
            TokenKind::Fear => Some(HindranceKind::Fear),
            _ => None,
        }
    }
}

/// Hindrance counter kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HindranceKind {
    Fear,
    Delay,
    Wound,
}

impl HindranceKind {
    pub fn token(self) -> TokenKind {
        match self {
            HindranceKind::Fear => TokenKind::Fear,
            HindranceKind::Delay => TokenKind::Delay,
            HindranceKind::Wound => TokenKind::Wound,
        }
    }
}

/// Status labels derived from hindrance counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelStatus {
    Distracted,
    Stunned,
    Nervous,
    Disordered,
    Panicked,
    Wounded,
}

impl ModelStatus {
    /// Disordered and Panicked models no longer count as "Ordered".
    pub fn breaks_order(self) -> bool {
        matches!(self, ModelStatus::Disordered | ModelStatus::Panicked)
    }
}

/// Cover classification, weakest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverCategory {
    #[default]
    None,
    Partial,
    Soft,
    Hard,
}

impl CoverCategory {
    pub fn bonus(self) -> i32 {
        match self {
            CoverCategory::None => 0,
            CoverCategory::Partial => 1,
            CoverCategory::Soft => 2,
            CoverCategory::Hard => 3,
        }
    }
}

/// Mission objective type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    Eliminate,
    Control,
    Destroy,
    Escort,
    Survive,
    Capture,
    Intercept,
}

/// Game size; fixes the end-game trigger turn and the expected BP band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameSize {
    Small,
    #[default]
    Medium,
    Large,
}

/// Deployment mode for a side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deployment {
    Infiltration,
    #[default]
    Standard,
    Reinforcements,
    Custom,
}

/// Combat engagement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatKind {
    Close,
    Ranged,
}

/// Why a mission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    NoOpposingModels,
    EndGameTrigger,
    TurnLimit,
}

/// Top-level mission lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionPhase {
    #[default]
    Setup,
    Active,
    Ended(EndReason),
}
