//! Token/marker ledger.
//!
//! Holds status, marker and weapon-marker tokens per model. Hindrance kinds
//! are not stored here: the battlefield routes them to the
//! [`HindranceTracker`](crate::hindrance::HindranceTracker) and merges the
//! two when reporting counts.

use std::collections::BTreeMap;

use serde::Serialize;

use mest_core::enums::{HindranceKind, TokenKind, TokenLifetime};
use mest_core::types::ModelId;

use crate::hindrance::HindranceTracker;

#[derive(Debug, Clone, Default)]
pub struct TokenLedger {
    entries: BTreeMap<ModelId, BTreeMap<TokenKind, u32>>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` tokens and return the new count. Non-stackable kinds
    /// saturate at 1; adding them again is a no-op.
    pub fn add(&mut self, model: ModelId, kind: TokenKind, count: u32) -> u32 {
        if count == 0 {
            return self.count(model, kind);
        }
        let slot = self.entries.entry(model).or_default().entry(kind).or_insert(0);
        *slot = if kind.is_stackable() {
            slot.saturating_add(count)
        } else {
            1
        };
        *slot
    }

    /// Remove one token. Removing an absent token is a no-op.
    pub fn remove(&mut self, model: ModelId, kind: TokenKind) -> u32 {
        let Some(tokens) = self.entries.get_mut(&model) else {
            return 0;
        };
        let left = match tokens.get_mut(&kind) {
            Some(n) if *n > 1 => {
                *n -= 1;
                *n
            }
            Some(_) => {
                tokens.remove(&kind);
                0
            }
            None => 0,
        };
        if tokens.is_empty() {
            self.entries.remove(&model);
        }
        left
    }

    pub fn count(&self, model: ModelId, kind: TokenKind) -> u32 {
        self.entries
            .get(&model)
            .and_then(|t| t.get(&kind))
            .copied()
            .unwrap_or(0)
    }

    pub fn has(&self, model: ModelId, kind: TokenKind) -> bool {
        self.count(model, kind) > 0
    }

    /// Nonzero counts for one model.
    pub fn counts(&self, model: ModelId) -> BTreeMap<TokenKind, u32> {
        self.entries.get(&model).cloned().unwrap_or_default()
    }

    pub fn clear_model(&mut self, model: ModelId) {
        self.entries.remove(&model);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop every turn-scoped token. Returns how many entries were purged.
    pub fn purge_turn_scoped(&mut self) -> usize {
        let mut purged = 0;
        for tokens in self.entries.values_mut() {
            let before = tokens.len();
            tokens.retain(|kind, _| kind.lifetime() == TokenLifetime::Permanent);
            purged += before - tokens.len();
        }
        self.entries.retain(|_, tokens| !tokens.is_empty());
        purged
    }
}

/// Ledger counts merged with the model's hindrance counters.
pub fn merged_counts(
    ledger: &TokenLedger,
    hindrances: &HindranceTracker,
    model: ModelId,
) -> BTreeMap<TokenKind, u32> {
    let mut counts = ledger.counts(model);
    let h = hindrances.get(model);
    for kind in [HindranceKind::Wound, HindranceKind::Delay, HindranceKind::Fear] {
        if h.get(kind) > 0 {
            counts.insert(kind.token(), h.get(kind));
        }
    }
    counts
}

/// Physical token dimensions, for renderers sizing counters on the table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TokenSpec {
    pub diameter_mm: f64,
    pub thickness_mm: f64,
    pub color: &'static str,
    pub stackable: bool,
}

pub fn token_spec(kind: TokenKind) -> TokenSpec {
    let (diameter_mm, thickness_mm, color) = match kind {
        TokenKind::Done => (25.0, 2.0, "#808080"),
        TokenKind::Wait => (25.0, 2.0, "#1e90ff"),
        TokenKind::Hidden => (25.0, 2.0, "#2e8b57"),
        TokenKind::Wound => (15.0, 2.0, "#b22222"),
        TokenKind::Delay => (15.0, 2.0, "#ffa500"),
        TokenKind::Fear => (15.0, 2.0, "#800080"),
        TokenKind::Ko => (30.0, 3.0, "#000000"),
        TokenKind::Eliminated => (30.0, 3.0, "#8b0000"),
        TokenKind::OutOfAmmo => (10.0, 1.0, "#daa520"),
    };
    TokenSpec {
        diameter_mm,
        thickness_mm,
        color,
        stackable: kind.is_stackable(),
    }
}
