//! Hindrance counters and the status labels derived from them.
//!
//! Sole owner of fear, delay and wound counts. Statuses are recomputed from
//! thresholds on every mutation; all applicable thresholds apply at once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use mest_core::constants::BASE_AP_PER_TURN;
use mest_core::enums::{HindranceKind, ModelStatus};
use mest_core::types::ModelId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hindrances {
    pub fear: u32,
    pub delay: u32,
    pub wounds: u32,
}

impl Hindrances {
    pub fn get(&self, kind: HindranceKind) -> u32 {
        match kind {
            HindranceKind::Fear => self.fear,
            HindranceKind::Delay => self.delay,
            HindranceKind::Wound => self.wounds,
        }
    }

    fn slot(&mut self, kind: HindranceKind) -> &mut u32 {
        match kind {
            HindranceKind::Fear => &mut self.fear,
            HindranceKind::Delay => &mut self.delay,
            HindranceKind::Wound => &mut self.wounds,
        }
    }

    pub fn is_clear(&self) -> bool {
        self.fear == 0 && self.delay == 0 && self.wounds == 0
    }

    /// Derived labels, in a fixed order.
    pub fn statuses(&self) -> Vec<ModelStatus> {
        let mut out = Vec::new();
        if self.delay >= 1 {
            out.push(ModelStatus::Distracted);
        }
        if self.delay >= 2 {
            out.push(ModelStatus::Stunned);
        }
        if self.fear >= 1 {
            out.push(ModelStatus::Nervous);
        }
        if self.fear >= 2 {
            out.push(ModelStatus::Disordered);
        }
        if self.fear >= 3 {
            out.push(ModelStatus::Panicked);
        }
        if self.wounds >= 1 {
            out.push(ModelStatus::Wounded);
        }
        out
    }

    /// Still "Ordered": neither Disordered nor Panicked.
    pub fn is_ordered(&self) -> bool {
        !self.statuses().iter().any(|s| s.breaks_order())
    }
}

/// AP left this turn. May be negative; callers treat that as zero.
pub fn available_ap(ap_spent: f64, delay: u32) -> f64 {
    BASE_AP_PER_TURN - ap_spent - delay as f64
}

#[derive(Debug, Clone, Default)]
pub struct HindranceTracker {
    counts: BTreeMap<ModelId, Hindrances>,
}

impl HindranceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, model: ModelId, kind: HindranceKind) -> Hindrances {
        let entry = self.counts.entry(model).or_default();
        *entry.slot(kind) += 1;
        *entry
    }

    /// Decrement with a floor at zero. A model whose counts all reach zero
    /// is dropped from the tracker.
    pub fn remove(&mut self, model: ModelId, kind: HindranceKind) -> Hindrances {
        let Some(entry) = self.counts.get_mut(&model) else {
            return Hindrances::default();
        };
        let slot = entry.slot(kind);
        *slot = slot.saturating_sub(1);
        let now = *entry;
        if now.is_clear() {
            self.counts.remove(&model);
        }
        now
    }

    pub fn get(&self, model: ModelId) -> Hindrances {
        self.counts.get(&model).copied().unwrap_or_default()
    }

    /// Drop every counter for one model.
    pub fn clear_model(&mut self, model: ModelId) {
        self.counts.remove(&model);
    }

    pub fn tracked(&self) -> usize {
        self.counts.len()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }
}
