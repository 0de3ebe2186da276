//! Bonus multipliers for portfolio composition
//!
//! The tracker inspects a portfolio snapshot and activates every rule
//! the composition satisfies. The total bonus is the product of the
//! active rule bonuses, so it is always at least 1.0. Recomputation is
//! cheap and runs once per slumbered year.

use ahash::{AHashMap, AHashSet};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::signals::{Signal, SignalLog};
use crate::core::types::{AssetClass, RegionId, RouteStatus};
use crate::investment::portfolio::Portfolio;

/// One satisfied composition rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSynergy {
    pub name: String,
    pub description: String,
    pub bonus: f64,
}

impl ActiveSynergy {
    fn new(name: &str, description: &str, bonus: f64) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            bonus,
        }
    }
}

/// Detects composition synergies in the current portfolio
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynergyTracker {
    active: Vec<ActiveSynergy>,
    total_bonus: f64,
}

impl Default for SynergyTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SynergyTracker {
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            total_bonus: 1.0,
        }
    }

    pub fn active(&self) -> &[ActiveSynergy] {
        &self.active
    }

    pub fn count(&self) -> usize {
        self.active.len()
    }

    /// Product of active bonuses; 1.0 when nothing is active.
    pub fn total_bonus(&self) -> f64 {
        self.total_bonus
    }

    /// Re-derives the active set from the portfolio. No portfolio means
    /// no synergies.
    pub fn recalculate(&mut self, portfolio: Option<&Portfolio>, signals: &mut SignalLog) {
        let mut active = match portfolio {
            Some(portfolio) => detect(portfolio),
            None => Vec::new(),
        };
        // Strongest first; names break ties so the order is stable.
        active.sort_by(|a, b| {
            OrderedFloat(b.bonus)
                .cmp(&OrderedFloat(a.bonus))
                .then_with(|| a.name.cmp(&b.name))
        });

        let changed = active != self.active;
        self.total_bonus = active.iter().map(|s| s.bonus).product::<f64>().max(1.0);
        self.active = active;

        if changed {
            let names: Vec<String> = self.active.iter().map(|s| s.name.clone()).collect();
            tracing::debug!(synergies = ?names, bonus = self.total_bonus, "synergies changed");
            signals.emit(Signal::SynergiesChanged { active: names });
        }
    }

    pub fn reset(&mut self, signals: &mut SignalLog) {
        tracing::debug!("resetting synergies");
        self.active.clear();
        self.total_bonus = 1.0;
        signals.emit(Signal::SynergiesChanged { active: Vec::new() });
    }
}

/// Evaluates every composition rule against the portfolio.
fn detect(portfolio: &Portfolio) -> Vec<ActiveSynergy> {
    let mut active = Vec::new();
    let investments = portfolio.investments();

    let classes: AHashSet<AssetClass> = investments.iter().map(|i| i.class).collect();
    if classes.len() >= 4 {
        active.push(ActiveSynergy::new(
            "Diversified Holdings",
            "Wealth spread across four or more asset classes",
            1.10,
        ));
    }

    let mut region_counts: AHashMap<&RegionId, u32> = AHashMap::new();
    for investment in investments {
        if let Some(region) = &investment.region {
            *region_counts.entry(region).or_insert(0) += 1;
        }
    }
    if region_counts.values().any(|&count| count >= 3) {
        active.push(ActiveSynergy::new(
            "Regional Monopoly",
            "Three or more holdings concentrated in one region",
            1.05,
        ));
    }

    let routes: Vec<RouteStatus> = investments
        .iter()
        .filter_map(|i| i.trade_state())
        .map(|state| state.status)
        .collect();
    if routes.len() >= 3 && routes.iter().all(|s| *s == RouteStatus::Open) {
        active.push(ActiveSynergy::new(
            "Trade Empire",
            "Three or more trade ventures, every route open",
            1.08,
        ));
    }

    let has_dark = investments.iter().any(|i| i.class == AssetClass::Dark);
    let has_magical = investments.iter().any(|i| i.class == AssetClass::Magical);
    if has_dark && has_magical {
        active.push(ActiveSynergy::new(
            "Dark Pact",
            "Forbidden and arcane assets feeding one another",
            1.06,
        ));
    }

    active
}
