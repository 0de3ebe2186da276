//! Echo currency and the prestige gate
//!
//! Prestige converts a finished run into echoes, the only currency that
//! survives the lich's rebirth. The manager owns the balance, the
//! lifetime totals and the four specialization trees; tearing down the
//! run itself is the game layer's job. Performing a prestige never
//! touches echoes already banked or upgrades already bought.

use serde::{Deserialize, Serialize};

use crate::core::bignum::BigNumber;
use crate::core::error::{LichError, Result};
use crate::core::signals::{Signal, SignalLog};
use crate::core::types::EchoTree;
use crate::save::context::{SaveContext, Saveable};

use super::trees::build_tree;
use super::unlock_tree::UnlockTree;

/// Minimum run length before the gate opens.
const MIN_PRESTIGE_YEARS: u64 = 100;
/// Minimum accumulated gold before the gate opens.
const MIN_PRESTIGE_GOLD: f64 = 1_000_000.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrestigeManager {
    echoes: BigNumber,
    total_echoes_earned: BigNumber,
    times_prestiged: u64,
    trees: [UnlockTree; 4],
    min_years: u64,
    min_gold: f64,
}

impl Default for PrestigeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PrestigeManager {
    pub fn new() -> Self {
        Self::with_requirements(MIN_PRESTIGE_YEARS, MIN_PRESTIGE_GOLD)
    }

    /// A manager with a custom gate. The thresholds are configuration,
    /// not run state, so saves do not carry them.
    pub fn with_requirements(min_years: u64, min_gold: f64) -> Self {
        PrestigeManager {
            echoes: BigNumber::ZERO,
            total_echoes_earned: BigNumber::ZERO,
            times_prestiged: 0,
            trees: EchoTree::ALL.map(build_tree),
            min_years,
            min_gold,
        }
    }

    pub fn echoes(&self) -> BigNumber {
        self.echoes
    }

    pub fn total_echoes_earned(&self) -> BigNumber {
        self.total_echoes_earned
    }

    pub fn times_prestiged(&self) -> u64 {
        self.times_prestiged
    }

    pub fn tree(&self, tree: EchoTree) -> &UnlockTree {
        &self.trees[tree.index()]
    }

    /// Deducts echoes, failing without change when the balance is short.
    pub fn spend_echoes(&mut self, amount: BigNumber) -> Result<()> {
        if self.echoes < amount {
            return Err(LichError::InsufficientEchoes {
                needed: amount.to_string(),
                available: self.echoes.to_string(),
            });
        }
        self.echoes = self.echoes.sub(amount);
        Ok(())
    }

    /// The default gate: a century survived and a million gold banked.
    pub fn can_prestige(&self, total_gold: BigNumber, years_played: u64) -> bool {
        if years_played < self.min_years {
            return false;
        }
        total_gold >= BigNumber::new(self.min_gold)
    }

    /// Echoes a prestige would pay out right now.
    ///
    /// `floor(log10(gold) * sqrt(years) / 10)`, rewarding wealth and
    /// patience together. Zero when gold has not cleared 1.
    pub fn calculate_echo_reward(&self, total_gold: BigNumber, years_played: u64) -> BigNumber {
        if total_gold.to_f64() <= 1.0 {
            return BigNumber::ZERO;
        }
        let log_gold = total_gold.log10();
        let years_factor = (years_played as f64).sqrt();
        BigNumber::new((log_gold * years_factor / 10.0).floor())
    }

    /// Banks the reward and counts the rebirth. Echoes and trees carry
    /// over; only the gate can refuse.
    pub fn perform_prestige(
        &mut self,
        total_gold: BigNumber,
        years_played: u64,
        signals: &mut SignalLog,
    ) -> Result<BigNumber> {
        if !self.can_prestige(total_gold, years_played) {
            return Err(LichError::PrestigeRequirementsUnmet {
                years: years_played,
                gold: total_gold.to_string(),
            });
        }
        let reward = self.calculate_echo_reward(total_gold, years_played);
        self.echoes = self.echoes.add(reward);
        self.total_echoes_earned = self.total_echoes_earned.add(reward);
        self.times_prestiged += 1;
        tracing::info!(
            reward = %reward,
            times_prestiged = self.times_prestiged,
            "prestige performed"
        );
        signals.emit(Signal::PrestigePerformed {
            echoes_gained: reward.to_f64(),
        });
        Ok(reward)
    }

    /// Spends echoes on one tree node. The node must exist, be locked,
    /// have its whole prerequisite chain unlocked, and be affordable.
    pub fn unlock_upgrade(
        &mut self,
        tree: EchoTree,
        upgrade_id: &str,
        signals: &mut SignalLog,
    ) -> Result<()> {
        let slot = &self.trees[tree.index()];
        let Some(node) = slot.node(upgrade_id) else {
            return Err(LichError::Validation(format!(
                "no upgrade '{}' in the {} tree",
                upgrade_id,
                tree.name()
            )));
        };
        if slot.is_unlocked(upgrade_id) {
            return Err(LichError::Validation(format!(
                "upgrade '{upgrade_id}' is already unlocked"
            )));
        }
        if !slot.requirements_met(upgrade_id) {
            return Err(LichError::Validation(format!(
                "upgrade '{upgrade_id}' is missing prerequisites"
            )));
        }
        let cost = node.cost;
        self.spend_echoes(cost)?;
        self.trees[tree.index()].unlock(upgrade_id);
        tracing::info!(tree = tree.name(), upgrade_id, "echo upgrade unlocked");
        signals.emit(Signal::UpgradeUnlocked {
            tree,
            upgrade_id: upgrade_id.to_string(),
        });
        Ok(())
    }

    pub fn has_upgrade(&self, tree: EchoTree, upgrade_id: &str) -> bool {
        self.trees[tree.index()].is_unlocked(upgrade_id)
    }

    /// Permanent income multiplier: +10% per prestige plus up to +50%
    /// per fully completed tree.
    pub fn bonus_multiplier(&self) -> f64 {
        let mut multiplier = 1.0 + 0.1 * self.times_prestiged as f64;
        for tree in &self.trees {
            multiplier += tree.progress() * 0.5;
        }
        multiplier
    }

    /// 2.0 with Startup Capital, otherwise 1.0.
    pub fn starting_gold_multiplier(&self) -> f64 {
        if self.has_upgrade(EchoTree::Economist, "startup-capital") {
            2.0
        } else {
            1.0
        }
    }

    /// Additive interest rate bonus from Compound Master.
    pub fn compound_interest_bonus(&self) -> f64 {
        if self.has_upgrade(EchoTree::Economist, "compound-master") {
            0.02
        } else {
            0.0
        }
    }

    /// Fraction of ledger discoveries that survive a prestige.
    pub fn ledger_retention(&self) -> f64 {
        if self.has_upgrade(EchoTree::Scholar, "omniscience") {
            return 1.0;
        }
        if self.has_upgrade(EchoTree::Scholar, "memory-fragments") {
            return 0.25;
        }
        0.0
    }

    /// Fraction of gold that survives a prestige.
    pub fn gold_retention(&self) -> f64 {
        if self.has_upgrade(EchoTree::Architect, "dimensional-vault") {
            0.5
        } else {
            0.0
        }
    }

    /// Wipes all prestige progress including purchased upgrades. This
    /// is a new-game wipe, not part of performing a prestige.
    pub fn reset(&mut self) {
        tracing::debug!("resetting prestige manager");
        self.echoes = BigNumber::ZERO;
        self.total_echoes_earned = BigNumber::ZERO;
        self.times_prestiged = 0;
        for tree in &mut self.trees {
            tree.reset();
        }
    }
}

impl Saveable for PrestigeManager {
    fn save(&self, ctx: &mut SaveContext) {
        ctx.write_big("echoes", &self.echoes);
        ctx.write_big("total-echoes", &self.total_echoes_earned);
        ctx.write_uint("times-prestiged", self.times_prestiged);
        for (i, tree) in self.trees.iter().enumerate() {
            ctx.begin_section(&format!("echo-tree-{i}"));
            let unlocked = tree.unlocked_ids();
            ctx.write_uint("unlocked-count", unlocked.len() as u64);
            for (j, id) in unlocked.iter().enumerate() {
                ctx.write_string(&format!("unlock-{j}"), id);
            }
            ctx.end_section();
        }
    }

    fn load(&mut self, ctx: &mut SaveContext) -> Result<()> {
        self.echoes = ctx.read_big("echoes");
        self.total_echoes_earned = ctx.read_big("total-echoes");
        self.times_prestiged = ctx.read_uint("times-prestiged", 0);
        for (i, tree) in self.trees.iter_mut().enumerate() {
            tree.reset();
            let section = format!("echo-tree-{i}");
            if !ctx.has_section(&section) {
                continue;
            }
            ctx.begin_section(&section);
            let count = ctx.read_uint("unlocked-count", 0);
            for j in 0..count {
                let id = ctx.read_string(&format!("unlock-{j}"), "");
                if !id.is_empty() {
                    tree.unlock(&id);
                }
            }
            ctx.end_section();
        }
        tracing::debug!(
            echoes = %self.echoes,
            times_prestiged = self.times_prestiged,
            "loaded prestige manager"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs one huge prestige so tests have echoes to spend.
    /// log10(1e100) * sqrt(10000) / 10 = 1000.
    fn funded_manager() -> PrestigeManager {
        let mut manager = PrestigeManager::new();
        let mut signals = SignalLog::new();
        manager
            .perform_prestige(BigNumber::from_parts(1.0, 100), 10_000, &mut signals)
            .unwrap();
        assert_eq!(manager.echoes().to_f64(), 1000.0);
        manager
    }

    #[test]
    fn test_prestige_gate() {
        let manager = PrestigeManager::new();
        assert!(!manager.can_prestige(BigNumber::new(999_999.0), 500));
        assert!(!manager.can_prestige(BigNumber::new(2_000_000.0), 50));
        assert!(manager.can_prestige(BigNumber::new(2_000_000.0), 200));
        let reward = manager.calculate_echo_reward(BigNumber::new(2_000_000.0), 200);
        assert!(reward.to_f64() >= 1.0);
    }

    #[test]
    fn test_custom_gate_thresholds() {
        let manager = PrestigeManager::with_requirements(10, 1000.0);
        assert!(manager.can_prestige(BigNumber::new(1000.0), 10));
        assert!(!manager.can_prestige(BigNumber::new(999.0), 10));
        assert!(!manager.can_prestige(BigNumber::new(5000.0), 9));
    }

    #[test]
    fn test_echo_reward_formula() {
        let manager = PrestigeManager::new();
        // log10(1e6) = 6, sqrt(100) = 10, 6 * 10 / 10 = 6.
        let reward = manager.calculate_echo_reward(BigNumber::new(1_000_000.0), 100);
        assert_eq!(reward.to_f64(), 6.0);
    }

    #[test]
    fn test_echo_reward_zero_for_trivial_gold() {
        let manager = PrestigeManager::new();
        assert!(manager.calculate_echo_reward(BigNumber::ZERO, 1000).is_zero());
        assert!(manager.calculate_echo_reward(BigNumber::new(1.0), 1000).is_zero());
    }

    #[test]
    fn test_perform_prestige_below_gate_fails() {
        let mut manager = PrestigeManager::new();
        let mut signals = SignalLog::new();
        let err = manager
            .perform_prestige(BigNumber::new(500.0), 300, &mut signals)
            .unwrap_err();
        assert!(matches!(err, LichError::PrestigeRequirementsUnmet { .. }));
        assert_eq!(manager.times_prestiged(), 0);
        assert!(manager.echoes().is_zero());
        assert!(signals.is_empty());
    }

    #[test]
    fn test_perform_prestige_accumulates() {
        let mut manager = PrestigeManager::new();
        let mut signals = SignalLog::new();
        let gold = BigNumber::new(1_000_000.0);

        let first = manager.perform_prestige(gold, 100, &mut signals).unwrap();
        assert_eq!(first.to_f64(), 6.0);
        assert_eq!(manager.echoes().to_f64(), 6.0);
        assert_eq!(manager.times_prestiged(), 1);

        manager.perform_prestige(gold, 100, &mut signals).unwrap();
        assert!((manager.echoes().to_f64() - 12.0).abs() < 1e-9);
        assert!((manager.total_echoes_earned().to_f64() - 12.0).abs() < 1e-9);
        assert_eq!(manager.times_prestiged(), 2);

        let performed = signals
            .iter()
            .filter(|s| matches!(s, Signal::PrestigePerformed { echoes_gained } if *echoes_gained == 6.0))
            .count();
        assert_eq!(performed, 2);
    }

    #[test]
    fn test_unlock_spends_and_signals() {
        let mut manager = funded_manager();
        let mut signals = SignalLog::new();
        manager
            .unlock_upgrade(EchoTree::Economist, "startup-capital", &mut signals)
            .unwrap();
        assert!((manager.echoes().to_f64() - 999.0).abs() < 1e-9);
        assert!(manager.has_upgrade(EchoTree::Economist, "startup-capital"));
        assert!(signals.iter().any(|s| matches!(
            s,
            Signal::UpgradeUnlocked { tree: EchoTree::Economist, upgrade_id } if upgrade_id == "startup-capital"
        )));
    }

    #[test]
    fn test_unlock_requires_prerequisite_chain() {
        let mut manager = funded_manager();
        let mut signals = SignalLog::new();
        let err = manager
            .unlock_upgrade(EchoTree::Economist, "compound-master", &mut signals)
            .unwrap_err();
        assert!(matches!(err, LichError::Validation(_)));
        assert_eq!(manager.echoes().to_f64(), 1000.0);
    }

    #[test]
    fn test_unlock_rejects_unknown_and_repeat() {
        let mut manager = funded_manager();
        let mut signals = SignalLog::new();
        assert!(manager
            .unlock_upgrade(EchoTree::Scholar, "lichdom-for-dummies", &mut signals)
            .is_err());
        manager
            .unlock_upgrade(EchoTree::Scholar, "memory-fragments", &mut signals)
            .unwrap();
        assert!(manager
            .unlock_upgrade(EchoTree::Scholar, "memory-fragments", &mut signals)
            .is_err());
    }

    #[test]
    fn test_unlock_without_echoes_fails() {
        let mut manager = PrestigeManager::new();
        let mut signals = SignalLog::new();
        let err = manager
            .unlock_upgrade(EchoTree::Economist, "startup-capital", &mut signals)
            .unwrap_err();
        assert!(matches!(err, LichError::InsufficientEchoes { .. }));
    }

    #[test]
    fn test_bonus_multiplier() {
        let mut manager = PrestigeManager::new();
        assert_eq!(manager.bonus_multiplier(), 1.0);

        let mut signals = SignalLog::new();
        manager
            .perform_prestige(BigNumber::from_parts(1.0, 100), 10_000, &mut signals)
            .unwrap();
        assert!((manager.bonus_multiplier() - 1.1).abs() < 1e-12);

        // One of four economist nodes adds 0.5 * 0.25.
        manager
            .unlock_upgrade(EchoTree::Economist, "startup-capital", &mut signals)
            .unwrap();
        assert!((manager.bonus_multiplier() - 1.225).abs() < 1e-12);
    }

    #[test]
    fn test_query_helper_defaults() {
        let manager = PrestigeManager::new();
        assert_eq!(manager.starting_gold_multiplier(), 1.0);
        assert_eq!(manager.compound_interest_bonus(), 0.0);
        assert_eq!(manager.ledger_retention(), 0.0);
        assert_eq!(manager.gold_retention(), 0.0);
    }

    #[test]
    fn test_query_helpers_track_unlocks() {
        let mut manager = funded_manager();
        let mut signals = SignalLog::new();

        manager
            .unlock_upgrade(EchoTree::Economist, "startup-capital", &mut signals)
            .unwrap();
        assert_eq!(manager.starting_gold_multiplier(), 2.0);

        manager
            .unlock_upgrade(EchoTree::Economist, "market-sense", &mut signals)
            .unwrap();
        manager
            .unlock_upgrade(EchoTree::Economist, "compound-master", &mut signals)
            .unwrap();
        assert_eq!(manager.compound_interest_bonus(), 0.02);

        manager
            .unlock_upgrade(EchoTree::Scholar, "memory-fragments", &mut signals)
            .unwrap();
        assert_eq!(manager.ledger_retention(), 0.25);
        manager
            .unlock_upgrade(EchoTree::Scholar, "pattern-recognition", &mut signals)
            .unwrap();
        manager
            .unlock_upgrade(EchoTree::Scholar, "cosmic-insight", &mut signals)
            .unwrap();
        manager
            .unlock_upgrade(EchoTree::Scholar, "omniscience", &mut signals)
            .unwrap();
        assert_eq!(manager.ledger_retention(), 1.0);

        manager
            .unlock_upgrade(EchoTree::Architect, "phylactery-preservation", &mut signals)
            .unwrap();
        manager
            .unlock_upgrade(EchoTree::Architect, "eternal-projects", &mut signals)
            .unwrap();
        manager
            .unlock_upgrade(EchoTree::Architect, "dimensional-vault", &mut signals)
            .unwrap();
        assert_eq!(manager.gold_retention(), 0.5);
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut manager = funded_manager();
        let mut signals = SignalLog::new();
        manager
            .unlock_upgrade(EchoTree::Economist, "startup-capital", &mut signals)
            .unwrap();
        manager
            .unlock_upgrade(EchoTree::Architect, "phylactery-preservation", &mut signals)
            .unwrap();

        let mut ctx = SaveContext::new();
        manager.save(&mut ctx);

        let mut restored = PrestigeManager::new();
        restored.load(&mut ctx).unwrap();
        assert_eq!(restored.echoes(), manager.echoes());
        assert_eq!(restored.total_echoes_earned(), manager.total_echoes_earned());
        assert_eq!(restored.times_prestiged(), 1);
        assert!(restored.has_upgrade(EchoTree::Economist, "startup-capital"));
        assert!(restored.has_upgrade(EchoTree::Architect, "phylactery-preservation"));
        assert!(!restored.has_upgrade(EchoTree::Economist, "market-sense"));
        assert_eq!(restored.starting_gold_multiplier(), 2.0);
    }
}
