//! What the lich has learned about the world
//!
//! The ledger is a set of discovered topic ids, each filed under a
//! category. Discovery is permanent within a run and idempotent; the
//! prestige echo trees decide how much of it survives a rebirth.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::signals::{Signal, SignalLog};
use crate::core::types::LedgerCategory;
use crate::save::context::{SaveContext, Saveable};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    discoveries: AHashMap<String, LedgerCategory>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a discovery. Returns true only the first time an id is
    /// seen; repeats change nothing.
    pub fn discover(
        &mut self,
        entry_id: &str,
        category: LedgerCategory,
        signals: &mut SignalLog,
    ) -> bool {
        if self.discoveries.contains_key(entry_id) {
            return false;
        }
        self.discoveries.insert(entry_id.to_string(), category);
        tracing::info!(entry_id, category = category.name(), "new discovery");
        signals.emit(Signal::EntryDiscovered {
            entry_id: entry_id.to_string(),
            category,
        });
        true
    }

    pub fn has_discovered(&self, entry_id: &str) -> bool {
        self.discoveries.contains_key(entry_id)
    }

    pub fn discovered_count(&self) -> usize {
        self.discoveries.len()
    }

    pub fn discovered_in_category(&self, category: LedgerCategory) -> usize {
        self.discoveries.values().filter(|c| **c == category).count()
    }

    /// All discovered ids in ascending order.
    pub fn all_discoveries(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.discoveries.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Discovered ids in one category, ascending.
    pub fn discoveries_by_category(&self, category: LedgerCategory) -> Vec<String> {
        let mut ids: Vec<String> = self
            .discoveries
            .iter()
            .filter(|(_, c)| **c == category)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Keeps the first `ceil(fraction * n)` ids in ascending order and
    /// forgets the rest. Used by prestige retention.
    pub fn retain_fraction(&mut self, fraction: f64) {
        if fraction >= 1.0 {
            return;
        }
        let total = self.discoveries.len();
        let keep = (fraction.max(0.0) * total as f64).ceil() as usize;
        let kept: Vec<String> = {
            let mut ids: Vec<String> = self.discoveries.keys().cloned().collect();
            ids.sort();
            ids.truncate(keep);
            ids
        };
        self.discoveries.retain(|id, _| kept.binary_search(id).is_ok());
        tracing::info!(kept = keep, forgotten = total - keep, "ledger pruned");
    }

    pub fn clear_all(&mut self) {
        tracing::debug!("clearing ledger");
        self.discoveries.clear();
    }
}

impl Saveable for Ledger {
    fn save(&self, ctx: &mut SaveContext) {
        let ids = self.all_discoveries();
        ctx.write_uint("discovery-count", ids.len() as u64);
        for (i, id) in ids.iter().enumerate() {
            ctx.begin_section(&format!("entry-{}", i));
            ctx.write_string("id", id);
            ctx.write_string("category", self.discoveries[id].name());
            ctx.end_section();
        }
    }

    fn load(&mut self, ctx: &mut SaveContext) -> Result<()> {
        self.discoveries.clear();
        let count = ctx.read_uint("discovery-count", 0);
        for i in 0..count {
            ctx.begin_section(&format!("entry-{}", i));
            let id = ctx.read_string("id", "");
            let category = LedgerCategory::from_name(&ctx.read_string("category", ""))
                .unwrap_or(LedgerCategory::Economic);
            ctx.end_section();
            if !id.is_empty() {
                self.discoveries.insert(id, category);
            }
        }
        tracing::debug!(discoveries = self.discoveries.len(), "ledger loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_is_new_only_once() {
        let mut ledger = Ledger::new();
        let mut signals = SignalLog::new();

        assert!(ledger.discover("region-goldport", LedgerCategory::Economic, &mut signals));
        assert!(!ledger.discover("region-goldport", LedgerCategory::Economic, &mut signals));
        assert!(ledger.has_discovered("region-goldport"));
        assert_eq!(ledger.discovered_count(), 1);

        // The signal fired exactly once.
        let discovered: Vec<_> = signals
            .drain()
            .into_iter()
            .filter(|s| matches!(s, Signal::EntryDiscovered { .. }))
            .collect();
        assert_eq!(discovered.len(), 1);
    }

    #[test]
    fn test_repeat_discovery_keeps_original_category() {
        let mut ledger = Ledger::new();
        let mut signals = SignalLog::new();
        ledger.discover("competitor-malgrim", LedgerCategory::Competitor, &mut signals);
        ledger.discover("competitor-malgrim", LedgerCategory::Hidden, &mut signals);

        assert_eq!(ledger.discovered_in_category(LedgerCategory::Competitor), 1);
        assert_eq!(ledger.discovered_in_category(LedgerCategory::Hidden), 0);
    }

    #[test]
    fn test_category_counts_derive_from_membership() {
        let mut ledger = Ledger::new();
        let mut signals = SignalLog::new();
        ledger.discover("region-goldport", LedgerCategory::Economic, &mut signals);
        ledger.discover("region-midlands", LedgerCategory::Economic, &mut signals);
        ledger.discover("agent-vessar", LedgerCategory::Agent, &mut signals);
        ledger.discover("forbidden-holdings", LedgerCategory::Hidden, &mut signals);

        assert_eq!(ledger.discovered_count(), 4);
        assert_eq!(ledger.discovered_in_category(LedgerCategory::Economic), 2);
        assert_eq!(ledger.discovered_in_category(LedgerCategory::Agent), 1);
        assert_eq!(ledger.discovered_in_category(LedgerCategory::Competitor), 0);
        assert_eq!(ledger.discovered_in_category(LedgerCategory::Hidden), 1);
    }

    #[test]
    fn test_queries_come_back_sorted() {
        let mut ledger = Ledger::new();
        let mut signals = SignalLog::new();
        ledger.discover("c-entry", LedgerCategory::Economic, &mut signals);
        ledger.discover("a-entry", LedgerCategory::Economic, &mut signals);
        ledger.discover("b-entry", LedgerCategory::Agent, &mut signals);

        assert_eq!(ledger.all_discoveries(), vec!["a-entry", "b-entry", "c-entry"]);
        assert_eq!(
            ledger.discoveries_by_category(LedgerCategory::Economic),
            vec!["a-entry", "c-entry"]
        );
    }

    #[test]
    fn test_retain_fraction_keeps_ascending_prefix() {
        let mut ledger = Ledger::new();
        let mut signals = SignalLog::new();
        for id in ["e-5", "a-1", "c-3", "b-2", "d-4"] {
            ledger.discover(id, LedgerCategory::Economic, &mut signals);
        }

        // ceil(0.25 * 5) = 2 survivors.
        ledger.retain_fraction(0.25);
        assert_eq!(ledger.all_discoveries(), vec!["a-1", "b-2"]);
    }

    #[test]
    fn test_retain_full_fraction_keeps_everything() {
        let mut ledger = Ledger::new();
        let mut signals = SignalLog::new();
        ledger.discover("a", LedgerCategory::Agent, &mut signals);
        ledger.discover("b", LedgerCategory::Agent, &mut signals);

        ledger.retain_fraction(1.0);
        assert_eq!(ledger.discovered_count(), 2);

        ledger.retain_fraction(0.0);
        assert_eq!(ledger.discovered_count(), 0);
    }

    #[test]
    fn test_clear_all() {
        let mut ledger = Ledger::new();
        let mut signals = SignalLog::new();
        ledger.discover("region-goldport", LedgerCategory::Economic, &mut signals);
        ledger.clear_all();
        assert_eq!(ledger.discovered_count(), 0);
        assert!(!ledger.has_discovered("region-goldport"));
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut ledger = Ledger::new();
        let mut signals = SignalLog::new();
        ledger.discover("region-goldport", LedgerCategory::Economic, &mut signals);
        ledger.discover("agent-vessar", LedgerCategory::Agent, &mut signals);
        ledger.discover("competitor-malgrim", LedgerCategory::Competitor, &mut signals);
        ledger.discover("forbidden-holdings", LedgerCategory::Hidden, &mut signals);

        let mut ctx = SaveContext::new();
        ledger.save(&mut ctx);

        let mut restored = Ledger::new();
        restored.load(&mut ctx).unwrap();

        assert_eq!(restored.discovered_count(), 4);
        assert!(restored.has_discovered("forbidden-holdings"));
        assert_eq!(restored.discovered_in_category(LedgerCategory::Agent), 1);
        assert_eq!(restored.all_discoveries(), ledger.all_discoveries());
    }
}
