//! Game notifications
//!
//! Systems do not observe each other directly. Each mutating operation
//! appends to a [`SignalLog`] that the caller passes in, and the driver
//! drains it once per turn. Keeps ordering deterministic and systems
//! testable in isolation.

use serde::{Deserialize, Serialize};

use crate::core::types::{
    AgentId, CompetitorId, CompetitorStance, DebtStatus, EchoTree, EventId, ExposureLevel,
    InvestmentId, KingdomId, LedgerCategory, RegionId, RouteStatus,
};

/// A single notification emitted by a game system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Signal {
    // Portfolio
    InvestmentAdded { id: InvestmentId, name: String },
    InvestmentRemoved { id: InvestmentId, returns: f64 },
    GoldChanged { total: f64 },
    ValueChanged { id: InvestmentId, old_value: f64, new_value: f64 },
    RouteStatusChanged { id: InvestmentId, status: RouteStatus },
    DebtStatusChanged { id: InvestmentId, status: DebtStatus },

    // Agents
    LoyaltyChanged { id: AgentId, loyalty: u32 },
    SuccessorTrained { id: AgentId, competence: u32 },
    AgentDied { id: AgentId, name: String },
    AgentBetrayed { id: AgentId, name: String, exposure_spike: u32 },
    GenerationAdvanced { id: AgentId, generation: u32 },

    // World
    YearAdvanced { year: u64 },
    RegionDevastated { id: RegionId, severity: f64 },
    OwnershipChanged { region: RegionId, old_owner: Option<KingdomId>, new_owner: Option<KingdomId> },
    WarDeclared { aggressor: KingdomId, defender: KingdomId },
    WarEnded { kingdom: KingdomId, enemy: KingdomId, victory: bool },
    KingdomCollapsed { id: KingdomId },
    CrusadeLaunched { kingdom: KingdomId },
    StanceChanged { id: CompetitorId, stance: CompetitorStance },
    CompetitorDiscovered { id: CompetitorId, name: String },
    CompetitorDestroyed { id: CompetitorId, name: String },

    // Events
    EventOccurred { id: EventId, name: String },
    ChoiceRequired { id: EventId, prompt: String },
    EventResolved { id: EventId, outcome: String },

    // Tracking
    ExposureChanged { value: u32 },
    ThresholdCrossed { level: ExposureLevel },
    SynergiesChanged { active: Vec<String> },
    EntryDiscovered { entry_id: String, category: LedgerCategory },

    // Prestige
    PrestigePerformed { echoes_gained: f64 },
    UpgradeUnlocked { tree: EchoTree, upgrade_id: String },
}

/// Ordered buffer of signals for one turn
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalLog {
    signals: Vec<Signal>,
}

impl SignalLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter()
    }

    /// Removes and returns everything logged so far, oldest first.
    pub fn drain(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.signals)
    }

    pub fn clear(&mut self) {
        self.signals.clear();
    }
}
