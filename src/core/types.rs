//! Core type definitions used throughout the codebase
//!
//! Identifiers are string-backed newtypes: the save format stores them as
//! plain strings and generated ids embed uuids, so a numeric handle would
//! need a translation table on every load.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Unique identifier for an investment within a portfolio
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvestmentId(pub String);

/// Unique identifier for an agent
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

/// Unique identifier for a region
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionId(pub String);

/// Unique identifier for a kingdom
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KingdomId(pub String);

/// Unique identifier for an immortal competitor
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompetitorId(pub String);

/// Unique identifier for a world event
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

macro_rules! impl_id_from {
    ($($ty:ident),*) => {
        $(
            impl From<&str> for $ty {
                fn from(s: &str) -> Self {
                    Self(s.to_string())
                }
            }

            impl From<String> for $ty {
                fn from(s: String) -> Self {
                    Self(s)
                }
            }

            impl $ty {
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }
        )*
    };
}

impl_id_from!(InvestmentId, AgentId, RegionId, KingdomId, CompetitorId, EventId);

/// Asset class of an investment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    Property,
    Trade,
    Financial,
    Magical,
    Political,
    Dark,
}

impl AssetClass {
    pub const ALL: [AssetClass; 6] = [
        AssetClass::Property,
        AssetClass::Trade,
        AssetClass::Financial,
        AssetClass::Magical,
        AssetClass::Political,
        AssetClass::Dark,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AssetClass::Property => "property",
            AssetClass::Trade => "trade",
            AssetClass::Financial => "financial",
            AssetClass::Magical => "magical",
            AssetClass::Political => "political",
            AssetClass::Dark => "dark",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }
}

/// Risk level attached to an investment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Extreme,
}

impl RiskLevel {
    /// Annual base return rate for asset classes without a specialized rate
    /// table (magical, political, dark).
    pub fn base_rate(&self) -> f64 {
        match self {
            RiskLevel::Low => 0.03,
            RiskLevel::Medium => 0.06,
            RiskLevel::High => 0.10,
            RiskLevel::Extreme => 0.15,
        }
    }

    /// Multiplier used when computing an investment's exposure contribution.
    pub fn exposure_multiplier(&self) -> u32 {
        match self {
            RiskLevel::Low => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
            RiskLevel::Extreme => 5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Extreme => "extreme",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            "extreme" => Some(RiskLevel::Extreme),
            _ => None,
        }
    }
}

/// Operating state of a trade route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteStatus {
    Open,
    Disrupted,
    Closed,
}

impl RouteStatus {
    /// Fraction of route income that still flows in this state.
    pub fn income_multiplier(&self) -> f64 {
        match self {
            RouteStatus::Open => 1.0,
            RouteStatus::Disrupted => 0.5,
            RouteStatus::Closed => 0.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RouteStatus::Open => "open",
            RouteStatus::Disrupted => "disrupted",
            RouteStatus::Closed => "closed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "open" => Some(RouteStatus::Open),
            "disrupted" => Some(RouteStatus::Disrupted),
            "closed" => Some(RouteStatus::Closed),
            _ => None,
        }
    }
}

/// Repayment state of a debt instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebtStatus {
    Performing,
    Delinquent,
    Default,
}

impl DebtStatus {
    pub fn name(&self) -> &'static str {
        match self {
            DebtStatus::Performing => "performing",
            DebtStatus::Delinquent => "delinquent",
            DebtStatus::Default => "default",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "performing" => Some(DebtStatus::Performing),
            "delinquent" => Some(DebtStatus::Delinquent),
            "default" => Some(DebtStatus::Default),
            _ => None,
        }
    }
}

/// Category of a world event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Economic,
    Political,
    Magical,
    Personal,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::Economic,
        EventType::Political,
        EventType::Magical,
        EventType::Personal,
    ];

    /// Index into fixed-size per-type counter arrays.
    pub fn index(&self) -> usize {
        match self {
            EventType::Economic => 0,
            EventType::Political => 1,
            EventType::Magical => 2,
            EventType::Personal => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EventType::Economic => "economic",
            EventType::Political => "political",
            EventType::Magical => "magical",
            EventType::Personal => "personal",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }
}

/// Severity of a world event, ordered from least to most disruptive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventSeverity {
    Minor,
    Moderate,
    Major,
    Catastrophic,
}

impl EventSeverity {
    pub fn name(&self) -> &'static str {
        match self {
            EventSeverity::Minor => "minor",
            EventSeverity::Moderate => "moderate",
            EventSeverity::Major => "major",
            EventSeverity::Catastrophic => "catastrophic",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "minor" => Some(EventSeverity::Minor),
            "moderate" => Some(EventSeverity::Moderate),
            "major" => Some(EventSeverity::Major),
            "catastrophic" => Some(EventSeverity::Catastrophic),
            _ => None,
        }
    }

    /// Numeric weight used for minimum-severity chronicle queries.
    pub fn rank(&self) -> u8 {
        match self {
            EventSeverity::Minor => 0,
            EventSeverity::Moderate => 1,
            EventSeverity::Major => 2,
            EventSeverity::Catastrophic => 3,
        }
    }
}

/// How visible the player is to the world's institutions.
///
/// Derived from the exposure value by fixed quartile cuts; 100 is its own
/// band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExposureLevel {
    Hidden,
    Scrutiny,
    Suspicion,
    Hunt,
    Crusade,
}

impl ExposureLevel {
    pub fn from_value(value: u32) -> Self {
        if value >= 100 {
            ExposureLevel::Crusade
        } else if value >= 75 {
            ExposureLevel::Hunt
        } else if value >= 50 {
            ExposureLevel::Suspicion
        } else if value >= 25 {
            ExposureLevel::Scrutiny
        } else {
            ExposureLevel::Hidden
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExposureLevel::Hidden => "hidden",
            ExposureLevel::Scrutiny => "scrutiny",
            ExposureLevel::Suspicion => "suspicion",
            ExposureLevel::Hunt => "hunt",
            ExposureLevel::Crusade => "crusade",
        }
    }
}

/// Category of a ledger discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerCategory {
    Economic,
    Agent,
    Competitor,
    Hidden,
}

impl LedgerCategory {
    pub const COUNT: usize = 4;

    pub fn index(&self) -> usize {
        match self {
            LedgerCategory::Economic => 0,
            LedgerCategory::Agent => 1,
            LedgerCategory::Competitor => 2,
            LedgerCategory::Hidden => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(LedgerCategory::Economic),
            1 => Some(LedgerCategory::Agent),
            2 => Some(LedgerCategory::Competitor),
            3 => Some(LedgerCategory::Hidden),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LedgerCategory::Economic => "economic",
            LedgerCategory::Agent => "agent",
            LedgerCategory::Competitor => "competitor",
            LedgerCategory::Hidden => "hidden",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "economic" => Some(LedgerCategory::Economic),
            "agent" => Some(LedgerCategory::Agent),
            "competitor" => Some(LedgerCategory::Competitor),
            "hidden" => Some(LedgerCategory::Hidden),
            _ => None,
        }
    }
}

/// How intact an agent's cover identity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverStatus {
    Secure,
    Suspicious,
    Compromised,
    Exposed,
}

impl CoverStatus {
    /// Base exposure contribution before the knowledge multiplier.
    pub fn exposure_base(&self) -> u32 {
        match self {
            CoverStatus::Secure => 0,
            CoverStatus::Suspicious => 2,
            CoverStatus::Compromised => 5,
            CoverStatus::Exposed => 10,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CoverStatus::Secure => "secure",
            CoverStatus::Suspicious => "suspicious",
            CoverStatus::Compromised => "compromised",
            CoverStatus::Exposed => "exposed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "secure" => Some(CoverStatus::Secure),
            "suspicious" => Some(CoverStatus::Suspicious),
            "compromised" => Some(CoverStatus::Compromised),
            "exposed" => Some(CoverStatus::Exposed),
            _ => None,
        }
    }
}

/// How much an agent knows about who they truly serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnowledgeLevel {
    None,
    Suspicious,
    Aware,
    Full,
}

impl KnowledgeLevel {
    /// Multiplier on an agent's exposure contribution.
    pub fn exposure_multiplier(&self) -> f64 {
        match self {
            KnowledgeLevel::None => 1.0,
            KnowledgeLevel::Suspicious => 1.5,
            KnowledgeLevel::Aware => 2.0,
            KnowledgeLevel::Full => 3.0,
        }
    }

    /// Divisor applied to the betrayal chance; more knowledge, more danger.
    pub fn betrayal_divisor(&self) -> u32 {
        match self {
            KnowledgeLevel::None => 10,
            KnowledgeLevel::Suspicious => 5,
            KnowledgeLevel::Aware => 2,
            KnowledgeLevel::Full => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            KnowledgeLevel::None => "none",
            KnowledgeLevel::Suspicious => "suspicious",
            KnowledgeLevel::Aware => "aware",
            KnowledgeLevel::Full => "full",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(KnowledgeLevel::None),
            "suspicious" => Some(KnowledgeLevel::Suspicious),
            "aware" => Some(KnowledgeLevel::Aware),
            "full" => Some(KnowledgeLevel::Full),
            _ => None,
        }
    }
}

/// Agent family discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentType {
    Individual,
    Family,
    Cult,
    Bound,
}

impl AgentType {
    pub fn name(&self) -> &'static str {
        match self {
            AgentType::Individual => "individual",
            AgentType::Family => "family",
            AgentType::Cult => "cult",
            AgentType::Bound => "bound",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "individual" => Some(AgentType::Individual),
            "family" => Some(AgentType::Family),
            "cult" => Some(AgentType::Cult),
            "bound" => Some(AgentType::Bound),
            _ => None,
        }
    }
}

/// Terrain classification of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeographyType {
    Coastal,
    Inland,
    Mountain,
    Forest,
    Desert,
    Swamp,
}

impl GeographyType {
    /// Multiplier consulted by trade-adjacent subsystems.
    pub fn trade_bonus(&self) -> f64 {
        match self {
            GeographyType::Coastal => 1.25,
            _ => 1.0,
        }
    }

    /// Multiplier consulted by resource-adjacent subsystems.
    pub fn resource_bonus(&self) -> f64 {
        match self {
            GeographyType::Inland => 1.10,
            GeographyType::Mountain => 1.15,
            GeographyType::Desert => 1.20,
            _ => 1.0,
        }
    }

    /// Multiplier consulted when hiding operations in the region.
    pub fn concealment_bonus(&self) -> f64 {
        match self {
            GeographyType::Forest => 1.20,
            GeographyType::Swamp => 1.35,
            _ => 1.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GeographyType::Coastal => "coastal",
            GeographyType::Inland => "inland",
            GeographyType::Mountain => "mountain",
            GeographyType::Forest => "forest",
            GeographyType::Desert => "desert",
            GeographyType::Swamp => "swamp",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "coastal" => Some(GeographyType::Coastal),
            "inland" => Some(GeographyType::Inland),
            "mountain" => Some(GeographyType::Mountain),
            "forest" => Some(GeographyType::Forest),
            "desert" => Some(GeographyType::Desert),
            "swamp" => Some(GeographyType::Swamp),
            _ => None,
        }
    }
}

/// Phase of the long economic cycle
///
/// Derived from the current year: the cycle length is split into four
/// equal spans in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EconomicPhase {
    Expansion,
    Peak,
    Recession,
    Recovery,
}

impl EconomicPhase {
    pub const ALL: [EconomicPhase; 4] = [
        EconomicPhase::Expansion,
        EconomicPhase::Peak,
        EconomicPhase::Recession,
        EconomicPhase::Recovery,
    ];

    /// Baseline annual growth applied to regional economies.
    pub fn growth_rate(&self) -> f64 {
        match self {
            EconomicPhase::Expansion => 1.03,
            EconomicPhase::Peak => 1.01,
            EconomicPhase::Recession => 0.98,
            EconomicPhase::Recovery => 0.99,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            EconomicPhase::Expansion => 0,
            EconomicPhase::Peak => 1,
            EconomicPhase::Recession => 2,
            EconomicPhase::Recovery => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(EconomicPhase::Expansion),
            1 => Some(EconomicPhase::Peak),
            2 => Some(EconomicPhase::Recession),
            3 => Some(EconomicPhase::Recovery),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EconomicPhase::Expansion => "expansion",
            EconomicPhase::Peak => "peak",
            EconomicPhase::Recession => "recession",
            EconomicPhase::Recovery => "recovery",
        }
    }
}

/// Diplomatic relation between two kingdoms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KingdomRelation {
    Alliance,
    Neutral,
    Rivalry,
    War,
    Vassalage,
}

impl KingdomRelation {
    pub fn index(&self) -> u8 {
        match self {
            KingdomRelation::Alliance => 0,
            KingdomRelation::Neutral => 1,
            KingdomRelation::Rivalry => 2,
            KingdomRelation::War => 3,
            KingdomRelation::Vassalage => 4,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(KingdomRelation::Alliance),
            1 => Some(KingdomRelation::Neutral),
            2 => Some(KingdomRelation::Rivalry),
            3 => Some(KingdomRelation::War),
            4 => Some(KingdomRelation::Vassalage),
            _ => None,
        }
    }
}

/// Species of an immortal competitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompetitorType {
    Dragon,
    Vampire,
    Lich,
    Fae,
    Demon,
}

impl CompetitorType {
    pub fn name(&self) -> &'static str {
        match self {
            CompetitorType::Dragon => "dragon",
            CompetitorType::Vampire => "vampire",
            CompetitorType::Lich => "lich",
            CompetitorType::Fae => "fae",
            CompetitorType::Demon => "demon",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "dragon" => Some(CompetitorType::Dragon),
            "vampire" => Some(CompetitorType::Vampire),
            "lich" => Some(CompetitorType::Lich),
            "fae" => Some(CompetitorType::Fae),
            "demon" => Some(CompetitorType::Demon),
            _ => None,
        }
    }
}

/// A competitor's stance toward the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompetitorStance {
    Unknown,
    Wary,
    Neutral,
    Friendly,
    Hostile,
    Allied,
}

impl CompetitorStance {
    pub fn name(&self) -> &'static str {
        match self {
            CompetitorStance::Unknown => "unknown",
            CompetitorStance::Wary => "wary",
            CompetitorStance::Neutral => "neutral",
            CompetitorStance::Friendly => "friendly",
            CompetitorStance::Hostile => "hostile",
            CompetitorStance::Allied => "allied",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "unknown" => Some(CompetitorStance::Unknown),
            "wary" => Some(CompetitorStance::Wary),
            "neutral" => Some(CompetitorStance::Neutral),
            "friendly" => Some(CompetitorStance::Friendly),
            "hostile" => Some(CompetitorStance::Hostile),
            "allied" => Some(CompetitorStance::Allied),
            _ => None,
        }
    }
}

/// The four echo specialization trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EchoTree {
    Economist,
    Manipulator,
    Scholar,
    Architect,
}

impl EchoTree {
    pub const ALL: [EchoTree; 4] = [
        EchoTree::Economist,
        EchoTree::Manipulator,
        EchoTree::Scholar,
        EchoTree::Architect,
    ];

    pub fn index(&self) -> usize {
        match self {
            EchoTree::Economist => 0,
            EchoTree::Manipulator => 1,
            EchoTree::Scholar => 2,
            EchoTree::Architect => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EchoTree::Economist => "economist",
            EchoTree::Manipulator => "manipulator",
            EchoTree::Scholar => "scholar",
            EchoTree::Architect => "architect",
        }
    }
}
