//! Property holdings: land and structures with improvements
//!
//! Property compounds at a subtype rate plus a small bonus per
//! improvement. Regional stability divides into the risk modifier, so
//! property in a stable region is the safest asset in the game.

use serde::{Deserialize, Serialize};

use crate::core::bignum::BigNumber;
use crate::core::error::Result;
use crate::core::signals::SignalLog;
use crate::core::types::{AssetClass, InvestmentId, RegionId, RiskLevel};
use crate::investment::investment::{Investment, InvestmentKind};
use crate::save::context::SaveContext;

/// Improvements past this count are rejected.
pub const MAX_IMPROVEMENTS: u32 = 5;

/// Rate bonus contributed by each improvement.
const IMPROVEMENT_RATE_BONUS: f64 = 0.005;

/// Annual upkeep as a fraction of current value, before improvements.
const BASE_UPKEEP_RATE: f64 = 0.005;

/// Extra upkeep fraction per improvement.
const IMPROVEMENT_UPKEEP_RATE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    Agricultural,
    Urban,
    Mining,
    Timber,
    Coastal,
}

impl PropertyType {
    pub fn base_rate(&self) -> f64 {
        match self {
            PropertyType::Agricultural => 0.03,
            PropertyType::Urban => 0.04,
            PropertyType::Mining => 0.05,
            PropertyType::Timber => 0.035,
            PropertyType::Coastal => 0.045,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PropertyType::Agricultural => "agricultural",
            PropertyType::Urban => "urban",
            PropertyType::Mining => "mining",
            PropertyType::Timber => "timber",
            PropertyType::Coastal => "coastal",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "agricultural" => Some(PropertyType::Agricultural),
            "urban" => Some(PropertyType::Urban),
            "mining" => Some(PropertyType::Mining),
            "timber" => Some(PropertyType::Timber),
            "coastal" => Some(PropertyType::Coastal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyState {
    pub subtype: PropertyType,
    /// Regional stability, clamped to [0.5, 3.0]. Higher is safer.
    pub stability_bonus: f64,
    pub improvements: u32,
}

impl PropertyState {
    pub fn new(subtype: PropertyType) -> Self {
        Self {
            subtype,
            stability_bonus: 1.0,
            improvements: 0,
        }
    }

    /// Subtype rate plus the improvement bonus.
    pub fn effective_rate(&self) -> f64 {
        self.subtype.base_rate() + IMPROVEMENT_RATE_BONUS * self.improvements as f64
    }

    /// Stability divides risk: a 2.0 stability halves the modifier.
    pub fn risk_modifier(&self) -> f64 {
        1.0 / self.stability_bonus
    }

    pub fn set_stability_bonus(&mut self, stability: f64) {
        self.stability_bonus = stability.clamp(0.5, 3.0);
    }

    /// Annual upkeep owed on a holding of the given value.
    pub fn upkeep_cost(&self, value: BigNumber) -> BigNumber {
        let rate = BASE_UPKEEP_RATE + IMPROVEMENT_UPKEEP_RATE * self.improvements as f64;
        value.mul_f64(rate)
    }

    pub fn is_developed(&self) -> bool {
        self.improvements >= MAX_IMPROVEMENTS
    }

    pub fn can_sell(&self) -> bool {
        true
    }

    pub fn save(&self, ctx: &mut SaveContext) {
        ctx.write_string("property-type", self.subtype.name());
        ctx.write_double("stability-bonus", self.stability_bonus);
        ctx.write_uint("improvements", self.improvements as u64);
    }

    pub fn load_from(ctx: &mut SaveContext) -> Result<Self> {
        let name = ctx.read_string("property-type", "agricultural");
        let subtype = PropertyType::from_name(&name).unwrap_or(PropertyType::Agricultural);
        let mut state = Self::new(subtype);
        state.set_stability_bonus(ctx.read_double("stability-bonus", 1.0));
        state.improvements = ctx.read_uint("improvements", 0) as u32;
        Ok(state)
    }
}

impl Investment {
    /// Creates a property investment. Properties start at low risk.
    pub fn property(
        id: impl Into<InvestmentId>,
        name: impl Into<String>,
        subtype: PropertyType,
        region: RegionId,
        value: BigNumber,
        purchase_year: u64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            class: AssetClass::Property,
            risk: RiskLevel::Low,
            region: Some(region),
            purchase_price: value,
            current_value: value,
            purchase_year,
            kind: InvestmentKind::Property(PropertyState::new(subtype)),
        }
    }

    /// Adds one improvement, folding its cost into the value. Rejected
    /// once the holding is fully developed.
    pub fn add_improvement(&mut self, cost: BigNumber, signals: &mut SignalLog) -> bool {
        let Some(state) = self.property_state_mut() else {
            return false;
        };
        if state.is_developed() {
            return false;
        }
        state.improvements += 1;
        self.set_current_value(self.current_value.add(cost), signals);
        true
    }
}
