//! Investment base type and variant dispatch
//!
//! An [`Investment`] carries the fields every holding shares; everything
//! variant-specific lives in [`InvestmentKind`]. The five dispatch methods
//! (`calculate_returns`, `apply_event`, `can_sell`, `risk_modifier`,
//! `base_return_rate`) match on the kind, falling back to the plain-holding
//! behavior for magical, political, and dark assets.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::bignum::BigNumber;
use crate::core::error::{LichError, Result};
use crate::core::signals::{Signal, SignalLog};
use crate::core::types::{AssetClass, InvestmentId, RegionId, RiskLevel};
use crate::event::event::{Event, EventKind};
use crate::investment::financial::FinancialState;
use crate::investment::property::PropertyState;
use crate::investment::trade::TradeState;
use crate::save::context::SaveContext;

/// Variant-specific state for one investment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InvestmentKind {
    /// Plain holding: magical, political, and dark assets. Returns come
    /// from the risk level's base rate alone.
    Holding,
    Property(PropertyState),
    Trade(TradeState),
    Financial(FinancialState),
}

/// A single asset in the portfolio
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investment {
    pub id: InvestmentId,
    pub name: String,
    pub description: String,
    pub class: AssetClass,
    pub risk: RiskLevel,
    pub region: Option<RegionId>,
    pub purchase_price: BigNumber,
    pub current_value: BigNumber,
    pub purchase_year: u64,
    pub kind: InvestmentKind,
}

impl Investment {
    /// Creates a plain holding (magical, political, or dark).
    pub fn holding(
        id: impl Into<InvestmentId>,
        name: impl Into<String>,
        class: AssetClass,
        risk: RiskLevel,
        value: BigNumber,
        purchase_year: u64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            class,
            risk,
            region: None,
            purchase_price: value,
            current_value: value,
            purchase_year,
            kind: InvestmentKind::Holding,
        }
    }

    /// Generates a fresh unique id with a readable prefix.
    pub fn fresh_id(prefix: &str) -> InvestmentId {
        InvestmentId(format!("{}-{}", prefix, Uuid::new_v4()))
    }

    pub fn is_dark(&self) -> bool {
        self.class == AssetClass::Dark
    }

    /// Projected value after `years` of this variant's accrual rules.
    /// Pure; `years == 0` always yields the current value exactly.
    pub fn calculate_returns(&self, years: u32) -> BigNumber {
        if years == 0 {
            return self.current_value;
        }
        match &self.kind {
            InvestmentKind::Holding => {
                let rate = self.base_return_rate() * self.risk_modifier();
                compound(self.current_value, rate, years)
            }
            InvestmentKind::Property(state) => {
                compound(self.current_value, state.effective_rate(), years)
            }
            InvestmentKind::Trade(state) => {
                compound(self.current_value, state.effective_rate(), years)
            }
            InvestmentKind::Financial(state) => {
                state.project(self.current_value, self.purchase_year, years)
            }
        }
    }

    /// Multiplies value by the event's class modifier, then lets the
    /// variant react to the event itself.
    pub fn apply_event(&mut self, event: &Event, signals: &mut SignalLog) {
        let modifier = event.investment_modifier(self.class);
        if (modifier - 1.0).abs() > f64::EPSILON {
            let new_value = self.current_value.mul_f64(modifier);
            self.set_current_value(new_value, signals);
        }

        match (&mut self.kind, &event.kind) {
            // War chokes trade: open routes through the war zone are
            // disrupted until repaired.
            (InvestmentKind::Trade(state), EventKind::Political(political))
                if political.causes_war =>
            {
                if state.touches_region(event.affects_region.as_ref()) {
                    state.disrupt(&self.id, signals);
                }
            }
            // An issuer caught in a war stops paying on time.
            (InvestmentKind::Financial(state), EventKind::Political(political))
                if political.causes_war =>
            {
                if state.issued_by(event.affects_kingdom.as_ref()) {
                    state.mark_delinquent(&self.id, signals);
                }
            }
            _ => {}
        }
    }

    /// Whether this investment may currently be sold. Variants keep the
    /// veto hook even though none exercises it today.
    pub fn can_sell(&self) -> bool {
        match &self.kind {
            InvestmentKind::Holding => true,
            InvestmentKind::Property(state) => state.can_sell(),
            InvestmentKind::Trade(state) => state.can_sell(),
            InvestmentKind::Financial(state) => state.can_sell(),
        }
    }

    /// Multiplier on the base rate expressing how risky the holding is
    /// right now. Always positive.
    pub fn risk_modifier(&self) -> f64 {
        match &self.kind {
            InvestmentKind::Holding => 1.0,
            InvestmentKind::Property(state) => state.risk_modifier(),
            InvestmentKind::Trade(state) => state.risk_modifier(),
            InvestmentKind::Financial(state) => state.risk_modifier(),
        }
    }

    /// Annual base return rate for the variant.
    pub fn base_return_rate(&self) -> f64 {
        match &self.kind {
            InvestmentKind::Holding => self.risk.base_rate(),
            InvestmentKind::Property(state) => state.subtype.base_rate(),
            InvestmentKind::Trade(state) => state.subtype.base_rate(),
            InvestmentKind::Financial(state) => state.interest_rate,
        }
    }

    /// Clamps to zero from below and emits a value-changed notification
    /// when anything actually changed.
    pub fn set_current_value(&mut self, value: BigNumber, signals: &mut SignalLog) {
        let clamped = value.max_zero();
        if clamped == self.current_value {
            return;
        }
        let old = self.current_value;
        self.current_value = clamped;
        signals.emit(Signal::ValueChanged {
            id: self.id.clone(),
            old_value: old.to_f64(),
            new_value: clamped.to_f64(),
        });
    }

    /// Advances variant bookkeeping by one in-game year.
    pub fn tick_year(&mut self) {
        if let InvestmentKind::Financial(state) = &mut self.kind {
            state.tick_year();
        }
    }

    /// Exposure points this holding contributes per year, from a value
    /// tier scaled by risk. Dark assets draw twice the attention.
    pub fn exposure_contribution(&self) -> u32 {
        let value = self.current_value.to_f64();
        let tier = if value < 1_000.0 {
            0
        } else if value < 10_000.0 {
            1
        } else if value < 100_000.0 {
            2
        } else if value < 1_000_000.0 {
            3
        } else {
            5
        };
        let base = tier * self.risk.exposure_multiplier();
        if self.is_dark() {
            base * 2
        } else {
            base
        }
    }

    pub fn property_state(&self) -> Option<&PropertyState> {
        match &self.kind {
            InvestmentKind::Property(state) => Some(state),
            _ => None,
        }
    }

    pub fn property_state_mut(&mut self) -> Option<&mut PropertyState> {
        match &mut self.kind {
            InvestmentKind::Property(state) => Some(state),
            _ => None,
        }
    }

    pub fn trade_state(&self) -> Option<&TradeState> {
        match &self.kind {
            InvestmentKind::Trade(state) => Some(state),
            _ => None,
        }
    }

    pub fn trade_state_mut(&mut self) -> Option<&mut TradeState> {
        match &mut self.kind {
            InvestmentKind::Trade(state) => Some(state),
            _ => None,
        }
    }

    pub fn financial_state(&self) -> Option<&FinancialState> {
        match &self.kind {
            InvestmentKind::Financial(state) => Some(state),
            _ => None,
        }
    }

    pub fn financial_state_mut(&mut self) -> Option<&mut FinancialState> {
        match &mut self.kind {
            InvestmentKind::Financial(state) => Some(state),
            _ => None,
        }
    }

    // --- persistence ---

    /// Writes every field into the current section; `asset-class` goes
    /// first so the loader can pick the variant before reading the rest.
    pub fn save(&self, ctx: &mut SaveContext) {
        ctx.write_string("asset-class", self.class.name());
        ctx.write_string("id", self.id.as_str());
        ctx.write_string("name", &self.name);
        ctx.write_string("description", &self.description);
        ctx.write_string(
            "region-id",
            self.region.as_ref().map(|r| r.as_str()).unwrap_or(""),
        );
        ctx.write_string("risk-level", self.risk.name());
        ctx.write_uint("purchase-year", self.purchase_year);
        ctx.write_big("purchase-price", &self.purchase_price);
        ctx.write_big("current-value", &self.current_value);

        match &self.kind {
            InvestmentKind::Holding => {}
            InvestmentKind::Property(state) => state.save(ctx),
            InvestmentKind::Trade(state) => state.save(ctx),
            InvestmentKind::Financial(state) => state.save(ctx),
        }
    }

    /// Reconstructs an investment from the current section. Fails on an
    /// unknown asset class or risk level.
    pub fn load_from(ctx: &mut SaveContext) -> Result<Investment> {
        let class_name = ctx.read_string("asset-class", "");
        let class = AssetClass::from_name(&class_name)
            .ok_or_else(|| LichError::Load(format!("unknown asset class '{}'", class_name)))?;

        let risk_name = ctx.read_string("risk-level", "");
        let risk = RiskLevel::from_name(&risk_name)
            .ok_or_else(|| LichError::Load(format!("unknown risk level '{}'", risk_name)))?;

        let region = match ctx.read_string("region-id", "") {
            s if s.is_empty() => None,
            s => Some(RegionId(s)),
        };

        let kind = match class {
            AssetClass::Property => InvestmentKind::Property(PropertyState::load_from(ctx)?),
            AssetClass::Trade => InvestmentKind::Trade(TradeState::load_from(ctx)?),
            AssetClass::Financial => InvestmentKind::Financial(FinancialState::load_from(ctx)?),
            _ => InvestmentKind::Holding,
        };

        Ok(Investment {
            id: InvestmentId(ctx.read_string("id", "")),
            name: ctx.read_string("name", ""),
            description: ctx.read_string("description", ""),
            class,
            risk,
            region,
            purchase_price: ctx.read_big("purchase-price"),
            current_value: ctx.read_big("current-value"),
            purchase_year: ctx.read_uint("purchase-year", 0),
            kind,
        })
    }
}

/// Compound growth helper shared by the compounding variants:
/// `FV = PV * (1 + rate)^years`.
pub(crate) fn compound(base: BigNumber, rate: f64, years: u32) -> BigNumber {
    let mut result = base;
    for _ in 0..years {
        result = result.mul_f64(1.0 + rate);
    }
    result
}
