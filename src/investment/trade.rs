//! Trade investments: routes, commodities, guild stakes
//!
//! Trade yield is the subtype rate scaled by route status and the market
//! modifier, so a disrupted route earns half and a closed one nothing.
//! Volatile markets push the risk modifier up even while they pay more.

use serde::{Deserialize, Serialize};

use crate::core::bignum::BigNumber;
use crate::core::error::Result;
use crate::core::signals::{Signal, SignalLog};
use crate::core::types::{AssetClass, InvestmentId, RegionId, RiskLevel, RouteStatus};
use crate::investment::investment::{Investment, InvestmentKind};
use crate::save::context::SaveContext;

/// Market modifiers outside this band mark the position as volatile.
const STABLE_MARKET_BAND: (f64, f64) = (0.8, 1.2);

/// Risk surcharge applied while the market is outside the stable band.
const VOLATILE_MARKET_SURCHARGE: f64 = 1.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeType {
    Route,
    Commodity,
    Guild,
    Shipping,
    Caravan,
}

impl TradeType {
    pub fn base_rate(&self) -> f64 {
        match self {
            TradeType::Route => 0.06,
            TradeType::Commodity => 0.08,
            TradeType::Guild => 0.05,
            TradeType::Shipping => 0.07,
            TradeType::Caravan => 0.065,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TradeType::Route => "route",
            TradeType::Commodity => "commodity",
            TradeType::Guild => "guild",
            TradeType::Shipping => "shipping",
            TradeType::Caravan => "caravan",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "route" => Some(TradeType::Route),
            "commodity" => Some(TradeType::Commodity),
            "guild" => Some(TradeType::Guild),
            "shipping" => Some(TradeType::Shipping),
            "caravan" => Some(TradeType::Caravan),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeState {
    pub subtype: TradeType,
    pub status: RouteStatus,
    /// Demand multiplier on the base rate, clamped to [0.0, 3.0].
    pub market_modifier: f64,
    pub source_region: Option<RegionId>,
    pub dest_region: Option<RegionId>,
    pub commodity: Option<String>,
}

impl TradeState {
    pub fn new(subtype: TradeType) -> Self {
        Self {
            subtype,
            status: RouteStatus::Open,
            market_modifier: 1.0,
            source_region: None,
            dest_region: None,
            commodity: None,
        }
    }

    /// Subtype rate scaled by route status and market demand.
    pub fn effective_rate(&self) -> f64 {
        self.subtype.base_rate() * self.status.income_multiplier() * self.market_modifier
    }

    pub fn risk_modifier(&self) -> f64 {
        let base = match self.status {
            RouteStatus::Open => 1.0,
            RouteStatus::Disrupted => 1.5,
            RouteStatus::Closed => 2.0,
        };
        let (lo, hi) = STABLE_MARKET_BAND;
        if self.market_modifier < lo || self.market_modifier > hi {
            base * VOLATILE_MARKET_SURCHARGE
        } else {
            base
        }
    }

    pub fn set_status(&mut self, id: &InvestmentId, status: RouteStatus, signals: &mut SignalLog) {
        if self.status == status {
            return;
        }
        self.status = status;
        signals.emit(Signal::RouteStatusChanged {
            id: id.clone(),
            status,
        });
    }

    /// Flips an open route to disrupted. Already-troubled routes keep
    /// their current status.
    pub fn disrupt(&mut self, id: &InvestmentId, signals: &mut SignalLog) {
        if self.status == RouteStatus::Open {
            self.set_status(id, RouteStatus::Disrupted, signals);
        }
    }

    /// Whether the route passes through the given region. An event with
    /// no region touches every route.
    pub fn touches_region(&self, region: Option<&RegionId>) -> bool {
        match region {
            None => true,
            Some(region) => {
                self.source_region.as_ref() == Some(region)
                    || self.dest_region.as_ref() == Some(region)
            }
        }
    }

    pub fn can_sell(&self) -> bool {
        true
    }

    pub fn save(&self, ctx: &mut SaveContext) {
        ctx.write_string("trade-type", self.subtype.name());
        ctx.write_string("route-status", self.status.name());
        ctx.write_double("market-modifier", self.market_modifier);
        ctx.write_string(
            "source-region-id",
            self.source_region.as_ref().map(|r| r.as_str()).unwrap_or(""),
        );
        ctx.write_string(
            "dest-region-id",
            self.dest_region.as_ref().map(|r| r.as_str()).unwrap_or(""),
        );
        ctx.write_string("commodity", self.commodity.as_deref().unwrap_or(""));
    }

    pub fn load_from(ctx: &mut SaveContext) -> Result<Self> {
        let subtype = TradeType::from_name(&ctx.read_string("trade-type", "route"))
            .unwrap_or(TradeType::Route);
        let status = RouteStatus::from_name(&ctx.read_string("route-status", "open"))
            .unwrap_or(RouteStatus::Open);

        let read_opt = |s: String| if s.is_empty() { None } else { Some(s) };
        Ok(Self {
            subtype,
            status,
            market_modifier: ctx.read_double("market-modifier", 1.0).clamp(0.0, 3.0),
            source_region: read_opt(ctx.read_string("source-region-id", "")).map(RegionId),
            dest_region: read_opt(ctx.read_string("dest-region-id", "")).map(RegionId),
            commodity: read_opt(ctx.read_string("commodity", "")),
        })
    }
}

impl Investment {
    /// Creates a trade investment between two regions. Trade starts at
    /// medium risk with an open route and a neutral market.
    pub fn trade(
        id: impl Into<InvestmentId>,
        name: impl Into<String>,
        subtype: TradeType,
        source: Option<RegionId>,
        dest: Option<RegionId>,
        value: BigNumber,
        purchase_year: u64,
    ) -> Self {
        let mut state = TradeState::new(subtype);
        state.source_region = source.clone();
        state.dest_region = dest;
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            class: AssetClass::Trade,
            risk: RiskLevel::Medium,
            region: source,
            purchase_price: value,
            current_value: value,
            purchase_year,
            kind: InvestmentKind::Trade(state),
        }
    }

    /// Sets the route status, returning false for non-trade investments.
    pub fn set_route_status(&mut self, status: RouteStatus, signals: &mut SignalLog) -> bool {
        let id = self.id.clone();
        match self.trade_state_mut() {
            Some(state) => {
                state.set_status(&id, status, signals);
                true
            }
            None => false,
        }
    }

    /// Sets the market modifier, clamped to [0.0, 3.0]. Returns false
    /// for non-trade investments.
    pub fn set_market_modifier(&mut self, modifier: f64) -> bool {
        match self.trade_state_mut() {
            Some(state) => {
                state.market_modifier = modifier.clamp(0.0, 3.0);
                true
            }
            None => false,
        }
    }
}
