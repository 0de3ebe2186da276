//! The portfolio: gold plus an ordered set of investments
//!
//! The portfolio is the only mutator of gold. Investments keep insertion
//! order and are unique by id. Removal notifies before the investment
//! leaves the collection, so observers can still resolve the id.

use serde::{Deserialize, Serialize};

use crate::core::bignum::BigNumber;
use crate::core::error::{LichError, Result};
use crate::core::signals::{Signal, SignalLog};
use crate::core::types::{AssetClass, InvestmentId, RiskLevel};
use crate::event::event::Event;
use crate::investment::investment::Investment;
use crate::save::context::{SaveContext, Saveable};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Portfolio {
    gold: BigNumber,
    investments: Vec<Investment>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gold(gold: BigNumber) -> Self {
        Self {
            gold: gold.max_zero(),
            investments: Vec::new(),
        }
    }

    pub fn gold(&self) -> BigNumber {
        self.gold
    }

    /// Clamps below at zero and notifies when the amount changed.
    pub fn set_gold(&mut self, amount: BigNumber, signals: &mut SignalLog) {
        let clamped = amount.max_zero();
        if clamped == self.gold {
            return;
        }
        self.gold = clamped;
        signals.emit(Signal::GoldChanged {
            total: self.gold.to_f64(),
        });
    }

    pub fn add_gold(&mut self, amount: BigNumber, signals: &mut SignalLog) {
        self.set_gold(self.gold.add(amount), signals);
    }

    /// Fails without touching the balance when gold is short.
    pub fn subtract_gold(&mut self, amount: BigNumber, signals: &mut SignalLog) -> Result<()> {
        if self.gold < amount {
            return Err(LichError::InsufficientGold {
                needed: amount.to_string(),
                available: self.gold.to_string(),
            });
        }
        self.set_gold(self.gold.sub(amount), signals);
        Ok(())
    }

    pub fn can_afford(&self, cost: BigNumber) -> bool {
        self.gold >= cost
    }

    pub fn investments(&self) -> &[Investment] {
        &self.investments
    }

    pub fn investments_mut(&mut self) -> &mut [Investment] {
        &mut self.investments
    }

    pub fn count(&self) -> usize {
        self.investments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.investments.is_empty()
    }

    /// Appends an investment, rejecting a second one with the same id.
    pub fn add_investment(&mut self, investment: Investment, signals: &mut SignalLog) -> Result<()> {
        if self.get_by_id(&investment.id).is_some() {
            return Err(LichError::Validation(format!(
                "duplicate investment id '{}'",
                investment.id
            )));
        }
        signals.emit(Signal::InvestmentAdded {
            id: investment.id.clone(),
            name: investment.name.clone(),
        });
        self.investments.push(investment);
        Ok(())
    }

    /// Removes by id, notifying before the investment leaves the
    /// collection. Returns the removed investment.
    pub fn remove_investment(
        &mut self,
        id: &InvestmentId,
        signals: &mut SignalLog,
    ) -> Option<Investment> {
        let index = self.investments.iter().position(|inv| &inv.id == id)?;
        signals.emit(Signal::InvestmentRemoved {
            id: id.clone(),
            returns: self.investments[index].current_value.to_f64(),
        });
        Some(self.investments.remove(index))
    }

    pub fn get_by_id(&self, id: &InvestmentId) -> Option<&Investment> {
        self.investments.iter().find(|inv| &inv.id == id)
    }

    pub fn get_by_id_mut(&mut self, id: &InvestmentId) -> Option<&mut Investment> {
        self.investments.iter_mut().find(|inv| &inv.id == id)
    }

    pub fn get_by_class(&self, class: AssetClass) -> Vec<&Investment> {
        self.investments
            .iter()
            .filter(|inv| inv.class == class)
            .collect()
    }

    pub fn get_by_risk(&self, risk: RiskLevel) -> Vec<&Investment> {
        self.investments
            .iter()
            .filter(|inv| inv.risk == risk)
            .collect()
    }

    /// Sum of current values, gold excluded.
    pub fn investment_value(&self) -> BigNumber {
        self.investments
            .iter()
            .fold(BigNumber::ZERO, |acc, inv| acc.add(inv.current_value))
    }

    /// Gold plus all current values.
    pub fn total_value(&self) -> BigNumber {
        self.gold.add(self.investment_value())
    }

    /// Combined yearly exposure from every holding.
    pub fn total_exposure_contribution(&self) -> u32 {
        self.investments
            .iter()
            .map(Investment::exposure_contribution)
            .sum()
    }

    /// Projected income over `years`: the sum of positive gains. Pure.
    pub fn calculate_income(&self, years: u32) -> BigNumber {
        self.investments.iter().fold(BigNumber::ZERO, |acc, inv| {
            let gain = inv.calculate_returns(years).sub(inv.current_value);
            acc.add(gain.max_zero())
        })
    }

    /// Advances every investment by `years`, banking positive gains as
    /// gold scaled by `income_multiplier`. Returns the unscaled income.
    pub fn apply_slumber(
        &mut self,
        years: u32,
        income_multiplier: f64,
        signals: &mut SignalLog,
    ) -> BigNumber {
        self.apply_slumber_with(years, income_multiplier, |_| 1.0, signals)
    }

    /// Like [`Portfolio::apply_slumber`], but each investment's banked
    /// gain is additionally scaled by `stewardship`, the per-holding
    /// modifier from whichever agent manages it. The returned income
    /// stays unscaled either way.
    pub fn apply_slumber_with(
        &mut self,
        years: u32,
        income_multiplier: f64,
        stewardship: impl Fn(&InvestmentId) -> f64,
        signals: &mut SignalLog,
    ) -> BigNumber {
        let mut income = BigNumber::ZERO;
        let mut banked = BigNumber::ZERO;
        for investment in &mut self.investments {
            let new_value = investment.calculate_returns(years);
            let gain = new_value.sub(investment.current_value).max_zero();
            income = income.add(gain);
            banked = banked.add(gain.mul_f64(stewardship(&investment.id)));
            investment.set_current_value(new_value, signals);
            for _ in 0..years {
                investment.tick_year();
            }
        }
        if !banked.is_zero() {
            self.add_gold(banked.mul_f64(income_multiplier), signals);
        }
        income
    }

    /// Fans the event out to every investment in insertion order.
    pub fn apply_event(&mut self, event: &Event, signals: &mut SignalLog) {
        for investment in &mut self.investments {
            investment.apply_event(event, signals);
        }
    }

    pub fn reset(&mut self) {
        self.gold = BigNumber::ZERO;
        self.investments.clear();
    }
}

impl Saveable for Portfolio {
    fn save(&self, ctx: &mut SaveContext) {
        ctx.write_big("gold", &self.gold);
        ctx.write_uint("investment-count", self.investments.len() as u64);
        for (i, investment) in self.investments.iter().enumerate() {
            ctx.begin_section(&format!("investment-{}", i));
            investment.save(ctx);
            ctx.end_section();
        }
    }

    fn load(&mut self, ctx: &mut SaveContext) -> Result<()> {
        self.reset();
        self.gold = ctx.read_big("gold").max_zero();

        let count = ctx.read_uint("investment-count", 0);
        for i in 0..count {
            ctx.begin_section(&format!("investment-{}", i));
            let investment = Investment::load_from(ctx);
            ctx.end_section();

            let investment = investment?;
            if self.get_by_id(&investment.id).is_some() {
                return Err(LichError::Load(format!(
                    "duplicate investment id '{}' in save",
                    investment.id
                )));
            }
            self.investments.push(investment);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{DebtStatus, RegionId, RouteStatus};
    use crate::investment::financial::FinancialType;
    use crate::investment::property::PropertyType;
    use crate::investment::trade::TradeType;

    fn farmland() -> Investment {
        Investment::property(
            "farm-1",
            "Valdris Farmland",
            PropertyType::Agricultural,
            RegionId::from("valdris"),
            BigNumber::new(1000.0),
            847,
        )
    }

    #[test]
    fn test_subtract_gold_guard() {
        let mut portfolio = Portfolio::with_gold(BigNumber::new(100.0));
        let mut signals = SignalLog::new();

        let err = portfolio
            .subtract_gold(BigNumber::new(150.0), &mut signals)
            .unwrap_err();
        assert!(matches!(err, LichError::InsufficientGold { .. }));
        assert!((portfolio.gold().to_f64() - 100.0).abs() < 1e-9);

        portfolio
            .subtract_gold(BigNumber::new(40.0), &mut signals)
            .unwrap();
        assert!((portfolio.gold().to_f64() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut portfolio = Portfolio::new();
        let mut signals = SignalLog::new();
        portfolio.add_investment(farmland(), &mut signals).unwrap();
        let err = portfolio
            .add_investment(farmland(), &mut signals)
            .unwrap_err();
        assert!(matches!(err, LichError::Validation(_)));
        assert_eq!(portfolio.count(), 1);
    }

    #[test]
    fn test_remove_notifies_with_final_value() {
        let mut portfolio = Portfolio::new();
        let mut signals = SignalLog::new();
        portfolio.add_investment(farmland(), &mut signals).unwrap();
        signals.clear();

        let removed = portfolio
            .remove_investment(&InvestmentId::from("farm-1"), &mut signals)
            .unwrap();
        assert_eq!(removed.name, "Valdris Farmland");
        assert_eq!(portfolio.count(), 0);

        let drained = signals.drain();
        assert_eq!(drained.len(), 1);
        match &drained[0] {
            Signal::InvestmentRemoved { returns, .. } => {
                assert!((returns - 1000.0).abs() < 1e-9);
            }
            other => panic!("unexpected signal {:?}", other),
        }

        assert!(portfolio
            .remove_investment(&InvestmentId::from("farm-1"), &mut signals)
            .is_none());
    }

    #[test]
    fn test_total_value_includes_gold() {
        let mut portfolio = Portfolio::with_gold(BigNumber::new(500.0));
        let mut signals = SignalLog::new();
        portfolio.add_investment(farmland(), &mut signals).unwrap();
        assert!((portfolio.total_value().to_f64() - 1500.0).abs() < 1e-9);
        assert!((portfolio.investment_value().to_f64() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_income_is_pure() {
        let mut portfolio = Portfolio::new();
        let mut signals = SignalLog::new();
        portfolio.add_investment(farmland(), &mut signals).unwrap();

        let income = portfolio.calculate_income(10).to_f64();
        assert!(income > 300.0 && income < 400.0);
        assert!((portfolio.investment_value().to_f64() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_decade_of_farmland_slumber() {
        let mut portfolio = Portfolio::with_gold(BigNumber::new(1000.0));
        let mut signals = SignalLog::new();
        portfolio.add_investment(farmland(), &mut signals).unwrap();

        for _ in 0..10 {
            portfolio.apply_slumber(1, 1.0, &mut signals);
        }

        // 3% compounding: value 1343.92, gains banked as gold
        let value = portfolio.investment_value().to_f64();
        assert!((value - 1343.916379).abs() < 0.01, "value {}", value);
        let gold = portfolio.gold().to_f64();
        assert!((gold - 1343.916379).abs() < 0.01, "gold {}", gold);
    }

    #[test]
    fn test_slumber_income_multiplier_scales_gold_not_income() {
        let mut portfolio = Portfolio::new();
        let mut signals = SignalLog::new();
        portfolio.add_investment(farmland(), &mut signals).unwrap();

        let income = portfolio.apply_slumber(1, 2.0, &mut signals).to_f64();
        assert!((income - 30.0).abs() < 1e-6);
        assert!((portfolio.gold().to_f64() - 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_slumber_stewardship_scales_per_holding() {
        let mut portfolio = Portfolio::new();
        let mut signals = SignalLog::new();
        portfolio.add_investment(farmland(), &mut signals).unwrap();

        // A competent steward banks half again as much from the holding.
        let income = portfolio
            .apply_slumber_with(1, 1.0, |_| 1.5, &mut signals)
            .to_f64();
        assert!((income - 30.0).abs() < 1e-6);
        assert!((portfolio.gold().to_f64() - 45.0).abs() < 1e-6);
    }

    #[test]
    fn test_apply_event_fans_out() {
        let mut portfolio = Portfolio::new();
        let mut signals = SignalLog::new();
        portfolio.add_investment(farmland(), &mut signals).unwrap();
        portfolio
            .add_investment(
                Investment::trade(
                    "route-1",
                    "Spice Route",
                    TradeType::Route,
                    Some(RegionId::from("valdris")),
                    None,
                    BigNumber::new(2000.0),
                    847,
                ),
                &mut signals,
            )
            .unwrap();

        let golden_age = Event::economic(
            "econ-850-1",
            "Golden Age",
            crate::core::types::EventSeverity::Major,
            850,
            1.4,
            None,
        );
        portfolio.apply_event(&golden_age, &mut signals);

        assert!((portfolio.investments()[0].current_value.to_f64() - 1400.0).abs() < 1e-6);
        assert!((portfolio.investments()[1].current_value.to_f64() - 2800.0).abs() < 1e-6);
    }

    #[test]
    fn test_war_event_disrupts_local_route() {
        let mut portfolio = Portfolio::new();
        let mut signals = SignalLog::new();
        portfolio
            .add_investment(
                Investment::trade(
                    "route-1",
                    "Spice Route",
                    TradeType::Route,
                    Some(RegionId::from("valdris")),
                    Some(RegionId::from("meridian")),
                    BigNumber::new(1000.0),
                    847,
                ),
                &mut signals,
            )
            .unwrap();

        let mut war = Event::political(
            "poli-860-1",
            "Civil War",
            crate::core::types::EventSeverity::Catastrophic,
            860,
            -50,
            true,
        );
        war.affects_region = Some(RegionId::from("valdris"));
        portfolio.apply_event(&war, &mut signals);

        let route = portfolio.investments()[0].trade_state().unwrap();
        assert_eq!(route.status, RouteStatus::Disrupted);
        // value also halved by the war modifier
        assert!((portfolio.investments()[0].current_value.to_f64() - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_save_load_round_trip_mixed_kinds() {
        let mut portfolio = Portfolio::with_gold(BigNumber::new(5000.0));
        let mut signals = SignalLog::new();
        portfolio.add_investment(farmland(), &mut signals).unwrap();
        portfolio
            .add_investment(
                Investment::trade(
                    "route-1",
                    "Spice Route",
                    TradeType::Route,
                    Some(RegionId::from("valdris")),
                    None,
                    BigNumber::new(2000.0),
                    850,
                ),
                &mut signals,
            )
            .unwrap();
        portfolio
            .add_investment(
                Investment::financial(
                    "bond-1",
                    "Crown Bond",
                    FinancialType::CrownBond,
                    BigNumber::new(1000.0),
                    None,
                    0,
                    BigNumber::new(1000.0),
                    851,
                ),
                &mut signals,
            )
            .unwrap();

        let mut ctx = SaveContext::new();
        portfolio.save(&mut ctx);

        let mut restored = Portfolio::new();
        restored.load(&mut ctx).unwrap();

        assert_eq!(restored.count(), 3);
        assert_eq!(restored.gold(), portfolio.gold());
        assert_eq!(restored.investments()[0].id, InvestmentId::from("farm-1"));
        assert!(restored.investments()[1].trade_state().is_some());
        let bond = restored.investments()[2].financial_state().unwrap();
        assert_eq!(bond.status, DebtStatus::Performing);
        assert_eq!(restored.investments()[2].purchase_year, 851);
    }
}
