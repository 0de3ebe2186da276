//! Financial instruments: bonds, debts, and notes
//!
//! Financial paper accrues simple interest on face value rather than
//! compounding. Delinquent debt accrues at half rate; a default scales
//! the value once by the subtype recovery rate and freezes it there.
//! A maturity year of zero means perpetual.

use serde::{Deserialize, Serialize};

use crate::core::bignum::BigNumber;
use crate::core::error::Result;
use crate::core::signals::{Signal, SignalLog};
use crate::core::types::{AssetClass, DebtStatus, InvestmentId, KingdomId, RiskLevel};
use crate::investment::investment::{Investment, InvestmentKind};
use crate::save::context::SaveContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinancialType {
    CrownBond,
    NobleDebt,
    MerchantNote,
    Insurance,
    Usury,
}

impl FinancialType {
    /// Interest rate the instrument carries at issue.
    pub fn default_rate(&self) -> f64 {
        match self {
            FinancialType::CrownBond => 0.04,
            FinancialType::NobleDebt => 0.06,
            FinancialType::MerchantNote => 0.07,
            FinancialType::Insurance => 0.05,
            FinancialType::Usury => 0.12,
        }
    }

    /// Fraction of value retained when the issuer defaults.
    pub fn recovery_rate(&self) -> f64 {
        match self {
            FinancialType::CrownBond => 0.50,
            FinancialType::NobleDebt => 0.30,
            FinancialType::MerchantNote => 0.20,
            FinancialType::Insurance => 0.00,
            FinancialType::Usury => 0.10,
        }
    }

    /// Inherent riskiness of the issuer class.
    pub fn risk_weight(&self) -> f64 {
        match self {
            FinancialType::CrownBond => 0.8,
            FinancialType::NobleDebt => 1.0,
            FinancialType::MerchantNote => 1.2,
            FinancialType::Insurance => 1.0,
            FinancialType::Usury => 1.5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FinancialType::CrownBond => "crown-bond",
            FinancialType::NobleDebt => "noble-debt",
            FinancialType::MerchantNote => "merchant-note",
            FinancialType::Insurance => "insurance",
            FinancialType::Usury => "usury",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "crown-bond" => Some(FinancialType::CrownBond),
            "noble-debt" => Some(FinancialType::NobleDebt),
            "merchant-note" => Some(FinancialType::MerchantNote),
            "insurance" => Some(FinancialType::Insurance),
            "usury" => Some(FinancialType::Usury),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialState {
    pub subtype: FinancialType,
    pub status: DebtStatus,
    /// Fixed at issue; never reset by later rate changes.
    pub interest_rate: f64,
    pub face_value: BigNumber,
    /// Absolute year of maturity; 0 means perpetual.
    pub maturity_year: u64,
    pub issuer: Option<KingdomId>,
    /// Interest years already credited, for the maturity cap.
    pub years_accrued: u64,
}

impl FinancialState {
    pub fn new(subtype: FinancialType, face_value: BigNumber) -> Self {
        Self {
            subtype,
            status: DebtStatus::Performing,
            interest_rate: subtype.default_rate(),
            face_value,
            maturity_year: 0,
            issuer: None,
            years_accrued: 0,
        }
    }

    /// Simple interest over `years`, capped at maturity. A defaulted
    /// instrument projects flat.
    pub fn project(&self, current: BigNumber, purchase_year: u64, years: u32) -> BigNumber {
        let accrual_factor = match self.status {
            DebtStatus::Performing => 1.0,
            DebtStatus::Delinquent => 0.5,
            DebtStatus::Default => return current,
        };
        let effective = self.accruable_years(purchase_year, years);
        if effective == 0 {
            return current;
        }
        let interest = self.interest_rate * accrual_factor * effective as f64;
        current.add(self.face_value.mul_f64(interest))
    }

    /// Years of interest still payable within the projection window.
    fn accruable_years(&self, purchase_year: u64, years: u32) -> u64 {
        if self.maturity_year == 0 {
            return years as u64;
        }
        let term = self.maturity_year.saturating_sub(purchase_year);
        term.saturating_sub(self.years_accrued).min(years as u64)
    }

    pub fn risk_modifier(&self) -> f64 {
        let status_factor = match self.status {
            DebtStatus::Performing => 1.0,
            DebtStatus::Delinquent => 1.5,
            DebtStatus::Default => 2.0,
        };
        self.subtype.risk_weight() * status_factor
    }

    pub fn set_status(&mut self, id: &InvestmentId, status: DebtStatus, signals: &mut SignalLog) {
        if self.status == status {
            return;
        }
        self.status = status;
        signals.emit(Signal::DebtStatusChanged {
            id: id.clone(),
            status,
        });
    }

    /// Downgrades performing paper to delinquent; worse statuses stand.
    pub fn mark_delinquent(&mut self, id: &InvestmentId, signals: &mut SignalLog) {
        if self.status == DebtStatus::Performing {
            self.set_status(id, DebtStatus::Delinquent, signals);
        }
    }

    /// Whether this paper was issued by the given kingdom. Events that
    /// name no kingdom touch no issuer.
    pub fn issued_by(&self, kingdom: Option<&KingdomId>) -> bool {
        match (self.issuer.as_ref(), kingdom) {
            (Some(issuer), Some(kingdom)) => issuer == kingdom,
            _ => false,
        }
    }

    pub fn tick_year(&mut self) {
        self.years_accrued += 1;
    }

    pub fn can_sell(&self) -> bool {
        true
    }

    pub fn save(&self, ctx: &mut SaveContext) {
        ctx.write_string("financial-type", self.subtype.name());
        ctx.write_string("debt-status", self.status.name());
        ctx.write_double("interest-rate", self.interest_rate);
        ctx.write_big("face-value", &self.face_value);
        ctx.write_uint("maturity-year", self.maturity_year);
        ctx.write_string(
            "issuer-id",
            self.issuer.as_ref().map(|k| k.as_str()).unwrap_or(""),
        );
        ctx.write_uint("years-accrued", self.years_accrued);
    }

    pub fn load_from(ctx: &mut SaveContext) -> Result<Self> {
        let subtype = FinancialType::from_name(&ctx.read_string("financial-type", "crown-bond"))
            .unwrap_or(FinancialType::CrownBond);
        let status = DebtStatus::from_name(&ctx.read_string("debt-status", "performing"))
            .unwrap_or(DebtStatus::Performing);

        let issuer = match ctx.read_string("issuer-id", "") {
            s if s.is_empty() => None,
            s => Some(KingdomId(s)),
        };
        Ok(Self {
            subtype,
            status,
            interest_rate: ctx.read_double("interest-rate", subtype.default_rate()),
            face_value: ctx.read_big("face-value"),
            maturity_year: ctx.read_uint("maturity-year", 0),
            issuer,
            years_accrued: ctx.read_uint("years-accrued", 0),
        })
    }
}

impl Investment {
    /// Creates a financial instrument at medium risk, performing, with
    /// the subtype's standard rate.
    pub fn financial(
        id: impl Into<InvestmentId>,
        name: impl Into<String>,
        subtype: FinancialType,
        face_value: BigNumber,
        issuer: Option<KingdomId>,
        maturity_year: u64,
        value: BigNumber,
        purchase_year: u64,
    ) -> Self {
        let mut state = FinancialState::new(subtype, face_value);
        state.issuer = issuer;
        state.maturity_year = maturity_year;
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            class: AssetClass::Financial,
            risk: RiskLevel::Medium,
            region: None,
            purchase_price: value,
            current_value: value,
            purchase_year,
            kind: InvestmentKind::Financial(state),
        }
    }

    /// Sets the debt status, returning false for non-financial
    /// investments. Entering default scales the value once by the
    /// subtype recovery rate; the value then stays frozen.
    pub fn set_debt_status(&mut self, status: DebtStatus, signals: &mut SignalLog) -> bool {
        let id = self.id.clone();
        let Some(state) = self.financial_state_mut() else {
            return false;
        };
        let entering_default = status == DebtStatus::Default && state.status != DebtStatus::Default;
        let recovery = state.subtype.recovery_rate();
        state.set_status(&id, status, signals);

        if entering_default {
            let recovered = self.current_value.mul_f64(recovery);
            self.set_current_value(recovered, signals);
        }
        true
    }
}
