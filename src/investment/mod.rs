//! Investments and the portfolio that owns them

pub mod financial;
pub mod investment;
pub mod portfolio;
pub mod property;
pub mod trade;

pub use financial::{FinancialState, FinancialType};
pub use investment::{Investment, InvestmentKind};
pub use portfolio::Portfolio;
pub use property::{PropertyState, PropertyType, MAX_IMPROVEMENTS};
pub use trade::{TradeState, TradeType};
