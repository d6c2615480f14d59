//! Portfolio state and trade records.

use chrono::NaiveDate;
use serde::Serialize;

/// Side of a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// A single fill: full-notional market order at the bar close.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub date: NaiveDate,
    pub side: TradeSide,
    pub price: f64,
    pub shares: f64,
    pub cash_after: f64,
}

/// One point of the portfolio value series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Single-asset portfolio: all capital is either cash or shares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioState {
    pub cash: f64,
    pub shares: f64,
}

impl PortfolioState {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            shares: 0.0,
        }
    }

    pub fn total_value(&self, price: f64) -> f64 {
        self.cash + self.shares * price
    }

    pub fn is_invested(&self) -> bool {
        self.shares > 0.0
    }
}
