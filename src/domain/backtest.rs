//! Backtest engine: replays crossover events against the price series.
//!
//! Single mutable [`PortfolioState`] threaded through the bar loop. A
//! BuyCross with cash converts all cash to shares at the bar close; a
//! SellCross with shares liquidates. Everything else is a no-op. One equity
//! point is appended per bar, event or not.

use tracing::info;

use super::error::MatraderError;
use super::portfolio::{EquityPoint, PortfolioState, Trade, TradeSide};
use super::series::PriceSeries;
use super::signal::{CrossDirection, SignalSeries};

/// How a buy converts cash into shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareSizing {
    /// Floor division: whole shares only, residual stays in cash.
    Whole,
    /// Exact division: fully invested, cash goes to zero.
    Fractional,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub sizing: ShareSizing,
    pub liquidate_at_end: bool,
    pub risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            sizing: ShareSizing::Whole,
            liquidate_at_end: false,
            risk_free_rate: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub initial_capital: f64,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<Trade>,
    /// Realized P&L of each closed round trip, chronological.
    pub trade_pnls: Vec<f64>,
    pub final_state: PortfolioState,
}

impl BacktestResult {
    pub fn final_value(&self) -> f64 {
        self.equity_curve
            .last()
            .map(|p| p.value)
            .unwrap_or(self.initial_capital)
    }
}

/// Walk the series bar by bar, applying crossover events.
///
/// The signal series must come from the same price series (lengths must
/// match). Fails on an empty series or non-positive starting capital.
pub fn run_backtest(
    series: &PriceSeries,
    signals: &SignalSeries,
    config: &BacktestConfig,
) -> Result<BacktestResult, MatraderError> {
    if series.is_empty() {
        return Err(MatraderError::InsufficientData {
            have: 0,
            minimum: 1,
        });
    }
    if signals.len() != series.len() {
        return Err(MatraderError::Data {
            reason: format!(
                "signal series length {} does not match price series length {}",
                signals.len(),
                series.len()
            ),
        });
    }
    if config.initial_capital <= 0.0 {
        return Err(MatraderError::Configuration {
            reason: format!(
                "initial_capital must be positive, got {}",
                config.initial_capital
            ),
        });
    }

    let bars = series.bars();
    let last_index = bars.len() - 1;
    let mut state = PortfolioState::new(config.initial_capital);
    let mut events = signals.crossovers().peekable();
    let mut equity_curve = Vec::with_capacity(bars.len());
    let mut trades = Vec::new();
    let mut trade_pnls = Vec::new();
    let mut entry_price = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if let Some(event) = events.next_if(|e| e.index == i) {
            match event.direction {
                CrossDirection::BuyCross if state.cash > 0.0 => {
                    // fractional fills go to exactly zero cash; rounding in
                    // shares * close must not push cash below zero
                    let (shares, cash_after) = match config.sizing {
                        ShareSizing::Whole => {
                            let shares = (state.cash / bar.close).floor();
                            (shares, (state.cash - shares * bar.close).max(0.0))
                        }
                        ShareSizing::Fractional => (state.cash / bar.close, 0.0),
                    };
                    if shares > 0.0 {
                        state.cash = cash_after;
                        state.shares += shares;
                        entry_price = bar.close;
                        info!(
                            date = %bar.date,
                            price = bar.close,
                            shares,
                            cash = state.cash,
                            "buy"
                        );
                        trades.push(Trade {
                            date: bar.date,
                            side: TradeSide::Buy,
                            price: bar.close,
                            shares,
                            cash_after: state.cash,
                        });
                    }
                }
                CrossDirection::SellCross if state.shares > 0.0 => {
                    let shares = state.shares;
                    state.cash += shares * bar.close;
                    state.shares = 0.0;
                    trade_pnls.push(shares * (bar.close - entry_price));
                    info!(
                        date = %bar.date,
                        price = bar.close,
                        shares,
                        cash = state.cash,
                        "sell"
                    );
                    trades.push(Trade {
                        date: bar.date,
                        side: TradeSide::Sell,
                        price: bar.close,
                        shares,
                        cash_after: state.cash,
                    });
                }
                _ => {}
            }
        }

        if i == last_index && config.liquidate_at_end && state.shares > 0.0 {
            let shares = state.shares;
            state.cash += shares * bar.close;
            state.shares = 0.0;
            trade_pnls.push(shares * (bar.close - entry_price));
            info!(
                date = %bar.date,
                price = bar.close,
                shares,
                cash = state.cash,
                "final liquidation"
            );
            trades.push(Trade {
                date: bar.date,
                side: TradeSide::Sell,
                price: bar.close,
                shares,
                cash_after: state.cash,
            });
        }

        // negative cash or shares means the state machine is broken
        assert!(
            state.cash >= 0.0 && state.shares >= 0.0,
            "portfolio state corrupted at {}: cash {} shares {}",
            bar.date,
            state.cash,
            state.shares
        );

        equity_curve.push(EquityPoint {
            date: bar.date,
            value: state.total_value(bar.close),
        });
    }

    Ok(BacktestResult {
        initial_capital: config.initial_capital,
        equity_curve,
        trades,
        trade_pnls,
        final_state: state,
    })
}
