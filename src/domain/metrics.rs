//! Portfolio performance and risk metrics.
//!
//! Pure functions over the equity-curve values and the realized per-trade
//! P&L list. Zero-variance denominators yield `None`, never a crash and
//! never a silent zero.

use serde::Serialize;

use super::backtest::BacktestResult;
use super::error::MatraderError;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Scalar risk/performance bundle for one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub final_value: f64,
    pub profit: f64,
    pub roi: f64,
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: f64,
    pub max_consecutive_losses: usize,
    pub var: f64,
    pub cvar: Option<f64>,
}

/// (final - initial) / initial, in percent.
pub fn roi(initial: f64, final_value: f64) -> f64 {
    (final_value - initial) / initial * 100.0
}

/// Percent change between consecutive values; one element shorter than the
/// input.
pub fn daily_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| {
            if w[0] > 0.0 {
                (w[1] - w[0]) / w[0]
            } else {
                0.0
            }
        })
        .collect()
}

fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
fn sample_std(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }
    let m = mean(data);
    let variance =
        data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Daily Sharpe ratio: (mean - rate/252) / std of the daily returns.
///
/// None when fewer than two returns or the deviation is zero.
pub fn sharpe_ratio(returns: &[f64], annual_risk_free_rate: f64) -> Option<f64> {
    let std = sample_std(returns)?;
    if std == 0.0 {
        return None;
    }
    let daily_rf = annual_risk_free_rate / TRADING_DAYS_PER_YEAR;
    Some((mean(returns) - daily_rf) / std)
}

/// Sample standard deviation of the daily returns.
pub fn volatility(returns: &[f64]) -> Option<f64> {
    sample_std(returns)
}

/// Compound annual growth rate over the value series, assuming 252 trading
/// days per year.
pub fn cagr(values: &[f64]) -> Option<f64> {
    let (first, last) = match (values.first(), values.last()) {
        (Some(&f), Some(&l)) if values.len() >= 2 && f > 0.0 => (f, l),
        _ => return None,
    };
    let years = values.len() as f64 / TRADING_DAYS_PER_YEAR;
    Some((last / first).powf(1.0 / years) - 1.0)
}

/// Longest run of consecutive negative entries in the chronological P&L list.
pub fn max_consecutive_losses(trade_pnls: &[f64]) -> usize {
    let mut longest = 0;
    let mut streak = 0;
    for &pnl in trade_pnls {
        if pnl < 0.0 {
            streak += 1;
            longest = longest.max(streak);
        } else {
            streak = 0;
        }
    }
    longest
}

/// Maximum drawdown of the additive cumulative-return curve: running maximum
/// of the cumulative sum of returns minus the current cumulative sum,
/// maximized over time.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 0.0;
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &r in returns {
        cumulative += r;
        peak = peak.max(cumulative);
        worst = worst.max(peak - cumulative);
    }
    worst
}

/// Linearly interpolated empirical percentile of sorted data, q in [0, 1].
fn percentile_linear(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (rank - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

fn check_confidence(confidence: f64) -> Result<(), MatraderError> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(MatraderError::Configuration {
            reason: format!("confidence must be in (0, 1), got {confidence}"),
        });
    }
    Ok(())
}

/// Value-at-Risk: the (1 - confidence) empirical percentile of the return
/// sample, linearly interpolated.
pub fn var(returns: &[f64], confidence: f64) -> Result<f64, MatraderError> {
    check_confidence(confidence)?;
    if returns.is_empty() {
        return Err(MatraderError::InsufficientData {
            have: 0,
            minimum: 1,
        });
    }
    let mut sorted = returns.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("returns must not contain NaN"));
    Ok(percentile_linear(&sorted, 1.0 - confidence))
}

/// Conditional VaR: mean of the returns at or below the VaR threshold.
///
/// None when no sample qualifies.
pub fn cvar(returns: &[f64], confidence: f64) -> Result<Option<f64>, MatraderError> {
    let threshold = var(returns, confidence)?;
    let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= threshold).collect();
    if tail.is_empty() {
        Ok(None)
    } else {
        Ok(Some(mean(&tail)))
    }
}

/// Assemble the full report for a backtest run.
///
/// Needs at least two equity points (one daily return) for the VaR leg.
pub fn risk_report(
    result: &BacktestResult,
    annual_risk_free_rate: f64,
    confidence: f64,
) -> Result<RiskReport, MatraderError> {
    let values: Vec<f64> = result.equity_curve.iter().map(|p| p.value).collect();
    if values.len() < 2 {
        return Err(MatraderError::InsufficientData {
            have: values.len(),
            minimum: 2,
        });
    }
    let returns = daily_returns(&values);
    let final_value = result.final_value();

    Ok(RiskReport {
        final_value,
        profit: final_value - result.initial_capital,
        roi: roi(result.initial_capital, final_value),
        sharpe_ratio: sharpe_ratio(&returns, annual_risk_free_rate),
        max_drawdown: max_drawdown(&returns),
        max_consecutive_losses: max_consecutive_losses(&result.trade_pnls),
        var: var(&returns, confidence)?,
        cvar: cvar(&returns, confidence)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn roi_round_trip() {
        assert_relative_eq!(roi(100_000.0, 166_666.0), 66.666, epsilon = 1e-9);
        assert_relative_eq!(roi(100.0, 90.0), -10.0, epsilon = 1e-12);
    }

    #[test]
    fn daily_returns_drops_first_sample() {
        let returns = daily_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert_relative_eq!(returns[0], 0.10, epsilon = 1e-12);
        assert_relative_eq!(returns[1], -0.10, epsilon = 1e-12);
    }

    #[test]
    fn sharpe_zero_variance_is_none() {
        assert_eq!(sharpe_ratio(&[0.01, 0.01, 0.01], 0.05), None);
        assert_eq!(sharpe_ratio(&[0.01], 0.05), None);
        assert_eq!(sharpe_ratio(&[], 0.05), None);
    }

    #[test]
    fn sharpe_hand_computed() {
        // mean 0.01, sample std sqrt(0.0001) = 0.01
        let returns = [0.0, 0.02];
        let sharpe = sharpe_ratio(&returns, 0.0).unwrap();
        let expected = 0.01 / (0.0002_f64 / 1.0).sqrt();
        assert_relative_eq!(sharpe, expected, epsilon = 1e-12);
    }

    #[test]
    fn sharpe_subtracts_daily_risk_free() {
        let returns = [0.0, 0.02];
        let with_rf = sharpe_ratio(&returns, 0.0504).unwrap();
        let without = sharpe_ratio(&returns, 0.0).unwrap();
        let std = (0.0002_f64).sqrt();
        assert_relative_eq!(without - with_rf, 0.0002 / std, epsilon = 1e-12);
    }

    #[test]
    fn volatility_matches_sample_std() {
        let vol = volatility(&[0.0, 0.02]).unwrap();
        assert_relative_eq!(vol, (0.0002_f64).sqrt(), epsilon = 1e-15);
        assert_eq!(volatility(&[0.01]), None);
    }

    #[test]
    fn cagr_flat_series_is_zero() {
        let values = vec![100.0; 252];
        assert_relative_eq!(cagr(&values).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn cagr_one_year_double() {
        let mut values = vec![100.0; 252];
        values[251] = 200.0;
        let growth = cagr(&values).unwrap();
        assert_relative_eq!(growth, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn cagr_needs_two_values() {
        assert_eq!(cagr(&[100.0]), None);
        assert_eq!(cagr(&[]), None);
    }

    #[test]
    fn loss_streaks() {
        assert_eq!(max_consecutive_losses(&[]), 0);
        assert_eq!(max_consecutive_losses(&[1.0, 2.0]), 0);
        assert_eq!(max_consecutive_losses(&[-1.0, -2.0, 3.0, -1.0]), 2);
        assert_eq!(max_consecutive_losses(&[-1.0, 3.0, -1.0, -2.0, -3.0]), 3);
        // break-even trades reset the streak
        assert_eq!(max_consecutive_losses(&[-1.0, 0.0, -1.0]), 1);
    }

    #[test]
    fn drawdown_hand_computed() {
        // cumulative: 0.1, 0.05, 0.07, -0.13; peak stays 0.1
        let returns = [0.1, -0.05, 0.02, -0.2];
        assert_relative_eq!(max_drawdown(&returns), 0.23, epsilon = 1e-12);
    }

    #[test]
    fn drawdown_monotonic_rise_is_zero() {
        assert_relative_eq!(max_drawdown(&[0.01, 0.02, 0.005]), 0.0, epsilon = 1e-15);
        assert_relative_eq!(max_drawdown(&[]), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn var_linear_interpolation() {
        // 20th percentile of 5 samples: rank 0.8 between -0.05 and -0.03
        let returns = [-0.05, -0.03, -0.01, 0.02, 0.04];
        let value = var(&returns, 0.8).unwrap();
        assert_relative_eq!(value, -0.034, epsilon = 1e-12);
    }

    #[test]
    fn var_higher_confidence_moves_into_tail() {
        let returns = [-0.05, -0.03, -0.01, 0.02, 0.04];
        let value = var(&returns, 0.95).unwrap();
        assert_relative_eq!(value, -0.046, epsilon = 1e-12);
    }

    #[test]
    fn var_unordered_input() {
        let returns = [0.04, -0.05, 0.02, -0.03, -0.01];
        let value = var(&returns, 0.8).unwrap();
        assert_relative_eq!(value, -0.034, epsilon = 1e-12);
    }

    #[test]
    fn var_rejects_bad_confidence() {
        let returns = [0.01, 0.02];
        assert!(var(&returns, 0.0).is_err());
        assert!(var(&returns, 1.0).is_err());
        assert!(var(&returns, 1.5).is_err());
    }

    #[test]
    fn var_rejects_empty_sample() {
        assert!(matches!(
            var(&[], 0.95),
            Err(MatraderError::InsufficientData { .. })
        ));
    }

    #[test]
    fn cvar_tail_mean() {
        let returns = [-0.05, -0.03, -0.01, 0.02, 0.04];
        let value = cvar(&returns, 0.8).unwrap().unwrap();
        // only -0.05 sits at or below the -0.034 threshold
        assert_relative_eq!(value, -0.05, epsilon = 1e-12);
    }

    #[test]
    fn cvar_single_sample() {
        let value = cvar(&[-0.02], 0.95).unwrap().unwrap();
        assert_relative_eq!(value, -0.02, epsilon = 1e-12);
    }

    #[test]
    fn report_from_backtest() {
        use crate::domain::backtest::{run_backtest, BacktestConfig};
        use crate::domain::indicator::MaKind;
        use crate::domain::series::{PriceBar, PriceSeries};
        use crate::domain::signal::{generate_signals, SignalConfig};
        use chrono::NaiveDate;

        let bars = [10.0, 12.0, 8.0, 14.0, 9.0, 15.0]
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                close,
            })
            .collect();
        let series = PriceSeries::new(bars).unwrap();
        let signal_config = SignalConfig::new(2, 3, MaKind::Simple).unwrap();
        let signals = generate_signals(&series, &signal_config);
        let result = run_backtest(&series, &signals, &BacktestConfig::default()).unwrap();

        let report = risk_report(&result, 0.05, 0.95).unwrap();
        assert_relative_eq!(report.final_value, 166_666.0, epsilon = 1e-9);
        assert_relative_eq!(report.profit, 66_666.0, epsilon = 1e-9);
        assert_relative_eq!(report.roi, 66.666, epsilon = 1e-9);
        assert_eq!(report.max_consecutive_losses, 0);
        assert!(report.sharpe_ratio.is_some());
    }

    #[test]
    fn report_needs_two_bars() {
        use crate::domain::backtest::BacktestResult;
        use crate::domain::portfolio::{EquityPoint, PortfolioState};
        use chrono::NaiveDate;

        let result = BacktestResult {
            initial_capital: 100.0,
            equity_curve: vec![EquityPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                value: 100.0,
            }],
            trades: vec![],
            trade_pnls: vec![],
            final_state: PortfolioState::new(100.0),
        };
        assert!(matches!(
            risk_report(&result, 0.05, 0.95),
            Err(MatraderError::InsufficientData { .. })
        ));
    }
}
