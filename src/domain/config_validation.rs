//! Configuration validation.
//!
//! Builds validated domain configs from a [`ConfigPort`] before any
//! computation runs. Every tunable is an explicit value read here; nothing
//! in the domain consults ambient state.

use chrono::NaiveDate;

use crate::domain::backtest::{BacktestConfig, ShareSizing};
use crate::domain::error::MatraderError;
use crate::domain::indicator::MaKind;
use crate::domain::montecarlo::MonteCarloConfig;
use crate::domain::signal::SignalConfig;
use crate::ports::config_port::ConfigPort;

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> MatraderError {
    MatraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn period(config: &dyn ConfigPort, key: &str, default: i64) -> Result<usize, MatraderError> {
    let value = config.get_int("strategy", key, default);
    if value < 1 {
        return Err(invalid("strategy", key, "must be at least 1"));
    }
    Ok(value as usize)
}

/// [strategy] fast_period, slow_period, ma_kind.
pub fn signal_config_from(config: &dyn ConfigPort) -> Result<SignalConfig, MatraderError> {
    let fast = period(config, "fast_period", 50)?;
    let slow = period(config, "slow_period", 200)?;

    let kind = match config
        .get_string("strategy", "ma_kind")
        .unwrap_or_else(|| "simple".to_string())
        .to_lowercase()
        .as_str()
    {
        "simple" | "sma" => MaKind::Simple,
        "exponential" | "ema" => MaKind::Exponential,
        other => {
            return Err(invalid(
                "strategy",
                "ma_kind",
                format!("expected simple or exponential, got {other}"),
            ))
        }
    };

    SignalConfig::new(fast, slow, kind)
}

/// [backtest] initial_capital, sizing, liquidate_at_end, risk_free_rate.
pub fn backtest_config_from(config: &dyn ConfigPort) -> Result<BacktestConfig, MatraderError> {
    let initial_capital = config.get_double("backtest", "initial_capital", 100_000.0);
    if initial_capital <= 0.0 {
        return Err(invalid("backtest", "initial_capital", "must be positive"));
    }

    let sizing = match config
        .get_string("backtest", "sizing")
        .unwrap_or_else(|| "whole".to_string())
        .to_lowercase()
        .as_str()
    {
        "whole" => ShareSizing::Whole,
        "fractional" => ShareSizing::Fractional,
        other => {
            return Err(invalid(
                "backtest",
                "sizing",
                format!("expected whole or fractional, got {other}"),
            ))
        }
    };

    let risk_free_rate = config.get_double("backtest", "risk_free_rate", 0.05);
    if !(0.0..1.0).contains(&risk_free_rate) {
        return Err(invalid(
            "backtest",
            "risk_free_rate",
            "must be between 0 and 1",
        ));
    }

    Ok(BacktestConfig {
        initial_capital,
        sizing,
        liquidate_at_end: config.get_bool("backtest", "liquidate_at_end", false),
        risk_free_rate,
    })
}

/// [montecarlo] trials, seed. The seed has no default: omitting it would
/// make runs unreproducible.
pub fn monte_carlo_config_from(config: &dyn ConfigPort) -> Result<MonteCarloConfig, MatraderError> {
    let trials = config.get_int("montecarlo", "trials", 5_000);
    if trials < 1 {
        return Err(invalid("montecarlo", "trials", "must be at least 1"));
    }

    let seed_str =
        config
            .get_string("montecarlo", "seed")
            .ok_or_else(|| MatraderError::ConfigMissing {
                section: "montecarlo".to_string(),
                key: "seed".to_string(),
            })?;
    let seed: u64 = seed_str
        .trim()
        .parse()
        .map_err(|_| invalid("montecarlo", "seed", "must be an unsigned integer"))?;

    MonteCarloConfig::new(trials as usize, seed)
}

/// [montecarlo] confidence, shared by the VaR/CVaR legs.
pub fn confidence_from(config: &dyn ConfigPort) -> Result<f64, MatraderError> {
    let confidence = config.get_double("montecarlo", "confidence", 0.95);
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(invalid(
            "montecarlo",
            "confidence",
            "must be strictly between 0 and 1",
        ));
    }
    Ok(confidence)
}

/// [data] start_date, end_date (both required, start before end).
pub fn data_range_from(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), MatraderError> {
    let start = parse_date(config, "start_date")?;
    let end = parse_date(config, "end_date")?;
    if start >= end {
        return Err(invalid("data", "start_date", "must be before end_date"));
    }
    Ok((start, end))
}

fn parse_date(config: &dyn ConfigPort, key: &str) -> Result<NaiveDate, MatraderError> {
    let value = config
        .get_string("data", key)
        .ok_or_else(|| MatraderError::ConfigMissing {
            section: "data".to_string(),
            key: key.to_string(),
        })?;
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| invalid("data", key, format!("expected YYYY-MM-DD: {e}")))
}
