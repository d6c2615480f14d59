//! Monte Carlo portfolio-weight search.
//!
//! Random uniform weight vectors normalized to sum 1 (a biased simplex
//! sampling, not a uniform simplex distribution), scored by annualized
//! return, volatility, and Sharpe over a returns matrix. The seed is
//! mandatory: every run is reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::error::MatraderError;
use super::metrics::TRADING_DAYS_PER_YEAR;

/// Per-asset return observations: one row per asset, equal row lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnsMatrix {
    rows: Vec<Vec<f64>>,
}

impl ReturnsMatrix {
    /// Needs at least one asset and at least two observations per asset
    /// (the sample covariance divides by n - 1).
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, MatraderError> {
        let observations = match rows.first() {
            Some(first) => first.len(),
            None => {
                return Err(MatraderError::InsufficientData {
                    have: 0,
                    minimum: 1,
                })
            }
        };
        if observations < 2 {
            return Err(MatraderError::InsufficientData {
                have: observations,
                minimum: 2,
            });
        }
        if rows.iter().any(|r| r.len() != observations) {
            return Err(MatraderError::Data {
                reason: "all assets must have the same number of observations".into(),
            });
        }
        if rows.iter().flatten().any(|v| !v.is_finite()) {
            return Err(MatraderError::Data {
                reason: "returns must be finite".into(),
            });
        }
        Ok(Self { rows })
    }

    pub fn n_assets(&self) -> usize {
        self.rows.len()
    }

    pub fn n_observations(&self) -> usize {
        self.rows[0].len()
    }

    /// Per-asset mean return.
    pub fn mean_returns(&self) -> Vec<f64> {
        self.rows
            .iter()
            .map(|r| r.iter().sum::<f64>() / r.len() as f64)
            .collect()
    }

    /// Sample covariance matrix (n - 1 denominator).
    pub fn covariance(&self) -> Vec<Vec<f64>> {
        let n = self.n_assets();
        let observations = self.n_observations() as f64;
        let means = self.mean_returns();
        let mut cov = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in i..n {
                let mut sum = 0.0;
                for k in 0..self.rows[i].len() {
                    sum += (self.rows[i][k] - means[i]) * (self.rows[j][k] - means[j]);
                }
                let value = sum / (observations - 1.0);
                cov[i][j] = value;
                cov[j][i] = value;
            }
        }
        cov
    }
}

/// Validated trial parameters. The seed is required by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonteCarloConfig {
    trials: usize,
    seed: u64,
}

impl MonteCarloConfig {
    pub fn new(trials: usize, seed: u64) -> Result<Self, MatraderError> {
        if trials < 1 {
            return Err(MatraderError::Configuration {
                reason: "trials must be at least 1".into(),
            });
        }
        Ok(Self { trials, seed })
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Annualized score of one sampled weight vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrialPoint {
    pub annual_return: f64,
    pub volatility: f64,
    pub sharpe: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonteCarloOutcome {
    pub trials: Vec<TrialPoint>,
    pub weights: Vec<Vec<f64>>,
    pub max_sharpe_weights: Vec<f64>,
    pub min_volatility_weights: Vec<f64>,
}

/// Annualized (return, volatility, Sharpe) of a weight vector.
pub fn portfolio_performance(
    weights: &[f64],
    mean_returns: &[f64],
    covariance: &[Vec<f64>],
) -> TrialPoint {
    let annual_return: f64 = weights
        .iter()
        .zip(mean_returns)
        .map(|(w, m)| w * m)
        .sum::<f64>()
        * TRADING_DAYS_PER_YEAR;

    let mut variance = 0.0;
    for (i, wi) in weights.iter().enumerate() {
        for (j, wj) in weights.iter().enumerate() {
            variance += wi * wj * covariance[i][j];
        }
    }
    let volatility = (variance * TRADING_DAYS_PER_YEAR).sqrt();

    TrialPoint {
        annual_return,
        volatility,
        sharpe: if volatility > 0.0 {
            Some(annual_return / volatility)
        } else {
            None
        },
    }
}

/// Run the weight search. Deterministic for a fixed seed; each trial writes
/// only its own output slot.
pub fn optimize(matrix: &ReturnsMatrix, config: &MonteCarloConfig) -> MonteCarloOutcome {
    let n_assets = matrix.n_assets();
    let means = matrix.mean_returns();
    let covariance = matrix.covariance();
    let mut rng = StdRng::seed_from_u64(config.seed());

    let mut trials = Vec::with_capacity(config.trials());
    let mut weights = Vec::with_capacity(config.trials());

    for _ in 0..config.trials() {
        let mut w: Vec<f64> = (0..n_assets).map(|_| rng.gen_range(0.0..1.0)).collect();
        let total: f64 = w.iter().sum();
        if total > 0.0 {
            for value in &mut w {
                *value /= total;
            }
        } else {
            w.fill(1.0 / n_assets as f64);
        }

        trials.push(portfolio_performance(&w, &means, &covariance));
        weights.push(w);
    }

    let max_sharpe_index = trials
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            let a = a.sharpe.unwrap_or(f64::NEG_INFINITY);
            let b = b.sharpe.unwrap_or(f64::NEG_INFINITY);
            a.partial_cmp(&b).expect("sharpe must not be NaN")
        })
        .map(|(i, _)| i)
        .expect("at least one trial");

    let min_volatility_index = trials
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.volatility
                .partial_cmp(&b.volatility)
                .expect("volatility must not be NaN")
        })
        .map(|(i, _)| i)
        .expect("at least one trial");

    MonteCarloOutcome {
        max_sharpe_weights: weights[max_sharpe_index].clone(),
        min_volatility_weights: weights[min_volatility_index].clone(),
        trials,
        weights,
    }
}
